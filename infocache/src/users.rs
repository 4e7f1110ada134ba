//! User registration: persist to Postgres, then announce on the bus so
//! the sync worker can warm the cache entry the auth middleware reads.

use async_trait::async_trait;
use chrono::Utc;
use shared::{Error, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

use crate::bus::Publisher;
use crate::models::UserProfile;

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn save(&self, user: &UserProfile) -> Result<()>;
}

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn save(&self, user: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, username, first_name, last_name, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.user_id)
        .bind(&user.user_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("save user: {e}")))?;
        Ok(())
    }
}

pub struct UserService {
    repo: Arc<dyn UserStore>,
    producer: Arc<dyn Publisher>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserStore>, producer: Arc<dyn Publisher>) -> Self {
        Self { repo, producer }
    }

    /// Persists the user, then announces the profile on the user topic.
    /// The row is the source of truth: a failed publish is logged but
    /// the registration still succeeds.
    pub async fn create_user(&self, user: &UserProfile) -> Result<()> {
        if user.user_id <= 0 {
            return Err(Error::Validation(format!(
                "invalid user id: {}",
                user.user_id
            )));
        }

        self.repo.save(user).await?;

        let key = user.user_id.to_string();
        match serde_json::to_vec(user) {
            Ok(value) => {
                if let Err(e) = self.producer.publish(key.as_bytes(), &value).await {
                    warn!(user_id = user.user_id, error = %e, "user announce failed");
                }
            }
            Err(e) => warn!(user_id = user.user_id, error = %e, "user encode failed"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingPublisher;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUsers {
        saved: Mutex<Vec<UserProfile>>,
        fail: bool,
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn save(&self, user: &UserProfile) -> Result<()> {
            if self.fail {
                return Err(Error::Database("duplicate key".to_string()));
            }
            self.saved.lock().unwrap().push(user.clone());
            Ok(())
        }
    }

    fn profile(id: i64) -> UserProfile {
        UserProfile {
            user_id: id,
            user_name: "jdoe".to_string(),
            first_name: "J".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[tokio::test]
    async fn create_saves_then_announces_with_id_key() {
        let repo = Arc::new(MemoryUsers::default());
        let producer = Arc::new(RecordingPublisher::default());
        let service = UserService::new(repo.clone(), producer.clone());

        service.create_user(&profile(42)).await.unwrap();

        assert_eq!(repo.saved.lock().unwrap().len(), 1);
        let published = producer.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, b"42");
        // The body carries the profile fields but never the id.
        let body: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(body["user_name"], "jdoe");
        assert!(body.get("user_id").is_none());
    }

    #[tokio::test]
    async fn non_positive_id_is_rejected_before_any_side_effect() {
        let repo = Arc::new(MemoryUsers::default());
        let producer = Arc::new(RecordingPublisher::default());
        let service = UserService::new(repo.clone(), producer.clone());

        for id in [0, -7] {
            let result = service.create_user(&profile(id)).await;
            assert!(matches!(result, Err(Error::Validation(_))));
        }
        assert!(repo.saved.lock().unwrap().is_empty());
        assert!(producer.published().is_empty());
    }

    #[tokio::test]
    async fn save_failure_surfaces_and_skips_the_announce() {
        let repo = Arc::new(MemoryUsers {
            fail: true,
            ..Default::default()
        });
        let producer = Arc::new(RecordingPublisher::default());
        let service = UserService::new(repo, producer.clone());

        let result = service.create_user(&profile(42)).await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(producer.published().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_registration() {
        let repo = Arc::new(MemoryUsers::default());
        let producer = Arc::new(RecordingPublisher::default());
        producer.fail_key(b"42");
        let service = UserService::new(repo.clone(), producer);

        service.create_user(&profile(42)).await.unwrap();
        assert_eq!(repo.saved.lock().unwrap().len(), 1);
    }
}
