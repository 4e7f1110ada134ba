use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::keys;

/// Current weather for one city, as cached and as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub city: String,
    #[serde(rename = "temp_celsius")]
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub condition: String,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    #[serde(rename = "cloud_percent")]
    pub cloud: i64,
    #[serde(rename = "visibility_km")]
    pub visibility: f64,
    #[serde(rename = "updated_at")]
    pub updated: DateTime<Utc>,
}

/// Exchange rate between a currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base: String,
    pub target: String,
    pub rate: f64,
    #[serde(rename = "updated_at")]
    pub updated: String,
}

/// Registered user profile. The id travels as the bus message key and
/// the store key suffix, never inside the serialized body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip)]
    pub user_id: i64,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
}

/// Intent to produce a value: carries just enough to re-fetch from the
/// domain fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: String,
    pub args: HashMap<String, String>,
}

/// The two shapes a bus payload can take. A command is recognized by its
/// `type` discriminator; anything else must structurally match the domain
/// value itself (a snapshot needs no re-fetch).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Command(Command),
    Snapshot(T),
}

/// One aggregated entry from the request log: a frequently requested
/// lookup to be republished as a command. Recomputed every tick, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub args: HashMap<String, String>,
}

impl PopularRequest {
    /// Bus key for this request, derived with the same rule the workers
    /// use when they write the store. `None` for unknown kinds or
    /// missing arguments.
    pub fn bus_key(&self) -> Option<String> {
        match self.kind.as_str() {
            "weather" => self.args.get("city").map(|city| keys::weather(city)),
            "exchange" => {
                let base = self.args.get("base")?;
                let target = self.args.get("target")?;
                Some(keys::exchange(base, target))
            }
            _ => None,
        }
    }
}

/// A request seed written into the request log by the admin boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedRequest {
    pub kind: String,
    pub args: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_weather() -> Weather {
        Weather {
            city: "Moscow".to_string(),
            temp: 5.2,
            feels_like: 2.1,
            humidity: 71,
            condition: "Cloudy".to_string(),
            wind_kph: 14.0,
            pressure_mb: 1012.0,
            cloud: 80,
            visibility: 10.0,
            updated: Utc::now(),
        }
    }

    #[test]
    fn command_payload_decodes_as_command() {
        let raw = br#"{"type":"weather","args":{"city":"Moscow"}}"#;
        match serde_json::from_slice::<Payload<Weather>>(raw).unwrap() {
            Payload::Command(cmd) => {
                assert_eq!(cmd.kind, "weather");
                assert_eq!(cmd.args.get("city").unwrap(), "Moscow");
            }
            Payload::Snapshot(_) => panic!("expected command shape"),
        }
    }

    #[test]
    fn snapshot_payload_decodes_as_domain_value() {
        let raw = serde_json::to_vec(&sample_weather()).unwrap();
        match serde_json::from_slice::<Payload<Weather>>(&raw).unwrap() {
            Payload::Snapshot(weather) => assert_eq!(weather.city, "Moscow"),
            Payload::Command(_) => panic!("expected snapshot shape"),
        }
    }

    #[test]
    fn neither_shape_is_an_error() {
        let raw = br#"{"something":"else"}"#;
        assert!(serde_json::from_slice::<Payload<Weather>>(raw).is_err());
    }

    #[test]
    fn popular_request_bus_key_uses_the_shared_derivation() {
        let weather = PopularRequest {
            kind: "weather".to_string(),
            args: HashMap::from([("city".to_string(), "  Moscow ".to_string())]),
        };
        assert_eq!(weather.bus_key().unwrap(), "weather:moscow");

        let exchange = PopularRequest {
            kind: "exchange".to_string(),
            args: HashMap::from([
                ("base".to_string(), "USD".to_string()),
                ("target".to_string(), "EUR".to_string()),
            ]),
        };
        assert_eq!(exchange.bus_key().unwrap(), "exchange:usd_eur");

        let unknown = PopularRequest {
            kind: "stocks".to_string(),
            args: HashMap::new(),
        };
        assert!(unknown.bus_key().is_none());
    }

    #[test]
    fn user_profile_body_omits_the_id() {
        let user = UserProfile {
            user_id: 42,
            user_name: "jdoe".to_string(),
            first_name: "J".to_string(),
            last_name: "Doe".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("42"));
        assert!(json.contains("jdoe"));
    }
}
