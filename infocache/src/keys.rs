//! Cache key derivation.
//!
//! Every place that computes a key (accessor, workers, popularity
//! publisher) goes through these functions; a diverging rule would
//! fragment the key space across instances.

pub fn weather(city: &str) -> String {
    format!("weather:{}", city.trim().to_lowercase())
}

pub fn exchange(base: &str, target: &str) -> String {
    format!(
        "exchange:{}_{}",
        base.trim().to_lowercase(),
        target.trim().to_lowercase()
    )
}

pub fn user(id: &str) -> String {
    format!("user:{}", id.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_key_is_trimmed_and_lowercased() {
        assert_eq!(weather("  Moscow "), "weather:moscow");
        assert_eq!(weather("moscow"), "weather:moscow");
        assert_eq!(weather(""), "weather:");
    }

    #[test]
    fn exchange_key_is_case_insensitive() {
        assert_eq!(exchange("USD", "eur"), "exchange:usd_eur");
        assert_eq!(exchange("usd", "EUR"), "exchange:usd_eur");
        assert_eq!(exchange("usd", "eur"), "exchange:usd_eur");
    }

    #[test]
    fn user_key_carries_the_raw_id() {
        assert_eq!(user("123456"), "user:123456");
    }
}
