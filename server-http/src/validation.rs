use chrono::Utc;
use infocache::models::LoggedRequest;
use std::collections::HashMap;

#[derive(Debug, PartialEq)]
pub enum ValidationError {
    EmptyCommand,
    UnknownCommand(String),
    MissingArgument { usage: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyCommand => write!(f, "empty command"),
            ValidationError::UnknownCommand(cmd) => write!(f, "unknown command: {}", cmd),
            ValidationError::MissingArgument { usage } => write!(f, "usage: {}", usage),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse a free-text admin command into a request-log seed.
///
/// `/weather <city> [lang]` — city and lang lowercased;
/// `/exchange <base> <target>` — codes uppercased.
pub fn parse_command(text: &str) -> Result<LoggedRequest, ValidationError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    let Some((&cmd, rest)) = parts.split_first() else {
        return Err(ValidationError::EmptyCommand);
    };

    let mut args = HashMap::new();
    let kind = match cmd {
        "/weather" => {
            let Some(city) = rest.first() else {
                return Err(ValidationError::MissingArgument {
                    usage: "/weather <city>",
                });
            };
            args.insert("city".to_string(), city.to_lowercase());
            if let Some(lang) = rest.get(1) {
                args.insert("lang".to_string(), lang.to_lowercase());
            }
            "weather"
        }
        "/exchange" => {
            let (Some(base), Some(target)) = (rest.first(), rest.get(1)) else {
                return Err(ValidationError::MissingArgument {
                    usage: "/exchange <base> <target>",
                });
            };
            args.insert("base".to_string(), base.to_uppercase());
            args.insert("target".to_string(), target.to_uppercase());
            "exchange"
        }
        other => return Err(ValidationError::UnknownCommand(other.to_string())),
    };

    Ok(LoggedRequest {
        kind: kind.to_string(),
        args,
        created_at: Utc::now(),
    })
}
