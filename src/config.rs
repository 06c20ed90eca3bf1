use std::time::Duration;

use thiserror::Error;

/// Longest accepted token lifetime: 100 years.
pub const MAX_EXPIRY_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("invalid token expiry {0:?}: expected seconds or <n>[s|m|h|d|w]")]
    InvalidExpiry(String),
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    /// Used only when the URI does not name a database.
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            uri: required("MONGO_URI")?,
            name: std::env::var("MONGO_DB").ok().filter(|v| !v.is_empty()),
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            expiry: parse_expiry(&required("JWT_EXPIRY")?)?,
        };
        Ok(Self { database, jwt })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Parses `3600`, `90s`, `15m`, `12h`, `1d` or `2w`. A bare number is seconds.
/// Zero and anything above [`MAX_EXPIRY_SECS`] are rejected.
pub fn parse_expiry(raw: &str) -> Result<Duration, ConfigError> {
    let value = raw.trim();
    let invalid = || ConfigError::InvalidExpiry(raw.to_string());

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        "w" => 60 * 60 * 24 * 7,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(multiplier)
        .filter(|secs| (1..=MAX_EXPIRY_SECS).contains(secs))
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_is_seconds() {
        assert_eq!(parse_expiry("3600").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn unit_suffixes() {
        assert_eq!(parse_expiry("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_expiry("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_expiry("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_expiry(" 1d ").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_expiry("2w").unwrap(), Duration::from_secs(1_209_600));
    }

    #[test]
    fn expiry_cap_is_inclusive() {
        let cap = format!("{MAX_EXPIRY_SECS}");
        assert_eq!(parse_expiry(&cap).unwrap(), Duration::from_secs(MAX_EXPIRY_SECS));
        assert!(parse_expiry(&format!("{}", MAX_EXPIRY_SECS + 1)).is_err());
        assert!(parse_expiry("5300w").is_err());
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "abc", "5y", "d", "-5m", "0", "1.5h", "30000000000000w", "99999999999999999999"] {
            assert!(
                matches!(parse_expiry(raw), Err(ConfigError::InvalidExpiry(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
