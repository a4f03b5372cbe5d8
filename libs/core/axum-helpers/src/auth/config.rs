//! JWT configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_or_default, env_required};

/// Token lifetime used when `JWT_EXPIRES_IN` is unset (7 days)
pub const DEFAULT_EXPIRES_IN: &str = "7d";

const MIN_SECRET_LEN: usize = 32;

/// HS256 signing key and token lifetime.
///
/// `from_env` reads `JWT_SECRET` (required, 32+ characters) and
/// `JWT_EXPIRES_IN` (`7d` when unset; plain seconds or a number suffixed
/// with `s`, `m`, `h` or `d`). Tests usually build one with [`JwtConfig::new`].
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub expires_in_secs: i64,
}

impl JwtConfig {
    /// Create a config with the default 7 day lifetime.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            expires_in_secs: 7 * 24 * 60 * 60,
        })
    }

    pub fn with_expires_in(mut self, secs: i64) -> Self {
        self.expires_in_secs = secs;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {MIN_SECRET_LEN} characters for security (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

/// Parse a lifetime such as `3600`, `15m`, `12h` or `7d` into seconds
pub fn parse_lifetime(value: &str) -> Option<i64> {
    let value = value.trim();
    let (digits, multiplier) = match value.char_indices().last()? {
        (i, 's') => (&value[..i], 1),
        (i, 'm') => (&value[..i], 60),
        (i, 'h') => (&value[..i], 60 * 60),
        (i, 'd') => (&value[..i], 24 * 60 * 60),
        _ => (value, 1),
    };

    digits
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| n.checked_mul(multiplier))
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let raw = env_or_default("JWT_EXPIRES_IN", DEFAULT_EXPIRES_IN);
        let expires_in_secs = parse_lifetime(&raw).ok_or_else(|| ConfigError::ParseError {
            key: "JWT_EXPIRES_IN".to_string(),
            details: format!("'{raw}' is not a lifetime like 3600, 15m, 12h or 7d"),
        })?;

        Ok(Self {
            secret,
            expires_in_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_valid() {
        let config = JwtConfig::new(SECRET).unwrap();
        assert_eq!(config.secret, SECRET);
        assert_eq!(config.expires_in_secs, 604_800);
    }

    #[test]
    fn test_jwt_config_new_too_short() {
        let err = JwtConfig::new("short").unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_parse_lifetime() {
        assert_eq!(parse_lifetime("3600"), Some(3600));
        assert_eq!(parse_lifetime("30s"), Some(30));
        assert_eq!(parse_lifetime("15m"), Some(900));
        assert_eq!(parse_lifetime("12h"), Some(43_200));
        assert_eq!(parse_lifetime("7d"), Some(604_800));
        assert_eq!(parse_lifetime("0"), None);
        assert_eq!(parse_lifetime("d"), None);
        assert_eq!(parse_lifetime("week"), None);
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", Some("1h"))],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.expires_in_secs, 3600);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_default_lifetime() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", None)],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.expires_in_secs, 604_800);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_bad_lifetime() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("JWT_EXPIRES_IN", Some("soon"))],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_EXPIRES_IN"));
            },
        );
    }
}
