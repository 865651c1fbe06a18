use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,

    // Session cookie is only sent over HTTPS when set
    pub cookie_secure: bool,

    // A PASTOR without ADMIN may only read statistics for zones they lead
    pub enforce_pastor_zone_ownership: bool,

    // First administrator, created when no credentials exist yet
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<Secret<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Self::from_settings(&config)
    }

    /// Reads the keys out of an already-built source; optional keys fall back
    /// to their defaults
    pub fn from_settings(config: &config::Config) -> Result<Self, config::ConfigError> {
        Ok(Self {
            database_url: config.get("database_url")?,
            base_url: config.get("base_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            cookie_secure: config.get("cookie_secure").unwrap_or(true),

            enforce_pastor_zone_ownership: config
                .get("enforce_pastor_zone_ownership")
                .unwrap_or(true),

            bootstrap_admin_email: config.get("bootstrap_admin_email").ok(),
            bootstrap_admin_password: config
                .get::<String>("bootstrap_admin_password")
                .ok()
                .map(Secret::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_minimal_settings_use_defaults() {
        let config = Config::from_settings(&settings(&[
            ("database_url", "postgres://localhost/shepherd"),
            ("base_url", "http://localhost:3000"),
            ("port", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.cookie_secure);
        assert!(config.enforce_pastor_zone_ownership);
        assert!(config.bootstrap_admin_email.is_none());
        assert!(config.bootstrap_admin_password.is_none());
    }

    #[test]
    fn test_missing_required_key_fails() {
        let result = Config::from_settings(&settings(&[
            ("base_url", "http://localhost:3000"),
            ("port", "8080"),
        ]));

        assert!(result.is_err());
    }

    #[test]
    fn test_ownership_check_can_be_disabled() {
        let config = Config::from_settings(&settings(&[
            ("database_url", "postgres://localhost/shepherd"),
            ("base_url", "http://localhost:3000"),
            ("port", "8080"),
            ("enforce_pastor_zone_ownership", "false"),
            ("cookie_secure", "false"),
        ]))
        .unwrap();

        assert!(!config.enforce_pastor_zone_ownership);
        assert!(!config.cookie_secure);
    }
}
