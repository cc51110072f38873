use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Environment snapshot taken once at startup.
///
/// The two store parameters are optional on purpose: without them the server
/// still boots and reports itself degraded on the diagnostics route.
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "8000"),
            database_url: var("DATABASE_URL").ok(),
            database_name: var("DATABASE_NAME").ok(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not set");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes env mutation across the tests below.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn port_defaults_when_unset() {
        let _lock = TEST_LOCK.lock().unwrap();

        env::remove_var("PORT");

        let config = Config::load();
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn port_reads_from_environment() {
        let _lock = TEST_LOCK.lock().unwrap();

        env::set_var("PORT", "9001");

        let config = Config::load();
        assert_eq!(config.port, 9001);

        env::remove_var("PORT");
    }

    #[test]
    fn store_parameters_stay_optional() {
        let _lock = TEST_LOCK.lock().unwrap();

        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_NAME");

        let config = Config::load();
        assert!(config.database_url.is_none());
        assert!(config.database_name.is_none());

        env::set_var("DATABASE_URL", "mongodb://localhost:27017");
        env::set_var("DATABASE_NAME", "landing");

        let config = Config::load();
        assert_eq!(
            config.database_url.as_deref(),
            Some("mongodb://localhost:27017")
        );
        assert_eq!(config.database_name.as_deref(), Some("landing"));

        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_NAME");
    }
}
