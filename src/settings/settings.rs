use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub session: Session,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub backend: String, // "fake" or "http"
    pub base_url: String,
    pub timeout_secs: u64,
    pub refresh_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub storage_path: String,
    pub refresh_interval_secs: u64,
    pub login_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Session {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Reads the TOML settings file, then applies `STUDIO__SECTION__KEY`
/// environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix("STUDIO")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if settings.session.refresh_interval_secs == 0 {
        return Err(anyhow!("session.refresh_interval_secs must be positive"));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_a_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.toml");
        fs::write(
            &path,
            r#"
[api]
backend = "fake"
base_url = "http://localhost:8080/api"
timeout_secs = 10
refresh_path = "/auth/refresh"

[session]
storage_path = "session.json"
refresh_interval_secs = 240
login_path = "/login"

[log]
filter = "debug"
"#,
        )
        .unwrap();

        let settings = parse_settings(path.to_str()).unwrap();

        assert_eq!(settings.api.backend, "fake");
        assert_eq!(settings.api.timeout(), Duration::from_secs(10));
        assert_eq!(settings.session.refresh_interval(), Duration::from_secs(240));
        assert_eq!(settings.log.filter, "debug");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("does/not/exist.toml")).is_err());
    }
}
