use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::utils::time::OutputZone;

/// Immutable run configuration.
///
/// Built once at startup by layering serialized defaults, an optional TOML
/// file, `SD_XMLTV_*` environment variables and finally CLI overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Listings service account and endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root, without a trailing '/'
    pub base_url: String,
    pub username: String,
    /// Plain text or a 40 character SHA1 hex digest
    pub password: String,
    /// Lineup code, e.g. `USA-MA02317-X`
    pub lineup: String,
    /// 3-character country code used by headend lookups
    pub country: String,
    pub postal_code: String,
    /// Request the verbose channel map form of the lineup
    pub verbose_map: bool,
    #[serde(with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

/// Batching and window settings for the fetch collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of schedule days requested, starting today
    pub days: u32,
    pub max_station_ids_per_request: usize,
    pub max_program_ids_per_request: usize,
}

/// Guide document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination guide document, also the cache input of the next run
    pub xmltv_file: PathBuf,
    /// IANA zone for programme timestamps; the host zone when unset
    pub timezone: Option<String>,
    pub cache_keyword_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            lineup: DEFAULT_LINEUP.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            postal_code: DEFAULT_POSTAL_CODE.to_string(),
            verbose_map: DEFAULT_VERBOSE_MAP,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            max_station_ids_per_request: DEFAULT_MAX_STATION_IDS_PER_REQUEST,
            max_program_ids_per_request: DEFAULT_MAX_PROGRAM_IDS_PER_REQUEST,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            xmltv_file: PathBuf::from(DEFAULT_XMLTV_FILE),
            timezone: None,
            cache_keyword_prefix: DEFAULT_CACHE_KEYWORD_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_file {
            if path.exists() {
                info!("Configuration loaded from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            } else {
                debug!("Configuration file {} not found, using defaults", path.display());
            }
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> AppResult<()> {
        if self.fetch.days == 0 {
            return Err(AppError::config("fetch.days must be at least 1"));
        }
        if self.fetch.max_station_ids_per_request == 0 || self.fetch.max_program_ids_per_request == 0 {
            return Err(AppError::config("fetch batch sizes must be at least 1"));
        }
        if self.output.cache_keyword_prefix.is_empty() {
            return Err(AppError::config("output.cache_keyword_prefix must not be empty"));
        }
        if self.service.base_url.ends_with('/') {
            return Err(AppError::config("service.base_url must not end with '/'"));
        }
        self.output.zone()?;
        Ok(())
    }

    /// Effective configuration as TOML with the password masked
    pub fn to_redacted_toml(&self) -> AppResult<String> {
        let mut redacted = self.clone();
        if !redacted.service.password.is_empty() {
            redacted.service.password = "********".to_string();
        }
        toml::to_string_pretty(&redacted).map_err(|e| AppError::config(e.to_string()))
    }
}

impl ServiceConfig {
    /// Password as the SHA1 hex digest the token endpoint expects
    pub fn password_sha1(&self) -> String {
        if is_sha1_hex(&self.password) {
            return self.password.to_ascii_lowercase();
        }
        warn!("Password converted to SHA1 hash. Please configure a SHA1-hashed password.");
        hex::encode(Sha1::digest(self.password.as_bytes()))
    }
}

impl OutputConfig {
    pub fn zone(&self) -> AppResult<OutputZone> {
        match &self.timezone {
            Some(name) => OutputZone::named(name),
            None => Ok(OutputZone::Local),
        }
    }
}

fn is_sha1_hex(value: &str) -> bool {
    value.len() == 40 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetch.days, 15);
        assert_eq!(config.output.cache_keyword_prefix, "sd-md5-");
        assert_eq!(config.output.xmltv_file, PathBuf::from("xmltv.xml"));
    }

    #[test]
    fn test_password_sha1_passthrough_and_hashing() {
        let mut service = ServiceConfig::default();
        service.password = "A94A8FE5CCB19BA61C4C0873D391E987982FBBD3".to_string();
        assert_eq!(service.password_sha1(), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");

        service.password = "test".to_string();
        assert_eq!(service.password_sha1(), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");
    }

    #[test]
    fn test_layered_loading_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sd-xmltv.toml",
                r#"
                [service]
                username = "alice"
                lineup = "GBR-1000014-DEFAULT"
                request_timeout = "1m"

                [output]
                xmltv_file = "guide.xml"
                timezone = "Europe/London"
                "#,
            )?;
            jail.set_env("SD_XMLTV_FETCH__DAYS", "3");

            let config = Config::load(Some(Path::new("sd-xmltv.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.service.username, "alice");
            assert_eq!(config.service.lineup, "GBR-1000014-DEFAULT");
            assert_eq!(config.service.request_timeout, Duration::from_secs(60));
            assert_eq!(config.fetch.days, 3);
            assert_eq!(config.fetch.max_program_ids_per_request, 500);
            assert_eq!(config.output.xmltv_file, PathBuf::from("guide.xml"));
            assert_eq!(config.output.timezone.as_deref(), Some("Europe/London"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Some(Path::new("absent.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.fetch.days = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.base_url = "https://example.org/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_toml_masks_password() {
        let mut config = Config::default();
        config.service.password = "hunter2".to_string();
        let rendered = config.to_redacted_toml().unwrap();
        assert!(rendered.contains("********"));
        assert!(!rendered.contains("hunter2"));
    }
}
