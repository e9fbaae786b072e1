use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use engine::Thresholds;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/spendscope.toml";
const ENV_PREFIX: &str = "SPENDSCOPE";

/// Which identity provider and document store to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Firebase,
    /// In-process accounts and storage; nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub identity_url: String,
    pub token_url: String,
    pub firestore_url: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            identity_url: services::DEFAULT_IDENTITY_URL.to_string(),
            token_url: services::DEFAULT_TOKEN_URL.to_string(),
            firestore_url: services::DEFAULT_FIRESTORE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis_url: String,
    pub backend: Backend,
    pub firebase: FirebaseConfig,
    pub timezone: String,
    pub log_level: String,
    pub log_file: String,
    pub thresholds: Thresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis_url: services::DEFAULT_ANALYSIS_URL.to_string(),
            backend: Backend::default(),
            firebase: FirebaseConfig::default(),
            timezone: "Asia/Kolkata".to_string(),
            log_level: "info".to_string(),
            log_file: "spendscope.log".to_string(),
            thresholds: Thresholds::default(),
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|err| AppError::Setting {
            key: "timezone",
            reason: err.to_string(),
        })
    }

    fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.backend == Backend::Firebase {
            if self.firebase.api_key.trim().is_empty() {
                return Err(missing("firebase.api_key"));
            }
            if self.firebase.project_id.trim().is_empty() {
                return Err(missing("firebase.project_id"));
            }
        }
        if !(self.thresholds.above_average_multiple > 0.0) {
            return Err(AppError::Setting {
                key: "thresholds.above_average_multiple",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn missing(key: &'static str) -> AppError {
    AppError::Setting {
        key,
        reason: "required when backend = \"firebase\"".to_string(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "spendscope", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the analysis backend URL.
    #[arg(long)]
    analysis_url: Option<String>,
    /// Identity and storage backend.
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    /// Override timezone used for dates (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Log filter level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
    /// Log file path; the terminal is taken by the UI.
    #[arg(long)]
    log_file: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    build(Args::parse())
}

fn build(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    );
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(analysis_url) = args.analysis_url {
        settings.analysis_url = analysis_url;
    }
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["spendscope", "--config", "does/not/exist"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_point_at_hosted_backend() {
        let config = AppConfig::default();
        assert_eq!(config.analysis_url, "https://personal-finance-anomaly.onrender.com");
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Kolkata);
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn cli_overrides_apply() {
        let config = build(args(&[
            "--backend",
            "memory",
            "--analysis-url",
            "http://127.0.0.1:5000",
            "--timezone",
            "Europe/Rome",
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.analysis_url, "http://127.0.0.1:5000");
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn firebase_requires_credentials() {
        let err = build(args(&["--backend", "firebase"])).unwrap_err();
        assert!(matches!(
            err,
            AppError::Setting {
                key: "firebase.api_key",
                ..
            }
        ));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let err = build(args(&["--backend", "memory", "--timezone", "Mars/Olympus"])).unwrap_err();
        assert!(matches!(err, AppError::Setting { key: "timezone", .. }));
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
backend = "firebase"
[firebase]
api_key = "k"
project_id = "demo"
[thresholds]
large_income = 75000.0
"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let config = build(Args::try_parse_from(["spendscope", "--config", &path]).unwrap()).unwrap();
        assert_eq!(config.firebase.project_id, "demo");
        assert_eq!(config.firebase.token_url, services::DEFAULT_TOKEN_URL);
        assert_eq!(config.thresholds.large_income, 75_000.0);
        assert_eq!(config.thresholds.above_average_multiple, 1.5);
    }
}
