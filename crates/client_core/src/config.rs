use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const LOCAL_BASE_URL: &str = "http://127.0.0.1:5000";
pub const HOSTED_BASE_URL: &str = "https://cinematch-1q5b.onrender.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SETTINGS_FILE: &str = "cinematch.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("unknown endpoint profile '{0}' (expected 'local' or 'hosted')")]
    UnknownProfile(String),
    #[error("invalid request timeout '{0}'")]
    InvalidTimeout(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Deployment the client talks to when no explicit base url is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointProfile {
    Local,
    #[default]
    Hosted,
}

impl EndpointProfile {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Local => LOCAL_BASE_URL,
            Self::Hosted => HOSTED_BASE_URL,
        }
    }
}

impl FromStr for EndpointProfile {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "hosted" | "remote" => Ok(Self::Hosted),
            other => Err(SettingsError::UnknownProfile(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    base_url: String,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: EndpointProfile::default().base_url().to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    profile: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ClientSettings {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, raw: &str) -> Result<(), SettingsError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(())
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, SettingsError> {
        self.set_base_url(raw)?;
        Ok(self)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn http_client(&self) -> Result<reqwest::Client, SettingsError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }
}

/// Defaults, then `cinematch.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| {
        std::env::var(key).ok()
    })
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            apply_file(&mut settings, file_cfg)?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    apply_env(&mut settings, env)?;
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, file_cfg: FileSettings) -> Result<(), SettingsError> {
    if let Some(profile) = file_cfg.profile {
        settings.base_url = profile.parse::<EndpointProfile>()?.base_url().to_string();
    }
    if let Some(base_url) = file_cfg.base_url {
        settings.set_base_url(&base_url)?;
    }
    if let Some(secs) = file_cfg.timeout_secs {
        settings.request_timeout = timeout_from_secs(&secs.to_string())?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut ClientSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), SettingsError> {
    if let Some(v) = env("CINEMATCH_PROFILE") {
        settings.base_url = v.parse::<EndpointProfile>()?.base_url().to_string();
    }
    if let Some(v) = env("CINEMATCH_BASE_URL") {
        settings.set_base_url(&v)?;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.set_base_url(&v)?;
    }
    if let Some(v) = env("CINEMATCH_TIMEOUT_SECS") {
        settings.request_timeout = timeout_from_secs(&v)?;
    }
    Ok(())
}

pub fn timeout_from_secs(raw: &str) -> Result<Duration, SettingsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(SettingsError::InvalidTimeout(raw.to_string())),
    }
}

fn normalize_base_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| SettingsError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
