use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use dirs::home_dir;
use serde::Deserialize;
use truthbot_judge_client::HttpClient;

pub const CONFIG_TOML_FILE: &str = "config.toml";
pub const TRUTHBOT_HOME_ENV_VAR: &str = "TRUTHBOT_HOME";
pub const BASE_URL_ENV_VAR: &str = "TRUTHBOT_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    pub base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub bearer_token: Option<String>,
}

/// Values supplied on the command line; they win over the file and the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root URL of the comparison service, without a trailing `/api`.
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: Option<String>,
    pub bearer_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(ConfigToml::default())
    }
}

impl Config {
    /// Load `config.toml` from the overridden path or `$TRUTHBOT_HOME`, then
    /// apply `TRUTHBOT_BASE_URL` and the command-line overrides.
    pub fn load(overrides: ConfigOverrides) -> io::Result<Self> {
        let path = match &overrides.config_path {
            Some(path) => path.clone(),
            None => find_truthbot_home()?.join(CONFIG_TOML_FILE),
        };
        let mut config = Self::load_from_path(&path)?;
        if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        if let Some(base_url) = overrides.base_url {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// A missing file yields the defaults; an unreadable or invalid one is
    /// an error.
    pub fn load_from_path(path: &Path) -> io::Result<Self> {
        let toml = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|err| {
                tracing::error!("Failed to parse {}: {err}", path.display());
                io::Error::new(io::ErrorKind::InvalidData, err)
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!("{} not found, using defaults", path.display());
                ConfigToml::default()
            }
            Err(err) => {
                tracing::error!("Failed to read {}: {err}", path.display());
                return Err(err);
            }
        };
        Ok(Self::from_toml(toml))
    }

    pub fn from_toml(toml: ConfigToml) -> Self {
        Self {
            base_url: toml
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_millis(
                toml.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
            ),
            user_agent: toml.user_agent,
            bearer_token: toml.bearer_token,
        }
    }

    /// HTTP backend configured from these settings.
    pub fn http_client(&self) -> truthbot_judge_client::Result<HttpClient> {
        let mut client =
            HttpClient::new(self.base_url.clone())?.with_timeout(self.request_timeout);
        if let Some(ua) = &self.user_agent {
            client = client.with_user_agent(ua.clone());
        }
        if let Some(token) = &self.bearer_token {
            client = client.with_bearer_token(token.clone());
        }
        Ok(client)
    }
}

/// `$TRUTHBOT_HOME` when set, otherwise `~/.truthbot`.
pub fn find_truthbot_home() -> io::Result<PathBuf> {
    if let Ok(val) = std::env::var(TRUTHBOT_HOME_ENV_VAR)
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }
    let mut home = home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "Could not find home directory")
    })?;
    home.push(".truthbot");
    Ok(home)
}
