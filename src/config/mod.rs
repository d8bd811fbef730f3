use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host written into relay URLs unless `custom_stream_host` is set
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Port written into relay URLs, defaults to `port`
    pub advertised_port: Option<u16>,
    pub custom_stream_host: Option<String>,
    /// Path prefix placed in front of every relay route
    pub custom_endpoint: Option<String>,
    #[serde(default)]
    pub https: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Credentials handed out to playlist consumers
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Credentials of the origin live API, substituted out of stream paths
    #[serde(default)]
    pub xtream_user: String,
    #[serde(default)]
    pub xtream_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistConfig {
    /// Remote URL or local path of the playlist to relay
    #[serde(default)]
    pub source: String,
    /// Optional YAML file with tag/name remapping rules
    pub mapping_path: Option<PathBuf>,
    #[serde(default = "default_keep_original_urls")]
    pub keep_original_urls: bool,
    /// Where the rewritten playlist is persisted, a temp file when unset
    pub output_path: Option<PathBuf>,
    /// Name tags added by the mapping after the key that matched instead of `tvg-id`
    #[serde(default = "default_append_tags_under_matched_key")]
    pub append_tags_under_matched_key: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_keep_original_urls() -> bool {
    DEFAULT_KEEP_ORIGINAL_URLS
}

fn default_append_tags_under_matched_key() -> bool {
    DEFAULT_APPEND_TAGS_UNDER_MATCHED_KEY
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            hostname: default_hostname(),
            advertised_port: None,
            custom_stream_host: None,
            custom_endpoint: None,
            https: false,
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            mapping_path: None,
            keep_original_urls: default_keep_original_urls(),
            output_path: None,
            append_tags_under_matched_key: default_append_tags_under_matched_key(),
        }
    }
}

impl WebConfig {
    pub fn advertised_port(&self) -> u16 {
        self.advertised_port.unwrap_or(self.port)
    }
}

impl PlaylistConfig {
    /// Resolve the persisted playlist location.
    ///
    /// Called once at startup; the generated temp path stays fixed for the
    /// lifetime of the process.
    pub fn resolve_output_path(&self) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => std::env::temp_dir().join(format!(
                "{}{}",
                Uuid::new_v4(),
                DEFAULT_PLAYLIST_FILE_SUFFIX
            )),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            Ok(default_config)
        }
    }

    /// Check the settings every startup path depends on
    pub fn validate(&self) -> AppResult<()> {
        if self.playlist.source.trim().is_empty() {
            return Err(AppError::configuration(
                "no playlist source configured (playlist.source or --playlist)",
            ));
        }
        if self.credentials.user.is_empty() || self.credentials.password.is_empty() {
            return Err(AppError::configuration(
                "credentials.user and credentials.password must both be set",
            ));
        }
        if let Some(host) = &self.web.custom_stream_host
            && host.contains('/')
        {
            return Err(AppError::configuration(format!(
                "custom_stream_host '{host}' must be a bare host name"
            )));
        }
        Ok(())
    }
}
