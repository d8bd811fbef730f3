use uuid::Uuid;

use crate::config::Config;

/// Credentials and network identity written into relay URLs
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyIdentity {
    /// Credentials handed to playlist consumers
    pub user: String,
    pub password: String,
    /// Origin credentials replaced in credential-substitution mode
    pub origin_user: String,
    pub origin_password: String,
    pub hostname: String,
    pub listen_port: u16,
    pub advertised_port: u16,
    pub custom_stream_host: Option<String>,
    pub custom_path_prefix: Option<String>,
    pub https: bool,
    /// Random per-process path segment keeping several relays sharing one
    /// path namespace apart
    pub anti_collision_token: String,
    pub keep_original_urls: bool,
}

impl ProxyIdentity {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user: config.credentials.user.clone(),
            password: config.credentials.password.clone(),
            origin_user: config.credentials.xtream_user.clone(),
            origin_password: config.credentials.xtream_password.clone(),
            hostname: config.web.hostname.clone(),
            listen_port: config.web.port,
            advertised_port: config.web.advertised_port(),
            custom_stream_host: non_empty(config.web.custom_stream_host.as_deref()),
            custom_path_prefix: non_empty(config.web.custom_endpoint.as_deref()),
            https: config.web.https,
            anti_collision_token: generate_anti_collision_token(),
            keep_original_urls: config.playlist.keep_original_urls,
        }
    }

    pub fn with_anti_collision_token<S: Into<String>>(mut self, token: S) -> Self {
        self.anti_collision_token = token.into();
        self
    }

    pub fn scheme(&self) -> &'static str {
        if self.https { "https" } else { "http" }
    }

    /// Host placed in relay URLs
    pub fn stream_host(&self) -> &str {
        self.custom_stream_host.as_deref().unwrap_or(&self.hostname)
    }

    pub fn credentials_match(&self, user: &str, password: &str) -> bool {
        self.user == user && self.password == password
    }
}

/// First group of a v4 UUID: eight lowercase hex characters
pub fn generate_anti_collision_token() -> String {
    let mut buf = Uuid::encode_buffer();
    let hyphenated = Uuid::new_v4().hyphenated().encode_lower(&mut buf);
    hyphenated[..8].to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
