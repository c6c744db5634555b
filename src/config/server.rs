use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 43_200;
/// One year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 525_600;
pub const DEFAULT_COOKIE_NAME: &str = "shoplist_session";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public URL of the web app (e.g., "https://lists.example.com").
    /// Share links are rendered as `{app_base_url}/share/{token}`.
    pub app_base_url: String,
    /// OAuth client id expected as the audience of Google ID tokens.
    /// Google sign-in is disabled when unset.
    pub google_client_id: Option<String>,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HS256 signing secret. A random one is generated at startup when unset,
    /// which invalidates sessions on restart.
    pub secret: Option<String>,
    pub ttl_minutes: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSitePolicy,
    pub cookie_domain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSitePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Some(Self::Lax),
            "strict" => Some(Self::Strict),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_cookie(self) -> cookie::SameSite {
        match self {
            Self::Lax => cookie::SameSite::Lax,
            Self::Strict => cookie::SameSite::Strict,
            Self::None => cookie::SameSite::None,
        }
    }
}

impl ServerConfig {
    /// Loads a TOML config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("shoplist.db")
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_minutes <= 0 {
            return Err(Error::Config(
                "session ttl_minutes must be positive".to_string(),
            ));
        }
        if self.session.ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(Error::Config(format!(
                "session ttl_minutes cannot exceed {MAX_SESSION_TTL_MINUTES}"
            )));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(Error::Config("session cookie_name cannot be empty".to_string()));
        }
        if self.session.cookie_same_site == SameSitePolicy::None && !self.session.cookie_secure {
            return Err(Error::Config(
                "cookie_same_site = \"none\" requires cookie_secure = true".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            app_base_url: "http://localhost:8080".to_string(),
            google_client_id: None,
            session: SessionConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: false,
            cookie_same_site: SameSitePolicy::Lax,
            cookie_domain: None,
        }
    }
}
