//! Configuration for orbita.
//!
//! Settings live in `config.json` inside the data directory managed by
//! [`DataStorage`] (`~/.local/share/orbita/orbita/` on Linux, or
//! `$ORBITA_HOME`). A missing file means defaults everywhere, so a fresh
//! install runs without any setup.
//!
//! ## Structure
//!
//! ```json
//! {
//!   "default_user": "ana",
//!   "server": { "bind": "127.0.0.1:8080" },
//!   "streak": { "utc_offset_minutes": -180 },
//!   "identity": {
//!     "trust_user_header": true,
//!     "providers": [
//!       {
//!         "name": "supabase",
//!         "user_url": "https://project.supabase.co/auth/v1/user",
//!         "api_key": "public-anon-key",
//!         "user_id_field": "id"
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use orbita::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.default_user = Some("ana".to_string());
//! config.save()?;
//! # Ok::<(), orbita::error::Error>(())
//! ```

use super::clock::{SystemClock, DEFAULT_UTC_OFFSET_MINUTES};
use super::data_storage::DataStorage;
use super::messages::Message;
use crate::error::{Error, Result};
use crate::msg_debug;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address the HTTP API listens on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StreakConfig {
    /// Offset from UTC, in minutes, of the timezone that decides where a day
    /// starts and ends. Negative west of Greenwich.
    pub utc_offset_minutes: i32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

/// A hosted user endpoint that turns a bearer token into a user id.
///
/// The token is sent as `Authorization: Bearer <token>` together with the
/// project key in an `apikey` header; the user id is read from
/// `user_id_field` of the JSON response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub user_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_user_id_field")]
    pub user_id_field: String,
}

fn default_user_id_field() -> String {
    "id".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IdentityConfig {
    /// Accept the caller id from the `x-user-id` header or the
    /// `orbita_user_id` cookie. Only safe behind a gateway that sets them.
    pub trust_user_header: bool,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl IdentityConfig {
    /// True when the user header is trusted on an address other hosts can reach.
    pub fn header_trust_exposed(&self, addr: &SocketAddr) -> bool {
        self.trust_user_header && !addr.ip().is_loopback()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            trust_user_header: true,
            providers: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    /// Loads the configuration file, or defaults when there is none.
    pub fn read() -> Result<Config> {
        Self::read_from(Self::path()?)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            msg_debug!(Message::ConfigFileNotFound(path.display().to_string()));
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        serde_json::from_str(&config_str).map_err(|e| {
            msg_debug!(Message::ConfigParseError(e.to_string()));
            Error::Json(e)
        })
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Clock that reports time in the configured streak timezone.
    pub fn clock(&self) -> SystemClock {
        SystemClock::with_offset_minutes(self.streak.utc_offset_minutes)
    }

    /// Interactive setup, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Config::read()?;
        let theme = ColorfulTheme::default();

        let default_user: String = Input::with_theme(&theme)
            .with_prompt("Default user id")
            .default(config.default_user.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        config.default_user = Some(default_user.trim().to_string()).filter(|user| !user.is_empty());

        config.server.bind = Input::with_theme(&theme)
            .with_prompt("API bind address")
            .default(config.server.bind.clone())
            .interact_text()
            .map_err(prompt_error)?;

        config.streak.utc_offset_minutes = Input::with_theme(&theme)
            .with_prompt("Streak timezone offset from UTC, in minutes")
            .default(config.streak.utc_offset_minutes)
            .interact_text()
            .map_err(prompt_error)?;

        config.identity.trust_user_header = Confirm::with_theme(&theme)
            .with_prompt("Trust the x-user-id header set by a gateway?")
            .default(config.identity.trust_user_header)
            .interact()
            .map_err(prompt_error)?;

        Ok(config)
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}
