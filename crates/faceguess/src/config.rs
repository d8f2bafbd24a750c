//! Process configuration read from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use faceguess_room::{Catalog, CatalogError, MAX_ROOMS_LIMIT, RoomConfig};

/// Startup settings for the server binary.
///
/// Every field has a default, so an empty environment yields a server on
/// `0.0.0.0:3000` playing the built-in catalog.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base directory of the browser client, served by the asset server.
    pub static_dir: PathBuf,
    /// JSON item catalog. `None` plays the built-in items.
    pub items_path: Option<PathBuf>,
    pub room: RoomConfig,
}

/// Errors reading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },

    /// `MAX_ROOMS` is zero or above the code-space limit.
    #[error("MAX_ROOMS must be between 1 and {max}, got {0}", max = MAX_ROOMS_LIMIT)]
    MaxRooms(usize),

    /// The item catalog named by `ITEMS_PATH` could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = RoomConfig::default();

        let max_rooms = parse(&lookup, "MAX_ROOMS", defaults.max_rooms)?;
        if max_rooms == 0 || max_rooms > MAX_ROOMS_LIMIT {
            return Err(ConfigError::MaxRooms(max_rooms));
        }

        let max_name_len = parse(&lookup, "MAX_NAME_LEN", defaults.max_name_len)?;
        if max_name_len == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_NAME_LEN",
                value: "0".into(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 3000)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            items_path: lookup("ITEMS_PATH").map(PathBuf::from),
            room: RoomConfig {
                max_rooms,
                max_name_len,
                ..defaults
            },
        })
    }

    /// The `host:port` address to listen on.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Loads the catalog from `items_path`, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.items_path {
            Some(path) => Ok(Catalog::load(path)?),
            None => Ok(Catalog::default()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            items_path: None,
            room: RoomConfig::default(),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
