//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{CanvasSize, CoordinateMapper, GeoBounds, DEFAULT_BOUNDS, DEFAULT_CANVAS};

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Live session tracking and cleanup
    pub tracker: TrackerSettings,

    /// Map geometry used for pixel mapping
    pub map: MapSettings,

    /// Server-side speed test runner
    pub speedtest: SpeedTestSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL. Without one, records are kept in memory.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

/// Live session tracker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    /// Seconds without a location update after which a session is evicted
    pub session_timeout_secs: u64,

    /// Seconds between cleanup passes
    pub cleanup_interval_secs: u64,
}

/// Geographic bounds and canvas size of the map image.
#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,

    /// Image width in pixels (latitude axis)
    pub width: u32,

    /// Image height in pixels (longitude axis)
    pub height: u32,
}

/// Speed test CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeedTestSettings {
    /// Allow clients to trigger server-side speed tests
    pub enabled: bool,

    /// Path or name of the Ookla `speedtest` executable
    pub executable: String,

    /// Pass `--accept-license --accept-gdpr` to the CLI
    pub accept_license: bool,

    /// Upper bound on a single run in seconds
    pub timeout_secs: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env). Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::defaults(Config::builder(), &environment)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__TRACKER__SESSION_TIMEOUT_SECS=600 -> tracker.session_timeout_secs = 600
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    /// Settings built from defaults only, without files or environment.
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder(), "test")?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            // 30 minute timeout, swept every 5 minutes
            .set_default("tracker.session_timeout_secs", 1800)?
            .set_default("tracker.cleanup_interval_secs", 300)?
            .set_default("map.min_lat", DEFAULT_BOUNDS.min_lat)?
            .set_default("map.max_lat", DEFAULT_BOUNDS.max_lat)?
            .set_default("map.min_lon", DEFAULT_BOUNDS.min_lon)?
            .set_default("map.max_lon", DEFAULT_BOUNDS.max_lon)?
            .set_default("map.width", DEFAULT_CANVAS.width)?
            .set_default("map.height", DEFAULT_CANVAS.height)?
            .set_default("speedtest.enabled", true)?
            .set_default("speedtest.executable", "speedtest")?
            .set_default("speedtest.accept_license", false)?
            .set_default("speedtest.timeout_secs", 120)?
            .set_default("cors.allowed_origins", Vec::<String>::new())
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.tracker.session_timeout_secs == 0 || self.tracker.cleanup_interval_secs == 0 {
            return Err(ConfigError::Message(
                "tracker.session_timeout_secs and tracker.cleanup_interval_secs must be positive"
                    .into(),
            ));
        }
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::Message(format!(
                "map canvas must be at least 1x1 pixels, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        if self.speedtest.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "speedtest.timeout_secs must be positive".into(),
            ));
        }
        Ok(self)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl TrackerSettings {
    pub fn session_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MapSettings {
    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::new(self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.bounds(), self.canvas())
    }
}
