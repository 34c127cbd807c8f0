// Configuration module entry point
// Loads configuration from defaults, an optional TOML file and the environment

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, Capabilities};
pub use types::{AssetsConfig, CodesConfig, Config};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `BARCODE__SERVER__PORT=9000`
const ENV_PREFIX: &str = "BARCODE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .set_default("http.server_name", "barcode-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_uri_length", 8192)?
            .set_default("assets.dir", "static")?
            .set_default("assets.index_files", vec!["index.html"])?
            .set_default("codes.datamatrix", true)?
            .set_default("codes.max_scale", 32)?
            .set_default("codes.max_border", 64)?
            .set_default("codes.max_pixels", 16_777_216_i64)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
