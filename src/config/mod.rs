// Configuration module entry point
// Startup configuration for the local PWA server, loaded once and passed explicitly

mod types;

use std::net::SocketAddr;

pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig};

/// Default config file name (without extension), looked up in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "pwa-serve";

/// Port the server listens on unless overridden
pub const DEFAULT_PORT: u16 = 8000;

/// `PWA_` prefix, `__` between nested keys
fn env_source() -> config::Environment {
    config::Environment::with_prefix("PWA")
        .prefix_separator("_")
        .separator("__")
}

impl Config {
    /// Load configuration from `<config_path>.toml` (optional), `PWA_*` environment
    /// variables (e.g. `PWA_SERVER__PORT=9000`) and built-in defaults
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, env_source())
    }

    fn load_with_env(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.root", env!("CARGO_MANIFEST_DIR"))?
            .set_default("server.open_browser", true)?
            .set_default("server.reuse_address", false)?
            .set_default(
                "http.server_name",
                concat!("pwa-serve/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("http.directory_listing", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .build()?;

        settings.try_deserialize()
    }

    /// Load from the default config file name
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_NAME)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// URL printed in the banner and opened in the browser
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(!cfg.server.reuse_address);
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.http.directory_listing);
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_socket_addr_and_url() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_unspecified());
        assert_eq!(cfg.local_url(), "http://localhost:8000");
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn test_env_override_uses_single_underscore_prefix() {
        let cfg = Config::load_with_env(
            "definitely-missing-config-file",
            env(&[("PWA_SERVER__PORT", "9001"), ("PWA_HTTP__DIRECTORY_LISTING", "false")]),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9001);
        assert!(!cfg.http.directory_listing);
    }

    #[test]
    fn test_file_layered_under_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pwa-serve.toml"),
            "[server]\nhost = \"127.0.0.1\"\nport = 9100\n\n[logging]\naccess_log_format = \"json\"\n",
        )
        .unwrap();
        let name = dir.path().join("pwa-serve");
        let name = name.to_str().unwrap();

        let from_file = Config::load_with_env(name, env(&[])).unwrap();
        assert_eq!(from_file.server.host, "127.0.0.1");
        assert_eq!(from_file.server.port, 9100);
        assert_eq!(from_file.logging.access_log_format, "json");

        let overridden = Config::load_with_env(name, env(&[("PWA_SERVER__PORT", "9200")])).unwrap();
        assert_eq!(overridden.server.host, "127.0.0.1");
        assert_eq!(overridden.server.port, 9200);
    }
}
