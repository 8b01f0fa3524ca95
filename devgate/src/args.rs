use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use devgate_config::Config;

/// Front-end dev server with a reverse proxy for backend APIs
#[derive(Debug, Parser)]
#[command(name = "devgate", version, about)]
pub struct Args {
    /// Path to a TOML configuration file; the built-in setup is used when omitted
    #[arg(short, long, env = "DEVGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the interface to bind
    #[arg(long, env = "DEVGATE_HOST")]
    pub host: Option<IpAddr>,

    /// Override the port to bind
    #[arg(short, long, env = "DEVGATE_PORT")]
    pub port: Option<u16>,

    /// Override the static asset directory
    #[arg(long, env = "DEVGATE_ROOT")]
    pub root: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Load the configuration and apply command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the
    /// overridden configuration is invalid
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load(path)?,
            None => Config::builtin(),
        };

        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref root) = self.root {
            config.server.root.clone_from(root);
        }

        config.validate()?;

        Ok(config)
    }
}
