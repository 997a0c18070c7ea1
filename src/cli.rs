use crate::config::Config;
use clap::Parser;

/// Command line interface for the todo service
#[derive(Parser, Debug)]
#[command(name = "todo-api", version, about = "HTTP service for managing todo items")]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// SQLite connection string; overrides DATABASE_URL and the config file
    #[arg(long)]
    pub database_url: Option<String>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Run in test mode (in-memory store unless a URL is given)
    #[arg(long)]
    pub testing: bool,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    #[arg(long)]
    pub logging_level: Option<String>,

    /// Also write logs to a daily rotating file under `logs/`
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Overlays the flags that were given on the command line onto `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.testing {
            config.testing = true;
        }
        if let Some(level) = &self.logging_level {
            config.logging.level = level.clone();
        }
        if self.log_file {
            config.logging.file = true;
        }
    }
}
