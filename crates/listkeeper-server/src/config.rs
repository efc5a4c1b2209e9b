use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use listkeeper_db::DbConfig;
use listkeeper_store::StoreConfig;

/// Process configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "listkeeper-server", about = "Serve lists and sublists over HTTP")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "LISTKEEPER_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "LISTKEEPER_PORT", default_value_t = 3720)]
    pub port: u16,

    /// `postgres://` URL; SQLite is used when absent
    #[arg(long, env = "LISTKEEPER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// SQLite file, defaults to the XDG data dir
    #[arg(long, env = "LISTKEEPER_SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Directory attachments are written to
    #[arg(long, env = "LISTKEEPER_UPLOAD_DIR", default_value = listkeeper_store::DEFAULT_UPLOAD_DIR)]
    pub upload_dir: String,

    /// Budget for each service operation, in seconds
    #[arg(long, env = "LISTKEEPER_TIMEOUT_SECS", default_value_t = 2)]
    pub timeout_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            sqlite_path: self.sqlite_path.clone(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            upload_dir: Some(self.upload_dir.clone()),
        }
    }
}
