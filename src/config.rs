//! Configuration management for the Folio server

use std::env;

use anyhow::Context;

use crate::reader::DEFAULT_MAX_PAGE_CHARS;

/// Default cap on uploaded archive size (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub reader: ReaderConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub max_page_chars: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            reader: ReaderConfig {
                max_page_chars: DEFAULT_MAX_PAGE_CHARS,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("FOLIO_HOST").unwrap_or(defaults.server.host),
                port: match env::var("FOLIO_PORT") {
                    Ok(raw) => raw.parse().context("FOLIO_PORT is not a valid port")?,
                    Err(_) => defaults.server.port,
                },
            },
            reader: ReaderConfig {
                max_page_chars: match env::var("FOLIO_MAX_PAGE_CHARS") {
                    Ok(raw) => raw
                        .parse()
                        .context("FOLIO_MAX_PAGE_CHARS is not a valid size")?,
                    Err(_) => defaults.reader.max_page_chars,
                },
                max_upload_bytes: match env::var("FOLIO_MAX_UPLOAD_BYTES") {
                    Ok(raw) => raw
                        .parse()
                        .context("FOLIO_MAX_UPLOAD_BYTES is not a valid size")?,
                    Err(_) => defaults.reader.max_upload_bytes,
                },
            },
        })
    }
}
