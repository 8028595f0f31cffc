use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Backing file for the catalog.
    pub catalog_file: PathBuf,
    /// When false the catalog lives in memory only and is seeded on start.
    pub persist: bool,
    /// Single allowed CORS origin; `None` allows any origin.
    pub cors_origin: Option<String>,
    pub public_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            catalog_file: PathBuf::from("db.json"),
            persist: true,
            cors_origin: None,
            public_dir: PathBuf::from("public"),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: match var("PORT") {
                Some(raw) => raw.parse::<u16>().context("PORT must be a valid number")?,
                None => defaults.port,
            },
            catalog_file: var("CATALOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_file),
            persist: match var("CATALOG_PERSIST") {
                Some(raw) => parse_bool(&raw).context("CATALOG_PERSIST must be true or false")?,
                None => defaults.persist,
            },
            cors_origin: var("CORS_ORIGIN").filter(|o| !o.trim().is_empty()),
            public_dir: var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean {other:?}"),
    }
}
