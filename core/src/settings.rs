use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMode {
    /// Submit outputs to the Assistants API.
    OpenAi { api_key: String },
    /// Only log outputs.
    Log,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub sink: SinkMode,
}

impl Settings {
    // Reads `.env` (if present) and then the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let catalog_path = lookup("CATALOG_PATH")
            .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
            .into();

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR '{bind_addr}' is not a socket address"))?;

        let sink = match lookup("OUTPUT_SINK").as_deref().unwrap_or("openai") {
            "openai" => SinkMode::OpenAi {
                api_key: lookup("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY must be set when OUTPUT_SINK=openai")?,
            },
            "log" => SinkMode::Log,
            other => bail!("OUTPUT_SINK must be 'openai' or 'log', got '{other}'"),
        };

        Ok(Self {
            catalog_path,
            bind_addr,
            sink,
        })
    }
}
