use anyhow::{anyhow, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 8000;
pub const DEFAULT_OVERLAP_SIZE: usize = 200;
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 800 * 1024;

/// Runtime tunables for the extraction boundary. The core functions all
/// take these as plain parameters; this struct only centralizes the
/// environment lookup for callers that want it.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    pub chunk_size: usize,
    pub overlap_size: usize,
    pub max_response_bytes: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl ExtractConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            chunk_size: read_env("EDGAR_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            overlap_size: read_env("EDGAR_CHUNK_OVERLAP", DEFAULT_OVERLAP_SIZE)?,
            max_response_bytes: read_env("EDGAR_MAX_RESPONSE_BYTES", DEFAULT_MAX_RESPONSE_BYTES)?,
        })
    }
}

fn read_env(name: &str, default: usize) -> Result<usize> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| anyhow!("{} must be an unsigned integer, got {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
