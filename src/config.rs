use std::path::{Path, PathBuf};

use crate::error::{FrameplotError, FrameplotResult};

/// Backend address and local cache settings.
///
/// The defaults match a plotting backend on the loopback interface and the
/// conventional `/tmp` artifact cache.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// `host:port` of the plotting backend.
    #[serde(default = "default_server_address")]
    pub server_address: String,

    /// Directory holding extracted stills, subset videos and overlay output.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Prepend `-hwaccel cuda` to ffmpeg decode invocations.
    #[serde(default)]
    pub hwaccel: bool,
}

fn default_server_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            cache_dir: default_cache_dir(),
            hwaccel: false,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> FrameplotResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FrameplotError::serde(format!("config parse failed: {e}")))
    }
}
