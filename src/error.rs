use std::path::PathBuf;

use thiserror::Error;

/// Bus configuration could not be loaded. Never fatal: callers fall back to defaults.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Overlay bitmap lookup or remote icon fetch failed
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no overlay asset registered for `{0}`")]
    NotFound(String),
    #[error("failed to fetch icon `{locator}`: {reason}")]
    Fetch { locator: String, reason: String },
    #[error("failed to decode icon `{locator}`: {source}")]
    Decode {
        locator: String,
        #[source]
        source: image::ImageError,
    },
}

/// Font loading or glyph drawing failed
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data: {0}")]
    InvalidFont(String),
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("font unavailable: {0}")]
    FontUnavailable(String),
}

/// Physical panel could not be opened, written or released
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("invalid device configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to open panel: {0}")]
    Open(String),
    #[error("failed to write frame to panel: {0}")]
    Blit(String),
    #[error("a display session is still active")]
    Busy,
    #[error("panel already released")]
    Released,
    #[error("failed to start player thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Everything that can drop a single message on its way to the panel
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported message kind `{0}`")]
    UnsupportedMessageKind(String),
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: &'static str, reason: String },
    #[error(transparent)]
    AssetResolution(#[from] AssetError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}
