pub mod assets;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod font;
pub mod logging;
pub mod pipeline;
pub mod preview;
pub mod router;
pub mod source;
pub mod traits;

pub use assets::{AssetStore, Overlay, OverlayKey};
pub use compositor::{Compositor, OverlaySlot, PlacedOverlay, TextLayoutSpec};
pub use display::{DeviceConfig, DisplaySession, DisplaySessionManager, PlayOutcome, SessionState};
pub use error::{AssetError, ConfigLoadError, DeviceError, PipelineError, RenderError};
pub use pipeline::Orchestrator;
pub use router::{MessageKind, Metadata, RenderRequest, Router};
