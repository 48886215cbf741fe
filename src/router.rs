// router.rs - Message router: classifies inbound messages and resolves what a render needs

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::assets::{AssetStore, Overlay, OverlayKey};
use crate::compositor::{OverlaySlot, TextLayoutSpec};
use crate::core::Rotation;
use crate::error::PipelineError;

/// Free-form message metadata as delivered by the bus
pub type Metadata = serde_json::Map<String, Value>;

/// Number of comma-separated fields a health payload carries
const HEALTH_FIELDS: usize = 4;

/// Closed set of renderable message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Transit,
    Weather,
    Health,
}

impl MessageKind {
    /// Wire discriminator carried in the `name` metadata field
    pub fn wire_name(&self) -> &'static str {
        match self {
            MessageKind::Transit => "subway",
            MessageKind::Weather => "weather",
            MessageKind::Health => "covid",
        }
    }

    pub fn text_layout(&self) -> TextLayoutSpec {
        match self {
            MessageKind::Transit => TextLayoutSpec::new(12.0),
            MessageKind::Weather => TextLayoutSpec::new(11.0).with_origin(1, 2),
            MessageKind::Health => TextLayoutSpec::new(9.5),
        }
    }

    pub fn overlay_slot(&self) -> OverlaySlot {
        match self {
            MessageKind::Transit => OverlaySlot::Left(12),
            MessageKind::Weather => OverlaySlot::Right(30),
            MessageKind::Health => OverlaySlot::Left(10),
        }
    }
}

impl FromStr for MessageKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subway" => Ok(MessageKind::Transit),
            "weather" => Ok(MessageKind::Weather),
            "covid" => Ok(MessageKind::Health),
            other => Err(PipelineError::UnsupportedMessageKind(other.to_string())),
        }
    }
}

/// Fully resolved description of one render. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    kind: MessageKind,
    lines: Vec<String>,
    overlay: Option<Overlay>,
    priority: u8,
    rotation: Rotation,
    display_duration: Duration,
}

impl RenderRequest {
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_key(&self) -> Option<&OverlayKey> {
        self.overlay.as_ref().map(|o| &o.key)
    }

    /// Ordinal urgency; 0 for kinds without one
    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }
}

pub struct Router {
    assets: Arc<AssetStore>,
    rotation: Rotation,
    default_duration: Duration,
}

impl Router {
    pub fn new(assets: Arc<AssetStore>, rotation: Rotation, default_duration: Duration) -> Self {
        Self {
            assets,
            rotation,
            default_duration,
        }
    }

    /// Map a raw message to a render request. The only side effect is the weather
    /// icon fetch, attempted once.
    pub fn route(
        &self,
        kind: &str,
        metadata: &Metadata,
        payload: &str,
    ) -> Result<RenderRequest, PipelineError> {
        let kind: MessageKind = kind.parse()?;

        let (lines, overlay, priority) = match kind {
            MessageKind::Transit => {
                let ordinal = metadata.get("priority").and_then(priority_ordinal);
                let key = OverlayKey::for_transit_priority(ordinal);
                let priority = match key {
                    OverlayKey::GreenLight => 1,
                    OverlayKey::YellowLight => 2,
                    _ => 3,
                };
                (split_lines(payload), self.assets.overlay(&key)?, priority)
            }
            MessageKind::Weather => {
                let locator = metadata
                    .get("priority")
                    .and_then(Value::as_str)
                    .ok_or_else(|| PipelineError::MalformedPayload {
                        kind: kind.wire_name(),
                        reason: "missing icon locator in `priority`".to_string(),
                    })?;
                (split_lines(payload), self.assets.resolve_weather_icon(locator)?, 0)
            }
            MessageKind::Health => {
                let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
                if fields.len() != HEALTH_FIELDS {
                    return Err(PipelineError::MalformedPayload {
                        kind: kind.wire_name(),
                        reason: format!("expected {HEALTH_FIELDS} fields, got {}", fields.len()),
                    });
                }
                let lines = vec![format!("US:{}", fields[2]), format!("NY:{}", fields[0])];
                (lines, self.assets.overlay(&OverlayKey::Thermometer)?, 0)
            }
        };

        log::debug!("routed {} message with overlay {}", kind.wire_name(), overlay.key);

        Ok(RenderRequest {
            kind,
            lines,
            overlay: Some(overlay),
            priority,
            rotation: self.rotation,
            display_duration: duration_hint(metadata).unwrap_or(self.default_duration),
        })
    }
}

fn split_lines(payload: &str) -> Vec<String> {
    payload
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Transit priority arrives as a JSON number, occasionally as a numeric string
fn priority_ordinal(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Optional `duration` hint in seconds
fn duration_hint(metadata: &Metadata) -> Option<Duration> {
    let secs = match metadata.get("duration")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    positive_secs(secs)
}

/// Seconds as a non-zero `Duration`; `None` for NaN, negatives, zero or overflow
pub(crate) fn positive_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|duration| !duration.is_zero())
}
