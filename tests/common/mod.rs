#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;

use matrix_ticker::core::{Frame, Rgb, Rotation, Size};
use matrix_ticker::error::{AssetError, DeviceError, RenderError};
use matrix_ticker::traits::{Glyph, GlyphSource, IconSource, Panel, PanelDriver};
use matrix_ticker::{AssetStore, Compositor, DeviceConfig, OverlayKey, Router};

pub const CANVAS: Size = Size::new(64, 32);

/// Deterministic font: every printable ASCII char is a solid 4x7 block, space is blank
pub struct BlockGlyphs;

impl GlyphSource for BlockGlyphs {
    fn rasterize(&self, ch: char, _px: f32) -> Result<Glyph, RenderError> {
        if ch == ' ' {
            return Ok(Glyph {
                width: 0,
                height: 0,
                xmin: 0,
                ymin: 0,
                advance: 3.0,
                coverage: Vec::new(),
            });
        }
        if !ch.is_ascii_graphic() {
            return Err(RenderError::MissingGlyph(ch));
        }
        Ok(Glyph {
            width: 4,
            height: 7,
            xmin: 0,
            ymin: 0,
            advance: 5.0,
            coverage: vec![255; 28],
        })
    }
}

/// Serves the same encoded icon for every locator
pub struct StaticIcons(pub Vec<u8>);

impl IconSource for StaticIcons {
    fn fetch(&self, _locator: &str) -> Result<Vec<u8>, AssetError> {
        Ok(self.0.clone())
    }
}

/// Every fetch fails, like an unreachable icon host
pub struct UnreachableIcons;

impl IconSource for UnreachableIcons {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::Fetch {
            locator: locator.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

pub const GREEN_LIGHT: Rgb = Rgb::new(0, 200, 0);
pub const YELLOW_LIGHT: Rgb = Rgb::new(200, 200, 0);
pub const RED_LIGHT: Rgb = Rgb::new(200, 0, 0);
pub const THERMOMETER: Rgb = Rgb::new(255, 255, 255);

pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub fn asset_store(icons: Box<dyn IconSource>) -> AssetStore {
    AssetStore::new(icons)
        .with_overlay(OverlayKey::GreenLight, Frame::filled(Size::new(12, 32), GREEN_LIGHT))
        .with_overlay(OverlayKey::YellowLight, Frame::filled(Size::new(12, 32), YELLOW_LIGHT))
        .with_overlay(OverlayKey::RedLight, Frame::filled(Size::new(12, 32), RED_LIGHT))
        .with_overlay(OverlayKey::Thermometer, Frame::filled(Size::new(10, 32), THERMOMETER))
}

/// Router over in-memory assets; weather icons are solid red 40x40 PNGs
pub fn router() -> Router {
    let icons = StaticIcons(png_bytes(40, 40, [255, 0, 0, 255]));
    Router::new(
        Arc::new(asset_store(Box::new(icons))),
        Rotation::Deg0,
        Duration::from_secs(5),
    )
}

pub fn compositor() -> Compositor {
    Compositor::new(Arc::new(BlockGlyphs))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Open(usize),
    Blit(usize),
    Release(usize),
}

/// Shared record of everything the fake hardware saw
#[derive(Default)]
pub struct PanelLog {
    pub events: Mutex<Vec<PanelEvent>>,
    pub last_frame: Mutex<Option<Frame>>,
    open_now: AtomicUsize,
    pub max_open: AtomicUsize,
}

impl PanelLog {
    pub fn events(&self) -> Vec<PanelEvent> {
        self.events.lock().clone()
    }

    /// Events without blits: the open/release skeleton
    pub fn lifecycle(&self) -> Vec<PanelEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, PanelEvent::Blit(_)))
            .collect()
    }

    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }
}

pub struct RecordingDriver {
    log: Arc<PanelLog>,
    opened: usize,
    pub fail_next_open: bool,
}

impl RecordingDriver {
    pub fn new(log: Arc<PanelLog>) -> Self {
        Self {
            log,
            opened: 0,
            fail_next_open: false,
        }
    }
}

impl PanelDriver for RecordingDriver {
    fn open(&mut self, _config: &DeviceConfig) -> Result<Box<dyn Panel>, DeviceError> {
        if self.fail_next_open {
            self.fail_next_open = false;
            return Err(DeviceError::Open("gpio busy".to_string()));
        }
        self.opened += 1;
        let open_now = self.log.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_open.fetch_max(open_now, Ordering::SeqCst);
        self.log.events.lock().push(PanelEvent::Open(self.opened));

        Ok(Box::new(RecordingPanel {
            id: self.opened,
            log: Arc::clone(&self.log),
            released: false,
        }))
    }
}

struct RecordingPanel {
    id: usize,
    log: Arc<PanelLog>,
    released: bool,
}

impl Panel for RecordingPanel {
    fn blit(&mut self, frame: &Frame) -> Result<(), DeviceError> {
        if self.released {
            return Err(DeviceError::Released);
        }
        self.log.events.lock().push(PanelEvent::Blit(self.id));
        *self.log.last_frame.lock() = Some(frame.clone());
        Ok(())
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        if !self.released {
            self.released = true;
            self.log.open_now.fetch_sub(1, Ordering::SeqCst);
            self.log.events.lock().push(PanelEvent::Release(self.id));
        }
        Ok(())
    }
}

/// Count pixels inside `[x0, x1)` matching a predicate
pub fn count_in_columns(frame: &Frame, x0: u32, x1: u32, pred: impl Fn(Rgb) -> bool) -> usize {
    let mut count = 0;
    for y in 0..frame.height() {
        for x in x0..x1.min(frame.width()) {
            if frame.pixel(x, y).map_or(false, &pred) {
                count += 1;
            }
        }
    }
    count
}

pub fn is_text(c: Rgb) -> bool {
    c == Rgb::BLUE
}
