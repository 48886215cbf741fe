// assets.rs - Overlay bitmaps: status icons loaded at startup, weather icons per message

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::core::{Frame, Size};
use crate::error::AssetError;
use crate::traits::IconSource;

/// Edge length weather icons are resized to
pub const WEATHER_ICON_SIZE: u32 = 36;

/// Icon suffixes drawn dark-on-transparent upstream; inverted so they show on a black panel
const DARK_ICON_SUFFIXES: [&str; 3] = ["50d.png", "50n.png", "01n.png"];

/// Semantic identifier of an overlay bitmap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverlayKey {
    GreenLight,
    YellowLight,
    RedLight,
    Thermometer,
    /// Remote weather icon, keyed by its locator
    WeatherIcon(String),
}

impl OverlayKey {
    /// Bundled overlays, loaded from the asset directory at startup
    pub const BUNDLED: [OverlayKey; 4] = [
        OverlayKey::GreenLight,
        OverlayKey::YellowLight,
        OverlayKey::RedLight,
        OverlayKey::Thermometer,
    ];

    /// Traffic light for a transit delay ordinal: 1 green, 2 yellow, anything else red
    pub fn for_transit_priority(priority: Option<i64>) -> Self {
        match priority {
            Some(1) => OverlayKey::GreenLight,
            Some(2) => OverlayKey::YellowLight,
            _ => OverlayKey::RedLight,
        }
    }

    /// File stem inside the asset directory, `None` for remote icons
    pub fn file_stem(&self) -> Option<&'static str> {
        match self {
            OverlayKey::GreenLight => Some("green-light"),
            OverlayKey::YellowLight => Some("yellow-light"),
            OverlayKey::RedLight => Some("red-light"),
            OverlayKey::Thermometer => Some("thermometer"),
            OverlayKey::WeatherIcon(_) => None,
        }
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKey::WeatherIcon(locator) => write!(f, "weather-icon({locator})"),
            bundled => f.write_str(bundled.file_stem().unwrap_or("overlay")),
        }
    }
}

/// A resolved overlay: its key plus the shared, read-only bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub key: OverlayKey,
    pub bitmap: Arc<Frame>,
}

/// Read-only overlay lookup. Bundled bitmaps never change after construction.
pub struct AssetStore {
    overlays: HashMap<OverlayKey, Arc<Frame>>,
    icons: Box<dyn IconSource>,
}

impl AssetStore {
    pub fn new(icons: Box<dyn IconSource>) -> Self {
        Self {
            overlays: HashMap::new(),
            icons,
        }
    }

    /// Register a bundled overlay - builder style, used before the store is shared
    pub fn with_overlay(mut self, key: OverlayKey, bitmap: Frame) -> Self {
        self.overlays.insert(key, Arc::new(bitmap));
        self
    }

    /// Load every bundled overlay from `<dir>/<stem>.png`. Missing or broken files
    /// are logged; messages needing them later fail with `AssetError::NotFound`.
    pub fn load_dir(dir: &Path, icons: Box<dyn IconSource>) -> Self {
        let mut store = Self::new(icons);
        for key in OverlayKey::BUNDLED {
            let Some(stem) = key.file_stem() else { continue };
            let path = dir.join(format!("{stem}.png"));
            match load_png(&path) {
                Ok(bitmap) => {
                    log::debug!("loaded overlay {key} ({}x{})", bitmap.width(), bitmap.height());
                    store.overlays.insert(key, Arc::new(bitmap));
                }
                Err(e) => log::warn!("overlay {key} unavailable: {e}"),
            }
        }
        store
    }

    pub fn overlay(&self, key: &OverlayKey) -> Result<Overlay, AssetError> {
        self.overlays
            .get(key)
            .map(|bitmap| Overlay {
                key: key.clone(),
                bitmap: Arc::clone(bitmap),
            })
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }

    /// Fetch, resize and (for dark icons) invert a weather icon. One attempt, no retry.
    pub fn resolve_weather_icon(&self, locator: &str) -> Result<Overlay, AssetError> {
        let bytes = self.icons.fetch(locator)?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            locator: locator.to_string(),
            source,
        })?;

        let mut icon = imageops::resize(
            &decoded.to_rgba8(),
            WEATHER_ICON_SIZE,
            WEATHER_ICON_SIZE,
            FilterType::Lanczos3,
        );
        if is_dark_icon(locator) {
            imageops::invert(&mut icon);
        }

        Ok(Overlay {
            key: OverlayKey::WeatherIcon(locator.to_string()),
            bitmap: Arc::new(flatten(&icon)),
        })
    }
}

pub fn is_dark_icon(locator: &str) -> bool {
    DARK_ICON_SUFFIXES.iter().any(|suffix| locator.ends_with(suffix))
}

fn load_png(path: &Path) -> Result<Frame, image::ImageError> {
    Ok(flatten(&image::open(path)?.to_rgba8()))
}

/// Composite RGBA over black: the panel has no alpha
fn flatten(image: &RgbaImage) -> Frame {
    let size = Size::new(image.width(), image.height());
    let mut pixels = Vec::with_capacity(size.buffer_size());
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        pixels.extend_from_slice(&[scale(r), scale(g), scale(b)]);
    }
    // length always matches width * height * 3
    Frame::from_rgb(size, pixels).unwrap_or_else(|| Frame::new(size))
}

/// Fetches `http(s)://` locators over the network and treats anything else as a path
/// relative to the asset directory
pub struct LocatorIconSource {
    agent: ureq::Agent,
    base_dir: PathBuf,
}

impl LocatorIconSource {
    pub fn new(base_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_dir: base_dir.into(),
        }
    }

    fn fetch_http(&self, locator: &str) -> Result<Vec<u8>, AssetError> {
        let fetch_error = |reason: String| AssetError::Fetch {
            locator: locator.to_string(),
            reason,
        };

        let response = self
            .agent
            .get(locator)
            .call()
            .map_err(|e| fetch_error(e.to_string()))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes)
    }

    /// Resolve a local locator, refusing anything that leaves the asset directory
    fn local_path(&self, locator: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(locator);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(AssetError::Fetch {
                locator: locator.to_string(),
                reason: "local icons must be relative paths inside the asset directory"
                    .to_string(),
            });
        }
        Ok(self.base_dir.join(relative))
    }
}

impl IconSource for LocatorIconSource {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, AssetError> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return self.fetch_http(locator);
        }

        let path = self.local_path(locator)?;
        std::fs::read(&path).map_err(|e| AssetError::Fetch {
            locator: locator.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgb;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    struct StaticIcons(Vec<u8>);

    impl IconSource for StaticIcons {
        fn fetch(&self, _locator: &str) -> Result<Vec<u8>, AssetError> {
            Ok(self.0.clone())
        }
    }

    fn white_png(size: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_transit_priority_mapping() {
        assert_eq!(OverlayKey::for_transit_priority(Some(1)), OverlayKey::GreenLight);
        assert_eq!(OverlayKey::for_transit_priority(Some(2)), OverlayKey::YellowLight);
        assert_eq!(OverlayKey::for_transit_priority(Some(3)), OverlayKey::RedLight);
        assert_eq!(OverlayKey::for_transit_priority(None), OverlayKey::RedLight);
    }

    #[test]
    fn test_dark_icon_detection() {
        assert!(is_dark_icon("http://openweathermap.org/img/wn/50d.png"));
        assert!(is_dark_icon("icons/01n.png"));
        assert!(!is_dark_icon("http://openweathermap.org/img/wn/01d.png"));
    }

    #[test]
    fn test_missing_overlay_is_not_found() {
        let store = AssetStore::new(Box::new(StaticIcons(Vec::new())));
        let err = store.overlay(&OverlayKey::Thermometer).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(ref key) if key == "thermometer"));
    }

    #[test]
    fn test_weather_icon_is_resized() {
        let store = AssetStore::new(Box::new(StaticIcons(white_png(50))));
        let overlay = store.resolve_weather_icon("http://x/10d.png").unwrap();
        assert_eq!(overlay.bitmap.size(), Size::new(WEATHER_ICON_SIZE, WEATHER_ICON_SIZE));
        let center = overlay.bitmap.pixel(18, 18).unwrap();
        assert!(center.r >= 250 && center.g >= 250 && center.b >= 250);
    }

    #[test]
    fn test_dark_weather_icon_is_inverted() {
        let store = AssetStore::new(Box::new(StaticIcons(white_png(36))));
        let overlay = store.resolve_weather_icon("http://x/50n.png").unwrap();
        let px = overlay.bitmap.pixel(10, 10).unwrap();
        assert!(px.r <= 5 && px.g <= 5 && px.b <= 5);
    }

    #[test]
    fn test_garbage_icon_is_decode_error() {
        let store = AssetStore::new(Box::new(StaticIcons(b"not a png".to_vec())));
        let err = store.resolve_weather_icon("http://x/10d.png").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    fn icon_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("matrix-ticker-icons-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(dir.join("wn")).unwrap();
        dir
    }

    #[test]
    fn test_local_locator_reads_from_asset_dir() {
        let dir = icon_dir("read");
        let png = white_png(40);
        std::fs::write(dir.join("wn").join("10d.png"), &png).unwrap();

        let source = LocatorIconSource::new(&dir, Duration::from_secs(1));
        assert_eq!(source.fetch("wn/10d.png").unwrap(), png);
        assert_eq!(source.fetch("./wn/10d.png").unwrap(), png);

        let store = AssetStore::new(Box::new(source));
        let overlay = store.resolve_weather_icon("wn/10d.png").unwrap();
        assert_eq!(overlay.bitmap.width(), WEATHER_ICON_SIZE);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_local_icon_is_fetch_error() {
        let dir = icon_dir("missing");
        let source = LocatorIconSource::new(&dir, Duration::from_secs(1));
        let err = source.fetch("wn/nope.png").unwrap_err();
        assert!(matches!(err, AssetError::Fetch { ref locator, .. } if locator == "wn/nope.png"));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_locator_cannot_leave_asset_dir() {
        let dir = icon_dir("escape");
        // a real file one level up that must stay unreachable
        let outside = dir.with_extension("png");
        std::fs::write(&outside, white_png(4)).unwrap();
        let sibling = format!("../{}", outside.file_name().unwrap().to_string_lossy());

        let source = LocatorIconSource::new(&dir, Duration::from_secs(1));
        for locator in [sibling.as_str(), "wn/../../x.png", outside.to_str().unwrap()] {
            assert!(
                matches!(source.fetch(locator), Err(AssetError::Fetch { .. })),
                "{locator} escaped the asset directory"
            );
        }

        std::fs::remove_file(outside).ok();
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_flatten_premultiplies_alpha() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 0]));
        assert_eq!(flatten(&image).pixel(0, 0), Some(Rgb::BLACK));
    }
}
