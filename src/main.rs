use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use matrix_ticker::assets::{AssetStore, LocatorIconSource};
use matrix_ticker::cli::Cli;
use matrix_ticker::compositor::Compositor;
use matrix_ticker::config::BusConfig;
use matrix_ticker::display::DisplaySessionManager;
use matrix_ticker::font::{FontdueGlyphs, UnavailableGlyphs};
use matrix_ticker::logging;
use matrix_ticker::pipeline::Orchestrator;
use matrix_ticker::preview::PreviewDriver;
use matrix_ticker::router::Router;
use matrix_ticker::source::{ChannelFilter, JsonLinesSource};
use matrix_ticker::traits::GlyphSource;

// === Constants ===

const ICON_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let bus = BusConfig::load_or_default(&cli.config);
    if bus.has_credentials() {
        log::info!("bus credentials loaded for channels {:?}", bus.channels);
    } else {
        log::warn!("no bus credentials; the bus client will fail to authenticate");
    }

    let device = cli.device_config().context("invalid device flags")?;

    // A broken font is a per-message render failure, not a startup failure
    let glyphs: Arc<dyn GlyphSource> = match FontdueGlyphs::load(&cli.font) {
        Ok(glyphs) => Arc::new(glyphs),
        Err(e) => {
            log::error!("{e}; every render will fail until the font is fixed");
            Arc::new(UnavailableGlyphs::new(e.to_string()))
        }
    };

    let icons = LocatorIconSource::new(&cli.assets, ICON_FETCH_TIMEOUT);
    let assets = Arc::new(AssetStore::load_dir(&cli.assets, Box::new(icons)));

    let router = Router::new(assets, device.rotation, cli.display_duration());
    let driver = PreviewDriver::new(cli.preview.clone());
    let sessions = DisplaySessionManager::new(Box::new(driver), device);
    let mut orchestrator = Orchestrator::new(router, Compositor::new(glyphs), sessions)
        .with_frame_path(cli.image.clone());

    let filter = ChannelFilter::new(bus.channels.clone());
    log::info!(" [*] Waiting for messages on {:?}. To exit press CTRL+C", bus.channels);

    for envelope in JsonLinesSource::new(io::stdin().lock()) {
        if !filter.accepts(&envelope) {
            log::debug!("ignoring message on channel {:?}", envelope.channel);
            continue;
        }
        log::info!("received {} message", envelope.kind());
        orchestrator.handle_envelope(&envelope);
    }

    log::info!("inbound channel closed; waiting for the panel to go idle");
    orchestrator.wait_idle();
    Ok(())
}
