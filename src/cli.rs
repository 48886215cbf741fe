// cli.rs - Command-line interface configuration
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::core::Rotation;
use crate::display::DeviceConfig;
use crate::error::DeviceError;
use crate::router::positive_secs;

#[derive(Parser, Debug, Clone)]
#[command(name = "matrix-ticker")]
#[command(about = "Render bus messages onto an RGB LED matrix", long_about = None)]
pub struct Cli {
    /// Rows per panel
    #[arg(long = "led-rows", default_value_t = 32)]
    pub rows: u32,

    /// Columns per panel
    #[arg(long = "led-cols", default_value_t = 32)]
    pub cols: u32,

    /// Number of parallel chains
    #[arg(long = "led-parallel", default_value_t = 1)]
    pub parallel: u32,

    /// Number of daisy-chained panels
    #[arg(long = "led-chain", default_value_t = 2)]
    pub chain: u32,

    /// Show refresh rate
    #[arg(long = "led-show-refresh", default_value_t = false)]
    pub show_refresh: bool,

    /// Matrix has inverse colors
    #[arg(long = "led-inverse", default_value_t = false)]
    pub inverse_colors: bool,

    /// Don't use hardware pin-pulse generation
    #[arg(long = "led-no-hardware-pulse", default_value_t = true, action = ArgAction::Set)]
    pub disable_hardware_pulsing: bool,

    /// Brightness (0-100)
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub brightness: u8,

    /// Name of the GPIO mapping
    #[arg(long = "led-gpio-mapping", default_value = "adafruit-hat")]
    pub hardware_mapping: String,

    /// PWM bit depth
    #[arg(long = "pwm-bits", default_value_t = 5)]
    pub pwm_bits: u8,

    /// PWM low-bit duration in nanoseconds
    #[arg(long = "pwm-lsb-nanoseconds", default_value_t = 70)]
    pub pwm_lsb_nanoseconds: u32,

    /// Rotation angle: 0, 90, 180 or 270
    #[arg(long, default_value = "0", value_parser = parse_rotation)]
    pub rotate: Rotation,

    /// Save every composed frame to this PNG
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Default display time per message, in seconds
    #[arg(long, default_value = "5", value_parser = parse_duration)]
    pub duration: Duration,

    /// Directory holding the overlay icons
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// TrueType font for message text
    #[arg(long, default_value = "assets/Agane_55.ttf")]
    pub font: PathBuf,

    /// Bus configuration file
    #[arg(long, default_value = "configs/pubnub.json")]
    pub config: PathBuf,

    /// Write what the panel shows to this PNG (preview panel)
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

fn parse_rotation(s: &str) -> Result<Rotation, String> {
    let degrees: u16 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    Rotation::from_degrees(degrees)
        .ok_or_else(|| format!("rotation must be 0, 90, 180 or 270, got {degrees}"))
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{s}` is not a number of seconds"))?;
    positive_secs(secs).ok_or_else(|| format!("duration must be positive and finite, got {s}"))
}

impl Cli {
    pub fn device_config(&self) -> Result<DeviceConfig, DeviceError> {
        let config = DeviceConfig {
            rows: self.rows,
            cols: self.cols,
            chain_length: self.chain,
            parallel: self.parallel,
            brightness: self.brightness,
            hardware_mapping: self.hardware_mapping.clone(),
            pwm_bits: self.pwm_bits,
            pwm_lsb_nanoseconds: self.pwm_lsb_nanoseconds,
            disable_hardware_pulsing: self.disable_hardware_pulsing,
            inverse_colors: self.inverse_colors,
            show_refresh_rate: self.show_refresh,
            rotation: self.rotate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn display_duration(&self) -> Duration {
        self.duration
    }
}
