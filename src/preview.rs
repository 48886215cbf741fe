// preview.rs - Software stand-in for the LED panel. Applies the panel's colour
// transforms and optionally writes every blit to a PNG.

use std::path::PathBuf;

use crate::compositor::persist_frame;
use crate::core::Frame;
use crate::display::DeviceConfig;
use crate::error::DeviceError;
use crate::traits::{Panel, PanelDriver};

pub struct PreviewDriver {
    output: Option<PathBuf>,
}

impl PreviewDriver {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl PanelDriver for PreviewDriver {
    fn open(&mut self, config: &DeviceConfig) -> Result<Box<dyn Panel>, DeviceError> {
        config.validate()?;
        log::debug!(
            "preview panel {}x{} chain={} parallel={} mapping={} pwm={}bits/{}ns \
             pulsing={} refresh={}",
            config.cols,
            config.rows,
            config.chain_length,
            config.parallel,
            config.hardware_mapping,
            config.pwm_bits,
            config.pwm_lsb_nanoseconds,
            !config.disable_hardware_pulsing,
            config.show_refresh_rate,
        );
        Ok(Box::new(PreviewPanel {
            output: self.output.clone(),
            brightness: config.brightness,
            inverse_colors: config.inverse_colors,
            released: false,
        }))
    }
}

pub struct PreviewPanel {
    output: Option<PathBuf>,
    brightness: u8,
    inverse_colors: bool,
    released: bool,
}

impl PreviewPanel {
    /// What the LEDs would show for `frame`
    pub fn shade(&self, frame: &Frame) -> Frame {
        let brightness = self.brightness;
        let inverse = self.inverse_colors;
        frame.map_pixels(|c| {
            let c = if inverse { c.inverted() } else { c };
            c.dimmed(brightness)
        })
    }
}

impl Panel for PreviewPanel {
    fn blit(&mut self, frame: &Frame) -> Result<(), DeviceError> {
        if self.released {
            return Err(DeviceError::Released);
        }
        let Some(path) = &self.output else {
            return Ok(());
        };
        persist_frame(&self.shade(frame), path).map_err(|e| DeviceError::Blit(e.to_string()))
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        self.released = true;
        Ok(())
    }
}
