use crate::core::Frame;
use crate::display::DeviceConfig;
use crate::error::DeviceError;

/// Open handle to the physical panel
pub trait Panel: Send {
    /// Push a full frame to the panel; the frame is already rotated
    fn blit(&mut self, frame: &Frame) -> Result<(), DeviceError>;

    /// Release the underlying device; the handle is not used afterwards
    fn release(&mut self) -> Result<(), DeviceError>;
}

/// Opens panels from a device configuration
pub trait PanelDriver: Send {
    fn open(&mut self, config: &DeviceConfig) -> Result<Box<dyn Panel>, DeviceError>;
}
