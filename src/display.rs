// display.rs - Display session manager: the panel's busy/idle lifecycle
//
// A session moves `Idle -> Opening -> Playing -> Closed`; preemption jumps from
// `Opening` or `Playing` straight to `Closed`. The panel handle lives behind the
// session lock, so `preempt` releases it directly while the cancel channel wakes a
// blocked `play`.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::core::{Frame, Rotation, Size};
use crate::error::DeviceError;
use crate::traits::{Panel, PanelDriver};

/// Panel geometry and driver tuning, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub rows: u32,
    pub cols: u32,
    pub chain_length: u32,
    pub parallel: u32,
    /// 0-100
    pub brightness: u8,
    pub hardware_mapping: String,
    pub pwm_bits: u8,
    pub pwm_lsb_nanoseconds: u32,
    pub disable_hardware_pulsing: bool,
    pub inverse_colors: bool,
    pub show_refresh_rate: bool,
    pub rotation: Rotation,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 32,
            chain_length: 2,
            parallel: 1,
            brightness: 90,
            hardware_mapping: "adafruit-hat".to_string(),
            pwm_bits: 5,
            pwm_lsb_nanoseconds: 70,
            disable_hardware_pulsing: true,
            inverse_colors: false,
            show_refresh_rate: false,
            rotation: Rotation::Deg0,
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.rows == 0 || self.cols == 0 || self.chain_length == 0 || self.parallel == 0 {
            return Err(DeviceError::InvalidConfig(
                "rows, cols, chain and parallel must be non-zero".to_string(),
            ));
        }
        if self.brightness > 100 {
            return Err(DeviceError::InvalidConfig(format!(
                "brightness {} outside 0-100",
                self.brightness
            )));
        }
        if !(1..=11).contains(&self.pwm_bits) {
            return Err(DeviceError::InvalidConfig(format!(
                "pwm bits {} outside 1-11",
                self.pwm_bits
            )));
        }
        Ok(())
    }

    /// Canvas frames are composed on. Panels chain horizontally and parallel chains
    /// stack; a quarter-turn rotation swaps the axes so the rotated frame fits the panel.
    pub fn canvas_size(&self) -> Size {
        let size = Size::new(self.cols * self.chain_length, self.rows * self.parallel);
        match self.rotation {
            Rotation::Deg0 | Rotation::Deg180 => size,
            Rotation::Deg90 | Rotation::Deg270 => Size::new(size.height, size.width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Opening,
    Playing,
    Closed,
}

/// How a `play` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    Preempted,
}

/// Lifecycle state plus the panel handle. One lock guards both, so a close can
/// never interleave with a blit.
struct SessionInner {
    state: SessionState,
    panel: Option<Box<dyn Panel>>,
}

/// State shared between the manager and whoever holds the session
struct SessionShared {
    id: u64,
    inner: Mutex<SessionInner>,
}

impl SessionShared {
    fn new(id: u64, panel: Box<dyn Panel>) -> Self {
        Self {
            id,
            inner: Mutex::new(SessionInner {
                state: SessionState::Opening,
                panel: Some(panel),
            }),
        }
    }

    fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Release the panel if still held and mark the session closed
    fn close(&self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        let result = match inner.panel.take() {
            Some(mut panel) => panel.release(),
            None => Ok(()),
        };
        if inner.state != SessionState::Closed {
            inner.state = SessionState::Closed;
            log::debug!("session {}: closed", self.id);
        }
        result
    }
}

/// One hand-off of frames to the panel. Dropping a session closes it.
pub struct DisplaySession {
    shared: Arc<SessionShared>,
    cancel: Receiver<()>,
    rotation: Rotation,
}

impl DisplaySession {
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Rotation applied to frames on blit, overriding the device default
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Blit `frame` and block for `duration` or until preempted. A preempted
    /// session is closed before this returns.
    pub fn play(&mut self, frame: Frame, duration: Duration) -> Result<PlayOutcome, DeviceError> {
        let rotated = frame.rotated(self.rotation);
        let cancelled = !matches!(self.cancel.try_recv(), Err(TryRecvError::Empty));

        let blitted = {
            let mut inner = self.shared.inner.lock();
            if cancelled || inner.state != SessionState::Opening {
                None
            } else {
                inner.state = SessionState::Playing;
                let result = match inner.panel.as_mut() {
                    Some(panel) => panel.blit(&rotated),
                    None => Err(DeviceError::Released),
                };
                Some(result)
            }
        };

        match blitted {
            None => {
                self.close()?;
                return Ok(PlayOutcome::Preempted);
            }
            Some(Err(e)) => {
                if let Err(close_err) = self.close() {
                    log::warn!("session {}: close after failed blit: {close_err}", self.id());
                }
                return Err(e);
            }
            Some(Ok(())) => {}
        }
        log::debug!("session {}: playing for {:?}", self.id(), duration);

        match self.cancel.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(PlayOutcome::Completed),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.close()?;
                Ok(PlayOutcome::Preempted)
            }
        }
    }

    /// Release the panel. Safe to call any number of times.
    pub fn close(&mut self) -> Result<(), DeviceError> {
        self.shared.close()
    }
}

impl Drop for DisplaySession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("session {}: release failed: {e}", self.id());
        }
    }
}

/// Manager-side view of the live session
struct ActiveSession {
    shared: Arc<SessionShared>,
    cancel: Sender<()>,
}

pub struct DisplaySessionManager {
    driver: Box<dyn PanelDriver>,
    config: DeviceConfig,
    active: Option<ActiveSession>,
    next_id: u64,
}

impl DisplaySessionManager {
    pub fn new(driver: Box<dyn PanelDriver>, config: DeviceConfig) -> Self {
        Self {
            driver,
            config,
            active: None,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// State of the most recent session, `Idle` if none was ever opened
    pub fn state(&self) -> SessionState {
        self.active
            .as_ref()
            .map_or(SessionState::Idle, |active| active.shared.state())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), SessionState::Opening | SessionState::Playing)
    }

    /// End the live session, if any. The panel is released before this returns,
    /// whether or not the session ever started playing.
    pub fn preempt(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if active.shared.state() == SessionState::Closed {
            return;
        }
        log::info!("preempting session {}", active.shared.id);
        // wakes a blocked `play`; full or disconnected means it is already on its way out
        let _ = active.cancel.try_send(());
        if let Err(e) = active.shared.close() {
            log::warn!("session {}: release failed: {e}", active.shared.id);
        }
    }

    /// Open the panel for a new session. Fails with `Busy` while another session is live.
    pub fn open(&mut self) -> Result<DisplaySession, DeviceError> {
        if self.is_active() {
            return Err(DeviceError::Busy);
        }

        self.next_id += 1;
        let id = self.next_id;
        let panel = match self.driver.open(&self.config) {
            Ok(panel) => panel,
            Err(e) => {
                self.active = None;
                return Err(e);
            }
        };

        let shared = Arc::new(SessionShared::new(id, panel));
        let (cancel_tx, cancel_rx) = bounded(1);
        self.active = Some(ActiveSession {
            shared: Arc::clone(&shared),
            cancel: cancel_tx,
        });
        log::debug!("session {id}: opened");

        Ok(DisplaySession {
            shared,
            cancel: cancel_rx,
            rotation: self.config.rotation,
        })
    }
}
