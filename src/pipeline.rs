// pipeline.rs - Orchestrator: Router -> Compositor -> Display Session Manager,
// one message at a time

use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::compositor::{persist_frame, Compositor, PlacedOverlay};
use crate::core::Size;
use crate::display::{DisplaySessionManager, PlayOutcome};
use crate::error::{DeviceError, PipelineError};
use crate::router::{Metadata, Router};
use crate::source::Envelope;

pub struct Orchestrator {
    router: Router,
    compositor: Compositor,
    sessions: DisplaySessionManager,
    canvas: Size,
    /// Where composed frames are written before playback, if anywhere
    frame_path: Option<PathBuf>,
    player: Option<JoinHandle<()>>,
}

impl Orchestrator {
    pub fn new(router: Router, compositor: Compositor, sessions: DisplaySessionManager) -> Self {
        let canvas = sessions.config().canvas_size();
        Self {
            router,
            compositor,
            sessions,
            canvas,
            frame_path: None,
            player: None,
        }
    }

    pub fn with_frame_path(mut self, path: Option<PathBuf>) -> Self {
        self.frame_path = path;
        self
    }

    pub fn sessions(&self) -> &DisplaySessionManager {
        &self.sessions
    }

    /// Handle one message, logging any failure. Never panics on a bad message.
    pub fn handle_message(&mut self, kind: &str, metadata: &Metadata, payload: &str) {
        match self.try_handle_message(kind, metadata, payload) {
            Ok(id) => log::info!("{kind} message on panel (session {id})"),
            Err(e @ PipelineError::UnsupportedMessageKind(_)) => {
                log::warn!("dropping message: {e}")
            }
            Err(e @ PipelineError::Device(_)) => {
                log::error!("display failed for {kind} message: {e}")
            }
            Err(e) => log::warn!("dropping {kind} message: {e}"),
        }
    }

    pub fn handle_envelope(&mut self, envelope: &Envelope) {
        self.handle_message(envelope.kind(), &envelope.user_metadata, &envelope.message);
    }

    /// Handle one message and report the outcome. Returns the id of the session
    /// now playing.
    ///
    /// Routing and compositing run before the live session is touched, so a
    /// message that fails either step leaves the panel showing what it showed.
    /// The old session is always fully closed before the next one opens.
    pub fn try_handle_message(
        &mut self,
        kind: &str,
        metadata: &Metadata,
        payload: &str,
    ) -> Result<u64, PipelineError> {
        let request = self.router.route(kind, metadata, payload)?;
        let spec = request.kind().text_layout();
        let overlay = request.overlay().map(|o| PlacedOverlay {
            bitmap: o.bitmap.as_ref(),
            slot: request.kind().overlay_slot(),
        });
        let frame = self.compositor.compose(&spec, request.lines(), overlay, self.canvas)?;

        if let Some(path) = &self.frame_path {
            if let Err(e) = persist_frame(&frame, path) {
                log::warn!("could not save frame to {}: {e}", path.display());
            }
        }

        self.stop_playback();
        let mut session = self.sessions.open()?.with_rotation(request.rotation());
        let id = session.id();
        let duration = request.display_duration();

        let player = thread::Builder::new()
            .name(format!("display-session-{id}"))
            .spawn(move || {
                match session.play(frame, duration) {
                    Ok(PlayOutcome::Completed) => {
                        log::debug!("session {id}: finished after {duration:?}")
                    }
                    Ok(PlayOutcome::Preempted) => log::debug!("session {id}: preempted"),
                    Err(e) => log::error!("session {id}: {e}"),
                }
                if let Err(e) = session.close() {
                    log::warn!("session {id}: {e}");
                }
            })
            .map_err(DeviceError::Spawn)?;

        self.player = Some(player);
        Ok(id)
    }

    /// Preempt the live session and wait for its player thread to exit
    pub fn stop_playback(&mut self) {
        self.sessions.preempt();
        self.join_player();
    }

    /// Let the current session play out, then return
    pub fn wait_idle(&mut self) {
        self.join_player();
    }

    fn join_player(&mut self) {
        if let Some(player) = self.player.take() {
            if player.join().is_err() {
                log::error!("display player thread panicked");
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop_playback();
    }
}
