//! Async driver for a player session
//!
//! Inputs from any task are queued on an unbounded channel and applied one
//! at a time on the session task, interleaved with a periodic timer tick
//! that drives the load timeout and the overlay's inactivity timer.

use crate::player::{MediaEvent, ModalOverlay, PlaybackController, PlayerCommand, PlayerInput};
use crate::utils::error::{Result, ShowreelError};
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Input to a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    /// Addressed to the embedded player
    Player(PlayerInput),

    /// Open the overlay on the embedded player's current item
    OpenOverlay,

    CloseOverlay,

    /// Key pressed while the overlay has focus
    OverlayKey(String),

    /// Pointer moved over the overlay
    OverlayPointer,

    /// Callback from the overlay's surface
    OverlayMedia(MediaEvent),

    /// Stop the session
    Shutdown,
}

/// The embedded player and its overlay
pub struct PlayerSession {
    pub controller: PlaybackController,
    pub overlay: ModalOverlay,
}

impl PlayerSession {
    pub fn new(controller: PlaybackController, overlay: ModalOverlay) -> Self {
        Self { controller, overlay }
    }

    /// Apply one input. Returns `false` once the session should stop.
    pub fn dispatch(&mut self, input: SessionInput, now: Instant) -> Result<bool> {
        match input {
            SessionInput::Player(input) => self.controller.dispatch(input)?,
            SessionInput::OpenOverlay => match self.controller.current_item() {
                Some(item) => self.overlay.open(item, now),
                None => debug!("Nothing to open in the overlay"),
            },
            SessionInput::CloseOverlay => self.overlay.close(),
            SessionInput::OverlayKey(key) => {
                self.overlay.on_key(&key, now);
            }
            SessionInput::OverlayPointer => self.overlay.on_pointer_activity(now),
            SessionInput::OverlayMedia(event) => self.overlay.on_media_event(&event, now),
            SessionInput::Shutdown => return Ok(false),
        }

        Ok(true)
    }

    /// Advance both timers
    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        self.overlay.tick(now);
    }
}

/// Sends inputs to a running session
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<SessionInput>,
}

impl PlayerHandle {
    pub fn send(&self, input: SessionInput) -> Result<()> {
        self.tx
            .send(input)
            .map_err(|_| ShowreelError::Internal("player session has stopped".to_string()))
    }

    pub fn command(&self, command: PlayerCommand) -> Result<()> {
        self.send(SessionInput::Player(PlayerInput::Command(command)))
    }

    pub fn media_event(&self, event: MediaEvent) -> Result<()> {
        self.send(SessionInput::Player(PlayerInput::Media(event)))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionInput::Shutdown)
    }
}

/// Run `session` on a new task
///
/// The task ends on [`SessionInput::Shutdown`] or when every handle is
/// dropped, and hands the session back.
pub fn spawn_session(session: PlayerSession, tick_interval: Duration) -> (PlayerHandle, JoinHandle<PlayerSession>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_event_loop(session, rx, tick_interval));
    (PlayerHandle { tx }, task)
}

pub async fn run_event_loop(
    mut session: PlayerSession,
    mut rx: mpsc::UnboundedReceiver<SessionInput>,
    tick_interval: Duration,
) -> PlayerSession {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Player session started");

    loop {
        tokio::select! {
            input = rx.recv() => match input {
                Some(input) => match session.dispatch(input, now()) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => warn!("Player input rejected: {}", e),
                },
                None => break,
            },
            _ = ticker.tick() => session.tick(now()),
        }
    }

    info!("Player session stopped");
    session
}

/// Current time on the runtime's clock, so paused test clocks apply
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
