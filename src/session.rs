//! Play session: input channel and frame pacing
//!
//! The host's input callbacks hold [`InputSender`]s and push raw samples at
//! any time; the session drains them at the start of every frame. Tilt is
//! state (the latest reading keeps pushing every frame, like a held tilt),
//! drag events are discrete and all of them are applied.
//!
//! Ending the session drops the receiving side, after which every send fails
//! with [`SessionError::SessionClosed`]: the host's cue to release its
//! listeners.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::SessionError;
use crate::sim::{
    ControlMode, GameController, GameEvent, InputSample, MazeLayout, Snapshot, StaticView,
};
use crate::tuning::Tuning;

/// Cloneable handle for pushing input into a running session
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputSample>,
}

impl InputSender {
    pub fn send(&self, sample: InputSample) -> Result<(), SessionError> {
        self.tx.send(sample).map_err(|err| {
            log::warn!("Session closed, ignoring {:?}", err.0);
            SessionError::SessionClosed
        })
    }
}

/// Totals reported when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub wins: u32,
    /// A respawn was pending and got cancelled
    pub cancelled_respawn: bool,
}

/// One play-through of a maze
#[derive(Debug)]
pub struct Session {
    controller: GameController,
    rx: Receiver<InputSample>,
    /// Latest orientation reading
    tilt: Option<InputSample>,
    /// Samples handed to the current tick
    batch: Vec<InputSample>,
}

impl Session {
    /// Build the world and open the input channel
    pub fn start(
        layout: MazeLayout,
        tuning: Tuning,
        mode: ControlMode,
    ) -> crate::Result<(Self, InputSender)> {
        let controller = GameController::new(layout, tuning, mode)?;
        let (tx, rx) = mpsc::channel();
        log::info!("Session started");
        Ok((
            Self {
                controller,
                rx,
                tilt: None,
                batch: Vec::new(),
            },
            InputSender { tx },
        ))
    }

    /// Drain pending input and advance one frame
    pub fn frame(&mut self, dt: f32) -> Snapshot {
        self.batch.clear();
        loop {
            match self.rx.try_recv() {
                Ok(sample @ InputSample::Tilt { .. }) => self.tilt = Some(sample),
                Ok(sample) => self.batch.push(sample),
                // All senders gone: keep simulating on the last known tilt
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if let Some(tilt) = self.tilt {
            self.batch.insert(0, tilt);
        }
        self.controller.tick(&self.batch, dt)
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    pub fn static_transforms(&self) -> Vec<StaticView> {
        self.controller.static_transforms()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.controller.drain_events()
    }

    /// Tear down; pending respawns are cancelled and senders go dead
    pub fn end(self) -> SessionSummary {
        let Self { controller, rx, .. } = self;
        drop(rx);
        let frames = controller.frame();
        let wins = controller.wins();
        let cancelled_respawn = controller.teardown();
        SessionSummary {
            frames,
            wins,
            cancelled_respawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn start(mode: ControlMode) -> (Session, InputSender) {
        Session::start(MazeLayout::reference(), Tuning::default(), mode).unwrap()
    }

    #[test]
    fn test_latest_tilt_keeps_applying() {
        let (mut session, input) = start(ControlMode::Tilt);
        for _ in 0..120 {
            session.frame(DT);
        }

        input.send(InputSample::Tilt { beta: 0.0, gamma: 10.0 }).unwrap();
        input.send(InputSample::Tilt { beta: 0.0, gamma: 40.0 }).unwrap();
        session.frame(DT);
        let after_one = session.controller().ball_velocity().x;
        assert!(after_one > 0.0);

        // No new readings: the held tilt still pushes
        for _ in 0..10 {
            session.frame(DT);
        }
        assert!(session.controller().ball_velocity().x > after_one);
    }

    #[test]
    fn test_drag_events_all_applied() {
        let (mut session, input) = start(ControlMode::Drag);
        for _ in 0..120 {
            session.frame(DT);
        }

        input.send(InputSample::DragStart { x: 0.0, y: 0.0 }).unwrap();
        input.send(InputSample::DragMove { x: 0.0, y: 2.0 }).unwrap();
        input.send(InputSample::DragMove { x: 0.0, y: 4.0 }).unwrap();
        session.frame(DT);

        // Two moves of 2 units each: 0.4 total, minus a little floor friction
        let vel = session.controller().ball_velocity();
        assert!(vel.z > 0.3, "vz {}", vel.z);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn test_senders_fail_after_end() {
        let (mut session, input) = start(ControlMode::Tilt);
        let other = input.clone();
        session.frame(DT);

        let summary = session.end();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.wins, 0);
        assert!(!summary.cancelled_respawn);
        assert_eq!(
            input.send(InputSample::DragEnd),
            Err(SessionError::SessionClosed)
        );
        assert_eq!(other.send(InputSample::DragEnd), Err(SessionError::SessionClosed));
    }

    #[test]
    fn test_session_survives_dropped_senders() {
        let (mut session, input) = start(ControlMode::Tilt);
        drop(input);
        let snapshot = session.frame(DT);
        assert_eq!(snapshot.phase, GamePhase::Playing);
    }

    #[test]
    fn test_end_cancels_pending_respawn() {
        let (session, _input) = start(ControlMode::Tilt);
        let mut session = session;
        session
            .controller
            .place_ball(Vec3::new(3.4, 0.2, 3.4))
            .unwrap();
        session.frame(DT);
        assert_eq!(session.drain_events().len(), 1);

        let summary = session.end();
        assert_eq!(summary.wins, 1);
        assert!(summary.cancelled_respawn);
    }
}
