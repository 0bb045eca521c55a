//! Per-frame orchestration and the win/respawn state machine
//!
//! Tick order: map input → step physics → check goal → advance respawn
//! timer → snapshot. Input is ignored while `Won`, so the player cannot
//! fight the respawn.

use glam::Vec3;

use super::goal::GoalMonitor;
use super::input::{ControlMode, InputGains, InputMapper, InputSample};
use super::maze::{GoalZone, MazeLayout};
use super::physics::{BodyHandle, PhysicsWorld, Shape};
use super::snapshot::{BodyTransform, Snapshot, StaticView};
use super::state::{GameEvent, GamePhase, RespawnTimer};
use crate::consts::MAX_FRAME_DT;
use crate::error::PhysicsError;
use crate::tuning::Tuning;

/// Owns the world for one play session
#[derive(Debug)]
pub struct GameController {
    layout: MazeLayout,
    tuning: Tuning,
    world: PhysicsWorld,
    mapper: InputMapper,
    ball: BodyHandle,
    start: Vec3,
    goal: GoalZone,
    phase: GamePhase,
    respawn: RespawnTimer,
    events: Vec<GameEvent>,
    frame: u64,
    /// Seconds since the ball last spawned
    run_time: f32,
    wins: u32,
}

impl GameController {
    /// Build the world for `layout`: floor, one box per wall cell, ball at the start
    pub fn new(layout: MazeLayout, tuning: Tuning, mode: ControlMode) -> crate::Result<Self> {
        tuning.validate()?;

        // Layout coordinates assume a floor at y = 0
        let lift = Vec3::Y * tuning.floor_y;
        let mut world = PhysicsWorld::from_tuning(&tuning);
        world.add_static_body(Shape::floor(), lift, tuning.floor_material);
        for wall in layout.wall_positions() {
            world.add_static_body(Shape::unit_cube(), wall + lift, tuning.wall_material);
        }

        let start = layout.start_position() + lift;
        let ball = world.spawn_ball(start);
        let mut goal = layout.goal_zone(tuning.goal_radius);
        goal.center += lift;
        let mapper = InputMapper::new(mode, InputGains::from(&tuning));

        log::info!(
            "Session world ready: {} walls, start {:?}, goal {:?} ({:?} control)",
            layout.wall_count(),
            start,
            goal.center,
            mode
        );

        Ok(Self {
            layout,
            tuning,
            world,
            mapper,
            ball,
            start,
            goal,
            phase: GamePhase::Playing,
            respawn: RespawnTimer::default(),
            events: Vec::new(),
            frame: 0,
            run_time: 0.0,
            wins: 0,
        })
    }

    /// Advance one rendered frame
    pub fn tick(&mut self, samples: &[InputSample], dt: f32) -> Snapshot {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.frame += 1;

        // Drag samples still move the reference while won, only the impulse is dropped
        for &sample in samples {
            let impulse = self.mapper.map(sample);
            if self.phase == GamePhase::Playing && impulse != Vec3::ZERO {
                if let Err(e) = self.world.apply_impulse(self.ball, impulse) {
                    log::error!("Failed to apply input impulse: {e}");
                }
            }
        }

        self.world.step(dt);
        self.run_time += dt;

        let position = self.ball_position();
        // While won the pending respawn brings the ball back
        if self.phase == GamePhase::Playing && position.y < self.tuning.out_of_bounds_y {
            log::warn!("Ball fell out of the maze at {position:?}, respawning");
            self.respawn_ball();
            self.events.push(GameEvent::OutOfBounds);
        } else if GoalMonitor::check_zone(position, &self.goal, self.phase) {
            self.phase = GamePhase::Won;
            self.wins += 1;
            self.respawn.start(self.tuning.respawn_delay);
            self.events.push(GameEvent::Won {
                elapsed: self.run_time,
            });
            log::info!("Goal reached in {:.2}s", self.run_time);
        } else if self.phase == GamePhase::Won && self.respawn.advance(dt) {
            self.respawn_ball();
            self.events.push(GameEvent::Respawned);
            log::info!("Ball respawned at start");
        }

        self.snapshot()
    }

    fn respawn_ball(&mut self) {
        if let Err(e) = self.world.set_body_state(self.ball, self.start, Vec3::ZERO) {
            log::error!("Failed to reset ball, spawning a new one: {e}");
            self.ball = self.world.spawn_ball(self.start);
        }
        self.phase = GamePhase::Playing;
        self.run_time = 0.0;
    }

    /// Teleport the ball (debug/testing); velocity is cleared
    pub fn place_ball(&mut self, position: Vec3) -> Result<(), PhysicsError> {
        self.world.set_body_state(self.ball, position, Vec3::ZERO)
    }

    /// End the session, cancelling a pending respawn
    ///
    /// Returns whether a respawn was pending.
    pub fn teardown(mut self) -> bool {
        let cancelled = self.respawn.cancel();
        if cancelled {
            log::info!("Cancelled pending respawn on teardown");
        }
        log::info!(
            "Session ended after {} frames with {} win(s)",
            self.frame,
            self.wins
        );
        cancelled
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ball: self
                .world
                .ball_transform()
                .unwrap_or_else(|| BodyTransform::at(self.start)),
            goal: self.goal,
            phase: self.phase,
            frame: self.frame,
            run_time: self.run_time,
        }
    }

    /// Static colliders for building the scene once
    pub fn static_transforms(&self) -> Vec<StaticView> {
        self.world
            .static_bodies()
            .iter()
            .map(|body| StaticView {
                handle: body.handle,
                shape: body.shape,
                transform: BodyTransform::at(body.position),
            })
            .collect()
    }

    /// Take the queued one-shot events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> ControlMode {
        self.mapper.mode()
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn ball_handle(&self) -> BodyHandle {
        self.ball
    }

    pub fn ball_position(&self) -> Vec3 {
        self.world.body_position(self.ball).unwrap_or(self.start)
    }

    pub fn ball_velocity(&self) -> Vec3 {
        self.world.body_velocity(self.ball).unwrap_or(Vec3::ZERO)
    }

    pub fn start_position(&self) -> Vec3 {
        self.start
    }

    pub fn goal(&self) -> GoalZone {
        self.goal
    }

    pub fn respawn_pending(&self) -> bool {
        self.respawn.is_pending()
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn controller(mode: ControlMode) -> GameController {
        GameController::new(MazeLayout::reference(), Tuning::default(), mode).unwrap()
    }

    fn count_wins(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Won { .. }))
            .count()
    }

    #[test]
    fn test_initial_state() {
        let game = controller(ControlMode::Tilt);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.start_position(), Vec3::new(-3.5, 1.0, -3.5));
        assert_eq!(game.goal().center, Vec3::new(3.5, 0.0, 3.5));
        assert_eq!(game.goal().radius, 0.7);

        let statics = game.static_transforms();
        assert_eq!(statics.len(), 59 + 1);
        assert_eq!(statics[0].shape, Shape::floor());
        assert!(statics[1..].iter().all(|s| s.shape == Shape::unit_cube()));

        let snapshot = game.snapshot();
        assert_eq!(snapshot.ball.position(), Vec3::new(-3.5, 1.0, -3.5));
        assert_eq!(snapshot.frame, 0);
    }

    #[test]
    fn test_dropped_ball_never_wins() {
        let mut game = controller(ControlMode::Tilt);
        let mut events = Vec::new();
        for _ in 0..300 {
            game.tick(&[], DT);
            events.extend(game.drain_events());
        }
        assert!(events.is_empty());
        assert_eq!(game.phase(), GamePhase::Playing);

        let pos = game.ball_position();
        assert_eq!(pos.x, -3.5);
        assert_eq!(pos.z, -3.5);
        assert!((pos.y - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_tilt_moves_ball_along_z() {
        let mut game = controller(ControlMode::Tilt);
        // Let it land first
        for _ in 0..120 {
            game.tick(&[], DT);
        }
        let tilt = [InputSample::Tilt {
            beta: 30.0,
            gamma: 0.0,
        }];
        for _ in 0..20 {
            game.tick(&tilt, DT);
        }
        let vel = game.ball_velocity();
        assert!(vel.z > 0.0);
        assert!(vel.x.abs() < 1e-6);
    }

    #[test]
    fn test_drag_moves_ball() {
        let mut game = controller(ControlMode::Drag);
        for _ in 0..120 {
            game.tick(&[], DT);
        }
        game.tick(
            &[
                InputSample::DragStart { x: 0.0, y: 0.0 },
                InputSample::DragMove { x: 3.0, y: 0.0 },
            ],
            DT,
        );
        assert!(game.ball_velocity().x > 0.1);

        // Tilt readings do nothing in drag mode
        let mut game = controller(ControlMode::Drag);
        for _ in 0..120 {
            game.tick(&[InputSample::Tilt { beta: 45.0, gamma: 45.0 }], DT);
        }
        assert!(game.ball_velocity().length() < 1e-3);
    }

    #[test]
    fn test_win_signals_once_and_respawns() {
        let mut game = controller(ControlMode::Tilt);
        game.place_ball(Vec3::new(3.4, 0.2, 3.4)).unwrap();

        let snapshot = game.tick(&[], DT);
        assert_eq!(snapshot.phase, GamePhase::Won);
        let events = game.drain_events();
        assert_eq!(count_wins(&events), 1);
        assert!(game.respawn_pending());

        // Still inside the zone: no second win before the respawn
        let mut respawned = false;
        for _ in 0..60 {
            game.tick(&[], DT);
            let events = game.drain_events();
            assert_eq!(count_wins(&events), 0);
            if events.contains(&GameEvent::Respawned) {
                respawned = true;
                break;
            }
        }
        assert!(respawned);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.ball_position(), game.start_position());
        assert_eq!(game.ball_velocity(), Vec3::ZERO);
        assert_eq!(game.wins(), 1);
    }

    #[test]
    fn test_respawn_waits_for_delay() {
        let mut game = controller(ControlMode::Tilt);
        game.place_ball(Vec3::new(3.4, 0.2, 3.4)).unwrap();
        game.tick(&[], DT);

        // 0.5 s at 60 fps: still won after 25 frames, back to playing by 31
        for _ in 0..25 {
            game.tick(&[], DT);
        }
        assert_eq!(game.phase(), GamePhase::Won);
        for _ in 0..6 {
            game.tick(&[], DT);
        }
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_input_ignored_while_won() {
        let mut game = controller(ControlMode::Tilt);
        game.place_ball(Vec3::new(3.4, 0.2, 3.4)).unwrap();
        game.tick(&[], DT);
        assert_eq!(game.phase(), GamePhase::Won);

        let before = game.ball_position();
        let tilt = [InputSample::Tilt {
            beta: 60.0,
            gamma: -60.0,
        }];
        for _ in 0..10 {
            game.tick(&tilt, DT);
        }
        let after = game.ball_position();
        assert!((after.x - before.x).abs() < 1e-4);
        assert!((after.z - before.z).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_bounds_respawns() {
        let mut game = controller(ControlMode::Tilt);
        game.place_ball(Vec3::new(20.0, -30.0, 20.0)).unwrap();
        game.tick(&[], DT);
        assert_eq!(game.drain_events(), vec![GameEvent::OutOfBounds]);
        assert_eq!(game.ball_position(), game.start_position());
    }

    #[test]
    fn test_fall_while_won_waits_for_respawn() {
        let mut game = controller(ControlMode::Tilt);
        game.place_ball(Vec3::new(3.4, 0.2, 3.4)).unwrap();
        game.tick(&[], DT);
        assert_eq!(count_wins(&game.drain_events()), 1);

        game.place_ball(Vec3::new(3.4, -30.0, 3.4)).unwrap();
        game.tick(&[], DT);
        assert!(game.drain_events().is_empty());
        assert_eq!(game.phase(), GamePhase::Won);

        let mut events = Vec::new();
        for _ in 0..40 {
            game.tick(&[], DT);
            events.extend(game.drain_events());
            if game.phase() == GamePhase::Playing {
                break;
            }
        }
        assert_eq!(events, vec![GameEvent::Respawned]);
        assert_eq!(game.ball_position(), game.start_position());
    }

    #[test]
    fn test_raised_floor() {
        let tuning = Tuning {
            floor_y: 2.5,
            ..Default::default()
        };
        let mut game =
            GameController::new(MazeLayout::reference(), tuning, ControlMode::Tilt).unwrap();
        assert_eq!(game.start_position(), Vec3::new(-3.5, 3.5, -3.5));
        assert_eq!(game.goal().center, Vec3::new(3.5, 2.5, 3.5));

        let statics = game.static_transforms();
        assert_eq!(statics[0].transform.position(), Vec3::new(0.0, 2.5, 0.0));
        assert_eq!(statics[1].transform.position().y, 3.0);

        for _ in 0..300 {
            game.tick(&[], DT);
        }
        assert!(game.drain_events().is_empty());
        let pos = game.ball_position();
        assert!((pos.y - 2.7).abs() < 1e-3);
        assert_eq!((pos.x, pos.z), (-3.5, -3.5));
    }

    #[test]
    fn test_teardown_cancels_pending_respawn() {
        let mut game = controller(ControlMode::Tilt);
        assert!(!controller(ControlMode::Tilt).teardown());

        game.place_ball(Vec3::new(3.4, 0.2, 3.4)).unwrap();
        game.tick(&[], DT);
        assert!(game.respawn_pending());
        assert!(game.teardown());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            goal_radius: -1.0,
            ..Default::default()
        };
        let result = GameController::new(MazeLayout::reference(), tuning, ControlMode::Tilt);
        assert!(matches!(result, Err(crate::Error::Tuning(_))));
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let mut game = controller(ControlMode::Tilt);
        let snapshot = game.tick(&[], 5.0);
        assert!((snapshot.run_time - MAX_FRAME_DT).abs() < 1e-6);
        let snapshot = game.tick(&[], f32::NAN);
        assert!((snapshot.run_time - MAX_FRAME_DT).abs() < 1e-6);
    }
}
