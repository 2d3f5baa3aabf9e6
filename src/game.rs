//! The authoritative game tick.
//!
//! `Game::tick` is the only place entities are created. Each running tick
//! does, in order: loss check, ship movement, firing, scheduled spawn,
//! collisions (plus rebirth spawns), then wave completion. Time is passed in
//! as game time so cooldowns stop while the game is paused.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::collision::check_collisions;
use crate::config::Timing;
use crate::entities::{Alien, BossKind, Point, Projectile, Ship};
use crate::events::{GameEvent, ShipSnapshot, Snapshot};
use crate::session::GameSession;
use crate::waves::{SpawnRequest, WaveManager};

/// Player intents for one tick, already decoded from raw input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub move_left: bool,
    pub move_right: bool,
    pub firing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    /// Intro: the ship flies in, nothing spawns.
    Starting,
    Running,
    Lost,
    Won,
}

impl GamePhase {
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Lost | GamePhase::Won)
    }
}

pub struct Game<R> {
    session: Arc<GameSession>,
    ship: Ship,
    waves: WaveManager,
    timing: Timing,
    rng: R,
    phase: GamePhase,
    last_shot: Option<Duration>,
    last_spawn: Duration,
    wave_cleared_at: Option<Duration>,
}

impl<R: Rng> Game<R> {
    /// A fresh game in the `Starting` phase with a new wave manager.
    pub fn new(session: Arc<GameSession>, wave_count: u32, timing: Timing, rng: R) -> Self {
        let ship = Ship::offscreen(session.playfield());
        Self {
            waves: WaveManager::new(wave_count, &timing),
            session,
            ship,
            timing,
            rng,
            phase: GamePhase::Starting,
            last_shot: None,
            last_spawn: Duration::ZERO,
            wave_cleared_at: None,
        }
    }

    /// Skip the intro: ship at rest, phase `Running`, spawn timer starting at `now`.
    pub fn begin(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        self.ship = Ship::at_rest(self.session.playfield());
        self.enter_running(now, events);
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn waves(&self) -> &WaveManager {
        &self.waves
    }

    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    /// Advance the game by one tick at game time `now`.
    pub fn tick(&mut self, intents: Intents, now: Duration, events: &mut Vec<GameEvent>) -> GamePhase {
        match self.phase {
            GamePhase::Starting => self.intro_tick(now, events),
            GamePhase::Running => self.running_tick(intents, now, events),
            GamePhase::Lost | GamePhase::Won => {}
        }
        self.phase
    }

    fn intro_tick(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        let field = *self.session.playfield();
        let arrived = self.ship.fly_in(&field);
        if arrived && now >= self.timing.intro {
            self.enter_running(now, events);
        }
    }

    fn enter_running(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::Running;
        self.last_spawn = now;
        let total_waves = self.waves.total_waves();
        tracing::info!(total_waves, "game running");
        events.push(GameEvent::GameStarted { total_waves });
    }

    fn running_tick(&mut self, intents: Intents, now: Duration, events: &mut Vec<GameEvent>) {
        // ── 1. Loss flag raised by the alien stepper ─────────────────────────
        if self.session.has_lost() {
            self.phase = GamePhase::Lost;
            tracing::info!(wave = self.waves.current_wave(), "game lost");
            events.push(GameEvent::GameLost);
            return;
        }

        // ── 2. Ship ───────────────────────────────────────────────────────────
        let field = *self.session.playfield();
        if intents.move_left {
            self.ship.move_left(&field);
        } else if intents.move_right {
            self.ship.move_right(&field);
        } else {
            self.ship.reset();
        }

        // ── 3. Fire on cooldown ───────────────────────────────────────────────
        let fire_ready = self
            .last_shot
            .map_or(true, |shot| now.saturating_sub(shot) >= self.timing.fire_cooldown);
        if intents.firing && fire_ready {
            self.session
                .projectiles()
                .push(Projectile::new(self.ship.muzzle()));
            self.last_shot = Some(now);
            events.push(GameEvent::ShotFired);
        }

        // ── 4. Scheduled spawn ────────────────────────────────────────────────
        if now.saturating_sub(self.last_spawn) >= self.waves.spawn_cooldown()
            && !self.waves.is_current_wave_over()
        {
            self.last_spawn = now;
            if let Some(request) = self.waves.next_spawn(&mut self.rng) {
                self.spawn(request, events);
            }
        }

        // ── 5. Collisions and rebirths ────────────────────────────────────────
        let rebirths = {
            let mut aliens = self.session.aliens();
            let mut projectiles = self.session.projectiles();
            check_collisions(
                &mut projectiles,
                &mut aliens,
                &mut self.waves,
                &field,
                &mut self.rng,
                events,
            )
        };
        for _ in 0..rebirths {
            let alien = Alien::boss(BossKind::Splitter, self.spawn_point(), true).into_offspring();
            tracing::debug!(x = alien.position.x, "rebirth spawn");
            self.session.aliens().push(alien);
        }

        // ── 6. Wave completion ────────────────────────────────────────────────
        self.settle(now, events);
    }

    fn spawn_point(&mut self) -> Point {
        let field = self.session.playfield();
        Point::new(self.rng.gen_range(field.spawn_x_range()), field.spawn_y())
    }

    fn spawn(&mut self, request: SpawnRequest, events: &mut Vec<GameEvent>) {
        let at = self.spawn_point();
        let alien = match request {
            SpawnRequest::Grunt(class) => Alien::grunt(class, at),
            SpawnRequest::Boss(tier) => {
                tracing::info!(wave = self.waves.current_wave(), kind = ?tier.kind, "boss encountered");
                events.push(GameEvent::BossEncountered { kind: tier.kind });
                Alien::boss(tier.kind, at, tier.reborn)
            }
        };
        tracing::debug!(kind = ?alien.kind, x = at.x, "spawned alien");
        self.session.aliens().push(alien);
    }

    /// Wave-completion bookkeeping: once the wave is over and the field is
    /// empty, wait out the settle delay, then advance or win.
    fn settle(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        let cleared = self.waves.is_current_wave_over() && self.session.aliens().is_empty();
        if !cleared {
            self.wave_cleared_at = None;
            return;
        }

        let cleared_at = match self.wave_cleared_at {
            Some(at) => at,
            None => {
                let wave = self.waves.current_wave();
                tracing::info!(wave, "wave cleared");
                events.push(GameEvent::WaveCleared { wave });
                self.wave_cleared_at = Some(now);
                now
            }
        };
        if now.saturating_sub(cleared_at) < self.timing.settle_delay {
            return;
        }

        if self.waves.is_final_wave() {
            self.phase = GamePhase::Won;
            tracing::info!(waves = self.waves.total_waves(), "game won");
            events.push(GameEvent::GameWon);
        } else if self.waves.advance() {
            let (wave, total) = (self.waves.current_wave(), self.waves.total_waves());
            tracing::info!(wave, total, "wave advanced");
            events.push(GameEvent::WaveAdvanced { wave, total });
            self.wave_cleared_at = None;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let aliens = self.session.aliens().iter().map(Into::into).collect();
        let projectiles = self.session.projectiles().iter().map(Into::into).collect();
        Snapshot {
            phase: format!("{:?}", self.phase),
            wave: self.waves.current_wave(),
            total_waves: self.waves.total_waves(),
            ship: Some(ShipSnapshot::from(&self.ship)),
            aliens,
            projectiles,
            background_offset: self.session.backdrop().offset,
        }
    }
}
