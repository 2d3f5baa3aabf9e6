//! Game lifecycle: start, pause, resume and stop.
//!
//! `GameRunner` owns one tick stepper (the orchestrator) and three entity
//! steppers. The entity steppers are spawned paused and released by the
//! tick when the intro ends; pause and resume fan out to every stepper;
//! stop cancels and joins all of them before returning.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{parse_wave_count, Difficulty, Playfield, Timing};
use crate::error::GameError;
use crate::events::{GameEvent, Snapshot};
use crate::game::{Game, GamePhase, Intents};
use crate::session::{lock, GameSession};
use crate::stepper::{step_aliens, step_backdrop, step_projectiles, PauseGate, Stepper};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Starting,
    Running,
    Paused,
    Lost,
    Won,
}

/// Game time that only advances between ticks while unpaused.
#[derive(Debug, Default)]
struct GameClock {
    elapsed: Duration,
    last: Option<Instant>,
}

impl GameClock {
    fn tick(&mut self) -> Duration {
        let now = Instant::now();
        if let Some(last) = self.last {
            self.elapsed += now.saturating_duration_since(last);
        }
        self.last = Some(now);
        self.elapsed
    }

    fn halt(&mut self) {
        self.last = None;
    }
}

struct Core {
    game: Game<StdRng>,
    intents: Intents,
    clock: GameClock,
    paused: bool,
    /// Gates of the entity steppers, driven from under the core lock.
    entity_gates: Vec<Arc<PauseGate>>,
}

impl Core {
    fn state(&self) -> RunnerState {
        if self.paused {
            return RunnerState::Paused;
        }
        match self.game.phase() {
            GamePhase::Starting => RunnerState::Starting,
            GamePhase::Running => RunnerState::Running,
            GamePhase::Lost => RunnerState::Lost,
            GamePhase::Won => RunnerState::Won,
        }
    }

    fn set_entity_steppers_paused(&self, paused: bool) {
        for gate in &self.entity_gates {
            if paused {
                gate.pause();
            } else {
                gate.resume();
            }
        }
    }
}

pub struct GameRunner {
    playfield: Playfield,
    timing: Timing,
    seed: Option<u64>,
    events: Sender<GameEvent>,
    core: Option<Arc<Mutex<Core>>>,
    ticker: Option<Stepper>,
    steppers: Vec<Stepper>,
}

impl GameRunner {
    /// A runner in the `Idle` state and the receiving end of its events.
    pub fn new(playfield: Playfield, timing: Timing) -> (Self, Receiver<GameEvent>) {
        let (tx, rx) = mpsc::channel();
        let runner = Self {
            playfield,
            timing,
            seed: None,
            events: tx,
            core: None,
            ticker: None,
            steppers: Vec::new(),
        };
        (runner, rx)
    }

    /// Seed the RNG of every game this runner starts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start a fresh game, stopping any game already in progress. An
    /// out-of-range custom count is rejected and leaves the current game alone.
    pub fn start(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        let wave_count = difficulty.checked_wave_count()?;
        self.stop();

        let session = Arc::new(GameSession::new(self.playfield));
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let game = Game::new(Arc::clone(&session), wave_count, self.timing, rng);

        let steppers = vec![
            spawn_entity_stepper("aliens", self.timing.alien_cadence, &session, step_aliens)?,
            spawn_entity_stepper(
                "projectiles",
                self.timing.projectile_cadence,
                &session,
                step_projectiles,
            )?,
            spawn_entity_stepper(
                "background",
                self.timing.background_cadence,
                &session,
                step_backdrop,
            )?,
        ];

        let core = Arc::new(Mutex::new(Core {
            game,
            intents: Intents::default(),
            clock: GameClock::default(),
            paused: false,
            entity_gates: steppers.iter().map(Stepper::gate).collect(),
        }));

        let tick_core = Arc::clone(&core);
        let tx = self.events.clone();
        let ticker = Stepper::spawn("tick", self.timing.tick_interval, false, move || {
            run_tick(&tick_core, &tx)
        })?;

        tracing::info!(difficulty = difficulty.label(), wave_count, "game starting");
        self.core = Some(core);
        self.ticker = Some(ticker);
        self.steppers = steppers;
        Ok(())
    }

    /// Parse a custom wave count and start. Bad input leaves the runner untouched.
    pub fn start_custom(&mut self, input: &str) -> Result<(), GameError> {
        let waves = parse_wave_count(input)?;
        self.start(Difficulty::Custom(waves))
    }

    pub fn set_intents(&self, intents: Intents) {
        if let Some(core) = &self.core {
            let mut core = lock(core);
            if !core.paused {
                core.intents = intents;
            }
        }
    }

    /// Freeze the tick and every stepper. Held intents are dropped.
    pub fn pause(&self) {
        let Some(core) = &self.core else {
            return;
        };
        let mut core = lock(core);
        if core.paused || core.game.phase().is_over() {
            return;
        }
        core.paused = true;
        core.intents = Intents::default();
        core.clock.halt();
        if let Some(ticker) = &self.ticker {
            ticker.pause();
        }
        core.set_entity_steppers_paused(true);
        tracing::info!("game paused");
    }

    pub fn resume(&self) {
        let Some(core) = &self.core else {
            return;
        };
        let mut core = lock(core);
        if !core.paused {
            return;
        }
        core.paused = false;
        if core.game.phase() == GamePhase::Running {
            core.set_entity_steppers_paused(false);
        }
        if let Some(ticker) = &self.ticker {
            ticker.resume();
        }
        tracing::info!("game resumed");
    }

    /// Cancel and join every stepper, clear all entities and discard the
    /// game. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        for stepper in &mut self.steppers {
            stepper.stop();
        }
        self.steppers.clear();
        if let Some(core) = self.core.take() {
            lock(&core).game.session().clear();
            tracing::info!("game stopped");
        }
    }

    pub fn state(&self) -> RunnerState {
        match &self.core {
            Some(core) => lock(core).state(),
            None => RunnerState::Idle,
        }
    }

    /// Current wave and total, if a game exists.
    pub fn wave(&self) -> Option<(u32, u32)> {
        self.core.as_ref().map(|core| {
            let core = lock(core);
            let waves = core.game.waves();
            (waves.current_wave(), waves.total_waves())
        })
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.core.as_ref().map(|core| {
            let core = lock(core);
            let mut snapshot = core.game.snapshot();
            snapshot.phase = format!("{:?}", core.state());
            snapshot
        })
    }

    /// Names of stepper threads that are currently alive.
    pub fn live_steppers(&self) -> Vec<&'static str> {
        self.ticker
            .iter()
            .chain(self.steppers.iter())
            .filter(|stepper| stepper.is_alive())
            .map(Stepper::name)
            .collect()
    }
}

impl Drop for GameRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_entity_stepper(
    name: &'static str,
    cadence: Duration,
    session: &Arc<GameSession>,
    step: fn(&GameSession),
) -> Result<Stepper, GameError> {
    let session = Arc::clone(session);
    Stepper::spawn(name, cadence, true, move || step(&session))
}

/// One orchestrator tick: advance the game and publish its events.
fn run_tick(core: &Mutex<Core>, events: &Sender<GameEvent>) {
    let mut pending = Vec::new();
    {
        let mut core = lock(core);
        if core.paused {
            return;
        }
        let before = core.game.phase();
        let now = core.clock.tick();
        let intents = core.intents;
        let after = core.game.tick(intents, now, &mut pending);

        if before == GamePhase::Starting && after == GamePhase::Running {
            core.set_entity_steppers_paused(false);
        }
        if after.is_over() && !before.is_over() {
            core.set_entity_steppers_paused(true);
        }
    }

    for event in pending {
        if events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
            break;
        }
    }
}
