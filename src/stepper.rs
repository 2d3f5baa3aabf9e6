//! Background steppers: independently cadenced, pausable, cancellable
//! threads that each advance one category of entity.
//!
//! A stepper blocks on its own [`PauseGate`] before every tick and sleeps
//! its cadence between ticks. Both waits wake up immediately on cancel, so
//! [`Stepper::stop`] returns within one cadence at worst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::GameError;
use crate::session::{lock, GameSession};

#[derive(Debug, Default)]
struct GateState {
    paused: bool,
    cancelled: bool,
}

/// Pause/cancel signal private to one stepper.
#[derive(Debug, Default)]
pub struct PauseGate {
    state: Mutex<GateState>,
    signal: Condvar,
}

impl PauseGate {
    pub fn new(paused: bool) -> Self {
        Self {
            state: Mutex::new(GateState {
                paused,
                cancelled: false,
            }),
            signal: Condvar::new(),
        }
    }

    pub fn pause(&self) {
        lock(&self.state).paused = true;
    }

    pub fn resume(&self) {
        lock(&self.state).paused = false;
        self.signal.notify_all();
    }

    /// Cancel and unblock any waiter.
    pub fn cancel(&self) {
        lock(&self.state).cancelled = true;
        self.signal.notify_all();
    }

    #[cfg(test)]
    fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    #[cfg(test)]
    fn is_cancelled(&self) -> bool {
        lock(&self.state).cancelled
    }

    /// Block while paused. Returns `false` once cancelled.
    fn wait_runnable(&self) -> bool {
        let mut state = lock(&self.state);
        while state.paused && !state.cancelled {
            state = self
                .signal
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        !state.cancelled
    }

    /// Sleep for `cadence`. Returns `false` if cancelled first.
    fn sleep(&self, cadence: Duration) -> bool {
        let deadline = Instant::now() + cadence;
        let mut state = lock(&self.state);
        loop {
            if state.cancelled {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            state = self
                .signal
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Clears the liveness flag when the thread exits, panics included.
struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Stepper {
    name: &'static str,
    gate: Arc<PauseGate>,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Stepper {
    /// Spawn a stepper running `step` every `cadence`. With `paused` set it
    /// waits for [`Stepper::resume`] before its first tick.
    pub fn spawn<F>(
        name: &'static str,
        cadence: Duration,
        paused: bool,
        mut step: F,
    ) -> Result<Self, GameError>
    where
        F: FnMut() + Send + 'static,
    {
        let gate = Arc::new(PauseGate::new(paused));
        let alive = Arc::new(AtomicBool::new(true));

        let thread_gate = Arc::clone(&gate);
        let guard = AliveGuard(Arc::clone(&alive));
        let handle = thread::Builder::new()
            .name(format!("{name}-stepper"))
            .spawn(move || {
                let _guard = guard;
                tracing::debug!(stepper = name, "stepper started");
                while thread_gate.wait_runnable() {
                    if !thread_gate.sleep(cadence) || !thread_gate.wait_runnable() {
                        break;
                    }
                    step();
                }
                tracing::debug!(stepper = name, "stepper finished");
            })
            .map_err(|source| GameError::SpawnThread { name, source })?;

        Ok(Self {
            name,
            gate,
            alive,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn gate(&self) -> Arc<PauseGate> {
        Arc::clone(&self.gate)
    }

    pub fn pause(&self) {
        self.gate.pause();
    }

    pub fn resume(&self) {
        self.gate.resume();
    }

    /// Whether the stepper thread is still running.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Cancel and join. Safe to call repeatedly and while paused.
    pub fn stop(&mut self) {
        self.gate.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(stepper = self.name, "stepper thread panicked");
            }
        }
    }
}

impl Drop for Stepper {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Step functions ────────────────────────────────────────────────────────────

/// One alien pass: move live aliens, animate dead ones, purge finished
/// explosions, and raise the loss flag if any alien crossed the loss line.
pub fn step_aliens(session: &GameSession) {
    let field = *session.playfield();
    let mut crossed = false;
    session.aliens().retain_mut(|alien| {
        if alien.active {
            crossed |= alien.advance(&field);
            true
        } else {
            alien.advance_death_animation()
        }
    });
    if crossed {
        tracing::info!("alien reached the loss line");
        session.mark_lost();
    }
}

/// One projectile pass: purge spent projectiles and move the rest.
pub fn step_projectiles(session: &GameSession) {
    session.projectiles().retain_mut(|projectile| {
        if projectile.active {
            projectile.advance();
            true
        } else {
            false
        }
    });
}

pub fn step_backdrop(session: &GameSession) {
    session.backdrop().scroll();
}
