//! Shared state of one running game.
//!
//! The orchestrator inserts entities; each stepper only mutates (and purges)
//! the list it is responsible for. Every pass over a list happens under its
//! lock, so readers always see a consistent view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Playfield;
use crate::entities::{Alien, Backdrop, Projectile};

#[derive(Debug)]
pub struct GameSession {
    playfield: Playfield,
    aliens: Mutex<Vec<Alien>>,
    projectiles: Mutex<Vec<Projectile>>,
    backdrop: Mutex<Backdrop>,
    lost: AtomicBool,
}

impl GameSession {
    pub fn new(playfield: Playfield) -> Self {
        Self {
            playfield,
            aliens: Mutex::new(Vec::new()),
            projectiles: Mutex::new(Vec::new()),
            backdrop: Mutex::new(Backdrop::default()),
            lost: AtomicBool::new(false),
        }
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn aliens(&self) -> MutexGuard<'_, Vec<Alien>> {
        lock(&self.aliens)
    }

    pub fn projectiles(&self) -> MutexGuard<'_, Vec<Projectile>> {
        lock(&self.projectiles)
    }

    pub fn backdrop(&self) -> MutexGuard<'_, Backdrop> {
        lock(&self.backdrop)
    }

    /// Raised by the alien stepper when an alien crosses the loss line.
    pub fn mark_lost(&self) {
        self.lost.store(true, Ordering::SeqCst);
    }

    pub fn has_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Drop every entity and reset the backdrop.
    pub fn clear(&self) {
        self.aliens().clear();
        self.projectiles().clear();
        *self.backdrop() = Backdrop::default();
    }
}

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
