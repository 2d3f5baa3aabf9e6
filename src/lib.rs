//! Space Defender - simulation core.
//!
//! A fixed-cadence shooter loop: the orchestrator tick in [`game`] owns
//! spawning, collisions and wave progression, while the background
//! steppers in [`stepper`] move aliens, projectiles and the backdrop.
//! [`runner`] ties them together behind a start/pause/resume/stop API.

pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod game;
pub mod runner;
pub mod session;
pub mod stepper;
pub mod waves;

pub use config::{Difficulty, GameSettings, Playfield, Timing};
pub use entities::{Alien, AlienKind, BossKind, GruntClass, Projectile, Ship};
pub use error::{ConfigError, GameError};
pub use events::{GameEvent, Snapshot};
pub use game::{Game, GamePhase, Intents};
pub use runner::{GameRunner, RunnerState};
pub use session::GameSession;
pub use waves::{SpawnRequest, WaveManager};
