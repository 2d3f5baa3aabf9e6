//! Outbound data for the platform layer: discrete events and per-tick
//! snapshots a renderer can draw from.

use serde::{Deserialize, Serialize};

use crate::entities::{Alien, AlienKind, AlienSprite, BossKind, Point, Projectile, Ship, ShipSprite};

/// Notifications an audio or HUD collaborator may react to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The intro finished and the waves begin.
    GameStarted { total_waves: u32 },
    ShotFired,
    BossEncountered { kind: BossKind },
    AlienDestroyed { kind: AlienKind },
    BossDefeated { kind: BossKind },
    /// The last alien of a wave is gone; the settle delay starts.
    WaveCleared { wave: u32 },
    WaveAdvanced { wave: u32, total: u32 },
    GameWon,
    GameLost,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub position: Point,
    pub sprite: ShipSprite,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlienSnapshot {
    pub kind: AlienKind,
    pub reborn: bool,
    pub position: Point,
    pub sprite: AlienSprite,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub position: Point,
    pub active: bool,
}

/// Read-only copy of everything a renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Runner phase name ("Starting", "Running", ...).
    pub phase: String,
    pub wave: u32,
    pub total_waves: u32,
    pub ship: Option<ShipSnapshot>,
    pub aliens: Vec<AlienSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub background_offset: i32,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&Ship> for ShipSnapshot {
    fn from(ship: &Ship) -> Self {
        Self {
            position: ship.position,
            sprite: ship.sprite,
        }
    }
}

impl From<&Alien> for AlienSnapshot {
    fn from(alien: &Alien) -> Self {
        Self {
            kind: alien.kind,
            reborn: alien.reborn,
            position: alien.position,
            sprite: alien.sprite(),
            active: alien.active,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(projectile: &Projectile) -> Self {
        Self {
            position: projectile.position,
            active: projectile.active,
        }
    }
}
