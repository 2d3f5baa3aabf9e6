//! Wave table and spawn scheduling.
//!
//! Each wave is either a set of grunt counters to drain or a single boss
//! encounter. The [`WaveManager`] is built fresh for every game and is only
//! mutated by the orchestrator tick.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Timing, MAX_WAVES, MIN_WAVES};
use crate::entities::{BossKind, GruntClass};

/// Boss kind and stat tier for a boss wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossTier {
    pub kind: BossKind,
    pub reborn: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossState {
    /// Not spawned yet.
    Pending,
    /// On the field.
    Alive,
    Defeated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossEncounter {
    pub tier: BossTier,
    pub state: BossState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    /// Grunts left to spawn, indexed by [`GruntClass::index`].
    remaining: [u32; 3],
    boss: Option<BossEncounter>,
}

impl Wave {
    pub fn regular(green: u32, yellow: u32, red: u32) -> Self {
        Self {
            remaining: [green, yellow, red],
            boss: None,
        }
    }

    pub fn boss(kind: BossKind, reborn: bool) -> Self {
        Self {
            remaining: [0; 3],
            boss: Some(BossEncounter {
                tier: BossTier { kind, reborn },
                state: BossState::Pending,
            }),
        }
    }

    pub fn remaining(&self, class: GruntClass) -> u32 {
        self.remaining[class.index()]
    }

    pub fn boss_encounter(&self) -> Option<BossEncounter> {
        self.boss
    }

    pub fn is_boss_wave(&self) -> bool {
        self.boss.is_some()
    }

    /// A boss that has not spawned yet or is still alive.
    pub fn boss_is_live(&self) -> bool {
        matches!(
            self.boss,
            Some(BossEncounter {
                state: BossState::Pending | BossState::Alive,
                ..
            })
        )
    }

    pub fn is_over(&self) -> bool {
        self.remaining.iter().all(|&n| n == 0) && !self.boss_is_live()
    }
}

/// The hand-authored table, wave 1 first.
pub fn wave_table() -> Vec<Wave> {
    vec![
        Wave::regular(5, 0, 0),
        Wave::regular(7, 0, 0),
        Wave::regular(8, 4, 0),
        Wave::regular(9, 6, 2),
        Wave::boss(BossKind::Brute, false),
        Wave::regular(11, 8, 4),
        Wave::regular(12, 9, 6),
        Wave::boss(BossKind::Teleporter, false),
        Wave::regular(13, 10, 8),
        Wave::regular(14, 11, 9),
        Wave::regular(15, 13, 10),
        Wave::boss(BossKind::Splitter, false),
        Wave::boss(BossKind::Brute, true),
        Wave::boss(BossKind::Teleporter, true),
        Wave::boss(BossKind::Splitter, true),
    ]
}

/// What the orchestrator should materialise this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnRequest {
    Grunt(GruntClass),
    Boss(BossTier),
}

/// The wave whose boss doubles rebirth spawns.
pub const FINAL_REBIRTH_WAVE: u32 = 15;
/// Completing one of these waves shortens the spawn cooldown.
const SPEEDUP_WAVES: [u32; 2] = [6, 9];

#[derive(Clone, Debug)]
pub struct WaveManager {
    waves: Vec<Wave>,
    current: u32,
    total: u32,
    spawn_cooldown: Duration,
    spawn_cooldown_step: Duration,
}

impl WaveManager {
    /// `total` is clamped to `MIN_WAVES..=MAX_WAVES`.
    pub fn new(total: u32, timing: &Timing) -> Self {
        Self {
            waves: wave_table(),
            current: 1,
            total: total.clamp(MIN_WAVES, MAX_WAVES),
            spawn_cooldown: timing.spawn_cooldown,
            spawn_cooldown_step: timing.spawn_cooldown_step,
        }
    }

    /// 1-based index of the wave being played.
    pub fn current_wave(&self) -> u32 {
        self.current
    }

    pub fn total_waves(&self) -> u32 {
        self.total
    }

    pub fn is_final_wave(&self) -> bool {
        self.current >= self.total
    }

    pub fn current(&self) -> &Wave {
        &self.waves[(self.current - 1) as usize]
    }

    fn current_mut(&mut self) -> &mut Wave {
        &mut self.waves[(self.current - 1) as usize]
    }

    pub fn is_current_wave_over(&self) -> bool {
        self.current().is_over()
    }

    pub fn spawn_cooldown(&self) -> Duration {
        self.spawn_cooldown
    }

    /// Decide the next spawn for the current wave, updating counters.
    ///
    /// A boss wave yields its boss exactly once and then nothing until the
    /// wave ends; a regular wave picks uniformly among classes that still
    /// have grunts left.
    pub fn next_spawn(&mut self, rng: &mut impl Rng) -> Option<SpawnRequest> {
        let wave = self.current_mut();
        if let Some(boss) = wave.boss.as_mut() {
            if boss.state != BossState::Pending {
                return None;
            }
            boss.state = BossState::Alive;
            return Some(SpawnRequest::Boss(boss.tier));
        }

        let candidates: Vec<GruntClass> = GruntClass::ALL
            .into_iter()
            .filter(|class| wave.remaining[class.index()] > 0)
            .collect();
        let class = *candidates.choose(rng)?;
        wave.remaining[class.index()] -= 1;
        Some(SpawnRequest::Grunt(class))
    }

    /// The current wave's boss went down.
    pub fn boss_defeated(&mut self) {
        if let Some(boss) = self.current_mut().boss.as_mut() {
            if boss.state == BossState::Alive {
                boss.state = BossState::Defeated;
            }
        }
    }

    /// Rebirth spawns owed for destroying a splitter boss this wave.
    pub fn rebirth_count(&self) -> u32 {
        if self.current == FINAL_REBIRTH_WAVE {
            2
        } else {
            1
        }
    }

    /// Move to the next wave. Returns `false` (and changes nothing) when the
    /// current wave is not over or is already the last one.
    pub fn advance(&mut self) -> bool {
        if !self.is_current_wave_over() || self.is_final_wave() {
            return false;
        }
        if SPEEDUP_WAVES.contains(&self.current) {
            self.spawn_cooldown = self.spawn_cooldown.saturating_sub(self.spawn_cooldown_step);
        }
        self.current += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_boss_tiers_at_fixed_waves() {
        let table = wave_table();
        assert_eq!(table.len(), MAX_WAVES as usize);
        let bosses: Vec<(usize, BossKind, bool)> = table
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.boss.map(|b| (i + 1, b.tier.kind, b.tier.reborn)))
            .collect();
        assert_eq!(
            bosses,
            vec![
                (5, BossKind::Brute, false),
                (8, BossKind::Teleporter, false),
                (12, BossKind::Splitter, false),
                (13, BossKind::Brute, true),
                (14, BossKind::Teleporter, true),
                (15, BossKind::Splitter, true),
            ]
        );
    }
}
