//! Projectile/alien collision detection.
//!
//! A coarse grid, rebuilt every tick, buckets aliens by the cell of their
//! top-left corner so each projectile only tests nearby aliens. Candidates
//! are visited in list order so "first alien found" matches a full scan.

use std::collections::HashMap;

use rand::Rng;

use crate::config::Playfield;
use crate::entities::{Alien, AlienKind, BossKind, Hit, Point, Projectile, Rect, MAX_ALIEN_EXTENT};
use crate::events::GameEvent;
use crate::waves::WaveManager;

/// Grid cell size in playfield units.
pub const CELL_SIZE: i32 = 50;

/// Per-tick bucket of alien indices keyed by cell.
#[derive(Debug, Default)]
pub struct CollisionGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl CollisionGrid {
    pub fn cell_of(x: i32, y: i32) -> (i32, i32) {
        (x.div_euclid(CELL_SIZE), y.div_euclid(CELL_SIZE))
    }

    /// Bucket every active alien.
    pub fn build(aliens: &[Alien]) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (i, alien) in aliens.iter().enumerate() {
            if !alien.active {
                continue;
            }
            let cell = Self::cell_of(alien.position.x, alien.position.y);
            cells.entry(cell).or_default().push(i);
        }
        Self { cells }
    }

    #[cfg(test)]
    fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Move alien `index` from the bucket of `from` to the bucket of `to`.
    pub fn relocate(&mut self, index: usize, from: Point, to: Point) {
        let (old, new) = (Self::cell_of(from.x, from.y), Self::cell_of(to.x, to.y));
        if old == new {
            return;
        }
        if let Some(indices) = self.cells.get_mut(&old) {
            indices.retain(|&i| i != index);
            if indices.is_empty() {
                self.cells.remove(&old);
            }
        }
        self.cells.entry(new).or_default().push(index);
    }

    /// Indices of aliens that might overlap `area`, ascending.
    ///
    /// An alien anchored up to `MAX_ALIEN_EXTENT` left of or above the area
    /// can still reach into it, so the search widens by that much.
    pub fn candidates(&self, area: &Rect) -> Vec<usize> {
        let (min_cx, min_cy) = Self::cell_of(area.x - MAX_ALIEN_EXTENT, area.y - MAX_ALIEN_EXTENT);
        let (max_cx, max_cy) = Self::cell_of(area.x + area.w, area.y + area.h);

        let mut found = Vec::new();
        for cx in min_cx..=max_cx {
            for cy in min_cy..=max_cy {
                if let Some(indices) = self.cells.get(&(cx, cy)) {
                    found.extend_from_slice(indices);
                }
            }
        }
        found.sort_unstable();
        found
    }
}

/// Resolve every projectile/alien overlap for this tick.
///
/// Each active projectile hits at most one active alien. Hits cost one
/// health point; a lethal hit deactivates the alien and emits
/// `AlienDestroyed` (plus `BossDefeated` for bosses). A teleporter that
/// survives a hit jumps to a random spawn column. Returns the number of
/// rebirth spawns owed for splitter bosses destroyed this tick.
pub fn check_collisions(
    projectiles: &mut [Projectile],
    aliens: &mut [Alien],
    waves: &mut WaveManager,
    field: &Playfield,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let mut grid = CollisionGrid::build(aliens);
    let mut rebirths = 0;

    for projectile in projectiles.iter_mut().filter(|p| p.active) {
        let bounds = projectile.bounds();
        let target = grid
            .candidates(&bounds)
            .into_iter()
            .find(|&i| aliens[i].active && bounds.intersects(&aliens[i].bounds()));
        let Some(index) = target else {
            continue;
        };

        projectile.active = false;
        let alien = &mut aliens[index];
        match alien.take_hit() {
            Hit::Destroyed => {
                tracing::debug!(kind = ?alien.kind, "alien destroyed");
                events.push(GameEvent::AlienDestroyed { kind: alien.kind });
                if let AlienKind::Boss(boss) = alien.kind {
                    events.push(GameEvent::BossDefeated { kind: boss });
                    if !alien.offspring {
                        waves.boss_defeated();
                        if boss == BossKind::Splitter {
                            rebirths += waves.rebirth_count();
                        }
                    }
                }
            }
            Hit::Damaged => {
                if alien.kind == AlienKind::Boss(BossKind::Teleporter) {
                    let from = alien.position;
                    alien.position.x = rng.gen_range(field.spawn_x_range());
                    grid.relocate(index, from, alien.position);
                    tracing::debug!(x = alien.position.x, "teleporter relocated");
                }
            }
        }
    }

    rebirths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GruntClass;

    #[test]
    fn negative_coordinates_bucket_downward() {
        assert_eq!(CollisionGrid::cell_of(-1, -100), (-1, -2));
        assert_eq!(CollisionGrid::cell_of(49, 50), (0, 1));
    }

    #[test]
    fn candidates_include_large_alien_anchored_far_left() {
        let aliens = vec![Alien::grunt(GruntClass::A, Point::new(0, 0))];
        let grid = CollisionGrid::build(&aliens);
        // Projectile overlapping the alien's right edge, two cells away from its anchor.
        let area = Rect::new(Point::new(85, 10), 33, 44);
        assert_eq!(grid.candidates(&area), vec![0]);
    }

    #[test]
    fn inactive_aliens_are_not_bucketed() {
        let mut alien = Alien::grunt(GruntClass::B, Point::new(10, 10));
        alien.active = false;
        let grid = CollisionGrid::build(&[alien]);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn relocate_moves_an_alien_between_buckets() {
        let aliens = vec![Alien::grunt(GruntClass::A, Point::new(1000, 100))];
        let mut grid = CollisionGrid::build(&aliens);
        let near_new = Rect::new(Point::new(120, 110), 33, 44);
        assert!(grid.candidates(&near_new).is_empty());

        grid.relocate(0, Point::new(1000, 100), Point::new(100, 100));
        assert_eq!(grid.candidates(&near_new), vec![0]);
        assert_eq!(grid.occupied_cells(), 1);
    }
}
