//! Game entity types and their per-tick movement rules.
//!
//! Nothing in here knows about threads or timers: a stepper or the
//! orchestrator calls these methods and decides what to do with the result.

use serde::{Deserialize, Serialize};

use crate::config::Playfield;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(origin: Point, w: i32, h: i32) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w,
            h,
        }
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

// ── Alien kinds ───────────────────────────────────────────────────────────────

/// The three regular alien classes a wave counts down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GruntClass {
    /// Green: straight down, medium speed.
    A,
    /// Yellow: straight down, fast and small.
    B,
    /// Red: strafes side to side on the way down.
    C,
}

impl GruntClass {
    pub const ALL: [GruntClass; 3] = [GruntClass::A, GruntClass::B, GruntClass::C];

    pub fn index(self) -> usize {
        match self {
            GruntClass::A => 0,
            GruntClass::B => 1,
            GruntClass::C => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    /// Plain heavy boss.
    Brute,
    /// Jumps to a random column on every non-lethal hit.
    Teleporter,
    /// Triggers rebirth spawns when destroyed.
    Splitter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlienKind {
    Grunt(GruntClass),
    Boss(BossKind),
}

/// How an alien travels each move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Straight,
    Strafing,
    Boss,
}

/// Per-variant parameters looked up from the kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlienStats {
    pub speed: i32,
    pub health: u32,
    pub width: i32,
    pub height: i32,
    pub movement: Movement,
}

const BOSS_SIZE: i32 = 105;

impl AlienKind {
    pub fn stats(self, reborn: bool) -> AlienStats {
        let (speed, health, width, height, movement) = match self {
            AlienKind::Grunt(GruntClass::A) => (5, 1, 91, 77, Movement::Straight),
            AlienKind::Grunt(GruntClass::B) => (7, 1, 70, 49, Movement::Straight),
            AlienKind::Grunt(GruntClass::C) => (5, 1, 91, 77, Movement::Strafing),
            AlienKind::Boss(BossKind::Brute) => {
                (2, if reborn { 7 } else { 6 }, BOSS_SIZE, BOSS_SIZE, Movement::Boss)
            }
            AlienKind::Boss(BossKind::Teleporter) => {
                (2, if reborn { 5 } else { 4 }, BOSS_SIZE, BOSS_SIZE, Movement::Boss)
            }
            AlienKind::Boss(BossKind::Splitter) => {
                (2, if reborn { 2 } else { 3 }, BOSS_SIZE, BOSS_SIZE, Movement::Boss)
            }
        };
        AlienStats {
            speed,
            health,
            width,
            height,
            movement,
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, AlienKind::Boss(_))
    }
}

/// Widest/tallest alien sprite; the collision grid widens its search by this much.
pub const MAX_ALIEN_EXTENT: i32 = BOSS_SIZE;

// ── Alien ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlienSprite {
    /// First animation frame (strafers: facing left).
    FrameA,
    /// Second animation frame (strafers: facing right).
    FrameB,
    /// Explosion stage 1..=3.
    Exploding(u8),
}

/// Moves between sprite toggles for straight movers and bosses.
const ANIMATION_PERIOD: u32 = 20;
/// Moves between direction flips for strafers.
const STRAFE_PERIOD: u32 = 15;
/// Horizontal step of a strafer, in multiples of its speed.
const STRAFE_LENGTH: i32 = 5;
/// Death animation: stage 1 until frame 2, stage 2 until 6, stage 3 until 10.
const DEATH_STAGE_ENDS: [u8; 3] = [2, 6, 10];

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    pub kind: AlienKind,
    pub position: Point,
    pub health: u32,
    /// False once destroyed or past the loss line; the death animation still plays.
    pub active: bool,
    /// Reborn stats (late-game tier or rebirth spawn).
    pub reborn: bool,
    /// Spawned by a rebirth rather than by the wave table.
    pub offspring: bool,
    stats: AlienStats,
    sprite: AlienSprite,
    move_count: u32,
    strafe_left: bool,
    strafe_count: u32,
    death_frames: u8,
}

/// Result of a projectile striking an alien.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Damaged,
    Destroyed,
}

impl Alien {
    pub fn new(kind: AlienKind, position: Point, reborn: bool) -> Self {
        let stats = kind.stats(reborn);
        Self {
            kind,
            position,
            health: stats.health,
            active: true,
            reborn,
            offspring: false,
            stats,
            sprite: AlienSprite::FrameA,
            move_count: 0,
            strafe_left: false,
            strafe_count: 0,
            death_frames: 0,
        }
    }

    pub fn grunt(class: GruntClass, position: Point) -> Self {
        Self::new(AlienKind::Grunt(class), position, false)
    }

    pub fn boss(kind: BossKind, position: Point, reborn: bool) -> Self {
        Self::new(AlienKind::Boss(kind), position, reborn)
    }

    /// Mark this alien as a rebirth spawn.
    pub fn into_offspring(mut self) -> Self {
        self.offspring = true;
        self
    }

    pub fn stats(&self) -> AlienStats {
        self.stats
    }

    pub fn sprite(&self) -> AlienSprite {
        self.sprite
    }

    pub fn death_frames(&self) -> u8 {
        self.death_frames
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, self.stats.width, self.stats.height)
    }

    /// Move one step. Returns `true` when the alien crossed the loss line,
    /// in which case it has also deactivated itself.
    pub fn advance(&mut self, field: &Playfield) -> bool {
        match self.stats.movement {
            Movement::Straight | Movement::Boss => {
                self.position.y += self.stats.speed;
                if self.move_count % ANIMATION_PERIOD == 0 {
                    self.toggle_frame();
                }
                self.move_count += 1;
            }
            Movement::Strafing => {
                self.strafe_count += 1;
                if self.strafe_count % STRAFE_PERIOD == 0 {
                    self.strafe_left = !self.strafe_left;
                    self.sprite = if self.strafe_left {
                        AlienSprite::FrameA
                    } else {
                        AlienSprite::FrameB
                    };
                }
                let step = self.stats.speed * STRAFE_LENGTH;
                let dx = if self.strafe_left { -step } else { step };
                self.position.x =
                    (self.position.x + dx).clamp(field.strafe_min_x(), field.strafe_max_x());
                self.position.y += self.stats.speed;
            }
        }

        if self.position.y + self.stats.height > field.loss_line() {
            self.active = false;
            return true;
        }
        false
    }

    fn toggle_frame(&mut self) {
        self.sprite = match self.sprite {
            AlienSprite::FrameA => AlienSprite::FrameB,
            _ => AlienSprite::FrameA,
        };
    }

    /// Advance the death animation by one frame. Returns `false` once the
    /// animation is exhausted; the caller then removes the alien.
    pub fn advance_death_animation(&mut self) -> bool {
        let Some(stage) = DEATH_STAGE_ENDS
            .iter()
            .position(|&end| self.death_frames < end)
        else {
            return false;
        };
        self.sprite = AlienSprite::Exploding(stage as u8 + 1);
        self.death_frames += 1;
        true
    }

    /// Take one point of damage. Deactivates the alien the first time its
    /// health reaches zero.
    pub fn take_hit(&mut self) -> Hit {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.active = false;
            Hit::Destroyed
        } else {
            Hit::Damaged
        }
    }
}

// ── Projectile ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projectile {
    pub position: Point,
    pub active: bool,
}

impl Projectile {
    pub const SPEED: i32 = 10;
    pub const WIDTH: i32 = 33;
    pub const HEIGHT: i32 = 44;
    /// How far above the top edge a projectile may travel before it expires.
    const TOP_SLACK: i32 = 20;

    pub fn new(position: Point) -> Self {
        Self {
            position,
            active: true,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position, Self::WIDTH, Self::HEIGHT)
    }

    pub fn advance(&mut self) {
        self.position.y -= Self::SPEED;
        if self.position.y + Self::TOP_SLACK <= 0 {
            self.active = false;
        }
    }
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipSprite {
    #[default]
    Idle,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ship {
    pub position: Point,
    pub sprite: ShipSprite,
}

impl Ship {
    pub const SIZE: i32 = 88;
    pub const SPEED: i32 = 15;
    /// Rise per tick while flying in during the intro.
    pub const FLY_IN_SPEED: i32 = 5;

    /// Ship parked below the bottom edge, ready to fly in.
    pub fn offscreen(field: &Playfield) -> Self {
        Self {
            position: Point::new(field.width / 2 - Self::SIZE / 2, field.height),
            sprite: ShipSprite::Idle,
        }
    }

    /// Ship at its resting row.
    pub fn at_rest(field: &Playfield) -> Self {
        Self {
            position: Point::new(field.width / 2 - Self::SIZE / 2, field.ship_rest_y()),
            sprite: ShipSprite::Idle,
        }
    }

    pub fn move_left(&mut self, field: &Playfield) {
        if self.position.x > field.ship_left_limit() {
            self.position.x -= Self::SPEED;
            self.sprite = ShipSprite::Left;
        }
    }

    pub fn move_right(&mut self, field: &Playfield) {
        if self.position.x + Self::SIZE < field.ship_right_limit() {
            self.position.x += Self::SPEED;
            self.sprite = ShipSprite::Right;
        }
    }

    pub fn reset(&mut self) {
        self.sprite = ShipSprite::Idle;
    }

    /// Spawn point for a new projectile.
    pub fn muzzle(&self) -> Point {
        Point::new(
            self.position.x + Self::SIZE / 2 - 17,
            self.position.y - 35,
        )
    }

    /// Rise toward the resting row. Returns `true` once there.
    pub fn fly_in(&mut self, field: &Playfield) -> bool {
        let rest = field.ship_rest_y();
        if self.position.y > rest {
            self.position.y = (self.position.y - Self::FLY_IN_SPEED).max(rest);
        }
        self.position.y <= rest
    }
}

// ── Backdrop ──────────────────────────────────────────────────────────────────

/// Vertical scroll offset of the looping starfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Backdrop {
    pub offset: i32,
}

impl Backdrop {
    pub const SPEED: i32 = 10;
    pub const HEIGHT: i32 = 2089;

    pub fn scroll(&mut self) {
        self.offset = (self.offset + Self::SPEED) % Self::HEIGHT;
    }
}
