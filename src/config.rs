//! Playfield geometry, cadences and difficulty settings.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const MIN_WAVES: u32 = 1;
pub const MAX_WAVES: u32 = 15;

/// Reference viewport size.
pub const DEFAULT_WIDTH: i32 = 1422;
pub const DEFAULT_HEIGHT: i32 = 763;

const SPAWN_MARGIN: i32 = 100;
const STRAFE_RIGHT_MARGIN: i32 = 50;
const LOSS_LINE_OFFSET: i32 = 103;
const SHIP_REST_OFFSET: i32 = 113;
const SHIP_EDGE_MARGIN: i32 = 10;

// ── Difficulty ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    /// Player-chosen wave count. A game only starts with one inside
    /// `MIN_WAVES..=MAX_WAVES`; see [`Difficulty::checked_wave_count`].
    Custom(u32),
}

impl Difficulty {
    pub fn wave_count(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 8,
            Difficulty::Hard => 12,
            Difficulty::Custom(n) => *n,
        }
    }

    /// Wave count, rejecting a custom count outside `MIN_WAVES..=MAX_WAVES`.
    pub fn checked_wave_count(&self) -> Result<u32, ConfigError> {
        let count = self.wave_count();
        if !(MIN_WAVES..=MAX_WAVES).contains(&count) {
            return Err(ConfigError::OutOfRange {
                value: i64::from(count),
            });
        }
        Ok(count)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Custom(_) => "CUSTOM",
        }
    }
}

/// Parse a player-typed wave count. Surrounding whitespace is ignored; an
/// explicit `+` sign is not a number.
pub fn parse_wave_count(input: &str) -> Result<u32, ConfigError> {
    let not_a_number = || ConfigError::NotANumber {
        input: input.to_string(),
    };
    let trimmed = input.trim();
    if trimmed.starts_with('+') {
        return Err(not_a_number());
    }
    let value: i64 = trimmed.parse().map_err(|_| not_a_number())?;
    if value < MIN_WAVES as i64 || value > MAX_WAVES as i64 {
        return Err(ConfigError::OutOfRange { value });
    }
    Ok(value as u32)
}

/// The settings a menu edits before a game starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameSettings {
    difficulty: Difficulty,
}

impl GameSettings {
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn wave_count(&self) -> u32 {
        self.difficulty.wave_count()
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Switch to custom mode. On error nothing changes.
    pub fn set_custom_wave_count(&mut self, input: &str) -> Result<(), ConfigError> {
        match parse_wave_count(input) {
            Ok(count) => {
                self.difficulty = Difficulty::Custom(count);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(input, "rejected custom wave count: {err}");
                Err(err)
            }
        }
    }
}

// ── Playfield ────────────────────────────────────────────────────────────────

/// Viewport supplied by the platform; every bound is derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Playfield {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Half-open X range new aliens (and teleporting bosses) land in.
    pub fn spawn_x_range(&self) -> std::ops::Range<i32> {
        let hi = (self.width - SPAWN_MARGIN).max(SPAWN_MARGIN + 1);
        SPAWN_MARGIN..hi
    }

    pub fn spawn_y(&self) -> i32 {
        -SPAWN_MARGIN
    }

    pub fn strafe_min_x(&self) -> i32 {
        SPAWN_MARGIN
    }

    pub fn strafe_max_x(&self) -> i32 {
        (self.width - STRAFE_RIGHT_MARGIN).max(SPAWN_MARGIN)
    }

    /// An alien whose bottom edge passes this line ends the game.
    pub fn loss_line(&self) -> i32 {
        self.height - LOSS_LINE_OFFSET
    }

    pub fn ship_rest_y(&self) -> i32 {
        self.height - SHIP_REST_OFFSET
    }

    pub fn ship_left_limit(&self) -> i32 {
        SHIP_EDGE_MARGIN
    }

    pub fn ship_right_limit(&self) -> i32 {
        self.width - SHIP_EDGE_MARGIN
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub tick_interval: Duration,
    pub alien_cadence: Duration,
    pub projectile_cadence: Duration,
    pub background_cadence: Duration,
    pub fire_cooldown: Duration,
    pub spawn_cooldown: Duration,
    /// Taken off the spawn cooldown when wave 6 and wave 9 complete.
    pub spawn_cooldown_step: Duration,
    pub settle_delay: Duration,
    pub intro: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(8),
            alien_cadence: Duration::from_millis(16),
            projectile_cadence: Duration::from_millis(16),
            background_cadence: Duration::from_millis(8),
            fire_cooldown: Duration::from_millis(750),
            spawn_cooldown: Duration::from_millis(2000),
            spawn_cooldown_step: Duration::from_millis(350),
            settle_delay: Duration::from_millis(2000),
            intro: Duration::from_millis(2500),
        }
    }
}

impl Timing {
    /// Defaults, overridden by `SPACE_DEFENDER_*_MS` variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            tick_interval: read_env_ms("SPACE_DEFENDER_TICK_MS", d.tick_interval),
            alien_cadence: read_env_ms("SPACE_DEFENDER_ALIEN_CADENCE_MS", d.alien_cadence),
            projectile_cadence: read_env_ms(
                "SPACE_DEFENDER_PROJECTILE_CADENCE_MS",
                d.projectile_cadence,
            ),
            background_cadence: read_env_ms(
                "SPACE_DEFENDER_BACKGROUND_CADENCE_MS",
                d.background_cadence,
            ),
            fire_cooldown: read_env_ms("SPACE_DEFENDER_FIRE_COOLDOWN_MS", d.fire_cooldown),
            spawn_cooldown: read_env_ms("SPACE_DEFENDER_SPAWN_COOLDOWN_MS", d.spawn_cooldown),
            spawn_cooldown_step: read_env_ms(
                "SPACE_DEFENDER_SPAWN_COOLDOWN_STEP_MS",
                d.spawn_cooldown_step,
            ),
            settle_delay: read_env_ms("SPACE_DEFENDER_SETTLE_DELAY_MS", d.settle_delay),
            intro: read_env_ms("SPACE_DEFENDER_INTRO_MS", d.intro),
        }
    }
}

pub(crate) fn read_env_ms(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or(default)
}
