use std::time::Duration;

use space_defender::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use space_defender::{ConfigError, Difficulty, GameError, GameSettings, Playfield, Timing};

#[test]
fn default_playfield_is_the_reference_viewport() {
    let field = Playfield::default();
    assert_eq!((field.width, field.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    assert_eq!(field.spawn_y(), -100);
    assert_eq!(field.strafe_min_x(), 100);
    assert_eq!(field.ship_left_limit(), 10);
    assert_eq!(field.ship_right_limit(), 1412);
}

#[test]
fn bounds_follow_the_viewport_size() {
    let field = Playfield::new(800, 600);
    assert_eq!(field.spawn_x_range(), 100..700);
    assert_eq!(field.strafe_max_x(), 750);
    assert_eq!(field.loss_line(), 497);
    assert_eq!(field.ship_rest_y(), 487);
}

#[test]
fn tiny_viewport_keeps_a_usable_spawn_range() {
    let field = Playfield::new(150, 300);
    let range = field.spawn_x_range();
    assert!(!range.is_empty());
    assert_eq!(range.start, 100);
}

#[test]
fn timing_defaults() {
    let t = Timing::default();
    assert_eq!(t.tick_interval, Duration::from_millis(8));
    assert_eq!(t.alien_cadence, Duration::from_millis(16));
    assert_eq!(t.projectile_cadence, Duration::from_millis(16));
    assert_eq!(t.background_cadence, Duration::from_millis(8));
    assert_eq!(t.fire_cooldown, Duration::from_millis(750));
    assert_eq!(t.spawn_cooldown, Duration::from_millis(2000));
    assert_eq!(t.spawn_cooldown_step, Duration::from_millis(350));
    assert_eq!(t.settle_delay, Duration::from_millis(2000));
    assert_eq!(t.intro, Duration::from_millis(2500));
}

#[test]
fn timing_reads_overrides_from_the_environment() {
    std::env::set_var("SPACE_DEFENDER_TICK_MS", "25");
    std::env::set_var("SPACE_DEFENDER_INTRO_MS", "soon");
    std::env::set_var("SPACE_DEFENDER_SETTLE_DELAY_MS", "0");

    let t = Timing::from_env();
    assert_eq!(t.tick_interval, Duration::from_millis(25));
    // Garbage and zero fall back to the defaults
    assert_eq!(t.intro, Duration::from_millis(2500));
    assert_eq!(t.settle_delay, Duration::from_millis(2000));

    std::env::remove_var("SPACE_DEFENDER_TICK_MS");
    std::env::remove_var("SPACE_DEFENDER_INTRO_MS");
    std::env::remove_var("SPACE_DEFENDER_SETTLE_DELAY_MS");
}

#[test]
fn settings_default_to_easy() {
    let settings = GameSettings::default();
    assert_eq!(settings.difficulty(), Difficulty::Easy);
    assert_eq!(settings.wave_count(), 5);
    assert_eq!(Difficulty::Custom(9).label(), "CUSTOM");
}

#[test]
fn config_errors_read_well() {
    let not_a_number = ConfigError::NotANumber {
        input: "abc".to_string(),
    };
    assert_eq!(
        not_a_number.to_string(),
        "wave count must be a number between 1 and 15 (got \"abc\")"
    );

    let wrapped = GameError::from(ConfigError::OutOfRange { value: 0 });
    assert_eq!(wrapped.to_string(), "wave count must be between 1 and 15 (got 0)");
}
