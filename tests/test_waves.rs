use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use space_defender::config::{parse_wave_count, MAX_WAVES};
use space_defender::entities::{BossKind, GruntClass};
use space_defender::waves::{wave_table, BossState, SpawnRequest, Wave, WaveManager};
use space_defender::{ConfigError, Difficulty, GameSettings, Timing};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Spawn everything the current wave holds, defeating its boss if it has one.
fn drain_wave(waves: &mut WaveManager, rng: &mut StdRng) -> Vec<SpawnRequest> {
    let mut spawned = Vec::new();
    while let Some(request) = waves.next_spawn(rng) {
        spawned.push(request);
    }
    if waves.current().is_boss_wave() {
        waves.boss_defeated();
    }
    spawned
}

// ── Wave ──────────────────────────────────────────────────────────────────────

#[test]
fn regular_wave_is_over_once_counters_are_drained() {
    let mut waves = WaveManager::new(15, &Timing::default());
    let mut rng = seeded_rng();
    assert!(!waves.is_current_wave_over());

    let spawned = drain_wave(&mut waves, &mut rng);
    assert_eq!(spawned.len(), 5);
    assert!(spawned
        .iter()
        .all(|r| *r == SpawnRequest::Grunt(GruntClass::A)));
    assert!(waves.is_current_wave_over());
}

#[test]
fn boss_wave_is_over_only_after_the_boss_dies() {
    let wave = Wave::boss(BossKind::Brute, false);
    assert!(wave.boss_is_live()); // pending counts as live
    assert!(!wave.is_over());

    let mut waves = WaveManager::new(5, &Timing::default());
    let mut rng = seeded_rng();
    for _ in 0..4 {
        drain_wave(&mut waves, &mut rng);
        assert!(waves.advance());
    }
    assert_eq!(waves.current_wave(), 5);

    let first = waves.next_spawn(&mut rng);
    assert!(matches!(
        first,
        Some(SpawnRequest::Boss(tier)) if tier.kind == BossKind::Brute && !tier.reborn
    ));
    // Exactly one boss per boss wave
    assert_eq!(waves.next_spawn(&mut rng), None);
    assert_eq!(
        waves.current().boss_encounter().map(|b| b.state),
        Some(BossState::Alive)
    );
    assert!(!waves.is_current_wave_over());

    waves.boss_defeated();
    assert!(waves.is_current_wave_over());
    assert_eq!(waves.next_spawn(&mut rng), None);
}

#[test]
fn mixed_wave_spawns_every_class_its_counters_hold() {
    let mut waves = WaveManager::new(15, &Timing::default());
    let mut rng = seeded_rng();
    for _ in 0..3 {
        drain_wave(&mut waves, &mut rng);
        waves.advance();
    }
    assert_eq!(waves.current_wave(), 4);

    let spawned = drain_wave(&mut waves, &mut rng);
    let count = |class| {
        spawned
            .iter()
            .filter(|r| **r == SpawnRequest::Grunt(class))
            .count()
    };
    assert_eq!((count(GruntClass::A), count(GruntClass::B), count(GruntClass::C)), (9, 6, 2));
}

#[test]
fn table_counts_match_the_reference_waves() {
    let table = wave_table();
    let counts: Vec<[u32; 3]> = table
        .iter()
        .map(|w| GruntClass::ALL.map(|class| w.remaining(class)))
        .collect();
    assert_eq!(counts[0], [5, 0, 0]);
    assert_eq!(counts[5], [11, 8, 4]);
    assert_eq!(counts[10], [15, 13, 10]);
    assert!(table[4].is_boss_wave());
    assert_eq!(counts[4], [0, 0, 0]);
}

// ── Progression ───────────────────────────────────────────────────────────────

#[test]
fn advance_refuses_unfinished_and_final_waves() {
    let mut waves = WaveManager::new(2, &Timing::default());
    let mut rng = seeded_rng();
    assert!(!waves.advance());
    assert_eq!(waves.current_wave(), 1);

    drain_wave(&mut waves, &mut rng);
    assert!(waves.advance());
    assert_eq!(waves.current_wave(), 2);
    assert!(waves.is_final_wave());

    drain_wave(&mut waves, &mut rng);
    assert!(!waves.advance());
    assert_eq!(waves.current_wave(), 2);
}

#[test]
fn wave_index_only_moves_forward() {
    let mut waves = WaveManager::new(MAX_WAVES, &Timing::default());
    let mut rng = seeded_rng();
    let mut seen = vec![waves.current_wave()];
    while !waves.is_final_wave() {
        drain_wave(&mut waves, &mut rng);
        assert!(waves.advance());
        seen.push(waves.current_wave());
    }
    assert_eq!(seen, (1..=MAX_WAVES).collect::<Vec<_>>());
}

#[test]
fn spawn_cooldown_drops_after_waves_six_and_nine() {
    let timing = Timing::default();
    let mut waves = WaveManager::new(15, &timing);
    let mut rng = seeded_rng();
    let mut cooldowns = Vec::new();
    while !waves.is_final_wave() {
        drain_wave(&mut waves, &mut rng);
        waves.advance();
        cooldowns.push((waves.current_wave(), waves.spawn_cooldown()));
    }
    let at = |wave: u32| {
        cooldowns
            .iter()
            .find(|(w, _)| *w == wave)
            .map(|(_, c)| *c)
    };
    assert_eq!(at(6), Some(Duration::from_millis(2000)));
    assert_eq!(at(7), Some(Duration::from_millis(1650)));
    assert_eq!(at(9), Some(Duration::from_millis(1650)));
    assert_eq!(at(10), Some(Duration::from_millis(1300)));
    assert_eq!(at(15), Some(Duration::from_millis(1300)));
}

#[test]
fn cooldown_is_fresh_for_every_manager() {
    let timing = Timing::default();
    let mut first = WaveManager::new(15, &timing);
    let mut rng = seeded_rng();
    while first.current_wave() < 10 {
        drain_wave(&mut first, &mut rng);
        first.advance();
    }
    assert!(first.spawn_cooldown() < timing.spawn_cooldown);

    let second = WaveManager::new(15, &timing);
    assert_eq!(second.spawn_cooldown(), timing.spawn_cooldown);
}

#[test]
fn rebirth_count_doubles_on_the_last_table_wave() {
    let mut waves = WaveManager::new(15, &Timing::default());
    let mut rng = seeded_rng();
    assert_eq!(waves.rebirth_count(), 1);
    while !waves.is_final_wave() {
        drain_wave(&mut waves, &mut rng);
        waves.advance();
    }
    assert_eq!(waves.current_wave(), 15);
    assert_eq!(waves.rebirth_count(), 2);
}

// ── Difficulty & custom wave counts ───────────────────────────────────────────

#[test]
fn presets_map_to_wave_counts() {
    assert_eq!(Difficulty::Easy.wave_count(), 5);
    assert_eq!(Difficulty::Medium.wave_count(), 8);
    assert_eq!(Difficulty::Hard.wave_count(), 12);
    assert_eq!(Difficulty::Custom(3).wave_count(), 3);
}

#[test]
fn custom_wave_count_accepts_one_through_fifteen() {
    for n in 1..=15u32 {
        assert_eq!(parse_wave_count(&n.to_string()), Ok(n));
    }
    assert_eq!(parse_wave_count(" 7 "), Ok(7));
}

#[test]
fn custom_wave_count_rejects_bad_input() {
    assert_eq!(parse_wave_count("0"), Err(ConfigError::OutOfRange { value: 0 }));
    assert_eq!(parse_wave_count("16"), Err(ConfigError::OutOfRange { value: 16 }));
    assert_eq!(parse_wave_count("-3"), Err(ConfigError::OutOfRange { value: -3 }));
    assert!(matches!(parse_wave_count("abc"), Err(ConfigError::NotANumber { .. })));
    assert!(matches!(parse_wave_count(""), Err(ConfigError::NotANumber { .. })));
}

#[test]
fn custom_wave_count_ignores_padding_but_not_a_plus_sign() {
    assert_eq!(parse_wave_count(" 5 "), Ok(5));
    assert_eq!(parse_wave_count("\t12\n"), Ok(12));
    assert_eq!(
        parse_wave_count("+5"),
        Err(ConfigError::NotANumber {
            input: "+5".to_string()
        })
    );
    assert!(matches!(parse_wave_count(" +5"), Err(ConfigError::NotANumber { .. })));
}

#[test]
fn checked_wave_count_guards_custom_difficulty() {
    assert_eq!(Difficulty::Hard.checked_wave_count(), Ok(12));
    assert_eq!(Difficulty::Custom(MAX_WAVES).checked_wave_count(), Ok(MAX_WAVES));
    assert_eq!(
        Difficulty::Custom(0).checked_wave_count(),
        Err(ConfigError::OutOfRange { value: 0 })
    );
    assert_eq!(
        Difficulty::Custom(16).checked_wave_count(),
        Err(ConfigError::OutOfRange { value: 16 })
    );
}

#[test]
fn rejected_custom_count_leaves_settings_unchanged() {
    let mut settings = GameSettings::default();
    settings.set_difficulty(Difficulty::Hard);

    let err = settings.set_custom_wave_count("16").unwrap_err();
    assert!(err.to_string().contains("between 1 and 15"));
    assert_eq!(settings.difficulty(), Difficulty::Hard);

    settings.set_custom_wave_count("4").unwrap();
    assert_eq!(settings.difficulty(), Difficulty::Custom(4));
    assert_eq!(settings.wave_count(), 4);
}

#[test]
fn manager_clamps_out_of_range_totals() {
    assert_eq!(WaveManager::new(0, &Timing::default()).total_waves(), 1);
    assert_eq!(WaveManager::new(99, &Timing::default()).total_waves(), 15);
}
