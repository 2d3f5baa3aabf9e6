use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use space_defender::entities::{AlienKind, BossKind, Point, Projectile, Ship};
use space_defender::{Game, GameEvent, GamePhase, GameSession, Intents, Playfield, Timing};

const STEP: Duration = Duration::from_millis(10);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Short spawn and settle timers so whole games fit in a few thousand ticks.
fn fast_timing() -> Timing {
    Timing {
        spawn_cooldown: ms(10),
        settle_delay: ms(50),
        ..Timing::default()
    }
}

fn new_game(waves: u32, timing: Timing) -> Game<StdRng> {
    let session = Arc::new(GameSession::new(Playfield::default()));
    Game::new(session, waves, timing, StdRng::seed_from_u64(42))
}

fn started(waves: u32, timing: Timing) -> (Game<StdRng>, Vec<GameEvent>) {
    let mut game = new_game(waves, timing);
    let mut events = Vec::new();
    game.begin(Duration::ZERO, &mut events);
    (game, events)
}

fn firing() -> Intents {
    Intents {
        firing: true,
        ..Intents::default()
    }
}

/// Purge dead aliens and queue one lethal shot per live alien, standing in
/// for the alien stepper and the player.
fn doom_all(session: &GameSession) {
    session.aliens().retain(|alien| alien.active);
    let targets: Vec<Point> = session
        .aliens()
        .iter_mut()
        .map(|alien| {
            alien.health = 1;
            alien.position
        })
        .collect();
    let mut projectiles = session.projectiles();
    projectiles.clear();
    projectiles.extend(
        targets
            .into_iter()
            .map(|at| Projectile::new(Point::new(at.x + 20, at.y + 10))),
    );
}

fn play_until(
    game: &mut Game<StdRng>,
    now: &mut Duration,
    events: &mut Vec<GameEvent>,
    done: impl Fn(&Game<StdRng>, &[GameEvent]) -> bool,
) {
    for _ in 0..50_000 {
        *now += STEP;
        game.tick(Intents::default(), *now, events);
        if done(game, events) {
            return;
        }
        doom_all(game.session());
    }
    panic!("game never reached the expected state");
}

// ── Intro ─────────────────────────────────────────────────────────────────────

#[test]
fn intro_flies_the_ship_in_then_starts() {
    let mut game = new_game(5, Timing::default());
    let mut events = Vec::new();
    let rest = Ship::at_rest(game.session().playfield()).position;

    let mut now = Duration::ZERO;
    while now < ms(2490) {
        assert_eq!(game.tick(firing(), now, &mut events), GamePhase::Starting);
        now += STEP;
    }
    assert_eq!(game.ship().position, rest);
    assert!(events.is_empty());
    assert!(game.session().aliens().is_empty());
    assert!(game.session().projectiles().is_empty());

    assert_eq!(game.tick(Intents::default(), ms(2500), &mut events), GamePhase::Running);
    assert_eq!(events, vec![GameEvent::GameStarted { total_waves: 5 }]);
}

// ── Ship & firing ─────────────────────────────────────────────────────────────

#[test]
fn ship_follows_intents() {
    let (mut game, mut events) = started(5, Timing::default());
    let x = game.ship().position.x;

    let left = Intents {
        move_left: true,
        ..Intents::default()
    };
    game.tick(left, ms(1), &mut events);
    assert_eq!(game.ship().position.x, x - Ship::SPEED);

    game.tick(Intents::default(), ms(2), &mut events);
    assert_eq!(game.ship().position.x, x - Ship::SPEED);
}

#[test]
fn firing_respects_the_cooldown() {
    let (mut game, mut events) = started(5, Timing::default());
    events.clear();

    game.tick(firing(), ms(100), &mut events);
    game.tick(firing(), ms(500), &mut events);
    game.tick(firing(), ms(849), &mut events);
    assert_eq!(game.session().projectiles().len(), 1);

    game.tick(firing(), ms(850), &mut events);
    assert_eq!(game.session().projectiles().len(), 2);

    let shots = events.iter().filter(|e| **e == GameEvent::ShotFired).count();
    assert_eq!(shots, 2);

    let muzzle = game.ship().muzzle();
    assert_eq!(game.session().projectiles()[0].position, muzzle);
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn spawns_wait_for_the_cooldown() {
    let (mut game, mut events) = started(5, Timing::default());

    game.tick(Intents::default(), ms(1999), &mut events);
    assert!(game.session().aliens().is_empty());

    game.tick(Intents::default(), ms(2000), &mut events);
    let aliens = game.session().aliens();
    assert_eq!(aliens.len(), 1);
    let field = Playfield::default();
    assert!(field.spawn_x_range().contains(&aliens[0].position.x));
    assert_eq!(aliens[0].position.y, field.spawn_y());
}

#[test]
fn boss_wave_spawns_a_single_boss() {
    let (mut game, mut events) = started(5, fast_timing());
    let mut now = Duration::ZERO;
    play_until(&mut game, &mut now, &mut events, |_, events| {
        events.contains(&GameEvent::BossEncountered {
            kind: BossKind::Brute,
        })
    });
    assert_eq!(game.waves().current_wave(), 5);

    // Without shots the boss wave never produces anything else
    for _ in 0..20 {
        now += STEP;
        game.tick(Intents::default(), now, &mut events);
    }
    let aliens = game.session().aliens();
    let bosses: Vec<_> = aliens.iter().filter(|a| a.kind.is_boss()).collect();
    assert_eq!(bosses.len(), 1);
    assert_eq!(aliens.len(), 1);
}

// ── Wave completion ───────────────────────────────────────────────────────────

#[test]
fn settle_delay_runs_before_the_game_is_won() {
    let (mut game, mut events) = started(1, fast_timing());
    let mut now = Duration::ZERO;
    play_until(&mut game, &mut now, &mut events, |_, events| {
        events.contains(&GameEvent::WaveCleared { wave: 1 })
    });
    let cleared_at = now;

    while now + STEP < cleared_at + ms(50) {
        now += STEP;
        assert_eq!(game.tick(Intents::default(), now, &mut events), GamePhase::Running);
    }
    assert_eq!(
        game.tick(Intents::default(), cleared_at + ms(50), &mut events),
        GamePhase::Won
    );
    assert_eq!(events.last(), Some(&GameEvent::GameWon));
    let cleared = events
        .iter()
        .filter(|e| matches!(e, GameEvent::WaveCleared { .. }))
        .count();
    assert_eq!(cleared, 1);
}

#[test]
fn easy_game_plays_through_to_a_win() {
    let (mut game, mut events) = started(5, fast_timing());
    let mut now = Duration::ZERO;
    play_until(&mut game, &mut now, &mut events, |game, _| {
        game.phase() == GamePhase::Won
    });

    let advanced: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::WaveAdvanced { wave, total: 5 } => Some(*wave),
            _ => None,
        })
        .collect();
    assert_eq!(advanced, vec![2, 3, 4, 5]);
    assert!(events.contains(&GameEvent::BossDefeated {
        kind: BossKind::Brute
    }));
    assert_eq!(events.last(), Some(&GameEvent::GameWon));
    assert_eq!(game.waves().current_wave(), 5);

    // A finished game ignores further ticks
    let before = events.len();
    game.tick(firing(), now + ms(5000), &mut events);
    assert_eq!(events.len(), before);
}

#[test]
fn splitter_kill_spawns_reborn_offspring() {
    let (mut game, mut events) = started(15, fast_timing());
    let mut now = Duration::ZERO;
    play_until(&mut game, &mut now, &mut events, |_, events| {
        events.contains(&GameEvent::BossEncountered {
            kind: BossKind::Splitter,
        })
    });
    assert_eq!(game.waves().current_wave(), 12);

    doom_all(game.session());
    now += STEP;
    game.tick(Intents::default(), now, &mut events);

    let aliens = game.session().aliens();
    let offspring: Vec<_> = aliens.iter().filter(|a| a.offspring).collect();
    assert_eq!(offspring.len(), 1);
    assert_eq!(offspring[0].kind, AlienKind::Boss(BossKind::Splitter));
    assert!(offspring[0].reborn);
    assert_eq!(offspring[0].health, 2);
    drop(aliens);

    // Killing the offspring finishes the wave
    play_until(&mut game, &mut now, &mut events, |game, _| {
        game.waves().current_wave() == 13
    });
}

// ── Loss ──────────────────────────────────────────────────────────────────────

#[test]
fn loss_flag_ends_the_game() {
    let (mut game, mut events) = started(5, Timing::default());
    events.clear();
    game.session().mark_lost();

    assert_eq!(game.tick(firing(), ms(10), &mut events), GamePhase::Lost);
    assert_eq!(events, vec![GameEvent::GameLost]);

    game.tick(firing(), ms(5000), &mut events);
    assert_eq!(events, vec![GameEvent::GameLost]);
    assert!(game.session().projectiles().is_empty());
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_serialises_to_json() {
    let (mut game, mut events) = started(8, Timing::default());
    game.tick(firing(), ms(2000), &mut events);

    let snapshot = game.snapshot();
    assert_eq!(snapshot.wave, 1);
    assert_eq!(snapshot.total_waves, 8);
    assert_eq!(snapshot.aliens.len(), 1);
    assert_eq!(snapshot.projectiles.len(), 1);

    let json = snapshot.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["phase"], "Running");
    assert_eq!(value["total_waves"], 8);
}
