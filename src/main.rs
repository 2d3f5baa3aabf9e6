mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing_subscriber::EnvFilter;

use space_defender::config::{MAX_WAVES, MIN_WAVES};
use space_defender::{
    Difficulty, GameEvent, GameRunner, GameSettings, Intents, Playfield, RunnerState, Timing,
};

use display::Hud;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// How long an event message stays in the HUD.
const MESSAGE_FRAMES: u64 = 60;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Medium => Difficulty::Medium,
            Level::Hard => Difficulty::Hard,
        }
    }
}

/// Terminal space shooter.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Start straight into a game at this difficulty.
    #[arg(long, value_enum, conflicts_with = "waves")]
    difficulty: Option<Level>,

    /// Start straight into a custom game with this many waves (1-15).
    #[arg(long)]
    waves: Option<String>,

    /// Seed for alien spawn positions and wave composition.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (nothing is logged otherwise).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn init_tracing(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Difficulty),
    Quit,
}

fn draw_menu<W: Write>(
    out: &mut W,
    settings: &GameSettings,
    entry: Option<&str>,
    error: Option<&str>,
) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  SPACE  DEFENDER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let custom = format!("{MIN_WAVES}-{MAX_WAVES} waves of your choice");
    let options: [(&str, &str, Color, &str); 4] = [
        ("1", "Easy  ", Color::Green, "5 waves"),
        ("2", "Medium", Color::Yellow, "8 waves"),
        ("3", "Hard  ", Color::Red, "12 waves"),
        ("4", "Custom", Color::Magenta, custom.as_str()),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{key}] ")))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{label:<8}")))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {desc}")))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print(format!(
        "Last choice: {} ({} waves)",
        settings.difficulty().label(),
        settings.wave_count()
    )))?;

    if let Some(entry) = entry {
        out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 6))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(format!("Number of waves: {entry}_   (ENTER to start, ESC to cancel)")))?;
    }
    if let Some(error) = error {
        out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 7))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(error))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 9))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &mut GameSettings,
) -> io::Result<MenuResult> {
    // `Some` while the player is typing a custom wave count.
    let mut entry: Option<String> = None;
    let mut error: Option<String> = None;

    loop {
        draw_menu(out, settings, entry.as_deref(), error.as_deref())?;

        let Ok(event) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        if let Some(text) = entry.as_mut() {
            match code {
                KeyCode::Char(c) if !c.is_control() && text.len() < 8 => text.push(c),
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Esc => {
                    entry = None;
                    error = None;
                }
                KeyCode::Enter => match settings.set_custom_wave_count(text) {
                    Ok(()) => return Ok(MenuResult::Start(settings.difficulty())),
                    Err(err) => {
                        error = Some(err.to_string());
                        text.clear();
                    }
                },
                _ => {}
            }
            continue;
        }

        let preset = match code {
            KeyCode::Char('1') => Some(Difficulty::Easy),
            KeyCode::Char('2') => Some(Difficulty::Medium),
            KeyCode::Char('3') => Some(Difficulty::Hard),
            KeyCode::Char('4') => {
                entry = Some(String::new());
                error = None;
                None
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => None,
        };
        if let Some(difficulty) = preset {
            settings.set_difficulty(difficulty);
            return Ok(MenuResult::Start(difficulty));
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn event_message(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::GameStarted { total_waves } => Some(format!("{total_waves} waves incoming")),
        GameEvent::BossEncountered { kind } => Some(format!("Boss approaching: {kind:?}")),
        GameEvent::BossDefeated { kind } => Some(format!("{kind:?} defeated!")),
        GameEvent::WaveCleared { wave } => Some(format!("Wave {wave} cleared")),
        GameEvent::WaveAdvanced { wave, total } => Some(format!("Wave {wave} of {total}")),
        GameEvent::ShotFired | GameEvent::AlienDestroyed { .. } => None,
        GameEvent::GameWon | GameEvent::GameLost => None,
    }
}

/// Returns `true` → quit program, `false` → back to menu.
///
/// Held keys are tracked in a `key_frame` map holding the frame each key was
/// last seen. Every frame the fresh keys become the runner's intents, so
/// Space + A/D can be held together.
fn game_loop<W: Write>(
    out: &mut W,
    runner: &GameRunner,
    events: &mpsc::Receiver<GameEvent>,
    rx: &mpsc::Receiver<Event>,
    playfield: Playfield,
    difficulty: Difficulty,
) -> io::Result<bool> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut hud = Hud {
        difficulty: difficulty.label(),
        ..Hud::default()
    };
    let mut message_until: u64 = 0;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let state = runner.state();
        let over = matches!(state, RunnerState::Won | RunnerState::Lost);

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            if state == RunnerState::Paused {
                                runner.resume();
                            } else {
                                runner.pause();
                            }
                            key_frame.clear();
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if over => {
                            return Ok(false);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Held keys → intents ───────────────────────────────────────────────
        let held = |keys: &[KeyCode]| keys.iter().any(|key| is_held(&key_frame, key, frame));
        runner.set_intents(Intents {
            move_left: held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            move_right: held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            firing: held(&[KeyCode::Char(' ')]),
        });

        // ── Events → HUD ──────────────────────────────────────────────────────
        while let Ok(event) = events.try_recv() {
            match event {
                GameEvent::GameWon => hud.banner = Some(("YOU WIN!".to_string(), Color::Green)),
                GameEvent::GameLost => hud.banner = Some(("GAME OVER".to_string(), Color::Red)),
                ref other => {
                    if let Some(message) = event_message(other) {
                        hud.message = Some(message);
                        message_until = frame + MESSAGE_FRAMES;
                    }
                }
            }
        }
        if frame > message_until {
            hud.message = None;
        }

        if let Some(snapshot) = runner.snapshot() {
            let mut frame_hud = hud.clone();
            if state == RunnerState::Paused {
                frame_hud.banner = Some(("PAUSED".to_string(), Color::Yellow));
            }
            display::render(out, &snapshot, &frame_hud, playfield)?;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut settings = GameSettings::default();
    let mut first_game = args.difficulty.map(Difficulty::from);
    if let Some(waves) = &args.waves {
        if let Err(err) = settings.set_custom_wave_count(waves) {
            Args::command()
                .error(clap::error::ErrorKind::InvalidValue, err)
                .exit();
        }
        first_game = Some(settings.difficulty());
    }

    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the game loop never
    // waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &args, settings, first_game);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    args: &Args,
    mut settings: GameSettings,
    mut next_game: Option<Difficulty>,
) -> io::Result<()> {
    let playfield = Playfield::default();
    let (runner, events) = GameRunner::new(playfield, Timing::from_env());
    let mut runner = match args.seed {
        Some(seed) => runner.with_seed(seed),
        None => runner,
    };

    loop {
        let difficulty = match next_game.take() {
            Some(difficulty) => difficulty,
            None => match show_menu(out, rx, &mut settings)? {
                MenuResult::Quit => break,
                MenuResult::Start(difficulty) => difficulty,
            },
        };

        runner
            .start(difficulty)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let quit = game_loop(out, &runner, &events, rx, playfield, difficulty);
        runner.stop();
        // Events of the finished game must not leak into the next HUD.
        while events.try_recv().is_ok() {}

        if quit? {
            break;
        }
    }
    Ok(())
}
