//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable snapshot of the
//! game.  No game logic is performed; this module only translates playfield
//! coordinates into terminal cells and queues crossterm commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use space_defender::entities::{AlienKind, AlienSprite, BossKind, GruntClass, ShipSprite};
use space_defender::events::{AlienSnapshot, ProjectileSnapshot, ShipSnapshot, Snapshot};
use space_defender::Playfield;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_WAVE: Color = Color::Yellow;
const C_HUD_MESSAGE: Color = Color::Cyan;
const C_SHIP: Color = Color::White;
const C_GRUNT_A: Color = Color::Green;
const C_GRUNT_B: Color = Color::Yellow;
const C_GRUNT_C: Color = Color::Red;
const C_BOSS: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::DarkYellow;
const C_PROJECTILE: Color = Color::Cyan;
const C_STARS: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;

/// Text overlays that come from events rather than the snapshot.
#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub difficulty: &'static str,
    pub message: Option<String>,
    pub banner: Option<(String, Color)>,
}

/// Maps playfield units onto the terminal area inside the border.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    field: Playfield,
    cols: u16,
    rows: u16,
}

impl Viewport {
    fn col(&self, x: i32) -> Option<u16> {
        let inner = self.cols.saturating_sub(2) as i64;
        let c = x as i64 * inner / self.field.width.max(1) as i64;
        (0..inner).contains(&c).then(|| c as u16 + 1)
    }

    fn row(&self, y: i32) -> Option<u16> {
        let inner = self.rows.saturating_sub(4) as i64;
        let r = y as i64 * inner / self.field.height.max(1) as i64;
        (0..inner).contains(&r).then(|| r as u16 + 2)
    }

    fn cell(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        Some((self.col(x)?, self.row(y)?))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    hud: &Hud,
    field: Playfield,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let view = Viewport { field, cols, rows };

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_stars(out, &view, snapshot.background_offset)?;
    draw_border(out, &view)?;
    draw_hud(out, &view, snapshot, hud)?;

    for alien in &snapshot.aliens {
        draw_alien(out, &view, alien)?;
    }
    for projectile in snapshot.projectiles.iter().filter(|p| p.active) {
        draw_projectile(out, &view, projectile)?;
    }
    if let Some(ship) = &snapshot.ship {
        draw_ship(out, &view, ship)?;
    }
    draw_controls_hint(out, &view)?;

    if let Some((text, color)) = &hud.banner {
        draw_banner(out, &view, text, *color)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

/// Sparse starfield that scrolls with the backdrop offset.
fn draw_stars<W: Write>(out: &mut W, view: &Viewport, offset: i32) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_STARS))?;
    let spacing = view.field.height / 6;
    for i in 0..6 {
        let y = (i * spacing + offset) % view.field.height.max(1);
        let x = (i * 7919 + 311) % view.field.width.max(1);
        if let Some((col, row)) = view.cell(x, y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print("."))?;
        }
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    view: &Viewport,
    snapshot: &Snapshot,
    hud: &Hud,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WAVE))?;
    out.queue(Print(format!(
        "Wave:{:>2}/{:<2}  [ {} ]  {}",
        snapshot.wave, snapshot.total_waves, hud.difficulty, snapshot.phase
    )))?;

    if let Some(message) = &hud.message {
        let x = view.cols.saturating_sub(message.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(x, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_MESSAGE))?;
        out.queue(Print(message))?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_alien<W: Write>(out: &mut W, view: &Viewport, alien: &AlienSnapshot) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(alien.position.x, alien.position.y) else {
        return Ok(());
    };

    let (color, glyph) = match (alien.sprite, alien.kind) {
        (AlienSprite::Exploding(1), _) => (C_EXPLOSION, "*"),
        (AlienSprite::Exploding(2), _) => (C_EXPLOSION, "✶"),
        (AlienSprite::Exploding(_), _) => (C_EXPLOSION, "·"),
        (sprite, AlienKind::Grunt(class)) => {
            let a = sprite == AlienSprite::FrameA;
            match class {
                GruntClass::A => (C_GRUNT_A, if a { "/o\\" } else { "\\o/" }),
                GruntClass::B => (C_GRUNT_B, if a { "<v>" } else { ">v<" }),
                GruntClass::C => (C_GRUNT_C, if a { "<#=" } else { "=#>" }),
            }
        }
        (_, AlienKind::Boss(kind)) => {
            let glyph = match (kind, alien.reborn) {
                (BossKind::Brute, false) => "[@@]",
                (BossKind::Brute, true) => "{@@}",
                (BossKind::Teleporter, false) => "[??]",
                (BossKind::Teleporter, true) => "{??}",
                (BossKind::Splitter, false) => "[%%]",
                (BossKind::Splitter, true) => "{%%}",
            };
            (C_BOSS, glyph)
        }
    };

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_projectile<W: Write>(
    out: &mut W,
    view: &Viewport,
    projectile: &ProjectileSnapshot,
) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(projectile.position.x, projectile.position.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_PROJECTILE))?;
        out.queue(Print("|"))?;
    }
    Ok(())
}

fn draw_ship<W: Write>(out: &mut W, view: &Viewport, ship: &ShipSnapshot) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(ship.position.x, ship.position.y) else {
        return Ok(());
    };
    let glyph = match ship.sprite {
        ShipSprite::Idle => "/^\\",
        ShipSprite::Left => "<^\\",
        ShipSprite::Right => "/^>",
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_SHIP))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── Hints & overlays ──────────────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   P : Pause   Q : Quit"))?;
    Ok(())
}

fn draw_banner<W: Write>(
    out: &mut W,
    view: &Viewport,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let cy = view.rows / 2;
    let hint = "R : Menu   Q : Quit";
    out.queue(cursor::MoveTo(cx.saturating_sub(text.chars().count() as u16 / 2), cy))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    out.queue(cursor::MoveTo(cx.saturating_sub(hint.len() as u16 / 2), cy + 2))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}
