/// Terminal renderer.
///
/// Each frame is composed into `front`, then only the cells that differ
/// from `back` (the frame on screen) are written, batched with `queue!`.
/// A repaint (first frame, resize, phase change) writes everything.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Facing;
use crate::domain::tile::{Fuse, MineralKind, Tile};
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

/// What occupies one terminal column.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Glyph {
    Narrow(char),
    /// Spans this column and the next; the next holds `Tail`.
    Wide(char),
    Tail,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    glyph: Glyph,
    fg: Color,
    bg: Color,
}

/// Background for every cell, so nothing falls back to the terminal default.
const BASE_BG: Color = Color::Rgb { r: 34, g: 34, b: 34 };

const BLANK: Cell = Cell { glyph: Glyph::Narrow(' '), fg: Color::White, bg: BASE_BG };

fn base_bg(bg: Color) -> Color {
    if bg == Color::Reset { BASE_BG } else { bg }
}

impl Cell {
    fn narrow(c: char, fg: Color, bg: Color) -> Self {
        Cell { glyph: Glyph::Narrow(c), fg, bg: base_bg(bg) }
    }

    fn wide(c: char, bg: Color) -> Self {
        Cell { glyph: Glyph::Wide(c), fg: Color::Reset, bg: base_bg(bg) }
    }

    fn tail(bg: Color) -> Self {
        Cell { glyph: Glyph::Tail, fg: Color::Reset, bg: base_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![BLANK; w * h] }
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::narrow(ch, fg, bg));
        }
    }

    /// Paint a full-width bar and write `s` on it.
    fn put_bar(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::narrow(' ', fg, bg));
        }
        self.put_str(0, y, s, fg, bg);
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 60, g: 45, b: 10 };
const FRAME: Color = Color::Rgb { r: 250, g: 204, b: 21 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const LAVA_FG: Color = Color::Rgb { r: 255, g: 140, b: 0 };
const LAVA_BG: Color = Color::Rgb { r: 170, g: 30, b: 0 };
const BOMB_LIT: Color = Color::Rgb { r: 255, g: 0, b: 0 };
const BOMB_DIM: Color = Color::Rgb { r: 128, g: 0, b: 0 };

fn mineral_color(kind: MineralKind) -> Color {
    match kind {
        MineralKind::Dirt => Color::Rgb { r: 139, g: 69, b: 19 },
        MineralKind::Copper => Color::Rgb { r: 184, g: 115, b: 51 },
        MineralKind::Silver => Color::Rgb { r: 192, g: 192, b: 192 },
        MineralKind::Gold => Color::Rgb { r: 255, g: 215, b: 0 },
        MineralKind::Diamond => Color::Rgb { r: 0, g: 255, b: 255 },
        MineralKind::SweetPotato => Color::Rgb { r: 255, g: 160, b: 122 },
    }
}

/// Two glyphs + colors for one map cell.
///
/// Minerals show their remaining health once chipped. Armed bombs show
/// the countdown and flash with `blink`; on their last tick they stay lit.
fn tile_style(tile: Tile, blink: bool) -> (char, char, Color, Color) {
    match tile {
        Tile::Empty => (' ', ' ', Color::Reset, Color::Reset),
        Tile::Lava => ('≈', '≈', LAVA_FG, LAVA_BG),
        Tile::Mineral { kind, health } => {
            let bg = mineral_color(kind);
            if health < kind.base_health() {
                let digit = char::from_digit(health.min(9), 10).unwrap_or('+');
                ('░', digit, Color::Black, bg)
            } else {
                (' ', ' ', Color::Black, bg)
            }
        }
        Tile::Bomb { fuse: Fuse::Inactive } => ('(', ')', Color::White, BOMB_DIM),
        Tile::Bomb { fuse: Fuse::Armed(n) } => {
            let digit = char::from_digit(n.min(9), 10).unwrap_or('+');
            let bg = if n <= 1 || blink { BOMB_LIT } else { BOMB_DIM };
            ('*', digit, Color::White, bg)
        }
    }
}

fn hud_text(w: &WorldState) -> String {
    let p = &w.snapshot.player;
    let hearts: String = (0..p.max_health)
        .map(|i| if i < p.health { '♥' } else { '♡' })
        .collect();
    format!(
        " {hearts}  Lv {}  XP {}/{}  Drill {}  Depth {}  Mined {}  T {} ",
        p.level, p.xp, p.xp_to_next_level, p.drill_power, p.y, p.minerals_mined, w.tick,
    )
}

// ── Renderer ──

/// Each map cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// Left frame column; the map starts one column after it.
const MAP_COL: usize = 1;

/// Walking dog when facing left, dog face when facing right.
fn player_glyph(facing: Facing) -> char {
    match facing {
        Facing::Left => '🐕',
        Facing::Right => '🐶',
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    /// Next flush writes every cell, not just the changed ones.
    repaint: bool,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            repaint: true,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size()?;
        log::debug!("terminal {tw}x{th}");
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front = FrameBuffer::new(tw, th);
            self.back = FrameBuffer::new(tw, th);
            self.repaint = true;
        }

        // Viewport height: terminal rows minus HUD, gap, message and help,
        // capped at the configured visible height.
        let reserved_rows = MAP_ROW + 3;
        let max_view_h = th.saturating_sub(reserved_rows).max(1);
        let view_h = max_view_h.min(world.cfg.map_height.max(1));
        if world.camera.view_h != view_h {
            world.camera.view_h = view_h;
            world.camera.center_on(world.snapshot.player.y, world.snapshot.map.height());
        }

        if self.last_phase != Some(world.phase) {
            self.repaint = true;
            self.last_phase = Some(world.phase);
        }
        if self.repaint {
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_game(world);
        match world.phase {
            Phase::GameOver => self.compose_game_over(world),
            Phase::Playing if world.paused => self.compose_pause_overlay(world),
            Phase::Playing => {}
        }

        self.flush_diff()?;
        self.repaint = false;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Write the cells that differ from the previous frame.
    /// A wide glyph is rewritten when either of its two columns changed.
    fn flush_diff(&mut self) -> io::Result<()> {
        let mut fg = Color::White;
        let mut bg = BASE_BG;
        // Where the terminal cursor sits, if known.
        let mut cursor: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let (text, span) = match cell.glyph {
                    Glyph::Tail => continue,
                    Glyph::Narrow(c) => (c, 1),
                    Glyph::Wide(c) => (c, 2),
                };
                let changed = self.repaint
                    || (x..x + span).any(|cx| self.front.get(cx, y) != self.back.get(cx, y));
                if !changed {
                    continue;
                }

                if cursor != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != fg {
                    fg = cell.fg;
                    queue!(self.writer, SetForegroundColor(fg))?;
                }
                if cell.bg != bg {
                    bg = cell.bg;
                    queue!(self.writer, SetBackgroundColor(bg))?;
                }
                queue!(self.writer, Print(text))?;
                cursor = Some((x + span, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let cam = &w.camera;
        let map = &w.snapshot.map;
        let map_cols = map.width() * CELL_W;

        // ── HUD row ──
        self.front.put_bar(HUD_ROW, &hud_text(w), Color::White, HUD_BG);

        // ── Map (camera viewport) with side frame ──
        for vy in 0..cam.view_h {
            let row = MAP_ROW + vy;
            if row >= self.front.height { break; }
            self.front.set(MAP_COL - 1, row, Cell::narrow('│', FRAME, Color::Reset));
            self.front.set(MAP_COL + map_cols, row, Cell::narrow('│', FRAME, Color::Reset));

            let Some(tiles) = map.row(cam.y + vy) else { continue };
            for (gx, &tile) in tiles.iter().enumerate() {
                let (c0, c1, fg, bg) = tile_style(tile, w.blink);
                let col = MAP_COL + gx * CELL_W;
                self.front.set(col, row, Cell::narrow(c0, fg, bg));
                self.front.set(col + 1, row, Cell::narrow(c1, fg, bg));
            }
        }

        // ── Player, lifted one row during a hop ──
        let p = &w.snapshot.player;
        if let Some(vy) = cam.world_to_view(p.y) {
            let vy = if w.hop_pending { vy.saturating_sub(1) } else { vy };
            let col = MAP_COL + p.x * CELL_W;
            let bg = self.front.get(col, MAP_ROW + vy).bg;
            self.front.set(col, MAP_ROW + vy, Cell::wide(player_glyph(p.facing), bg));
            self.front.set(col + 1, MAP_ROW + vy, Cell::tail(bg));
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + cam.view_h;
        if !w.message.is_empty() {
            self.front.put_bar(msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " ←/A →/D: Move  F1/P: Pause  R: Restart  Q/Esc: Quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let p = &w.snapshot.player;
        let red = Color::Rgb { r: 255, g: 60, b: 60 };
        let box_art = [
            "╔══════════════════╗",
            "║    GAME  OVER    ║",
            "╚══════════════════╝",
        ];
        let y0 = MAP_ROW + 2;
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(MAP_COL, y0 + i, l, red, Color::Reset);
        }
        let lines = [
            format!(" ◈ Depth:  {}", p.y),
            format!(" ◈ Level:  {}", p.level),
            format!(" ◈ Mined:  {}", p.minerals_mined),
            format!(" ◈ Seed:   {}", w.seed),
        ];
        for (i, l) in lines.iter().enumerate() {
            self.front.put_str(MAP_COL, y0 + 4 + i, l, Color::White, Color::Reset);
        }
        let green = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(MAP_COL, y0 + 9, " ▸ ENTER / R: Dig again", green, Color::Reset);
        self.front.put_str(MAP_COL, y0 + 10, " ▸ ESC / Q:   Quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let key_c = Color::Rgb { r: 100, g: 200, b: 255 };

        let box_w = (w.snapshot.map.width() * CELL_W).min(self.front.width.saturating_sub(MAP_COL));
        let box_h = 7_usize.min(w.camera.view_h);
        let box_y = MAP_ROW + w.camera.view_h.saturating_sub(box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in MAP_COL..MAP_COL + box_w {
                self.front.set(x, y, Cell::narrow(' ', Color::Reset, dim));
            }
        }
        let label = if w.blink { " ▶ PAUSED ◀" } else { "   PAUSED" };
        self.front.put_str(MAP_COL + 2, box_y + 1, label, hdr, dim);
        self.front.put_str(MAP_COL + 2, box_y + 3, "F1/P Resume", key_c, dim);
        self.front.put_str(MAP_COL + 2, box_y + 4, "R    Restart", key_c, dim);
        self.front.put_str(MAP_COL + 2, box_y + 5, "Q    Quit", key_c, dim);
    }
}
