//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │   paper + drawing canvas                                     │
//! │   hand skeleton overlay on top                               │
//! │                                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  status text                                   DRAWING/IDLE  │
//! │  key legend                                  [swatch] brush  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input is translated into [`UiAction`]s for the app; the mouse also
//! steers the simulated hand over the sim channel.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use pinch_canvas::blend_over;
use pinch_core::{BrushKind, CanvasPoint};

use crate::app::{AppState, Frontend, StatusLevel};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::pointer::PointerEvent;
use crate::source::SimHandInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const STATUS_H:     usize = 40;
const GLYPH_SCALE:  usize = 2;
const GLYPH_ADV:    usize = 4 * GLYPH_SCALE;
const PAPER:        u32   = 0xFFFFFFFF;
const STATUS_BG:    u32   = 0xFF263238;
const LEGEND_COLOR: u32   = 0xFF90A4AE;
const BRUSH_STEP:   f32   = 1.0;

const LEGEND: &str =
    "space=camera  p=pinch  mouse=draw  c=clear  s=save  1/2/3=brush  [ ]=size  k=colour  q=quit";

// ════════════════════════════════════════════════════════════════════════════
// UiAction
// ════════════════════════════════════════════════════════════════════════════

/// What the user asked for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    Quit,
    ToggleCamera,
    Clear,
    Save,
    BrushKind(BrushKind),
    BrushSize(f32),
    NextColor,
    Pointer(PointerEvent),
    /// New drawing-area size.
    Resize(u32, u32),
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:      Window,
    buf:         Vec<u32>,
    width:       usize,
    height:      usize,
    sim_tx:      Sender<SimHandInput>,

    button_down: bool,
    last_mouse:  Option<(f32, f32)>,
    sim_pos:     Option<(f32, f32)>,
    pinch_held:  bool,
}

impl Visualizer {
    pub fn new(cfg: &AppConfig, sim_tx: Sender<SimHandInput>) -> Result<Self, AppError> {
        let width  = cfg.window_width;
        let height = cfg.window_height.max(STATUS_H + 1);
        let window = Window::new(
            "Pinch Draw",
            width, height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        Ok(Visualizer {
            window,
            buf: vec![PAPER; width * height],
            width,
            height,
            sim_tx,
            button_down: false,
            last_mouse:  None,
            sim_pos:     None,
            pinch_held:  false,
        })
    }

    /// Size of the drawing area: the window minus the status bar.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width as u32, (self.height - STATUS_H) as u32)
    }
}

impl Frontend for Visualizer {
    fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse. The simulated hand only follows the cursor
    /// while the camera is on.
    fn poll_input(&mut self, camera_on: bool) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if !self.window.is_open() {
            actions.push(UiAction::Quit);
            return actions;
        }

        // ── window size ───────────────────────────────────────────────────
        let (w, h) = self.window.get_size();
        if (w, h) != (self.width, self.height) && w > 0 && h > STATUS_H {
            self.width  = w;
            self.height = h;
            self.buf    = vec![PAPER; w * h];
            let (cw, ch) = self.canvas_size();
            actions.push(UiAction::Resize(cw, ch));
        }

        // ── keys ──────────────────────────────────────────────────────────
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            actions.push(UiAction::Quit);
            return actions;
        }
        if one_shot(Key::Space) { actions.push(UiAction::ToggleCamera); }
        if one_shot(Key::C)     { actions.push(UiAction::Clear); }
        if one_shot(Key::S)     { actions.push(UiAction::Save); }
        if one_shot(Key::K)     { actions.push(UiAction::NextColor); }
        if one_shot(Key::Key1)  { actions.push(UiAction::BrushKind(BrushKind::Round)); }
        if one_shot(Key::Key2)  { actions.push(UiAction::BrushKind(BrushKind::Square)); }
        if one_shot(Key::Key3)  { actions.push(UiAction::BrushKind(BrushKind::Line)); }
        if held(Key::LeftBracket)  { actions.push(UiAction::BrushSize(-BRUSH_STEP)); }
        if held(Key::RightBracket) { actions.push(UiAction::BrushSize(BRUSH_STEP)); }

        // ── mouse → pointer path ──────────────────────────────────────────
        let (cw, ch) = self.canvas_size();
        let pos = self.window.get_mouse_pos(MouseMode::Discard)
            .filter(|&(x, y)| x >= 0.0 && y >= 0.0 && x < cw as f32 && y < ch as f32);
        let down = self.window.get_mouse_down(MouseButton::Left);
        actions.extend(pointer_action(self.button_down, down, self.last_mouse, pos).map(UiAction::Pointer));
        self.button_down = down;
        self.last_mouse  = pos;

        // ── mouse + P → simulated hand ────────────────────────────────────
        let sim_pos = if camera_on { pos } else { None };
        if sim_pos != self.sim_pos {
            let msg = match sim_pos {
                Some((x, y)) => SimHandInput::MoveTo { u: x / cw as f32, v: y / ch as f32 },
                None         => SimHandInput::Hide,
            };
            let _ = self.sim_tx.send(msg);
            self.sim_pos = sim_pos;
        }
        let pinch = self.window.is_key_down(Key::P);
        if pinch != self.pinch_held {
            let _ = self.sim_tx.send(SimHandInput::Pinch(pinch));
            self.pinch_held = pinch;
        }

        actions
    }

    /// Render one frame.
    fn render(&mut self, app: &AppState) {
        let (w, h) = (self.width, self.height);
        let area_h = h - STATUS_H;

        // ── paper + canvas + overlay ──────────────────────────────────────
        self.buf[..w * area_h].fill(PAPER);
        let canvas  = app.canvas();
        let overlay = app.overlay().layer();
        let cw = (canvas.width() as usize).min(w);
        let ch = (canvas.height() as usize).min(area_h);
        for y in 0..ch {
            let src = y * canvas.width() as usize;
            for x in 0..cw {
                let ov = overlay.pixels().get(src + x).copied().unwrap_or(0);
                self.buf[y * w + x] = composite(canvas.pixels()[src + x], ov);
            }
        }

        // ── status bar ────────────────────────────────────────────────────
        let sy = area_h;
        self.fill_rect(0, sy, w, STATUS_H, STATUS_BG);

        let status = app.status();
        self.draw_label(&status.text, 8, sy + 5, status_color(status.level));

        let (mode, mode_color) = if app.drawing_active() {
            ("drawing", 0xFF66BB6A)
        } else {
            ("idle", LEGEND_COLOR)
        };
        self.draw_label(mode, w.saturating_sub(label_width(mode) + 8), sy + 5, mode_color);

        // ── legend + brush ────────────────────────────────────────────────
        self.draw_label(LEGEND, 8, sy + 23, LEGEND_COLOR);

        let brush = app.brush();
        let info  = format!("{} {}", brush.kind.name(), brush.width as u32);
        let ix    = w.saturating_sub(label_width(&info) + 8);
        self.draw_label(&info, ix, sy + 23, 0xFFEEEEEE);
        let swatch = blend_over(brush.color.to_argb(), PAPER);
        self.fill_rect(ix.saturating_sub(18), sy + 22, 12, 12, swatch);

        self.window.update_with_buffer(&self.buf, w, h).ok();
    }
}

impl Visualizer {
    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Minimal bitmap font, 3×5 cells drawn at `GLYPH_SCALE`.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + GLYPH_ADV > self.width { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for dy in 0..GLYPH_SCALE {
                        for dx in 0..GLYPH_SCALE {
                            self.set_pixel(cx + col * GLYPH_SCALE + dx,
                                           y + row * GLYPH_SCALE + dy, color);
                        }
                    }
                }
            }
            cx += GLYPH_ADV;
        }
    }
}

/// Pointer event implied by this frame's mouse state, if any.
fn pointer_action(
    was_down: bool,
    down:     bool,
    last:     Option<(f32, f32)>,
    pos:      Option<(f32, f32)>,
) -> Option<PointerEvent> {
    let at = |(x, y): (f32, f32)| CanvasPoint::new(x, y);
    match (was_down, down) {
        (false, true) => pos.map(|p| PointerEvent::Down(at(p))),
        (true, true)  => match pos {
            Some(p) if pos != last => Some(PointerEvent::Move(at(p))),
            None if last.is_some() => Some(PointerEvent::Leave),
            _                      => None,
        },
        (true, false) => Some(PointerEvent::Up),
        (false, false) => None,
    }
}

/// Canvas over paper, overlay over both. Result is opaque.
fn composite(canvas: u32, overlay: u32) -> u32 {
    blend_over(overlay, blend_over(canvas, PAPER))
}

fn status_color(level: StatusLevel) -> u32 {
    match level {
        StatusLevel::Info  => 0xFFEEEEEE,
        StatusLevel::Ok    => 0xFF66BB6A,
        StatusLevel::Busy  => 0xFFFFCA28,
        StatusLevel::Error => 0xFFEF5350,
    }
}

fn label_width(text: &str) -> usize {
    text.chars().count() * GLYPH_ADV
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b111, 0b001, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const A: Option<(f32, f32)> = Some((10.0, 20.0));
    const B: Option<(f32, f32)> = Some((15.0, 20.0));

    #[test]
    fn press_inside_is_down() {
        assert_eq!(pointer_action(false, true, None, A),
                   Some(PointerEvent::Down(CanvasPoint::new(10.0, 20.0))));
    }

    #[test]
    fn press_outside_is_nothing() {
        assert_eq!(pointer_action(false, true, None, None), None);
    }

    #[test]
    fn drag_is_move_only_when_position_changes() {
        assert_eq!(pointer_action(true, true, A, B),
                   Some(PointerEvent::Move(CanvasPoint::new(15.0, 20.0))));
        assert_eq!(pointer_action(true, true, B, B), None);
    }

    #[test]
    fn dragging_off_canvas_is_leave() {
        assert_eq!(pointer_action(true, true, A, None), Some(PointerEvent::Leave));
    }

    #[test]
    fn release_is_up() {
        assert_eq!(pointer_action(true, false, A, A), Some(PointerEvent::Up));
    }

    #[test]
    fn composite_is_opaque_paper_when_empty() {
        assert_eq!(composite(0, 0), PAPER);
    }

    #[test]
    fn overlay_wins_over_canvas() {
        assert_eq!(composite(0xFF000000, 0xFF00FF00), 0xFF00FF00);
        assert_eq!(composite(0xFF000000, 0), 0xFF000000);
    }

    #[test]
    fn legend_uses_known_glyphs() {
        let dot = char_glyph('\u{1}');
        assert!(LEGEND.chars().filter(|&c| c != '.').all(|c| char_glyph(c) != dot || c == ' '));
    }
}
