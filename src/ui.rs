//! Layout and drawing: playfield, next preview, stats, start / pause / game-over overlays.

use crate::game::{Phase, Snapshot};
use crate::piece::{PieceKind, cell_color};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count};

/// Each grid cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;

const SIDEBAR_WIDTH: u16 = 24;

/// Next preview box in cells (every catalog shape fits).
const PREVIEW_CELLS: u16 = 5;

/// Duration of the game-over fade (TachyonFX) in ms.
const GAME_OVER_FADE_MS: u32 = 900;

const FILLED: &str = "██";
const EMPTY: &str = " ·";

/// Board size in terminal cells including the border.
fn board_outer_size(rows: usize, cols: usize) -> (u16, u16) {
    (cols as u16 * CELL_WIDTH + 2, rows as u16 * CELL_HEIGHT + 2)
}

/// Game-over fade state: the stack fades to the inactive colour once, then stays grey.
pub struct GameOverFx {
    enabled: bool,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl GameOverFx {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            effect: None,
            last_process: None,
        }
    }

    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    /// True once the stack should be drawn in the inactive colour.
    fn finished(&self) -> bool {
        !self.enabled || self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Draw the whole screen for the current snapshot.
pub fn draw(
    frame: &mut Frame,
    snap: &Snapshot<'_>,
    theme: &Theme,
    final_score: Option<u32>,
    game_over_fx: &mut GameOverFx,
    now: Instant,
) {
    let area = frame.area();
    let (board_area, sidebar_area) = game_layout(area, snap);
    let dim_stack = snap.phase == Phase::GameOver && game_over_fx.finished();

    draw_board(frame.buffer_mut(), snap, theme, board_area, dim_stack);
    draw_sidebar(frame.buffer_mut(), snap, theme, sidebar_area);

    match snap.phase {
        Phase::Unstarted => draw_start_overlay(frame.buffer_mut(), theme, area),
        Phase::Paused => draw_pause_overlay(frame.buffer_mut(), theme, area),
        Phase::GameOver => {
            if game_over_fx.enabled && !dim_stack {
                apply_game_over_effect(frame, snap, theme, board_area, game_over_fx, now);
            }
            draw_game_over(
                frame.buffer_mut(),
                snap,
                theme,
                final_score.unwrap_or(snap.score),
                area,
            );
        }
        Phase::Running => {}
    }
}

/// Board and sidebar rects, centred in `area`.
fn game_layout(area: Rect, snap: &Snapshot<'_>) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(snap.grid.rows(), snap.grid.cols());
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    (inner[0], inner[1])
}

/// Cell value shown at (x, y): the active piece wins over the board.
fn visible_cell(snap: &Snapshot<'_>, x: usize, y: usize) -> (u8, bool) {
    if snap.phase != Phase::GameOver {
        let piece = snap.active;
        let (dx, dy) = (x as i32 - piece.x, y as i32 - piece.y);
        let size = piece.matrix.size() as i32;
        if (0..size).contains(&dx) && (0..size).contains(&dy) {
            let v = piece.matrix.get(dx as usize, dy as usize);
            if v != 0 {
                return (v, true);
            }
        }
    }
    (snap.grid.get(x, y).unwrap_or(0), false)
}

/// Put one two-column cell into the buffer, clipped to `clip`.
fn put_cell(buf: &mut Buffer, clip: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if y >= clip.y + clip.height {
        return;
    }
    for (i, ch) in symbol.chars().enumerate() {
        let cx = x + i as u16;
        if cx < clip.x + clip.width {
            buf[(cx, y)].set_char(ch).set_style(style);
        }
    }
}

fn board_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn draw_board(buf: &mut Buffer, snap: &Snapshot<'_>, theme: &Theme, area: Rect, dim_stack: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tetrotui ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, buf);

    for y in 0..snap.grid.rows() {
        for x in 0..snap.grid.cols() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            let ry = inner.y + y as u16 * CELL_HEIGHT;
            let (value, is_active) = visible_cell(snap, x, y);
            match cell_color(value) {
                Some(color) => {
                    let fg = if dim_stack && !is_active {
                        theme.inactive_fg
                    } else {
                        color
                    };
                    put_cell(buf, inner, rx, ry, FILLED, Style::default().fg(fg).bg(theme.bg));
                }
                None => put_cell(
                    buf,
                    inner,
                    rx,
                    ry,
                    EMPTY,
                    Style::default().fg(theme.div_line).bg(theme.bg),
                ),
            }
        }
    }
}

/// Buffer positions covered by occupied board cells.
fn stack_buffer_positions(inner: Rect, snap: &Snapshot<'_>) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for y in 0..snap.grid.rows() {
        let Some(row) = snap.grid.row(y) else {
            continue;
        };
        for (x, _) in row.iter().enumerate().filter(|&(_, &v)| v != 0) {
            let x0 = inner.x + x as u16 * CELL_WIDTH;
            let y0 = inner.y + y as u16 * CELL_HEIGHT;
            for bx in x0..x0 + CELL_WIDTH {
                set.insert((bx, y0));
            }
        }
    }
    set
}

/// Create or advance the game-over fade (TachyonFX: stack cells fade to the inactive colour).
fn apply_game_over_effect(
    frame: &mut Frame,
    snap: &Snapshot<'_>,
    theme: &Theme,
    board_area: Rect,
    game_over_fx: &mut GameOverFx,
    now: Instant,
) {
    let inner = board_inner(board_area);
    let delta = game_over_fx
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    game_over_fx.last_process = Some(now);

    if game_over_fx.effect.is_none() {
        let stack = stack_buffer_positions(inner, snap);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            stack.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_filter(filter)
        .with_area(inner);
        game_over_fx.effect = Some(effect);
    }

    if let Some(effect) = game_over_fx.effect.as_mut() {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(buf: &mut Buffer, snap: &Snapshot<'_>, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(PREVIEW_CELLS + 3), // Next (border + title + preview)
            Constraint::Length(1),
            Constraint::Length(6), // Stats
            Constraint::Length(1),
            Constraint::Min(0), // Controls
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], buf);
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(PREVIEW_CELLS)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style))).render(next_layout[0], buf);
    draw_next_preview(buf, snap.next, theme, next_layout[1]);

    // --- Stats ---
    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], buf);
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let stats_lines = vec![
        stat("Score: ", snap.score.to_string()),
        stat("Lines: ", snap.lines.to_string()),
        stat("Level: ", snap.level.to_string()),
        stat("Speed: ", format!("{} ms", snap.drop_interval.as_millis())),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, buf);

    // --- Controls ---
    let help_style = Style::default().fg(theme.inactive_fg);
    let help = [
        "←/→  move",
        "↑ x  rotate",
        "z    rotate back",
        "↓    soft drop",
        "spc  hard drop",
        "p    pause",
        "r    restart",
        "q    quit",
    ];
    let help_lines: Vec<Line> = help
        .iter()
        .map(|s| Line::from(Span::styled(*s, help_style)))
        .collect();
    Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[4], buf);
}

/// Next piece centred in a PREVIEW_CELLS square.
fn draw_next_preview(buf: &mut Buffer, kind: PieceKind, theme: &Theme, area: Rect) {
    let matrix = kind.shape();
    let size = matrix.size() as u16;
    let off_x = PREVIEW_CELLS.saturating_sub(size) / 2;
    let off_y = PREVIEW_CELLS.saturating_sub(size) / 2;
    let origin_x = area.x + area.width.saturating_sub(PREVIEW_CELLS * CELL_WIDTH) / 2;
    let style = Style::default().fg(kind.color()).bg(theme.bg);
    for (x, y, _) in matrix.cells() {
        let rx = origin_x + (off_x + x as u16) * CELL_WIDTH;
        let ry = area.y + (off_y + y as u16) * CELL_HEIGHT;
        put_cell(buf, area, rx, ry, FILLED, style);
    }
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn overlay(buf: &mut Buffer, theme: &Theme, popup: Rect, lines: Vec<Line<'_>>) {
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .style(Style::default().bg(theme.bg)),
    );
    p.render(popup, buf);
}

fn draw_start_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Tetrotui ",
            Style::default().fg(theme.title).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Start    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    overlay(buf, theme, centered_popup(area, 30, 6), lines);
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    overlay(buf, theme, centered_popup(area, 28, 6), lines);
}

fn draw_game_over(buf: &mut Buffer, snap: &Snapshot<'_>, theme: &Theme, final_score: u32, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {final_score} "),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Lines: {}  Level: {} ", snap.lines, snap.level),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R — Restart    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    overlay(buf, theme, centered_popup(area, 30, 9), lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::game::Game;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf[(x, y)].symbol());
            }
            s.push('\n');
        }
        s
    }

    fn seeded_game() -> Game {
        Game::new(&GameConfig {
            seed: Some(21),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_board_outer_size() {
        assert_eq!(board_outer_size(20, 10), (22, 22));
    }

    #[test]
    fn test_board_shows_active_piece() {
        let mut game = seeded_game();
        game.start();
        let snap = game.snapshot();
        let area = Rect::new(0, 0, 22, 22);
        let mut buf = Buffer::empty(area);
        draw_board(&mut buf, &snap, &Theme::default(), area, false);
        let filled: usize = buffer_text(&buf).matches('█').count();
        // Four cells, two columns each.
        assert_eq!(filled, 8);
    }

    #[test]
    fn test_board_clips_to_small_area() {
        let game = seeded_game();
        let snap = game.snapshot();
        let area = Rect::new(0, 0, 8, 5);
        let mut buf = Buffer::empty(area);
        draw_board(&mut buf, &snap, &Theme::default(), area, false);
        draw_sidebar(&mut buf, &snap, &Theme::default(), area);
    }

    #[test]
    fn test_next_preview_draws_four_cells() {
        let area = Rect::new(0, 0, 12, 5);
        for kind in PieceKind::ALL {
            let mut buf = Buffer::empty(area);
            draw_next_preview(&mut buf, kind, &Theme::default(), area);
            assert_eq!(buffer_text(&buf).matches('█').count(), 8, "{kind:?}");
        }
    }

    #[test]
    fn test_game_over_overlay_shows_final_score() {
        let game = seeded_game();
        let snap = game.snapshot();
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        draw_game_over(&mut buf, &snap, &Theme::default(), 1234, area);
        assert!(buffer_text(&buf).contains("Score: 1234"));
    }

    #[test]
    fn test_fx_disabled_dims_immediately() {
        assert!(GameOverFx::new(false).finished());
        assert!(!GameOverFx::new(true).finished());
    }
}
