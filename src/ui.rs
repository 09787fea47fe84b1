//! Layout and drawing: start screen, board, sidebar, win and game-over overlays.

use crate::app::Screen;
use crate::game::GameSession;
use crate::grid::Grid;
use crate::moves::{Direction as Move, can_move};
use crate::spawn::TileSource;
use crate::status::GameStatus;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Tile size in terminal cells.
const CELL_WIDTH: u16 = 8;
const CELL_HEIGHT: u16 = 3;
/// Gap between tiles (and around the edge).
const GAP_X: u16 = 1;
const GAP_Y: u16 = 1;

const SIDEBAR_WIDTH: u16 = 26;
const SIDEBAR_HEIGHT: u16 = 17;

/// Spawned tile fade-in and merged tile flash durations (TachyonFX) in ms.
const SPAWN_FADE_MS: u32 = 200;
const MERGE_FLASH_MS: u32 = 180;

/// Board size in terminal cells for a board of `size` x `size` tiles.
fn board_pixel_size(size: usize) -> (u16, u16) {
    let n = size as u16;
    (
        n * CELL_WIDTH + (n + 1) * GAP_X,
        n * CELL_HEIGHT + (n + 1) * GAP_Y,
    )
}

/// Board rect for given area, centred together with the sidebar; matches draw_game layout.
fn board_rect(area: Rect, size: usize) -> Rect {
    let (bw, bh) = board_pixel_size(size);
    let total_w = bw + SIDEBAR_WIDTH;
    let total_h = bh.max(SIDEBAR_HEIGHT);
    Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(total_h) / 2,
        width: bw.min(area.width),
        height: bh.min(area.height),
    }
}

/// Screen rect of the tile at (row, col), clipped to the board.
fn tile_rect(board: Rect, row: usize, col: usize) -> Rect {
    let x = board.x + GAP_X + col as u16 * (CELL_WIDTH + GAP_X);
    let y = board.y + GAP_Y + row as u16 * (CELL_HEIGHT + GAP_Y);
    let rect = Rect {
        x,
        y,
        width: CELL_WIDTH,
        height: CELL_HEIGHT,
    };
    rect.intersection(board)
}

/// Buffer positions covered by the given tiles.
fn tile_buffer_positions(board: Rect, cells: &[(usize, usize)]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &(row, col) in cells {
        let r = tile_rect(board, row, col);
        for bx in r.x..r.x + r.width {
            for by in r.y..r.y + r.height {
                set.insert((bx, by));
            }
        }
    }
    set
}

/// Pending and running tile animations. Requests are turned into effects at draw time,
/// when the board rect is known.
#[derive(Default)]
pub struct TileEffects {
    spawn_request: Option<(usize, usize)>,
    merge_request: Vec<(usize, usize)>,
    spawn: Option<Effect>,
    merge: Option<Effect>,
    last_process: Option<Instant>,
}

impl TileEffects {
    pub fn fade_in(&mut self, cell: (usize, usize)) {
        self.spawn_request = Some(cell);
        self.spawn = None;
    }

    pub fn flash_merges(&mut self, cells: &[(usize, usize)]) {
        if cells.is_empty() {
            return;
        }
        self.merge_request = cells.to_vec();
        self.merge = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn filter_for(board: Rect, cells: &[(usize, usize)]) -> CellFilter {
    let positions = tile_buffer_positions(board, cells);
    CellFilter::PositionFn(ref_count(move |pos: Position| {
        positions.contains(&(pos.x, pos.y))
    }))
}

/// Build requested effects and advance running ones by the time since the last frame.
fn apply_tile_effects(
    frame: &mut Frame,
    effects: &mut TileEffects,
    board: Rect,
    theme: &Theme,
    now: Instant,
) {
    let delta = effects
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    effects.last_process = Some(now);

    if effects.merge.is_none() && !effects.merge_request.is_empty() {
        let filter = filter_for(board, &effects.merge_request);
        let effect = fx::fade_from(theme.title, Color::White, (MERGE_FLASH_MS, Interpolation::QuadOut))
            .with_filter(filter)
            .with_area(board);
        effects.merge = Some(effect);
        effects.merge_request.clear();
    }
    if let Some(cell) = effects.spawn_request.take() {
        let empty = theme.tiles[0].bg;
        let effect = fx::fade_from(empty, empty, (SPAWN_FADE_MS, Interpolation::Linear))
            .with_filter(filter_for(board, &[cell]))
            .with_area(board);
        effects.spawn = Some(effect);
    }

    for slot in [&mut effects.merge, &mut effects.spawn] {
        let done = match slot.as_mut() {
            Some(effect) => {
                frame.render_effect(effect, board, tfx_delta);
                effect.done()
            }
            None => false,
        };
        if done {
            *slot = None;
        }
    }
}

/// Draw current screen, with win / game-over overlays on top of the board.
pub fn draw<R: TileSource>(
    frame: &mut Frame,
    screen: Screen,
    session: &GameSession<R>,
    theme: &Theme,
    effects: &mut TileEffects,
    now: Instant,
    new_record: bool,
    notice: Option<&str>,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, session, theme, area),
        Screen::Playing | Screen::Won | Screen::GameOver => {
            draw_game(frame, session, theme, area, notice);
            apply_tile_effects(frame, effects, board_rect(area, session.grid().size()), theme, now);
            match screen {
                Screen::Won => draw_win_overlay(frame, session, theme, area),
                Screen::GameOver => draw_game_over(frame, session, theme, area, new_record),
                _ => {}
            }
        }
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

fn popup_block(theme: &Theme) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .style(Style::default().bg(Color::Black))
        .title(Span::styled(" Tilemerge ", Style::default().fg(theme.title)))
}

fn draw_menu<R: TileSource>(frame: &mut Frame, session: &GameSession<R>, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 44, 11);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " T I L E M E R G E ",
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Join equal tiles to reach {}", session.win_tile()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!("Best: {}", session.high_score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Enter — Start    Q — Quit ",
            Style::default().fg(theme.inactive_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

/// Draw game: board + sidebar, centred in the full area.
fn draw_game<R: TileSource>(
    frame: &mut Frame,
    session: &GameSession<R>,
    theme: &Theme,
    area: Rect,
    notice: Option<&str>,
) {
    let board = board_rect(area, session.grid().size());
    draw_board(frame, session.grid(), theme, board);

    let sidebar = Rect {
        x: board.x + board.width + 1,
        y: board.y,
        width: SIDEBAR_WIDTH
            .saturating_sub(1)
            .min(area.right().saturating_sub(board.right() + 1)),
        height: SIDEBAR_HEIGHT.min(area.bottom().saturating_sub(board.y)),
    };
    draw_sidebar(frame, session, theme, sidebar, notice);
}

fn draw_board(frame: &mut Frame, grid: &Grid, theme: &Theme, board: Rect) {
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(board, frame.buffer_mut());

    for (r, row) in grid.rows().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            let rect = tile_rect(board, r, c);
            if rect.is_empty() {
                continue;
            }
            let style = theme.tile_style(value);
            let label = if value == 0 { String::new() } else { value.to_string() };
            let mut lines = vec![Line::from(""); usize::from(CELL_HEIGHT / 2)];
            lines.push(Line::from(Span::styled(
                label,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(style.fg).bg(style.bg))
                .render(rect, frame.buffer_mut());
        }
    }
}

fn status_line<R: TileSource>(session: &GameSession<R>, theme: &Theme) -> Line<'static> {
    let (text, color) = match session.status() {
        GameStatus::Playing if session.is_turn_in_progress() => ("Sliding…", theme.inactive_fg),
        GameStatus::Playing => ("Playing", theme.main_fg),
        GameStatus::Won => ("Won! Keep going", theme.title),
        GameStatus::Lost => ("No moves left", Color::Red),
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
}

/// Arrows for each direction; directions that would not change the board are dimmed.
fn direction_hints(grid: &Grid, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(8);
    for dir in Move::ALL {
        let glyph = match dir {
            Move::Up => "↑",
            Move::Down => "↓",
            Move::Left => "←",
            Move::Right => "→",
        };
        let color = if can_move(grid, dir) {
            theme.main_fg
        } else {
            theme.inactive_fg
        };
        spans.push(Span::styled(glyph, Style::default().fg(color)));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn draw_sidebar<R: TileSource>(
    frame: &mut Frame,
    session: &GameSession<R>,
    theme: &Theme,
    area: Rect,
    notice: Option<&str>,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Stats (border + score, best, moves, best tile, goal)
            Constraint::Length(1), // gap
            Constraint::Length(4), // Status + direction hints
            Constraint::Length(1), // gap
            Constraint::Min(3),    // Keys / notice
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let grid = session.grid();
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    Paragraph::new(Text::from(vec![
        stat("Score: ", session.score().to_string()),
        stat("Best: ", session.high_score().to_string()),
        stat("Moves: ", session.moves().to_string()),
        stat("Top tile: ", grid.max_tile().to_string()),
        stat("Goal: ", session.win_tile().to_string()),
    ]))
    .render(stats_inner, frame.buffer_mut());

    let status_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let status_inner = status_block.inner(chunks[2]);
    status_block.render(chunks[2], frame.buffer_mut());
    Paragraph::new(Text::from(vec![
        status_line(session, theme),
        direction_hints(grid, theme),
    ]))
    .render(status_inner, frame.buffer_mut());

    let mut help = vec![Line::from(Span::styled(
        "R restart  Q quit",
        Style::default().fg(theme.inactive_fg),
    ))];
    if let Some(msg) = notice {
        help.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Red))));
    }
    Paragraph::new(help)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .render(chunks[4], frame.buffer_mut());
}

fn draw_win_overlay<R: TileSource>(
    frame: &mut Frame,
    session: &GameSession<R>,
    theme: &Theme,
    area: Rect,
) {
    let popup = centered_popup(area, 40, 8);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " You win! ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(Span::styled(
            format!("Reached {} with score {}", session.win_tile(), session.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " C — Keep going  R — Restart  Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over<R: TileSource>(
    frame: &mut Frame,
    session: &GameSession<R>,
    theme: &Theme,
    area: Rect,
    new_record: bool,
) {
    let popup = centered_popup(area, 36, 10);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", session.high_score()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R — Restart    Q — Quit ",
        Style::default().fg(theme.main_fg),
    )));
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}
