//! Layout and drawing: board, cursor, sidebar, overlays and the clear fade.

use crate::app::{ClearFx, QuitOption, Screen};
use crate::theme::{Theme, tile_glyph};
use matchtui::store::Progress;
use matchtui::{GameSession, Grid, LevelOutcome, Phase, Pos};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal cells per tile. Two rows keep tiles roughly square.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;

const SIDEBAR_WIDTH: u16 = 28;
const SIDEBAR_HEIGHT: u16 = 24;
/// Leaderboard rows shown in the sidebar.
const SIDEBAR_RANKS: usize = 5;

/// Everything the renderer reads from the app for one frame.
pub struct View<'a> {
    pub session: &'a GameSession,
    pub theme: &'a Theme,
    pub screen: Screen,
    pub paused: bool,
    pub cursor: Pos,
    pub quit_selected: QuitOption,
    pub status: Option<&'a str>,
    pub leaderboard: &'a [Progress],
    pub signed_in: bool,
}

/// Board size in terminal cells, border included.
fn board_outer_size(grid: &Grid) -> (u16, u16) {
    (
        grid.cols() as u16 * CELL_WIDTH + 2,
        grid.rows() as u16 * CELL_HEIGHT + 2,
    )
}

/// Centre board + sidebar in `area`. Returns (board outer rect, sidebar rect).
fn game_layout(area: Rect, grid: &Grid) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(grid);
    let total_w = bw + SIDEBAR_WIDTH;
    let total_h = bh.max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board = Rect {
        y: inner[0].y + inner[0].height.saturating_sub(bh) / 2,
        height: bh.min(inner[0].height),
        ..inner[0]
    };
    (board, inner[1])
}

/// Screen rect of one tile inside the board's inner rect.
fn tile_rect(board_inner: Rect, pos: Pos) -> Rect {
    Rect {
        x: board_inner.x + pos.col as u16 * CELL_WIDTH,
        y: board_inner.y + pos.row as u16 * CELL_HEIGHT,
        width: CELL_WIDTH,
        height: CELL_HEIGHT,
    }
    .intersection(board_inner)
}

/// Buffer positions covered by `cells`.
fn cell_buffer_positions(board_inner: Rect, cells: &[Pos]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &pos in cells {
        let r = tile_rect(board_inner, pos);
        for x in r.left()..r.right() {
            for y in r.top()..r.bottom() {
                set.insert((x, y));
            }
        }
    }
    set
}

/// Draw one frame.
pub fn draw(frame: &mut Frame, view: &View, clear_fx: &mut ClearFx, now: Instant) {
    let area = frame.area();
    let grid = view.session.grid();
    let (bw, bh) = board_outer_size(grid);
    if area.width < bw + SIDEBAR_WIDTH || area.height < bh.max(SIDEBAR_HEIGHT) {
        draw_too_small(frame, view.theme, area, bw + SIDEBAR_WIDTH, bh.max(SIDEBAR_HEIGHT));
        return;
    }

    let (board_outer, sidebar) = game_layout(area, grid);
    let board_inner = draw_board(frame, view, board_outer);
    draw_sidebar(frame, view, sidebar);
    if clear_fx.is_active() {
        apply_clear_effect(frame, view, board_inner, clear_fx, now);
    }

    match view.screen {
        Screen::QuitMenu => draw_quit_menu(frame, view.theme, view.quit_selected),
        Screen::Playing if view.paused => draw_pause_overlay(frame, view.theme, board_outer),
        Screen::Playing if !view.session.is_processing() => match view.session.outcome() {
            LevelOutcome::Won => draw_level_won(frame, view, board_outer),
            LevelOutcome::Lost => draw_level_lost(frame, view, board_outer),
            LevelOutcome::Playing => {}
        },
        Screen::Playing => {}
    }
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need_w: u16, need_h: u16) {
    let msg = Text::from(vec![
        Line::from(Span::styled("Terminal too small", Style::default().fg(theme.title))),
        Line::from(Span::styled(
            format!("need {}x{}, have {}x{}", need_w, need_h, area.width, area.height),
            Style::default().fg(theme.main_fg),
        )),
    ]);
    let y = area.y + area.height.saturating_sub(2) / 2;
    Paragraph::new(msg)
        .alignment(Alignment::Center)
        .render(Rect { y, height: 2.min(area.height), ..area }, frame.buffer_mut());
}

/// Tiles, cursor and selection. Returns the inner (borderless) board rect.
fn draw_board(frame: &mut Frame, view: &View, outer: Rect) -> Rect {
    let theme = view.theme;
    let session = view.session;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(
            format!(" Level {} ", session.level()),
            Style::default().fg(theme.title),
        ));
    let inner = block.inner(outer);
    block.render(outer, frame.buffer_mut());

    let matched = match session.phase() {
        Phase::Matched { cells } => Some(cells),
        _ => None,
    };
    let buf = frame.buffer_mut();
    for pos in session.grid().positions() {
        let r = tile_rect(inner, pos);
        let is_cursor = pos == view.cursor;
        let is_selected = session.selection() == Some(pos);
        let bg = if is_selected {
            theme.title
        } else if is_cursor {
            theme.div_line
        } else {
            theme.bg
        };
        for y in r.top()..r.bottom() {
            for x in r.left()..r.right() {
                buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(bg));
            }
        }
        let Some(kind) = session.grid().get(pos) else {
            continue;
        };
        let mut style = Style::default().fg(theme.tile_color(kind)).bg(bg);
        if is_selected {
            style = style.fg(theme.bg);
        }
        if matched.is_some_and(|cells| cells.contains(&pos)) || kind.is_special() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if is_cursor {
            buf.set_string(r.x, r.y, "[", Style::default().fg(theme.main_fg).bg(bg));
            buf.set_string(r.x + 2, r.y, "]", Style::default().fg(theme.main_fg).bg(bg));
        }
        buf.set_string(r.x + 1, r.y, tile_glyph(kind), style);
    }
    inner
}

/// Fade the matched cells to the board background over the highlight delay.
fn apply_clear_effect(
    frame: &mut Frame,
    view: &View,
    board_inner: Rect,
    clear_fx: &mut ClearFx,
    now: Instant,
) {
    let delta = clear_fx
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    clear_fx.last_process = Some(now);

    if clear_fx.effect.is_none() {
        let positions = cell_buffer_positions(board_inner, &clear_fx.cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let fade_ms = view
            .session
            .pacing()
            .highlight
            .as_millis()
            .min(u32::MAX as u128) as u32;
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board_inner);
        clear_fx.effect = Some(effect);
    }

    if let Some(effect) = clear_fx.effect.as_mut() {
        if !effect.done() {
            frame.render_effect(effect, board_inner, TfxDuration::from_millis(delta_ms));
        }
    }
}

fn sidebar_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let cfg = session.level_config();
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // player
            Constraint::Length(7), // level stats
            Constraint::Length(3), // score gauge
            Constraint::Length(SIDEBAR_RANKS as u16 + 3), // leaderboard
            Constraint::Fill(1),   // status
        ])
        .split(area);

    // --- Player ---
    let player_block = sidebar_block(theme);
    let player_inner = player_block.inner(chunks[0]);
    player_block.render(chunks[0], frame.buffer_mut());
    let mut player = vec![Span::styled(session.player().to_string(), fg_style)];
    if !view.signed_in {
        player.push(Span::styled("  (not saved)", dim_style));
    }
    Paragraph::new(Line::from(player)).render(player_inner, frame.buffer_mut());

    // --- Level stats ---
    let stats_block = sidebar_block(theme);
    let stats_inner = stats_block.inner(chunks[1]);
    stats_block.render(chunks[1], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, fg_style)])
    };
    let moves_style = if session.moves_remaining() <= 3 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        fg_style
    };
    let lines = vec![
        stat("Level:  ", session.level().to_string()),
        stat("Score:  ", session.score().to_string()),
        stat("Target: ", cfg.score_target.to_string()),
        Line::from(vec![
            Span::styled("Moves:  ", title_style),
            Span::styled(
                format!("{} / {}", session.moves_remaining(), cfg.move_budget),
                moves_style,
            ),
        ]),
        stat("Total:  ", session.total_score().to_string()),
    ];
    Paragraph::new(Text::from(lines)).render(stats_inner, frame.buffer_mut());

    // --- Score gauge ---
    let gauge_block = sidebar_block(theme);
    let gauge_inner = gauge_block.inner(chunks[2]);
    gauge_block.render(chunks[2], frame.buffer_mut());
    let ratio = if cfg.score_target > 0 {
        (session.score() as f64 / cfg.score_target as f64).min(1.0)
    } else {
        1.0
    };
    let bar_color = if ratio >= 1.0 {
        Color::Green
    } else if ratio > 0.5 {
        Color::Yellow
    } else {
        theme.gems[2]
    };
    Gauge::default()
        .ratio(ratio)
        .label(format!("{} / {}", session.score(), cfg.score_target))
        .gauge_style(Style::default().fg(bar_color).bg(theme.bg))
        .render(gauge_inner, frame.buffer_mut());

    // --- Leaderboard, or key hints for guests ---
    let ranks_block = sidebar_block(theme).title(Span::styled(
        if view.leaderboard.is_empty() { " Keys " } else { " Top players " },
        title_style,
    ));
    let ranks_inner = ranks_block.inner(chunks[3]);
    ranks_block.render(chunks[3], frame.buffer_mut());
    let ranks: Vec<Line> = if view.leaderboard.is_empty() {
        [
            "hjkl / arrows  move",
            "Space / Enter  select",
            "Shift+dir      swap",
            "P pause   Q quit",
        ]
        .into_iter()
        .map(|s| Line::from(Span::styled(s, dim_style)))
        .collect()
    } else {
        view.leaderboard
            .iter()
            .take(SIDEBAR_RANKS)
            .enumerate()
            .map(|(i, p)| {
                let style = if p.username == session.player() {
                    title_style
                } else {
                    fg_style
                };
                Line::from(Span::styled(
                    format!("{}. {:<10} L{:<3} {}", i + 1, p.username, p.level, p.total_score),
                    style,
                ))
            })
            .collect()
    };
    Paragraph::new(Text::from(ranks)).render(ranks_inner, frame.buffer_mut());

    if let Some(msg) = view.status {
        Paragraph::new(Line::from(Span::styled(msg.to_string(), title_style)))
            .alignment(Alignment::Center)
            .wrap(ratatui::widgets::Wrap { trim: true })
            .render(chunks[4], frame.buffer_mut());
    }
}

/// Centred popup of the given size, clipped to `area`.
fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_popup(frame: &mut Frame, theme: &Theme, rect: Rect, lines: Vec<Line>) {
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            frame.buffer_mut()[(x, y)]
                .set_symbol(" ")
                .set_style(Style::default().bg(theme.bg));
        }
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(rect, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, popup_rect(area, 28, 6), lines);
}

fn draw_level_won(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let overflow = session
        .score()
        .saturating_sub(session.level_config().score_target);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" Level {} cleared! ", session.level()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            Style::default().fg(theme.main_fg),
        )),
    ];
    if overflow > 0 {
        lines.push(Line::from(Span::styled(
            format!(" +{} carried over ", overflow),
            Style::default().fg(theme.title),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " N: Next level    Q: Quit ",
        Style::default().fg(theme.main_fg),
    )));
    draw_popup(frame, theme, popup_rect(area, 30, 9), lines);
}

fn draw_level_lost(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Out of moves ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                " {} / {} points ",
                session.score(),
                session.level_config().score_target
            ),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R: Retry   M: Level 1 ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    draw_popup(frame, theme, popup_rect(area, 30, 8), lines);
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = popup_rect(frame.area(), 24, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    for y in quit_rect.top()..quit_rect.bottom() {
        for x in quit_rect.left()..quit_rect.right() {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::FirstLevel, " Level 1 "),
        (QuitOption::Exit, " Exit "),
    ];
    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        frame.buffer_mut().set_string(rx, ry, label, style);
    }
}
