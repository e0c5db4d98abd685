use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use homemade_tetris::config::{FIELD_H, FIELD_W};
use homemade_tetris::game::{CellState, Snapshot};
use homemade_tetris::{GameEvent, Skin};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const GHOST_CHAR: &str = "░░";
const EMPTY_CHAR: &str = "  ";

fn skin_color(skin: Skin) -> Color {
    match skin.0 {
        0 => Color::Cyan,
        1 => Color::Yellow,
        2 => Color::Magenta,
        3 => Color::Green,
        4 => Color::Red,
        5 => Color::Blue,
        _ => Color::Rgb(255, 165, 0),
    }
}

/// One-line description of an event worth showing to the player.
pub fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::ScoreAwarded(points) => Some(format!("+{points}")),
        GameEvent::LinesCleared(4) => Some("TETRIS!".to_string()),
        GameEvent::LinesCleared(n) => Some(format!("{n} line(s)")),
        GameEvent::GameOver {
            new_high_score: true,
            ..
        } => Some("New high score!".to_string()),
        GameEvent::HighScoreSaveFailed(err) => Some(format!("Could not save: {err}")),
        GameEvent::GameRestarted => Some(String::new()),
        _ => None,
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(frame: &mut Frame, snap: &Snapshot, status: &str, show_ghost: bool) {
    let area = frame.size();
    render_game(frame, snap, status, show_ghost, area);

    if snap.is_game_over() {
        render_game_over(frame, snap, area);
    } else if snap.is_forfeit_prompt() {
        render_popup(frame, area, " Forfeit ", &["Forfeit? [Y/N]"], Color::Red);
    } else if snap.is_paused() {
        render_popup(
            frame,
            area,
            " Paused ",
            &["PAUSED", "", "P to continue", "F to forfeit"],
            Color::Yellow,
        );
    }
}

fn render_game(frame: &mut Frame, snap: &Snapshot, status: &str, show_ghost: bool, area: Rect) {
    let grid_display_width = (FIELD_W as u16 * CELL_WIDTH) + 2;
    let grid_display_height = FIELD_H as u16 + 2;
    let side_width = 16;
    let total_width = grid_display_width + side_width;
    let total_height = grid_display_height + 1;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(vertical[0]);

    let side = Layout::vertical([Constraint::Length(7), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, snap, show_ghost, horizontal[0]);
    render_preview(frame, snap, side[0]);
    render_info(frame, snap, status, side[1]);

    let controls = Paragraph::new(Line::from(
        "←→ Move | ↑ Rotate | ↓ Speed | Space Drop | P Pause | F Forfeit | Esc Quit",
    ))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(controls, vertical[1]);
}

fn render_grid(frame: &mut Frame, snap: &Snapshot, show_ghost: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = snap
        .render_grid(show_ghost)
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(skin) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(skin_color(skin)))
                    }
                    CellState::Ghost(skin) => {
                        Span::styled(GHOST_CHAR, Style::default().fg(skin_color(skin)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, snap: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Preview positions sit at an off-field origin; draw them relative to
    // their own bounding box.
    let positions = snap.next.positions;
    let min_x = positions.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = positions.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = positions.iter().map(|p| p.y).max().unwrap_or(0);
    let color = skin_color(snap.next.skin);

    let mut lines: Vec<Line> = Vec::new();
    for y in min_y..=max_y {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        for x in min_x..min_x + 4 {
            if positions.iter().any(|p| p.x == x && p.y == y) {
                spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(EMPTY_CHAR));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, snap: &Snapshot, status: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", snap.score)),
        Line::from(""),
        Line::from(Span::styled("High score", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", snap.high_score)),
        Line::from(""),
    ];
    if snap.speed_up {
        lines.push(Line::from(Span::styled(">> fast", Style::default().fg(Color::Green))));
    }
    lines.push(Line::from(status.to_string()));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, snap: &Snapshot, area: Rect) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("SCORE: {}", snap.score)),
        Line::from(Span::styled(
            format!("HIGH SCORE: {}", snap.high_score),
            Style::default().fg(Color::Rgb(255, 140, 0)),
        )),
        Line::from(""),
    ];
    if snap.can_restart {
        text.push(Line::from(Span::styled(
            "Press R to Restart",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 10, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, body: &[&str], color: Color) {
    let mut text = vec![Line::from("")];
    text.extend(
        body.iter()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(color)))),
    );

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, body.len() as u16 + 3, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}
