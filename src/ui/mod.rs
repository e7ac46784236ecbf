use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::fortune::{top_prediction, FortuneState};
use crate::lotto::render::{DisplaySlot, SlotKind};
use crate::theme::Theme;

/// Width of the probability bars in the fortune panel
const BAR_WIDTH: usize = 20;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let t = &app.theme;

    f.render_widget(Block::default().style(Style::default().bg(t.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Length(5), // Ball board
            Constraint::Min(6),    // Fortune + history
            Constraint::Length(1), // Footer
        ])
        .split(area);

    // Narrow terminals stack the lower panels
    let lower = Layout::default()
        .direction(if area.width < 70 {
            Direction::Vertical
        } else {
            Direction::Horizontal
        })
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    draw_info_line(f, app, chunks[0]);
    draw_board(f, app, chunks[1]);
    draw_fortune_box(f, app, lower[0]);
    draw_history_box(f, app, lower[1]);
    draw_footer(f, app, chunks[3]);

    if app.popup == Popup::Help {
        draw_help_popup(f, t);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(t.warning)))
    } else if let Some(latest) = app.history.front() {
        Line::from(vec![
            Span::styled("Last draw ", Style::default().fg(t.text_dim)),
            Span::styled(latest.to_string(), Style::default().fg(t.text)),
        ])
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(t.text_dim)))
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_board(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let block = Block::default()
        .title(Span::styled(
            " 6 / 45 ",
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.accent));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let slots = app.board.slots();
    if slots.is_empty() {
        return;
    }

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, slots.len() as u32); slots.len()])
        .split(inner);

    for (slot, cell) in slots.iter().zip(cells.iter()) {
        draw_ball(f, t, slot, app.board.is_revealed(slot), ball_rect(*cell));
    }
}

/// Keep balls compact and centered inside wide cells
fn ball_rect(cell: Rect) -> Rect {
    let width = cell.width.min(9);
    Rect {
        x: cell.x + (cell.width - width) / 2,
        width,
        ..cell
    }
}

fn draw_ball(f: &mut Frame, t: &Theme, slot: &DisplaySlot, revealed: bool, area: Rect) {
    let (text, style, border) = match (slot.kind, slot.color) {
        (SlotKind::Ball, Some(color)) if revealed => (
            slot.text.as_str(),
            Style::default()
                .bg(color)
                .fg(t.ball_text)
                .add_modifier(Modifier::BOLD),
            color,
        ),
        (SlotKind::Ball, _) if !revealed => (
            "·",
            Style::default().bg(t.placeholder).fg(t.text_dim),
            t.inactive,
        ),
        _ => (
            slot.text.as_str(),
            Style::default().bg(t.placeholder).fg(t.text_dim),
            t.inactive,
        ),
    };

    let ball = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(ball, area);
}

fn draw_fortune_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (border_color, status_color) = match app.fortune.state() {
        FortuneState::Idle => (t.inactive, t.text_dim),
        FortuneState::Loading { .. } => (t.accent, t.warning),
        FortuneState::Running { .. } => (t.accent, t.success),
        FortuneState::Failed { .. } => (t.danger, t.danger),
    };

    let block = Block::default()
        .title(Span::styled(" (f)ortune ", Style::default().fg(border_color)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut lines = vec![
        Line::from(Span::styled(
            app.fortune.status_line(),
            Style::default().fg(status_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let predictions = app.fortune.predictions();
    let top = top_prediction(predictions).map(|p| p.label.as_str());
    let label_width = predictions
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    for p in predictions {
        let filled = ((p.probability.clamp(0.0, 1.0) * BAR_WIDTH as f32).round()) as usize;
        let color = if Some(p.label.as_str()) == top { t.success } else { t.text_dim };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$} ", p.label, width = label_width),
                Style::default().fg(t.text),
            ),
            Span::styled("█".repeat(filled), Style::default().fg(color)),
            Span::styled("░".repeat(BAR_WIDTH - filled), Style::default().fg(t.inactive)),
            Span::styled(
                format!(" {:>3.0}%", p.probability * 100.0),
                Style::default().fg(t.text_dim),
            ),
        ]));
    }

    let content = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(content, area);
}

fn draw_history_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let block = Block::default()
        .title(Span::styled(" History ", Style::default().fg(t.header)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.inactive));

    let lines: Vec<Line> = if app.history.is_empty() {
        vec![Line::from(Span::styled(
            "  No draws yet. Press g.",
            Style::default().fg(t.text_dim),
        ))]
    } else {
        app.history
            .iter()
            .enumerate()
            .map(|(i, picked)| {
                let number = app.draw_count - i as u64;
                let color = if i == 0 { t.accent } else { t.text };
                let mut spans = vec![
                    Span::styled(
                        format!("{:>4}  ", format!("#{}", number)),
                        Style::default().fg(t.text_dim),
                    ),
                    Span::styled(picked.to_string(), Style::default().fg(color)),
                ];
                if let Some(ticket) = &app.ticket {
                    let hits = picked.hits(ticket);
                    let hit_color = if hits >= 3 { t.success } else { t.text_dim };
                    spans.push(Span::styled(
                        format!("  {} hits", hits),
                        Style::default().fg(hit_color),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let key = |k: &'static str| Span::styled(k, Style::default().fg(t.accent));
    let hint = |h: &'static str| Span::styled(h, Style::default().fg(t.text_dim));

    let footer = Paragraph::new(Line::from(vec![
        key("g"),
        hint(" generate  "),
        key("r"),
        hint(" reset  "),
        key("f"),
        hint(" fortune  "),
        key("t"),
        hint(" theme  "),
        key("?"),
        hint(" help  "),
        key("q"),
        hint(" quit"),
        Span::styled(
            format!("   │ {}", draw_count_label(app.draw_count)),
            Style::default().fg(t.inactive),
        ),
    ]))
    .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

fn draw_count_label(count: u64) -> String {
    if count == 1 {
        "1 draw".to_string()
    } else {
        format!("{} draws", count)
    }
}

fn draw_help_popup(f: &mut Frame, t: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(t.header).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(t.accent)),
            Span::styled(desc, Style::default().fg(t.text)),
        ])
    };

    let help_text = vec![
        section("═══ Draw ═══"),
        entry("  g/Space   ", "Draw 6 numbers from 1-45"),
        entry("  r         ", "Reset the board"),
        Line::from(""),
        section("═══ Fortune ═══"),
        entry("  f         ", "Start/stop the fortune reader (retries after a failure)"),
        entry("  Esc       ", "Stop the fortune reader"),
        Line::from(Span::styled(
            "            Needs model_path and frames_dir in ~/.config/lotto/config.toml",
            Style::default().fg(t.text_dim),
        )),
        Line::from(""),
        section("═══ General ═══"),
        entry("  t         ", "Toggle dark/light theme"),
        entry("  ?/h       ", "This help"),
        entry("  q         ", "Quit"),
        Line::from(""),
        section("═══ Command Line ═══"),
        entry("  lotto --pick --draws 5   ", "Print draws and exit"),
        entry("  lotto --pick --json      ", "Print draws as JSON"),
        entry("  lotto --ticket 1,2,3,4,5,6", " Count hits against your ticket"),
        entry("  lotto --classify         ", "Classify one frame and exit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(t.text_dim)),
            Span::styled("h", Style::default().fg(t.accent)),
            Span::styled("/", Style::default().fg(t.text_dim)),
            Span::styled("?", Style::default().fg(t.accent)),
            Span::styled("/", Style::default().fg(t.text_dim)),
            Span::styled("Esc", Style::default().fg(t.accent)),
            Span::styled(" to close", Style::default().fg(t.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" lotto Help ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .style(Style::default().bg(t.bg))
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::lotto::sampler::Sampler;
    use crate::theme::ThemeMode;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_reset_board_shows_placeholders() {
        let app = App::new(&AppConfig::default(), Sampler::from_seed(1), ThemeMode::Dark);
        let text = screen(&app);
        assert!(text.matches('?').count() >= 6);
        assert!(text.contains("No draws yet"));
    }

    #[tokio::test]
    async fn test_draw_appears_in_history() {
        let mut app = App::new(&AppConfig::default(), Sampler::from_seed(1), ThemeMode::Dark);
        app.generate();
        let text = screen(&app);
        assert!(text.contains(&app.history[0].to_string()));
        assert!(text.contains("│ 1 draw"));
        assert!(!text.contains("1 draws"));
    }

    #[tokio::test]
    async fn test_ticket_hits_in_history() {
        let mut app = App::new(&AppConfig::default(), Sampler::from_seed(1), ThemeMode::Dark);
        app.generate();
        app.ticket = Some(app.history[0]);
        assert!(screen(&app).contains("6 hits"));
    }

    #[test]
    fn test_draw_count_label() {
        assert_eq!(draw_count_label(0), "0 draws");
        assert_eq!(draw_count_label(1), "1 draw");
        assert_eq!(draw_count_label(12), "12 draws");
    }

    #[test]
    fn test_ball_rect_is_centered() {
        let cell = Rect::new(10, 2, 21, 3);
        let ball = ball_rect(cell);
        assert_eq!(ball, Rect::new(16, 2, 9, 3));
    }
}
