//! TUI rendering: machine card grid.
//!
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ⚙ MachinePulse  Factory Floor: Cincinnati Main  ● ONLINE    │
//! ├───────────────────────────────────────┬──────────────────────┤
//! │ ┌ CNC Lathe (Main) ──── RUNNING ┐ ┌ … │  MP-104  88%         │
//! │ │ MP-101 • Zone A               │ │   │  ⣀⣀⣠⠤⠔⠊⠉             │
//! │ │ 12% Vibration Load            │ │   │                      │
//! │ │ ▁▂▁▂▂▁▂▂▂▂                    │ │   │                      │
//! │ │ Temp: 45°C                    │ │   │                      │
//! │ └───────────────────────────────┘ └ … │                      │
//! ├───────────────────────────────────────┴──────────────────────┤
//! │  tick 4: MP-104 entered climb phase (Warning)                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  d: start demo   x: stop   ↑↓ focus   p: pause   q: quit     │
//! └──────────────────────────────────────────────────────────────┘

use std::time::Instant;

use machinepulse_core::{MachineReading, MachineStatus, VIBRATION_MAX};
use ratatui::{prelude::*, widgets::*};

use super::app::App;

const CARD_COLUMNS: usize = 2;
const CARD_HEIGHT: u16 = 8;
const FLOOR_NAME: &str = "Cincinnati Main";

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(10),   // cards + focus chart
            Constraint::Length(6), // events
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_events(f, rows[2], app);
    draw_keys(f, rows[3]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let pill = if app.is_alarming() {
        let style = if app.alarm_lit(Instant::now()) {
            Style::default().bold().fg(Color::White).bg(Color::Red)
        } else {
            Style::default().bold().fg(Color::Red)
        };
        Span::styled(" ● PREDICTIVE FAILURE ", style)
    } else if app.is_running() {
        let phase = app.phase().map_or("jitter", |p| p.label());
        Span::styled(
            format!(" ● DEMO #{} {phase} ", app.elapsed_ticks()),
            Style::default().bold().fg(Color::Yellow),
        )
    } else {
        Span::styled(" ● SYSTEM ONLINE ", Style::default().bold().fg(Color::Green))
    };

    let mut spans = vec![
        Span::styled(" ⚙ MachinePulse ", Style::default().bold().fg(Color::Cyan)),
        Span::styled(
            format!(" Factory Floor: {FLOOR_NAME} "),
            Style::default().fg(Color::DarkGray),
        ),
        pill,
    ];
    if app.is_paused() {
        spans.push(Span::styled(" PAUSED ", Style::default().fg(Color::Magenta)));
    }
    spans.push(Span::styled(
        format!(" {:.1}s/tick ", app.period_secs()),
        Style::default().fg(Color::DarkGray),
    ));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(spans));

    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    draw_cards(f, cols[0], app);
    draw_focus_chart(f, cols[1], app);
}

fn draw_cards(f: &mut Frame, area: Rect, app: &App) {
    let roster = app.roster();
    // One extra slot for the pairing placeholder.
    let n_rows = (roster.len() + 1).div_ceil(CARD_COLUMNS);
    let row_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); n_rows]).split(area);

    for (r, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::horizontal(vec![
            Constraint::Ratio(1, CARD_COLUMNS as u32);
            CARD_COLUMNS
        ])
        .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let idx = r * CARD_COLUMNS + c;
            match roster.get(idx) {
                Some(m) => draw_card(f, *cell, m, idx == app.cursor()),
                None if idx == roster.len() => draw_pair_card(f, *cell),
                None => {}
            }
        }
    }
}

fn draw_card(f: &mut Frame, area: Rect, m: &MachineReading, focused: bool) {
    let border = if m.status.is_critical() {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", m.name), Style::default().bold()))
        .title(
            Line::from(Span::styled(
                format!(" {} ", m.status.label()),
                badge_style(m.status),
            ))
            .alignment(Alignment::Right),
        );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // id • location
            Constraint::Length(1), // vibration
            Constraint::Min(1),    // sparkline
            Constraint::Length(1), // footer
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(format!("{} • {}", m.id, m.location))
            .style(Style::default().fg(Color::DarkGray)),
        rows[0],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{}%", m.vibration), Style::default().bold()),
            Span::styled(" Vibration Load", Style::default().fg(Color::DarkGray)),
        ])),
        rows[1],
    );

    let spark = Sparkline::default()
        .data(sparkline_data(&m.history))
        .max(VIBRATION_MAX as u64)
        .style(Style::default().fg(chart_color(m.status)));
    f.render_widget(spark, rows[2]);

    let mut footer = vec![Span::styled(
        format!("Temp: {}°C", m.temperature_c),
        Style::default().fg(Color::DarkGray),
    )];
    if m.status.is_critical() {
        footer.push(Span::styled(
            "  PREDICTIVE FAILURE DETECTED",
            Style::default()
                .bold()
                .fg(Color::Red)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(footer)), rows[3]);
}

/// Placeholder slot after the last machine. Not selectable.
fn draw_pair_card(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = vec![
        Line::from("+").bold(),
        Line::from("Pair New Sensor"),
        Line::from("Scan QR on device").dim(),
    ];
    let top = inner.height.saturating_sub(text.len() as u16) / 2;
    let body = Rect {
        y: inner.y + top,
        height: inner.height - top,
        ..inner
    };
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        body,
    );
}

fn draw_focus_chart(f: &mut Frame, area: Rect, app: &App) {
    let Some(m) = app.focused() else {
        let block = Block::default().borders(Borders::ALL).title(" History ");
        let p = Paragraph::new("No machines on the floor")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let data = chart_points(&m.history);
    let color = chart_color(m.status);
    let datasets = vec![
        Dataset::default()
            .name(format!("{}%", m.vibration))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&data),
    ];

    let x_max = (m.history.len().saturating_sub(1) as f64).max(1.0);
    let y_max = VIBRATION_MAX as f64;

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {}  {}  {}% ", m.id, m.name, m.vibration)),
        )
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(vec![
            Line::from(format!("-{}", m.history.len().saturating_sub(1))),
            Line::from("now"),
        ]))
        .y_axis(Axis::default().bounds([0.0, y_max]).labels(vec![
            Line::from("0"),
            Line::from("50"),
            Line::from("100"),
        ]));

    f.render_widget(chart, area);
}

fn draw_events(f: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let events = app.events();
    let lines: Vec<Line> = events
        .iter()
        .skip(events.len().saturating_sub(visible))
        .map(|e| Line::from(e.as_str()))
        .collect();

    let mut title = format!(" Events  alarm: {} ", app.alarm_name());
    if app.alarm_failures() > 0 {
        title.push_str(&format!("({} failed) ", app.alarm_failures()));
    }
    let block = Block::default().borders(Borders::ALL).title(title);
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(block);
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(
        " d: start demo   x: stop   ↑↓ focus   p: pause   +/-: speed   q: quit",
    )
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` into a terminal color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
}

fn chart_color(status: MachineStatus) -> Color {
    parse_hex_color(status.chart_color()).unwrap_or(Color::Green)
}

fn badge_style(status: MachineStatus) -> Style {
    match status {
        MachineStatus::Critical => Style::default().bold().fg(Color::White).bg(Color::Red),
        MachineStatus::Warning => Style::default().bold().fg(Color::Yellow),
        MachineStatus::Running => Style::default().bold().fg(Color::Green),
        MachineStatus::Offline => Style::default().fg(Color::DarkGray),
    }
}

fn sparkline_data(history: &[u8]) -> Vec<u64> {
    history.iter().map(|&v| v as u64).collect()
}

fn chart_points(history: &[u8]) -> Vec<(f64, f64)> {
    history
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v as f64))
        .collect()
}
