//! All drawing / rendering functions.

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use chrono::Local;

use crate::format::{format_age, format_timestamp};
use crate::fragment;
use crate::notify::{NotificationKind, NotificationPhase};

use super::app::{App, Control, DownloadView, ERROR_CARD_BODY, ERROR_CARD_TITLE, NO_DATA_PLACEHOLDER, StatusView};

pub fn draw(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let area = frame.area();

    let (indicator, link_color) = if app.link.is_online() {
        ("\u{25cf} online", Color::Green)
    } else {
        ("\u{25cb} offline", Color::Red)
    };
    let title_right = app.last_update.map_or_else(
        || format!(" {indicator} "),
        |ts| {
            let age = Local::now()
                .signed_duration_since(ts)
                .to_std()
                .unwrap_or_default();
            format!(
                " {indicator} | updated {} ({}) ",
                format_timestamp(ts),
                format_age(age)
            )
        },
    );

    let outer = Block::default()
        .title(" gpsmon ")
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.link.is_online() {
            Color::Cyan
        } else {
            Color::Red
        }));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    // Render title-right manually in the top border
    let right_x = area
        .x
        .saturating_add(area.width)
        .saturating_sub(u16::try_from(title_right.len()).unwrap_or(u16::MAX) + 1);
    if right_x > area.x + 1 {
        frame.render_widget(
            Paragraph::new(title_right).style(Style::default().fg(link_color)),
            Rect::new(
                right_x,
                area.y,
                area.width.saturating_sub(right_x - area.x),
                1,
            ),
        );
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Status fragment
            Constraint::Length(8), // Download list
            Constraint::Length(1), // Controls bar
        ])
        .split(inner);

    draw_status_panel(frame, app, chunks[0]);
    draw_download_panel(frame, app, chunks[1]);
    draw_controls_bar(frame, app, chunks[2], now);
    draw_notifications(frame, app, now);
}

fn draw_status_panel(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" GPS status ")
        .borders(Borders::ALL);

    let text: Vec<Line> = match &app.status_view {
        StatusView::Loading => vec![Line::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )],
        StatusView::Fragment { lines } => lines
            .iter()
            .map(|l| Line::styled(l.clone(), Style::default().fg(Color::White)))
            .collect(),
        StatusView::ErrorCard { detail } => vec![
            Line::styled(
                format!("\u{26a0} {ERROR_CARD_TITLE}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::styled(ERROR_CARD_BODY, Style::default().fg(Color::White)),
            Line::styled(detail.clone(), Style::default().fg(Color::DarkGray)),
            Line::raw(""),
            Line::styled(
                "press r to reload (next poll retries automatically)",
                Style::default().fg(Color::Yellow),
            ),
        ],
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_download_panel(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Trip files ").borders(Borders::ALL);

    match &app.download_view {
        DownloadView::Loading => {
            frame.render_widget(
                Paragraph::new("Loading...")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
        }
        DownloadView::Unavailable => {
            frame.render_widget(
                Paragraph::new(format!("\u{1f4ed} {NO_DATA_PLACEHOLDER}"))
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                area,
            );
        }
        DownloadView::List { inner } => {
            let items: Vec<ListItem> = fragment::list_entries(inner)
                .into_iter()
                .map(|entry| {
                    ListItem::new(format!(" \u{2913} {entry}"))
                        .style(Style::default().fg(Color::White))
                })
                .collect();
            frame.render_widget(List::new(items).block(block), area);
        }
    }
}

fn draw_controls_bar(frame: &mut ratatui::Frame, app: &App, area: Rect, now: Instant) {
    let timings = &app.timings;
    let mut spans: Vec<Span> = Vec::new();

    let entries = [
        (Control::Reload, "r:reload"),
        (Control::StartTrip, "s:start trip"),
        (Control::StopTrip, "x:stop trip"),
    ];
    for (control, label) in entries {
        let feedback = app.control(control);
        let span = if feedback.is_busy(now, timings) {
            Span::styled(
                format!("  \u{23f3} {}...", control.label()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM),
            )
        } else if feedback.is_pressed(now, timings) {
            Span::styled(
                format!("  {label}"),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!("  {label}"), Style::default().fg(Color::DarkGray))
        };
        spans.push(span);
    }
    spans.push(Span::styled("  q:quit", Style::default().fg(Color::DarkGray)));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_notifications(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let area = frame.area();
    let timings = &app.timings;

    for (i, notification) in app.notifications.iter().enumerate() {
        let phase = notification.phase(now, timings);
        if phase == NotificationPhase::Expired {
            continue;
        }

        let color = match notification.kind {
            NotificationKind::Info => Color::Blue,
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        let mut style = Style::default().fg(Color::White).bg(color);
        if phase == NotificationPhase::Exiting {
            style = style.add_modifier(Modifier::DIM);
        }

        let icon = match notification.kind {
            NotificationKind::Info => "\u{2139}",
            NotificationKind::Success => "\u{2713}",
            NotificationKind::Error => "\u{2717}",
        };
        let text = format!(" {icon} {} ", notification.message);

        let width = u16::try_from(text.chars().count())
            .unwrap_or(u16::MAX)
            .min(area.width.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width + 1);
        let y = area.y + 1 + u16::try_from(i).unwrap_or(u16::MAX);
        if y >= area.y + area.height {
            break;
        }

        let rect = Rect::new(x, y, width, 1);
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(text).style(style), rect);
    }
}
