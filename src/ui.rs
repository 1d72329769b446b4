pub mod screen;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tango::{
    day_grid::DayCell,
    session::RevisitMarker,
    study::{Phase, RenderPayload},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, GRID_COLUMNS};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const CELL_WIDTH: usize = 4;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

fn notice_line(app: &App) -> Paragraph<'_> {
    let text = app.notice.as_deref().unwrap_or_default();
    Paragraph::new(Span::styled(text, Style::default().fg(Color::Red)))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

pub fn render_start(app: &App, f: &mut Frame) {
    let picker = &app.start.picker;
    let grid_rows = grid_rows(picker.max_day());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),             // title
            Constraint::Length(grid_rows.saturating_add(2)), // grid
            Constraint::Length(1),             // range
            Constraint::Length(1),             // settings
            Constraint::Min(1),                // notice
            Constraint::Length(1),             // legend
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled("tango", bold().fg(Color::Cyan)))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let cells = picker.cells().collect_vec();
    let lines = cells
        .chunks(GRID_COLUMNS as usize)
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|&(day, cell)| {
                        let mut style = match cell {
                            DayCell::Selected => bold().fg(Color::Black).bg(Color::Green),
                            DayCell::InRange => {
                                Style::default().fg(Color::Black).bg(Color::LightGreen)
                            }
                            DayCell::Plain => Style::default(),
                        };
                        if day == app.start.focus {
                            style = style.add_modifier(Modifier::UNDERLINED);
                        }
                        Span::styled(format!("{day:>width$} ", width = CELL_WIDTH - 1), style)
                    })
                    .collect_vec(),
            )
        })
        .collect_vec();
    let grid_width = (GRID_COLUMNS as usize * CELL_WIDTH + 2) as u16;
    let grid_area = centered(chunks[1], grid_width);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" days ")),
        grid_area,
    );

    let range = if picker.awaiting_end() {
        format!("Day range: {} (pick the last day)", picker.label())
    } else {
        format!("Day range: {}", picker.label())
    };
    f.render_widget(
        Paragraph::new(Span::styled(range, bold())).alignment(Alignment::Center),
        chunks[2],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "Shuffle: {} | Words: {}",
                on_off(app.start.shuffle),
                app.vocabulary.len()
            ),
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Center),
        chunks[3],
    );
    f.render_widget(notice_line(app), chunks[4]);
    f.render_widget(
        legend("(arrows) move / (space) pick day / (s)huffle / (/) search / (enter) start / (esc)ape"),
        chunks[5],
    );
}

fn grid_rows(max_day: u32) -> u16 {
    u16::try_from(max_day.div_ceil(GRID_COLUMNS).max(1))
        .unwrap_or(u16::MAX)
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn card_lines(card: &RenderPayload) -> Vec<Line<'_>> {
    let source_style = if card.long_word {
        bold()
    } else {
        bold().fg(Color::Yellow)
    };
    let mut lines = vec![Line::from(Span::styled(card.source_text.as_str(), source_style))];
    lines.push(Line::default());
    match card.target_text {
        Some(ref target) => lines.extend(
            target
                .lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Green)))),
        ),
        None => lines.push(Line::from(Span::styled("· · ·", dim()))),
    }
    lines
}

pub fn render_study(app: &App, f: &mut Frame) {
    let area = f.area();
    let Some(card) = app.card.as_ref() else {
        f.render_widget(
            Paragraph::new(Span::styled("loading…", dim())).alignment(Alignment::Center),
            area,
        );
        return;
    };
    let machine = app.study.as_ref();
    let paused = machine.is_some_and(|m| m.is_paused());
    let timer_visible = machine.map_or(true, |m| m.timer_visible());

    let lines = card_lines(card);
    let card_height = lines.len() as u16;
    let pad = area.height.saturating_sub(card_height + 6) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1),           // header
            Constraint::Length(1),           // timer
            Constraint::Length(pad),         // padding
            Constraint::Length(card_height), // card
            Constraint::Min(1),              // padding
            Constraint::Length(1),           // status
            Constraint::Length(1),           // legend
        ])
        .split(area);

    let marker = match card.revisit_marker {
        Some(RevisitMarker::Known) => Span::styled(" [known]", bold().fg(Color::Green)),
        Some(RevisitMarker::Review) => Span::styled(" [review]", bold().fg(Color::Red)),
        None => Span::raw(""),
    };
    let header = Line::from(vec![
        Span::styled(card.day_label.as_str(), bold()),
        Span::raw("   "),
        Span::styled(card.progress_label.as_str(), Style::default().fg(Color::Cyan)),
        marker,
    ]);
    f.render_widget(Paragraph::new(header).alignment(Alignment::Center), chunks[0]);

    if timer_visible {
        f.render_widget(
            Paragraph::new(Span::styled(app.timer_text.as_str(), dim())).alignment(Alignment::Center),
            chunks[1],
        );
    }

    let max_width = chunks[3].width as usize;
    let fits = lines.iter().all(|l| l.width() <= max_width);
    let mut widget = Paragraph::new(lines).alignment(Alignment::Center);
    if !fits || card.source_text.width() > max_width {
        widget = widget.wrap(Wrap { trim: true });
    }
    f.render_widget(widget, chunks[3]);

    let status = format!(
        "{} | Auto-speak: {}",
        if paused { "PAUSED (manual)" } else { "AUTO" },
        on_off(machine.is_some_and(|m| m.auto_speak())),
    );
    let status_style = if paused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    f.render_widget(
        Paragraph::new(Span::styled(status, status_style)).alignment(Alignment::Center),
        chunks[5],
    );

    let keys = match card.phase {
        Phase::ShowingSource => "(k/→) pass / (n/↓) next / (b/←) back / (p)ause / (s)peak / (a)uto-speak / (t)imer / (e)nd",
        _ => "(n/↓) next / (b/←) back / (p)ause / (s)peak / (a)uto-speak / (t)imer / (e)nd",
    };
    f.render_widget(legend(keys), chunks[6]);
}

pub fn render_summary(app: &App, f: &mut Frame) {
    let Some(report) = app.summary.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // range
            Constraint::Length(1), // counts
            Constraint::Length(1), // times
            Constraint::Length(1), // padding
            Constraint::Min(1),    // missed words
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    if let Some(range) = report.day_range {
        f.render_widget(
            Paragraph::new(Span::styled(format!("Day {range}"), bold())).alignment(Alignment::Center),
            chunks[0],
        );
    }
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "Studied {}   Known {}   Missed {}",
                report.studied_count,
                report.known_count,
                report.missed.len()
            ),
            bold(),
        ))
        .alignment(Alignment::Center),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "study time {}   paused {}",
                report.study_time(),
                report.pause_time()
            ),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        chunks[2],
    );

    let missed = if report.has_missed() {
        report
            .missed
            .iter()
            .map(|w| {
                Line::from(vec![
                    Span::styled(format!("{:<24}", w.en), bold()),
                    Span::raw(w.ko.lines().join(" / ")),
                ])
            })
            .collect_vec()
    } else {
        vec![Line::from(Span::styled(
            "Every word was known",
            Style::default().fg(Color::Green),
        ))]
    };
    f.render_widget(
        Paragraph::new(missed).block(Block::default().borders(Borders::ALL).title(" missed ")),
        chunks[4],
    );
    f.render_widget(notice_line(app), chunks[5]);

    let keys = if report.has_missed() {
        format!(
            "(r)eview missed / (s)huffle review: {} / (n)ew / (esc)ape",
            on_off(app.review_shuffle)
        )
    } else {
        "(n)ew / (esc)ape".to_string()
    };
    f.render_widget(legend(&keys), chunks[6]);
}

pub fn render_search(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // query
            Constraint::Min(1),    // results
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(format!("{}_", app.query), bold()))
            .block(Block::default().borders(Borders::ALL).title(" search ")),
        chunks[0],
    );

    let hits = app.vocabulary.search(&app.query);
    let lines = if hits.is_empty() && !app.query.trim().is_empty() {
        vec![Line::from(Span::styled("no matches", dim()))]
    } else {
        hits.iter()
            .map(|w| {
                Line::from(vec![
                    Span::styled(format!("{:<6}", w.idx), dim()),
                    Span::styled(format!("Day {:<4}", w.day), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("{:<24}", w.en), bold()),
                    Span::raw(w.ko.lines().join(" / ")),
                ])
            })
            .collect_vec()
    };
    f.render_widget(Paragraph::new(lines), chunks[1]);
    f.render_widget(legend("(type) search / (esc) back"), chunks[2]);
}
