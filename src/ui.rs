pub mod code_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::{
    app::{App, AppState},
    metrics::MetricsSnapshot,
    session::Phase,
};

const HORIZONTAL_MARGIN: u16 = 3;
const VERTICAL_MARGIN: u16 = 1;
const STAT_COLUMN_WIDTH: usize = 12;

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let finished = self.state == AppState::Results;

        let constraints = if finished {
            vec![
                Constraint::Length(2), // stats
                Constraint::Length(1), // language badge
                Constraint::Length(1), // padding
                Constraint::Min(3),    // code
                Constraint::Length(6), // results panel
            ]
        } else {
            vec![
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1), // hint
            ]
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(constraints)
            .split(area);

        stats_bar(&self.controller.snapshot(), self.controller.error_count()).render(chunks[0], buf);
        badge(self).render(chunks[1], buf);
        render_code(self, chunks[3], buf);

        if finished {
            results_panel(&self.controller.snapshot()).render(chunks[4], buf);
        } else {
            hint(self.controller.phase()).render(chunks[4], buf);
        }
    }
}

fn stat_cells(snapshot: &MetricsSnapshot, errors: u32) -> [(String, &'static str, Color); 4] {
    [
        (snapshot.wpm.to_string(), "WPM", Color::Yellow),
        (format!("{}%", snapshot.accuracy), "Accuracy", Color::Blue),
        (format!("{}s", snapshot.elapsed_secs), "Time", Color::Magenta),
        (errors.to_string(), "Errors", Color::Red),
    ]
}

fn stats_bar(snapshot: &MetricsSnapshot, errors: u32) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let label = Style::default().fg(Color::Gray);

    let (values, labels): (Vec<Span>, Vec<Span>) = stat_cells(snapshot, errors)
        .into_iter()
        .map(|(value, name, color)| {
            (
                Span::styled(format!("{value:^w$}", w = STAT_COLUMN_WIDTH), bold.fg(color)),
                Span::styled(format!("{name:^w$}", w = STAT_COLUMN_WIDTH), label),
            )
        })
        .unzip();

    Paragraph::new(vec![Line::from(values), Line::from(labels)]).alignment(Alignment::Center)
}

fn badge(app: &App) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.language),
        Style::default()
            .fg(Color::Blue)
            .bg(Color::Rgb(20, 30, 60))
            .add_modifier(Modifier::BOLD),
    )];

    spans.push(Span::styled(
        format!("  {}", app.snippet.description),
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    if let Some(difficulty) = app.controller.meta().difficulty {
        spans.push(Span::styled(
            format!("  [{difficulty}]"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
}

fn render_code(app: &App, area: Rect, buf: &mut Buffer) {
    // borders plus one column of padding on each side
    let wanted = code_view::code_width(app.controller.target()).saturating_add(4);
    let width = wanted.min(area.width);
    let code_area = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    Paragraph::new(code_view::code_lines(&app.controller))
        .block(block)
        .render(code_area, buf);
}

fn results_panel(snapshot: &MetricsSnapshot) -> Paragraph<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let summary: Vec<Span> = stat_cells(snapshot, snapshot.error_count)
        .into_iter()
        .flat_map(|(value, name, color)| {
            [
                Span::styled(value, bold.fg(color)),
                Span::styled(format!(" {name}    "), Style::default().fg(Color::Gray)),
            ]
        })
        .collect();

    let legend = Span::styled(
        "(r)etry / (n)ew / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    );

    Paragraph::new(vec![
        Line::from(summary),
        Line::default(),
        Line::from(legend),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Completed!", bold.fg(Color::Green)))
            .title_alignment(Alignment::Center),
    )
}

fn hint(phase: Phase) -> Paragraph<'static> {
    let text = match phase {
        Phase::Idle => "start typing to begin   (ctrl+r) restart  (ctrl+n) new  (esc) quit",
        _ => "(ctrl+r) restart  (ctrl+n) new  (esc) quit",
    };

    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}
