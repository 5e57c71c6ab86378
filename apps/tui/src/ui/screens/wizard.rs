use crate::app::wizard::WizardStep;
use crate::app::App;
use crate::domain::VisualizationType;
use crate::ui::widgets::loading::render_spinner;
use crate::ui::widgets::notifications::render_notifications;
use crate::ui::widgets::tables::scroll_offset;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const DATA_URI_PREVIEW: usize = 48;

pub fn render_wizard(app: &App, f: &mut Frame<'_>) {
    let notification_rows = u16::try_from(app.notifier.active().len())
        .unwrap_or(u16::MAX)
        .clamp(1, 4);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                     // Title area
            Constraint::Min(8),                        // Wizard panels
            Constraint::Length(notification_rows + 2), // Notifications
            Constraint::Length(1),                     // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    render_title_section(app, f, main_layout[0]);
    render_panels(app, f, main_layout[1]);
    render_footer(app, f, main_layout[2]);
    render_shortcuts(f, main_layout[3]);
}

fn render_footer(app: &App, f: &mut Frame<'_>, area: Rect) {
    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let value = Style::default().fg(Color::Yellow);
    let summary = TextLine::from(vec![
        Span::styled(
            app.selection.current_round().map_or_else(
                || "no round".to_string(),
                |round| format!("Round {round}"),
            ),
            value,
        ),
        Span::raw(" / "),
        Span::styled(
            app.selection
                .selected_session()
                .map_or_else(|| "no session".to_string(), ToString::to_string),
            value,
        ),
        Span::raw(" / "),
        Span::styled(app.selection.visualization_type().as_str(), value),
    ]);
    let paragraph = Paragraph::new(summary)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Selection ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        );
    f.render_widget(paragraph, split[0]);

    render_notifications(f, split[1], app.notifier.active());
}

fn panel_block(app: &App, step: WizardStep, extra: &str) -> Block<'static> {
    let color = if app.focus == step {
        Color::Cyan
    } else {
        Color::Gray
    };
    Block::default()
        .title(format!(" {}{extra} ", step.title()))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn selected_style() -> Style {
    Style::default()
        .bg(Color::Rgb(0, 0, 238))
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Race Sentiment ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(title_block, area);

    let inner = area.inner(Margin::new(1, 1));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner);

    let info = Paragraph::new(TextLine::from(vec![
        Span::styled("API ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.config.api_base_url.as_str(),
            Style::default().fg(Color::White),
        ),
        Span::styled("   Mode ", Style::default().fg(Color::Gray)),
        Span::styled(
            app.mode.label(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(info, chunks[0]);

    if app.is_loading() {
        let label = if app.trigger.is_in_flight() {
            app.analysis.phase().to_string()
        } else {
            "Loading".to_string()
        };
        render_spinner(f, chunks[1], &label, app.animation_counter);
    }
}

fn render_panels(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    // Hidden panels take no space at all.
    let left: Vec<WizardStep> = app
        .wizard
        .visible_panels()
        .filter(|step| *step != WizardStep::Results)
        .collect();
    let constraints: Vec<Constraint> = left
        .iter()
        .map(|step| match step {
            WizardStep::RoundSelect => Constraint::Min(5),
            _ => Constraint::Length(9),
        })
        .collect();
    let left_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(columns[0]);

    for (step, panel_area) in left.iter().zip(left_areas.iter()) {
        match step {
            WizardStep::RoundSelect => render_rounds_panel(app, f, *panel_area),
            WizardStep::SessionSelect => render_sessions_panel(app, f, *panel_area),
            WizardStep::VisualizationSelect => render_visualization_panel(app, f, *panel_area),
            WizardStep::Results => {}
        }
    }

    if app.wizard.is_visible(WizardStep::Results) {
        render_results_panel(app, f, columns[1]);
    } else {
        render_placeholder(app, f, columns[1]);
    }
}

fn render_rounds_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let filter = if app.filtering || !app.round_filter.is_empty() {
        format!(" [/{}]", app.round_filter)
    } else {
        String::new()
    };
    let block = panel_block(app, WizardStep::RoundSelect, &filter);

    let rounds = app.filtered_rounds();
    if rounds.is_empty() {
        let message = if app.loading_races {
            "Loading races..."
        } else {
            "No races found. Press r to reload."
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let max_visible_rows = usize::from(area.height.saturating_sub(2));
    let offset = scroll_offset(rounds.len(), max_visible_rows, app.round_cursor);
    let current = app.selection.current_round();

    let lines: Vec<TextLine<'_>> = rounds
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, round)| {
            let marker = if current == Some(round.id.as_str()) {
                "● "
            } else {
                "  "
            };
            let style = if i == app.round_cursor && app.focus == WizardStep::RoundSelect {
                selected_style()
            } else {
                Style::default()
            };
            TextLine::from(Span::styled(format!("{marker}{}", round.label()), style))
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_sessions_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = panel_block(app, WizardStep::SessionSelect, "");

    if app.sessions.is_empty() {
        let message = if app.loading_sessions {
            "Loading sessions..."
        } else {
            "No sessions available"
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let max_visible_rows = usize::from(area.height.saturating_sub(2));
    let offset = scroll_offset(app.sessions.len(), max_visible_rows, app.session_cursor);
    let selected = app.selection.selected_session();

    let lines: Vec<TextLine<'_>> = app
        .sessions
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(i, session)| {
            let marker = if selected == Some(session) { "● " } else { "  " };
            let style = if i == app.session_cursor && app.focus == WizardStep::SessionSelect {
                selected_style()
            } else {
                Style::default()
            };
            TextLine::from(Span::styled(format!("{marker}{session}"), style))
        })
        .collect();

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_visualization_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = panel_block(app, WizardStep::VisualizationSelect, "");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(inner);

    let chosen = app.selection.visualization_type();
    let lines: Vec<TextLine<'_>> = VisualizationType::ALL
        .iter()
        .map(|kind| {
            let radio = if *kind == chosen { "(•)" } else { "( )" };
            let style = if *kind == chosen {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            TextLine::from(Span::styled(format!("{radio} {}", kind.label()), style))
        })
        .collect();
    f.render_widget(Paragraph::new(Text::from(lines)), split[0]);

    render_trigger(app, f, split[1]);
}

fn render_trigger(app: &App, f: &mut Frame<'_>, area: Rect) {
    let color = if app.trigger.is_enabled() {
        Color::Green
    } else {
        Color::DarkGray
    };
    let button = Paragraph::new(Span::styled(
        app.trigger.label(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(button, area);
}

fn render_placeholder(app: &App, f: &mut Frame<'_>, area: Rect) {
    let hint = match app.wizard.step() {
        WizardStep::RoundSelect => "Select a round to begin",
        WizardStep::SessionSelect => "Select a session",
        _ => "Choose a chart type and press Enter to analyze",
    };
    let paragraph = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(paragraph, area);
}

fn info_line<'a>(label: &'a str, value: String, value_style: Style) -> TextLine<'a> {
    TextLine::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, value_style),
    ])
}

fn render_results_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = panel_block(app, WizardStep::Results, "");

    let Some(displayed) = &app.displayed else {
        let paragraph = Paragraph::new("No visualization displayed")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    };

    let value = Style::default().fg(Color::Yellow);
    let visualization = &displayed.visualization;

    let mut lines = vec![
        TextLine::from(Span::styled(
            visualization.kind.label(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        info_line("Round", displayed.round.clone(), value),
        info_line("Session", displayed.session.to_string(), value),
    ];

    if displayed.was_substituted() {
        lines.push(info_line(
            "Requested",
            format!("{} (not generated)", displayed.requested.label()),
            Style::default().fg(Color::Red),
        ));
    }

    match app.image_info {
        Some(info) => {
            lines.push(info_line(
                "Image",
                format!("{}x{} PNG, {} bytes", info.width, info.height, info.bytes),
                value,
            ));
        }
        None => lines.push(info_line(
            "Image",
            "unreadable PNG header".to_string(),
            Style::default().fg(Color::Red),
        )),
    }

    let uri = visualization.data_uri();
    let preview: String = uri.chars().take(DATA_URI_PREVIEW).collect();
    lines.push(info_line(
        "Data",
        format!("{preview}..."),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some(stats) = &displayed.stats {
        lines.push(TextLine::from(""));
        lines.push(info_line(
            "Generated",
            stats.visualizations_generated.to_string(),
            value,
        ));
        lines.push(info_line("Post limit", stats.post_limit.to_string(), value));
        if let Some(comments) = stats.comment_limit {
            lines.push(info_line("Comment limit", comments.to_string(), value));
        }
    }

    if let Some(batch) = app.selection.last_realtime_batch() {
        let kinds: Vec<&str> = batch.kinds().map(VisualizationType::label).collect();
        lines.push(info_line("Available", kinds.join(", "), value));
    }

    lines.push(TextLine::from(""));
    match &app.last_export {
        Some(path) => lines.push(info_line(
            "Saved",
            path.display().to_string(),
            Style::default().fg(Color::Green),
        )),
        None => lines.push(TextLine::from(Span::styled(
            "Press e to export this chart as PNG",
            Style::default().fg(Color::Gray),
        ))),
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let key = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::Gray);

    let shortcuts = TextLine::from(vec![
        Span::styled("F1", key),
        Span::styled(": Help   ", text),
        Span::styled("Tab", key),
        Span::styled(": Panel   ", text),
        Span::styled("Enter", key),
        Span::styled(": Select   ", text),
        Span::styled("m", key),
        Span::styled(": Mode   ", text),
        Span::styled("e", key),
        Span::styled(": Export   ", text),
        Span::styled("x", key),
        Span::styled(": Dismiss   ", text),
        Span::styled("q", key),
        Span::styled(": Quit", text),
    ]);
    f.render_widget(Paragraph::new(shortcuts).alignment(Alignment::Center), area);
}
