use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::notifier::{Notification, NotificationKind};

pub const fn kind_color(kind: NotificationKind) -> Color {
    match kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Info => Color::Cyan,
    }
}

fn notification_line(notification: &Notification) -> TextLine<'_> {
    let color = kind_color(notification.kind);
    TextLine::from(vec![
        Span::styled(
            notification.shown_at.format("%H:%M:%S ").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("[{}] ", notification.kind.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.as_str(), Style::default().fg(color)),
    ])
}

/// Newest notification last; older ones scroll off the top.
pub fn render_notifications(f: &mut Frame<'_>, area: Rect, notifications: &[Notification]) {
    let block = Block::default()
        .title(" Notifications ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let visible = usize::from(area.height.saturating_sub(2));
    let skip = notifications.len().saturating_sub(visible);
    let lines: Vec<TextLine<'_>> = notifications
        .iter()
        .skip(skip)
        .map(notification_line)
        .collect();

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
