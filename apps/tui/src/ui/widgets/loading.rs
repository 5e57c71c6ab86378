use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::Frame;
use throbber_widgets_tui::{Throbber, ThrobberState, BRAILLE_SIX};

/// Frame index derived from the app's animation clock, so the spinner
/// advances without the UI holding mutable state.
#[allow(clippy::cast_possible_truncation)]
fn spinner_step(animation_counter: f64) -> i8 {
    ((animation_counter * 4.0) as i64 % i64::from(i8::MAX)) as i8
}

pub fn render_spinner(f: &mut Frame<'_>, area: Rect, label: &str, animation_counter: f64) {
    let throbber = Throbber::default()
        .label(label.to_string())
        .style(Style::default().fg(Color::Gray))
        .throbber_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .throbber_set(BRAILLE_SIX);

    let mut state = ThrobberState::default();
    state.calc_step(spinner_step(animation_counter));
    f.render_stateful_widget(throbber, area, &mut state);
}
