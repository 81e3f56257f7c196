use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::core::session::{Outcome, Summary};
use crate::games::GameInfo;

const EMULATOR_HINT: &str = "Emulator: mouse moves the subject  [1-9,0] pick preset  [Tab] next preset  [Backspace] hide";

/// Title, description and controls, waiting for the player to start.
pub fn render_menu(f: &mut Frame, area: Rect, info: &GameInfo, controls: &[&str], emulated: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    f.render_widget(
        Paragraph::new(format!(" {} ", info.name.to_uppercase()))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let mut items: Vec<ListItem> = vec![
        ListItem::new(info.description).style(Style::default().fg(Color::White)),
        ListItem::new(""),
    ];
    items.extend(controls.iter().map(|c| ListItem::new(format!(" » {c}"))));
    if emulated {
        items.push(ListItem::new(""));
        items.push(ListItem::new(EMULATOR_HINT).style(Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(List::new(items).block(Block::default().title(" HOW TO PLAY ").borders(Borders::ALL)), chunks[1]);

    f.render_widget(
        Paragraph::new("[SPACE] Start   [ESC] Quit").alignment(Alignment::Center),
        chunks[2],
    );
}

pub fn render_results(f: &mut Frame, area: Rect, info: &GameInfo, outcome: Outcome, summary: &Summary) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let color = match outcome {
        Outcome::Victory => Color::Green,
        Outcome::GameOver => Color::Red,
        Outcome::Abandoned => Color::Yellow,
    };
    f.render_widget(
        Paragraph::new(format!(" {} ", outcome.title()))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", info.name)))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let mut lines: Vec<Line> = summary.lines.iter().map(|l| Line::from(l.as_str())).collect();
    if let Some(rating) = summary.rating {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(rating, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))));
    }
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(" RESULTS ").borders(Borders::ALL)),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new("[SPACE] Back to menu   [ESC] Quit").alignment(Alignment::Center),
        chunks[2],
    );
}

/// Bottom line: feed source, whether anyone is detected, emulator preset.
pub fn render_status(f: &mut Frame, area: Rect, feed: &str, detected: bool, preset: Option<&str>) {
    let (mark, color) = if detected { ("● tracking", Color::Green) } else { ("○ nobody", Color::DarkGray) };
    let mut spans = vec![
        Span::styled(format!(" {feed} "), Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(mark, Style::default().fg(color)),
    ];
    if let Some(preset) = preset {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("preset: {preset}"), Style::default().fg(Color::Magenta)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn info() -> GameInfo {
        GameInfo { id: "maze", name: "Head Maze", description: "Guide the ball out." }
    }

    fn screen(draw: impl FnOnce(&mut Frame)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(draw).unwrap();
        terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn menu_shows_controls_and_emulator_hint() {
        let text = screen(|f| render_menu(f, f.area(), &info(), &["Move your head"], true));
        assert!(text.contains("HEAD MAZE"));
        assert!(text.contains("Move your head"));
        assert!(text.contains("Emulator"));

        let text = screen(|f| render_menu(f, f.area(), &info(), &[], false));
        assert!(!text.contains("Emulator"));
    }

    #[test]
    fn results_show_outcome_and_rating() {
        let summary = Summary::default().line("Time: 42s");
        let summary = Summary { rating: Some("MAZE MASTER"), ..summary };
        let text = screen(|f| render_results(f, f.area(), &info(), Outcome::Victory, &summary));
        assert!(text.contains("VICTORY"));
        assert!(text.contains("Time: 42s"));
        assert!(text.contains("MAZE MASTER"));
    }

    #[test]
    fn status_reports_tracking_and_preset() {
        let text = screen(|f| render_status(f, f.area(), "emulator", true, Some("fist")));
        assert!(text.contains("tracking"));
        assert!(text.contains("preset: fist"));
    }
}
