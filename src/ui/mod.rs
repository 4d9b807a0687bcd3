mod theme;

pub use theme::Theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{ConnectionState, DashboardApp};
use crate::workflow::StepStatus;

/// Main draw function for the dashboard.
pub fn draw(frame: &mut Frame, app: &DashboardApp) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header (no border)
            Constraint::Min(7),    // Step list
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, chunks[0], app);
    draw_steps(frame, chunks[1], app);
    draw_status_bar(frame, chunks[2], app);
}

/// Draw header bar (1 line, no borders): title left, connection state right.
fn draw_header(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    frame.render_widget(Clear, area);

    frame.render_widget(
        Paragraph::new(" Vault Provisioning ")
            .style(app.theme.primary_style().add_modifier(Modifier::BOLD)),
        area,
    );

    let (text, style) = match &app.connection {
        ConnectionState::Connecting => ("[Backend: ...] ".to_string(), app.theme.muted_style()),
        ConnectionState::Open => ("[Backend: OK] ".to_string(), app.theme.secondary_style()),
        ConnectionState::Lost(message) => {
            (format!("[Backend: {}] ", message), app.theme.error_style())
        }
        ConnectionState::Closed => ("[Backend: done] ".to_string(), app.theme.muted_style()),
    };
    frame.render_widget(
        Paragraph::new(text).style(style).alignment(Alignment::Right),
        area,
    );
}

fn draw_steps(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style())
        .title(" Progress ");

    let mut lines: Vec<Line> = Vec::new();
    for step in app.resolved_steps() {
        let glyph = match step.status {
            StepStatus::None => ' ',
            StepStatus::Active => app.spinner_char(),
            StepStatus::Finished => 'x',
            StepStatus::Failed => '!',
        };
        let style = app.theme.status_style(step.status);

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", glyph), style),
            Span::styled(step.title, style),
        ]));

        let description_style = if step.status == StepStatus::Failed {
            app.theme.error_style()
        } else {
            app.theme.muted_style()
        };
        lines.push(Line::from(Span::styled(
            format!("   {}", step.description),
            description_style,
        )));
        lines.push(Line::default());
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &DashboardApp) {
    frame.render_widget(
        Paragraph::new(" q: quit").style(app.theme.muted_style()),
        area,
    );
}
