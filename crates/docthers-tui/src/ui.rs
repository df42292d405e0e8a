use docthers_core::{
    project, project_composer, AttachmentAffordance, ChatRole, MessageBlock, Outcome, Phase,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, composer, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_composer(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.image_prompt.is_some() {
        render_image_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let endpoint = Span::styled(
        format!(" {} ", app.client.url()),
        Style::default().fg(Color::Gray),
    );

    let title = Line::from(vec![
        Span::styled(" DoctHers Chatbot ", Style::default().fg(Color::Cyan).bold()),
        endpoint,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Lines for the transcript, including the pending-reply indicator.
pub fn transcript_lines(blocks: &[MessageBlock<'_>], sending: bool, frame_no: u8) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for block in blocks {
        lines.push(role_line(block.role));
        for paragraph in &block.paragraphs {
            lines.push(Line::from(paragraph.to_string()));
        }
        lines.push(Line::default());
    }

    if sending {
        lines.push(role_line(ChatRole::Assistant));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((frame_no as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn role_line(role: ChatRole) -> Line<'static> {
    let color = match role {
        ChatRole::User => Color::Cyan,
        ChatRole::Assistant => Color::Yellow,
    };
    Line::from(Span::styled(
        format!("{}:", role.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let inner = block.inner(area);

    let transcript = app.session.transcript();
    let text = if transcript.is_empty() && app.session.phase() == Phase::Idle {
        Text::from(Span::styled(
            "Type a message or attach an image to get started...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let blocks = project(transcript);
        Text::from(transcript_lines(
            &blocks,
            app.session.phase() == Phase::Sending,
            app.animation_frame,
        ))
    };

    // Measure with the same wrapping the widget draws with
    let chat = Paragraph::new(text).wrap(Wrap { trim: false });
    let content_rows = chat.line_count(inner.width).min(u16::MAX as usize) as u16;
    let offset = app.scroll.layout(content_rows, inner.height);

    let chat = chat.block(block).scroll((offset, 0));

    frame.render_widget(chat, area);
}

fn render_composer(app: &App, frame: &mut Frame, area: Rect) {
    let view = project_composer(app.session.composer());

    let (badge, badge_color) = match view.attachment {
        AttachmentAffordance::Pick => (" [+] image: Ctrl+O ".to_string(), Color::DarkGray),
        AttachmentAffordance::Selected(name) => (format!(" [img] {} ", name), Color::Green),
        AttachmentAffordance::Sending(name) => (format!(" [img] {} (sending) ", name), Color::Magenta),
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Type your message... ")
        .title_bottom(Line::from(Span::styled(badge, Style::default().fg(badge_color))));

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = view.text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if app.image_prompt.is_none() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Ctrl+O ", key_style),
        Span::styled(" image ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {}", status), Style::default().fg(Color::Yellow)));
    } else if app.session.last_outcome() == Some(Outcome::Failed) {
        spans.push(Span::styled(
            "  last request failed",
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_image_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let Some(prompt) = app.image_prompt.as_ref() else {
        return;
    };

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 6;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Attach Image ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Path to an image file. Enter to attach, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let width = input_area.width as usize;
    let skip = prompt.cursor.saturating_sub(width.saturating_sub(1));
    let visible: String = prompt.input.chars().skip(skip).take(width).collect();
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    let cursor_x = (prompt.cursor - skip) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}
