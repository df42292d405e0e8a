use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.image_prompt.is_some() {
        handle_image_prompt(app, key);
    } else {
        handle_composer(app, key);
    }
}

fn handle_composer(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Char('s') if ctrl => app.submit(),
        KeyCode::Char('o') if ctrl => app.open_image_prompt(),
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up => app.scroll.scroll_up(1),
        KeyCode::Down => app.scroll.scroll_down(1),
        KeyCode::PageUp => app.scroll.scroll_up(page_rows(app)),
        KeyCode::PageDown => app.scroll.scroll_down(page_rows(app)),
        KeyCode::Home if ctrl => app.scroll.scroll_to_top(),
        KeyCode::End if ctrl => app.scroll.scroll_to_bottom(),
        code => {
            let mut text = app.session.composer().text().to_string();
            let mut cursor = app.input_cursor;
            let before = text.clone();
            if edit_line(&mut text, &mut cursor, code, key.modifiers) {
                if text == before {
                    app.input_cursor = cursor;
                } else {
                    app.set_text(text, cursor);
                }
            }
        }
    }
}

fn handle_image_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_image_prompt(),
        KeyCode::Enter => app.confirm_image_prompt(),
        code => {
            if let Some(prompt) = app.image_prompt.as_mut() {
                edit_line(&mut prompt.input, &mut prompt.cursor, code, key.modifiers);
            }
        }
    }
}

fn handle_paste(app: &mut App, pasted: &str) {
    // The composer is a single line; newlines in a paste become spaces
    let pasted = pasted.replace(['\r', '\n'], " ");

    if let Some(prompt) = app.image_prompt.as_mut() {
        let byte_pos = char_to_byte_index(&prompt.input, prompt.cursor);
        prompt.input.insert_str(byte_pos, pasted.trim());
        prompt.cursor += pasted.trim().chars().count();
        return;
    }

    let mut text = app.session.composer().text().to_string();
    let byte_pos = char_to_byte_index(&text, app.input_cursor);
    text.insert_str(byte_pos, &pasted);
    let cursor = app.input_cursor + pasted.chars().count();
    app.set_text(text, cursor);
}

/// Single-line editing shared by the composer and the image prompt.
/// Returns false when the key is not an editing key.
fn edit_line(text: &mut String, cursor: &mut usize, code: KeyCode, modifiers: KeyModifiers) -> bool {
    let char_count = text.chars().count();
    *cursor = (*cursor).min(char_count);

    match code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(char_count),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = char_count,
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
            text.clear();
            *cursor = 0;
        }
        KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

fn page_rows(app: &App) -> u16 {
    app.chat_area
        .map(|r| r.height.saturating_sub(2))
        .filter(|h| *h > 0)
        .unwrap_or(10)
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll.scroll_down(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.scroll.scroll_up(WHEEL_ROWS),
        _ => {}
    }
}
