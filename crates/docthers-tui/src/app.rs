use std::path::{Path, PathBuf};

use docthers_core::{
    Attachment, ChatSession, Completed, PendingSend, ResponseClient, SendCycle, WidgetEvent,
};
use futures_util::stream::FuturesUnordered;
use ratatui::layout::Rect;

use crate::scroll::{ScrollAnchor, ScrollController};

/// Path prompt shown while picking an image.
#[derive(Debug, Default)]
pub struct ImagePrompt {
    pub input: String,
    pub cursor: usize,
}

pub struct App {
    pub should_quit: bool,

    // Widget state
    pub session: ChatSession,
    pub client: ResponseClient,
    pub in_flight: FuturesUnordered<PendingSend>,

    // Input state
    pub input_cursor: usize, // cursor position in the composer text, in chars
    pub image_prompt: Option<ImagePrompt>,
    pub status: Option<String>,

    // Transcript view
    pub scroll: ScrollController,
    pub chat_area: Option<Rect>, // for mouse hit-testing, updated during render

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: ResponseClient) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            client,
            in_flight: FuturesUnordered::new(),
            input_cursor: 0,
            image_prompt: None,
            status: None,
            scroll: ScrollController::new(ScrollAnchor::default()),
            chat_area: None,
            animation_frame: 0,
        }
    }

    /// Feed an event into the session and start any send it produced.
    pub fn apply(&mut self, event: WidgetEvent) {
        if let Some(cycle) = self.session.dispatch(event) {
            self.start(cycle);
        }
        self.scroll.observe(self.session.transcript().len());
    }

    pub fn submit(&mut self) {
        self.apply(WidgetEvent::Submit);
        let remaining = self.session.composer().text().chars().count();
        self.input_cursor = self.input_cursor.min(remaining);
        self.status = None;
    }

    pub fn set_text(&mut self, text: String, cursor: usize) {
        self.input_cursor = cursor;
        self.apply(WidgetEvent::TextChanged(text));
    }

    pub fn resolve(&mut self, done: Completed) {
        self.session.resolve(done);
        self.scroll.observe(self.session.transcript().len());
    }

    pub fn open_image_prompt(&mut self) {
        self.image_prompt = Some(ImagePrompt::default());
    }

    pub fn close_image_prompt(&mut self) {
        self.image_prompt = None;
    }

    /// Load the file named in the prompt. On failure the prompt stays open
    /// and the composer keeps whatever it had.
    pub fn confirm_image_prompt(&mut self) {
        let Some(prompt) = self.image_prompt.as_ref() else {
            return;
        };
        if prompt.input.trim().is_empty() {
            self.close_image_prompt();
            return;
        }

        let path = expand_home(prompt.input.trim());
        match Attachment::from_path(&path) {
            Ok(attachment) => {
                self.status = Some(format!("Attached {}", attachment.file_name()));
                self.apply(WidgetEvent::ImageSelected(attachment));
                self.close_image_prompt();
            }
            Err(err) => {
                tracing::warn!(error = %err, "image selection rejected");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if !self.in_flight.is_empty() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Abandon in-flight sends when the widget goes away.
    pub fn unmount(&mut self) {
        for pending in self.in_flight.iter() {
            tracing::debug!(cycle = %pending.id(), "cancelling on unmount");
            pending.cancel();
        }
    }

    fn start(&mut self, cycle: SendCycle) {
        self.in_flight.push(cycle.spawn(self.client.clone()));
    }
}

fn expand_home(input: &str) -> PathBuf {
    match (input.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => Path::new(input).to_path_buf(),
    }
}
