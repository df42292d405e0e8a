//! Side-effect-free projection of session state into displayable blocks.
//!
//! Front ends turn these into their own widgets. Calling either function
//! twice on the same state gives equal output.

use crate::composer::Composer;
use crate::state::ChatRole;
use crate::transcript::Transcript;

/// One message, split into paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock<'a> {
    pub role: ChatRole,
    pub paragraphs: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentAffordance<'a> {
    /// Nothing attached; offer the picker.
    Pick,
    Selected(&'a str),
    /// Attached and already captured by an in-flight send.
    Sending(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerView<'a> {
    pub text: &'a str,
    pub attachment: AttachmentAffordance<'a>,
}

pub fn project(transcript: &Transcript) -> Vec<MessageBlock<'_>> {
    transcript
        .iter()
        .map(|message| MessageBlock {
            role: message.role(),
            paragraphs: paragraphs(message.content()),
        })
        .collect()
}

pub fn project_composer(composer: &Composer) -> ComposerView<'_> {
    let attachment = match composer.pending_image() {
        None => AttachmentAffordance::Pick,
        Some(image) if composer.image_in_flight() => AttachmentAffordance::Sending(image.file_name()),
        Some(image) => AttachmentAffordance::Selected(image.file_name()),
    };

    ComposerView {
        text: composer.text(),
        attachment,
    }
}

// `split` rather than `lines`: empty content still yields one paragraph and
// a trailing newline yields a trailing empty one.
fn paragraphs(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
