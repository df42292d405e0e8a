//! Holder of not-yet-sent user input.

use crate::attachment::Attachment;

#[derive(Debug, Default, Clone)]
enum ImageSlot {
    #[default]
    Empty,
    Selected(Attachment),
    /// Handed to an in-flight cycle. Still shown, but no other send may take it.
    Lent(Attachment),
}

/// Pending text plus at most one pending image.
#[derive(Debug, Default, Clone)]
pub struct Composer {
    text: String,
    image: ImageSlot,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the pending text. Empty strings are fine.
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.text = value.into();
    }

    /// Replace the pending image. Any previous selection is dropped.
    pub fn set_image(&mut self, attachment: Attachment) {
        self.image = ImageSlot::Selected(attachment);
    }

    pub fn pending_image(&self) -> Option<&Attachment> {
        match &self.image {
            ImageSlot::Empty => None,
            ImageSlot::Selected(a) | ImageSlot::Lent(a) => Some(a),
        }
    }

    /// True while the pending image belongs to an in-flight send.
    pub fn image_in_flight(&self) -> bool {
        matches!(self.image, ImageSlot::Lent(_))
    }

    /// Whether a send would do anything.
    pub fn can_send(&self) -> bool {
        !self.text.trim().is_empty() || self.sendable_image().is_some()
    }

    /// Take the input for one send cycle.
    ///
    /// The text is cleared right away. The image stays in place until
    /// [`Composer::clear_image`] but is marked as lent, so a second send
    /// started before this one resolves will not capture it again.
    pub fn consume_for_send(&mut self) -> (String, Option<Attachment>) {
        let text = std::mem::take(&mut self.text);
        let image = match std::mem::take(&mut self.image) {
            ImageSlot::Selected(a) => {
                self.image = ImageSlot::Lent(a.clone());
                Some(a)
            }
            other => {
                self.image = other;
                None
            }
        };
        (text, image)
    }

    pub fn clear_image(&mut self) {
        self.image = ImageSlot::Empty;
    }

    fn sendable_image(&self) -> Option<&Attachment> {
        match &self.image {
            ImageSlot::Selected(a) if !a.is_empty() => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> Attachment {
        Attachment::from_bytes(name, vec![0xff, 0xd8, 0xff]).unwrap()
    }

    #[test]
    fn test_can_send_ignores_whitespace_text() {
        let mut composer = Composer::new();
        assert!(!composer.can_send());

        composer.set_text("   \n\t");
        assert!(!composer.can_send());

        composer.set_text(" hi ");
        assert!(composer.can_send());
    }

    #[test]
    fn test_image_alone_is_sendable() {
        let mut composer = Composer::new();
        composer.set_image(image("xray.jpg"));
        assert!(composer.can_send());
    }

    #[test]
    fn test_new_image_replaces_previous() {
        let mut composer = Composer::new();
        composer.set_image(image("first.png"));
        composer.set_image(image("second.png"));
        assert_eq!(composer.pending_image().unwrap().file_name(), "second.png");
    }

    #[test]
    fn test_consume_clears_text_but_keeps_image() {
        let mut composer = Composer::new();
        composer.set_text("Hello");
        composer.set_image(image("rash.png"));

        let (text, taken) = composer.consume_for_send();
        assert_eq!(text, "Hello");
        assert_eq!(taken.unwrap().file_name(), "rash.png");

        assert_eq!(composer.text(), "");
        assert_eq!(composer.pending_image().unwrap().file_name(), "rash.png");
        assert!(composer.image_in_flight());
    }

    #[test]
    fn test_lent_image_is_not_captured_twice() {
        let mut composer = Composer::new();
        composer.set_image(image("rash.png"));
        let (_, first) = composer.consume_for_send();
        assert!(first.is_some());

        // Image already belongs to the first cycle
        assert!(!composer.can_send());
        composer.set_text("follow up");
        let (text, second) = composer.consume_for_send();
        assert_eq!(text, "follow up");
        assert!(second.is_none());
    }

    #[test]
    fn test_clear_image() {
        let mut composer = Composer::new();
        composer.set_image(image("rash.png"));
        composer.consume_for_send();
        composer.clear_image();
        assert!(composer.pending_image().is_none());
        assert!(!composer.image_in_flight());
    }
}
