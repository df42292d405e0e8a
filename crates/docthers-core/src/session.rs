//! The widget's state machine: composer + transcript, driven by events.

use crate::attachment::Attachment;
use crate::composer::Composer;
use crate::coordinator::{Completed, CycleId, Outbound, Outcome, SendCycle};
use crate::state::ChatMessage;
use crate::transcript::Transcript;

/// User interactions, already translated out of whatever UI produced them.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    TextChanged(String),
    ImageSelected(Attachment),
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// At least one cycle is waiting on the endpoint.
    Sending,
}

/// One mounted chat widget.
///
/// Sends are not serialized: every [`SendCycle`] carries its own snapshot and
/// replies are appended in whatever order they resolve.
#[derive(Debug, Default)]
pub struct ChatSession {
    composer: Composer,
    transcript: Transcript,
    next_cycle: u64,
    in_flight: usize,
    last_outcome: Option<Outcome>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight == 0 {
            Phase::Idle
        } else {
            Phase::Sending
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Apply an event. Returns the cycle to run when the event started a send.
    pub fn dispatch(&mut self, event: WidgetEvent) -> Option<SendCycle> {
        match event {
            WidgetEvent::TextChanged(value) => {
                self.composer.set_text(value);
                None
            }
            WidgetEvent::ImageSelected(attachment) => {
                tracing::debug!(file = attachment.file_name(), "image selected");
                self.composer.set_image(attachment);
                None
            }
            WidgetEvent::Submit => self.begin_send(),
        }
    }

    fn begin_send(&mut self) -> Option<SendCycle> {
        if !self.composer.can_send() {
            tracing::debug!("nothing to send");
            return None;
        }

        let (text, image) = self.composer.consume_for_send();
        let payload = Outbound::new(&text, image);
        self.transcript.push(ChatMessage::user(text));

        self.next_cycle += 1;
        self.in_flight += 1;
        let id = CycleId(self.next_cycle);
        tracing::info!(
            cycle = %id,
            text = payload.text().is_some(),
            image = payload.image().is_some(),
            in_flight = self.in_flight,
            "send cycle started"
        );

        Some(SendCycle::new(id, payload))
    }

    /// Fold a finished cycle back in: append the reply and drop the image.
    pub fn resolve(&mut self, done: Completed) {
        let outcome = done.reply.outcome();
        tracing::info!(cycle = %done.id, ?outcome, "send cycle resolved");

        self.transcript.push(done.reply.into_message());
        self.composer.clear_image();
        self.in_flight = self.in_flight.saturating_sub(1);
        self.last_outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{Reply, NOT_UNDERSTOOD, PROCESSING_ERROR};
    use crate::error::SendError;
    use crate::state::ChatRole;

    fn image() -> Attachment {
        Attachment::from_bytes("photo.jpg", vec![0xff, 0xd8]).unwrap()
    }

    fn typed(session: &mut ChatSession, text: &str) -> Option<SendCycle> {
        session.dispatch(WidgetEvent::TextChanged(text.to_string()));
        session.dispatch(WidgetEvent::Submit)
    }

    #[test]
    fn test_empty_submit_is_noop() {
        let mut session = ChatSession::new();
        assert!(session.dispatch(WidgetEvent::Submit).is_none());
        assert!(typed(&mut session, "   ").is_none());
        assert!(session.transcript().is_empty());
        assert_eq!(session.phase(), Phase::Idle);
        // Whitespace-only text survives a rejected send
        assert_eq!(session.composer().text(), "   ");
    }

    #[test]
    fn test_submit_appends_user_message_before_reply() {
        let mut session = ChatSession::new();
        let cycle = typed(&mut session, "Hello").unwrap();

        assert_eq!(session.transcript().len(), 1);
        let first = &session.transcript().as_slice()[0];
        assert_eq!(first.role(), ChatRole::User);
        assert_eq!(first.content(), "Hello");
        assert_eq!(session.composer().text(), "");
        assert_eq!(session.phase(), Phase::Sending);
        assert_eq!(cycle.payload().text(), Some("Hello"));

        session.resolve(Completed {
            id: cycle.id(),
            reply: Reply::Answer("Hi there".to_string()),
        });
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.last_outcome(), Some(Outcome::Answered));
    }

    #[test]
    fn test_image_only_send_has_empty_user_entry() {
        let mut session = ChatSession::new();
        session.dispatch(WidgetEvent::ImageSelected(image()));
        let cycle = session.dispatch(WidgetEvent::Submit).unwrap();

        assert_eq!(session.transcript().as_slice()[0].content(), "");
        assert!(cycle.payload().text().is_none());
        assert_eq!(cycle.payload().image().unwrap().file_name(), "photo.jpg");
    }

    #[test]
    fn test_image_cleared_after_failed_cycle() {
        let mut session = ChatSession::new();
        session.dispatch(WidgetEvent::ImageSelected(image()));
        let cycle = typed(&mut session, "what is this?").unwrap();
        assert!(session.composer().pending_image().is_some());

        session.resolve(Completed {
            id: cycle.id(),
            reply: Reply::Failed(SendError::Cancelled),
        });
        assert!(session.composer().pending_image().is_none());
        assert_eq!(
            session.transcript().last().unwrap().content(),
            PROCESSING_ERROR
        );
    }

    #[test]
    fn test_length_is_twice_completed_minus_noops() {
        let mut session = ChatSession::new();
        let inputs = ["one", "", "two", "  ", "three"];
        let mut completed = 0;

        for input in inputs {
            if let Some(cycle) = typed(&mut session, input) {
                session.resolve(Completed {
                    id: cycle.id(),
                    reply: Reply::NotUnderstood,
                });
                completed += 1;
            }
        }

        assert_eq!(completed, 3);
        assert_eq!(session.transcript().len(), 2 * completed);
        assert_eq!(
            session.transcript().last().unwrap().content(),
            NOT_UNDERSTOOD
        );
    }

    #[test]
    fn test_concurrent_cycles_resolve_in_completion_order() {
        let mut session = ChatSession::new();
        let first = typed(&mut session, "first").unwrap();
        let second = typed(&mut session, "second").unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(session.in_flight(), 2);

        session.resolve(Completed {
            id: second.id(),
            reply: Reply::Answer("reply to second".to_string()),
        });
        assert_eq!(session.phase(), Phase::Sending);
        session.resolve(Completed {
            id: first.id(),
            reply: Reply::Answer("reply to first".to_string()),
        });

        let contents: Vec<&str> = session
            .transcript()
            .iter()
            .map(|m| m.content())
            .collect();
        assert_eq!(
            contents,
            vec!["first", "second", "reply to second", "reply to first"]
        );
        assert_eq!(session.phase(), Phase::Idle);
    }
}
