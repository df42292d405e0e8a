//! One send cycle: payload snapshot, the single endpoint call, and the reply
//! that goes back into the transcript.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::attachment::Attachment;
use crate::client::ResponseClient;
use crate::error::SendError;
use crate::state::ChatMessage;

/// Shown when the endpoint answered without any usable text.
pub const NOT_UNDERSTOOD: &str = "Sorry, I did not understand your request.";

/// Shown for every transport, status, or decoding failure.
pub const PROCESSING_ERROR: &str = "An error occurred while processing your request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The multipart payload for one cycle. Empty modalities are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    text: Option<String>,
    image: Option<Attachment>,
}

impl Outbound {
    pub fn new(text: &str, image: Option<Attachment>) -> Self {
        Self {
            text: (!text.trim().is_empty()).then(|| text.to_string()),
            image: image.filter(|a| !a.is_empty()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn image(&self) -> Option<&Attachment> {
        self.image.as_ref()
    }
}

/// How a cycle ended.
#[derive(Debug)]
pub enum Reply {
    Answer(String),
    NotUnderstood,
    Failed(SendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Answered,
    NotUnderstood,
    Failed,
}

impl Reply {
    pub fn outcome(&self) -> Outcome {
        match self {
            Reply::Answer(_) => Outcome::Answered,
            Reply::NotUnderstood => Outcome::NotUnderstood,
            Reply::Failed(_) => Outcome::Failed,
        }
    }

    /// The assistant entry appended for this reply.
    pub fn into_message(self) -> ChatMessage {
        match self {
            Reply::Answer(text) => ChatMessage::assistant(text),
            Reply::NotUnderstood => ChatMessage::assistant(NOT_UNDERSTOOD),
            Reply::Failed(_) => ChatMessage::assistant(PROCESSING_ERROR),
        }
    }
}

/// A resolved cycle, ready to be folded back into the session.
#[derive(Debug)]
pub struct Completed {
    pub id: CycleId,
    pub reply: Reply,
}

/// A send that has been validated and recorded but not yet sent.
///
/// Owns its payload, so nothing borrowed from the session is held while the
/// request is in flight.
#[derive(Debug, Clone)]
pub struct SendCycle {
    id: CycleId,
    payload: Outbound,
}

impl SendCycle {
    pub(crate) fn new(id: CycleId, payload: Outbound) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn payload(&self) -> &Outbound {
        &self.payload
    }

    /// Call the endpoint once and classify the result. Never fails.
    pub async fn run(self, client: &ResponseClient) -> Completed {
        let reply = match client.generate(&self.payload).await {
            Ok(Some(text)) if !text.is_empty() => Reply::Answer(text),
            Ok(_) => {
                tracing::info!(cycle = %self.id, "endpoint returned no response text");
                Reply::NotUnderstood
            }
            Err(err) => {
                tracing::warn!(cycle = %self.id, error = %err, "send cycle failed");
                Reply::Failed(err)
            }
        };

        Completed { id: self.id, reply }
    }

    /// Run the cycle on the runtime and hand back a cancellable handle.
    pub fn spawn(self, client: ResponseClient) -> PendingSend {
        let id = self.id;
        let handle = tokio::spawn(async move { self.run(&client).await });
        PendingSend { id, handle }
    }
}

/// An in-flight cycle. Resolves to [`Completed`] even when cancelled, so the
/// caller always gets something to append.
#[derive(Debug)]
pub struct PendingSend {
    id: CycleId,
    handle: JoinHandle<Completed>,
}

impl PendingSend {
    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Future for PendingSend {
    type Output = Completed;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(done)) => Poll::Ready(done),
            Poll::Ready(Err(err)) => {
                let reason = if err.is_cancelled() {
                    SendError::Cancelled
                } else {
                    SendError::Aborted(err.to_string())
                };
                tracing::warn!(cycle = %id, error = %reason, "send task did not finish");
                Poll::Ready(Completed {
                    id,
                    reply: Reply::Failed(reason),
                })
            }
        }
    }
}
