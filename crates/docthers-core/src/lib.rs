pub mod attachment;
pub mod client;
pub mod composer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod render;
pub mod session;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use attachment::Attachment;
pub use client::ResponseClient;
pub use composer::Composer;
pub use config::{Config, Endpoint};
pub use coordinator::{
    Completed, CycleId, Outbound, Outcome, PendingSend, Reply, SendCycle, NOT_UNDERSTOOD,
    PROCESSING_ERROR,
};
pub use error::{AttachmentError, SendError};
pub use render::{project, project_composer, AttachmentAffordance, ComposerView, MessageBlock};
pub use session::{ChatSession, Phase, WidgetEvent};
pub use state::{ChatMessage, ChatRole};
pub use transcript::Transcript;
