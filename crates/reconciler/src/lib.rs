pub mod conversation;
pub mod dispatch;
pub mod reconciler;
pub mod types;

pub use conversation::Conversation;
pub use dispatch::{IdGenerator, UuidIdGen, dispatch};
pub use reconciler::Reconciler;
pub use types::{Enrichment, FinalEvent, InterimEvent, ReconcilerEvent, Utterance};
