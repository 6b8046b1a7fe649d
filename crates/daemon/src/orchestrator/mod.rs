pub mod classify;
pub mod events;
pub mod pipeline;

pub use classify::{classify, Verdict, NOT_FOUND_MESSAGE};
pub use events::SnapshotFeed;
pub use pipeline::{GenerateOutcome, Orchestrator};
