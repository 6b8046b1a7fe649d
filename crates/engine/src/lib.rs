pub mod attempt;
pub mod breakdown;
pub mod config;
pub mod credential;
pub mod history;
pub mod intake;
pub mod result;
pub mod state;
pub mod status;

pub use attempt::*;
pub use breakdown::*;
pub use config::*;
pub use credential::CredentialState;
pub use history::{History, HISTORY_LIMIT};
pub use intake::*;
pub use result::GenerationResult;
pub use state::{ControlSnapshot, ControlState, TransitionError};
pub use status::*;
