//! Application layer: session state, animation sequencing and input parsing

pub mod error;
pub mod input;
pub mod pacing;
pub mod sequencer;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use input::{parse_key, parse_keys, ParsedKeys};
pub use pacing::{NoPacer, Pacer, ThreadPacer};
pub use sequencer::{
    Admission, AnimationEvent, Frame, HighlightClass, Notice, RunKind, RunOutcome, RunReport,
    Sequencer,
};
pub use session::{InsertSummary, RunStats, Session};
