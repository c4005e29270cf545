//! Pipeline error taxonomy.
//!
//! None of these escape `compute_frame`: per-slot failures are absorbed by the compiler
//! (the slot is skipped for that frame and logged), handoff violations are refused by the
//! state machine. The enum exists so those decisions are typed and loggable, and so
//! player controls can report `ResourceNotReady` to callers that care.

use crate::handoff::HandoffState;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// Skeleton / animation state is not loaded yet.
    #[error("skeleton resources are not ready")]
    ResourceNotReady,

    /// The logical texture has no registered pixels (or was never registered).
    #[error("texture `{path}` could not be resolved")]
    TextureUnresolved { path: String },

    /// The attachment produced unusable geometry (e.g. exceeds the u16 index space).
    #[error("attachment on slot {slot} could not be resolved: {reason}")]
    AttachmentUnresolved { slot: usize, reason: &'static str },

    /// Clipping removed every triangle. Not an error for the frame; the slot is skipped.
    #[error("clipping produced no geometry for slot {slot}")]
    DegenerateGeometry { slot: usize },

    /// A handoff transition was requested from the wrong state.
    #[error("handoff expected state {expected:?}, found {found:?}")]
    ConcurrencyViolation {
        expected: HandoffState,
        found: HandoffState,
    },

    /// Teardown began; the cache must not be touched any more.
    #[error("pipeline is being torn down")]
    Destroyed,
}

pub type PipelineResult<T> = Result<T, PipelineError>;
