//! Collaborator boundary: what the pipeline consumes from an animation runtime.
//!
//! The pipeline never evaluates animation itself. It reads skeleton state through
//! [`Skeleton`], resolves attachments through [`AttachmentResolver`] and drives time
//! through [`AnimationEngine`]. `crate::rig` is a small implementation of all three.

mod attachment;
mod engine;
mod event;
mod state;

pub use attachment::{AttachmentKind, AttachmentResolver, QUAD_TRIANGLES};
pub use engine::AnimationEngine;
pub use event::{AnimationEvent, EventKind, EventListener};
pub use state::{BoneState, Skeleton, SlotState};
