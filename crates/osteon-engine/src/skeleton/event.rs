/// Track lifecycle notifications emitted by an [`AnimationEngine`](super::AnimationEngine).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Start,
    Interrupt,
    End,
    Complete,
    Dispose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEvent {
    pub kind: EventKind,
    pub track: usize,
    pub animation: String,
}

/// Callback receiving animation events on the worker thread.
pub type EventListener = Box<dyn FnMut(&AnimationEvent) + Send>;
