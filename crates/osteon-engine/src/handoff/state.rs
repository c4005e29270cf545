use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::cache::{CacheBudget, CommandCache};
use crate::error::{PipelineError, PipelineResult};

use super::{FrameToken, Mailbox};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HandoffState {
    Idle,
    Compiling,
    Ready,
    Replaying,
}

#[derive(Debug)]
struct Cell {
    state: HandoffState,
    frame: u64,
}

/// Single-buffered command cache shared by the worker and render threads.
///
/// Compiling frame N+1 never overlaps replaying frame N: the worker can only start
/// compiling from `Idle`, and the render thread returns to `Idle` when its
/// [`ReplayGuard`] drops.
pub struct Handoff {
    cell: Mutex<Cell>,
    changed: Condvar,
    cache: Mutex<CommandCache>,
    mailbox: Mailbox,
    destroyed: AtomicBool,
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Handoff {
    pub fn new() -> Self {
        Self::with_budget(CacheBudget::default())
    }

    pub fn with_budget(budget: CacheBudget) -> Self {
        Self {
            cell: Mutex::new(Cell {
                state: HandoffState::Idle,
                frame: 0,
            }),
            changed: Condvar::new(),
            cache: Mutex::new(CommandCache::with_budget(budget)),
            mailbox: Mailbox::new(),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> HandoffState {
        self.cell.lock().state
    }

    /// Number of frames published so far.
    pub fn frame(&self) -> u64 {
        self.cell.lock().frame
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Worker side: `Idle -> Compiling`. The returned guard holds the cleared cache.
    pub fn begin_compiling(&self) -> PipelineResult<CompileGuard<'_>> {
        if self.is_destroyed() {
            return Err(PipelineError::Destroyed);
        }

        {
            let mut cell = self.cell.lock();
            if cell.state != HandoffState::Idle {
                return Err(PipelineError::ConcurrencyViolation {
                    expected: HandoffState::Idle,
                    found: cell.state,
                });
            }
            cell.state = HandoffState::Compiling;
        }

        let mut cache = self.cache.lock();
        cache.clear();

        Ok(CompileGuard {
            handoff: self,
            cache,
            published: false,
        })
    }

    /// Render side: `Ready -> Replaying` for the frame named by `token`.
    ///
    /// Refused (`None`) in any other state, for a stale token, or after teardown began.
    pub fn try_begin_replay(&self, token: FrameToken) -> Option<ReplayGuard<'_>> {
        if self.is_destroyed() {
            return None;
        }

        {
            let mut cell = self.cell.lock();
            if cell.state != HandoffState::Ready {
                log::trace!("replay refused in state {:?}", cell.state);
                return None;
            }
            if cell.frame != token.frame {
                log::trace!("replay refused: stale token {} (current {})", token.frame, cell.frame);
                return None;
            }
            cell.state = HandoffState::Replaying;
        }

        Some(ReplayGuard {
            handoff: self,
            cache: self.cache.lock(),
        })
    }

    /// Worker side: blocks until `Idle`, teardown or `timeout`. Returns `true` when the
    /// cache is free for the next frame.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cell = self.cell.lock();
        while cell.state != HandoffState::Idle && !self.is_destroyed() {
            if self.changed.wait_until(&mut cell, deadline).timed_out() {
                break;
            }
        }
        cell.state == HandoffState::Idle && !self.is_destroyed()
    }

    /// Starts teardown and wakes every waiter.
    pub fn request_destroy(&self) {
        self.destroyed.store(true, Ordering::Release);
        let _cell = self.cell.lock();
        self.changed.notify_all();
        self.mailbox.drain();
    }

    /// Clears the cache once no replay is in flight. Returns `false` on timeout, in which
    /// case the cache is left alone.
    pub fn clear_when_quiescent(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cell = self.cell.lock();
        while cell.state == HandoffState::Replaying {
            if self.changed.wait_until(&mut cell, deadline).timed_out() {
                log::warn!("handoff: replay still in flight at teardown; cache not cleared");
                return false;
            }
        }
        if cell.state == HandoffState::Compiling {
            log::warn!("handoff: compile still in flight at teardown; cache not cleared");
            return false;
        }

        self.cache.lock().clear();
        cell.state = HandoffState::Idle;
        self.mailbox.drain();
        true
    }

    fn finish(&self, from: HandoffState, to: HandoffState) {
        let mut cell = self.cell.lock();
        if cell.state != from {
            log::error!("handoff: expected {from:?} on transition to {to:?}, found {:?}", cell.state);
        }
        cell.state = to;
        self.changed.notify_all();
    }
}

/// Exclusive access to the cache while compiling.
///
/// Dropping without [`publish`](Self::publish) returns the handoff to `Idle`.
pub struct CompileGuard<'a> {
    handoff: &'a Handoff,
    cache: MutexGuard<'a, CommandCache>,
    published: bool,
}

impl CompileGuard<'_> {
    /// `Compiling -> Ready`; posts the frame token.
    ///
    /// After teardown began the frame is abandoned (`Err(Destroyed)`) and no token is
    /// posted.
    pub fn publish(mut self) -> PipelineResult<FrameToken> {
        if self.handoff.is_destroyed() {
            return Err(PipelineError::Destroyed);
        }

        let token = {
            let mut cell = self.handoff.cell.lock();
            cell.frame += 1;
            cell.state = HandoffState::Ready;
            self.handoff.changed.notify_all();
            FrameToken { frame: cell.frame }
        };
        self.published = true;
        self.handoff.mailbox.post(token);
        Ok(token)
    }
}

impl Deref for CompileGuard<'_> {
    type Target = CommandCache;

    fn deref(&self) -> &CommandCache {
        &self.cache
    }
}

impl DerefMut for CompileGuard<'_> {
    fn deref_mut(&mut self) -> &mut CommandCache {
        &mut self.cache
    }
}

impl Drop for CompileGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            self.handoff.finish(HandoffState::Compiling, HandoffState::Idle);
        }
    }
}

/// Shared access to the published cache while replaying. Drop returns to `Idle`.
pub struct ReplayGuard<'a> {
    handoff: &'a Handoff,
    cache: MutexGuard<'a, CommandCache>,
}

impl Deref for ReplayGuard<'_> {
    type Target = CommandCache;

    fn deref(&self) -> &CommandCache {
        &self.cache
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.handoff.finish(HandoffState::Replaying, HandoffState::Idle);
    }
}
