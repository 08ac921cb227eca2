//! Frame scheduler
//!
//! Advances every registered [`Tickable`] once per display frame.
//!
//! The scheduler is a cheap clonable handle. It starts running when the first
//! tickable registers and goes back to idle as soon as nothing is registered,
//! so an idle page issues no frames. Hosts drive it with [`FrameScheduler::frame`]
//! from their display callback (or [`FrameScheduler::tick`] with a synthetic
//! `dt`) and keep requesting frames while [`FrameScheduler::is_running`].

use crate::error::Result;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

new_key_type! {
    /// Identifier of a registered tickable
    pub struct TickableId;
}

/// Result of ticking a tickable for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still moving; tick again next frame
    Active,
    /// Reached rest; settling tickables are unregistered
    Rest,
}

/// Whether a tickable may leave the scheduler on its own
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Removed when it reports [`TickOutcome::Rest`]
    #[default]
    Settling,
    /// Only removed by explicit unregistration (owner unmount)
    Perpetual,
}

/// Anything that consumes an elapsed-time step each frame
pub trait Tickable {
    /// Advance by `dt` seconds
    fn tick(&mut self, dt: f32) -> Result<TickOutcome>;

    fn persistence(&self) -> Persistence {
        Persistence::Settling
    }

    /// Short name used in logs
    fn label(&self) -> &str {
        "tickable"
    }
}

/// Scheduler loop state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Summary of one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Tickables that ticked successfully
    pub ticked: usize,
    /// Settling tickables that reached rest and were removed
    pub settled: usize,
    /// Tickables whose tick returned an error
    pub failed: usize,
}

type SharedTickable = Rc<RefCell<dyn Tickable>>;

/// Callback invoked on the idle → running transition
pub type WakeHandler = Rc<dyn Fn()>;

struct Entry {
    tickable: SharedTickable,
    identity: usize,
}

struct SchedulerInner {
    entries: SlotMap<TickableId, Entry>,
    /// Registration order
    order: Vec<TickableId>,
    by_identity: FxHashMap<usize, TickableId>,
    last_frame: Option<Instant>,
    frame_count: u64,
    in_frame: bool,
    wake: Option<WakeHandler>,
}

impl SchedulerInner {
    fn remove(&mut self, id: TickableId) -> bool {
        match self.entries.remove(id) {
            Some(entry) => {
                self.by_identity.remove(&entry.identity);
                self.order.retain(|other| *other != id);
                true
            }
            None => false,
        }
    }

    /// Return to idle once nothing is registered (outside a frame)
    fn settle_if_empty(&mut self) {
        if self.entries.is_empty() && !self.in_frame {
            self.last_frame = None;
            tracing::trace!("frame scheduler idle");
        }
    }
}

/// The frame scheduler handle
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

/// Non-owning scheduler handle for callbacks
#[derive(Clone)]
pub struct WeakScheduler {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl WeakScheduler {
    pub fn upgrade(&self) -> Option<FrameScheduler> {
        self.inner.upgrade().map(|inner| FrameScheduler { inner })
    }
}

fn identity_of<T: ?Sized>(tickable: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(tickable) as *const () as usize
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                entries: SlotMap::with_key(),
                order: Vec::new(),
                by_identity: FxHashMap::default(),
                last_frame: None,
                frame_count: 0,
                in_frame: false,
                wake: None,
            })),
        }
    }

    /// Set the callback used to ask the host for frames when the loop starts
    pub fn set_wake_handler<F: Fn() + 'static>(&self, handler: F) {
        self.inner.borrow_mut().wake = Some(Rc::new(handler));
    }

    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a tickable
    ///
    /// Registering an already registered tickable returns its existing id.
    /// A tickable registered while a frame is in progress is first ticked
    /// on the next frame.
    pub fn register<T: Tickable + 'static>(&self, tickable: &Rc<RefCell<T>>) -> TickableId {
        let identity = identity_of(tickable);
        let (id, wake) = {
            let mut inner = self.inner.borrow_mut();
            if let Some(id) = inner.by_identity.get(&identity) {
                return *id;
            }

            let was_idle = inner.entries.is_empty();
            let shared: SharedTickable = tickable.clone();
            let id = inner.entries.insert(Entry {
                tickable: shared,
                identity,
            });
            inner.order.push(id);
            inner.by_identity.insert(identity, id);
            tracing::debug!(?id, live = inner.entries.len(), "registered tickable");

            let wake = if was_idle && !inner.in_frame {
                tracing::trace!("frame scheduler running");
                inner.wake.clone()
            } else {
                None
            };
            (id, wake)
        };

        if let Some(wake) = wake {
            wake();
        }
        id
    }

    /// Unregister a tickable. Returns false if it was not registered.
    pub fn unregister<T: ?Sized>(&self, tickable: &Rc<RefCell<T>>) -> bool {
        let identity = identity_of(tickable);
        let id = self.inner.borrow().by_identity.get(&identity).copied();
        match id {
            Some(id) => self.unregister_id(id),
            None => false,
        }
    }

    /// Unregister by id. Returns false if the id is not registered.
    pub fn unregister_id(&self, id: TickableId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.remove(id);
        if removed {
            tracing::debug!(?id, live = inner.entries.len(), "unregistered tickable");
            inner.settle_if_empty();
        }
        removed
    }

    /// Whether a tickable is currently registered
    pub fn is_registered<T: ?Sized>(&self, tickable: &Rc<RefCell<T>>) -> bool {
        self.inner
            .borrow()
            .by_identity
            .contains_key(&identity_of(tickable))
    }

    pub fn is_registered_id(&self, id: TickableId) -> bool {
        self.inner.borrow().entries.contains_key(id)
    }

    pub fn state(&self) -> LoopState {
        if self.inner.borrow().entries.is_empty() {
            LoopState::Idle
        } else {
            LoopState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// Number of registered tickables
    pub fn live_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Number of frames that ticked at least one tickable
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    /// Run one frame at wall-clock time `now`
    ///
    /// `dt` is the time since the previous frame; the first frame after the
    /// scheduler started running uses `dt = 0`.
    pub fn frame(&self, now: Instant) -> FrameReport {
        let dt = {
            let mut inner = self.inner.borrow_mut();
            if inner.entries.is_empty() {
                return FrameReport::default();
            }
            let dt = inner
                .last_frame
                .map(|last| now.saturating_duration_since(last).as_secs_f32())
                .unwrap_or(0.0);
            inner.last_frame = Some(now);
            dt
        };
        self.tick(dt)
    }

    /// Run one frame with an explicit `dt` in seconds
    pub fn tick(&self, dt: f32) -> FrameReport {
        let snapshot: Vec<(TickableId, SharedTickable)> = {
            let mut inner = self.inner.borrow_mut();
            if inner.in_frame {
                tracing::warn!("re-entrant frame ignored");
                return FrameReport::default();
            }
            if inner.entries.is_empty() {
                return FrameReport::default();
            }
            inner.in_frame = true;
            inner.frame_count += 1;
            inner
                .order
                .iter()
                .filter_map(|id| inner.entries.get(*id).map(|e| (*id, e.tickable.clone())))
                .collect()
        };

        let mut report = FrameReport::default();

        for (id, tickable) in snapshot {
            // Unregistered by an earlier tickable this frame
            if !self.is_registered_id(id) {
                continue;
            }

            let (result, persistence, label) = match tickable.try_borrow_mut() {
                Ok(mut t) => {
                    let result = t.tick(dt);
                    (result, t.persistence(), t.label().to_string())
                }
                Err(_) => {
                    tracing::warn!(?id, "tickable busy; skipped for this frame");
                    report.failed += 1;
                    continue;
                }
            };

            match result {
                Ok(TickOutcome::Active) => report.ticked += 1,
                Ok(TickOutcome::Rest) => {
                    report.ticked += 1;
                    if persistence == Persistence::Settling {
                        if self.inner.borrow_mut().remove(id) {
                            tracing::trace!(?id, label = %label, "tickable at rest");
                        }
                        report.settled += 1;
                    }
                }
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        ?id,
                        label = %label,
                        %error,
                        "tick failed; skipped for this frame"
                    );
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.in_frame = false;
        inner.settle_if_empty();
        report
    }

    /// Tick with a fixed `dt` until idle or `max_frames` frames have run
    ///
    /// Returns the number of frames run.
    pub fn run_until_idle(&self, dt: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while self.is_running() && frames < max_frames {
            self.tick(dt);
            frames += 1;
        }
        frames
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state())
            .field("live", &self.live_count())
            .field("frames", &self.frame_count())
            .finish()
    }
}
