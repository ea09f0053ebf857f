use crate::dom::Dom;
use std::cell::Cell;
use std::rc::Rc;

/// How raw scroll events are thinned out before a state tick runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimit {
    /// At most one tick per animation frame.
    AnimationFrame,
    /// One trailing tick once events pause for this many milliseconds.
    Debounce(i32),
}

/// Rate limiter sitting between a scroll listener and the state machine.
pub struct ScrollGate<D: Dom> {
    dom: D,
    policy: RateLimit,
    frame_pending: Rc<Cell<bool>>,
    timer: Rc<Cell<Option<D::Timer>>>,
    cancelled: Rc<Cell<bool>>,
}

impl<D: Dom> Clone for ScrollGate<D> {
    fn clone(&self) -> Self {
        Self {
            dom: self.dom.clone(),
            policy: self.policy,
            frame_pending: self.frame_pending.clone(),
            timer: self.timer.clone(),
            cancelled: self.cancelled.clone(),
        }
    }
}

impl<D: Dom> ScrollGate<D> {
    pub fn new(dom: D, policy: RateLimit) -> Self {
        Self {
            dom,
            policy,
            frame_pending: Rc::new(Cell::new(false)),
            timer: Rc::new(Cell::new(None)),
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn policy(&self) -> RateLimit {
        self.policy
    }

    /// Note one scroll event; `tick` runs once the policy lets it through.
    pub fn trigger(&self, tick: Rc<dyn Fn()>) {
        if self.cancelled.get() {
            return;
        }
        match self.policy {
            RateLimit::AnimationFrame => {
                if self.frame_pending.replace(true) {
                    return;
                }
                let pending = self.frame_pending.clone();
                let cancelled = self.cancelled.clone();
                self.dom.request_frame(Box::new(move || {
                    pending.set(false);
                    if !cancelled.get() {
                        tick();
                    }
                }));
            }
            RateLimit::Debounce(ms) => {
                if let Some(t) = self.timer.take() {
                    self.dom.clear_timeout(t);
                }
                let slot = self.timer.clone();
                let cancelled = self.cancelled.clone();
                let run = tick.clone();
                let id = self.dom.set_timeout(
                    ms,
                    Box::new(move || {
                        slot.set(None);
                        if !cancelled.get() {
                            run();
                        }
                    }),
                );
                match id {
                    Some(id) => self.timer.set(Some(id)),
                    // No timer primitive: run now rather than never.
                    None => tick(),
                }
            }
        }
    }

    /// Drop any queued tick and ignore later triggers.
    pub fn cancel(&self) {
        self.cancelled.set(true);
        if let Some(t) = self.timer.take() {
            self.dom.clear_timeout(t);
        }
    }
}
