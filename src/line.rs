//! # Lines
//!
//! A [`Line`] is a simulated wire. It holds the current level and an ordered list of subscribed
//! inputs. Setting a different level stores it first and then calls every subscriber, in
//! registration order, before `set_level` returns. A subscriber may itself set other lines, so one
//! change propagates depth-first through the whole reachable network within a single call chain.
//!
//! Setting the level a line already has is a no-op. That is what lets combinational feedback
//! settle: once every line in a loop reaches its fixed point, nothing changes and the recursion
//! unwinds. A loop that never settles (an oscillator built from gates) recurses without bound.
//! Zero-delay simulation has no way to bound it without inventing timing, so detecting such loops
//! is left to whoever wires the board.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::connection::{Input, InputHandle, Slot};
use crate::error::WiringError;
use crate::signal::Signal;

struct Subscriber {
    handle: InputHandle,
    slot: Slot,
}

struct LineInner {
    name: String,
    level: Cell<Signal>,
    // bumped on every actual change
    generation: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber>>,
}

/// Shared handle to a simulated wire. Clones refer to the same wire.
#[derive(Clone)]
pub struct Line {
    inner: Rc<LineInner>,
}

/// Non-owning reference to a [`Line`], held by element callbacks so wiring cycles do not leak.
#[derive(Clone)]
pub struct WeakLine {
    inner: Weak<LineInner>,
}

impl Line {
    pub fn new(name: impl Into<String>) -> Self {
        Line {
            inner: Rc::new(LineInner {
                name: name.into(),
                level: Cell::new(Signal::Low),
                generation: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn level(&self) -> Signal {
        self.inner.level.get()
    }

    /// Drive the line to `level`, notifying subscribers only on an actual change.
    pub fn set_level(&self, level: Signal) {
        if self.inner.level.get() == level {
            return;
        }
        self.inner.level.set(level);
        let generation = self.inner.generation.get().wrapping_add(1);
        self.inner.generation.set(generation);
        trace!(line = %self.inner.name, %level, "level changed");

        // Subscribers may subscribe further inputs while we iterate, so walk a snapshot.
        let slots: Vec<Slot> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| s.slot.clone())
            .collect();

        for slot in slots {
            if self.inner.generation.get() != generation {
                // superseded by a nested change that already reached every subscriber,
                // even if it came back to the same level
                break;
            }
            slot(level);
        }
    }

    /// Append `input` to the subscriber list.
    ///
    /// This only fans the line out to the input; use
    /// [`WiringRegistry::connect`](crate::connection::WiringRegistry::connect) so the audit knows
    /// about it.
    pub fn subscribe(&self, input: &Input) -> Result<(), WiringError> {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        if subscribers.iter().any(|s| s.handle == *input.handle()) {
            return Err(WiringError::DuplicateSubscription {
                line: self.inner.name.clone(),
                handle: input.handle().clone(),
            });
        }
        subscribers.push(Subscriber {
            handle: input.handle().clone(),
            slot: input.slot(),
        });
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Subscribed input handles in fan-out order.
    pub fn subscribers(&self) -> Vec<InputHandle> {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| s.handle.clone())
            .collect()
    }

    pub fn is_subscribed(&self, handle: &InputHandle) -> bool {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .any(|s| s.handle == *handle)
    }

    pub fn downgrade(&self) -> WeakLine {
        WeakLine {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Line) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl WeakLine {
    pub fn upgrade(&self) -> Option<Line> {
        self.inner.upgrade().map(|inner| Line { inner })
    }

    /// Set the level if the line is still alive.
    pub fn set_level(&self, level: Signal) {
        if let Some(line) = self.upgrade() {
            line.set_level(level);
        }
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line")
            .field("name", &self.inner.name)
            .field("level", &self.inner.level.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.inner.name, self.inner.level.get())?;

        let subscribers = self.inner.subscribers.borrow();
        if !subscribers.is_empty() {
            write!(f, " -> [")?;
            for (i, s) in subscribers.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", s.handle)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
