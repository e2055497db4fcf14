//! Collaborator traits the sampler is driven through.
//!
//! The pin level itself is read through [`embedded_hal::digital::InputPin`];
//! the clock and the interrupt binding are small traits of their own so the
//! core stays independent of any particular HAL or executor.

use crate::strategy::Edge;

/// Generation tag handed out by each start.
///
/// The edge handler passes back the tag it was bound with so that an edge
/// queued under a previous session is recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Session(pub u32);

impl Session {
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Monotonic microsecond counter. Wraps at `u32::MAX`.
pub trait MicrosClock {
    /// Current time in microseconds.
    fn now_micros(&self) -> u32;
}

/// Registration of the sampling routine as the pin's edge handler.
///
/// # Interrupt Safety
///
/// `unbind` is called from inside the edge handler when a capture
/// completes, so implementations must not block.
pub trait EdgeInterrupt {
    /// Start delivering `edge` transitions tagged with `session`.
    fn bind(&mut self, edge: Edge, session: Session);

    /// Stop delivering edges. Must be idempotent.
    fn unbind(&mut self);
}

impl<T: MicrosClock + ?Sized> MicrosClock for &T {
    fn now_micros(&self) -> u32 {
        (**self).now_micros()
    }
}

impl<T: EdgeInterrupt + ?Sized> EdgeInterrupt for &mut T {
    fn bind(&mut self, edge: Edge, session: Session) {
        (**self).bind(edge, session);
    }

    fn unbind(&mut self) {
        (**self).unbind();
    }
}
