use std::time::Duration;

/// Answer from a repeating callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tick {
    Continue,
    Stop,
}

/// Timer facade over `setTimeout`/`setInterval`.
///
/// Callbacks run on the page's single thread; there is no ordering guarantee
/// between callbacks registered by different effects.
pub(crate) trait Scheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce()>);
    fn every(&self, period: Duration, task: Box<dyn FnMut() -> Tick>);

    /// Drops every pending timer. Used when the page unmounts.
    fn cancel_all(&self);
}

pub(crate) fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}
