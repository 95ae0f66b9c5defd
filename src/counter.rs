use std::rc::Rc;

use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::host::{Element, Host};
use crate::scheduler::{millis, Scheduler, Tick};
use crate::visibility::VisibilityTrigger;

pub(crate) const STAT_SELECTOR: &str = ".stat-item";
const NUMBER_SELECTOR: &str = ".stat-number";

pub(crate) const COUNTER_TRIGGER: VisibilityTrigger = VisibilityTrigger::new(0.5, "0px");

/// Counts from 0 to `target` in a fixed number of equal steps.
///
/// Integer interpolation keeps the sequence non-decreasing and lands on the
/// target exactly on the last step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CounterAnimation {
    target: u64,
    step: u32,
    steps: u32,
}

impl CounterAnimation {
    pub(crate) fn new(target: u64, steps: u32) -> Self {
        Self {
            target,
            step: 0,
            steps: steps.max(1),
        }
    }

    pub(crate) fn next_value(&mut self) -> Option<u64> {
        if self.is_done() {
            return None;
        }
        self.step += 1;
        let value = u128::from(self.target) * u128::from(self.step) / u128::from(self.steps);
        Some(value as u64)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.step >= self.steps
    }
}

pub(crate) fn counter_label(value: u64) -> String {
    format!("{value}+")
}

/// Reads the leading digit run, so `"120+"` counts to 120.
fn parse_target(raw: Option<String>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse::<u64>().unwrap_or(0)
}

pub(crate) fn install<H: Host>(
    host: &H,
    scheduler: Rc<dyn Scheduler>,
    config: &EffectsConfig,
) -> Result<usize, EffectError> {
    let period = millis(config.counter_step_ms());
    let steps = config.counter_steps;

    COUNTER_TRIGGER.arm(host, host.select_all(STAT_SELECTOR), move |item: &H::Node| {
        let Some(number) = item.find(NUMBER_SELECTOR) else {
            return;
        };
        let mut animation = CounterAnimation::new(parse_target(item.data("count")), steps);

        scheduler.every(
            period,
            Box::new(move || match animation.next_value() {
                Some(value) => {
                    number.set_text(&counter_label(value));
                    if animation.is_done() {
                        Tick::Stop
                    } else {
                        Tick::Continue
                    }
                }
                None => Tick::Stop,
            }),
        );
    })
}
