use std::rc::Rc;

use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::host::{Element, Host};
use crate::scheduler::{millis, Scheduler};
use crate::visibility::VisibilityTrigger;

pub(crate) const SKILL_CARD_SELECTOR: &str = ".skill-card";
const FILL_SELECTOR: &str = ".progress-fill";

pub(crate) const SKILL_TRIGGER: VisibilityTrigger = VisibilityTrigger::new(0.3, "0px");

fn target_width(raw: Option<String>) -> Option<f64> {
    raw.and_then(|value| value.trim().trim_end_matches('%').parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 100.0))
}

pub(crate) fn install<H: Host>(
    host: &H,
    scheduler: Rc<dyn Scheduler>,
    config: &EffectsConfig,
) -> Result<usize, EffectError> {
    let delay = millis(config.skill_bar_delay_ms);

    SKILL_TRIGGER.arm(host, host.select_all(SKILL_CARD_SELECTOR), move |card: &H::Node| {
        let Some(fill) = card.find(FILL_SELECTOR) else {
            return;
        };
        let Some(width) = target_width(fill.data("width")) else {
            return;
        };
        scheduler.after(
            delay,
            Box::new(move || fill.set_style("width", &format!("{width}%"))),
        );
    })
}
