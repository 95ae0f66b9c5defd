use crate::error::EffectError;
use crate::host::{Element, Host};
use crate::visibility::VisibilityTrigger;

pub(crate) const REVEAL_SELECTOR: &str = ".reveal-up, .reveal-left, .reveal-right";
const REVEALED_CLASS: &str = "revealed";

pub(crate) const REVEAL_TRIGGER: VisibilityTrigger =
    VisibilityTrigger::new(0.1, "0px 0px -50px 0px");

/// Flags each reveal block once it scrolls into view; CSS owns the transition.
pub(crate) fn install<H: Host>(host: &H) -> Result<usize, EffectError> {
    REVEAL_TRIGGER.arm(host, host.select_all(REVEAL_SELECTOR), |node: &H::Node| {
        node.add_class(REVEALED_CLASS);
    })
}
