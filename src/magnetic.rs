use std::rc::Rc;

use crate::animate::{Animator, Ease, Props, Tween};
use crate::config::EffectsConfig;
use crate::host::{Element, EventKind, Host, Pointer, Propagation, Rect, Target};

pub(crate) const MAGNETIC_SELECTOR: &str = ".magnetic";
const PULL_SECONDS: f64 = 0.3;
const RELEASE_SECONDS: f64 = 0.5;

/// Translation toward the pointer: a damped fraction of its offset from the
/// element's center.
pub(crate) fn pull(rect: Rect, pointer: Pointer, strength: f64) -> (f64, f64) {
    let (center_x, center_y) = rect.center();
    ((pointer.x - center_x) * strength, (pointer.y - center_y) * strength)
}

/// Returns the number of elements wired up.
pub(crate) fn install<H: Host>(
    host: &H,
    animator: Rc<dyn Animator<H::Node>>,
    config: &EffectsConfig,
) -> usize {
    let strength = config.magnetic_strength;
    let elements = host.select_all(MAGNETIC_SELECTOR);

    for element in &elements {
        let target = element.clone();
        let pulling = animator.clone();
        host.listen(
            Target::Node(element.clone()),
            EventKind::PointerMove,
            Box::new(move |pointer| {
                let (x, y) = pull(target.rect(), pointer, strength);
                pulling.tween(
                    std::slice::from_ref(&target),
                    Tween::to(Props::at(x, y), PULL_SECONDS).ease(Ease::Power2Out),
                );
                Propagation::Continue
            }),
        );

        let target = element.clone();
        let releasing = animator.clone();
        host.listen(
            Target::Node(element.clone()),
            EventKind::PointerLeave,
            Box::new(move |_| {
                releasing.tween(
                    std::slice::from_ref(&target),
                    Tween::to(Props::at(0.0, 0.0), RELEASE_SECONDS).ease(Ease::ElasticOut),
                );
                Propagation::Continue
            }),
        );
    }

    elements.len()
}
