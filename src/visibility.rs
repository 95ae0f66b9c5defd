use crate::error::EffectError;
use crate::host::{Host, Observation, Visibility, VisibilityOptions};

// Browsers report the crossing ratio with float noise around the threshold.
const RATIO_TOLERANCE: f64 = 1e-3;

/// Fires a callback the first time each element becomes sufficiently visible,
/// then stops watching it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VisibilityTrigger {
    options: VisibilityOptions,
}

impl VisibilityTrigger {
    pub(crate) const fn new(threshold: f64, root_margin: &'static str) -> Self {
        Self {
            options: VisibilityOptions {
                threshold,
                root_margin,
            },
        }
    }

    /// Returns how many elements are now being watched.
    pub(crate) fn arm<H, F>(
        &self,
        host: &H,
        nodes: Vec<H::Node>,
        mut on_visible: F,
    ) -> Result<usize, EffectError>
    where
        H: Host,
        F: FnMut(&H::Node) + 'static,
    {
        if nodes.is_empty() {
            return Ok(0);
        }

        let watched = nodes.len();
        let threshold = self.options.threshold;
        let mut fired: Vec<H::Node> = Vec::new();

        host.observe_visibility(
            nodes,
            self.options.clone(),
            Box::new(move |node, visibility| {
                if fired.contains(node) {
                    return Observation::Release;
                }
                if !crosses(visibility, threshold) {
                    return Observation::Keep;
                }
                fired.push(node.clone());
                on_visible(node);
                Observation::Release
            }),
        )?;

        Ok(watched)
    }
}

fn crosses(visibility: Visibility, threshold: f64) -> bool {
    visibility.intersecting && visibility.ratio + RATIO_TOLERANCE >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakeHost};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn callback_fires_once_per_element() {
        let host = FakeHost::new();
        let first = FakeElement::new();
        let second = FakeElement::new();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();

        let watched = VisibilityTrigger::new(0.5, "0px")
            .arm(&host, vec![first.clone(), second.clone()], move |_| {
                counter.set(counter.get() + 1)
            })
            .expect("observer installs");
        assert_eq!(watched, 2);

        host.show(&first, 0.6);
        host.show(&first, 0.0);
        host.show(&first, 0.9);
        assert_eq!(fired.get(), 1);
        assert!(!host.is_observed(&first));
        assert!(host.is_observed(&second));

        host.show(&second, 1.0);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn below_threshold_keeps_watching() {
        let host = FakeHost::new();
        let stat = FakeElement::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();

        VisibilityTrigger::new(0.5, "0px")
            .arm(&host, vec![stat.clone()], move |_| flag.set(true))
            .expect("observer installs");

        host.show(&stat, 0.2);
        assert!(!fired.get());
        assert!(host.is_observed(&stat));

        host.show(&stat, 0.4995);
        assert!(fired.get());
    }

    #[test]
    fn empty_node_list_skips_observer() {
        let host = FakeHost::new();
        let armed = VisibilityTrigger::new(0.1, "0px").arm(&host, Vec::new(), |_: &FakeElement| {});

        assert_eq!(armed, Ok(0));
        assert!(host.observer_options().is_empty());
    }

    #[test]
    fn unsupported_observer_surfaces_host_error() {
        let host = FakeHost::new();
        host.refuse_observers();

        let armed = VisibilityTrigger::new(0.1, "0px").arm(&host, vec![FakeElement::new()], |_| {});
        assert!(matches!(armed, Err(EffectError::Host(_))));
    }
}
