//! Entrance choreography played once the preloader clears.

use serde_json::json;

use crate::animate::{layout, Animator, Ease, Props, TimelineEntry, Tween};
use crate::host::Host;
use crate::logging::{log_event, LogLevel};

struct HeroStep {
    selector: &'static str,
    tween: Tween,
    /// Seconds relative to the end of the timeline so far.
    offset: f64,
}

fn steps() -> Vec<HeroStep> {
    vec![
        HeroStep {
            selector: ".hero-badge",
            tween: Tween::from(Props::faded().y(-30.0), 0.6).ease(Ease::Power3Out),
            offset: 0.0,
        },
        HeroStep {
            selector: ".hero-title > span",
            tween: Tween::from(Props::faded().y(50.0), 0.8).stagger(0.1).ease(Ease::Power4Out),
            offset: -0.3,
        },
        HeroStep {
            selector: ".hero-description",
            tween: Tween::from(Props::faded().y(30.0), 0.6).ease(Ease::Power3Out),
            offset: -0.4,
        },
        HeroStep {
            selector: ".hero-actions .btn",
            tween: Tween::from(Props::faded().y(30.0), 0.6).stagger(0.15).ease(Ease::Power3Out),
            offset: -0.3,
        },
        HeroStep {
            selector: ".stat-item",
            tween: Tween::from(Props::faded().y(30.0), 0.6).stagger(0.1).ease(Ease::Power3Out),
            offset: -0.3,
        },
        HeroStep {
            selector: ".code-window",
            tween: Tween::from(Props::faded().x(100.0), 1.0).ease(Ease::Power4Out),
            offset: -0.6,
        },
        HeroStep {
            selector: ".floating-card",
            tween: Tween::from(Props::faded().scale(0.5), 0.6)
                .stagger(0.2)
                .ease(Ease::BackOut(1.7)),
            offset: -0.5,
        },
        HeroStep {
            selector: ".scroll-indicator",
            tween: Tween::from(Props::faded().y(20.0), 0.6).ease(Ease::Power3Out),
            offset: -0.3,
        },
    ]
}

/// Builds the timeline from whatever hero markup exists and hands it to the
/// animator. Steps whose selector matches nothing are dropped.
pub(crate) fn play<H: Host>(host: &H, animator: &dyn Animator<H::Node>) -> usize {
    let resolved: Vec<(Vec<H::Node>, Tween, f64)> = steps()
        .into_iter()
        .filter_map(|step| {
            let targets = host.select_all(step.selector);
            (!targets.is_empty()).then_some((targets, step.tween, step.offset))
        })
        .collect();

    let spans: Vec<(f64, f64)> = resolved
        .iter()
        .map(|(targets, tween, offset)| (tween.span(targets.len()), *offset))
        .collect();

    let entries: Vec<TimelineEntry<H::Node>> = resolved
        .into_iter()
        .zip(layout(&spans))
        .map(|((targets, tween, _), at)| TimelineEntry { targets, tween, at })
        .collect();

    let count = entries.len();
    log_event(LogLevel::Debug, "hero_timeline", json!({ "steps": count }));
    animator.timeline(entries);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakeHost, RecordingAnimator};

    fn populate(host: &FakeHost, selector: &str, count: usize) {
        for _ in 0..count {
            host.with_selector(selector, FakeElement::new());
        }
    }

    #[test]
    fn full_hero_plays_in_order_with_overlaps() {
        let host = FakeHost::new();
        populate(&host, ".hero-badge", 1);
        populate(&host, ".hero-title > span", 3);
        populate(&host, ".hero-description", 1);
        populate(&host, ".hero-actions .btn", 2);
        populate(&host, ".stat-item", 3);
        populate(&host, ".code-window", 1);
        populate(&host, ".floating-card", 3);
        populate(&host, ".scroll-indicator", 1);
        let animator = RecordingAnimator::new();

        assert_eq!(play(&host, animator.as_ref()), 8);

        let timelines = animator.timelines.borrow();
        let starts: Vec<f64> = timelines[0].iter().map(|entry| entry.at).collect();
        let expected = [0.0, 0.3, 0.9, 1.2, 1.65, 1.85, 2.35, 3.05];
        for (start, expected) in starts.iter().zip(expected) {
            assert!((start - expected).abs() < 1e-9, "{start} != {expected}");
        }
        assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(timelines[0][6].tween.ease, Ease::BackOut(1.7));
    }

    #[test]
    fn missing_steps_are_skipped() {
        let host = FakeHost::new();
        populate(&host, ".hero-badge", 1);
        populate(&host, ".scroll-indicator", 1);
        let animator = RecordingAnimator::new();

        assert_eq!(play(&host, animator.as_ref()), 2);
        let timelines = animator.timelines.borrow();
        assert!((timelines[0][1].at - 0.3).abs() < 1e-9);
    }
}
