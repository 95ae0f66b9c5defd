//! Tween descriptions and the two animation backends.

use crate::host::Element;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum Ease {
    #[default]
    Linear,
    Power2Out,
    Power3Out,
    Power4Out,
    /// Overshoot past the end value, then settle.
    BackOut(f64),
    ElasticOut,
}

impl Ease {
    pub(crate) fn as_gsap(self) -> String {
        match self {
            Self::Linear => "none".to_string(),
            Self::Power2Out => "power2.out".to_string(),
            Self::Power3Out => "power3.out".to_string(),
            Self::Power4Out => "power4.out".to_string(),
            Self::BackOut(overshoot) => format!("back.out({overshoot})"),
            Self::ElasticOut => "elastic.out(1, 0.3)".to_string(),
        }
    }
}

/// Animatable presentation properties; `None` leaves a property untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Props {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub opacity: Option<f64>,
    pub scale: Option<f64>,
}

impl Props {
    pub(crate) fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub(crate) fn faded() -> Self {
        Self {
            opacity: Some(0.0),
            ..Self::default()
        }
    }

    pub(crate) fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub(crate) fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    pub(crate) fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub(crate) fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    fn transform(&self) -> Option<String> {
        if self.x.is_none() && self.y.is_none() && self.scale.is_none() {
            return None;
        }

        let x = self.x.unwrap_or(0.0);
        let y = self.y.unwrap_or(0.0);
        let mut transform = format!("translate({x}px, {y}px)");
        if let Some(scale) = self.scale {
            transform.push_str(&format!(" scale({scale})"));
        }
        Some(transform)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Motion {
    /// Animate from the current state to these values.
    To(Props),
    /// Animate from these values back to the element's natural state.
    From(Props),
    FromTo(Props, Props),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tween {
    pub motion: Motion,
    /// Seconds.
    pub duration: f64,
    pub ease: Ease,
    /// Seconds between the start of consecutive targets.
    pub stagger: f64,
}

impl Tween {
    pub(crate) fn to(props: Props, duration: f64) -> Self {
        Self::new(Motion::To(props), duration)
    }

    pub(crate) fn from(props: Props, duration: f64) -> Self {
        Self::new(Motion::From(props), duration)
    }

    pub(crate) fn from_to(from: Props, to: Props, duration: f64) -> Self {
        Self::new(Motion::FromTo(from, to), duration)
    }

    fn new(motion: Motion, duration: f64) -> Self {
        Self {
            motion,
            duration,
            ease: Ease::default(),
            stagger: 0.0,
        }
    }

    pub(crate) fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub(crate) fn stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    /// Wall time the tween occupies when applied to `count` targets.
    pub(crate) fn span(&self, count: usize) -> f64 {
        self.duration + self.stagger * count.saturating_sub(1) as f64
    }

    /// Values left on the element once the tween completes, when they differ
    /// from its natural state.
    pub(crate) fn end_state(&self) -> Option<Props> {
        match &self.motion {
            Motion::To(props) | Motion::FromTo(_, props) => Some(*props),
            Motion::From(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TimelineEntry<N> {
    pub targets: Vec<N>,
    pub tween: Tween,
    /// Absolute start, seconds from the beginning of the timeline.
    pub at: f64,
}

/// Resolves relative positions into absolute start times.
///
/// Each offset is measured from the current end of the timeline, so a
/// negative offset overlaps the previous steps. The first step starts at 0.
pub(crate) fn layout(steps: &[(f64, f64)]) -> Vec<f64> {
    let mut end: f64 = 0.0;
    steps
        .iter()
        .enumerate()
        .map(|(index, (span, offset))| {
            let start = if index == 0 { 0.0 } else { (end + offset).max(0.0) };
            end = end.max(start + span);
            start
        })
        .collect()
}

pub(crate) trait Animator<N: Element> {
    fn tween(&self, targets: &[N], tween: Tween);
    fn timeline(&self, entries: Vec<TimelineEntry<N>>);
}

/// Backend used when no animation engine is loaded: end states land at once.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InstantAnimator;

impl InstantAnimator {
    fn apply<N: Element>(target: &N, props: &Props) {
        if let Some(opacity) = props.opacity {
            target.set_style("opacity", &opacity.to_string());
        }
        if let Some(transform) = props.transform() {
            target.set_style("transform", &transform);
        }
    }
}

impl<N: Element> Animator<N> for InstantAnimator {
    fn tween(&self, targets: &[N], tween: Tween) {
        if let Some(props) = tween.end_state() {
            for target in targets {
                Self::apply(target, &props);
            }
        }
    }

    fn timeline(&self, entries: Vec<TimelineEntry<N>>) {
        for entry in entries {
            self.tween(&entry.targets, entry.tween);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeElement;

    #[test]
    fn layout_overlaps_from_timeline_end() {
        let starts = layout(&[(0.6, 0.0), (1.0, -0.3), (0.6, -0.4)]);

        assert_eq!(starts.len(), 3);
        assert!((starts[0] - 0.0).abs() < 1e-9);
        assert!((starts[1] - 0.3).abs() < 1e-9);
        assert!((starts[2] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn layout_never_starts_before_zero() {
        let starts = layout(&[(0.1, 0.0), (0.5, -2.0)]);
        assert_eq!(starts, vec![0.0, 0.0]);
    }

    #[test]
    fn span_accounts_for_stagger() {
        let tween = Tween::from(Props::faded(), 0.6).stagger(0.15);
        assert!((tween.span(3) - 0.9).abs() < 1e-9);
        assert!((tween.span(0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn instant_backend_writes_end_state() {
        let card = FakeElement::new();
        InstantAnimator.tween(
            &[card.clone()],
            Tween::to(Props::default().opacity(0.3).scale(0.95), 0.3),
        );

        assert_eq!(card.style("opacity").as_deref(), Some("0.3"));
        assert_eq!(card.style("transform").as_deref(), Some("translate(0px, 0px) scale(0.95)"));
    }

    #[test]
    fn instant_backend_leaves_from_tweens_at_natural_state() {
        let badge = FakeElement::new();
        InstantAnimator.timeline(vec![TimelineEntry {
            targets: vec![badge.clone()],
            tween: Tween::from(Props::faded().y(-30.0), 0.6),
            at: 0.0,
        }]);

        assert_eq!(badge.style("opacity"), None);
        assert_eq!(badge.style("transform"), None);
    }

    #[test]
    fn gsap_ease_names() {
        assert_eq!(Ease::BackOut(1.7).as_gsap(), "back.out(1.7)");
        assert_eq!(Ease::Power4Out.as_gsap(), "power4.out");
    }
}
