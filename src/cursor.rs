use std::rc::Rc;

use serde_json::json;

use crate::animate::{Animator, Props, Tween};
use crate::error::EffectError;
use crate::host::{Element, EventKind, Host, Pointer, Propagation, Target};
use crate::logging::{log_event, LogLevel};

pub(crate) const CURSOR_ID: &str = "cursor";
const DOT_SELECTOR: &str = ".cursor-dot";
const OUTLINE_SELECTOR: &str = ".cursor-outline";
pub(crate) const INTERACTIVE_SELECTOR: &str = "a, button, .project-card, .skill-card, .magnetic";
const HOVER_CLASS: &str = "hover";
const CLICK_CLASS: &str = "click";
const DOT_SECONDS: f64 = 0.1;
const OUTLINE_SECONDS: f64 = 0.3;

/// Decorative pointer overlay: a fast dot and a trailing outline.
pub(crate) struct CursorFollower<N: Element> {
    root: N,
    dot: Option<N>,
    outline: Option<N>,
    animator: Rc<dyn Animator<N>>,
}

impl<N: Element> CursorFollower<N> {
    pub(crate) fn follow(&self, pointer: Pointer) {
        let target = Props::at(pointer.x, pointer.y);
        if let Some(dot) = &self.dot {
            self.animator.tween(std::slice::from_ref(dot), Tween::to(target, DOT_SECONDS));
        }
        if let Some(outline) = &self.outline {
            self.animator.tween(std::slice::from_ref(outline), Tween::to(target, OUTLINE_SECONDS));
        }
    }

    pub(crate) fn set_hover(&self, hovering: bool) {
        self.root.toggle_class(HOVER_CLASS, hovering);
    }

    pub(crate) fn set_pressed(&self, pressed: bool) {
        self.root.toggle_class(CLICK_CLASS, pressed);
    }
}

/// Returns `Ok(None)` on devices without hover, where the overlay stays inert.
pub(crate) fn install<H: Host>(
    host: &H,
    animator: Rc<dyn Animator<H::Node>>,
) -> Result<Option<Rc<CursorFollower<H::Node>>>, EffectError> {
    let root = host.by_id(CURSOR_ID).ok_or_else(|| EffectError::missing(CURSOR_ID))?;
    if !host.hover_capable() {
        log_event(LogLevel::Debug, "cursor_skipped", json!({ "reason": "no-hover" }));
        return Ok(None);
    }

    let follower = Rc::new(CursorFollower {
        dot: root.find(DOT_SELECTOR),
        outline: root.find(OUTLINE_SELECTOR),
        root,
        animator,
    });

    let moving = follower.clone();
    host.listen(
        Target::Document,
        EventKind::PointerMove,
        Box::new(move |pointer| {
            moving.follow(pointer);
            Propagation::Continue
        }),
    );

    for element in host.select_all(INTERACTIVE_SELECTOR) {
        let entering = follower.clone();
        host.listen(
            Target::Node(element.clone()),
            EventKind::PointerEnter,
            Box::new(move |_| {
                entering.set_hover(true);
                Propagation::Continue
            }),
        );
        let leaving = follower.clone();
        host.listen(
            Target::Node(element),
            EventKind::PointerLeave,
            Box::new(move |_| {
                leaving.set_hover(false);
                Propagation::Continue
            }),
        );
    }

    let pressing = follower.clone();
    host.listen(
        Target::Document,
        EventKind::PointerDown,
        Box::new(move |_| {
            pressing.set_pressed(true);
            Propagation::Continue
        }),
    );
    let releasing = follower.clone();
    host.listen(
        Target::Document,
        EventKind::PointerUp,
        Box::new(move |_| {
            releasing.set_pressed(false);
            Propagation::Continue
        }),
    );

    Ok(Some(follower))
}
