//! Capability surface the effects layer needs from the page.
//!
//! The browser build implements these over `web_sys`; tests implement them
//! in memory so every effect runs natively.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub(crate) fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Viewport coordinates of the pointer for pointer events, zero otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pointer {
    pub x: f64,
    pub y: f64,
}

pub(crate) trait Element: Clone + PartialEq + 'static {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<String>;
    fn remove_attribute(&self, name: &str);
    fn set_text(&self, text: &str);
    fn html(&self) -> String;
    fn set_html(&self, html: &str);
    fn set_style(&self, property: &str, value: &str);
    fn set_disabled(&self, disabled: bool);
    /// Clears form fields; a no-op on anything that is not a form.
    fn reset(&self);
    fn offset_top(&self) -> f64;
    fn rect(&self) -> Rect;
    fn find(&self, selector: &str) -> Option<Self>;
    fn find_all(&self, selector: &str) -> Vec<Self>;

    fn data(&self, key: &str) -> Option<String> {
        self.attribute(&format!("data-{key}"))
    }

    fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Target<N> {
    Document,
    Window,
    Node(N),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum EventKind {
    PointerMove,
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    Click,
    Scroll,
    Submit,
}

impl EventKind {
    pub(crate) fn dom_name(self) -> &'static str {
        match self {
            Self::PointerMove => "mousemove",
            Self::PointerEnter => "mouseenter",
            Self::PointerLeave => "mouseleave",
            Self::PointerDown => "mousedown",
            Self::PointerUp => "mouseup",
            Self::Click => "click",
            Self::Scroll => "scroll",
            Self::Submit => "submit",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Propagation {
    Continue,
    PreventDefault,
}

pub(crate) type Handler = Box<dyn FnMut(Pointer) -> Propagation>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VisibilityOptions {
    pub threshold: f64,
    pub root_margin: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Visibility {
    pub intersecting: bool,
    pub ratio: f64,
}

/// Returned by a visibility callback: keep watching the element or stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Observation {
    Keep,
    Release,
}

pub(crate) type VisibilityHandler<N> = Box<dyn FnMut(&N, Visibility) -> Observation>;

pub(crate) trait Host: 'static {
    type Node: Element;

    fn by_id(&self, id: &str) -> Option<Self::Node>;
    fn select_all(&self, selector: &str) -> Vec<Self::Node>;
    fn body(&self) -> Option<Self::Node>;

    fn listen(&self, target: Target<Self::Node>, kind: EventKind, handler: Handler);
    fn observe_visibility(
        &self,
        nodes: Vec<Self::Node>,
        options: VisibilityOptions,
        handler: VisibilityHandler<Self::Node>,
    ) -> Result<(), crate::error::EffectError>;

    fn scroll_y(&self) -> f64;
    fn smooth_scroll_to(&self, top: f64);
    /// False on touch-only devices (`(hover: none)` matches).
    fn hover_capable(&self) -> bool;
}

pub(crate) trait Entropy {
    /// Uniform sample in `[0, 1)`.
    fn unit(&self) -> f64;
}
