//! Browser implementations of the host, timer, animation and storage seams.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::{Interval, Timeout};
use js_sys::{Array, Function, Object, Reflect};
use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Document, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlFormElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, MouseEvent,
    NodeList, ScrollBehavior, ScrollToOptions, Storage, Window,
};

use crate::animate::{Animator, InstantAnimator, Motion, Props, TimelineEntry, Tween};
use crate::config::{EffectsConfig, CONFIG_ELEMENT_ID};
use crate::error::EffectError;
use crate::host::{
    Element, Entropy, EventKind, Handler, Host, Observation, Pointer, Propagation, Rect, Target,
    Visibility, VisibilityHandler, VisibilityOptions,
};
use crate::logging::{log_event, LogLevel};
use crate::scheduler::{Scheduler, Tick};
use crate::store::{MemoryStore, PreferenceStore};

fn js_error(context: &str, error: JsValue) -> EffectError {
    EffectError::Host(format!("{context}: {error:?}"))
}

fn html_elements(list: NodeList) -> Vec<HtmlElement> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

impl Element for HtmlElement {
    fn add_class(&self, class: &str) {
        let _ = self.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        web_sys::Element::get_attribute(self, name)
    }

    fn remove_attribute(&self, name: &str) {
        let _ = web_sys::Element::remove_attribute(self, name);
    }

    fn set_text(&self, text: &str) {
        web_sys::Node::set_text_content(self, Some(text));
    }

    fn html(&self) -> String {
        web_sys::Element::inner_html(self)
    }

    fn set_html(&self, html: &str) {
        web_sys::Element::set_inner_html(self, html);
    }

    fn set_style(&self, property: &str, value: &str) {
        let _ = HtmlElement::style(self).set_property(property, value);
    }

    fn set_disabled(&self, disabled: bool) {
        if let Some(button) = self.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if disabled {
            let _ = web_sys::Element::set_attribute(self, "disabled", "");
        } else {
            let _ = web_sys::Element::remove_attribute(self, "disabled");
        }
    }

    fn reset(&self) {
        if let Some(form) = self.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn offset_top(&self) -> f64 {
        f64::from(HtmlElement::offset_top(self))
    }

    fn rect(&self) -> Rect {
        let rect = web_sys::Element::get_bounding_client_rect(self);
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn find(&self, selector: &str) -> Option<Self> {
        web_sys::Element::query_selector(self, selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        web_sys::Element::query_selector_all(self, selector)
            .map(html_elements)
            .unwrap_or_default()
    }
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// The live document. Listeners and observers stay registered until
/// `teardown`.
pub(crate) struct WebHost {
    window: Window,
    document: Document,
    listeners: RefCell<Vec<EventListener>>,
    observers: RefCell<Vec<(IntersectionObserver, ObserverCallback)>>,
}

impl WebHost {
    pub(crate) fn new() -> Result<Self, EffectError> {
        let window = web_sys::window().ok_or_else(|| EffectError::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| EffectError::Host("no document".to_string()))?;
        Ok(Self {
            window,
            document,
            listeners: RefCell::default(),
            observers: RefCell::default(),
        })
    }

    pub(crate) fn window(&self) -> &Window {
        &self.window
    }

    /// Text of the inline `<script type="application/json">` config block.
    pub(crate) fn config_text(&self) -> Option<String> {
        self.document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content())
    }

    fn event_target(&self, target: &Target<HtmlElement>) -> EventTarget {
        match target {
            Target::Document => self.document.clone().into(),
            Target::Window => self.window.clone().into(),
            Target::Node(node) => node.clone().into(),
        }
    }
}

impl WebHost {
    /// Removes every listener and disconnects every observer. Handlers hold
    /// the host themselves, so dropping it alone never gets here.
    pub(crate) fn teardown(&self) {
        self.listeners.borrow_mut().clear();
        for (observer, _) in self.observers.borrow_mut().drain(..) {
            observer.disconnect();
        }
    }
}

impl Host for WebHost {
    type Node = HtmlElement;

    fn by_id(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    fn select_all(&self, selector: &str) -> Vec<HtmlElement> {
        self.document
            .query_selector_all(selector)
            .map(html_elements)
            .unwrap_or_default()
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn listen(&self, target: Target<HtmlElement>, kind: EventKind, handler: Handler) {
        let event_target = self.event_target(&target);
        let options = match kind {
            EventKind::Click | EventKind::Submit => EventListenerOptions::enable_prevent_default(),
            _ => EventListenerOptions::default(),
        };

        let mut handler = handler;
        let on_event = move |event: &Event| {
            let pointer = event
                .dyn_ref::<MouseEvent>()
                .map(|mouse| Pointer {
                    x: f64::from(mouse.client_x()),
                    y: f64::from(mouse.client_y()),
                })
                .unwrap_or_default();
            if handler(pointer) == Propagation::PreventDefault {
                event.prevent_default();
            }
        };
        let listener =
            EventListener::new_with_options(&event_target, kind.dom_name(), options, on_event);
        self.listeners.borrow_mut().push(listener);
    }

    fn observe_visibility(
        &self,
        nodes: Vec<HtmlElement>,
        options: VisibilityOptions,
        handler: VisibilityHandler<HtmlElement>,
    ) -> Result<(), EffectError> {
        let mut handler = handler;
        let on_entries = move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let Ok(node) = entry.target().dyn_into::<HtmlElement>() else {
                    continue;
                };
                let visibility = Visibility {
                    intersecting: entry.is_intersecting(),
                    ratio: entry.intersection_ratio(),
                };
                if handler(&node, visibility) == Observation::Release {
                    observer.unobserve(&node);
                }
            }
        };
        let callback: ObserverCallback = Closure::new(on_entries);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(options.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|error| js_error("IntersectionObserver", error))?;

        for node in &nodes {
            observer.observe(node);
        }
        self.observers.borrow_mut().push((observer, callback));
        Ok(())
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn hover_capable(&self) -> bool {
        !self
            .window
            .match_media("(hover: none)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }
}

fn clamp_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

#[derive(Default)]
struct Timers {
    next_id: u64,
    timeouts: HashMap<u64, Timeout>,
    intervals: HashMap<u64, Interval>,
}

impl Timers {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// gloo timers owned by the scheduler, so unmounting can cancel them.
#[derive(Default)]
pub(crate) struct BrowserScheduler {
    timers: Rc<RefCell<Timers>>,
}

impl BrowserScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> Weak<RefCell<Timers>> {
        Rc::downgrade(&self.timers)
    }
}

impl Scheduler for BrowserScheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let id = self.timers.borrow_mut().next_id();
        let registry = self.registry();
        let timeout = Timeout::new(clamp_millis(delay), move || {
            let Some(timers) = registry.upgrade() else {
                return;
            };
            let fired = timers.borrow_mut().timeouts.remove(&id);
            if fired.is_some() {
                task();
            }
        });
        self.timers.borrow_mut().timeouts.insert(id, timeout);
    }

    fn every(&self, period: Duration, task: Box<dyn FnMut() -> Tick>) {
        let id = self.timers.borrow_mut().next_id();
        let registry = self.registry();
        let mut task = task;
        let interval = Interval::new(clamp_millis(period), move || {
            if task() == Tick::Continue {
                return;
            }
            if let Some(timers) = registry.upgrade() {
                let stopped = timers.borrow_mut().intervals.remove(&id);
                drop(stopped);
            }
        });
        self.timers.borrow_mut().intervals.insert(id, interval);
    }

    fn cancel_all(&self) {
        let cancelled = std::mem::take(&mut *self.timers.borrow_mut());
        let pending = cancelled.timeouts.len() + cancelled.intervals.len();
        drop(cancelled);
        log_event(LogLevel::Debug, "timers_cancelled", json!({ "pending": pending }));
    }
}

/// Drives the page's GSAP build through `window.gsap`.
pub(crate) struct GsapAnimator {
    gsap: JsValue,
}

impl GsapAnimator {
    pub(crate) fn detect(window: &Window) -> Option<Self> {
        let gsap = Reflect::get(window, &JsValue::from_str("gsap")).ok()?;
        (gsap.is_object() || gsap.is_function()).then_some(Self { gsap })
    }

    fn invoke(receiver: &JsValue, method: &str, args: &Array) -> Result<JsValue, EffectError> {
        let function = Reflect::get(receiver, &JsValue::from_str(method))
            .map_err(|error| js_error(method, error))?
            .dyn_into::<Function>()
            .map_err(|_| EffectError::Host(format!("gsap.{method} is not a function")))?;
        function.apply(receiver, args).map_err(|error| js_error(method, error))
    }

    fn call_tween(
        &self,
        receiver: &JsValue,
        targets: &[HtmlElement],
        tween: &Tween,
        at: Option<f64>,
    ) {
        let elements: Array = targets.iter().collect();
        let (method, args) = match &tween.motion {
            Motion::To(props) => ("to", Array::of2(&elements, &tween_vars(props, tween))),
            Motion::From(props) => ("from", Array::of2(&elements, &tween_vars(props, tween))),
            Motion::FromTo(from, to) => (
                "fromTo",
                Array::of3(&elements, &props_object(from), &tween_vars(to, tween)),
            ),
        };
        if let Some(at) = at {
            args.push(&JsValue::from_f64(at));
        }

        if let Err(error) = Self::invoke(receiver, method, &args) {
            log_event(
                LogLevel::Warn,
                "animation_failed",
                json!({ "method": method, "error": error.to_string() }),
            );
        }
    }
}

fn set(object: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(object, &JsValue::from_str(key), &value);
}

fn props_object(props: &Props) -> JsValue {
    let object = Object::new();
    let fields = [
        ("x", props.x),
        ("y", props.y),
        ("opacity", props.opacity),
        ("scale", props.scale),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            set(&object, key, JsValue::from_f64(value));
        }
    }
    object.into()
}

fn tween_vars(props: &Props, tween: &Tween) -> JsValue {
    let vars: Object = props_object(props).unchecked_into();
    set(&vars, "duration", JsValue::from_f64(tween.duration));
    set(&vars, "ease", JsValue::from_str(&tween.ease.as_gsap()));
    if tween.stagger > 0.0 {
        set(&vars, "stagger", JsValue::from_f64(tween.stagger));
    }
    vars.into()
}

impl Animator<HtmlElement> for GsapAnimator {
    fn tween(&self, targets: &[HtmlElement], tween: Tween) {
        if targets.is_empty() {
            return;
        }
        self.call_tween(&self.gsap, targets, &tween, None);
    }

    fn timeline(&self, entries: Vec<TimelineEntry<HtmlElement>>) {
        let timeline = match Self::invoke(&self.gsap, "timeline", &Array::new()) {
            Ok(timeline) => timeline,
            Err(error) => {
                log_event(
                    LogLevel::Warn,
                    "animation_failed",
                    json!({ "method": "timeline", "error": error.to_string() }),
                );
                InstantAnimator.timeline(entries);
                return;
            }
        };
        for entry in &entries {
            self.call_tween(&timeline, &entry.targets, &entry.tween, Some(entry.at));
        }
    }
}

/// Picks GSAP when the page loaded it, otherwise lands every end state at once.
pub(crate) fn detect_animator(window: &Window) -> Rc<dyn Animator<HtmlElement>> {
    match GsapAnimator::detect(window) {
        Some(gsap) => Rc::new(gsap),
        None => {
            log_event(LogLevel::Info, "animation_fallback", json!({ "reason": "gsap not loaded" }));
            Rc::new(InstantAnimator)
        }
    }
}

/// `localStorage`-backed preferences.
pub(crate) struct LocalStore {
    storage: Storage,
}

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EffectError> {
        self.storage
            .set_item(key, value)
            .map_err(|error| EffectError::Storage(format!("{error:?}")))
    }
}

/// Storage is unavailable in some private modes; fall back to memory.
pub(crate) fn preference_store(window: &Window) -> Rc<dyn PreferenceStore> {
    match window.local_storage().ok().flatten() {
        Some(storage) => Rc::new(LocalStore { storage }),
        None => {
            log_event(LogLevel::Warn, "storage_unavailable", json!({ "fallback": "memory" }));
            Rc::new(MemoryStore::default())
        }
    }
}

pub(crate) struct BrowserEntropy;

impl Entropy for BrowserEntropy {
    fn unit(&self) -> f64 {
        js_sys::Math::random()
    }
}

pub(crate) fn load_config(host: &WebHost) -> EffectsConfig {
    EffectsConfig::from_json(host.config_text().as_deref())
}
