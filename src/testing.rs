//! In-memory host, virtual clock and recording animator for effect tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::animate::{Animator, InstantAnimator, TimelineEntry, Tween};
use crate::error::EffectError;
use crate::host::{
    Element, Entropy, EventKind, Handler, Host, Observation, Pointer, Propagation, Rect, Target,
    Visibility, VisibilityHandler, VisibilityOptions,
};
use crate::scheduler::{Scheduler, Tick};
use crate::store::PreferenceStore;

#[derive(Default)]
struct FakeNode {
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    text: String,
    html: String,
    styles: HashMap<String, String>,
    disabled: bool,
    resets: usize,
    offset_top: f64,
    rect: Rect,
    children: HashMap<String, Vec<FakeElement>>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeElement(Rc<RefCell<FakeNode>>);

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.0.borrow();
        f.debug_struct("FakeElement")
            .field("classes", &node.classes)
            .field("attributes", &node.attributes)
            .finish()
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FakeElement {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub(crate) fn with_attr(self, name: &str, value: &str) -> Self {
        self.0.borrow_mut().attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn with_html(self, html: &str) -> Self {
        self.set_html(html);
        self
    }

    pub(crate) fn with_offset_top(self, top: f64) -> Self {
        self.0.borrow_mut().offset_top = top;
        self
    }

    pub(crate) fn with_rect(self, rect: Rect) -> Self {
        self.0.borrow_mut().rect = rect;
        self
    }

    pub(crate) fn with_child(self, selector: &str, child: FakeElement) -> Self {
        self.0
            .borrow_mut()
            .children
            .entry(selector.to_string())
            .or_default()
            .push(child);
        self
    }

    pub(crate) fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().styles.get(property).cloned()
    }

    pub(crate) fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub(crate) fn disabled(&self) -> bool {
        self.0.borrow().disabled
    }

    pub(crate) fn resets(&self) -> usize {
        self.0.borrow().resets
    }
}

impl Element for FakeElement {
    fn add_class(&self, class: &str) {
        let mut node = self.0.borrow_mut();
        if !node.classes.iter().any(|existing| existing == class) {
            node.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|existing| existing != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|existing| existing == class)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn remove_attribute(&self, name: &str) {
        self.0.borrow_mut().attributes.remove(name);
    }

    fn set_text(&self, text: &str) {
        self.0.borrow_mut().text = text.to_string();
    }

    fn html(&self) -> String {
        self.0.borrow().html.clone()
    }

    fn set_html(&self, html: &str) {
        self.0.borrow_mut().html = html.to_string();
    }

    fn set_style(&self, property: &str, value: &str) {
        self.0
            .borrow_mut()
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn set_disabled(&self, disabled: bool) {
        self.0.borrow_mut().disabled = disabled;
    }

    fn reset(&self) {
        self.0.borrow_mut().resets += 1;
    }

    fn offset_top(&self) -> f64 {
        self.0.borrow().offset_top
    }

    fn rect(&self) -> Rect {
        self.0.borrow().rect
    }

    fn find(&self, selector: &str) -> Option<Self> {
        self.find_all(selector).into_iter().next()
    }

    fn find_all(&self, selector: &str) -> Vec<Self> {
        self.0.borrow().children.get(selector).cloned().unwrap_or_default()
    }
}

type SharedHandler = Rc<RefCell<Handler>>;

struct FakeObserver {
    nodes: Vec<FakeElement>,
    options: VisibilityOptions,
    handler: VisibilityHandler<FakeElement>,
}

pub(crate) struct FakeHost {
    ids: RefCell<HashMap<String, FakeElement>>,
    selectors: RefCell<HashMap<String, Vec<FakeElement>>>,
    body: FakeElement,
    listeners: RefCell<Vec<(Target<FakeElement>, EventKind, SharedHandler)>>,
    observers: RefCell<Vec<Rc<RefCell<FakeObserver>>>>,
    scroll_y: Cell<f64>,
    scrolled_to: RefCell<Vec<f64>>,
    hover_capable: Cell<bool>,
    refuse_observers: Cell<bool>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            ids: RefCell::default(),
            selectors: RefCell::default(),
            body: FakeElement::new().with_attr("data-loading", ""),
            listeners: RefCell::default(),
            observers: RefCell::default(),
            scroll_y: Cell::new(0.0),
            scrolled_to: RefCell::default(),
            hover_capable: Cell::new(true),
            refuse_observers: Cell::new(false),
        }
    }
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_id(&self, id: &str, node: FakeElement) -> FakeElement {
        self.ids.borrow_mut().insert(id.to_string(), node.clone());
        node
    }

    pub(crate) fn with_selector(&self, selector: &str, node: FakeElement) -> FakeElement {
        self.selectors
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .push(node.clone());
        node
    }

    pub(crate) fn set_hover_capable(&self, capable: bool) {
        self.hover_capable.set(capable);
    }

    pub(crate) fn refuse_observers(&self) {
        self.refuse_observers.set(true);
    }

    pub(crate) fn body_node(&self) -> FakeElement {
        self.body.clone()
    }

    pub(crate) fn dispatch(
        &self,
        target: Target<FakeElement>,
        kind: EventKind,
        pointer: Pointer,
    ) -> Vec<Propagation> {
        let handlers: Vec<SharedHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(listened, listened_kind, _)| *listened == target && *listened_kind == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        handlers
            .into_iter()
            .map(|handler| (handler.borrow_mut())(pointer))
            .collect()
    }

    pub(crate) fn click(&self, node: &FakeElement) -> Vec<Propagation> {
        self.dispatch(Target::Node(node.clone()), EventKind::Click, Pointer::default())
    }

    pub(crate) fn scroll_to(&self, y: f64) {
        self.scroll_y.set(y);
        self.dispatch(Target::Window, EventKind::Scroll, Pointer::default());
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub(crate) fn smooth_scrolls(&self) -> Vec<f64> {
        self.scrolled_to.borrow().clone()
    }

    pub(crate) fn observer_options(&self) -> Vec<VisibilityOptions> {
        self.observers
            .borrow()
            .iter()
            .map(|observer| observer.borrow().options.clone())
            .collect()
    }

    /// Reports `ratio` of `node` as visible to every observer still watching it.
    pub(crate) fn show(&self, node: &FakeElement, ratio: f64) {
        let observers: Vec<_> = self.observers.borrow().clone();
        let visibility = Visibility {
            intersecting: ratio > 0.0,
            ratio,
        };

        for observer in observers {
            let mut observer = observer.borrow_mut();
            if !observer.nodes.contains(node) {
                continue;
            }
            if (observer.handler)(node, visibility) == Observation::Release {
                observer.nodes.retain(|watched| watched != node);
            }
        }
    }

    pub(crate) fn is_observed(&self, node: &FakeElement) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|observer| observer.borrow().nodes.contains(node))
    }
}

impl Host for FakeHost {
    type Node = FakeElement;

    fn by_id(&self, id: &str) -> Option<FakeElement> {
        self.ids.borrow().get(id).cloned()
    }

    fn select_all(&self, selector: &str) -> Vec<FakeElement> {
        self.selectors.borrow().get(selector).cloned().unwrap_or_default()
    }

    fn body(&self) -> Option<FakeElement> {
        Some(self.body.clone())
    }

    fn listen(&self, target: Target<FakeElement>, kind: EventKind, handler: Handler) {
        self.listeners
            .borrow_mut()
            .push((target, kind, Rc::new(RefCell::new(handler))));
    }

    fn observe_visibility(
        &self,
        nodes: Vec<FakeElement>,
        options: VisibilityOptions,
        handler: VisibilityHandler<FakeElement>,
    ) -> Result<(), EffectError> {
        if self.refuse_observers.get() {
            return Err(EffectError::Host("IntersectionObserver unsupported".to_string()));
        }
        self.observers
            .borrow_mut()
            .push(Rc::new(RefCell::new(FakeObserver {
                nodes,
                options,
                handler,
            })));
        Ok(())
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.scrolled_to.borrow_mut().push(top);
    }

    fn hover_capable(&self) -> bool {
        self.hover_capable.get()
    }
}

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut() -> Tick>, u64),
}

struct Pending {
    due: u64,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: u64,
    seq: u64,
    epoch: u64,
    queue: Vec<Pending>,
}

/// Virtual-time scheduler; nothing runs until the test advances the clock.
#[derive(Default)]
pub(crate) struct ManualScheduler {
    clock: RefCell<Clock>,
}

impl ManualScheduler {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.clock.borrow().now
    }

    pub(crate) fn pending(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    fn push(&self, delay_ms: u64, task: Task) {
        let mut clock = self.clock.borrow_mut();
        let due = clock.now + delay_ms;
        let seq = clock.seq;
        clock.seq += 1;
        clock.queue.push(Pending { due, seq, task });
    }

    fn pop_due(&self, until: u64) -> Option<Pending> {
        let mut clock = self.clock.borrow_mut();
        let index = clock
            .queue
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= until)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(index, _)| index)?;
        let pending = clock.queue.swap_remove(index);
        clock.now = pending.due;
        Some(pending)
    }

    /// Runs every task that falls due within the next `ms` milliseconds.
    pub(crate) fn advance(&self, ms: u64) {
        let until = self.now_ms() + ms;

        while let Some(pending) = self.pop_due(until) {
            match pending.task {
                Task::Once(task) => task(),
                Task::Repeat(mut task, period) => {
                    let epoch = self.clock.borrow().epoch;
                    if task() == Tick::Continue && self.clock.borrow().epoch == epoch {
                        self.push(period, Task::Repeat(task, period));
                    }
                }
            }
        }

        self.clock.borrow_mut().now = until;
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.push(delay.as_millis() as u64, Task::Once(task));
    }

    fn every(&self, period: Duration, task: Box<dyn FnMut() -> Tick>) {
        let period = (period.as_millis() as u64).max(1);
        self.push(period, Task::Repeat(task, period));
    }

    fn cancel_all(&self) {
        let cancelled = {
            let mut clock = self.clock.borrow_mut();
            clock.epoch += 1;
            std::mem::take(&mut clock.queue)
        };
        drop(cancelled);
    }
}

/// Instant backend that also remembers what it was asked to animate.
#[derive(Default)]
pub(crate) struct RecordingAnimator {
    pub tweens: RefCell<Vec<(Vec<FakeElement>, Tween)>>,
    pub timelines: RefCell<Vec<Vec<TimelineEntry<FakeElement>>>>,
}

impl RecordingAnimator {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn last_tween_for(&self, target: &FakeElement) -> Option<Tween> {
        self.tweens
            .borrow()
            .iter()
            .rev()
            .find(|(targets, _)| targets.contains(target))
            .map(|(_, tween)| tween.clone())
    }
}

impl Animator<FakeElement> for RecordingAnimator {
    fn tween(&self, targets: &[FakeElement], tween: Tween) {
        self.tweens.borrow_mut().push((targets.to_vec(), tween.clone()));
        InstantAnimator.tween(targets, tween);
    }

    fn timeline(&self, entries: Vec<TimelineEntry<FakeElement>>) {
        self.timelines.borrow_mut().push(entries.clone());
        InstantAnimator.timeline(entries);
    }
}

/// Store whose writes always fail, like `localStorage` over quota or blocked.
#[derive(Default)]
pub(crate) struct FailingStore {
    attempts: Cell<usize>,
}

impl FailingStore {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl PreferenceStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), EffectError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(EffectError::Storage("quota exceeded".to_string()))
    }
}

/// Replays a fixed sequence of samples, cycling when exhausted.
pub(crate) struct ScriptedEntropy {
    samples: Vec<f64>,
    cursor: Cell<usize>,
}

impl ScriptedEntropy {
    pub(crate) fn new(samples: Vec<f64>) -> Rc<Self> {
        Rc::new(Self {
            samples,
            cursor: Cell::new(0),
        })
    }
}

impl Entropy for ScriptedEntropy {
    fn unit(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        self.samples[index % self.samples.len()]
    }
}
