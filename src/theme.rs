use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::animate::{Animator, Props, Tween};
use crate::host::{Element, EventKind, Host, Propagation, Target};
use crate::logging::{log_event, LogLevel};
use crate::store::{read_stored_theme, PreferenceStore, Theme, THEME_KEY};

pub(crate) const THEME_TOGGLE_ID: &str = "themeToggle";
const FEEDBACK_OPACITY: f64 = 0.8;
const FEEDBACK_SECONDS: f64 = 0.3;

pub(crate) struct ThemeSwitch<N: Element> {
    body: Option<N>,
    store: Rc<dyn PreferenceStore>,
    animator: Rc<dyn Animator<N>>,
    current: Theme,
}

impl<N: Element> ThemeSwitch<N> {
    /// Reads the saved preference and applies it immediately.
    pub(crate) fn new(
        body: Option<N>,
        store: Rc<dyn PreferenceStore>,
        animator: Rc<dyn Animator<N>>,
    ) -> Self {
        let current = read_stored_theme(store.as_ref());
        let switch = Self {
            body,
            store,
            animator,
            current,
        };
        switch.apply();
        switch
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Theme {
        self.current
    }

    pub(crate) fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        self.apply();

        if let Err(error) = self.store.set(THEME_KEY, self.current.as_str()) {
            log_event(
                LogLevel::Warn,
                "theme_persist_failed",
                json!({ "theme": self.current.as_str(), "error": error.to_string() }),
            );
        }

        if let Some(body) = &self.body {
            self.animator.tween(
                std::slice::from_ref(body),
                Tween::from_to(
                    Props::default().opacity(FEEDBACK_OPACITY),
                    Props::default().opacity(1.0),
                    FEEDBACK_SECONDS,
                ),
            );
        }

        log_event(LogLevel::Debug, "theme_changed", json!({ "theme": self.current.as_str() }));
        self.current
    }

    fn apply(&self) {
        if let Some(body) = &self.body {
            body.remove_class(Theme::Light.as_str());
            body.remove_class(Theme::Dark.as_str());
            body.add_class(self.current.as_str());
        }
    }
}

pub(crate) fn install<H: Host>(
    host: &H,
    store: Rc<dyn PreferenceStore>,
    animator: Rc<dyn Animator<H::Node>>,
) -> Rc<RefCell<ThemeSwitch<H::Node>>> {
    let switch = Rc::new(RefCell::new(ThemeSwitch::new(host.body(), store, animator)));

    match host.by_id(THEME_TOGGLE_ID) {
        Some(toggle) => {
            let handle = switch.clone();
            host.listen(
                Target::Node(toggle),
                EventKind::Click,
                Box::new(move |_| {
                    handle.borrow_mut().toggle();
                    Propagation::PreventDefault
                }),
            );
        }
        None => log_event(
            LogLevel::Debug,
            "theme_toggle_missing",
            json!({ "id": THEME_TOGGLE_ID }),
        ),
    }

    switch
}
