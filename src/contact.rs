//! Contact form submit-button state machine around a stand-in network call.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::host::{Element, EventKind, Host, Propagation, Target};
use crate::logging::{log_event, LogLevel};
use crate::scheduler::{millis, Scheduler};

pub(crate) const CONTACT_FORM_ID: &str = "contactForm";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
const LOADING_CLASS: &str = "loading";
pub(crate) const SUCCESS_LABEL: &str = "<span class=\"btn-text\">Message Sent! ✓</span>";
pub(crate) const ERROR_LABEL: &str = "<span class=\"btn-text\">Error! Try Again</span>";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

pub(crate) type Completion = Box<dyn FnOnce(Result<(), EffectError>)>;

/// Delivers a submission and reports the outcome exactly once.
pub(crate) trait SubmitTransport {
    fn send(&self, done: Completion);
}

/// Stand-in for a real endpoint: always succeeds after a fixed delay.
pub(crate) struct SimulatedTransport {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
}

impl SimulatedTransport {
    pub(crate) fn new(scheduler: Rc<dyn Scheduler>, config: &EffectsConfig) -> Self {
        Self {
            scheduler,
            delay: millis(config.submit_delay_ms),
        }
    }
}

impl SubmitTransport for SimulatedTransport {
    fn send(&self, done: Completion) {
        self.scheduler.after(self.delay, Box::new(move || done(Ok(()))));
    }
}

pub(crate) struct ContactForm<N: Element> {
    form: N,
    button: N,
    original_label: String,
    state: SubmissionState,
    // Bumped per submission; completions and restores from older rounds are dropped.
    generation: u64,
    transport: Rc<dyn SubmitTransport>,
    scheduler: Rc<dyn Scheduler>,
    restore_delay: Duration,
}

impl<N: Element> ContactForm<N> {
    #[cfg(test)]
    pub(crate) fn state(&self) -> SubmissionState {
        self.state
    }

    fn transition(&mut self, next: SubmissionState) {
        log_event(
            LogLevel::Debug,
            "contact_state",
            json!({ "from": self.state.as_str(), "to": next.as_str(), "round": self.generation }),
        );
        self.state = next;
    }
}

pub(crate) fn submit<N: Element>(form: &Rc<RefCell<ContactForm<N>>>) {
    let (round, transport) = {
        let mut inner = form.borrow_mut();
        if matches!(inner.state, SubmissionState::Submitting | SubmissionState::Success) {
            log_event(
                LogLevel::Debug,
                "contact_submit_ignored",
                json!({ "state": inner.state.as_str() }),
            );
            return;
        }

        inner.generation += 1;
        inner.button.set_html(&inner.original_label);
        inner.button.add_class(LOADING_CLASS);
        inner.button.set_disabled(true);
        inner.transition(SubmissionState::Submitting);
        (inner.generation, inner.transport.clone())
    };

    let handle = form.clone();
    transport.send(Box::new(move |outcome| finish(&handle, round, outcome)));
}

fn finish<N: Element>(
    form: &Rc<RefCell<ContactForm<N>>>,
    round: u64,
    outcome: Result<(), EffectError>,
) {
    let (scheduler, delay) = {
        let mut inner = form.borrow_mut();
        if inner.generation != round || inner.state != SubmissionState::Submitting {
            return;
        }

        inner.button.remove_class(LOADING_CLASS);
        match outcome {
            Ok(()) => {
                inner.button.set_html(SUCCESS_LABEL);
                inner.form.reset();
                inner.transition(SubmissionState::Success);
            }
            Err(error) => {
                inner.button.set_html(ERROR_LABEL);
                inner.button.set_disabled(false);
                log_event(
                    LogLevel::Warn,
                    "contact_submit_failed",
                    json!({ "error": error.to_string() }),
                );
                inner.transition(SubmissionState::Error);
            }
        }
        (inner.scheduler.clone(), inner.restore_delay)
    };

    let handle = form.clone();
    scheduler.after(delay, Box::new(move || restore(&handle, round)));
}

fn restore<N: Element>(form: &Rc<RefCell<ContactForm<N>>>, round: u64) {
    let mut inner = form.borrow_mut();
    if inner.generation != round {
        return;
    }

    inner.button.set_html(&inner.original_label);
    inner.button.set_disabled(false);
    inner.transition(SubmissionState::Idle);
}

pub(crate) fn install<H: Host>(
    host: &H,
    scheduler: Rc<dyn Scheduler>,
    transport: Rc<dyn SubmitTransport>,
    config: &EffectsConfig,
) -> Result<Rc<RefCell<ContactForm<H::Node>>>, EffectError> {
    let form = host
        .by_id(CONTACT_FORM_ID)
        .ok_or_else(|| EffectError::missing(CONTACT_FORM_ID))?;
    let button = form
        .find(SUBMIT_SELECTOR)
        .ok_or_else(|| EffectError::missing(SUBMIT_SELECTOR))?;

    let contact = Rc::new(RefCell::new(ContactForm {
        original_label: button.html(),
        form: form.clone(),
        button,
        state: SubmissionState::Idle,
        generation: 0,
        transport,
        scheduler,
        restore_delay: millis(config.submit_restore_ms),
    }));

    let handle = contact.clone();
    host.listen(
        Target::Node(form),
        EventKind::Submit,
        Box::new(move |_| {
            submit(&handle);
            Propagation::PreventDefault
        }),
    );

    Ok(contact)
}
