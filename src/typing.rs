use std::cell::RefCell;
use std::rc::Rc;

use crate::config::EffectsConfig;
use crate::error::EffectError;
use crate::host::{Element, Host};
use crate::scheduler::{millis, Scheduler};

pub(crate) const TYPING_TEXT_ID: &str = "typingText";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TypingTiming {
    type_ms: u32,
    delete_ms: u32,
    hold_ms: u32,
    next_ms: u32,
}

/// Position inside the phrase cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TypingState {
    phrase: usize,
    chars: usize,
    deleting: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypingFrame {
    pub text: String,
    pub delay_ms: u32,
}

impl TypingState {
    fn advance(&mut self, phrases: &[String], timing: TypingTiming) -> TypingFrame {
        let Some(current) = phrases.get(self.phrase % phrases.len().max(1)) else {
            return TypingFrame {
                text: String::new(),
                delay_ms: timing.hold_ms,
            };
        };
        let length = current.chars().count();

        if self.deleting {
            self.chars = self.chars.saturating_sub(1);
        } else {
            self.chars = (self.chars + 1).min(length);
        }
        let text: String = current.chars().take(self.chars).collect();

        let mut delay_ms = if self.deleting { timing.delete_ms } else { timing.type_ms };
        if !self.deleting && self.chars == length {
            delay_ms = timing.hold_ms;
            self.deleting = true;
        } else if self.deleting && self.chars == 0 {
            self.deleting = false;
            self.phrase = (self.phrase + 1) % phrases.len();
            delay_ms = timing.next_ms;
        }

        TypingFrame { text, delay_ms }
    }
}

struct Typist<N: Element> {
    node: N,
    phrases: Vec<String>,
    timing: TypingTiming,
    state: RefCell<TypingState>,
    scheduler: Rc<dyn Scheduler>,
}

impl<N: Element> Typist<N> {
    fn tick(self: &Rc<Self>) {
        let frame = self.state.borrow_mut().advance(&self.phrases, self.timing);
        self.node.set_text(&frame.text);

        let next = self.clone();
        self.scheduler
            .after(millis(frame.delay_ms), Box::new(move || next.tick()));
    }
}

/// Types and deletes the configured phrases forever, starting after the
/// configured delay.
pub(crate) fn install<H: Host>(
    host: &H,
    scheduler: Rc<dyn Scheduler>,
    config: &EffectsConfig,
) -> Result<(), EffectError> {
    let node = host
        .by_id(TYPING_TEXT_ID)
        .ok_or_else(|| EffectError::missing(TYPING_TEXT_ID))?;
    if config.typing_phrases.is_empty() {
        return Ok(());
    }

    let typist = Rc::new(Typist {
        node,
        phrases: config.typing_phrases.clone(),
        timing: TypingTiming {
            type_ms: config.typing_type_ms,
            delete_ms: config.typing_delete_ms,
            hold_ms: config.typing_hold_ms,
            next_ms: config.typing_next_ms,
        },
        state: RefCell::new(TypingState::default()),
        scheduler: scheduler.clone(),
    });

    scheduler.after(millis(config.typing_start_ms), Box::new(move || typist.tick()));
    Ok(())
}
