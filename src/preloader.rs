use std::rc::Rc;

use serde_json::json;

use crate::config::EffectsConfig;
use crate::host::{Element, Entropy, Host};
use crate::logging::{log_event, LogLevel};
use crate::scheduler::{millis, Scheduler, Tick};

pub(crate) const PRELOADER_ID: &str = "preloader";
const PROGRESS_SELECTOR: &str = ".preloader-progress";
const PERCENTAGE_SELECTOR: &str = ".preloader-percentage";
const HIDDEN_CLASS: &str = "hidden";
const LOADING_ATTRIBUTE: &str = "data-loading";

/// Simulated load percentage; only ever grows and saturates at 100.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct LoadProgress {
    percent: f64,
}

impl LoadProgress {
    pub(crate) fn advance(&mut self, step: f64) -> f64 {
        self.percent = (self.percent + step.max(0.0)).min(100.0);
        self.percent
    }

    pub(crate) fn percent(&self) -> f64 {
        self.percent
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Maps a unit sample onto `[min_step, max_step]`, never zero.
pub(crate) fn step_size(config: &EffectsConfig, unit: f64) -> f64 {
    let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
    let span = config.preloader_max_step - config.preloader_min_step;
    config.preloader_min_step + span * (1.0 - unit)
}

/// Starts the progress ticker; `on_ready` runs once the grace delay after 100% elapses.
pub(crate) fn install<H: Host>(
    host: &H,
    scheduler: Rc<dyn Scheduler>,
    entropy: Rc<dyn Entropy>,
    config: &EffectsConfig,
    on_ready: Box<dyn FnOnce()>,
) {
    let root = host.by_id(PRELOADER_ID);
    if root.is_none() {
        log_event(LogLevel::Debug, "preloader_missing", json!({ "id": PRELOADER_ID }));
    }
    let bar = root.as_ref().and_then(|root| root.find(PROGRESS_SELECTOR));
    let label = root.as_ref().and_then(|root| root.find(PERCENTAGE_SELECTOR));
    let body = host.body();

    let config = config.clone();
    let grace = millis(config.preloader_grace_ms);
    let timer = scheduler.clone();
    let mut progress = LoadProgress::default();
    let mut on_ready = Some(on_ready);

    scheduler.every(
        millis(config.preloader_tick_ms),
        Box::new(move || {
            let percent = progress.advance(step_size(&config, entropy.unit()));
            if let Some(bar) = &bar {
                bar.set_style("width", &format!("{percent}%"));
            }
            if let Some(label) = &label {
                label.set_text(&format!("{}%", percent.floor()));
            }

            if !progress.is_complete() {
                return Tick::Continue;
            }

            if let Some(on_ready) = on_ready.take() {
                let root = root.clone();
                let body = body.clone();
                timer.after(
                    grace,
                    Box::new(move || {
                        if let Some(root) = &root {
                            root.add_class(HIDDEN_CLASS);
                        }
                        if let Some(body) = &body {
                            body.remove_attribute(LOADING_ATTRIBUTE);
                        }
                        log_event(LogLevel::Debug, "preloader_complete", json!({}));
                        on_ready();
                    }),
                );
            }
            Tick::Stop
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, FakeHost, ManualScheduler, ScriptedEntropy};
    use proptest::prelude::*;
    use std::cell::Cell;

    fn preloader_markup(host: &FakeHost) -> (FakeElement, FakeElement, FakeElement) {
        let bar = FakeElement::new();
        let label = FakeElement::new();
        let root = host.with_id(
            PRELOADER_ID,
            FakeElement::new()
                .with_child(PROGRESS_SELECTOR, bar.clone())
                .with_child(PERCENTAGE_SELECTOR, label.clone()),
        );
        (root, bar, label)
    }

    #[test]
    fn completes_once_after_grace_delay() {
        let host = FakeHost::new();
        let (root, bar, label) = preloader_markup(&host);
        let scheduler = ManualScheduler::new();
        let ready = Rc::new(Cell::new(0));
        let ready_count = ready.clone();

        // Samples of 0.0 yield the maximum step of 15 per tick: 7 ticks to 100.
        install(
            &host,
            scheduler.clone(),
            ScriptedEntropy::new(vec![0.0]),
            &EffectsConfig::default(),
            Box::new(move || ready_count.set(ready_count.get() + 1)),
        );

        scheduler.advance(600);
        assert_eq!(label.text(), "90%");
        assert_eq!(ready.get(), 0);

        scheduler.advance(100);
        assert_eq!(label.text(), "100%");
        assert_eq!(bar.style("width").as_deref(), Some("100%"));
        assert!(!root.has_class(HIDDEN_CLASS));

        scheduler.advance(499);
        assert_eq!(ready.get(), 0);
        scheduler.advance(1);
        assert_eq!(ready.get(), 1);
        assert!(root.has_class(HIDDEN_CLASS));
        assert_eq!(host.body_node().attribute(LOADING_ATTRIBUTE), None);

        scheduler.advance(10_000);
        assert_eq!(ready.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn missing_markup_still_signals_ready() {
        let host = FakeHost::new();
        let scheduler = ManualScheduler::new();
        let ready = Rc::new(Cell::new(false));
        let flag = ready.clone();

        install(
            &host,
            scheduler.clone(),
            ScriptedEntropy::new(vec![0.5]),
            &EffectsConfig::default(),
            Box::new(move || flag.set(true)),
        );
        scheduler.advance(20_000);

        assert!(ready.get());
    }

    #[test]
    fn step_size_spans_configured_range() {
        let config = EffectsConfig::default();
        assert_eq!(step_size(&config, 0.0), 15.0);
        assert!(step_size(&config, 0.999_999) > 0.0);
        assert_eq!(step_size(&config, f64::NAN), 15.0);
    }

    proptest! {
        #[test]
        fn progress_is_monotonic_and_terminates(
            samples in prop::collection::vec(0.0f64..1.0, 1..64),
        ) {
            let config = EffectsConfig::default();
            let max_ticks = (100.0 / config.preloader_min_step).ceil() as usize;
            let mut progress = LoadProgress::default();
            let mut previous = 0.0;
            let mut ticks = 0;

            while !progress.is_complete() {
                let sample = samples[ticks % samples.len()];
                let percent = progress.advance(step_size(&config, sample));
                prop_assert!(percent >= previous);
                prop_assert!(percent <= 100.0);
                previous = percent;
                ticks += 1;
                prop_assert!(ticks <= max_ticks);
            }

            prop_assert_eq!(progress.percent(), 100.0);
        }
    }
}
