use std::rc::Rc;

use serde_json::json;

use crate::animate::Animator;
use crate::config::EffectsConfig;
use crate::contact::{self, SubmitTransport};
use crate::counter;
use crate::cursor;
use crate::error::EffectError;
use crate::filter;
use crate::hero;
use crate::host::{Entropy, Host};
use crate::logging::{log_event, set_threshold, LogLevel};
use crate::magnetic;
use crate::nav;
use crate::preloader;
use crate::reveal;
use crate::scheduler::Scheduler;
use crate::skills;
use crate::store::PreferenceStore;
use crate::theme;
use crate::typing;

/// Everything an effect may reach for, chosen once at startup.
pub(crate) struct Services<H: Host> {
    pub host: Rc<H>,
    pub scheduler: Rc<dyn Scheduler>,
    pub animator: Rc<dyn Animator<H::Node>>,
    pub store: Rc<dyn PreferenceStore>,
    pub entropy: Rc<dyn Entropy>,
    pub transport: Rc<dyn SubmitTransport>,
    pub config: EffectsConfig,
}

/// Installs every effect on its own; one failing never keeps the others
/// from running. Installed effects live on in their listeners and timers.
pub(crate) struct PageController {
    installed: Vec<&'static str>,
    skipped: Vec<&'static str>,
}

impl PageController {
    pub(crate) fn install<H: Host>(services: &Services<H>) -> Self {
        set_threshold(services.config.log_level);

        let mut page = Self {
            installed: Vec::new(),
            skipped: Vec::new(),
        };
        let host = services.host.as_ref();
        let config = &services.config;

        let hero_host = services.host.clone();
        let hero_animator = services.animator.clone();
        preloader::install(
            host,
            services.scheduler.clone(),
            services.entropy.clone(),
            config,
            Box::new(move || {
                hero::play(hero_host.as_ref(), hero_animator.as_ref());
            }),
        );
        page.installed.push("preloader");

        page.record(
            "theme",
            Ok(theme::install(host, services.store.clone(), services.animator.clone())),
        );

        let follower = cursor::install(host, services.animator.clone());
        if let Some(None) = page.record("cursor", follower) {
            page.installed.retain(|name| *name != "cursor");
            page.skipped.push("cursor");
        }

        page.record("nav", Ok(nav::install(&services.host, config)));
        page.record("reveal", reveal::install(host));
        page.record("typing", typing::install(host, services.scheduler.clone(), config));
        page.record("counters", counter::install(host, services.scheduler.clone(), config));
        page.record("skill_bars", skills::install(host, services.scheduler.clone(), config));
        page.record(
            "project_filter",
            Ok(filter::install(host, services.animator.clone())),
        );
        page.record(
            "contact_form",
            contact::install(host, services.scheduler.clone(), services.transport.clone(), config),
        );
        page.record("magnetic", Ok(magnetic::install(host, services.animator.clone(), config)));

        log_event(
            LogLevel::Info,
            "page_ready",
            json!({ "installed": page.installed, "skipped": page.skipped }),
        );
        page
    }

    #[cfg(test)]
    pub(crate) fn installed(&self) -> &[&'static str] {
        &self.installed
    }

    #[cfg(test)]
    pub(crate) fn skipped(&self) -> &[&'static str] {
        &self.skipped
    }

    fn record<T>(&mut self, effect: &'static str, outcome: Result<T, EffectError>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.installed.push(effect);
                Some(value)
            }
            Err(error) => {
                let level = if error.is_missing_element() {
                    LogLevel::Debug
                } else {
                    LogLevel::Warn
                };
                log_event(
                    level,
                    "effect_skipped",
                    json!({ "effect": effect, "error": error.to_string() }),
                );
                self.skipped.push(effect);
                None
            }
        }
    }
}
