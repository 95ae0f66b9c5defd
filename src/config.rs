use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::logging::{log_event, LogLevel, DEFAULT_LOG_LEVEL};

pub(crate) const CONFIG_ELEMENT_ID: &str = "effects-config";

const DEFAULT_PRELOADER_TICK_MS: u32 = 100;
const DEFAULT_PRELOADER_MIN_STEP: f64 = 1.0;
const DEFAULT_PRELOADER_MAX_STEP: f64 = 15.0;
const DEFAULT_PRELOADER_GRACE_MS: u32 = 500;
const DEFAULT_ANCHOR_OFFSET: f64 = 100.0;
const DEFAULT_SCROLLED_THRESHOLD: f64 = 50.0;
const DEFAULT_SECTION_LOOKAHEAD: f64 = 200.0;
const DEFAULT_TYPING_START_MS: u32 = 1_500;
const DEFAULT_TYPING_TYPE_MS: u32 = 100;
const DEFAULT_TYPING_DELETE_MS: u32 = 50;
const DEFAULT_TYPING_HOLD_MS: u32 = 2_000;
const DEFAULT_TYPING_NEXT_MS: u32 = 500;
const DEFAULT_COUNTER_DURATION_MS: u32 = 2_000;
const DEFAULT_COUNTER_STEPS: u32 = 50;
const DEFAULT_SKILL_BAR_DELAY_MS: u32 = 200;
const DEFAULT_SUBMIT_DELAY_MS: u32 = 2_000;
const DEFAULT_SUBMIT_RESTORE_MS: u32 = 3_000;
const DEFAULT_MAGNETIC_STRENGTH: f64 = 0.3;
const DEFAULT_TYPING_PHRASES: [&str; 4] = [
    "Frontend Developer",
    "UI/UX Designer",
    "React Specialist",
    "Web Architect",
];

const TICK_MS_BOUNDS: (u32, u32) = (10, 5_000);
const STEP_BOUNDS: (f64, f64) = (0.1, 100.0);
const DELAY_MS_BOUNDS: (u32, u32) = (0, 60_000);
const OFFSET_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const COUNTER_STEPS_BOUNDS: (u32, u32) = (1, 1_000);
const MAGNETIC_STRENGTH_BOUNDS: (f64, f64) = (0.0, 1.0);

/// Timing and geometry knobs for the effects layer.
///
/// Every key is optional. A key with the wrong type or a value outside its
/// bounds falls back to its own default; the other keys are unaffected.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EffectsConfig {
    pub log_level: LogLevel,
    pub preloader_tick_ms: u32,
    pub preloader_min_step: f64,
    pub preloader_max_step: f64,
    pub preloader_grace_ms: u32,
    pub anchor_offset: f64,
    pub scrolled_threshold: f64,
    pub section_lookahead: f64,
    pub typing_phrases: Vec<String>,
    pub typing_start_ms: u32,
    pub typing_type_ms: u32,
    pub typing_delete_ms: u32,
    pub typing_hold_ms: u32,
    pub typing_next_ms: u32,
    pub counter_duration_ms: u32,
    pub counter_steps: u32,
    pub skill_bar_delay_ms: u32,
    pub submit_delay_ms: u32,
    pub submit_restore_ms: u32,
    pub magnetic_strength: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL,
            preloader_tick_ms: DEFAULT_PRELOADER_TICK_MS,
            preloader_min_step: DEFAULT_PRELOADER_MIN_STEP,
            preloader_max_step: DEFAULT_PRELOADER_MAX_STEP,
            preloader_grace_ms: DEFAULT_PRELOADER_GRACE_MS,
            anchor_offset: DEFAULT_ANCHOR_OFFSET,
            scrolled_threshold: DEFAULT_SCROLLED_THRESHOLD,
            section_lookahead: DEFAULT_SECTION_LOOKAHEAD,
            typing_phrases: DEFAULT_TYPING_PHRASES.iter().map(ToString::to_string).collect(),
            typing_start_ms: DEFAULT_TYPING_START_MS,
            typing_type_ms: DEFAULT_TYPING_TYPE_MS,
            typing_delete_ms: DEFAULT_TYPING_DELETE_MS,
            typing_hold_ms: DEFAULT_TYPING_HOLD_MS,
            typing_next_ms: DEFAULT_TYPING_NEXT_MS,
            counter_duration_ms: DEFAULT_COUNTER_DURATION_MS,
            counter_steps: DEFAULT_COUNTER_STEPS,
            skill_bar_delay_ms: DEFAULT_SKILL_BAR_DELAY_MS,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            submit_restore_ms: DEFAULT_SUBMIT_RESTORE_MS,
            magnetic_strength: DEFAULT_MAGNETIC_STRENGTH,
        }
    }
}

impl EffectsConfig {
    /// Parses the inline JSON block, if the page carries one.
    pub(crate) fn from_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(fields) => Self::from_fields(&fields),
            Err(error) => {
                log_event(
                    LogLevel::Warn,
                    "config_parse_failed",
                    json!({ "error": error.to_string() }),
                );
                Self::default()
            }
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        let defaults = Self::default();

        let log_level = field::<String>(fields, "logLevel")
            .and_then(|value| LogLevel::parse(&value))
            .unwrap_or(defaults.log_level);

        let phrases: Vec<String> = field::<Vec<String>>(fields, "typingPhrases")
            .unwrap_or_default()
            .into_iter()
            .map(|phrase| phrase.trim().to_string())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        let typing_phrases = if phrases.is_empty() { defaults.typing_phrases } else { phrases };

        let mut preloader_min_step =
            f64_field(fields, "preloaderMinStep", defaults.preloader_min_step, STEP_BOUNDS);
        let mut preloader_max_step =
            f64_field(fields, "preloaderMaxStep", defaults.preloader_max_step, STEP_BOUNDS);
        if preloader_min_step > preloader_max_step {
            preloader_min_step = defaults.preloader_min_step;
            preloader_max_step = defaults.preloader_max_step;
        }

        Self {
            log_level,
            preloader_tick_ms: u32_field(
                fields,
                "preloaderTickMs",
                defaults.preloader_tick_ms,
                TICK_MS_BOUNDS,
            ),
            preloader_min_step,
            preloader_max_step,
            preloader_grace_ms: u32_field(
                fields,
                "preloaderGraceMs",
                defaults.preloader_grace_ms,
                DELAY_MS_BOUNDS,
            ),
            anchor_offset: f64_field(
                fields,
                "anchorOffset",
                defaults.anchor_offset,
                OFFSET_BOUNDS,
            ),
            scrolled_threshold: f64_field(
                fields,
                "scrolledThreshold",
                defaults.scrolled_threshold,
                OFFSET_BOUNDS,
            ),
            section_lookahead: f64_field(
                fields,
                "sectionLookahead",
                defaults.section_lookahead,
                OFFSET_BOUNDS,
            ),
            typing_phrases,
            typing_start_ms: u32_field(
                fields,
                "typingStartMs",
                defaults.typing_start_ms,
                DELAY_MS_BOUNDS,
            ),
            typing_type_ms: u32_field(
                fields,
                "typingTypeMs",
                defaults.typing_type_ms,
                TICK_MS_BOUNDS,
            ),
            typing_delete_ms: u32_field(
                fields,
                "typingDeleteMs",
                defaults.typing_delete_ms,
                TICK_MS_BOUNDS,
            ),
            typing_hold_ms: u32_field(
                fields,
                "typingHoldMs",
                defaults.typing_hold_ms,
                DELAY_MS_BOUNDS,
            ),
            typing_next_ms: u32_field(
                fields,
                "typingNextMs",
                defaults.typing_next_ms,
                DELAY_MS_BOUNDS,
            ),
            counter_duration_ms: u32_field(
                fields,
                "counterDurationMs",
                defaults.counter_duration_ms,
                DELAY_MS_BOUNDS,
            ),
            counter_steps: u32_field(
                fields,
                "counterSteps",
                defaults.counter_steps,
                COUNTER_STEPS_BOUNDS,
            ),
            skill_bar_delay_ms: u32_field(
                fields,
                "skillBarDelayMs",
                defaults.skill_bar_delay_ms,
                DELAY_MS_BOUNDS,
            ),
            submit_delay_ms: u32_field(
                fields,
                "submitDelayMs",
                defaults.submit_delay_ms,
                DELAY_MS_BOUNDS,
            ),
            submit_restore_ms: u32_field(
                fields,
                "submitRestoreMs",
                defaults.submit_restore_ms,
                DELAY_MS_BOUNDS,
            ),
            magnetic_strength: f64_field(
                fields,
                "magneticStrength",
                defaults.magnetic_strength,
                MAGNETIC_STRENGTH_BOUNDS,
            ),
        }
    }

    /// Interval between counter steps; never zero so the interval cannot spin.
    pub(crate) fn counter_step_ms(&self) -> u32 {
        (self.counter_duration_ms / self.counter_steps.max(1)).max(1)
    }
}

/// Reads one key; a value of the wrong shape is logged and treated as absent.
fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "config_field_ignored",
                json!({ "key": key, "error": error.to_string() }),
            );
            None
        }
    }
}

fn u32_field(fields: &Map<String, Value>, key: &str, default: u32, bounds: (u32, u32)) -> u32 {
    field::<u32>(fields, key)
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn f64_field(fields: &Map<String, Value>, key: &str, default: f64, bounds: (f64, f64)) -> f64 {
    field::<f64>(fields, key)
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
