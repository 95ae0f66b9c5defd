use std::sync::atomic::{AtomicU8, Ordering};

pub(crate) const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

static LOG_THRESHOLD: AtomicU8 = AtomicU8::new(DEFAULT_LOG_LEVEL as u8);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
}

impl LogLevel {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            _ => None,
        }
    }

    fn from_rank(rank: u8) -> Self {
        match rank {
            0 => Self::Debug,
            1 => Self::Info,
            _ => Self::Warn,
        }
    }
}

pub(crate) fn set_threshold(level: LogLevel) {
    LOG_THRESHOLD.store(level as u8, Ordering::Relaxed);
}

pub(crate) fn threshold() -> LogLevel {
    LogLevel::from_rank(LOG_THRESHOLD.load(Ordering::Relaxed))
}

pub(crate) fn log_event(level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < threshold() {
        return;
    }

    let line = render_line(now_unix_millis(), level, event, fields);
    emit(level, &line);
}

fn render_line(ts: u64, level: LogLevel, event: &str, fields: serde_json::Value) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(ts)),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    serde_json::Value::Object(payload).to_string()
}

#[cfg(target_arch = "wasm32")]
fn emit(level: LogLevel, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        LogLevel::Warn => web_sys::console::warn_1(&value),
        _ => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(level: LogLevel, line: &str) {
    match level {
        LogLevel::Warn => eprintln!("{line}"),
        _ => println!("{line}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn now_unix_millis() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_unix_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as u64)
        .unwrap_or(0)
}
