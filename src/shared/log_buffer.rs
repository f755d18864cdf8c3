// ============================================================
// LOG BUFFER
// ============================================================
// Caller-owned log sink passed explicitly to every operation

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Entries kept per buffer; older entries are dropped first
pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub type LogBuffer = Mutex<Vec<LogEntry>>;

/// Record an entry in `logs` and forward it to `tracing`
pub fn add_log_entry(logs: &LogBuffer, level: &str, source: &str, message: &str) -> LogEntry {
    match level {
        "ERROR" => error!(component = source, "{}", message),
        "WARN" => warn!(component = source, "{}", message),
        "DEBUG" => debug!(component = source, "{}", message),
        _ => info!(component = source, "{}", message),
    }

    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    // A panic in another holder must not silence later requests.
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &LogBuffer, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Install a fmt subscriber filtered by `filter` (e.g. "info", "tabprobe=debug")
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_keeps_most_recent_entries() {
        let logs: LogBuffer = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "TEST", &format!("entry {}", i));
        }

        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
        assert_eq!(logs.last().unwrap().message, format!("entry {}", MAX_LOG_ENTRIES + 4));
    }

    #[test]
    fn test_entry_fields() {
        init_tracing("debug");
        let logs: LogBuffer = Mutex::new(Vec::new());
        let entry = add_log_entry(&logs, "WARN", "ENCODING", "low confidence");

        assert_eq!(entry.level, "WARN");
        assert_eq!(entry.source, "ENCODING");
        assert_eq!(entry.time.len(), 8);
    }
}
