// Console Logging
// File logger that also republishes records on the event bus

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::json;

use crate::services::EventSink;

pub const LOG_FILE_NAME: &str = "blog-console.log";
pub const LOG_EVENT: &str = "log://log";

pub struct ConsoleLogger<S: EventSink> {
    file: Mutex<File>,
    sink: S,
    level: LevelFilter,
}

impl<S: EventSink> ConsoleLogger<S> {
    pub fn new(log_dir: &Path, sink: S, level: LevelFilter) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(LOG_FILE_NAME))?;
        Ok(Self {
            file: Mutex::new(file),
            sink,
            level,
        })
    }
}

fn format_line(record: &Record) -> String {
    let timestamp = Local::now();
    let date = timestamp.format("%Y-%m-%d");
    let time = timestamp.format("%H:%M:%S");
    format!(
        "[{date}][{time}][{}][{}] {}",
        record.target(),
        record.level(),
        record.args()
    )
}

fn level_number(level: Level) -> u8 {
    match level {
        Level::Error => 1,
        Level::Warn => 2,
        Level::Info => 3,
        Level::Debug => 4,
        Level::Trace => 5,
    }
}

impl<S: EventSink> Log for ConsoleLogger<S> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Ok(mut file) = self.file.try_lock() {
            let _ = writeln!(file, "{}", format_line(record));
        }

        self.sink.emit(
            LOG_EVENT,
            json!({
                "level": level_number(record.level()),
                "message": record.args().to_string(),
                "target": record.target(),
            }),
        );
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install the console logger as the global `log` backend
pub fn init_logger<S: EventSink + 'static>(
    log_dir: &Path,
    sink: S,
    level: LevelFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let logger = ConsoleLogger::new(log_dir, sink, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::EventBus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_logger_writes_file_and_publishes() {
        let temp = tempdir().unwrap();
        let bus = EventBus::new();
        let published = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&published);
        let _subscription = bus.subscribe(LOG_EVENT, move |payload| {
            assert_eq!(payload["level"], 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let logger = ConsoleLogger::new(temp.path(), bus.clone(), LevelFilter::Warn).unwrap();
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .target("blog_console::test")
                .args(format_args!("quota exceeded"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("filtered out"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        assert!(content.contains("[blog_console::test][WARN] quota exceeded"));
        assert!(!content.contains("filtered out"));
        assert_eq!(published.load(Ordering::SeqCst), 1);
    }
}
