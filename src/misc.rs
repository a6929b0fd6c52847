use colored::*;
use log::kv::Key;
use log::{Level, LevelFilter, Metadata, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    // Rows grow downward
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

pub struct Logger {
    pub level: LevelFilter,
    pub once_only_logs: Mutex<HashSet<String>>,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level, once_only_logs: Mutex::new(HashSet::new()) }
    }

    // Keep track of unique logs with the "once" attribute, and only ever print them once
    fn first_time(&self, record: &Record) -> bool {
        let once = record.key_values().get(Key::from("once")).and_then(|v| v.to_bool());
        if once != Some(true) {
            return true;
        }
        // A poisoned set only means another thread panicked mid-insert; the set is still usable
        let mut onces = self.once_only_logs.lock().unwrap_or_else(|e| e.into_inner());
        onces.insert(record.args().to_string())
    }
}

impl log::Log for Logger {
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || !self.first_time(record) {
            return;
        }

        let colored_level = match record.level() {
            x @ Level::Error => x.as_str().red(),
            x @ Level::Warn => x.as_str().yellow(),
            x @ Level::Debug | x @ Level::Trace => x.as_str().dimmed(),
            x => x.as_str().normal(),
        };

        println!("[{}] {}", colored_level, record.args());
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn flush(&self) {}
}

pub fn init_logger(level: LevelFilter) -> anyhow::Result<()> {
    log::set_boxed_logger(Box::new(Logger::new(level)))
        .map_err(|e| anyhow::anyhow!("logger already installed: {e}"))?;
    log::set_max_level(level);
    Ok(())
}
