/// Log file persistence
///
/// Console lines are mirrored (without ANSI colors) into
/// `logs/defai_<date>.log` once `init_file_logging` has run.

use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const LOG_DIR: &str = "logs";

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

fn log_file_path() -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    PathBuf::from(LOG_DIR).join(format!("defai_{}.log", date))
}

/// Open the daily log file; logging stays console-only if this fails
pub fn init_file_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory {}: {}", LOG_DIR, e);
        return;
    }

    let path = log_file_path();
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            *LOG_FILE.lock() = Some(BufWriter::new(file));
        }
        Err(e) => eprintln!("Failed to open log file {}: {}", path.display(), e),
    }
}

pub fn write_to_file(line: &str) {
    let mut guard = LOG_FILE.lock();
    if let Some(writer) = guard.as_mut() {
        if writeln!(writer, "{}", line).is_err() {
            *guard = None;
        }
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_FILE.lock().as_mut() {
        let _ = writer.flush();
    }
}
