//! Debug logging for quiet failure paths.
//!
//! The engine owns the terminal, so diagnostics cannot go to the screen.
//! When the `CCLI_DEBUG` environment variable is set to `1` or `true`,
//! messages are appended to a log file instead; otherwise logging is a
//! no-op. Used for swallowed escape sequences and discarded display-path
//! write errors.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();
static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

const ENV_ENABLE_LOG: &str = "CCLI_DEBUG";

fn init_logger() {
    INIT.call_once(|| {
        if let Ok(val) = std::env::var(ENV_ENABLE_LOG) {
            if val == "true" || val == "1" {
                let log_path = "/tmp/ccli-debug.log";
                match OpenOptions::new().create(true).append(true).open(log_path) {
                    Ok(file) => {
                        *LOG_FILE.lock().unwrap() = Some(file);
                        eprintln!("ccli debug log enabled: {log_path}");
                    }
                    Err(e) => {
                        eprintln!("Failed to open debug log file {log_path}: {e}");
                    }
                }
            }
        }
    });
}

pub fn write_log(msg: &str) {
    init_logger();

    if let Ok(mut log_file_guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *log_file_guard {
            let _ = writeln!(file, "{msg}");
            let _ = file.flush();
        }
    }
}

#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::debug::write_log(&format!($($arg)*));
        }
    };
}
