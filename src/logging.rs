use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STOPWATCH_LOG";
const LOG_FILE: &str = "stopwatch.log";

/// Route `log` records to a file under `data_dir`. The terminal belongs to
/// the stopwatch display, so if the file cannot be opened logging stays off.
pub fn init(data_dir: &Path) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file = match open_log_file(data_dir) {
        Ok(file) => file,
        Err(_) => return,
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if installed.is_ok() {
        log::info!("logging to {}", data_dir.join(LOG_FILE).display());
    }
}

fn open_log_file(data_dir: &Path) -> io::Result<File> {
    fs::create_dir_all(data_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))
}
