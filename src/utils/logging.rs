//! Wraps `flexi_logger` init/shutdown so both binaries (`graphdb-cli`,
//! `graphdb-server`) share one setup path driven by `Config`'s
//! `log_level`/`log_dir`/`log_file`.

use crate::config::Config;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::sync::Mutex;

static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let handle = Logger::try_with_str(&config.log_level)?
        .log_to_file(FileSpec::default().basename(&config.log_file).directory(&config.log_dir))
        .rotate(Criterion::Size(100 * 1024 * 1024), Naming::Numbers, Cleanup::KeepLogFiles(5))
        .write_mode(WriteMode::Async)
        .append()
        .start()?;
    *LOGGER_HANDLE.lock().unwrap() = Some(handle);
    log::info!("logging initialized: {}/{}", config.log_dir, config.log_file);
    Ok(())
}

/// Flushes and drops the logger handle. Call before process exit so async
/// log writes are not lost.
pub fn shutdown() {
    if let Some(handle) = LOGGER_HANDLE.lock().unwrap().take() {
        handle.flush();
    }
}

pub fn is_initialized() -> bool {
    LOGGER_HANDLE.lock().unwrap().is_some()
}
