use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

const LOG_FILE_NAME: &str = "confluence-crx.log";
const ARCHIVE_PREFIX: &str = "confluence-crx-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static LOGGER: OnceLock<FileLogger> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let line = format_line(now_secs(), record);
        let _ = file.write_all(line.as_bytes());
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_line(ts: u64, record: &Record) -> String {
    format!(
        "[{ts}] [{}] [{}] {}\n",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Routes the `log` macros to `<log_dir>/confluence-crx.log`.
///
/// Only the first call installs a logger; later calls are no-ops.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    if LOGGER
        .set(FileLogger {
            file: Mutex::new(file),
            level,
        })
        .is_ok()
    {
        if let Some(logger) = LOGGER.get() {
            if log::set_logger(logger).is_ok() {
                log::set_max_level(level);
            }
        }
    }

    install_panic_hook();
    Ok(log_path)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let archived = log_dir.join(format!("{ARCHIVE_PREFIX}{}.log", now_secs()));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.drain(..excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            log::error!("panic at {location}: {payload}");
            log::logger().flush();
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::{format_line, prune_old_archives, rotate_if_needed, LOG_FILE_NAME, MAX_ARCHIVES, MAX_LOG_BYTES};

    #[test]
    fn line_carries_level_and_target() {
        let line = format_line(
            7,
            &log::Record::builder()
                .level(log::Level::Warn)
                .target("confluence_crx_core::label_dictionary")
                .args(format_args!("reset"))
                .build(),
        );
        assert_eq!(line, "[7] [WARN] [confluence_crx_core::label_dictionary] reset\n");
    }

    #[test]
    fn oversized_log_is_archived() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join(LOG_FILE_NAME);
        std::fs::write(&log_path, vec![b'x'; MAX_LOG_BYTES as usize]).unwrap();

        rotate_if_needed(&log_path, dir.path()).unwrap();

        assert!(!log_path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn keeps_newest_archives_only() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in 0..(MAX_ARCHIVES + 3) {
            std::fs::write(dir.path().join(format!("confluence-crx-{stamp:04}.log")), b"").unwrap();
        }

        prune_old_archives(dir.path()).unwrap();

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left.len(), MAX_ARCHIVES);
        assert_eq!(left[0], "confluence-crx-0003.log");
    }
}
