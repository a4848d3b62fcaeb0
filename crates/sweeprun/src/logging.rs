use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum log file size before rotation (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Size to keep after rotation (1 MB of most recent logs)
const KEEP_SIZE: u64 = 1024 * 1024;

const ROTATED_MARKER: &[u8] = b"--- Log rotated (older entries removed) ---\n";

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error; unusable while the live view owns the terminal
    Stderr,
    File(PathBuf),
}

/// Cut the log down to its last `keep_size` bytes once it grows past
/// `max_size`, starting at a line boundary.
fn rotate_log(log_path: &Path, max_size: u64, keep_size: u64) -> io::Result<()> {
    let len = match fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if len <= max_size {
        return Ok(());
    }

    let mut tail = Vec::new();
    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(len.saturating_sub(keep_size)))?;
    file.read_to_end(&mut tail)?;

    let first_line = tail.iter().position(|&b| b == b'\n').map_or(0, |i| i + 1);
    fs::write(log_path, [ROTATED_MARKER, &tail[first_line..]].concat())
}

/// Default filter when `RUST_LOG` is not set
fn default_filter(level: &str) -> String {
    format!("sweeprun={level},sweeprun_core={level}")
}

/// Initialize logging.
///
/// File logs are appended with size-based rotation: when the log exceeds 5MB,
/// older entries are removed keeping only the last 1MB. The level can be
/// overridden with the `RUST_LOG` environment variable.
pub fn init_logging(target: &LogTarget, level: &str) -> color_eyre::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(false),
                )
                .init();
        }
        LogTarget::File(log_path) => {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }

            if let Err(e) = rotate_log(log_path, MAX_LOG_SIZE, KEEP_SIZE) {
                eprintln!("Warning: failed to rotate log file: {e}");
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(false),
                )
                .init();

            tracing::info!("sweeprun logging initialized (log_path={})", log_path.display());
        }
    }

    Ok(())
}
