//! Subscriber setup: a human-readable console layer on stderr plus optional
//! JSON file layers, each filtered per target prefix.

use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;

use crate::config::{LoggingConfig, Section};

const CATCH_ALL: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 10;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// `None` switches the sink off. Unrecognised names fall back to info.
fn parse_level(raw: &str) -> Option<tracing::Level> {
    use tracing::Level;
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => return None,
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    Some(level)
}

fn as_filter(raw: &str) -> LevelFilter {
    parse_level(raw).map_or(LevelFilter::OFF, LevelFilter::from_level)
}

/// `birthday_sync` owns `birthday_sync` and `birthday_sync::*`, not `birthday_sync_cli`.
fn owns_target(prefix: &str, target: &str) -> bool {
    match target.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with("::"),
        None => false,
    }
}

/// Shared handle on one rotating log file.
#[derive(Clone)]
struct RotatingSink(Arc<Mutex<FileRotate<AppendCount>>>);

impl RotatingSink {
    fn open(path: &Path, max_bytes: usize, max_backups: usize) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendCount::new(max_backups),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Per-event writer; without a sink the bytes are swallowed.
struct EventWriter(Option<RotatingSink>);

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.0 {
            Some(sink) => sink.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(sink) => sink.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the file for an event by target prefix, else the catch-all file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingSink>,
    by_prefix: HashMap<String, RotatingSink>,
}

impl FileRouter {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = Self::default();
        for (name, section) in cfg {
            let Some(sink) = open_section_file(name, section, base_dir) else {
                continue;
            };
            if name == CATCH_ALL {
                router.default = Some(sink);
            } else {
                router.by_prefix.insert(name.clone(), sink);
            }
        }
        router
    }

    fn resolve_for(&self, target: &str) -> Option<RotatingSink> {
        self.by_prefix
            .iter()
            .find_map(|(prefix, sink)| owns_target(prefix, target).then(|| sink.clone()))
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        EventWriter(self.resolve_for(meta.target()))
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// A file that cannot be opened costs only that sink; the message goes to
/// stderr because no subscriber exists yet.
fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<RotatingSink> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    RotatingSink::open(&path, max_bytes as usize, max_backups)
        .map_err(|e| eprintln!("Failed to init log file for '{name}': {} ({e})", path.display()))
        .ok()
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let fallback = cfg
        .get(CATCH_ALL)
        .map_or(LevelFilter::OFF, |s| as_filter(&s.console_level));
    cfg.iter()
        .filter(|(name, _)| *name != CATCH_ALL)
        .fold(Targets::new().with_default(fallback), |targets, (name, s)| {
            targets.with_target(name.clone(), as_filter(&s.console_level))
        })
}

fn file_targets(cfg: &LoggingConfig, router: &FileRouter) -> Targets {
    let fallback = match cfg.get(CATCH_ALL) {
        Some(s) if router.default.is_some() => as_filter(&s.file_level),
        _ => LevelFilter::OFF,
    };
    cfg.iter()
        .filter(|(name, _)| *name != CATCH_ALL)
        .fold(Targets::new().with_default(fallback), |targets, (name, s)| {
            // no own file and no catch-all file: nowhere to write
            let writable = !s.file.trim().is_empty() || router.default.is_some();
            let level = if writable {
                as_filter(&s.file_level)
            } else {
                LevelFilter::OFF
            };
            targets.with_target(name.clone(), level)
        })
}

/// Install the global subscriber. Relative log files resolve against
/// `base_dir` (the app home dir). Calling twice is harmless.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::Registry;

    // `log` records from dependencies become tracing events
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_writer(io::stderr)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::build(cfg, base_dir);
    let files = (!router.is_empty()).then(|| {
        let targets = file_targets(cfg, &router);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(targets)
    });

    let _ = Registry::default().with(console).with(files).try_init();
}
