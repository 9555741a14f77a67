//! Append-only journal file shared by the timer loop and the shutdown
//! watcher. Entries are human-readable lines of the form
//! `"2026-08-26 17:03:12 | INFO    | message"`, appended to one file per
//! calendar year. A journal never fails its caller: write errors disable it
//! for the rest of the run with a console warning.

use std::{
    fmt::Display,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use chrono::Local;

/// Severity of a journal entry. `None` as a minimum level disables the
/// journal entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    None,
}

impl Level {
    fn name(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::None => "NONE",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "none" => Ok(Level::None),
            other => bail!("unknown journal level \"{other}\""),
        }
    }
}

// Entries align their message column to the widest level name, WARNING.
const LEVEL_COLUMN_WIDTH: usize = 7;

/// An explicitly constructed journal instance. Shared as `Arc<Journal>`
/// between the timer loop and the shutdown watcher; the inner mutex
/// serializes access to the single file handle.
pub struct Journal {
    inner: Mutex<JournalInner>,
}

struct JournalInner {
    min_level: Level,
    writer: Option<Box<dyn Write + Send>>,
    smart_flush: bool,
}

impl Journal {
    /// Opens `path` for appending, creating parent directories as needed.
    /// Also reports whether the file had to be created.
    pub fn open(path: &Path, min_level: Level) -> Result<(Journal, bool)> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating journal directory {}", parent.display()))?;
        }
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening journal file {}", path.display()))?;
        Ok((
            Journal::from_writer(Box::new(BufWriter::new(file)), min_level),
            is_new,
        ))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>, min_level: Level) -> Journal {
        Journal {
            inner: Mutex::new(JournalInner {
                min_level,
                writer: Some(writer),
                smart_flush: false,
            }),
        }
    }

    /// A journal that silently drops every entry. Used when logging is
    /// turned off for the run.
    pub fn disabled() -> Journal {
        Journal {
            inner: Mutex::new(JournalInner {
                min_level: Level::None,
                writer: None,
                smart_flush: false,
            }),
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        self.lock_inner().write_entry(level, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn min_level(&self) -> Level {
        self.lock_inner().min_level
    }

    /// Switches between flushing after every entry (default) and deferring
    /// flushes to close time. Deferred flushing is not wired to any CLI
    /// option yet.
    pub fn set_smart_flush(&self, enabled: bool) {
        self.lock_inner().smart_flush = enabled;
    }

    /// Flushes and releases the file handle. Entries logged afterwards are
    /// dropped with a console warning, so the shutdown watcher may still
    /// fire after close without breaking anything.
    pub fn close(&self) {
        let mut inner = self.lock_inner();
        if let Some(mut writer) = inner.writer.take() {
            if let Err(e) = writer.flush() {
                eprintln!("Could not flush the journal on close: {e}");
            }
        }
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, JournalInner> {
        // A poisoned lock only means another thread panicked mid-write;
        // the journal keeps going on a best-effort basis.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl JournalInner {
    fn write_entry(&mut self, level: Level, message: &str) {
        if level == Level::None || level < self.min_level {
            return;
        }

        let Some(writer) = self.writer.as_mut() else {
            eprintln!("Warning! Journal entry dropped because the journal is not open.");
            return;
        };

        let result = writeln!(
            writer,
            "{} | {:<width$} | {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message,
            width = LEVEL_COLUMN_WIDTH,
        )
        .and_then(|_| {
            if self.smart_flush {
                Ok(())
            } else {
                writer.flush()
            }
        });

        if let Err(e) = result {
            eprintln!("Could not write to the journal ({e}). Disabling the journal for this run.");
            self.min_level = Level::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{Journal, Level};

    /// Write sink that records everything passed to it.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk is gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk is gone"))
        }
    }

    #[test]
    fn entries_follow_the_line_format() {
        let buffer = SharedBuffer::default();
        let journal = Journal::from_writer(Box::new(buffer.clone()), Level::Debug);

        journal.info("Started timer.");
        journal.warning("Something looks off.");

        let contents = buffer.contents();
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);

        let fields = lines[0].split(" | ").collect::<Vec<_>>();
        assert_eq!(fields.len(), 3);
        // 2026-08-26 17:03:12
        assert_eq!(fields[0].len(), 19);
        assert_eq!(fields[1], "INFO   ");
        assert_eq!(fields[2], "Started timer.");

        assert_eq!(lines[1].split(" | ").nth(1).unwrap(), "WARNING");
    }

    #[test]
    fn entries_below_the_minimum_level_are_dropped() {
        let buffer = SharedBuffer::default();
        let journal = Journal::from_writer(Box::new(buffer.clone()), Level::Warning);

        journal.debug("dropped");
        journal.info("dropped");
        assert_eq!(buffer.contents(), "");

        journal.warning("kept");
        journal.error("kept");
        assert_eq!(buffer.contents().lines().count(), 2);
    }

    #[test]
    fn minimum_level_none_disables_everything() {
        let buffer = SharedBuffer::default();
        let journal = Journal::from_writer(Box::new(buffer.clone()), Level::None);

        journal.error("dropped");
        journal.log(Level::None, "dropped");

        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn write_failure_degrades_to_none() {
        let journal = Journal::from_writer(Box::new(FailingWriter), Level::Info);

        journal.info("this write fails");
        assert_eq!(journal.min_level(), Level::None);

        // Later calls are silent no-ops instead of errors.
        journal.error("ignored");
        assert_eq!(journal.min_level(), Level::None);
    }

    #[test]
    fn disabled_journal_drops_everything_silently() {
        let journal = Journal::disabled();
        journal.info("ignored");
        journal.error("ignored");
        assert_eq!(journal.min_level(), Level::None);
    }

    #[test]
    fn logging_after_close_does_not_write() {
        let buffer = SharedBuffer::default();
        let journal = Journal::from_writer(Box::new(buffer.clone()), Level::Debug);

        journal.info("before close");
        journal.close();
        journal.warning("after close");

        assert_eq!(buffer.contents().lines().count(), 1);
    }

    #[test]
    fn smart_flush_defers_until_close() {
        let buffer = SharedBuffer::default();
        let journal = Journal::from_writer(Box::new(buffer.clone()), Level::Debug);
        journal.set_smart_flush(true);

        journal.info("deferred");
        journal.close();

        // SharedBuffer receives writes immediately, so this only checks the
        // deferred path doesn't lose the entry.
        assert_eq!(buffer.contents().lines().count(), 1);
    }

    #[test]
    fn open_creates_directories_and_appends() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/logs/clockout_2026.log");

        let (journal, is_new) = Journal::open(&path, Level::Info)?;
        assert!(is_new);
        journal.info("first entry");
        journal.close();

        let (journal, is_new) = Journal::open(&path, Level::Info)?;
        assert!(!is_new);
        journal.info("second entry");
        journal.close();

        let contents = fs::read_to_string(&path)?;
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().next().unwrap().ends_with("| first entry"));
        Ok(())
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("None".parse::<Level>().unwrap(), Level::None);
        assert!("loud".parse::<Level>().is_err());
    }
}
