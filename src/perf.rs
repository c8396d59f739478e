//! Replay timing and the `--trace-log` sync timeline.
//!
//! The timeline holds one line per [`SyncEvent`], stamped with the
//! controller's logical clock rather than wall time, so replaying the same
//! script writes the same log.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::editor::ChangeKind;
use crate::note::{DeleteReason, NoteId};
use crate::ports::RequestId;
use crate::sync::debounce::TimerId;

static ENABLED: AtomicBool = AtomicBool::new(false);
static TIMELINE: LazyLock<Mutex<Option<Timeline<BufWriter<File>>>>> =
    LazyLock::new(|| Mutex::new(None));

/// Something the controller did, as it appears on the timeline.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    Mount {
        note: Option<&'a NoteId>,
        debounce_ms: u64,
    },
    Change(ChangeKind),
    Settle {
        timer: TimerId,
        focused: bool,
    },
    Create {
        request: RequestId,
        origin: &'a str,
    },
    Update {
        request: RequestId,
        id: &'a NoteId,
        len: usize,
    },
    Delete {
        request: RequestId,
        id: &'a NoteId,
        reason: DeleteReason,
    },
    Focus(&'a NoteId),
    Push {
        len: usize,
    },
    Append {
        len: usize,
    },
    Teardown,
}

impl SyncEvent<'_> {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mount { .. } => "sync.mount",
            Self::Change(_) => "sync.change",
            Self::Settle { .. } => "sync.settle",
            Self::Create { .. } => "store.create",
            Self::Update { .. } => "store.update",
            Self::Delete { .. } => "store.delete",
            Self::Focus(_) => "store.focus",
            Self::Push { .. } => "sync.push",
            Self::Append { .. } => "sync.append",
            Self::Teardown => "sync.teardown",
        }
    }
}

impl fmt::Display for SyncEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mount {
                note: Some(id),
                debounce_ms,
            } => write!(f, "note={id} debounce_ms={debounce_ms}"),
            Self::Mount {
                note: None,
                debounce_ms,
            } => write!(f, "draft debounce_ms={debounce_ms}"),
            Self::Change(kind) => write!(f, "kind={kind:?}"),
            Self::Settle { timer, focused } => write!(f, "timer={} focused={focused}", timer.0),
            Self::Create { request, origin } => write!(f, "request={} origin={origin}", request.0),
            Self::Update { request, id, len } => {
                write!(f, "request={} id={id} len={len}", request.0)
            }
            Self::Delete {
                request,
                id,
                reason,
            } => write!(f, "request={} id={id} reason={}", request.0, reason.as_str()),
            Self::Focus(id) => write!(f, "id={id}"),
            Self::Push { len } | Self::Append { len } => write!(f, "len={len}"),
            Self::Teardown => Ok(()),
        }
    }
}

/// Writes timeline lines to `W`.
#[derive(Debug)]
struct Timeline<W: Write> {
    writer: W,
    events: u64,
}

impl<W: Write> Timeline<W> {
    fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "notesync timeline")?;
        Ok(Self { writer, events: 0 })
    }

    fn record(&mut self, at_ms: u64, event: &SyncEvent<'_>) -> io::Result<()> {
        let line = format!("{at_ms:>8} ms  {:<13} {event}", event.name());
        writeln!(self.writer, "{}", line.trim_end())?;
        self.events += 1;
        Ok(())
    }
}

fn timeline() -> MutexGuard<'static, Option<Timeline<BufWriter<File>>>> {
    TIMELINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Times a region of the replay; logs on drop when enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if !is_enabled() {
            return;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(target: "notesync::perf", "{}: {:.2} ms", self.name, elapsed_ms);
    }
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Start writing the timeline to `path`, replacing any open one.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn open_timeline(path: &Path) -> io::Result<()> {
    let opened = Timeline::new(BufWriter::new(File::create(path)?))?;
    *timeline() = Some(opened);
    Ok(())
}

/// Flush and close the timeline, returning how many events it holds.
///
/// # Errors
/// Returns an error if the buffered lines cannot be written out.
pub fn close_timeline() -> io::Result<Option<u64>> {
    let Some(mut closed) = timeline().take() else {
        return Ok(None);
    };
    closed.writer.flush()?;
    Ok(Some(closed.events))
}

/// Append `event` at logical time `at_ms` if a timeline is open.
///
/// A write failure closes the timeline.
pub fn record(at_ms: u64, event: &SyncEvent<'_>) {
    let mut guard = timeline();
    let failed = guard.as_mut().and_then(|open| open.record(at_ms, event).err());
    if let Some(err) = failed {
        tracing::warn!(%err, "trace log write failed, closing it");
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_timeline_lines_use_logical_clock() {
        let id = NoteId::new("note-1");
        let mut timeline = Timeline::new(Vec::new()).unwrap();
        timeline
            .record(
                50,
                &SyncEvent::Create {
                    request: RequestId(1),
                    origin: "sidebar",
                },
            )
            .unwrap();
        timeline.record(60, &SyncEvent::Focus(&id)).unwrap();
        timeline.record(900, &SyncEvent::Teardown).unwrap();
        assert_eq!(timeline.events, 3);

        let text = String::from_utf8(timeline.writer).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "notesync timeline",
                "      50 ms  store.create  request=1 origin=sidebar",
                "      60 ms  store.focus   id=note-1",
                "     900 ms  sync.teardown",
            ]
        );
    }

    #[test]
    fn test_settle_and_delete_details() {
        let id = NoteId::new("n1");
        let settle = SyncEvent::Settle {
            timer: TimerId(4),
            focused: false,
        };
        assert_eq!(settle.to_string(), "timer=4 focused=false");
        let delete = SyncEvent::Delete {
            request: RequestId(2),
            id: &id,
            reason: DeleteReason::FromBlankNote,
        };
        assert_eq!(delete.to_string(), "request=2 id=n1 reason=from-blank-note");
        let mount = SyncEvent::Mount {
            note: None,
            debounce_ms: 50,
        };
        assert_eq!(mount.to_string(), "draft debounce_ms=50");
    }

    #[test]
    fn test_open_timeline_writes_file() {
        let temp_file = NamedTempFile::new().unwrap();
        open_timeline(temp_file.path()).unwrap();
        record(50, &SyncEvent::Push { len: 12 });
        let events = close_timeline().unwrap().unwrap();
        assert!(events >= 1);
        assert!(close_timeline().unwrap().is_none());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.starts_with("notesync timeline"));
        assert!(content.contains("      50 ms  sync.push     len=12"));
    }
}
