//! Batched, size-rotated log-file consumer.

use crate::config::Config;
use crate::consumer::Consumer;
use crate::error::{CoreError, CoreResult};
use crate::event::SerializedEvent;
use crate::logger::{diag_debug, diag_error, diag_info, diag_warn};
use dtrack_storage::{AppendStore, FileStore, StorageError};
use parking_lot::Mutex;
use regex::Regex;
use std::path::PathBuf;

/// Opens append stores for a rotation sequence.
///
/// Production uses [`LogDir`]; tests inject memory-backed openers so
/// rotation is observable without touching the filesystem.
pub(crate) trait StoreOpener: Send {
    /// Highest sequence number already present at the target, if any.
    fn latest_seq(&self) -> CoreResult<Option<u64>>;

    /// Opens the store for the given sequence number, creating it if
    /// missing.
    fn open(&self, seq: u64) -> CoreResult<Box<dyn AppendStore>>;
}

/// Opens `{prefix}-{seq}.log` files under a directory.
struct LogDir {
    dir: PathBuf,
    prefix: String,
}

impl LogDir {
    fn file_name(&self, seq: u64) -> String {
        format!("{}-{}.log", self.prefix, seq)
    }
}

impl StoreOpener for LogDir {
    fn latest_seq(&self) -> CoreResult<Option<u64>> {
        let pattern = format!("^{}-([0-9]+)\\.log$", regex::escape(&self.prefix));
        let re = Regex::new(&pattern).expect("sequence pattern is valid");

        // A missing directory just means no files yet.
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Ok(None);
        };

        let mut latest: Option<u64> = None;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(caps) = re.captures(name) else {
                continue;
            };
            if let Ok(seq) = caps[1].parse::<u64>() {
                latest = Some(latest.map_or(seq, |cur| cur.max(seq)));
            }
        }
        Ok(latest)
    }

    fn open(&self, seq: u64) -> CoreResult<Box<dyn AppendStore>> {
        let path = self.dir.join(self.file_name(seq));
        match FileStore::open_with_create_dirs(&path) {
            Ok(store) => Ok(Box::new(store)),
            Err(e) => Err(CoreError::storage_unavailable(
                path.display().to_string(),
                e.to_string(),
            )),
        }
    }
}

enum Writer {
    Open {
        store: Box<dyn AppendStore>,
        seq: u64,
        written: u64,
    },
    Closed,
}

struct Inner {
    opener: Box<dyn StoreOpener>,
    max_batch_len: usize,
    max_file_size_bytes: u64,
    batch: Vec<SerializedEvent>,
    writer: Writer,
}

/// Append-only batched writer producing size-rotated log files.
///
/// Records are buffered in memory and written to `{prefix}-{seq}.log`
/// files under the configured directory, each capped at
/// `max_file_size_bytes`. When a flush would push the current file past
/// its cap, the file is sealed (flushed and synced) and writing continues
/// in the next sequence number - a single flush transparently spans files.
///
/// The batch buffer and the open store live behind one mutex; `append`,
/// `flush`, and the threshold-induced flush all run under it, so callers
/// observe one global append order.
pub struct LogConsumer {
    inner: Mutex<Inner>,
}

impl LogConsumer {
    /// Opens the consumer at the config's target directory.
    ///
    /// Scans the directory for existing `{prefix}-{seq}.log` files and
    /// resumes the newest one if it still has room, so restarts never
    /// orphan a half-filled file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StorageUnavailable`] when the directory or
    /// file cannot be opened.
    pub fn open(config: &Config) -> CoreResult<Self> {
        let opener = LogDir {
            dir: config.path.clone(),
            prefix: config.name_prefix.clone(),
        };
        Self::with_opener(
            Box::new(opener),
            config.max_batch_len,
            config.max_file_size_bytes,
        )
    }

    pub(crate) fn with_opener(
        opener: Box<dyn StoreOpener>,
        max_batch_len: u32,
        max_file_size_bytes: u64,
    ) -> CoreResult<Self> {
        let seq = opener.latest_seq()?.unwrap_or(0);
        let store = opener.open(seq)?;
        let written = store.size().map_err(write_failure)?;

        let mut inner = Inner {
            opener,
            max_batch_len: max_batch_len as usize,
            max_file_size_bytes,
            batch: Vec::new(),
            writer: Writer::Open {
                store,
                seq,
                written,
            },
        };

        // The newest file may already be full from a previous run.
        if written >= max_file_size_bytes {
            inner.rotate()?;
        }

        diag_info!("log consumer ready at sequence {seq}, {written} bytes written");
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

impl Consumer for LogConsumer {
    fn append(&self, record: SerializedEvent) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;

        let size = record.encoded_len();
        if size > inner.max_file_size_bytes {
            diag_warn!("rejecting {size} byte record: larger than any log file");
            return Err(CoreError::EventTooLarge {
                size,
                max: inner.max_file_size_bytes,
            });
        }

        inner.batch.push(record);
        diag_debug!(
            "buffered record {} of {}",
            inner.batch.len(),
            inner.max_batch_len
        );

        if inner.batch.len() >= inner.max_batch_len {
            // Threshold flush covers exactly the records appended so far;
            // the lock keeps later appends out until it completes.
            inner.flush_batch()?;
        }
        Ok(())
    }

    fn flush(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        inner.ensure_open()?;
        inner.flush_batch()
    }

    fn close(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock();
        if matches!(inner.writer, Writer::Closed) {
            return Ok(());
        }

        let mut result = inner.flush_batch();
        if result.is_ok() {
            if let Writer::Open { store, .. } = &mut inner.writer {
                result = store.sync().map_err(write_failure);
            }
        }

        // The handle is released even when the final flush failed.
        inner.writer = Writer::Closed;
        if result.is_ok() {
            diag_info!("log consumer closed");
        }
        result
    }
}

impl Inner {
    fn ensure_open(&self) -> CoreResult<()> {
        match self.writer {
            Writer::Open { .. } => Ok(()),
            Writer::Closed => Err(CoreError::NotReady),
        }
    }

    /// Writes every buffered record to storage.
    ///
    /// The batch is drained up front: a failed write is reported, never
    /// re-queued.
    fn flush_batch(&mut self) -> CoreResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.batch);
        let count = pending.len();
        for record in &pending {
            self.write_record(record)?;
        }

        match &mut self.writer {
            Writer::Open { store, .. } => store.flush().map_err(write_failure)?,
            Writer::Closed => return Err(CoreError::NotReady),
        }

        diag_info!("flushed {count} records");
        Ok(())
    }

    fn write_record(&mut self, record: &SerializedEvent) -> CoreResult<()> {
        let len = record.encoded_len();

        // Rotate when the record no longer fits the current file. An
        // empty file always fits it: oversized records were rejected at
        // append time.
        let needs_rotation = match &self.writer {
            Writer::Open { written, .. } => {
                *written > 0 && *written + len > self.max_file_size_bytes
            }
            Writer::Closed => false,
        };
        if needs_rotation {
            self.rotate()?;
        }

        let Writer::Open { store, written, .. } = &mut self.writer else {
            return Err(CoreError::NotReady);
        };

        let mut line = Vec::with_capacity(record.as_bytes().len() + 1);
        line.extend_from_slice(record.as_bytes());
        line.push(b'\n');

        if let Err(e) = store.append(&line) {
            diag_error!("failed to write record: {e}");
            return Err(write_failure(e));
        }
        *written += len;
        Ok(())
    }

    /// Seals the current file and opens the next sequence number.
    fn rotate(&mut self) -> CoreResult<()> {
        let next = match &mut self.writer {
            Writer::Open { store, seq, .. } => {
                // Seal the full file so the uploader sees a complete
                // artifact.
                store.flush().map_err(write_failure)?;
                store.sync().map_err(write_failure)?;
                *seq + 1
            }
            Writer::Closed => return Err(CoreError::NotReady),
        };

        let store = self.opener.open(next)?;
        let written = store.size().map_err(write_failure)?;
        self.writer = Writer::Open {
            store,
            seq: next,
            written,
        };
        diag_info!("rotated to log file sequence {next}");
        Ok(())
    }
}

fn write_failure(e: StorageError) -> CoreError {
    CoreError::write_failure(e.to_string())
}
