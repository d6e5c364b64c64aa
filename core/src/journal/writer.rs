// ## 📦 `src/journal/writer.rs`

//! Background journal writer with rotation and archival.
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Sender};
use thiserror::Error;
use tracing::{error, warn};

use crate::journal::entry::JournalEntry;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal io on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("journal line {line} is not valid: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("journal rotation limit must be non-zero")]
    ZeroRotation,

    #[error("journal writer thread panicked")]
    WriterPanicked,
}

/// Non-blocking journal. Entries are serialized and flushed by a dedicated
/// thread; `close` waits for everything queued so far to hit the disk.
pub struct AsyncJournal {
    tx: Option<Sender<JournalEntry>>,
    handle: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl AsyncJournal {
    /// Open (append) the journal file and start the writer thread.
    pub fn open(path: impl AsRef<Path>, rotation_limit: usize) -> Result<Self, JournalError> {
        if rotation_limit == 0 {
            return Err(JournalError::ZeroRotation);
        }
        let path = path.as_ref().to_path_buf();
        let writer = open_append(&path)?;

        let (tx, rx) = unbounded::<JournalEntry>();
        let thread_path = path.clone();

        let handle = thread::Builder::new()
            .name("journal-writer".into())
            .spawn(move || {
                let mut writer = writer;
                let mut count = 0usize;
                let mut sequence = 0u64;
                let mut archivers: Vec<JoinHandle<()>> = Vec::new();

                while let Ok(entry) = rx.recv() {
                    if let Err(e) = write_entry(&mut writer, &entry) {
                        error!("[JOURNAL] write failed: {}", e);
                        continue;
                    }
                    count += 1;
                    if count < rotation_limit {
                        continue;
                    }

                    count = 0;
                    sequence += 1;
                    let _ = writer.flush();
                    match rotate_file(&thread_path, sequence) {
                        Ok((fresh, archived)) => {
                            writer = fresh;
                            archivers.retain(|h| !h.is_finished());
                            archivers.push(thread::spawn(move || compress_archive(&archived)));
                        }
                        Err(e) => warn!("[JOURNAL] rotation failed, keeping current file: {}", e),
                    }
                }

                let _ = writer.flush();
                for archiver in archivers {
                    let _ = archiver.join();
                }
            })
            .map_err(|source| JournalError::Io { path: path.clone(), source })?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue one entry. Never blocks the caller.
    pub fn append(&self, entry: JournalEntry) {
        let Some(tx) = &self.tx else { return };
        if tx.send(entry).is_err() {
            warn!("[JOURNAL] writer thread gone, entry dropped");
        }
    }

    /// Flush everything queued, finish archival, stop the writer.
    pub fn close(mut self) -> Result<(), JournalError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), JournalError> {
        drop(self.tx.take());
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| JournalError::WriterPanicked),
            None => Ok(()),
        }
    }

    /// Read back every entry of a journal file.
    pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<JournalEntry>, JournalError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| JournalError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line)
                .map_err(|source| JournalError::Parse { line: i + 1, source })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl Drop for AsyncJournal {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("[JOURNAL] {}", e);
        }
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>, JournalError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(BufWriter::new)
        .map_err(|source| JournalError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn write_entry(writer: &mut BufWriter<File>, entry: &JournalEntry) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, entry)?;
    writer.write_all(b"\n")?;
    // each entry hits the disk before the next one is taken
    writer.flush()
}

/// Rename the live file to `<path>.<timestamp>.<seq>` and reopen a fresh one.
fn rotate_file(path: &Path, sequence: u64) -> Result<(BufWriter<File>, PathBuf), JournalError> {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
    let mut archived = path.as_os_str().to_owned();
    archived.push(format!(".{}.{}", timestamp, sequence));
    let archived = PathBuf::from(archived);

    fs::rename(path, &archived).map_err(|source| JournalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((open_append(path)?, archived))
}

/// Compress `src` to `src.zst` and remove the original on success.
fn compress_archive(src: &Path) {
    let mut dest = src.as_os_str().to_owned();
    dest.push(".zst");

    let result = File::open(src).and_then(|input| {
        let output = File::create(&dest)?;
        zstd::stream::copy_encode(input, output, 3)
    });
    match result {
        Ok(()) => {
            if let Err(e) = fs::remove_file(src) {
                warn!("[JOURNAL] archived {} but could not remove it: {}", src.display(), e);
            }
        }
        Err(e) => warn!("[JOURNAL] archive compression failed for {}: {}", src.display(), e),
    }
}
