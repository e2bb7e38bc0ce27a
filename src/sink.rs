use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::protocol::contestant::Contestant;

/// Append-only destination for winner records. Implementations do no locking
/// of their own; callers serialize access through the shared mutex below.
pub trait WinnerSink: Send {
    fn append(&mut self, winners: &[Contestant]) -> io::Result<()>;
}

/// The one lock every worker takes before touching the sink.
pub type SharedSink = Arc<Mutex<dyn WinnerSink>>;

/// Winner records appended to a file, one `;`-joined record per line.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl WinnerSink for FileSink {
    fn append(&mut self, winners: &[Contestant]) -> io::Result<()> {
        for winner in winners {
            writeln!(self.file, "{}", winner.to_record())?;
        }
        self.file.flush()
    }
}

/// In-memory sink, used by tests to observe what was persisted.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Contestant>,
}

impl WinnerSink for MemorySink {
    fn append(&mut self, winners: &[Contestant]) -> io::Result<()> {
        self.records.extend_from_slice(winners);
        Ok(())
    }
}
