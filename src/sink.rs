use std::fs::File;
use std::io::Write;
use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::parse::Comment;
use crate::{Error, Result};

/// Column header, written exactly once and before any record.
pub const HEADER: [&str; 6] = ["mode", "author", "rating", "comment_time", "votes", "comment"];

/// UTF-8 byte order mark; spreadsheet apps take it as an encoding hint.
const BOM: &[u8] = b"\xef\xbb\xbf";

/// The handle every worker writes through. All batches funnel over one
/// channel into a single task owning the file, so concurrent `write` calls
/// land as whole rows in some total order, never interleaved.
#[derive(Clone)]
pub struct Sink {
    tx: mpsc::Sender<Vec<Comment>>,
}

/// Owns the writer task. Closing it after every `Sink` clone is dropped
/// drains the channel, flushes the file and surfaces any I/O error, which is
/// fatal to the run.
pub struct SinkGuard {
    task: JoinHandle<Result<u64>>,
}

/// Creates the output file, stamps BOM + header, and starts the writer task.
pub fn open(path: &Path) -> Result<(Sink, SinkGuard)> {
    let mut file = File::create(path)?;
    file.write_all(BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(HEADER)?;
    writer.flush()?;

    let (tx, rx) = mpsc::channel(256);
    let task = tokio::spawn(write_rows(writer, rx));
    Ok((Sink { tx }, SinkGuard { task }))
}

async fn write_rows(
    mut writer: csv::Writer<File>,
    mut rx: mpsc::Receiver<Vec<Comment>>,
) -> Result<u64> {
    let mut written = 0;
    while let Some(batch) = rx.recv().await {
        for comment in &batch {
            writer.write_record(comment.as_row())?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}

impl Sink {
    /// Hands one page's records to the writer. An error here means the
    /// writer died on I/O; callers treat that as fatal.
    pub async fn write(&self, records: Vec<Comment>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.tx.send(records).await.map_err(|_| Error::RuntimeSend)
    }
}

impl SinkGuard {
    /// Waits for the writer to drain and reports the rows written. Every
    /// `Sink` clone must be dropped first or this never returns.
    pub async fn close(self) -> Result<u64> {
        self.task.await?
    }
}
