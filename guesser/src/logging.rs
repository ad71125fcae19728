// src/logging.rs
//
// Telemetry sinks for experiment runs.
// - EventSink: trait used by the experiment driver
// - NoopSink:  discards all events
// - JsonlSink: writes one JSON object per iteration for offline analysis

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// One driver iteration, as seen by a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based iteration index.
    pub iteration: usize,
    pub target: i64,
    /// Target probability after this iteration's update.
    pub target_probability: f64,
    pub batch_size: usize,
    /// Guesses in the batch that hit the target exactly.
    pub hits: usize,
    /// Sum of the reward vector fed into the update.
    pub reward_mass: f64,
}

/// Abstract sink for per-iteration telemetry.
pub trait EventSink {
    fn log_iteration(&mut self, record: &IterationRecord);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_iteration(&mut self, _record: &IterationRecord) {}
}

/// In-memory sink, mostly for tests and notebooks.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub records: Vec<IterationRecord>,
}

impl EventSink for VecSink {
    fn log_iteration(&mut self, record: &IterationRecord) {
        self.records.push(record.clone());
    }
}

/// JSONL file sink: each iteration is one JSON object on its own line.
pub struct JsonlSink<W: Write = BufWriter<File>> {
    writer: W,
}

impl JsonlSink {
    /// Create a new sink writing to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonlSink<W> {
    fn log_iteration(&mut self, record: &IterationRecord) {
        // Telemetry failures must not abort a run; I/O errors are dropped.
        if let Ok(line) = serde_json::to_string(record) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
            let _ = self.writer.flush();
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn log_iteration(&mut self, record: &IterationRecord) {
        (**self).log_iteration(record)
    }
}
