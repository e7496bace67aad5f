//! Transcript sinks: where finished transcription entries go.

use crate::error::Result;
use crate::pipeline::types::TranscriptEntry;
use std::sync::{Arc, Mutex};

/// Pluggable destination for transcript entries.
/// Pairs with FrameSource for input - this handles transcription output.
pub trait TranscriptSink: Send + 'static {
    /// Handle one transcript entry. Called for each transcribed segment.
    fn append(&mut self, entry: &TranscriptEntry) -> Result<()>;

    /// Called on session shutdown. Return accumulated text if applicable.
    fn flush(&mut self) -> Option<String> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes each entry as a timestamped line on stdout.
pub struct StdoutSink {
    /// Also print language and timing detail.
    verbose: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for StdoutSink {
    fn append(&mut self, entry: &TranscriptEntry) -> Result<()> {
        let timestamp = humantime::format_rfc3339_seconds(entry.timestamp);
        if self.verbose {
            let elapsed_ms = entry.elapsed.map(|d| d.as_millis()).unwrap_or(0);
            println!(
                "[{}] ({}, {}ms) {}",
                timestamp, entry.language, elapsed_ms, entry.text
            );
        } else {
            println!("[{}] {}", timestamp, entry.text);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Collects entries in memory for library use and tests.
/// Returns the joined text on flush().
pub struct CollectorSink {
    collected: Arc<Mutex<Vec<TranscriptEntry>>>,
}

/// Shared read handle onto a `CollectorSink`'s entries.
#[derive(Clone)]
pub struct CollectorHandle {
    collected: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl CollectorHandle {
    /// Snapshot of the entries collected so far.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        match self.collected.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CollectorSink {
    pub fn new() -> Self {
        Self {
            collected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for reading collected entries from another thread.
    pub fn handle(&self) -> CollectorHandle {
        CollectorHandle {
            collected: Arc::clone(&self.collected),
        }
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for CollectorSink {
    fn append(&mut self, entry: &TranscriptEntry) -> Result<()> {
        match self.collected.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
        Ok(())
    }

    fn flush(&mut self) -> Option<String> {
        let entries = match self.collected.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.is_empty() {
            None
        } else {
            Some(
                entries
                    .iter()
                    .map(|e| e.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn entry(text: &str) -> TranscriptEntry {
        TranscriptEntry {
            timestamp: SystemTime::now(),
            text: text.to_string(),
            language: "en".to_string(),
            language_probability: Some(0.95),
            elapsed: Some(Duration::from_millis(120)),
        }
    }

    #[test]
    fn sink_is_object_safe() {
        let _sink: Box<dyn TranscriptSink> = Box::new(CollectorSink::new());
    }

    #[test]
    fn collector_sink_collects_and_joins_text() {
        let mut sink = CollectorSink::new();

        sink.append(&entry("Hello")).unwrap();
        sink.append(&entry("world")).unwrap();
        sink.append(&entry("Rust")).unwrap();

        assert_eq!(sink.flush(), Some("Hello world Rust".to_string()));
    }

    #[test]
    fn collector_sink_empty_returns_none() {
        let mut sink = CollectorSink::new();
        assert_eq!(sink.flush(), None);
    }

    #[test]
    fn collector_sink_single_item() {
        let mut sink = CollectorSink::new();
        sink.append(&entry("Single")).unwrap();
        assert_eq!(sink.flush(), Some("Single".to_string()));
    }

    #[test]
    fn collector_handle_sees_appended_entries() {
        let mut sink = CollectorSink::new();
        let handle = sink.handle();

        assert!(handle.entries().is_empty());

        sink.append(&entry("first")).unwrap();
        sink.append(&entry("second")).unwrap();

        let entries = handle.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].text, "second");
        assert_eq!(entries[0].language, "en");
    }

    #[test]
    fn collector_handle_survives_sink_move() {
        let sink = CollectorSink::new();
        let handle = sink.handle();

        let mut boxed: Box<dyn TranscriptSink> = Box::new(sink);
        boxed.append(&entry("moved")).unwrap();

        assert_eq!(handle.entries().len(), 1);
    }

    #[test]
    fn stdout_sink_append_succeeds() {
        let mut sink = StdoutSink::new();
        assert!(sink.append(&entry("printed")).is_ok());
        assert_eq!(sink.flush(), None);
    }

    #[test]
    fn stdout_verbose_append_succeeds() {
        let mut sink = StdoutSink::verbose();
        assert!(sink.append(&entry("printed verbosely")).is_ok());
    }

    #[test]
    fn sink_names() {
        assert_eq!(StdoutSink::new().name(), "stdout");
        assert_eq!(CollectorSink::new().name(), "collector");
    }
}
