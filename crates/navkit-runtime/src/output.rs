#![forbid(unsafe_code)]

//! Output channels.
//!
//! Every announcement fans out to the sinks registered on the
//! [`Announcer`](navkit_core::Announcer). This module provides the stock
//! ones:
//!
//! | sink | channel |
//! |------|---------|
//! | [`SpeechSink`] | a [`SpeechBridge`] (screen reader, TTS engine) |
//! | [`ClipboardSink`] | the system clipboard via [`Clipboard`] |
//! | [`WriterSink`] | one line per announcement to any `Write` |
//! | [`RecordingSink`] | an in-memory log shared between clones |
//!
//! Sinks never propagate failures; they log and carry on.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use navkit_core::announce::{Announcement, AnnouncementSink, SpeechPriority};

use crate::clipboard::Clipboard;

/// A speech backend.
pub trait SpeechBridge {
    /// Speak `text`. `Low` waits behind current speech, `High` cuts it off.
    fn speak(&mut self, text: &str, priority: SpeechPriority) -> io::Result<()>;

    /// Backend name for logs.
    fn name(&self) -> &str {
        "speech"
    }
}

/// Speaks into the tracing log under the `navkit::speech` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBridge;

impl SpeechBridge for TracingBridge {
    fn speak(&mut self, text: &str, priority: SpeechPriority) -> io::Result<()> {
        tracing::info!(
            target: "navkit::speech",
            ?priority,
            interrupt = priority.interrupts(),
            "{text}"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Sends announcements to a [`SpeechBridge`].
#[derive(Debug)]
pub struct SpeechSink<B> {
    bridge: B,
    failures: usize,
}

impl<B: SpeechBridge> SpeechSink<B> {
    /// Wrap `bridge`.
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            failures: 0,
        }
    }

    /// Failed deliveries so far.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// The wrapped bridge.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }
}

impl<B: SpeechBridge> AnnouncementSink for SpeechSink<B> {
    fn deliver(&mut self, announcement: &Announcement) {
        if let Err(err) = self.bridge.speak(&announcement.text, announcement.priority) {
            self.failures += 1;
            tracing::warn!(bridge = self.bridge.name(), error = %err, "speech failed");
        }
    }

    fn name(&self) -> &str {
        "speech"
    }
}

/// Copies announcements to the clipboard.
///
/// The first failure is logged at warn level, later ones at debug, so a
/// terminal without clipboard support does not flood the log.
#[derive(Debug)]
pub struct ClipboardSink<W: Write> {
    clipboard: Clipboard,
    writer: W,
    warned: bool,
}

impl<W: Write> ClipboardSink<W> {
    /// Copy through `clipboard`, writing escape sequences to `writer`.
    pub fn new(clipboard: Clipboard, writer: W) -> Self {
        Self {
            clipboard,
            writer,
            warned: false,
        }
    }

    /// The underlying clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Consume the sink, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> AnnouncementSink for ClipboardSink<W> {
    fn deliver(&mut self, announcement: &Announcement) {
        if let Err(err) = self.clipboard.set(&announcement.text, &mut self.writer) {
            if self.warned {
                tracing::debug!(error = %err, "clipboard copy failed");
            } else {
                self.warned = true;
                tracing::warn!(error = %err, "clipboard copy failed");
            }
        }
    }

    fn name(&self) -> &str {
        "clipboard"
    }
}

/// Writes each announcement as a line.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Write to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> AnnouncementSink for WriterSink<W> {
    fn deliver(&mut self, announcement: &Announcement) {
        let result = writeln!(self.writer, "{}", announcement.text).and_then(|()| self.writer.flush());
        if let Err(err) = result {
            tracing::warn!(error = %err, "announcement write failed");
        }
    }

    fn name(&self) -> &str {
        "writer"
    }
}

/// Records announcements in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Announcement>>>,
}

impl RecordingSink {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn announcements(&self) -> Vec<Announcement> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded texts.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|a| a.text.clone())
            .collect()
    }

    /// Most recent text.
    #[must_use]
    pub fn last_text(&self) -> Option<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|a| a.text.clone())
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AnnouncementSink for RecordingSink {
    fn deliver(&mut self, announcement: &Announcement) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(announcement.clone());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::Passthrough;
    use navkit_core::announce::Announcer;

    #[derive(Default)]
    struct FakeBridge {
        spoken: Vec<(String, SpeechPriority)>,
        broken: bool,
    }

    impl SpeechBridge for FakeBridge {
        fn speak(&mut self, text: &str, priority: SpeechPriority) -> io::Result<()> {
            if self.broken {
                return Err(io::Error::other("no voice"));
            }
            self.spoken.push((text.to_string(), priority));
            Ok(())
        }
    }

    #[test]
    fn speech_sink_passes_every_priority_through() {
        let mut sink = SpeechSink::new(FakeBridge::default());
        sink.deliver(&Announcement::new("Filter closed", SpeechPriority::Low));
        sink.deliver(&Announcement::new("Apple", SpeechPriority::Normal));
        sink.deliver(&Announcement::new("Not enough silver", SpeechPriority::High));
        assert_eq!(
            sink.bridge().spoken,
            [
                ("Filter closed".to_string(), SpeechPriority::Low),
                ("Apple".to_string(), SpeechPriority::Normal),
                ("Not enough silver".to_string(), SpeechPriority::High),
            ]
        );
    }

    #[test]
    fn low_priority_reaches_the_bridge_through_the_announcer() {
        struct Shared(Arc<Mutex<Vec<SpeechPriority>>>);

        impl SpeechBridge for Shared {
            fn speak(&mut self, _text: &str, priority: SpeechPriority) -> io::Result<()> {
                self.0.lock().unwrap().push(priority);
                Ok(())
            }
        }

        let heard = Arc::new(Mutex::new(Vec::new()));
        let mut announcer = Announcer::new();
        announcer.add_sink(SpeechSink::new(Shared(Arc::clone(&heard))));
        announcer.announce_with("Rice, 1 of 3", SpeechPriority::Low);
        announcer.announce_with("Corn, 2 of 3", SpeechPriority::Normal);
        assert_eq!(
            *heard.lock().unwrap(),
            [SpeechPriority::Low, SpeechPriority::Normal]
        );
    }

    #[test]
    fn speech_failures_are_counted() {
        let mut sink = SpeechSink::new(FakeBridge {
            broken: true,
            ..FakeBridge::default()
        });
        sink.deliver(&Announcement::new("Apple", SpeechPriority::Normal));
        sink.deliver(&Announcement::new("Banana", SpeechPriority::Normal));
        assert_eq!(sink.failures(), 2);
    }

    #[test]
    fn clipboard_sink_writes_osc52() {
        let mut sink = ClipboardSink::new(Clipboard::osc52(Passthrough::None), Vec::new());
        sink.deliver(&Announcement::new("Rice", SpeechPriority::Normal));
        let out = sink.into_writer();
        assert!(out.starts_with(b"\x1b]52;c;"));
    }

    #[test]
    fn clipboard_sink_swallows_failures() {
        let mut sink = ClipboardSink::new(Clipboard::unavailable(), Vec::new());
        sink.deliver(&Announcement::new("Rice", SpeechPriority::Normal));
        sink.deliver(&Announcement::new("Corn", SpeechPriority::Normal));
        assert!(sink.into_writer().is_empty());
    }

    #[test]
    fn writer_sink_one_line_each() {
        let mut sink = WriterSink::new(Vec::new());
        sink.deliver(&Announcement::new("Apple, 1 of 3", SpeechPriority::Normal));
        sink.deliver(&Announcement::new("Banana, 2 of 3", SpeechPriority::Normal));
        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            "Apple, 1 of 3\nBanana, 2 of 3\n"
        );
    }

    #[test]
    fn recording_sink_shares_log_between_clones() {
        let recorder = RecordingSink::new();
        let mut announcer = Announcer::new().with_sink(recorder.clone());
        announcer.announce("Apple");
        announcer.announce("Banana");
        assert_eq!(recorder.texts(), ["Apple", "Banana"]);
        assert_eq!(recorder.last_text().as_deref(), Some("Banana"));
        recorder.clear();
        assert!(recorder.announcements().is_empty());
    }
}
