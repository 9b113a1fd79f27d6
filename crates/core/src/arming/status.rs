//! Operator status-text channel
//!
//! Every check failure and every arm/disarm transition becomes a
//! severity-tagged line handed to a [`StatusSink`]. The wire protocol that
//! carries these lines to a ground station is outside this crate;
//! [`StatusQueue`] is the bounded hand-off buffer a telemetry task drains.

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;
use heapless::{Deque, String, Vec};

/// Maximum status line length (characters)
pub const MAX_STATUS_LEN: usize = 200;

/// Maximum length of a single check failure message
pub const MAX_FAILURE_LEN: usize = 100;

/// Queue capacity (messages)
pub const QUEUE_CAPACITY: usize = 16;

/// A formatted status line
pub type StatusText = String<MAX_STATUS_LEN>;

/// A check failure reason, as produced by leaf collaborators
pub type FailureText = String<MAX_FAILURE_LEN>;

/// Message severity, mirroring the MAVLink severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}

/// Destination for operator-facing status lines
pub trait StatusSink {
    /// Deliver one line. Must not block.
    fn send(&self, severity: Severity, text: &str);
}

/// `fmt::Write` adapter that silently stops at capacity.
///
/// Stops on a char boundary, and once full ignores any further writes so a
/// later short fragment cannot sneak in after a truncated one.
pub struct Truncating<'a, const N: usize> {
    out: &'a mut String<N>,
    full: bool,
}

impl<'a, const N: usize> Truncating<'a, N> {
    pub fn new(out: &'a mut String<N>) -> Self {
        Self { out, full: false }
    }

    /// True if anything was cut off
    pub fn truncated(&self) -> bool {
        self.full
    }
}

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        for c in s.chars() {
            if self.out.push(c).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

/// Format into a fixed-capacity string, truncating overlong output
pub fn format_truncated<const N: usize>(args: fmt::Arguments<'_>) -> String<N> {
    let mut out = String::new();
    let _ = fmt::write(&mut Truncating::new(&mut out), args);
    out
}

/// Queued status line with severity and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: StatusText,
}

struct QueueInner {
    queue: Deque<StatusMessage, QUEUE_CAPACITY>,
    dropped_count: u32,
}

/// Bounded status queue shared between producers and a telemetry drain.
///
/// When full the oldest line is dropped and counted.
pub struct StatusQueue {
    inner: Mutex<RefCell<QueueInner>>,
}

impl StatusQueue {
    /// Const constructor for static initialization
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(QueueInner {
                queue: Deque::new(),
                dropped_count: 0,
            })),
        }
    }

    /// Remove and return every queued line, oldest first
    pub fn drain(&self) -> Vec<StatusMessage, QUEUE_CAPACITY> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let mut out = Vec::new();
            while let Some(msg) = inner.queue.pop_front() {
                // Same capacity as the queue, cannot overflow
                let _ = out.push(msg);
            }
            out
        })
    }

    /// Number of lines currently queued
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines dropped because the queue was full
    pub fn dropped_count(&self) -> u32 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).dropped_count)
    }
}

impl Default for StatusQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusQueue {
    fn send(&self, severity: Severity, text: &str) {
        let message = StatusMessage {
            severity,
            text: format_truncated(format_args!("{}", text)),
        };
        let truncated = message.text.len() < text.len();

        let dropped = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let mut dropped = None;
            if inner.queue.is_full() {
                inner.queue.pop_front();
                inner.dropped_count += 1;
                dropped = Some(inner.dropped_count);
            }
            let _ = inner.queue.push_back(message);
            dropped
        });

        if truncated {
            crate::log_warn!("Status text truncated to {} chars", MAX_STATUS_LEN);
        }
        if let Some(count) = dropped {
            crate::log_warn!("Status queue full, dropped {} messages", count);
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::String as StdString;

    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let queue = StatusQueue::new();
        queue.send(Severity::Critical, "PreArm: one");
        queue.send(Severity::Info, "two");

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].severity, Severity::Critical);
        assert_eq!(drained[0].text.as_str(), "PreArm: one");
        assert_eq!(drained[1].text.as_str(), "two");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_drops_oldest_when_full() {
        let queue = StatusQueue::new();
        for i in 0..(QUEUE_CAPACITY + 3) {
            let text: StatusText = format_truncated(format_args!("msg {}", i));
            queue.send(Severity::Info, &text);
        }

        assert_eq!(queue.len(), QUEUE_CAPACITY);
        assert_eq!(queue.dropped_count(), 3);
        assert_eq!(queue.drain()[0].text.as_str(), "msg 3");
    }

    #[test]
    fn test_long_text_truncated() {
        let queue = StatusQueue::new();
        let long: StdString = "x".repeat(MAX_STATUS_LEN + 50);
        queue.send(Severity::Warning, &long);
        assert_eq!(queue.drain()[0].text.len(), MAX_STATUS_LEN);
    }

    #[test]
    fn test_truncating_stops_on_char_boundary() {
        let mut out = String::<4>::new();
        let mut writer = Truncating::new(&mut out);
        let _ = fmt::write(&mut writer, format_args!("ab\u{e9}\u{e9}c"));
        assert!(writer.truncated());
        assert_eq!(out.as_str(), "ab\u{e9}");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical < Severity::Debug);
        assert_eq!(Severity::Debug as u8, 7);
    }
}
