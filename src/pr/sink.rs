//! Messaging sinks receiving message/warn/fail notifications.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Receives notifications emitted while a workflow runs.
pub trait Messenger {
    /// Informational message.
    fn message(&self, text: &str);

    /// Soft violation worth a reviewer's attention.
    fn warn(&self, text: &str);

    /// Policy violation or fatal workflow error.
    fn fail(&self, text: &str);
}

/// Severity of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Emitted by [`Messenger::message`].
    Message,
    /// Emitted by [`Messenger::warn`].
    Warn,
    /// Emitted by [`Messenger::fail`].
    Fail,
}

/// A notification captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Notification text.
    pub text: String,
}

/// Keeps every notification in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingMessenger {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications in emission order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Texts of the notifications at `level`.
    pub fn texts(&self, level: Level) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.text)
            .collect()
    }

    /// Texts passed to [`Messenger::message`].
    pub fn messages(&self) -> Vec<String> {
        self.texts(Level::Message)
    }

    /// Texts passed to [`Messenger::warn`].
    pub fn warnings(&self) -> Vec<String> {
        self.texts(Level::Warn)
    }

    /// Texts passed to [`Messenger::fail`].
    pub fn failures(&self) -> Vec<String> {
        self.texts(Level::Fail)
    }

    fn record(&self, level: Level, text: &str) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                level,
                text: text.to_string(),
            });
    }
}

impl Messenger for RecordingMessenger {
    fn message(&self, text: &str) {
        self.record(Level::Message, text);
    }

    fn warn(&self, text: &str) {
        self.record(Level::Warn, text);
    }

    fn fail(&self, text: &str) {
        self.record(Level::Fail, text);
    }
}

/// Writes coloured notifications to stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleMessenger {
    color: ColorChoice,
}

impl ConsoleMessenger {
    /// Creates a console messenger with the given colour choice.
    pub fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    fn emit(&self, label: &str, color: Color, text: &str) {
        let mut stderr = StandardStream::stderr(self.color);
        // Notifications are fire-and-forget; a closed stderr is not an error.
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stderr, "{label}");
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {text}");
    }
}

impl Default for ConsoleMessenger {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

impl Messenger for ConsoleMessenger {
    fn message(&self, text: &str) {
        self.emit("MESSAGE", Color::Cyan, text);
    }

    fn warn(&self, text: &str) {
        self.emit("WARNING", Color::Yellow, text);
    }

    fn fail(&self, text: &str) {
        self.emit("FAILURE", Color::Red, text);
    }
}

/// Forwards every notification to two messengers.
pub struct Tee<'a> {
    first: &'a dyn Messenger,
    second: &'a dyn Messenger,
}

impl<'a> Tee<'a> {
    /// Creates a messenger forwarding to `first` then `second`.
    pub fn new(first: &'a dyn Messenger, second: &'a dyn Messenger) -> Self {
        Self { first, second }
    }
}

impl Messenger for Tee<'_> {
    fn message(&self, text: &str) {
        self.first.message(text);
        self.second.message(text);
    }

    fn warn(&self, text: &str) {
        self.first.warn(text);
        self.second.warn(text);
    }

    fn fail(&self, text: &str) {
        self.first.fail(text);
        self.second.fail(text);
    }
}
