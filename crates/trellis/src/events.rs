//! Input event types consumed by the selection and grid engines.
//!
//! Trellis is headless: the host translates its platform events (DOM,
//! winit, crossterm, test harness) into these types and feeds them to the
//! widgets. A handler returning [`Handled::Yes`] means the event is
//! terminal: the host must suppress the platform default action and stop
//! further propagation.

use std::time::Instant;

/// Keys with widget-level meaning.
///
/// Anything the engines do not understand arrives as [`Key::Character`] and
/// either feeds incremental search or is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    Enter,
    Escape,
    Tab,
    /// A printable character.
    Character(char),
}

/// Keyboard modifier state at the time of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    /// Command on macOS, Windows key elsewhere.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// The platform primary modifier: Ctrl, or Cmd on macOS.
    ///
    /// Used for move-without-selecting navigation, toggle-click, and
    /// select-all.
    pub fn primary(&self) -> bool {
        self.control || self.meta
    }

    /// Modifiers with only shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    /// Modifiers with only the primary modifier held.
    pub fn primary_only() -> Self {
        Self {
            control: true,
            ..Self::NONE
        }
    }
}

/// A key press delivered to a widget.
///
/// `timestamp` is the moment the event occurred; the incremental-search
/// buffer measures its 1.5 s expiry against it, so tests can inject time.
#[derive(Debug, Clone, Copy)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: KeyboardModifiers,
    pub timestamp: Instant,
}

impl KeyInput {
    /// A key press with the given modifiers, stamped now.
    pub fn new(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self {
            key,
            modifiers,
            timestamp: Instant::now(),
        }
    }

    /// A key press with no modifiers, stamped now.
    pub fn plain(key: Key) -> Self {
        Self::new(key, KeyboardModifiers::NONE)
    }

    /// Replaces the timestamp.
    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Whether a widget consumed an input event.
///
/// [`Handled::Yes`] obliges the host to suppress the default platform
/// action and stop propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the host must suppress default action and propagation when Handled::Yes"]
pub enum Handled {
    Yes,
    No,
}

impl Handled {
    /// Returns `true` for [`Handled::Yes`].
    pub fn is_handled(self) -> bool {
        self == Handled::Yes
    }
}
