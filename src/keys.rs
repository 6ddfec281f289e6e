//! Keyboard surface: key events and process-wide listener registration.
//!
//! A [`KeyboardSurface`] stands in for the host's global key event source.
//! Listeners are attached with [`KeyboardSurface::attach`] and stay attached
//! exactly as long as the returned [`ListenerGuard`] lives.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::str::FromStr;

/// Keys the widget reacts to. Anything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    ArrowUp,
    ArrowDown,
    Other(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Command on macOS, the "super"/Windows key elsewhere.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn meta(c: char) -> Self {
        Self {
            key: Key::Char(c),
            modifiers: Modifiers {
                meta: true,
                ..Modifiers::default()
            },
        }
    }

    /// Ctrl+K or Cmd+K, either case. Shift or Alt makes it a different
    /// chord (Ctrl+Shift+K and AltGr combinations belong to the host).
    pub fn is_search_chord(&self) -> bool {
        let m = self.modifiers;
        (m.ctrl || m.meta)
            && !m.shift
            && !m.alt
            && matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&'k'))
    }
}

/// Error returned when a chord string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized key chord: '{0}'")]
pub struct ParseKeyError(pub String);

impl FromStr for KeyEvent {
    type Err = ParseKeyError;

    /// Parse chords like `ctrl+k`, `cmd+k`, `escape`, `up`, `enter`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut parts: Vec<&str> = lowered.split('+').map(str::trim).collect();
        let Some(last) = parts.pop().filter(|p| !p.is_empty()) else {
            return Err(ParseKeyError(s.to_string()));
        };

        let mut modifiers = Modifiers::default();
        for part in parts {
            match part {
                "ctrl" | "control" => modifiers.ctrl = true,
                "cmd" | "meta" | "super" => modifiers.meta = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(ParseKeyError(s.to_string())),
            }
        }

        let key = match last {
            "esc" | "escape" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(other.to_string()),
                }
            }
        };

        Ok(Self { key, modifiers })
    }
}

/// What a listener did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyResponse {
    pub handled: bool,
    /// Suppress the host's default action for this event.
    pub prevent_default: bool,
}

impl KeyResponse {
    pub const IGNORED: Self = Self {
        handled: false,
        prevent_default: false,
    };

    pub const HANDLED: Self = Self {
        handled: true,
        prevent_default: false,
    };

    pub const CAPTURED: Self = Self {
        handled: true,
        prevent_default: true,
    };

    fn merge(self, other: Self) -> Self {
        Self {
            handled: self.handled || other.handled,
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

/// Receives events from a [`KeyboardSurface`].
pub trait KeyListener {
    fn on_key(&mut self, event: &KeyEvent) -> KeyResponse;
}

type ListenerSlot = (u64, Weak<RefCell<dyn KeyListener>>);

/// Registry of global key listeners.
#[derive(Default)]
pub struct KeyboardSurface {
    listeners: Rc<RefCell<Vec<ListenerSlot>>>,
    next_id: Cell<u64>,
}

impl KeyboardSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. It is detached when the guard is dropped.
    pub fn attach(&self, listener: Rc<RefCell<dyn KeyListener>>) -> ListenerGuard {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .push((id, Rc::downgrade(&listener)));
        tracing::debug!(id, "Attached key listener");
        ListenerGuard {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver an event to every attached listener, in attach order.
    pub fn dispatch(&self, event: &KeyEvent) -> KeyResponse {
        // Snapshot first so a listener may detach itself mid-dispatch.
        let snapshot: Vec<Rc<RefCell<dyn KeyListener>>> = self
            .listeners
            .borrow()
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect();

        snapshot
            .iter()
            .fold(KeyResponse::IGNORED, |acc, listener| {
                acc.merge(listener.borrow_mut().on_key(event))
            })
    }
}

/// Keeps a listener attached. Dropping it detaches the listener.
#[must_use = "dropping the guard detaches the listener immediately"]
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<RefCell<Vec<ListenerSlot>>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
            tracing::debug!(id = self.id, "Detached key listener");
        }
    }
}
