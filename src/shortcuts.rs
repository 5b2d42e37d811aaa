//! Keyboard shortcut dispatch, independent of any windowing system.

use std::collections::HashMap;
use std::fmt;

/// The parts of a keydown event that shortcut matching looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    /// The event targets a text input, textarea or contentEditable element.
    pub editable_target: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

/// What the host should do after a dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// A registered handler ran.
    pub fired: bool,
    /// The browser default action should be suppressed.
    pub prevent_default: bool,
}

/// Named shortcuts and their handlers.
///
/// Keys are matched lowercase. Two chords are recognised, `"ctrl+z"`
/// (Ctrl or Cmd) and `"alt+c"`; every other name is a single key that only
/// fires when no modifier is held.
#[derive(Default)]
pub struct Shortcuts {
    handlers: HashMap<String, Box<dyn FnMut()>>,
}

impl fmt::Debug for Shortcuts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("Shortcuts").field("keys", &keys).finish()
    }
}

impl Shortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`, replacing any previous one.
    pub fn on(mut self, key: &str, handler: impl FnMut() + 'static) -> Self {
        self.insert(key, handler);
        self
    }

    pub fn insert(&mut self, key: &str, handler: impl FnMut() + 'static) {
        self.handlers.insert(key.to_lowercase(), Box::new(handler));
    }

    pub fn dispatch(&mut self, event: &KeyEvent) -> Outcome {
        // Never steal keystrokes from text entry.
        if event.editable_target {
            return Outcome::default();
        }

        let key = event.key.to_lowercase();
        let ctrl = event.ctrl || event.meta;

        if ctrl && key == "z" {
            return Outcome {
                fired: self.fire("ctrl+z"),
                prevent_default: true,
            };
        }
        if event.alt && key == "c" {
            return Outcome {
                fired: self.fire("alt+c"),
                prevent_default: true,
            };
        }
        if !ctrl && !event.alt && !event.shift {
            return Outcome {
                fired: self.fire(&key),
                prevent_default: false,
            };
        }

        Outcome::default()
    }

    fn fire(&mut self, name: &str) -> bool {
        match self.handlers.get_mut(name) {
            Some(handler) => {
                log::trace!("shortcut {name}");
                handler();
                true
            }
            None => false,
        }
    }
}
