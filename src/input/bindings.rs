use std::collections::HashMap;

use super::motion::MotionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl KeyModifiers {
    pub const fn new(ctrl: bool, alt: bool, super_key: bool) -> Self {
        Self {
            ctrl,
            alt,
            super_key,
        }
    }

    const fn is_command_chord(self) -> bool {
        self.ctrl || self.alt || self.super_key
    }
}

const DEFAULT_BINDINGS: &[(&str, MotionKey)] = &[
    ("arrowup", MotionKey::PanUp),
    ("up", MotionKey::PanUp),
    ("w", MotionKey::PanUp),
    ("arrowdown", MotionKey::PanDown),
    ("down", MotionKey::PanDown),
    ("s", MotionKey::PanDown),
    ("arrowleft", MotionKey::PanLeft),
    ("left", MotionKey::PanLeft),
    ("a", MotionKey::PanLeft),
    ("arrowright", MotionKey::PanRight),
    ("right", MotionKey::PanRight),
    ("d", MotionKey::PanRight),
    ("e", MotionKey::RotateClockwise),
    ("q", MotionKey::RotateCounterClockwise),
];

/// Maps host key names (DOM `key` values or GDK key names) onto motion keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionBindings {
    keys: HashMap<String, MotionKey>,
}

impl Default for MotionBindings {
    fn default() -> Self {
        Self {
            keys: DEFAULT_BINDINGS
                .iter()
                .map(|(name, key)| ((*name).to_string(), *key))
                .collect(),
        }
    }
}

impl MotionBindings {
    /// Defaults with `overrides` layered on top. Override names are matched
    /// case-insensitively; a blank name is ignored.
    pub fn with_overrides(overrides: &HashMap<String, MotionKey>) -> Self {
        let mut bindings = Self::default();
        for (name, key) in overrides {
            let normalized = normalize_key_name(name);
            if normalized.is_empty() {
                tracing::warn!(key = ?key, "ignoring key binding with an empty key name");
                continue;
            }
            bindings.keys.insert(normalized, *key);
        }
        bindings
    }

    /// Motion key bound to `key_name`, unless a command modifier is held.
    pub fn resolve(&self, key_name: &str, modifiers: KeyModifiers) -> Option<MotionKey> {
        if modifiers.is_command_chord() {
            return None;
        }
        self.keys.get(&normalize_key_name(key_name)).copied()
    }

    pub fn names_for(&self, key: MotionKey) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .keys
            .iter()
            .filter(|(_, bound)| **bound == key)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

fn normalize_key_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_accepts_dom_and_gdk_key_names() {
        let bindings = MotionBindings::default();
        let plain = KeyModifiers::default();
        assert_eq!(bindings.resolve("ArrowUp", plain), Some(MotionKey::PanUp));
        assert_eq!(bindings.resolve("Up", plain), Some(MotionKey::PanUp));
        assert_eq!(bindings.resolve("D", plain), Some(MotionKey::PanRight));
        assert_eq!(
            bindings.resolve("q", plain),
            Some(MotionKey::RotateCounterClockwise)
        );
        assert_eq!(bindings.resolve("x", plain), None);
    }

    #[test]
    fn resolve_ignores_command_chords() {
        let bindings = MotionBindings::default();
        assert_eq!(bindings.resolve("w", KeyModifiers::new(true, false, false)), None);
        assert_eq!(bindings.resolve("e", KeyModifiers::new(false, true, false)), None);
        assert_eq!(bindings.resolve("a", KeyModifiers::new(false, false, true)), None);
    }

    #[test]
    fn overrides_replace_and_extend_defaults() {
        let overrides = HashMap::from([
            ("E".to_string(), MotionKey::RotateCounterClockwise),
            ("r".to_string(), MotionKey::RotateClockwise),
            ("   ".to_string(), MotionKey::PanUp),
        ]);
        let bindings = MotionBindings::with_overrides(&overrides);
        let plain = KeyModifiers::default();

        assert_eq!(
            bindings.resolve("e", plain),
            Some(MotionKey::RotateCounterClockwise)
        );
        assert_eq!(bindings.resolve("r", plain), Some(MotionKey::RotateClockwise));
        assert_eq!(bindings.names_for(MotionKey::RotateClockwise), vec!["r"]);
        assert_eq!(bindings.resolve(" ", plain), None);
    }
}
