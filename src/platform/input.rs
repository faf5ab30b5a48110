//! Keyboard input
//!
//! Hosts forward raw key codes (DOM `keyCode` values) for presses and
//! releases; `HeldKeys` turns whatever is currently down into a `TickInput`.

use std::collections::{HashMap, HashSet};

use crate::sim::TickInput;

/// Something the player can hold down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
}

/// Key code to action bindings
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<u32, Action>,
}

impl Default for KeyMap {
    /// Arrows, WASD, Dvorak (`,` `O` `E`) and space to jump
    fn default() -> Self {
        let mut map = Self::empty();
        for code in [37, 65, 79] {
            map.bind(code, Action::Left);
        }
        for code in [39, 68, 69] {
            map.bind(code, Action::Right);
        }
        for code in [38, 87, 188, 32] {
            map.bind(code, Action::Up);
        }
        for code in [40, 83] {
            map.bind(code, Action::Down);
        }
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key, replacing any earlier binding for it
    pub fn bind(&mut self, code: u32, action: Action) {
        self.bindings.insert(code, action);
    }

    pub fn action(&self, code: u32) -> Option<Action> {
        self.bindings.get(&code).copied()
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: HashSet<u32>,
}

impl HeldKeys {
    /// Record a press; returns true when the key is bound
    pub fn press(&mut self, map: &KeyMap, code: u32) -> bool {
        self.keys.insert(code);
        map.action(code).is_some()
    }

    pub fn release(&mut self, map: &KeyMap, code: u32) -> bool {
        self.keys.remove(&code);
        map.action(code).is_some()
    }

    /// Forget everything, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_held(&self, map: &KeyMap, action: Action) -> bool {
        self.keys.iter().any(|&code| map.action(code) == Some(action))
    }

    pub fn input(&self, map: &KeyMap) -> TickInput {
        let mut input = TickInput::default();
        for action in self.keys.iter().filter_map(|&code| map.action(code)) {
            match action {
                Action::Left => input.left = true,
                Action::Right => input.right = true,
                Action::Up => input.up = true,
                Action::Down => input.down = true,
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let map = KeyMap::default();
        assert_eq!(map.action(37), Some(Action::Left));
        assert_eq!(map.action(68), Some(Action::Right));
        assert_eq!(map.action(32), Some(Action::Up));
        assert_eq!(map.action(188), Some(Action::Up));
        assert_eq!(map.action(83), Some(Action::Down));
        assert_eq!(map.action(13), None);
    }

    #[test]
    fn test_either_key_holds_action() {
        let map = KeyMap::default();
        let mut held = HeldKeys::default();

        assert!(held.press(&map, 37));
        assert!(held.press(&map, 65));
        held.release(&map, 37);
        assert!(held.is_held(&map, Action::Left));
        held.release(&map, 65);
        assert!(!held.is_held(&map, Action::Left));
    }

    #[test]
    fn test_input_snapshot() {
        let map = KeyMap::default();
        let mut held = HeldKeys::default();
        held.press(&map, 39);
        held.press(&map, 32);
        assert!(!held.press(&map, 13));

        let input = held.input(&map);
        assert_eq!(
            input,
            TickInput {
                right: true,
                up: true,
                ..TickInput::default()
            }
        );

        held.clear();
        assert_eq!(held.input(&map), TickInput::default());
    }

    #[test]
    fn test_rebind() {
        let mut map = KeyMap::default();
        map.bind(32, Action::Down);
        let mut held = HeldKeys::default();
        held.press(&map, 32);
        assert!(held.input(&map).down);
        assert!(!held.input(&map).up);
    }
}
