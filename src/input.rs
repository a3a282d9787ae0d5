use crate::keypad::Keypad;
use clap::ValueEnum;
use log::warn;
use std::collections::HashMap;
use winit::event::VirtualKeyCode;

type Keymap = HashMap<VirtualKeyCode, u8>;

lazy_static::lazy_static! {
    // 1 2 3 C      1 2 3 4
    // 4 5 6 D  <-  Q W E R
    // 7 8 9 E      A S D F
    // A 0 B F      Z X C V
    static ref QWERTY: Keymap = {
        use VirtualKeyCode::*;
        let rows = [[Key1, Key2, Key3, Key4], [Q, W, E, R], [A, S, D, F], [Z, X, C, V]];
        let pad = [
            [0x1, 0x2, 0x3, 0xC],
            [0x4, 0x5, 0x6, 0xD],
            [0x7, 0x8, 0x9, 0xE],
            [0xA, 0x0, 0xB, 0xF],
        ];
        rows.iter().flatten().copied().zip(pad.iter().flatten().copied()).collect()
    };

    static ref HEX: Keymap = {
        use VirtualKeyCode::*;
        [Key0, Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9, A, B, C, D, E, F]
            .into_iter()
            .zip(0..)
            .collect()
    };
}

/// Which physical keys drive the keypad.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// The 4x4 block under 1234/QWER/ASDF/ZXCV, shaped like the pad
    Qwerty,
    /// Each key named after its hex digit: 0-9 and A-F
    Hex,
}

impl Layout {
    pub fn keymap(self) -> &'static Keymap {
        match self {
            Self::Qwerty => &QWERTY,
            Self::Hex => &HEX,
        }
    }
}

/// Mirrors key edges from the host onto the keypad.
pub fn forward_keys(
    layout: Layout,
    keypad: &Keypad,
    pressed: impl Fn(VirtualKeyCode) -> bool,
    released: impl Fn(VirtualKeyCode) -> bool,
) {
    for (&code, &key) in layout.keymap() {
        let result = if pressed(code) {
            keypad.press(key)
        } else if released(code) {
            keypad.release(key)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            warn!("Dropped {code:?}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers_pad(layout: Layout) {
        let mut keys: Vec<u8> = layout.keymap().values().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn layouts_cover_every_key_once() {
        covers_pad(Layout::Qwerty);
        covers_pad(Layout::Hex);
    }

    #[test]
    fn qwerty_corners() {
        let map = Layout::Qwerty.keymap();
        assert_eq!(map[&VirtualKeyCode::Key1], 0x1);
        assert_eq!(map[&VirtualKeyCode::X], 0x0);
        assert_eq!(map[&VirtualKeyCode::V], 0xF);
        assert_eq!(map.get(&VirtualKeyCode::Escape), None);
    }

    #[test]
    fn hex_keys_name_their_digit() {
        let map = Layout::Hex.keymap();
        assert_eq!(map[&VirtualKeyCode::Key0], 0x0);
        assert_eq!(map[&VirtualKeyCode::Key9], 0x9);
        assert_eq!(map[&VirtualKeyCode::A], 0xA);
        assert_eq!(map[&VirtualKeyCode::F], 0xF);
        assert_eq!(map.get(&VirtualKeyCode::Q), None);
    }

    #[test]
    fn forwards_presses_and_releases() {
        let keypad = Keypad::new();
        forward_keys(Layout::Hex, &keypad, |c| c == VirtualKeyCode::B, |_| false);
        assert_eq!(keypad.pressed_keys(), vec![0xB]);

        forward_keys(Layout::Qwerty, &keypad, |c| c == VirtualKeyCode::W, |_| false);
        assert_eq!(keypad.pressed_keys(), vec![0x5, 0xB]);

        forward_keys(Layout::Hex, &keypad, |_| false, |c| c == VirtualKeyCode::B);
        assert_eq!(keypad.pressed_keys(), vec![0x5]);
    }
}
