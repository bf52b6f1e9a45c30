//! User defined key, button and screen-edge bindings
use crate::{core::actions::Action, x::keysym::Keysym};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Modifier masks as used in binding tables (X core protocol values).
pub mod modmask {
    /// Shift
    pub const SHIFT: u16 = 1 << 0;
    /// Caps lock: never part of a binding, always stripped
    pub const LOCK: u16 = 1 << 1;
    /// Control
    pub const CTRL: u16 = 1 << 2;
    /// Mod1, usually Alt
    pub const MOD1: u16 = 1 << 3;
    /// Mod2, usually num lock
    pub const MOD2: u16 = 1 << 4;
    /// Mod3
    pub const MOD3: u16 = 1 << 5;
    /// Mod4, usually Super / the windows key
    pub const MOD4: u16 = 1 << 6;
    /// Mod5
    pub const MOD5: u16 = 1 << 7;

    /// Every real modifier (lock keys excluded)
    pub const ALL_MODS: u16 = SHIFT | CTRL | MOD1 | MOD2 | MOD3 | MOD4 | MOD5;
}

/// Strip lock key state out of an event modifier mask so that bindings
/// fire regardless of caps lock and num lock.
pub fn clean_mask(mask: u16, numlock_mask: u16) -> u16 {
    mask & !(numlock_mask | modmask::LOCK) & modmask::ALL_MODS
}

/// Known mouse buttons for binding actions
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MouseButton {
    /// 1
    Left,
    /// 2
    Middle,
    /// 3
    Right,
    /// 4
    ScrollUp,
    /// 5
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

impl MouseButton {
    /// Map a raw X button detail to a known button if possible.
    pub fn from_detail(detail: u8) -> Option<Self> {
        match detail {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            4 => Some(MouseButton::ScrollUp),
            5 => Some(MouseButton::ScrollDown),
            _ => None,
        }
    }
}

/// The regions of the screen that button bindings can attach to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ClickRegion {
    /// The tag cells at the left of the bar
    TagBar,
    /// The layout symbol in the bar
    LayoutSymbol,
    /// The status text at the right of the bar
    StatusText,
    /// The focused window title in the bar
    WinTitle,
    /// A managed client window
    ClientWin,
    /// The root window
    RootWin,
}

/// The screen edges that can carry an action.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Side {
    /// x == screen width - 1
    Right,
    /// x == 0
    Left,
    /// y == 0
    Up,
    /// y == screen height - 1
    Down,
}

/// A key chord bound to an action.
///
/// The binding tables are pure data: the grab set is re-derived from
/// them at startup and whenever the keyboard mapping changes.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    /// Modifiers that must be held
    pub mods: u16,
    /// The keysym to match in the unshifted column
    pub keysym: Keysym,
    /// What to run when the chord is pressed
    pub action: Action,
}

/// A button press in a click region bound to an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonBinding {
    /// Where the press must land
    pub region: ClickRegion,
    /// Modifiers that must be held
    pub mods: u16,
    /// The button to match
    pub button: MouseButton,
    /// What to run when the press matches
    pub action: Action,
}

/// An action fired when the pointer touches a screen edge during a
/// gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct SideBinding {
    /// The edge to watch
    pub side: Side,
    /// What to run when the pointer is on that edge
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(modmask::MOD4 | modmask::LOCK, modmask::MOD2, modmask::MOD4; "caps lock stripped")]
    #[test_case(modmask::MOD4 | modmask::MOD2, modmask::MOD2, modmask::MOD4; "num lock stripped")]
    #[test_case(
        modmask::MOD4 | modmask::SHIFT,
        modmask::MOD2,
        modmask::MOD4 | modmask::SHIFT;
        "real modifiers kept"
    )]
    #[test_case(0xff00, modmask::MOD2, 0; "non modifier bits stripped")]
    #[test]
    fn clean_mask_strips_locks(mask: u16, numlock: u16, expected: u16) {
        assert_eq!(clean_mask(mask, numlock), expected);
    }

    #[test]
    fn mouse_button_round_trips() {
        for detail in 1..=5u8 {
            let b = MouseButton::from_detail(detail).expect("known button");
            assert_eq!(u8::from(b), detail);
        }
        assert_eq!(MouseButton::from_detail(8), None);
    }
}
