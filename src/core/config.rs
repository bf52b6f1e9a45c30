//! The compile-time style configuration surface consumed by the core.
//!
//! Everything here is plain data: appearance, tag labels, rules, per
//! tag startup layouts and the key / button / edge binding tables. The
//! grab set and all runtime behaviour are derived from these values.
use crate::{
    core::{
        actions::Action,
        bindings::{modmask, ButtonBinding, ClickRegion, KeyBinding, MouseButton, Side, SideBinding},
        layout::Layout,
    },
    pure::monitor::TagLayout,
    x::keysym::{self, Keysym},
    Color, Error, Result,
};

/// The default tag labels.
pub const DEFAULT_TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

// Tags are a bitmask with one bit reserved: this must fit in 31 bits.
const _: () = assert!(DEFAULT_TAGS.len() <= 31);

/// The modifier used by the default bindings (Super / windows key).
pub const MODKEY: u16 = modmask::MOD4;

/// A foreground / background / border color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    /// Text color
    pub fg: Color,
    /// Fill color
    pub bg: Color,
    /// Window border color
    pub border: Color,
}

/// A static mapping from window identity to placement, applied once
/// when a window is first managed.
///
/// `None` fields match anything; `Some` fields match as substrings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Substring of the WM_CLASS class field
    pub class: Option<String>,
    /// Substring of the WM_CLASS instance field
    pub instance: Option<String>,
    /// Substring of the window title
    pub title: Option<String>,
    /// Tags to place the window on (0 keeps the current view)
    pub tags: u32,
    /// Whether the window starts floating
    pub is_free: bool,
    /// Monitor to place the window on
    pub monitor: Option<usize>,
}

/// The full configuration surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Window border width in pixels
    pub border_px: u32,
    /// Whether monitors start with a visible bar
    pub show_bar: bool,
    /// Whether the bar sits at the top of the screen
    pub top_bar: bool,
    /// Fonts for the drawing helper
    pub fonts: Vec<String>,
    /// Colors for unfocused elements
    pub normal_scheme: ColorScheme,
    /// Colors for the focused client and selected tags
    pub selected_scheme: ColorScheme,
    /// Tag labels (at most 31)
    pub tags: Vec<String>,
    /// Placement rules applied at manage time
    pub rules: Vec<Rule>,
    /// Whether size hints are respected for tiled clients
    pub resize_hints: bool,
    /// Startup layout, mfact and nmaster for each tag
    pub tag_layouts: Vec<TagLayout>,
    /// The key binding table
    pub keys: Vec<KeyBinding>,
    /// The button binding table
    pub buttons: Vec<ButtonBinding>,
    /// The screen edge binding table
    pub sides: Vec<SideBinding>,
    /// A command spawned once at startup
    pub startup: Option<Vec<String>>,
}

impl Config {
    /// Check the configuration invariants the rest of the core relies
    /// on.
    pub fn validate(&self) -> Result<()> {
        let n = self.tags.len();
        if n == 0 || n > 31 {
            return Err(Error::TooManyTags { n });
        }
        if self.tag_layouts.len() != n {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "{} tag layouts configured for {} tags",
                    self.tag_layouts.len(),
                    n
                ),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let strings = |slice: &[&str]| slice.iter().map(|s| s.to_string()).collect();

        Config {
            border_px: 1,
            show_bar: true,
            top_bar: true,
            fonts: strings(&["monospace:size=10"]),
            normal_scheme: ColorScheme {
                fg: "#ffffff".try_into().expect("valid hex code"),
                bg: "#000000".try_into().expect("valid hex code"),
                border: "#888888".try_into().expect("valid hex code"),
            },
            selected_scheme: ColorScheme {
                fg: "#000000".try_into().expect("valid hex code"),
                bg: "#ffffff".try_into().expect("valid hex code"),
                border: "#ffffff".try_into().expect("valid hex code"),
            },
            tags: strings(&DEFAULT_TAGS),
            rules: vec![],
            resize_hints: true,
            tag_layouts: vec![
                TagLayout {
                    layout: Layout::Tile,
                    mfact: 0.55,
                    nmaster: 1,
                };
                DEFAULT_TAGS.len()
            ],
            keys: default_keys(),
            buttons: default_buttons(),
            sides: default_sides(),
            startup: None,
        }
    }
}

fn tag_keys(keys: &mut Vec<KeyBinding>, key: Keysym, tag: usize) {
    let mask = 1 << tag;
    let bind = |mods, action| KeyBinding {
        mods,
        keysym: key,
        action,
    };

    keys.push(bind(MODKEY, Action::View(mask)));
    keys.push(bind(MODKEY | modmask::CTRL, Action::ToggleView(mask)));
    keys.push(bind(MODKEY | modmask::SHIFT, Action::Tag(mask)));
    keys.push(bind(
        MODKEY | modmask::CTRL | modmask::SHIFT,
        Action::ToggleTag(mask),
    ));
}

fn default_keys() -> Vec<KeyBinding> {
    use Action::*;

    let spawn = |cmd: &[&str]| Spawn(cmd.iter().map(|s| s.to_string()).collect());
    let key = |mods, keysym, action| KeyBinding {
        mods,
        keysym,
        action,
    };

    let mut keys = vec![
        // Program spawners
        key(MODKEY | modmask::SHIFT, keysym::XK_RETURN, spawn(&["st"])),
        key(MODKEY | modmask::SHIFT, keysym::XK_R, spawn(&["dmenu_run"])),
        // Client handling
        key(MODKEY, keysym::XK_X, KillClient),
        key(MODKEY, keysym::XK_B, ToggleBar),
        key(MODKEY, keysym::XK_J, FocusStack { dir: 1, warp: false }),
        key(MODKEY, keysym::XK_K, FocusStack { dir: -1, warp: false }),
        key(MODKEY, keysym::XK_I, IncNMaster(1)),
        key(MODKEY, keysym::XK_D, IncNMaster(-1)),
        key(MODKEY, keysym::XK_H, SetMFact(-0.05)),
        key(MODKEY, keysym::XK_L, SetMFact(0.05)),
        // Desktop scrolling
        key(
            MODKEY | modmask::CTRL,
            keysym::XK_H,
            ScrollDeskH { amount: 300, warp: false },
        ),
        key(
            MODKEY | modmask::CTRL,
            keysym::XK_L,
            ScrollDeskH { amount: -300, warp: false },
        ),
        key(
            MODKEY | modmask::CTRL,
            keysym::XK_K,
            ScrollDeskV { amount: 300, warp: false },
        ),
        key(
            MODKEY | modmask::CTRL,
            keysym::XK_J,
            ScrollDeskV { amount: -300, warp: false },
        ),
        key(MODKEY, keysym::XK_R, Zoom),
        // Layouts
        key(MODKEY, keysym::XK_T, SetLayout(Layout::Tile)),
        key(MODKEY, keysym::XK_S, SetLayout(Layout::Split)),
        key(MODKEY, keysym::XK_F, SetLayout(Layout::Floating)),
        key(MODKEY, keysym::XK_M, SetLayout(Layout::Monocle)),
        key(MODKEY, keysym::XK_SPACE, ToggleFree),
        key(MODKEY, keysym::XK_0, View(!0)),
        key(MODKEY | modmask::SHIFT, keysym::XK_0, Tag(!0)),
        // Monitors
        key(MODKEY, keysym::XK_COMMA, FocusMon(-1)),
        key(MODKEY, keysym::XK_PERIOD, FocusMon(1)),
        key(MODKEY | modmask::SHIFT, keysym::XK_COMMA, TagMon(-1)),
        key(MODKEY | modmask::SHIFT, keysym::XK_PERIOD, TagMon(1)),
        // Tags
        key(MODKEY, keysym::XK_P, ViewNext(-1)),
        key(MODKEY, keysym::XK_N, ViewNext(1)),
        // Rarely used: quit and restart
        key(
            MODKEY | modmask::CTRL | modmask::SHIFT,
            keysym::XK_ESCAPE,
            Quit { restart: false },
        ),
        key(
            MODKEY | modmask::CTRL | modmask::SHIFT,
            keysym::XK_R,
            Quit { restart: true },
        ),
    ];

    for (i, key) in [
        keysym::XK_1,
        keysym::XK_2,
        keysym::XK_3,
        keysym::XK_4,
        keysym::XK_5,
        keysym::XK_6,
        keysym::XK_7,
        keysym::XK_8,
        keysym::XK_9,
    ]
    .into_iter()
    .enumerate()
    {
        tag_keys(&mut keys, key, i);
    }

    keys
}

fn default_buttons() -> Vec<ButtonBinding> {
    use Action::*;
    use ClickRegion::*;
    use MouseButton::*;

    let btn = |region, mods, button, action| ButtonBinding {
        region,
        mods,
        button,
        action,
    };

    vec![
        // Layout symbol
        btn(LayoutSymbol, 0, ScrollUp, NextLayout(-1)),
        btn(LayoutSymbol, 0, ScrollDown, NextLayout(1)),
        btn(LayoutSymbol, 0, Middle, ToggleFree),
        btn(LayoutSymbol, 0, Right, Zoom),
        // Master area sizing from the status text and with modifiers
        btn(StatusText, 0, Left, SetMFact(-0.05)),
        btn(StatusText, 0, Right, SetMFact(0.05)),
        btn(StatusText, 0, ScrollUp, SetMFact(0.01)),
        btn(StatusText, 0, ScrollDown, SetMFact(-0.01)),
        btn(ClientWin, MODKEY | modmask::SHIFT, ScrollUp, SetMFact(0.01)),
        btn(ClientWin, MODKEY | modmask::SHIFT, ScrollDown, SetMFact(-0.01)),
        btn(RootWin, MODKEY | modmask::SHIFT, ScrollUp, SetMFact(0.01)),
        btn(RootWin, MODKEY | modmask::SHIFT, ScrollDown, SetMFact(-0.01)),
        // Desktop scrolling
        btn(
            RootWin,
            MODKEY | modmask::CTRL,
            ScrollUp,
            ScrollDeskV { amount: 100, warp: false },
        ),
        btn(
            RootWin,
            MODKEY | modmask::CTRL,
            ScrollDown,
            ScrollDeskV { amount: -100, warp: false },
        ),
        btn(
            ClientWin,
            MODKEY | modmask::CTRL,
            ScrollUp,
            ScrollDeskV { amount: 100, warp: false },
        ),
        btn(
            ClientWin,
            MODKEY | modmask::CTRL,
            ScrollDown,
            ScrollDeskV { amount: -100, warp: false },
        ),
        // Focus cycling from the title
        btn(WinTitle, 0, ScrollUp, FocusStack { dir: 1, warp: false }),
        btn(WinTitle, 0, ScrollDown, FocusStack { dir: -1, warp: false }),
        // Click-to-act gestures from the title
        btn(WinTitle, 0, Left, MoveClick),
        btn(WinTitle, 0, Middle, KillClick),
        btn(WinTitle, 0, Right, ResizeClick),
        // Direct client gestures
        btn(ClientWin, MODKEY, Left, MoveMouse),
        btn(ClientWin, MODKEY, Middle, FocusCurrent),
        btn(ClientWin, MODKEY, Right, ResizeMouse),
        btn(ClientWin, MODKEY | modmask::SHIFT, Middle, KillClient),
        btn(ClientWin, MODKEY | modmask::CTRL, Middle, Zoom),
        btn(ClientWin, MODKEY, ScrollUp, RaiseFocused),
        btn(ClientWin, MODKEY, ScrollDown, LowerFocused),
        // Restart from the root window
        btn(RootWin, 0, Middle, Quit { restart: true }),
        // Tag cells: a zero mask receives the clicked tag
        btn(TagBar, 0, Left, View(0)),
        btn(TagBar, 0, Right, ToggleView(0)),
        btn(TagBar, 0, Middle, Tag(0)),
        btn(TagBar, MODKEY, Middle, ToggleTag(0)),
        btn(TagBar, 0, ScrollUp, ViewNext(1)),
        btn(TagBar, 0, ScrollDown, ViewNext(-1)),
    ]
}

fn default_sides() -> Vec<SideBinding> {
    use Action::*;

    vec![
        SideBinding {
            side: Side::Right,
            action: ScrollDeskH { amount: -500, warp: true },
        },
        SideBinding {
            side: Side::Left,
            action: ScrollDeskH { amount: 500, warp: true },
        },
        SideBinding {
            side: Side::Up,
            action: ScrollDeskV { amount: 500, warp: true },
        },
        SideBinding {
            side: Side::Down,
            action: ScrollDeskV { amount: -500, warp: true },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn too_many_tags_is_an_error() {
        let mut cfg = Config::default();
        cfg.tags = (0..32).map(|n| n.to_string()).collect();

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tag_layouts_must_cover_every_tag() {
        let mut cfg = Config::default();
        cfg.tag_layouts.pop();

        assert!(cfg.validate().is_err());
    }
}
