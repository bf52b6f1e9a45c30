//! Data types for client window properties
use crate::pure::client::SizeHints;
use bitflags::bitflags;

bitflags! {
    /// Flag bits for the `WM_HINTS` property (ICCCM 4.1.2.4).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WmHintsFlags: u32 {
        /// The input field carries data
        const INPUT_HINT         = 1 << 0;
        /// The initial_state field carries data
        const STATE_HINT         = 1 << 1;
        /// The window is urgent
        const URGENCY_HINT       = 1 << 8;
    }
}

bitflags! {
    /// Flag bits for the `WM_NORMAL_HINTS` property (ICCCM 4.1.2.3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WmNormalHintsFlags: u32 {
        /// Program-specified minimum size
        const P_MIN_SIZE    = 1 << 4;
        /// Program-specified maximum size
        const P_MAX_SIZE    = 1 << 5;
        /// Program-specified resize increments
        const P_RESIZE_INC  = 1 << 6;
        /// Program-specified min and max aspect ratios
        const P_ASPECT      = 1 << 7;
        /// Program-specified base size
        const P_BASE_SIZE   = 1 << 8;
    }
}

/// Possible values for the `WM_STATE` property on a client.
///
/// See the [ICCCM docs][1] for more information.
///
/// [1]: https://tronche.com/gui/x/icccm/sec-4.html#s-4.1.3.1
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WmState {
    /// Window is not visible
    Withdrawn,
    /// Window is visible
    Normal,
    /// Window is iconified
    Iconic,
}

impl From<WmState> for u32 {
    fn from(s: WmState) -> u32 {
        match s {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

impl WmState {
    /// Map a raw `WM_STATE` value back to a known state if possible.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

/// The client hints we consume from `WM_HINTS`.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct WmHints {
    /// Whether the client has raised the urgency hint
    pub urgent: bool,
    /// Whether the client participates in input focus.
    ///
    /// `None` when the input hint was not supplied.
    pub accepts_input: Option<bool>,
}

impl WmHints {
    /// Parse from the raw 32bit words of the `WM_HINTS` property.
    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let flags = WmHintsFlags::from_bits_truncate(raw[0]);

        Some(WmHints {
            urgent: flags.contains(WmHintsFlags::URGENCY_HINT),
            accepts_input: if flags.contains(WmHintsFlags::INPUT_HINT) {
                Some(raw.get(1).map(|&v| v != 0).unwrap_or(true))
            } else {
                None
            },
        })
    }
}

/// Parse `WM_NORMAL_HINTS` into [SizeHints], applying the ICCCM
/// fallbacks: an absent base size falls back to the min size and vice
/// versa, absent fields are zero.
///
/// `raw` is the 18-word layout of `XSizeHints`:
/// `flags, x, y, w, h, min_w, min_h, max_w, max_h, inc_w, inc_h,
///  min_aspect_num, min_aspect_den, max_aspect_num, max_aspect_den,
///  base_w, base_h, win_gravity`.
pub fn size_hints_from_raw(raw: &[u32]) -> SizeHints {
    let mut hints = SizeHints::default();
    if raw.len() < 17 {
        return hints;
    }
    let flags = WmNormalHintsFlags::from_bits_truncate(raw[0]);

    if flags.contains(WmNormalHintsFlags::P_BASE_SIZE) {
        hints.base_w = raw[15];
        hints.base_h = raw[16];
    } else if flags.contains(WmNormalHintsFlags::P_MIN_SIZE) {
        hints.base_w = raw[5];
        hints.base_h = raw[6];
    }

    if flags.contains(WmNormalHintsFlags::P_RESIZE_INC) {
        hints.inc_w = raw[9];
        hints.inc_h = raw[10];
    }

    if flags.contains(WmNormalHintsFlags::P_MAX_SIZE) {
        hints.max_w = raw[7];
        hints.max_h = raw[8];
    }

    if flags.contains(WmNormalHintsFlags::P_MIN_SIZE) {
        hints.min_w = raw[5];
        hints.min_h = raw[6];
    } else if flags.contains(WmNormalHintsFlags::P_BASE_SIZE) {
        hints.min_w = raw[15];
        hints.min_h = raw[16];
    }

    if flags.contains(WmNormalHintsFlags::P_ASPECT) {
        let (min_num, min_den) = (raw[11], raw[12]);
        let (max_num, max_den) = (raw[13], raw[14]);
        if min_num > 0 {
            hints.min_aspect = min_den as f32 / min_num as f32;
        }
        if max_den > 0 {
            hints.max_aspect = max_num as f32 / max_den as f32;
        }
    }

    hints
}

/// The window attribute data we consume when deciding whether to manage
/// a window.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct WindowAttributes {
    /// Windows with override redirect set are never managed
    pub override_redirect: bool,
    /// Whether the window is currently viewable
    pub viewable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn raw(flags: u32) -> [u32; 18] {
        let mut raw = [0; 18];
        raw[0] = flags;
        raw[5] = 100; // min_w
        raw[6] = 80; // min_h
        raw[7] = 500; // max_w
        raw[8] = 400; // max_h
        raw[9] = 7; // inc_w
        raw[10] = 13; // inc_h
        raw[11] = 1; // min aspect num
        raw[12] = 2; // min aspect den
        raw[13] = 3; // max aspect num
        raw[14] = 1; // max aspect den
        raw[15] = 20; // base_w
        raw[16] = 10; // base_h

        raw
    }

    #[test]
    fn base_size_is_preferred_over_min() {
        let hints = size_hints_from_raw(&raw(
            (WmNormalHintsFlags::P_BASE_SIZE | WmNormalHintsFlags::P_MIN_SIZE).bits(),
        ));

        assert_eq!((hints.base_w, hints.base_h), (20, 10));
        assert_eq!((hints.min_w, hints.min_h), (100, 80));
    }

    #[test]
    fn min_falls_back_to_base_and_base_to_min() {
        let only_base = size_hints_from_raw(&raw(WmNormalHintsFlags::P_BASE_SIZE.bits()));
        assert_eq!((only_base.min_w, only_base.min_h), (20, 10));

        let only_min = size_hints_from_raw(&raw(WmNormalHintsFlags::P_MIN_SIZE.bits()));
        assert_eq!((only_min.base_w, only_min.base_h), (100, 80));
    }

    #[test]
    fn aspect_ratios() {
        let hints = size_hints_from_raw(&raw(WmNormalHintsFlags::P_ASPECT.bits()));

        assert_eq!(hints.min_aspect, 2.0);
        assert_eq!(hints.max_aspect, 3.0);
    }

    #[test]
    fn absent_flags_leave_hints_zeroed() {
        assert_eq!(size_hints_from_raw(&raw(0)), SizeHints::default());
    }

    #[test_case(&[1 << 8], WmHints { urgent: true, accepts_input: None }; "urgent")]
    #[test_case(&[1, 0], WmHints { urgent: false, accepts_input: Some(false) }; "refuses input")]
    #[test_case(&[1, 1], WmHints { urgent: false, accepts_input: Some(true) }; "accepts input")]
    #[test_case(&[0, 0], WmHints { urgent: false, accepts_input: None }; "no input flag")]
    #[test]
    fn wm_hints_from_raw(raw: &[u32], expected: WmHints) {
        assert_eq!(WmHints::from_raw(raw), Some(expected));
    }

    #[test]
    fn wm_state_round_trips() {
        for s in [WmState::Withdrawn, WmState::Normal, WmState::Iconic] {
            assert_eq!(WmState::from_raw(u32::from(s)), Some(s));
        }
    }
}
