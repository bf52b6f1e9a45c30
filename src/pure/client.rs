//! Per-window client state
use crate::{core::Xid, pure::geometry::Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The maximum number of bytes of a client title that we retain.
pub const MAX_NAME_LEN: usize = 256;

/// Size hints requested by a client via `WM_NORMAL_HINTS`.
///
/// See ICCCM 4.1.2.3 for the semantics of each field. Absent hints are
/// stored as zero which disables the corresponding adjustment.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    /// Base width in pixels
    pub base_w: u32,
    /// Base height in pixels
    pub base_h: u32,
    /// Minimum width in pixels
    pub min_w: u32,
    /// Minimum height in pixels
    pub min_h: u32,
    /// Maximum width in pixels (0 = unbounded)
    pub max_w: u32,
    /// Maximum height in pixels (0 = unbounded)
    pub max_h: u32,
    /// Width resize increment
    pub inc_w: u32,
    /// Height resize increment
    pub inc_h: u32,
    /// Minimum aspect ratio (h / w as given by the client)
    pub min_aspect: f32,
    /// Maximum aspect ratio (w / h as given by the client)
    pub max_aspect: f32,
}

impl SizeHints {
    /// A client is fixed size when its min and max hints are positive and
    /// equal in both axes.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }
}

/// State for a single managed top level window.
///
/// A client carries four rectangles:
///   - `rect`: where the window currently is,
///   - `float_rect`: where it goes when the floating layout arranges it,
///   - `free_rect`: the remembered free position used to restore a
///     client that is toggled out of tiling,
///   - `prev_rect`: the previous position, used to restore from
///     fullscreen.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// The X window being managed
    pub id: Xid,
    /// Client title for the bar (truncated to [MAX_NAME_LEN] bytes)
    pub name: String,
    /// Current position and size
    pub rect: Rect,
    /// Position and size under the floating layout
    pub float_rect: Rect,
    /// Saved free rectangle for untile -> retile restoration
    pub free_rect: Rect,
    /// Previous rectangle for fullscreen restoration
    pub prev_rect: Rect,
    /// Current border width in pixels
    pub bw: u32,
    /// Border width the window had before we managed it
    pub old_bw: u32,
    /// Tag bitmask: one bit per virtual workspace this client is on
    pub tags: u32,
    /// Size hints read from `WM_NORMAL_HINTS`
    pub hints: SizeHints,
    /// Treated as floating: exempt from tiling
    pub is_free: bool,
    /// Covers the whole monitor with no border
    pub is_fullscreen: bool,
    /// Has raised `XUrgencyHint`; cleared on focus
    pub is_urgent: bool,
    /// Asked never to receive input focus (`WM_HINTS` input = false)
    pub never_focus: bool,
    /// The `is_free` value to restore when leaving fullscreen
    pub old_state: bool,
    /// Index of the owning monitor
    pub monitor: usize,
}

impl Client {
    /// Create a new client for `id` with every rectangle set to its
    /// initial server side geometry.
    pub fn new(id: Xid, r: Rect, old_bw: u32, monitor: usize) -> Self {
        Self {
            id,
            name: String::new(),
            rect: r,
            float_rect: r,
            free_rect: r,
            prev_rect: r,
            bw: 0,
            old_bw,
            tags: 0,
            hints: SizeHints::default(),
            is_free: false,
            is_fullscreen: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            monitor,
        }
    }

    /// Width of this client including both borders.
    pub fn outer_w(&self) -> i32 {
        self.rect.w as i32 + 2 * self.bw as i32
    }

    /// Height of this client including both borders.
    pub fn outer_h(&self) -> i32 {
        self.rect.h as i32 + 2 * self.bw as i32
    }

    /// Whether this client is shown under the given active tagset.
    pub fn is_visible_on(&self, tagset: u32) -> bool {
        self.tags & tagset != 0
    }

    /// Store a (possibly truncated) copy of the client title.
    pub fn set_name(&mut self, name: &str) {
        let mut end = std::cmp::min(name.len(), MAX_NAME_LEN);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        self.name = name[..end].to_string();
    }

    /// Apply position clamping and ICCCM 4.1.2.3 size hint adjustments
    /// to a candidate geometry, returning the effective [Rect].
    ///
    /// With `interact` set the candidate is only kept on the screen as a
    /// whole; otherwise (and when the monitor is tiling) it is clamped
    /// to the monitor's usable area. Hint adjustments run when hints are
    /// respected by configuration, the client is free, or the monitor is
    /// on the floating layout.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_size_hints(
        &self,
        r: Rect,
        interact: bool,
        screen: (u32, u32),
        window_area: Rect,
        bar_h: u32,
        respect_hints: bool,
        floating_layout: bool,
    ) -> Rect {
        let Rect { mut x, mut y, w, h } = r;
        let mut w = std::cmp::max(1, w as i32);
        let mut h = std::cmp::max(1, h as i32);
        let bw = self.bw as i32;

        if interact {
            let (sw, sh) = (screen.0 as i32, screen.1 as i32);
            if x > sw {
                x = sw - self.outer_w();
            }
            if y > sh {
                y = sh - self.outer_h();
            }
            if x + w + 2 * bw < 0 {
                x = 0;
            }
            if y + h + 2 * bw < 0 {
                y = 0;
            }
        } else if !floating_layout {
            let wa = window_area;
            if x >= wa.right() {
                x = wa.right() - self.outer_w();
            }
            if y >= wa.bottom() {
                y = wa.bottom() - self.outer_h();
            }
            if x + w + 2 * bw <= wa.x {
                x = wa.x;
            }
            if y + h + 2 * bw <= wa.y {
                y = wa.y;
            }
        }

        // Never shrink below the bar height in either axis
        h = std::cmp::max(h, bar_h as i32);
        w = std::cmp::max(w, bar_h as i32);

        if respect_hints || self.is_free || floating_layout {
            let SizeHints {
                base_w,
                base_h,
                min_w,
                min_h,
                max_w,
                max_h,
                inc_w,
                inc_h,
                min_aspect,
                max_aspect,
            } = self.hints;

            // See the last two sentences of ICCCM 4.1.2.3
            let base_is_min = base_w == min_w && base_h == min_h;
            if !base_is_min {
                w -= base_w as i32;
                h -= base_h as i32;
            }

            if min_aspect > 0.0 && max_aspect > 0.0 {
                if max_aspect < w as f32 / h as f32 {
                    w = (h as f32 * max_aspect + 0.5) as i32;
                } else if min_aspect < h as f32 / w as f32 {
                    h = (w as f32 * min_aspect + 0.5) as i32;
                }
            }

            if base_is_min {
                // Increment calculation requires the base removed
                w -= base_w as i32;
                h -= base_h as i32;
            }

            if inc_w > 0 {
                w -= w % inc_w as i32;
            }
            if inc_h > 0 {
                h -= h % inc_h as i32;
            }

            w = std::cmp::max(w + base_w as i32, min_w as i32);
            h = std::cmp::max(h + base_h as i32, min_h as i32);

            if max_w > 0 {
                w = std::cmp::min(w, max_w as i32);
            }
            if max_h > 0 {
                h = std::cmp::min(h, max_h as i32);
            }
        }

        Rect::new(x, y, w as u32, h as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;
    use simple_test_case::test_case;

    const SCREEN: (u32, u32) = (1920, 1080);
    const WA: Rect = Rect {
        x: 0,
        y: 14,
        w: 1920,
        h: 1066,
    };
    const BH: u32 = 14;

    fn client_with_hints(hints: SizeHints) -> Client {
        let mut c = Client::new(Xid(1), Rect::new(0, 0, 100, 100), 0, 0);
        c.bw = 1;
        c.hints = hints;

        c
    }

    #[test_case(SizeHints::default(), false; "no hints")]
    #[test_case(
        SizeHints { min_w: 80, min_h: 60, max_w: 80, max_h: 60, ..Default::default() },
        true;
        "min equals max"
    )]
    #[test_case(
        SizeHints { min_w: 80, min_h: 60, max_w: 100, max_h: 60, ..Default::default() },
        false;
        "widths differ"
    )]
    #[test_case(
        SizeHints { min_w: 0, min_h: 0, max_w: 0, max_h: 0, ..Default::default() },
        false;
        "all zero"
    )]
    #[test]
    fn is_fixed(hints: SizeHints, expected: bool) {
        assert_eq!(hints.is_fixed(), expected);
    }

    #[test]
    fn name_is_truncated_on_a_char_boundary() {
        let mut c = client_with_hints(SizeHints::default());
        let long: String = "é".repeat(200); // 400 bytes

        c.set_name(&long);

        assert!(c.name.len() <= MAX_NAME_LEN);
        assert!(c.name.chars().all(|ch| ch == 'é'));
    }

    #[test_case(
        SizeHints { inc_w: 10, inc_h: 10, ..Default::default() },
        Rect::new(0, 14, 123, 456),
        Rect::new(0, 14, 120, 450);
        "increments round down"
    )]
    #[test_case(
        SizeHints { min_w: 200, min_h: 150, ..Default::default() },
        Rect::new(0, 14, 123, 100),
        Rect::new(0, 14, 200, 150);
        "min size clamps up"
    )]
    #[test_case(
        SizeHints { max_w: 100, max_h: 90, ..Default::default() },
        Rect::new(0, 14, 500, 500),
        Rect::new(0, 14, 100, 90);
        "max size clamps down"
    )]
    #[test_case(
        SizeHints { min_aspect: 1.0, max_aspect: 1.0, ..Default::default() },
        Rect::new(0, 14, 300, 100),
        Rect::new(0, 14, 100, 100);
        "aspect squares off width"
    )]
    #[test]
    fn hint_adjustments(hints: SizeHints, requested: Rect, expected: Rect) {
        let c = client_with_hints(hints);

        let r = c.apply_size_hints(requested, false, SCREEN, WA, BH, true, false);

        assert_eq!(r, expected);
    }

    #[test]
    fn geometry_is_clamped_to_the_window_area_when_tiled() {
        let c = client_with_hints(SizeHints::default());

        let r = c.apply_size_hints(Rect::new(5000, 5000, 100, 100), false, SCREEN, WA, BH, true, false);

        assert!(r.x < WA.right());
        assert!(r.y < WA.bottom());
    }

    impl Arbitrary for SizeHints {
        fn arbitrary(g: &mut Gen) -> Self {
            // Well formed hints only, matching what real clients send:
            // min/max sitting on the base + increment grid, and aspect
            // hints without base or increment (mpv style).
            let dim = |g: &mut Gen, lo: u32, hi: u32| lo + u32::arbitrary(g) % (hi - lo);
            let with_max = bool::arbitrary(g);
            let with_aspect = bool::arbitrary(g);

            if with_aspect {
                return SizeHints {
                    min_aspect: 0.5,
                    max_aspect: 2.0,
                    min_w: dim(g, 20, 200),
                    min_h: dim(g, 20, 200),
                    ..Default::default()
                };
            }

            let inc_w = dim(g, 0, 32);
            let inc_h = dim(g, 0, 32);
            let base_w = dim(g, 8, 64);
            let base_h = dim(g, 8, 64);
            let min_w = base_w + inc_w * dim(g, 0, 10);
            let min_h = base_h + inc_h * dim(g, 0, 10);

            SizeHints {
                base_w,
                base_h,
                min_w,
                min_h,
                max_w: if with_max { min_w + inc_w.max(1) * dim(g, 0, 50) } else { 0 },
                max_h: if with_max { min_h + inc_h.max(1) * dim(g, 0, 50) } else { 0 },
                inc_w,
                inc_h,
                min_aspect: 0.0,
                max_aspect: 0.0,
            }
        }
    }

    #[quickcheck]
    fn apply_size_hints_is_idempotent(hints: SizeHints, w: u32, h: u32) -> bool {
        let c = client_with_hints(hints);
        let requested = Rect::new(10, 20, 1 + w % 2000, 1 + h % 2000);

        let once = c.apply_size_hints(requested, false, SCREEN, WA, BH, true, false);
        let twice = c.apply_size_hints(once, false, SCREEN, WA, BH, true, false);

        once == twice
    }
}
