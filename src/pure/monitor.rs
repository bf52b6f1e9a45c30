//! Per-output state: tagsets, layout memory, client list and focus stack
use crate::{
    core::{layout::Layout, Xid},
    pure::geometry::Rect,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The remembered `(layout, mfact, nmaster)` for a single tag.
///
/// Viewing a single tag restores its remembered values into the
/// monitor's active fields; changing the active values writes back to
/// the entry for the currently viewed tag.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagLayout {
    /// The layout to arrange this tag with
    pub layout: Layout,
    /// Factor of the usable area given to the master region
    pub mfact: f32,
    /// Number of clients placed in the master region
    pub nmaster: u32,
}

/// State for a single physical output.
///
/// Monitors are created one per unique output geometry. Each holds the
/// ordered client list (newest first), the focus stack (most recently
/// focused first) and a two-slot tagset with a selector bit so that the
/// previously viewed tagset is always one flip away.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    /// Stable monitor index (output order)
    pub num: usize,
    /// Symbol shown in the bar for the active layout
    pub layout_symbol: String,
    /// Active master area factor
    pub mfact: f32,
    /// Active master client count
    pub nmaster: u32,
    /// Full screen rectangle of this output
    pub screen: Rect,
    /// Usable rectangle after subtracting the bar
    pub window_area: Rect,
    /// Y position of the bar window
    pub bar_y: i32,
    /// Whether the bar is currently shown
    pub show_bar: bool,
    /// Bar at the top (vs bottom) of the screen
    pub top_bar: bool,
    /// Selector into [Monitor::tagset]: which slot is current
    pub sel_tags: usize,
    /// Current and previous tag masks
    pub tagset: [u32; 2],
    /// Per-tag layout memory, one entry per configured tag
    pub tag_layouts: Vec<TagLayout>,
    /// Index of the single tag most recently viewed
    pub view_tag: usize,
    /// Client list in attach order, newest at the head
    pub clients: Vec<Xid>,
    /// Focus stack, most recently focused at the head
    pub stack: Vec<Xid>,
    /// The selected client on this monitor, if any
    pub sel: Option<Xid>,
    /// The window used to draw this monitor's bar
    pub bar_win: Xid,
    /// The active layout
    pub layout: Layout,
}

impl Monitor {
    /// Create a new monitor with per-tag layout memory seeded from the
    /// configured startup layouts.
    pub fn new(num: usize, tag_layouts: Vec<TagLayout>, show_bar: bool, top_bar: bool) -> Self {
        let TagLayout {
            layout,
            mfact,
            nmaster,
        } = tag_layouts[0];

        Self {
            num,
            layout_symbol: layout.symbol().to_string(),
            mfact,
            nmaster,
            screen: Rect::default(),
            window_area: Rect::default(),
            bar_y: 0,
            show_bar,
            top_bar,
            sel_tags: 0,
            tagset: [1, 1],
            tag_layouts,
            view_tag: 0,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            bar_win: Xid(0),
            layout,
        }
    }

    /// The tag mask currently being viewed on this monitor.
    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.sel_tags]
    }

    /// Add a client to the head of the client list.
    pub fn attach(&mut self, id: Xid) {
        self.clients.insert(0, id);
    }

    /// Add a client to the head of the focus stack.
    pub fn attach_stack(&mut self, id: Xid) {
        self.stack.insert(0, id);
    }

    /// Remove a client from the client list.
    pub fn detach(&mut self, id: Xid) {
        self.clients.retain(|&c| c != id);
    }

    /// Remove a client from the focus stack.
    ///
    /// If it was the selected client, selection falls back to the most
    /// recently focused client that is still visible (per `is_visible`).
    pub fn detach_stack<F>(&mut self, id: Xid, is_visible: F)
    where
        F: Fn(Xid) -> bool,
    {
        self.stack.retain(|&c| c != id);

        if self.sel == Some(id) {
            self.sel = self.stack.iter().copied().find(|&c| is_visible(c));
        }
    }

    /// Recompute the usable window area and bar position from the screen
    /// rectangle and bar visibility.
    pub fn update_bar_pos(&mut self, bar_h: u32) {
        self.window_area.x = self.screen.x;
        self.window_area.w = self.screen.w;
        self.window_area.y = self.screen.y;
        self.window_area.h = self.screen.h;

        if self.show_bar {
            self.window_area.h -= bar_h;
            if self.top_bar {
                self.bar_y = self.window_area.y;
                self.window_area.y += bar_h as i32;
            } else {
                self.bar_y = self.window_area.bottom();
            }
        } else {
            self.bar_y = -(bar_h as i32);
        }
    }

    /// Switch the view to `mask`, retaining the previous tagset for
    /// toggle-back.
    ///
    /// A `mask` of zero flips back to the previously viewed tagset.
    /// When the new mask names a single tag its remembered layout
    /// parameters are loaded into the active fields. Returns false when
    /// the requested mask is already the active tagset.
    pub fn set_view(&mut self, mask: u32) -> bool {
        if mask == self.active_tagset() {
            return false;
        }

        self.sel_tags ^= 1;

        if mask != 0 {
            self.tagset[self.sel_tags] = mask;
            if mask.count_ones() == 1 {
                self.load_tag_layout(mask.trailing_zeros() as usize);
            }
        }

        true
    }

    /// XOR `mask` into the active tagset, refusing to empty it.
    pub fn toggle_view(&mut self, mask: u32) -> bool {
        let new_tagset = self.active_tagset() ^ mask;
        if new_tagset == 0 {
            return false;
        }

        self.tagset[self.sel_tags] = new_tagset;

        true
    }

    /// Make `tag` the viewed tag and restore its remembered layout.
    fn load_tag_layout(&mut self, tag: usize) {
        self.view_tag = tag;
        let TagLayout {
            layout,
            mfact,
            nmaster,
        } = self.tag_layouts[tag];

        self.layout = layout;
        self.mfact = mfact;
        self.nmaster = nmaster;
        self.layout_symbol = layout.symbol().to_string();
    }

    /// Set the active layout, remembering it for the viewed tag.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.layout_symbol = layout.symbol().to_string();
        self.tag_layouts[self.view_tag].layout = layout;
    }

    /// Set the active mfact, remembering it for the viewed tag.
    pub fn set_mfact(&mut self, f: f32) {
        self.mfact = f;
        self.tag_layouts[self.view_tag].mfact = f;
    }

    /// Set the active nmaster, remembering it for the viewed tag.
    pub fn set_nmaster(&mut self, n: u32) {
        self.nmaster = n;
        self.tag_layouts[self.view_tag].nmaster = n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn test_monitor() -> Monitor {
        let tls = vec![
            TagLayout {
                layout: Layout::Tile,
                mfact: 0.55,
                nmaster: 1,
            };
            9
        ];

        let mut m = Monitor::new(0, tls, true, true);
        m.screen = Rect::new(0, 0, 1920, 1080);
        m.update_bar_pos(14);

        m
    }

    #[test]
    fn bar_pos_top() {
        let m = test_monitor();

        assert_eq!(m.bar_y, 0);
        assert_eq!(m.window_area, Rect::new(0, 14, 1920, 1066));
    }

    #[test]
    fn bar_pos_bottom() {
        let mut m = test_monitor();
        m.top_bar = false;
        m.update_bar_pos(14);

        assert_eq!(m.bar_y, 1066);
        assert_eq!(m.window_area, Rect::new(0, 0, 1920, 1066));
    }

    #[test]
    fn bar_pos_hidden() {
        let mut m = test_monitor();
        m.show_bar = false;
        m.update_bar_pos(14);

        assert_eq!(m.bar_y, -14);
        assert_eq!(m.window_area, m.screen);
    }

    #[test]
    fn set_view_retains_one_step_of_history() {
        let mut m = test_monitor();

        assert!(m.set_view(1 << 1));
        assert_eq!(m.active_tagset(), 1 << 1);

        assert!(m.set_view(1 << 2));
        assert_eq!(m.active_tagset(), 1 << 2);

        // Zero mask flips back to the previous tagset only
        assert!(m.set_view(0));
        assert_eq!(m.active_tagset(), 1 << 1);
    }

    #[test]
    fn set_view_is_a_noop_for_the_active_tagset() {
        let mut m = test_monitor();

        assert!(!m.set_view(1));
        assert_eq!(m.active_tagset(), 1);
    }

    #[test]
    fn single_tag_view_loads_remembered_layout() {
        let mut m = test_monitor();
        m.tag_layouts[4] = TagLayout {
            layout: Layout::Monocle,
            mfact: 0.7,
            nmaster: 3,
        };

        m.set_view(1 << 4);

        assert_eq!(m.view_tag, 4);
        assert_eq!(m.layout, Layout::Monocle);
        assert_eq!(m.mfact, 0.7);
        assert_eq!(m.nmaster, 3);
    }

    #[test]
    fn multi_tag_view_keeps_active_layout() {
        let mut m = test_monitor();
        m.tag_layouts[2] = TagLayout {
            layout: Layout::Split,
            mfact: 0.9,
            nmaster: 2,
        };

        m.set_view((1 << 2) | (1 << 3));

        assert_eq!(m.view_tag, 0);
        assert_eq!(m.layout, Layout::Tile);
    }

    #[test_case(1, 0b0011, true; "toggling a new tag in")]
    #[test_case(0b0011, 0b0001, true; "toggling a tag out")]
    #[test_case(0b0010, 0, false; "refusing to empty the tagset")]
    #[test]
    fn toggle_view(initial_extra: u32, expected: u32, changed: bool) {
        let mut m = test_monitor();
        m.tagset[m.sel_tags] = if initial_extra == 1 { 1 } else { initial_extra };

        assert_eq!(m.toggle_view(0b0010), changed);
        if changed {
            assert_eq!(m.active_tagset(), expected);
        }
    }

    #[test]
    fn active_field_changes_write_back_to_tag_memory() {
        let mut m = test_monitor();
        m.set_view(1 << 3);

        m.set_mfact(0.75);
        m.set_nmaster(2);
        m.set_layout(Layout::Split);

        assert_eq!(
            m.tag_layouts[3],
            TagLayout {
                layout: Layout::Split,
                mfact: 0.75,
                nmaster: 2
            }
        );

        // Other tags are untouched
        assert_eq!(m.tag_layouts[0].mfact, 0.55);
    }

    #[test]
    fn detach_stack_reselects_first_visible() {
        let mut m = test_monitor();
        for n in 1..=3 {
            m.attach(Xid(n));
            m.attach_stack(Xid(n));
        }
        m.sel = Some(Xid(3));

        m.detach_stack(Xid(3), |id| id == Xid(1));

        assert_eq!(m.sel, Some(Xid(1)));
        assert_eq!(m.stack, vec![Xid(2), Xid(1)]);
        assert_eq!(m.clients, vec![Xid(3), Xid(2), Xid(1)]);
    }
}
