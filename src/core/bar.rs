//! The bar surface feed.
//!
//! The window manager does not paint the bar itself: it computes the
//! values a drawing helper needs (status text, tag occupancy, layout
//! symbol, focused title) and hands them to a [BarDraw] implementation.
//! The same implementation reports text widths so that clicks on the
//! bar can be resolved back to regions.
use crate::{
    core::{bindings::ClickRegion, State, Xid},
    Result,
};

/// One tag cell in the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCell {
    /// The configured tag label
    pub label: String,
    /// Whether the tag is part of the active tagset
    pub selected: bool,
    /// Whether any client is on this tag
    pub occupied: bool,
    /// Whether an urgent client is on this tag
    pub urgent: bool,
    /// Whether the selected client is on this tag
    pub has_sel: bool,
}

/// The focused client title cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCell {
    /// The client title
    pub name: String,
    /// Whether the client is floating (drawn as a marker box)
    pub is_free: bool,
    /// Whether the client is fixed size (fills the marker box)
    pub is_fixed: bool,
}

/// Everything a drawing helper needs to paint one monitor's bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarContent {
    /// Whether this is the selected monitor
    pub focused: bool,
    /// Tag cells, left to right
    pub tags: Vec<TagCell>,
    /// The active layout symbol
    pub layout_symbol: String,
    /// Status text; only present on the selected monitor
    pub status: Option<String>,
    /// The selected client's title cell, if there is one
    pub title: Option<TitleCell>,
}

/// The drawing helper the bar surface feeds.
///
/// Implementations own fonts and colors; the window manager only needs
/// the bar height and text extents back from them.
pub trait BarDraw: std::fmt::Debug {
    /// The height of the bar in pixels.
    fn height(&self) -> u32;

    /// The width in pixels the given text occupies, padding included.
    fn text_width(&self, text: &str) -> u32;

    /// Paint one monitor's bar window from the given content.
    fn draw(&mut self, bar_win: Xid, content: &BarContent) -> Result<()>;
}

/// A [BarDraw] used until a real drawing helper is attached: paints
/// nothing and reports a fixed glyph advance for hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct NullDraw {
    bar_h: u32,
}

impl NullDraw {
    /// Create a placeholder renderer with the given bar height.
    pub fn new(bar_h: u32) -> Self {
        Self { bar_h }
    }
}

impl Default for NullDraw {
    fn default() -> Self {
        Self { bar_h: 14 }
    }
}

impl BarDraw for NullDraw {
    fn height(&self) -> u32 {
        self.bar_h
    }

    fn text_width(&self, text: &str) -> u32 {
        // Fixed advance plus the left/right padding a fontset would add
        7 * text.chars().count() as u32 + self.bar_h.saturating_sub(2)
    }

    fn draw(&mut self, _: Xid, _: &BarContent) -> Result<()> {
        Ok(())
    }
}

/// Compute the content for one monitor's bar.
pub fn content(state: &State, m: usize) -> BarContent {
    let mon = &state.monitors[m];
    let tagset = mon.active_tagset();
    let focused = m == state.sel_mon;

    let mut occ = 0u32;
    let mut urg = 0u32;
    for &id in mon.clients.iter() {
        if let Some(c) = state.clients.get(&id) {
            occ |= c.tags;
            if c.is_urgent {
                urg |= c.tags;
            }
        }
    }

    let sel_tags = mon
        .sel
        .and_then(|id| state.clients.get(&id))
        .map(|c| c.tags)
        .unwrap_or(0);

    let tags = state
        .config
        .tags
        .iter()
        .enumerate()
        .map(|(i, label)| TagCell {
            label: label.clone(),
            selected: tagset & (1 << i) != 0,
            occupied: occ & (1 << i) != 0,
            urgent: urg & (1 << i) != 0,
            has_sel: focused && sel_tags & (1 << i) != 0,
        })
        .collect();

    let title = mon.sel.and_then(|id| state.clients.get(&id)).map(|c| TitleCell {
        name: c.name.clone(),
        is_free: c.is_free,
        is_fixed: c.hints.is_fixed(),
    });

    BarContent {
        focused,
        tags,
        layout_symbol: mon.layout_symbol.clone(),
        status: focused.then(|| state.status_text.clone()),
        title,
    }
}

/// Recompute and paint one monitor's bar.
pub fn draw_bar(state: &mut State, m: usize) -> Result<()> {
    let bar_win = state.monitors[m].bar_win;
    if bar_win == Xid(0) {
        return Ok(());
    }

    let content = content(state, m);
    state.bar.draw(bar_win, &content)
}

/// Recompute and paint every bar.
pub fn draw_bars(state: &mut State) -> Result<()> {
    for m in 0..state.monitors.len() {
        draw_bar(state, m)?;
    }

    Ok(())
}

/// Resolve a click at bar-relative x into the region it landed on, with
/// the tag mask for tag cell hits.
///
/// Only the selected monitor's bar receives clicks: the status text is
/// drawn there alone, so its width is part of the calculation.
pub fn click_at(state: &State, m: usize, click_x: i32) -> (ClickRegion, Option<u32>) {
    let mon = &state.monitors[m];

    let mut x = 0i32;
    for (i, label) in state.config.tags.iter().enumerate() {
        x += state.bar.text_width(label) as i32;
        if click_x < x {
            return (ClickRegion::TagBar, Some(1 << i));
        }
    }

    let blw = state.bar.text_width(&mon.layout_symbol) as i32;
    if click_x < x + blw {
        return (ClickRegion::LayoutSymbol, None);
    }

    let status_w = state.bar.text_width(&state.status_text) as i32;
    if click_x > mon.window_area.w as i32 - status_w {
        return (ClickRegion::StatusText, None);
    }

    (ClickRegion::WinTitle, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    fn test_state() -> State {
        let mut state = State::new(Config::default(), Box::new(NullDraw::default())).unwrap();
        state.screen_size = (1920, 1080);
        state
            .monitors
            .push(crate::pure::Monitor::new(0, state.config.tag_layouts.clone(), true, true));
        state.monitors[0].screen = crate::pure::Rect::new(0, 0, 1920, 1080);
        state.monitors[0].update_bar_pos(14);

        state
    }

    #[test]
    fn clicks_on_tag_cells_resolve_to_their_masks() {
        let state = test_state();
        let w = state.bar.text_width("1") as i32;

        assert_eq!(click_at(&state, 0, 0), (ClickRegion::TagBar, Some(1)));
        assert_eq!(click_at(&state, 0, w), (ClickRegion::TagBar, Some(1 << 1)));
        assert_eq!(
            click_at(&state, 0, 9 * w - 1),
            (ClickRegion::TagBar, Some(1 << 8))
        );
    }

    #[test]
    fn click_past_the_tags_hits_the_layout_symbol() {
        let state = test_state();
        let tags_w = 9 * state.bar.text_width("1") as i32;

        assert_eq!(click_at(&state, 0, tags_w), (ClickRegion::LayoutSymbol, None));
    }

    #[test]
    fn click_at_the_right_edge_hits_the_status() {
        let mut state = test_state();
        state.status_text = "status".to_string();

        assert_eq!(click_at(&state, 0, 1919), (ClickRegion::StatusText, None));
    }

    #[test]
    fn click_in_the_middle_hits_the_title() {
        let mut state = test_state();
        state.status_text = "status".to_string();

        assert_eq!(click_at(&state, 0, 900), (ClickRegion::WinTitle, None));
    }

    #[test]
    fn content_reports_occupancy_and_urgency() {
        let mut state = test_state();
        let mut c = crate::pure::Client::new(Xid(7), crate::pure::Rect::new(0, 0, 10, 10), 0, 0);
        c.tags = 1 << 2;
        c.is_urgent = true;
        state.clients.insert(Xid(7), c);
        state.monitors[0].attach(Xid(7));

        let content = content(&state, 0);

        assert!(content.tags[2].occupied);
        assert!(content.tags[2].urgent);
        assert!(!content.tags[0].occupied);
        assert!(content.focused);
        assert_eq!(content.status, Some(String::new()));
    }
}
