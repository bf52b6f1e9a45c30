//! The closed set of client arrangement algorithms
use crate::{
    core::{clients, State},
    pure::geometry::Rect,
    x::XConn,
    Result,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The available layouts.
///
/// The floating layout arranges clients to their remembered floating
/// rectangles; everywhere the manager asks "does this layout tile?",
/// floating is the one that does not.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Clients keep their remembered floating rectangles
    Floating,
    /// Master column on the left, stack column on the right
    Tile,
    /// Every visible client fills the usable area
    Monocle,
    /// Master row on top, stack row below
    Split,
}

/// All layouts in the cycling order used by next-layout bindings.
pub const LAYOUTS: [Layout; 4] = [Layout::Floating, Layout::Tile, Layout::Monocle, Layout::Split];

impl Layout {
    /// The symbol shown in the bar for this layout.
    pub fn symbol(&self) -> &'static str {
        match self {
            Layout::Floating => "[F]",
            Layout::Tile => "[T]",
            Layout::Monocle => "[M]",
            Layout::Split => "[S]",
        }
    }

    /// Position of this layout in [LAYOUTS].
    pub fn index(&self) -> usize {
        LAYOUTS.iter().position(|l| l == self).expect("closed set")
    }
}

/// Run the active layout for a monitor, repositioning every tiled
/// visible client.
pub(crate) fn arrange_clients<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    match state.monitors[m].layout {
        Layout::Floating => floating(state, x, m),
        Layout::Tile => tile(state, x, m),
        Layout::Monocle => monocle(state, x, m),
        Layout::Split => split(state, x, m),
    }
}

fn floating<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    for id in state.tiled_visible(m) {
        let r = state.clients[&id].float_rect;
        clients::resize(state, x, id, r, false)?;
    }

    Ok(())
}

fn tile<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    let ids = state.tiled_visible(m);
    let n = ids.len() as u32;
    if n == 0 {
        return Ok(());
    }

    let mon = &state.monitors[m];
    let (nmaster, mfact) = (mon.nmaster, mon.mfact);
    let wa = mon.window_area;

    let mw = if n > nmaster {
        if nmaster > 0 {
            (wa.w as f32 * mfact) as u32
        } else {
            0
        }
    } else {
        wa.w
    };

    let (mut my, mut ty) = (0u32, 0u32);
    for (i, id) in ids.into_iter().enumerate() {
        let i = i as u32;
        let bw = state.clients[&id].bw;

        if i < nmaster {
            let h = wa.h.saturating_sub(my) / (n.min(nmaster) - i);
            let r = Rect::new(
                wa.x,
                wa.y + my as i32,
                mw.saturating_sub(2 * bw),
                h.saturating_sub(2 * bw),
            );
            clients::resize(state, x, id, r, false)?;
            my += state.clients[&id].outer_h() as u32;
        } else {
            let h = wa.h.saturating_sub(ty) / (n - i);
            let r = Rect::new(
                wa.x + mw as i32,
                wa.y + ty as i32,
                (wa.w - mw).saturating_sub(2 * bw),
                h.saturating_sub(2 * bw),
            );
            clients::resize(state, x, id, r, false)?;
            ty += state.clients[&id].outer_h() as u32;
        }
    }

    Ok(())
}

fn split<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    let ids = state.tiled_visible(m);
    let n = ids.len() as u32;
    if n == 0 {
        return Ok(());
    }

    let mon = &state.monitors[m];
    let (nmaster, mfact) = (mon.nmaster, mon.mfact);
    let wa = mon.window_area;

    let mh = if n > nmaster {
        if nmaster > 0 {
            (wa.h as f32 * mfact) as u32
        } else {
            0
        }
    } else {
        wa.h
    };

    let (mut mx, mut tx) = (0u32, 0u32);
    for (i, id) in ids.into_iter().enumerate() {
        let i = i as u32;
        let bw = state.clients[&id].bw;

        if i < nmaster {
            let w = wa.w.saturating_sub(mx) / (n.min(nmaster) - i);
            let r = Rect::new(
                wa.x + mx as i32,
                wa.y,
                w.saturating_sub(2 * bw),
                mh.saturating_sub(2 * bw),
            );
            clients::resize(state, x, id, r, false)?;
            mx += state.clients[&id].outer_w() as u32;
        } else {
            let w = wa.w.saturating_sub(tx) / (n - i);
            let r = Rect::new(
                wa.x + tx as i32,
                wa.y + mh as i32,
                w.saturating_sub(2 * bw),
                (wa.h - mh).saturating_sub(2 * bw),
            );
            clients::resize(state, x, id, r, false)?;
            tx += state.clients[&id].outer_w() as u32;
        }
    }

    Ok(())
}

fn monocle<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    let n = state.visible(m).len();
    if n > 0 {
        // The layout symbol advertises the number of stacked clients
        state.monitors[m].layout_symbol = format!("[{}]", n);
    }

    let wa = state.monitors[m].window_area;
    for id in state.tiled_visible(m) {
        let bw = state.clients[&id].bw;
        let r = Rect::new(
            wa.x,
            wa.y,
            wa.w.saturating_sub(2 * bw),
            wa.h.saturating_sub(2 * bw),
        );
        clients::resize(state, x, id, r, false)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_indices_match_cycling_order() {
        for (i, l) in LAYOUTS.iter().enumerate() {
            assert_eq!(l.index(), i);
        }
    }

    #[test]
    fn symbols_are_distinct() {
        let mut syms: Vec<&str> = LAYOUTS.iter().map(|l| l.symbol()).collect();
        syms.dedup();

        assert_eq!(syms.len(), LAYOUTS.len());
    }
}
