//! Interactive mouse gestures.
//!
//! Gestures run a nested event pump over the same X queue as the main
//! loop: pointer events and the chosen terminator are consumed here,
//! configure / expose / map requests are re-dispatched through the
//! normal handlers so that foreign clients keep advancing during a
//! drag, and anything else is buffered for the main loop.
use crate::{
    core::{actions, clients, handle, layout::Layout, State, Xid},
    pure::geometry::Rect,
    x::{event::MouseEvent, event::XEvent, CursorKind, XConn},
    Result,
};
use tracing::trace;

/// The event that ends a gesture pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitFor {
    /// Stop on the next button press
    Press,
    /// Stop on the next button release
    Release,
}

/// Pump events until the terminator arrives, re-dispatching the events
/// foreign clients need and firing edge actions on pointer motion.
///
/// Returns `None` if the pointer grab was refused.
pub(crate) fn wait_mouse<X: XConn>(
    state: &mut State,
    x: &X,
    until: WaitFor,
) -> Result<Option<MouseEvent>> {
    if !x.grab_pointer(CursorKind::Move)? {
        return Ok(None);
    }

    let ev = loop {
        match x.next_event()? {
            XEvent::ConfigureRequest(e) => handle::configure_request(e, state, x)?,
            XEvent::Expose(e) => handle::expose(e, state, x)?,
            XEvent::MapRequest(id) => handle::map_request(id, state, x)?,
            XEvent::MotionNotify(_) => side_handle(state, x)?,
            XEvent::ButtonPress(m) => {
                if until == WaitFor::Press {
                    break m;
                }
            }
            XEvent::ButtonRelease(m) => {
                if until == WaitFor::Release {
                    break m;
                }
            }
            other => state.pending.push_back(other),
        }
    };

    x.ungrab_pointer()?;

    Ok(Some(ev))
}

/// A gesture is cancelled by putting the pointer in the root origin.
pub(crate) fn is_cancelled<X: XConn>(x: &X) -> bool {
    x.cursor_position()
        .map(|p| p.x == 0 && p.y == 0)
        .unwrap_or(false)
}

/// Let the user pick a client with the pointer.
///
/// Returns the client under the press, the currently selected client if
/// requested and the press landed nowhere useful, or `None` when the
/// gesture was cancelled or hit the root window.
pub(crate) fn client_click<X: XConn>(
    state: &mut State,
    x: &X,
    wait_release: bool,
    return_current: bool,
) -> Result<Option<Xid>> {
    let Some(press) = wait_mouse(state, x, WaitFor::Press)? else {
        return Ok(None);
    };
    if wait_release {
        wait_mouse(state, x, WaitFor::Release)?;
    }

    let target = press.child.unwrap_or(Xid(0));
    if is_cancelled(x) || target == x.root() {
        return Ok(None);
    }

    if state.clients.contains_key(&target) {
        Ok(Some(target))
    } else if return_current {
        Ok(state.selmon().sel)
    } else {
        Ok(None)
    }
}

/// Drag the selected client to a new position, untiling it first if
/// necessary. The new position is applied on release.
pub(crate) fn move_mouse<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let Some(sel) = state.selected() else {
        return Ok(());
    };
    if state.clients[&sel].is_fullscreen {
        return Ok(());
    }

    clients::restack(state, x, state.sel_mon)?;

    // Keep the pointer reachable: warp it onto the top left corner
    let c = &state.clients[&sel];
    if c.rect.x + c.bw as i32 > 0 && c.rect.y + c.bw as i32 > 0 {
        x.warp_pointer(sel, -(c.bw as i16), -(c.bw as i16))?;
    }
    if x.cursor_position().is_err() {
        return Ok(());
    }

    let Some(release) = wait_mouse(state, x, WaitFor::Release)? else {
        return Ok(());
    };
    if is_cancelled(x) {
        trace!("move gesture cancelled");
        return Ok(());
    }

    let floating = state.selmon().layout == Layout::Floating;
    if let Some(c) = state.clients.get_mut(&sel) {
        if !c.is_free && !floating {
            c.is_free = true;
        }
    }

    let (w, h) = {
        let c = &state.clients[&sel];
        (c.rect.w, c.rect.h)
    };
    clients::resize(
        state,
        x,
        sel,
        Rect::new(release.rpt.x, release.rpt.y, w, h),
        true,
    )?;

    if !floating && state.clients[&sel].is_free {
        clients::arrange(state, x, Some(state.sel_mon))?;
    }

    Ok(())
}

/// Drag out a new size for the selected client from its top left
/// corner, untiling it first if the result stays on the monitor. The
/// client migrates monitors when its final rectangle mostly leaves the
/// current one.
pub(crate) fn resize_mouse<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let Some(sel) = state.selected() else {
        return Ok(());
    };
    if state.clients[&sel].is_fullscreen {
        return Ok(());
    }

    clients::restack(state, x, state.sel_mon)?;

    let (sw, sh) = state.screen_size;
    let c = &state.clients[&sel];
    if c.rect.right() < sw as i32 && c.rect.bottom() < sh as i32 {
        x.warp_pointer(
            sel,
            (c.rect.w - c.bw) as i16,
            (c.rect.h - c.bw) as i16,
        )?;
    }

    let Some(release) = wait_mouse(state, x, WaitFor::Release)? else {
        return Ok(());
    };
    if is_cancelled(x) {
        trace!("resize gesture cancelled");
        return Ok(());
    }

    let (cx, cy) = {
        let c = &state.clients[&sel];
        (c.rect.x, c.rect.y)
    };
    let nw = std::cmp::max(1, release.rpt.x - cx) as u32;
    let nh = std::cmp::max(1, release.rpt.y - cy) as u32;

    let wa = state.selmon().window_area;
    let floating = state.selmon().layout == Layout::Floating;
    // Untile only when the dragged-out size still fits the usable area
    if nw <= wa.w && nh <= wa.h {
        if let Some(c) = state.clients.get_mut(&sel) {
            if !c.is_free && !floating {
                c.is_free = true;
            }
        }
    }

    clients::resize(state, x, sel, Rect::new(cx, cy, nw, nh), true)?;
    if !floating && state.clients[&sel].is_free {
        clients::arrange(state, x, Some(state.sel_mon))?;
    }

    // Park the pointer on the new bottom right corner so a plain click
    // does not grow the window
    let c = &state.clients[&sel];
    x.warp_pointer(
        sel,
        (c.rect.w + c.bw - 1) as i16,
        (c.rect.h + c.bw - 1) as i16,
    )?;

    while let Some(ev) = x.poll_event()? {
        match ev {
            XEvent::Enter(_) => (),
            other => state.pending.push_back(other),
        }
    }

    let r = state.clients[&sel].rect;
    let target = state.rect_to_monitor(r);
    if target != state.sel_mon {
        clients::send_to_monitor(state, x, sel, target)?;
        state.sel_mon = target;
        clients::focus(state, x, None)?;
    }

    Ok(())
}

/// Click-to-act: pick a client with the pointer, then run the move
/// gesture on it, restoring the pointer afterwards.
pub(crate) fn move_click<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let p = x.cursor_position().unwrap_or_default();
    let Some(c) = client_click(state, x, false, true)? else {
        return Ok(());
    };

    clients::focus(state, x, Some(c))?;
    move_mouse(state, x)?;
    x.warp_pointer(x.root(), p.x as i16, p.y as i16)?;

    Ok(())
}

/// Click-to-act resize.
pub(crate) fn resize_click<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let p = x.cursor_position().unwrap_or_default();
    let Some(c) = client_click(state, x, false, true)? else {
        return Ok(());
    };

    clients::focus(state, x, Some(c))?;
    resize_mouse(state, x)?;
    x.warp_pointer(x.root(), p.x as i16, p.y as i16)?;

    Ok(())
}

/// Click-to-act kill.
pub(crate) fn kill_click<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let p = x.cursor_position().unwrap_or_default();
    let Some(c) = client_click(state, x, false, true)? else {
        return Ok(());
    };

    clients::focus(state, x, Some(c))?;
    if let Some(sel) = state.selected() {
        clients::kill_client(x, sel)?;
    }
    x.warp_pointer(x.root(), p.x as i16, p.y as i16)?;

    Ok(())
}

/// Fire the configured actions for whichever screen edges the pointer
/// is currently touching.
pub(crate) fn side_handle<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    use crate::core::bindings::Side;

    let Ok(p) = x.cursor_position() else {
        return Ok(());
    };
    let (sw, sh) = state.screen_size;

    let mut active = Vec::with_capacity(2);
    if p.x == sw as i32 - 1 {
        active.push(Side::Right);
    } else if p.x == 0 {
        active.push(Side::Left);
    }
    if p.y == sh as i32 - 1 {
        active.push(Side::Down);
    } else if p.y == 0 {
        active.push(Side::Up);
    }
    if active.is_empty() {
        return Ok(());
    }

    let matched: Vec<_> = state
        .config
        .sides
        .iter()
        .filter(|s| active.contains(&s.side))
        .map(|s| s.action.clone())
        .collect();

    for action in matched {
        actions::dispatch(&action, state, x)?;
    }

    Ok(())
}

/// Scroll the virtual desktop by translating every tiled client's
/// floating origin.
///
/// Only defined for the floating layout on a single monitor setup.
pub(crate) fn scroll_desk<X: XConn>(
    state: &mut State,
    x: &X,
    dx: i32,
    dy: i32,
    warp: bool,
) -> Result<()> {
    if state.selmon().layout != Layout::Floating || state.monitors.len() > 1 {
        return Ok(());
    }

    if warp {
        let Ok(p) = x.cursor_position() else {
            return Ok(());
        };
        move_wins(state, x, state.sel_mon, dx, dy)?;
        x.warp_pointer(x.root(), (p.x + dx) as i16, (p.y + dy) as i16)?;
    } else {
        move_wins(state, x, state.sel_mon, dx, dy)?;
        let bar_win = state.selmon().bar_win;
        if bar_win != Xid(0) {
            x.raise(bar_win)?;
        }
    }

    Ok(())
}

fn move_wins<X: XConn>(state: &mut State, x: &X, m: usize, dx: i32, dy: i32) -> Result<()> {
    let ids = state.monitors[m].clients.clone();
    for id in ids {
        if let Some(c) = state.clients.get_mut(&id) {
            if !c.is_free {
                c.float_rect.x += dx;
                c.float_rect.y += dy;
            }
        }
    }

    clients::arrange(state, x, Some(m))
}
