//! The actions that key, button and edge bindings can invoke.
//!
//! Actions are plain data so that the binding tables stay pure and the
//! same dispatcher can serve key presses, bar clicks and screen-edge
//! triggers alike.
use crate::{
    core::{
        bar, clients,
        layout::{Layout, LAYOUTS},
        mouse, request_quit, State, Xid,
    },
    pure::geometry::Rect,
    util,
    x::XConn,
    Result,
};
use tracing::error;

/// Something a binding can do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Re-focus the selected client, re-asserting grabs and input focus
    FocusCurrent,
    /// Focus the next (+1) or previous (-1) monitor
    FocusMon(i32),
    /// Focus the next or previous visible client, optionally warping
    /// the pointer to it
    FocusStack {
        /// +1 forward, -1 backward through the client list
        dir: i32,
        /// Warp the pointer to the newly focused client's centre
        warp: bool,
    },
    /// Change the number of master clients; 0 resets to one
    IncNMaster(i32),
    /// Pick a client with the pointer and close it
    KillClick,
    /// Close the selected client
    KillClient,
    /// Push the selected client to the bottom of the stacking order
    LowerFocused,
    /// Pick a client with the pointer and drag it
    MoveClick,
    /// Drag the selected client
    MoveMouse,
    /// Cycle forwards or backwards through the layout set
    NextLayout(i32),
    /// Exit the event loop, optionally re-executing the process
    Quit {
        /// Re-exec after teardown instead of exiting
        restart: bool,
    },
    /// Raise the selected client to the top of the stacking order
    RaiseFocused,
    /// Pick a client with the pointer and drag out a new size
    ResizeClick,
    /// Drag out a new size for the selected client
    ResizeMouse,
    /// Scroll the virtual desktop horizontally
    ScrollDeskH {
        /// Pixels to translate by (sign gives direction)
        amount: i32,
        /// Move the pointer along with the clients
        warp: bool,
    },
    /// Scroll the virtual desktop vertically
    ScrollDeskV {
        /// Pixels to translate by (sign gives direction)
        amount: i32,
        /// Move the pointer along with the clients
        warp: bool,
    },
    /// Switch the selected monitor to the given layout
    SetLayout(Layout),
    /// Adjust mfact by a delta (< 1.0) or set it absolutely (>= 1.0)
    SetMFact(f32),
    /// Spawn an external command
    Spawn(Vec<String>),
    /// Move the selected client to the given tags (0 = clicked tag)
    Tag(u32),
    /// Send the selected client to another monitor
    TagMon(i32),
    /// Show or hide the bar on the selected monitor
    ToggleBar,
    /// Toggle the selected client between tiled and floating
    ToggleFree,
    /// Toggle fullscreen on the selected client
    ToggleFullscreen,
    /// Toggle tags on the selected client (0 = clicked tag)
    ToggleTag(u32),
    /// Toggle tags in the current view (0 = clicked tag)
    ToggleView(u32),
    /// View the given tags (0 = previously viewed tags / clicked tag)
    View(u32),
    /// View the next (+1) or previous (-1) single tag
    ViewNext(i32),
    /// Move the selected client into the master position
    Zoom,
}

/// Bar tag-cell bindings declared with a zero mask receive the clicked
/// tag instead.
pub(crate) fn with_tag_arg(action: &Action, tag: u32) -> Action {
    match action {
        Action::View(0) => Action::View(tag),
        Action::ToggleView(0) => Action::ToggleView(tag),
        Action::Tag(0) => Action::Tag(tag),
        Action::ToggleTag(0) => Action::ToggleTag(tag),
        a => a.clone(),
    }
}

/// Run a single action against the current state.
pub(crate) fn dispatch<X: XConn>(action: &Action, state: &mut State, x: &X) -> Result<()> {
    use Action::*;

    match action {
        FocusCurrent => {
            let sel = state.selected();
            clients::focus(state, x, sel)
        }
        FocusMon(dir) => focus_mon(state, x, *dir),
        FocusStack { dir, warp } => focus_stack(state, x, *dir, *warp),
        IncNMaster(i) => inc_nmaster(state, x, *i),
        KillClick => mouse::kill_click(state, x),
        KillClient => match state.selected() {
            Some(sel) => clients::kill_client(x, sel),
            None => Ok(()),
        },
        LowerFocused => match state.selected() {
            Some(sel) => x.lower(sel),
            None => Ok(()),
        },
        MoveClick => mouse::move_click(state, x),
        MoveMouse => mouse::move_mouse(state, x),
        NextLayout(dir) => next_layout(state, x, *dir),
        Quit { restart } => {
            request_quit(*restart);
            Ok(())
        }
        RaiseFocused => match state.selected() {
            Some(sel) => x.raise(sel),
            None => Ok(()),
        },
        ResizeClick => mouse::resize_click(state, x),
        ResizeMouse => mouse::resize_mouse(state, x),
        ScrollDeskH { amount, warp } => mouse::scroll_desk(state, x, *amount, 0, *warp),
        ScrollDeskV { amount, warp } => mouse::scroll_desk(state, x, 0, *amount, *warp),
        SetLayout(layout) => set_layout(state, x, *layout),
        SetMFact(f) => set_mfact(state, x, *f),
        Spawn(cmd) => {
            if let Err(e) = util::spawn_argv(cmd) {
                error!(%e, ?cmd, "error spawning command");
            }
            Ok(())
        }
        Tag(mask) => tag(state, x, *mask),
        TagMon(dir) => tag_mon(state, x, *dir),
        ToggleBar => toggle_bar(state, x),
        ToggleFree => toggle_free(state, x),
        ToggleFullscreen => match state.selected() {
            Some(sel) => {
                let fs = state.clients[&sel].is_fullscreen;
                clients::set_fullscreen(state, x, sel, !fs)
            }
            None => Ok(()),
        },
        ToggleTag(mask) => toggle_tag(state, x, *mask),
        ToggleView(mask) => toggle_view(state, x, *mask),
        View(mask) => view(state, x, *mask),
        ViewNext(dir) => view_next(state, x, *dir),
        Zoom => zoom(state, x),
    }
}

/// Switch the view of the selected monitor, keeping one step of tagset
/// history for toggle-back.
pub(crate) fn view<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let all = state.all_tags();
    if state.selmon_mut().set_view(mask & all) {
        clients::focus(state, x, None)?;
        clients::arrange(state, x, Some(state.sel_mon))?;
    }

    Ok(())
}

fn view_next<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let n = state.config.tags.len() as i32;
    let mut i = (state.selmon().view_tag as i32 + dir) % n;
    if i < 0 {
        i += n;
    }

    view(state, x, 1 << i)
}

fn toggle_view<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let all = state.all_tags();
    if state.selmon_mut().toggle_view(mask & all) {
        clients::focus(state, x, None)?;
        clients::arrange(state, x, Some(state.sel_mon))?;
    }

    Ok(())
}

fn tag<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let all = state.all_tags();
    let Some(sel) = state.selected() else {
        return Ok(());
    };
    if mask & all == 0 {
        return Ok(());
    }

    if let Some(c) = state.clients.get_mut(&sel) {
        c.tags = mask & all;
    }
    clients::focus(state, x, None)?;
    clients::arrange(state, x, Some(state.sel_mon))
}

fn toggle_tag<X: XConn>(state: &mut State, x: &X, mask: u32) -> Result<()> {
    let all = state.all_tags();
    let Some(sel) = state.selected() else {
        return Ok(());
    };

    let new_tags = state.clients[&sel].tags ^ (mask & all);
    if new_tags == 0 {
        return Ok(());
    }

    if let Some(c) = state.clients.get_mut(&sel) {
        c.tags = new_tags;
    }
    clients::focus(state, x, None)?;
    clients::arrange(state, x, Some(state.sel_mon))
}

fn zoom<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let m = state.sel_mon;
    let Some(sel) = state.selected() else {
        return Ok(());
    };
    if state.clients[&sel].is_free {
        return Ok(());
    }

    let tiled = state.tiled_visible(m);
    let target = if tiled.first() == Some(&sel) {
        match tiled.get(1) {
            Some(&next) => next,
            None => return Ok(()),
        }
    } else {
        sel
    };

    // pop: move to the head of the client list and take focus
    state.monitors[m].detach(target);
    state.monitors[m].attach(target);
    clients::focus(state, x, Some(target))?;
    clients::arrange(state, x, Some(m))
}

/// A delta below 1.0 adjusts mfact; a value above 1.0 sets it
/// absolutely (shifted down by one).
fn set_mfact<X: XConn>(state: &mut State, x: &X, arg: f32) -> Result<()> {
    let m = state.sel_mon;
    if state.tiled_visible(m).len() < 2 || state.monitors[m].layout == Layout::Floating {
        return Ok(());
    }

    let f = if arg < 1.0 {
        arg + state.monitors[m].mfact
    } else {
        arg - 1.0
    };
    if !(0.1..=0.9).contains(&f) {
        return Ok(());
    }

    state.monitors[m].set_mfact(f);
    clients::arrange(state, x, Some(m))
}

fn inc_nmaster<X: XConn>(state: &mut State, x: &X, i: i32) -> Result<()> {
    let m = state.sel_mon;
    let new = if i == 0 {
        1
    } else {
        let n = state.tiled_visible(m).len() as i32;
        let requested = state.monitors[m].nmaster as i32 + i;
        if requested > n {
            // Wrap past the number of tiled clients back to one
            1
        } else if requested < 0 {
            std::cmp::max(n + i, 0)
        } else {
            requested
        }
    };

    state.monitors[m].set_nmaster(new as u32);
    clients::arrange(state, x, Some(m))
}

fn set_layout<X: XConn>(state: &mut State, x: &X, layout: Layout) -> Result<()> {
    if state.selmon().layout == layout {
        return Ok(());
    }

    state.selmon_mut().set_layout(layout);
    clients::arrange(state, x, Some(state.sel_mon))?;
    bar::draw_bar(state, state.sel_mon)
}

fn next_layout<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    let i = state.selmon().layout.index() as i32 + dir;
    let i = if i < 0 {
        LAYOUTS.len() - 1
    } else {
        i as usize % LAYOUTS.len()
    };

    set_layout(state, x, LAYOUTS[i])
}

fn toggle_bar<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let m = state.sel_mon;
    let bar_h = state.bar_h;

    let mon = state.selmon_mut();
    mon.show_bar = !mon.show_bar;
    mon.update_bar_pos(bar_h);

    let mon = state.selmon();
    if mon.bar_win != Xid(0) {
        let r = Rect::new(mon.window_area.x, mon.bar_y, mon.window_area.w, bar_h);
        x.position_client(mon.bar_win, r, 0)?;
    }

    clients::arrange(state, x, Some(m))
}

fn toggle_free<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let m = state.sel_mon;
    let Some(sel) = state.selected() else {
        return Ok(());
    };
    // Fullscreen windows stay where they are
    if state.clients[&sel].is_fullscreen {
        return Ok(());
    }

    let floating = state.monitors[m].layout == Layout::Floating;
    let restore = {
        let c = state.clients.get_mut(&sel).expect("selected client exists");
        c.is_free = !c.is_free || c.hints.is_fixed();
        (c.is_free && !floating).then_some(c.free_rect)
    };

    if let Some(r) = restore {
        clients::resize(state, x, sel, r, false)?;
    }

    clients::arrange(state, x, Some(m))
}

fn focus_stack<X: XConn>(state: &mut State, x: &X, dir: i32, warp: bool) -> Result<()> {
    let Some(sel) = state.selected() else {
        return Ok(());
    };

    let list = state.selmon().clients.clone();
    let pos = list.iter().position(|&c| c == sel).unwrap_or(0);

    let target = if dir > 0 {
        list[pos + 1..]
            .iter()
            .copied()
            .find(|&c| state.is_visible(c))
            .or_else(|| list.iter().copied().find(|&c| state.is_visible(c)))
    } else {
        list[..pos]
            .iter()
            .copied()
            .filter(|&c| state.is_visible(c))
            .last()
            .or_else(|| {
                list[pos..]
                    .iter()
                    .copied()
                    .filter(|&c| state.is_visible(c))
                    .last()
            })
    };

    if let Some(t) = target {
        clients::focus(state, x, Some(t))?;
        if warp {
            if let Some(s) = state.selected() {
                let c = &state.clients[&s];
                x.warp_pointer(s, (c.rect.w / 2) as i16, (c.rect.h / 2) as i16)?;
            }
        }
        clients::restack(state, x, state.sel_mon)?;
    }

    Ok(())
}

fn focus_mon<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    if state.monitors.len() < 2 {
        return Ok(());
    }
    let m = state.dir_to_monitor(dir);
    if m == state.sel_mon {
        return Ok(());
    }

    if let Some(sel) = state.selected() {
        clients::unfocus(state, x, sel, false)?;
    }
    state.sel_mon = m;
    clients::focus(state, x, None)?;

    if let Some(s) = state.selected() {
        let c = &state.clients[&s];
        x.warp_pointer(s, (c.rect.w / 2) as i16, (c.rect.h / 2) as i16)?;
    }

    Ok(())
}

fn tag_mon<X: XConn>(state: &mut State, x: &X, dir: i32) -> Result<()> {
    if state.monitors.len() < 2 {
        return Ok(());
    }
    let Some(sel) = state.selected() else {
        return Ok(());
    };

    let target = state.dir_to_monitor(dir);
    clients::send_to_monitor(state, x, sel, target)
}
