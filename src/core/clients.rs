//! The window management kernel: every mutation of the client / monitor
//! graph and its reflection into the X server funnels through here.
use crate::{
    core::{bar, bindings::ClickRegion, keys_for_grab, layout, layout::Layout, State, Xid},
    pure::{
        geometry::{Point, Rect},
        Client, Monitor,
    },
    x::{event::XEvent, property::WmState, Atom, XConn},
    Error, Result,
};
use tracing::{debug, trace, warn};

/// Title presented for clients that do not set one.
pub const BROKEN: &str = "broken";

/// The name published via `_NET_SUPPORTING_WM_CHECK` and used as the
/// status text fallback.
pub const WM_NAME: &str = "rxwm";

fn wm_name_and_version() -> String {
    format!("{}-{}", WM_NAME, env!("CARGO_PKG_VERSION"))
}

/// Refresh the num lock mask and re-derive the root key grabs from the
/// key binding table.
pub(crate) fn grab_keys<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    state.numlock_mask = x.numlock_mask()?;
    x.grab_keys(&keys_for_grab(state), state.numlock_mask)
}

/// Re-derive the button grabs for a client, in focused or unfocused
/// mode.
pub(crate) fn grab_buttons_for<X: XConn>(
    state: &mut State,
    x: &X,
    id: Xid,
    focused: bool,
) -> Result<()> {
    if let Ok(mask) = x.numlock_mask() {
        state.numlock_mask = mask;
    }

    let buttons: Vec<_> = state
        .config
        .buttons
        .iter()
        .filter(|b| b.region == ClickRegion::ClientWin)
        .map(|b| (b.mods, b.button))
        .collect();

    x.grab_buttons(id, focused, &buttons, state.numlock_mask)
}

/// Apply position and size-hint policy to a candidate geometry and
/// reconfigure the client if the effective geometry changed.
pub(crate) fn resize<X: XConn>(
    state: &mut State,
    x: &X,
    id: Xid,
    r: Rect,
    interact: bool,
) -> Result<()> {
    let c = state.clients.get(&id).ok_or(Error::UnknownClient(id))?;
    let m = &state.monitors[c.monitor];

    let new = c.apply_size_hints(
        r,
        interact,
        state.screen_size,
        m.window_area,
        state.bar_h,
        state.config.resize_hints,
        m.layout == Layout::Floating,
    );

    if new != c.rect {
        resize_client(state, x, id, new)?;
    }

    Ok(())
}

/// Unconditionally apply a new geometry to a client and push it to the
/// X server.
pub(crate) fn resize_client<X: XConn>(state: &mut State, x: &X, id: Xid, r: Rect) -> Result<()> {
    let (bw, is_free, mon) = {
        let c = state.clients.get_mut(&id).ok_or(Error::UnknownClient(id))?;
        c.prev_rect = c.rect;
        c.rect = r;
        if c.is_free {
            c.free_rect = r;
            c.float_rect = r;
        }

        (c.bw, c.is_free, c.monitor)
    };

    if !is_free && state.monitors[mon].layout == Layout::Floating {
        if let Some(c) = state.clients.get_mut(&id) {
            c.float_rect = r;
        }
    }

    x.position_client(id, r, bw)?;
    x.send_configure_notify(id, r, bw)?;
    x.sync()?;

    Ok(())
}

/// Map or park every client on a monitor according to the active
/// tagset: shows run top down in focus order, hides bottom up.
pub(crate) fn show_hide<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    let stack = state.monitors[m].stack.clone();
    let floating = state.monitors[m].layout == Layout::Floating;

    for &id in stack.iter() {
        if !state.is_visible(id) {
            continue;
        }
        let (r, is_free, is_fullscreen) = {
            let c = &state.clients[&id];
            (c.rect, c.is_free, c.is_fullscreen)
        };
        x.move_client(id, Point::new(r.x, r.y))?;
        if (floating || is_free) && !is_fullscreen {
            resize(state, x, id, r, false)?;
        }
    }

    for &id in stack.iter().rev() {
        if state.is_visible(id) {
            continue;
        }
        let c = &state.clients[&id];
        x.move_client(id, Point::new(-2 * c.outer_w(), c.rect.y))?;
    }

    Ok(())
}

/// Re-run show/hide and the active layout for one monitor (restacking
/// afterwards) or for every monitor.
pub(crate) fn arrange<X: XConn>(state: &mut State, x: &X, target: Option<usize>) -> Result<()> {
    match target {
        Some(m) => {
            show_hide(state, x, m)?;
            arrange_monitor(state, x, m)?;
            restack(state, x, m)
        }
        None => {
            for m in 0..state.monitors.len() {
                show_hide(state, x, m)?;
            }
            for m in 0..state.monitors.len() {
                arrange_monitor(state, x, m)?;
            }

            Ok(())
        }
    }
}

pub(crate) fn arrange_monitor<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    let mon = &mut state.monitors[m];
    mon.layout_symbol = mon.layout.symbol().to_string();

    layout::arrange_clients(state, x, m)
}

/// Re-stack all tiled visible clients below the bar in focus order,
/// raising a floating selection above them first.
pub(crate) fn restack<X: XConn>(state: &mut State, x: &X, m: usize) -> Result<()> {
    bar::draw_bar(state, m)?;

    let Some(sel) = state.monitors[m].sel else {
        return Ok(());
    };

    let floating = state.monitors[m].layout == Layout::Floating;
    if state.clients[&sel].is_free && !floating {
        x.raise(sel)?;
    }

    let mut sibling = state.monitors[m].bar_win;
    for id in state.monitors[m].stack.clone() {
        if !state.clients[&id].is_free && state.is_visible(id) {
            x.stack_below(id, sibling)?;
            sibling = id;
        }
    }

    x.sync()?;

    // Drop the enter events generated by the restack so focus does not
    // chase the pointer; anything else is replayed to the main loop.
    while let Some(ev) = x.poll_event()? {
        match ev {
            XEvent::Enter(_) => (),
            other => state.pending.push_back(other),
        }
    }

    Ok(())
}

/// Focus a client, or the first visible client on the selected monitor
/// when `c` is `None` or not visible.
pub(crate) fn focus<X: XConn>(state: &mut State, x: &X, c: Option<Xid>) -> Result<()> {
    let mut target = c.filter(|&id| state.is_visible(id));
    if target.is_none() {
        target = state
            .selmon()
            .stack
            .iter()
            .copied()
            .find(|&id| state.is_visible(id));
    }

    if let Some(prev) = state.selmon().sel {
        if Some(prev) != target {
            unfocus(state, x, prev, false)?;
        }
    }

    match target {
        Some(id) => {
            let mon = state.clients[&id].monitor;
            if mon != state.sel_mon {
                state.sel_mon = mon;
            }
            if state.clients[&id].is_urgent {
                set_urgent(state, x, id, false);
            }

            // Move to the head of the focus stack
            let tagset = state.monitors[mon].active_tagset();
            let State {
                monitors, clients, ..
            } = state;
            monitors[mon].detach_stack(id, |i| {
                clients.get(&i).is_some_and(|c| c.is_visible_on(tagset))
            });
            state.monitors[mon].attach_stack(id);

            grab_buttons_for(state, x, id, true)?;
            x.set_border_color(id, state.config.selected_scheme.border)?;
            set_focus(state, x, id)?;
        }
        None => {
            x.set_input_focus(x.root())?;
            x.delete_prop(x.root(), Atom::NetActiveWindow)?;
        }
    }

    state.selmon_mut().sel = target;
    bar::draw_bars(state)?;

    Ok(())
}

/// Deliver input focus to a client, honouring `never_focus`, and
/// publish `_NET_ACTIVE_WINDOW`.
pub(crate) fn set_focus<X: XConn>(state: &mut State, x: &X, id: Xid) -> Result<()> {
    if !state.clients[&id].never_focus {
        x.set_input_focus(id)?;
        x.replace_window_prop(x.root(), Atom::NetActiveWindow, &[id])?;
    }
    x.send_protocol_message(id, Atom::WmTakeFocus)?;

    Ok(())
}

/// Return a client to the unfocused state, optionally handing input
/// focus back to the root window.
pub(crate) fn unfocus<X: XConn>(
    state: &mut State,
    x: &X,
    id: Xid,
    set_focus_root: bool,
) -> Result<()> {
    if !state.clients.contains_key(&id) {
        return Ok(());
    }

    grab_buttons_for(state, x, id, false)?;
    x.set_border_color(id, state.config.normal_scheme.border)?;

    if set_focus_root {
        x.set_input_focus(x.root())?;
        x.delete_prop(x.root(), Atom::NetActiveWindow)?;
    }

    Ok(())
}

/// Start managing a top level window: build its [Client], decide its
/// monitor and tags, then arrange, map and focus.
pub(crate) fn manage<X: XConn>(state: &mut State, x: &X, w: Xid) -> Result<()> {
    if state.clients.contains_key(&w) {
        return Ok(());
    }
    debug!(%w, "managing new client");

    let (r, old_bw) = x.window_geometry(w)?;
    let mut c = Client::new(w, r, old_bw, state.sel_mon);

    let name = x
        .text_prop(w, Atom::NetWmName)
        .ok()
        .flatten()
        .or_else(|| x.text_prop(w, Atom::WmName).ok().flatten())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| BROKEN.to_string());
    c.set_name(&name);

    let trans = x.transient_for(w).unwrap_or(None);
    let trans_parent = trans.and_then(|t| state.clients.get(&t));
    let is_trans = trans_parent.is_some();
    match trans_parent {
        Some(t) => {
            c.monitor = t.monitor;
            c.tags = t.tags;
        }
        None => {
            c.monitor = state.sel_mon;
            apply_rules(state, x, &mut c);
        }
    }

    // Keep the initial geometry inside the owning monitor and clear of
    // a top bar it would straddle
    let ms = state.monitors[c.monitor].screen;
    if c.rect.x + c.outer_w() > ms.right() {
        c.rect.x = ms.right() - c.outer_w();
    }
    if c.rect.y + c.outer_h() > ms.bottom() {
        c.rect.y = ms.bottom() - c.outer_h();
    }
    c.rect.x = std::cmp::max(c.rect.x, ms.x);
    let m = &state.monitors[c.monitor];
    let mid_x = c.rect.x + (c.rect.w / 2) as i32;
    let over_bar =
        m.bar_y == m.screen.y && mid_x >= m.window_area.x && mid_x < m.window_area.right();
    let min_y = if over_bar { state.bar_h as i32 } else { ms.y };
    c.rect.y = std::cmp::max(c.rect.y, min_y);

    c.bw = state.config.border_px;
    x.set_border_width(w, c.bw)?;
    x.set_border_color(w, state.config.normal_scheme.border)?;
    // Propagates the border width even when the size does not change
    x.send_configure_notify(w, c.rect, c.bw)?;

    let mon = c.monitor;
    state.clients.insert(w, c);

    update_window_type(state, x, w)?;
    update_size_hints(state, x, w);
    update_wm_hints(state, x, w);
    x.select_client_events(w)?;
    grab_buttons_for(state, x, w, false)?;

    let raise = {
        let c = state.clients.get_mut(&w).expect("just inserted");
        if c.is_free {
            true
        } else {
            c.is_free = is_trans || c.hints.is_fixed();
            c.old_state = c.is_free;
            false
        }
    };
    if raise {
        x.raise(w)?;
    }

    state.monitors[mon].attach(w);
    state.monitors[mon].attach_stack(w);
    x.append_window_prop(x.root(), Atom::NetClientList, &[w])?;

    // Some clients need to see movement before the map; park the window
    // off screen until the first arrange positions it
    let (park, bw) = {
        let c = &state.clients[&w];
        let sw = state.screen_size.0 as i32;
        (
            Rect::new(c.rect.x + 2 * sw, c.rect.y, c.rect.w, c.rect.h),
            c.bw,
        )
    };
    x.position_client(w, park, bw)?;
    x.set_wm_state(w, WmState::Normal)?;

    if mon == state.sel_mon {
        if let Some(prev) = state.selmon().sel {
            unfocus(state, x, prev, false)?;
        }
    }
    state.monitors[mon].sel = Some(w);

    arrange(state, x, Some(mon))?;
    x.map(w)?;
    focus(state, x, None)
}

/// Match a new client against the rules table, assigning floating
/// state, tags and a monitor. Falls back to the monitor's active tagset
/// when no rule assigns a tag.
fn apply_rules<X: XConn>(state: &State, x: &X, c: &mut Client) {
    c.is_free = false;
    c.tags = 0;

    let (instance, class) = x
        .wm_class(c.id)
        .ok()
        .flatten()
        .unwrap_or_else(|| (BROKEN.to_string(), BROKEN.to_string()));

    for r in state.config.rules.iter() {
        let matched = r.title.as_deref().map_or(true, |t| c.name.contains(t))
            && r.class.as_deref().map_or(true, |cl| class.contains(cl))
            && r.instance.as_deref().map_or(true, |i| instance.contains(i));

        if matched {
            c.is_free = r.is_free;
            c.tags |= r.tags;
            if let Some(mi) = r.monitor {
                if mi < state.monitors.len() {
                    c.monitor = mi;
                }
            }
        }
    }

    let all = state.all_tags();
    c.tags = if c.tags & all != 0 {
        c.tags & all
    } else {
        state.monitors[c.monitor].active_tagset()
    };
}

/// Stop managing a client, restoring its pre-manage state unless the
/// window is already destroyed.
pub(crate) fn unmanage<X: XConn>(state: &mut State, x: &X, w: Xid, destroyed: bool) -> Result<()> {
    let Some(c) = state.clients.remove(&w) else {
        return Ok(());
    };
    debug!(%w, destroyed, "unmanaging client");
    let mon = c.monitor;

    state.monitors[mon].detach(w);
    let tagset = state.monitors[mon].active_tagset();
    let State {
        monitors, clients, ..
    } = state;
    monitors[mon].detach_stack(w, |i| {
        clients.get(&i).is_some_and(|c| c.is_visible_on(tagset))
    });

    if !destroyed {
        // Racing against the client closing its own window is expected
        x.grab_server().ok();
        x.set_border_width(w, c.old_bw).ok();
        x.ungrab_buttons(w).ok();
        x.set_wm_state(w, WmState::Withdrawn).ok();
        x.sync().ok();
        x.ungrab_server().ok();
    }

    focus(state, x, None)?;
    update_client_list(state, x)?;
    arrange(state, x, Some(mon))
}

/// Move a client to another monitor, assigning it that monitor's active
/// tagset.
pub(crate) fn send_to_monitor<X: XConn>(
    state: &mut State,
    x: &X,
    id: Xid,
    target: usize,
) -> Result<()> {
    let mon = match state.clients.get(&id) {
        Some(c) if c.monitor != target => c.monitor,
        _ => return Ok(()),
    };

    unfocus(state, x, id, true)?;

    state.monitors[mon].detach(id);
    let tagset = state.monitors[mon].active_tagset();
    let State {
        monitors, clients, ..
    } = state;
    monitors[mon].detach_stack(id, |i| {
        clients.get(&i).is_some_and(|c| c.is_visible_on(tagset))
    });

    let new_tags = state.monitors[target].active_tagset();
    if let Some(c) = state.clients.get_mut(&id) {
        c.monitor = target;
        c.tags = new_tags;
    }
    state.monitors[target].attach(id);
    state.monitors[target].attach_stack(id);

    focus(state, x, None)?;
    arrange(state, x, None)
}

/// Put a client into or out of fullscreen, saving and restoring its
/// floating state, border and geometry.
pub(crate) fn set_fullscreen<X: XConn>(
    state: &mut State,
    x: &X,
    id: Xid,
    fullscreen: bool,
) -> Result<()> {
    let Some(c) = state.clients.get_mut(&id) else {
        return Ok(());
    };

    if fullscreen && !c.is_fullscreen {
        c.is_fullscreen = true;
        c.old_state = c.is_free;
        c.old_bw = c.bw;
        c.bw = 0;
        c.is_free = true;
        let mr = state.monitors[c.monitor].screen;

        x.replace_atom_prop(
            id,
            Atom::NetWmState,
            &[x.known_atom(Atom::NetWmStateFullscreen)],
        )?;
        resize_client(state, x, id, mr)?;
        x.raise(id)?;
    } else if !fullscreen && c.is_fullscreen {
        c.is_fullscreen = false;
        c.is_free = c.old_state;
        c.bw = c.old_bw;
        let r = c.prev_rect;
        c.rect = r;
        let mon = c.monitor;

        x.replace_atom_prop(id, Atom::NetWmState, &[])?;
        resize_client(state, x, id, r)?;
        arrange(state, x, Some(mon))?;
    }

    Ok(())
}

/// Update a client's urgency flag, mirroring it into `WM_HINTS`.
pub(crate) fn set_urgent<X: XConn>(state: &mut State, x: &X, id: Xid, urgent: bool) {
    if let Some(c) = state.clients.get_mut(&id) {
        c.is_urgent = urgent;
    }
    x.set_urgency_hint(id, urgent).ok();
}

/// Close a client: politely via `WM_DELETE_WINDOW` when supported,
/// forcibly otherwise.
pub(crate) fn kill_client<X: XConn>(x: &X, id: Xid) -> Result<()> {
    if !x.send_protocol_message(id, Atom::WmDeleteWindow).unwrap_or(false) {
        x.grab_server().ok();
        x.kill_client(id).ok();
        x.sync().ok();
        x.ungrab_server().ok();
    }

    Ok(())
}

/// Refresh the stored title for a client.
pub(crate) fn update_title<X: XConn>(state: &mut State, x: &X, id: Xid) {
    let name = x
        .text_prop(id, Atom::NetWmName)
        .ok()
        .flatten()
        .or_else(|| x.text_prop(id, Atom::WmName).ok().flatten())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| BROKEN.to_string());

    if let Some(c) = state.clients.get_mut(&id) {
        c.set_name(&name);
    }
}

/// Refresh the cached size hints for a client.
pub(crate) fn update_size_hints<X: XConn>(state: &mut State, x: &X, id: Xid) {
    let hints = x.normal_hints(id).unwrap_or_default();
    if let Some(c) = state.clients.get_mut(&id) {
        c.hints = hints;
    }
}

/// Refresh urgency and focus-model state from `WM_HINTS`.
pub(crate) fn update_wm_hints<X: XConn>(state: &mut State, x: &X, id: Xid) {
    let Ok(Some(h)) = x.wm_hints(id) else {
        return;
    };

    let is_sel = state.selected() == Some(id);
    if is_sel && h.urgent {
        // The selected client never shows as urgent: clear the hint
        x.set_urgency_hint(id, false).ok();
    } else if let Some(c) = state.clients.get_mut(&id) {
        c.is_urgent = h.urgent;
    }

    if let Some(c) = state.clients.get_mut(&id) {
        c.never_focus = h.accepts_input.map(|input| !input).unwrap_or(false);
    }
}

/// Pick up `_NET_WM_STATE` fullscreen and dialog window types.
pub(crate) fn update_window_type<X: XConn>(state: &mut State, x: &X, id: Xid) -> Result<()> {
    let wm_state = x.atom_prop(id, Atom::NetWmState).ok().flatten();
    let wtype = x.atom_prop(id, Atom::NetWmWindowType).ok().flatten();

    if wm_state == Some(x.known_atom(Atom::NetWmStateFullscreen)) {
        set_fullscreen(state, x, id, true)?;
    }
    if wtype == Some(x.known_atom(Atom::NetWindowTypeDialog)) {
        if let Some(c) = state.clients.get_mut(&id) {
            c.is_free = true;
        }
    }

    Ok(())
}

/// Refresh the status text from the root window name and repaint the
/// selected bar.
pub(crate) fn update_status<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    state.status_text = x
        .text_prop(x.root(), Atom::WmName)
        .ok()
        .flatten()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(wm_name_and_version);

    bar::draw_bar(state, state.sel_mon)
}

/// Rebuild `_NET_CLIENT_LIST` from the monitor client lists.
pub(crate) fn update_client_list<X: XConn>(state: &State, x: &X) -> Result<()> {
    x.delete_prop(x.root(), Atom::NetClientList)?;
    for m in state.monitors.iter() {
        for &id in m.clients.iter() {
            x.append_window_prop(x.root(), Atom::NetClientList, &[id])?;
        }
    }

    Ok(())
}

/// Create bar windows for any monitor that does not have one yet.
pub(crate) fn update_bars<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let bar_h = state.bar_h;
    for m in state.monitors.iter_mut() {
        if m.bar_win != Xid(0) {
            continue;
        }
        let r = Rect::new(m.window_area.x, m.bar_y, m.window_area.w, bar_h);
        m.bar_win = x.create_bar_window(r)?;
    }

    Ok(())
}

/// Reconcile the monitor list against the current output geometries.
///
/// Returns true when anything moved: new monitors are appended, stale
/// monitors are destroyed with their clients re-homed to the first
/// monitor, and the selected monitor is re-derived from the pointer.
pub(crate) fn update_geometry<X: XConn>(state: &mut State, x: &X) -> Result<bool> {
    let mut unique: Vec<Rect> = Vec::new();
    for r in x.screen_details()? {
        if !unique.contains(&r) {
            unique.push(r);
        }
    }
    if unique.is_empty() {
        // No usable outputs reported: treat the whole screen as one
        let (sw, sh) = state.screen_size;
        unique.push(Rect::new(0, 0, sw, sh));
    }

    let mut dirty = false;
    let n = state.monitors.len();
    let nn = unique.len();

    if n <= nn {
        for i in n..nn {
            let m = Monitor::new(
                i,
                state.config.tag_layouts.clone(),
                state.config.show_bar,
                state.config.top_bar,
            );
            state.monitors.push(m);
        }
        for (i, (m, &r)) in state.monitors.iter_mut().zip(unique.iter()).enumerate() {
            if i >= n || m.screen != r {
                dirty = true;
                m.num = i;
                m.screen = r;
                m.update_bar_pos(state.bar_h);
            }
        }
    } else {
        for _ in nn..n {
            dirty = true;
            let dead = state.monitors.pop().expect("n > nn >= 1");
            for &id in dead.clients.iter() {
                if let Some(c) = state.clients.get_mut(&id) {
                    c.monitor = 0;
                }
                state.monitors[0].attach(id);
                state.monitors[0].attach_stack(id);
            }
            if state.sel_mon >= state.monitors.len() {
                state.sel_mon = 0;
            }
            if dead.bar_win != Xid(0) {
                x.destroy_window(dead.bar_win).ok();
            }
        }
    }

    if dirty {
        trace!(?unique, "monitor geometry changed");
        state.sel_mon = 0;
        state.sel_mon = window_to_monitor(state, x, x.root());
    }

    Ok(dirty)
}

/// The monitor a window belongs to: by pointer position for the root
/// window, by bar window, by client, else the selected monitor.
pub(crate) fn window_to_monitor<X: XConn>(state: &State, x: &X, w: Xid) -> usize {
    if w == x.root() {
        if let Ok(p) = x.cursor_position() {
            return state.rect_to_monitor(Rect::new(p.x, p.y, 1, 1));
        }
    }

    for (i, m) in state.monitors.iter().enumerate() {
        if m.bar_win == w {
            return i;
        }
    }

    if let Some(c) = state.clients.get(&w) {
        return c.monitor;
    }

    state.sel_mon
}

/// Adopt the windows that already exist on the server: non-transients
/// first, then transients, managing anything viewable or iconic.
pub(crate) fn scan<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let wins = x.existing_clients()?;
    trace!(n = wins.len(), "scanning existing windows");

    for &w in wins.iter() {
        let Ok(attrs) = x.window_attributes(w) else {
            continue;
        };
        if attrs.override_redirect || x.transient_for(w).unwrap_or(None).is_some() {
            continue;
        }
        if attrs.viewable || x.get_wm_state(w).ok().flatten() == Some(WmState::Iconic) {
            if let Err(e) = manage(state, x, w) {
                warn!(%w, %e, "unable to manage existing window");
            }
        }
    }

    for &w in wins.iter() {
        let Ok(attrs) = x.window_attributes(w) else {
            continue;
        };
        if x.transient_for(w).unwrap_or(None).is_some()
            && (attrs.viewable || x.get_wm_state(w).ok().flatten() == Some(WmState::Iconic))
        {
            if let Err(e) = manage(state, x, w) {
                warn!(%w, %e, "unable to manage existing transient");
            }
        }
    }

    Ok(())
}
