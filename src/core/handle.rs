//! XEvent handlers for use in the main event loop
use crate::{
    core::{
        actions::{self, Action},
        bar,
        bindings::{clean_mask, ClickRegion},
        clients,
        layout::Layout,
        State, Xid,
    },
    pure::geometry::Rect,
    x::{
        event::{
            ClientMessage, ConfigureEvent, ConfigureRequestEvent, ExposeEvent, KeyPressEvent,
            MotionEvent, MouseEvent, PointerChange, PropertyEvent, UnmapEvent,
        },
        property::WmState,
        Atom, XConn,
    },
    Result,
};
use tracing::trace;

pub(crate) fn button_press<X: XConn>(ev: MouseEvent, state: &mut State, x: &X) -> Result<()> {
    // Focus the monitor under the press if necessary
    let m = clients::window_to_monitor(state, x, ev.id);
    if m != state.sel_mon {
        if let Some(sel) = state.selmon().sel {
            clients::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = m;
        clients::focus(state, x, None)?;
    }

    let mut click = ClickRegion::RootWin;
    let mut tag_arg = None;

    if ev.id == state.selmon().bar_win {
        let (region, tag) = bar::click_at(state, state.sel_mon, ev.wpt.x);
        click = region;
        tag_arg = tag;
    } else if state.clients.contains_key(&ev.id) {
        clients::focus(state, x, Some(ev.id))?;
        clients::restack(state, x, state.sel_mon)?;
        x.allow_replay_pointer()?;
        click = ClickRegion::ClientWin;
    }

    let nm = state.numlock_mask;
    let matched: Vec<Action> = state
        .config
        .buttons
        .iter()
        .filter(|b| {
            b.region == click
                && b.button == ev.button
                && clean_mask(b.mods, nm) == clean_mask(ev.mask, nm)
        })
        .map(|b| b.action.clone())
        .collect();

    for action in matched {
        let action = match (click, tag_arg) {
            (ClickRegion::TagBar, Some(tag)) => actions::with_tag_arg(&action, tag),
            _ => action,
        };
        actions::dispatch(&action, state, x)?;
    }

    Ok(())
}

pub(crate) fn key_press<X: XConn>(ev: KeyPressEvent, state: &mut State, x: &X) -> Result<()> {
    let nm = state.numlock_mask;
    let matched: Vec<Action> = state
        .config
        .keys
        .iter()
        .filter(|k| k.keysym == ev.keysym && clean_mask(k.mods, nm) == clean_mask(ev.mask, nm))
        .map(|k| k.action.clone())
        .collect();

    for action in matched {
        trace!(?action, "running key binding");
        actions::dispatch(&action, state, x)?;
    }

    Ok(())
}

pub(crate) fn client_message<X: XConn>(msg: ClientMessage, state: &mut State, x: &X) -> Result<()> {
    if !state.clients.contains_key(&msg.id) {
        return Ok(());
    }

    if msg.dtype == Atom::NetWmState.as_ref() {
        let fullscreen = *x.known_atom(Atom::NetWmStateFullscreen);
        if msg.data[1] == fullscreen || msg.data[2] == fullscreen {
            // data[0]: 0 = remove, 1 = add, 2 = toggle
            let add = msg.data[0] == 1
                || (msg.data[0] == 2 && !state.clients[&msg.id].is_fullscreen);
            clients::set_fullscreen(state, x, msg.id, add)?;
        }
    } else if msg.dtype == Atom::NetActiveWindow.as_ref()
        && state.selected() != Some(msg.id)
        && !state.clients[&msg.id].is_urgent
    {
        clients::set_urgent(state, x, msg.id, true);
    }

    Ok(())
}

pub(crate) fn configure_notify<X: XConn>(
    ev: ConfigureEvent,
    state: &mut State,
    x: &X,
) -> Result<()> {
    if !ev.is_root {
        return Ok(());
    }

    let dirty = state.screen_size != (ev.r.w, ev.r.h);
    state.screen_size = (ev.r.w, ev.r.h);

    if clients::update_geometry(state, x)? || dirty {
        outputs_changed(state, x)?;
    }

    Ok(())
}

/// Re-home bars and fullscreen clients after the output layout changed.
fn outputs_changed<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    let fullscreen: Vec<(Xid, usize)> = state
        .clients
        .iter()
        .filter(|(_, c)| c.is_fullscreen)
        .map(|(&id, c)| (id, c.monitor))
        .collect();
    for (id, m) in fullscreen {
        let r = state.monitors[m].screen;
        clients::resize_client(state, x, id, r)?;
    }

    let bar_h = state.bar_h;
    for m in state.monitors.iter() {
        if m.bar_win != Xid(0) {
            let r = Rect::new(m.window_area.x, m.bar_y, m.window_area.w, bar_h);
            x.position_client(m.bar_win, r, 0)?;
        }
    }

    clients::focus(state, x, None)?;
    clients::arrange(state, x, None)
}

pub(crate) fn randr_notify<X: XConn>(state: &mut State, x: &X) -> Result<()> {
    if clients::update_geometry(state, x)? {
        outputs_changed(state, x)?;
    }

    Ok(())
}

pub(crate) fn configure_request<X: XConn>(
    ev: ConfigureRequestEvent,
    state: &mut State,
    x: &X,
) -> Result<()> {
    if !state.clients.contains_key(&ev.id) {
        x.configure_unmanaged(&ev)?;
        return x.sync();
    }

    let sel_floating = state.selmon().layout == Layout::Floating;
    let ms = state.monitors[state.clients[&ev.id].monitor].screen;
    let c = state.clients.get_mut(&ev.id).expect("checked above");

    if let Some(bw) = ev.border_width {
        c.bw = bw;
    } else if c.is_free || sel_floating {
        if let Some(vx) = ev.x {
            c.prev_rect.x = c.rect.x;
            c.rect.x = ms.x + vx;
        }
        if let Some(vy) = ev.y {
            c.prev_rect.y = c.rect.y;
            c.rect.y = ms.y + vy;
        }
        if let Some(vw) = ev.w {
            c.prev_rect.w = c.rect.w;
            c.rect.w = vw;
        }
        if let Some(vh) = ev.h {
            c.prev_rect.h = c.rect.h;
            c.rect.h = vh;
        }

        if c.rect.x + c.rect.w as i32 > ms.right() && c.is_free {
            // Center horizontally
            c.rect.x = ms.x + (ms.w as i32 / 2 - c.outer_w() / 2);
        }
        if c.rect.y + c.rect.h as i32 > ms.bottom() && c.is_free {
            // Center vertically
            c.rect.y = ms.y + (ms.h as i32 / 2 - c.outer_h() / 2);
        }

        let pos_only =
            (ev.x.is_some() || ev.y.is_some()) && !(ev.w.is_some() || ev.h.is_some());
        let (r, bw) = (c.rect, c.bw);

        if pos_only {
            x.send_configure_notify(ev.id, r, bw)?;
        }
        if state.is_visible(ev.id) {
            x.position_client(ev.id, r, bw)?;
        }
    } else {
        let (r, bw) = (c.rect, c.bw);
        x.send_configure_notify(ev.id, r, bw)?;
    }

    x.sync()
}

pub(crate) fn destroy<X: XConn>(id: Xid, state: &mut State, x: &X) -> Result<()> {
    if state.clients.contains_key(&id) {
        clients::unmanage(state, x, id, true)?;
    }

    Ok(())
}

pub(crate) fn enter<X: XConn>(p: PointerChange, state: &mut State, x: &X) -> Result<()> {
    if (!p.is_normal_mode || p.is_inferior_detail) && p.id != x.root() {
        return Ok(());
    }

    let c = state.clients.get(&p.id).map(|c| c.id);
    let m = match state.clients.get(&p.id) {
        Some(c) => c.monitor,
        None => clients::window_to_monitor(state, x, p.id),
    };

    if m != state.sel_mon {
        if let Some(sel) = state.selmon().sel {
            clients::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = m;
    } else if c.is_none() || c == state.selmon().sel {
        return Ok(());
    }

    clients::focus(state, x, c)
}

pub(crate) fn expose<X: XConn>(ev: ExposeEvent, state: &mut State, x: &X) -> Result<()> {
    if ev.count == 0 {
        let m = clients::window_to_monitor(state, x, ev.id);
        bar::draw_bar(state, m)?;
    }

    Ok(())
}

// Some broken focus acquiring clients need extra handling
pub(crate) fn focus_in<X: XConn>(id: Xid, state: &mut State, x: &X) -> Result<()> {
    match state.selected() {
        Some(sel) if sel != id => clients::set_focus(state, x, sel),
        _ => Ok(()),
    }
}

pub(crate) fn mapping_notify<X: XConn>(keyboard: bool, state: &mut State, x: &X) -> Result<()> {
    if keyboard {
        clients::grab_keys(state, x)?;
    }

    Ok(())
}

pub(crate) fn map_request<X: XConn>(id: Xid, state: &mut State, x: &X) -> Result<()> {
    let Ok(attrs) = x.window_attributes(id) else {
        return Ok(());
    };
    if attrs.override_redirect {
        return Ok(());
    }

    if !state.clients.contains_key(&id) {
        clients::manage(state, x, id)?;
    }

    Ok(())
}

pub(crate) fn motion_notify<X: XConn>(ev: MotionEvent, state: &mut State, x: &X) -> Result<()> {
    if ev.id != x.root() {
        return Ok(());
    }

    let m = state.rect_to_monitor(Rect::new(ev.rpt.x, ev.rpt.y, 1, 1));
    if state.motion_mon.is_some_and(|prev| m != prev) {
        if let Some(sel) = state.selmon().sel {
            clients::unfocus(state, x, sel, true)?;
        }
        state.sel_mon = m;
        clients::focus(state, x, None)?;
    }
    state.motion_mon = Some(m);

    Ok(())
}

pub(crate) fn property_notify<X: XConn>(
    ev: PropertyEvent,
    state: &mut State,
    x: &X,
) -> Result<()> {
    if ev.is_root && ev.atom == Atom::WmName.as_ref() {
        return clients::update_status(state, x);
    }
    if ev.deleted || !state.clients.contains_key(&ev.id) {
        return Ok(());
    }

    if ev.atom == Atom::WmTransientFor.as_ref() {
        let c = &state.clients[&ev.id];
        if !c.is_free {
            let mon = c.monitor;
            let parent_managed = x
                .transient_for(ev.id)
                .unwrap_or(None)
                .map(|t| state.clients.contains_key(&t))
                .unwrap_or(false);
            if parent_managed {
                state.clients.get_mut(&ev.id).expect("checked above").is_free = true;
                clients::arrange(state, x, Some(mon))?;
            }
        }
    } else if ev.atom == Atom::WmNormalHints.as_ref() {
        clients::update_size_hints(state, x, ev.id);
    } else if ev.atom == Atom::WmHints.as_ref() {
        clients::update_wm_hints(state, x, ev.id);
        bar::draw_bars(state)?;
    }

    if ev.atom == Atom::WmName.as_ref() || ev.atom == Atom::NetWmName.as_ref() {
        clients::update_title(state, x, ev.id);
        if state.selmon().sel == Some(ev.id) {
            let m = state.clients[&ev.id].monitor;
            bar::draw_bar(state, m)?;
        }
    }

    if ev.atom == Atom::NetWmWindowType.as_ref() {
        clients::update_window_type(state, x, ev.id)?;
    }

    Ok(())
}

pub(crate) fn unmap_notify<X: XConn>(ev: UnmapEvent, state: &mut State, x: &X) -> Result<()> {
    if !state.clients.contains_key(&ev.id) {
        return Ok(());
    }

    if ev.send_event {
        x.set_wm_state(ev.id, WmState::Withdrawn)?;
    } else {
        clients::unmanage(state, x, ev.id, false)?;
    }

    Ok(())
}
