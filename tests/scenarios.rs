//! End to end scenarios: a single 1920x1080 monitor with nine tags,
//! the tile layout (mfact 0.55, nmaster 1), a 14px bar and 1px borders.
//! Events are replayed through the real dispatch table against a
//! scripted mock connection and the state graph invariants are checked
//! after every step.
use rxwm::{
    core::{
        bar::NullDraw,
        bindings::{modmask, MouseButton},
        config::{Config, MODKEY},
        layout::Layout,
        State, WindowManager, Xid,
    },
    pure::geometry::{Point, Rect},
    x::{
        event::{ClientMessage, KeyPressEvent, MouseEvent, PointerChange, UnmapEvent, XEvent},
        keysym::{self, Keysym},
        mock::MockXConn,
        Atom, XConn,
    },
    Error, Result,
};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

#[derive(Debug, Default)]
struct TestConn {
    /// Events served to nested gesture pumps via next_event
    events: RefCell<VecDeque<XEvent>>,
    pointer: Cell<Point>,
}

impl MockXConn for TestConn {
    fn mock_next_event(&self) -> Result<XEvent> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or(Error::UnimplementedMock)
    }

    fn mock_cursor_position(&self) -> Result<Point> {
        Ok(self.pointer.get())
    }
}

const W1: Xid = Xid(1);
const W2: Xid = Xid(2);
const W3: Xid = Xid(3);

fn wm() -> WindowManager<TestConn> {
    let mut wm = WindowManager::new(
        Config::default(),
        Box::new(NullDraw::default()),
        TestConn::default(),
    )
    .expect("no other wm in the mock");
    wm.setup().expect("mock setup succeeds");

    wm
}

fn map(wm: &mut WindowManager<TestConn>, w: Xid) {
    wm.handle_event_for_test(XEvent::MapRequest(w)).unwrap();
    check_invariants(&wm.state);
}

fn press_key(wm: &mut WindowManager<TestConn>, mods: u16, keysym: Keysym) {
    wm.handle_event_for_test(XEvent::KeyPress(KeyPressEvent { keysym, mask: mods }))
        .unwrap();
    check_invariants(&wm.state);
}

fn enter(wm: &mut WindowManager<TestConn>, w: Xid) {
    wm.handle_event_for_test(XEvent::Enter(PointerChange {
        id: w,
        abs: Point::new(500, 500),
        is_normal_mode: true,
        is_inferior_detail: false,
    }))
    .unwrap();
    check_invariants(&wm.state);
}

/// P1, P2 and P3 from the state graph, checked after every replayed
/// event.
fn check_invariants(state: &State) {
    for m in state.monitors.iter() {
        // P1: client list and focus stack are equal as sets
        let mut clients = m.clients.clone();
        let mut stack = m.stack.clone();
        clients.sort();
        stack.sort();
        assert_eq!(clients, stack, "client list and stack diverge");

        // P3: visible tiled non-fullscreen clients stay in the usable area
        if m.layout != Layout::Floating {
            for &id in m.clients.iter() {
                let c = &state.clients[&id];
                if c.is_free || c.is_fullscreen || !c.is_visible_on(m.active_tagset()) {
                    continue;
                }
                let outer = Rect::new(
                    c.rect.x,
                    c.rect.y,
                    c.rect.w + 2 * c.bw,
                    c.rect.h + 2 * c.bw,
                );
                assert!(
                    m.window_area.contains(&outer),
                    "tiled client {id} escapes the usable area: {outer:?}"
                );
            }
        }
    }

    // P2: the selection is null or present on the selected monitor
    if let Some(sel) = state.selmon().sel {
        assert!(state.selmon().clients.contains(&sel));
    }
}

#[test]
fn scenario_1_tile_two_clients() {
    let mut wm = wm();

    map(&mut wm, W1);
    map(&mut wm, W2);

    // Clients attach at the head of the list, so the most recently
    // mapped client holds the master column
    assert_eq!(wm.state.selmon().clients, vec![W2, W1]);
    assert_eq!(wm.state.clients[&W2].rect, Rect::new(0, 14, 1054, 1064));
    assert_eq!(wm.state.clients[&W1].rect, Rect::new(1056, 14, 862, 1064));
    assert_eq!(wm.state.clients[&W1].bw, 1);
    assert_eq!(wm.state.clients[&W2].bw, 1);
    assert_eq!(wm.state.selected(), Some(W2));
}

#[test]
fn scenario_1_p4_tile_geometry_sums() {
    let mut wm = wm();
    for w in [W1, W2, W3] {
        map(&mut wm, w);
    }

    let wa = wm.state.selmon().window_area;
    let tiled = wm.state.tiled_visible(0);
    let heights = |ids: &[Xid]| -> u32 {
        ids.iter().map(|id| wm.state.clients[id].rect.h + 2).sum()
    };

    // nmaster is 1: the head of the list holds the master column
    let (master, stack) = tiled.split_at(1);
    assert_eq!(heights(master), wa.h, "master column heights sum to wh");
    assert_eq!(heights(stack), wa.h, "stack column heights sum to wh");

    let total_w =
        wm.state.clients[&master[0]].rect.w + 2 + wm.state.clients[&stack[0]].rect.w + 2;
    assert_eq!(total_w, wa.w, "column widths sum to ww");
}

#[test]
fn scenario_2_zoom() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    // Focus the stack column client and zoom it into the master slot
    enter(&mut wm, W1);
    assert_eq!(wm.state.selected(), Some(W1));

    press_key(&mut wm, MODKEY, keysym::XK_R);

    assert_eq!(wm.state.selmon().clients, vec![W1, W2]);
    assert_eq!(wm.state.clients[&W1].rect, Rect::new(0, 14, 1054, 1064));
    assert_eq!(wm.state.clients[&W2].rect, Rect::new(1056, 14, 862, 1064));
    assert_eq!(wm.state.selected(), Some(W1));
}

#[test]
fn zoom_on_the_master_promotes_the_next_client() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    // W2 is both selected and first: zooming moves W1 up instead
    press_key(&mut wm, MODKEY, keysym::XK_R);

    assert_eq!(wm.state.selmon().clients, vec![W1, W2]);
    assert_eq!(wm.state.selected(), Some(W1));
}

#[test]
fn scenario_3_float_toggle() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    enter(&mut wm, W1);
    press_key(&mut wm, MODKEY, keysym::XK_SPACE);

    let c = &wm.state.clients[&W1];
    assert!(c.is_free);
    // The remembered free rectangle is the original request
    assert_eq!(c.rect, Rect::new(0, 0, 800, 600));
    // The remaining tiled client expands to the full usable width
    assert_eq!(wm.state.clients[&W2].rect, Rect::new(0, 14, 1918, 1064));
}

#[test]
fn scenario_4_tag_move() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    enter(&mut wm, W1);
    press_key(&mut wm, MODKEY | modmask::SHIFT, keysym::XK_5);

    assert_eq!(wm.state.clients[&W1].tags, 1 << 4);
    assert!(!wm.state.is_visible(W1), "tagged away client is hidden");
    assert_eq!(wm.state.selected(), Some(W2));

    press_key(&mut wm, MODKEY, keysym::XK_5);

    assert!(wm.state.is_visible(W1));
    assert!(!wm.state.is_visible(W2));
    assert_eq!(wm.state.selected(), Some(W1));
    // Sole client on the tag: the full usable area
    assert_eq!(wm.state.clients[&W1].rect, Rect::new(0, 14, 1918, 1064));
}

#[test]
fn scenario_5_fullscreen() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    let fullscreen = *wm.conn().known_atom(Atom::NetWmStateFullscreen);
    let msg = |action: u32| {
        XEvent::ClientMessage(ClientMessage {
            id: W2,
            dtype: Atom::NetWmState.as_ref().to_string(),
            data: [action, fullscreen, 0, 0, 0],
        })
    };

    wm.handle_event_for_test(msg(1)).unwrap(); // _NET_WM_STATE_ADD
    check_invariants(&wm.state);

    let c = &wm.state.clients[&W2];
    assert!(c.is_fullscreen);
    // P7: fullscreen implies free, borderless and monitor sized
    assert!(c.is_free);
    assert_eq!(c.bw, 0);
    assert_eq!(c.rect, Rect::new(0, 0, 1920, 1080));

    wm.handle_event_for_test(msg(0)).unwrap(); // _NET_WM_STATE_REMOVE
    check_invariants(&wm.state);

    let c = &wm.state.clients[&W2];
    assert!(!c.is_fullscreen);
    assert!(!c.is_free);
    assert_eq!(c.bw, 1);
    assert_eq!(c.rect, Rect::new(0, 14, 1054, 1064));
}

#[test]
fn fullscreen_toggle_via_client_message() {
    let mut wm = wm();
    map(&mut wm, W1);

    let fullscreen = *wm.conn().known_atom(Atom::NetWmStateFullscreen);
    let toggle = XEvent::ClientMessage(ClientMessage {
        id: W1,
        dtype: Atom::NetWmState.as_ref().to_string(),
        data: [2, fullscreen, 0, 0, 0],
    });

    wm.handle_event_for_test(toggle.clone()).unwrap();
    assert!(wm.state.clients[&W1].is_fullscreen);

    wm.handle_event_for_test(toggle).unwrap();
    assert!(!wm.state.clients[&W1].is_fullscreen);
}

#[test]
fn scenario_6_gesture_cancel() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);
    enter(&mut wm, W1);

    let before = wm.state.clients[&W1].clone();

    // Script the drag: the release lands on the root origin, which
    // cancels the gesture
    wm.conn().events.borrow_mut().push_back(XEvent::ButtonRelease(MouseEvent {
        id: W1,
        child: Some(W1),
        rpt: Point::new(0, 0),
        wpt: Point::new(0, 0),
        button: MouseButton::Left,
        mask: MODKEY,
    }));
    wm.conn().pointer.set(Point::new(0, 0));

    wm.handle_event_for_test(XEvent::ButtonPress(MouseEvent {
        id: W1,
        child: Some(W1),
        rpt: Point::new(1200, 500),
        wpt: Point::new(100, 100),
        button: MouseButton::Left,
        mask: MODKEY,
    }))
    .unwrap();
    check_invariants(&wm.state);

    let after = &wm.state.clients[&W1];
    assert_eq!(after.rect, before.rect, "geometry survives a cancelled move");
    assert_eq!(after.is_free, before.is_free);
    assert_eq!(wm.state.selected(), Some(W1));
}

#[test]
fn move_gesture_applies_the_release_position() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);
    enter(&mut wm, W1);

    wm.conn().events.borrow_mut().push_back(XEvent::ButtonRelease(MouseEvent {
        id: W1,
        child: Some(W1),
        rpt: Point::new(400, 300),
        wpt: Point::new(0, 0),
        button: MouseButton::Left,
        mask: MODKEY,
    }));
    wm.conn().pointer.set(Point::new(400, 300));

    wm.handle_event_for_test(XEvent::ButtonPress(MouseEvent {
        id: W1,
        child: Some(W1),
        rpt: Point::new(1200, 500),
        wpt: Point::new(100, 100),
        button: MouseButton::Left,
        mask: MODKEY,
    }))
    .unwrap();
    check_invariants(&wm.state);

    let c = &wm.state.clients[&W1];
    assert!(c.is_free, "dragging a tiled client unties it");
    assert_eq!((c.rect.x, c.rect.y), (400, 300));
    // The other client re-tiles over the full width
    assert_eq!(wm.state.clients[&W2].rect, Rect::new(0, 14, 1918, 1064));
}

#[test]
fn p5_monocle_geometries_are_identical() {
    let mut wm = wm();
    for w in [W1, W2, W3] {
        map(&mut wm, w);
    }

    press_key(&mut wm, MODKEY, keysym::XK_M);

    let expected = Rect::new(0, 14, 1918, 1064);
    for w in [W1, W2, W3] {
        assert_eq!(wm.state.clients[&w].rect, expected);
    }
    assert_eq!(wm.state.selmon().layout_symbol, "[3]");
}

#[test]
fn p6_floating_layout_restores_float_rects() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    press_key(&mut wm, MODKEY, keysym::XK_F);

    for w in [W1, W2] {
        let c = &wm.state.clients[&w];
        assert_eq!(c.rect, c.float_rect);
    }
}

#[test]
fn split_layout_transposes_tile() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    press_key(&mut wm, MODKEY, keysym::XK_S);

    // mfact splits the height: master row 0.55 * 1066 = 586
    assert_eq!(wm.state.clients[&W2].rect, Rect::new(0, 14, 1918, 584));
    assert_eq!(wm.state.clients[&W1].rect, Rect::new(0, 600, 1918, 478));
}

#[test]
fn desktop_scroll_translates_floating_origins() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    press_key(&mut wm, MODKEY, keysym::XK_F);
    let before: Vec<i32> = [W1, W2]
        .iter()
        .map(|w| wm.state.clients[w].rect.x)
        .collect();

    press_key(&mut wm, MODKEY | modmask::CTRL, keysym::XK_H);

    for (w, old_x) in [W1, W2].iter().zip(before) {
        assert_eq!(wm.state.clients[w].rect.x, old_x + 300);
    }
}

#[test]
fn desktop_scroll_is_undefined_outside_the_floating_layout() {
    let mut wm = wm();
    map(&mut wm, W1);

    let before = wm.state.clients[&W1].rect;
    press_key(&mut wm, MODKEY | modmask::CTRL, keysym::XK_H);

    assert_eq!(wm.state.clients[&W1].rect, before);
}

#[test]
fn unmap_and_destroy_remove_clients() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    wm.handle_event_for_test(XEvent::UnmapNotify(UnmapEvent {
        id: W2,
        send_event: false,
    }))
    .unwrap();
    check_invariants(&wm.state);

    assert!(!wm.state.clients.contains_key(&W2));
    assert_eq!(wm.state.selected(), Some(W1));
    // Last client re-tiles over the whole usable area
    assert_eq!(wm.state.clients[&W1].rect, Rect::new(0, 14, 1918, 1064));

    wm.handle_event_for_test(XEvent::Destroy(W1)).unwrap();
    check_invariants(&wm.state);

    assert!(wm.state.clients.is_empty());
    assert_eq!(wm.state.selected(), None);
}

#[test]
fn view_toggles_back_to_the_previous_tagset() {
    let mut wm = wm();
    map(&mut wm, W1);

    press_key(&mut wm, MODKEY, keysym::XK_3);
    assert_eq!(wm.state.selmon().active_tagset(), 1 << 2);
    assert!(!wm.state.is_visible(W1));

    press_key(&mut wm, MODKEY, keysym::XK_1);
    assert_eq!(wm.state.selmon().active_tagset(), 1);
    assert!(wm.state.is_visible(W1));
}

#[test]
fn view_next_wraps_around_the_tag_count() {
    let mut wm = wm();

    press_key(&mut wm, MODKEY, keysym::XK_P);
    assert_eq!(wm.state.selmon().view_tag, 8, "backwards from tag 1 wraps");

    press_key(&mut wm, MODKEY, keysym::XK_N);
    assert_eq!(wm.state.selmon().view_tag, 0);
}

#[test]
fn nmaster_grows_the_master_column() {
    let mut wm = wm();
    for w in [W1, W2, W3] {
        map(&mut wm, w);
    }

    press_key(&mut wm, MODKEY, keysym::XK_I);

    // Two masters split the left column, one client remains stacked
    let tiled = wm.state.tiled_visible(0);
    assert_eq!(wm.state.selmon().nmaster, 2);
    assert_eq!(wm.state.clients[&tiled[0]].rect.h, 531);
    assert_eq!(wm.state.clients[&tiled[1]].rect.h, 531);
    assert_eq!(wm.state.clients[&tiled[2]].rect.h, 1064);
}

#[test]
fn mfact_adjusts_the_split_and_clamps() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    press_key(&mut wm, MODKEY, keysym::XK_L);
    // 0.55 + 0.05 -> 0.60 of 1920 = 1152
    assert_eq!(wm.state.clients[&W2].rect.w, 1150);

    // Remembered per tag
    assert!((wm.state.selmon().tag_layouts[0].mfact - 0.6).abs() < 1e-6);

    for _ in 0..10 {
        press_key(&mut wm, MODKEY, keysym::XK_L);
    }
    assert!(wm.state.selmon().mfact <= 0.9);
}

#[test]
fn per_tag_layout_memory_follows_single_tag_views() {
    let mut wm = wm();
    map(&mut wm, W1);

    press_key(&mut wm, MODKEY, keysym::XK_M); // monocle on tag 1
    press_key(&mut wm, MODKEY, keysym::XK_2); // view tag 2: still tile
    assert_eq!(wm.state.selmon().layout, Layout::Tile);

    press_key(&mut wm, MODKEY, keysym::XK_1); // back to tag 1
    assert_eq!(wm.state.selmon().layout, Layout::Monocle);
}

#[test]
fn urgent_clients_are_flagged_by_activation_requests() {
    let mut wm = wm();
    map(&mut wm, W1);
    map(&mut wm, W2);

    // W2 is selected: an activation request for W1 marks it urgent
    wm.handle_event_for_test(XEvent::ClientMessage(ClientMessage {
        id: W1,
        dtype: Atom::NetActiveWindow.as_ref().to_string(),
        data: [0; 5],
    }))
    .unwrap();
    assert!(wm.state.clients[&W1].is_urgent);

    // Focusing W1 clears the flag
    enter(&mut wm, W1);
    assert!(!wm.state.clients[&W1].is_urgent);
}
