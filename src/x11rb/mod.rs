//! Helpers and utilities for using x11rb as a back end
use crate::{
    core::{bindings::MouseButton, Xid},
    pure::{
        client::SizeHints,
        geometry::{Point, Rect},
    },
    x::{
        atom::{Atom, EWMH_SUPPORTED_ATOMS},
        event::{ConfigureRequestEvent, XEvent},
        keysym::{Keysym, XK_NUM_LOCK},
        property::{self, WindowAttributes, WmHints, WmState},
        CursorKind, XConn,
    },
    Color, Error, Result,
};
use std::{cell::RefCell, collections::HashMap};
use strum::IntoEnumIterator;
use tracing::warn;
use x11rb::{
    connection::Connection,
    properties::WmClass,
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent,
            ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _, CreateWindowAux,
            EventMask, GrabMode, GrabStatus, InputFocus, MapState, ModMask, PropMode,
            StackMode, WindowClass, CLIENT_MESSAGE_EVENT, CONFIGURE_NOTIFY_EVENT,
        },
        ErrorKind,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

mod conversions;

use conversions::convert_event;

// Cursor font glyphs (X11/cursorfont.h)
const XC_LEFT_PTR: u16 = 68;
const XC_SIZING: u16 = 120;
const XC_FLEUR: u16 = 52;

fn button_mask() -> u16 {
    u16::try_from(u32::from(EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE))
        .expect("mask fits u16")
}

fn mouse_mask() -> u16 {
    button_mask()
        | u16::try_from(u32::from(EventMask::POINTER_MOTION)).expect("mask fits u16")
}

#[derive(Debug, Default)]
struct KeyboardMap {
    min_keycode: u8,
    per_keycode: u8,
    syms: Vec<u32>,
}

impl KeyboardMap {
    fn keysym_for(&self, keycode: u8) -> Keysym {
        // The unshifted column is what bindings are declared against
        let idx = (keycode.saturating_sub(self.min_keycode)) as usize * self.per_keycode as usize;

        self.syms.get(idx).copied().unwrap_or(0)
    }

    fn keycodes_for(&self, keysym: Keysym) -> Vec<u8> {
        if self.per_keycode == 0 {
            return vec![];
        }

        self.syms
            .chunks(self.per_keycode as usize)
            .enumerate()
            .filter(|(_, syms)| syms.contains(&keysym))
            .map(|(i, _)| self.min_keycode + i as u8)
            .collect()
    }
}

/// Handles communication with an X server via the x11rb crate.
#[derive(Debug)]
pub struct Conn<C: Connection = RustConnection> {
    conn: C,
    root: u32,
    screen_size: (u32, u32),
    atoms: HashMap<Atom, u32>,
    atom_names: RefCell<HashMap<u32, String>>,
    cursors: HashMap<CursorKind, u32>,
    keyboard: RefCell<KeyboardMap>,
    has_randr: bool,
}

impl Conn<RustConnection> {
    /// Connect to the X server using the `DISPLAY` environment variable.
    pub fn new() -> Result<Self> {
        let (conn, screen_index) = RustConnection::connect(None)?;

        Self::new_for_connection(conn, screen_index)
    }
}

impl<C: Connection> Conn<C> {
    /// Wrap an established connection, interning atoms and building the
    /// cursor and keyboard caches.
    pub fn new_for_connection(conn: C, screen_index: usize) -> Result<Self> {
        let screen = &conn.setup().roots[screen_index];
        let root = screen.root;
        let screen_size = (
            screen.width_in_pixels as u32,
            screen.height_in_pixels as u32,
        );

        // Send all InternAtom requests before fetching any replies
        let cookies: Vec<_> = Atom::iter()
            .map(|a| Ok((a, conn.intern_atom(false, a.as_ref().as_bytes())?)))
            .collect::<Result<_>>()?;
        let mut atoms = HashMap::new();
        let mut atom_names = HashMap::new();
        for (a, cookie) in cookies {
            let value = cookie.reply()?.atom;
            atoms.insert(a, value);
            atom_names.insert(value, a.as_ref().to_string());
        }

        let cursors = make_cursors(&conn)?;

        let has_randr = conn
            .extension_information(randr::X11_EXTENSION_NAME)?
            .is_some();
        if has_randr {
            conn.randr_select_input(
                root,
                randr::NotifyMask::SCREEN_CHANGE
                    | randr::NotifyMask::OUTPUT_CHANGE
                    | randr::NotifyMask::CRTC_CHANGE,
            )?;
        }

        let this = Self {
            conn,
            root,
            screen_size,
            atoms,
            atom_names: RefCell::new(atom_names),
            cursors,
            keyboard: RefCell::new(KeyboardMap::default()),
            has_randr,
        };
        this.refresh_keyboard_map()?;

        Ok(this)
    }

    pub(crate) fn refresh_keyboard_map(&self) -> Result<()> {
        let setup = self.conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let reply = self
            .conn
            .get_keyboard_mapping(min, max - min + 1)?
            .reply()?;

        *self.keyboard.borrow_mut() = KeyboardMap {
            min_keycode: min,
            per_keycode: reply.keysyms_per_keycode,
            syms: reply.keysyms,
        };

        Ok(())
    }

    pub(crate) fn keysym_for_keycode(&self, keycode: u8) -> Keysym {
        self.keyboard.borrow().keysym_for(keycode)
    }

    pub(crate) fn atom_name(&self, atom: u32) -> Result<String> {
        if let Some(name) = self.atom_names.borrow().get(&atom) {
            return Ok(name.clone());
        }

        let name = String::from_utf8_lossy(&self.conn.get_atom_name(atom)?.reply()?.name)
            .to_string();
        self.atom_names.borrow_mut().insert(atom, name.clone());

        Ok(name)
    }

    fn get_prop32(&self, id: Xid, prop: u32, ty: AtomEnum, len: u32) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, *id, prop, ty, 0, len)?
            .reply()?;

        Ok(reply.value32().map(|it| it.collect()).unwrap_or_default())
    }

    fn modifier_variants(&self, numlock_mask: u16) -> [u16; 4] {
        let lock = u16::from(ModMask::LOCK);

        [0, lock, numlock_mask, numlock_mask | lock]
    }
}

fn make_cursors<C: Connection>(conn: &C) -> Result<HashMap<CursorKind, u32>> {
    let font = conn.generate_id()?;
    conn.open_font(font, b"cursor")?;

    let mut cursors = HashMap::new();
    for (kind, glyph) in [
        (CursorKind::Normal, XC_LEFT_PTR),
        (CursorKind::Resize, XC_SIZING),
        (CursorKind::Move, XC_FLEUR),
    ] {
        let cursor = conn.generate_id()?;
        conn.create_glyph_cursor(
            cursor,
            font,
            font,
            glyph,
            glyph + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        cursors.insert(kind, cursor);
    }
    conn.close_font(font)?;

    Ok(cursors)
}

impl<C: Connection> XConn for Conn<C> {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        if !self.has_randr {
            return Ok(vec![]);
        }

        let resources = self
            .conn
            .randr_get_screen_resources_current(self.root)?
            .reply()?;
        let cookies: Vec<_> = resources
            .crtcs
            .iter()
            .map(|&c| self.conn.randr_get_crtc_info(c, 0))
            .collect::<std::result::Result<_, _>>()?;

        let mut rects = Vec::new();
        for cookie in cookies {
            let info = match cookie.reply() {
                Ok(info) => info,
                Err(_) => continue,
            };
            if info.width > 0 && info.height > 0 {
                rects.push(Rect::new(
                    info.x as i32,
                    info.y as i32,
                    info.width as u32,
                    info.height as u32,
                ));
            }
        }

        Ok(rects)
    }

    fn check_other_wm(&self) -> Result<()> {
        let aux =
            ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT);

        match self.conn.change_window_attributes(self.root, &aux)?.check() {
            Ok(()) => Ok(()),
            Err(x11rb::errors::ReplyError::X11Error(e))
                if e.error_kind == ErrorKind::Access =>
            {
                Err(Error::OtherWmRunning)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn select_root_events(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::BUTTON_PRESS
            | EventMask::POINTER_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE;
        let aux = ChangeWindowAttributesAux::new()
            .event_mask(mask)
            .cursor(self.cursors[&CursorKind::Normal]);

        self.conn
            .change_window_attributes(self.root, &aux)?
            .check()?;

        Ok(())
    }

    fn init_wm_properties(&self, wm_name: &str) -> Result<Xid> {
        let check_win = self.conn.generate_id()?;
        let aux = CreateWindowAux::new().override_redirect(1);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check_win,
            self.root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        let check = self.atoms[&Atom::NetSupportingWmCheck];
        let utf8 = self.atoms[&Atom::UTF8String];
        for win in [check_win, self.root] {
            self.conn.change_property32(
                PropMode::REPLACE,
                win,
                check,
                AtomEnum::WINDOW,
                &[check_win],
            )?;
        }
        self.conn.change_property8(
            PropMode::REPLACE,
            check_win,
            self.atoms[&Atom::NetWmName],
            utf8,
            wm_name.as_bytes(),
        )?;

        let supported: Vec<u32> = EWMH_SUPPORTED_ATOMS
            .iter()
            .map(|a| self.atoms[a])
            .collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms[&Atom::NetSupported],
            AtomEnum::ATOM,
            &supported,
        )?;
        self.conn
            .delete_property(self.root, self.atoms[&Atom::NetClientList])?;

        Ok(Xid(check_win))
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            let raw = self.conn.wait_for_event()?;
            if let Some(event) = convert_event(self, raw)? {
                return Ok(event);
            }
        }
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        while let Some(raw) = self.conn.poll_for_event()? {
            if let Some(event) = convert_event(self, raw)? {
                return Ok(Some(event));
            }
        }

        Ok(None)
    }

    fn flush(&self) {
        self.conn.flush().ok();
    }

    fn sync(&self) -> Result<()> {
        // A round trip guarantees the server has seen everything before it
        self.conn.get_input_focus()?.reply()?;

        Ok(())
    }

    fn known_atom(&self, atom: Atom) -> Xid {
        Xid(self.atoms[&atom])
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(self.root)?.reply()?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        let attrs = self.conn.get_window_attributes(*id)?.reply()?;

        Ok(WindowAttributes {
            override_redirect: attrs.override_redirect,
            viewable: attrs.map_state == MapState::VIEWABLE,
        })
    }

    fn window_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        let geo = self.conn.get_geometry(*id)?.reply()?;

        Ok((
            Rect::new(geo.x as i32, geo.y as i32, geo.width as u32, geo.height as u32),
            geo.border_width as u32,
        ))
    }

    fn text_prop(&self, id: Xid, atom: Atom) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, *id, self.atoms[&atom], AtomEnum::ANY, 0, 1024)?
            .reply()?;
        if reply.value.is_empty() {
            return Ok(None);
        }

        // Both STRING and UTF8_STRING properties are read as utf8; the
        // first null terminated chunk is the value
        let bytes: Vec<u8> = reply
            .value
            .split(|&b| b == 0)
            .next()
            .unwrap_or_default()
            .to_vec();

        Ok(Some(String::from_utf8_lossy(&bytes).to_string()))
    }

    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        let pair = WmClass::get(&self.conn, *id)
            .ok()
            .and_then(|cookie| cookie.reply_unchecked().ok().flatten())
            .map(|class| {
                (
                    String::from_utf8_lossy(class.instance()).to_string(),
                    String::from_utf8_lossy(class.class()).to_string(),
                )
            });

        Ok(pair)
    }

    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        let raw = self.get_prop32(id, self.atoms[&Atom::WmTransientFor], AtomEnum::WINDOW, 1)?;

        Ok(raw.first().copied().filter(|&w| w != 0).map(Xid))
    }

    fn normal_hints(&self, id: Xid) -> Result<SizeHints> {
        let raw = self.get_prop32(
            id,
            self.atoms[&Atom::WmNormalHints],
            AtomEnum::WM_SIZE_HINTS,
            18,
        )?;

        Ok(property::size_hints_from_raw(&raw))
    }

    fn wm_hints(&self, id: Xid) -> Result<Option<WmHints>> {
        let raw = self.get_prop32(id, self.atoms[&Atom::WmHints], AtomEnum::WM_HINTS, 9)?;

        Ok(WmHints::from_raw(&raw))
    }

    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        let mut raw = self.get_prop32(id, self.atoms[&Atom::WmHints], AtomEnum::WM_HINTS, 9)?;
        if raw.is_empty() {
            return Ok(());
        }

        const URGENCY: u32 = 1 << 8;
        if urgent {
            raw[0] |= URGENCY;
        } else {
            raw[0] &= !URGENCY;
        }

        self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            self.atoms[&Atom::WmHints],
            AtomEnum::WM_HINTS,
            &raw,
        )?;

        Ok(())
    }

    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<Xid>> {
        let raw = self.get_prop32(id, self.atoms[&atom], AtomEnum::ATOM, 1)?;

        Ok(raw.first().copied().map(Xid))
    }

    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        let prop = self.atoms[&Atom::WmState];
        let reply = self
            .conn
            .get_property(false, *id, prop, prop, 0, 2)?
            .reply()?;
        let raw: Vec<u32> = reply.value32().map(|it| it.collect()).unwrap_or_default();

        Ok(raw.first().and_then(|&v| WmState::from_raw(v)))
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        let prop = self.atoms[&Atom::WmState];
        self.conn
            .change_property32(PropMode::REPLACE, *id, prop, prop, &[state.into(), NONE])?;

        Ok(())
    }

    fn replace_atom_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        let raw: Vec<u32> = values.iter().map(|&v| *v).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            self.atoms[&prop],
            AtomEnum::ATOM,
            &raw,
        )?;

        Ok(())
    }

    fn replace_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        let raw: Vec<u32> = values.iter().map(|&v| *v).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            self.atoms[&prop],
            AtomEnum::WINDOW,
            &raw,
        )?;

        Ok(())
    }

    fn append_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        let raw: Vec<u32> = values.iter().map(|&v| *v).collect();
        self.conn.change_property32(
            PropMode::APPEND,
            *id,
            self.atoms[&prop],
            AtomEnum::WINDOW,
            &raw,
        )?;

        Ok(())
    }

    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()> {
        self.conn.delete_property(*id, self.atoms[&prop])?;

        Ok(())
    }

    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<bool> {
        let protocols = self.get_prop32(
            id,
            self.atoms[&Atom::WmProtocols],
            AtomEnum::ATOM,
            32,
        )?;
        let target = self.atoms[&proto];
        if !protocols.contains(&target) {
            return Ok(false);
        }

        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: *id,
            type_: self.atoms[&Atom::WmProtocols],
            data: [target, CURRENT_TIME, 0, 0, 0].into(),
        };
        self.conn
            .send_event(false, *id, EventMask::NO_EVENT, event)?;

        Ok(true)
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.conn.kill_client(*id)?;

        Ok(())
    }

    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w)
            .height(r.h)
            .border_width(bw);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn move_client(&self, id: Xid, p: Point) -> Result<()> {
        let aux = ConfigureWindowAux::new().x(p.x).y(p.y);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        let aux = ConfigureWindowAux::new().border_width(bw);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(color.pixel());
        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: bw as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)?;

        Ok(())
    }

    fn configure_unmanaged(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        let mut aux = ConfigureWindowAux::new()
            .x(ev.x)
            .y(ev.y)
            .width(ev.w)
            .height(ev.h)
            .border_width(ev.border_width)
            .sibling(ev.sibling.map(|s| *s));
        if let Some(mode) = ev.stack_mode {
            aux = aux.stack_mode(StackMode::from(mode as u8));
        }
        self.conn.configure_window(*ev.id, &aux)?;

        Ok(())
    }

    fn select_client_events(&self, id: Xid) -> Result<()> {
        let mask = EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id)?;

        Ok(())
    }

    fn raise(&self, id: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn lower(&self, id: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::BELOW);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .sibling(*sibling)
            .stack_mode(StackMode::BELOW);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn create_bar_window(&self, r: Rect) -> Result<Xid> {
        let win = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixmap(1u32)
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE)
            .cursor(self.cursors[&CursorKind::Normal]);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            win,
            self.root,
            r.x as i16,
            r.y as i16,
            r.w as u16,
            r.h as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;
        self.conn.map_window(win)?;
        self.raise(Xid(win))?;

        Ok(Xid(win))
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.conn.destroy_window(*id)?;

        Ok(())
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *id, CURRENT_TIME)?;

        Ok(())
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;

        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(NONE, *id, 0, 0, 0, 0, x, y)?;

        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                mouse_mask().into(),
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursors[&cursor],
                CURRENT_TIME,
            )?
            .reply()?;

        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;

        Ok(())
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        self.conn
            .allow_events(x11rb::protocol::xproto::Allow::REPLAY_POINTER, CURRENT_TIME)?;

        Ok(())
    }

    fn grab_keys(&self, keys: &[(u16, Keysym)], numlock_mask: u16) -> Result<()> {
        self.conn
            .ungrab_key(x11rb::protocol::xproto::Grab::ANY, self.root, ModMask::ANY)?;

        let keyboard = self.keyboard.borrow();
        for &(mods, keysym) in keys {
            let codes = keyboard.keycodes_for(keysym);
            if codes.is_empty() {
                warn!(keysym, "no keycode maps to bound keysym");
            }
            for code in codes {
                for m in self.modifier_variants(numlock_mask) {
                    self.conn.grab_key(
                        true,
                        self.root,
                        (mods | m).into(),
                        code,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }

        Ok(())
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.conn
            .ungrab_button(ButtonIndex::ANY, *id, ModMask::ANY)?;

        Ok(())
    }

    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[(u16, MouseButton)],
        numlock_mask: u16,
    ) -> Result<()> {
        self.ungrab_buttons(id)?;

        if !focused {
            // Synchronous catch-all grab so the first click focuses and
            // is then replayed to the client
            self.conn.grab_button(
                false,
                *id,
                button_mask().into(),
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }

        for &(mods, button) in buttons {
            for m in self.modifier_variants(numlock_mask) {
                self.conn.grab_button(
                    false,
                    *id,
                    button_mask().into(),
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(u8::from(button)),
                    (mods | m).into(),
                )?;
            }
        }

        Ok(())
    }

    fn numlock_mask(&self) -> Result<u16> {
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        let per = reply.keycodes_per_modifier() as usize;
        if per == 0 {
            return Ok(0);
        }
        let numlock_codes = self.keyboard.borrow().keycodes_for(XK_NUM_LOCK);

        for (i, codes) in reply.keycodes.chunks(per).enumerate() {
            if codes.iter().any(|c| numlock_codes.contains(c)) {
                return Ok(1 << i);
            }
        }

        Ok(0)
    }

    fn grab_server(&self) -> Result<()> {
        self.conn.grab_server()?;

        Ok(())
    }

    fn ungrab_server(&self) -> Result<()> {
        self.conn.ungrab_server()?;

        Ok(())
    }
}
