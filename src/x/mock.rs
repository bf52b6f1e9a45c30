//! A mock implementation of [XConn] that is easier to implement for
//! use in tests.
//!
//! Any implementation of [MockXConn] automatically implements [XConn]
//! by forwarding each `$method` to `mock_$method`. Defaults are benign:
//! requests succeed and do nothing, queries return empty data, so tests
//! only override the methods whose behaviour or recording they need.
use crate::{
    core::{bindings::MouseButton, Xid},
    pure::{
        client::SizeHints,
        geometry::{Point, Rect},
    },
    x::{
        event::{ConfigureRequestEvent, XEvent},
        keysym::Keysym,
        property::{WindowAttributes, WmHints, WmState},
        Atom, CursorKind, XConn,
    },
    Color, Error, Result,
};

#[allow(unused_variables, missing_docs)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(0)
    }

    fn mock_screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Ok(vec![Rect::new(0, 0, 1920, 1080)])
    }

    fn mock_check_other_wm(&self) -> Result<()> {
        Ok(())
    }

    fn mock_select_root_events(&self) -> Result<()> {
        Ok(())
    }

    fn mock_init_wm_properties(&self, wm_name: &str) -> Result<Xid> {
        Ok(Xid(0))
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::UnimplementedMock)
    }

    fn mock_poll_event(&self) -> Result<Option<XEvent>> {
        Ok(None)
    }

    fn mock_flush(&self) {}

    fn mock_sync(&self) -> Result<()> {
        Ok(())
    }

    fn mock_known_atom(&self, atom: Atom) -> Xid {
        // Stable fake server ids, clear of real window ids used in tests
        Xid(10_000 + atom as u32)
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(vec![])
    }

    fn mock_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        Ok(WindowAttributes {
            override_redirect: false,
            viewable: true,
        })
    }

    fn mock_window_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        Ok((Rect::new(0, 0, 800, 600), 0))
    }

    fn mock_text_prop(&self, id: Xid, atom: Atom) -> Result<Option<String>> {
        Ok(None)
    }

    fn mock_wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        Ok(None)
    }

    fn mock_transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }

    fn mock_normal_hints(&self, id: Xid) -> Result<SizeHints> {
        Ok(SizeHints::default())
    }

    fn mock_wm_hints(&self, id: Xid) -> Result<Option<WmHints>> {
        Ok(None)
    }

    fn mock_set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        Ok(())
    }

    fn mock_atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<Xid>> {
        Ok(None)
    }

    fn mock_get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        Ok(())
    }

    fn mock_replace_atom_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        Ok(())
    }

    fn mock_replace_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        Ok(())
    }

    fn mock_append_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        Ok(())
    }

    fn mock_delete_prop(&self, id: Xid, prop: Atom) -> Result<()> {
        Ok(())
    }

    fn mock_send_protocol_message(&self, id: Xid, proto: Atom) -> Result<bool> {
        Ok(false)
    }

    fn mock_kill_client(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_move_client(&self, id: Xid, p: Point) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        Ok(())
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_configure_unmanaged(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        Ok(())
    }

    fn mock_select_client_events(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_map(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_raise(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_lower(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_create_bar_window(&self, r: Rect) -> Result<Xid> {
        Ok(Xid(0))
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_set_input_focus(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_cursor_position(&self) -> Result<Point> {
        Ok(Point::new(0, 0))
    }

    fn mock_warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_allow_replay_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_keys(&self, keys: &[(u16, Keysym)], numlock_mask: u16) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_buttons(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[(u16, MouseButton)],
        numlock_mask: u16,
    ) -> Result<()> {
        Ok(())
    }

    fn mock_numlock_mask(&self) -> Result<u16> {
        Ok(0)
    }

    fn mock_grab_server(&self) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_server(&self) -> Result<()> {
        Ok(())
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn screen_size(&self) -> (u32, u32) {
        self.mock_screen_size()
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }

    fn check_other_wm(&self) -> Result<()> {
        self.mock_check_other_wm()
    }

    fn select_root_events(&self) -> Result<()> {
        self.mock_select_root_events()
    }

    fn init_wm_properties(&self, wm_name: &str) -> Result<Xid> {
        self.mock_init_wm_properties(wm_name)
    }

    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        self.mock_poll_event()
    }

    fn flush(&self) {
        self.mock_flush()
    }

    fn sync(&self) -> Result<()> {
        self.mock_sync()
    }

    fn known_atom(&self, atom: Atom) -> Xid {
        self.mock_known_atom(atom)
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        self.mock_existing_clients()
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        self.mock_window_attributes(id)
    }

    fn window_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        self.mock_window_geometry(id)
    }

    fn text_prop(&self, id: Xid, atom: Atom) -> Result<Option<String>> {
        self.mock_text_prop(id, atom)
    }

    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        self.mock_wm_class(id)
    }

    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        self.mock_transient_for(id)
    }

    fn normal_hints(&self, id: Xid) -> Result<SizeHints> {
        self.mock_normal_hints(id)
    }

    fn wm_hints(&self, id: Xid) -> Result<Option<WmHints>> {
        self.mock_wm_hints(id)
    }

    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()> {
        self.mock_set_urgency_hint(id, urgent)
    }

    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<Xid>> {
        self.mock_atom_prop(id, atom)
    }

    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        self.mock_get_wm_state(id)
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(id, state)
    }

    fn replace_atom_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        self.mock_replace_atom_prop(id, prop, values)
    }

    fn replace_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        self.mock_replace_window_prop(id, prop, values)
    }

    fn append_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        self.mock_append_window_prop(id, prop, values)
    }

    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()> {
        self.mock_delete_prop(id, prop)
    }

    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<bool> {
        self.mock_send_protocol_message(id, proto)
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.mock_kill_client(id)
    }

    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        self.mock_position_client(id, r, bw)
    }

    fn move_client(&self, id: Xid, p: Point) -> Result<()> {
        self.mock_move_client(id, p)
    }

    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        self.mock_set_border_width(id, bw)
    }

    fn set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        self.mock_set_border_color(id, color)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        self.mock_send_configure_notify(id, r, bw)
    }

    fn configure_unmanaged(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        self.mock_configure_unmanaged(ev)
    }

    fn select_client_events(&self, id: Xid) -> Result<()> {
        self.mock_select_client_events(id)
    }

    fn map(&self, id: Xid) -> Result<()> {
        self.mock_map(id)
    }

    fn raise(&self, id: Xid) -> Result<()> {
        self.mock_raise(id)
    }

    fn lower(&self, id: Xid) -> Result<()> {
        self.mock_lower(id)
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        self.mock_stack_below(id, sibling)
    }

    fn create_bar_window(&self, r: Rect) -> Result<Xid> {
        self.mock_create_bar_window(r)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.mock_destroy_window(id)
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.mock_set_input_focus(id)
    }

    fn cursor_position(&self) -> Result<Point> {
        self.mock_cursor_position()
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.mock_warp_pointer(id, x, y)
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        self.mock_grab_pointer(cursor)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.mock_ungrab_pointer()
    }

    fn allow_replay_pointer(&self) -> Result<()> {
        self.mock_allow_replay_pointer()
    }

    fn grab_keys(&self, keys: &[(u16, Keysym)], numlock_mask: u16) -> Result<()> {
        self.mock_grab_keys(keys, numlock_mask)
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.mock_ungrab_buttons(id)
    }

    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[(u16, MouseButton)],
        numlock_mask: u16,
    ) -> Result<()> {
        self.mock_grab_buttons(id, focused, buttons, numlock_mask)
    }

    fn numlock_mask(&self) -> Result<u16> {
        self.mock_numlock_mask()
    }

    fn grab_server(&self) -> Result<()> {
        self.mock_grab_server()
    }

    fn ungrab_server(&self) -> Result<()> {
        self.mock_ungrab_server()
    }
}
