//! Logic for interacting with the X server
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
    },
    Color, Result,
};

pub mod atom;
pub mod event;
pub mod keysym;
pub mod property;

// Test support: the integration tests drive the kernel through this
// mock, so it is compiled unconditionally but kept out of the docs.
#[doc(hidden)]
pub mod mock;

pub use atom::Atom;
pub use event::XEvent as Event;

/// The cursor shapes used by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// The default left pointer
    Normal,
    /// Shown while a resize gesture is in progress
    Resize,
    /// Shown while a move or click-to-act gesture is in progress
    Move,
}

/// A handle on a running X11 connection that we use for issuing X
/// requests.
///
/// `XConn` is an abstraction layer between the window management kernel
/// and the display server so that the kernel logic can be driven by a
/// mock implementation in tests. The method set mirrors the X surface
/// the kernel needs: one method per request, no window manager policy.
///
/// Errors raised by requests that race the destruction of a foreign
/// window (`BadWindow` and friends) surface as
/// [Error::UnknownClient][0]: the event loop logs and ignores them, and
/// call sites that expect such races treat failures as absence.
///
/// [0]: crate::Error::UnknownClient
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;

    /// The width and height of the X screen in pixels.
    fn screen_size(&self) -> (u32, u32);

    /// Ask the X server for the geometry of each currently active output.
    fn screen_details(&self) -> Result<Vec<Rect>>;

    /// Attempt to claim substructure redirect on the root window.
    ///
    /// Exactly one client may hold this selection: failure means another
    /// window manager is running and is a fatal error.
    fn check_other_wm(&self) -> Result<()>;

    /// Select the full root window event mask and install the normal
    /// cursor on the root window.
    fn select_root_events(&self) -> Result<()>;

    /// Create the supporting check window and publish the EWMH
    /// properties advertising this window manager, returning the check
    /// window id.
    fn init_wm_properties(&self, wm_name: &str) -> Result<Xid>;

    /// Block and wait for the next event from the X server.
    fn next_event(&self) -> Result<XEvent>;

    /// Return the next already-queued event if there is one, without
    /// blocking.
    fn poll_event(&self) -> Result<Option<XEvent>>;

    /// Flush any pending requests to the X server.
    fn flush(&self);

    /// Flush and wait for the X server to have processed all requests.
    fn sync(&self) -> Result<()>;

    /// The server atom id for a known [Atom].
    fn known_atom(&self, atom: Atom) -> Xid;

    /// Ask the X server for the ids of all existing top level windows,
    /// in current stacking order.
    fn existing_clients(&self) -> Result<Vec<Xid>>;

    /// Request the attributes we consume at manage time.
    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes>;

    /// Current geometry and border width of a window.
    fn window_geometry(&self, id: Xid) -> Result<(Rect, u32)>;

    /// Read a text property from a window.
    fn text_prop(&self, id: Xid, atom: Atom) -> Result<Option<String>>;

    /// Read the (instance, class) pair from `WM_CLASS`.
    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>>;

    /// The window this one is a transient for, if any.
    fn transient_for(&self, id: Xid) -> Result<Option<Xid>>;

    /// Read and parse `WM_NORMAL_HINTS`.
    fn normal_hints(&self, id: Xid) -> Result<SizeHints>;

    /// Read and parse `WM_HINTS`.
    fn wm_hints(&self, id: Xid) -> Result<Option<WmHints>>;

    /// Raise or clear the urgency bit in a client's `WM_HINTS`.
    fn set_urgency_hint(&self, id: Xid, urgent: bool) -> Result<()>;

    /// Read the first atom value of an atom-typed property.
    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<Xid>>;

    /// Read a client's ICCCM `WM_STATE`.
    fn get_wm_state(&self, id: Xid) -> Result<Option<WmState>>;

    /// Set a client's ICCCM `WM_STATE`.
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;

    /// Replace an atom-typed property with the given values.
    fn replace_atom_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()>;

    /// Replace a window-typed property with the given values.
    fn replace_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()>;

    /// Append values to a window-typed property.
    fn append_window_prop(&self, id: Xid, prop: Atom, values: &[Xid]) -> Result<()>;

    /// Delete a property from a window.
    fn delete_prop(&self, id: Xid, prop: Atom) -> Result<()>;

    /// If the client advertises `proto` in `WM_PROTOCOLS`, send it as a
    /// client message and return true; otherwise return false.
    fn send_protocol_message(&self, id: Xid, proto: Atom) -> Result<bool>;

    /// Forcibly kill a client connection.
    fn kill_client(&self, id: Xid) -> Result<()>;

    /// Position and size a window, including its border width.
    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()>;

    /// Move a window without touching its size.
    fn move_client(&self, id: Xid, p: Point) -> Result<()>;

    /// Set only the border width of a window.
    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()>;

    /// Set the border color of a window.
    fn set_border_color(&self, id: Xid, color: Color) -> Result<()>;

    /// Send a synthetic `ConfigureNotify` describing a client's current
    /// geometry, per ICCCM 4.1.5.
    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()>;

    /// Forward a configure request for a window we do not manage,
    /// honouring exactly the fields the client asked for.
    fn configure_unmanaged(&self, ev: &ConfigureRequestEvent) -> Result<()>;

    /// Select the per-client event mask on a newly managed window.
    fn select_client_events(&self, id: Xid) -> Result<()>;

    /// Map a window, making it visible.
    fn map(&self, id: Xid) -> Result<()>;

    /// Raise a window to the top of the stacking order.
    fn raise(&self, id: Xid) -> Result<()>;

    /// Lower a window to the bottom of the stacking order.
    fn lower(&self, id: Xid) -> Result<()>;

    /// Stack a window directly below a sibling.
    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()>;

    /// Create an override-redirect bar window for a monitor and map it
    /// raised.
    fn create_bar_window(&self, r: Rect) -> Result<Xid>;

    /// Destroy a window we created.
    fn destroy_window(&self, id: Xid) -> Result<()>;

    /// Give input focus to a window.
    fn set_input_focus(&self, id: Xid) -> Result<()>;

    /// Current absolute position of the mouse pointer.
    fn cursor_position(&self) -> Result<Point>;

    /// Warp the mouse pointer to an (x, y) position within a window.
    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()>;

    /// Grab the pointer with the given gesture cursor, reporting
    /// whether the grab succeeded.
    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool>;

    /// Release an active pointer grab.
    fn ungrab_pointer(&self) -> Result<()>;

    /// Release a frozen pointer, replaying the triggering event to the
    /// client it targeted.
    fn allow_replay_pointer(&self) -> Result<()>;

    /// Re-derive the root key grabs from the key binding table.
    fn grab_keys(&self, keys: &[(u16, Keysym)], numlock_mask: u16) -> Result<()>;

    /// Drop every button grab held on a client window.
    fn ungrab_buttons(&self, id: Xid) -> Result<()>;

    /// Re-derive the button grabs for a client window.
    ///
    /// An unfocused client additionally gets a synchronous any-button
    /// grab so that click-to-focus works.
    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[(u16, MouseButton)],
        numlock_mask: u16,
    ) -> Result<()>;

    /// The modifier mask the server has assigned to num lock.
    fn numlock_mask(&self) -> Result<u16>;

    /// Grab the X server, serialising against all other clients.
    fn grab_server(&self) -> Result<()>;

    /// Release a server grab.
    fn ungrab_server(&self) -> Result<()>;
}
