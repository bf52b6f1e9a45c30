//! Data types for working with X events
use crate::{
    core::bindings::MouseButton,
    core::Xid,
    pure::geometry::{Point, Rect},
    x::keysym::Keysym,
};

/// Wrapper around the low level X event types that the dispatch table
/// consumes.
///
/// The variant names and data have been developed with the x11rb
/// backend in mind but should be applicable for any back end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// A mouse button was pressed
    ButtonPress(MouseEvent),
    /// A mouse button was released
    ButtonRelease(MouseEvent),
    /// A message has been sent to a particular client
    ClientMessage(ClientMessage),
    /// Client config has changed in some way
    ConfigureNotify(ConfigureEvent),
    /// A client is requesting to be repositioned
    ConfigureRequest(ConfigureRequestEvent),
    /// A client window has been closed
    Destroy(Xid),
    /// The mouse pointer has entered a new client window
    Enter(PointerChange),
    /// A part or all of a client has become visible
    Expose(ExposeEvent),
    /// A client should have focus
    FocusIn(Xid),
    /// A grabbed key combination has been entered by the user
    KeyPress(KeyPressEvent),
    /// The keyboard or pointer mapping has changed
    MappingNotify {
        /// Whether the keyboard mapping changed (requires re-grabbing keys)
        keyboard: bool,
    },
    /// A client window is requesting to be positioned and rendered on the screen
    MapRequest(Xid),
    /// The mouse pointer has moved
    MotionNotify(MotionEvent),
    /// A client property has changed in some way
    PropertyNotify(PropertyEvent),
    /// The available outputs have changed in some way
    RandrNotify,
    /// A client is being unmapped
    UnmapNotify(UnmapEvent),
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;

        match self {
            ButtonPress(_) => write!(f, "ButtonPress"),
            ButtonRelease(_) => write!(f, "ButtonRelease"),
            ClientMessage(_) => write!(f, "ClientMessage"),
            ConfigureNotify(_) => write!(f, "ConfigureNotify"),
            ConfigureRequest(_) => write!(f, "ConfigureRequest"),
            Destroy(_) => write!(f, "Destroy"),
            Enter(_) => write!(f, "Enter"),
            Expose(_) => write!(f, "Expose"),
            FocusIn(_) => write!(f, "FocusIn"),
            KeyPress(_) => write!(f, "KeyPress"),
            MappingNotify { .. } => write!(f, "MappingNotify"),
            MapRequest(_) => write!(f, "MapRequest"),
            MotionNotify(_) => write!(f, "MotionNotify"),
            PropertyNotify(_) => write!(f, "PropertyNotify"),
            RandrNotify => write!(f, "RandrNotify"),
            UnmapNotify(_) => write!(f, "UnmapNotify"),
        }
    }
}

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The window the event was delivered to
    pub id: Xid,
    /// The top level window under the pointer, if any
    pub child: Option<Xid>,
    /// Absolute coordinate of the event
    pub rpt: Point,
    /// Coordinate of the event relative to the event window
    pub wpt: Point,
    /// The button that was pressed or released
    pub button: MouseButton,
    /// The raw modifier state held at the time of the event
    pub mask: u16,
}

/// The pointer has moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    /// The window the event was delivered to
    pub id: Xid,
    /// Absolute coordinate of the event
    pub rpt: Point,
}

/// A grabbed key chord was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPressEvent {
    /// The keysym in the unshifted column for the pressed keycode
    pub keysym: Keysym,
    /// The raw modifier state held at the time of the event
    pub mask: u16,
}

/// A client message that needs to be parsed and handled based on its type.
///
/// Only 32bit format messages are forwarded: both message types the
/// window manager consumes (`_NET_WM_STATE`, `_NET_ACTIVE_WINDOW`) use
/// that format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    /// The window the message concerns
    pub id: Xid,
    /// The name of the message type atom
    pub dtype: String,
    /// The five 32bit data words of the message
    pub data: [u32; 5],
}

/// A configure notification for a window that changed position or size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// The window that was configured
    pub id: Xid,
    /// The new window size and position
    pub r: Rect,
    /// Is this window the root window?
    pub is_root: bool,
}

/// A client request to be repositioned, with one field per value-mask
/// bit from the raw request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequestEvent {
    /// The window requesting the change
    pub id: Xid,
    /// Requested x position
    pub x: Option<i32>,
    /// Requested y position
    pub y: Option<i32>,
    /// Requested width
    pub w: Option<u32>,
    /// Requested height
    pub h: Option<u32>,
    /// Requested border width
    pub border_width: Option<u32>,
    /// Requested stacking sibling
    pub sibling: Option<Xid>,
    /// Requested raw stack mode
    pub stack_mode: Option<u32>,
}

/// A notification that a window has become visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    /// The window that has become exposed
    pub id: Xid,
    /// How many following expose events are pending
    pub count: usize,
}

/// A notification that the mouse pointer has entered a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerChange {
    /// The window that was entered
    pub id: Xid,
    /// Absolute coordinate of the event
    pub abs: Point,
    /// Whether the crossing mode was NotifyNormal
    pub is_normal_mode: bool,
    /// Whether the crossing detail was NotifyInferior
    pub is_inferior_detail: bool,
}

/// A property change on a known client or the root window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    /// The window that had a property changed
    pub id: Xid,
    /// The name of the property that changed
    pub atom: String,
    /// Is this window the root window?
    pub is_root: bool,
    /// Whether the property was deleted rather than changed
    pub deleted: bool,
}

/// A client window is being unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmapEvent {
    /// The window being unmapped
    pub id: Xid,
    /// Whether this was a synthetic event sent by the client itself
    pub send_event: bool,
}
