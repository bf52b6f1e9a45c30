//! rxwm is a dynamic tiling window manager for X11 in the spirit of dwm.
//!
//! Like any other X client, the window manager is driven by handling X
//! events: it is the one client allowed to select `SubstructureRedirect`
//! on the root window, which routes every map / configure request for
//! top level windows through it. Each managed window is a [Client][1],
//! organised per [Monitor][2] in an ordered client list and a focus
//! stack, with a bit per [tag] marking the virtual workspaces the client
//! is shown on.
//!
//! All window manager logic is written against the [XConn][3] trait so
//! that the kernel can be driven by the real [x11rb backend][4] in
//! production and by a mock connection in tests.
//!
//! [1]: crate::pure::Client
//! [2]: crate::pure::Monitor
//! [3]: crate::x::XConn
//! [4]: crate::x11rb::Conn
//!
//! [tag]: crate::pure::Monitor::tagset
#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::style,
    future_incompatible,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod color;
pub mod core;
pub mod pure;
pub mod util;
pub mod x;
pub mod x11rb;

pub use crate::core::{State, WindowManager, Xid};
pub use color::Color;

/// Error variants from the core window manager and its X backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection is broken
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// The provided configuration tables are inconsistent
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the provided config
        reason: String,
    },

    /// A string was not a valid `#rrggbb` hex color
    #[error("'{hex}' is not a valid hex color code")]
    InvalidHexColor {
        /// The string that was provided
        hex: String,
    },

    /// A client message was received with an unknown data format
    #[error("invalid client message data format: {format}")]
    InvalidClientMessage {
        /// The message format that was received
        format: u8,
    },

    /// An IO error was encountered
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A required property was not set for a given client
    #[error("'{name}' property is not set for client {id}")]
    MissingProp {
        /// The name of the requested property
        name: String,
        /// The client being queried
        id: Xid,
    },

    /// The X server did not return any usable screens
    #[error("the X server did not return any usable screens")]
    NoScreens,

    /// Another window manager already holds substructure redirect on root
    #[error("another window manager is already running")]
    OtherWmRunning,

    /// Could not get an X11 request reply
    #[error(transparent)]
    ReplyError(#[from] ::x11rb::errors::ReplyError),

    /// Could not allocate a new X11 resource id
    #[error(transparent)]
    ReplyOrIdError(#[from] ::x11rb::errors::ReplyOrIdError),

    /// More tags were configured than fit in the tag bitmask
    #[error("at most 31 tags are supported: {n} were configured")]
    TooManyTags {
        /// The number of tags that were configured
        n: usize,
    },

    /// A mock method was called without an implementation being provided
    #[error("mock method called without an implementation")]
    UnimplementedMock,

    /// An operation was requested on a window we do not know about.
    ///
    /// This is also how `BadWindow` protocol errors surface when a
    /// request races the destruction of a foreign client: the event
    /// loop logs and ignores them.
    #[error("client {0} is not in the window manager state")]
    UnknownClient(Xid),

    /// An X11 protocol error that is not part of the ignore list
    #[error("X11 protocol error: {0:?}")]
    X11Error(::x11rb::x11_utils::X11Error),
}

/// A Result where the error type is a window manager [Error]
pub type Result<T> = std::result::Result<T, Error>;
