//! Conversions from raw x11rb events to window manager event types
use crate::{
    core::{bindings::MouseButton, Xid},
    pure::geometry::{Point, Rect},
    x::event::{
        ClientMessage, ConfigureEvent, ConfigureRequestEvent, ExposeEvent, KeyPressEvent,
        MotionEvent, MouseEvent, PointerChange, PropertyEvent, UnmapEvent, XEvent,
    },
    x11rb::Conn,
    Error, Result,
};
use tracing::warn;
use x11rb::{
    connection::Connection,
    protocol::{
        xproto::{ConfigWindow, Mapping, NotifyDetail, NotifyMode, Property},
        Event,
    },
    x11_utils::X11Error,
};

// Core request opcodes whose errors commonly race client destruction
// and are ignored, per the xlib error handler this replaces.
const OP_CONFIGURE_WINDOW: u8 = 12;
const OP_GRAB_BUTTON: u8 = 28;
const OP_GRAB_KEY: u8 = 33;
const OP_SET_INPUT_FOCUS: u8 = 42;

const SEND_EVENT_BIT: u8 = 0x80;

pub(crate) fn convert_event<C: Connection>(conn: &Conn<C>, event: Event) -> Result<Option<XEvent>> {
    let root = conn.root;

    match event {
        Event::RandrNotify(_) | Event::RandrScreenChangeNotify(_) => {
            Ok(Some(XEvent::RandrNotify))
        }

        Event::ButtonPress(event) => {
            let Some(button) = MouseButton::from_detail(event.detail) else {
                warn!(button = event.detail, "dropping unknown mouse button event");
                return Ok(None);
            };
            Ok(Some(XEvent::ButtonPress(MouseEvent {
                id: Xid(event.event),
                child: (event.child != 0).then_some(Xid(event.child)),
                rpt: Point::new(event.root_x as i32, event.root_y as i32),
                wpt: Point::new(event.event_x as i32, event.event_y as i32),
                button,
                mask: event.state.into(),
            })))
        }

        Event::ButtonRelease(event) => {
            let Some(button) = MouseButton::from_detail(event.detail) else {
                warn!(button = event.detail, "dropping unknown mouse button event");
                return Ok(None);
            };
            Ok(Some(XEvent::ButtonRelease(MouseEvent {
                id: Xid(event.event),
                child: (event.child != 0).then_some(Xid(event.child)),
                rpt: Point::new(event.root_x as i32, event.root_y as i32),
                wpt: Point::new(event.event_x as i32, event.event_y as i32),
                button,
                mask: event.state.into(),
            })))
        }

        Event::MotionNotify(event) => Ok(Some(XEvent::MotionNotify(MotionEvent {
            id: Xid(event.event),
            rpt: Point::new(event.root_x as i32, event.root_y as i32),
        }))),

        Event::KeyPress(event) => Ok(Some(XEvent::KeyPress(KeyPressEvent {
            keysym: conn.keysym_for_keycode(event.detail),
            mask: event.state.into(),
        }))),

        Event::MapRequest(event) => Ok(Some(XEvent::MapRequest(Xid(event.window)))),

        Event::UnmapNotify(event) => Ok(Some(XEvent::UnmapNotify(UnmapEvent {
            id: Xid(event.window),
            send_event: event.response_type & SEND_EVENT_BIT != 0,
        }))),

        Event::EnterNotify(event) => Ok(Some(XEvent::Enter(PointerChange {
            id: Xid(event.event),
            abs: Point::new(event.root_x as i32, event.root_y as i32),
            is_normal_mode: event.mode == NotifyMode::NORMAL,
            is_inferior_detail: event.detail == NotifyDetail::INFERIOR,
        }))),

        Event::DestroyNotify(event) => Ok(Some(XEvent::Destroy(Xid(event.window)))),

        Event::FocusIn(event) => Ok(Some(XEvent::FocusIn(Xid(event.event)))),

        Event::ConfigureNotify(event) => Ok(Some(XEvent::ConfigureNotify(ConfigureEvent {
            id: Xid(event.window),
            r: Rect::new(
                event.x as i32,
                event.y as i32,
                event.width as u32,
                event.height as u32,
            ),
            is_root: event.window == root,
        }))),

        Event::ConfigureRequest(event) => {
            let mask = event.value_mask;
            let has = |flag: ConfigWindow| u16::from(mask) & u16::from(flag) != 0;

            Ok(Some(XEvent::ConfigureRequest(ConfigureRequestEvent {
                id: Xid(event.window),
                x: has(ConfigWindow::X).then_some(event.x as i32),
                y: has(ConfigWindow::Y).then_some(event.y as i32),
                w: has(ConfigWindow::WIDTH).then_some(event.width as u32),
                h: has(ConfigWindow::HEIGHT).then_some(event.height as u32),
                border_width: has(ConfigWindow::BORDER_WIDTH)
                    .then_some(event.border_width as u32),
                sibling: has(ConfigWindow::SIBLING).then_some(Xid(event.sibling)),
                stack_mode: has(ConfigWindow::STACK_MODE).then_some(event.stack_mode.into()),
            })))
        }

        Event::Expose(event) => Ok(Some(XEvent::Expose(ExposeEvent {
            id: Xid(event.window),
            count: event.count as usize,
        }))),

        Event::MappingNotify(event) => {
            conn.refresh_keyboard_map()?;
            Ok(Some(XEvent::MappingNotify {
                keyboard: event.request == Mapping::KEYBOARD,
            }))
        }

        Event::ClientMessage(event) => {
            if event.format != 32 {
                return Err(Error::InvalidClientMessage {
                    format: event.format,
                });
            }
            Ok(Some(XEvent::ClientMessage(ClientMessage {
                id: Xid(event.window),
                dtype: conn.atom_name(event.type_)?,
                data: event.data.as_data32(),
            })))
        }

        Event::PropertyNotify(event) => Ok(Some(XEvent::PropertyNotify(PropertyEvent {
            id: Xid(event.window),
            atom: conn.atom_name(event.atom)?,
            is_root: event.window == root,
            deleted: event.state == Property::DELETE,
        }))),

        // BadWindow errors surface as UnknownClient so the event loop
        // can log and drop them
        Event::Error(X11Error {
            error_kind: x11rb::protocol::ErrorKind::Window,
            bad_value,
            ..
        }) => Err(Error::UnknownClient(Xid(bad_value))),

        // Specific request / error combinations tied to racing client
        // destruction are silently dropped
        Event::Error(X11Error {
            error_kind: x11rb::protocol::ErrorKind::Match,
            major_opcode,
            ..
        }) if matches!(major_opcode, OP_SET_INPUT_FOCUS | OP_CONFIGURE_WINDOW) => Ok(None),

        Event::Error(X11Error {
            error_kind: x11rb::protocol::ErrorKind::Drawable,
            ..
        }) => Ok(None),

        Event::Error(X11Error {
            error_kind: x11rb::protocol::ErrorKind::Access,
            major_opcode,
            ..
        }) if matches!(major_opcode, OP_GRAB_BUTTON | OP_GRAB_KEY) => Ok(None),

        // Other errors are returned directly
        Event::Error(e) => Err(Error::X11Error(e)),

        // Ignoring other event types
        _ => Ok(None),
    }
}
