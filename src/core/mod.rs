//! Core data structures and the window manager event loop
use crate::{
    core::{bar::BarDraw, config::Config},
    pure::{Client, Monitor, Rect},
    util,
    x::{event::XEvent, keysym::Keysym, property::WmState, Atom, XConn},
    Error, Result,
};
use nix::sys::signal::{signal, SigHandler, Signal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, VecDeque},
    ops::Deref,
    os::raw::c_int,
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{error, span, trace, Level};

pub mod actions;
pub mod bar;
pub mod bindings;
pub mod clients;
pub mod config;
pub mod handle;
pub mod layout;
pub mod mouse;

/// An X11 ID for a given resource
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}

// Signal handlers only set flags; the event loop polls them after each
// event.
static RUNNING: AtomicBool = AtomicBool::new(true);
static RESTART: AtomicBool = AtomicBool::new(false);

/// Ask the event loop to exit after the current event, optionally
/// re-executing the process once teardown is complete.
pub fn request_quit(restart: bool) {
    if restart {
        RESTART.store(true, Ordering::SeqCst);
    }
    RUNNING.store(false, Ordering::SeqCst);
}

/// Whether a restart was requested before the event loop exited.
pub fn restart_requested() -> bool {
    RESTART.load(Ordering::SeqCst)
}

extern "C" fn notify_quit(_: c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

extern "C" fn notify_restart(_: c_int) {
    RESTART.store(true, Ordering::SeqCst);
    RUNNING.store(false, Ordering::SeqCst);
}

extern "C" fn reap_children(_: c_int) {
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};

    while let Ok(status) = waitpid(None, Some(WaitPidFlag::WNOHANG)) {
        if matches!(status, WaitStatus::StillAlive) {
            break;
        }
    }
}

/// Mutable state for the window manager: the client arena, the monitor
/// list and everything the event handlers need to get at.
#[derive(Debug)]
pub struct State {
    /// The user provided configuration tables
    pub config: Config,
    /// All managed clients, keyed by their window
    pub clients: HashMap<Xid, Client>,
    /// One monitor per unique output geometry
    pub monitors: Vec<Monitor>,
    /// Index of the currently selected monitor
    pub sel_mon: usize,
    /// The monitor the pointer was last seen on (root motion tracking)
    pub motion_mon: Option<usize>,
    /// Width and height of the X screen in pixels
    pub screen_size: (u32, u32),
    /// Height of the bar in pixels
    pub bar_h: u32,
    /// Status text shown at the right hand side of the selected bar
    pub status_text: String,
    /// The modifier mask the server maps num lock to
    pub numlock_mask: u16,
    /// Events consumed out of order by a gesture pump, waiting for the
    /// main loop
    pub pending: VecDeque<XEvent>,
    /// The drawing helper fed by the bar surface
    pub bar: Box<dyn BarDraw>,
    /// The EWMH supporting check window
    pub check_win: Xid,
}

impl State {
    /// Build the initial state for the given config and bar renderer.
    pub fn new(config: Config, bar: Box<dyn BarDraw>) -> Result<Self> {
        config.validate()?;
        let bar_h = bar.height();

        Ok(Self {
            config,
            clients: HashMap::new(),
            monitors: Vec::new(),
            sel_mon: 0,
            motion_mon: None,
            screen_size: (0, 0),
            bar_h,
            status_text: String::new(),
            numlock_mask: 0,
            pending: VecDeque::new(),
            bar,
            check_win: Xid(0),
        })
    }

    /// The bitmask covering every configured tag.
    pub fn all_tags(&self) -> u32 {
        (1 << self.config.tags.len()) - 1
    }

    /// The currently selected monitor.
    pub fn selmon(&self) -> &Monitor {
        &self.monitors[self.sel_mon]
    }

    /// The currently selected monitor, mutably.
    pub fn selmon_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.sel_mon]
    }

    /// The selected client on the selected monitor, if any.
    pub fn selected(&self) -> Option<Xid> {
        self.selmon().sel
    }

    /// Whether `id` is visible under its monitor's active tagset.
    pub fn is_visible(&self, id: Xid) -> bool {
        match self.clients.get(&id) {
            Some(c) => c.is_visible_on(self.monitors[c.monitor].active_tagset()),
            None => false,
        }
    }

    /// The tiled (non floating) visible clients of a monitor in client
    /// list order.
    pub fn tiled_visible(&self, m: usize) -> Vec<Xid> {
        let tagset = self.monitors[m].active_tagset();

        self.monitors[m]
            .clients
            .iter()
            .copied()
            .filter(|id| {
                self.clients
                    .get(id)
                    .map(|c| !c.is_free && c.is_visible_on(tagset))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The visible clients of a monitor in client list order.
    pub fn visible(&self, m: usize) -> Vec<Xid> {
        let tagset = self.monitors[m].active_tagset();

        self.monitors[m]
            .clients
            .iter()
            .copied()
            .filter(|id| {
                self.clients
                    .get(id)
                    .map(|c| c.is_visible_on(tagset))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The monitor with the largest intersection with `r`, defaulting
    /// to the selected monitor.
    pub fn rect_to_monitor(&self, r: Rect) -> usize {
        let mut index = self.sel_mon;
        let mut area = 0;

        for (i, m) in self.monitors.iter().enumerate() {
            let a = r.intersection_area(&m.window_area);
            if a > area {
                area = a;
                index = i;
            }
        }

        index
    }

    /// The next monitor in the given direction, wrapping around.
    pub fn dir_to_monitor(&self, dir: i32) -> usize {
        let n = self.monitors.len();
        if dir > 0 {
            (self.sel_mon + 1) % n
        } else {
            (self.sel_mon + n - 1) % n
        }
    }
}

/// A top level struct holding everything needed to run as an X11 window
/// manager.
#[derive(Debug)]
pub struct WindowManager<X>
where
    X: XConn,
{
    x: X,
    /// The mutable window manager state
    pub state: State,
    initialized: bool,
}

impl<X> WindowManager<X>
where
    X: XConn,
{
    /// Construct a new [WindowManager] with the provided config, bar
    /// renderer and X connection.
    ///
    /// Fails with [Error::OtherWmRunning] if another window manager
    /// already holds substructure redirect on the root window.
    pub fn new(config: Config, bar: Box<dyn BarDraw>, x: X) -> Result<Self> {
        x.check_other_wm()?;

        let mut state = State::new(config, bar)?;
        state.screen_size = x.screen_size();

        Ok(Self {
            x,
            state,
            initialized: false,
        })
    }

    /// Claim the root window, discover monitors, publish the EWMH
    /// properties and derive the input grabs.
    ///
    /// Run implicitly by [WindowManager::run]; calling it explicitly is
    /// only needed when driving the manager event by event.
    pub fn setup(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        let (state, x) = (&mut self.state, &self.x);

        clients::update_geometry(state, x)?;
        state.check_win = x.init_wm_properties("rxwm")?;
        x.select_root_events()?;
        clients::grab_keys(state, x)?;
        clients::update_bars(state, x)?;
        clients::update_status(state, x)?;
        clients::focus(state, x, None)?;

        Ok(())
    }

    /// Start the window manager and run until told to exit.
    ///
    /// On a clean exit the caller should check [restart_requested] and,
    /// after [WindowManager::cleanup], re-execute the process if set.
    pub fn run(&mut self) -> Result<()> {
        trace!("registering signal handlers");
        // SAFETY: the handlers only touch atomics and waitpid
        let res = unsafe {
            signal(Signal::SIGCHLD, SigHandler::Handler(reap_children))
                .and(signal(Signal::SIGTERM, SigHandler::Handler(notify_quit)))
                .and(signal(Signal::SIGHUP, SigHandler::Handler(notify_restart)))
        };
        if let Err(e) = res {
            panic!("unable to set signal handlers: {}", e);
        }
        // Reap anything that exited before the handler was in place
        reap_children(0);

        self.setup()?;
        clients::scan(&mut self.state, &self.x)?;

        if let Some(cmd) = self.state.config.startup.clone() {
            if let Err(e) = util::spawn_argv(&cmd) {
                error!(%e, ?cmd, "error spawning startup command");
            }
        }

        self.x.sync()?;

        while RUNNING.load(Ordering::SeqCst) {
            // Events buffered by a gesture pump are replayed before
            // blocking on the server again
            let next = match self.state.pending.pop_front() {
                Some(event) => Ok(event),
                None => self.x.next_event(),
            };

            match next {
                Ok(event) => {
                    let span = span!(target: "rxwm", Level::DEBUG, "XEvent", %event);
                    let _enter = span.enter();
                    trace!(details = ?event, "event details");

                    if let Err(e) = self.handle_event(event) {
                        match e {
                            Error::UnknownClient(id) => trace!(%id, "event for unknown client"),
                            Error::Connection(_) | Error::Connect(_) => return Err(e),
                            e => error!(%e, "error handling event"),
                        }
                    }
                    self.x.flush();
                }

                Err(Error::UnknownClient(id)) => trace!(%id, "error event for unknown client"),
                Err(e @ (Error::Connection(_) | Error::Connect(_))) => return Err(e),
                Err(e) => error!(%e, "error pulling next x event"),
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: XEvent) -> Result<()> {
        use XEvent::*;

        let (state, x) = (&mut self.state, &self.x);

        match event {
            ButtonPress(e) => handle::button_press(e, state, x),
            // Releases act as gesture terminators and are consumed by
            // the gesture pumps; stray ones are dropped here
            ButtonRelease(_) => Ok(()),
            ClientMessage(m) => handle::client_message(m, state, x),
            ConfigureNotify(e) => handle::configure_notify(e, state, x),
            ConfigureRequest(e) => handle::configure_request(e, state, x),
            Destroy(id) => handle::destroy(id, state, x),
            Enter(p) => handle::enter(p, state, x),
            Expose(e) => handle::expose(e, state, x),
            FocusIn(id) => handle::focus_in(id, state, x),
            KeyPress(k) => handle::key_press(k, state, x),
            MappingNotify { keyboard } => handle::mapping_notify(keyboard, state, x),
            MapRequest(id) => handle::map_request(id, state, x),
            MotionNotify(e) => handle::motion_notify(e, state, x),
            PropertyNotify(e) => handle::property_notify(e, state, x),
            RandrNotify => handle::randr_notify(state, x),
            UnmapNotify(e) => handle::unmap_notify(e, state, x),
        }
    }

    /// Tear down all window manager state, leaving clients alive and
    /// withdrawn for whatever manages them next.
    pub fn cleanup(mut self) -> Result<()> {
        let (state, x) = (&mut self.state, &self.x);

        let ids: Vec<Xid> = state.clients.keys().copied().collect();
        for id in ids {
            if let Some(c) = state.clients.get(&id) {
                x.set_border_width(id, c.old_bw).ok();
            }
            x.ungrab_buttons(id).ok();
            x.set_wm_state(id, WmState::Withdrawn).ok();
        }

        x.grab_keys(&[], 0)?;

        for m in state.monitors.iter() {
            if m.bar_win != Xid(0) {
                x.destroy_window(m.bar_win).ok();
            }
        }
        if state.check_win != Xid(0) {
            x.destroy_window(state.check_win).ok();
        }

        x.sync()?;
        x.set_input_focus(x.root())?;
        x.delete_prop(x.root(), Atom::NetActiveWindow)?;

        Ok(())
    }

    /// Drive a single event through the dispatch table.
    ///
    /// This is the hook used by integration tests to replay scripted
    /// event sequences.
    #[doc(hidden)]
    pub fn handle_event_for_test(&mut self, event: XEvent) -> Result<()> {
        self.handle_event(event)
    }

    /// Shared access to the underlying connection.
    pub fn conn(&self) -> &X {
        &self.x
    }
}

pub(crate) fn keys_for_grab(state: &State) -> Vec<(u16, Keysym)> {
    state
        .config
        .keys
        .iter()
        .map(|k| (k.mods, k.keysym))
        .collect()
}
