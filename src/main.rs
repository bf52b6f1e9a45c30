//! rxwm: a dynamic tiling window manager for X11 in the spirit of dwm.
//!
//! Configuration is compile time: edit the tables returned by
//! `Config::default` in `core/config.rs` and rebuild. To follow the
//! start-up logic and main loop, start with `WindowManager::run`.
use rxwm::{
    core::{bar::NullDraw, config::Config, restart_requested, WindowManager},
    x11rb::Conn,
    Result,
};
use std::{env, ffi::CString, process};
use tracing::info;
use tracing_subscriber::{self, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && args[1] == "-v" {
        eprintln!("rxwm-{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    } else if args.len() != 1 {
        eprintln!("usage: rxwm [-v]");
        process::exit(1);
    }

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let conn = Conn::new()?;
    let mut wm = WindowManager::new(Config::default(), Box::new(NullDraw::default()), conn)?;

    wm.run()?;
    let restart = restart_requested();
    wm.cleanup()?;

    if restart {
        info!("restarting in place");
        // cleanup has already run and dropping the manager closed the
        // display, so re-executing our own argv is safe here
        let argv: Vec<CString> = args
            .iter()
            .map(|a| CString::new(a.as_str()).expect("argv strings have no interior nul"))
            .collect();
        nix::unistd::execv(&argv[0], &argv).expect("execv only returns on error");
    }

    Ok(())
}
