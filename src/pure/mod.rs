//! Pure data structures for the window manager state
pub mod client;
pub mod geometry;
pub mod monitor;

pub use client::{Client, SizeHints};
pub use geometry::{Point, Rect};
pub use monitor::{Monitor, TagLayout};
