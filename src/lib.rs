//! Overlay Window - translucent ARGB overlay for X11
//!
//! Opens one depth-32 window, advertises `WM_DELETE_WINDOW` and stays up
//! until the window manager asks it to close.

pub mod config;
pub mod overlay;

pub use config::{Config, WindowConfig};
pub use overlay::error::OverlayError;
pub use overlay::{ClientState, OverlayClient};
