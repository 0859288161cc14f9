//! Events Module
//!
//! The overlay only reacts to one event: the window manager's
//! `WM_DELETE_WINDOW` client message. Everything else is logged and dropped.

use tracing::{debug, info, warn};
use x11rb::protocol::Event;
use x11rb::protocol::xproto::ClientMessageEvent;

use crate::overlay::atoms::WmAtoms;
use crate::overlay::display::DisplayConnection;
use crate::overlay::error::Result;

/// What the close loop does with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The window manager asked us to close
    CloseRequested,
    /// Keep waiting
    Ignore,
}

/// Classify an event against the cached `WM_DELETE_WINDOW` atom.
pub fn classify(event: &Event, atoms: &WmAtoms) -> EventResult {
    match event {
        Event::ClientMessage(msg) if is_delete_window(msg, atoms) => EventResult::CloseRequested,
        _ => EventResult::Ignore,
    }
}

fn is_delete_window(msg: &ClientMessageEvent, atoms: &WmAtoms) -> bool {
    msg.format == 32 && msg.data.as_data32()[0] == atoms.wm_delete_window
}

/// Block until a close request arrives, returning how many events were consumed.
///
/// There is no timeout; the only ways out are the close request or a broken
/// connection.
pub fn wait_for_close<D: DisplayConnection + ?Sized>(
    display: &D,
    atoms: &WmAtoms,
) -> Result<usize> {
    let mut consumed = 0;
    loop {
        let event = display.wait_for_event()?;
        consumed += 1;

        match classify(&event, atoms) {
            EventResult::CloseRequested => {
                info!("Received WM_DELETE_WINDOW after {} events", consumed);
                return Ok(consumed);
            }
            EventResult::Ignore => log_ignored(display, &event),
        }
    }
}

fn log_ignored<D: DisplayConnection + ?Sized>(display: &D, event: &Event) {
    match event {
        Event::ClientMessage(msg) if msg.format == 32 => {
            let atom = msg.data.as_data32()[0];
            match display.atom_name(atom) {
                Ok(name) => debug!("Ignoring client message {} on window 0x{:x}", name, msg.window),
                Err(e) => warn!("Could not resolve atom {} from client message: {}", atom, e),
            }
        }
        Event::ClientMessage(msg) => {
            debug!(
                "Ignoring client message with format {} on window 0x{:x}",
                msg.format, msg.window
            )
        }
        Event::Expose(e) => debug!("Expose on window 0x{:x} ({}x{})", e.window, e.width, e.height),
        other => debug!("Ignoring event {:?}", other),
    }
}
