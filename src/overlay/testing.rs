//! In-memory display used by the unit tests
//!
//! Records every request and replays a scripted queue of events.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use x11rb::errors::{ConnectionError, ReplyError};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::protocol::xproto::{
    Atom, BackingStore, CONFIGURE_NOTIFY_EVENT, ClientMessageEvent, Colormap,
    ConfigureNotifyEvent, Depth, EXPOSE_EVENT, EventMask, ExposeEvent, MAP_NOTIFY_EVENT,
    MapNotifyEvent, Screen, VisualClass, Visualid, Visualtype, Window,
};
use x11rb::x11_utils::X11Error;

use crate::overlay::display::{CreateWindowRequest, DisplayConnection};
use crate::overlay::error::{OverlayError, Result};
use crate::overlay::geometry::{Geometry, Rgb16};

pub const ROOT: Window = 0x0000_0100;
pub const DEFAULT_COLORMAP: Colormap = 0x0000_0020;
pub const ARGB_VISUAL: Visualid = 0x0000_005a;

/// Build a screen advertising the given (depth, visual ids) pairs, in order.
pub fn screen_with_depths(depths: Vec<(u8, Vec<Visualid>)>) -> Screen {
    let allowed_depths = depths
        .into_iter()
        .map(|(depth, visuals)| Depth {
            depth,
            visuals: visuals
                .into_iter()
                .map(|visual_id| Visualtype {
                    visual_id,
                    class: VisualClass::TRUE_COLOR,
                    bits_per_rgb_value: 8,
                    colormap_entries: 256,
                    red_mask: 0x00ff_0000,
                    green_mask: 0x0000_ff00,
                    blue_mask: 0x0000_00ff,
                })
                .collect(),
        })
        .collect();

    Screen {
        root: ROOT,
        default_colormap: DEFAULT_COLORMAP,
        white_pixel: 0x00ff_ffff,
        black_pixel: 0,
        current_input_masks: EventMask::NO_EVENT,
        width_in_pixels: 1920,
        height_in_pixels: 1080,
        width_in_millimeters: 508,
        height_in_millimeters: 285,
        min_installed_maps: 1,
        max_installed_maps: 1,
        root_visual: 0x21,
        backing_stores: BackingStore::NOT_USEFUL,
        save_unders: false,
        root_depth: 24,
        allowed_depths,
    }
}

/// A request as the fake display saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    AllocColor { colormap: Colormap, color: Rgb16 },
    CreateColormap { colormap: Colormap, window: Window, visual: Visualid },
    CreateWindow(CreateWindowRequest),
    InternAtom(String),
    GetAtomName(Atom),
    ChangeProperty8 { window: Window, property: Atom, type_: Atom, data: Vec<u8> },
    ChangeProperty32 { window: Window, property: Atom, type_: Atom, data: Vec<u32> },
    ConfigureWindow { window: Window, geometry: Geometry },
    MapWindow(Window),
    UnmapWindow(Window),
    Flush,
}

#[derive(Default)]
struct State {
    requests: Vec<Request>,
    events: VecDeque<Event>,
    atoms: HashMap<String, Atom>,
    next_id: u32,
    events_delivered: usize,
    /// Request name the server rejects with BadMatch
    reject: Option<&'static str>,
}

pub struct FakeDisplay {
    screen: Screen,
    state: Mutex<State>,
}

impl FakeDisplay {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            state: Mutex::new(State {
                next_id: 0x0040_0001,
                ..State::default()
            }),
        }
    }

    /// Screen with a 24-bit root visual and one ARGB visual
    pub fn with_argb() -> Self {
        Self::new(screen_with_depths(vec![
            (24, vec![0x21, 0x22]),
            (32, vec![ARGB_VISUAL]),
            (8, vec![0x40]),
        ]))
    }

    /// Screen without any depth 32 visual
    pub fn without_argb() -> Self {
        Self::new(screen_with_depths(vec![(24, vec![0x21, 0x22]), (8, vec![0x40])]))
    }

    /// Make the server reject the next `request` ("CreateColormap" or "CreateWindow").
    pub fn reject(&self, request: &'static str) {
        self.state.lock().unwrap().reject = Some(request);
    }

    /// Record the request, then answer it with an error if it was marked for rejection.
    fn checked(&self, name: &'static str, request: Request) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        if state.reject != Some(name) {
            return Ok(());
        }
        state.reject = None;
        Err(OverlayError::Resource {
            request: name,
            source: ReplyError::X11Error(X11Error {
                error_kind: ErrorKind::Match,
                error_code: 8,
                sequence: 0,
                bad_value: 0,
                minor_opcode: 0,
                major_opcode: 0,
                extension_name: None,
                request_name: Some(name),
            }),
        })
    }

    pub fn push_event(&self, event: Event) {
        self.state.lock().unwrap().events.push_back(event);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn events_delivered(&self) -> usize {
        self.state.lock().unwrap().events_delivered
    }

    /// Atom the fake hands out for `name`, interning it if needed
    pub fn atom(&self, name: &str) -> Atom {
        let mut state = self.state.lock().unwrap();
        Self::intern_locked(&mut state, name)
    }

    fn intern_locked(state: &mut State, name: &str) -> Atom {
        let next = 0x100 + state.atoms.len() as Atom;
        *state.atoms.entry(name.to_string()).or_insert(next)
    }

    fn record(&self, request: Request) {
        self.state.lock().unwrap().requests.push(request);
    }
}

impl DisplayConnection for FakeDisplay {
    fn screen(&self) -> &Screen {
        &self.screen
    }

    fn generate_id(&self) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        Ok(id)
    }

    fn alloc_color(&self, colormap: Colormap, color: Rgb16) -> Result<u32> {
        self.record(Request::AllocColor { colormap, color });
        let channel = |value: u16| u32::from(value >> 8);
        Ok((channel(color.red) << 16) | (channel(color.green) << 8) | channel(color.blue))
    }

    fn create_colormap(&self, colormap: Colormap, window: Window, visual: Visualid) -> Result<()> {
        self.checked(
            "CreateColormap",
            Request::CreateColormap {
                colormap,
                window,
                visual,
            },
        )
    }

    fn create_window(&self, request: &CreateWindowRequest) -> Result<()> {
        self.checked("CreateWindow", Request::CreateWindow(request.clone()))
    }

    fn intern_atom(&self, name: &str) -> Result<Atom> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request::InternAtom(name.to_string()));
        Ok(Self::intern_locked(&mut state, name))
    }

    fn atom_name(&self, atom: Atom) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Request::GetAtomName(atom));
        let name = state
            .atoms
            .iter()
            .find(|&(_, &value)| value == atom)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| format!("ATOM_{}", atom));
        Ok(name)
    }

    fn change_property8(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u8],
    ) -> Result<()> {
        self.record(Request::ChangeProperty8 {
            window,
            property,
            type_,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn change_property32(
        &self,
        window: Window,
        property: Atom,
        type_: Atom,
        data: &[u32],
    ) -> Result<()> {
        self.record(Request::ChangeProperty32 {
            window,
            property,
            type_,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn configure_window(&self, window: Window, geometry: &Geometry) -> Result<()> {
        self.record(Request::ConfigureWindow {
            window,
            geometry: *geometry,
        });
        Ok(())
    }

    fn map_window(&self, window: Window) -> Result<()> {
        self.record(Request::MapWindow(window));
        Ok(())
    }

    fn unmap_window(&self, window: Window) -> Result<()> {
        self.record(Request::UnmapWindow(window));
        Ok(())
    }

    fn wait_for_event(&self) -> Result<Event> {
        let mut state = self.state.lock().unwrap();
        // An empty script stands in for a dropped connection instead of blocking forever
        let event = state
            .events
            .pop_front()
            .ok_or(OverlayError::Connection(ConnectionError::UnknownError))?;
        state.events_delivered += 1;
        Ok(event)
    }

    fn flush(&self) -> Result<()> {
        self.record(Request::Flush);
        Ok(())
    }
}

pub fn expose(window: Window) -> Event {
    Event::Expose(ExposeEvent {
        response_type: EXPOSE_EVENT,
        sequence: 0,
        window,
        x: 0,
        y: 0,
        width: 400,
        height: 200,
        count: 0,
    })
}

pub fn map_notify(window: Window) -> Event {
    Event::MapNotify(MapNotifyEvent {
        response_type: MAP_NOTIFY_EVENT,
        sequence: 0,
        event: window,
        window,
        override_redirect: false,
    })
}

pub fn configure_notify(window: Window) -> Event {
    Event::ConfigureNotify(ConfigureNotifyEvent {
        response_type: CONFIGURE_NOTIFY_EVENT,
        sequence: 0,
        event: window,
        window,
        above_sibling: 0,
        x: 100,
        y: 100,
        width: 400,
        height: 200,
        border_width: 20,
        override_redirect: false,
    })
}

/// ClientMessage of type `type_` whose first data word is `atom`
pub fn client_message(window: Window, type_: Atom, atom: Atom) -> Event {
    Event::ClientMessage(ClientMessageEvent::new(32, window, type_, [atom, 0, 0, 0, 0]))
}
