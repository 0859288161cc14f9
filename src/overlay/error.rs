//! Error types for the overlay client

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::xproto::Visualid;

use crate::overlay::ClientState;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// The display could not be reached or rejected the handshake
    #[error("failed to connect to display {target:?}")]
    Connect {
        target: String,
        #[source]
        source: ConnectError,
    },

    /// The transport broke after the handshake
    #[error("connection to the display server failed")]
    Connection(#[from] ConnectionError),

    /// The server answered a request with an error
    #[error("{request} request rejected by the server")]
    Resource {
        request: &'static str,
        #[source]
        source: ReplyError,
    },

    #[error("client-side resource ids exhausted")]
    IdsExhausted,

    /// No visual is advertised at the requested depth
    #[error("screen advertises no visual at depth {depth}")]
    VisualNotFound { depth: u8 },

    #[error("colormap already bound to visual 0x{bound:x}, requested 0x{requested:x}")]
    ColormapVisualMismatch { bound: Visualid, requested: Visualid },

    #[error("{operation} is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ClientState,
    },
}

impl OverlayError {
    /// Attach the failing request name to a checked reply error.
    pub fn resource(request: &'static str) -> impl FnOnce(ReplyError) -> Self {
        move |source| match source {
            ReplyError::ConnectionError(e) => Self::Connection(e),
            source => Self::Resource { request, source },
        }
    }
}

impl From<ReplyOrIdError> for OverlayError {
    fn from(e: ReplyOrIdError) -> Self {
        match e {
            ReplyOrIdError::IdsExhausted => Self::IdsExhausted,
            ReplyOrIdError::ConnectionError(e) => Self::Connection(e),
            ReplyOrIdError::X11Error(e) => Self::Resource {
                request: "GenerateId",
                source: ReplyError::X11Error(e),
            },
        }
    }
}

pub type Result<T, E = OverlayError> = std::result::Result<T, E>;
