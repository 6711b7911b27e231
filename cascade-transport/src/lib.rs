pub mod transport;
#[cfg(feature = "http")]
pub mod http;

pub use transport::{Transport, TransportSession};
#[cfg(feature = "http")]
pub use http::{HttpSession, HttpTransport, HttpTransportConfig};

pub use cascade_core::{TransportError, TransportResponse};
