//! Runtime for tether's serve and use modes.
//!
//! This crate consumes a fully-resolved configuration and runs the
//! long-lived session: relay connections, the gateway loop bridging a
//! child process or HTTP endpoint to the mesh, and the proxy loop
//! bridging local stdio to a remote server. It never parses flags or
//! reads configuration files.

mod child;
mod error;
mod gateway;
mod identity;
mod proxy;
mod transport;

pub use child::ChildService;
pub use error::{Result, RuntimeError};
pub use gateway::Gateway;
pub use identity::public_key;
pub use proxy::Proxy;
pub use transport::{Envelope, RelayTransport, WsTransport};
