//! Relay transport boundary.
//!
//! Responsibilities:
//! - Define the envelope exchanged with peers and the transport trait the
//!   session loops work against.
//! - Provide the WebSocket implementation: ordered connection attempts
//!   over the resolved relay list, broadcast publish, fan-in receive.
//!
//! Does NOT handle:
//! - Relay protocol semantics (subscriptions, persistence, routing) or
//!   payload sealing; envelopes are opaque to this layer.
//!
//! Invariants:
//! - Relays are attempted in list order; the session proceeds if at least
//!   one connection succeeds.
//! - Malformed inbound frames are dropped, never fatal.

use futures::stream::{SelectAll, SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::{Result, RuntimeError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One message exchanged over the mesh.
///
/// Payloads are opaque text. The `encrypted` bit records whether the
/// payload was sealed by the relay library; this layer only enforces
/// policy against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender public key.
    pub from: String,
    /// Recipient public key; `None` broadcasts.
    #[serde(default)]
    pub to: Option<String>,
    pub payload: String,
    #[serde(default)]
    pub encrypted: bool,
}

/// The session loops' view of the mesh.
#[allow(async_fn_in_trait)]
pub trait RelayTransport {
    /// Sends an envelope to every connected relay.
    async fn publish(&mut self, envelope: &Envelope) -> Result<()>;

    /// Next inbound envelope; `None` once every relay stream has ended.
    async fn next_envelope(&mut self) -> Result<Option<Envelope>>;
}

/// WebSocket transport over the configured relay list.
pub struct WsTransport {
    sinks: Vec<SplitSink<WsStream, Message>>,
    sources: SelectAll<SplitStream<WsStream>>,
}

impl WsTransport {
    /// Connects to the relays in order. Individual failures are logged
    /// and skipped; at least one connection must succeed.
    pub async fn connect(relays: &[String]) -> Result<Self> {
        let mut sinks = Vec::new();
        let mut sources = SelectAll::new();

        for relay in relays {
            match connect_async(relay.as_str()).await {
                Ok((stream, _)) => {
                    tracing::debug!(relay, "relay connected");
                    let (sink, source) = stream.split();
                    sinks.push(sink);
                    sources.push(source);
                }
                Err(e) => {
                    tracing::warn!(relay, error = %e, "relay connection failed");
                }
            }
        }

        if sinks.is_empty() {
            return Err(RuntimeError::NoRelayReachable);
        }
        Ok(Self { sinks, sources })
    }

    /// Number of live relay connections.
    pub fn connections(&self) -> usize {
        self.sinks.len()
    }
}

impl RelayTransport for WsTransport {
    async fn publish(&mut self, envelope: &Envelope) -> Result<()> {
        let frame = serde_json::to_string(envelope)?;
        let mut delivered = false;
        for sink in &mut self.sinks {
            match sink.send(Message::Text(frame.clone())).await {
                Ok(()) => delivered = true,
                Err(e) => tracing::debug!(error = %e, "publish to relay failed"),
            }
        }
        if delivered {
            Ok(())
        } else {
            Err(RuntimeError::AllRelaysLost)
        }
    }

    async fn next_envelope(&mut self) -> Result<Option<Envelope>> {
        while let Some(frame) = self.sources.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                    Ok(envelope) => return Ok(Some(envelope)),
                    Err(e) => tracing::debug!(error = %e, "dropping malformed frame"),
                },
                // Pings are answered by the library; nothing else carries
                // envelopes.
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "relay stream error"),
            }
        }
        Ok(None)
    }
}
