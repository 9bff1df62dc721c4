//! The use-mode session loop.
//!
//! Bridges local stdin/stdout to one remote server over the mesh: every
//! local line becomes an envelope addressed to the server, and every
//! envelope from the server is printed. Output from other senders is
//! dropped.

use tokio::io::{AsyncBufReadExt, BufReader};

use tether_config::{EncryptionPolicy, UseConfig};

use crate::error::Result;
use crate::identity;
use crate::transport::{Envelope, RelayTransport, WsTransport};

/// A running (or about to run) use session.
pub struct Proxy {
    config: UseConfig,
}

impl Proxy {
    pub fn new(config: UseConfig) -> Self {
        Self { config }
    }

    /// Connects to the configured relays and runs until stdin closes or
    /// the mesh goes away.
    pub async fn run(self) -> Result<()> {
        let transport = WsTransport::connect(&self.config.relays).await?;
        self.run_with(transport).await
    }

    /// Runs the session over any transport. Split from `run` so tests can
    /// drive the loop without sockets.
    pub async fn run_with<T: RelayTransport>(self, mut transport: T) -> Result<()> {
        let identity = identity::public_key(&self.config.private_key)?;
        let seal = self.config.encryption == EncryptionPolicy::Required;
        tracing::info!(identity, server = %self.config.server, "attached");

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = stdin.next_line() => match line? {
                    None => {
                        tracing::debug!("stdin closed, detaching");
                        return Ok(());
                    }
                    Some(text) => {
                        transport.publish(&Envelope {
                            from: identity.clone(),
                            to: Some(self.config.server.clone()),
                            payload: text,
                            encrypted: seal,
                        }).await?;
                    }
                },
                inbound = transport.next_envelope() => match inbound? {
                    None => {
                        tracing::info!("relay streams ended, detaching");
                        return Ok(());
                    }
                    Some(envelope) => {
                        if envelope.from != self.config.server {
                            continue;
                        }
                        if let Some(to) = &envelope.to
                            && to != &identity
                        {
                            continue;
                        }
                        println!("{}", envelope.payload);
                    }
                },
            }
        }
    }
}
