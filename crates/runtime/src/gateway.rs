//! The serve-mode session loop.
//!
//! Responsibilities:
//! - Bridge inbound envelopes to the target (spawned command or HTTP
//!   endpoint) and target output back to the mesh.
//! - Enforce the access allowlist and encryption policy on every inbound
//!   envelope.
//! - Announce the service when it is public.
//!
//! Does NOT handle:
//! - Configuration resolution; a `ServeConfig` arrives fully formed.

use tether_config::{EncryptionPolicy, ServeConfig, Target};

use crate::child::ChildService;
use crate::error::Result;
use crate::identity;
use crate::transport::{Envelope, RelayTransport, WsTransport};

/// A running (or about to run) serve session.
pub struct Gateway {
    config: ServeConfig,
}

/// Outcome of admission control for one inbound envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Accept,
    /// Sender is not on the allowlist.
    UnknownSender,
    /// Policy requires sealed payloads and this one is plaintext.
    NeedsEncryption,
    /// Policy forbids sealed payloads and this one is sealed.
    EncryptionDisabled,
}

impl Gateway {
    pub fn new(config: ServeConfig) -> Self {
        Self { config }
    }

    /// Connects to the configured relays and runs until the target or the
    /// mesh goes away.
    pub async fn run(self) -> Result<()> {
        let transport = WsTransport::connect(&self.config.relays).await?;
        self.run_with(transport).await
    }

    /// Runs the session over any transport. Split from `run` so tests can
    /// drive the loop without sockets.
    pub async fn run_with<T: RelayTransport>(self, mut transport: T) -> Result<()> {
        let identity = identity::public_key(&self.config.private_key)?;
        tracing::info!(identity, "gateway ready");

        if self.config.public {
            transport.publish(&self.announce(&identity)).await?;
        }

        match self.config.target.clone() {
            Target::Command { program, args } => {
                self.serve_command(&mut transport, &identity, &program, &args)
                    .await
            }
            Target::Url(url) => self.serve_url(&mut transport, &identity, url).await,
        }
    }

    fn announce(&self, identity: &str) -> Envelope {
        Envelope {
            from: identity.to_string(),
            to: None,
            payload: serde_json::json!({
                "type": "announce",
                "server": identity,
                "encryption": self.config.encryption.to_string(),
            })
            .to_string(),
            encrypted: false,
        }
    }

    /// Admission control; pure so policy edge cases are unit-testable.
    pub(crate) fn admits(&self, envelope: &Envelope) -> Admission {
        if !self.config.allow.is_empty() && !self.config.allow.contains(&envelope.from) {
            return Admission::UnknownSender;
        }
        match self.config.encryption {
            EncryptionPolicy::Required if !envelope.encrypted => Admission::NeedsEncryption,
            EncryptionPolicy::Disabled if envelope.encrypted => Admission::EncryptionDisabled,
            _ => Admission::Accept,
        }
    }

    /// True when `envelope` is addressed to this gateway (or broadcast).
    fn addressed_to(identity: &str, envelope: &Envelope) -> bool {
        envelope.to.as_deref().is_none_or(|to| to == identity)
    }

    async fn serve_command<T: RelayTransport>(
        &self,
        transport: &mut T,
        identity: &str,
        program: &str,
        args: &[String],
    ) -> Result<()> {
        let mut child = ChildService::spawn(program, args)?;
        let seal = self.config.encryption == EncryptionPolicy::Required;
        let mut last_peer: Option<String> = None;

        loop {
            tokio::select! {
                inbound = transport.next_envelope() => match inbound? {
                    None => {
                        tracing::info!("relay streams ended, shutting down");
                        return Ok(());
                    }
                    Some(envelope) => {
                        if !Self::addressed_to(identity, &envelope) {
                            continue;
                        }
                        match self.admits(&envelope) {
                            Admission::Accept => {
                                last_peer = Some(envelope.from.clone());
                                child.send_line(&envelope.payload).await?;
                            }
                            verdict => {
                                tracing::warn!(from = %envelope.from, ?verdict, "rejected envelope");
                            }
                        }
                    }
                },
                outbound = child.next_line() => match outbound? {
                    None => return child.finish().await,
                    Some(line) => {
                        transport.publish(&Envelope {
                            from: identity.to_string(),
                            to: last_peer.clone(),
                            payload: line,
                            encrypted: seal,
                        }).await?;
                    }
                },
            }
        }
    }

    async fn serve_url<T: RelayTransport>(
        &self,
        transport: &mut T,
        identity: &str,
        url: url::Url,
    ) -> Result<()> {
        let client = reqwest::Client::new();
        let seal = self.config.encryption == EncryptionPolicy::Required;

        while let Some(envelope) = transport.next_envelope().await? {
            if !Self::addressed_to(identity, &envelope) {
                continue;
            }
            match self.admits(&envelope) {
                Admission::Accept => {}
                verdict => {
                    tracing::warn!(from = %envelope.from, ?verdict, "rejected envelope");
                    continue;
                }
            }

            let reply = match client
                .post(url.clone())
                .body(envelope.payload)
                .send()
                .await
            {
                Ok(response) => response.text().await?,
                Err(e) => {
                    tracing::warn!(error = %e, "target request failed");
                    continue;
                }
            };

            transport
                .publish(&Envelope {
                    from: identity.to_string(),
                    to: Some(envelope.from),
                    payload: reply,
                    encrypted: seal,
                })
                .await?;
        }

        tracing::info!("relay streams ended, shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::collections::BTreeSet;

    fn config(allow: &[&str], encryption: EncryptionPolicy) -> ServeConfig {
        ServeConfig {
            private_key: SecretString::from("ab".repeat(32)),
            relays: vec![],
            target: Target::Command {
                program: "cat".into(),
                args: vec![],
            },
            public: false,
            allow: allow.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
            encryption,
            verbose: false,
        }
    }

    fn envelope(from: &str, encrypted: bool) -> Envelope {
        Envelope {
            from: from.into(),
            to: None,
            payload: "{}".into(),
            encrypted,
        }
    }

    #[test]
    fn test_empty_allowlist_admits_anyone() {
        let gateway = Gateway::new(config(&[], EncryptionPolicy::Optional));
        assert_eq!(gateway.admits(&envelope("stranger", false)), Admission::Accept);
    }

    #[test]
    fn test_allowlist_rejects_unlisted_senders() {
        let gateway = Gateway::new(config(&["friend"], EncryptionPolicy::Optional));
        assert_eq!(gateway.admits(&envelope("friend", false)), Admission::Accept);
        assert_eq!(
            gateway.admits(&envelope("stranger", false)),
            Admission::UnknownSender
        );
    }

    #[test]
    fn test_required_policy_rejects_plaintext() {
        let gateway = Gateway::new(config(&[], EncryptionPolicy::Required));
        assert_eq!(
            gateway.admits(&envelope("peer", false)),
            Admission::NeedsEncryption
        );
        assert_eq!(gateway.admits(&envelope("peer", true)), Admission::Accept);
    }

    #[test]
    fn test_disabled_policy_rejects_sealed() {
        let gateway = Gateway::new(config(&[], EncryptionPolicy::Disabled));
        assert_eq!(
            gateway.admits(&envelope("peer", true)),
            Admission::EncryptionDisabled
        );
        assert_eq!(gateway.admits(&envelope("peer", false)), Admission::Accept);
    }

    #[test]
    fn test_optional_policy_admits_both() {
        let gateway = Gateway::new(config(&[], EncryptionPolicy::Optional));
        assert_eq!(gateway.admits(&envelope("peer", true)), Admission::Accept);
        assert_eq!(gateway.admits(&envelope("peer", false)), Admission::Accept);
    }

    #[test]
    fn test_addressing_accepts_broadcast_and_own_key() {
        let own = "own-key";
        let broadcast = envelope("peer", false);
        assert!(Gateway::addressed_to(own, &broadcast));

        let mut direct = envelope("peer", false);
        direct.to = Some(own.to_string());
        assert!(Gateway::addressed_to(own, &direct));

        let mut other = envelope("peer", false);
        other.to = Some("someone-else".to_string());
        assert!(!Gateway::addressed_to(own, &other));
    }
}
