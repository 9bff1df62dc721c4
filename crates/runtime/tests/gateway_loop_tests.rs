//! Session-loop tests over a scripted transport: no sockets, real child
//! processes.

#![cfg(unix)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;
use tether_config::{EncryptionPolicy, ServeConfig, Target};
use tether_runtime::{Envelope, Gateway, RelayTransport, public_key};

/// Delivers a fixed set of envelopes, then pends forever; records
/// everything published.
struct ScriptedTransport {
    inbound: Vec<Envelope>,
    published: Arc<Mutex<Vec<Envelope>>>,
}

impl ScriptedTransport {
    fn new(mut inbound: Vec<Envelope>) -> (Self, Arc<Mutex<Vec<Envelope>>>) {
        inbound.reverse();
        let published = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inbound,
                published: published.clone(),
            },
            published,
        )
    }
}

impl RelayTransport for ScriptedTransport {
    async fn publish(&mut self, envelope: &Envelope) -> tether_runtime::Result<()> {
        self.published.lock().unwrap().push(envelope.clone());
        Ok(())
    }

    async fn next_envelope(&mut self) -> tether_runtime::Result<Option<Envelope>> {
        match self.inbound.pop() {
            Some(envelope) => Ok(Some(envelope)),
            None => futures::future::pending().await,
        }
    }
}

fn serve_config(target: Target) -> ServeConfig {
    ServeConfig {
        private_key: SecretString::from("ab".repeat(32)),
        relays: vec![],
        target,
        public: false,
        allow: BTreeSet::new(),
        encryption: EncryptionPolicy::Optional,
        verbose: false,
    }
}

fn request(payload: &str) -> Envelope {
    Envelope {
        from: "peer-key".into(),
        to: None,
        payload: payload.into(),
        encrypted: false,
    }
}

#[tokio::test]
async fn test_command_target_replies_to_the_requesting_peer() {
    // `head -n 1` echoes one line and exits 0, ending the session.
    let config = serve_config(Target::Command {
        program: "head".into(),
        args: vec!["-n".into(), "1".into()],
    });
    let identity = public_key(&config.private_key).unwrap();
    let (transport, published) = ScriptedTransport::new(vec![request(r#"{"method":"ping"}"#)]);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        Gateway::new(config).run_with(transport),
    )
    .await
    .expect("session should end when the child exits");
    result.unwrap();

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, r#"{"method":"ping"}"#);
    assert_eq!(published[0].from, identity);
    assert_eq!(published[0].to.as_deref(), Some("peer-key"));
}

#[tokio::test]
async fn test_rejected_envelope_never_reaches_the_child() {
    // Allowlist excludes the sender; head would exit after one line, so
    // the session only ends this fast because stdin stays untouched and
    // the second, allowed envelope gets through.
    let mut config = serve_config(Target::Command {
        program: "head".into(),
        args: vec!["-n".into(), "1".into()],
    });
    config.allow = ["friend-key".to_string()].into_iter().collect();

    let blocked = request("blocked payload");
    let allowed = Envelope {
        from: "friend-key".into(),
        to: None,
        payload: "allowed payload".into(),
        encrypted: false,
    };
    let (transport, published) = ScriptedTransport::new(vec![blocked, allowed]);

    tokio::time::timeout(
        Duration::from_secs(10),
        Gateway::new(config).run_with(transport),
    )
    .await
    .expect("session should end when the child exits")
    .unwrap();

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, "allowed payload");
    assert_eq!(published[0].to.as_deref(), Some("friend-key"));
}

#[tokio::test]
async fn test_public_gateway_announces_itself_first() {
    let mut config = serve_config(Target::Command {
        program: "head".into(),
        args: vec!["-n".into(), "1".into()],
    });
    config.public = true;
    let (transport, published) = ScriptedTransport::new(vec![request("ping")]);

    tokio::time::timeout(
        Duration::from_secs(10),
        Gateway::new(config).run_with(transport),
    )
    .await
    .expect("session should end when the child exits")
    .unwrap();

    let published = published.lock().unwrap();
    assert_eq!(published.len(), 2);
    assert!(published[0].payload.contains("announce"));
    assert_eq!(published[0].to, None);
}

#[tokio::test]
async fn test_failing_child_surfaces_its_status() {
    let config = serve_config(Target::Command {
        program: "false".into(),
        args: vec![],
    });
    let (transport, _published) = ScriptedTransport::new(vec![]);

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        Gateway::new(config).run_with(transport),
    )
    .await
    .expect("session should end when the child exits");

    assert!(result.is_err());
}
