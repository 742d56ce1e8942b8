use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Pre-encoded frame, shared by every recipient of one broadcast.
pub type Outbound = Utf8Bytes;

/// Live connections and the channel feeding each one's socket writer.
///
/// Nothing else is kept per connection: dropping an entry is the whole
/// disconnect cleanup.
#[derive(Default)]
pub struct ConnectionRegistry {
    peers: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Outbound>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of connections after insertion.
    pub async fn register(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Outbound>) -> usize {
        let mut peers = self.peers.write().await;
        peers.insert(id, tx);
        peers.len()
    }

    /// Returns the number of connections left.
    pub async fn unregister(&self, id: ConnectionId) -> usize {
        let mut peers = self.peers.write().await;
        peers.remove(&id);
        peers.len()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.peers.read().await.contains_key(&id)
    }

    /// Queues `payload` for every connection but `sender` and returns how
    /// many accepted it. Closed channels are pruned.
    pub async fn broadcast_except(&self, sender: ConnectionId, payload: Outbound) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();
        {
            let peers = self.peers.read().await;
            for (id, tx) in peers.iter() {
                if *id == sender {
                    continue;
                }
                if tx.send(payload.clone()).is_err() {
                    stale.push(*id);
                } else {
                    delivered += 1;
                }
            }
        }

        if !stale.is_empty() {
            let mut peers = self.peers.write().await;
            for id in stale {
                tracing::debug!(conn = %id, "pruning closed connection");
                peers.remove(&id);
            }
        }
        delivered
    }
}
