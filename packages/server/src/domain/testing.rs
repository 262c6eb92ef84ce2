//! Test doubles shared by domain and use-case tests.

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;

use super::{
    CohortId, ConnectionId, ConnectionIdFactory, Identity, MessagePushError, MessagePusher,
    OutboundEvent, PusherChannel, Role, UserId,
};

/// Pusher that records every delivery instead of writing to sockets.
///
/// Only registered connections receive events, like the real pusher.
#[derive(Default)]
pub struct RecordingPusher {
    registered: Mutex<HashSet<ConnectionId>>,
    deliveries: Mutex<Vec<(ConnectionId, OutboundEvent)>>,
}

impl RecordingPusher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a connection without a real channel.
    pub fn connect(&self, connection_id: &ConnectionId) {
        self.registered.lock().insert(connection_id.clone());
    }

    /// Events delivered to `connection_id`, in delivery order.
    pub fn events_for(&self, connection_id: &ConnectionId) -> Vec<OutboundEvent> {
        self.deliveries
            .lock()
            .iter()
            .filter(|(id, _)| id == connection_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Events named `name` delivered to anyone.
    pub fn deliveries_named(&self, name: &str) -> Vec<(ConnectionId, OutboundEvent)> {
        self.deliveries
            .lock()
            .iter()
            .filter(|(_, event)| event.name() == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.deliveries.lock().clear();
    }
}

impl MessagePusher for RecordingPusher {
    fn register_client(&self, connection_id: ConnectionId, _sender: PusherChannel) {
        self.connect(&connection_id);
    }

    fn unregister_client(&self, connection_id: &ConnectionId) -> bool {
        self.registered.lock().remove(connection_id)
    }

    fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
    ) -> Result<(), MessagePushError> {
        if !self.registered.lock().contains(connection_id) {
            return Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ));
        }
        self.deliveries
            .lock()
            .push((connection_id.clone(), event.clone()));
        Ok(())
    }

    fn broadcast(&self, targets: &[ConnectionId], event: &OutboundEvent) -> usize {
        let registered = self.registered.lock();
        let mut deliveries = self.deliveries.lock();
        let mut delivered = 0;
        for target in targets.iter().filter(|t| registered.contains(*t)) {
            deliveries.push((target.clone(), event.clone()));
            delivered += 1;
        }
        delivered
    }
}

pub fn identity(id: &str, role: Role, cohorts: &[&str]) -> Identity {
    Identity {
        id: UserId::new(id.to_string()).unwrap(),
        name: format!("{id}-name"),
        avatar: Some(format!("https://avatars.example/{id}.png")),
        role,
        cohorts: cohorts
            .iter()
            .map(|c| CohortId::new(c.to_string()).unwrap())
            .collect::<BTreeSet<_>>(),
    }
}

pub fn cohort(id: &str) -> CohortId {
    CohortId::new(id.to_string()).unwrap()
}

pub fn connection_id() -> ConnectionId {
    ConnectionIdFactory::generate()
}
