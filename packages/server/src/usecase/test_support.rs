//! Fixture wiring the in-memory collaborators together for use-case tests.

use std::sync::Arc;

use cohort_chat_shared::time::FixedClock;

use crate::{
    domain::{
        Connection, ConnectionIdFactory, Identity, MessageRepository, PresenceRegistry, Role,
        RoomMultiplexer, Timestamp,
        testing::{RecordingPusher, cohort, identity},
    },
    infrastructure::repository::InMemoryMessageRepository,
};

pub const NOW: i64 = 1_700_000_000_000;

pub struct Harness {
    pub pusher: Arc<RecordingPusher>,
    pub rooms: Arc<RoomMultiplexer>,
    pub presence: Arc<PresenceRegistry>,
    pub repository: Arc<InMemoryMessageRepository>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        let pusher = RecordingPusher::new();
        Self {
            rooms: Arc::new(RoomMultiplexer::new(pusher.clone())),
            presence: Arc::new(PresenceRegistry::new(pusher.clone())),
            pusher,
            repository: Arc::new(InMemoryMessageRepository::new()),
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    pub fn repository(&self) -> Arc<dyn MessageRepository> {
        self.repository.clone()
    }

    /// Register a live connection for `identity` without joining any room.
    pub fn connect(&self, identity: Identity) -> Connection {
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            Arc::new(identity),
            Timestamp::new(NOW),
        );
        self.pusher.connect(&connection.id);
        self.presence
            .register(connection.identity.clone(), connection.id.clone());
        connection
    }

    /// Register a connection and join it to `cohort_id`.
    pub fn connect_to(&self, id: &str, role: Role, cohort_id: &str) -> Connection {
        let connection = self.connect(identity(id, role, &[cohort_id]));
        self.rooms.join(&connection.id, &cohort(cohort_id));
        connection
    }
}
