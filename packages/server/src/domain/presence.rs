//! Presence registry: who is online right now.
//!
//! Presence is keyed by identity and reference-counted by connection, so a
//! user with two open tabs stays online until the last one closes. The map is
//! owned by [`PresenceRegistry`] and only mutated through `register` and
//! `unregister`.
//!
//! `activeUsers` is sent to every connected client process-wide, not scoped to
//! a cohort. Narrowing it is a product decision; the global scope is pinned
//! by `test_presence_broadcast_is_global_across_cohorts`.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;

use super::{ConnectionId, Identity, MessagePusher, OutboundEvent, Profile, UserId};

struct PresenceEntry {
    identity: Arc<Identity>,
    connections: HashSet<ConnectionId>,
}

pub struct PresenceRegistry {
    entries: Mutex<HashMap<UserId, PresenceEntry>>,
    pusher: Arc<dyn MessagePusher>,
}

impl PresenceRegistry {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            pusher,
        }
    }

    /// Add `connection_id` under the identity's entry, creating it if absent,
    /// and send the new online list to every connection.
    ///
    /// Returns the identity's live connection count after registration.
    pub fn register(&self, identity: Arc<Identity>, connection_id: ConnectionId) -> usize {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(identity.id.clone())
            .or_insert_with(|| PresenceEntry {
                identity: identity.clone(),
                connections: HashSet::new(),
            });
        // newest snapshot wins for display fields
        entry.identity = identity;
        entry.connections.insert(connection_id);
        let count = entry.connections.len();

        Self::emit(&entries, self.pusher.as_ref());
        count
    }

    /// Remove `connection_id`. When it was the identity's last connection the
    /// entry is dropped and the new online list is sent to the remaining
    /// connections.
    ///
    /// Returns `true` if the identity went offline.
    pub fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(user_id) else {
            return false;
        };
        if !entry.connections.remove(connection_id) {
            return false;
        }
        if !entry.connections.is_empty() {
            return false;
        }
        entries.remove(user_id);

        Self::emit(&entries, self.pusher.as_ref());
        true
    }

    /// Distinct online identities, sorted by id.
    pub fn snapshot(&self) -> Vec<Profile> {
        Self::profiles(&self.entries.lock())
    }

    #[cfg(test)]
    pub(crate) fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.lock().contains_key(user_id)
    }

    #[cfg(test)]
    pub(crate) fn connection_count(&self, user_id: &UserId) -> usize {
        self.entries
            .lock()
            .get(user_id)
            .map_or(0, |entry| entry.connections.len())
    }

    /// Every live connection of every online identity.
    pub fn all_connections(&self) -> Vec<ConnectionId> {
        Self::connections(&self.entries.lock())
    }

    fn profiles(entries: &HashMap<UserId, PresenceEntry>) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = entries
            .values()
            .map(|entry| entry.identity.profile())
            .collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        profiles
    }

    fn connections(entries: &HashMap<UserId, PresenceEntry>) -> Vec<ConnectionId> {
        entries
            .values()
            .flat_map(|entry| entry.connections.iter().cloned())
            .collect()
    }

    // Called with the map locked so that consecutive presence events reach
    // clients in the same order the map changed.
    fn emit(entries: &HashMap<UserId, PresenceEntry>, pusher: &dyn MessagePusher) {
        let event = OutboundEvent::ActiveUsers(Self::profiles(entries));
        let targets = Self::connections(entries);
        let delivered = pusher.broadcast(&targets, &event);
        tracing::debug!(
            "Broadcasted activeUsers ({} online) to {} connections",
            entries.len(),
            delivered
        );
    }
}
