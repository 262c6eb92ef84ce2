//! Room multiplexer: cohort-scoped broadcast groups.
//!
//! A room exists only while it has members. Membership is indexed in both
//! directions so that a closing connection can be removed from every room in
//! one step.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::Mutex;

use super::{CohortId, ConnectionId, MessagePusher, OutboundEvent};

#[derive(Default)]
struct Membership {
    members: HashMap<CohortId, HashSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<CohortId>>,
}

pub struct RoomMultiplexer {
    state: Mutex<Membership>,
    pusher: Arc<dyn MessagePusher>,
}

impl RoomMultiplexer {
    pub fn new(pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            state: Mutex::new(Membership::default()),
            pusher,
        }
    }

    /// Add the connection to the room. Returns `false` if it was already a member.
    pub fn join(&self, connection_id: &ConnectionId, cohort_id: &CohortId) -> bool {
        let mut state = self.state.lock();
        let inserted = state
            .members
            .entry(cohort_id.clone())
            .or_default()
            .insert(connection_id.clone());
        if inserted {
            state
                .joined
                .entry(connection_id.clone())
                .or_default()
                .insert(cohort_id.clone());
        }
        inserted
    }

    /// Remove the connection from the room. Returns `false` if it was not a member.
    pub fn leave(&self, connection_id: &ConnectionId, cohort_id: &CohortId) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let removed = match state.members.get_mut(cohort_id) {
            Some(members) => {
                let removed = members.remove(connection_id);
                if members.is_empty() {
                    state.members.remove(cohort_id);
                }
                removed
            }
            None => false,
        };
        if removed && let Some(rooms) = state.joined.get_mut(connection_id) {
            rooms.remove(cohort_id);
            if rooms.is_empty() {
                state.joined.remove(connection_id);
            }
        }
        removed
    }

    /// Remove the connection from every room it joined and return those rooms.
    pub fn leave_all(&self, connection_id: &ConnectionId) -> Vec<CohortId> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(rooms) = state.joined.remove(connection_id) else {
            return Vec::new();
        };
        for cohort_id in &rooms {
            if let Some(members) = state.members.get_mut(cohort_id) {
                members.remove(connection_id);
                if members.is_empty() {
                    state.members.remove(cohort_id);
                }
            }
        }
        let mut rooms: Vec<CohortId> = rooms.into_iter().collect();
        rooms.sort();
        rooms
    }

    /// Deliver `event` to every current member of the room, except `exclude`.
    ///
    /// Targets are taken from the membership at call time and delivery happens
    /// under the same lock, so a concurrent join or leave lands either wholly
    /// before or wholly after this broadcast. Returns the delivery count.
    pub fn broadcast(
        &self,
        cohort_id: &CohortId,
        event: &OutboundEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let state = self.state.lock();
        let Some(members) = state.members.get(cohort_id) else {
            return 0;
        };
        let targets: Vec<ConnectionId> = members
            .iter()
            .filter(|id| Some(*id) != exclude)
            .cloned()
            .collect();
        let delivered = self.pusher.broadcast(&targets, event);
        tracing::debug!(
            "Broadcasted {} to room '{}' ({} of {} targets)",
            event.name(),
            cohort_id,
            delivered,
            targets.len()
        );
        delivered
    }

    pub fn is_member(&self, connection_id: &ConnectionId, cohort_id: &CohortId) -> bool {
        self.state
            .lock()
            .members
            .get(cohort_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    /// Current members of the room.
    pub fn members(&self, cohort_id: &CohortId) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self
            .state
            .lock()
            .members
            .get(cohort_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Rooms the connection is currently joined to.
    #[cfg(test)]
    pub(crate) fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<CohortId> {
        let mut rooms: Vec<CohortId> = self
            .state
            .lock()
            .joined
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Number of rooms with at least one member.
    #[cfg(test)]
    pub(crate) fn room_count(&self) -> usize {
        self.state.lock().members.len()
    }
}
