use std::collections::{HashMap, HashSet};
use std::fmt;

use uuid::Uuid;

/// Identity of one live socket, minted at connect time and never reused
/// within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Bidirectional connection ↔ room membership map.
///
/// Invariant: a connection's joined set and a room's member set always agree,
/// and a room with no members is dropped from the map entirely. Unknown room
/// or connection ids are treated as empty, never as errors.
#[derive(Debug, Default)]
pub struct Registry {
    members: HashMap<String, HashSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: joining a room twice is a no-op.
    pub fn join(&mut self, conn: ConnectionId, room: &str) {
        self.members.entry(room.to_owned()).or_default().insert(conn);
        self.joined.entry(conn).or_default().insert(room.to_owned());
    }

    /// Idempotent: leaving a room never joined is a no-op.
    pub fn leave(&mut self, conn: ConnectionId, room: &str) {
        if let Some(set) = self.members.get_mut(room) {
            set.remove(&conn);
            if set.is_empty() {
                self.members.remove(room);
            }
        }
        if let Some(set) = self.joined.get_mut(&conn) {
            set.remove(room);
            if set.is_empty() {
                self.joined.remove(&conn);
            }
        }
    }

    pub fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.members.get(room).cloned().unwrap_or_default()
    }

    /// Drops the connection from every room it had joined. Safe to call for
    /// a connection with no memberships.
    pub fn remove_connection(&mut self, conn: ConnectionId) {
        let Some(rooms) = self.joined.remove(&conn) else {
            return;
        };
        for room in rooms {
            if let Some(set) = self.members.get_mut(&room) {
                set.remove(&conn);
                if set.is_empty() {
                    self.members.remove(&room);
                }
            }
        }
    }
}
