//! The `Room` entity.

use std::collections::HashSet;
use std::fmt;

use roomcast_transport::ConnectionId;

/// A named broadcast group.
///
/// `name` and `password` are fixed at creation. Only [`RoomStore`]
/// mutates `members`.
///
/// [`RoomStore`]: crate::RoomStore
#[derive(Clone)]
pub struct Room {
    name: String,
    /// `None` when the room is open. An empty password is stored as `None`.
    password: Option<String>,
    members: HashSet<ConnectionId>,
}

impl Room {
    pub(crate) fn new(name: String, password: Option<String>) -> Self {
        Self {
            name,
            password: password.filter(|p| !p.is_empty()),
            members: HashSet::new(),
        }
    }

    /// The room's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether joining requires a password.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Checks a supplied password against the room's.
    ///
    /// Open rooms accept anything, including no password. Protected rooms
    /// require exact string equality.
    pub fn check_password(&self, supplied: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => supplied == Some(expected.as_str()),
        }
    }

    /// Whether `id` is currently a member.
    pub fn is_member(&self, id: ConnectionId) -> bool {
        self.members.contains(&id)
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Iterates current members in no particular order.
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    /// A listing row for this room.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            has_password: self.has_password(),
        }
    }

    /// Returns `false` if `id` was already a member.
    pub(crate) fn insert_member(&mut self, id: ConnectionId) -> bool {
        self.members.insert(id)
    }

    /// Returns `false` if `id` was not a member.
    pub(crate) fn remove_member(&mut self, id: ConnectionId) -> bool {
        self.members.remove(&id)
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("name", &self.name)
            .field("has_password", &self.has_password())
            .field("members", &self.members.len())
            .finish()
    }
}

/// A snapshot row returned by [`RoomStore::list_rooms`](crate::RoomStore::list_rooms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: String,
    pub has_password: bool,
}
