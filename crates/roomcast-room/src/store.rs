//! Room store: owns every `Room` and all changes to their membership.
//!
//! Not thread-safe by itself. The relay server keeps one store inside a
//! [`Relay`](crate::Relay) behind a single mutex, so every operation here
//! runs to completion without interleaving.

use std::collections::HashMap;

use roomcast_transport::ConnectionId;

use crate::{Room, RoomError, RoomSummary};

/// Maps room names to rooms.
///
/// Rooms live until the store is dropped; nothing deletes them.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<String, Room>,
    /// Room names in creation order, for stable listings.
    order: Vec<String>,
}

impl RoomStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new room with no members.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] if a room with this name exists. The
    /// existing room is left untouched, password included.
    pub fn create_room(
        &mut self,
        name: &str,
        password: Option<String>,
    ) -> Result<(), RoomError> {
        if self.rooms.contains_key(name) {
            return Err(RoomError::AlreadyExists {
                room: name.to_string(),
            });
        }
        let room = Room::new(name.to_string(), password);
        tracing::info!(
            room = %name,
            has_password = room.has_password(),
            "room created"
        );
        self.rooms.insert(name.to_string(), room);
        self.order.push(name.to_string());
        Ok(())
    }

    /// Looks up a room by name.
    pub fn get_room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Snapshot of every room, in creation order.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.order
            .iter()
            .filter_map(|name| self.rooms.get(name))
            .map(Room::summary)
            .collect()
    }

    /// Adds `id` to the room's members. Adding an existing member is a no-op.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn add_member(
        &mut self,
        name: &str,
        id: ConnectionId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(name)?;
        room.insert_member(id);
        Ok(())
    }

    /// Removes `id` from the room's members. Removing a non-member is a
    /// no-op success.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room does not exist.
    pub fn remove_member(
        &mut self,
        name: &str,
        id: ConnectionId,
    ) -> Result<(), RoomError> {
        let room = self.room_mut(name)?;
        room.remove_member(id);
        Ok(())
    }

    /// Names of every room `id` is a member of. O(rooms).
    pub fn rooms_containing(&self, id: ConnectionId) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| {
                self.rooms.get(*name).is_some_and(|room| room.is_member(id))
            })
            .cloned()
            .collect()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no room has been created.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn room_mut(&mut self, name: &str) -> Result<&mut Room, RoomError> {
        self.rooms.get_mut(name).ok_or_else(|| RoomError::NotFound {
            room: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    // =====================================================================
    // create_room()
    // =====================================================================

    #[test]
    fn test_create_room_starts_empty() {
        let mut store = RoomStore::new();
        store.create_room("lobby", None).unwrap();

        let room = store.get_room("lobby").expect("room should exist");
        assert_eq!(room.name(), "lobby");
        assert_eq!(room.member_count(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_room_twice_returns_already_exists() {
        let mut store = RoomStore::new();
        store.create_room("lobby", None).unwrap();

        let result = store.create_room("lobby", Some("other".into()));

        assert_eq!(
            result,
            Err(RoomError::AlreadyExists {
                room: "lobby".into()
            })
        );
        // The original room keeps its (absent) password.
        assert!(!store.get_room("lobby").unwrap().has_password());
    }

    #[test]
    fn test_create_room_names_are_case_sensitive() {
        let mut store = RoomStore::new();
        store.create_room("Lobby", None).unwrap();
        store.create_room("lobby", None).unwrap();
        assert_eq!(store.len(), 2);
    }

    // =====================================================================
    // get_room() / list_rooms()
    // =====================================================================

    #[test]
    fn test_get_room_unknown_returns_none() {
        let store = RoomStore::new();
        assert!(store.get_room("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_rooms_reports_password_flag() {
        let mut store = RoomStore::new();
        store.create_room("a", None).unwrap();
        store.create_room("b", Some("x".into())).unwrap();

        let listing = store.list_rooms();

        assert_eq!(
            listing,
            vec![
                RoomSummary {
                    name: "a".into(),
                    has_password: false
                },
                RoomSummary {
                    name: "b".into(),
                    has_password: true
                },
            ]
        );
    }

    // =====================================================================
    // add_member() / remove_member()
    // =====================================================================

    #[test]
    fn test_add_member_unknown_room_returns_not_found() {
        let mut store = RoomStore::new();
        let result = store.add_member("ghost", cid(1));
        assert!(matches!(result, Err(RoomError::NotFound { .. })));
    }

    #[test]
    fn test_add_member_twice_keeps_one_entry() {
        let mut store = RoomStore::new();
        store.create_room("a", None).unwrap();

        store.add_member("a", cid(1)).unwrap();
        store.add_member("a", cid(1)).unwrap();

        assert_eq!(store.get_room("a").unwrap().member_count(), 1);
    }

    #[test]
    fn test_remove_member_non_member_is_ok() {
        let mut store = RoomStore::new();
        store.create_room("a", None).unwrap();

        assert!(store.remove_member("a", cid(7)).is_ok());
    }

    #[test]
    fn test_remove_member_unknown_room_returns_not_found() {
        let mut store = RoomStore::new();
        let result = store.remove_member("ghost", cid(1));
        assert!(matches!(result, Err(RoomError::NotFound { .. })));
    }

    #[test]
    fn test_rooms_containing_scans_all_rooms() {
        let mut store = RoomStore::new();
        store.create_room("a", None).unwrap();
        store.create_room("b", None).unwrap();
        store.create_room("c", None).unwrap();
        store.add_member("a", cid(1)).unwrap();
        store.add_member("c", cid(1)).unwrap();
        store.add_member("b", cid(2)).unwrap();

        assert_eq!(store.rooms_containing(cid(1)), vec!["a", "c"]);
        assert!(store.rooms_containing(cid(3)).is_empty());
    }
}
