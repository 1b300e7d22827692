//! Broadcast dispatch: fan a room event out to the room's members.

use roomcast_protocol::{RoomEvent, ServerFrame};

use crate::{ConnectionRegistry, RoomStore};

/// Delivers room events to every current member of a room.
///
/// A borrowed view over the store and registry, built per broadcast while
/// the caller holds the relay. Delivery is a non-blocking enqueue; members
/// whose connection is already gone are skipped.
pub struct BroadcastDispatcher<'a> {
    rooms: &'a RoomStore,
    connections: &'a ConnectionRegistry,
}

impl<'a> BroadcastDispatcher<'a> {
    pub fn new(rooms: &'a RoomStore, connections: &'a ConnectionRegistry) -> Self {
        Self { rooms, connections }
    }

    /// Sends `event` to every member of `room`. Returns how many members
    /// it was enqueued for.
    ///
    /// A missing room is a no-op; callers validate existence first.
    pub fn broadcast(&self, room: &str, event: RoomEvent) -> usize {
        let Some(target) = self.rooms.get_room(room) else {
            tracing::debug!(%room, event = event.name(), "broadcast to missing room dropped");
            return 0;
        };

        let name = event.name();
        let frame = ServerFrame::from(event);
        let delivered = target
            .members()
            .filter(|id| self.connections.send_to(*id, frame.clone()))
            .count();

        tracing::debug!(
            %room,
            event = name,
            members = target.member_count(),
            delivered,
            "broadcast"
        );
        delivered
    }
}
