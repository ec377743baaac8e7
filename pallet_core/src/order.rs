//! Transport orders and the list-reordering rule.

use serde::{Deserialize, Serialize};

/// A transport request from a pallet's position to a destination slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Pallet position at the time the order was created
    pub origin: i64,
    /// Destination slot, always within the sequencer's domain
    pub destination: i64,
    pub pallet_id: Option<i64>,
}

/// Direction for moving an order in the displayed queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Sort orders the way the queue is displayed: by destination, ties by id.
pub fn sort_for_display(orders: &mut [Order]) {
    orders.sort_by_key(|o| (o.destination, o.id));
}

/// Id of the order that `id` swaps with when moved in `direction`.
///
/// `orders` must already be in display order. Returns `None` when `id` is
/// unknown or already at that end of the list.
pub fn neighbour(orders: &[Order], id: i64, direction: MoveDirection) -> Option<i64> {
    let index = orders.iter().position(|o| o.id == id)?;
    let target = match direction {
        MoveDirection::Up => index.checked_sub(1)?,
        MoveDirection::Down => index + 1,
    };
    orders.get(target).map(|o| o.id)
}
