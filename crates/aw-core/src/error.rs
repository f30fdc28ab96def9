use crate::actor::ActorId;
use crate::position::Position;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or mutating the world model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A race name could not be parsed, or the race table has no row for it.
    #[error("unknown race: \"{0}\"")]
    UnknownRace(String),

    /// A faction name could not be parsed.
    #[error("unknown faction: \"{0}\"")]
    UnknownFaction(String),

    /// An item id is not present in the catalog.
    #[error("unknown item: \"{0}\"")]
    UnknownItem(String),

    /// The requested actor id does not exist in the grid.
    #[error("actor not found: {0}")]
    ActorNotFound(ActorId),

    /// The actor has been retired and no longer occupies the grid.
    #[error("actor {0} has been retired")]
    ActorRetired(ActorId),

    /// A coordinate lies outside the grid.
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),

    /// A tile is already held by another actor.
    #[error("position {0} is already occupied")]
    Occupied(Position),

    /// A tile is blocked by collision or a tree trunk.
    #[error("position {0} is blocked")]
    Blocked(Position),

    /// The inventory has no free slot.
    #[error("inventory is full ({capacity} slots)")]
    InventoryFull {
        /// Number of slots in the inventory.
        capacity: usize,
    },

    /// An inventory slot index does not hold an item.
    #[error("no item in slot {0}")]
    InvalidSlot(usize),

    /// The item cannot be equipped or used the way it was asked to be.
    #[error("item \"{name}\" cannot be {verb}")]
    NotUsable {
        /// Display name of the item.
        name: String,
        /// What was attempted ("equipped", "used").
        verb: &'static str,
    },

    /// A map description is malformed.
    #[error("invalid map: {0}")]
    InvalidMap(String),
}
