//! # pallet_core - Warehouse Pallet Map Engine
//!
//! `pallet_core` holds everything of the pallet map that does not need a
//! window: the data model, typed property coercion, the three SQLite stores
//! and the cyclic destination sequencer. The GUI and the CLI are thin layers
//! over this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use pallet_core::pallet::{NewPallet, PalletField};
//! use pallet_core::store::{OrderStore, PalletStore};
//!
//! let pallets = PalletStore::in_memory()?;
//! let pallet = pallets.insert(&NewPallet { position: 4, ..NewPallet::default() })?;
//!
//! // Edit a property the way the properties table does
//! let pallet = pallets.edit(pallet.id, PalletField::Priority, "3")?;
//! assert_eq!(pallet.priority, 3);
//!
//! // Attach an order; destinations cycle through 1..=11
//! let mut orders = OrderStore::in_memory(11)?;
//! let order = orders.insert(pallet.position, Some(pallet.id))?;
//! assert_eq!(order.destination, 1);
//! # Ok::<(), pallet_core::errors::StoreError>(())
//! ```
//!
//! ## Modules
//!
//! - [`pallet`] - Pallet model and property coercion
//! - [`order`] - Orders and queue reordering
//! - [`sequencer`] - Round-robin destination counter
//! - [`io_state`] - Input/output bitmasks
//! - [`store`] - SQLite-backed stores
//! - [`config`] - Application settings
//! - [`errors`] - Structured error types

pub mod config;
pub mod errors;
pub mod io_state;
pub mod order;
pub mod pallet;
pub mod sequencer;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use config::AppConfig;
pub use errors::{StoreError, StoreResult};
pub use io_state::{IoReading, IoState};
pub use order::{MoveDirection, Order};
pub use pallet::{FieldValue, NewPallet, Pallet, PalletField};
pub use sequencer::DestinationSequencer;
pub use store::Stores;
