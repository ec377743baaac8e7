//! UI module for the Palletmap GUI
//!
//! # Panel Structure
//! - `toolbar` - Header, map operations (Open, Clear, Reload), Settings, Quit
//! - `floor_plan` - Canvas with the floor-plan image and pallet markers
//! - `properties_panel` - Editable attributes of the selected pallet
//! - `orders_panel` - Order queue with reordering buttons
//! - `io_panel` - Input/output indicator lamps
//! - `modal` - Notices and the quit confirmation
//! - `status_bar` - Bottom status line

pub mod toolbar;
pub mod floor_plan;
pub mod properties_panel;
pub mod orders_panel;
pub mod io_panel;
pub mod modal;
pub mod status_bar;
