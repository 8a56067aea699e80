//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `init`: Initialize the data directory and database
//! - `add`: Add an item
//! - `list`: List items
//! - `status`: Show one item
//! - `set_quantity`: Overwrite an item's available quantity
//! - `reserve`: Reserve stock for a limited time
//! - `extend`: Lengthen an active reservation
//! - `cancel`: End a reservation early
//! - `expire`: Release reservations whose deadline has passed

pub mod add;
pub mod cancel;
pub mod expire;
pub mod extend;
pub mod init;
pub mod list;
pub mod reserve;
pub mod set_quantity;
pub mod status;

pub use add::AddCommand;
pub use cancel::CancelCommand;
pub use expire::ExpireCommand;
pub use extend::ExtendCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use reserve::ReserveCommand;
pub use set_quantity::SetQuantityCommand;
pub use status::StatusCommand;
