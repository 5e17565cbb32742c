//! Host learning table (forwarding database).
//!
//! Maps observed source addresses to their attachment point. Learning is
//! passive and unconditional: an address is trusted the moment it appears as
//! a packet source, and the most recent observation always wins. There is no
//! authentication of claimed addresses; a host seen at two switches simply
//! flips to whichever was observed last.

mod table;
mod types;

pub use table::FdbTable;
pub use types::{Attachment, FdbStats, Learn};
