//! Dictionary commands
//!
//! Each command maps onto one word store operation: ADD, DEFINE, REMOVE and
//! LIST, plus SAVE which flushes the store to its snapshot file.

pub mod add;
pub mod define;
pub mod list;
pub mod remove;
pub mod save;

pub use add::AddCmd;
pub use define::DefineCmd;
pub use list::ListCmd;
pub use remove::RemoveCmd;
pub use save::SaveCmd;
