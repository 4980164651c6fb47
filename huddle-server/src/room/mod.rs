mod room;
mod room_command;
mod room_handle;
mod room_manager;

pub use room::*;
pub use room_command::*;
pub use room_handle::*;
pub use room_manager::*;
