mod in_memory;
mod room_directory;

pub use in_memory::*;
pub use room_directory::*;
