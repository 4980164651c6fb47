mod peer_link;
mod peer_manager;
mod transport;

pub use peer_link::*;
pub use peer_manager::*;
pub use transport::*;
