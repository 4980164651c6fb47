mod auth;
mod config;
mod directory;
mod room;
mod router;
mod signaling;

pub use auth::*;
pub use config::*;
pub use directory::*;
pub use room::*;
pub use router::*;
pub use signaling::*;
