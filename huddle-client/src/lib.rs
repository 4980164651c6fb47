mod call;
mod config;
mod error;
mod media;
mod peer;
mod rtc;
mod signaling;

pub use call::*;
pub use config::*;
pub use error::*;
pub use media::*;
pub use peer::*;
pub use rtc::*;
pub use signaling::*;
