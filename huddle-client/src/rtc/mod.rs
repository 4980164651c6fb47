mod rtc_connector;
mod rtc_transport;

pub use rtc_connector::*;
pub use rtc_transport::*;
