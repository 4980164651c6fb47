
pub use mock_connector::*;
pub use mock_media::*;
