pub mod test_client;

pub use mock_directory::*;
pub use mock_signaling::*;
pub use mock_verifier::*;
pub use test_client::*;
