mod local_media;
mod remote_stream;
mod static_tracks;

pub use local_media::*;
pub use remote_stream::*;
pub use static_tracks::*;
