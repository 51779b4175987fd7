pub mod config;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod name;
pub mod oracle;
pub mod origin;
pub mod population;
pub mod reader;
pub mod store;
pub mod tee;
pub mod writer;

pub use engine::{VideoCache, VideoSource, VideoStream};
pub use error::CacheError;
pub use metadata::VideoMetadata;
pub use name::{CacheKey, VideoName};
pub use reader::CachedVideo;

/// Nominal size of a cached chunk (1 MiB). Only the final chunk of a video may be shorter.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Size of the fragments forwarded to the client while proxying the origin.
pub const DEFAULT_READ_BUFFER: usize = 64 * 1024;
