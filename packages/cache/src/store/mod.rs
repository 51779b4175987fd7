mod error;
mod traits;

pub mod memory;
pub mod redis;

pub use error::StoreError;
pub use traits::ChunkStore;
