pub mod name;

pub use name::RawVideoName;
