mod blob;
mod checksum;
mod date;
mod id;
mod timestamp;

pub use blob::Blob;
pub use checksum::Checksum;
pub use date::Date;
pub use id::Id;
pub use timestamp::{Timestamp, TimestampParseError};
