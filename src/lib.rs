pub mod archive;
pub mod codec;
pub mod crc;
pub mod error;

pub use archive::{Archive, Entry, EntryInfo};
pub use codec::{decode, encode, DecodeOptions};
pub use error::MixError;
