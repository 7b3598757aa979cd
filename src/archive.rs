//! High-level [`Archive`] API — the primary embedding surface.
//!
//! ```
//! use mixpak::{Archive, Entry};
//!
//! let mut ar = Archive::new();
//! ar.add(Entry::new("readme.txt", b"Hello, world!".to_vec()));
//! let bytes = ar.to_bytes()?;
//!
//! let back = Archive::from_bytes(&bytes, Default::default())?;
//! assert_eq!(back.get("README.TXT").unwrap().data(), b"Hello, world!");
//! # Ok::<(), mixpak::MixError>(())
//! ```

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::codec::{self, DecodeOptions};
use crate::crc;
use crate::error::MixError;

// ── Entry ─────────────────────────────────────────────────────────────────────

/// One named payload inside an archive.
///
/// Name and content are fixed at construction; everything positional
/// (offsets, lengths) belongs to the codec and never appears here.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    data: Vec<u8>,
    /// Checksum carried over verbatim by a lenient decode when the table
    /// value disagreed with the name digest.
    stored_crc: Option<u32>,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            stored_crc: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The entry's table checksum: the digest of the upper-cased name, or,
    /// after a lenient decode that found a mismatch, the value the source
    /// archive carried.  This is also the canonical sort key.
    pub fn name_crc(&self) -> u32 {
        self.stored_crc.unwrap_or_else(|| crc::name_key(&self.name))
    }

    /// Digest of the content bytes.  Not stored in the format; useful for
    /// comparing payloads across archives.
    pub fn data_crc(&self) -> u32 {
        crc::checksum(&self.data)
    }

    pub(crate) fn keep_stored_crc(&mut self, crc: u32) {
        self.stored_crc = Some(crc);
    }
}

// ── EntryInfo ─────────────────────────────────────────────────────────────────

/// Lightweight descriptor returned by [`Archive::list`].
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub name_crc: u32,
    pub data_crc: u32,
}

impl From<&Entry> for EntryInfo {
    fn from(e: &Entry) -> Self {
        EntryInfo {
            name: e.name().to_owned(),
            size: e.data().len() as u64,
            name_crc: e.name_crc(),
            data_crc: e.data_crc(),
        }
    }
}

// ── Archive ───────────────────────────────────────────────────────────────────

/// An insertion-ordered collection of entries.
///
/// The order seen through [`Archive::entries`] is the order entries were
/// added (or, after a decode, table order).  Serialization lays entries out
/// in canonical checksum order without touching this one.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an archive from a byte buffer.  See [`codec::decode`].
    pub fn from_bytes(data: &[u8], opts: DecodeOptions) -> Result<Self, MixError> {
        codec::decode(data, opts)
    }

    /// Encode this archive into a byte buffer.  See [`codec::encode`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, MixError> {
        codec::encode(self)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Look up an entry through the canonical key space, i.e.
    /// case-insensitively: `get("local.mix")` finds `"LOCAL.MIX"`.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        let key = crc::name_key(name);
        self.entries.iter().find(|e| crc::name_key(e.name()) == key)
    }

    /// Remove and return the first entry matching `name` in the canonical
    /// key space.
    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        let key = crc::name_key(name);
        let index = self
            .entries
            .iter()
            .position(|e| crc::name_key(e.name()) == key)?;
        Some(self.entries.remove(index))
    }

    pub fn list(&self) -> Vec<EntryInfo> {
        self.entries.iter().map(EntryInfo::from).collect()
    }

    // ── Filesystem glue ──────────────────────────────────────────────────────

    /// Read and decode an archive from a file.
    pub fn load<P: AsRef<Path>>(path: P, opts: DecodeOptions) -> Result<Self, MixError> {
        let data = fs::read(path)?;
        codec::decode(&data, opts)
    }

    /// Encode this archive and write it to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MixError> {
        let data = codec::encode(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Add one file as an entry named after its file-name component.
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MixError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name component", path.display()),
                )
            })?
            .to_string_lossy()
            .into_owned();
        let data = fs::read(path)?;
        self.add(Entry::new(name, data));
        Ok(())
    }

    /// Extract every entry into `dest`, creating it if necessary.
    ///
    /// Entry names are plain file names in this format; anything that would
    /// resolve outside `dest` (separators, `..`) is rejected rather than
    /// written.
    pub fn extract_all<P: AsRef<Path>>(&self, dest: P) -> Result<(), MixError> {
        let dest = dest.as_ref();
        if !dest.exists() {
            fs::create_dir_all(dest)?;
        }
        for entry in &self.entries {
            let name = entry.name();
            if name.is_empty() || name == ".." || name.contains(['/', '\\']) {
                return Err(MixError::InvalidEntry {
                    name: name.to_owned(),
                    reason: "name does not stay inside the extraction directory",
                });
            }
            fs::write(dest.join(name), entry.data())?;
        }
        Ok(())
    }
}
