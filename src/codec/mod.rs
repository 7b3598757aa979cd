//! MIX1 wire codec — decode and encode.
//!
//! # On-disk layout
//!
//! All integers are little-endian.  The file is three regions addressed by
//! two absolute offsets patched into the fixed header:
//!
//! | Offset             | Field                                        | Size     |
//! |--------------------|----------------------------------------------|----------|
//! | 0                  | magic `"MIX1"`                               | 4        |
//! | 4                  | data region offset                           | 4        |
//! | 8                  | name region offset                           | 4        |
//! | 16                 | entry payloads, 8-byte aligned each          | variable |
//! | data region offset | entry count (redundant)                      | 4        |
//! | +4                 | header records × n: checksum, offset, length | 12 each  |
//! | name region offset | entry count                                  | 4        |
//! | +4                 | name records × n: length byte, name, NUL     | variable |
//!
//! Header records and name records are positionally aligned 1:1.  Payload
//! offsets are absolute, so the regions can be visited in any order; the
//! inter-payload padding is unspecified and never inspected on read.
//!
//! # Ordering
//!
//! Both tables are written in ascending name-checksum order, ties broken by
//! the caller's insertion order (the format has no secondary key, so two
//! names with colliding checksums keep their relative order).  [`encode`]
//! sorts a view — the archive handed in is never reordered.
//!
//! # Verification
//!
//! Every header checksum must equal the digest of the upper-cased name in
//! the same table position.  [`DecodeOptions::lenient`] downgrades a
//! mismatch from an error to an accepted entry that keeps the stored value.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::archive::{Archive, Entry};
use crate::crc;
use crate::error::MixError;

/// Fixed 4-byte signature at offset 0.
pub const MAGIC: &[u8; 4] = b"MIX1";
/// First payload byte.  Bytes 12..16 behind the patched offsets are unused
/// and left zero, as every historical writer does.
pub const DATA_START: u64 = 16;
/// Payload positions are padded forward to multiples of this.
pub const CONTENT_ALIGN: u64 = 8;
/// Longest storable name: the one-byte length prefix includes the
/// mandatory NUL terminator.
pub const MAX_NAME_LEN: usize = 254;

// ── Options ──────────────────────────────────────────────────────────────────

/// Knobs for [`decode`].  The default is full verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Accept header checksums that disagree with the recomputed name
    /// digest.  The stored value is kept on the entry as given instead of
    /// being recomputed.
    pub lenient: bool,
    /// Cross-check the redundant entry count at the start of the data
    /// region against the name-region count.
    pub strict: bool,
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self { lenient: true, strict: false }
    }

    pub fn strict() -> Self {
        Self { lenient: false, strict: true }
    }
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// One table row mid-decode.  Offsets and lengths only mean anything
/// relative to the buffer being decoded and are dropped once the entry's
/// content has been copied out.
struct EntrySlot {
    name: String,
    stored_crc: u32,
    offset: u32,
    length: u32,
}

/// Decode a complete MIX1 package from a byte buffer.
///
/// The returned archive lists entries in table order.  Fails with
/// [`MixError::Format`] when the buffer does not start with the MIX1
/// signature (whatever its length), [`MixError::Integrity`] when a
/// checksum, offset, or count disagrees with the buffer, and
/// [`MixError::Parse`] for anything else, wrapping the cause.
pub fn decode(data: &[u8], opts: DecodeOptions) -> Result<Archive, MixError> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Err(MixError::Format("missing MIX1 signature"));
    }

    let mut cur = Cursor::new(data);
    cur.set_position(MAGIC.len() as u64);
    let data_off = u64::from(read_u32(&mut cur, "the data region offset")?);
    let names_off = u64::from(read_u32(&mut cur, "the name region offset")?);

    // Name table first: it owns the authoritative entry count.
    seek(&mut cur, names_off, "name region")?;
    let count = read_u32(&mut cur, "the name table count")? as usize;
    if count as u64 > data.len() as u64 {
        return Err(MixError::Integrity(format!(
            "claimed entry count {count} cannot fit in a {}-byte package",
            data.len()
        )));
    }
    let mut names = Vec::with_capacity(count);
    for index in 0..count {
        let len = read_u8(&mut cur, "a name record length")? as usize;
        let mut raw = vec![0u8; len];
        cur.read_exact(&mut raw).map_err(|_| {
            MixError::Integrity(format!(
                "name record {index} extends past the end of the package"
            ))
        })?;
        if raw.last() == Some(&0) {
            raw.pop();
        }
        let name = String::from_utf8(raw).map_err(|e| MixError::Parse(Box::new(e)))?;
        names.push(name);
    }

    // Header table, positionally aligned with the names read above.
    seek(&mut cur, data_off, "data region")?;
    let redundant = read_u32(&mut cur, "the data region count")? as usize;
    if opts.strict && redundant != count {
        return Err(MixError::Integrity(format!(
            "entry count disagrees between tables: name region says {count}, data region says {redundant}"
        )));
    }
    let mut slots = Vec::with_capacity(count);
    for name in names {
        slots.push(EntrySlot {
            stored_crc: read_u32(&mut cur, "a header checksum")?,
            offset: read_u32(&mut cur, "a header offset")?,
            length: read_u32(&mut cur, "a header length")?,
            name,
        });
    }

    // Verify every row before touching any payload.
    if !opts.lenient {
        for slot in &slots {
            let computed = crc::name_key(&slot.name);
            if slot.stored_crc != computed {
                return Err(MixError::Integrity(format!(
                    "checksum mismatch for {:?}: table has {:08X}, name digests to {:08X}",
                    slot.name, slot.stored_crc, computed
                )));
            }
        }
    }

    // Payload fill.  Offsets are absolute, so rows are filled in table
    // order no matter where each payload sits in the file.
    let mut archive = Archive::new();
    for slot in slots {
        let start = u64::from(slot.offset);
        let end = start + u64::from(slot.length);
        if end > data.len() as u64 {
            return Err(MixError::Integrity(format!(
                "content of {:?} ({start}..{end}) extends past the end of the package",
                slot.name
            )));
        }
        let content = data[start as usize..end as usize].to_vec();
        let mut entry = Entry::new(slot.name, content);
        if opts.lenient && slot.stored_crc != entry.name_crc() {
            entry.keep_stored_crc(slot.stored_crc);
        }
        archive.add(entry);
    }
    Ok(archive)
}

fn read_u32(cur: &mut Cursor<&[u8]>, what: &str) -> Result<u32, MixError> {
    cur.read_u32::<LittleEndian>()
        .map_err(|_| MixError::Integrity(format!("package ends before {what}")))
}

fn read_u8(cur: &mut Cursor<&[u8]>, what: &str) -> Result<u8, MixError> {
    cur.read_u8()
        .map_err(|_| MixError::Integrity(format!("package ends before {what}")))
}

fn seek(cur: &mut Cursor<&[u8]>, to: u64, what: &str) -> Result<(), MixError> {
    if to > cur.get_ref().len() as u64 {
        return Err(MixError::Integrity(format!(
            "{what} offset {to} is past the end of the {}-byte package",
            cur.get_ref().len()
        )));
    }
    cur.set_position(to);
    Ok(())
}

// ── Encode ───────────────────────────────────────────────────────────────────

/// Encode an archive into a fresh MIX1 byte buffer.
///
/// Entries are laid out in canonical order (ascending name checksum,
/// insertion order on ties) without reordering `archive` itself.  The only
/// failure mode is a structurally invalid entry, reported as
/// [`MixError::InvalidEntry`] before any bytes are produced.
pub fn encode(archive: &Archive) -> Result<Vec<u8>, MixError> {
    // Precondition sweep, mirroring the layout arithmetic below so the
    // u32 offset space is known to suffice before anything is written.
    let tables: u64 = 8
        + archive
            .entries()
            .iter()
            .map(|e| 12 + e.name().len() as u64 + 2)
            .sum::<u64>();
    let mut end = DATA_START;
    for entry in archive.entries() {
        if entry.name().len() > MAX_NAME_LEN {
            return Err(invalid(entry, "name longer than 254 bytes"));
        }
        if entry.name().as_bytes().contains(&0) {
            return Err(invalid(entry, "name contains a NUL byte"));
        }
        end += entry.data().len() as u64;
        end += end.wrapping_neg() & (CONTENT_ALIGN - 1);
        if end + tables > u64::from(u32::MAX) {
            return Err(invalid(entry, "content pushes the package past the u32 offset limit"));
        }
    }

    let mut order: Vec<&Entry> = archive.entries().iter().collect();
    order.sort_by_key(|e| e.name_crc());

    let mut cur = Cursor::new(Vec::with_capacity((end + tables) as usize));
    cur.write_all(MAGIC)?;
    cur.write_u32::<LittleEndian>(0)?; // data region offset, patched below
    cur.write_u32::<LittleEndian>(0)?; // name region offset, patched below
    cur.write_u32::<LittleEndian>(0)?; // unused, keeps payloads starting at 16

    // Data region: raw payloads, each padded out to an 8-byte boundary.
    let mut headers = Vec::with_capacity(order.len());
    for entry in &order {
        let offset = cur.position() as u32;
        cur.write_all(entry.data())?;
        let pad = cur.position().wrapping_neg() & (CONTENT_ALIGN - 1);
        for _ in 0..pad {
            cur.write_u8(0)?;
        }
        headers.push((entry.name_crc(), offset, entry.data().len() as u32));
    }

    // Header table.
    let data_off = cur.position() as u32;
    cur.write_u32::<LittleEndian>(order.len() as u32)?;
    for &(checksum, offset, length) in &headers {
        cur.write_u32::<LittleEndian>(checksum)?;
        cur.write_u32::<LittleEndian>(offset)?;
        cur.write_u32::<LittleEndian>(length)?;
    }

    // Name table.
    let names_off = cur.position() as u32;
    cur.write_u32::<LittleEndian>(order.len() as u32)?;
    for entry in &order {
        cur.write_u8((entry.name().len() + 1) as u8)?;
        cur.write_all(entry.name().as_bytes())?;
        cur.write_u8(0)?;
    }

    cur.set_position(4);
    cur.write_u32::<LittleEndian>(data_off)?;
    cur.write_u32::<LittleEndian>(names_off)?;

    Ok(cur.into_inner())
}

fn invalid(entry: &Entry, reason: &'static str) -> MixError {
    MixError::InvalidEntry {
        name: entry.name().to_owned(),
        reason,
    }
}
