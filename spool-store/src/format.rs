//! On-disk layout of dataset files.
//!
//! A file is laid out as
//!
//! ```text
//! magic | header | chunk 0 | chunk 1 | ... | directory | directory len | end magic
//! ```
//!
//! The header fixes the array shapes and the chunk granularity. Each chunk is
//! two LZ4 blocks, the frame bytes and then the state snapshots of the same
//! samples. The directory locates every chunk and is written last, so its
//! presence marks a completely written file.
use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// First bytes of every dataset file.
pub const MAGIC: [u8; 4] = *b"SDSF";

/// Last bytes of a finalized dataset file.
pub(crate) const END_MAGIC: [u8; 4] = *b"SDSE";

/// Version of the on-disk layout.
pub const FORMAT_VERSION: u16 = 1;

/// Fixed shape of the dataset, stored right after the magic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Header {
    pub version: u16,
    pub total: u64,
    pub height: u32,
    pub width: u32,
    pub channels: u32,
    pub state_len: u32,
    pub chunk_len: u32,
}

impl Header {
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), StoreError> {
        w.write_all(&MAGIC)?;
        bincode::serialize_into(&mut *w, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, StoreError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(StoreError::BadMagic);
        }
        let header: Header = bincode::deserialize_from(&mut *r)?;
        if header.version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(header.version));
        }
        Ok(header)
    }

    /// Encoded size of the header in bytes, including the magic.
    pub fn encoded_len(&self) -> Result<u64, StoreError> {
        Ok(MAGIC.len() as u64 + bincode::serialized_size(self)?)
    }
}

/// Location of one chunk, recorded in the directory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChunkEntry {
    /// Absolute file offset of the chunk's first byte.
    pub offset: u64,

    /// Compressed length of the frame block.
    pub screens_len: u64,

    /// Compressed length of the snapshot block.
    pub states_len: u64,

    /// Samples in the chunk.
    pub samples: u32,

    /// XXH3 digest of the chunk's compressed bytes.
    pub digest: u64,
}
