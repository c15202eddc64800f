//! Dataset reading.
use crate::{
    format::{ChunkEntry, Header, END_MAGIC},
    StoreError,
};
use lz4_flex::decompress_size_prepended;
use ndarray::{Array2, Array4};
use spool_core::{FrameShape, STATE_LEN};
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use xxhash_rust::xxh3::Xxh3;

/// Reads a finalized dataset file.
///
/// The directory is loaded once at open and chunks are decompressed on
/// demand. The most recently used chunk is kept, so a sequential scan
/// decompresses each chunk exactly once.
pub struct DatasetReader {
    file: BufReader<File>,
    header: Header,
    frame_len: usize,
    entries: Vec<ChunkEntry>,
    cache_index: Option<usize>,
    cache_screens: Vec<u8>,
    cache_states: Vec<u8>,
}

impl DatasetReader {
    /// Opens a dataset file, validating its header and chunk directory.
    ///
    /// A file whose writing run was aborted has no directory and is rejected
    /// with [`StoreError::Truncated`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let end = file.metadata()?.len();
        let mut file = BufReader::new(file);
        let header = Header::read_from(&mut file)?;
        // Widened so a hostile header cannot overflow the pixel count.
        let frame_len = (header.height as u64 * header.width as u64)
            .checked_mul(header.channels as u64)
            .filter(|&n| n != 0 && n <= u32::MAX as u64)
            .ok_or(StoreError::BadHeader)? as usize;
        let data_start = header.encoded_len()?;
        if end < data_start + 12 {
            return Err(StoreError::Truncated);
        }

        file.seek(SeekFrom::End(-12))?;
        let mut tail = [0u8; 12];
        file.read_exact(&mut tail)?;
        if tail[8..] != END_MAGIC {
            return Err(StoreError::Truncated);
        }
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&tail[..8]);
        let directory_len = u64::from_le_bytes(len_bytes);

        let directory_start = directory_len
            .checked_add(12)
            .and_then(|footer| end.checked_sub(footer))
            .ok_or(StoreError::Truncated)?;
        if directory_start < data_start {
            return Err(StoreError::Truncated);
        }
        file.seek(SeekFrom::Start(directory_start))?;
        let mut directory = vec![0; directory_len as usize];
        file.read_exact(&mut directory)?;
        let entries: Vec<ChunkEntry> = bincode::deserialize(&directory)?;

        // Chunks are uniform except for a shorter last one and must lie
        // between the header and the directory; anything else breaks offset
        // arithmetic.
        let mut counted = 0u64;
        for (i, entry) in entries.iter().enumerate() {
            let last = i + 1 == entries.len();
            if entry.samples == 0
                || entry.samples as u64 > header.chunk_len as u64
                || (!last && entry.samples != header.chunk_len)
            {
                return Err(StoreError::BadDirectory);
            }
            let span = entry
                .screens_len
                .checked_add(entry.states_len)
                .and_then(|n| entry.offset.checked_add(n))
                .ok_or(StoreError::BadDirectory)?;
            if entry.offset < data_start || span > directory_start {
                return Err(StoreError::BadDirectory);
            }
            counted += entry.samples as u64;
        }
        if counted != header.total {
            return Err(StoreError::BadDirectory);
        }

        Ok(Self {
            file,
            header,
            frame_len,
            entries,
            cache_index: None,
            cache_screens: Vec::new(),
            cache_states: Vec::new(),
        })
    }

    /// Number of samples in the dataset.
    pub fn len(&self) -> usize {
        self.header.total as usize
    }

    /// True if the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.header.total == 0
    }

    /// Dimensions of one frame.
    pub fn frame_shape(&self) -> FrameShape {
        FrameShape::new(self.header.height as usize, self.header.width as usize)
    }

    /// Length in bytes of one state snapshot.
    pub fn state_len(&self) -> usize {
        self.header.state_len as usize
    }

    /// Samples per chunk.
    pub fn chunk_len(&self) -> usize {
        self.header.chunk_len as usize
    }

    /// Number of chunks.
    pub fn chunks(&self) -> usize {
        self.entries.len()
    }

    fn ensure_chunk(&mut self, index: usize) -> Result<(), StoreError> {
        if self.cache_index == Some(index) {
            return Ok(());
        }
        let ChunkEntry {
            offset,
            screens_len,
            states_len,
            samples,
            digest,
        } = self.entries[index];

        self.file.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0; (screens_len + states_len) as usize];
        self.file.read_exact(&mut compressed)?;
        let mut hasher = Xxh3::new();
        hasher.update(&compressed);
        if hasher.digest() != digest {
            return Err(StoreError::ChunkCorrupt(index));
        }

        let screens = decompress_size_prepended(&compressed[..screens_len as usize])?;
        let states = decompress_size_prepended(&compressed[screens_len as usize..])?;
        let samples = samples as usize;
        if screens.len() != samples * self.frame_len || states.len() != samples * STATE_LEN {
            return Err(StoreError::ChunkSizeMismatch(index));
        }
        self.cache_screens = screens;
        self.cache_states = states;
        self.cache_index = Some(index);
        Ok(())
    }

    /// Reads the raw bytes of samples `[start, start + count)` of both
    /// arrays.
    pub fn read_range(&mut self, start: usize, count: usize) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
        let total = self.len();
        let end = start
            .checked_add(count)
            .filter(|&end| end <= total)
            .ok_or(StoreError::RangeOutOfBounds {
                start,
                count,
                total,
            })?;

        let (frame_len, chunk_len) = (self.frame_len, self.chunk_len());
        let mut screens = Vec::with_capacity(count * frame_len);
        let mut states = Vec::with_capacity(count * STATE_LEN);
        let mut pos = start;
        while pos < end {
            let index = pos / chunk_len;
            let within = pos - index * chunk_len;
            let take = (end - pos).min(chunk_len - within);
            self.ensure_chunk(index)?;
            screens.extend_from_slice(
                &self.cache_screens[within * frame_len..(within + take) * frame_len],
            );
            states.extend_from_slice(&self.cache_states[within * STATE_LEN..(within + take) * STATE_LEN]);
            pos += take;
        }
        Ok((screens, states))
    }

    /// Reads frames `[start, start + count)` as an array of shape
    /// `(count, height, width, 1)`.
    pub fn screens(&mut self, start: usize, count: usize) -> Result<Array4<u8>, StoreError> {
        let shape = self.frame_shape();
        let (screens, _) = self.read_range(start, count)?;
        Ok(Array4::from_shape_vec(
            (count, shape.height, shape.width, 1),
            screens,
        )?)
    }

    /// Reads state snapshots `[start, start + count)` as an array of shape
    /// `(count, 128)`.
    pub fn states(&mut self, start: usize, count: usize) -> Result<Array2<u8>, StoreError> {
        let (_, states) = self.read_range(start, count)?;
        Ok(Array2::from_shape_vec((count, STATE_LEN), states)?)
    }
}
