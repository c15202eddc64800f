//! Dataset writing.
use crate::{
    format::{ChunkEntry, Header, END_MAGIC},
    StoreError, FORMAT_VERSION,
};
use log::debug;
use lz4_flex::compress_prepend_size;
use spool_core::{FrameShape, SampleSink, STATE_LEN};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use xxhash_rust::xxh3::Xxh3;

/// Writes a dataset file of declared length, range by range.
///
/// Constructing the writer is the declaration: it fixes the total length and
/// the sample shapes, and writes the file header. Ranges must arrive
/// strictly in order, each continuing where the previous one ended; the
/// writer re-chunks them at its own granularity, which is independent of the
/// caller's flush sizes. [`close`](Self::close) writes the chunk directory
/// and refuses to finalize a file holding fewer samples than declared.
///
/// Dropping the writer without closing leaves a file without a directory,
/// which [`DatasetReader`](crate::DatasetReader) rejects as truncated.
pub struct DatasetWriter {
    file: BufWriter<File>,
    total: usize,
    frame_len: usize,
    chunk_len: usize,
    written: usize,
    offset: u64,
    pending_screens: Vec<u8>,
    pending_states: Vec<u8>,
    entries: Vec<ChunkEntry>,
}

impl DatasetWriter {
    /// Creates a dataset file holding `total` samples of the given frame
    /// shape, stored in chunks of `chunk_len` samples.
    pub fn create(
        path: impl AsRef<Path>,
        total: usize,
        shape: FrameShape,
        chunk_len: usize,
    ) -> Result<Self, StoreError> {
        if chunk_len == 0 {
            return Err(StoreError::ZeroChunkLen);
        }
        let frame_len = shape.pixels();
        if frame_len == 0 {
            return Err(StoreError::EmptyFrameShape);
        }
        let header = Header {
            version: FORMAT_VERSION,
            total: total as u64,
            height: shape.height as u32,
            width: shape.width as u32,
            channels: 1,
            state_len: STATE_LEN as u32,
            chunk_len: chunk_len as u32,
        };
        let mut file = BufWriter::new(File::create(path)?);
        header.write_to(&mut file)?;
        let offset = header.encoded_len()?;
        Ok(Self {
            file,
            total,
            frame_len,
            chunk_len,
            written: 0,
            offset,
            pending_screens: Vec::with_capacity(chunk_len * frame_len),
            pending_states: Vec::with_capacity(chunk_len * STATE_LEN),
            entries: Vec::new(),
        })
    }

    /// Samples accepted so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Declared number of samples.
    pub fn total(&self) -> usize {
        self.total
    }

    fn pending_samples(&self) -> usize {
        self.pending_states.len() / STATE_LEN
    }

    fn flush_chunk(&mut self) -> Result<(), StoreError> {
        let samples = self.pending_samples();
        if samples == 0 {
            return Ok(());
        }
        let screens = compress_prepend_size(&self.pending_screens);
        let states = compress_prepend_size(&self.pending_states);
        let mut hasher = Xxh3::new();
        hasher.update(&screens);
        hasher.update(&states);
        self.file.write_all(&screens)?;
        self.file.write_all(&states)?;
        self.entries.push(ChunkEntry {
            offset: self.offset,
            screens_len: screens.len() as u64,
            states_len: states.len() as u64,
            samples: samples as u32,
            digest: hasher.digest(),
        });
        self.offset += (screens.len() + states.len()) as u64;
        debug!(
            "wrote chunk {} of {} samples",
            self.entries.len() - 1,
            samples
        );
        self.pending_screens.clear();
        self.pending_states.clear();
        Ok(())
    }

    /// Appends one contiguous block of samples.
    ///
    /// `start` must equal the number of samples already written: the store
    /// is append-only and ranges cannot arrive out of order or twice.
    pub fn write_range(
        &mut self,
        start: usize,
        screens: &[u8],
        states: &[u8],
    ) -> Result<(), StoreError> {
        let n_screens = screens.len() / self.frame_len;
        let n_states = states.len() / STATE_LEN;
        if screens.len() % self.frame_len != 0
            || states.len() % STATE_LEN != 0
            || n_screens != n_states
        {
            return Err(StoreError::Misaligned {
                screens: n_screens,
                states: n_states,
            });
        }
        if start != self.written {
            return Err(StoreError::OutOfOrder {
                expected: self.written,
                got: start,
            });
        }
        if start + n_screens > self.total {
            return Err(StoreError::OutOfBounds {
                start,
                count: n_screens,
                total: self.total,
            });
        }

        let mut done = 0;
        while done < n_screens {
            let room = self.chunk_len - self.pending_samples();
            let take = room.min(n_screens - done);
            self.pending_screens
                .extend_from_slice(&screens[done * self.frame_len..(done + take) * self.frame_len]);
            self.pending_states
                .extend_from_slice(&states[done * STATE_LEN..(done + take) * STATE_LEN]);
            done += take;
            self.written += take;
            if self.pending_samples() == self.chunk_len {
                self.flush_chunk()?;
            }
        }
        Ok(())
    }

    /// Finalizes the file.
    ///
    /// Flushes the trailing partial chunk, writes the chunk directory and
    /// the end marker. Fails if fewer samples than declared were written; the
    /// file is then left without a directory and stays unreadable.
    pub fn close(mut self) -> Result<(), StoreError> {
        if self.written != self.total {
            return Err(StoreError::Incomplete {
                written: self.written,
                total: self.total,
            });
        }
        self.flush_chunk()?;
        let directory = bincode::serialize(&self.entries)?;
        self.file.write_all(&directory)?;
        self.file.write_all(&(directory.len() as u64).to_le_bytes())?;
        self.file.write_all(&END_MAGIC)?;
        self.file.flush()?;
        Ok(())
    }
}

impl SampleSink for DatasetWriter {
    fn write_range(&mut self, start: usize, screens: &[u8], states: &[u8]) -> anyhow::Result<()> {
        Ok(DatasetWriter::write_range(self, start, screens, states)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    const SHAPE: FrameShape = FrameShape {
        height: 2,
        width: 2,
    };

    fn block(n: usize, v: u8) -> (Vec<u8>, Vec<u8>) {
        (vec![v; n * SHAPE.pixels()], vec![v; n * STATE_LEN])
    }

    #[test]
    fn tracks_written_samples() -> Result<(), StoreError> {
        let dir = TempDir::new("writer")?;
        let mut writer = DatasetWriter::create(dir.path().join("a.sds"), 10, SHAPE, 4)?;
        let (s, t) = block(6, 1);
        writer.write_range(0, &s, &t)?;
        assert_eq!(writer.written(), 6);
        let (s, t) = block(4, 2);
        writer.write_range(6, &s, &t)?;
        assert_eq!(writer.written(), 10);
        writer.close()?;
        Ok(())
    }

    #[test]
    fn rejects_out_of_order_ranges() -> Result<(), StoreError> {
        let dir = TempDir::new("writer")?;
        let mut writer = DatasetWriter::create(dir.path().join("a.sds"), 10, SHAPE, 4)?;
        let (s, t) = block(4, 1);
        writer.write_range(0, &s, &t)?;
        // Repeating a range is as out of order as skipping ahead.
        assert!(matches!(
            writer.write_range(0, &s, &t),
            Err(StoreError::OutOfOrder {
                expected: 4,
                got: 0
            })
        ));
        assert!(matches!(
            writer.write_range(8, &s, &t),
            Err(StoreError::OutOfOrder { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_writes_past_declared_length() -> Result<(), StoreError> {
        let dir = TempDir::new("writer")?;
        let mut writer = DatasetWriter::create(dir.path().join("a.sds"), 5, SHAPE, 4)?;
        let (s, t) = block(6, 1);
        assert!(matches!(
            writer.write_range(0, &s, &t),
            Err(StoreError::OutOfBounds { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_blocks_that_are_not_co_indexed() -> Result<(), StoreError> {
        let dir = TempDir::new("writer")?;
        let mut writer = DatasetWriter::create(dir.path().join("a.sds"), 5, SHAPE, 4)?;
        let (s, _) = block(2, 1);
        let (_, t) = block(3, 1);
        assert!(matches!(
            writer.write_range(0, &s, &t),
            Err(StoreError::Misaligned {
                screens: 2,
                states: 3
            })
        ));
        // A half that is not a whole number of samples is rejected too.
        let (s, t) = block(2, 1);
        assert!(matches!(
            writer.write_range(0, &s[..s.len() - 1], &t),
            Err(StoreError::Misaligned { .. })
        ));
        Ok(())
    }

    #[test]
    fn refuses_to_close_short() -> Result<(), StoreError> {
        let dir = TempDir::new("writer")?;
        let mut writer = DatasetWriter::create(dir.path().join("a.sds"), 10, SHAPE, 4)?;
        let (s, t) = block(4, 1);
        writer.write_range(0, &s, &t)?;
        assert!(matches!(
            writer.close(),
            Err(StoreError::Incomplete {
                written: 4,
                total: 10
            })
        ));
        Ok(())
    }

    #[test]
    fn rejects_zero_chunk_len() {
        let dir = TempDir::new("writer").unwrap();
        let path = dir.path().join("a.sds");
        assert!(matches!(
            DatasetWriter::create(&path, 10, SHAPE, 0),
            Err(StoreError::ZeroChunkLen)
        ));
        // A rejected declaration must not create the file.
        assert!(!path.exists());
    }
}
