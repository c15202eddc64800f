//! Observation samples.

/// Length in bytes of the state snapshot of a [`Sample`].
pub const STATE_LEN: usize = 128;

/// Dimensions of the visual frames an environment emits.
///
/// Frames are single-channel grids of unsigned byte intensities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameShape {
    /// Number of rows.
    pub height: usize,

    /// Number of columns.
    pub width: usize,
}

impl FrameShape {
    /// Creates a frame shape.
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of pixels, which equals the length in bytes of one frame.
    pub fn pixels(&self) -> usize {
        self.height * self.width
    }
}

/// One captured observation: a visual frame and a state snapshot.
///
/// A sample is produced exactly once per environment step and moves by value
/// through the pipeline, from the environment into the window and from there
/// into the sink.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Frame bytes in row-major order, `height * width` long.
    pub frame: Vec<u8>,

    /// State snapshot, [`STATE_LEN`] bytes.
    pub state: Vec<u8>,
}

impl Sample {
    /// Creates a sample from raw frame and state bytes.
    pub fn new(frame: Vec<u8>, state: Vec<u8>) -> Self {
        Self { frame, state }
    }
}
