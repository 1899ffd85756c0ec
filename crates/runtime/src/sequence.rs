/// Cyclic position over `len` frames.
///
/// There is no terminal state: stepping past either end wraps around.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SequenceIndex {
    index: usize,
    len: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SequenceError {
    EmptyFrameList,
    OutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for SequenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceError::EmptyFrameList => write!(f, "sequence needs at least one frame"),
            SequenceError::OutOfRange { index, len } => {
                write!(f, "frame index {index} outside 0..{len}")
            }
        }
    }
}

impl std::error::Error for SequenceError {}

impl SequenceIndex {
    /// Starts at index 0.
    pub fn new(len: usize) -> Result<Self, SequenceError> {
        if len == 0 {
            return Err(SequenceError::EmptyFrameList);
        }
        Ok(Self { index: 0, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Highest valid index, i.e. the slider maximum.
    pub fn last(&self) -> usize {
        self.len - 1
    }

    pub fn forward(&mut self) -> usize {
        self.index = (self.index + 1) % self.len;
        self.index
    }

    pub fn backward(&mut self) -> usize {
        self.index = (self.index + self.len - 1) % self.len;
        self.index
    }

    pub fn set_index(&mut self, index: usize) -> Result<(), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(())
    }
}
