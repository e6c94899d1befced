use std::fmt;

/// A discrete engine tick. Time only advances one tick per produced frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick {
    /// Zero-based tick index.
    pub index: u64,
}

impl Tick {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    /// The tick after this one.
    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.index)
    }
}
