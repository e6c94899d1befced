//! Frame content hashes.
//!
//! Rendering is integer-exact, so two runs of the same scene must produce
//! byte-identical frames. A SHA-256 digest per frame makes that cheap to
//! compare in tests and from the `retromode hash` command.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// SHA-256 digest of one or more frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

trait FrameDigest {
    fn absorb(&mut self, frame: &FrameBuffer);
    fn seal(self) -> ContentHash;
}

impl FrameDigest for Sha256 {
    fn absorb(&mut self, frame: &FrameBuffer) {
        // Size first, so a 4x2 and a 2x4 frame of the same bytes differ.
        self.update(frame.width.to_le_bytes());
        self.update(frame.height.to_le_bytes());
        self.update(&frame.data);
    }

    fn seal(self) -> ContentHash {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.finalize());
        ContentHash(bytes)
    }
}

pub fn hash_frame(frame: &FrameBuffer) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.absorb(frame);
    hasher.seal()
}

/// Hash an ordered frame sequence; reordering the frames changes the hash.
pub fn hash_frames(frames: &[FrameBuffer]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update((frames.len() as u64).to_le_bytes());
    for frame in frames {
        hasher.absorb(frame);
    }
    hasher.seal()
}
