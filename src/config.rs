//! Codec options.

/// Bitstream flavor used by `encode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Starts with `initial_bits` and doubles on overflow.
    Growable { initial_bits: usize },
    /// Fails with `BufferOverrun` past `capacity_bits`.
    Fixed { capacity_bits: usize },
}

impl Default for BufferKind {
    fn default() -> Self {
        BufferKind::Growable { initial_bits: 256 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub buffer: BufferKind,
    /// Deepest composite nesting walked by one call.
    pub max_depth: usize,
    /// Reject decodes that leave a full octet unread or non-zero padding bits.
    pub strict_trailing: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig { buffer: BufferKind::default(), max_depth: 64, strict_trailing: false }
    }
}

impl CodecConfig {
    pub fn with_buffer(mut self, buffer: BufferKind) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_trailing(mut self, strict: bool) -> Self {
        self.strict_trailing = strict;
        self
    }
}
