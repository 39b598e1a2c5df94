//! Bit containers used by the codec.
//!
//! [`Bitstream`] is array-backed: it can be written, frozen with
//! [`Bitstream::finalize_for_reading`], and read back with random access to the position.
//! It is either growable (backing storage doubles on overflow) or fixed (writes past the
//! capacity fail with `BufferOverrun`).
//!
//! [`BitQueue`] is append-only and queue-backed. It collects bits whose total length is not
//! known up front (open-type payloads) and is drained into a `Bitstream` afterwards.
//!
//! Bits are always most-significant first. Nothing here inserts alignment padding; only
//! [`Bitstream::to_bytes`] zero-pads the last partial octet.

use crate::error::{CodecError, Result};
use bitvec::prelude::*;
use byteorder::{BigEndian, ByteOrder};
use std::collections::VecDeque;

/// Write side shared by [`Bitstream`] and [`BitQueue`]; encoders write through this.
pub trait BitSink {
    fn append_bit(&mut self, bit: bool) -> Result<()>;

    /// Number of bits written so far.
    fn bit_len(&self) -> usize;

    /// Append the low `width` bits of `value`, most significant first.
    fn append_bits(&mut self, value: u64, width: u32) -> Result<()> {
        if width > 64 {
            return Err(CodecError::invalid_argument(format!(
                "cannot append {} bits from a 64-bit word",
                width
            )));
        }
        let mut word = [0u8; 8];
        BigEndian::write_u64(&mut word, value);
        let bits = word.view_bits::<Msb0>();
        for bit in bits[(64 - width as usize)..].iter().by_vals() {
            self.append_bit(bit)?;
        }
        Ok(())
    }

    fn append_byte(&mut self, byte: u8) -> Result<()> {
        self.append_bits(byte as u64, 8)
    }

    fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.append_byte(b)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Growable,
    Fixed { capacity: usize },
}

/// Array-backed bit container with a read cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    bits: BitVec<u8, Msb0>,
    storage: Storage,
    /// Read limit; equals the written length once finalized.
    limit: usize,
    cursor: usize,
}

impl Default for Bitstream {
    fn default() -> Self {
        Bitstream::growable(256)
    }
}

impl Bitstream {
    /// Growable stream with room for `initial_bits` before the first doubling.
    pub fn growable(initial_bits: usize) -> Self {
        Bitstream {
            bits: BitVec::with_capacity(initial_bits.max(8)),
            storage: Storage::Growable,
            limit: 0,
            cursor: 0,
        }
    }

    /// Fixed stream; appending beyond `capacity_bits` fails with `BufferOverrun`.
    pub fn fixed(capacity_bits: usize) -> Self {
        Bitstream {
            bits: BitVec::with_capacity(capacity_bits),
            storage: Storage::Fixed { capacity: capacity_bits },
            limit: 0,
            cursor: 0,
        }
    }

    /// Read-only stream over whole octets.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bits = BitVec::<u8, Msb0>::from_slice(bytes);
        let len = bits.len();
        Bitstream {
            bits,
            storage: Storage::Fixed { capacity: len },
            limit: len,
            cursor: 0,
        }
    }

    /// Read-only stream over the first `bit_len` bits of `bytes`.
    pub fn from_bytes_with_len(bytes: &[u8], bit_len: usize) -> Result<Self> {
        if bit_len > bytes.len() * 8 {
            return Err(CodecError::invalid_argument(format!(
                "bit length {} exceeds {} octets",
                bit_len,
                bytes.len()
            )));
        }
        let mut s = Bitstream::from_bytes(bytes);
        s.bits.truncate(bit_len);
        s.storage = Storage::Fixed { capacity: bit_len };
        s.limit = bit_len;
        Ok(s)
    }

    /// Freeze the written length as the read limit and rewind the cursor.
    /// Later appends fail with `BufferOverrun`.
    pub fn finalize_for_reading(&mut self) {
        self.bits.shrink_to_fit();
        self.limit = self.bits.len();
        self.storage = Storage::Fixed { capacity: self.limit };
        self.cursor = 0;
    }

    /// Bits written.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Read cursor, in bits from the start.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Move the read cursor; may not pass the read limit.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(CodecError::out_of_data(format!(
                "cannot seek to bit {} of {}",
                position, self.limit
            )));
        }
        self.cursor = position;
        Ok(())
    }

    /// Bits left to read.
    pub fn remaining(&self) -> usize {
        self.limit - self.cursor
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        if self.cursor >= self.limit {
            return Err(CodecError::out_of_data(format!(
                "read past end of stream at bit {}",
                self.cursor
            )));
        }
        let bit = self.bits[self.cursor];
        self.cursor += 1;
        Ok(bit)
    }

    /// Read `width` bits (at most 64) as an unsigned big-endian number.
    pub fn read_bits(&mut self, width: u32) -> Result<u64> {
        if width > 64 {
            return Err(CodecError::invalid_argument(format!(
                "cannot read {} bits into a 64-bit word",
                width
            )));
        }
        if (width as usize) > self.remaining() {
            return Err(CodecError::out_of_data(format!(
                "need {} bits at bit {}, {} remaining",
                width,
                self.cursor,
                self.remaining()
            )));
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if count.saturating_mul(8) > self.remaining() {
            return Err(CodecError::out_of_data(format!(
                "need {} octets at bit {}, {} bits remaining",
                count,
                self.cursor,
                self.remaining()
            )));
        }
        (0..count).map(|_| self.read_byte()).collect()
    }

    /// Append every written bit of `other`.
    pub fn append_stream(&mut self, other: &Bitstream) -> Result<()> {
        self.reserve(other.len())?;
        self.bits.extend_from_bitslice(&other.bits);
        self.limit = self.bits.len();
        Ok(())
    }

    /// Written bits packed into octets, last octet zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .by_vals()
                    .enumerate()
                    .fold(0u8, |acc, (i, bit)| if bit { acc | (0x80 >> i) } else { acc })
            })
            .collect()
    }

    /// `len` bits starting at `start` as a string of `0`/`1`.
    pub fn render(&self, start: usize, len: usize) -> Result<String> {
        let end = start.checked_add(len).filter(|&e| e <= self.bits.len()).ok_or_else(|| {
            CodecError::invalid_argument(format!(
                "window {}+{} outside {} written bits",
                start,
                len,
                self.bits.len()
            ))
        })?;
        Ok(self.bits[start..end]
            .iter()
            .by_vals()
            .map(|b| if b { '1' } else { '0' })
            .collect())
    }

    /// All written bits as `0`/`1`.
    pub fn render_binary(&self) -> String {
        self.bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// All written bits as upper-case hex, last octet zero-padded.
    pub fn render_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.bits.len() + additional;
        match self.storage {
            Storage::Fixed { capacity } if needed > capacity => Err(CodecError::buffer_overrun(
                format!("{} bits exceed fixed capacity of {}", needed, capacity),
            )),
            Storage::Fixed { .. } => Ok(()),
            Storage::Growable => {
                let mut cap = self.bits.capacity().max(8);
                while cap < needed {
                    cap *= 2;
                }
                if cap > self.bits.capacity() {
                    self.bits.reserve(cap - self.bits.len());
                }
                Ok(())
            }
        }
    }
}

impl BitSink for Bitstream {
    fn append_bit(&mut self, bit: bool) -> Result<()> {
        self.reserve(1)?;
        self.bits.push(bit);
        self.limit = self.bits.len();
        Ok(())
    }

    fn bit_len(&self) -> usize {
        self.bits.len()
    }
}

/// Append-only FIFO of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitQueue {
    bits: VecDeque<bool>,
}

impl BitQueue {
    pub fn new() -> Self {
        BitQueue::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Remove and return the oldest bit.
    pub fn pop_bit(&mut self) -> Option<bool> {
        self.bits.pop_front()
    }

    /// Append zero bits until the length is a multiple of 8.
    pub fn pad_to_octet(&mut self) {
        while self.bits.len() % 8 != 0 {
            self.bits.push_back(false);
        }
    }

    /// Move every queued bit, oldest first, into `sink`.
    pub fn drain_into(&mut self, sink: &mut dyn BitSink) -> Result<()> {
        while let Some(bit) = self.bits.pop_front() {
            sink.append_bit(bit)?;
        }
        Ok(())
    }

    /// Growable stream holding the queued bits, finalized for reading.
    pub fn into_bitstream(mut self) -> Result<Bitstream> {
        let mut out = Bitstream::growable(self.bits.len());
        self.drain_into(&mut out)?;
        out.finalize_for_reading();
        Ok(out)
    }
}

impl BitSink for BitQueue {
    fn append_bit(&mut self, bit: bool) -> Result<()> {
        self.bits.push_back(bit);
        Ok(())
    }

    fn bit_len(&self) -> usize {
        self.bits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn append_and_read_back() {
        let mut s = Bitstream::growable(8);
        s.append_bit(true).unwrap();
        s.append_bits(0b0101, 4).unwrap();
        s.append_byte(0xA5).unwrap();
        assert_eq!(s.len(), 13);
        s.finalize_for_reading();
        assert_eq!(s.position(), 0);
        assert!(s.read_bit().unwrap());
        assert_eq!(s.read_bits(4).unwrap(), 0b0101);
        assert_eq!(s.read_byte().unwrap(), 0xA5);
        assert_eq!(s.remaining(), 0);
        assert_eq!(s.read_bit().unwrap_err().kind(), ErrorKind::OutOfData);
    }

    #[test]
    fn to_bytes_zero_pads_last_octet() {
        let mut s = Bitstream::default();
        s.append_bits(0b101, 3).unwrap();
        assert_eq!(s.to_bytes(), vec![0b1010_0000]);
        assert_eq!(s.render_hex(), "A0");
    }

    #[test]
    fn growable_doubles_past_initial_capacity() {
        let mut s = Bitstream::growable(8);
        for i in 0..100 {
            s.append_bit(i % 3 == 0).unwrap();
        }
        assert_eq!(s.len(), 100);
        assert_eq!(s.render(0, 6).unwrap(), "100100");
    }

    #[test]
    fn fixed_overrun() {
        let mut s = Bitstream::fixed(4);
        s.append_bits(0xF, 4).unwrap();
        let err = s.append_bit(false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferOverrun);
    }

    #[test]
    fn finalized_stream_rejects_appends() {
        let mut s = Bitstream::default();
        s.append_bit(true).unwrap();
        s.finalize_for_reading();
        assert_eq!(s.append_bit(true).unwrap_err().kind(), ErrorKind::BufferOverrun);
    }

    #[test]
    fn read_bits_reports_shortfall_without_consuming() {
        let mut s = Bitstream::from_bytes(&[0xFF]);
        assert_eq!(s.read_bits(9).unwrap_err().kind(), ErrorKind::OutOfData);
        assert_eq!(s.position(), 0);
        assert_eq!(s.read_bits(8).unwrap(), 0xFF);
    }

    #[test]
    fn from_bytes_with_len_limits_reads() {
        let mut s = Bitstream::from_bytes_with_len(&[0b1100_0000], 2).unwrap();
        assert_eq!(s.remaining(), 2);
        assert_eq!(s.read_bits(2).unwrap(), 0b11);
        assert!(s.read_bit().is_err());
        assert!(Bitstream::from_bytes_with_len(&[0], 9).is_err());
    }

    #[test]
    fn render_window_checks_bounds() {
        let s = Bitstream::from_bytes(&[0x0F]);
        assert_eq!(s.render(2, 4).unwrap(), "0011");
        assert_eq!(s.render(6, 4).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn queue_drains_in_order() {
        let mut q = BitQueue::new();
        q.append_bits(0b110, 3).unwrap();
        q.pad_to_octet();
        assert_eq!(q.len(), 8);
        let s = q.into_bitstream().unwrap();
        assert_eq!(s.to_bytes(), vec![0b1100_0000]);
    }

    #[test]
    fn queue_pops_oldest_first() {
        let mut q = BitQueue::new();
        q.append_bits(0b10, 2).unwrap();
        assert_eq!(q.pop_bit(), Some(true));
        assert_eq!(q.pop_bit(), Some(false));
        assert_eq!(q.pop_bit(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn append_stream_concatenates_bits() {
        let mut head = Bitstream::default();
        head.append_bits(0b101, 3).unwrap();
        let mut tail = Bitstream::default();
        tail.append_bits(0b11, 2).unwrap();
        head.append_stream(&tail).unwrap();
        assert_eq!(head.render_binary(), "10111");

        let mut small = Bitstream::fixed(4);
        small.append_bits(0b101, 3).unwrap();
        assert_eq!(small.append_stream(&tail).unwrap_err().kind(), ErrorKind::BufferOverrun);
    }
}
