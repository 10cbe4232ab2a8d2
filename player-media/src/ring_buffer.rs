// player-media/src/ring_buffer.rs
//
// C3: audio ring buffer feeding the sink callback PCM chunks. A plain byte
// buffer with read/write offsets (spec §4.3) — not a true circular buffer:
// `extract` advances the read offset and the buffer auto-resets (both
// offsets back to 0) once fully drained, exactly like the original
// AudioBuffer it is grounded on.

pub struct RingBuffer {
    buf:          Vec<u8>,
    read_offset:  usize,
    write_offset: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { buf: vec![0u8; capacity], read_offset: 0, write_offset: 0 }
    }

    pub fn capacity(&self) -> usize { self.buf.len() }

    pub fn writable(&self) -> usize {
        self.buf.len() - self.write_offset
    }

    pub fn readable(&self) -> usize {
        self.write_offset - self.read_offset
    }

    /// Copies up to `writable()` bytes from `data` in. Silently truncates if
    /// `data` is larger than the remaining space.
    pub fn fill(&mut self, data: &[u8]) {
        let n = data.len().min(self.writable());
        let start = self.write_offset;
        self.buf[start..start + n].copy_from_slice(&data[..n]);
        self.write_offset += n;
    }

    /// Advances the read pointer by up to `readable()` bytes, optionally
    /// copying the consumed bytes into `dst`. Auto-resets when drained.
    pub fn extract(&mut self, mut dst: Option<&mut [u8]>, n: usize) -> usize {
        let n = n.min(self.readable());
        if let Some(d) = dst.as_deref_mut() {
            let copy_n = n.min(d.len());
            let start = self.read_offset;
            d[..copy_n].copy_from_slice(&self.buf[start..start + copy_n]);
        }
        self.read_offset += n;
        if self.read_offset >= self.write_offset {
            self.clear();
        }
        n
    }

    /// Rewind offsets without touching the backing allocation.
    pub fn clear(&mut self) {
        self.read_offset = 0;
        self.write_offset = 0;
    }

    /// Reallocate the backing buffer (used when the audio session's HW
    /// params change — sample rate/channel count — so stale bytes sized for
    /// the old format are never replayed; see SPEC_FULL §2).
    pub fn reset(&mut self, new_capacity: usize) {
        self.buf = vec![0u8; new_capacity];
        self.read_offset = 0;
        self.write_offset = 0;
    }

    pub fn peek(&self) -> &[u8] {
        &self.buf[self.read_offset..self.write_offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_bytes_written() {
        let mut rb = RingBuffer::new(16);
        rb.fill(&[1, 2, 3, 4]);
        let mut out = [0u8; 4];
        let n = rb.extract(Some(&mut out), 4);
        assert_eq!(n, 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn fill_truncates_when_over_writable() {
        let mut rb = RingBuffer::new(4);
        rb.fill(&[1, 2, 3, 4, 5, 6]); // only 4 bytes fit
        assert_eq!(rb.readable(), 4);
    }

    #[test]
    fn drains_and_auto_resets() {
        let mut rb = RingBuffer::new(8);
        rb.fill(&[9, 9, 9]);
        rb.extract(None, 3);
        assert_eq!(rb.readable(), 0);
        assert_eq!(rb.writable(), 8); // reset, not stuck at 5
    }

    #[test]
    fn partial_extract_leaves_remainder_readable() {
        let mut rb = RingBuffer::new(8);
        rb.fill(&[1, 2, 3, 4]);
        rb.extract(None, 2);
        assert_eq!(rb.readable(), 2);
        let mut out = [0u8; 2];
        rb.extract(Some(&mut out), 2);
        assert_eq!(out, [3, 4]);
    }

    #[test]
    fn reset_reallocates_and_clears() {
        let mut rb = RingBuffer::new(4);
        rb.fill(&[1, 2, 3, 4]);
        rb.reset(16);
        assert_eq!(rb.capacity(), 16);
        assert_eq!(rb.readable(), 0);
        assert_eq!(rb.writable(), 16);
    }
}
