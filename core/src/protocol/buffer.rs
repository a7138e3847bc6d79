use crate::protocol::constants::RECEIVE_CAPACITY;

/// Fixed-capacity linear receive buffer for frame assembly.
///
/// Bytes past capacity are dropped. The last four bytes seen are tracked
/// separately so a footer can still be spotted while the buffer is full.
pub struct ReceiveBuffer<const N: usize = RECEIVE_CAPACITY> {
    data: [u8; N],
    len: usize,
    recent: [u8; 4],
    seen: usize,
    overflowed: bool,
}

impl<const N: usize> ReceiveBuffer<N> {
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            len: 0,
            recent: [0u8; 4],
            seen: 0,
            overflowed: false,
        }
    }

    /// Appends one byte. Returns `false` when the byte was dropped.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        self.recent.rotate_left(1);
        self.recent[3] = byte;
        self.seen = self.seen.saturating_add(1);

        if self.len < N {
            self.data[self.len] = byte;
            self.len += 1;
            true
        } else {
            self.overflowed = true;
            false
        }
    }

    #[inline]
    pub fn ends_with(&self, pattern: &[u8; 4]) -> bool {
        self.len >= 4 && self.data[self.len - 4..self.len] == pattern[..]
    }

    /// Whether the last four bytes received, stored or dropped, equal `pattern`.
    #[inline]
    pub fn recent_matches(&self, pattern: &[u8; 4]) -> bool {
        self.seen >= 4 && self.recent == *pattern
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.seen = 0;
        self.overflowed = false;
    }
}

impl<const N: usize> Default for ReceiveBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_bytes_past_capacity() {
        let mut buffer: ReceiveBuffer<4> = ReceiveBuffer::new();
        for byte in 1..=4 {
            assert!(buffer.push(byte));
        }
        assert!(!buffer.push(5));
        assert!(buffer.overflowed());
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn recent_window_tracks_dropped_bytes() {
        let mut buffer: ReceiveBuffer<4> = ReceiveBuffer::new();
        for byte in [9, 9, 9, 9, 0x04, 0x03, 0x02, 0x01] {
            buffer.push(byte);
        }
        assert!(!buffer.ends_with(&[0x04, 0x03, 0x02, 0x01]));
        assert!(buffer.recent_matches(&[0x04, 0x03, 0x02, 0x01]));
    }

    #[test]
    fn reset_clears_state() {
        let mut buffer: ReceiveBuffer<8> = ReceiveBuffer::new();
        buffer.push(0xF8);
        buffer.reset();
        assert!(buffer.is_empty());
        assert!(!buffer.overflowed());
        assert!(!buffer.recent_matches(&[0, 0, 0, 0]));
        assert_eq!(buffer.capacity(), 8);
    }
}
