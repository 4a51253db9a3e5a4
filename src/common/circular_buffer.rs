/// A fixed capacity ring buffer of samples, addressed by absolute sample position.
///
/// Positions are signed and increase monotonically as samples are written. The
/// buffer always holds the most recent `available()` samples, the first of
/// which is at `start_position()`. Writing past capacity evicts the oldest
/// samples.
pub struct CircularBuffer {
    buffer: Box<[f32]>,
    /// Storage index of the sample at `start_position`.
    start_offset: usize,
    start_position: i64,
    available: usize,
}

impl CircularBuffer {
    pub fn new(capacity: usize) -> Self {
        CircularBuffer {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            start_offset: 0,
            start_position: 0,
            available: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The number of samples that can currently be read.
    pub fn available(&self) -> usize {
        self.available
    }

    /// The absolute position of the oldest available sample.
    pub fn start_position(&self) -> i64 {
        self.start_position
    }

    /// The absolute position one past the newest available sample.
    pub fn end_position(&self) -> i64 {
        self.start_position + self.available as i64
    }

    /// Zeroes the storage and makes the buffer empty, starting at `start_position`.
    pub fn reset(&mut self, start_position: i64) {
        for value in self.buffer.iter_mut() {
            *value = 0.0;
        }
        self.start_offset = 0;
        self.start_position = start_position;
        self.available = 0;
    }

    /// Sets the number of available samples, clamped to the capacity. Samples
    /// that were never written read as whatever the storage holds, i.e zeros
    /// right after a reset.
    pub fn set_available(&mut self, available: usize) {
        self.available = available.min(self.capacity());
    }

    /// Appends `samples`. The end position always advances by `samples.len()`.
    /// If more than `capacity()` samples are passed, only the last `capacity()`
    /// of them are kept.
    pub fn write(&mut self, samples: &[f32]) {
        let capacity = self.capacity();
        if capacity == 0 {
            self.start_position += samples.len() as i64;
            return;
        }
        if samples.is_empty() {
            return;
        }

        let end_position = self.end_position() + samples.len() as i64;
        let samples = if samples.len() > capacity {
            &samples[samples.len() - capacity..]
        } else {
            samples
        };

        // Copy in at most two contiguous runs.
        let write_offset = (self.start_offset + self.available) % capacity;
        let first_len = samples.len().min(capacity - write_offset);
        self.buffer[write_offset..write_offset + first_len].copy_from_slice(&samples[..first_len]);
        let remaining = samples.len() - first_len;
        if remaining > 0 {
            self.buffer[..remaining].copy_from_slice(&samples[first_len..]);
        }

        let total = self.available + samples.len();
        if total > capacity {
            let evicted = total - capacity;
            self.start_offset = (self.start_offset + evicted) % capacity;
            self.available = capacity;
        } else {
            self.available = total;
        }
        self.start_position = end_position - self.available as i64;
    }

    /// Copies `destination.len()` samples starting at the absolute position
    /// `start_position` into `destination`. Returns false, leaving `destination`
    /// untouched, if the requested range is not entirely available.
    pub fn read(&self, destination: &mut [f32], start_position: i64) -> bool {
        let count = destination.len();
        if start_position < self.start_position
            || start_position + count as i64 > self.end_position()
        {
            return false;
        }
        if count == 0 {
            return true;
        }

        let capacity = self.capacity();
        let read_offset =
            (self.start_offset + (start_position - self.start_position) as usize) % capacity;
        let first_len = count.min(capacity - read_offset);
        destination[..first_len].copy_from_slice(&self.buffer[read_offset..read_offset + first_len]);
        if first_len < count {
            destination[first_len..].copy_from_slice(&self.buffer[..count - first_len]);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::CircularBuffer;

    fn ramp(start: usize, count: usize) -> Vec<f32> {
        (start..start + count).map(|i| i as f32).collect()
    }

    #[test]
    fn test_round_trip() {
        let mut buffer = CircularBuffer::new(64);
        buffer.write(&ramp(0, 10));
        buffer.write(&ramp(10, 1));
        buffer.write(&ramp(11, 40));
        assert_eq!(buffer.available(), 51);
        assert_eq!(buffer.start_position(), 0);

        for start in 0..51 {
            let mut destination = vec![0.0; 51 - start];
            assert!(buffer.read(&mut destination, start as i64));
            assert_eq!(destination, ramp(start, 51 - start));
        }
    }

    #[test]
    fn test_read_across_wrap() {
        let mut buffer = CircularBuffer::new(16);
        buffer.write(&ramp(0, 12));
        buffer.write(&ramp(12, 12));
        assert_eq!(buffer.start_position(), 8);

        let mut destination = vec![0.0; 16];
        assert!(buffer.read(&mut destination, 8));
        assert_eq!(destination, ramp(8, 16));
    }

    #[test]
    fn test_eviction() {
        let capacity = 100;
        let written = 257;
        let mut buffer = CircularBuffer::new(capacity);
        buffer.write(&ramp(0, written));
        assert_eq!(buffer.available(), capacity);
        assert_eq!(buffer.start_position(), (written - capacity) as i64);

        let mut destination = vec![0.0; 10];
        let first_kept = (written - capacity) as i64;
        assert!(!buffer.read(&mut destination, first_kept - 1));
        assert!(buffer.read(&mut destination, first_kept));
        assert_eq!(destination, ramp(written - capacity, 10));
    }

    #[test]
    fn test_incremental_eviction() {
        let mut buffer = CircularBuffer::new(10);
        for i in 0..35 {
            buffer.write(&[i as f32]);
        }
        assert_eq!(buffer.available(), 10);
        assert_eq!(buffer.start_position(), 25);
        let mut destination = vec![0.0; 10];
        assert!(buffer.read(&mut destination, 25));
        assert_eq!(destination, ramp(25, 10));
    }

    #[test]
    fn test_failed_read_does_not_copy() {
        let mut buffer = CircularBuffer::new(8);
        buffer.write(&ramp(1, 4));
        let mut destination = vec![-1.0; 5];
        assert!(!buffer.read(&mut destination, 0));
        assert!(destination.iter().all(|v| *v == -1.0));
    }

    #[test]
    fn test_reset_with_preseeded_silence() {
        let mut buffer = CircularBuffer::new(32);
        buffer.write(&ramp(1, 20));
        buffer.reset(-5);
        buffer.set_available(5);
        assert_eq!(buffer.start_position(), -5);
        assert_eq!(buffer.end_position(), 0);

        buffer.write(&ramp(1, 3));
        let mut destination = vec![1.0; 8];
        assert!(buffer.read(&mut destination, -5));
        assert_eq!(destination, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = CircularBuffer::new(0);
        buffer.write(&[1.0, 2.0]);
        assert_eq!(buffer.available(), 0);
        assert_eq!(buffer.end_position(), 2);
        buffer.write(&[3.0]);
        assert_eq!(buffer.start_position(), 3);
        let mut destination = [0.0; 1];
        assert!(!buffer.read(&mut destination, 0));
    }
}
