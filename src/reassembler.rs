//! Orders out-of-order byte ranges by absolute stream index and pushes the
//! contiguous prefix they form into a `ByteStream`.

use crate::byte_stream::ByteStream;

/// A disjoint, not-yet-deliverable run of bytes, anchored at an absolute
/// stream index.
#[derive(Debug)]
struct Segment {
    start: u64,
    data: Vec<u8>,
}

impl Segment {
    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }

    /// Absorb `other` into `self`, keeping `self`'s bytes wherever the two
    /// overlap (overlapping bytes are required to be identical by the TCP
    /// invariant the sender upholds, so either side's bytes would do).
    fn merge(&mut self, other: Segment) {
        let merged_start = self.start.min(other.start);
        let merged_end = self.end().max(other.end());
        let mut merged = vec![0u8; (merged_end - merged_start) as usize];

        let other_off = (other.start - merged_start) as usize;
        merged[other_off..other_off + other.data.len()].copy_from_slice(&other.data);
        let self_off = (self.start - merged_start) as usize;
        merged[self_off..self_off + self.data.len()].copy_from_slice(&self.data);

        self.start = merged_start;
        self.data = merged;
    }
}

/// Reassembles byte ranges arriving out of order and feeds the growing
/// contiguous prefix to an owned `ByteStream`.
#[derive(Debug)]
pub struct Reassembler {
    output: ByteStream,
    segments: Vec<Segment>,
    eof_index: Option<u64>,
}

impl Reassembler {
    pub fn new(output: ByteStream) -> Self {
        Reassembler {
            output,
            segments: Vec::new(),
            eof_index: None,
        }
    }

    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    fn next_index(&self) -> u64 {
        self.output.bytes_pushed()
    }

    /// Insert a byte range `[first_index, first_index + data.len())`.
    /// `is_last` marks `data` as containing the final byte of the stream.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last {
            self.eof_index = Some(first_index + data.len() as u64);
        }

        let first_unassembled = self.next_index();
        let first_unacceptable = first_unassembled + self.output.available_capacity() as u64;

        let mut start = first_index;
        let mut end = first_index + data.len() as u64;

        if end <= first_unassembled || start >= first_unacceptable {
            self.close_if_done();
            return;
        }

        start = start.max(first_unassembled);
        end = end.min(first_unacceptable);
        if end <= start {
            self.close_if_done();
            return;
        }

        let trimmed = (start - first_index) as usize;
        let mut seg = Segment {
            start,
            data: data[trimmed..trimmed + (end - start) as usize].to_vec(),
        };

        // Find insertion point: first segment whose start is >= seg.start.
        let mut idx = self
            .segments
            .iter()
            .position(|s| s.start >= seg.start)
            .unwrap_or(self.segments.len());

        // Merge with a preceding segment that overlaps or abuts.
        if idx > 0 && self.segments[idx - 1].end() >= seg.start {
            let prev = self.segments.remove(idx - 1);
            seg.merge(prev);
            idx -= 1;
        }

        // Merge with any following segments seg now overlaps or abuts.
        while idx < self.segments.len() && self.segments[idx].start <= seg.end() {
            let next = self.segments.remove(idx);
            seg.merge(next);
        }

        self.segments.insert(idx, seg);

        while !self.segments.is_empty() && self.segments[0].start == self.next_index() {
            let front = self.segments.remove(0);
            self.output.push(&front.data);
        }

        self.close_if_done();
    }

    fn close_if_done(&mut self) {
        if self.eof_index == Some(self.next_index()) {
            self.output.close();
        }
    }

    /// For tests only: total bytes held pending (not yet deliverable).
    pub fn count_bytes_pending(&self) -> usize {
        self.segments.iter().map(|s| s.data.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassembler(capacity: usize) -> Reassembler {
        Reassembler::new(ByteStream::new(capacity))
    }

    #[test]
    fn in_order_insert() {
        let mut r = reassembler(10);
        r.insert(0, b"abc", false);
        assert_eq!(r.output().peek(), b"abc");
    }

    #[test]
    fn out_of_order_then_fill_gap() {
        let mut r = reassembler(10);
        r.insert(3, b"de", false);
        assert_eq!(r.output().bytes_pushed(), 0);
        r.insert(0, b"abc", false);
        let mut seen = Vec::new();
        while r.output().bytes_buffered() > seen.len() {
            seen = r.output().peek().to_vec();
        }
        assert_eq!(seen, b"abcde");
        r.insert(5, b"", true);
        assert!(r.output().is_closed());
    }

    #[test]
    fn overlapping_segments_merge() {
        let mut r = reassembler(10);
        r.insert(0, b"ab", false);
        r.insert(1, b"bc", false);
        assert_eq!(r.output().peek(), b"abc");
    }

    #[test]
    fn respects_capacity() {
        let mut r = reassembler(2);
        r.insert(0, b"abcd", false);
        assert_eq!(r.output().peek(), b"ab");
        assert_eq!(r.count_bytes_pending(), 0);
    }

    #[test]
    fn pending_bytes_tracked_until_contiguous() {
        let mut r = reassembler(10);
        r.insert(2, b"cd", false);
        assert_eq!(r.count_bytes_pending(), 2);
        r.insert(0, b"ab", false);
        assert_eq!(r.count_bytes_pending(), 0);
    }
}
