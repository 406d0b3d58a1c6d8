use std::ops::Range;

/// Splits `0..total` into consecutive index ranges of at most `size` points.
///
/// Every range but the last holds exactly `size` points; the last holds the
/// remainder. A `size` of 0 yields a single range covering everything, which is
/// the same plan as any `size >= total`. `total == 0` yields nothing.
#[derive(Debug, Clone)]
pub struct Partitions {
    next: u64,
    total: u64,
    size: u64,
}

impl Partitions {
    pub fn new(total: u64, size: usize) -> Self {
        let size = if size == 0 { total.max(1) } else { size as u64 };
        Self { next: 0, total, size }
    }
}

impl Iterator for Partitions {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Range<u64>> {
        if self.next >= self.total {
            return None;
        }
        let end = self.total.min(self.next.saturating_add(self.size));
        let range = self.next..end;
        self.next = end;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next).div_ceil(self.size) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Partitions {}
