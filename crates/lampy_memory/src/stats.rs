//! Per-tag and global allocation counters, updated under a single mutex
//! that is never held across an allocation (spec.md §5).

use rustc_hash::FxHashMap;

use crate::tag::MemoryTag;

/// Counters for a single [`MemoryTag`] bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatorStats {
    pub allocated: usize,
    pub peak: usize,
    pub alloc_count: u64,
    pub dealloc_count: u64,
}

impl AllocatorStats {
    fn record_alloc(&mut self, size: usize) {
        self.allocated += size;
        self.peak = self.peak.max(self.allocated);
        self.alloc_count += 1;
    }

    fn record_dealloc(&mut self, size: usize) {
        self.allocated = self.allocated.saturating_sub(size);
        self.dealloc_count += 1;
    }
}

/// Process-wide allocation counters, bucketed by [`MemoryTag`].
#[derive(Debug, Default)]
pub struct MemoryStatistics {
    per_tag: FxHashMap<MemoryTag, AllocatorStats>,
}

impl MemoryStatistics {
    #[must_use]
    pub fn new() -> Self {
        let mut per_tag = FxHashMap::default();
        for tag in MemoryTag::ALL {
            per_tag.insert(tag, AllocatorStats::default());
        }
        Self { per_tag }
    }

    pub fn record_alloc(&mut self, tag: MemoryTag, size: usize) {
        self.per_tag.entry(tag).or_default().record_alloc(size);
    }

    pub fn record_dealloc(&mut self, tag: MemoryTag, size: usize) {
        self.per_tag.entry(tag).or_default().record_dealloc(size);
    }

    /// Snapshot of every tag's counters.
    #[must_use]
    pub fn snapshot(&self) -> FxHashMap<MemoryTag, AllocatorStats> {
        self.per_tag.clone()
    }

    /// Snapshot of a single tag's counters.
    #[must_use]
    pub fn snapshot_tag(&self, tag: MemoryTag) -> AllocatorStats {
        self.per_tag.get(&tag).copied().unwrap_or_default()
    }

    /// Tags whose live `allocated` byte count is non-zero — used at
    /// shutdown to report leaks.
    #[must_use]
    pub fn leaked_tags(&self) -> Vec<(MemoryTag, usize)> {
        let mut leaks: Vec<_> = self
            .per_tag
            .iter()
            .filter(|(_, stats)| stats.allocated != 0)
            .map(|(tag, stats)| (*tag, stats.allocated))
            .collect();
        leaks.sort_by_key(|(tag, _)| tag.name());
        leaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_every_tag() {
        let stats = MemoryStatistics::new();
        assert_eq!(stats.snapshot().len(), MemoryTag::ALL.len());
    }

    #[test]
    fn alloc_then_dealloc_clears_leak() {
        let mut stats = MemoryStatistics::new();
        stats.record_alloc(MemoryTag::Render, 256);
        assert!(!stats.leaked_tags().is_empty());
        stats.record_dealloc(MemoryTag::Render, 256);
        assert!(stats.leaked_tags().is_empty());
    }

    #[test]
    fn peak_tracks_high_water_mark() {
        let mut stats = MemoryStatistics::new();
        stats.record_alloc(MemoryTag::Temp, 100);
        stats.record_alloc(MemoryTag::Temp, 50);
        stats.record_dealloc(MemoryTag::Temp, 120);
        assert_eq!(stats.snapshot_tag(MemoryTag::Temp).peak, 150);
        assert_eq!(stats.snapshot_tag(MemoryTag::Temp).allocated, 30);
    }
}
