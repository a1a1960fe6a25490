//! 队列条目
//!
//! 按 `(time, seq)` 比较的堆条目；seq 保证同一时刻的事件 FIFO 出队。

use super::event::Event;
use std::cmp::Ordering;

pub(crate) struct ScheduledEvent<T> {
    pub(crate) seq: u64,
    pub(crate) ev: Event<T>,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl<T: Ord> Ord for ScheduledEvent<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.ev.time().cmp(other.ev.time()) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl<T: Ord> PartialOrd for ScheduledEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> PartialEq for ScheduledEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.ev.time() == other.ev.time()
    }
}

impl<T: Ord> Eq for ScheduledEvent<T> {}
