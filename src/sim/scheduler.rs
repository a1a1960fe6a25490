//! 事件调度器
//!
//! 维护逻辑时钟与按 `(time, seq)` 排序的事件队列。
//! 出队顺序：先移出队列、推进时钟，再执行 action；
//! 因此 action 出错时，事件已不在队列中，时钟也已到达该事件的时间。

use super::error::{ActionResult, SchedulerError};
use super::event::{Context, Event, EventHandle};
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use crate::trace::{DispatchLog, DispatchOutcome, DispatchRecord, DispatchStats};
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::ops::Add;
use tracing::{debug, trace};

/// 离散事件调度器。每个实例完全独立，没有全局状态。
pub struct EventScheduler<T = SimTime> {
    now: T,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent<T>>,
    stats: DispatchStats,
    log: Option<DispatchLog<T>>,
}

impl<T: Ord + Default> Default for EventScheduler<T> {
    fn default() -> Self {
        Self {
            now: T::default(),
            next_seq: 0,
            q: BinaryHeap::new(),
            stats: DispatchStats::default(),
            log: None,
        }
    }
}

impl<T: Ord + Default> EventScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Ord + Clone + Debug> EventScheduler<T> {
    /// 当前仿真时间
    pub fn current_time(&self) -> T {
        self.now.clone()
    }

    /// 调度事件，返回与事件共享状态的句柄。
    ///
    /// 不检查 `time` 是否早于当前时间；见 [`EventScheduler::step`] 的时钟规则。
    #[tracing::instrument(level = "trace", skip(self, ev), fields(schedule_at = ?ev.time()))]
    pub fn schedule(&mut self, mut ev: Event<T>) -> EventHandle<T> {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        ev.set_seq(seq);
        let handle = ev.handle();
        self.q.push(ScheduledEvent { seq, ev });
        self.stats.scheduled = self.stats.scheduled.saturating_add(1);

        debug!(queue_size = self.q.len(), "事件已加入队列");
        handle
    }

    /// 弹出并处理最早的事件。
    ///
    /// - 队列为空：返回 [`SchedulerError::EmptyQueue`]，时钟与队列不变；
    /// - 时钟推进到 `max(now, event.time)`（过去时刻的事件不会让时钟倒退）；
    /// - 已取消的事件直接返回，不执行 action；
    /// - 否则先标记 processed 再执行 action，action 的错误原样返回。
    pub fn step(&mut self) -> Result<Event<T>, SchedulerError> {
        let ScheduledEvent { seq, mut ev } = self.q.pop().ok_or(SchedulerError::EmptyQueue)?;
        if *ev.time() > self.now {
            self.now = ev.time().clone();
        }

        if ev.is_cancelled() {
            trace!(now = ?self.now, seq, remaining_queue = self.q.len(), "跳过已取消事件");
            self.record(seq, &ev, DispatchOutcome::Skipped);
            return Ok(ev);
        }

        ev.mark_processed();
        trace!(now = ?self.now, seq, remaining_queue = self.q.len(), "执行事件");
        match ev.fire(self) {
            Ok(()) => {
                self.record(seq, &ev, DispatchOutcome::Fired);
                Ok(ev)
            }
            Err(err) => {
                self.record(seq, &ev, DispatchOutcome::Failed);
                Err(SchedulerError::Action(err))
            }
        }
    }

    /// 运行所有事件直到队列为空，返回出队次数。遇到第一个 action 错误即停止。
    pub fn run(&mut self) -> Result<usize, SchedulerError> {
        debug!(now = ?self.now, queue_size = self.q.len(), "开始运行仿真");

        let mut popped = 0;
        while !self.q.is_empty() {
            self.step()?;
            popped += 1;
        }

        debug!(total_events = popped, final_time = ?self.now, "仿真完成");
        Ok(popped)
    }

    /// 下一个事件不晚于 `until` 时出队并处理；否则（含队列为空）返回 `None`，不推进时钟。
    pub fn step_until(&mut self, until: &T) -> Option<Result<Event<T>, SchedulerError>> {
        let ready = self.q.peek().is_some_and(|top| top.ev.time() <= until);
        if !ready {
            return None;
        }
        Some(self.step())
    }

    /// 运行直到事件队列为空或下一个事件晚于 `until`；结束后时钟至少推进到 `until`。
    /// action 出错时立即返回，时钟停在出错事件的时间。
    pub fn run_until(&mut self, until: T) -> Result<usize, SchedulerError> {
        let mut popped = 0;
        while let Some(res) = self.step_until(&until) {
            res?;
            popped += 1;
        }
        if until > self.now {
            self.now = until;
        }
        Ok(popped)
    }

    /// 每次出队前检查 `keep_going`，返回 `false` 或队列为空时停止。
    pub fn run_while<P>(&mut self, mut keep_going: P) -> Result<usize, SchedulerError>
    where
        P: FnMut(&Self) -> bool,
    {
        let mut popped = 0;
        while !self.q.is_empty() && keep_going(self) {
            self.step()?;
            popped += 1;
        }
        Ok(popped)
    }

    /// 下一个将要出队的事件
    pub fn peek(&self) -> Option<&Event<T>> {
        self.q.peek().map(|item| &item.ev)
    }

    pub fn next_event_time(&self) -> Option<&T> {
        self.peek().map(Event::time)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// 队列中尚未出队的事件，顺序不保证。
    pub fn event_queue(&self) -> impl Iterator<Item = &Event<T>> {
        self.q.iter().map(|item| &item.ev)
    }

    /// 取消所有满足条件的待处理事件，返回新取消的数量。事件仍留在队列中。
    pub fn cancel_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Event<T>) -> bool,
    {
        let mut cancelled = 0;
        for item in self.q.iter() {
            if !item.ev.is_cancelled() && predicate(&item.ev) && item.ev.cancel() {
                cancelled += 1;
            }
        }
        debug!(cancelled, queue_size = self.q.len(), "批量取消事件");
        cancelled
    }

    pub fn cancel_all(&mut self) -> usize {
        self.cancel_where(|_| true)
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// 开始记录出队轨迹（已开启时保留已有记录）。
    pub fn enable_log(&mut self) {
        self.log.get_or_insert_with(DispatchLog::default);
    }

    pub fn log(&self) -> Option<&DispatchLog<T>> {
        self.log.as_ref()
    }

    /// 取出轨迹并停止记录。
    pub fn take_log(&mut self) -> Option<DispatchLog<T>> {
        self.log.take()
    }

    fn record(&mut self, seq: u64, ev: &Event<T>, outcome: DispatchOutcome) {
        self.stats.record(outcome);
        if let Some(log) = self.log.as_mut() {
            log.push(DispatchRecord {
                t: ev.time().clone(),
                seq,
                outcome,
                context: ev.context().clone(),
            });
        }
    }
}

impl<T: Ord + Clone + Debug + Add<Output = T>> EventScheduler<T> {
    /// 在 `current_time + delay` 调度一个带 action 的事件。
    pub fn timeout<F>(&mut self, delay: T, context: Context, action: F) -> EventHandle<T>
    where
        F: FnMut(&mut EventScheduler<T>) -> ActionResult + Send + 'static,
    {
        let at = self.now.clone() + delay;
        self.schedule(Event::new(at).with_context(context).with_action(action))
    }
}
