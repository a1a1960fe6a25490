//! 事件
//!
//! 一个事件 = 触发时间 + 上下文 + 可选 action + 状态标志。
//! 状态标志（processed/cancelled）通过 `Arc` 与 [`EventHandle`] 共享，
//! 因此事件被 `schedule` 移入队列后，调用方仍然可以取消或观察它。

use super::error::ActionResult;
use super::scheduler::EventScheduler;
use super::time::SimTime;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 事件上下文：调用方自定义的键值对，调度器不解释其内容。
pub type Context = Map<String, Value>;

/// 事件触发时执行的动作。可以通过 `&mut EventScheduler` 继续调度新事件。
pub type Action<T = SimTime> = Box<dyn FnMut(&mut EventScheduler<T>) -> ActionResult + Send>;

#[derive(Debug, Default)]
struct EventStatus {
    processed: AtomicBool,
    cancelled: AtomicBool,
}

impl EventStatus {
    /// 已触发的事件不能再被取消。返回本次调用是否真正改变了状态。
    fn cancel(&self) -> bool {
        if self.processed.load(Ordering::Acquire) {
            return false;
        }
        !self.cancelled.swap(true, Ordering::AcqRel)
    }
}

pub struct Event<T = SimTime> {
    time: T,
    context: Context,
    action: Option<Action<T>>,
    seq: Option<u64>,
    status: Arc<EventStatus>,
}

impl<T> Event<T> {
    /// 在 `time` 触发的空事件：无上下文、无 action。
    pub fn new(time: T) -> Self {
        Self {
            time,
            context: Context::new(),
            action: None,
            seq: None,
            status: Arc::default(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&mut EventScheduler<T>) -> ActionResult + Send + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// 调度序号；尚未被调度时为 `None`。
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    pub fn is_processed(&self) -> bool {
        self.status.processed.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.cancelled.load(Ordering::Acquire)
    }

    /// 取消事件：出队时跳过 action，但仍然出队并推进时钟。
    pub fn cancel(&self) -> bool {
        self.status.cancel()
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        self.seq = Some(seq);
    }

    pub(crate) fn mark_processed(&self) {
        self.status.processed.store(true, Ordering::Release);
    }

    /// 运行 action（若有）。调用前事件必须已经离开队列。
    pub(crate) fn fire(&mut self, sched: &mut EventScheduler<T>) -> ActionResult {
        match self.action.as_mut() {
            Some(action) => action(sched),
            None => Ok(()),
        }
    }
}

impl<T: Clone> Event<T> {
    /// 共享状态标志的句柄。`seq` 取自调用时刻：在 `schedule` 之前取得的句柄
    /// 永远是 `None`（取消/观察仍然有效），需要序号时使用 `schedule` 的返回值。
    pub fn handle(&self) -> EventHandle<T> {
        EventHandle {
            time: self.time.clone(),
            seq: self.seq,
            status: Arc::clone(&self.status),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("time", &self.time)
            .field("seq", &self.seq)
            .field("context", &self.context)
            .field("has_action", &self.action.is_some())
            .field("processed", &self.is_processed())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// 已调度事件的句柄，与事件共享状态标志。
#[derive(Debug, Clone)]
pub struct EventHandle<T = SimTime> {
    time: T,
    seq: Option<u64>,
    status: Arc<EventStatus>,
}

impl<T> EventHandle<T> {
    pub fn time(&self) -> &T {
        &self.time
    }

    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    pub fn is_processed(&self) -> bool {
        self.status.processed.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.cancelled.load(Ordering::Acquire)
    }

    /// 对已触发的事件无效果，返回 `false`。
    pub fn cancel(&self) -> bool {
        self.status.cancel()
    }
}
