//! 调度器错误类型

use thiserror::Error;

/// 事件 action 返回的任意错误；调度器原样透传，不做包装。
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// action 的返回值
pub type ActionResult = Result<(), ActionError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// 对空队列调用 `step()`：有意的 fail-fast，而不是返回哨兵值。
    #[error("event queue is empty")]
    EmptyQueue,
    /// 被触发事件的 action 失败。事件已出队、时钟已推进。
    #[error(transparent)]
    Action(ActionError),
}

impl SchedulerError {
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, SchedulerError::EmptyQueue)
    }
}
