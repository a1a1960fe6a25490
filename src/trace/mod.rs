//! 调度轨迹记录（用于离线分析/回放）
//!
//! 每次出队记录一条 [`DispatchRecord`]，可整体序列化为 JSON。

mod types;

pub use types::{DispatchLog, DispatchOutcome, DispatchRecord, DispatchStats};
