use crate::sim::Context;
use serde::{Deserialize, Serialize};

/// 一次出队的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// action 已执行（或没有 action）
    Fired,
    /// 事件已被取消，跳过 action
    Skipped,
    /// action 返回了错误
    Failed,
}

impl DispatchOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchOutcome::Fired => "fired",
            DispatchOutcome::Skipped => "skipped",
            DispatchOutcome::Failed => "failed",
        }
    }
}

/// 一条出队记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord<T> {
    /// 事件自身的时间。通常等于出队后的 `current_time`；
    /// 过去时刻的事件除外（时钟不倒退，`t` 会小于 `current_time`）
    pub t: T,
    pub seq: u64,
    pub outcome: DispatchOutcome,
    #[serde(default, skip_serializing_if = "Context::is_empty")]
    pub context: Context,
}

/// 一个简单的记录收集器（存内存，仿真结束后按需写 JSON 文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchLog<T> {
    pub records: Vec<DispatchRecord<T>>,
}

impl<T> Default for DispatchLog<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> DispatchLog<T> {
    pub fn push(&mut self, rec: DispatchRecord<T>) {
        self.records.push(rec);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DispatchRecord<T>> {
        self.records.iter()
    }
}

impl<T: Serialize> DispatchLog<T> {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// 调度计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub scheduled: u64,
    pub fired: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl DispatchStats {
    /// 出队总数
    pub fn popped(&self) -> u64 {
        self.fired
            .saturating_add(self.skipped)
            .saturating_add(self.failed)
    }

    pub(crate) fn record(&mut self, outcome: DispatchOutcome) {
        let slot = match outcome {
            DispatchOutcome::Fired => &mut self.fired,
            DispatchOutcome::Skipped => &mut self.skipped,
            DispatchOutcome::Failed => &mut self.failed,
        };
        *slot = slot.saturating_add(1);
    }
}
