//! 仿真时间类型
//!
//! 逻辑时钟的默认标量：与墙钟无关，只由事件推进。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// 仿真时间（逻辑 tick）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// 当前时间之后 `delay` 个 tick，溢出时饱和。
    pub fn after(self, delay: u64) -> SimTime {
        SimTime(self.0.saturating_add(delay))
    }

    pub fn ticks(self) -> u64 {
        self.0
    }
}

// 饱和加法：`timeout` 依赖 `Add`，溢出不应 panic。
impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        self.after(rhs.0)
    }
}

impl From<u64> for SimTime {
    fn from(ticks: u64) -> Self {
        SimTime(ticks)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
