//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的核心组件：仿真时间、事件、调度器以及场景描述。

// 子模块声明
mod error;
mod event;
mod scenario;
mod scheduled_event;
mod scheduler;
mod time;

// 重新导出公共接口
pub use error::{ActionError, ActionResult, SchedulerError};
pub use event::{Action, Context, Event, EventHandle};
pub use scenario::{
    FollowupSpec, SCENARIO_SCHEMA_VERSION, ScenarioError, ScenarioEventSpec, ScenarioMeta,
    ScenarioSpec, load_scenario,
};
pub use scheduler::EventScheduler;
pub use time::SimTime;
