//! 场景描述（scenario.json）
//!
//! 用 JSON 描述一组初始事件，供 `scenario_sim` 或测试直接加载到调度器。

use super::error::ActionResult;
use super::event::{Context, Event, EventHandle};
use super::scheduler::EventScheduler;
use super::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const SCENARIO_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// 缺省为 0，随后被版本检查拒绝
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub meta: Option<ScenarioMeta>,
    #[serde(default)]
    pub events: Vec<ScenarioEventSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// 一个初始事件（绝对时间）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEventSpec {
    pub time: u64,
    #[serde(default)]
    pub context: Context,
    /// 调度后立即取消：仍会出队并推进时钟，但不触发。
    #[serde(default)]
    pub cancelled: bool,
    /// action 以此消息失败
    #[serde(default)]
    pub fail: Option<String>,
    #[serde(default)]
    pub followups: Vec<FollowupSpec>,
}

/// 父事件触发时，相对当前时间 `delay` 调度的后续事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupSpec {
    pub delay: u64,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub fail: Option<String>,
    #[serde(default)]
    pub followups: Vec<FollowupSpec>,
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCENARIO_SCHEMA_VERSION {
            return Err(ScenarioError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}

/// 把场景中的初始事件按声明顺序调度到 `sched`，返回各事件的句柄。
pub fn load_scenario(
    spec: &ScenarioSpec,
    sched: &mut EventScheduler<SimTime>,
) -> Vec<EventHandle<SimTime>> {
    let handles: Vec<_> = spec
        .events
        .iter()
        .map(|ev| {
            let mut event = Event::new(SimTime::from(ev.time)).with_context(ev.context.clone());
            if ev.fail.is_some() || !ev.followups.is_empty() {
                let fail = ev.fail.clone();
                let followups = ev.followups.clone();
                event = event.with_action(move |s| fire_scripted(s, fail.as_deref(), &followups));
            }
            let handle = sched.schedule(event);
            if ev.cancelled {
                handle.cancel();
            }
            handle
        })
        .collect();

    debug!(
        name = ?spec.meta.as_ref().and_then(|m| m.name.as_deref()),
        events = handles.len(),
        "场景已加载"
    );
    handles
}

fn fire_scripted(
    sched: &mut EventScheduler<SimTime>,
    fail: Option<&str>,
    followups: &[FollowupSpec],
) -> ActionResult {
    for f in followups {
        let fail = f.fail.clone();
        let next = f.followups.clone();
        sched.timeout(SimTime(f.delay), f.context.clone(), move |s| {
            fire_scripted(s, fail.as_deref(), &next)
        });
    }
    match fail {
        Some(msg) => Err(msg.into()),
        None => Ok(()),
    }
}
