//! 场景仿真
//!
//! 读取 scenario.json，调度其中的事件并运行，逐条打印出队轨迹。

use clap::Parser;
use desim_rs::sim::{
    EventScheduler, ScenarioError, ScenarioSpec, SchedulerError, SimTime, load_scenario,
};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "scenario-sim", about = "Run scenario.json on the desim-rs event scheduler")]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Run until this time (ticks); defaults to running until the queue is empty
    #[arg(long)]
    until: Option<u64>,

    /// Output dispatch trace as JSON
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// Keep stepping after an action fails instead of stopping
    #[arg(long)]
    keep_going: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("simulation stopped: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("serialize trace: {0}")]
    Trace(#[from] serde_json::Error),
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 与 `run` / `run_until` 相同的出队规则（`until` 的判断复用 `step_until`）；
/// 区别只在于 `keep_going` 时吞掉 action 错误继续运行。
fn drive(
    sched: &mut EventScheduler<SimTime>,
    until: Option<SimTime>,
    keep_going: bool,
) -> Result<(), SchedulerError> {
    loop {
        let next = match until {
            Some(u) => sched.step_until(&u),
            None if sched.is_empty() => None,
            None => Some(sched.step()),
        };
        let Some(res) = next else { break };
        match res {
            Ok(_) => {}
            Err(SchedulerError::Action(err)) if keep_going => {
                warn!(now = %sched.current_time(), %err, "action 失败，继续运行");
                eprintln!("action failed at t={}: {err}", sched.current_time());
            }
            Err(err) => return Err(err),
        }
    }
    if let Some(u) = until {
        // 队列中已没有 <= until 的事件，这里只推进时钟
        sched.run_until(u)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), RunError> {
    let spec = ScenarioSpec::from_path(&args.scenario)?;

    let mut sched = EventScheduler::<SimTime>::new();
    sched.enable_log();
    load_scenario(&spec, &mut sched);
    info!(events = sched.len(), "▶️  开始运行场景");

    let outcome = drive(&mut sched, args.until.map(SimTime), args.keep_going);

    if let Some(log) = sched.log() {
        for rec in log.iter() {
            println!(
                "event t={} seq={} outcome={} context={}",
                rec.t,
                rec.seq,
                rec.outcome.as_str(),
                Value::Object(rec.context.clone())
            );
        }
    }

    if let Some(path) = &args.trace_json {
        if let Some(log) = sched.log() {
            let raw = log.to_json_pretty()?;
            fs::write(path, raw).map_err(|source| RunError::Write {
                path: path.clone(),
                source,
            })?;
            eprintln!("wrote dispatch trace to {}", path.display());
        }
    }

    let stats = sched.stats();
    println!(
        "done now={} fired={} skipped={} failed={} pending={}",
        sched.current_time(),
        stats.fired,
        stats.skipped,
        stats.failed,
        sched.len()
    );
    info!(final_time = %sched.current_time(), popped = stats.popped(), "✅ 场景完成");

    outcome.map_err(RunError::from)
}

fn main() -> ExitCode {
    // 日志写到 stderr，stdout 只保留轨迹输出
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
