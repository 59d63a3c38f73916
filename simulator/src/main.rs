use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use gdscore::notify::NotificationLog;
use generator::fixture::build_history_fixture;
use gui_bridge::bridge::{default_bind_address, BridgeState, GuiBridge};
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use views::{DashboardView, MonitorView, SystemView};
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod views;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Simulated gunshot detection dashboard engine")]
struct Args {
    /// Replay the dashboard on a virtual clock and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,
    /// Append the offline summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Mount the live views and serve them over HTTP until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.seed, args.duration_secs)
    };

    if args.offline {
        run_offline(&workflow_config, args.report.as_deref())?;
    }
    if args.serve {
        serve(workflow_config, args.bind)?;
    }

    Ok(())
}

fn run_offline(config: &WorkflowConfig, report_path: Option<&Path>) -> anyhow::Result<()> {
    let runner = Runner::new(config.clone());
    let result = runner.execute(Utc::now())?;
    let summary = result.summary();
    println!("Offline run -> {summary}");

    let Some(report_path) = report_path else {
        return Ok(());
    };
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(report_path)
        .with_context(|| format!("opening report {}", report_path.display()))?;
    writeln!(file, "seed={} {summary}", runner.config().seed)?;
    Ok(())
}

fn serve(config: WorkflowConfig, bind: SocketAddr) -> anyhow::Result<()> {
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for live views")?;

    runtime.block_on(async move {
        let notifications = Arc::new(NotificationLog::default());
        let mut dashboard = DashboardView::new(
            &config.settings,
            config.detection_probability,
            config.reset_policy,
            config.seed,
            notifications.clone(),
        );
        let mut monitor = MonitorView::new(&config.settings, config.seed.wrapping_add(100));
        let mut system = SystemView::new(config.seed.wrapping_add(200));
        dashboard.mount()?;
        monitor.mount()?;
        system.mount()?;

        let state = BridgeState {
            dashboard: dashboard.handle(),
            monitor: monitor.handle(),
            system: system.handle(),
            history: Arc::new(build_history_fixture(&config.history, Utc::now())),
            settings: Arc::new(RwLock::new(config.settings.clone())),
            notifications,
        };
        let bridge = GuiBridge::new(state);
        bridge.publish_status("Live views mounted (Ctrl+C to stop)...");
        let server = tokio::spawn(bridge.run(bind));

        signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
        info!("shutting down live views");
        server.abort();
        dashboard.unmount();
        monitor.unmount();
        system.unmount();
        Ok::<(), anyhow::Error>(())
    })
}
