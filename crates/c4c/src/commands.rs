use std::collections::BTreeSet;
use std::sync::Arc;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info, warn};

use c4c_core::api::{HttpMiningApi, MiningAction, MiningApi};
use c4c_core::config::CoinsConfig;
use c4c_core::errors::CoinsError;
use c4c_core::events;
use c4c_core::mining::{
    CollegeId, CollegeRow, Dashboard, Projection, SessionSnapshot, college_rows, displayed_total,
    project, session_yield_estimate,
};
use c4c_core::monitor::{MiningMonitor, MonitorConfig, MonitorView};
use c4c_core::push::WsPushConnector;
use c4c_core::viewer::{Role, Viewer};

use crate::table::TableFormatter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> CoinsConfig {
    match CoinsConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.c4c/config.toml and ./.c4c/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                error_code = e.error_code(),
                "Config load failed, using defaults"
            );
            CoinsConfig::default()
        }
    }
}

/// Build the viewer from `--token`/`--role`, falling back to env and config.
fn resolve_viewer(
    matches: &ArgMatches,
    config: &CoinsConfig,
) -> Result<Viewer, Box<dyn std::error::Error>> {
    let token = matches
        .get_one::<String>("token")
        .cloned()
        .or_else(|| config.token())
        .ok_or("No token: pass --token, set C4C_TOKEN or add [auth] token to the config")?;

    let role: Role = matches
        .get_one::<String>("role")
        .map_or(config.role(), String::as_str)
        .parse()?;

    let viewer = Viewer::new(token, role);
    if !viewer.is_eligible() {
        return Err(format!("Mining is only available to students (role: {role})").into());
    }
    Ok(viewer)
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

pub fn run_command(matches: &ArgMatches) -> CliResult {
    events::log_app_startup(matches.subcommand_name().unwrap_or_default());

    match matches.subcommand() {
        Some(("status", sub_matches)) => handle_status_command(sub_matches),
        Some(("watch", sub_matches)) => handle_watch_command(sub_matches),
        Some(("start", sub_matches)) => handle_action_command(MiningAction::Start, sub_matches),
        Some(("stop", sub_matches)) => handle_action_command(MiningAction::Stop, sub_matches),
        Some(("project", sub_matches)) => handle_project_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput<'a> {
    dashboard: &'a Dashboard,
    rows: &'a [CollegeRow],
}

fn handle_status_command(matches: &ArgMatches) -> CliResult {
    let json_output = matches.get_flag("json");
    let config = load_config_with_warning();
    let viewer = resolve_viewer(matches, &config)?;
    let api = HttpMiningApi::from_config(&config)?;

    info!(event = "cli.status_started", json_output = json_output);

    let dashboard = match runtime()?.block_on(api.fetch_dashboard(&viewer.token)) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("❌ Failed to fetch mining dashboard: {}", e);
            error!(
                event = "cli.status_failed",
                error = %e,
                error_code = e.error_code(),
            );
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    let rows = college_rows(&dashboard);
    if json_output {
        let output = StatusOutput {
            dashboard: &dashboard,
            rows: &rows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_rows(&rows);
    }

    info!(event = "cli.status_completed", colleges = rows.len());
    Ok(())
}

fn handle_action_command(action: MiningAction, matches: &ArgMatches) -> CliResult {
    let college = matches
        .get_one::<String>("college")
        .map(|id| CollegeId::new(id.trim()))
        .ok_or("College argument is required")?;
    let config = load_config_with_warning();
    let viewer = resolve_viewer(matches, &config)?;
    let api = HttpMiningApi::from_config(&config)?;
    let runtime = runtime()?;

    info!(event = "cli.action_started", action = %action, college = %college);

    match runtime.block_on(api.perform(action, &viewer.token, &college)) {
        Ok(outcome) => {
            let message = outcome
                .message
                .unwrap_or_else(|| format!("Mining {action} requested for college {college}"));
            println!("✅ {}", message);
            info!(event = "cli.action_completed", action = %action, college = %college);
        }
        Err(e) => {
            eprintln!("❌ Failed to {} mining for college {}: {}", action, college, e);
            error!(
                event = "cli.action_failed",
                action = %action,
                college = %college,
                error = %e,
                error_code = e.error_code(),
            );
            events::log_app_error(&e);
            return Err(e.into());
        }
    }

    // The action changed server state; show the result.
    match runtime.block_on(api.fetch_dashboard(&viewer.token)) {
        Ok(dashboard) => print_rows(&college_rows(&dashboard)),
        Err(e) => {
            eprintln!("Warning: Could not refresh the dashboard: {}", e);
            warn!(event = "cli.action_refresh_failed", error = %e);
        }
    }
    Ok(())
}

fn handle_watch_command(matches: &ArgMatches) -> CliResult {
    let mut config = load_config_with_warning();

    // Apply CLI overrides only if provided
    if let Some(interval) = matches.get_one::<u64>("interval") {
        config.sync.poll_interval_secs = Some(*interval);
    }
    if matches.get_flag("no-push") {
        config.push.enabled = Some(false);
    }

    let viewer = resolve_viewer(matches, &config)?;
    let api = Arc::new(HttpMiningApi::from_config(&config)?);
    let connector = WsPushConnector::from_config(&config);
    let monitor_config = MonitorConfig::from(&config);

    info!(
        event = "cli.watch_started",
        poll_interval_secs = monitor_config.poll_interval.as_secs(),
        push_enabled = monitor_config.push_enabled,
    );

    runtime()?.block_on(watch(api, connector, monitor_config, viewer))?;

    info!(event = "cli.watch_completed");
    Ok(())
}

async fn watch(
    api: Arc<HttpMiningApi>,
    connector: WsPushConnector,
    monitor_config: MonitorConfig,
    viewer: Viewer,
) -> CliResult {
    let handle = MiningMonitor::spawn(api, connector, monitor_config, Some(viewer));
    let mut views = handle.subscribe();
    let mut shown_notices = BTreeSet::new();

    println!("Watching mining sessions. Press Ctrl-C to exit.");
    let initial = views.borrow_and_update().clone();
    render_view(&initial, &mut shown_notices);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    warn!(event = "cli.watch.monitor_stopped");
                    break;
                }
                let view = views.borrow_and_update().clone();
                render_view(&view, &mut shown_notices);
            }
        }
    }

    events::log_app_shutdown();
    handle.shutdown().await;
    Ok(())
}

/// Print a view. Notices are printed once each, the first time they appear.
fn render_view(view: &MonitorView, shown_notices: &mut BTreeSet<u64>) {
    if view.loading {
        println!("Loading mining dashboard...");
    } else {
        let refreshed = view
            .last_refresh
            .map(|t| t.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!();
        println!(
            "Updated {} · live updates {}",
            refreshed, view.push_status
        );
        print_rows(&view.rows);
    }

    if !view.pending.is_empty() {
        let pending: Vec<String> = view.pending.iter().map(CollegeId::to_string).collect();
        println!("Pending: {}", pending.join(", "));
    }

    for notice in &view.notices {
        if shown_notices.insert(notice.id) {
            println!("[{}] {}", notice.level, notice.message);
        }
    }
}

fn print_rows(rows: &[CollegeRow]) {
    if rows.is_empty() {
        println!("No mining colleges found.");
    } else {
        TableFormatter::new(rows).print_table(rows);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOutput {
    #[serde(flatten)]
    projection: Projection,
    session_yield_estimate: f64,
    wallet_total: f64,
}

fn handle_project_command(matches: &ArgMatches) -> CliResult {
    let remaining = matches
        .get_one::<f64>("remaining")
        .copied()
        .ok_or("--remaining is required")?;
    let rate = matches.get_one::<f64>("rate").copied().unwrap_or(0.0);
    let tokens = matches.get_one::<f64>("tokens").copied().unwrap_or(0.0);
    let balance = matches.get_one::<f64>("balance").copied().unwrap_or(0.0);

    let snapshot = SessionSnapshot {
        college: CollegeId::new("local"),
        is_active: !matches.get_flag("inactive"),
        remaining_hours: remaining,
        earning_rate: rate,
        current_tokens: tokens,
    };

    let output = ProjectOutput {
        projection: project(&snapshot),
        session_yield_estimate: session_yield_estimate(&snapshot),
        wallet_total: displayed_total(balance, Some(&snapshot)),
    };

    info!(
        event = "cli.project_completed",
        progress_percent = output.projection.progress_percent,
        offline = output.projection.is_offline(),
    );

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Progress:      {:.1}%", output.projection.progress_percent);
        println!("Remaining:     {}", output.projection.remaining);
        println!("Session yield: {:.2} tokens", output.session_yield_estimate);
        println!("Wallet total:  {:.2}", output.wallet_total);
    }
    Ok(())
}
