use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::errors::ApiError;
use crate::api::traits::{ActionOutcome, MiningAction, MiningApi};
use crate::errors::CoinsError;
use crate::mining::types::{CollegeId, Dashboard};
use crate::monitor::handle::MonitorHandle;
use crate::monitor::types::{MiningCommand, MonitorConfig, MonitorView, PushStatus};
use crate::push::connection::PushConnector;
use crate::push::messages::PushEvent;
use crate::sync::notices::{NoticeLevel, Notices};
use crate::sync::store::{DashboardStore, PollTicket};
use crate::viewer::Viewer;

/// Notice slot shared by all push connection problems.
const PUSH_NOTICE: &str = "push";

pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Result of a background request.
enum TaskResult {
    Poll {
        ticket: PollTicket,
        result: Result<Dashboard, ApiError>,
    },
    Action {
        action: MiningAction,
        college: CollegeId,
        result: Result<ActionOutcome, ApiError>,
    },
}

struct Subscription {
    events: mpsc::Receiver<PushEvent>,
    cancel: CancellationToken,
}

/// Owns the dashboard state of one viewer and keeps it in sync.
///
/// Runs as a single task. Poll fetches and start/stop requests run as child
/// tasks so push events keep flowing while a request is in flight; all state
/// merges happen on the monitor task itself.
pub struct MiningMonitor<A, P> {
    api: Arc<A>,
    connector: P,
    config: MonitorConfig,
    store: DashboardStore,
    notices: Notices,
    push_status: PushStatus,
    viewer: Option<Viewer>,
    pending: BTreeSet<CollegeId>,
    view_tx: watch::Sender<MonitorView>,
}

impl<A: MiningApi, P: PushConnector> MiningMonitor<A, P> {
    /// Start monitoring on the current tokio runtime.
    pub fn spawn(
        api: Arc<A>,
        connector: P,
        config: MonitorConfig,
        viewer: Option<Viewer>,
    ) -> MonitorHandle {
        let (view_tx, view_rx) = watch::channel(MonitorView::default());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (viewer_tx, viewer_rx) = watch::channel(viewer);
        let shutdown = CancellationToken::new();

        let monitor = Self {
            api,
            connector,
            config,
            store: DashboardStore::new(),
            notices: Notices::new(),
            push_status: PushStatus::Disabled,
            viewer: None,
            pending: BTreeSet::new(),
            view_tx,
        };

        let task = tokio::spawn(monitor.run(viewer_rx, command_rx, shutdown.clone()));
        MonitorHandle::new(view_rx, command_tx, viewer_tx, shutdown, task)
    }

    async fn run(
        mut self,
        mut viewer_rx: watch::Receiver<Option<Viewer>>,
        mut commands: mpsc::Receiver<MiningCommand>,
        shutdown: CancellationToken,
    ) {
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let mut subscription: Option<Subscription> = None;
        let mut ticker = poll_ticker(self.config.poll_interval);

        let viewer = viewer_rx.borrow_and_update().clone();
        self.mount(viewer, &mut tasks, &mut subscription, &mut ticker);
        self.publish();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                changed = viewer_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let viewer = viewer_rx.borrow_and_update().clone();
                    self.unmount(&mut tasks, &mut subscription);
                    self.mount(viewer, &mut tasks, &mut subscription, &mut ticker);
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut tasks),
                    None => break,
                },
                Some(joined) = tasks.join_next() => self.handle_task(joined, &mut tasks),
                event = next_push(&mut subscription) => self.handle_push(event, &mut subscription),
                _ = ticker.tick(), if self.viewer.is_some() => self.issue_poll(&mut tasks),
            }
            self.publish();
        }

        self.unmount(&mut tasks, &mut subscription);
        info!(event = "core.monitor.stopped");
    }

    /// Begin a fresh mount for `viewer`: empty state, new push subscription
    /// and an immediate first poll.
    fn mount(
        &mut self,
        viewer: Option<Viewer>,
        tasks: &mut JoinSet<TaskResult>,
        subscription: &mut Option<Subscription>,
        ticker: &mut Interval,
    ) {
        self.store.reset();
        self.pending.clear();
        self.viewer = viewer.filter(Viewer::is_eligible);

        let Some(viewer) = &self.viewer else {
            self.push_status = PushStatus::Disabled;
            info!(event = "core.monitor.viewer_ineligible");
            return;
        };

        *ticker = poll_ticker(self.config.poll_interval);

        if self.config.push_enabled {
            let cancel = CancellationToken::new();
            let events = self.connector.subscribe(viewer.token.clone(), cancel.clone());
            *subscription = Some(Subscription { events, cancel });
            self.push_status = PushStatus::Connecting;
        } else {
            self.push_status = PushStatus::Disabled;
        }

        info!(
            event = "core.monitor.mounted",
            role = %viewer.role,
            push_enabled = self.config.push_enabled,
            poll_interval_secs = self.config.poll_interval.as_secs(),
        );

        // Issued before any push event can arrive, so it never overwrites one.
        self.issue_poll(tasks);
    }

    /// Drop in-flight requests, release the push subscription and forget
    /// the outgoing viewer's notices.
    fn unmount(
        &mut self,
        tasks: &mut JoinSet<TaskResult>,
        subscription: &mut Option<Subscription>,
    ) {
        // Dropping the set aborts its tasks and discards finished results.
        *tasks = JoinSet::new();
        if let Some(subscription) = subscription.take() {
            subscription.cancel.cancel();
        }
        self.notices.clear();
        debug!(event = "core.monitor.unmounted");
    }

    fn handle_command(&mut self, command: MiningCommand, tasks: &mut JoinSet<TaskResult>) {
        match command {
            MiningCommand::Start(college) => {
                self.issue_action(MiningAction::Start, college, tasks)
            }
            MiningCommand::Stop(college) => self.issue_action(MiningAction::Stop, college, tasks),
            MiningCommand::Refresh => self.issue_poll(tasks),
            MiningCommand::DismissNotice(id) => {
                self.notices.dismiss(id);
            }
        }
    }

    fn issue_poll(&mut self, tasks: &mut JoinSet<TaskResult>) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        let token = viewer.token.clone();
        let ticket = self.store.begin_poll();
        let api = Arc::clone(&self.api);

        debug!(event = "core.monitor.poll_issued", ticket = ticket.seq());
        tasks.spawn(async move {
            let result = api.fetch_dashboard(&token).await;
            TaskResult::Poll { ticket, result }
        });
    }

    fn issue_action(
        &mut self,
        action: MiningAction,
        college: CollegeId,
        tasks: &mut JoinSet<TaskResult>,
    ) {
        let Some(viewer) = &self.viewer else {
            self.notices.push(
                NoticeLevel::Error,
                format!("Cannot {action} mining: sign in as a student first"),
            );
            return;
        };
        let token = viewer.token.clone();

        if !self.pending.insert(college.clone()) {
            debug!(
                event = "core.monitor.action_skipped",
                action = %action,
                college = %college,
                reason = "request already in flight",
            );
            return;
        }

        let api = Arc::clone(&self.api);
        tasks.spawn(async move {
            let result = api.perform(action, &token, &college).await;
            TaskResult::Action {
                action,
                college,
                result,
            }
        });
    }

    fn handle_task(
        &mut self,
        joined: Result<TaskResult, JoinError>,
        tasks: &mut JoinSet<TaskResult>,
    ) {
        let finished = match joined {
            Ok(finished) => finished,
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                error!(event = "core.monitor.task_failed", error = %e);
                return;
            }
        };

        match finished {
            TaskResult::Poll {
                ticket,
                result: Ok(dashboard),
            } => {
                let outcome = self.store.apply_poll(ticket, dashboard);
                debug!(
                    event = "core.monitor.poll_completed",
                    ticket = ticket.seq(),
                    outcome = ?outcome,
                );
            }
            TaskResult::Poll {
                ticket,
                result: Err(e),
            } => {
                // Retried on the next tick.
                warn!(
                    event = "core.monitor.poll_failed",
                    ticket = ticket.seq(),
                    error = %e,
                    error_code = e.error_code(),
                );
            }
            TaskResult::Action {
                action,
                college,
                result,
            } => {
                self.pending.remove(&college);
                let name = self.college_name(&college);
                match result {
                    Ok(outcome) => {
                        info!(
                            event = "core.monitor.action_completed",
                            action = %action,
                            college = %college,
                        );
                        let done = match action {
                            MiningAction::Start => "started",
                            MiningAction::Stop => "stopped",
                        };
                        self.notices.push(
                            NoticeLevel::Info,
                            outcome
                                .message
                                .unwrap_or_else(|| format!("Mining {done} for {name}")),
                        );
                        self.issue_poll(tasks);
                    }
                    Err(e) => {
                        warn!(
                            event = "core.monitor.action_failed",
                            action = %action,
                            college = %college,
                            error = %e,
                        );
                        self.notices.push(
                            NoticeLevel::Error,
                            format!("Failed to {action} mining for {name}: {e}"),
                        );
                    }
                }
            }
        }
    }

    fn handle_push(&mut self, event: Option<PushEvent>, subscription: &mut Option<Subscription>) {
        match event {
            None => {
                subscription.take();
                self.push_status = PushStatus::Disconnected;
                self.notices.set_keyed(
                    PUSH_NOTICE,
                    NoticeLevel::Warning,
                    "Live mining updates are unavailable; refreshing periodically",
                );
                warn!(event = "core.monitor.push_closed");
            }
            Some(PushEvent::Connected) => {
                self.push_status = PushStatus::Connected;
                self.notices.clear_key(PUSH_NOTICE);
            }
            Some(PushEvent::Disconnected { reason }) => {
                self.push_status = PushStatus::Disconnected;
                debug!(event = "core.monitor.push_disconnected", reason = reason);
                self.notices.set_keyed(
                    PUSH_NOTICE,
                    NoticeLevel::Warning,
                    "Live mining updates disconnected; reconnecting",
                );
            }
            Some(PushEvent::ConnectError { message }) => {
                self.push_status = PushStatus::Disconnected;
                self.notices.set_keyed(
                    PUSH_NOTICE,
                    NoticeLevel::Warning,
                    format!("Could not connect to live mining updates: {message}"),
                );
            }
            Some(PushEvent::Error { message }) => {
                warn!(event = "core.monitor.push_error", message = message);
                self.notices.set_keyed(
                    PUSH_NOTICE,
                    NoticeLevel::Warning,
                    format!("Live mining updates error: {message}"),
                );
            }
            Some(PushEvent::MiningStatus(update)) => {
                self.store.apply_push(update);
            }
        }
    }

    fn college_name(&self, college: &CollegeId) -> String {
        self.store
            .dashboard()
            .and_then(|d| d.mining_colleges.iter().find(|c| &c.id == college))
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| college.to_string())
    }

    fn view(&self) -> MonitorView {
        MonitorView {
            viewer_eligible: self.viewer.is_some(),
            loading: self.viewer.is_some() && self.store.is_loading(),
            dashboard: self.store.dashboard().cloned(),
            rows: self.store.rows(),
            push_status: self.push_status,
            notices: self.notices.to_vec(),
            pending: self.pending.iter().cloned().collect(),
            last_refresh: self.store.last_refresh(),
        }
    }

    fn publish(&self) {
        let view = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

/// Interval whose first tick is one period away; mounting polls directly.
fn poll_ticker(period: Duration) -> Interval {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Next event of the current subscription; pending forever without one.
async fn next_push(subscription: &mut Option<Subscription>) -> Option<PushEvent> {
    match subscription {
        Some(subscription) => subscription.events.recv().await,
        None => std::future::pending().await,
    }
}
