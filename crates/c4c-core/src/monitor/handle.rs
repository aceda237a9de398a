use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::mining::types::CollegeId;
use crate::monitor::errors::MonitorError;
use crate::monitor::types::{MiningCommand, MonitorView};
use crate::viewer::Viewer;

/// Caller side of a running [`MiningMonitor`](super::MiningMonitor).
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// stops the monitor once its command channel closes.
pub struct MonitorHandle {
    view_rx: watch::Receiver<MonitorView>,
    command_tx: mpsc::Sender<MiningCommand>,
    viewer_tx: watch::Sender<Option<Viewer>>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub(crate) fn new(
        view_rx: watch::Receiver<MonitorView>,
        command_tx: mpsc::Sender<MiningCommand>,
        viewer_tx: watch::Sender<Option<Viewer>>,
        shutdown: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            view_rx,
            command_tx,
            viewer_tx,
            shutdown,
            task,
        }
    }

    /// Latest published view.
    pub fn view(&self) -> MonitorView {
        self.view_rx.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<MonitorView> {
        self.view_rx.clone()
    }

    pub async fn start_mining(&self, college: CollegeId) -> Result<(), MonitorError> {
        self.send(MiningCommand::Start(college)).await
    }

    pub async fn stop_mining(&self, college: CollegeId) -> Result<(), MonitorError> {
        self.send(MiningCommand::Stop(college)).await
    }

    /// Poll now instead of waiting for the next tick.
    pub async fn refresh(&self) -> Result<(), MonitorError> {
        self.send(MiningCommand::Refresh).await
    }

    pub async fn dismiss_notice(&self, id: u64) -> Result<(), MonitorError> {
        self.send(MiningCommand::DismissNotice(id)).await
    }

    /// Switch to another viewer. Any change remounts: state is cleared and
    /// requests of the previous viewer are discarded.
    pub fn set_viewer(&self, viewer: Option<Viewer>) -> Result<(), MonitorError> {
        if self.viewer_tx.is_closed() {
            return Err(MonitorError::Stopped);
        }
        self.viewer_tx.send_if_modified(|current| {
            if *current == viewer {
                false
            } else {
                *current = viewer;
                true
            }
        });
        Ok(())
    }

    /// Stop the monitor and wait for it to release its resources.
    ///
    /// No view updates are published after this returns.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await
            && !e.is_cancelled()
        {
            warn!(event = "core.monitor.join_failed", error = %e);
        }
    }

    async fn send(&self, command: MiningCommand) -> Result<(), MonitorError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| MonitorError::Stopped)
    }
}
