//! Service lifecycle: startup, the two concurrent units, shutdown, report

use anyhow::{Context, Result};
use chrono::Local;
use parkgate_config::Settings;
use parkgate_core::{ParkState, SimulationParams};
use parkgate_ipc::{IpcServer, ReplySender};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use crate::clock::run_clock;
use crate::dispatcher::Dispatcher;
use crate::report::RunReport;

/// The one lock every read and write of park state goes through
pub type SharedState = Arc<Mutex<ParkState>>;

pub struct Controller {
    settings: Settings,
    state: SharedState,
    ipc: Arc<IpcServer>,
}

impl Controller {
    /// Set up park state and open the request pipe.
    ///
    /// `settings` must already be validated; nothing is opened otherwise.
    pub async fn new(settings: Settings) -> Result<Self> {
        let params = SimulationParams::from(&settings.simulation);
        let state = Arc::new(Mutex::new(ParkState::new(params)));

        let mut ipc = IpcServer::new(&settings.service.pipe_path);
        ipc.start().await.with_context(|| {
            format!(
                "Failed to open request pipe {:?}",
                settings.service.pipe_path
            )
        })?;

        Ok(Self {
            settings,
            state,
            ipc: Arc::new(ipc),
        })
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Run one simulated day.
    ///
    /// Ends when the clock finishes or `stop` resolves, whichever is first.
    pub async fn run<R, F>(self, replies: R, stop: F) -> Result<RunReport>
    where
        R: ReplySender + 'static,
        F: Future<Output = ()>,
    {
        let started_at = Local::now();

        let messages = self
            .ipc
            .take_message_receiver()
            .await
            .context("Message receiver already taken")?;

        let ipc_reader = self.ipc.clone();
        let reader = tokio::spawn(async move {
            if let Err(e) = ipc_reader.run().await {
                error!(error = %e, "IPC reader failed");
            }
        });

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut dispatcher = tokio::spawn(
            Dispatcher::new(self.state.clone(), replies).run(messages, shutdown_rx),
        );
        let mut clock = tokio::spawn(run_clock(
            self.state.clone(),
            self.settings.simulation.tick_interval,
        ));

        info!(
            tick = ?self.settings.simulation.tick_interval,
            pipe = %self.settings.service.pipe_path.display(),
            "Service running"
        );

        tokio::pin!(stop);
        let completed = tokio::select! {
            result = &mut clock => match result {
                Ok(()) => true,
                Err(e) => {
                    error!(error = %e, "Clock task failed");
                    false
                }
            },
            _ = &mut stop => {
                info!("Stopping before the day is over");
                clock.abort();
                false
            }
        };

        // The receiver lives in the dispatcher task, which may already be gone
        let _ = shutdown_tx.send(true);

        let grace = self.settings.service.grace_period;
        match tokio::time::timeout(grace, &mut dispatcher).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "Dispatcher task failed"),
            Err(_) => {
                warn!(?grace, "Dispatcher did not stop within grace period, aborting");
                dispatcher.abort();
            }
        }

        reader.abort();
        self.ipc.shutdown();

        let report = self.state.lock().await.report();

        Ok(RunReport {
            started_at,
            finished_at: Local::now(),
            completed,
            report,
        })
    }
}
