use crate::cancel::CancelToken;
use crate::config::{ConfigError, MonkeyConfig};
use crate::generator::PrintableTextGenerator;
use crate::oracle::{Oracle, OracleError};
use crate::worker::{Worker, WorkerContext, WorkerOutcome};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// Errors that can abort a campaign.
///
/// Only configuration and environment failures surface here; rejected
/// candidates and cancellation resolve into a [`CampaignReport`].
#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("invalid campaign configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("oracle invocation failed: {0}")]
    Oracle(#[from] OracleError),
    #[error("failed to install signal handlers: {0}")]
    SignalSetup(#[source] io::Error),
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
    #[error("worker {worker} panicked")]
    WorkerPanic { worker: usize },
}

/// The accepted input one worker discovered, kept on disk for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub worker: usize,
    pub attempts: u64,
    pub source_path: PathBuf,
}

/// Outcome of a whole campaign. `winner` is `None` when cancellation
/// arrived before any success.
#[derive(Debug, Clone, Default)]
pub struct CampaignReport {
    pub winner: Option<Discovery>,
}

/// Runs N workers over isolated file namespaces until one of them finds an
/// accepted input, the process is told to stop, or the oracle fails.
///
/// Every worker is joined before `run` returns, whatever the outcome, so
/// no worker outlives the campaign.
pub struct Campaign<O> {
    config: MonkeyConfig,
    oracle: Arc<O>,
    cancel: CancelToken,
}

impl<O: Oracle + 'static> Campaign<O> {
    pub fn new(config: MonkeyConfig, oracle: O) -> Self {
        Self {
            config,
            oracle: Arc::new(oracle),
            cancel: CancelToken::new(),
        }
    }

    /// The campaign's stop signal. Setting it from outside (a signal
    /// handler, a test) stops every worker at its next loop iteration.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn run(&self) -> Result<CampaignReport, CampaignError> {
        self.config.validate()?;

        // OS termination requests share the workers' one-bit write path.
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, self.cancel.flag())
                .map_err(CampaignError::SignalSetup)?;
        }

        let jobs = self.config.campaign.jobs.max(1);
        log::info!(
            "starting campaign: {} worker(s), candidates up to {} bytes",
            jobs,
            self.config.campaign.max_candidate_size
        );

        let mut spawn_error = None;
        let mut handles = Vec::with_capacity(jobs);
        for ctx in self.worker_contexts(jobs) {
            let id = ctx.id;
            let worker = Worker::new(
                ctx,
                PrintableTextGenerator,
                Arc::clone(&self.oracle),
                self.cancel.clone(),
                self.config.campaign.max_candidate_size,
            );
            let spawned = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(source) => {
                    spawn_error = Some(CampaignError::Spawn { worker: id, source });
                    self.cancel.request_stop();
                    break;
                }
            }
        }

        // Join every worker unconditionally, even after a success or a
        // spawn failure: none may be left running past this point.
        let mut winner: Option<Discovery> = None;
        let mut fatal: Option<OracleError> = None;
        let mut panicked: Option<usize> = None;
        for (id, handle) in handles {
            match handle.join() {
                Ok(Ok(WorkerOutcome::Succeeded {
                    attempts,
                    source_path,
                })) => {
                    if winner.is_none() {
                        winner = Some(Discovery {
                            worker: id,
                            attempts,
                            source_path,
                        });
                    } else {
                        log::debug!("worker {id}: also succeeded, first discovery wins");
                    }
                }
                Ok(Ok(WorkerOutcome::Cancelled)) => {}
                Ok(Err(err)) => {
                    if fatal.is_none() {
                        fatal = Some(err);
                    }
                }
                Err(_) => {
                    log::error!("worker {id}: panicked");
                    if panicked.is_none() {
                        panicked = Some(id);
                    }
                }
            }
        }

        if let Some(discovery) = winner {
            return Ok(CampaignReport {
                winner: Some(discovery),
            });
        }
        if let Some(err) = spawn_error {
            return Err(err);
        }
        if let Some(err) = fatal {
            return Err(CampaignError::Oracle(err));
        }
        if let Some(worker) = panicked {
            return Err(CampaignError::WorkerPanic { worker });
        }
        Ok(CampaignReport::default())
    }

    fn worker_contexts(&self, jobs: usize) -> Vec<WorkerContext> {
        let oracle = &self.config.oracle;
        if jobs <= 1 {
            vec![WorkerContext::new(
                0,
                &oracle.work_dir,
                &oracle.source_file_name,
                &oracle.output_file_name,
            )]
        } else {
            (1..=jobs)
                .map(|id| {
                    WorkerContext::new(
                        id,
                        &oracle.work_dir,
                        &oracle.source_file_name,
                        &oracle.output_file_name,
                    )
                })
                .collect()
        }
    }
}
