use crate::cancel::CancelToken;
use crate::generator::CandidateGenerator;
use crate::oracle::{Oracle, OracleError, Verdict};
use crate::seed::derive_seed;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity and file namespace of one worker.
///
/// Worker 0 is the sole worker of a single-worker campaign and keeps the
/// bare file names; workers 1..=N prefix their index so concurrent
/// invocations never touch the same files.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub id: usize,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

impl WorkerContext {
    pub fn new(id: usize, work_dir: &Path, source_file_name: &str, output_file_name: &str) -> Self {
        Self {
            id,
            source_path: work_dir.join(prefixed(id, source_file_name)),
            output_path: work_dir.join(prefixed(id, output_file_name)),
        }
    }
}

fn prefixed(id: usize, base: &str) -> String {
    if id == 0 {
        base.to_string()
    } else {
        format!("_{id}{base}")
    }
}

/// Terminal state of a worker. A worker that starts reaches exactly one of
/// these; fatal oracle failures are propagated as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The oracle accepted a candidate. The discovered input stays on disk
    /// at `source_path` for inspection.
    Succeeded { attempts: u64, source_path: PathBuf },
    /// The stop signal was observed before any candidate was accepted.
    Cancelled,
}

/// One generate/validate loop over an isolated file namespace.
///
/// All state besides the shared [`CancelToken`] is worker-local: the
/// random generator is seeded independently at construction and the
/// attempt counter starts at 1.
pub struct Worker<G, O> {
    ctx: WorkerContext,
    generator: G,
    oracle: Arc<O>,
    rng: ChaCha8Rng,
    cancel: CancelToken,
    max_candidate_size: usize,
    attempt: u64,
}

impl<G, O> Worker<G, O>
where
    G: CandidateGenerator<ChaCha8Rng>,
    O: Oracle,
{
    pub fn new(
        ctx: WorkerContext,
        generator: G,
        oracle: Arc<O>,
        cancel: CancelToken,
        max_candidate_size: usize,
    ) -> Self {
        Self {
            ctx,
            generator,
            oracle,
            rng: ChaCha8Rng::seed_from_u64(derive_seed()),
            cancel,
            max_candidate_size,
            attempt: 1,
        }
    }

    /// Runs until a candidate is accepted, the stop signal is observed, or
    /// the oracle fails fatally. Fatal failures request a campaign-wide
    /// stop before propagating.
    pub fn run(mut self) -> Result<WorkerOutcome, OracleError> {
        loop {
            if self.cancel.stop_requested() {
                log::debug!(
                    "worker {}: stop observed after {} attempts",
                    self.ctx.id,
                    self.attempt - 1
                );
                return Ok(WorkerOutcome::Cancelled);
            }

            let candidate = self.generator.generate(self.max_candidate_size, &mut self.rng);
            log::info!(
                "worker {}: attempt {} ({} bytes)",
                self.ctx.id,
                self.attempt,
                candidate.len()
            );

            match self
                .oracle
                .invoke(&candidate, &self.ctx.source_path, &self.ctx.output_path)
            {
                Ok(Verdict::Accepted) => {
                    log::info!(
                        "worker {}: candidate accepted on attempt {}",
                        self.ctx.id,
                        self.attempt
                    );
                    // Let the siblings wind down; the campaign has its
                    // discovery.
                    self.cancel.request_stop();
                    return Ok(WorkerOutcome::Succeeded {
                        attempts: self.attempt,
                        source_path: self.ctx.source_path,
                    });
                }
                Ok(Verdict::Rejected) => {
                    log::debug!("worker {}: rejected", self.ctx.id);
                    self.attempt += 1;
                }
                Err(err) => {
                    log::error!("worker {}: fatal oracle failure: {err}", self.ctx.id);
                    self.cancel.request_stop();
                    return Err(err);
                }
            }
        }
    }
}
