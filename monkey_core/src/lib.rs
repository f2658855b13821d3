pub mod campaign;
pub mod cancel;
pub mod config;
pub mod generator;
pub mod oracle;
pub mod seed;
pub mod worker;

pub use campaign::{Campaign, CampaignError, CampaignReport, Discovery};
pub use cancel::CancelToken;
pub use config::{ConfigError, MonkeyConfig};
pub use generator::{CandidateGenerator, PrintableTextGenerator};
pub use oracle::{CompilerOracle, Oracle, OracleError, Verdict};
pub use seed::{derive_seed, mix};
pub use worker::{Worker, WorkerContext, WorkerOutcome};
