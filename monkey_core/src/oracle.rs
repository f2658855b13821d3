use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Placeholder in the oracle command replaced by the candidate file path.
pub const SOURCE_PLACEHOLDER: &str = "{source}";
/// Placeholder in the oracle command replaced by the artifact path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Errors that halt the whole campaign.
///
/// Every variant means the environment is broken (missing compiler,
/// unwritable working directory), not that a candidate was bad; retrying
/// with different random input cannot help.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to persist candidate to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch oracle command [{command}]: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for oracle command [{command}]: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// The oracle's judgement of a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The command exited 0 and left its artifact behind.
    Accepted,
    /// The normal negative case; the worker keeps trying.
    Rejected,
}

/// Judges candidates by persisting them and running an external validation
/// command against the persisted file.
///
/// Implementations must be shareable across worker threads; each worker
/// passes its own path pair, so concurrent invocations never race on the
/// same files.
pub trait Oracle: Send + Sync {
    /// Persists `candidate` to `source_path` (overwriting any prior
    /// content), runs the validation command, and reports the verdict.
    fn invoke(
        &self,
        candidate: &[u8],
        source_path: &Path,
        output_path: &Path,
    ) -> Result<Verdict, OracleError>;
}

/// An `Oracle` that hands candidates to a compiler invocation.
pub struct CompilerOracle {
    command: Vec<String>,
    show_diagnostics: bool,
}

impl CompilerOracle {
    /// `command` is the argv template; every argument may contain the
    /// `{source}` and `{output}` placeholders. With `show_diagnostics` the
    /// child's stdout/stderr pass through instead of being discarded.
    pub fn new(command: Vec<String>, show_diagnostics: bool) -> Self {
        Self {
            command,
            show_diagnostics,
        }
    }

    fn render_argv(&self, source_path: &Path, output_path: &Path) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| {
                arg.replace(SOURCE_PLACEHOLDER, &source_path.to_string_lossy())
                    .replace(OUTPUT_PLACEHOLDER, &output_path.to_string_lossy())
            })
            .collect()
    }
}

impl Oracle for CompilerOracle {
    fn invoke(
        &self,
        candidate: &[u8],
        source_path: &Path,
        output_path: &Path,
    ) -> Result<Verdict, OracleError> {
        fs::write(source_path, candidate).map_err(|source| OracleError::Persist {
            path: source_path.to_path_buf(),
            source,
        })?;

        let argv = self.render_argv(source_path, output_path);
        let mut cmd = Command::new(&argv[0]);
        if argv.len() > 1 {
            cmd.args(&argv[1..]);
        }
        if self.show_diagnostics {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd.spawn().map_err(|source| OracleError::Launch {
            command: argv.join(" "),
            source,
        })?;
        let status = child.wait().map_err(|source| OracleError::Wait {
            command: argv.join(" "),
            source,
        })?;

        // Exit status alone is not trusted: the command can exit 0 without
        // producing the artifact (an empty input, for instance).
        if status.success() && output_path.exists() {
            Ok(Verdict::Accepted)
        } else {
            Ok(Verdict::Rejected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_paths(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
        (dir.path().join("_test.c"), dir.path().join("_a.out"))
    }

    fn shell_oracle(script: &str) -> CompilerOracle {
        CompilerOracle::new(
            vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()],
            false,
        )
    }

    #[test]
    fn accepts_when_command_succeeds_and_artifact_exists() {
        let dir = tempfile::tempdir().unwrap();
        let (source, output) = scratch_paths(&dir);
        let oracle = shell_oracle("cp \"{source}\" \"{output}\"");

        let verdict = oracle.invoke(b"int main(){}", &source, &output).unwrap();
        assert_eq!(verdict, Verdict::Accepted);
        assert_eq!(fs::read(&source).unwrap(), b"int main(){}");
        assert!(output.exists());
    }

    #[test]
    fn rejects_on_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let (source, output) = scratch_paths(&dir);
        let oracle = shell_oracle("exit 1");

        let verdict = oracle.invoke(b"garbage", &source, &output).unwrap();
        assert_eq!(verdict, Verdict::Rejected);
        assert!(!output.exists());
    }

    #[test]
    fn rejects_zero_exit_without_artifact() {
        // The false-positive guard: exiting 0 is not enough on its own.
        let dir = tempfile::tempdir().unwrap();
        let (source, output) = scratch_paths(&dir);
        let oracle = shell_oracle("true");

        let verdict = oracle.invoke(b"", &source, &output).unwrap();
        assert_eq!(verdict, Verdict::Rejected);
    }

    #[test]
    fn launch_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (source, output) = scratch_paths(&dir);
        let oracle = CompilerOracle::new(
            vec!["./this_command_does_not_exist_ever_12345".to_string()],
            false,
        );

        match oracle.invoke(b"x", &source, &output) {
            Err(OracleError::Launch { .. }) => {}
            other => panic!("expected a launch failure, got {other:?}"),
        }
    }

    #[test]
    fn candidate_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let (source, output) = scratch_paths(&dir);
        let oracle = shell_oracle("true");

        oracle.invoke(b"first candidate", &source, &output).unwrap();
        oracle.invoke(b"second", &source, &output).unwrap();
        assert_eq!(fs::read(&source).unwrap(), b"second");
    }
}
