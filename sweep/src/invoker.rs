//! Simulator invocation
//!
//! One blocking call per run: the command goes to the simulator driver,
//! stdout and stderr come back merged and split into lines.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Output lines kept in a failure report
const FAILURE_TAIL_LINES: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running simulator: {0}")]
    Io(#[from] io::Error),

    #[error("`{command}` failed ({status}):\n{tail}")]
    Failed {
        command: String,
        status: String,
        tail: String,
    },

    #[error("no scripted output left for `{command}`")]
    ScriptExhausted { command: String },
}

/// Runs one simulator command and returns its merged output lines
pub trait SimulationInvoker {
    fn invoke(&mut self, command: &str) -> Result<Vec<String>, InvocationError>;
}

impl<T: SimulationInvoker + ?Sized> SimulationInvoker for &mut T {
    fn invoke(&mut self, command: &str) -> Result<Vec<String>, InvocationError> {
        (**self).invoke(command)
    }
}

/// External simulator executable and its fixed driver argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub program: PathBuf,
    pub driver_arg: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("../ns3"),
            driver_arg: "run".to_string(),
        }
    }
}

/// Spawns the real simulator process
pub struct ProcessInvoker {
    config: SimulatorConfig,
}

impl ProcessInvoker {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }
}

impl SimulationInvoker for ProcessInvoker {
    fn invoke(&mut self, command: &str) -> Result<Vec<String>, InvocationError> {
        // One pipe for both streams keeps their interleaving
        let (mut reader, writer) = io::pipe()?;

        let mut cmd = Command::new(&self.config.program);
        cmd.arg(&self.config.driver_arg)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let mut child = cmd.spawn().map_err(|source| InvocationError::Spawn {
            program: self.config.program.display().to_string(),
            source,
        })?;
        // Release our copies of the write end, otherwise the read never sees EOF
        drop(cmd);

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let status = child.wait()?;

        let lines = sim_output::split_lines(&raw);
        if !status.success() {
            let start = lines.len().saturating_sub(FAILURE_TAIL_LINES);
            return Err(InvocationError::Failed {
                command: command.to_string(),
                status: status.to_string(),
                tail: lines[start..].join("\n"),
            });
        }

        Ok(lines)
    }
}

/// Replays scripted outputs in order and records the commands it was given
#[derive(Debug, Default)]
pub struct ReplayInvoker {
    script: VecDeque<Result<Vec<String>, InvocationError>>,
    commands: Vec<String>,
}

impl ReplayInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// One scripted run per item, each a sequence of output lines
    pub fn from_outputs<I, L, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut replay = Self::new();
        for lines in outputs {
            replay.push_output(lines);
        }
        replay
    }

    pub fn push_output<L, S>(&mut self, lines: L) -> &mut Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .push_back(Ok(lines.into_iter().map(Into::into).collect()));
        self
    }

    /// Script a run that exits with an error status
    pub fn push_failure(&mut self, status: impl Into<String>) -> &mut Self {
        self.script.push_back(Err(InvocationError::Failed {
            command: String::new(),
            status: status.into(),
            tail: String::new(),
        }));
        self
    }

    /// Commands received so far, in call order
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SimulationInvoker for ReplayInvoker {
    fn invoke(&mut self, command: &str) -> Result<Vec<String>, InvocationError> {
        self.commands.push(command.to_string());
        match self.script.pop_front() {
            Some(Ok(lines)) => Ok(lines),
            Some(Err(InvocationError::Failed { status, tail, .. })) => Err(InvocationError::Failed {
                command: command.to_string(),
                status,
                tail,
            }),
            Some(Err(e)) => Err(e),
            None => Err(InvocationError::ScriptExhausted {
                command: command.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_in_order() {
        let mut replay = ReplayInvoker::from_outputs([vec!["X: 1.0"], vec!["X: 2.0", "Y: 3.0"]]);
        assert_eq!(replay.remaining(), 2);

        assert_eq!(replay.invoke("a").unwrap(), vec!["X: 1.0"]);
        assert_eq!(replay.invoke("b").unwrap(), vec!["X: 2.0", "Y: 3.0"]);
        assert!(matches!(
            replay.invoke("c"),
            Err(InvocationError::ScriptExhausted { .. })
        ));
        assert_eq!(replay.commands(), &["a", "b", "c"]);
    }

    #[test]
    fn test_replay_failure_carries_command() {
        let mut replay = ReplayInvoker::new();
        replay.push_failure("exit status: 1");

        match replay.invoke("lra-simulator --nodes=2") {
            Err(InvocationError::Failed { command, status, .. }) => {
                assert_eq!(command, "lra-simulator --nodes=2");
                assert_eq!(status, "exit status: 1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let mut invoker = ProcessInvoker::new(SimulatorConfig {
            program: PathBuf::from("/nonexistent/ns3-driver"),
            driver_arg: "run".to_string(),
        });
        assert!(matches!(
            invoker.invoke("lra-simulator"),
            Err(InvocationError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_output_merges_streams() {
        // sh -c '<script>' stands in for `<driver> run '<command>'`
        let mut invoker = ProcessInvoker::new(SimulatorConfig {
            program: PathBuf::from("sh"),
            driver_arg: "-c".to_string(),
        });
        let lines = invoker
            .invoke("echo 'Total packets: 1'; echo 'Failure: 2' 1>&2")
            .unwrap();
        assert_eq!(lines, vec!["Total packets: 1", "Failure: 2"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_error_status() {
        let mut invoker = ProcessInvoker::new(SimulatorConfig {
            program: PathBuf::from("sh"),
            driver_arg: "-c".to_string(),
        });
        match invoker.invoke("echo 'build failed'; exit 3") {
            Err(InvocationError::Failed { tail, .. }) => assert_eq!(tail, "build failed"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
