use crate::command::ExitCode;
use crate::config::Config;
use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::external::{self, Stream};
use crate::parser::{self, CommandLine, Parsed};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::fs::File;
use std::io::{self, Write};
use std::os::fd::OwnedFd;
use std::process::Child;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

const PIPE_SYMBOL: char = '|';

/// Status recorded when the first stage fails; the second stage is killed.
pub const FIRST_STAGE_FAILED: ExitCode = 1;
/// Status recorded when only the second stage fails.
pub const SECOND_STAGE_FAILED: ExitCode = 2;
/// Exit status of a stage whose command cannot be found.
pub const NOT_A_COMMAND: ExitCode = 255;

/// Two commands, the first one's standard output feeding the second one's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub first: CommandLine,
    pub second: CommandLine,
}

/// Check if input contains a pipeline
pub fn is_pipeline(line: &str) -> bool {
    line.contains(PIPE_SYMBOL)
}

/// Split a line into exactly two trimmed, non-empty sides.
pub fn split_pipeline(line: &str) -> ShellResult<(&str, &str)> {
    let sides: Vec<&str> = line.split(PIPE_SYMBOL).map(str::trim).collect();
    match sides.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => Ok((first, second)),
        _ => Err(ShellError::MalformedPipeline),
    }
}

/// Parse both sides of a pipeline with the single-command front end.
///
/// Returns `Ok(None)` when a conditional on either side suppresses the line.
pub fn prepare(line: &str, env: &Environment, config: &Config) -> ShellResult<Option<Pipeline>> {
    let (first, second) = split_pipeline(line)?;

    let first = match parser::parse_command(first, env, config)? {
        Parsed::Command(cmd) => cmd,
        Parsed::Skipped => return Ok(None),
        Parsed::Empty => return Err(ShellError::MalformedPipeline),
    };
    let second = match parser::parse_command(second, env, config)? {
        Parsed::Command(cmd) => cmd,
        Parsed::Skipped => return Ok(None),
        Parsed::Empty => return Err(ShellError::MalformedPipeline),
    };

    Ok(Some(Pipeline { first, second }))
}

enum Stage {
    Running(Child),
    /// Never started; carries the status a failed child would have exited with.
    Failed(ExitCode),
}

impl Stage {
    fn wait(self) -> ShellResult<ExitCode> {
        match self {
            Stage::Running(mut child) => external::wait_for(&mut child),
            Stage::Failed(code) => Ok(code),
        }
    }

    fn kill(self) -> ShellResult<()> {
        if let Stage::Running(mut child) = self {
            if let Err(e) = child.kill() {
                warn!(pid = child.id(), error = %e, "failed to kill pipeline stage");
            }
            child.wait()?;
        }
        Ok(())
    }
}

/// Stop a stage on an error path, where only the first failure is reported.
fn abandon(stage: Stage) {
    if let Err(e) = stage.kill() {
        warn!(error = %e, "failed to reap pipeline stage");
    }
}

/// Stands in for a reader that never started, so the writer does not die of
/// SIGPIPE. Finishes once every write end is closed.
fn drain(read: OwnedFd) -> JoinHandle<io::Result<u64>> {
    thread::spawn(move || io::copy(&mut File::from(read), &mut io::sink()))
}

fn launch(
    cmd: &CommandLine,
    stdin: Stream,
    stdout: Stream,
    config: &Config,
    stderr: &mut dyn Write,
) -> ShellResult<Stage> {
    match external::spawn(&cmd.argv, &cmd.redirects, stdin, stdout, config) {
        Ok(child) => Ok(Stage::Running(child)),
        Err(ShellError::CommandNotFound(name)) => {
            writeln!(stderr, "{} is not a command.", name)?;
            Ok(Stage::Failed(NOT_A_COMMAND))
        }
        Err(e) => {
            writeln!(stderr, "{}", e)?;
            Ok(Stage::Failed(1))
        }
    }
}

/// Run both stages concurrently and sequence their completion.
///
/// Returns the pipeline's exit status: 0 when both stages succeed,
/// [`FIRST_STAGE_FAILED`] or [`SECOND_STAGE_FAILED`] otherwise. Errors are
/// reserved for failures of the interpreter itself (no pipe, broken stderr).
pub fn run(pipeline: &Pipeline, config: &Config, stderr: &mut dyn Write) -> ShellResult<ExitCode> {
    // Children must only see the ends dup'ed onto their stdio, or the reader
    // would never get EOF.
    let (read, write) = pipe2(OFlag::O_CLOEXEC)?;

    let first = launch(
        &pipeline.first,
        Stream::Inherit,
        Stream::Pipe(write),
        config,
        stderr,
    )?;

    let spare = match read.try_clone() {
        Ok(fd) => fd,
        Err(e) => {
            abandon(first);
            return Err(e.into());
        }
    };
    let second = match launch(
        &pipeline.second,
        Stream::Pipe(read),
        Stream::Inherit,
        config,
        stderr,
    ) {
        Ok(stage) => stage,
        Err(e) => {
            abandon(first);
            return Err(e);
        }
    };
    let drainer = match second {
        Stage::Failed(_) => Some(drain(spare)),
        Stage::Running(_) => {
            drop(spare);
            None
        }
    };
    debug!(first = ?pipeline.first.argv, second = ?pipeline.second.argv, "pipeline started");

    let first_status = match first.wait() {
        Ok(code) => code,
        Err(e) => {
            abandon(second);
            return Err(e);
        }
    };
    if let Some(drainer) = drainer {
        match drainer.join() {
            Ok(Ok(bytes)) => debug!(bytes, "discarded output of first stage"),
            Ok(Err(e)) => warn!(error = %e, "failed to drain pipe"),
            Err(_) => warn!("pipe drain thread panicked"),
        }
    }

    if first_status != 0 {
        writeln!(
            stderr,
            "Failed to run the first command in the pipeline: {}",
            first_status
        )?;
        second.kill()?;
        return Ok(FIRST_STAGE_FAILED);
    }

    let second_status = second.wait()?;
    if second_status != 0 {
        writeln!(
            stderr,
            "Failed to run the second command in the pipeline: {}",
            second_status
        )?;
        return Ok(SECOND_STAGE_FAILED);
    }

    Ok(0)
}
