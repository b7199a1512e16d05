use crate::command::ExitCode;
use crate::config::Config;
use crate::error::{ShellError, ShellResult};
use crate::parser::Redirections;
use nix::unistd::{AccessFlags, access};
use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Where a child's standard stream goes when the command line has no
/// redirection for it.
#[derive(Debug)]
pub enum Stream {
    /// Share the interpreter's own stream.
    Inherit,
    /// One end of a pipeline pipe.
    Pipe(OwnedFd),
}

impl From<Stream> for Stdio {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Inherit => Stdio::inherit(),
            Stream::Pipe(fd) => Stdio::from(fd),
        }
    }
}

/// Resolve a command name to the program that should be executed.
///
/// Behavior:
/// - A name containing `/` is used as given, without checking it exists.
/// - A bare name is looked up in each of `search_dirs`, in order; the first
///   executable regular file wins.
/// - Empty name, or no executable match: `None`.
pub fn find_command_path(search_dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        return Some(PathBuf::from(name));
    }

    let found = search_dirs
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate));
    debug!(name, ?found, "command lookup");
    found
}

/// An existing regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

/// Opens the file a `<` redirection names.
pub fn open_input(path: &str) -> ShellResult<File> {
    File::open(path).map_err(|source| ShellError::Redirect {
        path: path.to_string(),
        source,
    })
}

/// Opens (creating or truncating) the file a `>` redirection names.
pub fn open_output(path: &str, mode: u32) -> ShellResult<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .map_err(|source| ShellError::Redirect {
            path: path.to_string(),
            source,
        })
}

/// Spawn `argv` as a child process.
///
/// This is the one place processes are created. Explicit redirections take
/// precedence over the `stdin`/`stdout` defaults. The steps happen in the same
/// order a forked child would take them: open input, open output, resolve the
/// program, exec. The program receives `argv[0]` exactly as given, not the
/// resolved path.
pub fn spawn(
    argv: &[String],
    redirects: &Redirections,
    stdin: Stream,
    stdout: Stream,
    config: &Config,
) -> ShellResult<Child> {
    let Some(name) = argv.first() else {
        return Err(ShellError::CommandNotFound(String::new()));
    };

    let stdin: Stdio = match &redirects.input {
        Some(path) => open_input(path)?.into(),
        None => stdin.into(),
    };
    let stdout: Stdio = match &redirects.output {
        Some(path) => open_output(path, config.output_mode)?.into(),
        None => stdout.into(),
    };

    let program = find_command_path(&config.search_dirs, name)
        .ok_or_else(|| ShellError::CommandNotFound(name.clone()))?;

    // The Command owns the stdio handles; it is dropped on return, so the
    // parent keeps no copy of any pipe end.
    let child = Command::new(&program)
        .arg0(name)
        .args(&argv[1..])
        .stdin(stdin)
        .stdout(stdout)
        .spawn()
        .map_err(|source| ShellError::Exec {
            command: name.clone(),
            source,
        })?;
    info!(program = %program.display(), pid = child.id(), "spawned");
    Ok(child)
}

/// Block until `child` terminates and translate how it ended into an exit code.
pub fn wait_for(child: &mut Child) -> ShellResult<ExitCode> {
    let status = child.wait()?;
    let code = exit_code(status);
    debug!(pid = child.id(), code, "child finished");
    Ok(code)
}

pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    if let Some(signal) = exit_status.signal() {
        128 + signal
    } else if exit_status.core_dumped() {
        255
    } else {
        1
    }
}

/// Run a single external command with inherited streams and wait for it.
///
/// Failures that a forked child would hit (unreadable input file, unknown
/// command, exec failure) are returned as errors; the caller treats them as a
/// completed command with status 1.
pub fn run(argv: &[String], redirects: &Redirections, config: &Config) -> ShellResult<ExitCode> {
    let mut child = spawn(argv, redirects, Stream::Inherit, Stream::Inherit, config)?;
    wait_for(&mut child)
}
