use crate::builtin::BuiltinContext;
use crate::command::{Builtin, CommandKind, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::external;
use crate::input::InputSource;
use crate::lexer;
use crate::parser::{self, CommandLine, Parsed};
use crate::pipeline;
use std::io::{self, Write};
use tracing::{debug, warn};

/// A line-oriented command interpreter.
///
/// The interpreter owns the session [`Environment`] (last exit status, number of
/// commands run, pending exit request) and the writers used for builtin output
/// and diagnostics. Each call to [`Interpreter::execute_line`] fully processes
/// one line, waiting for any child process it starts.
///
/// Example
/// ```no_run
/// use mysh::{Config, Interpreter};
/// let mut sh = Interpreter::new(Config::default());
/// sh.execute_line("echo hello world");
/// assert_eq!(sh.last_status(), 0);
/// ```
pub struct Interpreter {
    env: Environment,
    config: Config,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter printing to the process's stdout and stderr.
    pub fn new(config: Config) -> Self {
        Self::with_output(config, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create an interpreter with custom writers for its own output.
    pub fn with_output(config: Config, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        Self {
            env: Environment::new(),
            config,
            stdout,
            stderr,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn last_status(&self) -> ExitCode {
        self.env.last_status
    }

    /// Exit code requested by `exit` or `die`, if any.
    pub fn exit_requested(&self) -> Option<ExitCode> {
        self.env.should_exit
    }

    /// Process one input line (without its trailing newline).
    ///
    /// Never fails: errors are reported on the error stream and reflected in
    /// the exit status, and the interpreter is ready for the next line.
    pub fn execute_line(&mut self, line: &str) {
        if lexer::is_comment(line) {
            return;
        }
        debug!(line, "executing");

        let result = if pipeline::is_pipeline(line) {
            self.execute_pipeline(line)
        } else {
            self.execute_command(line)
        };

        if let Err(e) = result {
            self.report(&e);
        }
    }

    /// Feed every line of `source` to the interpreter until it runs dry or a
    /// builtin asks to exit. Returns the requested exit code, if any.
    pub fn run(&mut self, source: &mut InputSource) -> anyhow::Result<Option<ExitCode>> {
        while let Some(line) = source.next_line()? {
            self.execute_line(&line);
            if let Some(code) = self.env.should_exit {
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    fn report(&mut self, error: &ShellError) {
        warn!(%error, "line aborted");
        if let Some(status) = error.status() {
            self.env.last_status = status;
        }
        if let Err(e) = writeln!(self.stderr, "{}", error) {
            warn!(error = %e, "failed to report error");
        }
    }

    fn execute_command(&mut self, line: &str) -> ShellResult<()> {
        let cmd = match parser::parse_command(line, &self.env, &self.config)? {
            Parsed::Command(cmd) => cmd,
            Parsed::Skipped => {
                debug!(line, "suppressed by conditional");
                return Ok(());
            }
            Parsed::Empty => return Ok(()),
        };

        let status = match CommandKind::classify(&cmd.argv[0]) {
            CommandKind::Builtin(builtin) => self.run_builtin(builtin, &cmd)?,
            CommandKind::External => self.run_external(&cmd)?,
        };

        // `exit` and `die` end the session instead of completing.
        if self.env.should_exit.is_none() {
            self.env.complete(status);
        } else {
            self.env.last_status = status;
        }
        debug!(status, commands_run = self.env.commands_run, "command finished");
        Ok(())
    }

    fn run_builtin(&mut self, builtin: Builtin, cmd: &CommandLine) -> ShellResult<ExitCode> {
        let mut redirected = match &cmd.redirects.output {
            Some(path) => match external::open_output(path, self.config.output_mode) {
                Ok(file) => Some(file),
                Err(e) => {
                    writeln!(self.stderr, "{}", e)?;
                    return Ok(1);
                }
            },
            None => None,
        };

        let stdout: &mut dyn Write = match redirected.as_mut() {
            Some(file) => file,
            None => &mut self.stdout,
        };
        let mut ctx = BuiltinContext {
            stdout,
            stderr: &mut self.stderr,
            env: &mut self.env,
            config: &self.config,
        };

        let status = builtin
            .run(&cmd.argv[1..], &mut ctx)
            .map_err(|e| ShellError::Io(io::Error::other(e)))?;
        ctx.stdout.flush()?;
        Ok(status)
    }

    fn run_external(&mut self, cmd: &CommandLine) -> ShellResult<ExitCode> {
        self.stdout.flush()?;
        match external::run(&cmd.argv, &cmd.redirects, &self.config) {
            Ok(status) => Ok(status),
            Err(e @ (ShellError::Redirect { .. }
            | ShellError::CommandNotFound(_)
            | ShellError::Exec { .. })) => {
                writeln!(self.stderr, "{}", e)?;
                Ok(1)
            }
            Err(e) => Err(e),
        }
    }

    fn execute_pipeline(&mut self, line: &str) -> ShellResult<()> {
        let Some(pipeline) = pipeline::prepare(line, &self.env, &self.config)? else {
            debug!(line, "pipeline suppressed by conditional");
            return Ok(());
        };

        self.stdout.flush()?;
        let status = pipeline::run(&pipeline, &self.config, &mut self.stderr)?;
        self.env.complete(status);
        debug!(status, commands_run = self.env.commands_run, "pipeline finished");
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
