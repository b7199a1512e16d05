use crate::command::ExitCode;

/// Mutable state of an interpreter session that survives from one line to the next.
///
/// The environment contains:
/// - `last_status`: exit status of the last completed command, read by `and`/`or`.
/// - `commands_run`: number of completed commands, used to reject a conditional
///   on the very first line.
/// - `should_exit`: set by `exit`/`die`; the input loop stops and the process
///   terminates with this code.
///
/// Note: fields are public so embedders and tests can inspect or seed a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub last_status: ExitCode,
    pub commands_run: u64,
    pub should_exit: Option<ExitCode>,
}

impl Environment {
    /// A fresh session: status 0, nothing run yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a command that ran to completion.
    pub fn complete(&mut self, status: ExitCode) {
        self.last_status = status;
        self.commands_run += 1;
    }

    /// Ask the input loop to stop and the process to exit with `code`.
    pub fn request_exit(&mut self, code: ExitCode) {
        self.should_exit = Some(code);
    }
}
