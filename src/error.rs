use crate::command::ExitCode;
use std::io;
use thiserror::Error;

/// Everything that can abort a single input line.
///
/// None of these ever terminate the interpreter; the line is dropped and the
/// status reported by [`ShellError::status`] (if any) becomes the new exit status.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Error: conditional commands cannot be the first command")]
    ConditionalFirst,

    #[error("Error: no input file specified")]
    MissingInputFile,

    #[error("Error: no output file specified")]
    MissingOutputFile,

    #[error("Error: pipe requires two commands")]
    MalformedPipeline,

    #[error("Error: too many arguments (limit is {limit})")]
    TooManyArguments { limit: usize },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("pipe: {0}")]
    Pipe(#[from] nix::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Exit status implied by the error, `None` when the previous one is kept.
    pub fn status(&self) -> Option<ExitCode> {
        match self {
            ShellError::ConditionalFirst => None,
            _ => Some(1),
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
