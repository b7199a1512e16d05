//! `mysh`: a small line-oriented command shell.
//!
//! Each input line is split on spaces, checked for a leading `and`/`or`
//! conditional, stripped of `<`/`>` redirections and wildcard-expanded before
//! it runs either as a builtin (`exit`, `die`, `cd`, `pwd`, `which`) or as an
//! external program found in `/usr/local/bin`, `/usr/bin` or `/bin`. A line
//! with a single `|` runs two programs connected by a pipe.
//!
//! The main entry point is [`Interpreter`], which processes lines from an
//! [`InputSource`] and keeps the session state in [`env::Environment`].

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
pub mod input;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod pipeline;

pub use config::Config;
pub use error::{ShellError, ShellResult};
pub use input::InputSource;
/// Just a convenient re-export of the command interpreter.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that read or change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
