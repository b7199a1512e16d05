use std::path::PathBuf;

/// Directories probed, in order, for commands given without a path separator.
pub const DEFAULT_SEARCH_DIRS: [&str; 3] = ["/usr/local/bin", "/usr/bin", "/bin"];

/// Upper bound on the length of a final argument vector.
pub const DEFAULT_MAX_ARGS: usize = 512;

/// Permission bits of files created by output redirection.
pub const DEFAULT_OUTPUT_MODE: u32 = 0o640;

/// Static settings of an interpreter session.
///
/// Everything here is fixed for the lifetime of the [`crate::Interpreter`];
/// per-line state lives in [`crate::env::Environment`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Ordered list of directories searched for unqualified commands.
    pub search_dirs: Vec<PathBuf>,
    /// Prompt shown before each interactive line.
    pub prompt: String,
    /// Greeting printed once when an interactive session starts.
    pub banner: String,
    /// Printed by `exit` and when interactive input runs out.
    pub exit_message: String,
    /// Longest argument vector accepted after wildcard expansion.
    pub max_args: usize,
    /// Mode used when `>` creates a file.
    pub output_mode: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(PathBuf::from).collect(),
            prompt: "mysh> ".to_string(),
            banner: "Welcome to my shell!".to_string(),
            exit_message: "mysh: exiting".to_string(),
            max_args: DEFAULT_MAX_ARGS,
            output_mode: DEFAULT_OUTPUT_MODE,
        }
    }
}
