/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, like POSIX shells do.
pub type ExitCode = i32;

/// Commands implemented inside the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Die,
    Cd,
    Pwd,
    Which,
}

impl Builtin {
    /// Every builtin, in the order `which` documents them.
    pub const ALL: [Builtin; 5] = [
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Which,
        Builtin::Exit,
        Builtin::Die,
    ];

    /// Canonical name of the command, e.g. "cd" or "which".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Die => "die",
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Which => "which",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// What the first word of a fully expanded argument vector refers to.
///
/// Resolved once per line, the dispatcher then matches on it instead of
/// comparing strings again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Builtin(Builtin),
    External,
}

impl CommandKind {
    pub fn classify(name: &str) -> Self {
        match Builtin::from_name(name) {
            Some(builtin) => CommandKind::Builtin(builtin),
            None => CommandKind::External,
        }
    }
}
