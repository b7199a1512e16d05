use crate::command::{Builtin, CommandKind, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::external::{find_command_path, is_executable};
use anyhow::{Context, Result, bail};
use std::env;
use std::io::Write;

/// Streams and session state a builtin runs against.
pub(crate) struct BuiltinContext<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub env: &'a mut Environment,
    pub config: &'a Config,
}

impl Builtin {
    /// Executes the builtin with `args` (the words after the command name).
    ///
    /// Errors are reported on the error stream and turn into status 1, so the
    /// return value always follows shell conventions.
    pub(crate) fn run(self, args: &[String], ctx: &mut BuiltinContext<'_>) -> Result<ExitCode> {
        match self.execute(args, ctx) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(ctx.stderr, "{:#}", e)?;
                Ok(1)
            }
        }
    }

    fn execute(self, args: &[String], ctx: &mut BuiltinContext<'_>) -> Result<ExitCode> {
        match self {
            Builtin::Exit => exit(ctx),
            Builtin::Die => die(args, ctx),
            Builtin::Cd => cd(args),
            Builtin::Pwd => pwd(ctx.stdout),
            Builtin::Which => which(args, ctx),
        }
    }
}

/// Print the farewell and ask the session to end successfully.
fn exit(ctx: &mut BuiltinContext<'_>) -> Result<ExitCode> {
    writeln!(ctx.stdout, "{}", ctx.config.exit_message)?;
    ctx.env.request_exit(0);
    Ok(0)
}

/// Print the arguments as a last word and ask the session to end with failure.
fn die(args: &[String], ctx: &mut BuiltinContext<'_>) -> Result<ExitCode> {
    writeln!(ctx.stderr, "{}", args.join(" "))?;
    writeln!(ctx.stderr, "mysh: terminating with failure")?;
    ctx.env.request_exit(1);
    Ok(1)
}

/// Change the current working directory of the interpreter and its future children.
fn cd(args: &[String]) -> Result<ExitCode> {
    let [target] = args else {
        bail!("cd: expects one argument");
    };
    env::set_current_dir(target).with_context(|| format!("cd: {}", target))?;
    Ok(0)
}

/// Print the current working directory.
fn pwd(stdout: &mut dyn Write) -> Result<ExitCode> {
    let cwd = env::current_dir().context("pwd")?;
    writeln!(stdout, "{}", cwd.display())?;
    Ok(0)
}

/// Tell whether a name is a builtin, or which program it resolves to.
fn which(args: &[String], ctx: &mut BuiltinContext<'_>) -> Result<ExitCode> {
    let [name] = args else {
        bail!("which: expects one argument");
    };

    if let CommandKind::Builtin(_) = CommandKind::classify(name) {
        writeln!(ctx.stderr, "{}: shell built-in", name)?;
        return Ok(0);
    }

    // A name with a separator skips the search; it must still name a program.
    match find_command_path(&ctx.config.search_dirs, name).filter(|path| is_executable(path)) {
        Some(path) => {
            writeln!(ctx.stdout, "{}", path.display())?;
            Ok(0)
        }
        None => {
            writeln!(ctx.stderr, "{}: not found", name)?;
            Ok(1)
        }
    }
}
