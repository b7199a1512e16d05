use argh::FromArgs;
use mysh::{Config, InputSource, Interpreter};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A small command shell. Reads commands from SCRIPT, or from standard input
/// when no script is given.
struct ShellArgs {
    /// file of commands to run, one per line
    #[argh(positional)]
    script: Option<PathBuf>,

    /// log interpreter activity to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// longest argument list accepted after wildcard expansion
    #[argh(option)]
    max_args: Option<usize>,

    /// prompt shown in interactive mode
    #[argh(option)]
    prompt: Option<String>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let args: ShellArgs = argh::from_env();
    init_logging(args.verbose);

    let mut config = Config::default();
    if let Some(max_args) = args.max_args {
        config.max_args = max_args;
    }
    if let Some(prompt) = args.prompt {
        config.prompt = prompt;
    }

    let mut source = match InputSource::select(args.script.as_deref(), &config.prompt) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    let interactive = source.is_interactive();
    if interactive {
        println!("{}", config.banner);
    }
    let exit_message = config.exit_message.clone();

    let mut shell = Interpreter::new(config);
    match shell.run(&mut source) {
        Ok(Some(code)) => {
            debug!(code, "exit requested");
            process::exit(code);
        }
        Ok(None) => {
            if interactive {
                println!("{}", exit_message);
            }
        }
        Err(e) => {
            error!(error = %e, "input failed");
            eprintln!("mysh: {:#}", e);
            process::exit(1);
        }
    }
}
