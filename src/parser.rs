use crate::config::Config;
use crate::env::Environment;
use crate::error::{ShellError, ShellResult};
use crate::expand;
use crate::lexer;

/// Leading token that gates a line on the previous exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conditional {
    /// `and`: run only if the previous command succeeded.
    And,
    /// `or`: run only if the previous command failed.
    Or,
}

impl Conditional {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "and" => Some(Conditional::And),
            "or" => Some(Conditional::Or),
            _ => None,
        }
    }

    /// Whether a line prefixed by this conditional runs after `last_status`.
    pub fn permits(self, last_status: i32) -> bool {
        match self {
            Conditional::And => last_status == 0,
            Conditional::Or => last_status != 0,
        }
    }
}

/// Kind of redirection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// Input redirection (`<`): reads standard input from a file.
    Input,
    /// Output redirection (`>`): writes standard output to a file, truncating it.
    Output,
}

impl RedirectKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(RedirectKind::Input),
            ">" => Some(RedirectKind::Output),
            _ => None,
        }
    }
}

/// Files a command's standard streams are redirected to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub input: Option<String>,
    pub output: Option<String>,
}

/// A single command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Never empty.
    pub argv: Vec<String>,
    pub redirects: Redirections,
}

/// Outcome of parsing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command(CommandLine),
    /// Suppressed by `and`/`or`.
    Skipped,
    /// Nothing left to run (blank line, lone redirection, ...).
    Empty,
}

/// Strips a leading `and`/`or`.
///
/// Returns `Ok(None)` when the conditional suppresses the line. A conditional on
/// the very first command of a session is an error.
pub fn resolve_conditional(
    mut tokens: Vec<String>,
    env: &Environment,
) -> ShellResult<Option<Vec<String>>> {
    let Some(conditional) = tokens.first().and_then(|t| Conditional::from_token(t)) else {
        return Ok(Some(tokens));
    };

    if env.commands_run == 0 {
        return Err(ShellError::ConditionalFirst);
    }
    if !conditional.permits(env.last_status) {
        return Ok(None);
    }

    tokens.remove(0);
    Ok(Some(tokens))
}

/// Pulls `< file` and `> file` out of `tokens`.
///
/// When an operator appears twice, the last file wins.
pub fn extract_redirections(tokens: Vec<String>) -> ShellResult<(Vec<String>, Redirections)> {
    let mut args = Vec::with_capacity(tokens.len());
    let mut redirects = Redirections::default();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        match RedirectKind::from_token(&token) {
            Some(RedirectKind::Input) => {
                redirects.input = Some(tokens.next().ok_or(ShellError::MissingInputFile)?);
            }
            Some(RedirectKind::Output) => {
                redirects.output = Some(tokens.next().ok_or(ShellError::MissingOutputFile)?);
            }
            None => args.push(token),
        }
    }

    Ok((args, redirects))
}

/// Runs the full single-command front end on `line`:
/// tokenize, resolve the conditional, extract redirections, expand wildcards.
pub fn parse_command(line: &str, env: &Environment, config: &Config) -> ShellResult<Parsed> {
    let tokens = lexer::split_into_tokens(line);
    if tokens.is_empty() {
        return Ok(Parsed::Empty);
    }

    let Some(tokens) = resolve_conditional(tokens, env)? else {
        return Ok(Parsed::Skipped);
    };

    let (args, redirects) = extract_redirections(tokens)?;
    if args.is_empty() {
        return Ok(Parsed::Empty);
    }

    let argv = expand::expand_args(args);
    if argv.len() > config.max_args {
        return Err(ShellError::TooManyArguments {
            limit: config.max_args,
        });
    }

    Ok(Parsed::Command(CommandLine { argv, redirects }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        lexer::split_into_tokens(line)
    }

    fn session(commands_run: u64, last_status: i32) -> Environment {
        Environment {
            last_status,
            commands_run,
            should_exit: None,
        }
    }

    #[test]
    fn test_conditional_rejected_on_first_command() {
        let env = session(0, 0);
        assert!(matches!(
            resolve_conditional(words("and ls"), &env),
            Err(ShellError::ConditionalFirst)
        ));
        assert!(matches!(
            resolve_conditional(words("or ls"), &env),
            Err(ShellError::ConditionalFirst)
        ));
    }

    #[test]
    fn test_and_follows_success() {
        assert_eq!(
            resolve_conditional(words("and ls -l"), &session(1, 0)).unwrap(),
            Some(words("ls -l"))
        );
        assert_eq!(resolve_conditional(words("and ls"), &session(1, 2)).unwrap(), None);
    }

    #[test]
    fn test_or_follows_failure() {
        assert_eq!(
            resolve_conditional(words("or ls"), &session(1, 1)).unwrap(),
            Some(words("ls"))
        );
        assert_eq!(resolve_conditional(words("or ls"), &session(1, 0)).unwrap(), None);
    }

    #[test]
    fn test_only_leading_conditional_is_consumed() {
        assert_eq!(
            resolve_conditional(words("and or ls"), &session(1, 0)).unwrap(),
            Some(words("or ls"))
        );
        // Not in first position: an ordinary argument.
        assert_eq!(
            resolve_conditional(words("echo and"), &session(0, 0)).unwrap(),
            Some(words("echo and"))
        );
    }

    #[test]
    fn test_extract_redirections() {
        let (args, redirects) = extract_redirections(words("sort < in.txt -r > out.txt")).unwrap();
        assert_eq!(args, words("sort -r"));
        assert_eq!(redirects.input.as_deref(), Some("in.txt"));
        assert_eq!(redirects.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_extract_last_redirection_wins() {
        let (args, redirects) = extract_redirections(words("echo hi > a > b")).unwrap();
        assert_eq!(args, words("echo hi"));
        assert_eq!(redirects.output.as_deref(), Some("b"));
        assert_eq!(redirects.input, None);
    }

    #[test]
    fn test_extract_missing_filename() {
        assert!(matches!(
            extract_redirections(words("cat <")),
            Err(ShellError::MissingInputFile)
        ));
        assert!(matches!(
            extract_redirections(words("echo hi >")),
            Err(ShellError::MissingOutputFile)
        ));
    }

    #[test]
    fn test_operator_consumes_next_token_verbatim() {
        // Whatever follows the operator is the filename, even another operator.
        let (args, redirects) = extract_redirections(words("cat < > x")).unwrap();
        assert_eq!(args, words("cat x"));
        assert_eq!(redirects.input.as_deref(), Some(">"));
    }

    #[test]
    fn test_parse_command_variants() {
        let config = Config::default();
        let env = session(1, 0);

        assert_eq!(parse_command("", &env, &config).unwrap(), Parsed::Empty);
        assert_eq!(parse_command("> out", &env, &config).unwrap(), Parsed::Empty);
        assert_eq!(parse_command("and", &env, &config).unwrap(), Parsed::Empty);
        assert_eq!(parse_command("or ls", &env, &config).unwrap(), Parsed::Skipped);

        let parsed = parse_command("and echo hi > out", &env, &config).unwrap();
        assert_eq!(
            parsed,
            Parsed::Command(CommandLine {
                argv: words("echo hi"),
                redirects: Redirections {
                    input: None,
                    output: Some("out".to_string()),
                },
            })
        );
    }

    #[test]
    fn test_parse_command_enforces_argument_limit() {
        let config = Config {
            max_args: 3,
            ..Config::default()
        };
        let env = session(0, 0);

        assert!(parse_command("echo a b", &env, &config).is_ok());
        assert!(matches!(
            parse_command("echo a b c", &env, &config),
            Err(ShellError::TooManyArguments { limit: 3 })
        ));
    }
}
