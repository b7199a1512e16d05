use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::Path;
use tracing::{debug, info};

/// Where input lines come from.
pub enum InputSource {
    /// A terminal: prompt, line editing and history.
    Interactive { editor: DefaultEditor, prompt: String },
    /// A script file or piped standard input, read silently.
    Lines(Box<dyn BufRead>),
}

impl InputSource {
    /// Pick the source the way the shell is invoked: a script path wins, then a
    /// terminal on stdin means interactive use, anything else is piped input.
    pub fn select(script: Option<&Path>, prompt: &str) -> Result<Self> {
        match script {
            Some(path) => Self::batch(path),
            None if io::stdin().is_terminal() => Self::interactive(prompt),
            None => {
                debug!("reading commands from piped stdin");
                Ok(Self::from_reader(BufReader::new(io::stdin())))
            }
        }
    }

    pub fn interactive(prompt: &str) -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to create line editor")?;
        Ok(Self::Interactive {
            editor,
            prompt: prompt.to_string(),
        })
    }

    /// Open a script file.
    pub fn batch(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Error opening file {}", path.display()))?;
        info!(script = %path.display(), "running batch file");
        Ok(Self::from_reader(BufReader::new(file)))
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self::Lines(Box::new(reader))
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive { .. })
    }

    /// Next line without its line terminator, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        match self {
            Self::Interactive { editor, prompt } => loop {
                match editor.readline(prompt) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            editor.add_history_entry(line.as_str())?;
                        }
                        return Ok(Some(line));
                    }
                    // Ctrl-C drops the line being edited.
                    Err(ReadlineError::Interrupted) => continue,
                    Err(ReadlineError::Eof) => return Ok(None),
                    Err(err) => return Err(err).context("failed to read line"),
                }
            },
            Self::Lines(reader) => {
                let mut raw = Vec::new();
                if reader.read_until(b'\n', &mut raw).context("failed to read line")? == 0 {
                    return Ok(None);
                }
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                    if raw.last() == Some(&b'\r') {
                        raw.pop();
                    }
                }
                // Undecodable bytes must not end the session.
                Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(mut source: InputSource) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = source.next_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_lines_strip_terminators() {
        let source = InputSource::from_reader(Cursor::new("ls -l\r\n\npwd\nwhich ls"));
        assert!(!source.is_interactive());
        assert_eq!(collect(source), vec!["ls -l", "", "pwd", "which ls"]);
    }

    #[test]
    fn test_lines_keep_inner_whitespace() {
        let source = InputSource::from_reader(Cursor::new("  echo  a \n"));
        assert_eq!(collect(source), vec!["  echo  a "]);
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_reading() {
        let source = InputSource::from_reader(Cursor::new(b"true\necho \xff\nfalse\n".to_vec()));
        assert_eq!(collect(source), vec!["true", "echo \u{FFFD}", "false"]);
    }

    #[test]
    fn test_batch_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("script.sh");
        std::fs::write(&script, "echo one\necho two\n").unwrap();

        let source = InputSource::batch(&script).unwrap();
        assert_eq!(collect(source), vec!["echo one", "echo two"]);
    }

    #[test]
    fn test_batch_missing_file_errors() {
        let err = InputSource::batch(Path::new("/no/such/script"))
            .err()
            .expect("opening a missing script must fail");
        assert!(err.to_string().starts_with("Error opening file /no/such/script"));
    }

    #[test]
    fn test_select_prefers_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("s");
        std::fs::write(&script, "pwd\n").unwrap();

        let source = InputSource::select(Some(&script), "> ").unwrap();
        assert!(!source.is_interactive());
    }
}
