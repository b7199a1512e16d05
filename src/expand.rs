//! Wildcard expansion of arguments containing `*`.
//!
//! Only the first `*` of a token is a wildcard, and only in the last path
//! component. A token that names an unreadable directory, or matches nothing,
//! is passed through literally.

use std::fs;
use std::path::Path;
use tracing::debug;

const WILDCARD: char = '*';

/// A wildcard token split around its first `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern<'a> {
    /// Directory part, without the trailing separator. `None` for bare names.
    pub directory: Option<&'a str>,
    pub prefix: &'a str,
    pub suffix: &'a str,
}

impl<'a> Pattern<'a> {
    /// Returns `None` when `token` has no wildcard in its last component.
    pub fn parse(token: &'a str) -> Option<Self> {
        let (directory, base) = match token.rfind('/') {
            Some(idx) => (Some(&token[..idx]), &token[idx + 1..]),
            None => (None, token),
        };
        let (prefix, suffix) = base.split_once(WILDCARD)?;
        Some(Self {
            directory,
            prefix,
            suffix,
        })
    }

    /// Hidden entries never match, even with an empty prefix.
    pub fn matches(&self, name: &str) -> bool {
        !name.starts_with('.')
            && name.starts_with(self.prefix)
            && name.len() >= self.suffix.len()
            && name.ends_with(self.suffix)
    }

    fn search_dir(&self) -> &'a str {
        match self.directory {
            None => ".",
            Some("") => "/",
            Some(dir) => dir,
        }
    }

    fn join(&self, name: &str) -> String {
        match self.directory {
            None => name.to_string(),
            Some(dir) => format!("{}/{}", dir, name),
        }
    }
}

/// Expands one token into the entries it matches, in directory order.
///
/// Always returns at least one element: the token itself when it has no
/// wildcard, the directory cannot be listed, or nothing matches.
pub fn expand_token(token: &str) -> Vec<String> {
    let Some(pattern) = Pattern::parse(token) else {
        return vec![token.to_string()];
    };

    let entries = match fs::read_dir(Path::new(pattern.search_dir())) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(token, error = %e, "wildcard directory not readable");
            return vec![token.to_string()];
        }
    };

    let matches: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| pattern.matches(name))
        .map(|name| pattern.join(&name))
        .collect();

    if matches.is_empty() {
        debug!(token, "wildcard matched nothing");
        vec![token.to_string()]
    } else {
        matches
    }
}

/// Expands every argument, keeping the relative order of the arguments.
pub fn expand_args(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .flat_map(|arg| {
            if arg.contains(WILDCARD) {
                expand_token(&arg)
            } else {
                vec![arg]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::fs::File;
    use tempfile::TempDir;

    fn scratch_dir(names: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in names {
            File::create(dir.path().join(name)).expect("touch");
        }
        dir
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_pattern_parse() {
        let p = Pattern::parse("src/*.rs").unwrap();
        assert_eq!(p.directory, Some("src"));
        assert_eq!(p.prefix, "");
        assert_eq!(p.suffix, ".rs");

        let p = Pattern::parse("foo*bar*baz").unwrap();
        assert_eq!(p.directory, None);
        assert_eq!(p.prefix, "foo");
        assert_eq!(p.suffix, "bar*baz");

        assert_eq!(Pattern::parse("plain"), None);
        // A star in a directory component is not a wildcard.
        assert_eq!(Pattern::parse("a*/b"), None);
    }

    #[test]
    fn test_pattern_matches() {
        let p = Pattern::parse("*.txt").unwrap();
        assert!(p.matches("a.txt"));
        assert!(!p.matches(".hidden.txt"));
        assert!(!p.matches("a.txt.bak"));
        assert!(!p.matches("txt"));

        // Prefix and suffix may overlap in the name.
        let p = Pattern::parse("ab*ba").unwrap();
        assert!(p.matches("aba"));
    }

    #[test]
    fn test_no_wildcard_is_identity() {
        let args: Vec<String> = ["ls", "-l", "/tmp", "x>y"].map(String::from).to_vec();
        assert_eq!(expand_args(args.clone()), args);
    }

    #[test]
    fn test_expands_with_directory() {
        let dir = scratch_dir(&["a.txt", "b.txt", "c.log", ".h.txt"]);
        let base = dir.path().to_string_lossy().to_string();

        let got = sorted(expand_token(&format!("{}/*.txt", base)));
        assert_eq!(got, vec![format!("{}/a.txt", base), format!("{}/b.txt", base)]);
    }

    #[test]
    fn test_prefix_and_suffix() {
        let dir = scratch_dir(&["test_one.rs", "test_two.rs", "test_three.md", "main.rs"]);
        let base = dir.path().to_string_lossy().to_string();

        let got = sorted(expand_token(&format!("{}/test_*.rs", base)));
        assert_eq!(
            got,
            vec![format!("{}/test_one.rs", base), format!("{}/test_two.rs", base)]
        );
    }

    #[test]
    fn test_no_match_returns_literal() {
        let dir = scratch_dir(&["a.txt"]);
        let token = format!("{}/nomatch*zzz", dir.path().to_string_lossy());
        assert_eq!(expand_token(&token), vec![token]);
    }

    #[test]
    fn test_unreadable_directory_returns_literal() {
        let token = "/definitely/not/a/dir/*.c";
        assert_eq!(expand_token(token), vec![token.to_string()]);
    }

    #[test]
    fn test_hidden_files_never_match() {
        let dir = scratch_dir(&[".secret", ".config"]);
        let token = format!("{}/*", dir.path().to_string_lossy());
        assert_eq!(expand_token(&token), vec![token]);
    }

    #[test]
    fn test_expansion_keeps_argument_order() {
        let dir = scratch_dir(&["only.c"]);
        let base = dir.path().to_string_lossy().to_string();

        let args = vec![
            "cc".to_string(),
            format!("{}/*.c", base),
            "-o".to_string(),
            "out".to_string(),
        ];
        assert_eq!(
            expand_args(args),
            vec![
                "cc".to_string(),
                format!("{}/only.c", base),
                "-o".to_string(),
                "out".to_string()
            ]
        );
    }

    #[test]
    fn test_wildcard_in_root_directory() {
        let p = Pattern::parse("/us*").unwrap();
        assert_eq!(p.directory, Some(""));
        assert_eq!(p.prefix, "us");

        let got = expand_token("/us*");
        assert!(got.contains(&"/usr".to_string()), "got {:?}", got);
        assert!(got.iter().all(|name| name.starts_with("/us")));
    }

    #[test]
    fn test_relative_token_yields_bare_names() {
        let _lock = lock_current_dir();
        let dir = scratch_dir(&["one.md", "two.md", "three.txt"]);
        let orig = std::env::current_dir().unwrap();

        std::env::set_current_dir(dir.path()).unwrap();
        let got = sorted(expand_token("*.md"));
        std::env::set_current_dir(orig).unwrap();

        assert_eq!(got, vec!["one.md".to_string(), "two.md".to_string()]);
    }
}
