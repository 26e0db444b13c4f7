//! Command templates for automatic judging.
//!
//! A template is a command line that may mention placeholders:
//!
//! - `{}` or `{file}`: path of a file holding lines 1 through the candidate
//! - `{line}`: the candidate line itself
//!
//! A template with no placeholder at all gets the file path appended as a
//! trailing argument.
//!
//! Templates run either directly (argv) or through a shell. Shell rendering
//! quotes `{line}` so line content can never be read as shell syntax.

const FILE_PLACEHOLDERS: [&str; 2] = ["{}", "{file}"];
const LINE_PLACEHOLDER: &str = "{line}";

/// Keywords and builtins that only mean something to a shell when they start a command.
const SHELL_KEYWORDS: &[&str] = &[
    "!", "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done", "case",
    "esac", "function", "{", "}", "[[", "]]", "time", "exec", "export", "cd", "source", ".",
    "exit", "set", "unset", "eval", "read", "alias", "ulimit", "umask", "trap", "shift",
    "return", "wait",
];

/// Render `template` into a single shell command string.
///
/// `{line}` is substituted first, single-quoted; `{}` and `{file}` are then
/// replaced with `file_path` verbatim.
pub fn render(template: &str, file_path: &str, line_content: &str) -> String {
    if !has_placeholder(template) {
        return format!("{} {}", template, file_path);
    }

    let mut command = template.replace(LINE_PLACEHOLDER, &shell_quote(line_content));
    for placeholder in FILE_PLACEHOLDERS {
        command = command.replace(placeholder, file_path);
    }
    command
}

/// Whether the raw template text mentions any placeholder.
fn has_placeholder(template: &str) -> bool {
    template.contains(LINE_PLACEHOLDER) || FILE_PLACEHOLDERS.iter().any(|p| template.contains(p))
}

/// Quote `value` as one POSIX shell word.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// How a template should be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Spawn `argv[0]` with the remaining words as arguments.
    Direct(Vec<String>),
    /// Hand the string to a shell interpreter.
    Shell(String),
}

/// A parsed command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    /// `None` when the template needs a shell.
    words: Option<Vec<String>>,
    appends_path: bool,
}

impl CommandTemplate {
    pub fn parse(source: &str) -> Self {
        let words = if needs_shell(source) {
            None
        } else {
            split_words(source).filter(|w| !w.is_empty())
        };
        Self {
            source: source.to_string(),
            words,
            appends_path: !has_placeholder(source),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn requires_shell(&self) -> bool {
        self.words.is_none()
    }

    /// Shell rendering; also what gets shown in logs.
    pub fn render(&self, file_path: &str, line_content: &str) -> String {
        render(&self.source, file_path, line_content)
    }

    /// Resolve the template for one step.
    pub fn invocation(&self, file_path: &str, line_content: &str, force_shell: bool) -> Invocation {
        match &self.words {
            Some(words) if !force_shell => {
                Invocation::Direct(substitute_words(
                    words,
                    self.appends_path,
                    file_path,
                    line_content,
                ))
            }
            _ => Invocation::Shell(self.render(file_path, line_content)),
        }
    }
}

/// `appends_path` comes from the raw template, the same rule [`render`] uses.
fn substitute_words(
    words: &[String],
    appends_path: bool,
    file_path: &str,
    line_content: &str,
) -> Vec<String> {
    if appends_path {
        let mut argv = words.to_vec();
        argv.push(file_path.to_string());
        return argv;
    }
    words
        .iter()
        .map(|word| expand_word(word, file_path, line_content))
        .collect()
}

/// Single left-to-right pass, so substituted text is never expanded again.
fn expand_word(word: &str, file_path: &str, line_content: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut rest = word;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(LINE_PLACEHOLDER) {
            out.push_str(line_content);
            rest = after;
        } else if let Some(after) = FILE_PLACEHOLDERS
            .iter()
            .find_map(|p| tail.strip_prefix(p))
        {
            out.push_str(file_path);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Whether `template` uses syntax only a shell understands.
///
/// Placeholders are ignored; quoted text is ignored.
pub fn needs_shell(template: &str) -> bool {
    let mut stripped = template.replace(LINE_PLACEHOLDER, "x");
    for placeholder in FILE_PLACEHOLDERS {
        stripped = stripped.replace(placeholder, "x");
    }

    if has_unquoted_metachar(&stripped) {
        return true;
    }

    match split_words(&stripped).and_then(|words| words.into_iter().next()) {
        Some(first) => SHELL_KEYWORDS.contains(&first.as_str()) || is_assignment(&first),
        // Unbalanced quotes: let the shell report it.
        None => true,
    }
}

fn has_unquoted_metachar(s: &str) -> bool {
    let mut chars = s.chars();
    let mut in_single = false;
    let mut in_double = false;
    let mut at_word_start = true;

    while let Some(c) = chars.next() {
        if in_single {
            if c == '\'' {
                in_single = false;
            }
            continue;
        }
        if in_double {
            match c {
                '"' => in_double = false,
                '\\' => {
                    chars.next();
                }
                // Expansions still happen inside double quotes.
                '$' | '`' => return true,
                _ => {}
            }
            continue;
        }
        match c {
            '\'' => in_single = true,
            '"' => in_double = true,
            // Escaped braces are left to the shell to unescape.
            '\\' => {
                if matches!(chars.next(), Some('{' | '}')) {
                    return true;
                }
            }
            '|' | '&' | ';' | '<' | '>' | '(' | ')' | '$' | '`' | '*' | '?' | '[' | ']' | '\n' => {
                return true
            }
            '#' | '~' if at_word_start => return true,
            _ => {}
        }
        at_word_start = c.is_whitespace();
    }
    false
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

/// Split on unquoted whitespace, honouring single quotes, double quotes and
/// backslash escapes. Returns `None` for unbalanced quotes.
pub fn split_words(s: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '\'' => break,
                        other => current.push(other),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => match chars.next()? {
                            escaped @ ('"' | '\\' | '$' | '`') => current.push(escaped),
                            '\n' => {}
                            other => {
                                current.push('\\');
                                current.push(other);
                            }
                        },
                        other => current.push(other),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some('\n') => {}
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_placeholder_appends_path_once() {
        let first = render("./check.sh", "/tmp/x.txt", "ignored");
        let second = render("./check.sh", "/tmp/x.txt", "ignored");
        assert_eq!(first, "./check.sh /tmp/x.txt");
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_placeholders_replaced_everywhere() {
        assert_eq!(
            render("diff {} {file} {}", "/tmp/p", "l"),
            "diff /tmp/p /tmp/p /tmp/p"
        );
    }

    #[test]
    fn test_line_placeholder_is_quoted() {
        assert_eq!(render("echo {line}", "/tmp/p", "it's bad"), r#"echo 'it'\''s bad'"#);
    }

    #[test]
    fn test_line_quoting_blocks_injection() {
        let rendered = render("grep -q {line} {file}", "/tmp/p", "$(rm -rf /); `id` | x");
        assert_eq!(
            rendered,
            "grep -q '$(rm -rf /); `id` | x' /tmp/p"
        );
    }

    #[test]
    fn test_line_content_that_looks_like_a_placeholder_stays_literal_in_argv() {
        let template = CommandTemplate::parse("check {line} {file}");
        assert_eq!(
            template.invocation("/tmp/p", "{file}", false),
            Invocation::Direct(vec![
                "check".to_string(),
                "{file}".to_string(),
                "/tmp/p".to_string()
            ])
        );
    }

    #[test]
    fn test_line_only_template_does_not_append_path() {
        assert_eq!(render("test {line}", "/tmp/p", "x"), "test 'x'");
    }

    #[test]
    fn test_shell_quote_empty() {
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_needs_shell_detection() {
        assert!(!needs_shell("./check.sh"));
        assert!(!needs_shell("grep -q 'a | b' {file}"));
        assert!(!needs_shell("test {line} != bad"));
        assert!(!needs_shell("cmd --opt=value {}"));
        assert!(needs_shell("grep -q bad {} && exit 1"));
        assert!(needs_shell("cat {file} | wc -l"));
        assert!(needs_shell("echo x > out.txt"));
        assert!(needs_shell("echo \"$HOME\""));
        assert!(needs_shell("! grep -q bad {}"));
        assert!(needs_shell("FOO=1 ./run {}"));
        assert!(needs_shell("ls *.txt"));
        assert!(needs_shell("cat ~/file"));
        assert!(needs_shell("echo 'unterminated"));
        assert!(needs_shell("exit 7"));
        assert!(needs_shell(r"echo \{\}"));
    }

    #[test]
    fn test_split_words_quotes_and_escapes() {
        assert_eq!(
            split_words(r#"a 'b c' "d \"e\"" f\ g ''"#).unwrap(),
            vec!["a", "b c", "d \"e\"", "f g", ""]
        );
        assert!(split_words("'open").is_none());
        assert!(split_words("").unwrap().is_empty());
    }

    #[test]
    fn test_direct_invocation_substitutes_raw_line() {
        let template = CommandTemplate::parse("./judge.sh --line {line} --file={file}");
        assert!(!template.requires_shell());
        assert_eq!(
            template.invocation("/tmp/p", "it's bad", false),
            Invocation::Direct(vec![
                "./judge.sh".to_string(),
                "--line".to_string(),
                "it's bad".to_string(),
                "--file=/tmp/p".to_string(),
            ])
        );
    }

    #[test]
    fn test_direct_invocation_appends_path_without_placeholders() {
        let template = CommandTemplate::parse("./judge.sh -q");
        assert_eq!(
            template.invocation("/tmp/p", "x", false),
            Invocation::Direct(vec![
                "./judge.sh".to_string(),
                "-q".to_string(),
                "/tmp/p".to_string()
            ])
        );
    }

    #[test]
    fn test_escaped_braces_are_not_placeholders_in_either_mode() {
        let template = CommandTemplate::parse(r"echo \{\}");
        assert!(template.requires_shell());
        assert_eq!(
            template.invocation("/tmp/p", "x", false),
            Invocation::Shell(r"echo \{\} /tmp/p".to_string())
        );
    }

    #[test]
    fn test_quoted_placeholder_counts_in_both_modes() {
        let template = CommandTemplate::parse("./judge.sh '{}'");
        assert!(!template.requires_shell());
        assert_eq!(
            template.invocation("/tmp/p", "x", false),
            Invocation::Direct(vec!["./judge.sh".to_string(), "/tmp/p".to_string()])
        );
        assert_eq!(template.render("/tmp/p", "x"), "./judge.sh '/tmp/p'");
    }

    #[test]
    fn test_force_shell_uses_rendering() {
        let template = CommandTemplate::parse("./judge.sh {line}");
        assert_eq!(
            template.invocation("/tmp/p", "a b", true),
            Invocation::Shell("./judge.sh 'a b'".to_string())
        );
    }

    #[test]
    fn test_shell_template_uses_rendering() {
        let template = CommandTemplate::parse("echo 'BEFORE:{line}' >> /tmp/track");
        assert!(template.requires_shell());
        assert_eq!(
            template.invocation("/tmp/p", "v1.0", false),
            Invocation::Shell("echo 'BEFORE:'v1.0'' >> /tmp/track".to_string())
        );
    }
}
