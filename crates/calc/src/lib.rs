use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

pub const BANNER: &str = "\
Syntax analyzer for arithmetic expressions
Supported: + - * / parentheses () and unary minus.
Empty line = exit.
";

#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub banner: bool,
    pub color: bool,
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            banner: true,
            color: false,
            max_depth: eval::DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub evaluated: usize,
    pub failed: usize,
}

pub struct Repl {
    config: Config,
}

impl Repl {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Reads lines from `input` until end of input or an empty line,
    /// writing each result or error to `output`.
    pub fn run(&self, mut input: impl BufRead, mut output: impl Write) -> io::Result<Summary> {
        if self.config.banner {
            writeln!(output, "{}", BANNER)?;
        }

        let mut summary = Summary::default();
        let mut buf = Vec::new();

        loop {
            write!(output, "{}", self.config.prompt)?;
            output.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            // invalid UTF-8 becomes U+FFFD, which the lexer rejects like any
            // other unrecognized character
            let text = String::from_utf8_lossy(&buf);
            let line = strip_line_terminator(&text);
            if line.is_empty() {
                break;
            }

            summary.evaluated += 1;

            match eval_line(line, &self.config) {
                Ok(value) => writeln!(output, "Result = {}", value)?,
                Err(lines) => {
                    summary.failed += 1;

                    for line in lines {
                        writeln!(output, "{}", line)?;
                    }
                }
            }

            writeln!(output)?;
        }

        tracing::debug!(evaluated = summary.evaluated, failed = summary.failed, "input finished");

        Ok(summary)
    }
}

/// Evaluates one line, rendering any error against the line it came from.
pub fn eval_line(line: &str, config: &Config) -> Result<i64, Vec<String>> {
    eval::parse_with_max_depth(line, config.max_depth).map_err(|error| {
        let mut lines = error.display(line);

        if config.color {
            highlight(&mut lines);
        }

        lines
    })
}

// the header goes first and the pointer line last,
// with the offending line left as the user typed it
fn highlight(lines: &mut [String]) {
    if let Some(header) = lines.first_mut() {
        *header = header.red().bold().to_string();
    }

    if lines.len() > 1 {
        if let Some(pointer) = lines.last_mut() {
            *pointer = pointer.red().to_string();
        }
    }
}

fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::{expect, Expect};

    fn check(
        input: impl AsRef<[u8]>,
        config: Config,
        expected_summary: Summary,
        transcript: Expect,
    ) {
        let mut output = Vec::new();
        let summary = Repl::new(config).run(input.as_ref(), &mut output).unwrap();

        transcript.assert_eq(&String::from_utf8(output).unwrap());
        assert_eq!(summary, expected_summary);
    }

    fn quiet() -> Config {
        Config { banner: false, ..Config::default() }
    }

    #[test]
    fn prints_results_until_empty_line() {
        check(
            "2+3*4\n(2+3)*4\n\n1+1\n",
            quiet(),
            Summary { evaluated: 2, failed: 0 },
            expect![[r#"
                > Result = 14

                > Result = 20

                > "#]],
        );
    }

    #[test]
    fn stops_at_end_of_input() {
        check(
            "10-3-2",
            quiet(),
            Summary { evaluated: 1, failed: 0 },
            expect![[r#"
                > Result = 5

                > "#]],
        );
    }

    #[test]
    fn reports_errors_and_continues() {
        check(
            "5/0\n(2+3\n-7/2\n",
            quiet(),
            Summary { evaluated: 3, failed: 2 },
            expect![[r#"
                > arithmetic error at 1:2: division by zero
                  5/0
                   ^

                > syntax error at 1:5: unmatched parenthesis: expected `)` but found end of input
                  (2+3
                      ^

                > Result = -3

                > "#]],
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        check(
            "2+@\r\n\r\n",
            quiet(),
            Summary { evaluated: 1, failed: 1 },
            expect![[r#"
                > lexical error at 1:3: unrecognized character `@`
                  2+@
                    ^

                > "#]],
        );
    }

    #[test]
    fn invalid_utf8_fails_only_its_own_line() {
        check(
            b"1+1\n\xff\n2+2\n",
            quiet(),
            Summary { evaluated: 3, failed: 1 },
            expect![[r#"
                > Result = 2

                > lexical error at 1:1: unrecognized character `�`
                  �
                  ^

                > Result = 4

                > "#]],
        );
    }

    #[test]
    fn prints_banner_and_custom_prompt() {
        check(
            "",
            Config { prompt: "calc> ".to_string(), ..Config::default() },
            Summary::default(),
            expect![[r#"
                Syntax analyzer for arithmetic expressions
                Supported: + - * / parentheses () and unary minus.
                Empty line = exit.

                calc> "#]],
        );
    }

    #[test]
    fn whitespace_only_line_is_evaluated() {
        let result = eval_line("   ", &quiet());
        assert_eq!(
            result,
            Err(vec![
                "syntax error at 1:4: expected operand but found end of input".to_string(),
                "     ".to_string(),
                "     ^".to_string(),
            ])
        );
    }

    #[test]
    fn eval_line_respects_max_depth() {
        let config = Config { max_depth: 2, ..quiet() };
        assert_eq!(eval_line("--1", &config), Ok(1));
        assert!(eval_line("---1", &config).is_err());
    }

    #[test]
    fn colored_errors_keep_their_text() {
        let config = Config { color: true, ..quiet() };
        let lines = eval_line("1/0", &config).unwrap_err();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("arithmetic error at 1:2: division by zero"));
        assert_ne!(lines[0], "arithmetic error at 1:2: division by zero");
        assert_eq!(lines[1], "  1/0");
        assert!(lines[2].contains('^'));
    }
}
