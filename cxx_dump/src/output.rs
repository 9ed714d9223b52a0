//! Rendering of token streams and outlines

use crate::outline::OutlineEntry;
use cxx_frontend::tokens::{Token, TokenKind, Trivia, TriviaKind};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One aligned line per item
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
struct TokenRecord<'a> {
    kind: TokenKind,
    image: &'a str,
    line: u32,
    column: u32,
    end_line: u32,
    end_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    trivia: Option<&'a [Trivia]>,
}

impl<'a> TokenRecord<'a> {
    fn new(token: &'a Token, with_trivia: bool) -> Self {
        Self {
            kind: token.kind,
            image: &token.image,
            line: token.begin_line(),
            column: token.begin_column(),
            end_line: token.end_line(),
            end_column: token.end_column(),
            trivia: (with_trivia && !token.trivia.is_empty()).then_some(token.trivia.as_slice()),
        }
    }
}

fn trivia_label(kind: TriviaKind) -> &'static str {
    match kind {
        TriviaKind::LineComment | TriviaKind::BlockComment => "COMMENT",
        TriviaKind::Directive => "DIRECTIVE",
    }
}

fn to_io(error: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error)
}

pub fn write_tokens<W: Write>(
    out: &mut W,
    tokens: &[Token],
    format: OutputFormat,
    with_trivia: bool,
) -> io::Result<()> {
    for token in tokens {
        match format {
            OutputFormat::Json => {
                let line = serde_json::to_string(&TokenRecord::new(token, with_trivia))
                    .map_err(to_io)?;
                writeln!(out, "{}", line)?;
            }
            OutputFormat::Text => {
                if with_trivia {
                    for trivia in &token.trivia {
                        writeln!(
                            out,
                            "{:>5}:{:<4} {:<9} {}",
                            trivia.span.start().line,
                            trivia.span.start().column,
                            trivia_label(trivia.kind),
                            trivia.image.trim_end()
                        )?;
                    }
                }
                writeln!(
                    out,
                    "{:>5}:{:<4} {:<9} {}",
                    token.begin_line(),
                    token.begin_column(),
                    token.kind,
                    token.image
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_outline<W: Write>(
    out: &mut W,
    entries: &[OutlineEntry],
    format: OutputFormat,
) -> io::Result<()> {
    for entry in entries {
        match format {
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string(entry).map_err(to_io)?)?;
            }
            OutputFormat::Text => writeln!(out, "{}", entry)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::build_outline;
    use cxx_frontend::Preprocessor;

    fn render_tokens(source: &str, format: OutputFormat, with_trivia: bool) -> String {
        let tokens = Preprocessor::new().tokenize_all(source).unwrap();
        let mut out = Vec::new();
        write_tokens(&mut out, &tokens, format, with_trivia).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_tokens() {
        let text = render_tokens("int x;", OutputFormat::Text, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "    1:1    KEYWORD   int");
        assert_eq!(lines[1], "    1:5    ID        x");
        assert!(lines[3].contains("EOF"));
    }

    #[test]
    fn test_text_trivia() {
        let text = render_tokens("// note\nx", OutputFormat::Text, true);
        assert!(text.lines().next().unwrap().contains("COMMENT   // note"));

        let text = render_tokens("// note\nx", OutputFormat::Text, false);
        assert!(!text.contains("note"));
    }

    #[test]
    fn test_json_tokens() {
        let text = render_tokens("/* a */ y", OutputFormat::Json, true);
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["kind"], "Identifier");
        assert_eq!(first["image"], "y");
        assert_eq!(first["column"], 9);
        assert_eq!(first["end_column"], 9);
        assert_eq!(first["trivia"][0]["image"], "/* a */");

        let text = render_tokens("/* a */ y", OutputFormat::Json, false);
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert!(first.get("trivia").is_none());
    }

    #[test]
    fn test_outline_output() {
        let tokens = Preprocessor::new()
            .tokenize_all("namespace A { class B {}; }")
            .unwrap();
        let outline = build_outline(&tokens).unwrap();

        let mut out = Vec::new();
        write_outline(&mut out, &outline.entries, OutputFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        let last: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
        assert_eq!(last["kind"], "class");
        assert_eq!(last["name"], "A::B");

        let mut out = Vec::new();
        write_outline(&mut out, &outline.entries, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("namespace A"));
        assert!(text.contains("class     A::B"));
    }
}
