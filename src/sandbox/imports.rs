//! Static import extraction for untrusted Python snippets.
//!
//! The scanner tokenizes just enough of the language to find import
//! statements reliably: string literals (prefixed, triple-quoted), comments,
//! bracket nesting and backslash continuations. Everything else is an opaque
//! token. Statements are split on newlines and `;` outside brackets, and after
//! a top-level `:` so that `if x: import os` is still seen.

use std::fmt;

/// One module reference found in an `import` or `from ... import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Dotted module path as written; empty for `from . import x`
    pub module: String,
    /// Number of leading dots in a `from` import
    pub level: usize,
    /// 1-based line the statement starts on
    pub line: usize,
}

impl ImportRef {
    /// Returns the first component of the dotted path.
    #[must_use]
    pub fn top_level(&self) -> &str {
        self.module.split('.').next().unwrap_or_default()
    }

    /// Returns true for package-relative imports.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }
}

/// Lexical problems that prevent a reliable scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A string literal runs to the end of its line or of the input
    UnterminatedString {
        /// Line the literal starts on
        line: usize,
    },
    /// A closing bracket without an opener, or an opener never closed
    UnbalancedBracket {
        /// Line of the offending bracket
        line: usize,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString { line } => {
                write!(f, "unterminated string literal on line {}", line)
            }
            Self::UnbalancedBracket { line } => write!(f, "unbalanced bracket on line {}", line),
        }
    }
}

impl std::error::Error for ScanError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Dot,
    Comma,
    /// Statement boundary: newline, `;` or `:` outside brackets
    End,
    Other,
}

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
    line: usize,
    depth: usize,
    bracket_lines: Vec<usize>,
    tokens: Vec<(Token, usize)>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
            line: 1,
            depth: 0,
            bracket_lines: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push((token, self.line));
    }

    fn run(mut self) -> Result<Vec<(Token, usize)>, ScanError> {
        while let Some((pos, c)) = self.chars.next() {
            match c {
                '\n' => {
                    if self.depth == 0 {
                        self.push(Token::End);
                    }
                    self.line += 1;
                }
                '#' => {
                    while self.chars.next_if(|&(_, c)| c != '\n').is_some() {}
                }
                '\\' => {
                    // Line continuation; a stray backslash is left to the interpreter.
                    self.chars.next_if(|&(_, c)| c == '\r');
                    if self.chars.next_if(|&(_, c)| c == '\n').is_some() {
                        self.line += 1;
                    }
                }
                '\'' | '"' => self.string(c)?,
                '(' | '[' | '{' => {
                    self.depth += 1;
                    self.bracket_lines.push(self.line);
                    self.push(Token::Other);
                }
                ')' | ']' | '}' => {
                    if self.depth == 0 {
                        return Err(ScanError::UnbalancedBracket { line: self.line });
                    }
                    self.depth -= 1;
                    self.bracket_lines.pop();
                    self.push(Token::Other);
                }
                '.' => self.push(Token::Dot),
                ',' => self.push(Token::Comma),
                ';' | ':' if self.depth == 0 => self.push(Token::End),
                c if c == '_' || c.is_alphabetic() => self.name(pos)?,
                c if c.is_whitespace() => {}
                _ => self.push(Token::Other),
            }
        }

        if let Some(&line) = self.bracket_lines.last() {
            return Err(ScanError::UnbalancedBracket { line });
        }
        self.push(Token::End);
        Ok(self.tokens)
    }

    fn name(&mut self, start: usize) -> Result<(), ScanError> {
        let mut end = start + self.src[start..].chars().next().map_or(1, char::len_utf8);
        while let Some((pos, c)) = self.chars.next_if(|&(_, c)| c == '_' || c.is_alphanumeric()) {
            end = pos + c.len_utf8();
        }
        let ident = &self.src[start..end];

        if let Some(&(_, quote)) = self.chars.peek() {
            if (quote == '\'' || quote == '"')
                && STRING_PREFIXES.contains(&ident.to_ascii_lowercase().as_str())
            {
                self.chars.next();
                return self.string(quote);
            }
        }

        self.push(Token::Name(ident.to_string()));
        Ok(())
    }

    /// Consumes a string literal whose opening quote was just read.
    fn string(&mut self, quote: char) -> Result<(), ScanError> {
        let start_line = self.line;
        let triple = self.chars.peek().map(|&(_, c)| c) == Some(quote) && {
            let mut ahead = self.chars.clone();
            ahead.next();
            ahead.peek().map(|&(_, c)| c) == Some(quote)
        };

        if triple {
            self.chars.next();
            self.chars.next();
            let mut run = 0;
            while let Some((_, c)) = self.chars.next() {
                match c {
                    '\\' => {
                        run = 0;
                        if let Some((_, '\n')) = self.chars.next() {
                            self.line += 1;
                        }
                    }
                    c if c == quote => {
                        run += 1;
                        if run == 3 {
                            self.push(Token::Other);
                            return Ok(());
                        }
                    }
                    '\n' => {
                        run = 0;
                        self.line += 1;
                    }
                    _ => run = 0,
                }
            }
            return Err(ScanError::UnterminatedString { line: start_line });
        }

        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some((_, '\n')) = self.chars.next() {
                        self.line += 1;
                    }
                }
                '\n' => break,
                c if c == quote => {
                    self.push(Token::Other);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(ScanError::UnterminatedString { line: start_line })
    }
}

fn dotted(tokens: &[Token], mut at: usize) -> (String, usize) {
    let mut path = String::new();
    while let Some(Token::Name(part)) = tokens.get(at) {
        if part == "import" {
            break;
        }
        path.push_str(part);
        at += 1;
        if tokens.get(at) == Some(&Token::Dot) && matches!(tokens.get(at + 1), Some(Token::Name(_)))
        {
            path.push('.');
            at += 1;
        } else {
            break;
        }
    }
    (path, at)
}

fn parse_statement(tokens: &[Token], line: usize, found: &mut Vec<ImportRef>) {
    match tokens.first() {
        Some(Token::Name(kw)) if kw == "import" => {
            let mut at = 1;
            loop {
                let (module, next) = dotted(tokens, at);
                if module.is_empty() {
                    return;
                }
                found.push(ImportRef {
                    module,
                    level: 0,
                    line,
                });
                at = next;
                if matches!(tokens.get(at), Some(Token::Name(kw)) if kw == "as") {
                    at += 2;
                }
                if tokens.get(at) != Some(&Token::Comma) {
                    return;
                }
                at += 1;
            }
        }
        Some(Token::Name(kw)) if kw == "from" => {
            let level = tokens[1..].iter().take_while(|t| **t == Token::Dot).count();
            let (module, next) = dotted(tokens, 1 + level);
            let is_import = matches!(tokens.get(next), Some(Token::Name(kw)) if kw == "import");
            if is_import && (level > 0 || !module.is_empty()) {
                found.push(ImportRef {
                    module,
                    level,
                    line,
                });
            }
        }
        _ => {}
    }
}

/// Extracts every import statement from `code`, in source order.
///
/// # Errors
///
/// Returns a [`ScanError`] when the source is not lexically well formed.
pub fn scan_imports(code: &str) -> Result<Vec<ImportRef>, ScanError> {
    let tokens = Lexer::new(code).run()?;

    let mut found = Vec::new();
    let mut statement = Vec::new();
    let mut start_line = None;
    for (token, line) in tokens {
        if token == Token::End {
            if let Some(line) = start_line.take() {
                parse_statement(&statement, line, &mut found);
            }
            statement.clear();
        } else {
            start_line.get_or_insert(line);
            statement.push(token);
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(code: &str) -> Vec<String> {
        scan_imports(code)
            .unwrap()
            .into_iter()
            .map(|i| i.module)
            .collect()
    }

    #[test]
    fn plain_imports() {
        assert_eq!(modules("import os"), vec!["os"]);
        assert_eq!(modules("import os.path as p, json"), vec!["os.path", "json"]);
        assert_eq!(modules("from collections import Counter"), vec!["collections"]);
        assert_eq!(modules("from a.b import (c,\n d)"), vec!["a.b"]);
    }

    #[test]
    fn top_level_component() {
        let found = scan_imports("import xml.etree.ElementTree").unwrap();
        assert_eq!(found[0].top_level(), "xml");
    }

    #[test]
    fn imports_after_semicolons_and_colons() {
        assert_eq!(modules("x = 1; import os"), vec!["os"]);
        assert_eq!(modules("if True: import subprocess"), vec!["subprocess"]);
        assert_eq!(
            modules("try:\n    import socket\nexcept ImportError: pass"),
            vec!["socket"]
        );
    }

    #[test]
    fn strings_and_comments_are_ignored() {
        assert!(modules("s = 'import os'").is_empty());
        assert!(modules("s = \"\"\"\nimport os\n\"\"\"").is_empty());
        assert!(modules("# import os\nx = 1").is_empty());
        assert!(modules("s = rb'\\' import os'").is_empty());
        assert!(modules("f\"{x}\" ; y = 2").is_empty());
    }

    #[test]
    fn continuation_lines_join_statements() {
        assert_eq!(modules("import json, \\\n    os"), vec!["json", "os"]);
    }

    #[test]
    fn import_inside_brackets_is_not_a_statement() {
        assert!(modules("x = (1,\nimport_me)").is_empty());
        assert!(modules("yield_from = 3").is_empty());
    }

    #[test]
    fn relative_imports_record_their_level() {
        let found = scan_imports("from .. import secrets\nfrom .util import x").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].level, 2);
        assert!(found[0].module.is_empty());
        assert!(found[1].is_relative());
        assert_eq!(found[1].module, "util");
        assert_eq!(found[1].line, 2);
    }

    #[test]
    fn raise_from_is_not_an_import() {
        assert!(modules("raise ValueError('x') from None").is_empty());
    }

    #[test]
    fn lexical_errors_are_reported() {
        assert_eq!(
            scan_imports("s = 'open\nimport os"),
            Err(ScanError::UnterminatedString { line: 1 })
        );
        assert_eq!(
            scan_imports("x = (1,\n2"),
            Err(ScanError::UnbalancedBracket { line: 1 })
        );
        assert_eq!(
            scan_imports("x = 1)\n"),
            Err(ScanError::UnbalancedBracket { line: 1 })
        );
        assert!(scan_imports("'''never closed").is_err());
    }
}
