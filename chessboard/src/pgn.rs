//! PGN import and export for [`GameRecord`].
//!
//! Import reads one game: tag pairs, SAN movetext with `{}`/`;` comments, NAGs, `%` escape
//! lines, and nested `( )` variations. Parsing stops at the game's result token or at the next
//! game's tag section.

use std::fmt::Write as _;

use shakmaty::san::{ParseSanError, SanError, SanPlus};
use shakmaty::{Chess, Color, Position};
use thiserror::Error;

use crate::record::{GameRecord, NodeId, ROOT};
use crate::rules::{self, FenError};

const LINE_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("invalid FEN tag: {0}")]
    Fen(#[from] FenError),
    #[error("malformed tag pair near {0:?}")]
    MalformedTag(String),
    #[error("unterminated {0}")]
    Unterminated(&'static str),
    #[error("invalid SAN {token:?}: {source}")]
    ParseSan {
        token: String,
        #[source]
        source: ParseSanError,
    },
    #[error("illegal move {token:?} at ply {ply}: {source}")]
    IllegalMove {
        token: String,
        ply: usize,
        #[source]
        source: SanError,
    },
    #[error("move {token:?} could not be recorded")]
    Unrecorded { token: String },
    #[error("variation opened before any move")]
    VariationWithoutMove,
    #[error("unbalanced variation parentheses")]
    UnbalancedVariation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Tag { name: &'a str, value: String },
    Comment(&'a str),
    Open,
    Close,
    Nag,
    MoveNumber,
    San(&'a str),
    Result(&'a str),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn at_line_start(&self, at: usize) -> bool {
        at == 0 || self.src.as_bytes()[at - 1] == b'\n'
    }

    fn rest_of_line(&mut self, from: usize) -> &'a str {
        let src = self.src;
        let end = src[from..].find('\n').map_or(src.len(), |off| from + off);
        self.pos = end;
        &src[from..end]
    }

    fn snippet(&self, from: usize) -> String {
        self.src[from..].lines().next().unwrap_or_default().to_string()
    }

    fn tag(&mut self) -> Result<Token<'a>, PgnError> {
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        let name_start = i;
        while bytes
            .get(i)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            i += 1;
        }
        let name = &src[name_start..i];
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if name.is_empty() || bytes.get(i) != Some(&b'"') {
            return Err(PgnError::MalformedTag(self.snippet(start)));
        }
        i += 1;

        let mut value = String::new();
        loop {
            match bytes.get(i) {
                None => return Err(PgnError::Unterminated("tag value")),
                Some(b'\\') if matches!(bytes.get(i + 1), Some(b'"' | b'\\')) => {
                    value.push(char::from(bytes[i + 1]));
                    i += 2;
                }
                Some(b'"') => {
                    i += 1;
                    break;
                }
                Some(_) => {
                    let Some(ch) = src[i..].chars().next() else {
                        return Err(PgnError::Unterminated("tag value"));
                    };
                    value.push(ch);
                    i += ch.len_utf8();
                }
            }
        }

        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) != Some(&b']') {
            return Err(PgnError::MalformedTag(self.snippet(start)));
        }
        self.pos = i + 1;
        Ok(Token::Tag { name, value })
    }

    fn word(&mut self) -> Token<'a> {
        let src = self.src;
        let start = self.pos;
        let end = src[start..]
            .find(|c: char| c.is_whitespace() || "(){}[];$".contains(c))
            .map_or(src.len(), |off| start + off);
        // A lone delimiter with no token of its own becomes a one-character word.
        self.pos = if end > start {
            end
        } else {
            start + src[start..].chars().next().map_or(1, char::len_utf8)
        };
        classify(&src[start..self.pos])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, PgnError>;

    fn next(&mut self) -> Option<Self::Item> {
        let src = self.src;
        let bytes = src.as_bytes();
        loop {
            let rest = &src[self.pos..];
            self.pos += rest.len() - rest.trim_start().len();
            let start = self.pos;
            let first = *bytes.get(start)?;

            let token = match first {
                b'%' if self.at_line_start(start) => {
                    self.rest_of_line(start);
                    continue;
                }
                b'[' => self.tag(),
                b'{' => match src[start + 1..].find('}') {
                    Some(off) => {
                        self.pos = start + 1 + off + 1;
                        Ok(Token::Comment(src[start + 1..start + 1 + off].trim()))
                    }
                    None => {
                        self.pos = src.len();
                        Err(PgnError::Unterminated("comment"))
                    }
                },
                b';' => Ok(Token::Comment(self.rest_of_line(start + 1).trim())),
                b'(' => {
                    self.pos += 1;
                    Ok(Token::Open)
                }
                b')' => {
                    self.pos += 1;
                    Ok(Token::Close)
                }
                b'$' => {
                    self.pos += 1;
                    while bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                        self.pos += 1;
                    }
                    Ok(Token::Nag)
                }
                _ => Ok(self.word()),
            };
            return Some(token);
        }
    }
}

fn classify(word: &str) -> Token<'_> {
    if matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*") {
        return Token::Result(word);
    }
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && (digits == word.len() || word[digits..].starts_with('.')) {
        let rest = word[digits..].trim_start_matches('.');
        return if rest.is_empty() {
            Token::MoveNumber
        } else {
            Token::San(rest)
        };
    }
    Token::San(word)
}

/// Drops move suffix annotations and accepts zero-style castling.
fn normalize_san(word: &str) -> String {
    let trimmed = word.trim_end_matches(['!', '?']);
    if trimmed.starts_with("0-0") {
        trimmed.replace('0', "O")
    } else {
        trimmed.to_string()
    }
}

/// Reads the first game in `text`. The cursor of the returned record sits at the mainline's
/// final position.
pub fn parse(text: &str) -> Result<GameRecord, PgnError> {
    let mut lexer = Lexer::new(text);
    let mut tags = Vec::new();
    let mut first_movetext = None;
    for token in lexer.by_ref() {
        match token? {
            Token::Tag { name, value } => tags.push((name.to_string(), value)),
            other => {
                first_movetext = Some(other);
                break;
            }
        }
    }

    let start = match tags.iter().find(|(name, _)| name == "FEN") {
        Some((_, fen)) => rules::parse_fen(fen)?,
        None => Chess::default(),
    };
    let mut record = GameRecord::with_tags(start, tags);

    let mut resume_stack: Vec<NodeId> = Vec::new();
    let mut ply = 0;
    for token in first_movetext.into_iter().map(Ok).chain(lexer) {
        match token? {
            Token::Tag { .. } => break,
            Token::Comment(text) => record.append_comment(record.cursor(), text),
            Token::Nag | Token::MoveNumber => {}
            Token::Open => {
                let current = record.cursor();
                let parent = record
                    .parent(current)
                    .ok_or(PgnError::VariationWithoutMove)?;
                resume_stack.push(current);
                record.select(parent);
            }
            Token::Close => {
                let resume = resume_stack.pop().ok_or(PgnError::UnbalancedVariation)?;
                record.select(resume);
            }
            Token::Result(result) => {
                if resume_stack.is_empty() {
                    record.set_tag("Result", result);
                    break;
                }
            }
            Token::San(word) => {
                ply += 1;
                let san: SanPlus = normalize_san(word).parse().map_err(|source| PgnError::ParseSan {
                    token: word.to_string(),
                    source,
                })?;
                let m = san
                    .san
                    .to_move(record.current_position())
                    .map_err(|source| PgnError::IllegalMove {
                        token: word.to_string(),
                        ply,
                        source,
                    })?;
                record.add_variation(&m).ok_or_else(|| PgnError::Unrecorded {
                    token: word.to_string(),
                })?;
            }
        }
    }
    if !resume_stack.is_empty() {
        return Err(PgnError::UnbalancedVariation);
    }

    let end = record.mainline_end();
    record.select(end);
    Ok(record)
}

#[derive(Default)]
struct Movetext {
    text: String,
}

impl Movetext {
    fn push(&mut self, token: &str) {
        if !self.text.is_empty() && !self.text.ends_with('(') {
            self.text.push(' ');
        }
        self.text.push_str(token);
    }

    fn open(&mut self) {
        self.push("(");
    }

    fn close(&mut self) {
        self.text.push(')');
    }

    fn wrapped(&self, width: usize) -> String {
        let mut out = String::with_capacity(self.text.len() + self.text.len() / width + 1);
        let mut line_len = 0;
        for word in self.text.split(' ') {
            if line_len > 0 && line_len + 1 + word.len() > width {
                out.push('\n');
                line_len = 0;
            } else if line_len > 0 {
                out.push(' ');
                line_len += 1;
            }
            out.push_str(word);
            line_len += word.len();
        }
        out
    }
}

/// Brace comments cannot nest, so closing braces inside the text are dropped.
fn braced(comment: &str) -> String {
    let words: Vec<&str> = comment
        .split(|c: char| c.is_whitespace() || c == '}')
        .filter(|word| !word.is_empty())
        .collect();
    format!("{{{}}}", words.join(" "))
}

fn write_move(record: &GameRecord, before: &Chess, id: NodeId, force_number: bool, out: &mut Movetext) {
    let Some(played) = record.recorded(id) else {
        return;
    };
    let number = before.fullmoves().get();
    match before.turn() {
        Color::White => out.push(&format!("{number}.")),
        Color::Black if force_number => out.push(&format!("{number}...")),
        Color::Black => {}
    }
    out.push(&played.san);
    if let Some(comment) = record.comment(id) {
        out.push(&braced(comment));
    }
}

fn write_line(record: &GameRecord, from: NodeId, mut force_number: bool, out: &mut Movetext) {
    let mut parent = from;
    loop {
        let Some((&main, alternatives)) = record.children(parent).split_first() else {
            return;
        };
        let Some(before) = record.position(parent) else {
            return;
        };
        write_move(record, before, main, force_number, out);
        for &alternative in alternatives {
            out.open();
            write_move(record, before, alternative, true, out);
            write_line(record, alternative, false, out);
            out.close();
        }
        force_number = !alternatives.is_empty() || record.comment(main).is_some();
        parent = main;
    }
}

/// Writes `record` in PGN export form: tag section, blank line, wrapped movetext ending with
/// the result.
pub fn write_game(record: &GameRecord) -> String {
    let mut out = String::new();
    for (name, value) in record.export_tags() {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        let _ = writeln!(out, "[{name} \"{escaped}\"]");
    }
    out.push('\n');

    let mut movetext = Movetext::default();
    if let Some(comment) = record.comment(ROOT) {
        movetext.push(&braced(comment));
    }
    write_line(record, ROOT, true, &mut movetext);
    movetext.push(&record.result());
    out.push_str(&movetext.wrapped(LINE_WIDTH));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        Lexer::new(src).map(|t| t.expect("token")).collect()
    }

    #[test]
    fn lexer_splits_movetext() {
        assert_eq!(
            tokens("1. e4 {best by test} e5 $1 (1... c5) 2.Nf3 ; rest\n1-0"),
            vec![
                Token::MoveNumber,
                Token::San("e4"),
                Token::Comment("best by test"),
                Token::San("e5"),
                Token::Nag,
                Token::Open,
                Token::MoveNumber,
                Token::San("c5"),
                Token::Close,
                Token::San("Nf3"),
                Token::Comment("rest"),
                Token::Result("1-0"),
            ]
        );
    }

    #[test]
    fn lexer_reads_escaped_tag_values() {
        assert_eq!(
            tokens(r#"[Event "The \"Big\" One"]"#),
            vec![Token::Tag {
                name: "Event",
                value: "The \"Big\" One".to_string()
            }]
        );
    }

    #[test]
    fn lexer_skips_escape_lines() {
        assert_eq!(tokens("% engine output\ne4"), vec![Token::San("e4")]);
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert!(matches!(
            parse("1. e4 { never closed"),
            Err(PgnError::Unterminated("comment"))
        ));
    }

    #[test]
    fn annotations_and_zero_castling_are_accepted() {
        assert_eq!(normalize_san("Nf3!?"), "Nf3");
        assert_eq!(normalize_san("0-0-0+"), "O-O-O+");
        assert_eq!(normalize_san("e8=Q#"), "e8=Q#");
    }

    #[test]
    fn unicode_whitespace_separates_tokens() {
        assert_eq!(
            tokens("1.\u{a0}e4\u{2003}e5"),
            vec![Token::MoveNumber, Token::San("e4"), Token::San("e5")]
        );
    }

    #[test]
    fn unrecorded_move_error_names_the_token() {
        let err = PgnError::Unrecorded {
            token: "Nf3".to_string(),
        };
        assert_eq!(err.to_string(), "move \"Nf3\" could not be recorded");
    }

    #[test]
    fn closing_braces_are_dropped_from_exported_comments() {
        assert_eq!(braced("a } b"), "{a b}");
        assert_eq!(braced("}}"), "{}");
    }

    #[test]
    fn movetext_wraps_on_token_boundaries() {
        let mut text = Movetext::default();
        for _ in 0..30 {
            text.push("Nf3");
        }
        let wrapped = text.wrapped(20);
        assert!(wrapped.lines().all(|line| line.len() <= 20));
        assert_eq!(wrapped.split_whitespace().count(), 30);
    }
}
