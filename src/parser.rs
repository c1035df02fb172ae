use std::{fs, path::Path};

use tracing::debug;

use crate::error::{DocumentError, ParseError, ParseResult};
use crate::tree::{NodeId, Tree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// A call or declaration header closed by `)` (or bare text before `{`);
    /// the next statement or braced block becomes its body.
    Header,
    /// A statement that never takes a body: an assignment, or bare text
    /// ending at `;` or `}`.
    Statement,
    Comment,
    Open,
    Close,
    Terminator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the original source text.
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Comment {
    text: String,
    /// Byte offset in the original source.
    start: usize,
    /// Byte offset in the comment-free source where the comment was removed.
    offset: usize,
}

/// Parses source text into a document tree.
///
/// Comments become nodes at the position they held among the surrounding
/// statements. Node contents are whitespace-normalized and every descendant
/// count is valid on return.
pub fn parse(source: &str) -> ParseResult<Tree> {
    let tokens = tokenize(source)?;
    let mut tree = build_tree(&tokens)?;
    tree.map_contents(normalize_whitespace);
    let nodes = tree.fix_descendants();
    debug!(tokens = tokens.len(), nodes, "parsed document");
    Ok(tree)
}

/// Reads and parses a document file.
pub fn import_file(path: impl AsRef<Path>) -> Result<Tree, DocumentError> {
    let source = fs::read_to_string(path)?;
    Ok(parse(&source)?)
}

/// Splits source text into tokens, with comments re-inserted where they were
/// found.
pub fn tokenize(source: &str) -> ParseResult<Vec<Token>> {
    let (stripped, comments) = strip_comments(source);
    let mut tokenizer = Tokenizer::new(&stripped, comments);
    tokenizer.run()?;
    Ok(tokenizer.finish())
}

fn strip_comments(source: &str) -> (String, Vec<Comment>) {
    let mut stripped = String::with_capacity(source.len());
    let mut comments = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut in_string = false;

    while let Some((i, ch)) = chars.next() {
        if in_string {
            stripped.push(ch);
            match ch {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        stripped.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let end = match (ch, chars.peek().map(|&(_, next)| next)) {
            ('/', Some('/')) => source[i..].find('\n').map_or(source.len(), |n| i + n),
            ('/', Some('*')) => source[i + 2..]
                .find("*/")
                .map_or(source.len(), |n| i + 2 + n + 2),
            _ => {
                if ch == '"' {
                    in_string = true;
                }
                stripped.push(ch);
                continue;
            }
        };

        comments.push(Comment {
            text: source[i..end].to_string(),
            start: i,
            offset: stripped.len(),
        });
        while chars.next_if(|&(j, _)| j < end).is_some() {}
    }

    (stripped, comments)
}

struct Tokenizer<'a> {
    source: &'a str,
    comments: std::vec::IntoIter<Comment>,
    /// `(offset, len)` of every removed comment, for mapping positions back.
    removed: Vec<(usize, usize)>,
    pending_comment: Option<Comment>,
    tokens: Vec<Token>,
    parens: Vec<usize>,
    gobble: bool,
    start: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str, comments: Vec<Comment>) -> Self {
        let removed = comments
            .iter()
            .map(|comment| (comment.offset, comment.text.len()))
            .collect();
        let mut comments = comments.into_iter();
        let pending_comment = comments.next();
        Self {
            source,
            comments,
            removed,
            pending_comment,
            tokens: Vec::new(),
            parens: Vec::new(),
            gobble: false,
            start: 0,
        }
    }

    fn run(&mut self) -> ParseResult<()> {
        let source = self.source;
        let mut in_string = false;
        let mut escaped = false;

        for (i, ch) in source.char_indices() {
            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            let at_top = self.parens.is_empty();
            match ch {
                '"' => in_string = true,
                '(' => self.parens.push(i),
                ')' => {
                    if self.parens.pop().is_none() {
                        return Err(ParseError::extra_close_bracket(self.source_pos(i)));
                    }
                    if self.parens.is_empty() && !self.gobble && !self.followed_by_equals(i + 1) {
                        self.emit_span(TokenKind::Header, i + 1);
                        self.start = i + 1;
                    }
                }
                '=' if at_top && !self.gobble => self.gobble = true,
                ';' if at_top => {
                    self.emit_span(TokenKind::Statement, i);
                    self.gobble = false;
                    self.emit(TokenKind::Terminator, ";", i, i + 1);
                    self.start = i + 1;
                }
                '{' if at_top && !self.gobble => {
                    self.emit_span(TokenKind::Header, i);
                    self.emit(TokenKind::Open, "{", i, i + 1);
                    self.start = i + 1;
                }
                '}' if at_top && !self.gobble => {
                    self.emit_span(TokenKind::Statement, i);
                    self.emit(TokenKind::Close, "}", i, i + 1);
                    self.start = i + 1;
                }
                _ => {}
            }
        }

        if let Some(&pos) = self.parens.first() {
            return Err(ParseError::unclosed_bracket(self.source_pos(pos)));
        }
        self.emit_span(TokenKind::Statement, source.len());
        Ok(())
    }

    /// Maps a byte offset in the comment-free text back to the original source.
    fn source_pos(&self, pos: usize) -> usize {
        let skipped: usize = self
            .removed
            .iter()
            .take_while(|&&(offset, _)| offset <= pos)
            .map(|&(_, len)| len)
            .sum();
        pos + skipped
    }

    fn followed_by_equals(&self, from: usize) -> bool {
        self.source[from..].trim_start().starts_with('=')
    }

    /// Emits the pending text from `self.start` to `end` unless it is blank.
    fn emit_span(&mut self, kind: TokenKind, end: usize) {
        let span = &self.source[self.start..end];
        let trimmed = span.trim_start();
        if trimmed.trim_end().is_empty() {
            return;
        }
        let start = end - trimmed.len();
        self.emit(kind, trimmed.trim_end(), start, end);
    }

    fn emit(&mut self, kind: TokenKind, text: &str, start: usize, end: usize) {
        while let Some(comment) = self.pending_comment.take_if(|comment| comment.offset < end) {
            self.push_comment(comment);
            self.pending_comment = self.comments.next();
        }
        let end = if end > start { self.source_pos(end - 1) + 1 } else { self.source_pos(end) };
        let start = self.source_pos(start);
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            start,
            end,
        });
    }

    fn push_comment(&mut self, comment: Comment) {
        self.tokens.push(Token {
            kind: TokenKind::Comment,
            end: comment.start + comment.text.len(),
            start: comment.start,
            text: comment.text,
        });
    }

    fn finish(mut self) -> Vec<Token> {
        if let Some(comment) = self.pending_comment.take() {
            self.push_comment(comment);
        }
        while let Some(comment) = self.comments.next() {
            self.push_comment(comment);
        }
        self.tokens
    }
}

struct Frame {
    node: NodeId,
    open: usize,
}

fn build_tree(tokens: &[Token]) -> ParseResult<Tree> {
    let mut tree = Tree::document();
    let mut frames = vec![Frame {
        node: tree.root(),
        open: 1,
    }];
    let mut braces = Vec::new();

    for token in tokens {
        let Some(top) = frames.last_mut() else {
            break;
        };
        match token.kind {
            TokenKind::Comment => {
                tree.attach_unsized(top.node, token.text.as_str());
            }
            TokenKind::Statement => {
                tree.attach_unsized(top.node, token.text.as_str());
                if top.open == 0 {
                    frames.pop();
                }
            }
            TokenKind::Header => {
                let node = tree.attach_unsized(top.node, token.text.as_str());
                if top.open == 0 {
                    frames.pop();
                }
                frames.push(Frame { node, open: 0 });
            }
            TokenKind::Open => {
                top.open += 1;
                braces.push(token.start);
            }
            TokenKind::Close => {
                if braces.pop().is_none() {
                    return Err(ParseError::extra_close_bracket(token.start));
                }
                pop_finished(&mut frames);
                if let Some(top) = frames.last_mut() {
                    top.open = top.open.saturating_sub(1);
                    if top.open == 0 && frames.len() > 1 {
                        frames.pop();
                    }
                }
            }
            TokenKind::Terminator => pop_finished(&mut frames),
        }
    }

    if let Some(&pos) = braces.first() {
        return Err(ParseError::unclosed_bracket(pos));
    }
    Ok(tree)
}

/// Pops every frame whose braced body (or single-statement body) is done.
fn pop_finished(frames: &mut Vec<Frame>) {
    while frames.len() > 1 && frames.last().is_some_and(|frame| frame.open == 0) {
        frames.pop();
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
