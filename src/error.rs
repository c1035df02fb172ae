use std::io;

use thiserror::Error;

use crate::tree::NodeId;

pub type ParseResult<T> = Result<T, ParseError>;
pub type EditResult<T> = Result<T, EditError>;

/// Syntax errors reported while importing source text.
///
/// Positions are byte offsets into the original source text, comments
/// included. A failed import never yields a partial tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unclosed bracket opened at byte {pos}")]
    UnclosedBracket { pos: usize },

    #[error("extra close bracket at byte {pos}")]
    ExtraCloseBracket { pos: usize },
}

impl ParseError {
    pub fn unclosed_bracket(pos: usize) -> Self {
        Self::UnclosedBracket { pos }
    }

    pub fn extra_close_bracket(pos: usize) -> Self {
        Self::ExtraCloseBracket { pos }
    }

    pub fn pos(&self) -> usize {
        match self {
            Self::UnclosedBracket { pos } | Self::ExtraCloseBracket { pos } => *pos,
        }
    }
}

/// Precondition violations on structural edits.
///
/// These are caller bugs. The tree is left untouched when one is returned, and
/// the caller must abort the edit rather than try to repair anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node {0:?} is not part of this tree")]
    StaleNode(NodeId),

    #[error("child index {index} out of bounds for node with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("the document root cannot be removed on its own")]
    RootNotDetachable,

    #[error("descendant count of {node:?} is {cached}, expected {expected}")]
    InvariantViolated {
        node: NodeId,
        cached: usize,
        expected: usize,
    },
}

/// Failures reading or writing a document file.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
}
