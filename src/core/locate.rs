//! Comment-block locator.
//!
//! Walks a file's text and yields every contiguous comment region as a
//! [`CommentSpan`]. Full-line comments on consecutive lines are folded into a
//! single span; block comments are taken verbatim from opener to closer.
//!
//! # Limitations
//!
//! There is no lexer behind this. A comment delimiter inside a string literal
//! (`"http://..."`, `'#'`) starts a span just like a real comment would. Such
//! spans rarely contain tag lines, so they almost never turn into records.
//!
//! **Important**: Blank lines break a run of line comments. The two runs below
//! are separate spans:
//!
//! ```c
//! // AI_PHASE: A
//!
//! // AI_PHASE: B
//! ```

use super::language::{BlockDelimiters, CommentSyntax};

/// Which delimiter produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind<'a> {
    Line { marker: &'a str },
    Block { open: &'a str, close: &'a str },
}

/// A contiguous comment region. Line numbers are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSpan<'a> {
    /// Raw text, delimiters included.
    pub text: &'a str,
    pub start_line: usize,
    pub end_line: usize,
    /// Only whitespace precedes the span on its first line.
    pub owns_line: bool,
    pub kind: CommentKind<'a>,
}

impl<'a> CommentSpan<'a> {
    /// Comment text with delimiters and `*` gutters removed, one item per line.
    pub fn body_lines(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let kind = self.kind;
        let inner = match kind {
            CommentKind::Line { .. } => self.text,
            CommentKind::Block { open, close } => {
                let text = self.text.strip_prefix(open).unwrap_or(self.text);
                text.strip_suffix(close).unwrap_or(text)
            }
        };

        inner.lines().map(move |line| {
            let line = line.trim();
            match kind {
                CommentKind::Line { marker } => line.trim_start_matches(marker).trim(),
                CommentKind::Block { .. } => line.trim_start_matches('*').trim(),
            }
        })
    }
}

#[derive(Clone, Copy)]
enum Opener<'a> {
    Line(&'a str),
    Block(&'a BlockDelimiters),
}

impl Opener<'_> {
    fn len(&self) -> usize {
        match self {
            Opener::Line(marker) => marker.len(),
            Opener::Block(delims) => delims.open.len(),
        }
    }
}

/// Lazy iterator over the comment spans of one file.
///
/// Cloning the iterator (or calling [`locate`] again) restarts the walk.
#[derive(Debug, Clone)]
pub struct CommentBlocks<'a> {
    text: &'a str,
    syntax: &'a CommentSyntax,
    pos: usize,
    line: usize,
    line_begin: usize,
}

pub fn locate<'a>(text: &'a str, syntax: &'a CommentSyntax) -> CommentBlocks<'a> {
    CommentBlocks {
        text,
        syntax,
        pos: 0,
        line: 1,
        line_begin: 0,
    }
}

impl<'a> CommentBlocks<'a> {
    /// Move `pos` forward, keeping the line counter in sync.
    fn advance(&mut self, to: usize) {
        let segment = &self.text[self.pos..to];
        if let Some(last_newline) = segment.rfind('\n') {
            self.line += segment.matches('\n').count();
            self.line_begin = self.pos + last_newline + 1;
        }
        self.pos = to;
    }

    fn line_end_from(&self, from: usize) -> usize {
        self.text[from..]
            .find('\n')
            .map_or(self.text.len(), |i| from + i)
    }

    /// Earliest comment opener in `rest`; the longer token wins a tie.
    fn find_opener(&self, rest: &str) -> Option<(usize, Opener<'a>)> {
        let syntax: &'a CommentSyntax = self.syntax;

        let lines = syntax
            .line_comments
            .iter()
            .filter_map(|marker| rest.find(marker.as_str()).map(|i| (i, Opener::Line(marker))));
        let blocks = syntax
            .block_comments
            .iter()
            .filter_map(|delims| rest.find(delims.open.as_str()).map(|i| (i, Opener::Block(delims))));

        lines
            .chain(blocks)
            .min_by(|(a, a_op), (b, b_op)| a.cmp(b).then_with(|| b_op.len().cmp(&a_op.len())))
    }

    /// Extend a full-line comment through the following lines that start with
    /// the same marker.
    fn fold_line_run(&self, first_line_end: usize, marker: &str) -> usize {
        let mut end = first_line_end;
        while end < self.text.len() {
            let next_start = end + 1;
            let next_end = self.line_end_from(next_start);
            if self.text[next_start..next_end]
                .trim_start()
                .starts_with(marker)
            {
                end = next_end;
            } else {
                break;
            }
        }
        end
    }
}

impl<'a> Iterator for CommentBlocks<'a> {
    type Item = CommentSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.text;
        while self.pos < source.len() {
            let line_end = self.line_end_from(self.pos);
            let rest = &source[self.pos..line_end];

            let Some((offset, opener)) = self.find_opener(rest) else {
                let next_line = (line_end + 1).min(source.len());
                self.advance(next_line);
                continue;
            };

            let start = self.pos + offset;
            self.advance(start);
            let start_line = self.line;
            let owns_line = source[self.line_begin..start].trim().is_empty();

            let (end, kind) = match opener {
                Opener::Block(delims) => {
                    let body_from = start + delims.open.len();
                    let end = source[body_from..]
                        .find(delims.close.as_str())
                        .map_or(source.len(), |i| body_from + i + delims.close.len());
                    let kind = CommentKind::Block {
                        open: &delims.open,
                        close: &delims.close,
                    };
                    (end, kind)
                }
                Opener::Line(marker) => {
                    let end = if owns_line {
                        self.fold_line_run(line_end, marker)
                    } else {
                        line_end
                    };
                    (end, CommentKind::Line { marker })
                }
            };

            let text = &source[start..end];
            let end_line = start_line + text.trim_end_matches(['\n', '\r']).matches('\n').count();
            self.advance(end);

            return Some(CommentSpan {
                text,
                start_line,
                end_line,
                owns_line,
                kind,
            });
        }
        None
    }
}
