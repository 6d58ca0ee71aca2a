//! The line-structured document model.
//!
//! A [`Document`] is an ordered sequence of typed [`Line`] records stored in
//! a slab arena and addressed by stable [`LineId`] handles. Order is kept as
//! a doubly-linked list of handles, so split and merge are O(1) link updates
//! while line identity survives arbitrary neighbor changes. Handles of
//! removed lines are never reused within one document, which makes a stale
//! id detectable instead of dangling.

use thiserror::Error;

use crate::gemtext::{BlockType, TOGGLE_TOKEN, classify, is_toggle_line};

/// Stable handle to a line within one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineId(usize);

/// The two observable renderings of a line: the processed display form and
/// the raw editable form. Only block types whose stored text differs from
/// their display (links) change appearance between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMode {
    Committed,
    Editing,
}

/// A single document line: block type plus token-stripped text.
///
/// For `Preformatted` lines the text may contain embedded `\n` characters;
/// the whole delimited block is one logical line. All other block types
/// hold single-line text.
#[derive(Clone, Debug)]
pub struct Line {
    pub block_type: BlockType,
    pub text: String,
    pub mode: LineMode,
    prev: Option<LineId>,
    next: Option<LineId>,
}

impl Line {
    pub fn new(block_type: BlockType, text: impl Into<String>) -> Self {
        Self {
            block_type,
            text: text.into(),
            mode: LineMode::Committed,
            prev: None,
            next: None,
        }
    }

    /// Length of the text in characters (caret offsets are character
    /// offsets, not byte offsets).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Error raised by a structural operation with a violated precondition.
/// The core never clamps or silently fixes collaborator input.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("offset {offset} out of range for line of length {len}")]
    InvalidOffset { offset: usize, len: usize },
    #[error("operation requires a {expected:?} line, found {found:?}")]
    InvalidBlockType {
        expected: BlockType,
        found: BlockType,
    },
    #[error("line still holds {len} characters")]
    LineNotEmpty { len: usize },
    #[error("line no longer exists in the document")]
    UnknownLine,
}

/// A render/focus instruction returned by a structural operation: the line
/// needs re-rendering, with the caret requested at `offset`. When an
/// operation returns several instructions, the last one carries the caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub line: LineId,
    pub offset: usize,
}

/// An ordered, editable sequence of typed lines.
#[derive(Clone, Debug, Default)]
pub struct Document {
    slab: Vec<Option<Line>>,
    first: Option<LineId>,
    last: Option<LineId>,
    len: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from raw source lines.
    ///
    /// Runs the preformatted state machine top to bottom: a toggle line
    /// opens an accumulator, every following non-toggle line is appended
    /// raw, and the closing toggle emits a single `Preformatted` line whose
    /// text joins the accumulated lines with `\n`. Neither toggle line
    /// produces a line of its own. All other input lines are classified
    /// individually.
    ///
    /// An unterminated block (opening toggle without a closing one) emits
    /// nothing: the accumulated content is dropped. Authors must pair their
    /// toggle tokens; this mirrors the source format, which has no
    /// end-of-input error concept.
    pub fn build<I, S>(source_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document = Self::new();
        let mut accumulator: Option<Vec<String>> = None;

        for raw in source_lines {
            let raw = raw.as_ref();
            match accumulator.as_mut() {
                Some(collected) => {
                    if is_toggle_line(raw) {
                        let text = collected.join("\n");
                        document.push_back(Line::new(BlockType::Preformatted, text));
                        accumulator = None;
                    } else {
                        collected.push(raw.to_string());
                    }
                }
                None => {
                    if is_toggle_line(raw) {
                        accumulator = Some(Vec::new());
                    } else {
                        let classified = classify(raw);
                        document
                            .push_back(Line::new(classified.block_type, classified.text));
                    }
                }
            }
        }

        document
    }

    pub fn first(&self) -> Option<LineId> {
        self.first
    }

    pub fn last(&self) -> Option<LineId> {
        self.last
    }

    pub fn line_count(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.slab.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.slab.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.get(id).and_then(|line| line.next)
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.get(id).and_then(|line| line.prev)
    }

    /// Forward iteration over `(LineId, &Line)` in document order.
    pub fn iter(&self) -> Lines<'_> {
        Lines {
            document: self,
            cursor: self.first,
        }
    }

    fn alloc(&mut self, line: Line) -> LineId {
        let id = LineId(self.slab.len());
        self.slab.push(Some(line));
        self.len += 1;
        id
    }

    /// Append a line at the end of the document.
    pub fn push_back(&mut self, line: Line) -> LineId {
        let id = self.alloc(line);
        match self.last {
            Some(last_id) => {
                if let Some(last) = self.get_mut(last_id) {
                    last.next = Some(id);
                }
                if let Some(new) = self.get_mut(id) {
                    new.prev = Some(last_id);
                }
            }
            None => self.first = Some(id),
        }
        self.last = Some(id);
        id
    }

    /// Insert a line immediately after `after`, returning its handle.
    pub fn insert_after(&mut self, after: LineId, line: Line) -> Result<LineId, EditError> {
        let follower = self.get(after).ok_or(EditError::UnknownLine)?.next;
        let id = self.alloc(line);
        if let Some(new) = self.get_mut(id) {
            new.prev = Some(after);
            new.next = follower;
        }
        if let Some(prev) = self.get_mut(after) {
            prev.next = Some(id);
        }
        match follower {
            Some(next_id) => {
                if let Some(next) = self.get_mut(next_id) {
                    next.prev = Some(id);
                }
            }
            None => self.last = Some(id),
        }
        Ok(id)
    }

    /// Unlink a line from the sequence and return it. The handle becomes
    /// stale; later operations on it report [`EditError::UnknownLine`].
    pub fn remove(&mut self, id: LineId) -> Option<Line> {
        let line = self.slab.get_mut(id.0)?.take()?;
        self.len -= 1;
        match line.prev {
            Some(prev_id) => {
                if let Some(prev) = self.get_mut(prev_id) {
                    prev.next = line.next;
                }
            }
            None => self.first = line.next,
        }
        match line.next {
            Some(next_id) => {
                if let Some(next) = self.get_mut(next_id) {
                    next.prev = line.prev;
                }
            }
            None => self.last = line.prev,
        }
        Some(line)
    }

    /// Split a line at a character offset: the line keeps the head, a new
    /// plain `Paragraph` successor takes the tail. A fresh split-off tail
    /// starts unclassified regardless of the original block type. The caret
    /// is requested at the start of the new line.
    ///
    /// Preformatted lines are rejected: their text may embed newlines, which
    /// only preformatted lines may hold, so a tail split out of one could
    /// not become a paragraph. Use
    /// [`insert_raw_newline_at`](Self::insert_raw_newline_at) instead.
    pub fn split_at(&mut self, id: LineId, offset: usize) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.get_mut(id).ok_or(EditError::UnknownLine)?;
        if line.block_type == BlockType::Preformatted {
            return Err(EditError::InvalidBlockType {
                expected: BlockType::Paragraph,
                found: BlockType::Preformatted,
            });
        }
        let len = line.char_len();
        if offset > len {
            return Err(EditError::InvalidOffset { offset, len });
        }
        let byte_idx = char_to_byte_idx(&line.text, offset);
        let tail = line.text.split_off(byte_idx);
        let new_id = self.insert_after(id, Line::new(BlockType::Paragraph, tail))?;
        Ok(vec![
            FocusRequest { line: id, offset },
            FocusRequest {
                line: new_id,
                offset: 0,
            },
        ])
    }

    /// Insert a literal newline into a preformatted line. Preformatted
    /// blocks are one logical multi-line unit, so they grow in place
    /// instead of gaining a successor line.
    pub fn insert_raw_newline_at(
        &mut self,
        id: LineId,
        offset: usize,
    ) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.get_mut(id).ok_or(EditError::UnknownLine)?;
        if line.block_type != BlockType::Preformatted {
            return Err(EditError::InvalidBlockType {
                expected: BlockType::Preformatted,
                found: line.block_type,
            });
        }
        let len = line.char_len();
        if offset > len {
            return Err(EditError::InvalidOffset { offset, len });
        }
        let byte_idx = char_to_byte_idx(&line.text, offset);
        line.text.insert(byte_idx, '\n');
        Ok(vec![FocusRequest {
            line: id,
            offset: offset + 1,
        }])
    }

    /// Merge a line into its predecessor. The predecessor keeps its block
    /// type even when the concatenated text would freshly match a different
    /// prefix: classification only ever changes on direct text-mutation
    /// events. On the first line this is a no-op, not an error: deleting
    /// backward past the start of the document is a deliberate boundary.
    pub fn merge_with_previous(&mut self, id: LineId) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.get(id).ok_or(EditError::UnknownLine)?;
        let Some(prev_id) = line.prev else {
            return Ok(Vec::new());
        };
        // remove() cannot fail here: get() above proved the line is live.
        let Some(removed) = self.remove(id) else {
            return Err(EditError::UnknownLine);
        };
        let prev = self.get_mut(prev_id).ok_or(EditError::UnknownLine)?;
        let join_point = prev.char_len();
        prev.text.push_str(&removed.text);
        Ok(vec![FocusRequest {
            line: prev_id,
            offset: join_point,
        }])
    }

    /// Remove an empty line, moving the caret to the end of its
    /// predecessor. Callers use this for "backspace deletes an empty line
    /// into the previous one"; the line contributes no text, so unlike
    /// [`merge_with_previous`](Self::merge_with_previous) nothing is
    /// appended. A line that still holds text is rejected rather than
    /// discarded. No-op on the first line.
    pub fn remove_empty_line(&mut self, id: LineId) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.get(id).ok_or(EditError::UnknownLine)?;
        if !line.text.is_empty() {
            return Err(EditError::LineNotEmpty {
                len: line.char_len(),
            });
        }
        let Some(prev_id) = line.prev else {
            return Ok(Vec::new());
        };
        self.remove(id);
        let prev = self.get(prev_id).ok_or(EditError::UnknownLine)?;
        Ok(vec![FocusRequest {
            line: prev_id,
            offset: prev.char_len(),
        }])
    }

    /// Strip a line back to a plain paragraph without touching its text.
    /// Used when the operator explicitly unformats a line.
    pub fn demote(&mut self, id: LineId) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.get_mut(id).ok_or(EditError::UnknownLine)?;
        line.block_type = BlockType::Paragraph;
        Ok(vec![FocusRequest { line: id, offset: 0 }])
    }

    /// Serialize back to raw source lines: token, one separator, text.
    /// Preformatted lines re-emit their toggle pair around each embedded
    /// segment as its own raw line.
    pub fn to_source_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        for (_, line) in self.iter() {
            match line.block_type {
                BlockType::Paragraph => out.push(line.text.clone()),
                BlockType::Preformatted => {
                    out.push(TOGGLE_TOKEN.to_string());
                    for segment in line.text.split('\n') {
                        out.push(segment.to_string());
                    }
                    out.push(TOGGLE_TOKEN.to_string());
                }
                other => out.push(format!("{} {}", other.token(), line.text)),
            }
        }
        out
    }

    /// Walk the sequence in both directions and verify the link structure:
    /// `next`/`prev` are mutual inverses, the walk covers every live line
    /// exactly once, and only preformatted lines embed newlines. Meant for
    /// tests; a corrupt document returns false rather than panicking.
    pub fn check_links(&self) -> bool {
        let mut forward = Vec::new();
        let mut cursor = self.first;
        while let Some(id) = cursor {
            let Some(line) = self.get(id) else {
                return false;
            };
            if line.text.contains('\n') && line.block_type != BlockType::Preformatted {
                return false;
            }
            forward.push(id);
            if forward.len() > self.len {
                // cycle
                return false;
            }
            cursor = line.next;
        }
        if forward.len() != self.len {
            return false;
        }
        if forward.last().copied() != self.last {
            return false;
        }

        let mut backward = Vec::new();
        let mut cursor = self.last;
        while let Some(id) = cursor {
            let Some(line) = self.get(id) else {
                return false;
            };
            backward.push(id);
            if backward.len() > self.len {
                return false;
            }
            cursor = line.prev;
        }
        backward.reverse();
        forward == backward
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for source_line in self.to_source_lines() {
            writeln!(f, "{source_line}")?;
        }
        Ok(())
    }
}

/// Forward iterator over document lines.
pub struct Lines<'a> {
    document: &'a Document,
    cursor: Option<LineId>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = (LineId, &'a Line);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let line = self.document.get(id)?;
        self.cursor = line.next;
        Some((id, line))
    }
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
