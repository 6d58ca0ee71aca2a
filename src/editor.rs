//! The editing session: caret state and edit-event mediation.
//!
//! [`EditSession`] owns a [`Document`] plus the caret and translates the
//! collaborator's events (text mutations, enter, backspace, focus moves)
//! into the document's structural operations. Reclassification runs here:
//! every text-mutation event whose stored result is not a multi-line
//! preformatted body re-runs the line through [`classify`], and a token
//! followed by a separator transitions the line to its new block type.

use crate::document::{
    Document, EditError, FocusRequest, Line, LineId, LineMode, char_to_byte_idx,
};
use crate::gemtext::{BlockType, classify};

/// Caret position: a line handle plus a character offset into its text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caret {
    pub line: LineId,
    pub offset: usize,
}

/// A single-document editing session. One session owns one document; all
/// operations are synchronous and run to completion before returning, in
/// the order the triggering input events were delivered.
pub struct EditSession {
    document: Document,
    caret: Option<Caret>,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        let caret = document.first().map(|line| Caret { line, offset: 0 });
        let mut session = Self { document, caret };
        if let Some(caret) = session.caret {
            session.enter_line(caret.line);
        }
        session
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    /// Caret offset within a given line, or `None` when the caret is
    /// elsewhere (the collaborator's "unknown" answer).
    pub fn caret_offset_of(&self, id: LineId) -> Option<usize> {
        match self.caret {
            Some(caret) if caret.line == id => Some(caret.offset),
            _ => None,
        }
    }

    pub fn is_caret_at_start(&self) -> bool {
        self.caret.is_some_and(|caret| caret.offset == 0)
    }

    /// Whether the caret sits at the end of its line. Text ending in a
    /// literal newline treats the position just before that newline as the
    /// end as well.
    pub fn is_caret_at_end(&self) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        let Some(line) = self.document.get(caret.line) else {
            return false;
        };
        let len = line.char_len();
        caret.offset == len || (line.text.ends_with('\n') && caret.offset + 1 == len)
    }

    /// Place the caret on a line, clamping the offset to the line length.
    /// Switching lines runs the commit/edit transitions for both ends.
    pub fn move_to(&mut self, id: LineId, offset: usize) -> Result<(), EditError> {
        let len = self
            .document
            .get(id)
            .ok_or(EditError::UnknownLine)?
            .char_len();
        let previous = self.caret.map(|caret| caret.line);
        self.caret = Some(Caret {
            line: id,
            offset: offset.min(len),
        });
        if previous != Some(id) {
            if let Some(old) = previous {
                self.leave_line(old);
            }
            self.enter_line(id);
        }
        Ok(())
    }

    /// Move the caret to the end of the previous line. Returns false at the
    /// top of the document.
    pub fn focus_prev(&mut self) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        let Some(prev_id) = self.document.prev(caret.line) else {
            return false;
        };
        let offset = self.document.get(prev_id).map(Line::char_len).unwrap_or(0);
        self.move_to(prev_id, offset).is_ok()
    }

    /// Move the caret to the start of the next line. Returns false at the
    /// bottom of the document.
    pub fn focus_next(&mut self) -> bool {
        let Some(caret) = self.caret else {
            return false;
        };
        let Some(next_id) = self.document.next(caret.line) else {
            return false;
        };
        self.move_to(next_id, 0).is_ok()
    }

    /// Deliver a text-mutation event: the operator's raw text for a line
    /// changed. Stores the new text and, unless the stored result is still a
    /// multi-line preformatted body, re-runs classification. A matched token only
    /// transitions the line when it was followed by a separator, and only
    /// when the resulting type actually differs. Returns the lines needing
    /// re-render (empty when only the text changed).
    pub fn apply_text_edit(
        &mut self,
        id: LineId,
        new_text: &str,
    ) -> Result<Vec<FocusRequest>, EditError> {
        let line = self.document.get_mut(id).ok_or(EditError::UnknownLine)?;
        line.text = new_text.to_string();

        // Classification stays suspended while the stored text still spans
        // several preformatted rows. The gate looks at the text after the
        // edit: removing the last embedded newline re-arms it.
        if line.block_type == BlockType::Preformatted && new_text.contains('\n') {
            return Ok(Vec::new());
        }

        let classified = classify(new_text);
        if classified.consumed_separator && classified.block_type != line.block_type {
            line.block_type = classified.block_type;
            line.text = classified.text;
            return Ok(vec![FocusRequest { line: id, offset: 0 }]);
        }

        Ok(Vec::new())
    }

    /// Insert a character at the caret and run the reclassification check.
    pub fn insert_char(&mut self, ch: char) -> Result<Vec<FocusRequest>, EditError> {
        let caret = self.caret.ok_or(EditError::UnknownLine)?;
        let line = self
            .document
            .get(caret.line)
            .ok_or(EditError::UnknownLine)?;
        let mut text = line.text.clone();
        let byte_idx = char_to_byte_idx(&text, caret.offset);
        text.insert(byte_idx, ch);

        let requests = self.apply_text_edit(caret.line, &text)?;
        self.follow(&requests, || Caret {
            line: caret.line,
            offset: caret.offset + 1,
        });
        Ok(requests)
    }

    /// Handle Enter at the caret: split the line, or grow the preformatted
    /// block in place when the caret is inside one.
    pub fn insert_break(&mut self) -> Result<Vec<FocusRequest>, EditError> {
        let caret = self.caret.ok_or(EditError::UnknownLine)?;
        let line = self
            .document
            .get(caret.line)
            .ok_or(EditError::UnknownLine)?;
        let block_type = line.block_type;
        let requests = if block_type == BlockType::Preformatted {
            self.document
                .insert_raw_newline_at(caret.line, caret.offset)?
        } else {
            self.document.split_at(caret.line, caret.offset)?
        };
        self.follow(&requests, || caret);
        Ok(requests)
    }

    /// Handle Backspace at the caret.
    ///
    /// Mid-line it deletes the character before the caret and re-runs the
    /// classification check. At the start of a line the structural rules
    /// apply: a plain paragraph (or an empty preformatted line) merges into
    /// its predecessor, any other block type is demoted to a paragraph
    /// first, and a multi-line preformatted body is left alone; it has to
    /// be edited from within.
    pub fn delete_backward(&mut self) -> Result<Vec<FocusRequest>, EditError> {
        let caret = self.caret.ok_or(EditError::UnknownLine)?;
        let line = self
            .document
            .get(caret.line)
            .ok_or(EditError::UnknownLine)?;

        if caret.offset > 0 {
            let mut text = line.text.clone();
            let start = char_to_byte_idx(&text, caret.offset - 1);
            let end = char_to_byte_idx(&text, caret.offset);
            text.drain(start..end);
            let requests = self.apply_text_edit(caret.line, &text)?;
            self.follow(&requests, || Caret {
                line: caret.line,
                offset: caret.offset - 1,
            });
            return Ok(requests);
        }

        let block_type = line.block_type;
        let is_empty = line.text.is_empty();
        let multiline_preformatted =
            block_type == BlockType::Preformatted && line.text.contains('\n');
        let requests = match block_type {
            BlockType::Paragraph | BlockType::Preformatted if is_empty => {
                self.document.remove_empty_line(caret.line)?
            }
            BlockType::Paragraph => self.document.merge_with_previous(caret.line)?,
            _ if multiline_preformatted => Vec::new(),
            _ => self.document.demote(caret.line)?,
        };
        self.follow(&requests, || caret);
        Ok(requests)
    }

    /// Move the caret to the position an operation requested, or fall back
    /// to a caller-supplied position when the operation reported nothing.
    fn follow(&mut self, requests: &[FocusRequest], fallback: impl FnOnce() -> Caret) {
        let target = match requests.last() {
            Some(request) => Caret {
                line: request.line,
                offset: request.offset,
            },
            None => fallback(),
        };
        if self.document.get(target.line).is_some() {
            let _ = self.move_to(target.line, target.offset);
        } else {
            self.caret = None;
        }
    }

    /// Entering a link line switches it to its raw editable form.
    fn enter_line(&mut self, id: LineId) {
        if let Some(line) = self.document.get_mut(id) {
            if line.block_type == BlockType::Link {
                line.mode = LineMode::Editing;
            }
        }
    }

    /// Leaving a non-empty link line commits it back to its display form.
    /// An all-whitespace link stays editable so its text is not hidden
    /// behind an empty anchor.
    fn leave_line(&mut self, id: LineId) {
        if let Some(line) = self.document.get_mut(id) {
            if line.block_type == BlockType::Link && !line.text.trim().is_empty() {
                line.mode = LineMode::Committed;
            }
        }
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;
