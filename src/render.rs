//! Rendering of a document to terminal rows.
//!
//! Each document line becomes one or more styled visual rows (long lines
//! wrap at the viewport width, preformatted blocks never wrap). The caret
//! is mapped from its character offset to a visual row and column so the
//! terminal cursor can be placed.

use ratatui::{
    style::Style,
    text::{Line as UiLine, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{Line, LineMode};
use crate::editor::EditSession;
use crate::gemtext::{BlockType, TOGGLE_TOKEN};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug)]
pub struct CursorVisualPosition {
    pub line: usize,
    pub column: u16,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<UiLine<'static>>,
    pub cursor: Option<CursorVisualPosition>,
    pub total_lines: usize,
}

pub fn render_session(session: &EditSession, width: usize, theme: &Theme) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), theme);
    let caret = session.caret();
    for (id, line) in session.document().iter() {
        let caret_offset = caret.filter(|c| c.line == id).map(|c| c.offset);
        renderer.render_line(line, caret_offset);
    }
    renderer.finish()
}

struct Renderer<'a> {
    wrap_width: usize,
    theme: &'a Theme,
    lines: Vec<UiLine<'static>>,
    cursor: Option<CursorVisualPosition>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, theme: &'a Theme) -> Self {
        Self {
            wrap_width,
            theme,
            lines: Vec::new(),
            cursor: None,
        }
    }

    fn render_line(&mut self, line: &Line, caret: Option<usize>) {
        match line.block_type {
            BlockType::Paragraph => {
                self.push_wrapped(None, &line.text, Style::default(), caret);
            }
            BlockType::H1 => {
                self.push_wrapped(None, &line.text, self.theme.heading_style(1), caret)
            }
            BlockType::H2 => {
                self.push_wrapped(None, &line.text, self.theme.heading_style(2), caret)
            }
            BlockType::H3 => {
                self.push_wrapped(None, &line.text, self.theme.heading_style(3), caret)
            }
            BlockType::Quote => {
                let prefix = Span::styled("| ", self.theme.quote_style());
                self.push_wrapped(Some(prefix), &line.text, self.theme.quote_style(), caret);
            }
            BlockType::ListItem => {
                let prefix = Span::styled("• ", self.theme.list_marker_style());
                self.push_wrapped(Some(prefix), &line.text, Style::default(), caret);
            }
            BlockType::Link => self.render_link(line, caret),
            BlockType::Preformatted => self.render_preformatted(line, caret),
        }
    }

    /// A committed link shows its label (or the URL when there is no
    /// label); in editing mode the raw `url label` text is shown as-is.
    fn render_link(&mut self, line: &Line, caret: Option<usize>) {
        match line.mode {
            LineMode::Editing => {
                let prefix = Span::styled("=> ", self.theme.link_edit_style());
                self.push_wrapped(Some(prefix), &line.text, self.theme.link_edit_style(), caret);
            }
            LineMode::Committed => {
                let label = match line.text.find(' ') {
                    Some(sp) if sp > 0 => &line.text[sp + 1..],
                    _ => line.text.as_str(),
                };
                self.push_wrapped(None, label, self.theme.link_style(), None);
            }
        }
    }

    /// Preformatted blocks render as a fence row, one unwrapped row per
    /// embedded segment, and a closing fence row. The caret offset indexes
    /// the joined text, so segment boundaries account for the `\n` between
    /// them.
    fn render_preformatted(&mut self, line: &Line, caret: Option<usize>) {
        self.push_fence();
        let mut segment_start = 0;
        let mut caret_remaining = caret;
        for segment in line.text.split('\n') {
            let segment_len = segment.chars().count();
            let caret_here = match caret_remaining {
                Some(offset) if offset >= segment_start && offset <= segment_start + segment_len => {
                    caret_remaining = None;
                    Some(offset - segment_start)
                }
                _ => None,
            };
            self.push_unwrapped(segment, self.theme.preformatted_style(), caret_here);
            segment_start += segment_len + 1;
        }
        self.push_fence();
    }

    fn push_fence(&mut self) {
        self.lines.push(UiLine::from(Span::styled(
            TOGGLE_TOKEN,
            self.theme.fence_style(),
        )));
    }

    fn push_unwrapped(&mut self, text: &str, style: Style, caret: Option<usize>) {
        self.emit(None, text, style, caret, usize::MAX / 4);
    }

    fn push_wrapped(
        &mut self,
        prefix: Option<Span<'static>>,
        text: &str,
        style: Style,
        caret: Option<usize>,
    ) {
        self.emit(prefix, text, style, caret, self.wrap_width);
    }

    fn emit(
        &mut self,
        prefix: Option<Span<'static>>,
        text: &str,
        style: Style,
        caret: Option<usize>,
        wrap_width: usize,
    ) {
        let prefix_width = prefix.as_ref().map(|span| span.width()).unwrap_or(0);
        let available = wrap_width.saturating_sub(prefix_width).max(1);
        let chars: Vec<char> = text.chars().collect();

        // Row boundaries as char-index ranges into `chars`.
        let mut rows: Vec<(usize, usize)> = Vec::new();
        let mut row_start = 0;
        let mut row_width = 0;
        for (idx, ch) in chars.iter().enumerate() {
            let ch_width = UnicodeWidthChar::width(*ch).unwrap_or(0);
            if row_width + ch_width > available && idx > row_start {
                rows.push((row_start, idx));
                row_start = idx;
                row_width = 0;
            }
            row_width += ch_width;
        }
        rows.push((row_start, chars.len()));

        let indent = " ".repeat(prefix_width);
        let row_count = rows.len();
        for (row_idx, (start, end)) in rows.into_iter().enumerate() {
            let mut spans = Vec::new();
            if row_idx == 0 {
                if let Some(span) = prefix.clone() {
                    spans.push(span);
                }
            } else if prefix_width > 0 {
                spans.push(Span::raw(indent.clone()));
            }
            let row_text: String = chars[start..end].iter().collect();
            spans.push(Span::styled(row_text, style));

            if let Some(offset) = caret {
                let last_row = row_idx + 1 == row_count;
                if self.cursor.is_none()
                    && offset >= start
                    && (offset < end || (last_row && offset == end))
                {
                    let column: usize = prefix_width
                        + chars[start..offset]
                            .iter()
                            .map(|ch| UnicodeWidthChar::width(*ch).unwrap_or(0))
                            .sum::<usize>();
                    self.cursor = Some(CursorVisualPosition {
                        line: self.lines.len(),
                        column: column as u16,
                    });
                }
            }

            self.lines.push(UiLine::from(spans));
        }
    }

    fn finish(self) -> RenderResult {
        let total_lines = self.lines.len();
        RenderResult {
            lines: self.lines,
            cursor: self.cursor,
            total_lines,
        }
    }
}
