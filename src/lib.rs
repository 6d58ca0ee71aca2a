//! gem-tui: a structural editor for Gemtext documents.
//!
//! The document model lives in [`document`] (typed lines in a handle-linked
//! arena), line classification in [`gemtext`], and the caret-aware editing
//! session in [`editor`]. [`render`] and [`theme`] turn a session into
//! styled terminal rows for the TUI frontend.

pub mod document;
pub mod editor;
pub mod gemtext;
pub mod render;
pub mod theme;
