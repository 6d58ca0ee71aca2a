//! Gemtext line classification.
//!
//! Every line of a Gemtext document belongs to exactly one block type,
//! selected by a literal prefix token. Classification is a pure function
//! of the raw line text; everything after the token (and one optional
//! separator character) is kept verbatim.

/// Non-breaking space, accepted as a separator after a prefix token.
pub const NBSP: char = '\u{a0}';

/// The toggle token delimiting preformatted blocks.
pub const TOGGLE_TOKEN: &str = "```";

/// Structural category of a single document line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    H1,
    H2,
    H3,
    Link,
    Quote,
    ListItem,
    Preformatted,
}

// Priority order matters: a token must be tested before any shorter token
// that is its prefix ("###" before "##" before "#").
const TOKENS: [(&str, BlockType); 7] = [
    ("###", BlockType::H3),
    ("##", BlockType::H2),
    ("#", BlockType::H1),
    ("=>", BlockType::Link),
    (">", BlockType::Quote),
    ("*", BlockType::ListItem),
    (TOGGLE_TOKEN, BlockType::Preformatted),
];

impl BlockType {
    /// The prefix token that produces this block type. `Paragraph` has no
    /// token and returns the empty string.
    pub fn token(self) -> &'static str {
        match self {
            BlockType::Paragraph => "",
            BlockType::H1 => "#",
            BlockType::H2 => "##",
            BlockType::H3 => "###",
            BlockType::Link => "=>",
            BlockType::Quote => ">",
            BlockType::ListItem => "*",
            BlockType::Preformatted => TOGGLE_TOKEN,
        }
    }

    /// Human-readable label, used in the status bar.
    pub fn label(self) -> &'static str {
        match self {
            BlockType::Paragraph => "Paragraph",
            BlockType::H1 => "Heading 1",
            BlockType::H2 => "Heading 2",
            BlockType::H3 => "Heading 3",
            BlockType::Link => "Link",
            BlockType::Quote => "Quote",
            BlockType::ListItem => "List item",
            BlockType::Preformatted => "Preformatted",
        }
    }
}

/// Result of classifying one raw line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub block_type: BlockType,
    /// The line with the token (and one separator, if consumed) stripped.
    pub text: String,
    /// Whether a separator followed the token. A token only takes effect
    /// during reclassification when this is true, so a literal `#hashtag`
    /// never turns into a heading mid-word.
    pub consumed_separator: bool,
}

/// Classify a raw line against the token table.
///
/// The first token in priority order that is a literal prefix of `raw`
/// wins. If the character immediately after the token is a space or a
/// non-breaking space, that single character is consumed as a separator.
/// When nothing matches the line is a plain paragraph.
pub fn classify(raw: &str) -> Classified {
    for (token, block_type) in TOKENS {
        if let Some(rest) = raw.strip_prefix(token) {
            let mut chars = rest.chars();
            return match chars.next() {
                Some(ch) if ch == ' ' || ch == NBSP => Classified {
                    block_type,
                    text: chars.as_str().to_string(),
                    consumed_separator: true,
                },
                _ => Classified {
                    block_type,
                    text: rest.to_string(),
                    consumed_separator: false,
                },
            };
        }
    }

    Classified {
        block_type: BlockType::Paragraph,
        text: raw.to_string(),
        consumed_separator: false,
    }
}

/// Whether a raw source line opens or closes a preformatted block.
/// Toggle detection at load time does not require a separator.
pub fn is_toggle_line(raw: &str) -> bool {
    raw.starts_with(TOGGLE_TOKEN)
}

#[cfg(test)]
#[path = "gemtext_tests.rs"]
mod gemtext_tests;
