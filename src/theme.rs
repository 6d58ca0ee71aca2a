use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the editor
#[derive(Clone, Debug)]
pub struct Theme {
    /// Background color for the editor
    pub background: Color,

    /// Foreground (text) color for the status bar
    pub status_bar_fg: Color,

    /// Background color for the status bar
    pub status_bar_bg: Color,

    /// Color for the current file name in the status bar
    pub filename_color: Color,

    /// Color for heading lines
    pub heading_color: Color,

    /// Color for link lines
    pub link_color: Color,

    /// Color for quote lines
    pub quote_color: Color,

    /// Color for the list item marker
    pub list_marker_color: Color,

    /// Foreground color for preformatted blocks
    pub preformatted_fg: Color,

    /// Color for the preformatted block fences
    pub fence_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            heading_color: Color::LightCyan,
            link_color: Color::Blue,
            quote_color: Color::Green,
            list_marker_color: Color::Yellow,
            preformatted_fg: Color::Gray,
            fence_color: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Create a new theme with default colors
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the style for the status bar
    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    /// Get the style for the filename in the status bar
    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    /// Get the style for heading lines (all three levels are bold, deeper
    /// levels drop the accent color)
    pub fn heading_style(&self, level: u8) -> Style {
        let style = Style::default().add_modifier(Modifier::BOLD);
        if level == 1 {
            style.fg(self.heading_color)
        } else {
            style
        }
    }

    /// Get the style for committed link lines
    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Get the style for a link line in its raw editable form
    pub fn link_edit_style(&self) -> Style {
        Style::default().fg(self.link_color)
    }

    /// Get the style for quote lines
    pub fn quote_style(&self) -> Style {
        Style::default()
            .fg(self.quote_color)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get the style for the list item marker
    pub fn list_marker_style(&self) -> Style {
        Style::default().fg(self.list_marker_color)
    }

    /// Get the style for preformatted block content
    pub fn preformatted_style(&self) -> Style {
        Style::default().fg(self.preformatted_fg)
    }

    /// Get the style for preformatted block fences
    pub fn fence_style(&self) -> Style {
        Style::default().fg(self.fence_color)
    }
}
