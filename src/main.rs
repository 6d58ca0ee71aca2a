use std::{
    env, fs, io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use gem_tui::document::{Document, EditError, FocusRequest};
use gem_tui::editor::EditSession;
use gem_tui::render::render_session;
use gem_tui::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(path_arg) = args.next() else {
        eprintln!("Usage: cargo run -- <file.gmi>");
        return Ok(());
    };
    let path = PathBuf::from(path_arg);

    let (document, initial_status) = load_document(&path)?;
    let mut app = App::new(document, path, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn load_document(path: &PathBuf) -> Result<(Document, Option<String>)> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let document = Document::build(content.lines());
        Ok((document, None))
    } else {
        Ok((
            Document::build([""]),
            Some("New document".to_string()),
        ))
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct App {
    session: EditSession,
    path: PathBuf,
    theme: Theme,
    dirty: bool,
    quit_armed: bool,
    should_quit: bool,
    scroll: usize,
    status: Option<(String, Instant)>,
}

impl App {
    fn new(document: Document, path: PathBuf, initial_status: Option<String>) -> Self {
        Self {
            session: EditSession::new(document),
            path,
            theme: Theme::new(),
            dirty: false,
            quit_armed: false,
            should_quit: false,
            scroll: 0,
            status: initial_status.map(|message| (message, Instant::now())),
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn on_tick(&mut self) {
        if let Some((_, since)) = &self.status {
            if since.elapsed() >= STATUS_TIMEOUT {
                self.status = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        self.draw_editor(frame, chunks[0]);
        self.draw_status_bar(frame, chunks[1]);
    }

    fn draw_editor(&mut self, frame: &mut Frame, area: Rect) {
        let result = render_session(&self.session, area.width as usize, &self.theme);

        let viewport_rows = area.height as usize;
        if let Some(cursor) = result.cursor {
            if cursor.line < self.scroll {
                self.scroll = cursor.line;
            } else if viewport_rows > 0 && cursor.line >= self.scroll + viewport_rows {
                self.scroll = cursor.line + 1 - viewport_rows;
            }
        }
        if result.total_lines <= viewport_rows {
            self.scroll = 0;
        } else if self.scroll > result.total_lines - viewport_rows {
            self.scroll = result.total_lines - viewport_rows;
        }

        let paragraph = Paragraph::new(Text::from(result.lines))
            .style(Style::default().bg(self.theme.background))
            .scroll((self.scroll as u16, 0));
        frame.render_widget(paragraph, area);

        if let Some(cursor) = result.cursor {
            if cursor.line >= self.scroll && cursor.line < self.scroll + viewport_rows {
                frame.set_cursor_position(Position::new(
                    area.x + cursor.column.min(area.width.saturating_sub(1)),
                    area.y + (cursor.line - self.scroll) as u16,
                ));
            }
        }
    }

    fn draw_status_bar(&self, frame: &mut Frame, area: Rect) {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        let dirty_marker = if self.dirty { " *" } else { "" };

        let block_label = self
            .session
            .caret()
            .and_then(|caret| self.session.document().get(caret.line))
            .map(|line| line.block_type.label())
            .unwrap_or("");

        let message = match &self.status {
            Some((message, _)) => message.clone(),
            None => block_label.to_string(),
        };

        let line = Line::from(vec![
            Span::styled(format!(" {file_name}{dirty_marker} "), self.theme.filename_style()),
            Span::raw("| "),
            Span::raw(message),
        ]);
        let bar = Paragraph::new(line).style(self.theme.status_bar_style());
        frame.render_widget(bar, area);
    }

    fn handle_event(&mut self, evt: Event) -> Result<()> {
        if let Event::Key(key) = evt {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key)?;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c') => self.request_quit(),
                KeyCode::Char('s') => self.save()?,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => self.edit(|session| session.insert_break()),
            KeyCode::Backspace => self.edit(|session| session.delete_backward()),
            KeyCode::Char(ch) => self.edit(move |session| session.insert_char(ch)),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Up => {
                self.session.focus_prev();
            }
            KeyCode::Down => {
                self.session.focus_next();
            }
            KeyCode::Home => self.move_to_offset(0),
            KeyCode::End => self.move_to_line_end(),
            _ => {}
        }
        Ok(())
    }

    fn edit(
        &mut self,
        op: impl FnOnce(&mut EditSession) -> Result<Vec<FocusRequest>, EditError>,
    ) {
        match op(&mut self.session) {
            Ok(_) => {
                self.dirty = true;
                self.quit_armed = false;
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    fn move_left(&mut self) {
        if self.session.is_caret_at_start() {
            self.session.focus_prev();
        } else if let Some(caret) = self.session.caret() {
            let _ = self.session.move_to(caret.line, caret.offset - 1);
        }
    }

    fn move_right(&mut self) {
        if self.session.is_caret_at_end() {
            self.session.focus_next();
        } else if let Some(caret) = self.session.caret() {
            let _ = self.session.move_to(caret.line, caret.offset + 1);
        }
    }

    fn move_to_offset(&mut self, offset: usize) {
        if let Some(caret) = self.session.caret() {
            let _ = self.session.move_to(caret.line, offset);
        }
    }

    fn move_to_line_end(&mut self) {
        if let Some(caret) = self.session.caret() {
            let len = self
                .session
                .document()
                .get(caret.line)
                .map(|line| line.char_len())
                .unwrap_or(0);
            let _ = self.session.move_to(caret.line, len);
        }
    }

    fn request_quit(&mut self) {
        if self.dirty && !self.quit_armed {
            self.quit_armed = true;
            self.set_status("Unsaved changes, press Ctrl+Q again to quit");
        } else {
            self.should_quit = true;
        }
    }

    fn save(&mut self) -> Result<()> {
        fs::write(&self.path, self.session.document().to_string())
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        self.dirty = false;
        self.set_status("Saved");
        Ok(())
    }
}
