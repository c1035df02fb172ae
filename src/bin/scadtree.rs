use std::{
    env,
    fs::OpenOptions,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
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
    layout::{Constraint, Direction, Layout, Position},
    text::{Line, Span, Text},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

use scad_tree::{
    EditorConfig, EditorSession, Tree,
    commands::{self, Key},
    import_file,
    render::{Viewport, adjust_scroll, render_tree},
    theme::Theme,
};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const PROMPT_LABEL: &str = "New node: ";

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(path_arg) = args.next() else {
        eprintln!("Usage: scadtree <file.scad>");
        return Ok(());
    };
    let path = PathBuf::from(path_arg);

    let config = EditorConfig::from_env();
    init_logging(&config)?;

    let (tree, initial_status) = load_document(&path)?;
    let mut app = App::new(tree, path, &config, initial_status);

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

/// The terminal belongs to the UI, so logs only go to a file, and only when
/// one is configured.
fn init_logging(config: &EditorConfig) -> Result<()> {
    let Some(log_file) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(file = %log_file.display(), "logging started");
    Ok(())
}

fn load_document(path: &Path) -> Result<(Tree, Option<String>)> {
    if !path.exists() {
        return Ok((Tree::document(), Some("New document".to_string())));
    }
    match import_file(path) {
        Ok(tree) => Ok((tree, None)),
        Err(scad_tree::DocumentError::Io(err)) => {
            Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
        Err(err) => {
            let message = format!("{err}. Starting with empty document.");
            Ok((Tree::document(), Some(message)))
        }
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
            app.handle_event(evt);
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct App {
    session: EditorSession,
    theme: Theme,
    display_indent: usize,
    fixed_page_size: bool,
    scroll_top: usize,
    force_quit: bool,
}

impl App {
    fn new(tree: Tree, path: PathBuf, config: &EditorConfig, initial_status: Option<String>) -> Self {
        let mut session = EditorSession::new(tree, config).with_path(path);
        if let Some(message) = initial_status {
            session.set_status(message);
        }
        Self {
            session,
            theme: Theme::default(),
            display_indent: config.display_indent,
            fixed_page_size: config.page_size > 0,
            scroll_top: 0,
            force_quit: false,
        }
    }

    fn should_quit(&self) -> bool {
        self.force_quit || self.session.should_quit()
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let tree_area = vertical[0];
        let status_area = vertical[1];

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(tree_area);
        let text_area = horizontal[0];
        let scrollbar_area = horizontal[1];

        let viewport_height = usize::from(text_area.height).max(1);
        if !self.fixed_page_size {
            self.session.set_page_size(viewport_height);
        }

        let tree = self.session.tree();
        let selection = self.session.selection();
        let selected_height = tree[selection].descendants() + 1;
        self.scroll_top = adjust_scroll(
            self.scroll_top,
            self.session.selection_offset(),
            selected_height,
            viewport_height,
            tree.len(),
        );

        let viewport = Viewport {
            scroll_top: self.scroll_top,
            height: viewport_height,
            width: usize::from(text_area.width),
            indent: self.display_indent,
        };
        let render = render_tree(tree, selection, viewport, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(render.lines)), text_area);

        let mut scrollbar_state = ScrollbarState::new(render.total_lines).position(self.scroll_top);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);

        if let Some(prompt) = self.session.prompt() {
            let text = format!("{PROMPT_LABEL}{prompt}");
            let column = text.width().min(usize::from(status_area.width.saturating_sub(1)));
            let widget = Paragraph::new(Line::from(Span::styled(text, self.theme.prompt_style())))
                .style(self.theme.prompt_style());
            frame.render_widget(widget, status_area);
            frame.set_cursor_position(Position::new(
                status_area.x + column as u16,
                status_area.y,
            ));
        } else {
            let status = self.status_line(usize::from(status_area.width));
            let widget = Paragraph::new(status).style(self.theme.status_bar_style());
            frame.render_widget(widget, status_area);
        }
    }

    /// Clipboard contents on the left, key help on the right.
    fn status_line(&mut self, width: usize) -> Line<'static> {
        self.session.prune_status(STATUS_TIMEOUT);

        let marker = if self.session.is_dirty() { "*" } else { "" };
        let file_name = self
            .session
            .path()
            .map(|path| format!("{}{marker}", path.display()))
            .unwrap_or_default();
        let mut left = self.session.clipboard().describe();
        if let Some(message) = self.session.status() {
            left = format!("{left} | {message}");
        }

        let middle = format!(" | {file_name}");
        let help = commands::HELP;
        let used = left.width() + middle.width() + help.width();
        let gap = " ".repeat(width.saturating_sub(used).max(1));

        Line::from(vec![
            Span::styled(left, self.theme.status_bar_style()),
            Span::styled(middle, self.theme.filename_style()),
            Span::styled(gap, self.theme.status_bar_style()),
            Span::styled(help, self.theme.status_bar_style()),
        ])
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return;
        };

        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.force_quit = true;
            return;
        }

        if self.session.prompt().is_some() {
            self.handle_prompt_key(code);
            return;
        }

        let key = match code {
            KeyCode::Char(ch)
                if !modifiers.contains(KeyModifiers::CONTROL)
                    && !modifiers.contains(KeyModifiers::ALT) =>
            {
                Key::Char(ch)
            }
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => return,
        };
        if let Err(err) = commands::dispatch(&mut self.session, key) {
            self.session.set_status(err.to_string());
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let content = self.session.take_prompt().unwrap_or_default();
                if let Err(err) = commands::insert_child(&mut self.session, &content) {
                    self.session.set_status(err.to_string());
                }
            }
            KeyCode::Esc => {
                self.session.take_prompt();
            }
            KeyCode::Backspace => self.session.prompt_backspace(),
            KeyCode::Char(ch) => self.session.prompt_push(ch),
            _ => {}
        }
    }

    fn on_tick(&mut self) {
        self.session.prune_status(STATUS_TIMEOUT);
    }
}
