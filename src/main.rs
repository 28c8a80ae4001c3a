use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use odds_terminal::feed;
use odds_terminal::preview_fetch::{PreviewData, RecentBlock};
use odds_terminal::snapshot::{MatchRow, MatchView};
use odds_terminal::state::{apply_delta, AppState, Delta, ProviderCommand, Screen};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.filter_input_active {
            self.on_filter_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('u') | KeyCode::Char('U') | KeyCode::Tab => {
                if self.state.screen == Screen::Board {
                    self.state.toggle_view();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.state.filter_input = self.state.filter().handicap_needle.clone();
                self.state.filter_input_active = true;
            }
            KeyCode::Char('c') => {
                self.state.clear_handicap_filter();
                self.state.push_log("[INFO] Handicap filter cleared");
            }
            KeyCode::Char('g') => self.state.cycle_goal_line_filter(),
            KeyCode::Char('p') | KeyCode::Enter => self.open_preview(),
            KeyCode::Char('b') | KeyCode::Esc => {
                self.state.screen = Screen::Board;
                self.state.preview_pending = None;
            }
            KeyCode::Char('r') => self.request_reload(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let needle = self.state.filter_input.clone();
                self.state.apply_handicap_filter(&needle);
                self.state.filter_input_active = false;
            }
            KeyCode::Esc => {
                self.state.filter_input.clear();
                self.state.filter_input_active = false;
            }
            KeyCode::Backspace => {
                self.state.filter_input.pop();
            }
            KeyCode::Char(ch) => self.state.filter_input.push(ch),
            _ => {}
        }
    }

    fn open_preview(&mut self) {
        let Some(row) = self.state.selected_row() else {
            self.state.push_log("[INFO] No match selected for preview");
            return;
        };
        let match_id = row.id.clone();
        self.state.screen = Screen::Preview {
            match_id: match_id.clone(),
        };
        if self.state.previews.contains_key(&match_id) {
            return;
        }
        self.request_preview(&match_id);
    }

    fn request_preview(&mut self, match_id: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Preview fetch unavailable");
            return;
        };
        if tx
            .send(ProviderCommand::FetchPreview {
                match_id: match_id.to_string(),
            })
            .is_err()
        {
            self.state.push_log("[WARN] Preview request failed");
        } else {
            self.state.preview_pending = Some(match_id.to_string());
            self.state.push_log("[INFO] Preview request sent");
        }
    }

    fn request_reload(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Snapshot reload unavailable");
            return;
        };
        if tx.send(ProviderCommand::ReloadSnapshot).is_err() {
            self.state.push_log("[WARN] Snapshot reload request failed");
        } else {
            self.state.push_log("[INFO] Snapshot reload requested");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.screen {
        Screen::Board => render_board(frame, chunks[1], &app.state),
        Screen::Preview { match_id } => render_preview(frame, chunks[1], &app.state, match_id),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let shown = state.filtered_indices().len();
    let total = state.rows().len();
    let title = match &state.screen {
        Screen::Board => format!(
            "ODDS BOARD | {} | {shown}/{total} matches",
            view_label(state.view)
        ),
        Screen::Preview { .. } => "MATCH PREVIEW".to_string(),
    };

    let filter_line = if state.filter_input_active {
        format!("Handicap filter: {}_", state.filter_input)
    } else {
        let filter = state.filter();
        let handicap = if filter.handicap_needle.is_empty() {
            "all".to_string()
        } else {
            filter.handicap_needle.clone()
        };
        let goal_line = filter.goal_line.clone().unwrap_or_else(|| "all".to_string());
        format!("AH: {handicap} | O/U: {goal_line}")
    };

    let options = state.handicap_options();
    let options_line = if options.is_empty() {
        "No handicap lines in view".to_string()
    } else {
        format!("Lines: {}", options.join(", "))
    };

    format!("{title}\n{filter_line}\n{options_line}")
}

fn footer_text(state: &AppState) -> String {
    if state.filter_input_active {
        return "Type a handicap (e.g. 0, 0.25, -0.5) | Enter Apply | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::Board => {
            "u/Tab View | j/k/↑/↓ Move | / Filter | c Clear | g Goal line | Enter Preview | r Reload | ? Help | q Quit"
                .to_string()
        }
        Screen::Preview { .. } => "b/Esc Back | r Reload | ? Help | q Quit".to_string(),
    }
}

fn render_board(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = board_columns(state.view);
    render_board_header(frame, sections[0], state.view, &widths);

    let list_area = sections[1];
    let filtered = state.filtered_rows();
    if filtered.is_empty() {
        let empty = Paragraph::new("No matches for the selected filters")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, filtered.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);

        let row = filtered[idx];
        render_board_row(frame, &cols, state.view, row, row_style);
    }
}

fn render_board_row(
    frame: &mut Frame,
    cols: &[Rect],
    view: MatchView,
    row: &MatchRow,
    style: Style,
) {
    let match_name = format!("{} vs {}", row.home_team, row.away_team);
    match view {
        MatchView::Upcoming => {
            render_cell_text(frame, cols[0], &row.time, style);
            render_cell_text(frame, cols[1], &match_name, style);
            render_cell_text(frame, cols[2], &row.handicap, style);
            render_cell_text(frame, cols[3], &row.goal_line, style);
        }
        MatchView::Finished => {
            let score = row.score.as_deref().unwrap_or("-");
            render_cell_text(frame, cols[0], &row.time, style);
            render_cell_text(frame, cols[1], &match_name, style);
            render_cell_text(frame, cols[2], score, style);
            render_cell_text(frame, cols[3], &row.handicap, style);
            render_cell_text(frame, cols[4], &row.goal_line, style);
        }
    }
}

fn board_columns(view: MatchView) -> Vec<Constraint> {
    match view {
        MatchView::Upcoming => vec![
            Constraint::Length(12),
            Constraint::Min(24),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
        MatchView::Finished => vec![
            Constraint::Length(14),
            Constraint::Min(24),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    }
}

fn render_board_header(frame: &mut Frame, area: Rect, view: MatchView, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    match view {
        MatchView::Upcoming => {
            render_cell_text(frame, cols[0], "Time", style);
            render_cell_text(frame, cols[1], "Match", style);
            render_cell_text(frame, cols[2], "AH", style);
            render_cell_text(frame, cols[3], "O/U", style);
        }
        MatchView::Finished => {
            render_cell_text(frame, cols[0], "Time", style);
            render_cell_text(frame, cols[1], "Match", style);
            render_cell_text(frame, cols[2], "Score", style);
            render_cell_text(frame, cols[3], "AH", style);
            render_cell_text(frame, cols[4], "O/U", style);
        }
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_preview(frame: &mut Frame, area: Rect, state: &AppState, match_id: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(5),
        ])
        .split(area);

    let preview = state.previews.get(match_id);

    let summary = Paragraph::new(preview_summary_text(state, match_id, preview))
        .block(Block::default().title("Match").borders(Borders::ALL));
    frame.render_widget(summary, rows[0]);

    match preview {
        Some(preview) => render_preview_cards(frame, rows[1], preview),
        None => {
            let text = if state.preview_pending.as_deref() == Some(match_id) {
                "Fetching preview data..."
            } else {
                "No preview data"
            };
            let waiting = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(waiting, rows[1]);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);
}

fn preview_summary_text(state: &AppState, match_id: &str, preview: Option<&PreviewData>) -> String {
    let row = state
        .upcoming
        .iter()
        .chain(state.finished.iter())
        .find(|row| row.id == match_id);

    let (home, away) = match (preview, row) {
        (Some(p), _) => (p.home_team.clone(), p.away_team.clone()),
        (None, Some(r)) => (r.home_team.clone(), r.away_team.clone()),
        (None, None) => ("Home".to_string(), "Away".to_string()),
    };

    let mut lines = vec![format!("{home} vs {away}")];
    if let Some(row) = row {
        let mut meta = format!("AH: {} | O/U: {}", row.handicap, row.goal_line);
        if let Some(score) = &row.score {
            meta.push_str(&format!(" | Result: {score}"));
        }
        lines.push(meta);
    }
    if let Some(form) = preview.and_then(|p| p.recent_form.as_ref()) {
        lines.push(format!(
            "Form: {home} {}W/{} | {away} {}W/{}",
            form.home_wins, form.home_total, form.away_wins, form.away_total
        ));
    }
    lines.join("\n")
}

fn render_preview_cards(frame: &mut Frame, area: Rect, preview: &PreviewData) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    render_card(
        frame,
        cols[0],
        &format!("Last {} (Home)", preview.home_team),
        preview.last_home.as_ref(),
    );
    render_card(
        frame,
        cols[1],
        &format!("Last {} (Away)", preview.away_team),
        preview.last_away.as_ref(),
    );
    render_card(frame, cols[2], "Common rivals", preview.h2h.as_ref());
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, block: Option<&RecentBlock>) {
    let text = match block {
        Some(block) => card_text(block),
        None => "No data".to_string(),
    };
    let card = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(card, area);
}

fn card_text(block: &RecentBlock) -> String {
    let mut lines = Vec::new();
    if let Some(score) = &block.score {
        lines.push(score.replace(':', " - "));
    }
    match (&block.home, &block.away) {
        (Some(home), Some(away)) => lines.push(format!("{home} vs {away}")),
        _ => {}
    }
    if let Some(date) = &block.date {
        lines.push(date.clone());
    }
    let mut pills = Vec::new();
    if let Some(ah) = &block.ah {
        pills.push(format!("AH {ah}"));
    }
    if let Some(ou) = &block.ou {
        pills.push(format!("O/U {ou}"));
    }
    if let Some(cover) = &block.cover_status {
        pills.push(cover.clone());
    }
    if !pills.is_empty() {
        lines.push(pills.join(" | "));
    }
    for stat in &block.stats_rows {
        lines.push(format!("{} {} {}", stat.home, stat.label, stat.away));
    }
    if let Some(analysis) = &block.analysis {
        lines.push(String::new());
        lines.push(analysis.clone());
    }
    if lines.is_empty() {
        "No data".to_string()
    } else {
        lines.join("\n")
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn view_label(view: MatchView) -> &'static str {
    match view {
        MatchView::Upcoming => "UPCOMING",
        MatchView::Finished => "FINISHED",
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Odds Terminal - Help",
        "",
        "Board:",
        "  u / Tab      Toggle upcoming/finished",
        "  j/k or ↑/↓   Move selection",
        "  / or f       Type a handicap filter",
        "  c            Clear handicap filter",
        "  g            Cycle goal-line filter",
        "  Enter / p    Open match preview",
        "  r            Reload snapshot",
        "",
        "Preview:",
        "  b / Esc      Back to board",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
