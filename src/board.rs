use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::classify;
use crate::fmt::money;
use crate::jobs;
use crate::models::PipelineStage;
use crate::sheet::{coerce_amount, RawJob};
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const PAGE_SIZE: usize = 20;

enum BoardMode {
    Normal,
    Filter(String),
    SetStage { query: String, selection: usize },
    ConfirmDelete,
}

pub enum BoardAction {
    Continue,
    Close,
    CommitStage,
    CommitDelete,
}

pub struct JobBrowser {
    jobs: Vec<RawJob>,
    /// Indexes into `jobs` that survive the text and stage filters.
    filtered: Vec<usize>,
    stages: Vec<PipelineStage>,
    stage_filter: Option<usize>,
    filter_text: String,
    offset: usize,
    visible_count: usize,
    selected: usize,
    mode: BoardMode,
    status_message: Option<String>,
    show_detail: bool,
    pending_stage_idx: Option<usize>,
    table_state: TableState,
}

impl JobBrowser {
    pub fn new(jobs: Vec<RawJob>, stages: Vec<PipelineStage>) -> Self {
        let filtered = (0..jobs.len()).collect();
        Self {
            jobs,
            filtered,
            stages,
            stage_filter: None,
            filter_text: String::new(),
            offset: 0,
            visible_count: PAGE_SIZE,
            selected: 0,
            mode: BoardMode::Normal,
            status_message: None,
            show_detail: false,
            pending_stage_idx: None,
            table_state: TableState::default(),
        }
    }

    pub fn run(&mut self, conn: &rusqlite::Connection) -> io::Result<()> {
        if self.jobs.is_empty() {
            println!("No jobs found.");
            return Ok(());
        }

        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal, conn);
        ratatui::restore();
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        conn: &rusqlite::Connection,
    ) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }

                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }

                match self.handle_key_event(code) {
                    BoardAction::Close => break,
                    BoardAction::Continue => {}
                    BoardAction::CommitStage => {
                        if let Err(e) = self.commit_stage(conn) {
                            self.status_message = Some(format!("Move failed: {e}"));
                        }
                    }
                    BoardAction::CommitDelete => {
                        if let Err(e) = self.commit_delete(conn) {
                            self.status_message = Some(format!("Trash failed: {e}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Filtering
    // -----------------------------------------------------------------------

    fn rebuild_filter(&mut self) {
        let text = self.filter_text.to_lowercase();
        let stage_name = self.stage_filter.map(|i| self.stages[i].name.clone());
        self.filtered = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| {
                if let Some(ref name) = stage_name {
                    let status = job.field("Status").trim();
                    let status = if status.is_empty() { "New Lead" } else { status };
                    if !status.eq_ignore_ascii_case(name) {
                        return false;
                    }
                }
                if text.is_empty() {
                    return true;
                }
                [
                    job.field("Client Name"),
                    job.field("Technician"),
                    job.field("Status"),
                ]
                .iter()
                .any(|v| v.to_lowercase().contains(&text))
            })
            .map(|(i, _)| i)
            .collect();
        self.offset = 0;
        self.selected = 0;
    }

    fn current_job(&self) -> Option<&RawJob> {
        self.filtered
            .get(self.offset + self.selected)
            .map(|&i| &self.jobs[i])
    }

    fn stage_filter_label(&self) -> &str {
        match self.stage_filter {
            Some(i) => &self.stages[i].name,
            None => "All",
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let narrow = area.width < 100;

        let edit_height: u16 = match &self.mode {
            BoardMode::SetStage { .. } => 1 + self.filtered_stages().len().min(9) as u16,
            BoardMode::Filter(_) => 1,
            _ => 0,
        };

        let areas = Layout::vertical([
            Constraint::Length(1),           // title
            Constraint::Fill(1),             // table + detail
            Constraint::Length(edit_height), // input panel
            Constraint::Length(1),           // status
            Constraint::Length(1),           // keys
        ])
        .split(area);
        let title_area = areas[0];
        let body_area = areas[1];
        let edit_area = areas[2];
        let status_area = areas[3];
        let keys_area = areas[4];

        frame.render_widget(Paragraph::new("Job Board").style(HEADER_STYLE), title_area);

        let (table_area, detail_area) = if self.show_detail && !narrow {
            let halves =
                Layout::horizontal([Constraint::Fill(1), Constraint::Length(46)]).split(body_area);
            (halves[0], Some(halves[1]))
        } else {
            (body_area, None)
        };

        // Visible slice, one line per job
        let available_height = table_area.height.saturating_sub(2) as usize;
        let end = (self.offset + available_height.max(1)).min(self.filtered.len());
        let mut rendered_rows = Vec::new();
        for &ji in &self.filtered[self.offset..end] {
            let job = &self.jobs[ji];
            let status = job.field("Status").trim();
            let status = if status.is_empty() { "New Lead" } else { status };
            let status_cell = Cell::from(Span::styled(
                status.to_string(),
                Style::default().fg(self.status_color(status)),
            ));
            let sales = tui::money_span(coerce_amount(job.field("Sales")));

            let cells: Vec<Cell> = if narrow {
                vec![
                    Cell::from(job.field("Count").to_string()),
                    Cell::from(job.field("Date").to_string()),
                    Cell::from(job.field("Client Name").to_string()),
                    status_cell,
                    Cell::from(sales),
                ]
            } else {
                vec![
                    Cell::from(job.field("Count").to_string()),
                    Cell::from(job.field("Date").to_string()),
                    Cell::from(job.field("Client Name").to_string()),
                    Cell::from(job.field("Technician").to_string()),
                    status_cell,
                    Cell::from(sales),
                ]
            };
            rendered_rows.push(Row::new(cells));
        }
        self.visible_count = (end - self.offset).max(1);

        let widths: Vec<Constraint> = if narrow {
            vec![
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(16),
                Constraint::Length(11),
            ]
        } else {
            vec![
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(18),
                Constraint::Length(16),
                Constraint::Length(11),
            ]
        };

        let header_cells: Vec<&str> = if narrow {
            vec!["#", "Date", "Client", "Status", "Sales"]
        } else {
            vec!["#", "Date", "Client", "Technician", "Status", "Sales"]
        };

        self.table_state.select(Some(self.selected));
        let table = Table::new(rendered_rows, widths)
            .header(Row::new(header_cells).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        if let Some(detail_area) = detail_area {
            let detail = Paragraph::new(self.detail_lines(detail_area.width.saturating_sub(4)))
                .block(Block::bordered().title("Job"));
            frame.render_widget(detail, detail_area);
        }

        if edit_height > 0 {
            let edit_lines: Vec<Line> = match &self.mode {
                BoardMode::SetStage { query, selection } => {
                    let matches = self.filtered_stages();
                    let mut lines = vec![Line::from(format!("  Move to stage: {query}\u{2588}"))];
                    if matches.is_empty() {
                        lines.push(Line::from(Span::styled("    (no matches)", FOOTER_STYLE)));
                    } else {
                        for (i, (_, name)) in matches.iter().enumerate() {
                            let marker = if i == *selection { ">" } else { " " };
                            lines.push(Line::from(format!("  {marker} {name}")));
                        }
                    }
                    lines
                }
                BoardMode::Filter(input) => {
                    vec![Line::from(format!("  Filter: {input}\u{2588}"))]
                }
                _ => vec![],
            };
            frame.render_widget(Paragraph::new(edit_lines), edit_area);
        }

        // Status line
        let start = if self.filtered.is_empty() { 0 } else { self.offset + 1 };
        let end_row = (self.offset + self.visible_count).min(self.filtered.len());
        let mut status = format!(
            "Jobs {}-{} of {} | Stage: {}",
            start,
            end_row,
            self.filtered.len(),
            self.stage_filter_label(),
        );
        if !self.filter_text.is_empty() {
            status.push_str(&format!(" | Filter: {}", self.filter_text));
        }
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys_widget = match &self.mode {
            BoardMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  Tab:stage  /:filter  s:move  x:trash  Enter:detail  n/\u{2192}:next  p/\u{2190}:prev  q:quit",
            )
            .style(FOOTER_STYLE),
            BoardMode::Filter(_) => {
                Paragraph::new("Enter=apply (empty clears), Esc=cancel").style(FOOTER_STYLE)
            }
            BoardMode::SetStage { .. } => {
                Paragraph::new("Type to filter, \u{2191}/\u{2193}=choose, Enter=move, Esc=cancel")
                    .style(FOOTER_STYLE)
            }
            BoardMode::ConfirmDelete => {
                Paragraph::new("Move this job to the trash? y=yes, any other key=no")
                    .style(FOOTER_STYLE)
            }
        };
        frame.render_widget(keys_widget, keys_area);
    }

    fn status_color(&self, status: &str) -> ratatui::style::Color {
        let hex = self
            .stages
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(status))
            .map(|s| s.color.as_str())
            .unwrap_or_else(|| classify::default_stage_color(status));
        tui::stage_color(hex)
    }

    fn detail_lines(&self, width: u16) -> Vec<Line<'static>> {
        let Some(job) = self.current_job() else {
            return vec![Line::from("No job selected")];
        };
        let lead = classify::LeadPlatform::from_code(job.field("LP"));
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Job #{}", job.field("Count")),
                HEADER_STYLE,
            )),
            Line::from(format!("Client:     {}", job.field("Client Name"))),
            Line::from(format!("Phone:      {}", job.field("Phone"))),
            Line::from(format!("Address:    {}", job.field("Address"))),
            Line::from(format!("Date:       {}", job.field("Date"))),
            Line::from(format!("Status:     {}", job.field("Status"))),
            Line::from(format!("Technician: {}", job.field("Technician"))),
            Line::from(format!("Lead:       {}", lead.label())),
            Line::from(""),
            Line::from(format!(
                "Sales:      {}",
                money(coerce_amount(job.field("Sales")))
            )),
            Line::from(format!(
                "Costs:      {}",
                money(coerce_amount(job.field("Total Costs")))
            )),
            Line::from(format!(
                "Profit:     {}",
                money(coerce_amount(job.field("Gross Profit")))
            )),
            Line::from(format!(
                "Balance:    {}",
                money(coerce_amount(job.field("Balance")))
            )),
        ];
        let notes = job.field("Notes");
        if !notes.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from("Notes:"));
            let (wrapped, _) = tui::wrap_text(notes, width.max(10) as usize);
            for line in wrapped.lines() {
                lines.push(Line::from(format!("  {line}")));
            }
        }
        lines
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    pub fn handle_key_event(&mut self, code: KeyCode) -> BoardAction {
        self.status_message = None;

        match &self.mode {
            BoardMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => return BoardAction::Close,
                KeyCode::Down | KeyCode::Char('j') => {
                    let remaining = self.filtered.len().saturating_sub(self.offset);
                    if self.selected + 1 < self.visible_count.min(remaining) {
                        self.selected += 1;
                    } else if self.offset + self.visible_count < self.filtered.len() {
                        self.offset += 1;
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if self.selected > 0 {
                        self.selected -= 1;
                    } else if self.offset > 0 {
                        self.offset -= 1;
                    }
                }
                KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                    self.scroll_down();
                    self.selected = 0;
                }
                KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                    self.scroll_up();
                    self.selected = 0;
                }
                KeyCode::Home => {
                    self.offset = 0;
                    self.selected = 0;
                }
                KeyCode::End => {
                    self.scroll_to_end();
                    self.selected = 0;
                }
                KeyCode::Tab => {
                    self.cycle_stage_filter();
                }
                KeyCode::Char('/') => {
                    self.mode = BoardMode::Filter(String::new());
                }
                KeyCode::Char('s') => {
                    if !self.stages.is_empty() && self.current_job().is_some() {
                        self.mode = BoardMode::SetStage {
                            query: String::new(),
                            selection: 0,
                        };
                    }
                }
                KeyCode::Char('x') => {
                    if self.current_job().is_some() {
                        self.mode = BoardMode::ConfirmDelete;
                    }
                }
                KeyCode::Enter => {
                    self.show_detail = !self.show_detail;
                }
                _ => {}
            },
            BoardMode::Filter(_) => match code {
                KeyCode::Esc => self.mode = BoardMode::Normal,
                KeyCode::Enter => self.submit_input(),
                KeyCode::Backspace => self.input_backspace(),
                KeyCode::Char(c) => self.input_push(c),
                _ => {}
            },
            BoardMode::SetStage { .. } => {
                return self.handle_set_stage_key(code);
            }
            BoardMode::ConfirmDelete => {
                self.mode = BoardMode::Normal;
                if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    return BoardAction::CommitDelete;
                }
            }
        }
        BoardAction::Continue
    }

    fn scroll_down(&mut self) {
        let new_offset = self.offset + self.visible_count;
        if new_offset < self.filtered.len() {
            self.offset = new_offset;
        }
    }

    fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.visible_count);
    }

    fn scroll_to_end(&mut self) {
        self.offset = self.filtered.len().saturating_sub(PAGE_SIZE);
    }

    fn cycle_stage_filter(&mut self) {
        self.stage_filter = match self.stage_filter {
            None if self.stages.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 < self.stages.len() => Some(i + 1),
            Some(_) => None,
        };
        self.rebuild_filter();
    }

    fn input_push(&mut self, c: char) {
        if let BoardMode::Filter(s) = &mut self.mode {
            s.push(c);
        }
    }

    fn input_backspace(&mut self) {
        if let BoardMode::Filter(s) = &mut self.mode {
            s.pop();
        }
    }

    fn submit_input(&mut self) {
        let mode = std::mem::replace(&mut self.mode, BoardMode::Normal);
        if let BoardMode::Filter(input) = mode {
            self.filter_text = input.trim().to_string();
            self.rebuild_filter();
            self.status_message = Some(format!("{} match(es)", self.filtered.len()));
        }
    }

    fn filtered_stages(&self) -> Vec<(usize, &str)> {
        let query = match &self.mode {
            BoardMode::SetStage { query, .. } => query.to_lowercase(),
            _ => return vec![],
        };
        self.stages
            .iter()
            .enumerate()
            .filter(|(_, s)| query.is_empty() || s.name.to_lowercase().contains(&query))
            .map(|(i, s)| (i, s.name.as_str()))
            .take(9)
            .collect()
    }

    fn handle_set_stage_key(&mut self, code: KeyCode) -> BoardAction {
        match code {
            KeyCode::Char(c) => {
                if let BoardMode::SetStage { query, selection } = &mut self.mode {
                    query.push(c);
                    *selection = 0;
                }
            }
            KeyCode::Backspace => {
                if let BoardMode::SetStage { query, selection } = &mut self.mode {
                    query.pop();
                    *selection = 0;
                }
            }
            KeyCode::Up => {
                if let BoardMode::SetStage { selection, .. } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                let count = self.filtered_stages().len();
                if let BoardMode::SetStage { selection, .. } = &mut self.mode {
                    if count > 0 && *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let matches = self.filtered_stages();
                if !matches.is_empty() {
                    let sel_idx = match &self.mode {
                        BoardMode::SetStage { selection, .. } => (*selection).min(matches.len() - 1),
                        _ => 0,
                    };
                    self.pending_stage_idx = Some(matches[sel_idx].0);
                    self.mode = BoardMode::Normal;
                    return BoardAction::CommitStage;
                }
            }
            KeyCode::Esc => {
                self.mode = BoardMode::Normal;
                self.pending_stage_idx = None;
            }
            _ => {}
        }
        BoardAction::Continue
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn commit_stage(&mut self, conn: &rusqlite::Connection) -> crate::error::Result<()> {
        let Some(si) = self.pending_stage_idx.take() else {
            return Ok(());
        };
        let stage_name = self.stages[si].name.clone();
        let Some(&ji) = self.filtered.get(self.offset + self.selected) else {
            return Err(crate::error::CrmError::Other("No job selected".into()));
        };
        let count = self.jobs[ji].field("Count").trim().to_string();
        jobs::set_status(conn, &count, &stage_name)?;
        self.jobs[ji].set("Status", stage_name.clone());
        self.status_message = Some(format!("Job #{count} moved to {stage_name}"));
        Ok(())
    }

    pub fn commit_delete(&mut self, conn: &rusqlite::Connection) -> crate::error::Result<()> {
        let Some(&ji) = self.filtered.get(self.offset + self.selected) else {
            return Err(crate::error::CrmError::Other("No job selected".into()));
        };
        let count = self.jobs[ji].field("Count").trim().to_string();
        jobs::soft_delete(conn, &count)?;
        self.jobs.remove(ji);
        self.rebuild_filter();
        self.status_message = Some(format!("Job #{count} moved to trash"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::stages::list_stages;

    fn make_jobs(n: usize) -> Vec<RawJob> {
        (0..n)
            .map(|i| {
                let mut job = RawJob::new();
                job.set("Count", (i + 1).to_string());
                job.set("Date", format!("2025-01-{:02}", (i % 28) + 1));
                job.set("Client Name", format!("Client {}", i + 1));
                job.set(
                    "Status",
                    if i % 2 == 0 { "New Lead" } else { "Closed" },
                );
                job.set("Sales", "500");
                job
            })
            .collect()
    }

    fn make_stages() -> Vec<PipelineStage> {
        vec![
            PipelineStage {
                id: 1,
                name: "New Lead".to_string(),
                color: "#3B82F6".to_string(),
                order_position: 1,
            },
            PipelineStage {
                id: 2,
                name: "In Progress".to_string(),
                color: "#F59E0B".to_string(),
                order_position: 2,
            },
            PipelineStage {
                id: 3,
                name: "Closed".to_string(),
                color: "#10B981".to_string(),
                order_position: 3,
            },
        ]
    }

    fn test_db() -> (tempfile::TempDir, rusqlite::Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_scroll_down() {
        let mut browser = JobBrowser::new(make_jobs(50), make_stages());
        assert_eq!(browser.offset, 0);
        browser.scroll_down();
        assert_eq!(browser.offset, PAGE_SIZE);
        browser.scroll_down();
        assert_eq!(browser.offset, PAGE_SIZE * 2);
    }

    #[test]
    fn test_scroll_down_stops_at_end() {
        let mut browser = JobBrowser::new(make_jobs(10), make_stages());
        browser.scroll_down();
        assert_eq!(browser.offset, 0);
    }

    #[test]
    fn test_scroll_up_saturates() {
        let mut browser = JobBrowser::new(make_jobs(50), make_stages());
        browser.offset = PAGE_SIZE * 2;
        browser.scroll_up();
        assert_eq!(browser.offset, PAGE_SIZE);
        browser.scroll_up();
        assert_eq!(browser.offset, 0);
        browser.scroll_up();
        assert_eq!(browser.offset, 0);
    }

    #[test]
    fn test_selected_row_up_down() {
        let mut browser = JobBrowser::new(make_jobs(50), make_stages());
        assert_eq!(browser.selected, 0);
        browser.handle_key_event(KeyCode::Down);
        assert_eq!(browser.selected, 1);
        browser.handle_key_event(KeyCode::Char('j'));
        assert_eq!(browser.selected, 2);
        browser.handle_key_event(KeyCode::Char('k'));
        assert_eq!(browser.selected, 1);
        browser.handle_key_event(KeyCode::Up);
        assert_eq!(browser.selected, 0);
        browser.handle_key_event(KeyCode::Up);
        assert_eq!(browser.selected, 0);
    }

    #[test]
    fn test_close_on_q() {
        let mut browser = JobBrowser::new(make_jobs(5), make_stages());
        let action = browser.handle_key_event(KeyCode::Char('q'));
        assert!(matches!(action, BoardAction::Close));
    }

    #[test]
    fn test_filter_matches_client_name() {
        let mut browser = JobBrowser::new(make_jobs(30), make_stages());
        browser.mode = BoardMode::Filter("client 27".to_string());
        browser.submit_input();
        assert_eq!(browser.filtered.len(), 1);
        assert_eq!(browser.jobs[browser.filtered[0]].field("Count"), "27");
    }

    #[test]
    fn test_filter_empty_restores_all() {
        let mut browser = JobBrowser::new(make_jobs(30), make_stages());
        browser.mode = BoardMode::Filter("client 27".to_string());
        browser.submit_input();
        assert_eq!(browser.filtered.len(), 1);
        browser.mode = BoardMode::Filter(String::new());
        browser.submit_input();
        assert_eq!(browser.filtered.len(), 30);
    }

    #[test]
    fn test_stage_filter_cycles_back_to_all() {
        let mut browser = JobBrowser::new(make_jobs(10), make_stages());
        assert_eq!(browser.stage_filter, None);
        browser.handle_key_event(KeyCode::Tab);
        assert_eq!(browser.stage_filter, Some(0));
        assert_eq!(browser.filtered.len(), 5); // the New Lead half
        browser.handle_key_event(KeyCode::Tab);
        assert_eq!(browser.stage_filter, Some(1));
        assert_eq!(browser.filtered.len(), 0); // nothing In Progress
        browser.handle_key_event(KeyCode::Tab);
        browser.handle_key_event(KeyCode::Tab);
        assert_eq!(browser.stage_filter, None);
        assert_eq!(browser.filtered.len(), 10);
    }

    #[test]
    fn test_set_stage_picker_selects() {
        let mut browser = JobBrowser::new(make_jobs(5), make_stages());
        browser.handle_key_event(KeyCode::Char('s'));
        assert!(matches!(browser.mode, BoardMode::SetStage { .. }));
        // Empty query lists every stage
        assert_eq!(browser.filtered_stages().len(), 3);
        browser.handle_key_event(KeyCode::Char('p'));
        browser.handle_key_event(KeyCode::Char('r'));
        let matches = browser.filtered_stages();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, "In Progress");
        let action = browser.handle_key_event(KeyCode::Enter);
        assert!(matches!(action, BoardAction::CommitStage));
        assert_eq!(browser.pending_stage_idx, Some(1));
    }

    #[test]
    fn test_set_stage_esc_cancels() {
        let mut browser = JobBrowser::new(make_jobs(5), make_stages());
        browser.handle_key_event(KeyCode::Char('s'));
        browser.handle_key_event(KeyCode::Esc);
        assert!(matches!(browser.mode, BoardMode::Normal));
        assert_eq!(browser.pending_stage_idx, None);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut browser = JobBrowser::new(make_jobs(5), make_stages());
        browser.handle_key_event(KeyCode::Char('x'));
        assert!(matches!(browser.mode, BoardMode::ConfirmDelete));
        let action = browser.handle_key_event(KeyCode::Char('n'));
        assert!(matches!(action, BoardAction::Continue));
        browser.handle_key_event(KeyCode::Char('x'));
        let action = browser.handle_key_event(KeyCode::Char('y'));
        assert!(matches!(action, BoardAction::CommitDelete));
    }

    #[test]
    fn test_enter_toggles_detail() {
        let mut browser = JobBrowser::new(make_jobs(5), make_stages());
        assert!(!browser.show_detail);
        browser.handle_key_event(KeyCode::Enter);
        assert!(browser.show_detail);
        browser.handle_key_event(KeyCode::Enter);
        assert!(!browser.show_detail);
    }

    #[test]
    fn test_commit_stage_writes_through() {
        let (_dir, conn) = test_db();
        let mut raw = RawJob::new();
        raw.set("Client Name", "Dana Whitfield");
        let count = jobs::insert_job(&conn, &mut raw).unwrap();

        let rows = jobs::fetch_active_rows(&conn).unwrap();
        let stages = list_stages(&conn).unwrap();
        let in_progress = stages
            .iter()
            .position(|s| s.name == "In Progress")
            .unwrap();
        let mut browser = JobBrowser::new(rows, stages);
        browser.pending_stage_idx = Some(in_progress);
        browser.commit_stage(&conn).unwrap();

        let job = jobs::get_job_by_count(&conn, &count).unwrap();
        assert_eq!(job.field("Status"), "In Progress");
        assert_eq!(browser.jobs[0].field("Status"), "In Progress");
    }

    #[test]
    fn test_commit_delete_writes_through() {
        let (_dir, conn) = test_db();
        let mut raw = RawJob::new();
        raw.set("Client Name", "Dana Whitfield");
        jobs::insert_job(&conn, &mut raw).unwrap();

        let rows = jobs::fetch_active_rows(&conn).unwrap();
        let stages = list_stages(&conn).unwrap();
        let mut browser = JobBrowser::new(rows, stages);
        browser.commit_delete(&conn).unwrap();

        assert!(browser.jobs.is_empty());
        assert!(jobs::fetch_active_rows(&conn).unwrap().is_empty());
        assert_eq!(jobs::fetch_deleted_rows(&conn).unwrap().len(), 1);
    }
}
