//! Panels for the load screen

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use super::{Phase, Progress};

const MAX_LOG_ENTRIES: usize = 200;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase and a one-line detail (source file, row count, ...)
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Checking,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = match self.phase {
            Phase::Complete => Color::Green,
            Phase::Committing => Color::Yellow,
            _ => Color::Cyan,
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let icon = match self.phase {
            Phase::Checking => "◐",
            Phase::Downloading => "↓",
            Phase::Extracting => "⤷",
            Phase::Reading => "≡",
            Phase::Loading => "⚙",
            Phase::Committing => "⇲",
            Phase::Complete => "✓",
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", icon), style),
                Span::styled(self.phase.to_string(), style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(Paragraph::new(lines).block(panel(" Crime Data to SQLite ")), area);
    }
}

/// Stage (or download) gauge
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = if progress.total > 0 {
            format!("{} ({}/{})", progress.label, progress.current, progress.total)
        } else {
            progress.label.clone()
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);
        frame.render_widget(gauge, area);
    }
}

/// Rows written and dropped per table, in load order
pub struct TablesPanel {
    rows: Vec<(String, u64, usize)>,
}

impl TablesPanel {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn record(&mut self, table: &str, written: u64, dropped: usize) {
        match self.rows.iter_mut().find(|(name, _, _)| name == table) {
            Some(row) => *row = (table.to_string(), written, dropped),
            None => self.rows.push((table.to_string(), written, dropped)),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["table", "written", "dropped"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.rows.iter().map(|(name, written, dropped)| {
            let dropped_style = if *dropped > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(name.as_str()),
                Cell::from(written.to_string()),
                Cell::from(dropped.to_string()).style(dropped_style),
            ])
        });

        let table = Table::new(
            rows,
            [Constraint::Min(12), Constraint::Length(10), Constraint::Length(10)],
        )
        .header(header)
        .block(panel(" Tables "));
        frame.render_widget(table, area);
    }
}

/// Scrolling activity log; newest entry highlighted
pub struct LogPanel {
    entries: Vec<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);
        let last = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = if start + i == last {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}
