use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use dotted_map::{DottedMap, GridPoint};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    DefaultTerminal, Frame,
};

use crate::braille::BrailleCanvas;

/// Show the map in the terminal until `q` or `Esc`
pub fn run_preview(map: &DottedMap) -> Result<()> {
    let mut terminal = ratatui::init();
    terminal.clear()?;
    let result = preview_loop(&mut terminal, map);
    ratatui::restore();
    result
}

fn preview_loop(terminal: &mut DefaultTerminal, map: &DottedMap) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, map))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    return Ok(());
                }
            }
        }
    }
}

fn render(frame: &mut Frame, map: &DottedMap) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Dotted Map ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let image = map.image();
    let (pins, dots): (Vec<GridPoint>, Vec<GridPoint>) =
        map.points().into_iter().partition(|p| p.lat.is_some());
    let size = (inner.width as usize, inner.height as usize);
    let widget = DotsWidget {
        dots: BrailleCanvas::from_points(size.0, size.1, image.width, image.height, &dots),
        pins: BrailleCanvas::from_points(size.0, size.1, image.width, image.height, &pins),
    };
    frame.render_widget(widget, inner);

    let status = Line::from(vec![
        Span::styled(" Dots: ", Style::default().fg(Color::DarkGray)),
        Span::styled(dots.len().to_string(), Style::default().fg(Color::Cyan)),
        Span::styled(" Pins: ", Style::default().fg(Color::DarkGray)),
        Span::styled(pins.len().to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!(" | {}x{} px", image.width, image.height),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(" | q:quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[1]);
}

/// Grid dots with pins drawn on top
struct DotsWidget {
    dots: BrailleCanvas,
    pins: BrailleCanvas,
}

impl DotsWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for DotsWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.dots, Color::Cyan, area, buf);
        Self::render_layer(&self.pins, Color::Yellow, area, buf);
    }
}
