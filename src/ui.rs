use crate::app::{App, Control, InputMode, ListScreen, Screen};
use crate::storage::KeyValueStore;
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

pub fn run_app<B, S, F>(terminal: &mut Terminal<B>, app: &mut App<S, F>) -> io::Result<()>
where
    B: Backend,
    S: KeyValueStore,
    F: FnMut() -> S,
{
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) == Control::Quit {
                return Ok(());
            }
        }
    }
}

pub fn draw<S: KeyValueStore, F: FnMut() -> S>(f: &mut Frame, app: &App<S, F>) {
    match &app.screen {
        Screen::Landing => draw_landing(f),
        Screen::TaskList(list) => draw_task_list(f, list),
    }
}

fn draw_landing(f: &mut Frame) {
    let area = f.area();
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            "Welcome to your task list",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Keep track of what needs doing."),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] Start   [q] Quit",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let height = text.len() as u16;
    let top = inner.y + inner.height.saturating_sub(height) / 2;
    let centered = Rect::new(inner.x, top, inner.width, height.min(inner.height));
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), centered);
}

fn draw_task_list<S: KeyValueStore>(f: &mut Frame, screen: &ListScreen<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let focused = Style::default().fg(Color::Cyan);
    let border = |mode: InputMode| {
        if screen.mode == mode {
            focused
        } else {
            Style::default()
        }
    };

    let search = Paragraph::new(screen.tasks.query()).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(border(InputMode::Searching)),
    );
    f.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = screen
        .tasks
        .visible()
        .iter()
        .map(|t| {
            let (mark, title_style) = if t.is_done {
                (
                    "[x] ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default().fg(Color::White))
            };
            let editing = screen.tasks.editing() == Some(t.id);
            let mut spans = vec![Span::raw(mark), Span::styled(t.title.as_str(), title_style)];
            if editing {
                spans.push(Span::styled(" (editing)", Style::default().fg(Color::Green)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("Tasks")
                .borders(Borders::ALL)
                .border_style(border(InputMode::Normal)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    let mut state = ListState::default();
    if !screen.tasks.visible().is_empty() {
        state.select(Some(screen.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    let input_title = if screen.tasks.editing().is_some() {
        "Edit task"
    } else {
        "New task"
    };
    let input = Paragraph::new(screen.tasks.input()).block(
        Block::default()
            .title(input_title)
            .borders(Borders::ALL)
            .border_style(border(InputMode::Editing)),
    );
    f.render_widget(input, chunks[2]);

    let (done, total) = screen.tasks.counts();
    let hints = match screen.mode {
        InputMode::Normal => "[a] add  [e] edit  [space] done  [d] delete  [/] search  [esc] back",
        InputMode::Editing => "[enter] save  [esc] cancel",
        InputMode::Searching => "[enter] keep filter  [esc] clear",
    };
    let footer = Line::from(vec![
        Span::styled(hints, Style::default().fg(Color::Yellow)),
        Span::raw(format!("  {done}/{total} done")),
    ]);
    f.render_widget(Paragraph::new(footer), chunks[3]);

    let cursor_field = match screen.mode {
        InputMode::Editing => Some((chunks[2], screen.tasks.input())),
        InputMode::Searching => Some((chunks[0], screen.tasks.query())),
        InputMode::Normal => None,
    };
    if let Some((area, text)) = cursor_field {
        let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}
