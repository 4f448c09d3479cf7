use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{ActiveTab, App, FormField};
use crate::models::{FavoriteEntry, HistoryEntry};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Tab content
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.tab {
        ActiveTab::Search => render_search(frame, app, chunks[1]),
        ActiveTab::History => render_history(frame, app, chunks[1]),
        ActiveTab::Favorites => render_favorites(frame, app, chunks[1]),
        ActiveTab::Manage => render_manage(frame, app, chunks[1]),
    }

    render_status(frame, app, chunks[2]);

    if app.form.is_some() {
        render_faq_form(frame, app);
    }

    if app.show_help {
        render_help(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = ActiveTab::ALL
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(
            Block::default()
                .title(" deskhelp ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Question input
            Constraint::Min(0),    // Results
        ])
        .split(area);

    let input_block = Block::default()
        .title(" Your question (Enter to search) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let input = Paragraph::new(format!("> {}_", app.input)).block(input_block);
    frame.render_widget(input, chunks[0]);

    let result_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Result list
            Constraint::Ratio(2, 3), // Answer pane
        ])
        .split(chunks[1]);

    render_result_list(frame, app, result_chunks[0]);
    render_answer_pane(frame, app, result_chunks[1]);
}

fn render_result_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .results
        .iter()
        .map(|result| {
            let line = Line::from(vec![
                Span::styled(
                    format!("[{}] ", result.provenance.label()),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled(result.question.clone(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = if app.pending_searches > 0 {
        format!(" Results (searching: {}) ", app.pending_searches)
    } else {
        " Results ".to_string()
    };

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.results.is_empty() {
        state.select(Some(app.selected_result));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_answer_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Answer ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let content = match app.results.get(app.selected_result) {
        Some(result) => {
            let width = block.inner(area).width.saturating_sub(1).max(20) as usize;
            let mut lines: Vec<Line> = vec![
                Line::from(Span::styled(
                    result.question.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("source: {}", result.provenance.label()),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
            ];
            for wrapped in textwrap::wrap(&result.answer, width) {
                lines.push(Line::from(wrapped.into_owned()));
            }
            lines
        }
        None => vec![Line::from(
            "Type a question and press Enter. Ctrl+S saves the selected answer.",
        )],
    };

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|entry: &HistoryEntry| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{} ", entry.date.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.question.clone(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let detail = app
        .history
        .get(app.selected_history)
        .map(|entry| entry.answer.clone())
        .unwrap_or_else(|| "No queries yet".to_string());

    render_list_with_detail(
        frame,
        area,
        items,
        app.selected_history,
        " History (newest first) ",
        detail,
    );
}

fn render_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .favorites
        .iter()
        .map(|favorite: &FavoriteEntry| {
            ListItem::new(Line::from(Span::styled(
                favorite.question.clone(),
                Style::default().fg(Color::White),
            )))
        })
        .collect();

    let detail = app
        .favorites
        .get(app.selected_favorite)
        .map(|favorite| favorite.answer.clone())
        .unwrap_or_else(|| "No favorites saved. Ctrl+S on a search result adds one.".to_string());

    render_list_with_detail(
        frame,
        area,
        items,
        app.selected_favorite,
        " Favorites (d:delete) ",
        detail,
    );
}

fn render_manage(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .entries
        .iter()
        .map(|entry| {
            let line = Line::from(vec![
                Span::styled(format!("#{} ", entry.id), Style::default().fg(Color::Blue)),
                Span::styled(entry.question.clone(), Style::default().fg(Color::White)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let detail = app
        .entries
        .get(app.selected_entry)
        .map(|entry| entry.answer.clone())
        .unwrap_or_else(|| "No FAQ entries. Press 'a' to add one.".to_string());

    render_list_with_detail(
        frame,
        area,
        items,
        app.selected_entry,
        " FAQ entries (a:add e:edit d:delete) ",
        detail,
    );
}

fn render_list_with_detail(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected: usize,
    title: &str,
    detail: String,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);

    let has_items = !items.is_empty();
    let list = List::new(items)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if has_items {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let paragraph = Paragraph::new(detail)
        .block(Block::default().title(" Answer ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[1]);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(error) = &app.error_message {
        (
            format!("Error: {error} (Esc to dismiss)"),
            Style::default().fg(Color::Red),
        )
    } else if let Some(status) = &app.status_message {
        (status.clone(), Style::default().fg(Color::Yellow))
    } else {
        (
            format!(
                "Ollama: {} | Tab:switch  F1:help  Ctrl+C:quit",
                app.generation_status.label()
            ),
            Style::default().fg(Color::DarkGray),
        )
    };

    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn render_faq_form(frame: &mut Frame, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    let area = centered_rect(70, 50, frame.area());

    let title = if form.editing.is_some() {
        " Edit FAQ entry "
    } else {
        " New FAQ entry "
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let field_style = |field: FormField| {
        if form.field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let question = Paragraph::new(format!("{}_", form.question)).block(
        Block::default()
            .title(" Question ")
            .borders(Borders::ALL)
            .border_style(field_style(FormField::Question)),
    );
    frame.render_widget(question, chunks[0]);

    let answer = Paragraph::new(format!("{}_", form.answer))
        .block(
            Block::default()
                .title(" Answer ")
                .borders(Borders::ALL)
                .border_style(field_style(FormField::Answer)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(answer, chunks[1]);

    let hint = Paragraph::new("Tab:switch field  Enter:save  Esc:cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[2]);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Search tab:",
        "   type     Edit the question",
        "   Enter    Submit search",
        "   ↑ / ↓    Select result",
        "   Ctrl+S   Save answer to favorites",
        "   Esc      Clear input / dismiss error",
        "",
        " History / Favorites / Manage:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   d        Delete selected (favorites, FAQ)",
        "   a        Add FAQ entry",
        "   e        Edit FAQ entry",
        "",
        " General:",
        "   Tab      Next tab",
        "   F1 / ?   This help",
        "   Ctrl+C   Quit (q outside Search)",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
