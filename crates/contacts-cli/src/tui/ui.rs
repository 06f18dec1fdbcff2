//! TUI rendering using ratatui.

use contacts_core::api::ContactApi;
use contacts_core::form::FormField;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use super::app::{App, Mode};

/// Render the dashboard.
pub fn render<A: ContactApi>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search and tag select
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_utility_bar(f, app, chunks[0]);
    if app.showing_form() {
        render_form(f, app, chunks[1]);
    } else {
        render_contacts(f, app, chunks[1]);
    }
    render_status_bar(f, app, chunks[2]);

    if app.awaiting_confirmation() {
        render_confirm(f, app);
    }
}

fn render_utility_bar<A: ContactApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let page = app.page();
    let search_style = if app.mode == Mode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(page.search.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title(" Search (/) "),
    );
    f.render_widget(search, chunks[0]);

    let tag = Paragraph::new(page.selected_tag.label()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Tag (t) [{}] ", page.tag_options.len())),
    );
    f.render_widget(tag, chunks[1]);
}

fn render_contacts<A: ContactApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let page = app.page();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Contacts ({}) ", page.rows.len()));

    if page.empty_state_visible {
        let empty = Paragraph::new(Line::from(Span::styled(
            "There are no contacts.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<4} ", row.id), Style::default().fg(Color::Cyan)),
                Span::raw(row.markup.clone()),
            ]))
            .style(style)
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_form<A: ContactApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let form = &app.page().form;
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .flat_map(|(i, field)| field_lines(field, i == app.focus))
        .collect();

    let form_widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", form.heading.title())),
    );
    f.render_widget(form_widget, area);
}

fn field_lines(field: &FormField, focused: bool) -> Vec<Line<'static>> {
    let invalid = Style::default().fg(Color::Red);

    let label_style = if field.markers.label {
        invalid
    } else {
        Style::default().fg(Color::Yellow)
    };
    let mut label = field.label.clone();
    if field.required {
        label.push_str(" *");
    }

    let mut input_style = if field.markers.input {
        invalid
    } else {
        Style::default()
    };
    if focused {
        input_style = input_style.add_modifier(Modifier::REVERSED);
    }
    let cursor = if focused { "_" } else { "" };

    let mut lines = vec![
        Line::from(Span::styled(format!("  {label}"), label_style)),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{}{cursor}", field.value), input_style),
        ]),
    ];
    if field.markers.hint && !field.hint.is_empty() {
        lines.push(Line::from(Span::styled(format!("    {}", field.hint), invalid)));
    }
    lines.push(Line::from(""));
    lines
}

fn render_confirm<A: ContactApi>(f: &mut Frame, app: &App<A>) {
    let page = app.page();
    let Some(id) = page.pending_delete else {
        return;
    };
    let name = app
        .manager
        .contact(id)
        .map(|c| c.full_name.as_str())
        .unwrap_or("Unknown");

    let area = centered(f.area(), 50, 5);
    let text = vec![
        Line::from(format!(" Delete {name}?")),
        Line::from(""),
        Line::from(Span::styled(" y: delete  n: keep", Style::default().fg(Color::DarkGray))),
    ];
    let popup = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn render_status_bar<A: ContactApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let (view_name, keys) = if app.awaiting_confirmation() {
        ("Confirm", "y:delete  n:keep")
    } else if app.showing_form() {
        ("Form", "Tab:next field  Enter:submit  Esc:cancel")
    } else if app.mode == Mode::Search {
        ("Search", "Enter/Esc:done")
    } else {
        ("Contacts", "q:quit  a:add  e:edit  d:delete  /:search  t:tag")
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");
    let status_color = if status_msg.contains("failed") || status_msg.starts_with("Please fix") {
        Color::Red
    } else {
        Color::Green
    };

    let bar = Line::from(vec![
        Span::styled(
            format!(" {view_name} "),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(status_color)),
        Span::raw("  "),
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
