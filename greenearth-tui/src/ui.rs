use greenearth_core::{
    contact::{FormField, NotificationKind},
    model::Style as ElementStyle,
    ports::Document,
    routes::Route,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Screen};
use crate::pages::{COL_PX, Kind, ROW_PX};

/// Rows taken by the margin, header, status bar and page borders.
const CHROME_ROWS: u16 = 2 + 3 + 3 + 2;

/// Below this opacity an element is not drawn at all.
const INVISIBLE: f32 = 0.05;

/// Rows available to the page for a terminal of the given height.
pub(crate) fn viewport_rows(terminal_height: u16) -> u16 {
    terminal_height.saturating_sub(CHROME_ROWS).max(1)
}

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let route = app.route();
    let header = Paragraph::new(format!("Green Earth · {}  {}", route.title(), route.path()))
        .block(Block::default().borders(Borders::ALL).title("Green Earth"))
        .style(Style::default().fg(Color::Green));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Menu => draw_menu(frame, app, *content_area),
        Screen::Page | Screen::Form if route == Route::Contact => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(*content_area);
            if let [page_area, form_area] = halves.as_ref() {
                draw_page(frame, app, *page_area);
                draw_form(frame, app, *form_area);
            }
        }
        Screen::Page | Screen::Form => draw_page(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Page if route == Route::Contact => {
            "j/k scroll · PgUp/PgDn page · Tab fill in form · g menu · q/Ctrl-C quit"
        }
        Screen::Page => "j/k scroll · PgUp/PgDn page · g menu · q/Ctrl-C quit",
        Screen::Menu => "↑/↓ move · Enter open page · Esc back · q/Ctrl-C quit",
        Screen::Form => "Type to edit · Tab/Shift-Tab next/prev field · Enter submit · Esc leave form",
    };

    let (status_text, status_style) = if app.is_submitting {
        (
            format!("Submitting… · {nav_hint}"),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(notification) = &app.notification {
        let color = match notification.kind {
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        (
            format!(
                "[{}] {notification} · {nav_hint}",
                notification.raised_at.format("%H:%M:%S")
            ),
            Style::default().fg(color),
        )
    } else {
        (nav_hint.to_owned(), Style::default())
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_menu(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = Route::ALL
        .iter()
        .enumerate()
        .map(|(idx, route)| {
            let prefix = if idx == app.menu_index { "> " } else { "  " };
            ListItem::new(format!("{prefix}{:<32}{}", route.title(), route.path()))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Go to page (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.menu_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_page(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(app.route().path());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let document = app.scene.document();
    let scroll = app.scene.snapshot().scroll_y;
    let active_step = app.pages.active_step(&app.scene);

    for placed in app.pages.placed() {
        let (Some(bounds), Some(style)) = (
            document.bounds(placed.element),
            document.style(placed.element),
        ) else {
            continue;
        };
        if style.opacity < INVISIBLE {
            continue;
        }

        let Some(row) = to_cells((bounds.top + style.y - scroll) / ROW_PX, inner.height) else {
            continue;
        };
        let col = to_cells(style.x / COL_PX, inner.width).unwrap_or(0);

        let active = active_step == Some(placed.element);
        let label = placed.label(&style);
        let text = match placed.kind {
            Kind::Item => format!("• {label}"),
            Kind::Stat => format!("▲ {label}"),
            Kind::Step if active => format!("● {label}"),
            Kind::Step => format!("○ {label}"),
            Kind::Title | Kind::Heading | Kind::Text | Kind::Ornament => label,
        };
        let mut line_style = element_style(placed.kind, &style);
        if active {
            line_style = line_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        let line = Rect {
            x: inner.x + col,
            y: inner.y + row,
            width: inner.width - col,
            height: 1,
        };
        frame.render_widget(Paragraph::new(text).style(line_style), line);
    }
}

fn draw_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let editing = app.screen == Screen::Form;
    let mut lines = Vec::new();

    for field in FormField::ALL {
        let focused = editing && field == app.focus;
        let marker = if field.is_required() { " *" } else { "" };
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        lines.push(Line::styled(format!("{}{marker}", field.label()), label_style));

        let value = app.form.field(field);
        let cursor = if focused { "▏" } else { "" };
        if value.is_empty() {
            lines.push(Line::from(vec![
                Span::raw(cursor),
                Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray)),
            ]));
        } else {
            lines.push(Line::raw(format!("{value}{cursor}")));
        }
        lines.push(Line::raw(""));
    }

    let button = if app.is_submitting {
        "Submitting…"
    } else {
        "[ Enter ] Submit Request"
    };
    lines.push(Line::styled(
        button,
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ));

    let title = if editing {
        "Get in Touch (Esc to leave)"
    } else {
        "Get in Touch (Tab to edit)"
    };
    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(form, area);
}

/// Terminal style for an element: opacity picks a step on the grey ramp until
/// fully visible, scale above one renders bold.
fn element_style(kind: Kind, style: &ElementStyle) -> Style {
    let color = if style.opacity >= 0.99 {
        match kind {
            Kind::Title => Color::LightGreen,
            Kind::Heading => Color::Green,
            Kind::Stat => Color::Yellow,
            Kind::Item | Kind::Step => Color::White,
            Kind::Text => Color::Gray,
            Kind::Ornament => Color::Green,
        }
    } else {
        grey(style.opacity)
    };

    let mut terminal_style = Style::default().fg(color);
    if matches!(kind, Kind::Title | Kind::Heading) || style.scale > 1.01 {
        terminal_style = terminal_style.add_modifier(Modifier::BOLD);
    }
    if style.scale < 0.99 {
        terminal_style = terminal_style.add_modifier(Modifier::DIM);
    }
    terminal_style
}

/// xterm-256 greyscale ramp, 232 (darkest) to 255 (lightest).
fn grey(opacity: f32) -> Color {
    let step = to_cells(opacity.clamp(0.0, 1.0) * 23.0, 24).unwrap_or(0);
    Color::Indexed(232 + u8::try_from(step).unwrap_or(23))
}

/// Round to a cell index, `None` outside `0..limit`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is rounded and range-checked against a u16 limit first"
)]
fn to_cells(value: f32, limit: u16) -> Option<u16> {
    let rounded = value.round();
    (rounded >= 0.0 && rounded < f32::from(limit)).then(|| rounded as u16)
}
