use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use greenearth_core::routes::Route;

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.submit`(...) with the current form
    Submit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, PageDown, PageUp, Tab, Up};

    // Global quit shortcut; `q` only quits outside the form so it can be typed
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() && app.screen != Screen::Form {
        return Action::Quit;
    }

    let page_rows = i16::try_from(app.viewport_rows().saturating_sub(2))
        .unwrap_or(i16::MAX)
        .max(1);
    let mut action = Action::None;

    match app.screen {
        Screen::Page => match key.code {
            Down | Char('j') => app.scroll_rows(1),
            Up | Char('k') => app.scroll_rows(-1),
            PageDown | Char(' ') => app.scroll_rows(page_rows),
            PageUp => app.scroll_rows(-page_rows),
            Char('g') => app.open_menu(),
            Tab | Enter if app.route() == Route::Contact => {
                app.screen = Screen::Form;
            }
            _ => {}
        },

        Screen::Menu => match key.code {
            Up | Char('k') => {
                app.menu_index = app.menu_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.menu_index + 1 < Route::ALL.len() {
                    app.menu_index += 1;
                }
            }
            Enter | Char(' ') => app.select_menu_entry(),
            Esc | Char('g') => {
                app.screen = Screen::Page;
            }
            _ => {}
        },

        Screen::Form => match key.code {
            Tab | Down => app.focus = app.focus.next(),
            BackTab | Up => app.focus = app.focus.previous(),
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.form.field_mut(app.focus).push(character);
                }
            }
            Backspace => {
                app.form.field_mut(app.focus).pop();
            }
            Enter => {
                if !app.is_submitting {
                    action = Action::Submit;
                }
            }
            Esc => {
                app.screen = Screen::Page;
            }
            _ => {}
        },
    }
    action
}
