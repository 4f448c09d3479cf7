use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::ActiveTab;

#[derive(Debug, Clone)]
pub enum AppAction {
    Quit,
    NextTab,
    PrevTab,
    MoveUp,
    MoveDown,
    // Search tab
    InputChar(char),
    InputBackspace,
    InputClear,
    SubmitQuestion,
    SaveFavorite,
    // Favorites / Manage tabs
    DeleteSelected,
    StartAdd,
    StartEdit,
    // FAQ form actions
    FormChar(char),
    FormBackspace,
    FormNextField,
    FormConfirm,
    FormCancel,
    // General
    ShowHelp,
    HideHelp,
    DismissError,
}

pub fn handle_key_event(
    key: KeyEvent,
    tab: ActiveTab,
    form_active: bool,
    show_help: bool,
    has_error: bool,
) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    // FAQ form mode
    if form_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::FormConfirm),
            KeyCode::Esc => Some(AppAction::FormCancel),
            KeyCode::Tab => Some(AppAction::FormNextField),
            KeyCode::Backspace => Some(AppAction::FormBackspace),
            KeyCode::Char(c) => Some(AppAction::FormChar(c)),
            _ => None,
        };
    }

    // Global bindings
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Some(AppAction::Quit),
        (KeyCode::Tab, _) => return Some(AppAction::NextTab),
        (KeyCode::BackTab, _) => return Some(AppAction::PrevTab),
        (KeyCode::F(1), _) => return Some(AppAction::ShowHelp),
        (KeyCode::Up, _) => return Some(AppAction::MoveUp),
        (KeyCode::Down, _) => return Some(AppAction::MoveDown),
        _ => {}
    }

    // The search tab owns free typing; everything else is a command key.
    if tab == ActiveTab::Search {
        return match key.code {
            KeyCode::Enter => Some(AppAction::SubmitQuestion),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Esc => {
                if has_error {
                    Some(AppAction::DismissError)
                } else {
                    Some(AppAction::InputClear)
                }
            }
            KeyCode::Char('s') if key.modifiers == KeyModifiers::CONTROL => {
                Some(AppAction::SaveFavorite)
            }
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(AppAction::Quit),
        KeyCode::Char('j') => Some(AppAction::MoveDown),
        KeyCode::Char('k') => Some(AppAction::MoveUp),
        KeyCode::Char('d') => Some(AppAction::DeleteSelected),
        KeyCode::Char('a') => Some(AppAction::StartAdd),
        KeyCode::Char('e') => Some(AppAction::StartEdit),
        KeyCode::Char('?') => Some(AppAction::ShowHelp),
        KeyCode::Esc => Some(AppAction::DismissError),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn search_tab_types_into_input() {
        let action = handle_key_event(
            key(KeyCode::Char('q')),
            ActiveTab::Search,
            false,
            false,
            false,
        );
        assert!(matches!(action, Some(AppAction::InputChar('q'))));
    }

    #[test]
    fn other_tabs_treat_q_as_quit() {
        let action = handle_key_event(
            key(KeyCode::Char('q')),
            ActiveTab::History,
            false,
            false,
            false,
        );
        assert!(matches!(action, Some(AppAction::Quit)));
    }

    #[test]
    fn form_mode_captures_typing() {
        let action = handle_key_event(
            key(KeyCode::Char('d')),
            ActiveTab::Manage,
            true,
            false,
            false,
        );
        assert!(matches!(action, Some(AppAction::FormChar('d'))));

        let action = handle_key_event(key(KeyCode::Esc), ActiveTab::Manage, true, false, false);
        assert!(matches!(action, Some(AppAction::FormCancel)));
    }

    #[test]
    fn help_swallows_everything() {
        let action = handle_key_event(
            key(KeyCode::Char('x')),
            ActiveTab::Search,
            false,
            true,
            false,
        );
        assert!(matches!(action, Some(AppAction::HideHelp)));
    }

    #[test]
    fn esc_dismisses_error_before_clearing_input() {
        let action = handle_key_event(key(KeyCode::Esc), ActiveTab::Search, false, false, true);
        assert!(matches!(action, Some(AppAction::DismissError)));

        let action = handle_key_event(key(KeyCode::Esc), ActiveTab::Search, false, false, false);
        assert!(matches!(action, Some(AppAction::InputClear)));
    }
}
