use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::actions::ActionKind;

/// Everything a key can ask the page to do outside of text entry and modals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    NextTab,
    PreviousTab,
    JumpTab(usize),
    ToggleMenu,
    ToggleCompactMenu,
    ToggleTheme,
    FocusSearch,
    Refresh,
    CursorUp,
    CursorDown,
    Activate,
    Back,
    ToggleSelect,
    SelectAll,
    ClearSelection,
    Action(ActionKind),
    DismissToast,
    Logout,
    GoDashboard,
    GoProfile,
}

struct Binding {
    code: KeyCode,
    modifiers: KeyModifiers,
    command: Command,
}

const NONE: KeyModifiers = KeyModifiers::NONE;
const SHIFT: KeyModifiers = KeyModifiers::SHIFT;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;

const fn bind(code: KeyCode, modifiers: KeyModifiers, command: Command) -> Binding {
    Binding {
        code,
        modifiers,
        command,
    }
}

/// Letters are stored lowercase; an uppercase letter is matched as the lowercase
/// letter plus `SHIFT`.
static BINDINGS: &[Binding] = &[
    bind(KeyCode::Char('q'), NONE, Command::Quit),
    bind(KeyCode::Char('c'), CTRL, Command::Quit),
    bind(KeyCode::Tab, NONE, Command::NextTab),
    bind(KeyCode::BackTab, SHIFT, Command::PreviousTab),
    bind(KeyCode::BackTab, NONE, Command::PreviousTab),
    bind(KeyCode::Char('m'), NONE, Command::ToggleMenu),
    bind(KeyCode::Char('n'), CTRL, Command::ToggleCompactMenu),
    bind(KeyCode::Char('t'), NONE, Command::ToggleTheme),
    bind(KeyCode::Char('/'), NONE, Command::FocusSearch),
    bind(KeyCode::Char('r'), NONE, Command::Refresh),
    bind(KeyCode::Up, NONE, Command::CursorUp),
    bind(KeyCode::Char('k'), NONE, Command::CursorUp),
    bind(KeyCode::Down, NONE, Command::CursorDown),
    bind(KeyCode::Char('j'), NONE, Command::CursorDown),
    bind(KeyCode::Enter, NONE, Command::Activate),
    bind(KeyCode::Esc, NONE, Command::Back),
    bind(KeyCode::Char(' '), NONE, Command::ToggleSelect),
    bind(KeyCode::Char('a'), NONE, Command::SelectAll),
    bind(KeyCode::Char('a'), SHIFT, Command::ClearSelection),
    bind(KeyCode::Char('e'), NONE, Command::Action(ActionKind::EditQuantity)),
    bind(KeyCode::Char('p'), NONE, Command::Action(ActionKind::MarkPurchased)),
    bind(KeyCode::Char('d'), NONE, Command::Action(ActionKind::Delete)),
    bind(KeyCode::Delete, NONE, Command::Action(ActionKind::Delete)),
    bind(KeyCode::Char('s'), NONE, Command::Action(ActionKind::AddToShoppingList)),
    bind(KeyCode::Char('p'), SHIFT, Command::Action(ActionKind::BulkMarkPurchased)),
    bind(KeyCode::Char('d'), SHIFT, Command::Action(ActionKind::BulkDelete)),
    bind(KeyCode::Char('x'), NONE, Command::DismissToast),
    bind(KeyCode::Char('l'), CTRL, Command::Logout),
    bind(KeyCode::Char('d'), CTRL.union(SHIFT), Command::GoDashboard),
    bind(KeyCode::Char('p'), CTRL.union(SHIFT), Command::GoProfile),
];

fn normalize(key: &KeyEvent) -> (KeyCode, KeyModifiers) {
    match key.code {
        KeyCode::Char(ch) if ch.is_ascii_uppercase() => (
            KeyCode::Char(ch.to_ascii_lowercase()),
            key.modifiers | KeyModifiers::SHIFT,
        ),
        code => (code, key.modifiers),
    }
}

/// Resolve a key press to a command. Digits jump straight to a tab.
pub fn lookup(key: &KeyEvent) -> Option<Command> {
    let (code, modifiers) = normalize(key);

    if let KeyCode::Char(digit @ '1'..='9') = code {
        if modifiers == NONE {
            return digit
                .to_digit(10)
                .map(|value| Command::JumpTab(value as usize - 1));
        }
    }

    BINDINGS
        .iter()
        .find(|binding| binding.code == code && binding.modifiers == modifiers)
        .map(|binding| binding.command)
}

/// Short help line for the footer.
pub fn hints(inventory: bool) -> &'static str {
    if inventory {
        "/ search • space select • e edit • p purchased • s list • d delete • P/D bulk • t theme • q quit"
    } else {
        "Tab/1-9 tabs • m menu • t theme • r refresh • Ctrl+L logout • q quit"
    }
}
