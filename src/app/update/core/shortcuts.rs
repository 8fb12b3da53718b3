use super::super::super::state::App;
use flipbook_core::NavKey;
use iced::keyboard::{Key, Modifiers, key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ShortcutAction {
    Navigate(NavKey),
    Library,
    Quit,
}

impl App {
    pub(super) fn shortcut_for_key(&self, key: Key, modifiers: Modifiers) -> Option<ShortcutAction> {
        let pressed = pressed_token(&key)?;

        if shortcut_matches(&self.config.key_quit, "ctrl+q", &pressed, modifiers) {
            Some(ShortcutAction::Quit)
        } else if shortcut_matches(&self.config.key_library, "escape", &pressed, modifiers) {
            Some(ShortcutAction::Library)
        } else if shortcut_matches(&self.config.key_next_page, "arrowright", &pressed, modifiers) {
            Some(ShortcutAction::Navigate(NavKey::ArrowRight))
        } else if shortcut_matches(&self.config.key_prev_page, "arrowleft", &pressed, modifiers) {
            Some(ShortcutAction::Navigate(NavKey::ArrowLeft))
        } else if shortcut_matches(&self.config.key_first_page, "home", &pressed, modifiers) {
            Some(ShortcutAction::Navigate(NavKey::Home))
        } else if pressed == "end" && modifiers.is_empty() {
            Some(ShortcutAction::Navigate(NavKey::End))
        } else {
            None
        }
    }
}

fn pressed_token(key: &Key) -> Option<String> {
    let token = match key.as_ref() {
        Key::Named(key::Named::ArrowRight) => "arrowright",
        Key::Named(key::Named::ArrowLeft) => "arrowleft",
        Key::Named(key::Named::Home) => "home",
        Key::Named(key::Named::End) => "end",
        Key::Named(key::Named::Escape) => "escape",
        Key::Named(key::Named::Space) => "space",
        Key::Named(key::Named::PageDown) => "pagedown",
        Key::Named(key::Named::PageUp) => "pageup",
        Key::Character(ch) => return Some(ch.to_ascii_lowercase()),
        _ => return None,
    };
    Some(token.to_string())
}

fn shortcut_matches(raw: &str, fallback: &str, pressed: &str, modifiers: Modifiers) -> bool {
    let normalized = normalize_shortcut_token(raw, fallback);

    let mut required_ctrl = false;
    let mut required_alt = false;
    let mut required_logo = false;
    let mut required_shift = false;
    let mut required_key: Option<&str> = None;

    for token in normalized
        .split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        match token {
            "ctrl" | "control" => required_ctrl = true,
            "alt" => required_alt = true,
            "logo" | "meta" | "super" | "cmd" | "command" => required_logo = true,
            "shift" => required_shift = true,
            key => required_key = Some(key),
        }
    }

    let Some(required_key) = required_key else {
        return false;
    };
    if pressed != required_key {
        return false;
    }

    modifiers.control() == required_ctrl
        && modifiers.alt() == required_alt
        && modifiers.logo() == required_logo
        && modifiers.shift() == required_shift
}

/// Lowercases a configured binding and folds common key-name aliases.
fn normalize_shortcut_token(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return fallback.to_string();
    }
    normalized
        .split('+')
        .map(|token| match token.trim() {
            "spacebar" => "space",
            "right" => "arrowright",
            "left" => "arrowleft",
            "esc" => "escape",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("+")
}
