//! Pure screen rendering: domain data in, text plus keyboard out.
//!
//! Every function here is a pure mapping so screens can be asserted in
//! tests without a Telegram connection. Buttons carry encoded
//! [`ActionToken`]s; navigation is always reachable, so every screen
//! except HOME itself ends in a nav row with a Home button.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use portero_backend::BackendError;
use portero_core::{ActionToken, ErrorCategory, Gate, GateList, Group, Menu};

/// Visual separator between header and body.
const SEP: &str = "━━━━━━━━━━━━━━";

/// A fully rendered screen: what to show and which buttons to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Plain-text body.
    pub text: String,
    /// Inline keyboard for the message.
    pub keyboard: InlineKeyboardMarkup,
}

fn button(label: &str, token: &ActionToken) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, token.encode())
}

/// Append the trailing navigation row: optional Back, always Home.
fn with_nav(
    mut rows: Vec<Vec<InlineKeyboardButton>>,
    back: Option<ActionToken>,
) -> InlineKeyboardMarkup {
    let mut nav = Vec::with_capacity(2);
    if let Some(back) = back {
        nav.push(button("⬅️ Back", &back));
    }
    nav.push(button("🏠 Home", &ActionToken::Home));
    rows.push(nav);
    InlineKeyboardMarkup::new(rows)
}

fn module_emoji(key: &str) -> &'static str {
    match key {
        "gates" => "🚪",
        "crops" => "🌱",
        _ => "📦",
    }
}

/// HOME: greeting plus one button per enabled module.
#[must_use]
pub fn home(menu: &Menu) -> Screen {
    if menu.requires_account_selection {
        return account_selection_pending();
    }

    let modules = menu.enabled_modules();
    if modules.is_empty() {
        return no_modules();
    }

    let mut text = String::from("🏠 Home\n");
    text.push_str(SEP);
    text.push('\n');
    if let Some(user) = &menu.user {
        if let Some(name) = user.full_name.as_deref().filter(|n| !n.is_empty()) {
            text.push_str(&format!("Hello, {name}!\n"));
        }
        if let Some(account) = user.account_name.as_deref().filter(|a| !a.is_empty()) {
            text.push_str(&format!("Account: {account}\n"));
        }
    }
    text.push_str("\nPick a module:");

    let rows: Vec<Vec<InlineKeyboardButton>> = modules
        .iter()
        .map(|module| {
            vec![button(
                &format!("{} {}", module_emoji(&module.key), module.label),
                &ActionToken::Module {
                    key: module.key.clone(),
                },
            )]
        })
        .collect();

    Screen {
        text,
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

/// The user has modules configured but none enabled, or an empty menu.
#[must_use]
pub fn no_modules() -> Screen {
    Screen {
        text: format!(
            "🏠 Home\n{SEP}\nNo modules are enabled for your account.\n\
             Contact your administrator if this looks wrong."
        ),
        keyboard: with_nav(vec![], None),
    }
}

/// The backend wants the user to pick an account through another
/// channel before the bot can serve them.
#[must_use]
pub fn account_selection_pending() -> Screen {
    Screen {
        text: format!(
            "🏠 Home\n{SEP}\nYour user has several accounts and none is \
             active yet.\nPick one in the web app, then come back here."
        ),
        keyboard: with_nav(vec![], None),
    }
}

/// GROUP_LIST: one button per gate group.
#[must_use]
pub fn groups(groups: &[Group]) -> Screen {
    let rows: Vec<Vec<InlineKeyboardButton>> = groups
        .iter()
        .map(|group| vec![button(&group.name, &ActionToken::Gates { group_id: group.id })])
        .collect();
    Screen {
        text: format!("🏠 Home › 🚪 Gates\n{SEP}\nPick a group:"),
        keyboard: with_nav(rows, Some(ActionToken::Home)),
    }
}

/// GATE_LIST: one button per gate in the group.
#[must_use]
pub fn gates(list: &GateList) -> Screen {
    if list.gates.is_empty() {
        return empty_group(&list.group);
    }
    let rows: Vec<Vec<InlineKeyboardButton>> = list
        .gates
        .iter()
        .map(|gate| {
            vec![button(
                &gate.name,
                &ActionToken::Gate {
                    gate_id: gate.id,
                    group_id: list.group.id,
                },
            )]
        })
        .collect();
    Screen {
        text: format!(
            "🏠 Home › 🚪 Gates › {}\n{SEP}\nPick a gate:",
            list.group.name
        ),
        keyboard: with_nav(rows, Some(ActionToken::Groups)),
    }
}

/// A group with no visible gates. Still navigable.
#[must_use]
pub fn empty_group(group: &Group) -> Screen {
    Screen {
        text: format!(
            "🏠 Home › 🚪 Gates › {}\n{SEP}\nThis group has no gates you \
             can operate.",
            group.name
        ),
        keyboard: with_nav(vec![], Some(ActionToken::Groups)),
    }
}

/// GATE_DETAIL: the single-gate screen with the open command.
#[must_use]
pub fn gate_detail(gate: &Gate, group: &Group) -> Screen {
    let rows = vec![vec![button(
        "🔓 Open",
        &ActionToken::Open {
            gate_id: gate.id,
            group_id: group.id,
        },
    )]];
    Screen {
        text: format!(
            "🏠 Home › 🚪 Gates › {} › {}\n{SEP}\nGate: {}",
            group.name, gate.name, gate.name
        ),
        keyboard: with_nav(rows, Some(ActionToken::Gates { group_id: group.id })),
    }
}

/// HELP screen.
#[must_use]
pub fn help() -> Screen {
    Screen {
        text: format!(
            "ℹ️ Help\n{SEP}\n\
             /start — show the main menu\n\
             /help — this screen\n\
             /open <gate id> — open a gate directly\n\n\
             Use the buttons to navigate; the bot keeps everything in \
             one message."
        ),
        keyboard: with_nav(vec![], None),
    }
}

/// User-facing phrasing for each failure class.
#[must_use]
pub fn error_text(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Transport => "I couldn't reach the backend. Check your connection and try again.",
        ErrorCategory::AuthError => "The bot couldn't authenticate with the backend. This is a configuration problem, not something you did.",
        ErrorCategory::Forbidden => "You don't have permission to do that.",
        ErrorCategory::NotFound => "That item no longer exists. It may have been removed.",
        ErrorCategory::RateLimited => "Too many requests right now. Wait a moment and try again.",
        ErrorCategory::ClientError => "The backend rejected the request. Try starting over with /start.",
        ErrorCategory::ServerError => "The backend had an internal problem. Try again in a moment.",
    }
}

/// Error screen for a failed navigation fetch. `back` retries the level
/// the user came from, when there is one.
#[must_use]
pub fn error(category: ErrorCategory, back: Option<ActionToken>) -> Screen {
    Screen {
        text: format!("⚠️ Something went wrong\n{SEP}\n{}", error_text(category)),
        keyboard: with_nav(vec![], back),
    }
}

/// One-line result text for the open command, shown as a callback
/// answer rather than a screen.
#[must_use]
pub fn open_outcome_text(result: &Result<(), BackendError>) -> String {
    match result {
        Ok(()) => "✅ Command sent".to_owned(),
        Err(err) => format!("❌ {}", error_text(err.category)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portero_core::{Module, UserProfile};

    fn callback_data(screen: &Screen) -> Vec<String> {
        screen
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                    Some(data.clone())
                },
                _ => None,
            })
            .collect()
    }

    fn labels(screen: &Screen) -> Vec<String> {
        screen
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn home_renders_one_row_per_enabled_module() {
        let menu = Menu {
            modules: vec![Module {
                key: "gates".to_owned(),
                label: "Gates".to_owned(),
                enabled: true,
            }],
            user: Some(UserProfile {
                full_name: Some("Ana".to_owned()),
                account_name: Some("Quinta Norte".to_owned()),
                account_id: Some(3),
            }),
            requires_account_selection: false,
        };
        let screen = home(&menu);

        assert!(screen.text.contains("Hello, Ana!"));
        assert!(screen.text.contains("Account: Quinta Norte"));
        assert_eq!(callback_data(&screen), vec!["mod:gates"]);
        // HOME has no Back and no Home button pointing at itself.
        assert!(!labels(&screen).iter().any(|l| l.contains("Back")));
    }

    #[test]
    fn home_is_deterministic() {
        let menu = Menu::default();
        assert_eq!(home(&menu), home(&menu));
    }

    #[test]
    fn empty_menu_falls_back_to_no_modules_screen() {
        let screen = home(&Menu::default());
        assert!(screen.text.contains("No modules"));
        // Still navigable.
        assert_eq!(callback_data(&screen), vec!["nav:home"]);
    }

    #[test]
    fn account_selection_takes_precedence_over_modules() {
        let menu = Menu {
            modules: vec![Module {
                key: "gates".to_owned(),
                label: "Gates".to_owned(),
                enabled: true,
            }],
            user: None,
            requires_account_selection: true,
        };
        let screen = home(&menu);
        assert!(screen.text.contains("several accounts"));
        assert!(!callback_data(&screen).contains(&"mod:gates".to_owned()));
    }

    #[test]
    fn group_list_targets_gate_lists_and_keeps_home() {
        let screen = groups(&[
            Group {
                id: 7,
                name: "Front".to_owned(),
            },
            Group {
                id: 8,
                name: "Back field".to_owned(),
            },
        ]);
        let data = callback_data(&screen);
        assert_eq!(data, vec!["grp:7", "grp:8", "nav:home", "nav:home"]);
        assert!(labels(&screen).iter().any(|l| l.contains("Back")));
    }

    #[test]
    fn gate_list_buttons_carry_parent_group() {
        let list = GateList {
            group: Group {
                id: 7,
                name: "Front".to_owned(),
            },
            gates: vec![Gate {
                id: 12,
                name: "Main gate".to_owned(),
            }],
        };
        let screen = gates(&list);
        let data = callback_data(&screen);
        assert_eq!(data, vec!["gate:12:7", "nav:groups", "nav:home"]);
        assert!(screen.text.contains("Front"));
    }

    #[test]
    fn empty_gate_list_is_not_a_dead_end() {
        let list = GateList {
            group: Group {
                id: 7,
                name: "Front".to_owned(),
            },
            gates: vec![],
        };
        let screen = gates(&list);
        assert!(screen.text.contains("no gates"));
        assert_eq!(callback_data(&screen), vec!["nav:groups", "nav:home"]);
    }

    #[test]
    fn gate_detail_offers_open_and_back_to_its_group() {
        let gate = Gate {
            id: 12,
            name: "Main gate".to_owned(),
        };
        let group = Group {
            id: 7,
            name: "Front".to_owned(),
        };
        let screen = gate_detail(&gate, &group);
        assert_eq!(
            callback_data(&screen),
            vec!["open:12:7", "grp:7", "nav:home"]
        );
    }

    #[test]
    fn error_screen_always_reaches_home() {
        for category in [
            ErrorCategory::Transport,
            ErrorCategory::AuthError,
            ErrorCategory::ServerError,
        ] {
            let screen = error(category, None);
            assert!(callback_data(&screen).contains(&"nav:home".to_owned()));
        }
        let with_back = error(ErrorCategory::Transport, Some(ActionToken::Groups));
        assert_eq!(callback_data(&with_back), vec!["nav:groups", "nav:home"]);
    }

    #[test]
    fn auth_error_reads_as_bot_fault() {
        assert!(error_text(ErrorCategory::AuthError).contains("configuration problem"));
    }

    #[test]
    fn open_outcome_phrases_success_and_failure() {
        assert_eq!(open_outcome_text(&Ok(())), "✅ Command sent");
        let err = BackendError {
            category: ErrorCategory::RateLimited,
            status: 429,
            message: "debounce".to_owned(),
        };
        let text = open_outcome_text(&Err(err));
        assert!(text.starts_with('❌'));
        assert!(text.contains("Wait a moment"));
    }
}
