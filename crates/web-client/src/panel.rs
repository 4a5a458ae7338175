//! The mutually exclusive views of the single-page client.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Home,
    Dashboard,
    Rewards,
    History,
    Faq,
    Settings,
    Auth,
}

impl Panel {
    /// Navigation menu entries, in menu order. `Auth` has no entry.
    pub const NAV: [Panel; 6] = [
        Panel::Home,
        Panel::Dashboard,
        Panel::Rewards,
        Panel::History,
        Panel::Faq,
        Panel::Settings,
    ];

    /// Identifier used in URLs (`#<id>`) and history state.
    pub fn id(self) -> &'static str {
        match self {
            Panel::Home => "home",
            Panel::Dashboard => "dashboard",
            Panel::Rewards => "rewards",
            Panel::History => "history",
            Panel::Faq => "faq",
            Panel::Settings => "settings",
            Panel::Auth => "auth",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        [Panel::Auth]
            .into_iter()
            .chain(Self::NAV)
            .find(|panel| panel.id() == id)
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Home => "Home",
            Panel::Dashboard => "Dashboard",
            Panel::Rewards => "Rewards",
            Panel::History => "History",
            Panel::Faq => "FAQ",
            Panel::Settings => "Settings",
            Panel::Auth => "Sign In",
        }
    }

    /// Panels that require a session; entering one logged out shows `Auth`.
    pub fn is_gated(self) -> bool {
        matches!(self, Panel::Dashboard | Panel::History | Panel::Settings)
    }

    pub fn has_nav_item(self) -> bool {
        self != Panel::Auth
    }

    pub fn nav_items() -> &'static [Panel] {
        &Self::NAV
    }

    /// `Alt+<digit>` target.
    pub fn from_shortcut(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::NAV.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for panel in Panel::nav_items().iter().copied().chain([Panel::Auth]) {
            assert_eq!(Panel::from_id(panel.id()), Some(panel));
        }
        assert_eq!(Panel::from_id("checkout"), None);
    }

    #[test]
    fn gated_panels() {
        let gated: Vec<_> = Panel::NAV.into_iter().filter(|p| p.is_gated()).collect();
        assert_eq!(gated, [Panel::Dashboard, Panel::History, Panel::Settings]);
        assert!(!Panel::Auth.is_gated());
    }

    #[test]
    fn shortcuts_follow_menu_order() {
        assert_eq!(Panel::from_shortcut('1'), Some(Panel::Home));
        assert_eq!(Panel::from_shortcut('5'), Some(Panel::Faq));
        assert_eq!(Panel::from_shortcut('6'), Some(Panel::Settings));
        assert_eq!(Panel::from_shortcut('0'), None);
        assert_eq!(Panel::from_shortcut('7'), None);
        assert_eq!(Panel::from_shortcut('x'), None);
    }

    #[test]
    fn auth_is_not_in_the_menu() {
        assert!(!Panel::nav_items().contains(&Panel::Auth));
        assert!(!Panel::Auth.has_nav_item());
    }
}
