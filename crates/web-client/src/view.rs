//! What the page shows for a given snapshot.

use serde::Serialize;

use crate::catalog::{format_points, visible_faq, visible_rewards};
use crate::panel::Panel;
use crate::state::{AppState, AuthTab};
use crate::toast::{Severity, ToastId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub panel: Panel,
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastView {
    pub id: ToastId,
    pub severity: Severity,
    pub icon: &'static str,
    pub colour: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub active_panel: Panel,
    pub title: &'static str,
    pub nav: Vec<NavItem>,
    /// Header login/signup buttons.
    pub show_auth_buttons: bool,
    pub show_user_menu: bool,
    pub display_name: Option<String>,
    pub menu_open: bool,
    pub busy: bool,
    pub auth_tab: AuthTab,
    pub points: String,
    pub rewards: Vec<&'static str>,
    pub faq: Vec<&'static str>,
    pub edit_profile_label: &'static str,
    pub toasts: Vec<ToastView>,
}

impl ViewModel {
    pub fn render(state: &AppState) -> Self {
        let logged_in = state.logged_in();
        Self {
            active_panel: state.current,
            title: state.current.title(),
            nav: Panel::nav_items()
                .iter()
                .map(|&panel| NavItem {
                    panel,
                    href: format!("#{}", panel.id()),
                    label: panel.title(),
                    active: state.nav_active == Some(panel),
                })
                .collect(),
            show_auth_buttons: !logged_in,
            show_user_menu: logged_in,
            display_name: state
                .session
                .display_name
                .clone()
                .filter(|_| logged_in),
            menu_open: state.menu_open,
            busy: state.loading,
            auth_tab: state.auth_tab,
            points: format_points(state.points),
            rewards: visible_rewards(&state.reward_filter)
                .into_iter()
                .map(|card| card.name)
                .collect(),
            faq: visible_faq(&state.faq.search, &state.faq.category)
                .into_iter()
                .map(|item| item.question)
                .collect(),
            edit_profile_label: if state.profile_editing { "Save" } else { "Edit" },
            toasts: state
                .toasts
                .visible()
                .iter()
                .map(|toast| ToastView {
                    id: toast.id,
                    severity: toast.severity,
                    icon: toast.severity.icon(),
                    colour: toast.severity.colour(),
                    message: toast.message.clone(),
                })
                .collect(),
        }
    }

    pub fn active_nav(&self) -> Option<Panel> {
        self.nav.iter().find(|item| item.active).map(|item| item.panel)
    }
}
