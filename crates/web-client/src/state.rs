//! The client as a pure state machine.
//!
//! [`update`] maps a snapshot and an [`Action`] to the next snapshot plus the
//! [`Effect`]s the driver must carry out. Nothing here touches storage,
//! timers, or the network.
//!
//! Invariants:
//! - exactly one panel is active;
//! - every panel change pushes one history entry and emits one page-view
//!   event;
//! - gated panels are never entered while logged out, whether by
//!   navigation or by history.

use std::fmt;

use common::protocol::AuthUser;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::analytics::TrackedEvent;
use crate::auth::{AuthError, AuthKind, AuthRequest, LoginForm, SignupForm};
use crate::catalog::{ALL, REDEMPTION_COST, STARTING_POINTS};
use crate::history::BrowserHistory;
use crate::panel::Panel;
use crate::storage::Session;
use crate::toast::{Severity, ToastId, Toasts};

/// Horizontal travel, in pixels, a touch must exceed to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthTab {
    #[default]
    Login,
    Signup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqFilter {
    pub search: String,
    pub category: String,
}

impl Default for FaqFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.into(),
        }
    }
}

/// One immutable snapshot of the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub current: Panel,
    pub session: Session,
    /// Highlighted navigation item. `None` when the active panel has none.
    pub nav_active: Option<Panel>,
    pub auth_tab: AuthTab,
    pub menu_open: bool,
    /// An auth or redemption request is in flight; form buttons are disabled.
    pub loading: bool,
    pub toasts: Toasts,
    pub history: BrowserHistory,
    /// Time of the latest event, used to stamp toasts.
    pub clock: Instant,
    pub points: u32,
    pub reward_filter: String,
    pub faq: FaqFilter,
    pub profile_editing: bool,
}

impl AppState {
    /// Snapshot before the first panel is shown.
    pub fn new(session: Session, now: Instant) -> Self {
        Self {
            current: Panel::Home,
            session,
            nav_active: Some(Panel::Home),
            auth_tab: AuthTab::Login,
            menu_open: false,
            loading: false,
            toasts: Toasts::new(),
            history: BrowserHistory::new(),
            clock: now,
            points: STARTING_POINTS,
            reward_filter: ALL.into(),
            faq: FaqFilter::default(),
            profile_editing: false,
        }
    }

    /// Initial transition: show the home panel.
    pub fn start(session: Session, now: Instant) -> Transition {
        let mut step = Step::from(&Self::new(session, now));
        step.show(Panel::Home);
        step.finish()
    }

    pub fn logged_in(&self) -> bool {
        self.session.logged_in
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub alt: bool,
}

impl KeyPress {
    pub fn escape() -> Self {
        Self {
            key: Key::Escape,
            alt: false,
        }
    }

    pub fn alt(digit: char) -> Self {
        Self {
            key: Key::Char(digit),
            alt: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SocialProvider::Google => "Google",
            SocialProvider::Facebook => "Facebook",
        })
    }
}

/// Buttons in the account section of the settings panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountAction {
    ChangePassword,
    DownloadData,
    ExportHistory,
    /// Already confirmed by the user.
    DeleteAccount,
    Other(String),
}

impl AccountAction {
    fn notice(&self) -> (Severity, String) {
        match self {
            AccountAction::ChangePassword => {
                (Severity::Info, "Password change form would open here".into())
            }
            AccountAction::DownloadData => {
                (Severity::Info, "Preparing your data for download...".into())
            }
            AccountAction::ExportHistory => {
                (Severity::Info, "Exporting transaction history...".into())
            }
            AccountAction::DeleteAccount => (Severity::Error, "Account deletion initiated".into()),
            AccountAction::Other(label) => (Severity::Info, format!("{label} clicked")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Navigation menu click.
    Navigate(Panel),
    /// Header login/signup buttons.
    ShowAuth(AuthTab),
    /// Tabs on the auth panel.
    SelectAuthTab(AuthTab),
    GetStarted,
    LearnMore,
    /// Browser back/forward delivered the stored panel, if any.
    PopState(Option<Panel>),
    Back,
    Forward,
    SubmitLogin(LoginForm),
    SubmitSignup(SignupForm),
    AuthCompleted(AuthKind, Result<AuthUser, AuthError>),
    Logout,
    SocialLogin(SocialProvider),
    ToggleMenu,
    Key(KeyPress),
    /// Touch gesture; positive `dx` is rightwards.
    Swipe { dx: f64 },
    DismissToast(ToastId),
    Tick(Instant),
    FilterRewards(String),
    SearchFaq(String),
    FilterFaq(String),
    /// A confirmed redemption of the named reward.
    RedeemReward(String),
    RedemptionCompleted,
    FilterHistory { kind: String, period: String },
    ToggleSetting { name: String, enabled: bool },
    ToggleProfileEdit,
    AccountAction(AccountAction),
    ScriptError { message: String, source: String, line: u32 },
    PageLoaded { load_time_ms: u64 },
}

/// Work the driver performs after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistSession(Session),
    ClearSession,
    Track(TrackedEvent),
    /// Answered with [`Action::AuthCompleted`].
    Authenticate(AuthRequest),
    /// Answered with [`Action::RedemptionCompleted`].
    Redeem(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

/// Compute the next snapshot for `action`.
pub fn update(state: &AppState, action: Action) -> Transition {
    let mut step = Step::from(state);
    let s = &mut step.state;

    match action {
        Action::Navigate(panel) => {
            if step.blocked(panel) {
                debug!(panel = panel.id(), "gated panel, redirecting to auth");
                step.show(Panel::Auth);
            } else {
                step.show(panel);
                step.highlight(panel);
                step.state.menu_open = false;
            }
        }
        Action::ShowAuth(tab) => {
            step.show(Panel::Auth);
            step.state.auth_tab = tab;
        }
        Action::SelectAuthTab(tab) => s.auth_tab = tab,
        Action::GetStarted => {
            if s.logged_in() {
                step.show(Panel::Dashboard);
            } else {
                step.show(Panel::Auth);
                step.state.auth_tab = AuthTab::Signup;
            }
        }
        Action::LearnMore => step.show(Panel::Faq),
        Action::PopState(Some(panel)) => step.restore(panel),
        Action::PopState(None) => {}
        Action::Back => {
            if let Some((history, entry)) = s.history.back() {
                let panel = entry.panel;
                step.state.history = history;
                step.restore(panel);
            }
        }
        Action::Forward => {
            if let Some((history, entry)) = s.history.forward() {
                let panel = entry.panel;
                step.state.history = history;
                step.restore(panel);
            }
        }
        Action::SubmitLogin(form) => {
            if !s.loading {
                match form.validate() {
                    Ok(request) => step.begin(Effect::Authenticate(AuthRequest::Login(request))),
                    Err(err) => step.toast(Severity::Error, err.to_string()),
                }
            }
        }
        Action::SubmitSignup(form) => {
            if !s.loading {
                match form.validate() {
                    Ok(request) => step.begin(Effect::Authenticate(AuthRequest::Signup(request))),
                    Err(err) => step.toast(Severity::Error, err.to_string()),
                }
            }
        }
        Action::AuthCompleted(kind, result) => {
            s.loading = false;
            match result {
                Ok(user) => {
                    let session = Session::signed_in(user.display_name);
                    step.state.session = session.clone();
                    step.effects.push(Effect::PersistSession(session));
                    step.toast(Severity::Success, kind.success_message());
                    step.show(Panel::Dashboard);
                    step.highlight(Panel::Dashboard);
                }
                Err(err) => step.toast(Severity::Error, err.to_string()),
            }
        }
        Action::Logout => {
            s.session = Session::default();
            step.effects.push(Effect::ClearSession);
            step.toast(Severity::Success, "Logged out successfully");
            step.show(Panel::Home);
            step.highlight(Panel::Home);
        }
        Action::SocialLogin(provider) => {
            step.toast(Severity::Info, format!("{provider} login would be implemented here"))
        }
        Action::ToggleMenu => s.menu_open = !s.menu_open,
        Action::Key(press) => step.key(press),
        Action::Swipe { dx } => {
            if dx.abs() > SWIPE_THRESHOLD {
                if dx > 0.0 && !s.menu_open {
                    s.menu_open = true;
                } else if dx < 0.0 && s.menu_open {
                    s.menu_open = false;
                }
            }
        }
        Action::DismissToast(id) => s.toasts = s.toasts.dismiss(id),
        Action::Tick(now) => {
            s.clock = now;
            s.toasts = s.toasts.expire(now);
        }
        Action::FilterRewards(category) => s.reward_filter = category,
        Action::SearchFaq(term) => s.faq.search = term,
        Action::FilterFaq(category) => s.faq.category = category,
        Action::RedeemReward(name) => {
            if !s.loading {
                step.begin(Effect::Redeem(name));
            }
        }
        Action::RedemptionCompleted => {
            s.loading = false;
            s.points = s.points.saturating_sub(REDEMPTION_COST);
            step.toast(Severity::Success, "Reward redeemed successfully!");
        }
        Action::FilterHistory { kind, period } => {
            step.toast(Severity::Info, format!("Filtering by: {kind} for {period}"))
        }
        Action::ToggleSetting { name, enabled } => {
            let status = if enabled { "enabled" } else { "disabled" };
            step.toast(Severity::Info, format!("{name} {status}"));
        }
        Action::ToggleProfileEdit => {
            if s.profile_editing {
                s.profile_editing = false;
                step.toast(Severity::Success, "Profile updated successfully!");
            } else {
                s.profile_editing = true;
            }
        }
        Action::AccountAction(action) => {
            let (severity, message) = action.notice();
            step.toast(severity, message);
        }
        Action::ScriptError {
            message,
            source,
            line,
        } => {
            warn!(%message, %source, line, "script error");
            step.track(TrackedEvent::script_error(&message, &source, line));
        }
        Action::PageLoaded { load_time_ms } => {
            debug!(load_time_ms, "page load time");
            step.track(TrackedEvent::performance(load_time_ms));
        }
    }

    step.finish()
}

/// Accumulates one transition.
struct Step {
    state: AppState,
    effects: Vec<Effect>,
}

impl From<&AppState> for Step {
    fn from(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

impl Step {
    fn show(&mut self, panel: Panel) {
        self.state.current = panel;
        self.state.history = self.state.history.push(panel);
        self.track(TrackedEvent::page_view(panel));
    }

    fn highlight(&mut self, panel: Panel) {
        self.state.nav_active = panel.has_nav_item().then_some(panel);
    }

    /// `true` when `panel` needs a session the snapshot does not have.
    fn blocked(&self, panel: Panel) -> bool {
        panel.is_gated() && !self.state.logged_in()
    }

    /// Back/forward: show and highlight, pushing a fresh entry like any
    /// other page change. Gated panels fall back to auth while logged out.
    fn restore(&mut self, panel: Panel) {
        let panel = if self.blocked(panel) {
            debug!(panel = panel.id(), "gated history entry, redirecting to auth");
            Panel::Auth
        } else {
            panel
        };
        self.show(panel);
        self.highlight(panel);
    }

    fn begin(&mut self, effect: Effect) {
        self.state.loading = true;
        self.effects.push(effect);
    }

    fn toast(&mut self, severity: Severity, message: impl Into<String>) {
        let (toasts, _) = self.state.toasts.push(severity, message, self.state.clock);
        self.state.toasts = toasts;
    }

    fn track(&mut self, event: TrackedEvent) {
        self.effects.push(Effect::Track(event));
    }

    fn key(&mut self, press: KeyPress) {
        match press.key {
            Key::Escape => self.state.menu_open = false,
            Key::Char(digit) if press.alt => {
                // Only home and FAQ are reachable by shortcut while logged out.
                let Some(panel) = Panel::from_shortcut(digit) else {
                    return;
                };
                if self.state.logged_in() || matches!(panel, Panel::Home | Panel::Faq) {
                    self.show(panel);
                }
            }
            Key::Char(_) => {}
        }
    }

    fn finish(self) -> Transition {
        Transition {
            state: self.state,
            effects: self.effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEMO_USER;
    use std::time::Duration;

    fn fresh(logged_in: bool) -> AppState {
        let session = if logged_in {
            Session::signed_in(DEMO_USER)
        } else {
            Session::default()
        };
        AppState::start(session, Instant::now()).state
    }

    fn page_views(effects: &[Effect]) -> Vec<Panel> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Track(ev) if ev.name == "page_view" => {
                    ev.properties["page"].as_str().and_then(Panel::from_id)
                }
                _ => None,
            })
            .collect()
    }

    fn latest_toast(state: &AppState) -> (Severity, &str) {
        let toast = state.toasts.latest().unwrap();
        (toast.severity, toast.message.as_str())
    }

    fn valid_login() -> LoginForm {
        LoginForm {
            email: "a@b.co".into(),
            password: "pw".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_shows_home_once() {
        let t = AppState::start(Session::default(), Instant::now());
        assert_eq!(t.state.current, Panel::Home);
        assert_eq!(t.state.history.len(), 1);
        assert_eq!(page_views(&t.effects), [Panel::Home]);
    }

    #[tokio::test(start_paused = true)]
    async fn gated_panels_redirect_to_auth_when_logged_out() {
        for target in [Panel::Dashboard, Panel::History, Panel::Settings] {
            let state = AppState {
                menu_open: true,
                ..fresh(false)
            };
            let t = update(&state, Action::Navigate(target));
            assert_eq!(t.state.current, Panel::Auth);
            assert_eq!(t.state.nav_active, Some(Panel::Home));
            assert!(t.state.menu_open);
            assert_eq!(page_views(&t.effects), [Panel::Auth]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_highlights_and_closes_menu() {
        let state = AppState {
            menu_open: true,
            ..fresh(true)
        };
        let t = update(&state, Action::Navigate(Panel::Settings));
        assert_eq!(t.state.current, Panel::Settings);
        assert_eq!(t.state.nav_active, Some(Panel::Settings));
        assert!(!t.state.menu_open);
        assert_eq!(t.state.history.len(), 2);
        assert_eq!(t.state.history.current().unwrap().url, "#settings");
    }

    #[tokio::test(start_paused = true)]
    async fn rewards_are_open_to_guests_by_click() {
        let t = update(&fresh(false), Action::Navigate(Panel::Rewards));
        assert_eq!(t.state.current, Panel::Rewards);
    }

    #[tokio::test(start_paused = true)]
    async fn hero_buttons() {
        let t = update(&fresh(false), Action::GetStarted);
        assert_eq!(t.state.current, Panel::Auth);
        assert_eq!(t.state.auth_tab, AuthTab::Signup);

        let t = update(&fresh(true), Action::GetStarted);
        assert_eq!(t.state.current, Panel::Dashboard);

        let t = update(&fresh(false), Action::LearnMore);
        assert_eq!(t.state.current, Panel::Faq);

        let t = update(&fresh(false), Action::ShowAuth(AuthTab::Signup));
        assert_eq!((t.state.current, t.state.auth_tab), (Panel::Auth, AuthTab::Signup));
    }

    #[tokio::test(start_paused = true)]
    async fn signup_mismatch_toasts_without_session_change() {
        let state = fresh(false);
        let form = SignupForm {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            phone: "555-0100".into(),
            password: "one".into(),
            confirm_password: "two".into(),
            agree_terms: true,
        };
        let t = update(&state, Action::SubmitSignup(form));
        assert_eq!(latest_toast(&t.state), (Severity::Error, "Passwords do not match"));
        assert!(!t.state.logged_in());
        assert!(!t.state.loading);
        assert!(t.effects.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn valid_login_requests_authentication() {
        let t = update(&fresh(false), Action::SubmitLogin(valid_login()));
        assert!(t.state.loading);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::Authenticate(AuthRequest::Login(_))]
        ));
        assert!(t.state.toasts.is_empty());

        // A second submit while loading is ignored.
        let again = update(&t.state, Action::SubmitLogin(valid_login()));
        assert!(again.effects.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn auth_completion_signs_in_and_shows_dashboard() {
        let state = AppState {
            loading: true,
            ..fresh(false)
        };
        let user = AuthUser {
            display_name: "Asha Rao".into(),
        };
        let t = update(&state, Action::AuthCompleted(AuthKind::Signup, Ok(user)));
        assert!(t.state.logged_in());
        assert!(!t.state.loading);
        assert_eq!(t.state.current, Panel::Dashboard);
        assert_eq!(t.state.nav_active, Some(Panel::Dashboard));
        assert_eq!(
            latest_toast(&t.state),
            (Severity::Success, "Account created successfully!")
        );
        assert_eq!(
            t.effects[0],
            Effect::PersistSession(Session::signed_in("Asha Rao"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_toasts_error() {
        let state = AppState {
            loading: true,
            ..fresh(false)
        };
        let t = update(
            &state,
            Action::AuthCompleted(AuthKind::Login, Err(AuthError::Unavailable)),
        );
        assert!(!t.state.logged_in());
        assert_eq!(t.state.current, Panel::Home);
        assert_eq!(
            latest_toast(&t.state),
            (Severity::Error, "authentication service unavailable")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn logout_clears_session_and_goes_home() {
        let state = update(&fresh(true), Action::Navigate(Panel::Rewards)).state;
        let t = update(&state, Action::Logout);
        assert!(!t.state.logged_in());
        assert_eq!(t.state.current, Panel::Home);
        assert_eq!(t.state.nav_active, Some(Panel::Home));
        assert!(t.effects.contains(&Effect::ClearSession));
        assert_eq!(latest_toast(&t.state), (Severity::Success, "Logged out successfully"));
    }

    #[tokio::test(start_paused = true)]
    async fn shortcuts_respect_session() {
        let guest = fresh(false);
        for digit in ['2', '3', '4', '6'] {
            let t = update(&guest, Action::Key(KeyPress::alt(digit)));
            assert_eq!(t.state, guest, "Alt+{digit}");
            assert!(t.effects.is_empty());
        }
        assert_eq!(update(&guest, Action::Key(KeyPress::alt('5'))).state.current, Panel::Faq);

        let member = fresh(true);
        let t = update(&member, Action::Key(KeyPress::alt('4')));
        assert_eq!(t.state.current, Panel::History);
        // Shortcuts do not move the highlight.
        assert_eq!(t.state.nav_active, Some(Panel::Home));

        let plain = KeyPress {
            key: Key::Char('4'),
            alt: false,
        };
        assert_eq!(update(&member, Action::Key(plain)).state, member);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_and_swipes_drive_the_menu() {
        let open = update(&fresh(false), Action::ToggleMenu).state;
        assert!(open.menu_open);
        assert!(!update(&open, Action::Key(KeyPress::escape())).state.menu_open);

        let closed = fresh(false);
        assert!(!update(&closed, Action::Swipe { dx: 80.0 }).state.menu_open);
        assert!(update(&closed, Action::Swipe { dx: 140.0 }).state.menu_open);
        assert!(!update(&open, Action::Swipe { dx: -101.0 }).state.menu_open);
        assert!(update(&open, Action::Swipe { dx: 150.0 }).state.menu_open);
    }

    #[tokio::test(start_paused = true)]
    async fn back_restores_and_pushes() {
        let state = fresh(true);
        let state = update(&state, Action::Navigate(Panel::Rewards)).state;
        let state = update(&state, Action::Navigate(Panel::Faq)).state;

        let t = update(&state, Action::Back);
        assert_eq!(t.state.current, Panel::Rewards);
        assert_eq!(t.state.nav_active, Some(Panel::Rewards));
        assert_eq!(page_views(&t.effects), [Panel::Rewards]);
        // The restored page is pushed again, dropping the forward entry.
        assert_eq!(t.state.history.len(), 3);
        assert!(t.state.history.forward().is_none());

        let t = update(&state, Action::PopState(None));
        assert_eq!(t.state, state);
    }

    #[tokio::test(start_paused = true)]
    async fn back_after_logout_cannot_reenter_gated_panels() {
        let state = fresh(true);
        let state = update(&state, Action::Navigate(Panel::Dashboard)).state;
        let state = update(&state, Action::Logout).state;
        assert_eq!(state.current, Panel::Home);

        let t = update(&state, Action::Back);
        assert!(!t.state.logged_in());
        assert_eq!(t.state.current, Panel::Auth);
        assert_eq!(t.state.nav_active, None);
        assert_eq!(page_views(&t.effects), [Panel::Auth]);
        assert_eq!(t.state.history.current().unwrap().url, "#auth");
    }

    #[tokio::test(start_paused = true)]
    async fn popstate_guards_gated_panels() {
        let guest = fresh(false);
        for target in [Panel::Dashboard, Panel::History, Panel::Settings] {
            let t = update(&guest, Action::PopState(Some(target)));
            assert_eq!(t.state.current, Panel::Auth, "{target:?}");
        }
        let t = update(&guest, Action::PopState(Some(Panel::Rewards)));
        assert_eq!(t.state.current, Panel::Rewards);
        assert_eq!(t.state.nav_active, Some(Panel::Rewards));

        let member = fresh(true);
        let t = update(&member, Action::PopState(Some(Panel::Settings)));
        assert_eq!(t.state.current, Panel::Settings);
    }

    #[tokio::test(start_paused = true)]
    async fn forward_into_gated_panel_after_logout() {
        let state = fresh(true);
        let state = update(&state, Action::Navigate(Panel::History)).state;
        // Step back by hand so the forward entry survives, then sign out
        // without touching history.
        let (history, _) = state.history.back().unwrap();
        let state = AppState {
            history,
            session: Session::default(),
            current: Panel::Home,
            ..state
        };
        let t = update(&state, Action::Forward);
        assert_eq!(t.state.current, Panel::Auth);
    }

    #[tokio::test(start_paused = true)]
    async fn popstate_to_auth_clears_highlight() {
        let t = update(&fresh(false), Action::PopState(Some(Panel::Auth)));
        assert_eq!(t.state.current, Panel::Auth);
        assert_eq!(t.state.nav_active, None);
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_expire_on_tick_and_can_be_dismissed() {
        let state = fresh(false);
        let t = update(&state, Action::SocialLogin(SocialProvider::Google));
        assert_eq!(
            latest_toast(&t.state),
            (Severity::Info, "Google login would be implemented here")
        );
        let id = t.state.toasts.latest().unwrap().id;

        let later = state.clock + Duration::from_secs(5);
        assert!(update(&t.state, Action::Tick(later)).state.toasts.is_empty());
        assert!(update(&t.state, Action::DismissToast(id)).state.toasts.is_empty());
        assert_eq!(
            update(&t.state, Action::Tick(state.clock + Duration::from_secs(4)))
                .state
                .toasts
                .visible()
                .len(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn redemption_deducts_points_and_saturates() {
        let t = update(&fresh(true), Action::RedeemReward("Spa Day Voucher".into()));
        assert!(t.state.loading);
        assert_eq!(t.effects, [Effect::Redeem("Spa Day Voucher".into())]);

        let done = update(&t.state, Action::RedemptionCompleted).state;
        assert_eq!(done.points, STARTING_POINTS - 100);
        assert!(!done.loading);
        assert_eq!(latest_toast(&done), (Severity::Success, "Reward redeemed successfully!"));

        let poor = AppState {
            points: 40,
            ..fresh(true)
        };
        assert_eq!(update(&poor, Action::RedemptionCompleted).state.points, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn settings_and_history_notices() {
        let state = fresh(true);
        let t = update(
            &state,
            Action::FilterHistory {
                kind: "earned".into(),
                period: "30days".into(),
            },
        );
        assert_eq!(latest_toast(&t.state), (Severity::Info, "Filtering by: earned for 30days"));

        let t = update(
            &state,
            Action::ToggleSetting {
                name: "Email Notifications".into(),
                enabled: false,
            },
        );
        assert_eq!(latest_toast(&t.state).1, "Email Notifications disabled");

        let editing = update(&state, Action::ToggleProfileEdit).state;
        assert!(editing.profile_editing);
        assert!(editing.toasts.is_empty());
        let saved = update(&editing, Action::ToggleProfileEdit).state;
        assert_eq!(latest_toast(&saved), (Severity::Success, "Profile updated successfully!"));

        let t = update(&state, Action::AccountAction(AccountAction::DeleteAccount));
        assert_eq!(latest_toast(&t.state), (Severity::Error, "Account deletion initiated"));
        let t = update(&state, Action::AccountAction(AccountAction::Other("Help".into())));
        assert_eq!(latest_toast(&t.state), (Severity::Info, "Help clicked"));
    }

    #[tokio::test(start_paused = true)]
    async fn script_errors_are_tracked_only() {
        let state = fresh(false);
        let t = update(
            &state,
            Action::ScriptError {
                message: "boom".into(),
                source: "script.js".into(),
                line: 7,
            },
        );
        assert_eq!(t.state, state);
        assert!(matches!(
            t.effects.as_slice(),
            [Effect::Track(ev)] if ev.name == "javascript_error"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn filters_update_state() {
        let state = fresh(false);
        let state = update(&state, Action::FilterRewards("products".into())).state;
        let state = update(&state, Action::SearchFaq("points".into())).state;
        let state = update(&state, Action::FilterFaq("rewards".into())).state;
        assert_eq!(state.reward_filter, "products");
        assert_eq!(state.faq.search, "points");
        assert_eq!(state.faq.category, "rewards");
    }
}
