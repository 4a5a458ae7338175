//! OmniRewards single-page client.
//!
//! The page is modelled as a pure state machine ([`state::update`]) driven by
//! [`App`], which owns session storage, analytics, and the auth backend.
//! Rendering is reduced to a serialisable [`ViewModel`].

pub mod analytics;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod history;
pub mod panel;
pub mod state;
pub mod storage;
pub mod toast;
pub mod view;

pub use app::{perform, App};
pub use auth::{AuthBackend, AuthError, SimulatedAuth};
pub use panel::Panel;
pub use state::{update, Action, AppState, Effect, Transition};
pub use storage::{MemoryStorage, Session, SessionStorage};
pub use view::ViewModel;
