//! Driver that connects the state machine to storage, analytics, and the
//! auth backend.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::analytics::Tracker;
use crate::auth::AuthBackend;
use crate::catalog::REDEEM_DELAY;
use crate::state::{update, Action, AppState, Effect, Transition};
use crate::storage::{Session, SessionStorage};
use crate::view::ViewModel;

pub struct App<S: SessionStorage, B: AuthBackend> {
    storage: S,
    backend: Arc<B>,
    tracker: Tracker,
    state: AppState,
}

impl<S: SessionStorage, B: AuthBackend> App<S, B> {
    /// Restore the stored session and show the home panel.
    pub fn start(storage: S, backend: B) -> Self {
        let session = Session::load(&storage);
        info!(logged_in = session.logged_in, "client starting");
        let Transition { state, effects } = AppState::start(session, Instant::now());
        let mut app = Self {
            storage,
            backend: Arc::new(backend),
            tracker: Tracker::new(),
            state,
        };
        app.apply(effects);
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> ViewModel {
        ViewModel::render(&self.state)
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// Apply `action` at the current time. Synchronous effects run
    /// immediately; those needing the backend are returned for [`perform`].
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let ticked = update(&self.state, Action::Tick(Instant::now())).state;
        let Transition { state, effects } = update(&ticked, action);
        self.state = state;
        self.apply(effects)
    }

    /// Dispatch `action` and keep going until no backend work is left.
    pub async fn dispatch_async(&mut self, action: Action) {
        let mut pending: VecDeque<Effect> = self.dispatch(action).into();
        while let Some(effect) = pending.pop_front() {
            if let Some(done) = perform(&*self.backend, effect).await {
                pending.extend(self.dispatch(done));
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut pending = Vec::new();
        for effect in effects {
            match effect {
                Effect::PersistSession(session) => session.persist(&mut self.storage),
                Effect::ClearSession => Session::clear(&mut self.storage),
                Effect::Track(event) => self.tracker.track(event),
                backend @ (Effect::Authenticate(_) | Effect::Redeem(_)) => pending.push(backend),
            }
        }
        pending
    }
}

/// Carry out one backend effect and return the action that completes it.
/// In-flight work is never cancelled.
pub async fn perform<B: AuthBackend>(backend: &B, effect: Effect) -> Option<Action> {
    match effect {
        Effect::Authenticate(request) => {
            let kind = request.kind();
            debug!(?kind, "authenticating");
            let result = backend.authenticate(request).await;
            Some(Action::AuthCompleted(kind, result))
        }
        Effect::Redeem(reward) => {
            debug!(%reward, "redeeming");
            tokio::time::sleep(REDEEM_DELAY).await;
            Some(Action::RedemptionCompleted)
        }
        Effect::PersistSession(_) | Effect::ClearSession | Effect::Track(_) => None,
    }
}
