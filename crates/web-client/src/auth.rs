//! Auth forms and the backend contract that answers them.
//!
//! Forms are validated synchronously with the same rules the API applies.
//! Only a valid form becomes a request handed to an [`AuthBackend`].

use std::{collections::VecDeque, future::Future, sync::Mutex, time::Duration};

use common::auth::{LoginRequest, SignupRequest, ValidationError};
use common::protocol::AuthUser;
use thiserror::Error;
use tracing::debug;

/// Simulated latency of a login round trip.
pub const LOGIN_DELAY: Duration = Duration::from_millis(1500);
/// Simulated latency of a signup round trip.
pub const SIGNUP_DELAY: Duration = Duration::from_secs(2);
/// Identity every simulated login resolves to.
pub const DEMO_USER: &str = "John Doe";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),
    #[error("authentication service unavailable")]
    Unavailable,
}

/// Contents of the login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let request = LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// Contents of the signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_terms: bool,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupRequest, ValidationError> {
        let request = SignupRequest {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            agree_terms: self.agree_terms,
        };
        request.validate()?;
        Ok(request)
    }
}

/// A validated request waiting for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login(LoginRequest),
    Signup(SignupRequest),
}

impl AuthRequest {
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthRequest::Login(_) => AuthKind::Login,
            AuthRequest::Signup(_) => AuthKind::Signup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Signup,
}

impl AuthKind {
    pub fn success_message(self) -> &'static str {
        match self {
            AuthKind::Login => "Login successful!",
            AuthKind::Signup => "Account created successfully!",
        }
    }
}

/// Answers validated auth requests.
pub trait AuthBackend {
    fn login(&self, request: LoginRequest) -> impl Future<Output = Result<AuthUser, AuthError>>;
    fn signup(&self, request: SignupRequest) -> impl Future<Output = Result<AuthUser, AuthError>>;

    fn authenticate(
        &self,
        request: AuthRequest,
    ) -> impl Future<Output = Result<AuthUser, AuthError>> {
        async move {
            match request {
                AuthRequest::Login(req) => self.login(req).await,
                AuthRequest::Signup(req) => self.signup(req).await,
            }
        }
    }
}

/// Always succeeds after a fixed delay on the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAuth;

impl AuthBackend for SimulatedAuth {
    async fn login(&self, request: LoginRequest) -> Result<AuthUser, AuthError> {
        debug!(email = %request.email, "simulating login");
        tokio::time::sleep(LOGIN_DELAY).await;
        Ok(AuthUser {
            display_name: DEMO_USER.into(),
        })
    }

    async fn signup(&self, request: SignupRequest) -> Result<AuthUser, AuthError> {
        debug!(email = %request.email, "simulating signup");
        tokio::time::sleep(SIGNUP_DELAY).await;
        Ok(AuthUser {
            display_name: request.display_name(),
        })
    }
}

/// Replays queued outcomes without any delay. Once the script runs out,
/// every call fails with [`AuthError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedAuth {
    outcomes: Mutex<VecDeque<Result<AuthUser, AuthError>>>,
    calls: Mutex<Vec<AuthRequest>>,
}

impl ScriptedAuth {
    pub fn new(outcomes: impl IntoIterator<Item = Result<AuthUser, AuthError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    /// Requests received so far, in order.
    pub fn calls(&self) -> Vec<AuthRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn answer(&self, request: AuthRequest) -> Result<AuthUser, AuthError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front())
            .unwrap_or(Err(AuthError::Unavailable))
    }
}

impl AuthBackend for ScriptedAuth {
    async fn login(&self, request: LoginRequest) -> Result<AuthUser, AuthError> {
        self.answer(AuthRequest::Login(request))
    }

    async fn signup(&self, request: SignupRequest) -> Result<AuthUser, AuthError> {
        self.answer(AuthRequest::Signup(request))
    }
}
