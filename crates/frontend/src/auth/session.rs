//! Per-context session state and sign-out

use arc_swap::ArcSwapOption;
use authlink_core::{
    AuthEvent, BroadcastHub, CredentialPair, CredentialStore, Navigator, Notifier, Session,
    SessionTeardown,
};
use std::sync::Arc;

/// Credentials, identity and sibling notifications of one browser context
pub struct BrowserSession {
    credentials: CredentialStore,
    notifier: Notifier,
    navigator: Arc<dyn Navigator>,
    user: ArcSwapOption<Session>,
    landing_route: String,
}

impl BrowserSession {
    pub fn new(
        hub: BroadcastHub,
        credentials: CredentialStore,
        navigator: Arc<dyn Navigator>,
        landing_route: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            notifier: Notifier::new(hub),
            navigator,
            user: ArcSwapOption::empty(),
            landing_route: landing_route.into(),
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn user(&self) -> Option<Session> {
        self.user.load_full().map(|user| user.as_ref().clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.load().is_some()
    }

    /// Store a freshly issued pair and the identity it belongs to
    pub fn establish(&self, pair: &CredentialPair, user: Session) {
        self.credentials.save(pair);
        self.set_user(user);
    }

    pub fn set_user(&self, user: Session) {
        self.user.store(Some(Arc::new(user)));
    }

    /// Drop the session without telling sibling contexts
    ///
    /// Used when the sign-out itself arrived from a sibling.
    pub fn sign_out_locally(&self) {
        self.clear();
        self.navigator.push(&self.landing_route);
    }

    fn clear(&self) {
        self.credentials.clear();
        self.user.store(None);
    }
}

impl SessionTeardown for BrowserSession {
    fn sign_out(&self) {
        tracing::info!("Signing out");
        self.clear();
        self.notifier.publish(AuthEvent::SignOut);
        self.navigator.push(&self.landing_route);
    }
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession")
            .field("authenticated", &self.is_authenticated())
            .field("landing_route", &self.landing_route)
            .finish_non_exhaustive()
    }
}
