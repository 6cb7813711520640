//! Global authentication context of one browser context

use super::session::BrowserSession;
use authlink_core::{
    AuthEvent, BroadcastHub, ClientConfig, CredentialStore, Environment, Navigator, Requirements,
    Session, SessionTeardown,
};
use authlink_http::types::SignInRequest;
use authlink_http::{ApiClient, ClientError};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Request pipeline plus session state of a browser context
///
/// Cloning is cheap; clones share the session and the pipeline.
#[derive(Clone)]
pub struct AuthContext {
    session: Arc<BrowserSession>,
    client: ApiClient,
    protected_route: String,
}

impl AuthContext {
    pub fn new(
        hub: BroadcastHub,
        credentials: CredentialStore,
        navigator: Arc<dyn Navigator>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let session = Arc::new(BrowserSession::new(
            hub,
            credentials.clone(),
            navigator,
            &config.landing_route,
        ));
        let teardown: Arc<dyn SessionTeardown> = session.clone();
        let client = ApiClient::from_config(config, credentials, Environment::Browser(teardown))?;

        Ok(Self {
            session,
            client,
            protected_route: config.protected_route.clone(),
        })
    }

    /// Pipeline for page requests made by this context
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    pub fn user(&self) -> Option<Session> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Whether the signed-in user meets `required`; always false when signed out
    pub fn can(&self, required: &Requirements) -> bool {
        self.session
            .user()
            .is_some_and(|user| user.satisfies(required))
    }

    /// Sign in with email and password
    ///
    /// On success both cookies are written, the user is taken to the protected
    /// route and sibling contexts are told to reload.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.sign_in(&request).await.inspect_err(|error| {
            tracing::warn!(error = %error, "Sign-in failed");
        })?;

        let user = response.session(email);
        self.session.establish(&response.credentials(), user.clone());
        self.client.set_bearer(Some(&response.token));
        tracing::info!("Signed in");

        self.session.navigator().push(&self.protected_route);
        self.session.notifier().publish(AuthEvent::SignIn);
        Ok(user)
    }

    /// Full sign-out: cookies, identity and bearer are dropped and siblings follow
    pub fn sign_out(&self) {
        self.client.end_session();
        self.session.sign_out();
    }

    /// Rebuild the in-memory session after a reload
    ///
    /// Returns `Ok(None)` when no access cookie is present. Any failure leaves
    /// the context signed out.
    pub async fn hydrate(&self) -> Result<Option<Session>, ClientError> {
        if self.session.credentials().access_token().is_none() {
            return Ok(None);
        }

        match self.client.me().await {
            Ok(me) => {
                let user = Session::from(me);
                self.session.set_user(user.clone());
                tracing::debug!("Session restored");
                Ok(Some(user))
            }
            Err(error) => {
                tracing::warn!(error = %error, "Could not restore session");
                // The pipeline has already torn the session down for these.
                if !error.is_session_lost() {
                    self.sign_out();
                }
                Err(error)
            }
        }
    }

    /// Follow sign-in and sign-out events from sibling contexts
    ///
    /// A sibling sign-out signs this context out without echoing the event,
    /// closes the channel and ends the listener. A sibling sign-in forces a
    /// full navigation to the protected route.
    pub fn listen(&self) -> JoinHandle<()> {
        let mut events = self.session.notifier().subscribe();
        let context = self.clone();

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                match event {
                    AuthEvent::SignOut => {
                        tracing::info!("Signed out by another context");
                        context.client.end_session();
                        context.session.sign_out_locally();
                        context.session.notifier().close();
                        break;
                    }
                    AuthEvent::SignIn => {
                        tracing::info!("Signed in by another context");
                        context
                            .session
                            .navigator()
                            .replace(&context.protected_route);
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("session", &self.session)
            .field("client", &self.client)
            .finish()
    }
}
