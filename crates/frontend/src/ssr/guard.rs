//! Page guard for server renders
//!
//! Runs before a protected page's loader: no access cookie means the landing
//! route, unmet requirements mean the protected route, and an auth failure
//! raised while loading clears both cookies and falls back to the landing
//! route.
//!
//! Requirements are checked against claims decoded WITHOUT signature
//! verification. This only spares users pages they cannot use; the API checks
//! every token again.

use super::context::ServerContext;
use async_trait::async_trait;
use authlink_core::{Requirements, authorize, decode_unverified};
use authlink_http::ClientError;
use serde::Serialize;
use std::future::Future;

/// Navigation answer of a page load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub destination: String,
    pub permanent: bool,
}

impl Redirect {
    /// Temporary redirect to `destination`
    pub fn to(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            permanent: false,
        }
    }
}

/// What a page load produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageOutcome<P> {
    Props(P),
    Redirect(Redirect),
}

impl<P> PageOutcome<P> {
    pub fn redirect(destination: impl Into<String>) -> Self {
        Self::Redirect(Redirect::to(destination))
    }

    pub fn props(&self) -> Option<&P> {
        match self {
            Self::Props(props) => Some(props),
            Self::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Props(_) => None,
            Self::Redirect(redirect) => Some(&redirect.destination),
        }
    }
}

/// Server-side data loading of one page
#[async_trait]
pub trait PageLoader<P>: Send + Sync {
    async fn load(&self, ctx: ServerContext) -> anyhow::Result<PageOutcome<P>>;
}

#[async_trait]
impl<P, F, Fut> PageLoader<P> for F
where
    P: Send + 'static,
    F: Fn(ServerContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<PageOutcome<P>>> + Send + 'static,
{
    async fn load(&self, ctx: ServerContext) -> anyhow::Result<PageOutcome<P>> {
        (self)(ctx).await
    }
}

/// A page loader wrapped in the session checks
pub struct SessionGate<L> {
    loader: L,
    requirements: Option<Requirements>,
}

impl<L> SessionGate<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            requirements: None,
        }
    }

    /// Only let users whose token claims meet `requirements` through
    pub fn require(mut self, requirements: Requirements) -> Self {
        self.requirements = Some(requirements);
        self
    }

    /// Run the checks, then the wrapped loader
    ///
    /// Loader errors other than an auth-token failure are returned unchanged.
    pub async fn load<P>(&self, ctx: ServerContext) -> anyhow::Result<PageOutcome<P>>
    where
        L: PageLoader<P>,
    {
        let config = ctx.config().clone();

        let Some(token) = ctx.credentials().access_token() else {
            tracing::debug!("No access token, redirecting to landing route");
            return Ok(PageOutcome::redirect(config.landing_route));
        };

        if let Some(required) = &self.requirements {
            let allowed = match decode_unverified(&token) {
                Ok(claims) => authorize(&claims, required),
                Err(error) => {
                    tracing::warn!(error = %error, "Could not decode access token claims");
                    false
                }
            };
            if !allowed {
                tracing::debug!("Requirements not met, redirecting to protected route");
                return Ok(PageOutcome::redirect(config.protected_route));
            }
        }

        let credentials = ctx.credentials().clone();
        match self.loader.load(ctx).await {
            Err(error) if is_auth_token(&error) => {
                tracing::info!("Session rejected during render, clearing cookies");
                credentials.clear();
                Ok(PageOutcome::redirect(config.landing_route))
            }
            result => result,
        }
    }
}

fn is_auth_token(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_auth_token)
    })
}
