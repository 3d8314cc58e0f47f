//! Shared API context: one pair of clients per app boot.
//!
//! # Design
//! - Screens reach the REST API, token storage, and notifications only through this context.
//! - Writes go through the core fetch wrappers so errors are funnelled in one place.

use std::future::Future;
use std::rc::Rc;

use yewdux::prelude::Dispatch;

use crate::core::cache::{QueryCache, QueryKey};
use crate::core::client::{ApiClient, ApiClients};
use crate::core::errors::{ApiError, RequestError};
use crate::core::fetch::{FetchOptions, run_mutation, run_saga};
use crate::core::notify::{Notification, Notifier};
use crate::core::saga::{Saga, SagaError};
use crate::core::tokens::TokenStore;

/// Shared API context for screens.
#[derive(Clone)]
pub(crate) struct ApiCtx {
    /// Authentication and main API clients.
    pub clients: ApiClients,
    /// Bearer token storage.
    pub tokens: Rc<dyn TokenStore>,
    /// Deferred snackbar notifier.
    pub notifier: Rc<dyn Notifier>,
}

impl ApiCtx {
    /// Main API client.
    pub(crate) fn api(&self) -> Rc<ApiClient> {
        Rc::clone(&self.clients.api)
    }

    /// Queue a success toast.
    pub(crate) fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::success(message));
    }

    /// Queue an error toast.
    pub(crate) fn error(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::error(message));
    }

    /// Run a write, toasting failures, and invalidate `invalidates` on success.
    pub(crate) async fn mutate<T, Fut>(
        &self,
        invalidates: &[QueryKey],
        mutation: Fut,
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, RequestError>>,
    {
        self.mutate_with(invalidates, FetchOptions::default(), mutation)
            .await
    }

    /// [`ApiCtx::mutate`] with explicit options.
    pub(crate) async fn mutate_with<T, Fut>(
        &self,
        invalidates: &[QueryKey],
        options: FetchOptions,
        mutation: Fut,
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, RequestError>>,
    {
        run_mutation(
            &Dispatch::<QueryCache>::new(),
            self.notifier.as_ref(),
            invalidates,
            options,
            mutation,
        )
        .await
    }

    /// Run a multi-step write and invalidate `invalidates` afterwards.
    pub(crate) async fn submit<C>(
        &self,
        saga: &Saga<C>,
        ctx: &mut C,
        invalidates: &[QueryKey],
    ) -> Result<(), SagaError> {
        run_saga(
            &Dispatch::<QueryCache>::new(),
            self.notifier.as_ref(),
            saga,
            ctx,
            invalidates,
            FetchOptions::default(),
        )
        .await
    }
}

impl PartialEq for ApiCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.clients.api, &other.clients.api)
    }
}
