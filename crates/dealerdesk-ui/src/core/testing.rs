//! Scripted collaborators for native pipeline tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use dealerdesk_api_models::{Role, User};
use serde_json::Value;
use uuid::Uuid;

use crate::core::client::{ApiClients, ClientHooks};
use crate::core::config::ApiConfig;
use crate::core::http::{PreparedRequest, RawResponse, Transport, TransportError};
use crate::core::notify::{Notification, Notifier};
use crate::core::session::SessionSink;
use crate::core::store::AuthStore;
use crate::core::tokens::{MemoryTokenStore, TokenStore};

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<Result<RawResponse, TransportError>>>,
    sent: RefCell<Vec<PreparedRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn respond_json(&self, status: u16, body: &Value) {
        self.respond_raw(status, body.to_string().into_bytes());
    }

    pub(crate) fn respond_raw(&self, status: u16, body: Vec<u8>) {
        self.script
            .borrow_mut()
            .push_back(Ok(RawResponse { status, body }));
    }

    pub(crate) fn fail(&self, reason: &str) {
        self.script
            .borrow_mut()
            .push_back(Err(TransportError::Unreachable(reason.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<PreparedRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        self.sent.borrow_mut().push(request);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unreachable("script exhausted".into())))
    }
}

/// Notifier that records messages in order.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    seen: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.seen
            .borrow()
            .iter()
            .map(|notification| notification.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.borrow_mut().push(notification);
    }
}

/// Session sink backed by a plain [`AuthStore`].
#[derive(Default)]
pub(crate) struct RecordingSession {
    pub(crate) auth: RefCell<AuthStore>,
    expired: Cell<u32>,
}

impl RecordingSession {
    pub(crate) fn expired_count(&self) -> u32 {
        self.expired.get()
    }
}

impl SessionSink for RecordingSession {
    fn session_expired(&self) {
        self.expired.set(self.expired.get() + 1);
        self.auth.borrow_mut().signed_out();
    }
}

/// Both clients wired to scripted collaborators.
pub(crate) struct Harness {
    pub(crate) transport: Rc<ScriptedTransport>,
    pub(crate) tokens: Rc<MemoryTokenStore>,
    pub(crate) session: Rc<RecordingSession>,
    pub(crate) notifier: Rc<RecordingNotifier>,
    pub(crate) clients: ApiClients,
}

impl Harness {
    fn build(tokens: MemoryTokenStore) -> Self {
        let transport = Rc::new(ScriptedTransport::default());
        let tokens = Rc::new(tokens);
        let session = Rc::new(RecordingSession::default());
        let notifier = Rc::new(RecordingNotifier::default());
        let config = ApiConfig {
            api_url: "http://api.test".into(),
            auth_api_url: "http://auth.test".into(),
        };
        let clients = ApiClients::new(
            &config,
            Rc::clone(&transport) as Rc<dyn Transport>,
            ClientHooks {
                tokens: Rc::clone(&tokens) as Rc<dyn TokenStore>,
                session: Rc::clone(&session) as Rc<dyn SessionSink>,
                notifier: Rc::clone(&notifier) as Rc<dyn Notifier>,
            },
        );
        Self {
            transport,
            tokens,
            session,
            notifier,
            clients,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self::build(MemoryTokenStore::default())
    }

    pub(crate) fn with_token(token: &str) -> Self {
        Self::build(MemoryTokenStore::with_durable(token))
    }
}

pub(crate) fn sample_user(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        first_name: "Dana".into(),
        last_name: "Ilic".into(),
        email: "dana@example.com".into(),
        role,
        company: None,
        company_group: None,
    }
}
