//! The session controller: one state machine that owns the conversation and
//! sequences credential, API and history operations.
//!
//! ```text
//! Unauthenticated --submit_key--> Validating --ok--> LoadingModels --ok--> Ready
//!        ^                             |                   |                 |
//!        +------------- rejected ------+------ failed -----+----- logout ----+
//! ```
//!
//! Rendering surfaces subscribe with a [`SessionObserver`] and never touch
//! storage or the network themselves.

use std::error::Error;
use std::fmt;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ChatApi, Model};
use crate::auth::CredentialStore;
use crate::core::keyring::KeyringAccessError;
use crate::core::message::{Message, Notice};
use crate::storage::{Durability, History, ScopeKey, StorageError};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Validating,
    LoadingModels,
    Ready,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Validating => "validating",
            SessionState::LoadingModels => "loading-models",
            SessionState::Ready => "ready",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rendering surface is told about.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    StateChanged(SessionState),
    ModelsLoaded {
        models: &'a [Model],
        active: Option<&'a str>,
    },
    /// The whole visible conversation changed (login, reset, logout).
    HistoryReplaced(&'a [Message]),
    MessageAppended(&'a Message),
    Notice(&'a Notice),
}

pub trait SessionObserver: Send {
    fn on_event(&mut self, event: SessionEvent<'_>);
}

#[derive(Default)]
struct Observers(Vec<Box<dyn SessionObserver>>);

impl Observers {
    fn emit(&mut self, event: SessionEvent<'_>) {
        for observer in &mut self.0 {
            observer.on_event(event);
        }
    }

    fn notice(&mut self, notice: Notice) {
        self.emit(SessionEvent::Notice(&notice));
    }
}

#[derive(Debug)]
pub enum SessionError {
    Api(ApiError),
    Storage(StorageError),
    Credential(KeyringAccessError),
    /// The operation is not allowed in the current state.
    NotReady(SessionState),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Api(err) => write!(f, "{err}"),
            SessionError::Storage(err) => write!(f, "{err}"),
            SessionError::Credential(err) => write!(f, "{err}"),
            SessionError::NotReady(state) => {
                write!(f, "Session is not ready (currently {state})")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Api(err) => Some(err),
            SessionError::Storage(err) => Some(err),
            SessionError::Credential(err) => Some(err),
            SessionError::NotReady(_) => None,
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        SessionError::Api(err)
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err)
    }
}

impl From<KeyringAccessError> for SessionError {
    fn from(err: KeyringAccessError) -> Self {
        SessionError::Credential(err)
    }
}

/// Result of a completed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub reply: Message,
    /// Whether the user's message reached durable storage.
    pub user_durable: bool,
    /// Whether the reply reached durable storage.
    pub reply_durable: bool,
}

pub struct SessionController {
    api: Box<dyn ChatApi>,
    credentials: CredentialStore,
    history: History,
    observers: Observers,
    state: SessionState,
    scope: Option<ScopeKey>,
    models: Vec<Model>,
    active_model: Option<String>,
    messages: Vec<Message>,
    request_seq: u64,
}

impl SessionController {
    pub fn new(api: Box<dyn ChatApi>, credentials: CredentialStore, history: History) -> Self {
        Self {
            api,
            credentials,
            history,
            observers: Observers::default(),
            state: SessionState::Unauthenticated,
            scope: None,
            models: Vec::new(),
            active_model: None,
            messages: Vec::new(),
            request_seq: 0,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.0.push(observer);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The conversation, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active_model.as_deref()
    }

    /// Resume a stored credential, if there is one.
    ///
    /// A stored key was validated when it was entered, so this goes straight
    /// to loading models.
    pub async fn start(&mut self) -> Result<SessionState, SessionError> {
        match self.credentials.get() {
            Ok(Some(key)) => {
                info!("resuming stored credential");
                self.scope = Some(ScopeKey::for_credential(&key));
                self.load_models().await?;
            }
            Ok(None) => {
                debug!("no stored credential");
                self.set_state(SessionState::Unauthenticated);
            }
            Err(err) => {
                warn!(error = %err, "could not read stored credential");
                self.observers
                    .notice(Notice::error(format!("Could not read API key: {err}")));
                self.set_state(SessionState::Unauthenticated);
                return Err(err.into());
            }
        }
        Ok(self.state)
    }

    /// Validate `key`, store it, and continue into model loading.
    pub async fn submit_key(&mut self, key: &str) -> Result<(), SessionError> {
        if self.state != SessionState::Unauthenticated {
            return Err(SessionError::NotReady(self.state));
        }

        let key = key.trim();
        if key.is_empty() {
            self.observers.notice(Notice::error("Please enter API key"));
            return Err(ApiError::InvalidCredential.into());
        }

        self.set_state(SessionState::Validating);
        if !self.api.validate_key(key).await {
            info!("credential rejected");
            self.set_state(SessionState::Unauthenticated);
            self.observers
                .notice(Notice::error(ApiError::InvalidCredential.to_string()));
            return Err(ApiError::InvalidCredential.into());
        }

        if let Err(err) = self.credentials.set(key) {
            warn!(error = %err, "could not store credential");
            self.set_state(SessionState::Unauthenticated);
            self.observers
                .notice(Notice::error(format!("Could not save API key: {err}")));
            return Err(err.into());
        }

        info!("credential accepted");
        self.scope = Some(ScopeKey::for_credential(key));
        self.load_models().await
    }

    async fn load_models(&mut self) -> Result<(), SessionError> {
        self.set_state(SessionState::LoadingModels);

        let listed = self.api.list_models(self.credentials.cached()).await;
        let models = match listed {
            Ok(models) => models,
            Err(err) => {
                warn!(error = %err, "model list failed; dropping credential");
                if let Err(clear_err) = self.credentials.clear() {
                    warn!(error = %clear_err, "could not clear credential");
                }
                self.scope = None;
                self.set_state(SessionState::Unauthenticated);
                self.observers.notice(Notice::error(err.to_string()));
                return Err(err.into());
            }
        };

        self.active_model = models.first().map(|model| model.id.clone());
        self.models = models;
        debug!(
            count = self.models.len(),
            active = self.active_model.as_deref().unwrap_or(""),
            "models loaded"
        );
        self.observers.emit(SessionEvent::ModelsLoaded {
            models: &self.models,
            active: self.active_model.as_deref(),
        });

        self.messages = match self.history.load(self.scope.as_ref()) {
            Ok(messages) => messages,
            Err(err) => {
                warn!(error = %err, "could not load history");
                self.observers
                    .notice(Notice::warning(format!("Could not load history: {err}")));
                Vec::new()
            }
        };
        debug!(count = self.messages.len(), "history loaded");
        self.observers
            .emit(SessionEvent::HistoryReplaced(&self.messages));

        self.set_state(SessionState::Ready);
        Ok(())
    }

    /// Send one user turn.
    ///
    /// Whitespace-only text is ignored and returns `Ok(None)`. The user
    /// message is kept even when the request fails.
    pub async fn send(&mut self, text: &str) -> Result<Option<SendOutcome>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.state != SessionState::Ready {
            self.observers
                .notice(Notice::error("Sign in before sending messages"));
            return Err(SessionError::NotReady(self.state));
        }

        self.request_seq += 1;
        let seq = self.request_seq;

        let user_durable = self.record(Message::user(text));

        let model = self.active_model.clone().unwrap_or_default();
        debug!(seq, model = %model, "sending message");
        let reply = self
            .api
            .send_message(self.credentials.cached(), text, &model)
            .await;

        match reply {
            Ok(content) => {
                debug!(seq, chars = content.len(), "reply received");
                let reply = Message::assistant(content);
                let reply_durable = self.record(reply.clone());
                Ok(Some(SendOutcome {
                    reply,
                    user_durable,
                    reply_durable,
                }))
            }
            Err(err) => {
                warn!(seq, error = %err, "send failed");
                self.observers.notice(Notice::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Append to memory, notify, then persist. Returns whether the write was durable.
    fn record(&mut self, message: Message) -> bool {
        let written = self.history.append(self.scope.as_ref(), &message);
        self.messages.push(message);
        if let Some(message) = self.messages.last() {
            self.observers.emit(SessionEvent::MessageAppended(message));
        }

        match written {
            Ok(durability) => durability.is_durable(),
            Err(err) => {
                warn!(error = %err, "could not persist message");
                self.observers
                    .notice(Notice::warning(format!("Message not saved: {err}")));
                false
            }
        }
    }

    /// Forget the credential and in-memory state. Persisted history stays.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let cleared = self.credentials.clear();

        self.scope = None;
        self.models.clear();
        self.active_model = None;
        self.messages.clear();
        self.observers.emit(SessionEvent::ModelsLoaded {
            models: &self.models,
            active: None,
        });
        self.observers
            .emit(SessionEvent::HistoryReplaced(&self.messages));
        self.set_state(SessionState::Unauthenticated);

        match cleared {
            Ok(()) => {
                info!("logged out");
                self.observers.notice(Notice::info("Logged out"));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "could not remove stored credential");
                self.observers
                    .notice(Notice::error(format!("Could not remove API key: {err}")));
                Err(err.into())
            }
        }
    }

    /// Log out without contacting the server, optionally deleting the stored
    /// key's saved history first.
    ///
    /// Works in any state, since the scope comes from the stored key rather
    /// than from a live session. The credential is cleared even when the
    /// history could not be.
    pub fn forget(&mut self, purge: bool) -> Result<Durability, SessionError> {
        let mut cleared = Ok(Durability::Skipped);
        if purge {
            let scope = match self.credentials.get() {
                Ok(key) => key.map(|key| ScopeKey::for_credential(&key)),
                Err(err) => {
                    warn!(error = %err, "could not read stored credential");
                    self.observers
                        .notice(Notice::error(format!("Could not read API key: {err}")));
                    return Err(err.into());
                }
            };
            cleared = self.history.clear(scope.as_ref());
            match &cleared {
                Ok(durability) => {
                    info!(durable = durability.is_durable(), "stored history purged")
                }
                Err(err) => {
                    warn!(error = %err, "could not purge stored history");
                    self.observers
                        .notice(Notice::warning(format!("Stored history not cleared: {err}")));
                }
            }
        }

        self.logout()?;
        Ok(cleared?)
    }

    /// Clear the conversation in memory and on disk; the credential stays.
    pub fn reset(&mut self) -> Result<Durability, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady(self.state));
        }

        self.messages.clear();
        self.observers
            .emit(SessionEvent::HistoryReplaced(&self.messages));

        match self.history.clear(self.scope.as_ref()) {
            Ok(durability) => {
                info!("chat reset");
                self.observers.notice(Notice::info("Chat has been reset"));
                Ok(durability)
            }
            Err(err) => {
                warn!(error = %err, "could not clear stored history");
                self.observers
                    .notice(Notice::warning(format!("Stored history not cleared: {err}")));
                Err(err.into())
            }
        }
    }

    /// Switch to a model from the loaded list. Unknown ids are ignored.
    pub fn change_model(&mut self, id: &str) -> bool {
        if !self.models.iter().any(|model| model.id == id) {
            debug!(model = id, "ignoring unknown model");
            return false;
        }
        self.active_model = Some(id.to_string());
        info!(model = id, "active model changed");
        self.observers.emit(SessionEvent::ModelsLoaded {
            models: &self.models,
            active: self.active_model.as_deref(),
        });
        true
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "session state");
        }
        self.state = state;
        self.observers.emit(SessionEvent::StateChanged(state));
    }
}
