//! Live conversations keyed by id.
//!
//! Each conversation owns its session behind its own mutex, so turns on one
//! conversation are serialized while different conversations run in
//! parallel. Conversations idle longer than the TTL are dropped, lazily on
//! lookup and `open`, and by [`ConversationRegistry::evict_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::controller::{IntakeController, IntakeError, TurnOutcome};
use crate::domain::catalog::Location;
use crate::domain::foundation::{ConversationId, SessionId, SubmissionId, Timestamp};
use crate::domain::intake::{IntakeSession, MediaSlot, Step, Utterance};

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("too many live conversations (limit {0})")]
    AtCapacity(usize),

    #[error(transparent)]
    Intake(#[from] IntakeError),
}

/// What a caller sees after a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub conversation_id: ConversationId,
    pub step: Step,
    pub messages: Vec<String>,
    pub submission_id: Option<SubmissionId>,
}

/// Read-only snapshot of a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationView {
    pub conversation_id: ConversationId,
    pub session_id: SessionId,
    pub started_at: Timestamp,
    pub step: Step,
    pub attempts: u32,
    pub reporter: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub media: Vec<MediaSlot>,
}

impl ConversationView {
    fn of(conversation_id: ConversationId, session: &IntakeSession) -> Self {
        Self {
            conversation_id,
            session_id: session.id(),
            started_at: session.started_at(),
            step: session.step(),
            attempts: session.attempts(),
            reporter: session.reporter().map(|r| r.name().to_string()),
            area: session.selected_area().map(|a| a.name.clone()),
            description: session.description().map(str::to_string),
            location: session.location().cloned(),
            media: session.media_slots().to_vec(),
        }
    }
}

struct Entry {
    session: IntakeSession,
    last_active: Instant,
}

impl Entry {
    fn new(session: IntakeSession) -> Self {
        Self {
            session,
            last_active: Instant::now(),
        }
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.last_active.elapsed() >= ttl
    }
}

type SharedEntry = Arc<Mutex<Entry>>;

pub struct ConversationRegistry {
    controller: Arc<IntakeController>,
    conversations: RwLock<HashMap<ConversationId, SharedEntry>>,
    idle_ttl: Duration,
    capacity: usize,
}

impl ConversationRegistry {
    pub fn new(controller: Arc<IntakeController>) -> Self {
        Self {
            controller,
            conversations: RwLock::new(HashMap::new()),
            idle_ttl: DEFAULT_IDLE_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub fn controller(&self) -> &Arc<IntakeController> {
        &self.controller
    }

    pub async fn open(&self) -> Result<ConversationTurn, RegistryError> {
        self.evict_idle().await;
        if self.len().await >= self.capacity {
            tracing::warn!(capacity = self.capacity, "conversation registry full");
            return Err(RegistryError::AtCapacity(self.capacity));
        }

        let conversation_id = ConversationId::new();
        let TurnOutcome {
            session,
            messages,
            submission_id,
        } = self.controller.start_session().await;
        let step = session.step();

        {
            let mut conversations = self.conversations.write().await;
            // Concurrent opens may have filled the last slots.
            if conversations.len() >= self.capacity {
                return Err(RegistryError::AtCapacity(self.capacity));
            }
            conversations.insert(conversation_id, Arc::new(Mutex::new(Entry::new(session))));
        }
        tracing::debug!(%conversation_id, "conversation opened");

        Ok(ConversationTurn {
            conversation_id,
            step,
            messages,
            submission_id,
        })
    }

    pub async fn send(
        &self,
        conversation_id: ConversationId,
        utterance: impl Into<Utterance>,
    ) -> Result<ConversationTurn, RegistryError> {
        let mut entry = self.checkout(conversation_id).await?;
        entry.last_active = Instant::now();

        let TurnOutcome {
            session: next,
            messages,
            submission_id,
        } = self
            .controller
            .handle_utterance(entry.session.clone(), utterance)
            .await?;
        let step = next.step();
        entry.session = next;

        Ok(ConversationTurn {
            conversation_id,
            step,
            messages,
            submission_id,
        })
    }

    pub async fn view(
        &self,
        conversation_id: ConversationId,
    ) -> Result<ConversationView, RegistryError> {
        let entry = self.checkout(conversation_id).await?;
        Ok(ConversationView::of(conversation_id, &entry.session))
    }

    /// Removes the conversation, waiting for any turn in flight.
    pub async fn close(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<String>, RegistryError> {
        let handle = self
            .conversations
            .write()
            .await
            .remove(&conversation_id)
            .ok_or(RegistryError::NotFound(conversation_id))?;
        let session = handle.lock().await.session.clone();
        let outcome = self.controller.close_session(session).await;
        tracing::debug!(%conversation_id, "conversation closed");
        Ok(outcome.messages)
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }

    /// Drops every conversation idle past the TTL and returns how many went.
    /// A conversation with a turn in flight is never idle.
    pub async fn evict_idle(&self) -> usize {
        let ttl = self.idle_ttl;
        let mut conversations = self.conversations.write().await;
        let before = conversations.len();
        conversations.retain(|_, entry| match entry.try_lock() {
            Ok(entry) => !entry.is_idle(ttl),
            Err(_) => true,
        });
        let evicted = before - conversations.len();
        if evicted > 0 {
            tracing::info!(evicted, live = conversations.len(), "idle conversations evicted");
        }
        evicted
    }

    /// Locks a live conversation. An idle one is dropped and reported missing.
    async fn checkout(
        &self,
        conversation_id: ConversationId,
    ) -> Result<OwnedMutexGuard<Entry>, RegistryError> {
        let handle = self
            .conversations
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or(RegistryError::NotFound(conversation_id))?;
        let entry = handle.lock_owned().await;
        if entry.is_idle(self.idle_ttl) {
            drop(entry);
            self.conversations.write().await.remove(&conversation_id);
            tracing::debug!(%conversation_id, "idle conversation expired");
            return Err(RegistryError::NotFound(conversation_id));
        }
        Ok(entry)
    }
}
