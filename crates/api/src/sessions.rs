//! In-flight upload session registry.
//!
//! One slot per upload attempt, keyed by session id. A slot starts out
//! holding the session itself (awaiting screenshot selection); once
//! publish begins the session is consumed by the background publish task
//! and the slot keeps only the status channel and the cancellation
//! token. Terminal status stays readable until the slot is discarded.

use std::collections::HashMap;
use std::sync::Mutex;

use clipvault_core::error::CoreError;
use clipvault_pipeline::session::{SessionStatus, UploadSession};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

enum SessionSlot {
    /// Candidates captured, waiting for selection and publish.
    Awaiting(UploadSession),
    /// Publish running (or finished) in a background task.
    Publishing {
        status: watch::Receiver<SessionStatus>,
        cancel: CancellationToken,
    },
}

/// Registry of in-flight upload sessions.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<Uuid, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::Core(CoreError::NotFound {
            entity: "UploadSession",
            id,
        })
    }

    /// Store a freshly started session, returning its id.
    pub fn insert(&self, session: UploadSession) -> Uuid {
        let id = session.id();
        self.inner
            .lock()
            .unwrap()
            .insert(id, SessionSlot::Awaiting(session));
        id
    }

    /// Bytes of one screenshot candidate.
    pub fn candidate_png(&self, id: Uuid, index: usize) -> AppResult<Vec<u8>> {
        let map = self.inner.lock().unwrap();
        match map.get(&id) {
            Some(SessionSlot::Awaiting(session)) => session
                .screenshot(index)
                .map(|shot| shot.data.clone())
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Screenshot",
                    id,
                })),
            Some(SessionSlot::Publishing { .. }) => Err(AppError::Core(CoreError::Conflict(
                "Session is already publishing".to_string(),
            ))),
            None => Err(Self::not_found(id)),
        }
    }

    /// Choose a screenshot candidate on an awaiting session.
    pub fn select(&self, id: Uuid, index: usize) -> AppResult<usize> {
        let mut map = self.inner.lock().unwrap();
        match map.get_mut(&id) {
            Some(SessionSlot::Awaiting(session)) => {
                session.select_screenshot(index)?;
                Ok(index)
            }
            Some(SessionSlot::Publishing { .. }) => Err(AppError::Core(CoreError::Conflict(
                "Session is already publishing".to_string(),
            ))),
            None => Err(Self::not_found(id)),
        }
    }

    /// Take the session out for publishing, leaving a slot that tracks
    /// its status channel and cancellation token.
    pub fn begin_publish(&self, id: Uuid) -> AppResult<UploadSession> {
        let mut map = self.inner.lock().unwrap();
        match map.remove(&id) {
            Some(SessionSlot::Awaiting(session)) => {
                map.insert(
                    id,
                    SessionSlot::Publishing {
                        status: session.status_watch(),
                        cancel: session.cancel_token(),
                    },
                );
                Ok(session)
            }
            Some(slot @ SessionSlot::Publishing { .. }) => {
                map.insert(id, slot);
                Err(AppError::Core(CoreError::Conflict(
                    "Session is already publishing".to_string(),
                )))
            }
            None => Err(Self::not_found(id)),
        }
    }

    /// Current state/progress snapshot for a session.
    pub fn status(&self, id: Uuid) -> AppResult<SessionStatus> {
        let map = self.inner.lock().unwrap();
        match map.get(&id) {
            Some(SessionSlot::Awaiting(session)) => Ok(session.status_watch().borrow().clone()),
            Some(SessionSlot::Publishing { status, .. }) => Ok(status.borrow().clone()),
            None => Err(Self::not_found(id)),
        }
    }

    /// Drop a session. Cancelling the token tears down any in-flight
    /// blob uploads.
    pub fn discard(&self, id: Uuid) -> AppResult<()> {
        let slot = self
            .inner
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or_else(|| Self::not_found(id))?;
        if let SessionSlot::Publishing { cancel, .. } = slot {
            cancel.cancel();
        }
        Ok(())
    }
}
