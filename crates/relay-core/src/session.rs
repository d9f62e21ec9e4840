//! Conversation session controller.
//!
//! Owns the draft, the transcript and the awaiting-reply flag. A submission
//! appends the user's message right away, then runs the request on a
//! background task whose single result comes back over a oneshot channel.
//! While that request is unresolved every further submission is rejected.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::config::Config;
use crate::endpoint::{EndpointClient, ReplySource};
use crate::error::RequestError;
use crate::state::{Message, Transcript};

type Outcome = Result<String, RequestError>;

/// Session state, read by the renderer and mutated only by the controller.
#[derive(Debug, Clone, Default)]
pub struct Session {
    draft: String,
    transcript: Transcript,
    awaiting_reply: bool,
}

impl Session {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }
}

pub struct SessionController {
    session: Session,
    source: Arc<dyn ReplySource>,
    failure_message: String,
    pending: Option<oneshot::Receiver<Outcome>>,
}

impl SessionController {
    pub fn new(source: Arc<dyn ReplySource>, failure_message: impl Into<String>) -> Self {
        Self {
            session: Session::default(),
            source,
            failure_message: failure_message.into(),
            pending: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(EndpointClient::from_config(config)),
            config.failure_message(),
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The draft stays editable while a reply is pending.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.session.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.session.draft = text.into();
    }

    /// Submit the current draft.
    ///
    /// Does nothing and returns `false` when the trimmed draft is empty or a
    /// reply is still pending. Otherwise the user message is in the transcript
    /// and the draft is cleared by the time this returns. Must be called from
    /// within a tokio runtime.
    pub fn submit(&mut self) -> bool {
        if self.session.awaiting_reply {
            tracing::warn!("submit rejected: a reply is still pending");
            return false;
        }
        if self.session.draft.trim().is_empty() {
            return false;
        }

        let text = self.session.draft.clone();
        self.session.transcript.push(Message::user(text.clone()));
        self.session.draft.clear();
        self.session.awaiting_reply = true;

        tracing::info!(chars = text.chars().count(), "submitting message");

        let (tx, rx) = oneshot::channel();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let outcome = source.fetch(&text).await;
            // The receiver is gone only if the session was dropped
            let _ = tx.send(outcome);
        });
        self.pending = Some(rx);

        true
    }

    /// Apply the reply if it has arrived. Returns whether the transcript changed.
    pub fn poll_reply(&mut self) -> bool {
        let outcome = match self.pending.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Closed) => Err(RequestError::Dropped),
            },
        };
        self.finish(outcome);
        true
    }

    /// Wait for the pending reply and apply it. Returns `false` immediately if
    /// nothing is pending.
    ///
    /// Cancel safe: if the future is dropped early the reply stays pending.
    pub async fn wait_reply(&mut self) -> bool {
        let outcome = match self.pending.as_mut() {
            None => return false,
            Some(rx) => rx.await.unwrap_or(Err(RequestError::Dropped)),
        };
        self.finish(outcome);
        true
    }

    fn finish(&mut self, outcome: Outcome) {
        self.pending = None;

        let reply = match outcome {
            Ok(text) => Message::bot(text),
            Err(e) => {
                tracing::warn!(error = %e, "request failed, showing fallback");
                Message::bot(self.failure_message.clone())
            }
        };
        self.session.transcript.push(reply);
        self.session.awaiting_reply = false;
    }
}
