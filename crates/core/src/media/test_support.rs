//! In-memory fakes for the pipeline's network seams.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;

use super::broker::{BrokerBody, BrokerEndpoint, BrokerReply, UploadTargetRequest};
use super::delete::DeleteEndpoint;
use super::error::MediaError;
use super::session::{Session, SessionProvider};
use super::transfer::ObjectTransport;

pub fn session(token: &str, expires_in: i64) -> Session {
    Session {
        access_token: token.to_string(),
        refresh_token: format!("refresh-{token}"),
        expires_at: Utc::now().timestamp() + expires_in,
    }
}

pub fn ok_reply(upload_url: &str, public_url: &str) -> BrokerReply {
    BrokerReply {
        status: 200,
        body: BrokerBody {
            upload_url: Some(upload_url.to_string()),
            public_url: Some(public_url.to_string()),
            error: None,
        },
    }
}

pub fn error_reply(status: u16, error: Option<&str>) -> BrokerReply {
    BrokerReply {
        status,
        body: BrokerBody {
            error: error.map(str::to_string),
            ..BrokerBody::default()
        },
    }
}

/// Session store whose refresh succeeds only when a next session is scripted.
pub struct FakeSessions {
    current: Mutex<Option<Session>>,
    next: Mutex<Option<Session>>,
    refreshes: AtomicUsize,
}

impl FakeSessions {
    pub fn signed_in(session: Session) -> Self {
        Self {
            current: Mutex::new(Some(session)),
            next: Mutex::new(None),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            current: Mutex::new(None),
            next: Mutex::new(None),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn refreshing_to(self, session: Session) -> Self {
        *self.next.lock().unwrap() = Some(session);
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl SessionProvider for FakeSessions {
    async fn get_session(&self) -> Result<Option<Session>, MediaError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn refresh_session(&self) -> Result<Option<Session>, MediaError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let next = self.next.lock().unwrap().take();
        match next {
            Some(session) => {
                *self.current.lock().unwrap() = Some(session.clone());
                Ok(Some(session))
            }
            None => Err(MediaError::session("refresh token revoked")),
        }
    }
}

/// Broker answering from a script, recording every request and token.
pub struct FakeBroker {
    replies: Mutex<VecDeque<BrokerReply>>,
    calls: Mutex<Vec<(UploadTargetRequest, String)>>,
    delay: Option<Duration>,
}

impl FakeBroker {
    pub fn new(replies: Vec<BrokerReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn requests(&self) -> Vec<UploadTargetRequest> {
        self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }
}

impl BrokerEndpoint for FakeBroker {
    async fn request_upload_url(
        &self,
        request: &UploadTargetRequest,
        token: &str,
    ) -> Result<BrokerReply, MediaError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), token.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();
        reply.ok_or_else(|| MediaError::transport("no scripted broker reply"))
    }
}

#[derive(Debug, Clone)]
pub struct PutCall {
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// Object store answering scripted statuses (200 once the script runs out).
pub struct FakeTransport {
    statuses: Mutex<VecDeque<u16>>,
    calls: Mutex<Vec<PutCall>>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new(statuses: Vec<u16>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<PutCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ObjectTransport for FakeTransport {
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<u16, MediaError> {
        self.calls.lock().unwrap().push(PutCall {
            url: url.to_string(),
            content_type: content_type.to_string(),
            size: body.len(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let status = self.statuses.lock().unwrap().pop_front();
        Ok(status.unwrap_or(200))
    }
}

/// Delete endpoint that either accepts everything or rejects with a status.
pub struct FakeDeleteEndpoint {
    rejection: Option<(u16, String)>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeDeleteEndpoint {
    pub fn accepting() -> Self {
        Self {
            rejection: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            rejection: Some((status, message.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeleteEndpoint for FakeDeleteEndpoint {
    async fn delete_object(&self, key: &str, token: &str) -> Result<(), MediaError> {
        self.calls
            .lock()
            .unwrap()
            .push((key.to_string(), token.to_string()));
        match &self.rejection {
            Some((status, message)) => Err(MediaError::delete(*status, message.clone())),
            None => Ok(()),
        }
    }
}
