//! Room actor: the single owner of one room's membership and history.
//!
//! All mutation happens inside [`RoomActor::run`], one inbox event at a time.
//! Broadcasts never wait on a member: each delivery is a `try_send`, and a
//! member whose outbox is full (or closed) is evicted on the spot.

use std::{collections::HashMap, sync::Arc};

use hanare_shared::time::Clock;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RoomConfig,
    domain::{
        ChatMessage, History, MemberProfile, MessageCodec, RoomId, RoomLink, SessionId, Timestamp,
    },
};

use super::{RoomEvent, RoomHandle, RoomSnapshot, SessionEntry};

/// Actor-side state of one session
struct Member {
    profile: MemberProfile,
    outbox: mpsc::Sender<ChatMessage>,
    cancel: CancellationToken,
    typing: bool,
}

pub struct RoomActor {
    id: RoomId,
    created_at: Timestamp,
    expires_at: Timestamp,
    members: HashMap<SessionId, Member>,
    history: History,
    inbox: mpsc::Receiver<RoomEvent>,
    cancel: CancellationToken,
    codec: Arc<dyn MessageCodec>,
    clock: Arc<dyn Clock>,
    config: RoomConfig,
}

impl RoomActor {
    /// Start a room actor task and return the handle to reach it.
    ///
    /// The room scope is a child of `parent`, so cancelling `parent` stops
    /// the room and every session in it. A panic inside the actor is
    /// confined to its own task; the room scope is cancelled afterwards.
    pub fn spawn(
        link: RoomLink,
        config: RoomConfig,
        codec: Arc<dyn MessageCodec>,
        clock: Arc<dyn Clock>,
        parent: &CancellationToken,
    ) -> RoomHandle {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        let cancel = parent.child_token();
        let created_at = Timestamp::new(clock.now_millis());
        let expires_at = created_at.plus(config.lifetime);

        let actor = Self {
            id: link.room_id().clone(),
            created_at,
            expires_at,
            members: HashMap::new(),
            history: History::new(),
            inbox: inbox_rx,
            cancel: cancel.clone(),
            codec,
            clock,
            config,
        };

        let task = tokio::spawn(actor.run());
        tokio::spawn(supervise(link.room_id().clone(), task, cancel.clone()));

        RoomHandle::new(link, created_at, expires_at, inbox_tx, cancel)
    }

    async fn run(mut self) {
        let period = self.config.history_sweep_interval;
        let mut sweep = interval_at(Instant::now() + period, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = self.cancel.clone();

        tracing::info!(room = %self.id, "room actor started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = self.inbox.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
                _ = sweep.tick() => self.sweep_history(),
            }
        }

        tracing::info!(
            room = %self.id,
            members = self.members.len(),
            "room actor stopped"
        );
        // Dropping the members closes every outbox.
    }

    fn handle(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Join(entry) => self.join(entry),
            RoomEvent::Leave(session_id) => {
                if !self.evict(session_id) {
                    tracing::debug!(
                        room = %self.id,
                        session = %session_id,
                        "leave for absent session ignored"
                    );
                }
            }
            RoomEvent::Post { from, text } => self.post(from, &text),
            RoomEvent::Typing { from, typing } => self.typing(from, typing),
            RoomEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn join(&mut self, entry: SessionEntry) {
        let SessionEntry {
            id,
            profile,
            outbox,
            cancel,
        } = entry;

        tracing::info!(
            room = %self.id,
            session = %id,
            nickname = %profile.nickname,
            "session joined"
        );
        self.members.insert(
            id,
            Member {
                profile,
                outbox,
                cancel,
                typing: false,
            },
        );
        self.broadcast_user_count();
    }

    fn post(&mut self, from: SessionId, text: &str) {
        let Some(member) = self.members.get(&from) else {
            tracing::warn!(
                room = %self.id,
                session = %from,
                "dropping message from a session that is not a member"
            );
            return;
        };

        let token = match self.codec.obscure(text) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    room = %self.id,
                    session = %from,
                    error = %e,
                    "failed to obscure message, dropping it"
                );
                return;
            }
        };

        let message = ChatMessage::chat(member.profile.clone(), token, self.now());
        self.history.push(message.clone());
        self.broadcast(&message, None);
    }

    fn typing(&mut self, from: SessionId, typing: bool) {
        let now = self.now();
        let Some(member) = self.members.get_mut(&from) else {
            return;
        };
        member.typing = typing;

        let message = ChatMessage::typing(member.profile.clone(), typing, now);
        self.broadcast(&message, Some(from));
    }

    /// Try to enqueue `message` on every member's outbox except `except`.
    ///
    /// Members whose outbox is full or closed are evicted afterwards.
    fn broadcast(&mut self, message: &ChatMessage, except: Option<SessionId>) {
        let stalled: Vec<SessionId> = self
            .members
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter_map(|(id, member)| match member.outbox.try_send(message.clone()) {
                Ok(()) => None,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        room = %self.id,
                        session = %id,
                        "outbox full, evicting slow consumer"
                    );
                    Some(*id)
                }
                Err(TrySendError::Closed(_)) => Some(*id),
            })
            .collect();

        for id in stalled {
            self.evict(id);
        }
    }

    fn broadcast_user_count(&mut self) {
        let message = ChatMessage::user_count(self.members.len(), self.now());
        self.broadcast(&message, None);
    }

    /// Remove a member: cancel its scope, close its outbox, tell the others.
    ///
    /// Returns `false` when the session was not a member (no broadcast).
    fn evict(&mut self, session_id: SessionId) -> bool {
        let Some(member) = self.members.remove(&session_id) else {
            return false;
        };
        let Member {
            profile,
            outbox,
            cancel,
            typing,
        } = member;
        cancel.cancel();
        drop(outbox);

        tracing::info!(
            room = %self.id,
            session = %session_id,
            members = self.members.len(),
            "session left"
        );

        self.broadcast_user_count();
        if typing {
            let message = ChatMessage::typing(profile, false, self.now());
            self.broadcast(&message, Some(session_id));
        }
        true
    }

    fn sweep_history(&mut self) {
        let removed = self
            .history
            .retain_recent(self.now(), self.config.history_retention);
        if removed > 0 {
            tracing::debug!(
                room = %self.id,
                removed,
                remaining = self.history.len(),
                "expired messages removed from history"
            );
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        let mut members: Vec<MemberProfile> =
            self.members.values().map(|m| m.profile.clone()).collect();
        members.sort_by(|a, b| a.nickname.as_str().cmp(b.nickname.as_str()));

        RoomSnapshot {
            id: self.id.clone(),
            members,
            history: self.history.messages().to_vec(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

/// Wait for the actor task and cancel the room scope once it is gone
async fn supervise(id: RoomId, task: JoinHandle<()>, cancel: CancellationToken) {
    if let Err(e) = task.await {
        if e.is_panic() {
            tracing::error!(room = %id, "room actor panicked: {}", e);
        } else {
            tracing::warn!(room = %id, "room actor task aborted: {}", e);
        }
    }
    cancel.cancel();
}
