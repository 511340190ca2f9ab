//! Connection pump: the inbound / outbound loop pair of one WebSocket session.
//!
//! Both loops share the session's cancellation scope. Whichever loop stops
//! first cancels the scope, which stops the other one. The inbound loop is
//! the one that reports `Leave` to the room.
//!
//! The loops are generic over `Stream` / `Sink` of [`Message`] so they can be
//! driven without a real socket.

use std::{fmt::Display, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket},
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior, interval_at, timeout},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::PumpConfig,
    domain::{ChatMessage, SessionId},
    infrastructure::dto::websocket::{ClientMessage, ClientMessageType, ServerMessage},
    room::{RoomError, RoomHandle},
    usecase::TranscodeMessageUseCase,
};

#[derive(Debug, Error)]
pub enum PumpError {
    #[error("write timed out after {0:?}")]
    WriteTimeout(Duration),
    #[error("write failed: {0}")]
    Write(String),
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What the inbound loop needs to act on behalf of a session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub room: RoomHandle,
    pub cancel: CancellationToken,
}

/// Run both loops for a joined session until the connection is done.
pub async fn run(
    socket: WebSocket,
    session: Session,
    outbox: mpsc::Receiver<ChatMessage>,
    transcoder: Arc<TranscodeMessageUseCase>,
    config: PumpConfig,
) {
    let (writer, reader) = socket.split();
    let cancel = session.cancel.clone();
    let session_id = session.id;

    let inbound = tokio::spawn(inbound_loop(reader, session, transcoder, config.clone()));
    let outbound = tokio::spawn(outbound_loop(writer, outbox, cancel.clone(), config));

    let (inbound, outbound) = tokio::join!(inbound, outbound);
    for result in [inbound, outbound] {
        if let Err(e) = result {
            tracing::error!(session = %session_id, "Pump task failed: {}", e);
        }
    }
    cancel.cancel();

    tracing::debug!(session = %session_id, "Connection pump finished");
}

/// Read frames, decode them and forward them to the room.
///
/// Ends on close, read error, oversized frame, read deadline or
/// cancellation, then sends `Leave` for the session.
pub async fn inbound_loop<R, E>(
    mut reader: R,
    session: Session,
    transcoder: Arc<TranscodeMessageUseCase>,
    config: PumpConfig,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = tokio::select! {
            _ = session.cancel.cancelled() => break,
            frame = timeout(config.pong_wait, reader.next()) => frame,
        };

        let message = match frame {
            Err(_) => {
                tracing::warn!(
                    session = %session.id,
                    "No frame within {:?}, closing connection",
                    config.pong_wait
                );
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                tracing::debug!(session = %session.id, "WebSocket read error: {}", e);
                break;
            }
            Ok(Some(Ok(message))) => message,
        };

        match message {
            Message::Text(text) => {
                if text.as_str().len() > config.max_frame_bytes {
                    tracing::warn!(
                        session = %session.id,
                        "Frame of {} bytes exceeds limit of {} bytes",
                        text.as_str().len(),
                        config.max_frame_bytes
                    );
                    break;
                }
                if handle_text(&session, &transcoder, text.as_str())
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!(session = %session.id, "Ignoring binary frame");
            }
            // Pings are answered by the transport; any frame resets the deadline
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => {
                tracing::debug!(session = %session.id, "Client requested close");
                break;
            }
        }
    }

    session.cancel.cancel();
    if session.room.leave(session.id).await.is_err() {
        tracing::debug!(session = %session.id, "Room already closed on leave");
    }
}

/// Forward one inbound text frame. Only a closed room is an error.
async fn handle_text(
    session: &Session,
    transcoder: &TranscodeMessageUseCase,
    text: &str,
) -> Result<(), RoomError> {
    let frame: ClientMessage = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(session = %session.id, "Failed to parse frame as JSON: {}", e);
            return Ok(());
        }
    };

    match frame.r#type {
        ClientMessageType::Typing => session.room.typing(session.id, frame.typing).await,
        ClientMessageType::Chat => match transcoder.decode(&frame.message) {
            Ok(plaintext) => session.room.post(session.id, plaintext).await,
            Err(e) => {
                tracing::warn!(session = %session.id, "Dropping undecodable message: {}", e);
                Ok(())
            }
        },
    }
}

/// Drain the outbox to the socket and keep the connection alive with pings.
///
/// Messages waiting in the outbox are batched into one text frame, one JSON
/// object per line. A due ping goes out ahead of pending messages, so
/// keepalive keeps its period however busy the room is. Ends on write
/// failure, outbox closure or cancellation; the last two send a close frame
/// first.
pub async fn outbound_loop<W>(
    mut writer: W,
    mut outbox: mpsc::Receiver<ChatMessage>,
    cancel: CancellationToken,
    config: PumpConfig,
) where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let mut keepalive = interval_at(Instant::now() + config.ping_period, config.ping_period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            biased;

            _ = keepalive.tick() => {
                if let Err(e) = write(&mut writer, Message::Ping(Bytes::new()), config.write_wait).await {
                    break Err(e);
                }
            }
            _ = cancel.cancelled() => break Ok(()),
            message = outbox.recv() => match message {
                Some(first) => {
                    let frame = match encode_batch(first, &mut outbox) {
                        Ok(frame) => frame,
                        Err(e) => break Err(e),
                    };
                    if let Err(e) = write(&mut writer, Message::Text(frame.into()), config.write_wait).await {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            },
        }
    };

    match result {
        Ok(()) => {
            let _ = write(&mut writer, Message::Close(None), config.write_wait).await;
        }
        Err(e) => tracing::debug!("Outbound loop stopped: {}", e),
    }
    cancel.cancel();
}

fn encode_batch(
    first: ChatMessage,
    outbox: &mut mpsc::Receiver<ChatMessage>,
) -> Result<String, PumpError> {
    let mut frame = String::new();
    push_line(&mut frame, &first)?;
    while let Ok(next) = outbox.try_recv() {
        push_line(&mut frame, &next)?;
    }
    Ok(frame)
}

fn push_line(frame: &mut String, message: &ChatMessage) -> Result<(), PumpError> {
    frame.push_str(&serde_json::to_string(&ServerMessage::from(message))?);
    frame.push('\n');
    Ok(())
}

async fn write<W>(writer: &mut W, message: Message, write_wait: Duration) -> Result<(), PumpError>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    match timeout(write_wait, writer.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(PumpError::Write(e.to_string())),
        Err(_) => Err(PumpError::WriteTimeout(write_wait)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RoomConfig,
        domain::{MemberProfile, MessageCodec, MessageKind, RoomIdFactory, Timestamp},
        infrastructure::codec::XorCodec,
        room::{RoomActor, SessionEntry},
    };
    use futures_util::stream;
    use hanare_shared::time::SystemClock;
    use std::{convert::Infallible, pin::Pin};
    use tokio_util::sync::PollSender;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - inbound: chat / typing フレームの転送、不正フレームのスキップ、
    //   サイズ超過・read deadline での終了と Leave
    // - outbound: 改行区切りのバッチ送信、keepalive ping、
    //   outbox が混んでいても送られる ping、
    //   終了時の close フレーム、書き込み失敗での終了
    // ========================================

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    type TestSink = Pin<Box<dyn Sink<Message, Error = String> + Send>>;

    fn test_sink(capacity: usize) -> (TestSink, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        let sink = PollSender::new(tx).sink_map_err(|_| "closed".to_string());
        (Box::pin(sink), rx)
    }

    fn frames(texts: Vec<String>) -> impl Stream<Item = Result<Message, Infallible>> + Unpin {
        stream::iter(
            texts
                .into_iter()
                .map(|text| Ok(Message::Text(text.into())))
                .collect::<Vec<_>>(),
        )
    }

    fn chat_frame(text: &str) -> String {
        let token = XorCodec::new().obscure(text).unwrap();
        serde_json::json!({"type": "chat", "message": token}).to_string()
    }

    fn transcoder() -> Arc<TranscodeMessageUseCase> {
        Arc::new(TranscodeMessageUseCase::new(Arc::new(XorCodec::new())))
    }

    /// A room with one session driven by the pump and one observer
    struct Fixture {
        session: Session,
        observer: mpsc::Receiver<ChatMessage>,
        _session_outbox: mpsc::Receiver<ChatMessage>,
    }

    async fn fixture() -> Fixture {
        let room = RoomActor::spawn(
            RoomIdFactory::generate(),
            RoomConfig::default(),
            Arc::new(XorCodec::new()),
            Arc::new(SystemClock),
            &CancellationToken::new(),
        );

        let (observer_tx, mut observer) = mpsc::channel(64);
        room.join(SessionEntry {
            id: SessionId::generate(),
            profile: MemberProfile::generate(),
            outbox: observer_tx,
            cancel: room.session_scope(),
        })
        .await
        .unwrap();

        let (session_tx, session_outbox) = mpsc::channel(64);
        let session = Session {
            id: SessionId::generate(),
            cancel: room.session_scope(),
            room: room.clone(),
        };
        room.join(SessionEntry {
            id: session.id,
            profile: MemberProfile::generate(),
            outbox: session_tx,
            cancel: session.cancel.clone(),
        })
        .await
        .unwrap();

        room.snapshot().await.unwrap();
        while observer.try_recv().is_ok() {}

        Fixture {
            session,
            observer,
            _session_outbox: session_outbox,
        }
    }

    async fn next(rx: &mut mpsc::Receiver<ChatMessage>) -> ChatMessage {
        tokio::time::timeout(RECV_TIMEOUT, rx.recv())
            .await
            .expect("timed out")
            .expect("outbox closed")
    }

    fn test_config() -> PumpConfig {
        PumpConfig {
            write_wait: Duration::from_millis(500),
            ..PumpConfig::with_pong_wait(Duration::from_secs(5))
        }
    }

    #[tokio::test]
    async fn test_inbound_chat_is_posted_then_leave_on_close() {
        // テスト項目: chat フレームは reveal されてルームに投稿され、ストリーム終了で Leave される
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        inbound_loop(
            frames(vec![chat_frame("hello")]),
            f.session.clone(),
            transcoder(),
            test_config(),
        )
        .await;

        // then (期待する結果):
        let chat = next(&mut f.observer).await;
        assert_eq!(chat.kind, MessageKind::Chat);
        let token = chat.payload.unwrap();
        assert_eq!(XorCodec::new().reveal(&token).unwrap(), "hello");

        let count = next(&mut f.observer).await;
        assert_eq!(count.kind, MessageKind::UserCount);
        assert_eq!(count.payload.as_deref(), Some("1"));
        assert!(f.session.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_inbound_skips_invalid_frames() {
        // テスト項目: 不正な JSON / 復号できない token は破棄され、接続は続く
        // given (前提条件):
        let mut f = fixture().await;
        let bad_token = serde_json::json!({"type": "chat", "message": "%%%"}).to_string();

        // when (操作):
        inbound_loop(
            frames(vec!["not json".to_string(), bad_token, chat_frame("ok")]),
            f.session.clone(),
            transcoder(),
            test_config(),
        )
        .await;

        // then (期待する結果): 最後の chat のみ届く
        let chat = next(&mut f.observer).await;
        assert_eq!(chat.kind, MessageKind::Chat);
        let snapshot = f.session.room.snapshot().await.unwrap();
        assert_eq!(snapshot.history.len(), 1);
    }

    #[tokio::test]
    async fn test_inbound_typing_is_forwarded() {
        // テスト項目: typing フレームは history に残らず他のメンバーに届く
        // given (前提条件):
        let mut f = fixture().await;
        let typing = serde_json::json!({"type": "typing", "typing": true}).to_string();

        // when (操作):
        inbound_loop(
            frames(vec![typing]),
            f.session.clone(),
            transcoder(),
            test_config(),
        )
        .await;

        // then (期待する結果): typing=true、退出時に user_count と typing=false
        let started = next(&mut f.observer).await;
        assert_eq!(started.kind, MessageKind::Typing);
        assert!(started.typing);
        assert_eq!(next(&mut f.observer).await.kind, MessageKind::UserCount);
        let stopped = next(&mut f.observer).await;
        assert_eq!(stopped.kind, MessageKind::Typing);
        assert!(!stopped.typing);
        assert!(f.session.room.snapshot().await.unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_inbound_oversized_frame_terminates() {
        // テスト項目: 上限を超えるフレームで inbound loop が終了し、後続のフレームは処理されない
        // given (前提条件):
        let mut f = fixture().await;
        let oversized = "x".repeat(test_config().max_frame_bytes + 1);

        // when (操作):
        inbound_loop(
            frames(vec![oversized, chat_frame("never")]),
            f.session.clone(),
            transcoder(),
            test_config(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(next(&mut f.observer).await.kind, MessageKind::UserCount);
        assert!(f.session.room.snapshot().await.unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_inbound_read_deadline() {
        // テスト項目: read deadline までにフレームが来なければ終了する
        // given (前提条件):
        let mut f = fixture().await;
        let config = PumpConfig::with_pong_wait(Duration::from_millis(50));

        // when (操作):
        tokio::time::timeout(
            RECV_TIMEOUT,
            inbound_loop(
                stream::pending::<Result<Message, Infallible>>(),
                f.session.clone(),
                transcoder(),
                config,
            ),
        )
        .await
        .expect("inbound loop should stop at the read deadline");

        // then (期待する結果):
        assert_eq!(next(&mut f.observer).await.kind, MessageKind::UserCount);
    }

    #[tokio::test]
    async fn test_inbound_stops_on_cancel() {
        // テスト項目: セッションのキャンセルで inbound loop が終了する
        let f = fixture().await;
        f.session.cancel.cancel();
        tokio::time::timeout(
            RECV_TIMEOUT,
            inbound_loop(
                stream::pending::<Result<Message, Infallible>>(),
                f.session.clone(),
                transcoder(),
                test_config(),
            ),
        )
        .await
        .expect("inbound loop should stop on cancel");
    }

    #[tokio::test]
    async fn test_outbound_batches_pending_messages() {
        // テスト項目: 溜まっているメッセージは 1 フレームに改行区切りでまとめて送られる
        // given (前提条件):
        let (sink, mut written) = test_sink(16);
        let (tx, rx) = mpsc::channel(16);
        tx.send(ChatMessage::user_count(1, Timestamp::new(0)))
            .await
            .unwrap();
        tx.send(ChatMessage::typing(
            MemberProfile::generate(),
            true,
            Timestamp::new(0),
        ))
        .await
        .unwrap();
        drop(tx);
        let cancel = CancellationToken::new();

        // when (操作):
        outbound_loop(sink, rx, cancel.clone(), test_config()).await;

        // then (期待する結果):
        let Some(Message::Text(text)) = written.recv().await else {
            panic!("expected a text frame");
        };
        let lines: Vec<serde_json::Value> = text
            .as_str()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert!(text.as_str().ends_with('\n'));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "user_count");
        assert_eq!(lines[1]["type"], "typing");

        // outbox が閉じると close フレームを送って終了する
        assert!(matches!(written.recv().await, Some(Message::Close(_))));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_outbound_sends_keepalive_and_closes_on_cancel() {
        // テスト項目: ping_period ごとに ping を送り、キャンセルで close を送る
        // given (前提条件):
        let (sink, mut written) = test_sink(16);
        let (_tx, rx) = mpsc::channel::<ChatMessage>(16);
        let cancel = CancellationToken::new();
        let config = PumpConfig {
            ping_period: Duration::from_millis(20),
            ..test_config()
        };
        let task = tokio::spawn(outbound_loop(sink, rx, cancel.clone(), config));

        // when (操作):
        let ping = tokio::time::timeout(RECV_TIMEOUT, written.recv()).await.unwrap();
        cancel.cancel();

        // then (期待する結果):
        assert!(matches!(ping, Some(Message::Ping(_))));
        tokio::time::timeout(RECV_TIMEOUT, task)
            .await
            .unwrap()
            .unwrap();
        let mut last = None;
        while let Ok(message) = written.try_recv() {
            last = Some(message);
        }
        assert!(matches!(last, Some(Message::Close(_))));
    }

    #[tokio::test]
    async fn test_outbound_keepalive_under_steady_traffic() {
        // テスト項目: outbox が常に埋まっていても ping_period ごとに ping が送られる
        // given (前提条件): 1 フレーム 5ms かかる書き込み先と 1ms ごとに積まれる outbox
        let (sink, mut written) = test_sink(1);
        let (tx, rx) = mpsc::channel(256);
        let cancel = CancellationToken::new();
        let config = PumpConfig {
            ping_period: Duration::from_millis(20),
            ..test_config()
        };
        let producer = tokio::spawn(async move {
            loop {
                let _ = tx.try_send(ChatMessage::user_count(1, Timestamp::new(0)));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });
        let task = tokio::spawn(outbound_loop(sink, rx, cancel.clone(), config));

        // when (操作):
        let deadline = Instant::now() + Duration::from_millis(300);
        let (mut pings, mut texts) = (0, 0);
        while let Ok(Some(message)) = tokio::time::timeout_at(deadline, written.recv()).await {
            match message {
                Message::Ping(_) => pings += 1,
                Message::Text(_) => texts += 1,
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // then (期待する結果):
        assert!(texts > 0);
        assert!(pings >= 2, "pings={pings} texts={texts}");

        producer.abort();
        cancel.cancel();
        drop(written);
        tokio::time::timeout(RECV_TIMEOUT, task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_outbound_stops_on_write_failure() {
        // テスト項目: 書き込みに失敗すると終了し、セッションをキャンセルする
        // given (前提条件):
        let (sink, written) = test_sink(1);
        drop(written);
        let (tx, rx) = mpsc::channel(16);
        tx.send(ChatMessage::user_count(1, Timestamp::new(0)))
            .await
            .unwrap();
        let cancel = CancellationToken::new();

        // when (操作):
        tokio::time::timeout(
            RECV_TIMEOUT,
            outbound_loop(sink, rx, cancel.clone(), test_config()),
        )
        .await
        .expect("outbound loop should stop on write failure");

        // then (期待する結果):
        assert!(cancel.is_cancelled());
        drop(tx);
    }
}
