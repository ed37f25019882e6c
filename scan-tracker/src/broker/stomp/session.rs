//! STOMP session running on its own thread.
//!
//! [`StompSession::connect`] spawns the session thread, performs the handshake
//! there and only returns once the broker has answered. After that the thread
//! multiplexes two sources: commands from [`StompSession`] handles and frames
//! from the socket. `MESSAGE` bodies are handed to the subscribed
//! [`FrameListener`] synchronously on that thread.

use crate::broker::stomp::codec::StompCodec;
use crate::broker::stomp::frame::{Command, Frame};
use crate::broker::{BrokerConfig, BrokerTransport, FrameListener};
use crate::error::BrokerError;
use crate::observability::events;
use crate::runtime::session_runtime::spawn_session_thread;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "stomp_session";
const SESSION_THREAD_NAME: &str = "stomp-session";

type StompStream = Framed<TcpStream, StompCodec>;

#[derive(Clone, Debug)]
pub struct StompOptions {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub passcode: String,
    pub connect_timeout: Duration,
    pub receipt_timeout: Duration,
}

impl StompOptions {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&BrokerConfig> for StompOptions {
    fn from(config: &BrokerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            login: config.username.clone(),
            passcode: config.password.clone(),
            connect_timeout: config.connect_timeout(),
            receipt_timeout: Duration::from_secs(2),
        }
    }
}

enum SessionCommand {
    Subscribe {
        destination: String,
        id: String,
        listener: Arc<dyn FrameListener>,
        done: oneshot::Sender<Result<(), BrokerError>>,
    },
    Disconnect {
        done: oneshot::Sender<Result<(), BrokerError>>,
    },
}

/// Handle to a connected STOMP session.
///
/// Dropping the handle ends the session thread and closes the socket without
/// a DISCONNECT frame.
pub struct StompSession {
    commands: mpsc::UnboundedSender<SessionCommand>,
    next_subscription_id: AtomicU64,
}

impl StompSession {
    pub async fn connect(options: StompOptions) -> Result<Self, BrokerError> {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        spawn_session_thread(SESSION_THREAD_NAME, move || {
            run_session(options, commands_rx, ready_tx)
        })?;

        ready_rx.await.map_err(|_| BrokerError::SessionClosed)??;

        Ok(Self {
            commands: commands_tx,
            next_subscription_id: AtomicU64::new(1),
        })
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<(), BrokerError>>) -> SessionCommand,
    ) -> Result<(), BrokerError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.commands
            .send(command(done_tx))
            .map_err(|_| BrokerError::SessionClosed)?;
        done_rx.await.map_err(|_| BrokerError::SessionClosed)?
    }
}

#[async_trait]
impl BrokerTransport for StompSession {
    async fn subscribe(
        &self,
        destination: &str,
        listener: Arc<dyn FrameListener>,
    ) -> Result<(), BrokerError> {
        let id = self
            .next_subscription_id
            .fetch_add(1, Ordering::Relaxed)
            .to_string();
        let destination = destination.to_string();

        self.request(move |done| SessionCommand::Subscribe {
            destination,
            id,
            listener,
            done,
        })
        .await
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.request(|done| SessionCommand::Disconnect { done }).await
    }
}

async fn run_session(
    options: StompOptions,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ready: oneshot::Sender<Result<(), BrokerError>>,
) {
    let address = options.address();
    let mut stream = match handshake(&options).await {
        Ok(stream) => {
            info!(
                event = events::SESSION_CONNECTED,
                component = COMPONENT,
                address = %address,
                "connected to broker"
            );
            if ready.send(Ok(())).is_err() {
                debug!(component = COMPONENT, "connect caller went away");
                return;
            }
            stream
        }
        Err(err) => {
            warn!(
                event = events::SESSION_CONNECT_FAILED,
                component = COMPONENT,
                address = %address,
                err = %err,
                "broker handshake failed"
            );
            let _ = ready.send(Err(err));
            return;
        }
    };

    let mut listeners: HashMap<String, Arc<dyn FrameListener>> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(SessionCommand::Subscribe { destination, id, listener, done }) => {
                    let result = stream.send(Frame::subscribe(&destination, &id)).await;
                    if result.is_ok() {
                        info!(
                            event = events::SESSION_SUBSCRIBED,
                            component = COMPONENT,
                            destination = %destination,
                            subscription_id = %id,
                            "subscribed"
                        );
                        listeners.insert(id, listener);
                    }
                    let _ = done.send(result);
                }
                Some(SessionCommand::Disconnect { done }) => {
                    let result = close(&mut stream, options.receipt_timeout).await;
                    match &result {
                        Ok(()) => info!(
                            event = events::SESSION_DISCONNECTED,
                            component = COMPONENT,
                            address = %address,
                            "disconnected from broker"
                        ),
                        Err(err) => warn!(
                            event = events::SESSION_DISCONNECT_FAILED,
                            component = COMPONENT,
                            address = %address,
                            err = %err,
                            "graceful disconnect failed"
                        ),
                    }
                    let _ = done.send(result);
                    break;
                }
                None => {
                    debug!(component = COMPONENT, "all session handles dropped");
                    break;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(frame)) => route_frame(&listeners, frame),
                Some(Err(err)) => {
                    warn!(
                        event = events::SESSION_READ_FAILED,
                        component = COMPONENT,
                        address = %address,
                        err = %err,
                        "reading from broker failed"
                    );
                    break;
                }
                None => {
                    info!(
                        event = events::SESSION_CLOSED,
                        component = COMPONENT,
                        address = %address,
                        "broker closed the connection"
                    );
                    break;
                }
            },
        }
    }
}

async fn handshake(options: &StompOptions) -> Result<StompStream, BrokerError> {
    let address = options.address();
    let socket = timeout(
        options.connect_timeout,
        TcpStream::connect((options.host.as_str(), options.port)),
    )
    .await
    .map_err(|_| BrokerError::Timeout("TCP connection"))?
    .map_err(|source| BrokerError::Connect { address, source })?;

    let mut stream = Framed::new(socket, StompCodec::default());
    stream
        .send(Frame::connect(&options.host, &options.login, &options.passcode))
        .await?;

    let reply = timeout(options.connect_timeout, stream.next())
        .await
        .map_err(|_| BrokerError::Timeout("CONNECTED frame"))?;

    match reply {
        Some(Ok(frame)) => match frame.command {
            Command::Connected => Ok(stream),
            Command::Error => Err(BrokerError::Rejected {
                message: frame.error_message(),
            }),
            other => Err(BrokerError::Protocol(format!(
                "expected CONNECTED, got {other}"
            ))),
        },
        Some(Err(err)) => Err(err),
        None => Err(BrokerError::Protocol(
            "connection closed during handshake".into(),
        )),
    }
}

async fn close(stream: &mut StompStream, receipt_timeout: Duration) -> Result<(), BrokerError> {
    let receipt = format!("disconnect-{}", Uuid::new_v4());
    stream.send(Frame::disconnect(&receipt)).await?;

    let await_receipt = async {
        while let Some(frame) = stream.next().await {
            let frame = frame?;
            if frame.command == Command::Receipt
                && frame.header("receipt-id") == Some(receipt.as_str())
            {
                return Ok(());
            }
            debug!(
                component = COMPONENT,
                command = %frame.command,
                "discarding frame received while disconnecting"
            );
        }
        // The broker may close the socket instead of acknowledging.
        Ok::<(), BrokerError>(())
    };

    timeout(receipt_timeout, await_receipt)
        .await
        .map_err(|_| BrokerError::Timeout("DISCONNECT receipt"))??;
    stream.close().await
}

fn route_frame(listeners: &HashMap<String, Arc<dyn FrameListener>>, frame: Frame) {
    match frame.command {
        Command::Message => {
            match frame
                .header("subscription")
                .and_then(|id| listeners.get(id))
            {
                Some(listener) => listener.on_message(&frame.body),
                None => warn!(
                    event = events::SESSION_UNROUTED_MESSAGE,
                    component = COMPONENT,
                    subscription = frame.header("subscription").unwrap_or_default(),
                    "message for unknown subscription"
                ),
            }
        }
        Command::Error => warn!(
            event = events::SESSION_ERROR_FRAME,
            component = COMPONENT,
            message = %frame.error_message(),
            "broker reported an error"
        ),
        other => debug!(component = COMPONENT, command = %other, "ignoring frame"),
    }
}
