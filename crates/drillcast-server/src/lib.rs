//! Drillcast production server.
//!
//! School drill-alert server: teachers start drills and alerts,
//! students acknowledge safety, parents are notified over SMS, and
//! administrators read participation reports.
//!
//! # Architecture
//!
//! The [`DrillDriver`] is action based and does no network I/O: the
//! runtime feeds it events and executes the actions it returns. This
//! crate provides the production glue around it, using Quinn for QUIC
//! transport, Tokio for the async runtime, and system time with
//! cryptographic RNG.
//!
//! # Components
//!
//! - [`DrillDriver`]: request orchestrator (validation, storage,
//!   routing decisions)
//! - [`Server`]: production runtime that executes driver actions
//! - [`QuinnTransport`]: QUIC transport via Quinn
//! - [`NotificationBridge`]: pluggable SMS dispatch with bounded
//!   fan-out
//! - [`SystemEnv`]: production environment (real time, crypto RNG)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod driver;
mod notify;
mod registry;
pub mod roster;
mod server_error;
pub mod storage;
mod system_env;
mod transport;

use std::{collections::HashMap, net::SocketAddr, path::PathBuf, sync::Arc};

pub use directory::{BulkOutcome, Directory, DirectoryEntry, MemoryDirectory, NewEntry, RowError};
use drillcast_core::Environment;
use drillcast_proto::{ClientRequest, Drill, ErrorReply, ServerMessage};
pub use driver::{DriverConfig, DrillDriver, ServerAction, ServerEvent};
pub use notify::{LogBridge, NotificationBridge, NotifyError, SmsTarget, deliver_all};
pub use registry::{SessionInfo, SessionRegistry};
pub use server_error::ServerError;
pub use storage::{DrillStore, MemoryStorage, RecordedResponse, RedbStorage, StorageError};
pub use system_env::SystemEnv;
use tokio::sync::RwLock;
pub use transport::{QuinnConnection, QuinnTransport};

/// Shared state for all connections.
struct SharedState {
    /// Session id → QUIC connection (for closing).
    connections: RwLock<HashMap<u64, QuinnConnection>>,
    /// Session id → persistent outbound stream. Every server-pushed
    /// message to a client goes through this single stream, which
    /// keeps per-session delivery ordered.
    outbound_streams: RwLock<HashMap<u64, tokio::sync::Mutex<quinn::SendStream>>>,
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to.
    pub bind_address: SocketAddr,
    /// Path to TLS certificate (PEM format).
    pub cert_path: Option<PathBuf>,
    /// Path to TLS private key (PEM format).
    pub key_path: Option<PathBuf>,
    /// Maximum SMS sends in flight during one alert fan-out.
    pub sms_concurrency: usize,
    /// Driver configuration (connection limits).
    pub driver: DriverConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 4433)),
            cert_path: None,
            key_path: None,
            sms_concurrency: 16,
            driver: DriverConfig::default(),
        }
    }
}

/// Production drillcast server.
///
/// Wraps [`DrillDriver`] with Quinn QUIC transport, a notification
/// bridge, and the system environment. Generic over the drill store
/// so the binary can pick in-memory or redb persistence.
pub struct Server<S: DrillStore> {
    /// The action-based driver.
    driver: DrillDriver<SystemEnv, S, MemoryDirectory>,
    /// QUIC endpoint.
    transport: QuinnTransport,
    /// Environment.
    env: SystemEnv,
    /// SMS dispatch.
    bridge: Arc<dyn NotificationBridge>,
    /// Fan-out concurrency bound.
    sms_concurrency: usize,
}

impl<S: DrillStore> Server<S> {
    /// Create and bind a new server.
    ///
    /// Storage and directory are passed in so the caller can select a
    /// backend and seed the roster before serving.
    pub fn bind(
        config: ServerRuntimeConfig,
        storage: S,
        directory: MemoryDirectory,
        bridge: Arc<dyn NotificationBridge>,
    ) -> Result<Self, ServerError> {
        let env = SystemEnv::new();
        let driver = DrillDriver::new(env.clone(), storage, directory, config.driver);

        let transport = QuinnTransport::bind(
            config.bind_address,
            config.cert_path.as_deref(),
            config.key_path.as_deref(),
        )?;

        Ok(Self { driver, transport, env, bridge, sms_concurrency: config.sms_concurrency })
    }

    /// Run the server, accepting connections and processing requests.
    ///
    /// Runs until the endpoint is closed or an accept error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.transport.local_addr()?);

        let env = self.env;
        let driver = Arc::new(tokio::sync::Mutex::new(self.driver));
        let shared = Arc::new(SharedState {
            connections: RwLock::new(HashMap::new()),
            outbound_streams: RwLock::new(HashMap::new()),
        });
        let fanout = FanOut { bridge: self.bridge, concurrency: self.sms_concurrency };

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let driver = Arc::clone(&driver);
                    let shared = Arc::clone(&shared);
                    let fanout = fanout.clone();
                    let env = env.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, driver, shared, fanout, env).await {
                            tracing::error!(error = %e, "connection error");
                        }
                    });
                },
                Err(e) => {
                    tracing::error!(error = %e, "accept error");
                },
            }
        }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }
}

/// SMS dispatch handle cloned into every connection task.
#[derive(Clone)]
struct FanOut {
    bridge: Arc<dyn NotificationBridge>,
    concurrency: usize,
}

/// Handle a single QUIC connection.
async fn handle_connection<S: DrillStore>(
    conn: QuinnConnection,
    driver: Arc<tokio::sync::Mutex<DrillDriver<SystemEnv, S, MemoryDirectory>>>,
    shared: Arc<SharedState>,
    fanout: FanOut,
    env: SystemEnv,
) -> Result<(), ServerError> {
    let session_id = env.random_u64();

    tracing::debug!(session_id, remote = %conn.remote_addr(), "new connection");

    let outbound_stream = conn
        .open_uni()
        .await
        .map_err(|e| ServerError::Internal(format!("failed to open outbound stream: {e}")))?;

    {
        let mut connections = shared.connections.write().await;
        connections.insert(session_id, conn.clone());
    }

    {
        let mut streams = shared.outbound_streams.write().await;
        streams.insert(session_id, tokio::sync::Mutex::new(outbound_stream));
    }

    let resolved = {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ServerEvent::ConnectionAccepted { session_id })?;
        resolve_actions(&driver, actions)
    };
    execute_actions(resolved, &shared, &fanout).await;

    loop {
        match conn.accept_bi().await {
            Ok((send, recv)) => {
                let driver = Arc::clone(&driver);
                let shared = Arc::clone(&shared);
                let fanout = fanout.clone();

                tokio::spawn(async move {
                    if let Err(e) =
                        handle_stream(session_id, send, recv, driver, &shared, &fanout).await
                    {
                        tracing::debug!(session_id, error = %e, "stream error");
                    }
                });
            },
            Err(e) => {
                tracing::debug!(session_id, error = %e, "connection closed");
                break;
            },
        }
    }

    {
        let mut connections = shared.connections.write().await;
        connections.remove(&session_id);
    }

    {
        let mut streams = shared.outbound_streams.write().await;
        streams.remove(&session_id);
    }

    let resolved = {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ServerEvent::ConnectionClosed {
            session_id,
            reason: "connection closed".to_string(),
        })?;
        resolve_actions(&driver, actions)
    };
    execute_actions(resolved, &shared, &fanout).await;

    Ok(())
}

/// Handle a single bidirectional request stream.
///
/// Requests are length-prefixed CBOR frames. A frame that fails to
/// decode gets a `BAD_REQUEST` reply and ends the stream; the
/// connection itself stays up.
async fn handle_stream<S: DrillStore>(
    session_id: u64,
    send: quinn::SendStream,
    mut recv: quinn::RecvStream,
    driver: Arc<tokio::sync::Mutex<DrillDriver<SystemEnv, S, MemoryDirectory>>>,
    shared: &Arc<SharedState>,
    fanout: &FanOut,
) -> Result<(), ServerError> {
    // Replies go over the persistent outbound stream, not this one.
    drop(send);

    loop {
        let mut prefix = [0u8; drillcast_proto::PREFIX_SIZE];
        match recv.read_exact(&mut prefix).await {
            Ok(()) => {},
            Err(e) => {
                tracing::debug!(session_id, error = %e, "read ended");
                break;
            },
        }

        let body_len = match drillcast_proto::body_len(prefix) {
            Ok(len) => len,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "rejected frame prefix");
                let reply = ServerMessage::Error(ErrorReply::bad_request(e.to_string()));
                send_to_session(shared, session_id, &reply).await;
                break;
            },
        };

        let mut body = vec![0u8; body_len];
        if let Err(e) = recv.read_exact(&mut body).await {
            tracing::debug!(session_id, error = %e, "body read error");
            break;
        }

        let request: ClientRequest = match drillcast_proto::decode_body(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "request decode error");
                let reply = ServerMessage::Error(ErrorReply::bad_request(e.to_string()));
                send_to_session(shared, session_id, &reply).await;
                break;
            },
        };

        // The driver lock covers orchestration only; all network I/O
        // happens after the guard is dropped.
        let resolved = {
            let mut driver = driver.lock().await;
            match driver.process_event(ServerEvent::RequestReceived { session_id, request }) {
                Ok(actions) => resolve_actions(&driver, actions),
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "request processing error");
                    continue;
                },
            }
        };
        execute_actions(resolved, shared, fanout).await;
    }

    Ok(())
}

/// A driver action with room membership already resolved.
///
/// Resolution happens under the driver lock; execution does not, so a
/// stalled peer can never hold up request processing.
enum ResolvedAction {
    /// Reply to the requesting session.
    Send { session_id: u64, message: ServerMessage },
    /// Deliver one message to a snapshot of room members.
    Broadcast { sessions: Vec<u64>, message: ServerMessage },
    /// Run the SMS fan-out and report the outcome to the caller.
    DeliverAlert { session_id: u64, drill: Drill, targets: Vec<SmsTarget> },
    /// Close a session's connection.
    Close { session_id: u64, reason: String },
}

/// Snapshot room membership for every action while the driver lock is
/// still held.
fn resolve_actions<S: DrillStore>(
    driver: &DrillDriver<SystemEnv, S, MemoryDirectory>,
    actions: Vec<ServerAction>,
) -> Vec<ResolvedAction> {
    actions
        .into_iter()
        .map(|action| match action {
            ServerAction::SendToSession { session_id, message } => {
                ResolvedAction::Send { session_id, message }
            },
            ServerAction::BroadcastToRoom { room, message } => {
                let sessions: Vec<u64> = driver.sessions_in_room(&room).collect();
                tracing::debug!(%room, recipients = sessions.len(), "broadcast");
                ResolvedAction::Broadcast { sessions, message }
            },
            ServerAction::DeliverAlert { session_id, drill, targets } => {
                ResolvedAction::DeliverAlert { session_id, drill, targets }
            },
            ServerAction::CloseConnection { session_id, reason } => {
                ResolvedAction::Close { session_id, reason }
            },
        })
        .collect()
}

/// Execute resolved actions.
///
/// Send failures are logged and skipped: a dead client never takes
/// down the connection task that is broadcasting to it.
async fn execute_actions(actions: Vec<ResolvedAction>, shared: &Arc<SharedState>, fanout: &FanOut) {
    for action in actions {
        match action {
            ResolvedAction::Send { session_id, message } => {
                send_to_session(shared, session_id, &message).await;
            },

            ResolvedAction::Broadcast { sessions, message } => {
                // One task per recipient: a peer that stopped reading
                // stalls only its own write, not the rest of the room.
                let message = Arc::new(message);
                for session_id in sessions {
                    let shared = Arc::clone(shared);
                    let message = Arc::clone(&message);
                    tokio::spawn(async move {
                        send_to_session(&shared, session_id, &message).await;
                    });
                }
            },

            ResolvedAction::DeliverAlert { session_id, drill, targets } => {
                // Fan-out runs detached so the request pipeline is
                // never blocked behind SMS latency.
                let shared = Arc::clone(shared);
                let bridge = Arc::clone(&fanout.bridge);
                let concurrency = fanout.concurrency;
                tokio::spawn(async move {
                    let delivery = notify::deliver_all(bridge, targets, concurrency).await;
                    tracing::info!(
                        drill_id = drill.id,
                        total = delivery.total,
                        sent = delivery.sent,
                        failed = delivery.failed,
                        "alert fan-out finished"
                    );
                    let reply = ServerMessage::AlertDelivered { drill, delivery };
                    send_to_session(&shared, session_id, &reply).await;
                });
            },

            ResolvedAction::Close { session_id, reason } => {
                tracing::info!(session_id, reason, "closing connection");
                let mut connections = shared.connections.write().await;
                if let Some(conn) = connections.remove(&session_id) {
                    conn.close(0u32.into(), reason.as_bytes());
                }
            },
        }
    }
}

/// Write one framed message to a session's outbound stream.
async fn send_to_session(shared: &SharedState, session_id: u64, message: &ServerMessage) {
    let frame = match drillcast_proto::encode(message) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode outbound message");
            return;
        },
    };

    let streams = shared.outbound_streams.read().await;
    if let Some(stream_mutex) = streams.get(&session_id) {
        let mut stream = stream_mutex.lock().await;
        if let Err(e) = stream.write_all(&frame).await {
            tracing::warn!(session_id, error = %e, "outbound write failed");
        }
    } else {
        tracing::debug!(session_id, "send skipped, session gone");
    }
}
