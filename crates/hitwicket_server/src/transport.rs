//! Network boundary: the WebSocket listener and the static page listener.

use crate::config::ServerConfig;
use crate::dispatcher::{Dispatcher, Event};
use crate::ids::ClientId;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, trace, warn};

/// Events buffered between transports and the dispatcher.
const EVENT_QUEUE: usize = 1024;

/// Shared state for WebSocket handlers.
#[derive(Clone)]
struct AppState {
    events: mpsc::Sender<Event>,
    send_queue: usize,
    ping_interval: Duration,
}

/// Running listeners and the dispatcher task.
#[derive(Debug)]
pub struct ServerHandle {
    ws_addr: SocketAddr,
    http_addr: SocketAddr,
    ws_server: JoinHandle<io::Result<()>>,
    http_server: JoinHandle<io::Result<()>>,
    dispatcher: JoinHandle<()>,
}

impl ServerHandle {
    /// Bound address of the WebSocket listener.
    pub fn ws_addr(&self) -> SocketAddr {
        self.ws_addr
    }

    /// Bound address of the static page listener.
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Waits until either listener stops, then stops the rest.
    pub async fn wait(&mut self) -> io::Result<()> {
        let result = tokio::select! {
            res = &mut self.ws_server => res,
            res = &mut self.http_server => res,
        };
        self.shutdown();
        result.map_err(io::Error::other)?
    }

    /// Stops both listeners and the dispatcher.
    pub fn shutdown(&self) {
        info!("Shutting down listeners");
        self.ws_server.abort();
        self.http_server.abort();
        self.dispatcher.abort();
    }
}

/// Binds both listeners and starts serving.
///
/// A port of 0 binds an ephemeral port; the chosen addresses are on the
/// returned handle.
#[instrument(skip(config), fields(host = %config.host()))]
pub async fn start(config: &ServerConfig) -> io::Result<ServerHandle> {
    let (events, dispatcher) = Dispatcher::spawn(EVENT_QUEUE);

    let state = AppState {
        events,
        send_queue: *config.send_queue(),
        ping_interval: config.ping_interval(),
    };

    let ws_listener = TcpListener::bind((config.host().as_str(), *config.ws_port())).await?;
    let http_listener = TcpListener::bind((config.host().as_str(), *config.http_port())).await?;
    let ws_addr = ws_listener.local_addr()?;
    let http_addr = http_listener.local_addr()?;

    let ws_app = ws_router(state);
    let page_app = page_router(config.static_page().clone());

    let ws_server = tokio::spawn(async move { axum::serve(ws_listener, ws_app).await });
    let http_server = tokio::spawn(async move { axum::serve(http_listener, page_app).await });

    info!(ws = %ws_addr, http = %http_addr, "Hitwicket server listening");

    Ok(ServerHandle {
        ws_addr,
        http_addr,
        ws_server,
        http_server,
        dispatcher,
    })
}

fn ws_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .layer(ServiceBuilder::new().map_request(log_request))
}

fn page_router(static_page: PathBuf) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .with_state(Arc::new(static_page))
        .layer(ServiceBuilder::new().map_request(log_request))
}

fn log_request(request: Request<Body>) -> Request<Body> {
    debug!(method = %request.method(), uri = %request.uri(), "HTTP request");
    request
}

async fn page_handler(State(path): State<Arc<PathBuf>>) -> Response {
    match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Static page unavailable");
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs one connection until either side closes it.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (outbox, inbox) = mpsc::channel::<String>(state.send_queue);
    let (reply_tx, reply_rx) = oneshot::channel();
    if state
        .events
        .send(Event::Connected {
            outbox,
            reply: reply_tx,
        })
        .await
        .is_err()
    {
        warn!("Dispatcher unavailable, dropping connection");
        return;
    }
    let Ok(client_id) = reply_rx.await else {
        warn!("Dispatcher dropped connection before assigning an id");
        return;
    };
    debug!(client_id = %client_id, "WebSocket connection open");

    let (ws_tx, ws_rx) = socket.split();
    let mut writer = tokio::spawn(write_loop(ws_tx, inbox, state.ping_interval, client_id.clone()));
    let mut reader = tokio::spawn(read_loop(ws_rx, state.events.clone(), client_id.clone()));

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    if state
        .events
        .send(Event::Disconnected {
            client: client_id.clone(),
        })
        .await
        .is_err()
    {
        debug!(client_id = %client_id, "Dispatcher gone during disconnect");
    }
}

/// Forwards queued envelopes to the socket and pings on a timer.
async fn write_loop(
    mut ws_tx: futures::stream::SplitSink<WebSocket, Message>,
    mut inbox: mpsc::Receiver<String>,
    ping_every: Duration,
    client_id: ClientId,
) {
    let mut ping = tokio::time::interval(ping_every);
    ping.tick().await;

    loop {
        tokio::select! {
            queued = inbox.recv() => {
                let Some(text) = queued else { break };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
                trace!(client_id = %client_id, "Sent ping");
            }
        }
    }
    debug!(client_id = %client_id, "Writer stopped");
}

/// Forwards text frames to the dispatcher.
async fn read_loop(
    mut ws_rx: futures::stream::SplitStream<WebSocket>,
    events: mpsc::Sender<Event>,
    client_id: ClientId,
) {
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let event = Event::Message {
                    from: client_id.clone(),
                    text: text.as_str().to_owned(),
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Ok(Message::Binary(data)) => {
                debug!(client_id = %client_id, len = data.len(), "Ignoring binary frame");
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }
}
