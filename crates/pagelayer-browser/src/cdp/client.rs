//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// The shared WebSocket and its in-flight commands.
pub(crate) struct Connection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
    call_timeout: Duration,
}

impl Connection {
    /// Send one command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("{} timed out", method)))
            }
        }
    }
}

/// Browser-level CDP connection.
pub struct CdpClient {
    endpoint: String,
    conn: Arc<Connection>,
    recv_task: JoinHandle<()>,
}

impl CdpClient {
    /// Connect to the debugging endpoint, e.g. `http://127.0.0.1:9222`.
    pub async fn connect(endpoint: &str, call_timeout: Duration) -> Result<Self, CdpError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let version_url = format!("{}/json/version", endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;
        let (ws_sink, ws_source) = ws_stream.split();

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let recv_task = tokio::spawn(Self::receive_loop(ws_source, pending.clone()));

        debug!("Connected to {} at {}", version.browser, endpoint);

        Ok(Self {
            endpoint,
            conn: Arc::new(Connection {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
                call_timeout,
            }),
            recv_task,
        })
    }

    /// Route responses to their waiting callers. Events are not used.
    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<CdpResponse>(&text) {
                    Ok(resp) => {
                        let Some(id) = resp.id else {
                            trace!("CDP event: {:?}", resp.method);
                            continue;
                        };
                        if let Some(tx) = pending.lock().remove(&id) {
                            let result = match resp.error {
                                Some(error) => Err(CdpError::Protocol {
                                    code: error.code,
                                    message: error.message,
                                }),
                                None => Ok(resp.result.unwrap_or(Value::Null)),
                            };
                            let _ = tx.send(result);
                        }
                    }
                    Err(e) => warn!("Failed to parse CDP message: {}", e),
                },
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("CDP WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        // Dropping the senders fails every waiting call with SessionClosed.
        pending.lock().clear();
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// False once the browser closed the socket.
    pub fn is_connected(&self) -> bool {
        !self.recv_task.is_finished()
    }

    /// Browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.call(method, params, None).await
    }

    /// Open a blank tab and attach a session to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        let created = self
            .call("Target.createTarget", Some(json!({"url": "about:blank"})))
            .await?;
        let target_id = created["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?
            .to_string();

        let attached = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = attached["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let page = PageSession::new(target_id, session_id, self.conn.clone());
        page.enable().await?;
        Ok(page)
    }

    pub async fn close_page(&self, page: &PageSession) -> Result<(), CdpError> {
        self.call(
            "Target.closeTarget",
            Some(json!({"targetId": page.target_id()})),
        )
        .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
