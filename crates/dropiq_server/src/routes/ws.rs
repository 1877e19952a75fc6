//! Realtime security alerts over WebSocket.
//!
//! # Protocol
//!
//! The upgrade is refused with 401 unless a valid token arrives in the `token`
//! query parameter or the `Authorization` header. After connecting, the client
//! sends `{"type":"subscribe","channel":"security_alerts"}` to start receiving
//! `security_alert` messages and `unsubscribe` to stop. Delivery is at most
//! once: a client that falls behind the broadcast buffer loses the overflow.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use dropiq_api::{ClientMessage, ServerMessage, WsAuthQuery};
use dropiq_core::services::SecurityAlert;
use dropiq_db::User;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::extract::{bearer_token, ApiQuery};
use crate::state::AppState;

/// WebSocket upgrade handler: `GET /ws`
pub async fn ws_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WsAuthQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers))
        .ok_or_else(|| AppError::unauthorized("missing token"))?;
    let user = state.auth.authenticate(&token).await?;

    let ws = ws.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, user))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState, user: User) {
    debug!(user_id = %user.id, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut alerts: Option<broadcast::Receiver<SecurityAlert>> = None;

    loop {
        let outgoing = tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Subscribe { channel }) => {
                        if alerts.is_none() {
                            alerts = Some(state.alerts.subscribe());
                        }
                        ServerMessage::Subscribed { channel }
                    }
                    Ok(ClientMessage::Unsubscribe { channel }) => {
                        alerts = None;
                        ServerMessage::Unsubscribed { channel }
                    }
                    Err(e) => {
                        debug!(user_id = %user.id, "Invalid client message: {}", e);
                        ServerMessage::error(format!("invalid message: {e}"))
                    }
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                // ping/pong/binary
                Some(Ok(_)) => continue,
            },
            alert = next_alert(&mut alerts) => match alert {
                Ok(alert) => ServerMessage::SecurityAlert(alert),
                Err(RecvError::Lagged(n)) => {
                    debug!(user_id = %user.id, "WebSocket client lagged by {} alerts", n);
                    continue;
                }
                Err(RecvError::Closed) => {
                    alerts = None;
                    continue;
                }
            },
        };

        if sender.send(Message::Text(outgoing.to_json().into())).await.is_err() {
            break;
        }
    }

    debug!(user_id = %user.id, "WebSocket client disconnected");
}

/// Next alert for a subscribed client; pends forever while unsubscribed.
async fn next_alert(
    alerts: &mut Option<broadcast::Receiver<SecurityAlert>>,
) -> Result<SecurityAlert, RecvError> {
    match alerts {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropiq_api::Channel;
    use dropiq_core::services::{AlertHub, AlertSeverity};

    #[tokio::test]
    async fn test_unsubscribed_client_waits() {
        let mut alerts = None;
        let result =
            tokio::time::timeout(std::time::Duration::from_millis(20), next_alert(&mut alerts)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_subscribed_client_receives() {
        let hub = AlertHub::new();
        let mut alerts = Some(hub.subscribe());
        assert_eq!(hub.publish(SecurityAlert::new("Drainer", "Avoid", AlertSeverity::Critical)), 1);
        let alert = next_alert(&mut alerts).await.unwrap();
        assert_eq!(alert.title, "Drainer");
    }

    #[test]
    fn test_channel_echo() {
        let msg = ServerMessage::Unsubscribed {
            channel: Channel::SecurityAlerts,
        };
        assert!(msg.to_json().contains("unsubscribed"));
    }
}
