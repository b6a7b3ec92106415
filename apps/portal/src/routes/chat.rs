use axum::{extract::State, Json};

use crate::api::models::{ChatReply, ChatRequest};
use crate::api::ActionResult;
use crate::errors::AppError;
use crate::state::AppState;
use crate::views::chat::{render_emoji, transcript, ChatMessage};

/// GET /actions/chat/history
/// Chronological transcript, oldest first.
pub async fn handle_chat_history(State(state): State<AppState>) -> Json<ActionResult<Vec<ChatMessage>>> {
    let result = state
        .api
        .chat_history()
        .await
        .map(|history| transcript(history.history));
    Json(ActionResult::from_result(
        result,
        "Successfully fetched chat history",
        "loading chat history",
    ))
}

/// POST /actions/chat
pub async fn handle_send_message(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ActionResult<ChatReply>>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    let result = state.api.send_chat(message).await.map(|reply| ChatReply {
        response: render_emoji(&reply.response),
    });
    Ok(Json(ActionResult::from_result(
        result,
        "Message sent",
        "sending chat message",
    )))
}

/// DELETE /actions/chat/history
pub async fn handle_clear_history(State(state): State<AppState>) -> Json<ActionResult<()>> {
    Json(ActionResult::from_result(
        state.api.clear_chat_history().await,
        "Chat cleared successfully",
        "clearing chat history",
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::api::fake::{exchange, FakeApi, Reply};
    use crate::api::models::ChatReply;
    use crate::routes::test_support::{app, get, post_json, send};

    #[tokio::test]
    async fn test_history_is_chronological() {
        let api = Arc::new(FakeApi::new());
        {
            let mut history = api.history.lock().unwrap();
            history.push(exchange("second", "[Trophy] b", 2));
            history.push(exchange("first", "a", 1));
        }
        let (_, body) = get(app(api), "/actions/chat/history").await;
        let messages = body["data"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["content"], "first");
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[3]["content"], "🏆 b");
    }

    #[tokio::test]
    async fn test_send_message() {
        let api = Arc::new(FakeApi::new());
        let (status, body) =
            post_json(app(api), "/actions/chat", json!({ "message": "top candidates?" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["response"], "📄 You asked: top candidates?");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_locally() {
        let api = Arc::new(FakeApi::new());
        let (status, body) = post_json(app(api.clone()), "/actions/chat", json!({ "message": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(api.calls("send_chat"), 0);
    }

    #[tokio::test]
    async fn test_offline_send_is_action_failure() {
        let api = Arc::new(FakeApi::new());
        *api.chat_reply.lock().unwrap() = Some(Reply::<ChatReply>::Offline);
        let (status, body) = post_json(app(api), "/actions/chat", json!({ "message": "hi" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "Unable to reach the CV service. Please try again."
        );
    }

    #[tokio::test]
    async fn test_clear_history() {
        let api = Arc::new(FakeApi::new());
        api.history.lock().unwrap().push(exchange("q", "a", 0));
        let request = Request::delete("/actions/chat/history")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app(api.clone()), request).await;
        assert_eq!(body["success"], true);
        assert!(api.history.lock().unwrap().is_empty());
    }
}
