use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
};
use tracing::Instrument;

use crate::{
    config::Config,
    openapi::{
        aide::{
            axum::{
                routing::{get_with, post_with},
                ApiRouter, IntoApiResponse,
            },
            NoApi,
        },
        Json,
    },
    state::AppState,
    telegram::{TelegramClient, Update},
    Error, Result,
};

use super::{reply, InboundEvent, Reply};

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub fn router(config: &Config) -> ApiRouter<AppState> {
    ApiRouter::new()
        .api_route(
            &config.webhook_path,
            post_with(webhook, |t| {
                t.summary("Telegram webhook")
                    .description("Receives a Bot API update, runs the command it carries and replies in the chat.")
            }),
        )
        .api_route("/", get_with(liveness, |t| t.summary("Liveness")))
}

/// Passes when no secret is configured or the Telegram secret header matches it.
pub struct WebhookAuth;

impl FromRequestParts<AppState> for WebhookAuth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(expected) = state.config.webhook_secret.as_deref() else {
            return Ok(Self);
        };

        let provided = parts
            .headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided == Some(expected) {
            Ok(Self)
        } else {
            tracing::warn!("webhook call without a valid secret token");
            Err(Error::Unauthorized)
        }
    }
}

async fn liveness() -> &'static str {
    "MemoBot is running"
}

async fn webhook(
    State(state): State<AppState>,
    NoApi(_auth): NoApi<WebhookAuth>,
    Json(update): Json<Update>,
) -> impl IntoApiResponse {
    handle_update(state, update).await
}

async fn handle_update(state: AppState, update: Update) -> Result<&'static str> {
    let Some(event) = InboundEvent::from_update(&update, state.config.bot_username.as_deref()) else {
        tracing::debug!(update_id = update.update_id, "ignoring update without a command");
        return Ok("ok");
    };

    let span = tracing::info_span!(
        "update",
        update_id = update.update_id,
        owner_id = event.owner_id,
        command = %event.command,
    );

    async move {
        match state.router.route(&event).await {
            Ok(reply) => {
                deliver(&state.telegram, event.chat_id, reply).await;
                Ok("ok")
            }
            Err(error) => {
                tracing::error!(?error, "command failed");
                deliver(&state.telegram, event.chat_id, reply::failure()).await;
                Ok("ok")
            }
        }
    }
    .instrument(span)
    .await
}

/// Delivery failures are only logged. Updates are acknowledged whatever the
/// outcome, since Telegram redelivers anything answered with a non-2xx status.
async fn deliver(telegram: &TelegramClient, chat_id: i64, reply: Reply) {
    let result = match reply {
        Reply::Text { text, parse_mode } => telegram.send_message(chat_id, &text, parse_mode).await,
        Reply::Document { filename, content } => {
            telegram
                .send_document(chat_id, &filename, content.into_bytes())
                .await
        }
    };

    if let Err(error) = result {
        tracing::error!(chat_id, %error, "failed to deliver reply");
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::SECRET_TOKEN_HEADER;
    use crate::{
        db::{self, init_test_db},
        tests::test_server,
        Result,
    };

    async fn telegram() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
            .mount(&server)
            .await;
        server
    }

    fn command(update_id: i64, user_id: i64, text: &str) -> Value {
        json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "date": 1700000000,
                "from": { "id": user_id, "is_bot": false, "first_name": "Ada" },
                "chat": { "id": user_id, "type": "private" },
                "text": text
            }
        })
    }

    async fn sent_texts(server: &MockServer) -> Vec<String> {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path().ends_with("/sendMessage"))
            .map(|r| r.body_json::<Value>().unwrap()["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn commands_are_answered_through_the_bot_api() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |_| {}).await?;

        for (id, text) in [(1, "/save work finish report"), (2, "/save work call client"), (3, "/view")] {
            let response = server.post("/webhook").json(&command(id, 42, text)).await;
            response.assert_status_ok();
            response.assert_text("ok");
        }

        assert_eq!(
            sent_texts(&telegram).await,
            vec![
                "✅ Saved under `work`",
                "✅ Saved under `work`",
                "📌 work: finish report\n📌 work: call client",
            ]
        );

        let requests = telegram.received_requests().await.unwrap();
        assert!(requests[0].url.path().starts_with("/bottest-token/"));
        assert_eq!(requests[0].body_json::<Value>().unwrap()["chat_id"], 42);
        assert_eq!(requests[0].body_json::<Value>().unwrap()["parse_mode"], "Markdown");
        Ok(())
    }

    #[tokio::test]
    async fn export_is_sent_as_document() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |_| {}).await?;

        server.post("/webhook").json(&command(1, 42, "/save work finish report")).await;
        server.post("/webhook").json(&command(2, 42, "/export")).await.assert_status_ok();

        let requests = telegram.received_requests().await.unwrap();
        let document = requests
            .iter()
            .find(|r| r.url.path() == "/bottest-token/sendDocument")
            .expect("document upload");
        let body = String::from_utf8_lossy(&document.body);
        assert!(body.contains("your_notes.txt"));
        assert!(body.contains("[work] finish report"));
        Ok(())
    }

    #[tokio::test]
    async fn non_command_updates_are_acknowledged_silently() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |_| {}).await?;

        server.post("/webhook").json(&command(1, 42, "just chatting")).await.assert_text("ok");
        server
            .post("/webhook")
            .json(&json!({ "update_id": 2, "callback_query": { "id": "x" } }))
            .await
            .assert_text("ok");

        assert!(telegram.received_requests().await.unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |_| {}).await?;

        let response = server.post("/webhook").json(&json!({ "message": "nope" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "json_validation");
        Ok(())
    }

    #[tokio::test]
    async fn secret_token_is_enforced_when_configured() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |config| {
            config.webhook_secret = Some("s3cret".into());
        })
        .await?;

        let response = server.post("/webhook").json(&command(1, 42, "/view")).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        server
            .post("/webhook")
            .add_header(
                HeaderName::from_static(SECRET_TOKEN_HEADER),
                HeaderValue::from_static("s3cret"),
            )
            .json(&command(2, 42, "/view"))
            .await
            .assert_status_ok();

        assert_eq!(sent_texts(&telegram).await, vec!["📭 No saved notes."]);
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_sends_one_generic_reply_and_acknowledges() -> Result<()> {
        let telegram = telegram().await;
        let db = init_test_db().await?;
        let server = test_server(db.clone(), &telegram.uri(), |_| {}).await?;
        db::close_db(db).await?;

        let response = server.post("/webhook").json(&command(1, 42, "/view")).await;
        response.assert_status_ok();
        response.assert_text("ok");

        assert_eq!(
            sent_texts(&telegram).await,
            vec!["⚠️ Something went wrong while accessing your notes. Please try again later."]
        );
        Ok(())
    }

    #[tokio::test]
    async fn delivery_failure_still_acknowledges() -> Result<()> {
        let telegram = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&telegram)
            .await;
        let db = init_test_db().await?;
        let server = test_server(db.clone(), &telegram.uri(), |_| {}).await?;

        server
            .post("/webhook")
            .json(&command(1, 42, "/save work finish report"))
            .await
            .assert_text("ok");

        let count = db
            .call(|conn| Ok(conn.query_row("SELECT count(*) FROM notes", [], |r| r.get::<_, i64>(0))?))
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn liveness_endpoint_answers() -> Result<()> {
        let telegram = telegram().await;
        let server = test_server(init_test_db().await?, &telegram.uri(), |_| {}).await?;

        server.get("/").await.assert_text("MemoBot is running");
        Ok(())
    }
}
