use aide::scalar::Scalar;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;

use serde_json::json;

use crate::{
    bot::{self, CommandRouter},
    config::Config,
    db::DB,
    errors::{self, on_error, ErrorResponseDocs},
    notes::NoteStore,
    openapi::{self, aide::axum::ApiRouter, OpenApi},
    state::AppState,
    telegram::TelegramClient,
};

pub struct AppParams {
    pub db: DB,
    pub config: Arc<Config>,
}

pub async fn create(AppParams { db, config }: AppParams) -> errors::Result<(Router, OpenApi)> {
    let mut api = OpenApi::default();

    let router = CommandRouter::with_default_commands(NoteStore::new(db), config.export_format)?;
    let state = AppState {
        router: Arc::new(router),
        telegram: TelegramClient::new(&config.telegram_api_url, &config.bot_token),
        config: config.clone(),
    };

    let docs_router = Router::new()
        .route(
            "/__docs__",
            get(Scalar::new("/__docs__/spec.json")
                .with_title("MemoBot API")
                .axum_handler()),
        )
        .route("/__docs__/spec.json", get(serve_docs));

    let app = ApiRouter::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(docs_router)
        .merge(bot::router(&config))
        .finish_api_with(&mut api, |t| {
            t.title("MemoBot")
                .default_response::<openapi::Json<ErrorResponseDocs>>()
        })
        .layer(
            ServiceBuilder::new()
                .layer(Extension(Arc::new(api.clone())))
                .layer(middleware::from_fn(on_error)),
        )
        .with_state(state);

    Ok((app, api))
}

async fn version(State(config): State<Arc<Config>>) -> impl IntoResponse {
    Json(json!({
        "source" : config.source,
        "version": config.version,
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat(State(router): State<Arc<CommandRouter>>) -> impl IntoResponse {
    match router.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(error) => {
            tracing::error!(%error, "heartbeat: note store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })))
        }
    }
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse {
    Json(api.as_ref().clone()).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        db::{self, init_test_db},
        tests::test_server,
        Result,
    };

    #[tokio::test]
    async fn heartbeat_reports_store_health() -> Result<()> {
        let db = init_test_db().await?;
        let server = test_server(db.clone(), "http://127.0.0.1:9", |_| {}).await?;

        let response = server.get("/__heartbeat__").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");

        db::close_db(db).await?;
        let response = server.get("/__heartbeat__").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["status"], "unavailable");
        Ok(())
    }

    #[tokio::test]
    async fn version_reports_build_metadata() -> Result<()> {
        let server = test_server(init_test_db().await?, "http://127.0.0.1:9", |config| {
            config.version = "1.2.3".into();
        })
        .await?;

        let body = server.get("/__version__").await.json::<Value>();
        assert_eq!(body["version"], "1.2.3");
        assert_eq!(body["commit"], "local");
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_describes_the_webhook() -> Result<()> {
        let server = test_server(init_test_db().await?, "http://127.0.0.1:9", |_| {}).await?;

        let spec = server.get("/__docs__/spec.json").await.json::<Value>();
        assert!(spec["paths"]["/webhook"]["post"].is_object());
        Ok(())
    }
}
