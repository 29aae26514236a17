use std::sync::{Arc, OnceLock};

use crate::error_responses;
use aide::operation::OperationIo;
use axum::{
    extract::{rejection::JsonRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use schemars::{
    schema::{InstanceType, Schema, SchemaObject, SubschemaValidation},
    schema_for, JsonSchema,
};
use serde::Serialize;
use serde_json::Value;

use crate::{db, notes::ValidationError};

pub use response::{ErrorResponse, ErrorResponseDocs};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, OperationIo)]
#[aide(output_with = "axum::Json<ErrorResponseDocs>")]
pub enum Error {
    #[error("unauthorized")]
    Unauthorized,

    // validation
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),
    #[error("validation")]
    JsonValidation(#[from] JsonRejection),

    #[error("command `{0}` is registered twice")]
    DuplicateCommand(String),

    #[error(transparent)]
    DB(db::Error),

    // startup
    #[error(transparent)]
    Config(#[from] envy::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected")]
    Unexpected(String),
}

impl Error {
    /// Errors caused by the caller rather than by this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Validation(_) | Self::JsonValidation(_)
        )
    }
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        Self::DB(error)
    }
}

/// crate::Error <--> tokio_rusqlite::Error
pub mod db_mappers {
    use super::*;
    use crate::db::rusqlite;
    use crate::db::tokio_rusqlite;

    impl From<tokio_rusqlite::Error> for Error {
        fn from(error: tokio_rusqlite::Error) -> Self {
            Error::DB(error.into())
        }
    }

    impl From<rusqlite::Error> for Error {
        fn from(error: rusqlite::Error) -> Self {
            Error::DB(error.into())
        }
    }
}

// Response

error_responses! {
    unauthorized: 401,
    json_validation: 400,
    validation: 400,
    storage: 500,
    unexpected: 500
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let errors = errors();
        match error {
            Error::Unauthorized => errors.unauthorized.with_message("Unauthorized"),
            Error::Validation(error) => errors.validation.with_message(error.to_string()),
            Error::JsonValidation(rejection) => errors.json_validation.with_message(rejection.body_text()),
            Error::DB(_) => errors.storage.with_message("Note storage is unavailable"),
            Error::Unexpected(message) => errors.unexpected.with_message(message),
            _ => errors.unexpected.with_message("Unexpected"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let error = Arc::new(self);

        let error_res = ErrorResponse::from(error.as_ref());
        let status = error_res.status;

        let mut res = axum::Json(error_res).into_response();
        res.extensions_mut().insert(error);

        *res.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let error = response.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    match error {
        Some(error) if error.is_client_error() => tracing::warn!("{}", error),
        Some(error) => tracing::error!("{:?}", error),
        None => {}
    }

    response
}

mod response {
    use serde_json::Map;

    use super::*;

    #[derive(Debug, Serialize, Clone, Default, JsonSchema)]
    pub struct ErrorResponse {
        pub error: String,
        pub message: Option<String>,
        pub status: u16,
        pub details: Option<Map<String, Value>>,
    }

    impl ErrorResponse {
        pub fn new(error: impl Into<String>, status: u16) -> Self {
            Self {
                error: error.into(),
                status,
                ..Default::default()
            }
        }

        pub fn with_message(&self, message: impl Into<String>) -> Self {
            let mut res = self.clone();
            res.message = Some(message.into());
            res
        }
    }

    /// `ErrorResponse` documented as one schema per error kind, each with its
    /// `error` and `status` pinned.
    pub struct ErrorResponseDocs;

    impl JsonSchema for ErrorResponseDocs {
        fn schema_name() -> String {
            String::from("ErrorResponse")
        }

        fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> Schema {
            let one_of = errors()
                .all()
                .into_iter()
                .map(|response| {
                    let mut schema = schema_for!(ErrorResponse).schema;
                    let properties = &mut schema.object().properties;
                    pin(properties.get_mut("error"), Value::from(response.error.clone()));
                    pin(properties.get_mut("status"), Value::from(response.status));
                    Schema::from(schema)
                })
                .collect::<Vec<_>>();

            SchemaObject {
                instance_type: Some(InstanceType::Object.into()),
                subschemas: Some(Box::new(SubschemaValidation {
                    one_of: Some(one_of),
                    ..Default::default()
                })),
                ..Default::default()
            }
            .into()
        }
    }

    fn pin(property: Option<&mut Schema>, value: Value) {
        if let Some(Schema::Object(obj)) = property {
            obj.enum_values = Some(vec![value]);
        }
    }

    /// Typed responses with a custom JSON schema
    /// ```rust
    /// error_responses! {
    ///     unauthorized: 401,
    ///     unexpected: 500
    /// }
    /// ```
    /// expands to a `Responses` struct with one `ErrorResponse` per name and an
    /// `errors()` accessor.
    #[macro_export]
    macro_rules! error_responses {
        (
            $($name:ident: $code:expr),* $(,)?
        ) => {
            #[derive(Debug, Clone, Serialize)]
            struct Responses {
                $(
                    $name: ErrorResponse,
                )*
            }

            impl Responses {
                fn all(&self) -> Vec<&ErrorResponse> {
                    vec![$(&self.$name),*]
                }
            }

            static ERRORS: OnceLock<Responses> = OnceLock::new();

            fn errors() -> &'static Responses {
                ERRORS.get_or_init(|| Responses {
                    $(
                        $name: ErrorResponse::new(stringify!($name), $code),
                    )*
                })
            }
        };
    }
}
