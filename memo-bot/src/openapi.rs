use aide::operation::OperationIo;
use axum::response::IntoResponse;
use axum_macros::FromRequest;
use serde::Serialize;

pub use aide;
pub use aide::openapi::OpenApi;

/// `axum::Json` whose rejection is a crate [`Error`](crate::Error), documented
/// through its JSON schema.
#[derive(FromRequest, OperationIo)]
#[from_request(via(axum::Json), rejection(crate::Error))]
#[aide(input_with = "axum::Json<T>", output_with = "axum::Json<T>", json_schema)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}
