use axum::Json as AxumJson;
use axum::extract::FromRequest;

use super::app_error::AppError;

#[derive(FromRequest, Debug, Clone, Copy, Default)]
#[from_request(via(AxumJson), rejection(AppError))]
pub(crate) struct JsonBody<T>(pub(crate) T);
