use axum::extract::{FromRequestParts, Path};

use super::app_error::AppError;

#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct PathParam<T>(pub(crate) T);
