pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod json;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod path;
pub(crate) mod routes;

#[cfg(test)]
mod tests;
