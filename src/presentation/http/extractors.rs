//! Custom Extractors
//!
//! Request parsing that reports failures through [`AppError`].

use axum::extract::FromRequest;

use crate::shared::error::AppError;

/// JSON body extractor whose rejections render as [`AppError`] bodies
/// instead of axum's plain-text responses.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
