//! Extractors whose rejections render as `ApiError` bodies.

use crate::error::ApiFailure;
use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::Json;

#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiFailure))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiFailure))]
pub struct ApiQuery<T>(pub T);
