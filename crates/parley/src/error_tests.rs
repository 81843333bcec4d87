// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    unauthorized = { ErrorCode::Unauthorized, 401, "UNAUTHORIZED" },
    bad_request = { ErrorCode::BadRequest, 400, "BAD_REQUEST" },
    not_found = { ErrorCode::NotFound, 404, "NOT_FOUND" },
    media_not_configured = { ErrorCode::MediaNotConfigured, 503, "MEDIA_NOT_CONFIGURED" },
    internal = { ErrorCode::Internal, 500, "INTERNAL" },
)]
fn code_status_and_name(code: ErrorCode, status: u16, name: &str) {
    assert_eq!(code.http_status(), status);
    assert_eq!(code.as_str(), name);
    assert_eq!(code.to_string(), name);
}

#[yare::parameterized(
    validation = { HandlerError::validation("missing recipientId"), ErrorCode::BadRequest },
    not_found = { HandlerError::Persistence(StoreError::NotFound("message m1".into())), ErrorCode::NotFound },
    backend = { HandlerError::Persistence(StoreError::Backend("disk full".into())), ErrorCode::Internal },
)]
fn handler_error_codes(err: HandlerError, expected: ErrorCode) {
    assert_eq!(err.code(), expected);
}

#[test]
fn error_body_envelope_shape() -> anyhow::Result<()> {
    let body = ErrorResponse { error: ErrorCode::Unauthorized.to_error_body("token expired") };
    let json = serde_json::to_value(&body)?;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    assert_eq!(json["error"]["message"], "token expired");
    Ok(())
}

#[test]
fn handler_error_display_names_the_cause() {
    let err: HandlerError = StoreError::Backend("timeout".into()).into();
    assert_eq!(err.to_string(), "persistence failed: backend error: timeout");
    assert_eq!(HandlerError::validation("blank content").to_string(), "invalid event: blank content");
}
