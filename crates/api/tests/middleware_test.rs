use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use timeline_api::middleware::error_handling::{AppError, map_error};
use timeline_core::errors::TimelineError;

#[rstest]
#[case(TimelineError::NotFound("slot".into()), StatusCode::NOT_FOUND)]
#[case(TimelineError::Validation("stars".into()), StatusCode::BAD_REQUEST)]
#[case(TimelineError::Conflict("slot taken".into()), StatusCode::CONFLICT)]
#[case(TimelineError::Authorization("not the owner".into()), StatusCode::FORBIDDEN)]
#[case(TimelineError::InvariantViolation("slot was not busy".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(TimelineError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status(#[case] error: TimelineError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).status(), expected);
}

#[test]
fn test_internal_error_maps_to_500() {
    let error = TimelineError::Internal(Box::new(std::io::Error::other("disk full")));
    let response = map_error(error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_eyre_report_is_a_database_error() {
    let error: AppError = eyre::eyre!("pool timed out").into();
    assert!(matches!(error.0, TimelineError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
