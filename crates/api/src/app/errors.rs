use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use stockroom_infra::InventoryError;

use crate::app::dto::{ErrorBody, FieldErrorsBody, MessageBody, Status};

pub const NOT_FOUND_MESSAGE: &str = "Product not found!!";
pub const INSUFFICIENT_STOCK_MESSAGE: &str = "Stock level lower than purchase quantity";

pub fn inventory_error_to_response(err: InventoryError) -> Response {
    match err {
        InventoryError::Validation(msg) => bad_request(msg),
        InventoryError::InvalidFields(fields) => (
            StatusCode::BAD_REQUEST,
            Json(FieldErrorsBody::from_fields(&fields)),
        )
            .into_response(),
        InventoryError::NotFound => {
            message(StatusCode::NOT_FOUND, Status::NotFound, NOT_FOUND_MESSAGE)
        }
        InventoryError::Duplicate(name) => json_error(
            StatusCode::CONFLICT,
            Some(Status::DuplicateEntity),
            format!("Duplicate conflict: a product named {name:?} already exists"),
        ),
        InventoryError::InsufficientStock { .. } => message(
            StatusCode::FORBIDDEN,
            Status::Forbidden,
            INSUFFICIENT_STOCK_MESSAGE,
        ),
        InventoryError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, None, e.to_string())
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    bad_request(rejection.body_text())
}

pub fn bad_request(msg: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, Some(Status::BadRequest), msg)
}

pub fn message(status: StatusCode, wire: Status, msg: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            status: wire,
            message: msg.into(),
            id: None,
        }),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, wire: Option<Status>, msg: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            status: wire,
            error: msg.into(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use stockroom_core::FieldErrors;
    use stockroom_infra::product_store::StoreError;

    use super::*;

    fn status_of(err: InventoryError) -> StatusCode {
        inventory_error_to_response(err).status()
    }

    #[test]
    fn taxonomy_maps_onto_status_codes() {
        let mut fields = FieldErrors::new();
        fields.add("name", "name is required");

        assert_eq!(
            status_of(InventoryError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(InventoryError::InvalidFields(fields)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(InventoryError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(InventoryError::Duplicate("Test".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(InventoryError::InsufficientStock {
                requested: 2,
                available: 1
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(InventoryError::Storage(StoreError::Backend("down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
