use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::Utc;

use stockroom_core::ProductId;
use stockroom_products::{CreateProduct, DeleteProduct, SellProduct, UpdateProduct};

use crate::app::dto::{
    self, CreateProductRequest, DataBody, MessageBody, ProductData, ProductList, SaleRequest,
    Status, UpdateProductRequest,
};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/sale", put(sell_product))
}

fn parse_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse()
        .map_err(|_| errors::bad_request("incorrect product id format"))
}

fn ok_message(status: StatusCode, message: &str, id: Option<ProductId>) -> Response {
    (
        status,
        Json(MessageBody {
            status: Status::Ok,
            message: message.to_string(),
            id: id.map(ProductId::get),
        }),
    )
        .into_response()
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let cmd = CreateProduct {
        name: body.name,
        description: body.description,
        price: body.price,
        stock_level: body.stock,
        occurred_at: Utc::now(),
    };

    match services.inventory.create_product(cmd).await {
        Ok(product) => ok_message(
            StatusCode::CREATED,
            "Product created successfully!",
            Some(product.id_typed()),
        ),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> Response {
    let page = match services
        .pages
        .resolve(query.page.as_deref(), query.limit.as_deref())
    {
        Ok(p) => p,
        Err(e) => return errors::inventory_error_to_response(e.into()),
    };

    match services.inventory.list_products(page).await {
        Ok(page) => (
            StatusCode::OK,
            Json(DataBody {
                status: Status::Ok,
                data: ProductList::from_page(&page),
            }),
        )
            .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.inventory.get_product(id).await {
        Ok(product) => (
            StatusCode::OK,
            Json(DataBody {
                status: Status::Ok,
                data: ProductData::from(&product),
            }),
        )
            .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let cmd = UpdateProduct {
        product_id: id,
        name: body.name,
        description: body.description,
        price: body.price,
        stock_level: body.stock_level,
        occurred_at: Utc::now(),
    };

    match services.inventory.update_product(cmd).await {
        Ok(_) => ok_message(StatusCode::OK, "Product updated successfully!", None),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn sell_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<SaleRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    if let Some(body_id) = body.id {
        if body_id != id.get() {
            return errors::bad_request("id in body does not match id in path");
        }
    }

    let cmd = SellProduct {
        product_id: id,
        count: body.count,
        occurred_at: Utc::now(),
    };

    match services.inventory.sell(cmd).await {
        Ok(_) => ok_message(StatusCode::OK, "Product sale successful!", None),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let cmd = DeleteProduct {
        product_id: id,
        occurred_at: Utc::now(),
    };

    match services.inventory.delete_product(cmd).await {
        Ok(()) => ok_message(StatusCode::OK, "Product deleted successfully!", None),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
