use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    products::{
        dto::{
            self, CreateProductRequest, ListParams, PageMeta, ProductListResponse,
            ProductResponse, UpdateProductRequest,
        },
        repo::{NewProduct, Product, ProductPatch},
    },
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid product ID format".into()))
}

#[instrument(skip(state, _user))]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let (page, limit) = params.normalize();
    let offset = dto::offset(page, limit);

    let data = Product::list(&state.db, limit, offset).await?;
    let total = Product::count(&state.db).await?;

    Ok(Json(ProductListResponse {
        message: "Products retrieved successfully".into(),
        data,
        pagination: PageMeta::new(page, limit, total),
    }))
}

#[instrument(skip(state, _user))]
pub async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_product_id(&id)?;

    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    Ok(Json(ProductResponse {
        message: "Product retrieved successfully".into(),
        data: product,
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let (Some(name), Some(description), Some(price), Some(category), Some(stock)) = (
        payload.name,
        payload.description,
        payload.price,
        payload.category,
        payload.stock,
    ) else {
        return Err(ApiError::Validation(
            "Name, description, price, category, and stock are required".into(),
        ));
    };

    if price < 0.0 {
        return Err(ApiError::Validation("Price cannot be negative".into()));
    }
    if stock < 0 {
        return Err(ApiError::Validation("Stock cannot be negative".into()));
    }

    let product = Product::create(
        &state.db,
        &NewProduct {
            name,
            description,
            price,
            category,
            stock,
        },
    )
    .await?;

    info!(product_id = %product.id, user_id = %user.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product created successfully".into(),
            data: product,
        }),
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_product_id(&id)?;

    if matches!(payload.price, Some(p) if p < 0.0) {
        return Err(ApiError::Validation("Price cannot be negative".into()));
    }
    if matches!(payload.stock, Some(s) if s < 0) {
        return Err(ApiError::Validation("Stock cannot be negative".into()));
    }

    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        category: payload.category,
        stock: payload.stock,
    };

    let product = Product::update(&state.db, id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    info!(product_id = %product.id, user_id = %user.id, "product updated");
    Ok(Json(ProductResponse {
        message: "Product updated successfully".into(),
        data: product,
    }))
}

#[instrument(skip(state, user))]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = parse_product_id(&id)?;

    let product = Product::delete(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    info!(product_id = %product.id, user_id = %user.id, "product deleted");
    Ok(Json(ProductResponse {
        message: "Product deleted successfully".into(),
        data: product,
    }))
}
