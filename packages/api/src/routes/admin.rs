use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub mod categories;
pub mod products;
pub mod users;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{product_id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{category_id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            put(users::update_user).delete(users::delete_user),
        )
}
