use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::{auth, carts, goods, orders, payments, users};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/request-code", post(auth::request_code))
        .route("/auth/verify-code", post(auth::verify_code))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        // Catalog
        .route(
            "/products",
            get(goods::list_products).post(goods::create_product),
        )
        .route(
            "/products/{id}",
            get(goods::get_product)
                .put(goods::update_product)
                .patch(goods::update_product)
                .delete(goods::delete_product),
        )
        .route(
            "/categories",
            get(goods::list_categories).post(goods::create_category),
        )
        .route(
            "/categories/{id}",
            get(goods::get_category)
                .put(goods::update_category)
                .patch(goods::update_category)
                .delete(goods::delete_category),
        )
        .route("/brands", get(goods::list_brands).post(goods::create_brand))
        .route(
            "/brands/{id}",
            get(goods::get_brand)
                .put(goods::update_brand)
                .patch(goods::update_brand)
                .delete(goods::delete_brand),
        )
        .route(
            "/reviews",
            get(goods::list_reviews).post(goods::create_review),
        )
        .route(
            "/reviews/{id}",
            get(goods::get_review)
                .put(goods::update_review)
                .patch(goods::update_review)
                .delete(goods::delete_review),
        )
        .route(
            "/attributes",
            get(goods::list_attributes).post(goods::create_attribute),
        )
        .route(
            "/attributes/{id}",
            get(goods::get_attribute)
                .put(goods::update_attribute)
                .patch(goods::update_attribute)
                .delete(goods::delete_attribute),
        )
        .route(
            "/product-attributes",
            get(goods::list_product_attributes).post(goods::create_product_attribute),
        )
        .route(
            "/product-attributes/{id}",
            get(goods::get_product_attribute)
                .put(goods::update_product_attribute)
                .patch(goods::update_product_attribute)
                .delete(goods::delete_product_attribute),
        )
        // Cart & favourites
        .route("/carts", get(carts::list_carts).post(carts::create_cart))
        .route(
            "/carts/{id}",
            get(carts::get_cart)
                .put(carts::update_cart)
                .patch(carts::update_cart)
                .delete(carts::delete_cart),
        )
        .route(
            "/favourites",
            get(carts::list_favourites).post(carts::create_favourite),
        )
        .route(
            "/favourites/{id}",
            get(carts::get_favourite).delete(carts::delete_favourite),
        )
        // Orders
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/order-items",
            get(orders::list_order_items).post(orders::create_order_item),
        )
        .route(
            "/order-items/{id}",
            get(orders::get_order_item)
                .put(orders::update_order_item)
                .patch(orders::update_order_item)
                .delete(orders::delete_order_item),
        )
        // Payments
        .route(
            "/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/payments/{id}",
            get(payments::get_payment)
                .put(payments::update_payment)
                .patch(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route(
            "/payment-items",
            get(payments::list_payment_items).post(payments::create_payment_item),
        )
        .route(
            "/payment-items/{id}",
            get(payments::get_payment_item)
                .put(payments::update_payment_item)
                .patch(payments::update_payment_item)
                .delete(payments::delete_payment_item),
        )
        // Users (administrative)
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user).delete(users::delete_user),
        );

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
