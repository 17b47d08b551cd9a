use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{require_admin, require_token},
    handlers::{carts, menu, reviews, token, users},
    AppState,
};

pub async fn health() -> &'static str {
    "bistro is running"
}

// Guards go on each method router rather than the whole Router so that an
// unsupported method on a shared path still answers 405, not 401.
fn signed_in(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), require_token))
}

// Later route_layer calls wrap earlier ones, so the token check runs first.
fn admin_only(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_token))
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health))
        .route("/jwt", post(token::issue))
        .route("/users", post(users::register))
        .route("/menu", get(menu::list))
        .route("/reviews", get(reviews::list));

    let members = Router::new()
        .route(
            "/user/admin/:email",
            signed_in(&state, get(users::admin_status)),
        )
        .route(
            "/carts",
            signed_in(&state, get(carts::list).post(carts::create)),
        )
        .route("/carts/:id", signed_in(&state, delete(carts::remove)));

    let admin = Router::new()
        .route("/users", admin_only(&state, get(users::list)))
        .route("/users/admin/:id", admin_only(&state, patch(users::promote)))
        .route("/users/:id", admin_only(&state, delete(users::remove)))
        .route("/menu", admin_only(&state, post(menu::create)))
        .route("/menu/:id", admin_only(&state, delete(menu::remove)));

    public
        .merge(members)
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
