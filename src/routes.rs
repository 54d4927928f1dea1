// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppState, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de sucursales (protegidas pelo middleware)
    let branch_routes: Router<AppState> = Router::new()
        .route(
            "/sucursales",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route(
            "/sucursales/{id}",
            get(handlers::branches::get_branch)
                .patch(handlers::branches::update_branch)
                .delete(handlers::branches::delete_branch),
        )
        .route(
            "/sucursales/{id}/usuarios",
            get(handlers::branches::list_branch_users)
                .post(handlers::branches::assign_branch_user),
        )
        .route(
            "/sucursales/{id}/usuarios/{usuario_id}",
            delete(handlers::branches::remove_branch_user),
        )
        .route(
            "/sucursales/{id}/almacenes",
            get(handlers::branches::list_branch_warehouses),
        );

    let warehouse_routes: Router<AppState> = Router::new()
        .route(
            "/almacenes",
            get(handlers::warehouses::list_warehouses).post(handlers::warehouses::create_warehouse),
        )
        .route(
            "/almacenes/{id}",
            get(handlers::warehouses::get_warehouse)
                .patch(handlers::warehouses::update_warehouse)
                .delete(handlers::warehouses::delete_warehouse),
        )
        .route(
            "/almacenes/{id}/sucursales",
            get(handlers::warehouses::list_warehouse_branches)
                .post(handlers::warehouses::link_warehouse_branch),
        )
        .route(
            "/almacenes/{id}/sucursales/{sucursal_id}",
            delete(handlers::warehouses::unlink_warehouse_branch),
        );

    // route_layer: rota inexistente continua 404, não 401
    let protected_routes = branch_routes
        .merge(warehouse_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let public_routes: Router<AppState> = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
