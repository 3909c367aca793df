use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use stratum_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router<S>(
    app_state: AppState,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let cors_layer = cors::build_cors_layer(&app_state.frontend_url)?;

    let protected_routes = Router::new()
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/bulk-delete",
            post(handlers::roles::bulk_delete_roles_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .patch(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            put(handlers::roles::assign_permissions_handler),
        )
        .route(
            "/api/roles/{role_id}/clone",
            post(handlers::roles::clone_role_handler),
        )
        .route(
            "/api/roles/{role_id}/module-permissions",
            get(handlers::roles::list_module_permissions_handler)
                .put(handlers::roles::save_module_permissions_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::user_roles::list_user_roles_handler),
        )
        .route(
            "/api/user-roles",
            post(handlers::user_roles::assign_role_handler),
        )
        .route(
            "/api/user-roles/revoke",
            post(handlers::user_roles::revoke_role_handler),
        )
        .route(
            "/api/audit/{resource_type}/{resource_id}",
            get(handlers::audit::resource_history_handler),
        )
        .route(
            "/api/audit/{resource_type}/{resource_id}/verify",
            get(handlers::audit::verify_chain_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/auth/bootstrap",
            get(auth::bootstrap_status_handler).post(auth::bootstrap_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
