use std::collections::BTreeMap;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, delete, get, patch, post, put};
use clinic_core::AppError;
use clinic_domain::Resource;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::access_map::{RouteSpec, RouteVerb, collection_path, record_path};
use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


/// Builds the HTTP router from the access map's route table, so the guard
/// and the router always agree. Every route, fallback included, passes the
/// access guard.
pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let access_map = app_state.access_map.clone();
    let mut grouped: BTreeMap<&str, MethodRouter<AppState>> = BTreeMap::new();
    for route in access_map.routes() {
        let handler = route_handler(route).ok_or_else(|| {
            AppError::Internal(format!(
                "route {} {} has no handler",
                route.verb.as_str(),
                route.path
            ))
        })?;
        let merged = match grouped.remove(route.path.as_str()) {
            Some(existing) => existing.merge(handler),
            None => handler,
        };
        grouped.insert(route.path.as_str(), merged);
    }

    let mut router = Router::new();
    for (path, method_router) in grouped {
        router = router.route(path, method_router);
    }

    Ok(router
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_access,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

/// Maps one declared route to its handler.
fn route_handler(route: &RouteSpec) -> Option<MethodRouter<AppState>> {
    use RouteVerb::{Delete, Get, Post, Put};

    let handler = match (route.verb, route.path.as_str()) {
        (Get, "/health") => get(handlers::health::health_handler),
        (Post, "/api/auth/login") => post(handlers::auth::login_handler),
        (Get, "/api/session") => get(handlers::session::session_handler),
        (Put, "/api/session/clinic") => put(handlers::session::select_clinic_handler),
        (Get, "/api/roles") => get(handlers::roles::list_roles_handler),
        (Post, "/api/roles") => post(handlers::roles::create_role_handler),
        (Get, "/api/roles/{role_name}") => get(handlers::roles::get_role_handler),
        (Delete, "/api/roles/{role_name}") => delete(handlers::roles::delete_role_handler),
        (Put, "/api/roles/{role_name}/permissions") => {
            put(handlers::roles::update_role_permissions_handler)
        }
        (Get, "/api/staff") => get(handlers::staff::list_staff_handler),
        (Post, "/api/staff") => post(handlers::staff::add_staff_handler),
        (Put, "/api/staff/{user_id}") => put(handlers::staff::update_staff_handler),
        (Delete, "/api/staff/{user_id}") => delete(handlers::staff::remove_staff_handler),
        (Get, "/api/clinics") => get(handlers::clinics::list_clinics_handler),
        (Post, "/api/clinics") => post(handlers::clinics::create_clinic_handler),
        (Put, "/api/clinics/{clinic_id}") => put(handlers::clinics::update_clinic_handler),
        (Get, "/api/users") => get(handlers::users::list_users_handler),
        (Post, "/api/users") => post(handlers::users::create_user_handler),
        (Put, "/api/users/{user_id}") => put(handlers::users::update_user_handler),
        (Get, "/api/settings") => get(handlers::settings::get_settings_handler),
        (Put, "/api/settings") => put(handlers::settings::replace_settings_handler),
        (verb, path) => return record_handler(verb, path),
    };

    Some(handler)
}

fn record_handler(verb: RouteVerb, path: &str) -> Option<MethodRouter<AppState>> {
    let resource = Resource::record_collections()
        .iter()
        .copied()
        .find(|resource| collection_path(*resource) == path || record_path(*resource) == path)?;
    let is_collection = collection_path(resource) == path;

    let handler = match (verb, is_collection) {
        (RouteVerb::Get, true) => get(handlers::records::list_records_handler),
        (RouteVerb::Post, true) => post(handlers::records::create_record_handler),
        (RouteVerb::Get, false) => get(handlers::records::get_record_handler),
        (RouteVerb::Put, false) => put(handlers::records::replace_record_handler),
        (RouteVerb::Patch, false) => patch(handlers::records::merge_record_handler),
        (RouteVerb::Delete, false) => delete(handlers::records::delete_record_handler),
        _ => return None,
    };

    Some(handler)
}
