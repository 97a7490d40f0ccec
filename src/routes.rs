// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, health, quiz, result, teacher},
    state::AppState,
    utils::{
        guard::{admin_middleware, teacher_middleware},
        jwt::auth_middleware,
    },
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, results, teacher, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, config, token issuer).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/me",
            get(auth::me)
                .put(auth::update_me)
                .route_layer(require_auth.clone()),
        );

    let quiz_routes = Router::new()
        .route(
            "/",
            post(quiz::create_quiz)
                .route_layer(require_auth.clone())
                .get(quiz::list_quizzes),
        )
        .route(
            "/{id}",
            get(quiz::get_quiz)
                .put(quiz::update_quiz)
                .delete(quiz::delete_quiz)
                .route_layer(require_auth.clone()),
        );

    let result_routes = Router::new()
        .route("/submit/{quiz_id}", post(result::submit))
        .route("/me", get(result::my_results))
        .route("/quiz/{quiz_id}", get(result::quiz_results))
        .route_layer(require_auth.clone());

    // Auth first, then the role check
    let teacher_routes = Router::new()
        .route("/quizzes", get(teacher::my_quizzes))
        .route("/quiz/{quiz_id}/attempts", get(teacher::quiz_attempts))
        .route("/stats", get(teacher::my_stats))
        .route_layer(middleware::from_fn(teacher_middleware))
        .route_layer(require_auth.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/quizzes", get(admin::list_quizzes))
        .route(
            "/quizzes/{id}",
            get(admin::get_quiz)
                .put(admin::update_quiz)
                .delete(admin::delete_quiz),
        )
        .route("/stats", get(admin::system_stats))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(require_auth);

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/results", result_routes)
        .nest("/api/teacher", teacher_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
