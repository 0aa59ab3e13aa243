use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use task_manager_api::application::auth_service::AuthService;
use task_manager_api::application::task_service::TaskService;
use task_manager_api::data::task_repository::InMemoryTaskRepository;
use task_manager_api::data::user_repository::InMemoryUserRepository;
use task_manager_api::infrastructure::config::Config;
use task_manager_api::infrastructure::logging::init_logging;
use task_manager_api::presentation::auth::{profile, signin, signup};
use task_manager_api::presentation::handlers::{
    AppState, create_task, delete_task, get_task, health_check, list_tasks, update_task,
};
use task_manager_api::presentation::middleware::{JwtAuthMiddleware, RequestLogMiddleware};
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let config = Config::from_env();
    info!(host = %config.host, port = config.port, "Loaded configuration");

    let task_repository = InMemoryTaskRepository::new();
    let task_service = TaskService::new(Arc::new(task_repository));

    let user_repository = InMemoryUserRepository::new();
    let auth_service = Arc::new(AuthService::new(
        Arc::new(user_repository),
        config.jwt_secret.clone(),
    ));

    let state = web::Data::new(AppState {
        task_service,
        auth_service,
    });

    let jwt_secret = config.jwt_secret.clone();
    let cors_origin = config.cors_origin.clone();

    info!("Configuring HTTP server");
    let server = HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default(),
        }
        .allowed_methods(["GET", "POST", "PUT", "DELETE"])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(RequestLogMiddleware)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/users/signup", web::post().to(signup))
                    .route("/users/signin", web::post().to(signin))
                    .route("/users/profile", web::get().to(profile))
                    .route("/tasks", web::get().to(list_tasks))
                    .route("/tasks", web::post().to(create_task))
                    .route("/tasks/{id}", web::get().to(get_task))
                    .route("/tasks/{id}", web::put().to(update_task))
                    .route("/tasks/{id}", web::delete().to(delete_task)),
            )
    });

    let bind_addr = config.bind_addr();
    info!(host = %bind_addr.0, port = bind_addr.1, "Starting HTTP server");
    server.bind(bind_addr)?.run().await
}
