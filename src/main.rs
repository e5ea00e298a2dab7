use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines

use attendance_backend::{
    config::Config,
    database::create_pool,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::EnrollmentService,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 数据库连接池 (schema 由认证/存储后端维护，这里只读)
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    let jwt_service = JwtService::from_config(&config.jwt);
    let enrollment_service = EnrollmentService::new(pool, config.enrollment);

    log::info!(
        "Enrollment windows: members={} record_id_chunk={} records={}",
        config.enrollment.member_window,
        config.enrollment.record_id_chunk,
        config.enrollment.record_window
    );
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let allowed_origins = config.server.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors(&allowed_origins))
            .app_data(web::Data::new(enrollment_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::finger_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
