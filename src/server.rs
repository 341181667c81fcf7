use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::AppError;
use crate::handlers;
use crate::services::{FsLectureSource, LectureSource, TasksCache, TasksParser};

pub async fn run(config: Config) -> std::io::Result<()> {
    let host = config.host.clone();
    let port = config.port;

    let markers = config
        .load_markers()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let parser = web::Data::new(TasksParser::new(markers));
    let cache = web::Data::new(TasksCache::new(config.tasks_cache_ttl_seconds));
    let source: Arc<dyn LectureSource> =
        Arc::new(FsLectureSource::new(config.lectures_dir.clone()));
    let source = web::Data::from(source);

    print_banner(&config.base_url);
    info!("Serving lectures from {:?}", config.lectures_dir);
    info!("Server running at http://{}:{}/", host, port);

    spawn_cache_cleanup(cache.get_ref().clone(), config.tasks_cache_ttl_seconds);

    let startup_time = Instant::now();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(source.clone())
            .app_data(parser.clone())
            .app_data(cache.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    info!("Server stopped. Uptime: {:?}", startup_time.elapsed());
    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(json_config)
        .route("/lectures", web::get().to(handlers::list_lectures))
        .route("/lectures/{slug}", web::get().to(handlers::get_lecture))
        .route(
            "/lectures/{slug}/tasks",
            web::get().to(handlers::get_lecture_tasks),
        )
        .route("/tasks/parse", web::post().to(handlers::parse_tasks))
        .route("/healthz", web::get().to(|| async { "OK" }));
}

/// Evict expired parse results once per TTL period
fn spawn_cache_cleanup(cache: TasksCache, ttl_seconds: i64) {
    let period = Duration::from_secs(ttl_seconds.max(1) as u64);
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let dropped = cache.cleanup().await;
            debug!("Tasks cache cleanup: {} dropped, {} left", dropped, cache.len().await);
        }
    });
}

fn print_banner(base_url: &str) {
    let banner = r#"
 _              _             _
| |    ___  ___| |_ ___  _ __(_)_   _ _ __ ___
| |   / _ \/ __| __/ _ \| '__| | | | | '_ ` _ \
| |__|  __/ (__| || (_) | |  | | |_| | | | | | |
|_____\___|\___|\__\___/|_|  |_|\__,_|_| |_| |_|
"#;
    println!("{}", banner);
    println!("         Lectorium server started at: {}\n", base_url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};
    use std::fs;

    fn lectures_dir() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let http = tmp.path().join("http");
        fs::create_dir_all(&http).unwrap();
        fs::write(http.join("content.md"), "# HTTP\n\nПротокол.\n\n## Методы\n").unwrap();
        fs::write(
            http.join("tasks.md"),
            "## Подготовка к заданиям\nПрочитать RFC.\n### Коды ответа\nЧто значит 404?\n**Ответ:** Not Found",
        )
        .unwrap();

        let sql = tmp.path().join("sql");
        fs::create_dir_all(&sql).unwrap();
        fs::write(sql.join("content.md"), "# SQL").unwrap();
        tmp
    }

    macro_rules! test_app {
        ($dir:expr) => {
            test_app!($dir, web::Data::new(TasksCache::default()))
        };
        ($dir:expr, $cache:expr) => {{
            let source: Arc<dyn LectureSource> =
                Arc::new(FsLectureSource::new($dir.path().to_path_buf()));
            test::init_service(
                App::new()
                    .app_data(web::Data::from(source))
                    .app_data(web::Data::new(TasksParser::default()))
                    .app_data($cache)
                    .configure(configure_routes),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_list_lectures() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::get().uri("/lectures").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["slug"], "http");
        assert_eq!(body[0]["tabs"][1]["kind"], "tasks");
    }

    #[actix_web::test]
    async fn test_get_lecture_detail() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::get().uri("/lectures/http").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["title"], "HTTP");
        assert_eq!(body["outline"][1]["anchor"], "методы");
    }

    #[actix_web::test]
    async fn test_lecture_tasks() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::get().uri("/lectures/http/tasks").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["prep"], "Прочитать RFC.");
        assert_eq!(body["items"][0]["id"], "task-1");
        assert_eq!(body["items"][0]["title"], "Коды ответа");
        assert_eq!(body["items"][0]["body"], "Что значит 404?");
        assert_eq!(body["items"][0]["answer"], "Not Found");

        let req = test::TestRequest::get().uri("/lectures/sql/tasks").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "intro": "", "prep": "", "items": [] }));
    }

    #[actix_web::test]
    async fn test_unknown_lecture() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::get().uri("/lectures/nope/tasks").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_parse_tasks_endpoint() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::post()
            .uri("/tasks/parse")
            .set_json(json!({ "content": "Intro\n### A\n**Кратко:** s\n**Описание:** b" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["intro"], "Intro");
        assert_eq!(body["items"][0]["summary"], "s");
        assert_eq!(body["items"][0]["body"], "b");
    }

    #[actix_web::test]
    async fn test_parse_tasks_is_not_cached() {
        let dir = lectures_dir();
        let cache = web::Data::new(TasksCache::default());
        let app = test_app!(dir, cache.clone());

        for n in 0..20 {
            let req = test::TestRequest::post()
                .uri("/tasks/parse")
                .set_json(json!({ "content": format!("### Задача {}\nx", n) }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(cache.len().await, 0);

        let req = test::TestRequest::get().uri("/lectures/http/tasks").to_request();
        test::call_service(&app, req).await;
        assert_eq!(cache.len().await, 1);
    }

    #[actix_web::test]
    async fn test_malformed_parse_body_is_json_error() {
        let dir = lectures_dir();
        let app = test_app!(dir);

        let req = test::TestRequest::post()
            .uri("/tasks/parse")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ bad")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
    }
}
