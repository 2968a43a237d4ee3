use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{cookie::Cookie, test, web, App};
use dotenv::dotenv;
use serde_json::{json, Value};
use sqlx::PgPool;

use listkeeper::{config::Config, db, routes};

async fn setup() -> (PgPool, Config) {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "listkeeper-test-secret");
    }
    if std::env::var("BCRYPT_COST").is_err() {
        std::env::set_var("BCRYPT_COST", "4");
    }

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to test DB");
    db::init(&pool, &config)
        .await
        .expect("Failed to initialize test DB");

    (pool, config)
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! test_app {
    ($pool:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config.clone()))
                .app_data(routes::json_config())
                .app_data(routes::path_config())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(web::scope("/api").configure(|cfg| routes::config(cfg, &$config)))
                .default_service(web::route().to(routes::not_found)),
        )
        .await
    };
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "firstName": "Test",
            "username": username,
            "email": email,
            "password": "password123"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "failed to register {}",
        username
    );
    resp.response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("session cookie")
        .value()
        .to_string()
}

#[actix_rt::test]
async fn test_list_crud_flow() {
    let (pool, config) = setup().await;
    let app = test_app!(pool, config);

    let email = "list_crud@example.com";
    cleanup_user(&pool, email).await;
    let token = register_user(&app, "list_crud", email).await;

    // Create
    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "  Groceries  ", "description": "Weekly shopping" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Groceries", "title is stored trimmed");
    assert_eq!(body["data"]["description"], "Weekly shopping");
    let list_id = body["data"]["list_id"].as_i64().expect("list_id");

    // Get by id
    let req = test::TestRequest::get()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["list_id"], list_id);

    // Partial update: title only, description untouched
    let req = test::TestRequest::put()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "Groceries v2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Groceries v2");
    assert_eq!(body["data"]["description"], "Weekly shopping");

    // Empty update is rejected
    let req = test::TestRequest::put()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

    // List-all: aggregate fields present, newest first
    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "Errands" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let lists = body["data"].as_array().expect("list array");
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0]["title"], "Errands", "newest-created list comes first");
    assert_eq!(lists[0]["total_tasks"], 0);
    assert_eq!(lists[0]["pending_tasks"], 0);

    // Delete, then the list is gone
    let req = test::TestRequest::delete()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "List not found!");

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
async fn test_list_title_boundaries() {
    let (pool, config) = setup().await;
    let app = test_app!(pool, config);

    let email = "list_bounds@example.com";
    cleanup_user(&pool, email).await;
    let token = register_user(&app, "list_bounds", email).await;

    let cases = [
        ("ab", actix_web::http::StatusCode::BAD_REQUEST),
        ("abc", actix_web::http::StatusCode::CREATED),
        ("   ", actix_web::http::StatusCode::BAD_REQUEST),
    ];
    for (title, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/lists")
            .cookie(Cookie::new("token", token.clone()))
            .set_json(json!({ "title": title }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "title {:?}", title);
    }

    // Exactly max length is accepted, one more is rejected.
    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "a".repeat(150) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "a".repeat(151) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

    // Missing title
    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "description": "no title" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Title is required");

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
async fn test_lists_are_invisible_across_users() {
    let (pool, config) = setup().await;
    let app = test_app!(pool, config);

    let email_a = "owner_a@example.com";
    let email_b = "intruder_b@example.com";
    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;

    let token_a = register_user(&app, "owner_a", email_a).await;
    let token_b = register_user(&app, "intruder_b", email_b).await;

    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token_a.clone()))
        .set_json(json!({ "title": "Owner A list" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let list_id = body["data"]["list_id"].as_i64().unwrap();

    // B's listing does not contain it
    let req = test::TestRequest::get()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token_b.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|l| l["list_id"] != list_id));

    // B's get/update/delete all answer 404, never partial data
    let req = test::TestRequest::get()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token_b.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "List not found!");

    let req = test::TestRequest::put()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token_b.clone()))
        .set_json(json!({ "title": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token_b.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Owner still sees the untouched list
    let req = test::TestRequest::get()
        .uri(&format!("/api/lists/{}", list_id))
        .cookie(Cookie::new("token", token_a.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Owner A list");

    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;
}

#[actix_rt::test]
async fn test_task_counts_and_clear_semantics() {
    let (pool, config) = setup().await;
    let app = test_app!(pool, config);

    let email = "list_counts@example.com";
    cleanup_user(&pool, email).await;
    let token = register_user(&app, "list_counts", email).await;

    let req = test::TestRequest::post()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "title": "Counted" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let list_id = body["data"]["list_id"].as_i64().unwrap();

    // Two tasks, one completed
    let mut task_ids = Vec::new();
    for title in ["First task", "Second task"] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .cookie(Cookie::new("token", token.clone()))
            .set_json(json!({ "list_id": list_id, "title": title }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        task_ids.push(body["data"]["task_id"].as_i64().unwrap());
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}/status", task_ids[0]))
        .cookie(Cookie::new("token", token.clone()))
        .set_json(json!({ "is_completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let list = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["list_id"] == list_id)
        .expect("list present")
        .clone();
    assert_eq!(list["total_tasks"], 2);
    assert_eq!(list["pending_tasks"], 1);

    // include_tasks embeds the tasks
    let req = test::TestRequest::get()
        .uri("/api/lists?include_tasks=true")
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let list = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["list_id"] == list_id)
        .expect("list present")
        .clone();
    assert_eq!(list["tasks"].as_array().unwrap().len(), 2);

    // Clear removes the tasks but keeps the list
    let req = test::TestRequest::delete()
        .uri(&format!("/api/lists/{}/clear", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/lists/{}?include_tasks=true", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_tasks"], 0);
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 0);

    // Clearing an already-empty list succeeds and stays empty
    let req = test::TestRequest::delete()
        .uri(&format!("/api/lists/{}/clear", list_id))
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // delete-all wipes every list for the user
    let req = test::TestRequest::delete()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/lists")
        .cookie(Cookie::new("token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    cleanup_user(&pool, email).await;
}
