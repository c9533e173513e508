//! Reqwest transport and API client against a stub actix-web server.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use enrollment_client::ClientServices;
use enrollment_client::domain::ports::{
    ApiRequest, HttpTransport, InMemoryKeyValueStore, RecordingNotifier, TransportFailure,
};
use enrollment_client::domain::{ApiErrorKind, LoginAccount, LoginCredentials, Role, Semester};
use enrollment_client::outbound::http::ReqwestTransport;
use reqwest::Url;
use serde_json::{Value, json};

const VALID_BEARER_PREFIX: &str = "Bearer ";

async fn login(body: web::Json<Value>) -> HttpResponse {
    if body.get("studentId").and_then(Value::as_str) == Some("B1") && body["password"] == "pw" {
        HttpResponse::Ok().json(json!({
            "success": true,
            "message": "ok",
            "data": {"name": "Ada", "roleName": "STUDENT", "identifier": "B1"}
        }))
    } else {
        HttpResponse::Ok().json(json!({"success": false, "message": "invalid credentials"}))
    }
}

async fn courses(request: HttpRequest) -> HttpResponse {
    let authorised = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(VALID_BEARER_PREFIX) && value.len() > 7);
    if authorised {
        HttpResponse::Ok().json(json!({
            "success": true,
            "data": [{"courseId": 1, "courseCode": "CS101", "courseName": "Programming"}]
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({"message": "token missing"}))
    }
}

async fn echo_query(request: HttpRequest) -> HttpResponse {
    let pairs: Vec<(String, String)> =
        web::Query::<Vec<(String, String)>>::from_query(request.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();
    HttpResponse::Ok().json(json!({"success": true, "data": pairs}))
}

async fn slow() -> HttpResponse {
    actix_rt::time::sleep(Duration::from_millis(500)).await;
    HttpResponse::Ok().json(json!({"success": true}))
}

async fn gateway_page() -> HttpResponse {
    HttpResponse::BadGateway()
        .content_type("text/html")
        .body("<html>bad gateway</html>")
}

async fn echo_path(request: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({"success": true, "data": request.uri().path()}))
}

async fn expired() -> HttpResponse {
    HttpResponse::Unauthorized().finish()
}

struct StubServer {
    base: Url,
    handle: ServerHandle,
}

impl StubServer {
    fn start() -> Self {
        let server = HttpServer::new(|| {
            App::new().service(
                web::scope("/api")
                    .route("/auth/login", web::post().to(login))
                    .route("/courses", web::get().to(courses))
                    .route("/courses/available", web::get().to(echo_query))
                    .route("/student/drop", web::delete().to(echo_query))
                    .route("/slow", web::get().to(slow))
                    .route("/gateway", web::get().to(gateway_page))
                    .route("/student/enrollments/{id}", web::get().to(expired))
                    .route("/student/{id}", web::get().to(echo_path)),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub server");
        let addr = *server.addrs().first().expect("bound address");
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);
        Self {
            base: base_url(addr),
            handle,
        }
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn base_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}/api")).expect("valid base URL")
}

fn transport(base: Url, timeout: Duration) -> ReqwestTransport {
    ReqwestTransport::new(base, timeout, "enrollment-client-tests").expect("client builds")
}

#[actix_rt::test]
async fn passes_status_and_json_through() {
    let server = StubServer::start();
    let transport = transport(server.base.clone(), Duration::from_secs(5));

    let response = transport
        .execute(&ApiRequest::get("/courses"), None)
        .await
        .expect("response");

    assert_eq!(response.status, 401);
    assert_eq!(response.body, Some(json!({"message": "token missing"})));
    server.stop().await;
}

#[actix_rt::test]
async fn sends_bearer_query_and_body() {
    let server = StubServer::start();
    let transport = transport(server.base.clone(), Duration::from_secs(5));

    let authorised = transport
        .execute(&ApiRequest::get("/courses"), Some("abc".to_owned()))
        .await
        .expect("response");
    assert_eq!(authorised.status, 200);

    let echoed = transport
        .execute(
            &ApiRequest::delete("/student/drop")
                .with_query("studentId", "B1")
                .with_query("classId", 42),
            None,
        )
        .await
        .expect("response");
    assert_eq!(
        echoed.body.expect("json body")["data"],
        json!([["studentId", "B1"], ["classId", "42"]])
    );

    let login = transport
        .execute(
            &ApiRequest::post("/auth/login")
                .with_body(json!({"studentId": "B1", "password": "pw"})),
            None,
        )
        .await
        .expect("response");
    assert_eq!(login.body.expect("json body")["success"], true);
    server.stop().await;
}

#[actix_rt::test]
async fn identifiers_with_slashes_and_hashes_stay_on_their_route() {
    let server = StubServer::start();
    let transport = transport(server.base.clone(), Duration::from_secs(5));

    let request = ApiRequest::get("/student").with_segment("B1/../../courses#x");
    let response = transport
        .execute(&request, Some("abc".to_owned()))
        .await
        .expect("response");

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        Some(json!({"success": true, "data": "/api/student/B1%2F..%2F..%2Fcourses%23x"}))
    );
    server.stop().await;
}

#[actix_rt::test]
async fn non_json_bodies_arrive_empty() {
    let server = StubServer::start();
    let transport = transport(server.base.clone(), Duration::from_secs(5));

    let response = transport
        .execute(&ApiRequest::get("/gateway"), None)
        .await
        .expect("response");

    assert_eq!(response.status, 502);
    assert_eq!(response.body, None);
    server.stop().await;
}

#[actix_rt::test]
async fn slow_responses_time_out() {
    let server = StubServer::start();
    let transport = transport(server.base.clone(), Duration::from_millis(100));

    let failure = transport
        .execute(&ApiRequest::get("/slow"), None)
        .await
        .expect_err("timeout");

    assert!(matches!(failure, TransportFailure::Timeout { .. }));
    server.stop().await;
}

#[actix_rt::test]
async fn refused_connections_are_connection_failures() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr")
    };
    let transport = transport(base_url(addr), Duration::from_secs(2));

    let failure = transport
        .execute(&ApiRequest::get("/courses"), None)
        .await
        .expect_err("refused");

    assert!(matches!(failure, TransportFailure::Connection { .. }));
}

fn services(server: &StubServer) -> (ClientServices<ReqwestTransport>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let services = ClientServices::new(
        Arc::new(transport(server.base.clone(), Duration::from_secs(5))),
        Arc::new(InMemoryKeyValueStore::new()),
        notifier.clone(),
    );
    (services, notifier)
}

#[actix_rt::test]
async fn login_then_fetch_courses_with_derived_bearer() {
    let server = StubServer::start();
    let (services, notifier) = services(&server);
    let credentials = LoginCredentials::try_new(LoginAccount::StudentId("B1".to_owned()), "pw")
        .expect("valid credentials");

    services
        .session_store
        .login(&credentials)
        .await
        .expect("login succeeds");
    services.courses.fetch_courses().await.expect("courses");

    assert_eq!(services.session_store.role(), Some(Role::Student));
    assert_eq!(
        services.courses.courses()[0].course_code.as_deref(),
        Some("CS101")
    );
    assert_eq!(notifier.messages(), vec!["login successful".to_owned()]);
    server.stop().await;
}

#[actix_rt::test]
async fn term_queries_reach_the_server() {
    let server = StubServer::start();
    let (services, _) = services(&server);

    let echoed: Vec<(String, String)> = services
        .api
        .fetch(
            ApiRequest::get("/courses/available")
                .with_query("academicYear", 2025)
                .with_query("semester", Semester::Second.as_query_value()),
        )
        .await
        .expect("echo");

    assert_eq!(echoed[1].1, "下學期");
    server.stop().await;
}

#[actix_rt::test]
async fn expired_session_is_cleared_and_routed_to_login() {
    let server = StubServer::start();
    let (services, notifier) = services(&server);
    let credentials = LoginCredentials::try_new(LoginAccount::StudentId("B1".to_owned()), "pw")
        .expect("valid credentials");
    services
        .session_store
        .login(&credentials)
        .await
        .expect("login succeeds");
    services.router.navigate("/dashboard/student/enrollments");

    let err = services
        .courses
        .fetch_my_enrollments("B1")
        .await
        .expect_err("401");

    assert_eq!(err.kind(), ApiErrorKind::Unauthorized);
    assert!(!services.session.is_authenticated());
    assert_eq!(services.router.current().path, "/login");
    assert!(notifier.messages().contains(&"please log in".to_owned()));
    server.stop().await;
}
