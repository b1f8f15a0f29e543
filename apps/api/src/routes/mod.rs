pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Browser UI
        .route("/", get(handlers::handle_index).post(handlers::handle_screen))
        .route("/clear", post(handlers::handle_clear))
        // JSON API
        .route(
            "/api/v1/screening",
            get(handlers::handle_get_screening)
                .post(handlers::handle_api_screen)
                .delete(handlers::handle_api_clear),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::screening::extract::tests::{docx_fixture, pdf_fixture};
    use crate::screening::nlp::HeuristicAnalyzer;
    use crate::session::MemorySessionStore;

    const BOUNDARY: &str = "screener-test-boundary";
    const JD: &str = "Backend engineer with Rust and PostgreSQL. Kubernetes a plus.";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn app_with(config: Config) -> Router {
        build_router(AppState {
            config,
            analyzer: Arc::new(HeuristicAnalyzer),
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(600))),
        })
    }

    fn app() -> Router {
        app_with(Config::default())
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"resumes\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn post_form(uri: &str, cookie: Option<&str>, parts: &[Part]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// `name=value` pair from the response's Set-Cookie header.
    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie is set")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(request("GET", "/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "resume-screener");
    }

    #[tokio::test]
    async fn test_index_starts_session() {
        let response = app().oneshot(request("GET", "/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).starts_with("screener_session="));
        assert!(body_text(response).await.contains("No candidates screened yet."));
    }

    #[tokio::test]
    async fn test_screen_ranks_and_persists_in_session() {
        let app = app();
        let strong = "Jane Doe\nSkills: Rust, PostgreSQL, Kubernetes\n6 years experience with Rust.";
        let weak = "Sam Lee\nSkills: Haskell";

        let response = app
            .clone()
            .oneshot(post_form(
                "/",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust, postgresql, kubernetes, haskell"),
                    Part::File("sam.txt", weak.as_bytes()),
                    Part::File("jane.txt", strong.as_bytes()),
                    Part::File("virus.exe", b"MZ"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);
        let html = body_text(response).await;
        let jane = html.find("Jane Doe").expect("Jane listed");
        let sam = html.find("Sam Lee").expect("Sam listed");
        assert!(jane < sam, "best candidate first");
        assert!(!html.contains("virus.exe"));
        assert!(html.contains("6 years experience with Rust."));

        let response = app
            .oneshot(request("GET", "/", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Jane Doe"));
        assert!(html.contains("rust, postgresql, kubernetes, haskell"));
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected() {
        let response = app()
            .oneshot(post_form("/", None, &[Part::Text("skills", "rust")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_fields_are_accepted() {
        let response = app()
            .oneshot(post_form(
                "/api/v1/screening",
                None,
                &[
                    Part::Text("job_description", ""),
                    Part::Text("skills", ""),
                    Part::File("a.txt", b"Ann Ames\nRust"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["candidates"][0]["name"], "Ann Ames");
        assert_eq!(json["candidates"][0]["score"], 0.0);
    }

    #[tokio::test]
    async fn test_clear_redirects_and_empties_session() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_form(
                "/",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust"),
                    Part::File("a.txt", b"Ann Ames\nRust"),
                ],
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .clone()
            .oneshot(request("POST", "/clear", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let response = app
            .oneshot(request("GET", "/api/v1/screening", Some(&cookie)))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["candidates"].as_array().unwrap().len(), 0);
        assert_eq!(json["job_description"], "");
    }

    #[tokio::test]
    async fn test_api_batches_accumulate_and_rescore() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_form(
                "/api/v1/screening",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust"),
                    Part::File("ann.txt", b"Ann Ames\nRust"),
                ],
            ))
            .await
            .unwrap();
        let cookie = session_cookie(&response);
        let json = body_json(response).await;
        assert_eq!(json["candidates"][0]["score"], 100.0);

        let response = app
            .clone()
            .oneshot(post_form(
                "/api/v1/screening",
                Some(&cookie),
                &[
                    Part::Text("job_description", "Go developer"),
                    Part::Text("skills", "go"),
                    Part::File("bob.txt", b"Bob Burns\nGo"),
                ],
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        let candidates = json["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["name"], "Bob Burns");
        assert_eq!(candidates[0]["score"], 100.0);
        assert_eq!(candidates[1]["name"], "Ann Ames");
        assert!(candidates[1]["score"].as_f64().unwrap() < 100.0);
        assert_eq!(json["job_description"], "Go developer");

        let response = app
            .clone()
            .oneshot(request("DELETE", "/api/v1/screening", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_docx_and_unreadable_uploads() {
        let docx = docx_fixture(&["Priya Natarajan", "Skills: Rust, SQL", "8 years experience"]);
        let response = app()
            .oneshot(post_form(
                "/api/v1/screening",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust, sql"),
                    Part::File("priya.docx", &docx),
                    Part::File("broken.pdf", b"%PDF-garbage"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let candidates = json["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0]["name"], "Priya Natarajan");
        assert_eq!(candidates[0]["experience"][0], "8 years experience");
        assert_eq!(candidates[1]["name"], "Unknown");
        assert_eq!(candidates[1]["source_file"], "broken.pdf");
        assert_eq!(candidates[1]["score"], 0.0);
    }

    #[tokio::test]
    async fn test_pdf_upload_screened_through_page() {
        let pdf = pdf_fixture(&["Jane Doe", "Rust and PostgreSQL", "6 years experience"]);
        let response = app()
            .oneshot(post_form(
                "/",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust, postgresql"),
                    Part::File("jane.pdf", &pdf),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Jane Doe"));
        assert!(html.contains("jane.pdf"));
        assert!(html.contains("100.00"));
        assert!(html.contains("<li>6 years experience</li>"));
    }

    #[tokio::test]
    async fn test_error_responses_reissue_cookie() {
        let response = app()
            .oneshot(post_form("/", None, &[Part::Text("skills", "rust")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(session_cookie(&response).starts_with("screener_session="));

        let id = uuid::Uuid::new_v4();
        let cookie = format!("screener_session={id}");
        let response = app_with(Config {
            max_upload_bytes: 1024,
            ..Config::default()
        })
        .oneshot(post_form(
            "/api/v1/screening",
            Some(&cookie),
            &[
                Part::Text("job_description", JD),
                Part::Text("skills", "rust"),
                Part::File("big.txt", &vec![b'a'; 8 * 1024]),
            ],
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(session_cookie(&response), cookie);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let app = app_with(Config {
            max_upload_bytes: 1024,
            ..Config::default()
        });
        let big = vec![b'a'; 8 * 1024];
        let response = app
            .oneshot(post_form(
                "/api/v1/screening",
                None,
                &[
                    Part::Text("job_description", JD),
                    Part::Text("skills", "rust"),
                    Part::File("big.txt", &big),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
