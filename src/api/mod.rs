// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 DogCatPaw

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::ActionMessage,
    state::AppState,
    web3::NetworkConfig,
};

pub mod actions;
pub mod health;
pub mod network;
pub mod proxy;
pub mod routes;

use actions::{account, community, posts, wallet};

pub fn router(state: AppState) -> Router {
    let action_routes = Router::new()
        .route("/email/send-code", post(wallet::send_code))
        .route("/email/verify-code", post(wallet::verify_code))
        .route("/guardian/register", post(wallet::register_guardian))
        .route("/auth/signup", post(account::signup))
        .route("/auth/login", post(account::login))
        .route("/pet/register", post(posts::register_pet))
        .route("/adoption", post(posts::create_adoption_post))
        .route("/donation/posts", post(posts::create_donation_post))
        .route("/donation", post(posts::make_donation))
        .route("/payment/prepare", post(posts::prepare_payment))
        .route("/payment/approve", post(posts::approve_payment))
        .route("/story/daily", post(community::create_daily_story))
        .route("/story/review", post(community::create_review_story))
        .route("/comment", post(community::create_comment))
        .route("/like", post(community::toggle_like))
        .route("/chat/room", post(community::create_chat_room));

    let api_routes = Router::new()
        .route("/donation", get(routes::donation_detail))
        .route("/donation/list", get(routes::donation_list))
        .route("/donation/closing", get(routes::donation_closing))
        .route("/donation-list/lists", get(routes::donation_history))
        .route("/comment", get(routes::comments))
        .route("/story/daily/{id}", get(routes::daily_story))
        .route("/story/review/search", get(routes::search_reviews))
        .route("/story/review/{id}", get(routes::review_story))
        .route("/adoption/home", get(routes::adoption_home))
        .route("/pet", get(routes::my_pets))
        .route("/chat/room/list", get(routes::chat_rooms))
        .route("/chat/room/card", get(routes::chat_room_card))
        .route("/chat/history/{room_id}", get(routes::chat_history));

    let app_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/v1/network", get(network::network_info))
        .nest("/actions", action_routes)
        .nest("/api", api_routes)
        .with_state(state);

    Router::new()
        .merge(app_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        network::network_info,
        wallet::send_code,
        wallet::verify_code,
        wallet::register_guardian,
        account::signup,
        account::login,
        posts::register_pet,
        posts::create_adoption_post,
        posts::create_donation_post,
        posts::make_donation,
        posts::prepare_payment,
        posts::approve_payment,
        community::create_daily_story,
        community::create_review_story,
        community::create_comment,
        community::toggle_like,
        community::create_chat_room,
        routes::donation_detail,
        routes::donation_list,
        routes::donation_closing,
        routes::donation_history,
        routes::comments,
        routes::daily_story,
        routes::review_story,
        routes::search_reviews,
        routes::adoption_home,
        routes::my_pets,
        routes::chat_rooms,
        routes::chat_room_card,
        routes::chat_history
    ),
    components(
        schemas(
            ActionMessage,
            NetworkConfig,
            network::NetworkInfo,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            wallet::SendCodeForm,
            wallet::VerifyCodeForm,
            wallet::GuardianForm,
            account::SignupForm,
            account::LoginForm,
            posts::PetForm,
            posts::AdoptionForm,
            posts::DonationPostForm,
            posts::DonationForm,
            posts::PreparePaymentForm,
            posts::ApprovePaymentForm,
            community::StoryForm,
            community::CommentForm,
            community::LikeForm,
            community::ChatRoomForm
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Network", description = "Chain settings for browser wallets"),
        (name = "Email", description = "Guardian email verification"),
        (name = "Guardian", description = "Guardian registration"),
        (name = "Account", description = "Signup and login"),
        (name = "Pets", description = "Pet registration and listing"),
        (name = "Adoption", description = "Adoption posts"),
        (name = "Donations", description = "Donation posts and history"),
        (name = "Payment", description = "Donation payments"),
        (name = "Stories", description = "Daily stories, reviews, comments and likes"),
        (name = "Chat", description = "Adoption chat rooms")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::tests::state_for;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router proxying to a mock backend.
    pub(crate) fn app_for(server: &mockito::ServerGuard) -> Router {
        router(state_for(&server.url()))
    }

    /// Drive one request and decode the JSON reply. A non-JSON body decodes
    /// to `Value::Null`.
    pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub(crate) async fn post_form(
        app: Router,
        path: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/x-www-form-urlencoded");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        send(app, builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub(crate) async fn get(
        app: Router,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        send(app, builder.body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let app = router(state_for("http://127.0.0.1:9"));

        let (status, body) = get(app.clone(), "/health/live", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = get(app.clone(), "/health", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["service"], "ok");

        let (status, body) = get(app, "/health/ready", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["backend"], "ok");
        assert!(body["checks"].get("tls").is_none());
    }

    #[tokio::test]
    async fn network_endpoint_reports_chain() {
        let app = router(state_for("http://127.0.0.1:9"));

        let (status, body) = get(app, "/v1/network", &[]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chainId"], 1337);
        assert_eq!(body["chainIdHex"], "0x539");
        assert_eq!(body["name"], "Besu Local Network");
        assert!(body["rpcUrl"].as_str().unwrap().starts_with("http"));
    }

    #[tokio::test]
    async fn openapi_document_lists_every_surface() {
        let app = router(state_for("http://127.0.0.1:9"));

        let (status, doc) = get(app, "/api-doc/openapi.json", &[]).await;

        assert_eq!(status, StatusCode::OK);
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/health/ready",
            "/v1/network",
            "/actions/guardian/register",
            "/actions/story/daily",
            "/api/donation",
            "/api/chat/history/{roomId}",
        ] {
            assert!(paths.contains_key(path), "{path}");
        }
    }

    #[tokio::test]
    async fn non_form_bodies_get_the_action_envelope() {
        let mut server = mockito::Server::new_async().await;
        let backend = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        for (path, content_type) in [
            ("/actions/email/send-code", None),
            ("/actions/auth/login", Some("application/json")),
            ("/actions/comment", Some("text/plain")),
        ] {
            let mut builder = Request::builder().method("POST").uri(path);
            if let Some(content_type) = content_type {
                builder = builder.header("content-type", content_type);
            }
            let request = builder
                .body(Body::from(r#"{"email":"user@example.com"}"#))
                .unwrap();

            let (status, body) = send(app_for(&server), request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(body["isSuccess"], false, "{path}");
            assert_eq!(body["status"], "400", "{path}");
            assert_eq!(body["code"], "VALIDATION_ERROR", "{path}");
            assert_eq!(body["message"], "요청 형식이 올바르지 않습니다.", "{path}");
        }
        backend.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let app = router(state_for("http://127.0.0.1:9"));
        let (status, _) = get(app, "/v1/bookmarks", &[]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
