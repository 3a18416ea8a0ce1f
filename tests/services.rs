//! Backend service wrappers and the assembled client.

use manga_studio::application_impl::*;
use manga_studio::application_port::*;
use manga_studio::client::Studio;
use manga_studio::domain_model::*;
use manga_studio::domain_port::*;
use manga_studio::infra::*;
use manga_studio::session::*;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const REFRESH_PATH: &str = "/auth/refresh";

fn api_over(transport: Arc<ScriptedTransport>) -> Arc<ApiClient> {
    let tokens = Arc::new(TokenStore::new(Arc::new(MemoryKeyValueStore::new())));
    let refresher = Arc::new(TokenRefresher::new(
        transport.clone(),
        tokens,
        Arc::new(EventBus::new()),
        REFRESH_PATH,
    ));
    Arc::new(ApiClient::new(transport, refresher))
}

fn generation_json(id: &str, prompt: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "prompt": prompt,
        "status": status,
        "createdAt": "2026-03-01T12:00:00Z",
    })
}

#[tokio::test]
async fn login_stores_tokens_and_logout_revokes_them() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .route(HttpMethod::Post, "/auth/login", |req| {
            assert!(req.bearer.is_none());
            assert_eq!(req.body.as_ref().unwrap()["email"], "mika@studio.test");
            Ok(json_response(
                200,
                serde_json::json!({ "accessToken": "a1", "refreshToken": "r1" }),
            ))
        })
        .route(HttpMethod::Post, "/auth/logout", |req| {
            assert_eq!(req.body.as_ref().unwrap()["refreshToken"], "r1");
            Ok(HttpResponse::new(204, ""))
        });
    let api = api_over(transport.clone());
    let auth = HttpAuthService::new(api.clone());

    let result = auth
        .login(LoginInput {
            email: "mika@studio.test".into(),
            password: "hunter22".into(),
        })
        .await
        .unwrap();

    assert!(result.user.is_none());
    assert!(auth.is_signed_in());
    assert_eq!(api.tokens().access_token().unwrap().as_str(), "a1");

    auth.logout().await.unwrap();

    assert!(!auth.is_signed_in());
    assert_eq!(transport.count(HttpMethod::Post, "/auth/logout"), 1);
}

#[tokio::test]
async fn rejected_login_does_not_touch_the_session() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(HttpMethod::Post, "/auth/login", |_| {
        Ok(HttpResponse::new(401, r#"{"error":"invalid credentials"}"#))
    });
    let api = api_over(transport.clone());
    let events_seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    {
        let seen = events_seen.clone();
        api.refresher().events().on(
            SessionEvent::SessionExpired,
            Arc::new(move || {
                seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }),
        );
    }
    let auth = HttpAuthService::new(api);

    let err = auth
        .login(LoginInput {
            email: "mika@studio.test".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(transport.count(HttpMethod::Post, REFRESH_PATH), 0);
    assert_eq!(events_seen.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn identity_login_sends_wallet_and_returns_profile() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(HttpMethod::Post, "/auth/identity-login", |req| {
        let body = req.body.as_ref().unwrap();
        assert_eq!(body["identityToken"], "wallet-proof");
        assert_eq!(body["walletAddress"], "0xabc");
        Ok(json_response(
            200,
            serde_json::json!({
                "accessToken": "a1",
                "refreshToken": "r1",
                "user": {
                    "id": "2c7a1e3f-0a44-4d55-8f21-1b2c3d4e5f60",
                    "username": "mika",
                    "walletAddress": "0xabc",
                    "credits": 10
                }
            }),
        ))
    });
    let auth = HttpAuthService::new(api_over(transport));

    let result = auth
        .identity_login(IdentityLoginInput {
            identity_token: "wallet-proof".into(),
            wallet_address: Some("0xabc".into()),
        })
        .await
        .unwrap();

    let user = result.user.unwrap();
    assert_eq!(user.username, "mika");
    assert_eq!(user.wallet_address.as_deref(), Some("0xabc"));
    assert_eq!(user.credits, 10);
}

#[tokio::test(start_paused = true)]
async fn wait_for_completion_polls_until_terminal() {
    let id = "9d2f6b0e-5b1c-4f7a-8e3d-2a1b0c9d8e7f";
    let transport = Arc::new(ScriptedTransport::new());
    let polls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    {
        let polls = polls.clone();
        transport.route(HttpMethod::Get, &format!("/generations/{}", id), move |_| {
            let n = polls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let status = if n < 2 { "processing" } else { "completed" };
            Ok(json_response(200, generation_json(id, "ninja fox", status)))
        });
    }
    let service = HttpGenerationService::new(api_over(transport));

    let generation = service
        .wait_for_completion(
            GenerationId::from_str(id).unwrap(),
            Duration::from_secs(1),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

    assert_eq!(generation.status, GenerationStatus::Completed);
    assert_eq!(polls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn wait_for_completion_times_out() {
    let id = "9d2f6b0e-5b1c-4f7a-8e3d-2a1b0c9d8e7f";
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(HttpMethod::Get, &format!("/generations/{}", id), move |_| {
        Ok(json_response(200, generation_json(id, "ninja fox", "queued")))
    });
    let service = HttpGenerationService::new(api_over(transport));

    let err = service
        .wait_for_completion(
            GenerationId::from_str(id).unwrap(),
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::TimedOut(_)));
}

#[tokio::test]
async fn similar_in_history_ranks_by_overlap() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(HttpMethod::Get, "/generations", |req| {
        assert_eq!(req.path, "/generations?page=1");
        Ok(json_response(
            200,
            serde_json::json!({
                "items": [
                    generation_json("11111111-1111-4111-8111-111111111111", "mecha duel over tokyo bay", "completed"),
                    generation_json("22222222-2222-4222-8222-222222222222", "ninja fox in bamboo forest at night", "completed"),
                    generation_json("33333333-3333-4333-8333-333333333333", "ninja fox in bamboo forest", "completed"),
                ],
                "page": 1,
                "totalPages": 1
            }),
        ))
    });
    let service = HttpGenerationService::new(api_over(transport));

    let similar = service
        .similar_in_history("ninja fox in a bamboo forest", 0.5)
        .await
        .unwrap();

    assert_eq!(similar.len(), 2);
    assert_eq!(similar[0].generation.prompt, "ninja fox in bamboo forest");
    assert!(similar[0].score > similar[1].score);
}

#[tokio::test]
async fn community_and_projects_hit_expected_endpoints() {
    let post = "44444444-4444-4444-8444-444444444444";
    let project = "55555555-5555-4555-8555-555555555555";
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .route(HttpMethod::Post, &format!("/community/posts/{}/like", post), |_| {
            Ok(json_response(200, serde_json::json!({ "likes": 3, "likedByMe": true })))
        })
        .route(HttpMethod::Delete, &format!("/community/posts/{}/like", post), |_| {
            Ok(json_response(200, serde_json::json!({ "likes": 2, "likedByMe": false })))
        })
        .route(HttpMethod::Patch, &format!("/projects/{}", project), move |req| {
            assert_eq!(req.body.as_ref().unwrap(), &serde_json::json!({ "title": "Vol. 2" }));
            Ok(json_response(
                200,
                serde_json::json!({
                    "id": project,
                    "title": "Vol. 2",
                    "createdAt": "2026-03-01T12:00:00Z"
                }),
            ))
        })
        .route(HttpMethod::Delete, &format!("/projects/{}", project), |_| {
            Ok(HttpResponse::new(204, ""))
        });
    let api = api_over(transport.clone());
    let community = HttpCommunityService::new(api.clone());
    let projects = HttpProjectService::new(api);
    let post_id = PostId::from_str(post).unwrap();
    let project_id = ProjectId::from_str(project).unwrap();

    assert!(community.like(post_id).await.unwrap().liked_by_me);
    assert_eq!(community.unlike(post_id).await.unwrap().likes, 2);
    let updated = projects
        .update(
            project_id,
            ProjectPatch {
                title: Some("Vol. 2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Vol. 2");
    projects.delete(project_id).await.unwrap();
    assert_eq!(transport.requests().len(), 4);
}

#[tokio::test]
async fn studio_hydrates_session_and_redirects_when_it_ends() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileKeyValueStore::new(dir.path().join("session.json")));
    storage.set(ACCESS_TOKEN_KEY, "a1").unwrap();
    storage.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    let transport = Arc::new(ScriptedTransport::new());
    transport
        .route(HttpMethod::Get, "/auth/me", |_| Ok(HttpResponse::new(401, "expired")))
        .route(HttpMethod::Post, REFRESH_PATH, |_| Ok(HttpResponse::new(401, "revoked")));
    let navigator = Arc::new(RecordingNavigator::new());

    let studio = Studio::assemble(
        transport.clone(),
        storage.clone(),
        navigator.clone(),
        REFRESH_PATH,
        "/login",
        Duration::from_secs(240),
        CancellationToken::new(),
    );
    assert_eq!(studio.tokens().access_token().unwrap().as_str(), "a1");

    let err = studio.auth_service.profile().await.unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(navigator.visited(), vec!["/login".to_string()]);
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
    studio.shutdown().await;
}
