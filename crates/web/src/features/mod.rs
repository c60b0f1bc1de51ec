pub mod clarify;
pub mod matches;
pub mod schedules;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ApiDoc;
use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    ),
    tag = "health"
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn app(state: AppState, api_keys: ApiKeys) -> Router {
    let api = Router::new()
        .nest("/matches", matches::routes::routes(api_keys.clone()))
        .nest("/schedules", schedules::routes::routes(api_keys.clone()))
        .nest("/clarify", clarify::routes::routes(api_keys));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{TimeZone, Utc};
    use clarifier::{Clarification, ClarifierError, RuleClarifier};
    use engine::{Engine, EngineConfig, ManualClock, repository::MemoryStore};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const KEY: &str = "meja-juri";

    struct FixedClarifier;

    #[async_trait]
    impl RuleClarifier for FixedClarifier {
        async fn clarify(&self, description: &str) -> clarifier::Result<Clarification> {
            if description.contains("offline") {
                return Err(ClarifierError::ServiceError("model not loaded".to_string()));
            }
            Ok(Clarification {
                relevant_rule: "Pasal 17".to_string(),
                rule_explanation: format!("Larangan: {}", description),
            })
        }
    }

    fn test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ));
        let engine = Engine::new(store.clone(), store, clock, EngineConfig::default());
        let state = AppState::new(engine, Arc::new(FixedClarifier));

        app(state, ApiKeys::from_comma_separated(KEY))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", KEY))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn tanding_body(match_number: i32) -> Value {
        json!({
            "match_number": match_number,
            "kelas": "Putra Kelas A",
            "babak": "Penyisihan",
            "merah": { "name": "Adi", "contingent": "Jawa Barat" },
            "biru": { "name": "Budi", "contingent": "Bali" }
        })
    }

    async fn started_match(app: &Router) -> String {
        let (_, schedule) = send(app, post("/api/schedules/tanding", tanding_body(1))).await;
        let (status, created) = send(
            app,
            post("/api/matches", json!({ "schedule_id": schedule["schedule_id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let id = created["match_id"].as_str().unwrap().to_string();
        let (status, _) = send(app, post(&format!("/api/matches/{}/start", id), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_mutation_requires_api_key() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/schedules/tanding")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(tanding_body(1).to_string()))
            .unwrap();

        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, get("/api/schedules/tanding")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_schedule_rejected() {
        let app = test_app();
        let mut body = tanding_body(1);
        body["merah"]["name"] = json!("");

        let (status, body) = send(&app, post("/api/schedules/tanding", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
    }

    #[tokio::test]
    async fn test_match_lifecycle_and_scoring() {
        let app = test_app();
        let id = started_match(&app).await;
        let event_id = Uuid::new_v4();
        let score = json!({ "event_id": event_id, "technique": "Tendangan", "points": 2 });

        let (status, outcome) =
            send(&app, post(&format!("/api/matches/{}/merah/scores", id), score.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(outcome["recorded"], true);
        assert_eq!(outcome["score"], 2);

        // Resubmitted by the same judge terminal
        let (status, outcome) =
            send(&app, post(&format!("/api/matches/{}/merah/scores", id), score)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["recorded"], false);
        assert_eq!(outcome["score"], 2);

        let (status, body) = send(&app, get(&format!("/api/matches/{}/red/score", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 2);
        assert_eq!(body["color"], "Merah");

        let (status, finished) =
            send(&app, post(&format!("/api/matches/{}/finish", id), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(finished["status"], "Finished");
        assert_eq!(finished["winner"], "Merah");
    }

    #[tokio::test]
    async fn test_conflicting_event_id_is_409() {
        let app = test_app();
        let id = started_match(&app).await;
        let event_id = Uuid::new_v4();

        let first = json!({ "event_id": event_id, "technique": "Pukulan", "points": 1 });
        let (status, _) = send(&app, post(&format!("/api/matches/{}/biru/scores", id), first)).await;
        assert_eq!(status, StatusCode::CREATED);

        let second = json!({ "event_id": event_id, "technique": "Jatuhan", "points": 3 });
        let (status, body) =
            send(&app, post(&format!("/api/matches/{}/biru/scores", id), second)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "EventIdConflict");
    }

    #[tokio::test]
    async fn test_pause_twice_conflicts() {
        let app = test_app();
        let id = started_match(&app).await;

        let (status, body) = send(&app, post(&format!("/api/matches/{}/pause", id), json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["state"], "Paused");

        let (status, _) = send(&app, post(&format!("/api/matches/{}/pause", id), json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_color_and_match() {
        let app = test_app();
        let id = started_match(&app).await;

        let (status, _) = send(&app, get(&format!("/api/matches/{}/hijau/score", id))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get(&format!("/api/matches/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_foul_disqualification_finishes_match() {
        let app = test_app();
        let id = started_match(&app).await;

        let foul = json!({ "foul_type": "Diskualifikasi", "description": "Serangan ke kemaluan" });
        let (status, outcome) =
            send(&app, post(&format!("/api/matches/{}/biru/fouls", id), foul)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(outcome["status"], "Finished");

        let (_, m) = send(&app, get(&format!("/api/matches/{}", id))).await;
        assert_eq!(m["winner"], "Merah");
    }

    #[tokio::test]
    async fn test_list_matches_filters_by_status() {
        let app = test_app();
        started_match(&app).await;

        let (status, body) = send(&app, get("/api/matches?status=Ongoing")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = send(&app, get("/api/matches?status=Finished")).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, _) = send(&app, get("/api/matches?status=Selesai")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_distribute_tanding() {
        let app = test_app();
        for n in 1..=3 {
            send(&app, post("/api/schedules/tanding", tanding_body(n))).await;
        }

        let (status, body) = send(
            &app,
            post("/api/schedules/tanding/distribute", json!({ "venues": "A, B" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["buckets"][0]["venue"], "A");
        assert_eq!(body["buckets"][0]["entries"].as_array().unwrap().len(), 2);
        assert_eq!(body["buckets"][1]["entries"][0]["match_number"], 2);

        let (_, stored) = send(&app, get("/api/schedules/tanding")).await;
        assert_eq!(stored[2]["gelanggang"], "A");

        let (status, body) = send(
            &app,
            post("/api/schedules/tanding/distribute", json!({ "venues": " , " })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "NoVenues");

        let (status, body) = send(
            &app,
            post("/api/schedules/tanding/distribute", json!({ "venues": "A, A" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "DuplicateVenue");
    }

    #[tokio::test]
    async fn test_tgr_cardinality_checked() {
        let app = test_app();
        let body = json!({
            "category": "Ganda",
            "kelas": "Putri",
            "participant_names": ["Sari"],
            "contingent": "DKI Jakarta"
        });

        let (status, body) = send(&app, post("/api/schedules/tgr", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "InvalidSchedule");
    }

    #[tokio::test]
    async fn test_clarify() {
        let app = test_app();

        let (status, body) = send(
            &app,
            post("/api/clarify", json!({ "pelanggaranDescription": "Menyerang leher" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["relevantRule"], "Pasal 17");

        let (status, _) = send(
            &app,
            post("/api/clarify", json!({ "pelanggaranDescription": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            post("/api/clarify", json!({ "pelanggaranDescription": "offline" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
