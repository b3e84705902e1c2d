pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::jobs::applications;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::searches::handlers as searches;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_search_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).put(jobs::handle_update_job),
        )
        .route(
            "/api/v1/jobs/:id/candidates",
            get(jobs::handle_recommended_candidates),
        )
        .route("/api/v1/jobs/:id/save", post(jobs::handle_toggle_saved_job))
        .route("/api/v1/saved-jobs", get(jobs::handle_list_saved_jobs))
        // Applications
        .route(
            "/api/v1/jobs/:id/applications",
            post(applications::handle_apply),
        )
        .route(
            "/api/v1/jobs/:id/pipeline",
            get(applications::handle_application_pipeline),
        )
        .route(
            "/api/v1/applications",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_application_status),
        )
        // Profiles
        .route(
            "/api/v1/profiles/:id",
            get(profiles::handle_get_profile).put(profiles::handle_update_profile),
        )
        .route(
            "/api/v1/profiles/by-username/:username",
            get(profiles::handle_get_public_profile),
        )
        .route(
            "/api/v1/profiles/:id/recommendations",
            get(profiles::handle_recommended_jobs),
        )
        // Saved candidate searches
        .route(
            "/api/v1/searches",
            get(searches::handle_list_searches).post(searches::handle_create_search),
        )
        .route(
            "/api/v1/searches/check-matches",
            post(searches::handle_check_matches),
        )
        .route("/api/v1/searches/:id", get(searches::handle_get_search))
        .route(
            "/api/v1/searches/:id/active",
            patch(searches::handle_set_search_active),
        )
        .route(
            "/api/v1/searches/:id/candidates",
            get(searches::handle_search_candidates),
        )
        .route(
            "/api/v1/searches/:id/new-matches",
            get(searches::handle_new_matches),
        )
        .route(
            "/api/v1/searches/:id/matches",
            get(searches::handle_list_matches),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::Config;
    use crate::models::job::{fixtures::job, ApplicationStatus};
    use crate::models::profile::fixtures::{recruiter, seeker};
    use crate::models::search::{fixtures::saved_search, SavedCandidateSearch};
    use crate::searches::notify::testing::RecordingNotifier;
    use crate::store::memory::MemoryStore;
    use crate::store::JobBoardStore;

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn app_under_test() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState {
            store: store.clone(),
            notifier: notifier.clone(),
            clock: Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            )),
            config: Config {
                database_url: "postgres://unused".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
                site_url: "http://localhost:8000".to_string(),
                default_from_email: "noreply@jobboard.com".to_string(),
                notify_webhook_url: None,
            },
        };
        TestApp {
            router: build_router(state),
            store,
            notifier,
        }
    }

    async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_under_test();
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "jobboard-api");
    }

    #[tokio::test]
    async fn test_job_search_rejects_bad_coordinates() {
        let app = app_under_test();

        let response = send(&app, Method::GET, "/api/v1/jobs?lat=abc&lon=-122.4", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = send(&app, Method::GET, "/api/v1/jobs?lat=37.77", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_job_search_returns_total() {
        let app = app_under_test();
        app.store.insert_job(job("Rust Engineer", "Rust, Tokio"));
        app.store.insert_job(job("Designer", "Figma"));

        let response = send(&app, Method::GET, "/api/v1/jobs?skills=rust", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["jobs"][0]["title"], "Rust Engineer");
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let app = app_under_test();
        let uri = format!("/api/v1/jobs/{}", uuid::Uuid::new_v4());
        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_apply_twice_conflicts() {
        let app = app_under_test();
        let posting = job("Backend", "Go");
        let job_id = posting.id;
        app.store.insert_job(posting);
        let applicant = uuid::Uuid::new_v4();
        let uri = format!("/api/v1/jobs/{job_id}/applications");
        let body = json!({ "applicant_id": applicant, "cover_note": "hi" });

        let first = send(&app, Method::POST, &uri, Some(body.clone())).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(json_body(first).await["status"], "applied");

        let second = send(&app, Method::POST, &uri, Some(body)).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(app.store.applications().len(), 1);
    }

    #[tokio::test]
    async fn test_only_poster_moves_application_status() {
        let app = app_under_test();
        let posting = job("Backend", "Go");
        let (job_id, poster) = (posting.id, posting.posted_by);
        app.store.insert_job(posting);

        let applied = send(
            &app,
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/applications"),
            Some(json!({ "applicant_id": uuid::Uuid::new_v4() })),
        )
        .await;
        let application_id = json_body(applied).await["id"]
            .as_str()
            .unwrap()
            .to_string();
        let uri = format!("/api/v1/applications/{application_id}/status");

        let stranger = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "recruiter_user_id": uuid::Uuid::new_v4(), "status": "interview" })),
        )
        .await;
        assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

        let owner = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "recruiter_user_id": poster, "status": "interview" })),
        )
        .await;
        assert_eq!(owner.status(), StatusCode::OK);
        assert_eq!(json_body(owner).await["status"], "interview");
    }

    #[tokio::test]
    async fn test_profile_update_records_match_and_notifies() {
        let app = app_under_test();
        let hr = recruiter("hr");
        let search = SavedCandidateSearch {
            skills: Some("python".to_string()),
            ..saved_search(hr.id)
        };
        let search_id = search.id;
        let candidate = seeker("amy", "JavaScript");
        let candidate_id = candidate.id;
        app.store.insert_profile(hr);
        app.store.insert_search(search);
        app.store.insert_profile(candidate);

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/v1/profiles/{candidate_id}"),
            Some(json!({ "skills": "Python, Django" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["skills"], "Python, Django");

        let records = app.store.match_records(search_id);
        assert_eq!(records.len(), 1);
        assert!(records[0].notified);
        assert_eq!(app.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_dry_run_then_real() {
        let app = app_under_test();
        let hr = recruiter("hr");
        let search = saved_search(hr.id);
        let search_id = search.id;
        app.store.insert_profile(hr);
        app.store.insert_search(search);
        app.store.insert_profile(seeker("amy", "Rust"));

        let dry = send(
            &app,
            Method::POST,
            "/api/v1/searches/check-matches?dry_run=true",
            None,
        )
        .await;
        assert_eq!(dry.status(), StatusCode::OK);
        let report = json_body(dry).await;
        assert_eq!(report["dry_run"], true);
        assert_eq!(report["new_matches"], 1);
        assert!(app.store.match_records(search_id).is_empty());

        let real = send(&app, Method::POST, "/api/v1/searches/check-matches", None).await;
        let report = json_body(real).await;
        assert_eq!(report["matches_created"], 1);
        assert_eq!(report["notifications_sent"], 1);
        assert_eq!(app.store.match_records(search_id).len(), 1);
    }

    fn job_body(recruiter_id: uuid::Uuid, title: &str) -> Value {
        json!({
            "recruiter_id": recruiter_id,
            "title": title,
            "company": "Acme",
            "location": "Austin, TX",
            "required_skills": "Rust, Tokio",
            "work_type": "remote",
            "contact_email": "jobs@acme.io",
        })
    }

    #[tokio::test]
    async fn test_job_search_rejects_nan_radius() {
        let app = app_under_test();
        let response = send(
            &app,
            Method::GET,
            "/api/v1/jobs?lat=37.78&lon=-122.41&radius_miles=NaN",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recruiter_posts_and_edits_job() {
        let app = app_under_test();
        let hr = recruiter("hr");
        let other = recruiter("other");
        let amy = seeker("amy", "Rust");
        let (hr_id, other_id, amy_id) = (hr.id, other.id, amy.id);
        for p in [hr, other, amy] {
            app.store.insert_profile(p);
        }

        let by_seeker = send(&app, Method::POST, "/api/v1/jobs", Some(job_body(amy_id, "Dev"))).await;
        assert_eq!(by_seeker.status(), StatusCode::FORBIDDEN);

        let mut blank = job_body(hr_id, "Dev");
        blank["title"] = json!(" ");
        let invalid = send(&app, Method::POST, "/api/v1/jobs", Some(blank)).await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let created = send(&app, Method::POST, "/api/v1/jobs", Some(job_body(hr_id, "Dev"))).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let job_id = json_body(created).await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/jobs/{job_id}");

        let detail = json_body(send(&app, Method::GET, &uri, None).await).await;
        assert_eq!(detail["job"]["title"], "Dev");
        assert_eq!(detail["required_skills"], json!(["Rust", "Tokio"]));

        let stranger = send(&app, Method::PUT, &uri, Some(job_body(other_id, "Hijacked"))).await;
        assert_eq!(stranger.status(), StatusCode::FORBIDDEN);

        let mut closed = job_body(hr_id, "Senior Dev");
        closed["is_active"] = json!(false);
        let edited = send(&app, Method::PUT, &uri, Some(closed)).await;
        assert_eq!(edited.status(), StatusCode::OK);
        assert_eq!(json_body(edited).await["title"], "Senior Dev");

        let hidden = send(&app, Method::GET, &uri, None).await;
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_toggles_and_lists() {
        let app = app_under_test();
        let posting = job("Backend", "Go");
        let job_id = posting.id;
        app.store.insert_job(posting);
        let user_id = uuid::Uuid::new_v4();
        let save_uri = format!("/api/v1/jobs/{job_id}/save");
        let list_uri = format!("/api/v1/saved-jobs?user_id={user_id}");
        let body = json!({ "user_id": user_id });

        let first = json_body(send(&app, Method::POST, &save_uri, Some(body.clone())).await).await;
        assert_eq!(first["saved"], true);
        let listed = json_body(send(&app, Method::GET, &list_uri, None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["job"]["title"], "Backend");

        let second = json_body(send(&app, Method::POST, &save_uri, Some(body)).await).await;
        assert_eq!(second["saved"], false);
        let listed = json_body(send(&app, Method::GET, &list_uri, None).await).await;
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_applicant_dashboard_and_detail() {
        let app = app_under_test();
        let (a, b) = (job("Backend", "Go"), job("Frontend", "React"));
        let (a_id, b_id) = (a.id, b.id);
        app.store.insert_job(a);
        app.store.insert_job(b);
        let applicant = uuid::Uuid::new_v4();

        let mut application_ids = Vec::new();
        for id in [a_id, b_id] {
            let response = send(
                &app,
                Method::POST,
                &format!("/api/v1/jobs/{id}/applications"),
                Some(json!({ "applicant_id": applicant })),
            )
            .await;
            application_ids.push(json_body(response).await["id"].as_str().unwrap().to_string());
        }
        let moved: uuid::Uuid = application_ids[1].parse().unwrap();
        app.store
            .update_application_status(moved, ApplicationStatus::Interview, Utc::now())
            .await
            .unwrap();

        let dashboard = json_body(
            send(
                &app,
                Method::GET,
                &format!("/api/v1/applications?applicant_id={applicant}&status=interview"),
                None,
            )
            .await,
        )
        .await;
        assert_eq!(dashboard["applications"].as_array().unwrap().len(), 1);
        assert_eq!(dashboard["applications"][0]["job"]["title"], "Frontend");
        assert_eq!(dashboard["status_counts"][0]["status"], "applied");
        assert_eq!(dashboard["status_counts"][0]["count"], 1);
        assert_eq!(dashboard["status_counts"][2]["count"], 1);

        let detail_uri = format!("/api/v1/applications/{}", application_ids[0]);
        let own = send(&app, Method::GET, &format!("{detail_uri}?applicant_id={applicant}"), None).await;
        assert_eq!(own.status(), StatusCode::OK);
        assert_eq!(json_body(own).await["job"]["title"], "Backend");

        let someone_else = uuid::Uuid::new_v4();
        let foreign =
            send(&app, Method::GET, &format!("{detail_uri}?applicant_id={someone_else}"), None).await;
        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pipeline_is_for_the_poster_only() {
        let app = app_under_test();
        let hr = recruiter("hr");
        let other = recruiter("other");
        let mut posting = job("Backend", "Go");
        posting.posted_by = hr.user_id;
        let (hr_id, other_id, job_id) = (hr.id, other.id, posting.id);
        app.store.insert_profile(hr);
        app.store.insert_profile(other);
        app.store.insert_job(posting);
        app.store.insert_application(job_id, uuid::Uuid::new_v4());

        let own = send(
            &app,
            Method::GET,
            &format!("/api/v1/jobs/{job_id}/pipeline?recruiter_id={hr_id}"),
            None,
        )
        .await;
        assert_eq!(own.status(), StatusCode::OK);
        let body = json_body(own).await;
        assert_eq!(body["stages"].as_array().unwrap().len(), 5);
        assert_eq!(body["stages"][0]["status"], "applied");
        assert_eq!(body["stages"][0]["applications"].as_array().unwrap().len(), 1);

        let foreign = send(
            &app,
            Method::GET,
            &format!("/api/v1/jobs/{job_id}/pipeline?recruiter_id={other_id}"),
            None,
        )
        .await;
        assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_recommendations_are_for_seekers_only() {
        let app = app_under_test();
        let hr = recruiter("hr");
        let amy = seeker("amy", "Go");
        let (hr_id, amy_id) = (hr.id, amy.id);
        app.store.insert_profile(hr);
        app.store.insert_profile(amy);
        app.store.insert_job(job("Backend", "Go"));

        let for_recruiter = send(
            &app,
            Method::GET,
            &format!("/api/v1/profiles/{hr_id}/recommendations"),
            None,
        )
        .await;
        assert_eq!(for_recruiter.status(), StatusCode::FORBIDDEN);

        let for_seeker = send(
            &app,
            Method::GET,
            &format!("/api/v1/profiles/{amy_id}/recommendations"),
            None,
        )
        .await;
        assert_eq!(for_seeker.status(), StatusCode::OK);
        assert_eq!(json_body(for_seeker).await.as_array().unwrap().len(), 1);

        let zero_limit = send(
            &app,
            Method::GET,
            &format!("/api/v1/profiles/{amy_id}/recommendations?limit=0"),
            None,
        )
        .await;
        assert_eq!(zero_limit.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_public_profile_by_username_hides_private() {
        let app = app_under_test();
        let amy = seeker("amy", "Go");
        let mut ghost = seeker("ghost", "Go");
        ghost.is_public = false;
        app.store.insert_profile(amy);
        app.store.insert_profile(ghost);

        let public = send(&app, Method::GET, "/api/v1/profiles/by-username/amy", None).await;
        assert_eq!(public.status(), StatusCode::OK);
        assert_eq!(json_body(public).await["username"], "amy");

        let private = send(&app, Method::GET, "/api/v1/profiles/by-username/ghost", None).await;
        assert_eq!(private.status(), StatusCode::NOT_FOUND);
    }
}
