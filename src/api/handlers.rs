//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use super::AppState;
use super::types::{ApiError, api_error};
use crate::bos::{Overrides, ScenarioOutcome, ScenarioReport};

/// Runs one scenario against the loaded project with the posted overrides.
///
/// `POST /bos` → 200 + `ScenarioOutcome` JSON, validation errors included
/// `POST /bos` with a failing cost stage → 500 + `ErrorResponse`
pub async fn post_bos(
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<Overrides>,
) -> Result<Json<ScenarioOutcome>, ApiError> {
    let Some(template) = state.template.clone() else {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "no project loaded to run scenarios against",
        ));
    };
    info!(
        project_id = %template.project_id,
        overrides = overrides.len(),
        "API scenario requested"
    );

    let worker = Arc::clone(&state);
    let report =
        tokio::task::spawn_blocking(move || worker.runner.run_scenario(template, &overrides))
            .await
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(report.outcome))
}

/// Returns every batch outcome in run order.
///
/// `GET /scenarios` → 200 + `Vec<ScenarioReport>` JSON
pub async fn list_scenarios(State(state): State<Arc<AppState>>) -> Json<Vec<ScenarioReport>> {
    Json(state.reports.clone())
}

/// Returns one batch outcome by project ID.
///
/// `GET /scenarios/{id}` → 200 + `ScenarioOutcome` JSON, or 404 + `ErrorResponse`
pub async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ScenarioOutcome>, ApiError> {
    state
        .reports
        .iter()
        .find(|r| r.project_id == id)
        .map(|r| Json(r.outcome.clone()))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("unknown scenario \"{id}\"")))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::bos::inputs::{InputValue, keys};
    use crate::bos::modules::types::fixtures::reference_context;
    use crate::bos::weather::{HOURS_PER_YEAR, RawWeather};
    use crate::bos::{BosRunner, Manager, WeatherSource};

    fn make_test_state(with_template: bool) -> Arc<AppState> {
        let raw = RawWeather::new(
            (0..HOURS_PER_YEAR)
                .map(|_| vec!["10".into(), "1".into(), "180".into(), "6".into()])
                .collect(),
        );
        let runner = BosRunner::new(Manager::standard(), Some(WeatherSource::Table(raw)));

        let costed = runner
            .run_scenario(reference_context(), &Overrides::new())
            .unwrap();
        let mut small = reference_context();
        small.project_id = "ref_001".into();
        let rejected: Overrides = [(keys::NUM_TURBINES.to_string(), InputValue::Number(5.0))]
            .into_iter()
            .collect();
        let failed = runner.run_scenario(small, &rejected).unwrap();

        Arc::new(AppState::new(
            runner,
            with_template.then(reference_context),
            vec![costed, failed],
        ))
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post(json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/bos")
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_bos_returns_costs() {
        let app = router(make_test_state(true));
        let resp = app.oneshot(post("{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["total_bos_cost"].as_f64().unwrap() > 0.0);
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn post_bos_validation_errors_are_200() {
        let app = router(make_test_state(true));
        let resp = app
            .oneshot(post(r#"{"num_turbines": 5, "turbine_rating_MW": 0.05}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let errors = json["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn post_bos_without_project_returns_500() {
        let app = router(make_test_state(false));
        let resp = app.oneshot(post("{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn scenarios_lists_batch() {
        let app = router(make_test_state(true));
        let req = Request::builder()
            .uri("/scenarios")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[1]["project_id"], "ref_001");
    }

    #[tokio::test]
    async fn scenario_by_id() {
        let app = router(make_test_state(true));
        let req = Request::builder()
            .uri("/scenarios/ref_001")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(
            json["errors"][0]
                .as_str()
                .unwrap()
                .starts_with("Error in TurbineNumberError:")
        );
    }

    #[tokio::test]
    async fn unknown_scenario_returns_404() {
        let app = router(make_test_state(true));
        let req = Request::builder()
            .uri("/scenarios/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("nope"));
    }
}
