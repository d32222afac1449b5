use axum::{
    extract::{Json, Query, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use cyklomapa_search::binding::LocationSearchBinding;
use cyklomapa_search::config::Config;
use cyklomapa_search::geocoder::Nominatim;
use cyklomapa_search::models::SelectionEvent;
use cyklomapa_search::planner::Planner;
use cyklomapa_search::projection::Point;

struct AppState {
    binding: LocationSearchBinding,
    config: Config,
    planner: Mutex<Planner>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;
    let thread_count = config.thread_count.unwrap_or_else(num_cpus::get);

    info!("starting server with {} threads", thread_count);
    info!("map working projection is {}", config.projection.code());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(thread_count)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn log_request_response(
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    info!("incoming request: {} {}", method, path);
    let response = next.run(req).await;
    info!("request result: {} for {} {}", response.status(), method, path);
    response
}

async fn async_main(config: Config) -> anyhow::Result<()> {
    let http_client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()?;

    let geocoder = Nominatim::new(http_client, config.geocoder_url.clone(), config.viewbox);
    let binding = LocationSearchBinding::new(Box::new(geocoder), &config);
    // Markers exist from map initialisation on, parked at the origin until placed.
    let origin = Point::new(0.0, 0.0);
    let planner = Planner::new(config.projection, origin, origin);

    let addr = config.listen_addr.clone();
    let state = Arc::new(AppState {
        binding,
        config,
        planner: Mutex::new(planner),
    });

    let app = router(state);

    info!("listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/select", post(select))
        .route("/planner", get(planner_state))
        .route("/config", get(widget_options))
        .layer(middleware::from_fn(log_request_response))
        .with_state(state)
}

// --- Handlers ---

#[derive(Deserialize)]
struct SearchQuery {
    term: String,
    field: Option<String>,
}

async fn search(State(state): State<Arc<AppState>>, Query(query): Query<SearchQuery>) -> Response {
    let field = query.field.unwrap_or_default();
    let suggestions = state.binding.suggest(&field, query.term).await;
    Json(suggestions).into_response()
}

async fn select(State(state): State<Arc<AppState>>, Json(event): Json<SelectionEvent>) -> Response {
    if !event.in_range() {
        error!("rejected selection with coordinates {},{}", event.lat, event.lon);
        return (StatusCode::BAD_REQUEST, "lat must be within [-90, 90] and lon within [-180, 180]").into_response();
    }
    let mut planner = state.planner.lock().await;
    match state.binding.on_select(&event, planner.context()) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            error!("selection error: {}", e);
            (StatusCode::BAD_REQUEST, format!("error applying selection: {}", e)).into_response()
        }
    }
}

async fn planner_state(State(state): State<Arc<AppState>>) -> Response {
    let planner = state.planner.lock().await;
    Json(&*planner).into_response()
}

/// Options a page hands to its autocomplete widget.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetOptions<'a> {
    min_length: usize,
    delay: u64,
    auto_focus: bool,
    start_field: &'a str,
    finish_field: &'a str,
    zoom: u8,
}

async fn widget_options(State(state): State<Arc<AppState>>) -> Response {
    let config = &state.config;
    Json(WidgetOptions {
        min_length: config.min_length,
        delay: config.delay_ms,
        auto_focus: true,
        start_field: &config.start_field,
        finish_field: &config.finish_field,
        zoom: config.zoom,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn fake_nominatim() -> String {
        let app = Router::new().route(
            "/search",
            get(|| async {
                Json(json!([
                    {"display_name": "Prague Castle", "lat": "50.0911", "lon": "14.4016"}
                ]))
            }),
        );
        format!("{}/search", serve(app).await)
    }

    async fn spawn_service(geocoder_url: String) -> String {
        let config = Config {
            geocoder_url,
            ..Config::default()
        };
        let geocoder = Nominatim::new(Client::new(), config.geocoder_url.clone(), config.viewbox);
        let binding = LocationSearchBinding::new(Box::new(geocoder), &config);
        let origin = Point::new(0.0, 0.0);
        let planner = Planner::new(config.projection, origin, origin);
        let state = Arc::new(AppState {
            binding,
            config,
            planner: Mutex::new(planner),
        });
        serve(router(state)).await
    }

    async fn search(base: &str, term: &str) -> Vec<Value> {
        let resp = Client::new()
            .get(format!("{}/search", base))
            .query(&[("term", term), ("field", "jpStartStreetSearch")])
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        resp.json().await.unwrap()
    }

    #[tokio::test]
    async fn search_returns_suggestions() {
        let base = spawn_service(fake_nominatim().await).await;
        let suggestions = search(&base, "Prague Castle").await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0]["label"], "Prague Castle");
        assert_eq!(suggestions[0]["value"], "Prague Castle");
        assert_eq!(suggestions[0]["lat"], 50.0911);
        assert_eq!(suggestions[0]["lon"], 14.4016);
    }

    #[tokio::test]
    async fn search_too_short_is_empty() {
        let base = spawn_service(fake_nominatim().await).await;
        assert!(search(&base, "P").await.is_empty());
    }

    #[tokio::test]
    async fn search_with_failing_geocoder_is_empty() {
        let failing = Router::new().route("/search", get(|| async { StatusCode::BAD_GATEWAY }));
        let url = format!("{}/search", serve(failing).await);
        let base = spawn_service(url).await;
        assert!(search(&base, "Prague Castle").await.is_empty());
    }

    #[tokio::test]
    async fn superseded_search_is_empty() {
        let base = spawn_service(fake_nominatim().await).await;
        let first = tokio::spawn({
            let base = base.clone();
            async move { search(&base, "Prague").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = search(&base, "Prague Castle").await;

        assert!(first.await.unwrap().is_empty());
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn select_moves_marker_and_reports_planner() {
        let base = spawn_service(fake_nominatim().await).await;
        let client = Client::new();

        let resp = client
            .post(format!("{}/select", base))
            .json(&json!({"field": "jpStartStreetSearch", "lat": 50.0911, "lon": 14.4016}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let outcome: Value = resp.json().await.unwrap();
        assert_eq!(outcome["marker"], "start");
        assert_eq!(outcome["focused"], "jpFinishStreetSearch");
        assert_eq!(outcome["zoom"], 16);

        let planner: Value = client
            .get(format!("{}/planner", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(planner["focus"]["field"], "jpFinishStreetSearch");
        assert_eq!(planner["view"]["zoom"], 16);
        assert_eq!(planner["layer"]["features"], json!(["start", "end"]));
        assert_eq!(planner["layer"]["redraws"], 1);
        assert_eq!(planner["layer"]["end"]["geometry"], json!({"x": 0.0, "y": 0.0}));
        assert!(planner["route"]["start"]["x"].as_f64().unwrap() > 1_603_000.0);
        assert!(planner["route"]["end"].is_null());
    }

    #[tokio::test]
    async fn select_rejects_out_of_range_coordinates() {
        let base = spawn_service(fake_nominatim().await).await;
        let client = Client::new();

        let resp = client
            .post(format!("{}/select", base))
            .json(&json!({"field": "jpFinishStreetSearch", "lat": 50.0, "lon": 1e308}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let planner: Value = client
            .get(format!("{}/planner", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(planner["layer"]["end"]["geometry"], json!({"x": 0.0, "y": 0.0}));
        assert_eq!(planner["layer"]["redraws"], 0);
    }

    #[tokio::test]
    async fn select_rejects_malformed_body() {
        let base = spawn_service(fake_nominatim().await).await;
        let resp = Client::new()
            .post(format!("{}/select", base))
            .header("content-type", "application/json")
            .body(r#"{"field": "jpStartStreetSearch", "lat": "north"}"#)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn config_reports_widget_options() {
        let base = spawn_service(fake_nominatim().await).await;
        let options: Value = Client::new()
            .get(format!("{}/config", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            options,
            json!({
                "minLength": 2,
                "delay": 200,
                "autoFocus": true,
                "startField": "jpStartStreetSearch",
                "finishField": "jpFinishStreetSearch",
                "zoom": 16
            })
        );
    }
}
