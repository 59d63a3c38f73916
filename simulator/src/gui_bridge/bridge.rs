use crate::gui_bridge::model::{HistoryModel, NotificationsModel};
use crate::views::{DashboardHandle, MonitorHandle, SystemHandle};
use chrono::Utc;
use gdscore::interface::DetectionHistoryRecord;
use gdscore::notify::{NotificationLog, Notifier};
use gdscore::prelude::SimResult;
use gdscore::settings::Settings;
use gdscore::simulation::history::{ConfidenceFilter, DirectionFilter};
use gdscore::simulation::{query_history, HistoryQuery, HistoryStats};
use gdscore::telemetry::LogManager;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
};
use warp::{
    http::StatusCode,
    reply::{Json, WithStatus},
    Filter,
};

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Everything the HTTP routes read from or write to.
#[derive(Clone)]
pub struct BridgeState {
    pub dashboard: DashboardHandle,
    pub monitor: MonitorHandle,
    pub system: SystemHandle,
    pub history: Arc<Vec<DetectionHistoryRecord>>,
    pub settings: Arc<RwLock<Settings>>,
    pub notifications: Arc<NotificationLog>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct HistoryParams {
    search: Option<String>,
    confidence: Option<String>,
    direction: Option<String>,
    page: Option<usize>,
}

impl HistoryParams {
    fn to_query(&self) -> Result<HistoryQuery, String> {
        Ok(HistoryQuery {
            search: self.search.clone().unwrap_or_default(),
            confidence: self
                .confidence
                .as_deref()
                .unwrap_or("all")
                .parse::<ConfidenceFilter>()?,
            direction: self
                .direction
                .as_deref()
                .unwrap_or("all")
                .parse::<DirectionFilter>()?,
            page: self.page.unwrap_or(1),
        })
    }
}

fn error_reply(status: StatusCode, message: &str) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

fn respond<T: Serialize>(result: SimResult<T>) -> WithStatus<Json> {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), StatusCode::OK),
        Err(err) => error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

fn history_reply(state: &BridgeState, params: &HistoryParams) -> WithStatus<Json> {
    let query = match params.to_query() {
        Ok(query) => query,
        Err(message) => return error_reply(StatusCode::BAD_REQUEST, &message),
    };
    let page = query_history(&state.history, &query);
    let stats = HistoryStats::compute(&state.history, Utc::now());
    respond(Ok(HistoryModel::new(page, stats)))
}

fn settings_reply(state: &BridgeState) -> WithStatus<Json> {
    match state.settings.read() {
        Ok(settings) => respond(Ok(settings.clone())),
        Err(_) => error_reply(StatusCode::INTERNAL_SERVER_ERROR, "settings lock poisoned"),
    }
}

fn save_settings(state: &BridgeState, settings: Settings) -> WithStatus<Json> {
    if let Err(err) = settings.validate() {
        return error_reply(StatusCode::BAD_REQUEST, &err.to_string());
    }
    let applied = state
        .dashboard
        .apply_settings(&settings)
        .and_then(|_| state.monitor.apply_settings(&settings));
    if let Err(err) = applied {
        return error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string());
    }
    match state.settings.write() {
        Ok(mut guard) => *guard = settings,
        Err(_) => {
            return error_reply(StatusCode::INTERNAL_SERVER_ERROR, "settings lock poisoned")
        }
    }
    state.notifications.notify(Settings::save_notification());
    respond(Ok(json!({ "status": "ok" })))
}

/// HTTP front for the live views, the history fixture and the settings.
pub struct GuiBridge {
    state: BridgeState,
    logger: LogManager,
}

impl GuiBridge {
    pub fn new(state: BridgeState) -> Self {
        Self {
            state,
            logger: LogManager::new("bridge"),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());

        let dashboard = warp::path!("dashboard")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: BridgeState| respond(state.dashboard.snapshot()));

        let monitor = warp::path!("monitor")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: BridgeState| respond(state.monitor.snapshot()));

        let system = warp::path!("system")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: BridgeState| respond(state.system.snapshot()));

        let history = warp::path!("history")
            .and(warp::get())
            .and(warp::query::<HistoryParams>())
            .and(state_filter.clone())
            .map(|params: HistoryParams, state: BridgeState| history_reply(&state, &params));

        let get_settings = warp::path!("settings")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: BridgeState| settings_reply(&state));

        let post_settings = warp::path!("settings")
            .and(warp::post())
            .and(warp::body::content_length_limit(16 * 1024))
            .and(warp::body::json())
            .and(state_filter.clone())
            .map(|settings: Settings, state: BridgeState| save_settings(&state, settings));

        let test_settings = warp::path!("settings" / "test" / String)
            .and(warp::post())
            .and(state_filter.clone())
            .map(|kind: String, state: BridgeState| {
                state.notifications.notify(Settings::test_notification(&kind));
                respond(Ok(json!({ "status": "ok" })))
            });

        let notifications = warp::path!("notifications")
            .and(warp::get())
            .and(state_filter)
            .map(|state: BridgeState| {
                respond(Ok(NotificationsModel {
                    notifications: state.notifications.recent(),
                }))
            });

        dashboard
            .or(monitor)
            .or(system)
            .or(history)
            .or(get_settings)
            .or(post_settings)
            .or(test_settings)
            .or(notifications)
    }

    /// Serves until the surrounding task is dropped.
    pub async fn run(self, addr: SocketAddr) {
        self.publish_status(&format!("HTTP bridge listening on http://{addr}"));
        warp::serve(self.routes()).run(addr).await;
    }

    pub fn publish_status(&self, message: &str) {
        self.logger.record(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fixture::{build_history_fixture, FixtureConfig};
    use crate::gui_bridge::model::{DashboardModel, MonitorModel, SystemModel};
    use crate::views::{DashboardView, MonitorView, SystemView};
    use gdscore::interface::AlertStatus;
    use gdscore::simulation::ResetPolicy;

    struct Harness {
        bridge: GuiBridge,
        notifications: Arc<NotificationLog>,
        settings: Arc<RwLock<Settings>>,
        _views: (DashboardView, MonitorView, SystemView),
    }

    fn harness() -> Harness {
        let settings = Settings::default();
        let notifications = Arc::new(NotificationLog::default());
        let dashboard =
            DashboardView::new(&settings, 0.05, ResetPolicy::Independent, 1, notifications.clone());
        let monitor = MonitorView::new(&settings, 2);
        let system = SystemView::new(3);
        let shared_settings = Arc::new(RwLock::new(settings));
        let state = BridgeState {
            dashboard: dashboard.handle(),
            monitor: monitor.handle(),
            system: system.handle(),
            history: Arc::new(build_history_fixture(&FixtureConfig::default(), Utc::now())),
            settings: shared_settings.clone(),
            notifications: notifications.clone(),
        };
        Harness {
            bridge: GuiBridge::new(state),
            notifications,
            settings: shared_settings,
            _views: (dashboard, monitor, system),
        }
    }

    #[tokio::test]
    async fn view_routes_serve_snapshots() {
        let h = harness();
        let routes = h.bridge.routes();

        let res = warp::test::request().path("/dashboard").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);
        let dashboard: DashboardModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(dashboard.status, AlertStatus::Safe);
        assert_eq!(dashboard.detection_direction, None);
        assert_eq!(dashboard.microphone_count, 4);

        let res = warp::test::request().path("/monitor").reply(&routes).await;
        let monitor: MonitorModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(monitor.models.len(), 3);
        assert_eq!(monitor.required, 2);

        let res = warp::test::request().path("/system").reply(&routes).await;
        let system: SystemModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(system.uptime, "5d 22h");
        assert_eq!(system.logs.len(), 5);
    }

    #[tokio::test]
    async fn history_route_pages_and_filters() {
        let h = harness();
        let routes = h.bridge.routes();

        let res = warp::test::request()
            .path("/history?page=3")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: HistoryModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(page.records.len(), 5);
        assert_eq!(page.total_filtered, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.stats.total, 25);

        let res = warp::test::request()
            .path("/history?confidence=high&direction=north")
            .reply(&routes)
            .await;
        let page: HistoryModel = serde_json::from_slice(res.body()).unwrap();
        assert!(page
            .records
            .iter()
            .all(|r| r.confidence >= 80.0 && (r.direction >= 315.0 || r.direction <= 45.0)));

        let res = warp::test::request()
            .path("/history?page=18446744073709551615")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: HistoryModel = serde_json::from_slice(res.body()).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_filtered, 25);

        let res = warp::test::request()
            .path("/history?direction=up")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn settings_round_trip_and_notify() {
        let h = harness();
        let routes = h.bridge.routes();

        let mut updated = Settings::default();
        updated.detection.ensemble_voting = 3;
        let res = warp::test::request()
            .method("POST")
            .path("/settings")
            .json(&updated)
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(h.settings.read().unwrap().detection.ensemble_voting, 3);
        assert_eq!(h.notifications.recent()[0].notification.title, "Settings Saved");

        let res = warp::test::request().path("/monitor").reply(&routes).await;
        let monitor: MonitorModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(monitor.required, 3);

        let res = warp::test::request().path("/settings").reply(&routes).await;
        let fetched: Settings = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected_unchanged() {
        let h = harness();
        let routes = h.bridge.routes();

        let mut bad = Settings::default();
        bad.microphones.microphone_count = 0;
        let res = warp::test::request()
            .method("POST")
            .path("/settings")
            .json(&bad)
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*h.settings.read().unwrap(), Settings::default());
        assert!(h.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_action_raises_notification() {
        let h = harness();
        let routes = h.bridge.routes();
        let res = warp::test::request()
            .method("POST")
            .path("/settings/test/Email")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = warp::test::request()
            .path("/notifications")
            .reply(&routes)
            .await;
        let model: NotificationsModel = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(model.notifications[0].notification.title, "Email Test");
    }
}
