use chrono::{DateTime, Utc};
use gdscore::interface::{AlertStatus, DetectionEvent, DetectionHistoryRecord, ModelPrediction};
use gdscore::notify::NotificationEntry;
use gdscore::settings::{NumericField, RadarTheme, Settings};
use gdscore::simulation::radar::polar_to_screen;
use gdscore::simulation::waveform::plot_points;
use gdscore::simulation::{AudioFeatures, HistoryStats, LogLevel, SystemLogEntry, SystemMetrics};
use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Size, Subscription, Task, Theme,
};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Gunshot Detection Dashboard".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_millis(250)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Dashboard,
    Monitor,
    History,
    System,
    Settings,
}

#[derive(Debug)]
struct Visualizer {
    client: Client,
    page: Page,
    dashboard: Option<DashboardPayload>,
    monitor: Option<MonitorPayload>,
    history: Option<HistoryPayload>,
    system: Option<SystemPayload>,
    latest_notification: Option<NotificationEntry>,
    history_filter: HistoryFilter,
    settings: Settings,
    settings_form: Vec<(NumericField, String)>,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    Navigate(Page),
    DashboardFetched(Result<DashboardPayload, String>),
    MonitorFetched(Result<MonitorPayload, String>),
    HistoryFetched(Result<HistoryPayload, String>),
    SystemFetched(Result<SystemPayload, String>),
    NotificationsFetched(Result<NotificationsPayload, String>),
    SearchChanged(String),
    ConfidenceSelected(&'static str),
    DirectionSelected(&'static str),
    PageChanged(usize),
    SettingsFetched(Result<Settings, String>),
    SettingChanged(NumericField, String),
    SettingToggled(ToggleField),
    TextSettingChanged(TextField, String),
    ThemeSelected(RadarTheme),
    SubmitSettings,
    SettingsSubmitted(Result<String, String>),
    TestNotification(&'static str),
    TestSent(Result<String, String>),
}

#[derive(Debug, Clone, Copy)]
enum ToggleField {
    EmailEnabled,
    SmsEnabled,
    AutoRefresh,
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    EmailRecipients,
    PhoneNumbers,
}

/// Query parameters of `GET /history`.
#[derive(Debug, Clone, Serialize)]
struct HistoryFilter {
    search: String,
    confidence: &'static str,
    direction: &'static str,
    page: usize,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            confidence: "all",
            direction: "all",
            page: 1,
        }
    }
}

fn settings_form(settings: &Settings) -> Vec<(NumericField, String)> {
    NumericField::ALL
        .iter()
        .map(|field| (*field, settings.get(*field).to_string()))
        .collect()
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let settings = Settings::default();
        let state = Visualizer {
            client: Client::new(),
            page: Page::Dashboard,
            dashboard: None,
            monitor: None,
            history: None,
            system: None,
            latest_notification: None,
            history_filter: HistoryFilter::default(),
            settings_form: settings_form(&settings),
            settings,
            status: "Waiting for the simulator bridge...".into(),
        };
        let task = Task::batch([
            Task::perform(fetch_json(state.get("/dashboard")), Message::DashboardFetched),
            Task::perform(fetch_json(state.get("/settings")), Message::SettingsFetched),
        ]);
        (state, task)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(format!("{BRIDGE_URL}{path}"))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(format!("{BRIDGE_URL}{path}"))
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                let page = match state.page {
                    Page::Dashboard if state.settings.interface.auto_refresh => Task::perform(
                        fetch_json(state.get("/dashboard")),
                        Message::DashboardFetched,
                    ),
                    Page::Monitor => {
                        Task::perform(fetch_json(state.get("/monitor")), Message::MonitorFetched)
                    }
                    Page::System => {
                        Task::perform(fetch_json(state.get("/system")), Message::SystemFetched)
                    }
                    _ => Task::none(),
                };
                let notifications = Task::perform(
                    fetch_json(state.get("/notifications")),
                    Message::NotificationsFetched,
                );
                Task::batch([page, notifications])
            }
            Message::Navigate(page) => {
                state.page = page;
                match page {
                    Page::History => state.fetch_history(),
                    Page::System => {
                        Task::perform(fetch_json(state.get("/system")), Message::SystemFetched)
                    }
                    Page::Settings => {
                        Task::perform(fetch_json(state.get("/settings")), Message::SettingsFetched)
                    }
                    Page::Dashboard | Page::Monitor => Task::none(),
                }
            }
            Message::DashboardFetched(Ok(payload)) => {
                state.status = format!(
                    "System status: {} | {} microphones",
                    payload.status.label(),
                    payload.microphone_count
                );
                state.dashboard = Some(payload);
                Task::none()
            }
            Message::MonitorFetched(Ok(payload)) => {
                state.monitor = Some(payload);
                Task::none()
            }
            Message::HistoryFetched(Ok(payload)) => {
                state.history = Some(payload);
                Task::none()
            }
            Message::SystemFetched(Ok(payload)) => {
                state.system = Some(payload);
                Task::none()
            }
            Message::NotificationsFetched(Ok(payload)) => {
                state.latest_notification = payload.notifications.into_iter().next();
                Task::none()
            }
            Message::DashboardFetched(Err(err))
            | Message::MonitorFetched(Err(err))
            | Message::HistoryFetched(Err(err))
            | Message::SystemFetched(Err(err))
            | Message::NotificationsFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::SearchChanged(value) => {
                state.history_filter.search = value;
                state.history_filter.page = 1;
                state.fetch_history()
            }
            Message::ConfidenceSelected(value) => {
                state.history_filter.confidence = value;
                state.history_filter.page = 1;
                state.fetch_history()
            }
            Message::DirectionSelected(value) => {
                state.history_filter.direction = value;
                state.history_filter.page = 1;
                state.fetch_history()
            }
            Message::PageChanged(page) => {
                state.history_filter.page = page.max(1);
                state.fetch_history()
            }
            Message::SettingsFetched(Ok(settings)) => {
                state.settings_form = settings_form(&settings);
                state.settings = settings;
                Task::none()
            }
            Message::SettingsFetched(Err(err)) => {
                state.status = format!("Settings error: {err}");
                Task::none()
            }
            Message::SettingChanged(field, value) => {
                if let Some(entry) = state.settings_form.iter_mut().find(|(f, _)| *f == field) {
                    entry.1 = value;
                }
                Task::none()
            }
            Message::SettingToggled(field) => {
                let flag = match field {
                    ToggleField::EmailEnabled => &mut state.settings.notifications.email_enabled,
                    ToggleField::SmsEnabled => &mut state.settings.notifications.sms_enabled,
                    ToggleField::AutoRefresh => &mut state.settings.interface.auto_refresh,
                };
                *flag = !*flag;
                Task::none()
            }
            Message::TextSettingChanged(field, value) => {
                let notifications = &mut state.settings.notifications;
                match field {
                    TextField::EmailRecipients => notifications.email_recipients = value,
                    TextField::PhoneNumbers => notifications.phone_numbers = value,
                }
                Task::none()
            }
            Message::ThemeSelected(theme) => {
                state.settings.interface.radar_theme = theme;
                Task::none()
            }
            Message::SubmitSettings => {
                let mut draft = state.settings.clone();
                let errors: Vec<String> = state
                    .settings_form
                    .iter()
                    .filter_map(|(field, input)| draft.apply_input(*field, input).err())
                    .map(|err| err.to_string())
                    .collect();
                state.settings_form = settings_form(&draft);
                if !errors.is_empty() {
                    state.status = errors.join("; ");
                    return Task::none();
                }
                state.settings = draft.clone();
                let request = state.post("/settings").json(&draft);
                Task::perform(send(request, "Settings saved"), Message::SettingsSubmitted)
            }
            Message::SettingsSubmitted(Ok(message)) | Message::TestSent(Ok(message)) => {
                state.status = message;
                Task::none()
            }
            Message::SettingsSubmitted(Err(err)) | Message::TestSent(Err(err)) => {
                state.status = format!("Settings error: {err}");
                Task::none()
            }
            Message::TestNotification(kind) => {
                let request = state.post(&format!("/settings/test/{kind}"));
                Task::perform(send(request, "Test requested"), Message::TestSent)
            }
        }
    }

    fn fetch_history(&self) -> Task<Message> {
        let request = self.get("/history").query(&self.history_filter);
        Task::perform(fetch_json(request), Message::HistoryFetched)
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let nav = row![
            button("Dashboard").on_press(Message::Navigate(Page::Dashboard)),
            button("Live Monitor").on_press(Message::Navigate(Page::Monitor)),
            button("History").on_press(Message::Navigate(Page::History)),
            button("System").on_press(Message::Navigate(Page::System)),
            button("Settings").on_press(Message::Navigate(Page::Settings)),
        ]
        .spacing(8);

        let latest = match &state.latest_notification {
            Some(entry) => format!(
                "{} {}: {}",
                entry.at.format("%H:%M:%S"),
                entry.notification.title,
                entry.notification.description
            ),
            None => "No notifications".into(),
        };

        let body = match state.page {
            Page::Dashboard => state.dashboard_view(),
            Page::Monitor => state.monitor_view(),
            Page::History => state.history_view(),
            Page::System => state.system_view(),
            Page::Settings => state.settings_view(),
        };

        let layout = column![nav, text(&state.status).size(14), text(latest).size(14), body]
            .spacing(16)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn dashboard_view(&self) -> Element<'_, Message> {
        let Some(payload) = &self.dashboard else {
            return text("No dashboard data yet").size(18).into();
        };

        let header = match (payload.status, payload.detection_direction) {
            (AlertStatus::Alert, Some(direction)) => {
                format!("ALERT | direction {direction:.0}°")
            }
            (status, _) => status.label().to_string(),
        };
        let last_processed = payload
            .last_processed
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".into());

        let radar = Canvas::new(RadarScope {
            sweep_angle: payload.sweep_angle,
            detection: payload.detection_direction,
            palette: RadarPalette::for_theme(self.settings.interface.radar_theme),
        })
        .width(Length::Fixed(320.0))
        .height(Length::Fixed(320.0));

        let waveform = Canvas::new(Waveform {
            samples: payload.waveform.clone(),
            bars: payload.bar_heights.clone(),
            alert: payload.waveform_alert,
        })
        .width(Length::Fill)
        .height(Length::Fixed(220.0));

        let recent = if payload.recent_detections.is_empty() {
            Column::new().push(text("No recent detections").size(12))
        } else {
            payload
                .recent_detections
                .iter()
                .fold(Column::new().spacing(4), |col, event| {
                    col.push(
                        text(format!(
                            "{} | {:.1}% | {:.0}°",
                            event.timestamp.format("%H:%M:%S"),
                            event.confidence,
                            event.direction
                        ))
                        .size(12),
                    )
                })
        };

        column![
            text(header).size(26),
            text(format!("Last processed: {last_processed}")).size(12),
            row![radar, waveform].spacing(20).align_y(Alignment::Start),
            text("Recent detections").size(16),
            Container::new(scrollable(recent).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .into()
    }

    fn monitor_view(&self) -> Element<'_, Message> {
        let Some(payload) = &self.monitor else {
            return text("No monitor data yet").size(18).into();
        };

        let gauges = payload
            .models
            .iter()
            .fold(Column::new().spacing(6), |col, model| {
                col.push(
                    text(format!(
                        "{:<14} {:>5.1}%  {}",
                        model.name,
                        model.confidence,
                        model.badge()
                    ))
                    .size(14),
                )
            });

        let verdict = if payload.alert {
            "GUNSHOT CONFIRMED"
        } else {
            "No threat"
        };

        column![
            text("Ensemble").size(26),
            gauges,
            text(format!(
                "{} of {} models above {:.0}% (need {})",
                payload.activated,
                payload.models.len(),
                payload.threshold,
                payload.required
            ))
            .size(14),
            text(format!("Ensemble score {:.1}% | {verdict}", payload.score)).size(18),
            text(format!(
                "Volume {:.3} | dominant {:.0} Hz | sharp changes {}",
                payload.features.volume,
                payload.features.dominant_frequency_hz,
                payload.features.sharp_changes
            ))
            .size(12),
        ]
        .spacing(10)
        .into()
    }

    fn history_view(&self) -> Element<'_, Message> {
        let filter = &self.history_filter;
        let confidence = ["all", "high", "medium", "low"].into_iter().fold(
            row![text("Confidence").size(12)].spacing(6),
            |row, value| {
                let choice = button(text(value).size(12));
                row.push(choice.on_press(Message::ConfidenceSelected(value)))
            },
        );
        let direction = ["all", "north", "east", "south", "west"].into_iter().fold(
            row![text("Direction").size(12)].spacing(6),
            |row, value| {
                let choice = button(text(value).size(12));
                row.push(choice.on_press(Message::DirectionSelected(value)))
            },
        );

        let mut content = column![
            text_input("Search by id or date", &filter.search)
                .on_input(Message::SearchChanged)
                .padding(6),
            confidence,
            direction,
            text(format!(
                "Filters: confidence={} direction={}",
                filter.confidence, filter.direction
            ))
            .size(12),
        ]
        .spacing(8);

        if let Some(payload) = &self.history {
            let stats = &payload.stats;
            let average = stats
                .average_direction
                .map(|d| format!("{d}°"))
                .unwrap_or_else(|| "-".into());
            content = content.push(
                text(format!(
                    "Total {} | high confidence {} | this week {} | \
                     avg direction {} | most common {}",
                    stats.total,
                    stats.high_confidence,
                    stats.this_week,
                    average,
                    stats.most_common.map(|c| c.label()).unwrap_or("-"),
                ))
                .size(12),
            );

            let rows = payload
                .records
                .iter()
                .fold(Column::new().spacing(4), |col, record| {
                    col.push(
                        text(format!(
                            "{} | {} | {:.1}% ({}) | {:.0}° {} | {:.1}s | {}/3 models",
                            record.id,
                            record.date_label(),
                            record.confidence,
                            record.band().label(),
                            record.direction,
                            record.compass().label(),
                            record.duration,
                            record.models_activated
                        ))
                        .size(12),
                    )
                });
            let table = scrollable(rows).height(Length::Fixed(300.0));
            content = content.push(Container::new(table));

            let previous = button("Previous");
            let previous = if payload.page > 1 {
                previous.on_press(Message::PageChanged(payload.page - 1))
            } else {
                previous
            };
            let next = button("Next");
            let next = if payload.page < payload.total_pages {
                next.on_press(Message::PageChanged(payload.page + 1))
            } else {
                next
            };
            content = content.push(
                row![
                    previous,
                    text(format!(
                        "Page {} of {} ({} matching)",
                        payload.page, payload.total_pages, payload.total_filtered
                    ))
                    .size(12),
                    next
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );
        }

        content.into()
    }

    fn system_view(&self) -> Element<'_, Message> {
        let Some(payload) = &self.system else {
            return text("No system data yet").size(18).into();
        };
        let metrics = &payload.metrics;

        let roster = payload
            .roster
            .iter()
            .fold(Column::new().spacing(4), |col, model| {
                col.push(
                    text(format!(
                        "{:<14} {:>5.1}%  {}",
                        model.name, model.accuracy, model.status
                    ))
                    .size(14),
                )
            });

        let logs = payload
            .logs
            .iter()
            .fold(Column::new().spacing(4), |col, entry| {
                let level = match entry.level {
                    LogLevel::Info => "INFO",
                    LogLevel::Warning => "WARN",
                    LogLevel::Error => "ERROR",
                };
                col.push(
                    text(format!(
                        "{} [{level}] {}",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.message
                    ))
                    .size(12),
                )
            });

        column![
            text("System").size(26),
            text(format!(
                "CPU {:.1}% | memory {:.1}% | temperature {:.1}°C | disk {:.0}%",
                metrics.cpu, metrics.memory, metrics.temperature, metrics.disk_usage
            ))
            .size(14),
            text(format!("Uptime {}", payload.uptime)).size(14),
            text("Models").size(16),
            roster,
            text("System logs").size(16),
            Container::new(scrollable(logs).height(Length::Fixed(140.0))).padding(6),
        ]
        .spacing(10)
        .into()
    }

    fn settings_view(&self) -> Element<'_, Message> {
        let fields = self
            .settings_form
            .iter()
            .fold(Column::new().spacing(8), |col, (field, value)| {
                let (min, max) = field.range();
                let field = *field;
                let label = format!("{} ({min}-{max}, step {})", field.name(), field.step());
                col.push(
                    row![
                        text(label).size(12).width(Length::Fixed(280.0)),
                        text_input(field.name(), value)
                            .on_input(move |value| Message::SettingChanged(field, value))
                            .padding(6),
                    ]
                    .spacing(10)
                    .align_y(Alignment::Center),
                )
            });

        let notifications = &self.settings.notifications;
        let interface = &self.settings.interface;
        let alerts = column![
            text("Notifications").size(16),
            row![
                button(text(format!("Email alerts: {}", on_off(notifications.email_enabled))))
                    .on_press(Message::SettingToggled(ToggleField::EmailEnabled)),
                button("Test Email").on_press(Message::TestNotification("Email")),
            ]
            .spacing(8),
            text_input("Email recipients", &notifications.email_recipients)
                .on_input(|value| Message::TextSettingChanged(TextField::EmailRecipients, value))
                .padding(6),
            row![
                button(text(format!("SMS alerts: {}", on_off(notifications.sms_enabled))))
                    .on_press(Message::SettingToggled(ToggleField::SmsEnabled)),
                button("Test SMS").on_press(Message::TestNotification("SMS")),
            ]
            .spacing(8),
            text_input("Phone numbers", &notifications.phone_numbers)
                .on_input(|value| Message::TextSettingChanged(TextField::PhoneNumbers, value))
                .padding(6),
        ]
        .spacing(8);

        let themes = RadarTheme::ALL.into_iter().fold(
            row![text(format!("Radar theme: {}", interface.radar_theme.label())).size(12)]
                .spacing(6)
                .align_y(Alignment::Center),
            |row, theme| {
                let choice = button(text(theme.label()));
                row.push(choice.on_press(Message::ThemeSelected(theme)))
            },
        );

        let display = column![
            text("Interface").size(16),
            themes,
            button(text(format!("Auto-refresh dashboard: {}", on_off(interface.auto_refresh))))
                .on_press(Message::SettingToggled(ToggleField::AutoRefresh)),
            row![
                button("Test Microphones").on_press(Message::TestNotification("Microphone")),
                button("Calibrate").on_press(Message::TestNotification("Calibration")),
            ]
            .spacing(8),
        ]
        .spacing(8);

        let content = column![
            text("Settings").size(26),
            fields,
            alerts,
            display,
            button("Save settings")
                .on_press(Message::SubmitSettings)
                .padding(10),
        ]
        .spacing(14)
        .width(Length::Fixed(560.0));

        scrollable(content).into()
    }
}

async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(format!("{status}: {text}"));
    }
    response.json::<T>().await.map_err(|e| e.to_string())
}

async fn send(request: RequestBuilder, done: &'static str) -> Result<String, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(done.into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(format!("{status}: {text}"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DashboardPayload {
    status: AlertStatus,
    detection_direction: Option<f32>,
    sweep_angle: f32,
    waveform: Vec<f32>,
    bar_heights: Vec<f32>,
    waveform_alert: bool,
    recent_detections: Vec<DetectionEvent>,
    last_processed: Option<DateTime<Utc>>,
    microphone_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MonitorPayload {
    models: Vec<ModelPrediction>,
    activated: usize,
    required: usize,
    threshold: f32,
    score: f32,
    alert: bool,
    features: AudioFeatures,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    records: Vec<DetectionHistoryRecord>,
    #[serde(default)]
    page: usize,
    #[serde(default)]
    total_filtered: usize,
    #[serde(default)]
    total_pages: usize,
    stats: HistoryStats,
}

#[derive(Debug, Clone, Deserialize)]
struct RosterPayload {
    name: String,
    accuracy: f32,
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SystemPayload {
    metrics: SystemMetrics,
    #[serde(default)]
    uptime: String,
    #[serde(default)]
    roster: Vec<RosterPayload>,
    #[serde(default)]
    logs: Vec<SystemLogEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct NotificationsPayload {
    notifications: Vec<NotificationEntry>,
}

#[derive(Clone)]
struct RadarScope {
    sweep_angle: f32,
    detection: Option<f32>,
    palette: RadarPalette,
}

#[derive(Debug, Clone, Copy)]
struct RadarPalette {
    background: Color,
    grid: Color,
    sweep: Color,
    marker: Color,
}

impl RadarPalette {
    fn for_theme(theme: RadarTheme) -> Self {
        match theme {
            RadarTheme::Default => Self {
                background: Color::from_rgb(0.02, 0.04, 0.02),
                grid: Color::from_rgb(0.1, 0.35, 0.15),
                sweep: Color::from_rgb(0.2, 0.95, 0.4),
                marker: Color::from_rgb(0.95, 0.2, 0.2),
            },
            RadarTheme::Dark => Self {
                background: Color::from_rgb(0.01, 0.01, 0.01),
                grid: Color::from_rgb(0.2, 0.2, 0.22),
                sweep: Color::from_rgb(0.75, 0.75, 0.8),
                marker: Color::from_rgb(0.95, 0.3, 0.3),
            },
            RadarTheme::Tactical => Self {
                background: Color::from_rgb(0.06, 0.05, 0.0),
                grid: Color::from_rgb(0.4, 0.3, 0.05),
                sweep: Color::from_rgb(1.0, 0.75, 0.1),
                marker: Color::from_rgb(1.0, 0.15, 0.05),
            },
        }
    }
}

impl canvas::Program<Message> for RadarScope {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), self.palette.background);

        let center = (bounds.width / 2.0, bounds.height / 2.0);
        let origin = Point::new(center.0, center.1);
        let radius = bounds.width.min(bounds.height) / 2.0 - 12.0;
        let grid = self.palette.grid;

        for ring in 1..=4 {
            let ring_radius = radius * (ring as f32 / 4.0);
            let ring_path = Path::new(|builder| builder.circle(origin, ring_radius));
            frame.stroke(&ring_path, Stroke::default().with_color(grid));
        }

        let spokes = Path::new(|builder| {
            for degrees in [0.0, 90.0, 180.0, 270.0] {
                let (x, y) = polar_to_screen(center, radius, degrees);
                builder.move_to(origin);
                builder.line_to(Point::new(x, y));
            }
        });
        frame.stroke(&spokes, Stroke::default().with_color(grid).with_width(1.0));

        let (sx, sy) = polar_to_screen(center, radius, self.sweep_angle);
        let sweep = Path::line(origin, Point::new(sx, sy));
        frame.stroke(
            &sweep,
            Stroke::default()
                .with_width(2.5)
                .with_color(self.palette.sweep),
        );

        if let Some(direction) = self.detection {
            let (dx, dy) = polar_to_screen(center, radius * 0.7, direction);
            let marker = Path::new(|builder| builder.circle(Point::new(dx, dy), 7.0));
            frame.fill(&marker, self.palette.marker);
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct Waveform {
    samples: Vec<f32>,
    bars: Vec<f32>,
    alert: bool,
}

impl canvas::Program<Message> for Waveform {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let trace_height = bounds.height * 0.6;
        let color = if self.alert {
            Color::from_rgb(0.95, 0.3, 0.25)
        } else {
            Color::from_rgb(0.18, 0.72, 0.89)
        };

        let points = plot_points(&self.samples, bounds.width, trace_height);
        if points.len() > 1 {
            let path = Path::new(|builder| {
                for (i, (x, y)) in points.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(Point::new(*x, *y));
                    } else {
                        builder.line_to(Point::new(*x, *y));
                    }
                }
            });
            frame.stroke(&path, Stroke::default().with_width(2.0).with_color(color));
        }

        if !self.bars.is_empty() {
            let floor = bounds.height;
            let slot = bounds.width / self.bars.len() as f32;
            let max_bar = bounds.height - trace_height;
            for (i, height) in self.bars.iter().enumerate() {
                let h = height.min(max_bar);
                frame.fill_rectangle(
                    Point::new(i as f32 * slot + 1.0, floor - h),
                    Size::new((slot - 2.0).max(1.0), h),
                    color,
                );
            }
        }

        vec![frame.into_geometry()]
    }
}
