//! In-memory stand-in for the Pushwoosh JSON API.
//!
//! Serves `POST /json/1.3/{method}` for the seven methods the client uses.
//! Like the real service it always answers HTTP 200 and reports failures
//! through `status_code` / `status_message` in the reply envelope.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_PREFIX: &str = "/json/1.3";
pub const DEFAULT_APPLICATION: &str = "MOCK0-00000";
pub const DEFAULT_AUTH: &str = "mock-auth-token";

const ARGUMENT_ERROR: i64 = 210;

/// Reply wrapper, same shape as the real API's.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub status_code: i64,
    pub status_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl Envelope {
    fn ok(response: Option<Value>) -> Self {
        Self {
            status_code: 200,
            status_message: "OK".to_string(),
            response,
        }
    }

    fn error(status_code: i64, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status_message: message.into(),
            response: None,
        }
    }
}

#[derive(Clone, Debug)]
struct StoredCluster {
    name: String,
    code: String,
    cooldown: u64,
}

#[derive(Clone, Debug)]
struct StoredZone {
    id: i64,
    cluster: Option<String>,
    name: String,
    lat: f64,
    lng: f64,
    cooldown: u64,
    range: u64,
    preset_code: Option<String>,
    content: Value,
}

#[derive(Debug, Default)]
pub struct Store {
    clusters: Vec<StoredCluster>,
    zones: BTreeMap<i64, StoredZone>,
    next_zone_id: i64,
    messages: Vec<Value>,
}

impl Store {
    /// Notifications accepted by `createMessage`, oldest first.
    pub fn messages(&self) -> &[Value] {
        &self.messages
    }
}

#[derive(Clone)]
struct AppState {
    application: Arc<str>,
    auth: Arc<str>,
    store: Arc<RwLock<Store>>,
}

#[derive(Deserialize)]
struct RequestWrapper {
    request: Map<String, Value>,
}

type Outcome = Result<Option<Value>, Envelope>;

/// Router accepting the default mock credentials.
pub fn app() -> Router {
    app_with_credentials(DEFAULT_APPLICATION, DEFAULT_AUTH)
}

pub fn app_with_credentials(application: &str, auth: &str) -> Router {
    app_with_store(application, auth, Arc::default())
}

/// Router sharing `store` with the caller, so tests can inspect what arrived.
pub fn app_with_store(application: &str, auth: &str, store: Arc<RwLock<Store>>) -> Router {
    let state = AppState {
        application: application.into(),
        auth: auth.into(),
        store,
    };
    Router::new()
        .route(&format!("{API_PREFIX}/{{method}}"), post(dispatch))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_credentials(
    listener: TcpListener,
    application: &str,
    auth: &str,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(application, auth)).await
}

async fn dispatch(
    State(state): State<AppState>,
    Path(method): Path<String>,
    body: String,
) -> Json<Envelope> {
    tracing::debug!(%method, "request received");

    let request = match serde_json::from_str::<RequestWrapper>(&body) {
        Ok(wrapper) => wrapper.request,
        Err(e) => return Json(Envelope::error(400, format!("Malformed request: {e}"))),
    };

    if request.get("application").and_then(Value::as_str) != Some(&*state.application)
        || request.get("auth").and_then(Value::as_str) != Some(&*state.auth)
    {
        return Json(Envelope::error(
            ARGUMENT_ERROR,
            "Access denied or application not found",
        ));
    }

    let mut store = state.store.write().await;
    let outcome = match method.as_str() {
        "createMessage" => create_message(&mut store, &request),
        "listGeoZoneClusters" => Ok(Some(list_clusters(&store))),
        "addGeoZoneCluster" => add_cluster(&mut store, &request),
        "deleteGeoZoneCluster" => delete_cluster(&mut store, &request),
        "listGeoZones" => Ok(Some(list_zones(&store))),
        "addGeoZone" => add_zones(&mut store, &request),
        "deleteGeoZone" => delete_zones(&mut store, &request),
        _ => Err(Envelope::error(404, "Unknown method")),
    };

    Json(match outcome {
        Ok(response) => Envelope::ok(response),
        Err(envelope) => envelope,
    })
}

fn argument_error(message: impl Into<String>) -> Envelope {
    Envelope::error(ARGUMENT_ERROR, message)
}

fn required<'a>(request: &'a Map<String, Value>, key: &str) -> Result<&'a Value, Envelope> {
    request
        .get(key)
        .ok_or_else(|| argument_error(format!("Missing argument: {key}")))
}

fn create_message(store: &mut Store, request: &Map<String, Value>) -> Outcome {
    let notifications = required(request, "notifications")?
        .as_array()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| argument_error("notifications must be a non-empty array"))?;

    let mut codes = Vec::with_capacity(notifications.len());
    for notification in notifications {
        if notification.get("content").is_none() {
            return Err(argument_error("Notification content is required"));
        }
        store.messages.push(notification.clone());
        codes.push(new_code());
    }
    Ok(Some(json!({ "Messages": codes })))
}

fn list_clusters(store: &Store) -> Value {
    let clusters: Vec<Value> = store
        .clusters
        .iter()
        .map(|c| {
            let zone_count = store
                .zones
                .values()
                .filter(|z| z.cluster.as_deref() == Some(c.code.as_str()))
                .count();
            json!({
                "name": c.name,
                "code": c.code,
                "cooldown": c.cooldown,
                "geozones": zone_count,
            })
        })
        .collect();
    json!({ "clusters": clusters })
}

fn add_cluster(store: &mut Store, request: &Map<String, Value>) -> Outcome {
    let name = required(request, "name")?
        .as_str()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| argument_error("Cluster name must be a non-empty string"))?;
    let cooldown = request.get("cooldown").and_then(Value::as_u64).unwrap_or(0);

    if store.clusters.iter().any(|c| c.name == name) {
        return Err(argument_error(format!("Cluster already exists: {name}")));
    }

    let code = new_code();
    store.clusters.push(StoredCluster {
        name: name.to_string(),
        code: code.clone(),
        cooldown,
    });
    Ok(Some(json!({ "GeoZoneCluster": code })))
}

fn delete_cluster(store: &mut Store, request: &Map<String, Value>) -> Outcome {
    let code = required(request, "geoZoneCluster")?
        .as_str()
        .ok_or_else(|| argument_error("geoZoneCluster must be a string"))?;

    let before = store.clusters.len();
    store.clusters.retain(|c| c.code != code);
    if store.clusters.len() == before {
        return Err(argument_error(format!("Cluster not found: {code}")));
    }
    for zone in store.zones.values_mut() {
        if zone.cluster.as_deref() == Some(code) {
            zone.cluster = None;
        }
    }
    Ok(None)
}

fn zone_json(zone: &StoredZone) -> Value {
    json!({
        "name": zone.name,
        "lat": zone.lat,
        "lng": zone.lng,
        "cooldown": zone.cooldown,
        "range": zone.range,
        "presetCode": zone.preset_code,
        "content": zone.content,
    })
}

fn list_zones(store: &Store) -> Value {
    let mut groups: Vec<Value> = store
        .clusters
        .iter()
        .map(|c| {
            let zones: Vec<Value> = store
                .zones
                .values()
                .filter(|z| z.cluster.as_deref() == Some(c.code.as_str()))
                .map(zone_json)
                .collect();
            json!({ "name": c.name, "geoZones": zones })
        })
        .collect();

    let loose: Vec<Value> = store
        .zones
        .values()
        .filter(|z| z.cluster.is_none())
        .map(zone_json)
        .collect();
    if !loose.is_empty() {
        groups.push(json!({ "name": "", "geoZones": loose }));
    }

    json!({ "clusters": groups })
}

fn coordinate(zone: &Map<String, Value>, key: &str) -> Result<f64, Envelope> {
    match zone.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| argument_error(format!("Invalid or missing zone {key}")))
}

fn add_zones(store: &mut Store, request: &Map<String, Value>) -> Outcome {
    let zones = required(request, "geozones")?
        .as_array()
        .ok_or_else(|| argument_error("geozones must be an array"))?;

    // Validate the whole batch before storing any of it.
    let mut staged = Vec::with_capacity(zones.len());
    for zone in zones {
        let zone = zone
            .as_object()
            .ok_or_else(|| argument_error("Each geozone must be an object"))?;

        let lat = coordinate(zone, "lat")?;
        let lng = coordinate(zone, "lng")?;
        let content = zone
            .get("content")
            .cloned()
            .ok_or_else(|| argument_error("Zone content is required"))?;
        let range = zone.get("range").and_then(Value::as_u64).unwrap_or(1000);
        if !(50..=1000).contains(&range) {
            return Err(argument_error(format!(
                "Zone range must be between 50 and 1000, got {range}"
            )));
        }
        let cluster = zone.get("cluster").and_then(Value::as_str).map(str::to_string);
        if let Some(code) = &cluster {
            if !store.clusters.iter().any(|c| &c.code == code) {
                return Err(argument_error(format!("Cluster not found: {code}")));
            }
        }

        staged.push(StoredZone {
            id: 0,
            cluster,
            name: zone
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("geozone")
                .to_string(),
            lat,
            lng,
            cooldown: zone.get("cooldown").and_then(Value::as_u64).unwrap_or(0),
            range,
            preset_code: zone
                .get("presetCode")
                .and_then(Value::as_str)
                .map(str::to_string),
            content,
        });
    }

    let mut ids = Vec::with_capacity(staged.len());
    for mut zone in staged {
        store.next_zone_id += 1;
        zone.id = store.next_zone_id;
        ids.push(zone.id);
        store.zones.insert(zone.id, zone);
    }
    Ok(Some(json!({ "GeoZones": ids })))
}

fn delete_zones(store: &mut Store, request: &Map<String, Value>) -> Outcome {
    let ids: Vec<i64> = required(request, "geozones")?
        .as_array()
        .and_then(|ids| ids.iter().map(Value::as_i64).collect())
        .ok_or_else(|| argument_error("geozones must be an array of ids"))?;

    if let Some(missing) = ids.iter().find(|id| !store.zones.contains_key(*id)) {
        return Err(argument_error(format!("Geozone not found: {missing}")));
    }
    for id in &ids {
        store.zones.remove(id);
    }
    Ok(None)
}

/// `XXXXX-XXXXX`, the shape Pushwoosh uses for application and cluster codes.
fn new_code() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}", &hex[..5], &hex[5..10])
}
