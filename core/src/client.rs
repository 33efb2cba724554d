//! Pushwoosh API client.
//!
//! # Design
//! `PushwooshClient` owns the credentials, the API root and a `Transport`.
//! Every public operation shapes its body, then goes through `send`, which
//! wraps the body in the `{"request": {...}}` envelope, performs exactly one
//! round trip, and checks the reply against the success contract. Nothing is
//! retried or cached; the client carries no mutable state.
//!
//! `build_request` and `parse_response` are public so a host that wants to
//! run the HTTP call itself can skip the transport entirely.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::builder::{apply_zone_defaults, build_notification};
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{Error, RequestError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{Cluster, Content, ResponseEnvelope, ZoneGroup, ZoneSpec};

/// Cooldown used by `create_cluster` callers that have no preference.
pub const DEFAULT_CLUSTER_COOLDOWN: u64 = 60;

/// The remote methods this client calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateMessage,
    ListGeoZoneClusters,
    AddGeoZoneCluster,
    DeleteGeoZoneCluster,
    ListGeoZones,
    AddGeoZone,
    DeleteGeoZone,
}

impl Endpoint {
    pub const ALL: [Endpoint; 7] = [
        Endpoint::CreateMessage,
        Endpoint::ListGeoZoneClusters,
        Endpoint::AddGeoZoneCluster,
        Endpoint::DeleteGeoZoneCluster,
        Endpoint::ListGeoZones,
        Endpoint::AddGeoZone,
        Endpoint::DeleteGeoZone,
    ];

    /// Path segment appended to the API root.
    pub fn method(self) -> &'static str {
        match self {
            Endpoint::CreateMessage => "createMessage",
            Endpoint::ListGeoZoneClusters => "listGeoZoneClusters",
            Endpoint::AddGeoZoneCluster => "addGeoZoneCluster",
            Endpoint::DeleteGeoZoneCluster => "deleteGeoZoneCluster",
            Endpoint::ListGeoZones => "listGeoZones",
            Endpoint::AddGeoZone => "addGeoZone",
            Endpoint::DeleteGeoZone => "deleteGeoZone",
        }
    }
}

/// Blocking client for the Pushwoosh JSON API.
///
/// Safe to share for one call at a time; it holds no state beyond the
/// immutable credentials.
pub struct PushwooshClient<T = UreqTransport> {
    auth_token: String,
    application: String,
    base_url: String,
    transport: T,
}

impl<T> std::fmt::Debug for PushwooshClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushwooshClient")
            .field("auth_token", &"<REDACTED>")
            .field("application", &self.application)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PushwooshClient<UreqTransport> {
    /// Client against the production API with the default ureq transport.
    pub fn new(auth_token: impl Into<String>, application: impl Into<String>) -> Self {
        Self::with_transport(auth_token, application, UreqTransport::new())
    }

    /// Validate `config` and build a ureq-backed client from it.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(
            config.auth_token.clone(),
            config.application.clone(),
            UreqTransport::with_timeout(config.timeout()),
        )
        .with_base_url(&config.base_url))
    }
}

impl<T: Transport> PushwooshClient<T> {
    pub fn with_transport(
        auth_token: impl Into<String>,
        application: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            auth_token: auth_token.into(),
            application: application.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
        }
    }

    /// Point the client at another API root (a mock server, a proxy).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Push one notification to the application's devices right away.
    ///
    /// Returns the message codes the API assigned. The push counts as done
    /// once the envelope says so: a missing or oddly shaped `Messages` list
    /// yields whatever string codes it holds, possibly none.
    pub fn create_message(
        &self,
        content: &Content,
        params: Option<&Map<String, Value>>,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<String>> {
        let notification = build_notification(content, filters, params);
        let logged = serde_json::to_string(&notification)?;

        let mut body = Map::new();
        body.insert(
            "notifications".to_string(),
            Value::Array(vec![Value::Object(notification.into_map())]),
        );
        let envelope = self.send(Endpoint::CreateMessage, Some(body))?;

        tracing::info!(notification = %logged, "Notification pushed");
        Ok(message_codes(&envelope))
    }

    pub fn get_clusters(&self) -> Result<Vec<Cluster>> {
        let envelope = self.send(Endpoint::ListGeoZoneClusters, None)?;
        extract(&envelope, "clusters")
    }

    /// Create a zone cluster and return its code.
    ///
    /// `cooldown` is the silent period after a push, in seconds; pass
    /// `DEFAULT_CLUSTER_COOLDOWN` when there is no preference.
    pub fn create_cluster(&self, name: &str, cooldown: u64) -> Result<String> {
        let mut body = Map::new();
        body.insert("name".to_string(), Value::from(name));
        body.insert("cooldown".to_string(), Value::from(cooldown));
        let logged = Value::Object(body.clone());

        let envelope = self.send(Endpoint::AddGeoZoneCluster, Some(body))?;
        let cluster_id: String = extract(&envelope, "GeoZoneCluster")?;

        tracing::info!(body = %logged, id = %cluster_id, "Zone cluster created");
        Ok(cluster_id)
    }

    pub fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        let mut body = Map::new();
        body.insert("geoZoneCluster".to_string(), Value::from(cluster_id));
        self.send(Endpoint::DeleteGeoZoneCluster, Some(body))?;

        tracing::info!(id = %cluster_id, "Zone cluster deleted");
        Ok(())
    }

    /// All zones, grouped by the cluster they belong to.
    pub fn get_zones(&self) -> Result<Vec<ZoneGroup>> {
        let envelope = self.send(Endpoint::ListGeoZones, None)?;
        extract(&envelope, "clusters")
    }

    /// Create zones in one call and return their ids in submission order.
    ///
    /// Missing `name`, `range` and `cooldown` get local defaults; everything
    /// else, range bounds included, is validated by the API.
    pub fn create_zones(&self, zones: Vec<ZoneSpec>) -> Result<Vec<i64>> {
        let zones: Vec<ZoneSpec> = zones.into_iter().map(apply_zone_defaults).collect();

        let mut body = Map::new();
        body.insert("geozones".to_string(), serde_json::to_value(&zones)?);
        let logged = Value::Object(body.clone());

        let envelope = self.send(Endpoint::AddGeoZone, Some(body))?;
        let zone_ids: Vec<i64> = extract(&envelope, "GeoZones")?;

        tracing::info!(body = %logged, ids = ?zone_ids, "Zones created");
        Ok(zone_ids)
    }

    pub fn delete_zones(&self, zone_ids: &[i64]) -> Result<()> {
        let mut body = Map::new();
        body.insert("geozones".to_string(), Value::from(zone_ids.to_vec()));
        self.send(Endpoint::DeleteGeoZone, Some(body))?;

        tracing::info!(ids = ?zone_ids, "Zones deleted");
        Ok(())
    }

    /// One round trip: envelope, POST, parse, status check.
    pub fn send(
        &self,
        endpoint: Endpoint,
        body: Option<Map<String, Value>>,
    ) -> Result<ResponseEnvelope> {
        let request = self.build_request(endpoint, body)?;
        let response = self.transport.execute(request)?;
        tracing::debug!(
            endpoint = endpoint.method(),
            http_status = response.status,
            "Pushwoosh reply received"
        );
        self.parse_response(response)
    }

    /// `{"request": {"application", "auth", ...body}}`.
    ///
    /// Body fields are merged flat after the credentials, so a body key named
    /// `application` or `auth` would replace them.
    pub fn build_envelope(&self, body: Option<Map<String, Value>>) -> Value {
        let mut request = Map::new();
        request.insert("application".to_string(), Value::from(self.application.as_str()));
        request.insert("auth".to_string(), Value::from(self.auth_token.as_str()));
        if let Some(body) = body {
            request.extend(body);
        }

        let mut envelope = Map::new();
        envelope.insert("request".to_string(), Value::Object(request));
        Value::Object(envelope)
    }

    /// Serialize the envelope into a `POST` for `endpoint`.
    ///
    /// Non-ASCII text is written as UTF-8, not `\u` escapes.
    pub fn build_request(
        &self,
        endpoint: Endpoint,
        body: Option<Map<String, Value>>,
    ) -> Result<HttpRequest> {
        let body = serde_json::to_string(&self.build_envelope(body))?;
        Ok(HttpRequest {
            url: format!("{}/{}", self.base_url, endpoint.method()),
            headers: vec![(
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string(),
            )],
            body,
        })
    }

    /// Parse a reply and enforce `status_code == 200 && status_message == "OK"`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ResponseEnvelope> {
        let envelope: ResponseEnvelope = serde_json::from_str(&response.body).map_err(|e| {
            Error::Deserialization(format!(
                "HTTP {} reply is not an envelope: {e}",
                response.status
            ))
        })?;

        if !envelope.is_success() {
            return Err(RequestError::new(envelope).into());
        }
        Ok(envelope)
    }
}

/// Pull `response.<field>` out of a successful envelope.
fn extract<R: DeserializeOwned>(envelope: &ResponseEnvelope, field: &'static str) -> Result<R> {
    extract_optional(envelope, field)?.ok_or(Error::MissingField(field))
}

/// String entries of `response.Messages`; anything else is skipped.
fn message_codes(envelope: &ResponseEnvelope) -> Vec<String> {
    envelope
        .response
        .as_ref()
        .and_then(|r| r.get("Messages"))
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn extract_optional<R: DeserializeOwned>(
    envelope: &ResponseEnvelope,
    field: &'static str,
) -> Result<Option<R>> {
    match envelope.response.as_ref().and_then(|r| r.get(field)) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => R::deserialize(value)
            .map(Some)
            .map_err(|e| Error::Deserialization(format!("field `{field}`: {e}"))),
    }
}
