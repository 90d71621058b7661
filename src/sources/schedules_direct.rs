//! Schedules Direct JSON API client
//!
//! Every authenticated request is built explicitly with the session token
//! header; the token itself is requested once and memoised for the client's
//! lifetime.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::traits::{ListingsProvider, ServiceInfo};
use crate::config::{FetchConfig, ServiceConfig};
use crate::errors::{SourceError, SourceResult};
use crate::models::{LineupMapping, ProgramRecord, StationSchedule};

const USER_AGENT: &str = concat!("sd-xmltv/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScheduleRequest<'a> {
    #[serde(rename = "stationID")]
    station_id: &'a str,
    date: &'a [String],
}

pub struct SchedulesDirectClient {
    client: Client,
    base_url: String,
    username: String,
    password_sha1: String,
    verbose_map: bool,
    max_station_ids: usize,
    max_program_ids: usize,
    token: OnceCell<String>,
}

impl SchedulesDirectClient {
    pub fn new(service: &ServiceConfig, fetch: &FetchConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(service.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
            username: service.username.clone(),
            password_sha1: service.password_sha1(),
            verbose_map: service.verbose_map,
            max_station_ids: fetch.max_station_ids_per_request.max(1),
            max_program_ids: fetch.max_program_ids_per_request.max(1),
            token: OnceCell::new(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Session token, requested on first use
    pub async fn token(&self) -> SourceResult<&str> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .map(String::as_str)
    }

    async fn request_token(&self) -> SourceResult<String> {
        debug!("Requesting session token for user '{}'", self.username);
        let request = self.client.post(self.url("token")).json(&TokenRequest {
            username: &self.username,
            password: &self.password_sha1,
        });
        let response: TokenResponse = self.send_json("token", request).await?;

        let message = response.message.unwrap_or_default();
        match response.token {
            Some(token) if response.code == 0 && !token.is_empty() => {
                info!("Authenticated with Schedules Direct as '{}'", self.username);
                Ok(token)
            }
            _ => Err(SourceError::auth_failed(format!(
                "code {}: {}",
                response.code,
                if message.is_empty() { "no token returned" } else { message.as_str() }
            ))),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> SourceResult<RequestBuilder> {
        let token = self.token().await?;
        Ok(request.header("token", token))
    }

    async fn send_json<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> SourceResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::status(endpoint, status.as_u16(), body));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::invalid_response(endpoint, e.to_string()))
    }

    async fn get_authorized<T: DeserializeOwned>(&self, endpoint: &str) -> SourceResult<T> {
        let request = self.authorized(self.client.get(self.url(endpoint))).await?;
        self.send_json(endpoint, request).await
    }
}

#[async_trait]
impl ListingsProvider for SchedulesDirectClient {
    async fn channel_mapping(&self, lineup: &str) -> SourceResult<LineupMapping> {
        let endpoint = format!("lineups/{lineup}");
        let mut request = self.authorized(self.client.get(self.url(&endpoint))).await?;
        if self.verbose_map {
            request = request.header("verboseMap", "true");
        }
        let mapping: LineupMapping = self.send_json(&endpoint, request).await?;
        info!("Lineup {}: channels retrieved: {}", lineup, mapping.map.len());
        Ok(mapping)
    }

    async fn schedules(&self, station_ids: &[String], dates: &[String]) -> SourceResult<Vec<StationSchedule>> {
        let mut schedules = Vec::with_capacity(station_ids.len());
        for batch in station_ids.chunks(self.max_station_ids) {
            let body: Vec<ScheduleRequest<'_>> = batch
                .iter()
                .map(|station_id| ScheduleRequest {
                    station_id,
                    date: dates,
                })
                .collect();
            let request = self.authorized(self.client.post(self.url("schedules")).json(&body)).await?;
            let mut page: Vec<StationSchedule> = self.send_json("schedules", request).await?;
            debug!("Schedules batch: requested={} received={}", batch.len(), page.len());
            schedules.append(&mut page);
        }
        info!("Schedules retrieved: {}", schedules.len());
        Ok(schedules)
    }

    async fn programs(&self, program_ids: &[String]) -> SourceResult<Vec<ProgramRecord>> {
        info!("Programs requested: {}", program_ids.len());
        let mut programs = Vec::with_capacity(program_ids.len());
        for batch in program_ids.chunks(self.max_program_ids) {
            let request = self.authorized(self.client.post(self.url("programs")).json(batch)).await?;
            let mut page: Vec<ProgramRecord> = self.send_json("programs", request).await?;
            debug!("Programs batch: requested={} received={}", batch.len(), page.len());
            programs.append(&mut page);
        }
        info!("Programs retrieved: {}", programs.len());
        Ok(programs)
    }
}

#[async_trait]
impl ServiceInfo for SchedulesDirectClient {
    async fn status(&self) -> SourceResult<Value> {
        self.get_authorized("status").await
    }

    async fn lineups(&self) -> SourceResult<Value> {
        self.get_authorized("lineups").await
    }

    async fn headends(&self, country: &str, postal_code: &str) -> SourceResult<Value> {
        let request = self
            .authorized(self.client.get(self.url("headends")))
            .await?
            .query(&[("country", country), ("postalcode", postal_code)]);
        self.send_json("headends", request).await
    }

    async fn available(&self, service: Option<&str>) -> SourceResult<Value> {
        let endpoint = match service {
            Some(service) => format!("available/{service}"),
            None => "available".to_string(),
        };
        let request = self.client.get(self.url(&endpoint));
        self.send_json(&endpoint, request).await
    }
}
