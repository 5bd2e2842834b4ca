use anyhow::{Context, Result};
use hims_api::Envelope;
use hims_core::{Admission, AdmissionType, Bed, BedStatus, Staff};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Data of a successful `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub expires_at: String,
    pub staff: Staff,
}

#[derive(Debug, Default, Serialize)]
pub struct BedQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BedStatus>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub available_only: bool,
}

/// Body of `POST /api/admissions`.
#[derive(Debug, Serialize)]
pub struct AdmitRequest {
    pub patient_id: Uuid,
    pub physician_id: Uuid,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub entry_diagnosis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_discharge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

pub struct HimsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HimsClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let resp = req.send().await.context("Failed to connect to server")?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        decode_envelope(status, &body)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData> {
        let req = self
            .request(reqwest::Method::POST, &self.api_url("auth/login"))
            .json(&serde_json::json!({"username": username, "password": password}));
        self.send(req).await
    }

    pub async fn me(&self) -> Result<Staff> {
        self.send(self.request(reqwest::Method::GET, &self.api_url("auth/me")))
            .await
    }

    pub async fn beds(&self, query: &BedQuery<'_>) -> Result<Vec<Bed>> {
        let req = self
            .request(reqwest::Method::GET, &self.api_url("beds"))
            .query(query);
        self.send(req).await
    }

    pub async fn ongoing_admissions(&self) -> Result<Vec<Admission>> {
        self.send(self.request(reqwest::Method::GET, &self.api_url("admissions")))
            .await
    }

    pub async fn patient_admissions(&self, patient_id: Uuid) -> Result<Vec<Admission>> {
        let url = self.api_url(&format!("patients/{patient_id}/admissions"));
        self.send(self.request(reqwest::Method::GET, &url)).await
    }

    pub async fn admit(&self, request: &AdmitRequest) -> Result<Admission> {
        let req = self
            .request(reqwest::Method::POST, &self.api_url("admissions"))
            .json(request);
        self.send(req).await
    }

    pub async fn assign_bed(&self, admission_id: Uuid, bed_id: Uuid) -> Result<Admission> {
        let url = self.api_url(&format!("admissions/{admission_id}/bed"));
        let req = self
            .request(reqwest::Method::PUT, &url)
            .json(&serde_json::json!({"bed_id": bed_id}));
        self.send(req).await
    }

    pub async fn discharge(&self, admission_id: Uuid) -> Result<Admission> {
        let url = self.api_url(&format!("admissions/{admission_id}/close"));
        self.send(self.request(reqwest::Method::POST, &url)).await
    }

    /// Status code and body of `path` (`healthz`, `readyz`), outside `/api`.
    pub async fn probe(&self, path: &str) -> Result<(u16, String)> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to connect to server")?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

/// Unwraps `data` from a response envelope, or turns the envelope's
/// error into a message.
fn decode_envelope<T: DeserializeOwned>(status: reqwest::StatusCode, body: &str) -> Result<T> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => anyhow::bail!("HTTP {status}: {body}"),
        Err(e) => return Err(e).context("Failed to parse response JSON"),
    };

    if !status.is_success() || !envelope.success {
        match envelope.error {
            Some(error) => anyhow::bail!("HTTP {status} ({}): {}", error.code, error.message),
            None => anyhow::bail!("HTTP {status}: {body}"),
        }
    }

    envelope
        .data
        .with_context(|| format!("HTTP {status}: response carried no data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_decode_success() {
        let body = r#"{"success":true,"message":"Bed assigned","data":[1,2],"timestamp":"2026-03-01T10:00:00Z"}"#;
        let data: Vec<i32> = decode_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = r#"{"success":false,"error":{"code":"conflict","message":"bed C-1 is not available (occupied)"},"timestamp":"2026-03-01T10:00:00Z"}"#;
        let err = decode_envelope::<Vec<i32>>(StatusCode::CONFLICT, body).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("conflict"));
        assert!(msg.contains("not available"));
    }

    #[test]
    fn test_decode_non_envelope_error() {
        let err = decode_envelope::<Vec<i32>>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn test_bed_query_serialization() {
        let query = BedQuery {
            service: Some("icu"),
            status: None,
            available_only: true,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"service": "icu", "available_only": true}));
        let empty = serde_json::to_value(BedQuery::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
