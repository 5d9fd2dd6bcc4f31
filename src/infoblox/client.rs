use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::models::{Credentials, TxtRecord, TxtRecordRequestBody, DEFAULT_VIEW, SUBSCRIPTION_KEY_HEADER};
use crate::error::{SolverError, SolverResult};

/// Thin wrapper around the gateway's TXT record endpoints
#[derive(Debug, Clone)]
pub struct InfobloxClient {
    client: Client,
    base_url: String,
}

impl InfobloxClient {
    pub fn new(base_url: &str, timeout: Duration) -> SolverResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::RequestBuild {
                method: "HTTP",
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        request
            .basic_auth(&credentials.user, Some(&credentials.password))
            .header(SUBSCRIPTION_KEY_HEADER, &credentials.api_key)
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(
        &self,
        method: &'static str,
        context: &str,
        request: RequestBuilder,
    ) -> SolverResult<reqwest::Response> {
        request.send().await.map_err(|e| {
            if e.is_builder() {
                SolverError::RequestBuild {
                    method,
                    message: e.to_string(),
                }
            } else {
                SolverError::network(context, e)
            }
        })
    }

    /// `POST /record/txt`. Returns the response status without judging it.
    pub async fn create_txt_record(
        &self,
        credentials: &Credentials,
        body: &TxtRecordRequestBody,
    ) -> SolverResult<StatusCode> {
        debug!(name = %body.name, url = %self.base_url, "Creating TXT record");

        // Authorize before attaching the body so the content type is set once
        let request = self
            .authorize(self.client.post(format!("{}/record/txt", self.base_url)), credentials)
            .json(body);

        let response = self
            .send("POST", "error creating TXT record", request)
            .await?;

        Ok(response.status())
    }

    /// `GET /record/txt?zone=&name=&view=`
    pub async fn list_txt_records(
        &self,
        credentials: &Credentials,
        zone: &str,
        name: &str,
    ) -> SolverResult<Vec<TxtRecord>> {
        debug!(zone = %zone, name = %name, "Listing TXT records");

        let request = self
            .client
            .get(format!("{}/record/txt", self.base_url))
            .query(&[("zone", zone), ("name", name), ("view", DEFAULT_VIEW)]);

        let response = self
            .send("GET", "error getting TXT records", self.authorize(request, credentials))
            .await?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SolverError::network("error reading TXT record listing", e))?;

        serde_json::from_slice(&body).map_err(|e| SolverError::ResponseParse {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }

    /// `DELETE /record?reference=`. Returns the response status without judging it.
    pub async fn delete_record(
        &self,
        credentials: &Credentials,
        reference: &str,
    ) -> SolverResult<StatusCode> {
        debug!(reference = %reference, "Deleting record");

        let request = self
            .client
            .delete(format!("{}/record", self.base_url))
            .query(&[("reference", reference)]);

        let response = self
            .send("DELETE", "error deleting TXT record", self.authorize(request, credentials))
            .await?;

        Ok(response.status())
    }
}
