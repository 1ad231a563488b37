//! Production `Transport` backed by ureq.
//!
//! ureq is blocking, so each round trip runs on tokio's blocking pool. The
//! agent is configured to return 4xx/5xx as data, leaving status
//! interpretation to `HttpResponse::into_body`.

use std::future::Future;
use std::io;

use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.request_timeout))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn execute_blocking(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.agent.get(&request.url).header("user-agent", self.user_agent.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_vec().map_err(map_ureq_error)?;

        debug!(url = %request.url, status, bytes = body.len(), "response received");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
        let transport = self.clone();
        async move {
            tokio::task::spawn_blocking(move || transport.execute_blocking(&request))
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
        }
    }
}

fn map_ureq_error(e: ureq::Error) -> ApiError {
    match e {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => ApiError::NoConnectivity,
        ureq::Error::BadUri(uri) => ApiError::InvalidUri(uri),
        ureq::Error::Io(io) if io.kind() == io::ErrorKind::TimedOut => ApiError::Timeout,
        other => ApiError::Transport(other.to_string()),
    }
}
