use crate::core::FetchError;
use crate::upgrade::http::{Timeouts, UserAgent, build_client, parse_url};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Talks to a version-check endpoint.
///
/// Each call is one form-encoded `POST` carrying `program=<name>`. The
/// response body is returned with line breaks stripped, so a report spread
/// over several lines reads as one. Throttling is the owner's job.
#[derive(Debug, Clone)]
pub struct RemoteVersionClient {
    client: reqwest::Client,
    check_url: String,
}

impl RemoteVersionClient {
    pub fn new(
        check_url: impl Into<String>,
        user_agent: &UserAgent,
        timeouts: Timeouts,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(user_agent, timeouts)?,
            check_url: check_url.into(),
        })
    }

    pub fn check_url(&self) -> &str {
        &self.check_url
    }

    /// Ask the endpoint for the channel report of `program`.
    ///
    /// # Errors
    ///
    /// Transport failures, timeouts and non-success statuses are all
    /// returned as [`FetchError`].
    pub async fn fetch_report(&self, program: &str) -> Result<String, FetchError> {
        let url = parse_url(&self.check_url)?;
        let request_error = |source| FetchError::Request {
            url: self.check_url.clone(),
            source,
        };

        debug!("POST {} for program '{}'", url, program);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("program={program}"))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.check_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        Ok(body.lines().collect())
    }
}
