//! HTTP collector transport
//!
//! POSTs gzip-compressed batches to an HTTP source endpoint. The client is
//! created once and shared by every worker; requests carry no per-call state.
//!
//! The blocking client owns a private async runtime, which must not be built
//! or torn down from inside another runtime. Construction and drop therefore
//! run on a short-lived plain thread, so a handler can be created and dropped
//! from async code.

use super::{
    GzipPayload, SourceTags, Transport, SOURCE_CATEGORY_HEADER, SOURCE_HOST_HEADER,
    SOURCE_NAME_HEADER,
};
use crate::core::{Result, ShipperError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use std::thread;
use std::time::Duration;
use url::Url;

/// Run `f` on a short-lived plain thread and wait for its result
fn off_runtime<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name("sumo-http-client".to_string())
        .spawn(f)?
        .join()
        .map_err(|_| ShipperError::other("HTTP client thread panicked"))
}

/// Transport that sends batches to a remote collector over HTTP(S)
///
/// # Example
///
/// ```no_run
/// use sumo_log_shipper::transport::{HttpTransport, SourceTags};
/// use url::Url;
///
/// let endpoint = Url::parse("https://collectors.example.com/receiver/v1/http/TOKEN").unwrap();
/// let transport = HttpTransport::new(
///     endpoint,
///     SourceTags::new("checkout-app", "ios", "prod/mobile"),
///     None,
/// )
/// .expect("valid transport");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    // Only `None` while being dropped
    client: Option<Client>,
    endpoint: Url,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Create a transport
    ///
    /// `timeout` of `None` keeps the HTTP client's default request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if a tag is not a valid header value or the client
    /// cannot be built.
    pub fn new(endpoint: Url, tags: SourceTags, timeout: Option<Duration>) -> Result<Self> {
        let headers = Self::build_headers(&tags)?;

        let client = off_runtime(move || {
            let mut builder = Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()
        })?
        .map_err(|e| ShipperError::transport(endpoint.as_str(), e.to_string()))?;

        Ok(Self {
            client: Some(client),
            endpoint,
            headers,
        })
    }

    fn build_headers(tags: &SourceTags) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );

        for (name, value) in [
            (SOURCE_NAME_HEADER, &tags.name),
            (SOURCE_HOST_HEADER, &tags.host),
            (SOURCE_CATEGORY_HEADER, &tags.category),
        ] {
            let value = HeaderValue::from_str(value).map_err(|_| {
                ShipperError::config("SourceTags", format!("{} is not a valid header value", name))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        Ok(headers)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, payload: GzipPayload) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ShipperError::transport(self.endpoint.as_str(), "client closed"))?;

        let response = client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(payload.into_body())
            .send()
            .map_err(|e| ShipperError::transport(self.endpoint.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShipperError::http_status(
                self.endpoint.as_str(),
                status.as_u16(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            let _ = off_runtime(move || drop(client));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> SourceTags {
        SourceTags::new("checkout-app", "ios", "prod/mobile")
    }

    #[test]
    fn test_headers_carry_tags() {
        let headers = HttpTransport::build_headers(&tags()).unwrap();

        assert_eq!(headers[CONTENT_ENCODING], "gzip");
        assert_eq!(headers["x-sumo-name"], "checkout-app");
        assert_eq!(headers["x-sumo-host"], "ios");
        assert_eq!(headers["x-sumo-category"], "prod/mobile");
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let bad = SourceTags::new("line\nbreak", "ios", "prod/mobile");
        let err = HttpTransport::build_headers(&bad).unwrap_err();
        assert!(matches!(err, ShipperError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_deliver_without_server_fails() {
        // Nothing listens on port 9; the connection is refused
        let endpoint = Url::parse("http://127.0.0.1:9/receiver").unwrap();
        let transport =
            HttpTransport::new(endpoint, tags(), Some(Duration::from_secs(2))).unwrap();

        let payload = GzipPayload::compress("{}", 1).unwrap();
        let result = transport.deliver(payload);
        assert!(matches!(result, Err(ShipperError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_client_lifecycle_inside_async_runtime() {
        let endpoint = Url::parse("http://127.0.0.1:9/receiver").unwrap();
        let transport = HttpTransport::new(endpoint, tags(), None).unwrap();
        let copy = transport.clone();
        drop(transport);
        assert_eq!(copy.endpoint().port(), Some(9));
    }
}
