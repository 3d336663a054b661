//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::load_balancer::host::Host;
use crate::pool::request::{LogicalRequest, Method};
use crate::transport::{RawResponse, Transport, TransportError};

const USER_AGENT: &str = concat!("influx-pool/", env!("CARGO_PKG_VERSION"));

/// Sends logical requests over HTTP/1.1 or HTTP/2 with connection reuse.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    /// Used for hosts configured with `accept_invalid_certs`.
    insecure_client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        let insecure_client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            insecure_client,
        })
    }

    fn client_for(&self, host: &Host) -> &Client {
        if host.options().accept_invalid_certs {
            &self.insecure_client
        } else {
            &self.client
        }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        host: &Host,
        request: &LogicalRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let url = request_url(host.url(), request.path())?;

        let client = self.client_for(host);
        let mut builder = match request.method() {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
        };
        let params: Vec<(&str, &str)> = request.query_pairs().collect();
        builder = builder.query(&params).timeout(timeout);
        if let Some(body) = request.body_text() {
            builder = builder.body(body.to_owned());
        }

        let response = builder.send().await.map_err(|e| classify_error(e, timeout))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| classify_error(e, timeout))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Append `path` to the host's base path, keeping any prefix such as
/// `/influx/` in `http://h:8086/influx/`.
fn request_url(base: &Url, path: &str) -> Result<Url, TransportError> {
    if base.cannot_be_a_base() {
        return Err(TransportError::InvalidUrl(format!(
            "{} cannot carry a request path",
            base
        )));
    }
    let mut url = base.clone();
    let full_path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&full_path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn classify_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidUrl(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
