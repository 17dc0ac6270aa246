//! Production transport over `reqwest::blocking`

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use super::{HttpResponse, Transport};
use crate::error::{self, Result};

const USER_AGENT: &str = concat!("ghpin/", env!("CARGO_PKG_VERSION"));
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| error::remote::transport_error(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.client.get(url).send().map_err(|e| request_error(url, &e))?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| request_error(url, &e))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn request_error(url: &str, err: &reqwest::Error) -> error::GhpinError {
    if err.is_timeout() {
        error::remote::transport_error(format!("request timed out: {url}"))
    } else {
        error::remote::transport_error(format!("{url}: {err}"))
    }
}
