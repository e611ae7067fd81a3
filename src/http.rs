// http.rs

use std::time::Duration;

use embedded_svc::http::{client::Client as HttpClient, Method};
use esp_idf_svc::{
    http::client::{Configuration, EspHttpConnection},
    io::{Read, Write},
};

use log::*;

use crate::{HttpResponse, HttpTransport};

const READ_BUF_SIZE: usize = 256;
const MAX_BODY: usize = 1024;

/// ESP-IDF HTTP client, one connection per request.
pub struct EspTransport {
    timeout: Duration,
}

impl EspTransport {
    pub fn new(timeout: Duration) -> Self {
        EspTransport { timeout }
    }

    fn client(&self) -> anyhow::Result<HttpClient<EspHttpConnection>> {
        let conf = Configuration {
            timeout: Some(self.timeout),
            ..Default::default()
        };
        Ok(HttpClient::wrap(EspHttpConnection::new(&conf)?))
    }
}

fn read_body<R: Read>(resp: &mut R) -> String {
    let mut body = Vec::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    while body.len() < MAX_BODY {
        match resp.read(&mut buf) {
            Ok(0) => break,
            Err(e) => {
                debug!("Response body cut at {n} bytes: {e:?}", n = body.len());
                break;
            }
            Ok(n) => body.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

impl HttpTransport for EspTransport {
    fn get(&mut self, url: &str) -> anyhow::Result<HttpResponse> {
        let mut client = self.client()?;
        let req = client.request(Method::Get, url, &[])?;
        let mut resp = req.submit()?;
        let status = resp.status();
        let body = read_body(&mut resp);
        Ok(HttpResponse { status, body })
    }

    fn post(&mut self, url: &str, content_type: &str, body: &[u8]) -> anyhow::Result<HttpResponse> {
        let len = body.len().to_string();
        let headers = [("content-type", content_type), ("content-length", len.as_str())];

        let mut client = self.client()?;
        let mut req = client.request(Method::Post, url, &headers)?;
        req.write_all(body)?;
        req.flush()?;
        let mut resp = req.submit()?;
        let status = resp.status();
        let body = read_body(&mut resp);
        Ok(HttpResponse { status, body })
    }
}

// EOF
