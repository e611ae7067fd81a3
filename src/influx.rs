// influx.rs

use std::collections::VecDeque;

use anyhow::bail;
use log::*;

use crate::Point;

pub const CONTENT_TYPE_LP: &str = "text/plain; charset=utf-8";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP boundary. The device implementation lives in `http.rs`.
pub trait HttpTransport {
    fn get(&mut self, url: &str) -> anyhow::Result<HttpResponse>;
    fn post(&mut self, url: &str, content_type: &str, body: &[u8]) -> anyhow::Result<HttpResponse>;
}

#[derive(Clone, Debug)]
pub struct InfluxOptions {
    pub url: String,
    pub db: String,
    pub batch_size: usize,
    pub buffer_size: usize,
}

/// InfluxDB 1.x write client with a small bounded line buffer.
pub struct InfluxClient<T> {
    transport: T,
    server_url: String,
    write_url: String,
    ping_url: String,
    batch_size: usize,
    buffer_size: usize,
    buffer: VecDeque<String>,
    last_status: u16,
    last_error: String,
}

impl<T: HttpTransport> InfluxClient<T> {
    pub fn new(transport: T, opts: &InfluxOptions) -> Self {
        let server_url = opts.url.trim_end_matches('/').to_string();
        let buffer_size = opts.buffer_size.max(1);
        InfluxClient {
            transport,
            write_url: format!("{server_url}/write?db={db}", db = opts.db),
            ping_url: format!("{server_url}/ping?verbose=true"),
            server_url,
            batch_size: opts.batch_size.clamp(1, buffer_size),
            buffer_size,
            buffer: VecDeque::with_capacity(buffer_size),
            last_status: 0,
            last_error: String::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn write_url(&self) -> &str {
        &self.write_url
    }

    pub fn last_status(&self) -> u16 {
        self.last_status
    }

    pub fn last_error_message(&self) -> &str {
        &self.last_error
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn validate_connection(&mut self) -> anyhow::Result<()> {
        let url = self.ping_url.clone();
        match self.transport.get(&url) {
            Ok(resp) if resp.status == 200 => {
                self.last_status = resp.status;
                self.last_error.clear();
                Ok(())
            }
            Ok(resp) => {
                self.record_failure(&resp);
                bail!("{}", self.last_error)
            }
            Err(e) => {
                self.last_status = 0;
                self.last_error = format!("{e:#}");
                Err(e)
            }
        }
    }

    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Buffer the point and flush once a batch is full.
    pub fn write_point(&mut self, point: &Point) -> anyhow::Result<()> {
        let line = point.to_line_protocol();
        if line.is_empty() {
            bail!("Point {} has no fields", point.measurement());
        }

        if self.buffer.len() >= self.buffer_size {
            warn!("Write buffer full, dropping oldest line");
            self.buffer.pop_front();
        }
        self.buffer.push_back(line);

        if self.buffer.len() >= self.batch_size {
            self.flush_buffer()
        } else {
            Ok(())
        }
    }

    /// Send every buffered line. The buffer is kept when the write fails.
    pub fn flush_buffer(&mut self) -> anyhow::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let body = self
            .buffer
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        let url = self.write_url.clone();
        match self.transport.post(&url, CONTENT_TYPE_LP, body.as_bytes()) {
            Ok(resp) if resp.is_success() => {
                self.last_status = resp.status;
                self.last_error.clear();
                self.buffer.clear();
                Ok(())
            }
            Ok(resp) => {
                self.record_failure(&resp);
                bail!("{}", self.last_error)
            }
            Err(e) => {
                self.last_status = 0;
                self.last_error = format!("{e:#}");
                Err(e)
            }
        }
    }

    fn record_failure(&mut self, resp: &HttpResponse) {
        self.last_status = resp.status;
        self.last_error = error_message(resp);
    }
}

fn error_message(resp: &HttpResponse) -> String {
    // InfluxDB reports failures as {"error":"..."}
    serde_json::from_str::<serde_json::Value>(&resp.body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", resp.status))
}


// EOF
