// publisher.rs

use log::*;

use crate::*;

pub const TEMPERATURE_MEASUREMENT: &str = "temperature";
pub const DEVICE_MEASUREMENT: &str = "device_status";

/// Builds the two records and hands them to the InfluxDB client.
///
/// Writes are fire-and-forget. Each publish starts with an empty write buffer so a
/// line left over from a failed write is never sent along with the new one.
pub struct Publisher<T> {
    client: InfluxClient<T>,
    temperature: Point,
    device_status: Point,
    location: String,
    device: String,
}

impl<T: HttpTransport> Publisher<T> {
    pub fn new(client: InfluxClient<T>, location: &str, device: &str) -> Self {
        Publisher {
            client,
            temperature: Point::new(TEMPERATURE_MEASUREMENT),
            device_status: Point::new(DEVICE_MEASUREMENT),
            location: location.to_string(),
            device: device.to_string(),
        }
    }

    pub fn from_config(transport: T, config: &MyConfig) -> Self {
        let client = InfluxClient::new(transport, &config.influx_options());
        Self::new(client, &config.location, &config.device)
    }

    pub fn client(&self) -> &InfluxClient<T> {
        &self.client
    }

    pub fn temperature(&self) -> &Point {
        &self.temperature
    }

    pub fn device_status(&self) -> &Point {
        &self.device_status
    }

    pub fn build_measurement(&mut self, reading: &TempReading) -> &Point {
        self.temperature.clear_tags();
        self.temperature.clear_fields();

        self.temperature
            .add_tag("location", &self.location)
            .add_field("value", reading.celsius)
            .add_field("fahrenheit", reading.fahrenheit);
        &self.temperature
    }

    pub fn build_health(&mut self, ssid: &str, rssi: i32, uptime_ms: u64) -> &Point {
        self.device_status.clear_tags();
        self.device_status.clear_fields();

        self.device_status
            .add_tag("device", &self.device)
            .add_tag("SSID", ssid)
            .add_field("rssi", rssi)
            .add_field("uptime", uptime_ms);
        &self.device_status
    }

    pub fn publish_measurement(&mut self, reading: &TempReading) {
        self.client.reset_buffer();
        self.build_measurement(reading);

        info!("{}", self.temperature.to_line_protocol());
        self.client.write_point(&self.temperature).ok();
    }

    pub fn publish_health(&mut self, ssid: &str, rssi: i32, uptime_ms: u64) {
        self.client.reset_buffer();
        self.build_health(ssid, rssi, uptime_ms);

        debug!("{}", self.device_status.to_line_protocol());
        self.client.write_point(&self.device_status).ok();
    }

    /// Log whether the store answers. Never fails, the caller carries on regardless.
    pub fn validate_store(&mut self) -> bool {
        match self.client.validate_connection() {
            Ok(_) => {
                info!("Connected to InfluxDB: {}", self.client.server_url());
                true
            }
            Err(_) => {
                warn!(
                    "InfluxDB connection failed: {}",
                    self.client.last_error_message()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flaky {
        fail_next: bool,
        bodies: Vec<String>,
    }

    impl HttpTransport for Flaky {
        fn get(&mut self, _url: &str) -> anyhow::Result<HttpResponse> {
            bail!("host unreachable")
        }

        fn post(&mut self, _url: &str, _content_type: &str, body: &[u8]) -> anyhow::Result<HttpResponse> {
            self.bodies.push(String::from_utf8_lossy(body).into_owned());
            if std::mem::take(&mut self.fail_next) {
                bail!("timeout");
            }
            Ok(HttpResponse {
                status: 204,
                body: String::new(),
            })
        }
    }

    fn publisher(fail_next: bool) -> Publisher<Flaky> {
        let t = Flaky {
            fail_next,
            ..Default::default()
        };
        Publisher::from_config(t, &MyConfig::default())
    }

    #[test]
    fn rebuilding_gives_identical_line() {
        let mut p = publisher(false);
        let r = TempReading::from_celsius(22.5);
        let a = p.build_measurement(&r).to_line_protocol();
        let b = p.build_measurement(&r).to_line_protocol();
        assert_eq!(a, b);
        assert_eq!(a, "temperature,location=studeerkamer value=22.5,fahrenheit=72.5");

        let h1 = p.build_health("thuis", -60, 1234).to_line_protocol();
        let h2 = p.build_health("thuis", -60, 1234).to_line_protocol();
        assert_eq!(h1, h2);
        assert_eq!(h1, "device_status,device=ESP32,SSID=thuis rssi=-60i,uptime=1234i");
    }

    #[test]
    fn failed_write_is_not_resent() {
        let mut p = publisher(true);
        p.publish_measurement(&TempReading::from_celsius(19.0));
        assert_eq!(p.client().pending(), 1);

        p.publish_measurement(&TempReading::from_celsius(19.5));
        assert_eq!(p.client().pending(), 0);
        let bodies = &p.client().transport().bodies;
        assert_eq!(bodies.len(), 2);
        assert!(!bodies[1].contains("value=19,"));
        assert!(bodies[1].contains("value=19.5"));
    }

    #[test]
    fn unreachable_store_is_reported() {
        let mut p = publisher(false);
        assert!(!p.validate_store());
        assert_eq!(p.client().last_error_message(), "host unreachable");
    }
}

// EOF
