// config.rs

use anyhow::bail;
use crc::{Crc, CRC_32_ISCSI};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{InfluxOptions, Timing};

pub const NVS_BUF_SIZE: usize = 512;

const DEFAULT_INFLUX_URL: &str = "http://192.168.1.33:8086";
const DEFAULT_INFLUX_DB: &str = "esp32";
const DEFAULT_LOCATION: &str = "studeerkamer";
const DEFAULT_DEVICE: &str = "ESP32";

const DEFAULT_SAMPLE_DELAY_MS: u32 = 5_000;
const DEFAULT_HEALTH_PERIOD_MS: u32 = 300_000;
const DEFAULT_UNCALIBRATED_PAUSE_MS: u32 = 1_000;
const DEFAULT_WIFI_RETRY_MS: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_MS: u32 = 5_000;
const DEFAULT_BATCH_SIZE: u16 = 1;
const DEFAULT_BUFFER_SIZE: u16 = 5;

#[cfg(target_os = "espidf")]
const CONFIG_NAME: &str = "cfg";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MyConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,

    pub influx_url: String,
    pub influx_db: String,
    pub location: String,
    pub device: String,

    pub sample_delay_ms: u32,
    pub health_period_ms: u32,
    pub uncalibrated_pause_ms: u32,
    pub wifi_retry_ms: u32,
    pub http_timeout_ms: u32,

    pub batch_size: u16,
    pub buffer_size: u16,
}

impl Default for MyConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("WIFI_SSID").unwrap_or("internet").into(),
            wifi_pass: option_env!("WIFI_PASS").unwrap_or("password").into(),

            influx_url: option_env!("INFLUX_URL").unwrap_or(DEFAULT_INFLUX_URL).into(),
            influx_db: option_env!("INFLUX_DB").unwrap_or(DEFAULT_INFLUX_DB).into(),
            location: DEFAULT_LOCATION.into(),
            device: DEFAULT_DEVICE.into(),

            sample_delay_ms: DEFAULT_SAMPLE_DELAY_MS,
            health_period_ms: DEFAULT_HEALTH_PERIOD_MS,
            uncalibrated_pause_ms: DEFAULT_UNCALIBRATED_PAUSE_MS,
            wifi_retry_ms: DEFAULT_WIFI_RETRY_MS,
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,

            batch_size: DEFAULT_BATCH_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl MyConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            sample_delay_ms: self.sample_delay_ms,
            health_period_ms: u64::from(self.health_period_ms),
            uncalibrated_pause_ms: self.uncalibrated_pause_ms,
            wifi_retry_ms: u64::from(self.wifi_retry_ms),
        }
    }

    pub fn influx_options(&self) -> InfluxOptions {
        InfluxOptions {
            url: self.influx_url.clone(),
            db: self.influx_db.clone(),
            batch_size: usize::from(self.batch_size.max(1)),
            buffer_size: usize::from(self.buffer_size.max(self.batch_size).max(1)),
        }
    }

    /// Encode into `buf` as postcard with a trailing CRC-32.
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> anyhow::Result<&'a mut [u8]> {
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::to_slice_crc32(self, buf, digest) {
            Ok(d) => Ok(d),
            Err(e) => {
                let estr = format!("Cannot encode config to buffer {e:?}");
                bail!("{estr}");
            }
        }
    }

    pub fn from_bytes(b: &[u8]) -> Option<Self> {
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::from_bytes_crc32::<MyConfig>(b, digest) {
            Ok(c) => {
                info!("Successfully parsed config.");
                Some(c)
            }
            Err(e) => {
                error!("Cannot parse config: {e:?}");
                None
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl MyConfig {
    pub fn from_nvs(nvs: &mut esp_idf_svc::nvs::EspNvs<esp_idf_svc::nvs::NvsDefault>) -> Option<Self> {
        let mut nvsbuf = [0u8; NVS_BUF_SIZE];
        info!("Reading up to {sz} bytes from nvs...", sz = NVS_BUF_SIZE);
        let b = match nvs.get_raw(CONFIG_NAME, &mut nvsbuf) {
            Err(e) => {
                error!("Nvs read error {e:?}");
                return None;
            }
            Ok(Some(b)) => b,
            _ => {
                error!("Nvs key not found");
                return None;
            }
        };
        info!("Got {sz} bytes from nvs. Parsing config...", sz = b.len());
        Self::from_bytes(b)
    }

    pub fn to_nvs(&self, nvs: &mut esp_idf_svc::nvs::EspNvs<esp_idf_svc::nvs::NvsDefault>) -> anyhow::Result<()> {
        let mut nvsbuf = [0u8; NVS_BUF_SIZE];
        let nvsdata = self.to_bytes(&mut nvsbuf)?;
        info!(
            "Encoded config to {sz} bytes. Saving to nvs...",
            sz = nvsdata.len()
        );

        match nvs.set_raw(CONFIG_NAME, nvsdata) {
            Ok(_) => {
                info!("Config saved.");
                Ok(())
            }
            Err(e) => {
                let estr = format!("Cannot save to nvs: {e:?}");
                bail!("{estr}");
            }
        }
    }
}


// EOF
