// wifi.rs

use std::net::Ipv4Addr;

use anyhow::Context;
use embedded_svc::wifi::{ClientConfiguration, Configuration};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use esp_idf_sys::esp;
use log::*;

use crate::*;

pub struct WifiLink<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
    ssid: String,
}

impl<'a> WifiLink<'a> {
    pub fn new(mut wifi: BlockingWifi<EspWifi<'a>>, config: &MyConfig) -> anyhow::Result<Self> {
        info!("WiFi setting credentials...");
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID too long"))?,
            password: config
                .wifi_pass
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("WiFi password too long"))?,
            ..Default::default()
        }))?;

        info!("WiFi driver starting...");
        wifi.start()?;

        Ok(WifiLink {
            wifi,
            ssid: config.wifi_ssid.clone(),
        })
    }
}

impl Network for WifiLink<'_> {
    fn connect(&mut self) -> anyhow::Result<()> {
        if self.wifi.is_connected()? {
            return Ok(());
        }
        self.wifi.connect().context("association failed")?;
        self.wifi.wait_netif_up().context("no IP address")?;
        Ok(())
    }

    fn ssid(&self) -> String {
        self.ssid.clone()
    }

    fn rssi(&self) -> i32 {
        let mut ap_info: esp_idf_sys::wifi_ap_record_t = unsafe { core::mem::zeroed() };
        match esp!(unsafe { esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info) }) {
            Ok(_) => i32::from(ap_info.rssi),
            Err(e) => {
                error!("Cannot read RSSI: {e:?}");
                0
            }
        }
    }

    fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|i| i.ip)
    }
}

// EOF
