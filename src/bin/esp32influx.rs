// bin/esp32influx.rs

#[cfg(target_os = "espidf")]
esp_idf_sys::esp_app_desc!();

#[cfg(target_os = "espidf")]
mod device {
    use esp32influx::*;
    use esp_idf_hal::{
        delay::FreeRtos,
        gpio::{self, Pull},
        prelude::Peripherals,
    };
    use esp_idf_svc::{
        eventloop::EspSystemEventLoop,
        nvs,
        wifi::{BlockingWifi, EspWifi},
    };

    pub fn main() -> anyhow::Result<()> {
        esp_idf_sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        FreeRtos::delay_ms(1000);
        info!("Hello.");
        info!("Starting up, firmware v{FW_VERSION}");

        let uptime = Uptime::start();
        let sysloop = EspSystemEventLoop::take()?;
        let nvs_default_partition = nvs::EspDefaultNvsPartition::take()?;

        let ns = env!("CARGO_BIN_NAME");
        let mut nvs = match nvs::EspNvs::new(nvs_default_partition.clone(), ns, true) {
            Ok(nvs) => {
                info!("Got namespace {ns:?} from default partition");
                nvs
            }
            Err(e) => bail!("Could not get namespace {ns}: {e:?}"),
        };

        #[cfg(feature = "reset_settings")]
        let config = {
            let c = MyConfig::default();
            c.to_nvs(&mut nvs)?;
            c
        };

        #[cfg(not(feature = "reset_settings"))]
        let config = match MyConfig::from_nvs(&mut nvs) {
            None => {
                error!("Could not read nvs config, using defaults");
                let c = MyConfig::default();
                c.to_nvs(&mut nvs)?;
                info!("Successfully saved default config to nvs.");
                c
            }

            // using settings saved on nvs if we could find them
            Some(c) => c,
        };
        info!("My config:\n{config:#?}");

        let peripherals = Peripherals::take()?;

        // DS18B20 data line on GPIO4, open drain with pull-up
        let mut pin_drv = gpio::PinDriver::input_output_od(peripherals.pins.gpio4)?;
        pin_drv.set_pull(Pull::Up)?;
        let sensor = Ds18b20Sensor::new(pin_drv)?;

        let espwifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_default_partition))?;
        let wifi = BlockingWifi::wrap(espwifi, sysloop)?;
        let link = WifiLink::new(wifi, &config)?;

        let transport = EspTransport::new(Duration::from_millis(u64::from(config.http_timeout_ms)));
        let publisher = Publisher::from_config(transport, &config);

        let station = Station::new(sensor, link, publisher, uptime, FreeRtos, config.timing());
        station.run()?;

        // not actually returning from main() but we reboot instead
        info!("main() finished, reboot.");
        FreeRtos::delay_ms(3000);
        esp_idf_hal::reset::restart();
    }
}

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    device::main()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = esp32influx::MyConfig::default();
    log::info!("esp32influx v{}", esp32influx::FW_VERSION);
    log::info!("Built-in config:\n{config:#?}");
    log::error!("This firmware only runs on ESP-IDF targets, flash it with espflash.");
    Ok(())
}

// EOF
