// build.rs

use std::env;

fn main() -> anyhow::Result<()> {
    // Necessary because of this issue: https://github.com/rust-lang/cargo/issues/9641
    // see also https://github.com/rust-lang/cargo/issues/9554
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::build::CfgArgs::output_propagated("ESP_IDF")?;
        embuild::build::LinkArgs::output_propagated("ESP_IDF")?;
    }

    let wifi_ssid = env::var("WIFI_SSID").unwrap_or_else(|_| "internet".into());
    let wifi_pass = env::var("WIFI_PASS").unwrap_or_else(|_| "password".into());
    let influx_url = env::var("INFLUX_URL").unwrap_or_else(|_| "http://192.168.1.33:8086".into());
    let influx_db = env::var("INFLUX_DB").unwrap_or_else(|_| "esp32".into());

    println!("cargo:rustc-env=WIFI_SSID={wifi_ssid}");
    println!("cargo:rustc-env=WIFI_PASS={wifi_pass}");
    println!("cargo:rustc-env=INFLUX_URL={influx_url}");
    println!("cargo:rustc-env=INFLUX_DB={influx_db}");
    for var in ["WIFI_SSID", "WIFI_PASS", "INFLUX_URL", "INFLUX_DB"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    Ok(())
}

// EOF
