// network.rs

use std::{net::Ipv4Addr, time::Duration};

use backon::{BlockingRetryable, ConstantBuilder};
use log::*;

pub trait Network {
    /// One association attempt, blocking until it succeeds or fails.
    fn connect(&mut self) -> anyhow::Result<()>;
    fn ssid(&self) -> String;
    fn rssi(&self) -> i32;
    fn ip_addr(&self) -> Option<Ipv4Addr>;
}

/// Block until the network is up, retrying at a fixed interval forever.
pub fn wait_connected<N: Network>(net: &mut N, retry_delay: Duration) -> anyhow::Result<()> {
    info!("Connecting to {}", net.ssid());

    let retry = ConstantBuilder::default()
        .with_delay(retry_delay)
        .without_max_times();
    (|| net.connect())
        .retry(retry)
        .notify(|e, dur| {
            error!("WiFi not connected: {e:#}");
            debug!("Retrying in {dur:?}");
        })
        .call()?;

    info!("Connection established!");
    match net.ip_addr() {
        Some(ip) => info!("IP address:\t{ip}"),
        None => warn!("IP address:\tunknown"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky {
        failures_left: u32,
        attempts: u32,
    }

    impl Network for Flaky {
        fn connect(&mut self) -> anyhow::Result<()> {
            self.attempts += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                anyhow::bail!("association timed out");
            }
            Ok(())
        }

        fn ssid(&self) -> String {
            "home".into()
        }

        fn rssi(&self) -> i32 {
            -70
        }

        fn ip_addr(&self) -> Option<Ipv4Addr> {
            Some(Ipv4Addr::new(192, 168, 1, 50))
        }
    }

    #[test]
    fn retries_until_connected() {
        let mut net = Flaky {
            failures_left: 7,
            attempts: 0,
        };
        wait_connected(&mut net, Duration::from_millis(1)).unwrap();
        assert_eq!(net.attempts, 8);
    }

    #[test]
    fn connected_on_first_try() {
        let mut net = Flaky {
            failures_left: 0,
            attempts: 0,
        };
        wait_connected(&mut net, Duration::from_millis(1)).unwrap();
        assert_eq!(net.attempts, 1);
    }
}

// EOF
