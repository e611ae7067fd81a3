// station.rs

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::*;

use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub sample_delay_ms: u32,
    pub health_period_ms: u64,
    pub uncalibrated_pause_ms: u32,
    pub wifi_retry_ms: u64,
}

/// State carried from one loop pass to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopContext {
    pub health: HealthSchedule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasurementOutcome {
    Published,
    Uncalibrated,
    SensorFault,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub measurement: MeasurementOutcome,
    pub health_published: bool,
}

pub struct Station<S, N, T, C, D> {
    sensor: S,
    network: N,
    publisher: Publisher<T>,
    clock: C,
    delay: D,
    timing: Timing,
}

impl<S, N, T, C, D> Station<S, N, T, C, D>
where
    S: TempSensor,
    N: Network,
    T: HttpTransport,
    C: Clock,
    D: DelayNs,
{
    pub fn new(sensor: S, network: N, publisher: Publisher<T>, clock: C, delay: D, timing: Timing) -> Self {
        Station {
            sensor,
            network,
            publisher,
            clock,
            delay,
            timing,
        }
    }

    pub fn publisher(&self) -> &Publisher<T> {
        &self.publisher
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Connect, report store reachability and send the first device-status record.
    pub fn startup(&mut self) -> anyhow::Result<LoopContext> {
        network::wait_connected(&mut self.network, Duration::from_millis(self.timing.wifi_retry_ms))?;

        let ssid = self.network.ssid();
        let rssi = self.network.rssi();
        self.publisher.validate_store();
        self.publisher.publish_health(&ssid, rssi, self.clock.now_ms());

        Ok(LoopContext {
            health: HealthSchedule::starting_at(self.clock.now_ms(), self.timing.health_period_ms),
        })
    }

    /// One pass: sample, publish or skip, then the device-status deadline.
    /// A skipped pass sends nothing at all and leaves the deadline for the next one.
    pub fn step(&mut self, ctx: &mut LoopContext) -> StepReport {
        let reading = match self.sensor.sample() {
            Ok(reading) if reading.is_uncalibrated() => {
                warn!("Sensor uncalibrated... skipping...");
                return self.skip(MeasurementOutcome::Uncalibrated);
            }
            Ok(reading) => reading,
            Err(e) => {
                error!("Sensor read failed: {e:#}");
                return self.skip(MeasurementOutcome::SensorFault);
            }
        };

        info!("{:.2}ºC", reading.celsius);
        info!("{:.2}ºF", reading.fahrenheit);

        self.publisher.publish_measurement(&reading);
        self.delay.delay_ms(self.timing.sample_delay_ms);

        let health_published = self.health_if_due(ctx);
        StepReport {
            measurement: MeasurementOutcome::Published,
            health_published,
        }
    }

    fn skip(&mut self, measurement: MeasurementOutcome) -> StepReport {
        self.delay.delay_ms(self.timing.uncalibrated_pause_ms);
        StepReport {
            measurement,
            health_published: false,
        }
    }

    fn health_if_due(&mut self, ctx: &mut LoopContext) -> bool {
        let now = self.clock.now_ms();
        if !ctx.health.is_due(now) {
            return false;
        }

        let ssid = self.network.ssid();
        let rssi = self.network.rssi();
        self.publisher.publish_health(&ssid, rssi, now);
        ctx.health.advance(now);
        info!(
            "Device status sent, next at {next} ms",
            next = ctx.health.next_due_ms()
        );
        true
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        let mut ctx = self.startup()?;

        info!("Entering main loop...");
        loop {
            self.step(&mut ctx);
        }
    }
}

// EOF
