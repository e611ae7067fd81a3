// sensor.rs

/// Celsius value a DS18B20 reports when it has not converted properly after a cold boot.
pub const UNCALIBRATED_C: f32 = 25.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempReading {
    pub celsius: f32,
    pub fahrenheit: f32,
}

impl TempReading {
    pub fn from_celsius(celsius: f32) -> Self {
        TempReading {
            celsius,
            fahrenheit: celsius * 1.8 + 32.0,
        }
    }

    pub fn is_uncalibrated(&self) -> bool {
        is_uncalibrated(self.celsius)
    }
}

/// Exact match only, a real 25.00 °C reading is discarded too.
#[allow(clippy::float_cmp)]
pub fn is_uncalibrated(celsius: f32) -> bool {
    celsius == UNCALIBRATED_C
}

pub trait TempSensor {
    /// Trigger a blocking conversion and read back the first device on the bus.
    fn sample(&mut self) -> anyhow::Result<TempReading>;
}


// EOF
