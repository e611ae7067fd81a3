// onewire.rs

use std::fmt::Debug;

use anyhow::bail;
use ds18b20::{Ds18b20, Resolution};
use embedded_hal::digital::{InputPin, OutputPin};
use esp_idf_hal::delay::{Ets, FreeRtos};
use log::*;
use one_wire_bus::{Address, OneWire};

use crate::{TempReading, TempSensor};

/// First DS18B20 found on a one-wire bus.
pub struct Ds18b20Sensor<P> {
    bus: OneWire<P>,
    device: Option<Address>,
}

impl<P, E> Ds18b20Sensor<P>
where
    P: OutputPin<Error = E> + InputPin<Error = E>,
    E: Debug,
{
    pub fn new(pin: P) -> anyhow::Result<Self> {
        let bus = match OneWire::new(pin) {
            Ok(b) => b,
            Err(e) => bail!("One-wire bus init failed: {e:?}"),
        };
        Ok(Ds18b20Sensor { bus, device: None })
    }

    fn first_device(&mut self) -> anyhow::Result<Address> {
        if let Some(a) = self.device {
            return Ok(a);
        }

        match self.bus.device_search(None, false, &mut Ets) {
            Ok(Some((address, _))) => {
                info!("Found sensor {address:?}");
                self.device = Some(address);
                Ok(address)
            }
            Ok(None) => bail!("No device found on one-wire bus"),
            Err(e) => bail!("One-wire search failed: {e:?}"),
        }
    }
}

impl<P, E> TempSensor for Ds18b20Sensor<P>
where
    P: OutputPin<Error = E> + InputPin<Error = E>,
    E: Debug,
{
    fn sample(&mut self) -> anyhow::Result<TempReading> {
        let address = self.first_device()?;

        if let Err(e) = ds18b20::start_simultaneous_temp_measurement(&mut self.bus, &mut Ets) {
            bail!("Cannot start conversion: {e:?}");
        }
        Resolution::Bits12.delay_for_measurement_time(&mut FreeRtos);

        let sensor = match Ds18b20::new::<E>(address) {
            Ok(s) => s,
            Err(e) => bail!("Not a DS18B20: {e:?}"),
        };
        match sensor.read_data(&mut self.bus, &mut Ets) {
            Ok(data) => Ok(TempReading::from_celsius(data.temperature)),
            Err(e) => {
                // forget the address, the device may have been swapped
                self.device = None;
                bail!("Cannot read sensor {address:?}: {e:?}")
            }
        }
    }
}

// EOF
