use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

use crate::error::DhtError;
use crate::frame::{self, Reading, SensorKind};
use crate::pulse::{self, PULSES_PER_FRAME};

/// Milliseconds the line is driven high to settle before the trigger.
const SETTLE_MS: u32 = 50;

/// Milliseconds the line is held low to trigger a transmission.
const TRIGGER_MS: u32 = 20;

/// Pacing delay between consecutive line samples, in microseconds.
///
/// Keeps the sample cadence near 1 µs so the idle threshold below stays well
/// clear of the sensor's longest in-frame level (~80 µs).
const SAMPLE_GAP_US: u32 = 1;

/// A level unchanged for more than this many consecutive samples means the
/// sensor has finished transmitting and released the line.
const IDLE_RUN_SAMPLES: u32 = 100;

/// Hard cap on samples collected in one capture pass.
///
/// A complete transmission is about 5 ms, roughly 5000 samples at the pacing
/// cadence. A line that never goes idle within the budget (stuck or floating)
/// ends the capture with [`DhtError::NoPulsesDetected`] rather than polling
/// without bound.
const SAMPLE_BUDGET: usize = 8192;

/// Driver for the DHT11/DHT22 family of temperature and humidity sensors.
///
/// The sensor answers a host-driven handshake with a train of 40 high pulses
/// whose widths encode the data bits. The driver captures the whole train by
/// polling the line, then decodes it offline: pulse widths are classified
/// against the midpoint of the observed extremes, so no calibrated
/// microsecond timer is needed beyond a coarse pacing delay.
pub struct Dht<PIN, D> {
    pin: PIN,
    delay: D,
    kind: SensorKind,
}

impl<PIN, DELAY, E> Dht<PIN, DELAY>
where
    PIN: InputPin<Error = E> + OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a new driver instance.
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO pin connected to the sensor's data line. Must be
    ///   bidirectional (open-drain or externally pulled up) and support both
    ///   input and output.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    /// * `kind` - Which sensor family is attached; fixed for the lifetime of
    ///   the driver.
    pub fn new(pin: PIN, delay: DELAY, kind: SensorKind) -> Self {
        Dht { pin, delay, kind }
    }

    /// Performs one complete capture-and-decode attempt.
    ///
    /// Sends the start handshake, records the line until it goes idle,
    /// segments the recording into pulse widths, converts widths to bits,
    /// packs the frame bytes, validates the checksum, and interprets the data
    /// bytes for the configured sensor family.
    ///
    /// Each call is independent: no state survives between attempts, so any
    /// of the protocol errors can be handled by simply calling again.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if a full 40-pulse train arrived with a valid checksum.
    /// * `Err(DhtError)` naming the failure otherwise.
    pub fn read(&mut self) -> Result<Reading, DhtError<E>> {
        self.handshake()?;
        let samples = self.collect_samples()?;

        let widths = pulse::segment(&samples);
        if widths.is_empty() {
            return Err(DhtError::NoPulsesDetected);
        }
        if widths.len() != PULSES_PER_FRAME {
            return Err(DhtError::IncompletePulseTrain);
        }

        let bits = pulse::threshold(&widths);
        let bytes = frame::pack_bytes(&bits);
        if !frame::checksum_matches(&bytes) {
            return Err(DhtError::ChecksumMismatch);
        }

        let [hum_hi, hum_lo, temp_hi, temp_lo, _] = bytes;
        Ok(self.kind.decode([hum_hi, hum_lo, temp_hi, temp_lo]))
    }

    /// Releases the data pin, consuming the driver.
    pub fn release(self) -> PIN {
        self.pin
    }

    /// Sends the start signal: settle high, trigger low, then release the
    /// line so the pull-up and the sensor can drive it.
    fn handshake(&mut self) -> Result<(), DhtError<E>> {
        self.pin.set_high()?;
        self.delay.delay_ms(SETTLE_MS);
        self.pin.set_low()?;
        self.delay.delay_ms(TRIGGER_MS);
        self.pin.set_high()?;
        Ok(())
    }

    /// Polls the line into a raw level buffer until it has been steady for
    /// more than [`IDLE_RUN_SAMPLES`] consecutive samples.
    ///
    /// No protocol interpretation happens here; the stop condition is a plain
    /// run-length check. Exhausting [`SAMPLE_BUDGET`] before the line goes
    /// idle counts as no sensor response.
    fn collect_samples(&mut self) -> Result<heapless::Vec<bool, SAMPLE_BUDGET>, DhtError<E>> {
        let mut samples = heapless::Vec::new();
        let mut last: Option<bool> = None;
        let mut idle_run: u32 = 0;

        loop {
            if samples.is_full() {
                return Err(DhtError::NoPulsesDetected);
            }
            let high = self.pin.is_high()?;
            let _ = samples.push(high);

            match last {
                Some(level) if level == high => {
                    idle_run += 1;
                    if idle_run > IDLE_RUN_SAMPLES {
                        break;
                    }
                }
                _ => {
                    idle_run = 0;
                    last = Some(high);
                }
            }
            self.delay.delay_us(SAMPLE_GAP_US);
        }

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::delay::CheckedDelay;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::delay::Transaction as DelayTx;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTx,
    };

    // Run length that trips the idle detector: the first sample of a run plus
    // IDLE_RUN_SAMPLES + 1 repeats.
    const IDLE_TAIL: usize = IDLE_RUN_SAMPLES as usize + 2;

    fn handshake_sequence() -> Vec<PinTx> {
        vec![
            PinTx::set(PinState::High), // settle
            PinTx::set(PinState::Low),  // trigger
            PinTx::set(PinState::High), // release
        ]
    }

    // Expands (level, run length) pairs into read transactions.
    fn sampled(runs: &[(PinState, usize)]) -> Vec<PinTx> {
        runs.iter()
            .flat_map(|&(state, n)| std::iter::repeat_n(PinTx::get(state), n))
            .collect()
    }

    fn preamble() -> Vec<(PinState, usize)> {
        vec![
            (PinState::High, 10), // released line sits high briefly
            (PinState::Low, 80),  // sensor acknowledgement
            (PinState::High, 80),
        ]
    }

    // One data bit: the 50-sample low gap, then a short or long high pulse.
    fn bit_runs(bit: bool) -> [(PinState, usize); 2] {
        [
            (PinState::Low, 50),
            (PinState::High, if bit { 70 } else { 28 }),
        ]
    }

    fn frame_runs(bytes: [u8; 5]) -> Vec<(PinState, usize)> {
        let mut runs = preamble();
        for byte in bytes {
            for i in 0..8 {
                runs.extend(bit_runs((byte >> (7 - i)) & 1 == 1));
            }
        }
        runs.push((PinState::Low, 50)); // sensor pulls low before releasing
        runs.push((PinState::High, IDLE_TAIL));
        runs
    }

    fn decode_mocked_frame(
        bytes: [u8; 5],
        kind: SensorKind,
    ) -> Result<Reading, DhtError<MockError>> {
        let mut expect = handshake_sequence();
        expect.extend(sampled(&frame_runs(bytes)));

        let mut pin = PinMock::new(&expect);
        let mut dht = Dht::new(pin.clone(), NoopDelay, kind);
        let result = dht.read();
        pin.done();
        result
    }

    #[test]
    fn handshake_settles_triggers_then_releases() {
        let mut pin = PinMock::new(&handshake_sequence());

        let delay_transactions = vec![DelayTx::delay_ms(50), DelayTx::delay_ms(20)];
        let mut delay = CheckedDelay::new(&delay_transactions);

        let mut dht = Dht::new(pin.clone(), &mut delay, SensorKind::Dht22);
        dht.handshake().unwrap();

        pin.done();
        delay.done();
    }

    #[test]
    fn read_decodes_valid_dht22_frame() {
        // humidity 50.0%, temperature 25.0C, checksum 1+244+0+250 mod 256
        let reading = decode_mocked_frame([1, 244, 0, 250, 239], SensorKind::Dht22).unwrap();

        assert_eq!(
            reading,
            Reading {
                relative_humidity: 50.0,
                temperature: 25.0,
            }
        );
    }

    #[test]
    fn read_decodes_valid_dht11_frame() {
        let reading = decode_mocked_frame([60, 0, 25, 0, 85], SensorKind::Dht11).unwrap();

        assert_eq!(
            reading,
            Reading {
                relative_humidity: 60.0,
                temperature: 25.0,
            }
        );
    }

    #[test]
    fn read_rejects_corrupted_checksum() {
        let result = decode_mocked_frame([1, 244, 0, 250, 240], SensorKind::Dht22);
        assert_eq!(result.unwrap_err(), DhtError::ChecksumMismatch);
    }

    #[test]
    fn read_reports_silent_line_as_no_pulses() {
        // The line just sits high after the handshake: no acknowledgement, no
        // data pulses, idle detector ends the capture.
        let mut expect = handshake_sequence();
        expect.extend(sampled(&[(PinState::High, IDLE_TAIL)]));

        let mut pin = PinMock::new(&expect);
        let mut dht = Dht::new(pin.clone(), NoopDelay, SensorKind::Dht22);

        assert_eq!(dht.read().unwrap_err(), DhtError::NoPulsesDetected);
        pin.done();
    }

    #[test]
    fn read_reports_truncated_train_as_incomplete() {
        // Acknowledgement plus only 10 of the 40 data pulses.
        let mut runs = preamble();
        for _ in 0..10 {
            runs.extend(bit_runs(false));
        }
        runs.push((PinState::Low, 50));
        runs.push((PinState::High, IDLE_TAIL));

        let mut expect = handshake_sequence();
        expect.extend(sampled(&runs));

        let mut pin = PinMock::new(&expect);
        let mut dht = Dht::new(pin.clone(), NoopDelay, SensorKind::Dht22);

        assert_eq!(dht.read().unwrap_err(), DhtError::IncompletePulseTrain);
        pin.done();
    }

    #[test]
    fn read_gives_up_when_line_never_goes_idle() {
        // A line toggling on every sample defeats the idle detector; the
        // sample budget ends the capture instead.
        let mut expect = handshake_sequence();
        expect.extend((0..SAMPLE_BUDGET).map(|i| {
            PinTx::get(if i % 2 == 0 {
                PinState::High
            } else {
                PinState::Low
            })
        }));

        let mut pin = PinMock::new(&expect);
        let mut dht = Dht::new(pin.clone(), NoopDelay, SensorKind::Dht22);

        assert_eq!(dht.read().unwrap_err(), DhtError::NoPulsesDetected);
        pin.done();
    }

    #[test]
    fn read_is_deterministic_for_identical_captures() {
        let bytes = [60, 0, 25, 0, 85];

        let first = decode_mocked_frame(bytes, SensorKind::Dht11);
        let second = decode_mocked_frame(bytes, SensorKind::Dht11);

        assert_eq!(first, second);
        assert!(first.is_ok());
    }

    #[test]
    fn release_returns_the_pin() {
        let mut pin = PinMock::new(&[]);
        let dht = Dht::new(pin.clone(), NoopDelay, SensorKind::Dht11);

        let _released = dht.release();
        pin.done();
    }
}
