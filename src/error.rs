/// Possible errors from one decode attempt.
///
/// The three protocol variants are all recoverable by retrying a fresh
/// [`read`](crate::Dht::read); retry policy belongs to the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The line never produced a recognizable data pulse train.
    ///
    /// Usually means the sensor is absent or miswired. Also returned when the
    /// sample budget is exhausted before the line goes idle.
    NoPulsesDetected,
    /// A pulse train was detected but fewer than 40 data pulses arrived.
    ///
    /// Transient noise or marginal timing; worth retrying.
    IncompletePulseTrain,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}
