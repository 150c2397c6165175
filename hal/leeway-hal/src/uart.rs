//! UART serial communication abstractions

use core::convert::Infallible;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Non-blocking: a receiver reports whether a byte is waiting rather than
/// stalling the caller.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if available
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Read as many available bytes as fit in `buf`
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.read_byte()? {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

/// Combined UART interface
pub trait Uart: UartTx + UartRx {}

impl<T: UartTx + UartRx> Uart for T {}

/// Replay a captured byte stream
impl UartRx for &[u8] {
    type Error = Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl UartConfig {
    /// NMEA0183 standard rate
    pub const NMEA: Self = Self { baudrate: 4800 };
    /// NMEA0183-HS rate, used by AIS receivers
    pub const NMEA_HS: Self = Self { baudrate: 38400 };
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::NMEA
    }
}
