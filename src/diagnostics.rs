use core::fmt;
use embedded_hal::serial::Write;

/// Text output on the diagnostic serial port, next to the defmt log.
pub struct SerialDiagnostics<Tx>
where
    Tx: Write<u8>,
{
    tx: Tx,
}

impl<Tx> SerialDiagnostics<Tx>
where
    Tx: Write<u8>,
{
    pub fn new(tx: Tx) -> Self {
        Self { tx }
    }
}

impl<Tx> fmt::Write for SerialDiagnostics<Tx>
where
    Tx: Write<u8>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            nb::block!(self.tx.write(byte)).map_err(|_| fmt::Error)?;
        }

        Ok(())
    }
}
