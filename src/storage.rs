/// Byte-addressed non-volatile store (EEPROM) boundary.
///
/// Firmware implements [`ByteStore`] over the MCU's EEPROM cells;
/// [`MemoryEeprom`] is an in-memory stand-in for hosts and tests.
use core::fmt;

/// Random-access byte store. Writes are not atomic across power loss.
pub trait ByteStore {
    type Error: fmt::Debug;

    /// Fill `buf` with the bytes starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EepromError {
    /// Access past the end of the store
    OutOfBounds { offset: usize, len: usize },
}

impl fmt::Display for EepromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EepromError::OutOfBounds { offset, len } => {
                write!(f, "access of {} bytes at offset {} is out of bounds", len, offset)
            }
        }
    }
}

/// Value of an erased EEPROM cell
pub const ERASED: u8 = 0xFF;

/// RAM-backed EEPROM image of `N` bytes, initially erased.
///
/// Like the real part it only rewrites cells whose value changes, and
/// counts cell writes so wear can be observed.
#[derive(Debug, Clone)]
pub struct MemoryEeprom<const N: usize> {
    cells: [u8; N],
    cell_writes: u32,
}

impl<const N: usize> MemoryEeprom<N> {
    pub const fn new() -> Self {
        Self {
            cells: [ERASED; N],
            cell_writes: 0,
        }
    }

    /// Number of cells physically rewritten so far.
    pub fn cell_writes(&self) -> u32 {
        self.cell_writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    fn span(offset: usize, len: usize) -> Result<core::ops::Range<usize>, EepromError> {
        match offset.checked_add(len) {
            Some(end) if end <= N => Ok(offset..end),
            _ => Err(EepromError::OutOfBounds { offset, len }),
        }
    }
}

impl<const N: usize> Default for MemoryEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for MemoryEeprom<N> {
    type Error = EepromError;

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::span(offset, buf.len())?;
        buf.copy_from_slice(&self.cells[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let range = Self::span(offset, data.len())?;
        for (cell, &byte) in self.cells[range].iter_mut().zip(data) {
            if *cell != byte {
                *cell = byte;
                self.cell_writes += 1;
            }
        }
        Ok(())
    }
}
