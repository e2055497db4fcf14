//! Text renderings of captured bits for logs and consoles.
//!
//! Both adapters implement [`core::fmt::Display`] and write nothing until
//! formatted, so they cost nothing unless a log line actually uses them.

use core::fmt;

use crate::bits::BitStore;

/// Renders bits `[from, until]` of a store as `1`/`0`.
///
/// Byte groups are separated by `,` and every 64 bits start a new line,
/// counting from bit index 0 rather than from `from`.
///
/// ```
/// use sampler_core::{BitDump, BitStore4k};
///
/// let mut store = BitStore4k::new();
/// for bit in [1, 0, 1, 1, 0, 0, 0, 0, 1, 1] {
///     store.push(bit == 1);
/// }
/// assert_eq!(BitDump::new(&store, 0, 9).to_string(), "10110000,11");
/// ```
pub struct BitDump<'a, const BYTES: usize> {
    store: &'a BitStore<BYTES>,
    from: usize,
    until: usize,
}

impl<'a, const BYTES: usize> BitDump<'a, BYTES> {
    /// `until` is clamped to the last slot of the store.
    #[must_use]
    pub fn new(store: &'a BitStore<BYTES>, from: usize, until: usize) -> Self {
        Self {
            store,
            from,
            until: until.min(BitStore::<BYTES>::CAPACITY - 1),
        }
    }

    /// Every bit written since the last rewind.
    #[must_use]
    pub fn written(store: &'a BitStore<BYTES>) -> Self {
        match store.len().checked_sub(1) {
            Some(last) => Self::new(store, 0, last),
            // from > until renders as empty
            None => Self {
                store,
                from: 1,
                until: 0,
            },
        }
    }
}

impl<const BYTES: usize> fmt::Display for BitDump<'_, BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in self.from..=self.until {
            if index != self.from {
                if index % 64 == 0 {
                    f.write_str("\n")?;
                } else if index % 8 == 0 {
                    f.write_str(",")?;
                }
            }
            f.write_str(if self.store.bit(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Renders the low `width` bits of a word, MSB first, with a space between
/// byte groups.
///
/// ```
/// use sampler_core::Binary;
///
/// assert_eq!(Binary::u16(0x0A05).to_string(), "00001010 00000101");
/// assert_eq!(Binary::new(0x1FF, 9).to_string(), "1 11111111");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binary {
    value: u32,
    width: u32,
}

impl Binary {
    /// `width` is clamped to 1..=32.
    #[must_use]
    pub const fn new(value: u32, width: u32) -> Self {
        let width = if width == 0 {
            1
        } else if width > 32 {
            32
        } else {
            width
        };
        Self { value, width }
    }

    #[must_use]
    pub const fn u8(value: u8) -> Self {
        Self::new(value as u32, 8)
    }

    #[must_use]
    pub const fn u16(value: u16) -> Self {
        Self::new(value as u32, 16)
    }

    #[must_use]
    pub const fn u32(value: u32) -> Self {
        Self::new(value, 32)
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in (0..self.width).rev() {
            f.write_str(if (self.value >> bit) & 1 == 1 { "1" } else { "0" })?;
            if bit != 0 && bit % 8 == 0 {
                f.write_str(" ")?;
            }
        }
        Ok(())
    }
}
