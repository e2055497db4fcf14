//! Fixed-capacity circular bit store and range extraction.

use core::fmt;

/// 4096-bit store (512 bytes).
pub type BitStore4k = BitStore<512>;

/// 8192-bit store (1024 bytes).
pub type BitStore8k = BitStore<1024>;

/// Maximum number of bits a single [`BitStore::extract`] call can return.
pub const MAX_EXTRACT_WIDTH: usize = 32;

/// Error type for bit range extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtractError {
    /// `from` is past `to`, or nothing has been written yet.
    InvalidRange,
    /// The requested range spans more than 32 bits.
    TooWide,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InvalidRange => f.write_str("invalid bit range"),
            ExtractError::TooWide => f.write_str("bit range wider than 32 bits"),
        }
    }
}

impl core::error::Error for ExtractError {}

/// Circularly indexed bit storage written one bit at a time.
///
/// Bit `n` lives in byte `n / 8` at bit position `n % 8` (LSB first). The
/// write cursor always points to the next slot to be written and wraps
/// modulo the capacity. [`len`](Self::len) counts the bits written since the
/// last rewind, up to the capacity, so an exactly full store stays readable
/// after the cursor has wrapped back to 0. Writing past a full store never
/// fails, but it overwrites the oldest bit and raises the sticky
/// [`overrun`](Self::overrun) flag until the cursor is rewound.
///
/// # Example
///
/// ```
/// use sampler_core::BitStore4k;
///
/// let mut store = BitStore4k::new();
/// store.push(true);
/// store.push(false);
/// store.push(true);
/// assert_eq!(store.cursor(), 3);
/// assert_eq!(store.extract(0, 2, false), Ok(0b101));
/// ```
#[derive(Clone)]
pub struct BitStore<const BYTES: usize> {
    bytes: [u8; BYTES],
    cursor: usize,
    len: usize,
    overrun: bool,
}

impl<const BYTES: usize> BitStore<BYTES> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        BYTES.is_power_of_two(),
        "bit store size must be a power of two"
    );

    /// Number of bits the store holds.
    pub const CAPACITY: usize = BYTES * 8;

    /// Create an empty store with the cursor at bit 0.
    #[must_use]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self {
            bytes: [0; BYTES],
            cursor: 0,
            len: 0,
            overrun: false,
        }
    }

    /// Write one bit at the cursor and advance it.
    #[inline]
    pub fn push(&mut self, level: bool) {
        if self.len == Self::CAPACITY {
            self.overrun = true;
        } else {
            self.len += 1;
        }

        let byte = &mut self.bytes[self.cursor >> 3];
        let mask = 1u8 << (self.cursor & 0x7);
        if level {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }

        self.cursor = (self.cursor + 1) & (Self::CAPACITY - 1);
    }

    /// Move the cursor back to bit 0 without touching stored data.
    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.len = 0;
        self.overrun = false;
    }

    /// Zero every byte and rewind.
    pub fn clear(&mut self) {
        self.bytes = [0; BYTES];
        self.rewind();
    }

    /// Index of the next bit to be written.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bits written since the last rewind, saturating at the capacity.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a bit written since the last rewind has been overwritten.
    #[inline]
    #[must_use]
    pub const fn overrun(&self) -> bool {
        self.overrun
    }

    /// Read a single bit. The index is taken modulo the capacity.
    #[inline]
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        let index = index & (Self::CAPACITY - 1);
        (self.bytes[index >> 3] >> (index & 0x7)) & 1 == 1
    }

    /// Raw buffer contents.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }

    /// Assemble the inclusive range `[from, to]` into an integer.
    ///
    /// Bit `to` becomes the most significant bit of the extracted value and
    /// bit `from` the least significant. A `to` at or beyond
    /// [`len`](Self::len) is clamped to the last written slot. After an
    /// overrun every slot counts as written and indices stay physical. With `sign_extend` set and the top
    /// extracted bit equal to 1, every higher bit of the result is set.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidRange`] if `from > to` after clamping
    ///   (including an empty store).
    /// - [`ExtractError::TooWide`] if the range covers more than 32 bits.
    pub fn extract(&self, from: usize, to: usize, sign_extend: bool) -> Result<u32, ExtractError> {
        let to = if to >= self.len {
            self.len.checked_sub(1).ok_or(ExtractError::InvalidRange)?
        } else {
            to
        };
        if from > to {
            return Err(ExtractError::InvalidRange);
        }

        let width = to - from + 1;
        if width > MAX_EXTRACT_WIDTH {
            return Err(ExtractError::TooWide);
        }

        let mut value = 0u32;
        for index in (from..=to).rev() {
            value = (value << 1) | u32::from(self.bit(index));
        }

        let top = 1u32 << (width - 1);
        if sign_extend && value & top != 0 {
            value |= u32::MAX << (width - 1);
        }
        Ok(value)
    }
}

impl<const BYTES: usize> Default for BitStore<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> fmt::Debug for BitStore<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitStore")
            .field("capacity", &Self::CAPACITY)
            .field("cursor", &self.cursor)
            .field("len", &self.len)
            .field("overrun", &self.overrun)
            .finish_non_exhaustive()
    }
}
