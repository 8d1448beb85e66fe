/*++

Licensed under the Apache-2.0 license.

File Name:

    counter_bank.rs

Abstract:

    File contains the bank of saturating histogram counters.

--*/

/// Number of bins in the bank.
pub const BIN_COUNT: usize = 64;

/// Bins `0..WIDE_BIN_COUNT` are 8 bits wide, the rest are 4 bits wide.
pub const WIDE_BIN_COUNT: usize = 10;

/// Index of the final bin emitted by a drain.
pub const LAST_BIN: u8 = (BIN_COUNT - 1) as u8;

/// Counter width class of a bin.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum WidthClass {
    /// 8-bit counter, saturates at 255
    Wide,

    /// 4-bit counter, saturates at 15
    Narrow,
}

impl WidthClass {
    /// Counter width in bits.
    pub fn bits(self) -> u32 {
        match self {
            WidthClass::Wide => 8,
            WidthClass::Narrow => 4,
        }
    }

    /// Largest value a counter of this class can hold.
    pub fn max_value(self) -> u8 {
        (u16::MAX >> (16 - self.bits())) as u8
    }
}

/// A bin number, always in `0..BIN_COUNT`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BinIndex(u8);

impl BinIndex {
    /// Truncates `raw` to the 6 index bits. Out-of-range values wrap into
    /// range rather than being rejected.
    pub fn new_masked(raw: u8) -> Self {
        Self(raw & LAST_BIN)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<BinIndex> for usize {
    fn from(index: BinIndex) -> usize {
        index.as_usize()
    }
}

impl std::fmt::Display for BinIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static width class of `index`.
pub fn width_class(index: BinIndex) -> WidthClass {
    if index.as_usize() < WIDE_BIN_COUNT {
        WidthClass::Wide
    } else {
        WidthClass::Narrow
    }
}

/// Saturation value of `index`.
pub fn max_for(index: BinIndex) -> u8 {
    width_class(index).max_value()
}

/// 64 saturating counters stored one per byte.
///
/// Every counter satisfies `value <= max_for(index)`. Counters are only
/// mutated through [`CounterBank::increment`] and cleared through
/// [`CounterBank::reset`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CounterBank {
    counters: [u8; BIN_COUNT],
}

impl Default for CounterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterBank {
    /// Creates a bank with every counter at zero.
    pub fn new() -> Self {
        Self {
            counters: [0; BIN_COUNT],
        }
    }

    /// Increments the counter at `index` unless it is already at its class
    /// maximum, and returns the resulting value.
    pub fn increment(&mut self, index: BinIndex) -> u8 {
        let max = max_for(index);
        let counter = &mut self.counters[index.as_usize()];
        if *counter < max {
            *counter += 1;
        }
        *counter
    }

    /// Returns the current value of the counter at `index`.
    pub fn read(&self, index: BinIndex) -> u8 {
        self.counters[index.as_usize()]
    }

    /// Returns true if the counter at `index` holds its class maximum.
    pub fn is_saturated(&self, index: BinIndex) -> bool {
        self.read(index) == max_for(index)
    }

    /// Sets every counter to zero.
    pub fn reset(&mut self) {
        self.counters = [0; BIN_COUNT];
    }

    /// Counter values in ascending bin order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.counters.iter().copied()
    }

    pub fn values(&self) -> &[u8; BIN_COUNT] {
        &self.counters
    }
}
