use alloc::{string::String, vec::Vec};

/// Name reported for a flag value of `0`
pub const INACTIVE: &str = "INACTIVE";

/// Ordered mapping from flag bit to flag name.
///
/// Iteration follows insertion order, which is also the order in which
/// [`flag_names`](crate::flags::flag_names) reports the names of a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagMeaning {
    /// `(bit, name)` pairs in insertion order
    entries: Vec<(u32, String)>,
}

impl FlagMeaning {
    /// Creates an empty mapping
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Flag table written by common PIV evaluation software
    ///
    /// `ACTIVE=1, MASKED=2, NORESULT=4, DISABLED=8, FILTERED=16,
    /// INTERPOLATED=32, REPLACED=64, MANUALEDIT=128`
    pub fn piv() -> Self {
        [
            (1, "ACTIVE"),
            (2, "MASKED"),
            (4, "NORESULT"),
            (8, "DISABLED"),
            (16, "FILTERED"),
            (32, "INTERPOLATED"),
            (64, "REPLACED"),
            (128, "MANUALEDIT"),
        ]
        .into_iter()
        .collect()
    }

    /// Adds a named bit
    ///
    /// An existing bit keeps its position and is renamed.
    ///
    /// # Arguments
    ///
    /// * `bit` - The flag bit, usually a power of two
    /// * `name` - The name of the state
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The mapping
    pub fn insert(&mut self, bit: u32, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(b, _)| *b == bit) {
            Some(entry) => entry.1 = name,
            None => self.entries.push((bit, name)),
        }
        self
    }

    /// Returns the name of a bit
    pub fn name(&self, bit: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(b, _)| *b == bit)
            .map(|(_, n)| n.as_str())
    }

    /// Returns the bit of a name
    pub fn bit(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, n)| n == name)
            .map(|(b, _)| *b)
    }

    /// Bitwise OR of all known bits
    pub fn known_bits(&self) -> u32 {
        self.entries.iter().fold(0, |acc, (b, _)| acc | b)
    }

    /// Iterates over `(bit, name)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(b, n)| (*b, n.as_str()))
    }

    /// Returns the number of named bits
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no bit is named
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(u32, N)> for FlagMeaning {
    fn from_iter<I: IntoIterator<Item = (u32, N)>>(iter: I) -> Self {
        let mut meaning = Self::new();
        for (bit, name) in iter {
            meaning.insert(bit, name);
        }
        meaning
    }
}
