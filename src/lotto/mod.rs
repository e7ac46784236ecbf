//! Lottery draw model: the 6-from-45 pick, the sampler that produces it
//! and the renderer that lays it out on a display surface.

pub mod render;
pub mod sampler;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest number in the pool (the pool is `1..=POOL_SIZE`)
pub const POOL_SIZE: u8 = 45;

/// How many numbers a single draw picks
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPick {
    #[error("{0} is outside the pool 1..={max}", max = POOL_SIZE)]
    OutOfRange(u8),
    #[error("{0} was picked more than once")]
    Duplicate(u8),
    #[error("expected {expected} numbers, got {0}", expected = PICK_COUNT)]
    WrongCount(usize),
    #[error("not a number")]
    NotANumber,
}

/// Six distinct numbers from the pool, sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PickedNumbers([u8; PICK_COUNT]);

impl PickedNumbers {
    /// Validate and sort an arbitrary set of six numbers.
    pub fn new(mut values: [u8; PICK_COUNT]) -> Result<Self, InvalidPick> {
        if let Some(&bad) = values.iter().find(|&&v| v == 0 || v > POOL_SIZE) {
            return Err(InvalidPick::OutOfRange(bad));
        }
        values.sort_unstable();
        if let Some(pair) = values.windows(2).find(|w| w[0] == w[1]) {
            return Err(InvalidPick::Duplicate(pair[0]));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    /// How many numbers two picks have in common
    pub fn hits(&self, other: &PickedNumbers) -> usize {
        self.iter().filter(|&n| other.contains(n)).count()
    }
}

/// Parses "3,11,17,24,38,45" (commas and/or spaces)
impl FromStr for PickedNumbers {
    type Err = InvalidPick;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() != PICK_COUNT {
            return Err(InvalidPick::WrongCount(parts.len()));
        }

        let mut values = [0u8; PICK_COUNT];
        for (slot, part) in values.iter_mut().zip(parts) {
            *slot = part.parse().map_err(|_| InvalidPick::NotANumber)?;
        }
        Self::new(values)
    }
}

impl fmt::Display for PickedNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02}", n)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_values() {
        let picked = PickedNumbers::new([45, 3, 17, 1, 38, 24]).unwrap();
        assert_eq!(picked.as_slice(), &[1, 3, 17, 24, 38, 45]);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(
            PickedNumbers::new([0, 2, 3, 4, 5, 6]),
            Err(InvalidPick::OutOfRange(0))
        );
        assert_eq!(
            PickedNumbers::new([1, 2, 3, 4, 5, 46]),
            Err(InvalidPick::OutOfRange(46))
        );
    }

    #[test]
    fn test_new_rejects_duplicates() {
        assert_eq!(
            PickedNumbers::new([7, 2, 7, 4, 5, 6]),
            Err(InvalidPick::Duplicate(7))
        );
    }

    #[test]
    fn test_parse_ticket() {
        let ticket: PickedNumbers = "45, 3 17,1,38 24".parse().unwrap();
        assert_eq!(ticket.as_slice(), &[1, 3, 17, 24, 38, 45]);

        assert_eq!("1,2,3".parse::<PickedNumbers>(), Err(InvalidPick::WrongCount(3)));
        assert_eq!("1,2,3,4,5,x".parse::<PickedNumbers>(), Err(InvalidPick::NotANumber));
        assert_eq!("1,2,3,4,5,300".parse::<PickedNumbers>(), Err(InvalidPick::NotANumber));
        assert_eq!("1,2,3,4,5,5".parse::<PickedNumbers>(), Err(InvalidPick::Duplicate(5)));
    }

    #[test]
    fn test_hits() {
        let draw = PickedNumbers::new([1, 2, 3, 4, 5, 6]).unwrap();
        let ticket = PickedNumbers::new([4, 5, 6, 7, 8, 9]).unwrap();
        assert_eq!(draw.hits(&ticket), 3);
        assert_eq!(draw.hits(&draw), PICK_COUNT);
        assert!(ticket.contains(9));
        assert!(!ticket.contains(1));
    }

    #[test]
    fn test_display_pads_numbers() {
        let picked = PickedNumbers::new([3, 11, 17, 24, 38, 45]).unwrap();
        assert_eq!(picked.to_string(), "03 11 17 24 38 45");
    }

    #[test]
    fn test_serializes_as_array() {
        let picked = PickedNumbers::new([1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(serde_json::to_string(&picked).unwrap(), "[1,2,3,4,5,6]");
    }
}
