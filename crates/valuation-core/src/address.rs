//! A1-notation cell addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Zero-based cell coordinates parsed from A1 notation (`A1`, `AB12`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub column: usize,
}

impl CellAddress {
    /// The top-left cell of a sheet.
    pub const ORIGIN: Self = Self { row: 0, column: 0 };

    /// Creates an address from zero-based coordinates.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns the address `rows` below and `columns` right of this one.
    #[must_use]
    pub const fn offset(&self, rows: usize, columns: usize) -> Self {
        Self {
            row: self.row + rows,
            column: self.column + columns,
        }
    }
}

/// Column letters for a zero-based column index (`0 -> A`, `27 -> AB`).
#[must_use]
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DataError::InvalidParameter(format!("invalid cell address: {s:?}"));

        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut column = 0usize;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            column = column
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(invalid)?;
        }

        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self {
            row: row - 1,
            column: column - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addresses() {
        assert_eq!("A1".parse::<CellAddress>().unwrap(), CellAddress::ORIGIN);
        assert_eq!(
            "c5".parse::<CellAddress>().unwrap(),
            CellAddress::new(4, 2)
        );
        assert_eq!(
            "AB12".parse::<CellAddress>().unwrap(),
            CellAddress::new(11, 27)
        );
    }

    #[test]
    fn test_reject_invalid_addresses() {
        for bad in ["", "A", "1", "A0", "1A", "A-1", "A1B"] {
            assert!(bad.parse::<CellAddress>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(CellAddress::new(9, 26).to_string(), "AA10");
    }
}
