//! Measurement codes of the KMA short-term forecast (동네예보) that end up in
//! the weather table.

use std::fmt;
use std::str::FromStr;

/// A tracked forecast category. The discriminant is the column position
/// after `station` and `datehour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Probability of precipitation, %.
    Pop = 0,
    /// Precipitation type code.
    Pty = 1,
    /// Relative humidity, %.
    Reh = 2,
    /// Sky condition code.
    Sky = 3,
    /// Three-hour temperature, °C.
    T3h = 4,
    /// East-west wind component, m/s.
    Uuu = 5,
    /// Wind direction, degrees.
    Vec = 6,
    /// North-south wind component, m/s.
    Vvv = 7,
    /// Wind speed, m/s.
    Wsd = 8,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Pop,
        Category::Pty,
        Category::Reh,
        Category::Sky,
        Category::T3h,
        Category::Uuu,
        Category::Vec,
        Category::Vvv,
        Category::Wsd,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Pop => "POP",
            Category::Pty => "PTY",
            Category::Reh => "REH",
            Category::Sky => "SKY",
            Category::T3h => "T3H",
            Category::Uuu => "UUU",
            Category::Vec => "VEC",
            Category::Vvv => "VVV",
            Category::Wsd => "WSD",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error for category codes the weather table does not track (e.g. `R06`, `TMN`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntrackedCategory(pub String);

impl FromStr for Category {
    type Err = UntrackedCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| UntrackedCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.code().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_untracked_codes() {
        assert_eq!(
            "TMN".parse::<Category>(),
            Err(UntrackedCategory("TMN".to_string()))
        );
        assert!("pop".parse::<Category>().is_err());
    }

    #[test]
    fn test_index_matches_position() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }
}
