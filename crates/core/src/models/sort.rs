use serde::{Deserialize, Serialize};

/// Ordering requested by the user for the coin lists.
///
/// `Rank*` and `Price*` apply to the full coin list. `Holdings*` apply to the
/// portfolio list; on the full list they fall back to the rank ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    Rank,
    RankReversed,
    #[default]
    Holdings,
    HoldingsReversed,
    Price,
    PriceReversed,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::Rank,
        SortOption::RankReversed,
        SortOption::Holdings,
        SortOption::HoldingsReversed,
        SortOption::Price,
        SortOption::PriceReversed,
    ];
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOption::Rank => write!(f, "rank"),
            SortOption::RankReversed => write!(f, "rankReversed"),
            SortOption::Holdings => write!(f, "holdings"),
            SortOption::HoldingsReversed => write!(f, "holdingsReversed"),
            SortOption::Price => write!(f, "price"),
            SortOption::PriceReversed => write!(f, "priceReversed"),
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|o| o.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                crate::errors::CoreError::ValidationError(format!("Unknown sort option: {s}"))
            })
    }
}
