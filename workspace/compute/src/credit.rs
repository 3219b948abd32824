//! Credit score ratings.

use std::fmt;

/// Highest score any bureau reports.
pub const MAX_SCORE: i32 = 850;

/// The band a credit score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CreditRating {
    VeryPoor,
    Fair,
    Good,
    VeryGood,
    Exceptional,
}

impl CreditRating {
    pub fn label(&self) -> &'static str {
        match self {
            CreditRating::VeryPoor => "Very Poor",
            CreditRating::Fair => "Fair",
            CreditRating::Good => "Good",
            CreditRating::VeryGood => "Very Good",
            CreditRating::Exceptional => "Exceptional",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn rating(score: i32) -> CreditRating {
    match score {
        s if s >= 800 => CreditRating::Exceptional,
        s if s >= 740 => CreditRating::VeryGood,
        s if s >= 670 => CreditRating::Good,
        s if s >= 580 => CreditRating::Fair,
        _ => CreditRating::VeryPoor,
    }
}

/// Score as a percentage of [`MAX_SCORE`].
pub fn percent(score: i32) -> f64 {
    f64::from(score) / f64::from(MAX_SCORE) * 100.0
}
