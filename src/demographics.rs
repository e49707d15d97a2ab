//! Patient age derivation and age-category thresholds.
//!
//! Every downstream rule keys off whole years and the five clinical age
//! bands. Both are derived here so the rule engine and the prompt builder
//! cannot disagree about a patient's demographics.

use chrono::{Datelike, Local, NaiveDate};

/// Clinical age band used by dosing rules and prompt construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeCategory {
    Infant,
    Child,
    Adolescent,
    Adult,
    Elderly,
}

impl AgeCategory {
    /// Band boundaries: <2 infant, <12 child, <18 adolescent, <65 adult.
    pub fn from_age(age: u32) -> Self {
        if age < 2 {
            Self::Infant
        } else if age < 12 {
            Self::Child
        } else if age < 18 {
            Self::Adolescent
        } else if age < 65 {
            Self::Adult
        } else {
            Self::Elderly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infant => "infant",
            Self::Child => "child",
            Self::Adolescent => "adolescent",
            Self::Adult => "adult",
            Self::Elderly => "elderly",
        }
    }
}

/// Age in whole years on a given date. The year difference is decremented
/// when the birthday has not yet occurred in the as-of year.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut age = as_of.year() - date_of_birth.year();
    let birthday_reached =
        (as_of.month(), as_of.day()) >= (date_of_birth.month(), date_of_birth.day());
    if !birthday_reached {
        age -= 1;
    }
    age.max(0) as u32
}

/// Age in whole years as of today (local calendar).
pub fn age_years(date_of_birth: NaiveDate) -> u32 {
    age_on(date_of_birth, Local::now().date_naive())
}
