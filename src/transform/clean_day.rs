//! Curated clean reference days (low particulate matter), 2017–2019.

/// Sorted `YYYY-MM-DD` dates, searched with `binary_search`.
pub const CLEAN_DAYS: &[&str] = &[
    "2017-04-19", "2017-05-01", "2017-05-17", "2017-06-02", "2017-06-15", "2017-09-01",
    "2017-09-14", "2017-09-21", "2017-09-28", "2017-10-21", "2017-10-30", "2017-11-11",
    "2017-11-16", "2017-11-27", "2017-12-13", "2017-12-27", "2018-02-08", "2018-03-31",
    "2018-04-18", "2018-04-19", "2018-04-28", "2018-05-04", "2018-05-24", "2018-06-06",
    "2018-06-16", "2018-06-24", "2018-07-19", "2018-07-21", "2018-09-08", "2018-11-30",
    "2018-12-12", "2018-12-14", "2018-12-23", "2018-12-28", "2019-01-03", "2019-01-20",
    "2019-01-26", "2019-01-29", "2019-03-08", "2019-03-19", "2019-04-03", "2019-04-04",
    "2019-04-12", "2019-04-15", "2019-05-02", "2019-05-03", "2019-05-06", "2019-05-07",
    "2019-05-22", "2019-05-24", "2019-06-03", "2019-06-13", "2019-06-24", "2019-09-18",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_unique() {
        assert!(CLEAN_DAYS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_well_formed_dates() {
        for day in CLEAN_DAYS {
            assert!(
                chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok(),
                "{day} is not a date"
            );
        }
    }
}
