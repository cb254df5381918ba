//! Inactivity threshold configuration.

use std::fmt;

use crate::domain::{BUILT_IN_INACTIVITY_TIERS, Error};

/// Ordered, de-duplicated inactivity thresholds in whole days.
///
/// The list is never empty and never contains zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityThresholds(Vec<u32>);

impl Default for InactivityThresholds {
    fn default() -> Self {
        Self(BUILT_IN_INACTIVITY_TIERS.to_vec())
    }
}

impl InactivityThresholds {
    /// Validate thresholds supplied explicitly by a caller.
    ///
    /// Unlike [`InactivityThresholds::parse_override`], malformed explicit
    /// input is rejected rather than replaced by the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use outreach::domain::{ErrorCode, InactivityThresholds};
    ///
    /// let thresholds = InactivityThresholds::new(vec![14, 3, 14]).expect("valid");
    /// assert_eq!(thresholds.as_slice(), &[3, 14]);
    ///
    /// let err = InactivityThresholds::new(vec![0, 7]).expect_err("zero rejected");
    /// assert_eq!(err.code(), ErrorCode::InvalidRequest);
    /// ```
    pub fn new(values: Vec<u32>) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::invalid_request(
                "inactivity thresholds must not be empty",
            ));
        }
        if values.contains(&0) {
            return Err(Error::invalid_request(
                "inactivity thresholds must be positive",
            ));
        }
        Ok(Self::normalised(values))
    }

    /// Parse a comma separated override such as `"3, 7,14"`.
    ///
    /// Non-numeric and non-positive entries are dropped. When nothing valid
    /// remains the built-in tiers are used.
    ///
    /// # Examples
    ///
    /// ```
    /// use outreach::domain::InactivityThresholds;
    ///
    /// let parsed = InactivityThresholds::parse_override("abc, 5, -2, 0, 10");
    /// assert_eq!(parsed.as_slice(), &[5, 10]);
    /// assert_eq!(
    ///     InactivityThresholds::parse_override("nope"),
    ///     InactivityThresholds::default()
    /// );
    /// ```
    pub fn parse_override(raw: &str) -> Self {
        let values = raw
            .split(',')
            .filter_map(|entry| entry.trim().parse::<i64>().ok())
            .filter(|days| *days > 0)
            .filter_map(|days| u32::try_from(days).ok())
            .collect::<Vec<_>>();
        if values.is_empty() {
            return Self::default();
        }
        Self::normalised(values)
    }

    /// Resolve an optional override, defaulting when absent.
    pub fn from_override(raw: Option<&str>) -> Self {
        raw.map_or_else(Self::default, Self::parse_override)
    }

    /// Largest threshold that `inactive_days` meets or exceeds.
    pub fn select(&self, inactive_days: u32) -> Option<u32> {
        self.0
            .iter()
            .rev()
            .copied()
            .find(|threshold| inactive_days >= *threshold)
    }

    /// Thresholds in ascending order.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    fn normalised(mut values: Vec<u32>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self(values)
    }
}

impl fmt::Display for InactivityThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for threshold parsing and selection.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(vec![])]
    #[case(vec![0])]
    #[case(vec![7, 0, 3])]
    fn explicit_malformed_input_is_rejected(#[case] values: Vec<u32>) {
        let err = InactivityThresholds::new(values).expect_err("invalid thresholds");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("", &[3, 7, 14, 30])]
    #[case("abc,-1,0", &[3, 7, 14, 30])]
    #[case(" 10 , 2", &[2, 10])]
    #[case("5,5,1", &[1, 5])]
    #[case("7,x,14", &[7, 14])]
    fn overrides_drop_invalid_entries(#[case] raw: &str, #[case] expected: &[u32]) {
        assert_eq!(InactivityThresholds::parse_override(raw).as_slice(), expected);
    }

    #[rstest]
    #[case(2, None)]
    #[case(3, Some(3))]
    #[case(10, Some(7))]
    #[case(14, Some(14))]
    #[case(400, Some(30))]
    fn selects_the_largest_satisfied_threshold(#[case] days: u32, #[case] expected: Option<u32>) {
        assert_eq!(InactivityThresholds::default().select(days), expected);
    }

    #[rstest]
    fn missing_override_uses_defaults() {
        assert_eq!(
            InactivityThresholds::from_override(None),
            InactivityThresholds::default()
        );
        assert_eq!(InactivityThresholds::default().to_string(), "3,7,14,30");
    }
}
