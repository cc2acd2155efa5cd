//! Destination group identifiers.

use std::fmt;

/// One of the three ordered destination groups a selected code belongs to.
///
/// # Examples
///
/// ```
/// use codepick_types::GroupId;
///
/// assert_eq!(GroupId::parse_lenient("Group 2"), GroupId::Two);
/// assert_eq!(GroupId::parse_lenient("seven"), GroupId::One);
/// assert_eq!(GroupId::Three.number(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupId {
    /// `group1`, which also receives unassigned selections.
    #[default]
    One,
    /// `group2`.
    Two,
    /// `group3`.
    Three,
}

impl GroupId {
    /// All groups in order.
    pub const ALL: [GroupId; 3] = [Self::One, Self::Two, Self::Three];

    /// Returns the group for a 1-based number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// Returns the 1-based group number.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Returns the 0-based position of this group.
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }

    /// Parses a group column value, falling back to [`GroupId::One`].
    ///
    /// Accepts a bare number or a number prefixed with `group` in any case,
    /// with optional whitespace between the two.
    pub fn parse_lenient(value: &str) -> Self {
        let value = value.trim();
        let digits = match value.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("group") => value[5..].trim_start(),
            _ => value,
        };

        digits
            .parse::<u8>()
            .ok()
            .and_then(Self::from_number)
            .unwrap_or_default()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
