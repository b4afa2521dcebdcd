//! Cart counter badge shown next to the cart link.
//!
//! The density class only drives styling; nothing in the controller branches
//! on it.

use serde::{Deserialize, Serialize};

/// Counts above this display as `99+`.
const MAX_DISPLAYED_COUNT: u64 = 99;

/// Visual density bucket for the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Density {
    /// 1-3 items.
    Low,
    /// 4-9 items.
    Medium,
    /// 10-20 items.
    High,
    /// More than 20 items.
    VeryHigh,
}

impl Density {
    /// CSS class name for this bucket.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

/// Rendered state of the cart counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterBadge {
    pub count: u64,
    pub label: String,
    /// `None` when the cart is empty and the badge is hidden.
    pub density: Option<Density>,
}

impl CounterBadge {
    #[must_use]
    pub fn for_count(count: u64) -> Self {
        let label = if count > MAX_DISPLAYED_COUNT {
            "99+".to_string()
        } else {
            count.to_string()
        };
        let density = match count {
            0 => None,
            1..=3 => Some(Density::Low),
            4..=9 => Some(Density::Medium),
            10..=20 => Some(Density::High),
            _ => Some(Density::VeryHigh),
        };
        Self {
            count,
            label,
            density,
        }
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.density.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_when_empty() {
        let badge = CounterBadge::for_count(0);
        assert!(!badge.is_visible());
        assert_eq!(badge.label, "0");
    }

    #[test]
    fn test_density_buckets() {
        assert_eq!(CounterBadge::for_count(1).density, Some(Density::Low));
        assert_eq!(CounterBadge::for_count(3).density, Some(Density::Low));
        assert_eq!(CounterBadge::for_count(4).density, Some(Density::Medium));
        assert_eq!(CounterBadge::for_count(9).density, Some(Density::Medium));
        assert_eq!(CounterBadge::for_count(10).density, Some(Density::High));
        assert_eq!(CounterBadge::for_count(20).density, Some(Density::High));
        assert_eq!(CounterBadge::for_count(21).density, Some(Density::VeryHigh));
    }

    #[test]
    fn test_label_saturates() {
        assert_eq!(CounterBadge::for_count(99).label, "99");
        assert_eq!(CounterBadge::for_count(100).label, "99+");
        assert_eq!(CounterBadge::for_count(5000).label, "99+");
    }

    #[test]
    fn test_css_class() {
        assert_eq!(Density::VeryHigh.css_class(), "very-high");
    }
}
