//! Matching configuration.

/// Which unmatched element becomes the next matching target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchOrder {
    /// Most extreme element first: the unmatched element with the
    /// greatest total distance to all elements. Extreme elements have
    /// the fewest good partners, so matching them early produces
    /// tighter groups overall. The default.
    #[default]
    ExtremeFirst,
    /// Lowest index first.
    Index,
}

/// Restricts which elements may be matched together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchScope {
    /// Any element may join any group.
    #[default]
    All,
    /// Partners must share the target's class in this partition.
    Within(Vec<usize>),
    /// Each group takes exactly one element per class of this
    /// partition; the group size must equal the class count.
    Between(Vec<usize>),
}

/// Configuration for the matching generator.
///
/// # Examples
///
/// ```
/// use anticlust::matching::{MatchConfig, MatchOrder};
///
/// let config = MatchConfig::new(3).with_order(MatchOrder::Index);
/// assert_eq!(config.group_size, 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    /// Target size of each matched group.
    pub group_size: usize,
    /// Policy selecting the next matching target.
    pub order: MatchOrder,
    /// Optional partition restricting eligible partners.
    pub scope: MatchScope,
}

impl MatchConfig {
    /// Creates a configuration for groups of `group_size`.
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            order: MatchOrder::default(),
            scope: MatchScope::default(),
        }
    }

    /// Sets the target-pick order policy.
    pub fn with_order(mut self, order: MatchOrder) -> Self {
        self.order = order;
        self
    }

    /// Restricts matching to the given scope.
    pub fn with_scope(mut self, scope: MatchScope) -> Self {
        self.scope = scope;
        self
    }
}
