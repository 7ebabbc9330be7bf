use itertools::Itertools;
use std::fmt;

const SEGMENT_SEPARATOR: &str = ", ";

/// A normalized address, kept as its ordered list of semantic segments
/// (street and number, postal code and city, state, country).
///
/// The flat string form is only derived for display and queries, so
/// degraded queries can be taken as segment suffixes instead of slicing
/// on comma positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalAddress {
    segments: Vec<String>,
}

impl CanonicalAddress {
    /// Empty segments are dropped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Joins the segments starting at `start`.
    pub fn join_from(&self, start: usize) -> String {
        self.segments
            .iter()
            .skip(start)
            .join(SEGMENT_SEPARATOR)
    }

    /// Joins the last `count` segments, or `None` if there are fewer.
    pub fn join_last(&self, count: usize) -> Option<String> {
        let len = self.segments.len();
        if len < count {
            return None;
        }
        Some(self.join_from(len - count))
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join_from(0))
    }
}

impl From<CanonicalAddress> for String {
    fn from(from: CanonicalAddress) -> Self {
        from.to_string()
    }
}
