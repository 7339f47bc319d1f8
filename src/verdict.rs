use std::fmt;

/// Three-valued truth: the answer of a conservative test over a region.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Verdict {
    /// The relation holds at every point of the region.
    True,
    /// The relation holds at no point of the region.
    False,
    /// The bounds are too coarse to decide.
    Maybe,
}

impl Verdict {
    /// Agreement of two verdicts: `True` only if both are `True`,
    /// `False` only if both are `False`, `Maybe` otherwise.
    pub fn and(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::True, Verdict::True) => Verdict::True,
            (Verdict::False, Verdict::False) => Verdict::False,
            _ => Verdict::Maybe,
        }
    }

    pub fn is_maybe(self) -> bool {
        self == Verdict::Maybe
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::True => write!(f, "true"),
            Verdict::False => write!(f, "false"),
            Verdict::Maybe => write!(f, "maybe"),
        }
    }
}
