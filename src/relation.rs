//! Relations `lhs ⋈ rhs` and their three-valued classification over boxes.

use std::fmt;

use log::debug;

use crate::expr::{ExprArena, ExprBoxed};
use crate::interval::Interval;
use crate::interval_set::IntervalSet;
use crate::simplify::simplify;
use crate::verdict::Verdict;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Eq => "=",
        }
    }

    /// Conservative comparison of two interval sets.
    pub fn compare(self, lhs: &IntervalSet, rhs: &IntervalSet) -> Verdict {
        match self {
            Comparator::Lt => lhs.lt(rhs),
            Comparator::Le => lhs.le(rhs),
            Comparator::Gt => lhs.gt(rhs),
            Comparator::Ge => lhs.ge(rhs),
            Comparator::Eq => lhs.eq(rhs),
        }
    }

    /// Whether `value ⋈ 0` holds, where `value = lhs - rhs`.
    pub fn holds_for_difference(self, value: f64) -> bool {
        match self {
            Comparator::Lt => value < 0.0,
            Comparator::Le => value <= 0.0,
            Comparator::Gt => value > 0.0,
            Comparator::Ge => value >= 0.0,
            Comparator::Eq => value == 0.0,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A binary relation between two expressions in `x` and `y`.
///
/// Both sides are simplified on construction. The difference `lhs - rhs` is kept
/// alongside for point sampling at pixel granularity.
#[derive(Debug, Clone)]
pub struct Relation {
    lhs: ExprArena,
    rhs: ExprArena,
    diff: ExprArena,
    comparator: Comparator,
}

impl Relation {
    pub fn new(lhs: &ExprBoxed, comparator: Comparator, rhs: &ExprBoxed) -> Self {
        let lhs = simplify(lhs);
        let rhs = simplify(rhs);
        let diff = ExprBoxed::sub(lhs.clone(), rhs.clone());
        let relation = Self {
            lhs: ExprArena::from_boxed(&lhs),
            rhs: ExprArena::from_boxed(&rhs),
            diff: ExprArena::from_boxed(&diff),
            comparator,
        };
        debug!("relation: {}", relation);
        relation
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn lhs(&self) -> &ExprArena {
        &self.lhs
    }

    pub fn rhs(&self) -> &ExprArena {
        &self.rhs
    }

    /// Evaluates both sides over the box `x × y`.
    pub fn eval_sides(&self, x: Interval, y: Interval) -> (IntervalSet, IntervalSet) {
        let xs = IntervalSet::from(x);
        let ys = IntervalSet::from(y);
        (self.lhs.eval_set(&xs, &ys), self.rhs.eval_set(&xs, &ys))
    }

    /// Classifies the box `x × y` using the interval extensions alone.
    ///
    /// `True` means every point satisfies the relation, `False` that none does.
    pub fn eval(&self, x: Interval, y: Interval) -> Verdict {
        let (l, r) = self.eval_sides(x, y);
        self.comparator.compare(&l, &r)
    }

    /// Classifies a box of pixel size or smaller.
    ///
    /// On top of [`eval`][Self::eval], samples `lhs - rhs` at the four corners and
    /// upgrades `Maybe` to `True` when a witness is found:
    ///
    /// - for inequalities, a corner already satisfying the relation;
    /// - for equality, a corner where the difference is exactly zero or two corners of
    ///   opposite sign, provided both sides are a single defined continuous branch
    ///   (so the intermediate value theorem applies).
    ///
    /// This never downgrades: a `Maybe` without a witness stays `Maybe`.
    pub fn eval_in_pixel(&self, x: Interval, y: Interval) -> Verdict {
        let (l, r) = self.eval_sides(x, y);
        let verdict = self.comparator.compare(&l, &r);
        if !verdict.is_maybe() {
            return verdict;
        }

        let witness = match self.comparator {
            Comparator::Eq => l.is_def_and_cont() && r.is_def_and_cont() && self.has_zero_point(x, y),
            _ => self.has_satisfying_corner(x, y),
        };
        if witness {
            Verdict::True
        } else {
            Verdict::Maybe
        }
    }

    fn corners(x: Interval, y: Interval) -> [(f64, f64); 4] {
        [(x.lo, y.lo), (x.lo, y.hi), (x.hi, y.lo), (x.hi, y.hi)]
    }

    fn has_satisfying_corner(&self, x: Interval, y: Interval) -> bool {
        Self::corners(x, y)
            .iter()
            .any(|&(px, py)| self.comparator.holds_for_difference(self.diff.eval(px, py)))
    }

    fn has_zero_point(&self, x: Interval, y: Interval) -> bool {
        let mut has_positive = false;
        let mut has_negative = false;
        for (px, py) in Self::corners(x, y) {
            let v = self.diff.eval(px, py);
            if v == 0.0 {
                return true;
            }
            has_positive |= v > 0.0;
            has_negative |= v < 0.0;
            if has_positive && has_negative {
                return true;
            }
        }
        false
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.comparator, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn circle(comparator: Comparator) -> Relation {
        let lhs = ExprBoxed::add(
            ExprBoxed::pow(ExprBoxed::X, ExprBoxed::Const(2.0)),
            ExprBoxed::pow(ExprBoxed::Y, ExprBoxed::Const(2.0)),
        );
        Relation::new(&lhs, comparator, &ExprBoxed::Const(4.0))
    }

    #[test]
    fn test_eval_inside_outside() {
        let r = circle(Comparator::Lt);
        assert_eq!(r.eval(Interval::new(-0.5, 0.5), Interval::new(-0.5, 0.5)), Verdict::True);
        assert_eq!(r.eval(Interval::new(3.0, 4.0), Interval::new(3.0, 4.0)), Verdict::False);
        assert_eq!(r.eval(Interval::new(1.0, 3.0), Interval::new(-0.5, 0.5)), Verdict::Maybe);
    }

    #[test]
    fn test_eval_comparators() {
        let i = Interval::new(-0.5, 0.5);
        assert_eq!(circle(Comparator::Le).eval(i, i), Verdict::True);
        assert_eq!(circle(Comparator::Gt).eval(i, i), Verdict::False);
        assert_eq!(circle(Comparator::Ge).eval(i, i), Verdict::False);
        assert_eq!(circle(Comparator::Eq).eval(i, i), Verdict::False);
    }

    #[test]
    fn test_equality_never_true_from_bounds() {
        let r = circle(Comparator::Eq);
        assert_eq!(r.eval(Interval::new(1.9, 2.1), Interval::new(-0.1, 0.1)), Verdict::Maybe);
    }

    #[test]
    fn test_equality_sign_change_in_pixel() {
        let r = circle(Comparator::Eq);
        assert_eq!(r.eval_in_pixel(Interval::new(1.9, 2.1), Interval::new(-0.1, 0.1)), Verdict::True);
    }

    #[test]
    fn test_inequality_corner_witness() {
        let r = circle(Comparator::Lt);
        assert_eq!(r.eval(Interval::new(1.9, 2.1), Interval::new(-0.1, 0.1)), Verdict::Maybe);
        assert_eq!(r.eval_in_pixel(Interval::new(1.9, 2.1), Interval::new(-0.1, 0.1)), Verdict::True);
    }

    #[test]
    fn test_equality_needs_continuity() {
        // floor(x) = 0.5 never holds, and the jump of floor at 1 must not fool the sampler.
        let lhs = ExprBoxed::unary(crate::expr::UnaryOp::Floor, ExprBoxed::X);
        let r = Relation::new(&lhs, Comparator::Eq, &ExprBoxed::Const(0.5));
        let verdict = r.eval_in_pixel(Interval::new(0.9, 1.1), Interval::new(0.0, 0.1));
        assert_ne!(verdict, Verdict::True);
    }

    #[test]
    fn test_undefined_side() {
        // sqrt(x) < 1 over x < 0: nothing is defined there.
        let lhs = ExprBoxed::unary(crate::expr::UnaryOp::Sqrt, ExprBoxed::X);
        let r = Relation::new(&lhs, Comparator::Lt, &ExprBoxed::Const(1.0));
        assert_eq!(r.eval(Interval::new(-2.0, -1.0), Interval::new(0.0, 1.0)), Verdict::False);
        // Partially defined: cannot be proven true.
        assert_eq!(r.eval(Interval::new(-1.0, 0.25), Interval::new(0.0, 1.0)), Verdict::Maybe);
    }

    #[test]
    fn test_display() {
        assert_eq!(circle(Comparator::Le).to_string(), "(x^2 + y^2) <= 4");
    }
}
