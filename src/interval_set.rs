//! Unions of intervals.
//!
//! Some operations cannot stay sound with a single interval: dividing by an interval
//! that straddles zero, taking the polar angle across its branch cut, or flooring
//! across an integer boundary. Those split their result into several pieces.
//! Binary operations act on the cross product of the pieces of their operands.
//!
//! Pieces are usually disjoint but this is not required: only the union matters.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::interval::{min_max4, Interval};
use crate::math::angle;
use crate::verdict::Verdict;

const TWO_PI: f64 = 2.0 * PI;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    /// The empty set (no pieces).
    pub fn empty() -> Self {
        Self { intervals: Vec::new() }
    }

    /// A set consisting of a single point.
    pub fn point(value: f64) -> Self {
        if value.is_nan() {
            Self::empty()
        } else {
            Self::from(Interval::point(value))
        }
    }

    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval>) -> Self {
        Self {
            intervals: intervals.into_iter().filter(|i| !i.is_empty()).collect(),
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.intervals.iter().any(|i| i.contains(value))
    }

    /// A single piece that is both defined and continuous.
    pub fn is_def_and_cont(&self) -> bool {
        match self.intervals.as_slice() {
            [single] => single.is_def_and_cont(),
            _ => false,
        }
    }

    /// Applies `op` to every piece, dropping empty results.
    fn map(&self, op: impl Fn(Interval) -> Interval) -> Self {
        Self {
            intervals: self.intervals.iter().map(|&i| op(i)).filter(|i| !i.is_empty()).collect(),
        }
    }

    /// Applies `op` to every pair of pieces, dropping empty results.
    fn zip_with(&self, rhs: &IntervalSet, op: impl Fn(Interval, Interval) -> Interval) -> Self {
        let mut intervals = Vec::with_capacity(self.len() * rhs.len());
        for &a in &self.intervals {
            for &b in &rhs.intervals {
                let i = op(a, b);
                if !i.is_empty() {
                    intervals.push(i);
                }
            }
        }
        Self { intervals }
    }

    /// Combines the verdicts of every pair of pieces.
    ///
    /// `True` only if every pair is `True`, `False` only if every pair is `False`.
    /// An empty operand yields `False`: there is no point where the relation could hold.
    fn compare_with(&self, rhs: &IntervalSet, op: impl Fn(&Interval, &Interval) -> Verdict) -> Verdict {
        let mut verdict: Option<Verdict> = None;
        for a in &self.intervals {
            for b in &rhs.intervals {
                let v = op(a, b);
                let combined = verdict.map_or(v, |acc| acc.and(v));
                if combined.is_maybe() {
                    return Verdict::Maybe;
                }
                verdict = Some(combined);
            }
        }
        verdict.unwrap_or(Verdict::False)
    }
}

// Comparisons.
impl IntervalSet {
    pub fn lt(&self, rhs: &IntervalSet) -> Verdict {
        self.compare_with(rhs, Interval::lt)
    }
    pub fn le(&self, rhs: &IntervalSet) -> Verdict {
        self.compare_with(rhs, Interval::le)
    }
    pub fn gt(&self, rhs: &IntervalSet) -> Verdict {
        self.compare_with(rhs, Interval::gt)
    }
    pub fn ge(&self, rhs: &IntervalSet) -> Verdict {
        self.compare_with(rhs, Interval::ge)
    }
    pub fn eq(&self, rhs: &IntervalSet) -> Verdict {
        self.compare_with(rhs, Interval::eq)
    }
}

impl Add for &IntervalSet {
    type Output = IntervalSet;

    fn add(self, rhs: &IntervalSet) -> IntervalSet {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for &IntervalSet {
    type Output = IntervalSet;

    fn sub(self, rhs: &IntervalSet) -> IntervalSet {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul for &IntervalSet {
    type Output = IntervalSet;

    fn mul(self, rhs: &IntervalSet) -> IntervalSet {
        self.zip_with(rhs, |a, b| a * b)
    }
}

impl Div for &IntervalSet {
    type Output = IntervalSet;

    /// Division, split by the sign of each denominator piece.
    ///
    /// A denominator touching zero yields half-infinite, undefined pieces. A numerator
    /// and denominator that both straddle zero give the whole (undefined) real line.
    /// The exact point `[0, 0]` contributes nothing.
    fn div(self, rhs: &IntervalSet) -> IntervalSet {
        let mut intervals = Vec::with_capacity(self.len() * rhs.len());
        for &a in &self.intervals {
            for &b in &rhs.intervals {
                if let Some(entire) = divide_into(a, b, &mut intervals) {
                    return IntervalSet::from(entire);
                }
            }
        }
        IntervalSet { intervals }
    }
}

/// Pushes the pieces of `a / b` into `out`.
///
/// Returns the entire real line instead when the quotient is unbounded on both sides.
fn divide_into(a: Interval, b: Interval, out: &mut Vec<Interval>) -> Option<Interval> {
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let continuous = a.continuous && b.continuous;
    let inf = f64::INFINITY;
    let entire = Interval::with_flags(-inf, inf, false, continuous);
    let piece = |lo: f64, hi: f64| Interval::with_flags(lo, hi, false, continuous);

    if b.lo > 0.0 || b.hi < 0.0 {
        let (lo, hi) = min_max4(a.lo / b.lo, a.lo / b.hi, a.hi / b.lo, a.hi / b.hi);
        out.push(Interval::with_flags(lo, hi, a.defined && b.defined, continuous));
    } else if b.lo == 0.0 {
        if b.hi == 0.0 {
            // Nothing is defined.
        } else if a.lo > 0.0 {
            out.push(piece(a.lo / b.hi, inf));
        } else if a.hi < 0.0 {
            out.push(piece(-inf, a.hi / b.hi));
        } else if a.lo == 0.0 {
            out.push(piece(0.0, inf));
        } else if a.hi == 0.0 {
            out.push(piece(-inf, 0.0));
        } else {
            return Some(entire);
        }
    } else if b.hi == 0.0 {
        if a.lo > 0.0 {
            out.push(piece(-inf, a.lo / b.lo));
        } else if a.hi < 0.0 {
            out.push(piece(a.hi / b.lo, inf));
        } else if a.lo == 0.0 {
            out.push(piece(-inf, 0.0));
        } else if a.hi == 0.0 {
            out.push(piece(0.0, inf));
        } else {
            return Some(entire);
        }
    } else if a.lo > 0.0 {
        out.push(piece(-inf, a.lo / b.lo));
        out.push(piece(a.lo / b.hi, inf));
    } else if a.hi < 0.0 {
        out.push(piece(-inf, a.hi / b.hi));
        out.push(piece(a.hi / b.lo, inf));
    } else {
        return Some(entire);
    }
    None
}

impl IntervalSet {
    /// Integer power `x^n`.
    pub fn pow_n(&self, n: u32) -> Self {
        self.map(|i| i.pow_n(n))
    }

    /// Integer root `x^(1/n)`.
    pub fn root_n(&self, n: u32) -> Self {
        self.map(|i| i.root_n(n))
    }

    /// Real power `x^y = exp(y * ln x)`; negative bases are outside the domain.
    pub fn pow(&self, exponent: &IntervalSet) -> Self {
        (exponent * &self.ln()).exp()
    }

    /// Real root `x^(1/y)`.
    pub fn root(&self, index: &IntervalSet) -> Self {
        self.pow(&(&IntervalSet::point(1.0) / index))
    }

    pub fn exp(&self) -> Self {
        self.map(Interval::exp)
    }
    pub fn ln(&self) -> Self {
        self.map(Interval::ln)
    }
    pub fn sqrt(&self) -> Self {
        self.map(Interval::sqrt)
    }
    pub fn abs(&self) -> Self {
        self.map(Interval::abs)
    }
    pub fn cos(&self) -> Self {
        self.map(Interval::cos)
    }
    pub fn sin(&self) -> Self {
        self.map(Interval::sin)
    }
    pub fn asin(&self) -> Self {
        self.map(Interval::asin)
    }
    pub fn acos(&self) -> Self {
        self.map(Interval::acos)
    }
    pub fn atan(&self) -> Self {
        self.map(Interval::atan)
    }
    pub fn sinh(&self) -> Self {
        self.map(Interval::sinh)
    }
    pub fn cosh(&self) -> Self {
        self.map(Interval::cosh)
    }
    pub fn tanh(&self) -> Self {
        self.map(Interval::tanh)
    }

    pub fn max(&self, rhs: &IntervalSet) -> Self {
        self.zip_with(rhs, Interval::max)
    }
    pub fn min(&self, rhs: &IntervalSet) -> Self {
        self.zip_with(rhs, Interval::min)
    }

    pub fn floor(&self) -> Self {
        self.step(f64::floor)
    }

    pub fn ceil(&self) -> Self {
        self.step(f64::ceil)
    }

    /// Extension of an integer-valued step function (`floor` or `ceil`).
    ///
    /// A piece within one step maps to that integer. A piece crossing exactly one step
    /// boundary maps to the two integers, each discontinuous. Wider pieces map to the
    /// whole integer range, also discontinuous.
    fn step(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut intervals = Vec::with_capacity(self.len());
        for i in &self.intervals {
            let a = f(i.lo);
            let b = f(i.hi);
            if a == b {
                intervals.push(Interval::with_flags(a, b, i.defined, i.continuous));
            } else if a + 1.0 == b {
                intervals.push(Interval::with_flags(a, a, i.defined, false));
                intervals.push(Interval::with_flags(b, b, i.defined, false));
            } else {
                intervals.push(Interval::with_flags(a, b, i.defined, false));
            }
        }
        Self { intervals }
    }

    /// Polar angle of `(x, y)` in `[0, 2π)`, where `self` is the x-range.
    ///
    /// The branch cut lies on the positive x-axis: a box crossing it produces a piece
    /// near 0 and a piece near 2π. The origin and points on the cut itself have angle 0,
    /// so a box touching them also yields `[0, 0]`.
    pub fn angle(&self, y: &IntervalSet) -> Self {
        let mut intervals = Vec::with_capacity(self.len() * y.len());
        for &a in &self.intervals {
            for &b in &y.intervals {
                angle_into(a, b, &mut intervals);
            }
        }
        Self { intervals }
    }
}

fn angle_into(a: Interval, b: Interval, out: &mut Vec<Interval>) {
    let defined = a.defined && b.defined;
    let continuous = a.continuous && b.continuous;
    let piece = |lo: f64, hi: f64| Interval::with_flags(lo, hi, defined, continuous);

    if a.hi > 0.0 && b.lo < 0.0 && b.hi >= 0.0 {
        if b.hi == 0.0 {
            if a.lo < 0.0 {
                out.push(piece(PI, TWO_PI));
            } else {
                out.push(piece(angle(a.lo, b.lo), TWO_PI));
            }
            out.push(piece(0.0, 0.0));
        } else if a.lo < 0.0 {
            out.push(Interval::with_flags(0.0, TWO_PI, defined, false));
        } else {
            out.push(piece(0.0, angle(a.lo, b.hi)));
            out.push(piece(angle(a.lo, b.lo), TWO_PI));
        }
    } else {
        let (lo, hi) = min_max4(
            angle(a.lo, b.lo),
            angle(a.lo, b.hi),
            angle(a.hi, b.lo),
            angle(a.hi, b.hi),
        );
        out.push(piece(lo, hi));
        if a.contains(0.0) && b.contains(0.0) && lo > 0.0 {
            out.push(piece(0.0, 0.0));
        }
    }
}

impl From<Interval> for IntervalSet {
    fn from(interval: Interval) -> Self {
        Self::from_intervals([interval])
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, i) in self.intervals.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", i)?;
        }
        write!(f, "}}")
    }
}
