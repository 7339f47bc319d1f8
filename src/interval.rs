//! Conservative interval arithmetic over `f64`.
//!
//! An [`Interval`] bounds the values a quantity can take over some input domain.
//! Besides the bounds it carries two flags:
//!
//! - `defined`: cleared when some input fell outside an operator's natural domain
//!   (e.g. `sqrt` of a negative number). The bounds then cover only the defined part.
//! - `continuous`: cleared when the extension may jump between branches
//!   (e.g. `floor` crossing an integer).
//!
//! Comparisons against an interval with either flag cleared can never be proven
//! `True`, since a hidden gap or jump could hide a sign change.
//!
//! Every operation is *sound*: applied to intervals `A` and `B`, the result contains
//! `f(a, b)` for every `a ∈ A` and `b ∈ B` on which `f` is defined, up to
//! floating-point rounding.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::math::{fast_pow, root};
use crate::verdict::Verdict;

const TWO_PI: f64 = 2.0 * PI;

/// A closed interval `[lo, hi]` with definedness and continuity flags.
///
/// # Invariants
///
/// - `lo > hi` denotes the empty interval. Its flags carry no meaning.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
    pub defined: bool,
    pub continuous: bool,
}

impl Interval {
    /// The canonical empty interval.
    pub const EMPTY: Interval = Interval {
        lo: f64::INFINITY,
        hi: f64::NEG_INFINITY,
        defined: false,
        continuous: false,
    };

    /// Creates a defined, continuous interval `[lo, hi]`.
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self::with_flags(lo, hi, true, true)
    }

    pub const fn with_flags(lo: f64, hi: f64, defined: bool, continuous: bool) -> Self {
        Self {
            lo,
            hi,
            defined,
            continuous,
        }
    }

    /// Creates the degenerate interval `[value, value]`.
    pub const fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Same bounds, flags taken from `self`.
    fn keep_flags(self, lo: f64, hi: f64) -> Self {
        Self::with_flags(lo, hi, self.defined, self.continuous)
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn mid(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// Both flags set: the extension is a single well-defined continuous branch.
    pub fn is_def_and_cont(&self) -> bool {
        self.defined && self.continuous
    }

    /// Flags of a binary operation's result.
    fn flags_with(&self, rhs: &Interval) -> (bool, bool) {
        (self.defined && rhs.defined, self.continuous && rhs.continuous)
    }

    /// Verdict when the bounds prove the relation: `True` only if nothing is hidden.
    fn proven(&self, rhs: &Interval) -> Verdict {
        if self.is_def_and_cont() && rhs.is_def_and_cont() {
            Verdict::True
        } else {
            Verdict::Maybe
        }
    }
}

// Comparisons.
impl Interval {
    pub fn lt(&self, rhs: &Interval) -> Verdict {
        if self.is_empty() || rhs.is_empty() {
            Verdict::False
        } else if self.hi < rhs.lo {
            self.proven(rhs)
        } else if self.lo > rhs.hi {
            Verdict::False
        } else {
            Verdict::Maybe
        }
    }

    pub fn le(&self, rhs: &Interval) -> Verdict {
        if self.is_empty() || rhs.is_empty() {
            Verdict::False
        } else if self.hi <= rhs.lo {
            self.proven(rhs)
        } else if self.lo > rhs.hi {
            Verdict::False
        } else {
            Verdict::Maybe
        }
    }

    pub fn gt(&self, rhs: &Interval) -> Verdict {
        rhs.lt(self)
    }

    pub fn ge(&self, rhs: &Interval) -> Verdict {
        rhs.le(self)
    }

    /// Equality is only ever proven between two equal points.
    pub fn eq(&self, rhs: &Interval) -> Verdict {
        if self.is_empty() || rhs.is_empty() || self.hi < rhs.lo || self.lo > rhs.hi {
            Verdict::False
        } else if self.lo == self.hi && rhs.lo == rhs.hi && self.lo == rhs.lo {
            self.proven(rhs)
        } else {
            Verdict::Maybe
        }
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let (defined, continuous) = self.flags_with(&rhs);
        Interval::with_flags(self.lo + rhs.lo, self.hi + rhs.hi, defined, continuous)
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let (defined, continuous) = self.flags_with(&rhs);
        Interval::with_flags(self.lo - rhs.hi, self.hi - rhs.lo, defined, continuous)
    }
}

impl Mul for Interval {
    type Output = Interval;

    fn mul(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let (lo, hi) = min_max4(
            self.lo * rhs.lo,
            self.lo * rhs.hi,
            self.hi * rhs.lo,
            self.hi * rhs.hi,
        );
        let (defined, continuous) = self.flags_with(&rhs);
        Interval::with_flags(lo, hi, defined, continuous)
    }
}

/// Smallest and largest of four values, ignoring NaN where possible.
pub(crate) fn min_max4(a: f64, b: f64, c: f64, d: f64) -> (f64, f64) {
    (a.min(b).min(c.min(d)), a.max(b).max(c.max(d)))
}

impl Interval {
    /// Integer power `x^n`.
    ///
    /// `0^0` is treated as undefined, so the exact point `[0, 0]` raised to 0 is empty.
    pub fn pow_n(self, n: u32) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        if n == 0 {
            if self.lo == 0.0 && self.hi == 0.0 {
                return Interval::EMPTY;
            }
            return self.keep_flags(1.0, 1.0);
        }
        if n & 1 == 1 {
            // Odd powers are monotone.
            return self.keep_flags(fast_pow(self.lo, n), fast_pow(self.hi, n));
        }
        if self.lo >= 0.0 || self.hi <= 0.0 {
            let a = fast_pow(self.lo, n);
            let b = fast_pow(self.hi, n);
            self.keep_flags(a.min(b), a.max(b))
        } else {
            self.keep_flags(0.0, fast_pow((-self.lo).max(self.hi), n))
        }
    }

    /// Integer root `x^(1/n)`, `n >= 1`.
    ///
    /// Even roots drop the negative part of the input and clear `defined` if there was one.
    pub fn root_n(self, n: u32) -> Self {
        if self.is_empty() || n == 0 {
            return Interval::EMPTY;
        }
        if n & 1 == 1 {
            return self.keep_flags(root(self.lo, n), root(self.hi, n));
        }
        if self.hi < 0.0 {
            Interval::EMPTY
        } else if self.lo >= 0.0 {
            self.keep_flags(root(self.lo, n), root(self.hi, n))
        } else {
            Interval::with_flags(0.0, root(self.hi, n), false, self.continuous)
        }
    }

    pub fn exp(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        self.keep_flags(self.lo.exp(), self.hi.exp())
    }

    pub fn ln(self) -> Self {
        if self.is_empty() || self.hi <= 0.0 {
            return Interval::EMPTY;
        }
        if self.lo <= 0.0 {
            Interval::with_flags(f64::NEG_INFINITY, self.hi.ln(), false, self.continuous)
        } else {
            self.keep_flags(self.lo.ln(), self.hi.ln())
        }
    }

    pub fn sqrt(self) -> Self {
        if self.is_empty() || self.hi < 0.0 {
            return Interval::EMPTY;
        }
        if self.lo < 0.0 {
            Interval::with_flags(0.0, self.hi.sqrt(), false, self.continuous)
        } else {
            self.keep_flags(self.lo.sqrt(), self.hi.sqrt())
        }
    }

    pub fn abs(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        if self.lo >= 0.0 {
            self
        } else if self.hi <= 0.0 {
            self.keep_flags(-self.hi, -self.lo)
        } else {
            self.keep_flags(0.0, (-self.lo).max(self.hi))
        }
    }

    /// Cosine with periodic reduction.
    ///
    /// Inputs at least a full period wide (or unbounded) give `[-1, 1]`. Otherwise the
    /// interval is shifted so that `lo ∈ [0, 2π)`; an interval starting at or past `π`
    /// is mapped through `cos(t) = -cos(t - π)`, so that what remains starts in `[0, π)`
    /// and only the extremes at `π` and `2π` need to be considered.
    pub fn cos(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        if self.lo == f64::NEG_INFINITY || self.hi == f64::INFINITY || self.width() >= TWO_PI {
            return self.keep_flags(-1.0, 1.0);
        }

        let mut lo = self.lo;
        let mut hi = self.hi;
        if lo < 0.0 {
            let n = (-lo / TWO_PI).ceil();
            lo += TWO_PI * n;
            hi += TWO_PI * n;
        } else if lo > 0.0 {
            let n = (lo / TWO_PI).floor();
            lo -= TWO_PI * n;
            hi -= TWO_PI * n;
        }

        self.reduced_cos(lo, hi)
    }

    /// Cosine of `[lo, hi]` where `lo` is already reduced to `[0, 2π]`.
    fn reduced_cos(self, lo: f64, hi: f64) -> Self {
        if lo >= PI {
            let shifted = self.reduced_cos(lo - PI, hi - PI);
            return self.keep_flags(-shifted.hi, -shifted.lo);
        }

        let at_lo = lo.cos();
        let at_hi = hi.cos();
        if hi <= PI {
            // Decreasing on [0, π].
            self.keep_flags(at_hi, at_lo)
        } else if hi <= TWO_PI {
            // Passes the minimum at π.
            self.keep_flags(-1.0, at_lo.max(at_hi))
        } else {
            // Passes both π and 2π.
            self.keep_flags(-1.0, 1.0)
        }
    }

    pub fn sin(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        self.keep_flags(self.lo - FRAC_PI_2, self.hi - FRAC_PI_2).cos()
    }

    /// Clips the input to `[-1, 1]` and applies `f`; `defined` is cleared if anything was clipped.
    fn clipped_unit(self, f: impl Fn(f64, f64) -> (f64, f64)) -> Self {
        if self.is_empty() || self.hi < -1.0 || self.lo > 1.0 {
            return Interval::EMPTY;
        }
        let (lo, hi) = f(self.lo.max(-1.0), self.hi.min(1.0));
        let defined = self.defined && self.lo >= -1.0 && self.hi <= 1.0;
        Interval::with_flags(lo, hi, defined, self.continuous)
    }

    pub fn asin(self) -> Self {
        self.clipped_unit(|lo, hi| (lo.asin(), hi.asin()))
    }

    pub fn acos(self) -> Self {
        // Decreasing.
        self.clipped_unit(|lo, hi| (hi.acos(), lo.acos()))
    }

    pub fn atan(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        self.keep_flags(self.lo.atan(), self.hi.atan())
    }

    pub fn sinh(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        self.keep_flags(self.lo.sinh(), self.hi.sinh())
    }

    pub fn cosh(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        if self.lo >= 0.0 || self.hi <= 0.0 {
            let a = self.lo.cosh();
            let b = self.hi.cosh();
            self.keep_flags(a.min(b), a.max(b))
        } else {
            self.keep_flags(1.0, (-self.lo).max(self.hi).cosh())
        }
    }

    pub fn tanh(self) -> Self {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        self.keep_flags(self.lo.tanh(), self.hi.tanh())
    }

    pub fn max(self, rhs: Interval) -> Self {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let (defined, continuous) = self.flags_with(&rhs);
        Interval::with_flags(self.lo.max(rhs.lo), self.hi.max(rhs.hi), defined, continuous)
    }

    pub fn min(self, rhs: Interval) -> Self {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        let (defined, continuous) = self.flags_with(&rhs);
        Interval::with_flags(self.lo.min(rhs.lo), self.hi.min(rhs.hi), defined, continuous)
    }
}

impl From<f64> for Interval {
    fn from(value: f64) -> Self {
        Interval::point(value)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "[{}, {}]", self.lo, self.hi)?;
        if !self.defined {
            write!(f, "?")?;
        }
        if !self.continuous {
            write!(f, "~")?;
        }
        Ok(())
    }
}
