//! Expression rewriting passes.
//!
//! - [`const_fold`] collapses every constant subtree into a single constant.
//! - [`canonicalize_powers`] turns `e ^ n` and `root(e, n)` with an integer constant
//!   `n` into the dedicated [`PowN`][ExprBoxed::PowN] / [`RootN`][ExprBoxed::RootN]
//!   nodes. This is not only faster: the generic power is `exp(n * ln(e))`, which is
//!   undefined for negative `e`, while `x^3` is perfectly defined for negative `x`.
//!
//! [`simplify`] runs both, in that order. Running it twice changes nothing.

use log::debug;

use crate::expr::{BinaryOp, ExprBoxed};
use crate::math::{fast_pow, is_integer, root};

/// Constant folding followed by integer power/root canonicalisation.
pub fn simplify(expr: &ExprBoxed) -> ExprBoxed {
    let simplified = canonicalize_powers(&const_fold(expr));
    debug!("simplify: {} => {}", expr, simplified);
    simplified
}

/// An integral constant usable as an integer exponent.
fn as_int_exponent(value: f64) -> Option<i32> {
    if is_integer(value) && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// An integral constant usable as a root index (`n >= 1`).
fn as_root_index(value: f64) -> Option<u32> {
    match as_int_exponent(value) {
        Some(n) if n >= 1 => Some(n as u32),
        _ => None,
    }
}

pub fn const_fold(expr: &ExprBoxed) -> ExprBoxed {
    match expr {
        ExprBoxed::Const(_) | ExprBoxed::X | ExprBoxed::Y => expr.clone(),
        ExprBoxed::Unary(op, a) => {
            let a = const_fold(a);
            match a.as_const() {
                Some(c) => ExprBoxed::Const(op.apply(c)),
                None => ExprBoxed::unary(*op, a),
            }
        }
        ExprBoxed::Binary(op, a, b) => {
            let a = const_fold(a);
            let b = const_fold(b);
            match (a.as_const(), b.as_const()) {
                (Some(ca), Some(cb)) => match (op, as_root_index(cb)) {
                    (BinaryOp::Root, Some(n)) => ExprBoxed::Const(root(ca, n)),
                    _ => ExprBoxed::Const(op.apply(ca, cb)),
                },
                _ => ExprBoxed::binary(*op, a, b),
            }
        }
        ExprBoxed::PowN(a, n) => {
            let a = const_fold(a);
            match a.as_const() {
                Some(c) => ExprBoxed::Const(fast_pow(c, *n)),
                None => ExprBoxed::PowN(Box::new(a), *n),
            }
        }
        ExprBoxed::RootN(a, n) => {
            let a = const_fold(a);
            match a.as_const() {
                Some(c) => ExprBoxed::Const(root(c, *n)),
                None => ExprBoxed::RootN(Box::new(a), *n),
            }
        }
    }
}

pub fn canonicalize_powers(expr: &ExprBoxed) -> ExprBoxed {
    match expr {
        ExprBoxed::Const(_) | ExprBoxed::X | ExprBoxed::Y => expr.clone(),
        ExprBoxed::Unary(op, a) => ExprBoxed::unary(*op, canonicalize_powers(a)),
        ExprBoxed::Binary(op, a, b) => {
            let a = canonicalize_powers(a);
            let b = canonicalize_powers(b);
            match op {
                BinaryOp::Pow => match b.as_const().and_then(as_int_exponent) {
                    Some(n) => ExprBoxed::pow_n(a, n),
                    None => ExprBoxed::pow(a, b),
                },
                BinaryOp::Root => match b.as_const().and_then(as_root_index) {
                    Some(n) => ExprBoxed::root_n(a, n),
                    None => ExprBoxed::root(a, b),
                },
                _ => ExprBoxed::binary(*op, a, b),
            }
        }
        ExprBoxed::PowN(a, n) => ExprBoxed::PowN(Box::new(canonicalize_powers(a)), *n),
        ExprBoxed::RootN(a, n) => ExprBoxed::RootN(Box::new(canonicalize_powers(a)), *n),
    }
}
