//! Expression trees over the two plane coordinates `x` and `y`.
//!
//! Expressions come in two shapes:
//!
//! - [`ExprBoxed`]: an owned tree, convenient to build (parser) and rewrite
//!   ([`simplify`][crate::simplify]).
//! - [`ExprArena`]: the same tree flattened into a vector in breadth-first order,
//!   so that every child sits after its parent. Evaluation walks the vector backwards
//!   and never recurses.
//!
//! Rewriting, printing and dropping an [`ExprBoxed`] do recurse. Parsed expressions are
//! at most [`MAX_DEPTH`][crate::parser::MAX_DEPTH] levels deep.
//!
//! Both evaluation modes share the arena: [`ExprArena::eval`] at a point and
//! [`ExprArena::eval_set`] over interval sets.

use std::collections::VecDeque;
use std::f64::consts::{E, LN_10, PI};
use std::fmt;

use crate::interval_set::IntervalSet;
use crate::math::{angle, fast_pow, root};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Sqrt,
    Exp,
    Cos,
    Sin,
    Abs,
    Ln,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Exp => "exp",
            UnaryOp::Cos => "cos",
            UnaryOp::Sin => "sin",
            UnaryOp::Abs => "abs",
            UnaryOp::Ln => "ln",
            UnaryOp::Asin => "arcsin",
            UnaryOp::Acos => "arccos",
            UnaryOp::Atan => "arctan",
            UnaryOp::Sinh => "sinh",
            UnaryOp::Cosh => "cosh",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Floor => "floor",
            UnaryOp::Ceil => "ceil",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Atan => x.atan(),
            UnaryOp::Sinh => x.sinh(),
            UnaryOp::Cosh => x.cosh(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Ceil => x.ceil(),
        }
    }

    pub fn apply_set(self, x: &IntervalSet) -> IntervalSet {
        match self {
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Atan => x.atan(),
            UnaryOp::Sinh => x.sinh(),
            UnaryOp::Cosh => x.cosh(),
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Ceil => x.ceil(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Root,
    Max,
    Min,
    /// Polar angle of the point `(lhs, rhs)`, in `[0, 2π)`.
    Angle,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Root => a.powf(1.0 / b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Min => a.min(b),
            BinaryOp::Angle => angle(a, b),
        }
    }

    pub fn apply_set(self, a: &IntervalSet, b: &IntervalSet) -> IntervalSet {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.pow(b),
            BinaryOp::Root => a.root(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Min => a.min(b),
            BinaryOp::Angle => a.angle(b),
        }
    }

    /// Infix symbol, or `None` for operators printed in function form.
    fn symbol(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("+"),
            BinaryOp::Sub => Some("-"),
            BinaryOp::Mul => Some("*"),
            BinaryOp::Div => Some("/"),
            BinaryOp::Pow => Some("^"),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Pow => "pow",
            BinaryOp::Root => "root",
            BinaryOp::Max => "max",
            BinaryOp::Min => "min",
            BinaryOp::Angle => "angle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprBoxed {
    Const(f64),
    X,
    Y,
    Unary(UnaryOp, Box<ExprBoxed>),
    Binary(BinaryOp, Box<ExprBoxed>, Box<ExprBoxed>),
    /// Integer power with a non-negative exponent.
    PowN(Box<ExprBoxed>, u32),
    /// Integer root with a positive index.
    RootN(Box<ExprBoxed>, u32),
}

impl ExprBoxed {
    pub fn constant(value: f64) -> Self {
        ExprBoxed::Const(value)
    }

    pub fn unary(op: UnaryOp, arg: Self) -> Self {
        ExprBoxed::Unary(op, Box::new(arg))
    }

    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        ExprBoxed::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn add(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Div, lhs, rhs)
    }

    pub fn pow(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Pow, lhs, rhs)
    }

    pub fn root(lhs: Self, rhs: Self) -> Self {
        Self::binary(BinaryOp::Root, lhs, rhs)
    }

    /// `-e`, built as `0 - e`.
    pub fn neg(arg: Self) -> Self {
        Self::sub(ExprBoxed::Const(0.0), arg)
    }

    /// `e^n` for any integer `n`; negative exponents become `1 / e^|n|`.
    pub fn pow_n(arg: Self, n: i32) -> Self {
        let pow = ExprBoxed::PowN(Box::new(arg), n.unsigned_abs());
        if n >= 0 {
            pow
        } else {
            Self::div(ExprBoxed::Const(1.0), pow)
        }
    }

    pub fn root_n(arg: Self, n: u32) -> Self {
        ExprBoxed::RootN(Box::new(arg), n)
    }

    /// `tan(e) = sin(e) / cos(e)`.
    pub fn tan(arg: Self) -> Self {
        Self::div(
            Self::unary(UnaryOp::Sin, arg.clone()),
            Self::unary(UnaryOp::Cos, arg),
        )
    }

    /// Decimal logarithm, `ln(e) / ln(10)`.
    pub fn log10(arg: Self) -> Self {
        Self::div(Self::unary(UnaryOp::Ln, arg), ExprBoxed::Const(LN_10))
    }

    /// Polar radius `sqrt(x^2 + y^2)`.
    pub fn radius() -> Self {
        Self::unary(
            UnaryOp::Sqrt,
            Self::add(Self::pow_n(ExprBoxed::X, 2), Self::pow_n(ExprBoxed::Y, 2)),
        )
    }

    /// Polar angle of `(x, y)`.
    pub fn polar_angle() -> Self {
        Self::binary(BinaryOp::Angle, ExprBoxed::X, ExprBoxed::Y)
    }

    pub fn pi() -> Self {
        ExprBoxed::Const(PI)
    }

    pub fn e() -> Self {
        ExprBoxed::Const(E)
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            ExprBoxed::Const(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for ExprBoxed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprBoxed::Const(c) => write!(f, "{}", c),
            ExprBoxed::X => write!(f, "x"),
            ExprBoxed::Y => write!(f, "y"),
            ExprBoxed::Unary(op, a) => write!(f, "{}({})", op.name(), a),
            ExprBoxed::Binary(op, a, b) => match op.symbol() {
                Some(symbol) => write!(f, "({} {} {})", a, symbol, b),
                None => write!(f, "{}({}, {})", op.name(), a, b),
            },
            ExprBoxed::PowN(a, n) => write!(f, "{}^{}", a, n),
            ExprBoxed::RootN(a, n) => write!(f, "root({}, {})", a, n),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Idx(usize);

/// One arena node; children are referenced by `I`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Expr<I = Idx> {
    Const(f64),
    X,
    Y,
    Unary(UnaryOp, I),
    Binary(BinaryOp, I, I),
    PowN(I, u32),
    RootN(I, u32),
}

impl<A> Expr<A> {
    #[inline(always)]
    pub fn fmap<B, F>(self, mut f: F) -> Expr<B>
    where
        F: FnMut(A) -> B,
    {
        match self {
            Expr::Const(c) => Expr::Const(c),
            Expr::X => Expr::X,
            Expr::Y => Expr::Y,
            Expr::Unary(op, a) => Expr::Unary(op, f(a)),
            Expr::Binary(op, a, b) => Expr::Binary(op, f(a), f(b)),
            Expr::PowN(a, n) => Expr::PowN(f(a), n),
            Expr::RootN(a, n) => Expr::RootN(f(a), n),
        }
    }
}

// See: https://recursion.wtf/posts/rust_schemes/
#[derive(Debug, Clone)]
pub struct ExprArena {
    /// Topologically sorted expressions, by construction: the root is at index 0
    /// and every child comes after its parent.
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn get(&self, idx: Idx) -> &Expr {
        &self.exprs[idx.0]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    fn expand_exprs<R, F>(seed: R, expand: F) -> Self
    where
        R: Clone,
        F: Fn(R) -> Expr<R>,
    {
        let mut frontier: VecDeque<R> = VecDeque::from([seed]);
        let mut exprs: Vec<Expr> = vec![];

        while let Some(seed) = frontier.pop_front() {
            let expr = expand(seed);
            let expr = expr.fmap(|e| {
                frontier.push_back(e);
                Idx(exprs.len() + frontier.len())
            });
            exprs.push(expr);
        }

        Self { exprs }
    }

    pub fn from_boxed(ast: &ExprBoxed) -> Self {
        Self::expand_exprs(ast, |seed| match seed {
            ExprBoxed::Const(c) => Expr::Const(*c),
            ExprBoxed::X => Expr::X,
            ExprBoxed::Y => Expr::Y,
            ExprBoxed::Unary(op, a) => Expr::Unary(*op, a.as_ref()),
            ExprBoxed::Binary(op, a, b) => Expr::Binary(*op, a.as_ref(), b.as_ref()),
            ExprBoxed::PowN(a, n) => Expr::PowN(a.as_ref(), *n),
            ExprBoxed::RootN(a, n) => Expr::RootN(a.as_ref(), *n),
        })
    }

    fn collapse_exprs<R, F>(&self, mut collapse: F) -> R
    where
        F: FnMut(Expr<R>) -> R,
    {
        let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(self.exprs.len()).collect();

        for (i, &expr) in self.exprs.iter().enumerate().rev() {
            let expr = expr.fmap(|idx| results[idx.0].take().expect("children are collapsed before parents"));
            results[i] = Some(collapse(expr));
        }

        results
            .into_iter()
            .next()
            .flatten()
            .expect("arena has a root")
    }

    /// Evaluates at the point `(x, y)`.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.collapse_exprs(|expr| match expr {
            Expr::Const(c) => c,
            Expr::X => x,
            Expr::Y => y,
            Expr::Unary(op, a) => op.apply(a),
            Expr::Binary(op, a, b) => op.apply(a, b),
            Expr::PowN(a, n) => fast_pow(a, n),
            Expr::RootN(a, n) => root(a, n),
        })
    }

    /// Evaluates the interval extension over the box `x × y`.
    pub fn eval_set(&self, x: &IntervalSet, y: &IntervalSet) -> IntervalSet {
        self.collapse_exprs(|expr| match expr {
            Expr::Const(c) => IntervalSet::point(c),
            Expr::X => x.clone(),
            Expr::Y => y.clone(),
            Expr::Unary(op, a) => op.apply_set(&a),
            Expr::Binary(op, a, b) => op.apply_set(&a, &b),
            Expr::PowN(a, n) => a.pow_n(n),
            Expr::RootN(a, n) => a.root_n(n),
        })
    }

    pub fn to_boxed(&self) -> ExprBoxed {
        self.collapse_exprs(|expr| match expr {
            Expr::Const(c) => ExprBoxed::Const(c),
            Expr::X => ExprBoxed::X,
            Expr::Y => ExprBoxed::Y,
            Expr::Unary(op, a) => ExprBoxed::unary(op, a),
            Expr::Binary(op, a, b) => ExprBoxed::binary(op, a, b),
            Expr::PowN(a, n) => ExprBoxed::PowN(Box::new(a), n),
            Expr::RootN(a, n) => ExprBoxed::RootN(Box::new(a), n),
        })
    }
}

impl From<&ExprBoxed> for ExprArena {
    fn from(ast: &ExprBoxed) -> Self {
        Self::from_boxed(ast)
    }
}

impl fmt::Display for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    fn circle() -> ExprBoxed {
        ExprBoxed::add(ExprBoxed::pow_n(ExprBoxed::X, 2), ExprBoxed::pow_n(ExprBoxed::Y, 2))
    }

    #[test]
    fn test_arena_layout() {
        let arena = ExprArena::from_boxed(&circle());
        assert_eq!(arena.len(), 5);
        assert!(matches!(arena.get(Idx(0)), Expr::Binary(BinaryOp::Add, Idx(1), Idx(2))));
        assert!(matches!(arena.get(Idx(1)), Expr::PowN(Idx(3), 2)));
        assert!(matches!(arena.get(Idx(2)), Expr::PowN(Idx(4), 2)));
    }

    #[test]
    fn test_roundtrip_boxed() {
        let ast = ExprBoxed::sub(circle(), ExprBoxed::unary(UnaryOp::Cos, ExprBoxed::X));
        let arena = ExprArena::from_boxed(&ast);
        assert_eq!(arena.to_boxed(), ast);
    }

    #[test]
    fn test_eval_point() {
        let arena = ExprArena::from_boxed(&circle());
        assert_eq!(arena.eval(3.0, 4.0), 25.0);
        assert_eq!(arena.eval(-1.0, 0.0), 1.0);
    }

    #[test]
    fn test_eval_set() {
        let arena = ExprArena::from_boxed(&circle());
        let x = IntervalSet::from(Interval::new(-1.0, 2.0));
        let y = IntervalSet::from(Interval::new(1.0, 2.0));
        let r = arena.eval_set(&x, &y);
        assert_eq!(r.intervals(), &[Interval::new(1.0, 8.0)]);
    }

    #[test]
    fn test_negative_pow() {
        let arena = ExprArena::from_boxed(&ExprBoxed::pow_n(ExprBoxed::X, -2));
        assert_eq!(arena.eval(2.0, 0.0), 0.25);
    }

    #[test]
    fn test_tan_log() {
        let tan = ExprArena::from_boxed(&ExprBoxed::tan(ExprBoxed::X));
        assert!((tan.eval(0.5, 0.0) - 0.5f64.tan()).abs() < 1e-12);
        let log = ExprArena::from_boxed(&ExprBoxed::log10(ExprBoxed::X));
        assert!((log.eval(1000.0, 0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_polar() {
        let r = ExprArena::from_boxed(&ExprBoxed::radius());
        assert_eq!(r.eval(3.0, 4.0), 5.0);
        let a = ExprArena::from_boxed(&ExprBoxed::polar_angle());
        assert!((a.eval(0.0, -1.0) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_nan_constant_is_empty() {
        let arena = ExprArena::from_boxed(&ExprBoxed::Const(f64::NAN));
        let unit = IntervalSet::from(Interval::new(0.0, 1.0));
        assert!(arena.eval_set(&unit, &unit).is_empty());
    }

    #[test]
    fn test_display() {
        let ast = ExprBoxed::sub(circle(), ExprBoxed::Const(4.0));
        assert_eq!(ast.to_string(), "((x^2 + y^2) - 4)");
        let ast = ExprBoxed::binary(BinaryOp::Max, ExprBoxed::X, ExprBoxed::unary(UnaryOp::Sin, ExprBoxed::Y));
        assert_eq!(ast.to_string(), "max(x, sin(y))");
    }
}
