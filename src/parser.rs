//! Textual relations.
//!
//! ```text
//! relation       = expr ( ">=" | ">" | "<=" | "<" | "=" ) expr
//! expr           = multiplicative ( ("+" | "-") multiplicative )*
//! multiplicative = exponential ( ("*" | "/") exponential )*
//! exponential    = element ( "^" element )*
//! element        = number | "(" expr ")" | "-" multiplicative
//!                | unary "(" expr ")" | binary "(" expr "," expr ")" | constant
//! ```
//!
//! Whitespace is ignored everywhere. `^` is right-associative. Names are matched by
//! prefix, longest first, so `cosh(x)` is never read as `cos` followed by garbage.
//! Nesting deeper than [`MAX_DEPTH`] is rejected with [`ParseError::TooDeep`].
//!
//! - unary: `exp cosh cos sinh sin tanh tan sqrt abs ln log arcsin arccos arctan floor ceil`
//! - binary: `pow root max min`
//! - constants: `x y pi e r a`, where `r` is the polar radius and `a` the polar angle

use std::str::FromStr;

use thiserror::Error;

use crate::expr::{BinaryOp, ExprBoxed, UnaryOp};
use crate::relation::{Comparator, Relation};

/// Errors carry the byte offset into the input where parsing stopped.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character `{found}` at {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("invalid number `{text}` at {pos}")]
    InvalidNumber { pos: usize, text: String },

    #[error("unknown identifier `{name}` at {pos}")]
    UnknownIdentifier { pos: usize, name: String },

    #[error("missing comparator at {pos}: expected one of <, <=, >, >=, =")]
    MissingComparator { pos: usize },

    #[error("expected {expected} at {pos}")]
    Expected { pos: usize, expected: &'static str },

    #[error("trailing input at {pos}")]
    TrailingInput { pos: usize },

    #[error("expression nested deeper than {} levels at {pos}", MAX_DEPTH)]
    TooDeep { pos: usize },
}

/// Bound on nesting: parentheses, unary minus, function arguments, `^` and every
/// extra operand of a `+`/`*` chain each count as one level.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Copy, Clone)]
enum Builtin {
    Unary(UnaryOp),
    Tan,
    Log,
    Binary(BinaryOp),
    X,
    Y,
    Pi,
    E,
    Radius,
    Angle,
}

/// Sorted by decreasing name length.
const BUILTINS: &[(&str, Builtin)] = &[
    ("arcsin", Builtin::Unary(UnaryOp::Asin)),
    ("arccos", Builtin::Unary(UnaryOp::Acos)),
    ("arctan", Builtin::Unary(UnaryOp::Atan)),
    ("floor", Builtin::Unary(UnaryOp::Floor)),
    ("cosh", Builtin::Unary(UnaryOp::Cosh)),
    ("sinh", Builtin::Unary(UnaryOp::Sinh)),
    ("tanh", Builtin::Unary(UnaryOp::Tanh)),
    ("sqrt", Builtin::Unary(UnaryOp::Sqrt)),
    ("ceil", Builtin::Unary(UnaryOp::Ceil)),
    ("root", Builtin::Binary(BinaryOp::Root)),
    ("exp", Builtin::Unary(UnaryOp::Exp)),
    ("cos", Builtin::Unary(UnaryOp::Cos)),
    ("sin", Builtin::Unary(UnaryOp::Sin)),
    ("tan", Builtin::Tan),
    ("abs", Builtin::Unary(UnaryOp::Abs)),
    ("log", Builtin::Log),
    ("pow", Builtin::Binary(BinaryOp::Pow)),
    ("max", Builtin::Binary(BinaryOp::Max)),
    ("min", Builtin::Binary(BinaryOp::Min)),
    ("ln", Builtin::Unary(UnaryOp::Ln)),
    ("pi", Builtin::Pi),
    ("x", Builtin::X),
    ("y", Builtin::Y),
    ("e", Builtin::E),
    ("r", Builtin::Radius),
    ("a", Builtin::Angle),
];

type Result<T> = std::result::Result<T, ParseError>;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str, expected: &'static str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else if self.peek().is_none() {
            Err(ParseError::UnexpectedEnd)
        } else {
            Err(ParseError::Expected { pos: self.pos, expected })
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(ParseError::TooDeep { pos: self.pos })
        } else {
            Ok(())
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(ParseError::TrailingInput { pos: self.pos }),
        }
    }

    fn relation(&mut self) -> Result<Relation> {
        let lhs = self.expr()?;
        let comparator = self.comparator()?;
        let rhs = self.expr()?;
        self.finish()?;
        Ok(Relation::new(&lhs, comparator, &rhs))
    }

    fn comparator(&mut self) -> Result<Comparator> {
        // Two-character operators first.
        const COMPARATORS: [(&str, Comparator); 5] = [
            (">=", Comparator::Ge),
            ("<=", Comparator::Le),
            (">", Comparator::Gt),
            ("<", Comparator::Lt),
            ("=", Comparator::Eq),
        ];
        for (token, comparator) in COMPARATORS {
            if self.eat(token) {
                return Ok(comparator);
            }
        }
        Err(ParseError::MissingComparator { pos: self.pos })
    }

    fn expr(&mut self) -> Result<ExprBoxed> {
        let depth = self.depth;
        let mut e = self.multiplicative()?;
        loop {
            if self.eat("+") {
                self.enter()?;
                e = ExprBoxed::add(e, self.multiplicative()?);
            } else if self.eat("-") {
                self.enter()?;
                e = ExprBoxed::sub(e, self.multiplicative()?);
            } else {
                self.depth = depth;
                return Ok(e);
            }
        }
    }

    fn multiplicative(&mut self) -> Result<ExprBoxed> {
        let depth = self.depth;
        let mut e = self.exponential()?;
        loop {
            if self.eat("*") {
                self.enter()?;
                e = ExprBoxed::mul(e, self.exponential()?);
            } else if self.eat("/") {
                self.enter()?;
                e = ExprBoxed::div(e, self.exponential()?);
            } else {
                self.depth = depth;
                return Ok(e);
            }
        }
    }

    fn exponential(&mut self) -> Result<ExprBoxed> {
        let base = self.element()?;
        if self.eat("^") {
            self.enter()?;
            let exponent = self.exponential()?;
            self.depth -= 1;
            Ok(ExprBoxed::pow(base, exponent))
        } else {
            Ok(base)
        }
    }

    fn element(&mut self) -> Result<ExprBoxed> {
        let Some(c) = self.peek() else {
            return Err(ParseError::UnexpectedEnd);
        };
        match c {
            '0'..='9' | '.' => self.number(),
            '(' => {
                self.pos += 1;
                self.enter()?;
                let e = self.expr()?;
                self.expect(")", "`)`")?;
                self.depth -= 1;
                Ok(e)
            }
            '-' => {
                self.pos += 1;
                self.enter()?;
                let e = self.multiplicative()?;
                self.depth -= 1;
                Ok(ExprBoxed::neg(e))
            }
            c if c.is_alphabetic() => self.identifier(),
            found => Err(ParseError::UnexpectedChar { pos: self.pos, found }),
        }
    }

    fn number(&mut self) -> Result<ExprBoxed> {
        let start = self.pos;
        let text = self.rest();
        let len = text.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(text.len());
        let text = &text[..len];
        self.pos += len;
        text.parse::<f64>()
            .map(ExprBoxed::Const)
            .map_err(|_| ParseError::InvalidNumber {
                pos: start,
                text: text.to_string(),
            })
    }

    fn identifier(&mut self) -> Result<ExprBoxed> {
        let start = self.pos;
        let rest = self.rest();
        let Some(&(name, builtin)) = BUILTINS.iter().find(|(name, _)| rest.starts_with(name)) else {
            let len = rest.find(|c: char| !c.is_alphanumeric()).unwrap_or(rest.len());
            return Err(ParseError::UnknownIdentifier {
                pos: start,
                name: rest[..len].to_string(),
            });
        };
        self.pos += name.len();

        let e = match builtin {
            Builtin::X => ExprBoxed::X,
            Builtin::Y => ExprBoxed::Y,
            Builtin::Pi => ExprBoxed::pi(),
            Builtin::E => ExprBoxed::e(),
            Builtin::Radius => ExprBoxed::radius(),
            Builtin::Angle => ExprBoxed::polar_angle(),
            Builtin::Unary(op) => ExprBoxed::unary(op, self.argument()?),
            Builtin::Tan => ExprBoxed::tan(self.argument()?),
            Builtin::Log => ExprBoxed::log10(self.argument()?),
            Builtin::Binary(op) => {
                self.expect("(", "`(`")?;
                self.enter()?;
                let a = self.expr()?;
                self.expect(",", "`,`")?;
                let b = self.expr()?;
                self.expect(")", "`)`")?;
                self.depth -= 1;
                ExprBoxed::binary(op, a, b)
            }
        };
        Ok(e)
    }

    fn argument(&mut self) -> Result<ExprBoxed> {
        self.expect("(", "`(`")?;
        self.enter()?;
        let e = self.expr()?;
        self.expect(")", "`)`")?;
        self.depth -= 1;
        Ok(e)
    }
}

/// Parses a relation such as `x^2 + y^2 < 4`. Both sides are simplified.
pub fn parse(text: &str) -> Result<Relation> {
    Parser::new(text).relation()
}

/// Parses a single expression, without simplifying it.
pub fn parse_expr(text: &str) -> Result<ExprBoxed> {
    let mut parser = Parser::new(text);
    let e = parser.expr()?;
    parser.finish()?;
    Ok(e)
}

impl FromStr for Relation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}
