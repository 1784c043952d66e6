//! Inline calculator triggers.
//!
//! A trigger is `<digits><op><digits>=?` typed anywhere on the line, with
//! `op` one of `+ - * / %`. The scanner here is pure: it reads bytes through
//! a closure and returns what it found. Splicing the result back into the
//! line happens in the input engine.

use core::fmt::{self, Write};
use core::ops::Range;

/// Arithmetic operator of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`, one decimal place, truncated.
    Div,
    /// `%`
    Rem,
}

impl Operator {
    /// Maps an operator byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'+' => Some(Operator::Add),
            b'-' => Some(Operator::Sub),
            b'*' => Some(Operator::Mul),
            b'/' => Some(Operator::Div),
            b'%' => Some(Operator::Rem),
            _ => None,
        }
    }
}

/// A recognised trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Offset of the first operand's first digit.
    pub start: usize,
    /// Offset of the operator.
    pub op_at: usize,
    /// Offset of the `?`.
    pub qmark: usize,
    /// First operand.
    pub lhs: i64,
    /// Operator.
    pub op: Operator,
    /// Second operand.
    pub rhs: i64,
}

impl Trigger {
    /// Number of bytes from the first digit through the `?`.
    pub fn span_len(&self) -> usize {
        self.qmark + 1 - self.start
    }
}

/// Decimal text of a computed value.
#[derive(Clone, Copy)]
pub struct Literal {
    buf: [u8; 24],
    len: usize,
}

impl Literal {
    const fn empty() -> Self {
        Self {
            buf: [0; 24],
            len: 0,
        }
    }

    /// The rendered bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Write for Literal {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(s) => write!(f, "Literal({:?})", s),
            Err(_) => write!(f, "Literal({:?})", self.as_bytes()),
        }
    }
}

fn digit(b: u8) -> Option<i64> {
    b.is_ascii_digit().then(|| i64::from(b - b'0'))
}

fn parse_operand(byte_at: &impl Fn(usize) -> u8, range: Range<usize>) -> Option<i64> {
    range.into_iter().try_fold(0i64, |acc, i| {
        acc.checked_mul(10)?.checked_add(digit(byte_at(i))?)
    })
}

/// Matches the trigger ending at the `?` at `qmark`.
///
/// The match never reaches below `region_start`; the first operand must
/// begin there or right after a non-digit.
pub fn match_trigger(
    byte_at: impl Fn(usize) -> u8,
    region_start: usize,
    qmark: usize,
) -> Option<Trigger> {
    if qmark <= region_start || byte_at(qmark) != b'?' || byte_at(qmark - 1) != b'=' {
        return None;
    }
    let eq = qmark - 1;

    let mut i = eq;
    while i > region_start && byte_at(i - 1).is_ascii_digit() {
        i -= 1;
    }
    if i == eq || i == region_start {
        return None;
    }
    let rhs_start = i;
    let op_at = i - 1;
    let op = Operator::from_byte(byte_at(op_at))?;

    let mut start = op_at;
    while start > region_start && byte_at(start - 1).is_ascii_digit() {
        start -= 1;
    }
    if start == op_at {
        return None;
    }

    Some(Trigger {
        start,
        op_at,
        qmark,
        lhs: parse_operand(&byte_at, start..op_at)?,
        op,
        rhs: parse_operand(&byte_at, rhs_start..eq)?,
    })
}

/// Finds the first trigger whose `?` lies in `from..region.end`.
pub fn find_trigger(
    byte_at: impl Fn(usize) -> u8,
    region: Range<usize>,
    from: usize,
) -> Option<Trigger> {
    (from.max(region.start)..region.end)
        .filter(|&i| byte_at(i) == b'?')
        .find_map(|i| match_trigger(&byte_at, region.start, i))
}

/// Computes `lhs op rhs` and renders it.
///
/// Division keeps one truncated decimal place and drops it when it is zero.
/// Returns `None` for division or remainder by zero and on overflow.
pub fn evaluate(lhs: i64, op: Operator, rhs: i64) -> Option<Literal> {
    let mut out = Literal::empty();
    let written = match op {
        Operator::Add => write!(out, "{}", lhs.checked_add(rhs)?),
        Operator::Sub => write!(out, "{}", lhs.checked_sub(rhs)?),
        Operator::Mul => write!(out, "{}", lhs.checked_mul(rhs)?),
        Operator::Rem => write!(out, "{}", lhs.checked_rem(rhs)?),
        Operator::Div => {
            let tenths = lhs.checked_mul(10)?.checked_div(rhs)?;
            if tenths % 10 == 0 {
                write!(out, "{}", tenths / 10)
            } else {
                write!(out, "{}.{}", tenths / 10, tenths % 10)
            }
        }
    };
    written.ok()?;
    Some(out)
}

/// Evaluates a matched trigger.
pub fn evaluate_trigger(trigger: &Trigger) -> Option<Literal> {
    evaluate(trigger.lhs, trigger.op, trigger.rhs)
}
