// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use core::fmt::{self, Display, Formatter};

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// One boundary of a value range.
///
/// `Min` and `Max` stand for the smallest and largest value the enclosing
/// type admits; they resolve against the base type downstream. Ordering
/// places `Min` below every number and `Max` above every number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bound {
    Min,
    Value(Number),
    Max,
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min => f.write_str("min"),
            Bound::Max => f.write_str("max"),
            Bound::Value(n) => f.write_str(&n.format_decimal()),
        }
    }
}

impl Serialize for Bound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Bound::Min => serializer.serialize_str("min"),
            Bound::Max => serializer.serialize_str("max"),
            Bound::Value(n) => n.serialize(serializer),
        }
    }
}

/// Closed interval `lower..upper` with `lower <= upper`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueRange {
    lower: Bound,
    upper: Bound,
}

impl ValueRange {
    pub fn new(lower: Bound, upper: Bound) -> Self {
        Self { lower, upper }
    }

    /// Degenerate range covering a single value.
    pub fn of(value: Bound) -> Self {
        Self {
            lower: value.clone(),
            upper: value,
        }
    }

    pub fn lower(&self) -> &Bound {
        &self.lower
    }

    pub fn upper(&self) -> &Bound {
        &self.upper
    }
}

impl Display for ValueRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}..{}", self.lower, self.upper)
        }
    }
}

impl Serialize for ValueRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("ValueRange", 2)?;
        s.serialize_field("lower", &self.lower)?;
        s.serialize_field("upper", &self.upper)?;
        s.end()
    }
}

/// Render a resolved range set back into constraint-expression form.
///
/// Parsing the result reproduces the set exactly.
pub fn format_ranges(ranges: &[ValueRange]) -> String {
    let parts: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
    parts.join("|")
}

/// Resolve a `range` expression. Boundaries may be decimals; a token
/// without a `.` stays an exact integer.
pub fn parse_range_expression(expr: &str, span: &Span) -> Result<Vec<ValueRange>> {
    parse_ranges(expr, span, Number::parse_decimal, "decimal number")
}

/// Resolve a `length` expression. Boundaries must be integers.
pub fn parse_length_expression(expr: &str, span: &Span) -> Result<Vec<ValueRange>> {
    parse_ranges(expr, span, Number::parse_integer, "integer")
}

fn parse_boundary(
    token: &str,
    span: &Span,
    parse: fn(&str) -> Option<Number>,
    expected: &str,
) -> Result<Bound> {
    match token {
        "max" => Ok(Bound::Max),
        "min" => Ok(Bound::Min),
        _ => match parse(token) {
            Some(n) => Ok(Bound::Value(n)),
            None => Err(Error::MalformedConstraint {
                value: token.into(),
                expected: expected.into(),
                span: span.clone(),
            }),
        },
    }
}

fn parse_ranges(
    expr: &str,
    span: &Span,
    parse: fn(&str) -> Option<Number>,
    expected: &str,
) -> Result<Vec<ValueRange>> {
    let mut ranges: Vec<ValueRange> = Vec::new();

    for single in expr.split('|') {
        let single = single.trim();
        let mut boundaries = single.split("..").map(str::trim);

        let min = parse_boundary(boundaries.next().unwrap_or(""), span, parse, expected)?;

        let max = match boundaries.next() {
            Some(token) => {
                let max = parse_boundary(token, span, parse, expected)?;
                if min > max {
                    return Err(Error::DescendingBounds {
                        range: single.into(),
                        span: span.clone(),
                    });
                }
                if boundaries.next().is_some() {
                    return Err(Error::TooManyBoundaries {
                        range: single.into(),
                        span: span.clone(),
                    });
                }
                max
            }
            None => min.clone(),
        };

        // Each sub-range must start strictly above the previous one. A set
        // that is disjoint but out of order is still rejected.
        if let Some(previous) = ranges.last() {
            if min <= *previous.upper() {
                return Err(Error::OverlappingRanges {
                    expression: expr.into(),
                    span: span.clone(),
                });
            }
        }
        ranges.push(ValueRange::new(min, max));
    }

    Ok(ranges)
}
