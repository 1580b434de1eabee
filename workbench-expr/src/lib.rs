//! # workbench-expr
//!
//! The textual expression language of Workbench models: relational constraints between variables,
//! integer ranges used as domains, and expanders that instantiate a constraint template for every
//! combination of a set of counters.
//!
//! ```
//! use workbench_expr::parse_constraint;
//! use workbench_expr::OperatorType;
//!
//! let result = parse_constraint("$queens[i] <> $queens[j]");
//! let expression = result.root().unwrap();
//!
//! assert_eq!(OperatorType::NotEqual, expression.operator);
//! assert_eq!("$queens[i] <> $queens[j]", expression.to_string());
//! ```
//!
//! The `parse_*` functions never panic and never return an `Err`; failures are reported through
//! [`ParseResult::errors`]. Use [`ParseResult::into_result`] to get a [`Result`] instead.

mod ast;
mod expansion;
mod parser;
mod result;

use std::str::FromStr;

pub use ast::*;
pub use expansion::*;
pub use result::*;

/// Parse `<reference> <operator> <reference or literal>`.
///
/// Blank input is an empty success.
pub fn parse_constraint(text: &str) -> ParseResult<BinaryExpression> {
    if text.trim().is_empty() {
        return ParseResult::empty();
    }

    parser::run(parser::binary_expression(), text)
}

/// Parse `<int> .. <int>`.
pub fn parse_range(text: &str) -> ParseResult<RangeExpression> {
    parser::run(parser::range_expression(), text)
}

/// Parse either an inline range or the name of a shared domain.
///
/// Blank input is an empty success.
pub fn parse_domain(text: &str) -> ParseResult<DomainExpression> {
    if text.trim().is_empty() {
        return ParseResult::empty();
    }

    parser::run(parser::domain_expression(), text)
}

/// Parse `<constraint> | <counter>, ... in <range>, ...`.
///
/// Blank input is an empty success.
pub fn parse_expander(text: &str) -> ParseResult<ExpanderExpression> {
    if text.trim().is_empty() {
        return ParseResult::empty();
    }

    parser::run(parser::expander_expression(), text)
}

/// Parse the definition of a constraint, which is blank, a binary expression or an expander.
pub fn parse_constraint_expression(text: &str) -> ParseResult<ConstraintExpression> {
    if text.trim().is_empty() {
        return ParseResult::success(ConstraintExpression::Empty);
    }

    if text.contains('|') {
        parse_expander(text).map(ConstraintExpression::Expander)
    } else {
        parse_constraint(text).map(ConstraintExpression::Binary)
    }
}

fn required<T>(result: ParseResult<T>, text: &str) -> Result<T, ParseError> {
    result.into_result()?.ok_or_else(|| {
        ParseError::single(
            "expected an expression",
            Span {
                start: 0,
                end: text.len(),
            },
        )
    })
}

impl FromStr for BinaryExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        required(parse_constraint(s), s)
    }
}

impl FromStr for RangeExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        required(parse_range(s), s)
    }
}

impl FromStr for DomainExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        required(parse_domain(s), s)
    }
}

impl FromStr for ExpanderExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        required(parse_expander(s), s)
    }
}

impl FromStr for ConstraintExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        required(parse_constraint_expression(s), s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_whitespace() {
        let result = parse_range("  1 ..   9 ");

        assert_eq!(ParseStatus::Success, result.status());
        let range = result.root().expect("range");
        assert_eq!(1, range.lower);
        assert_eq!(9, range.upper);
        assert_eq!(9, range.size());
        assert_eq!((1..=9).collect::<Vec<_>>(), range.values().collect::<Vec<_>>());
    }

    #[test]
    fn negative_range() {
        let range: RangeExpression = "-5..-1".parse().expect("valid range");

        assert_eq!(RangeExpression { lower: -5, upper: -1 }, range);
    }

    #[test]
    fn range_failures() {
        for text in ["", "1 9", "a..9", "1..b", "9..1", "1..", "..9"] {
            let result = parse_range(text);
            assert_eq!(ParseStatus::Failed, result.status(), "input {text:?}");
            assert!(!result.errors().is_empty());
            assert!(result.root().is_none());
        }
    }

    #[test]
    fn inverted_range_names_the_bands() {
        let result = parse_range("9..1");

        assert!(result.errors()[0].message.contains("exceeds"));
    }

    #[test]
    fn operator_mapping() {
        let cases = [
            ("=", OperatorType::Equals),
            ("!=", OperatorType::NotEqual),
            ("<>", OperatorType::NotEqual),
            (">", OperatorType::Greater),
            ("<", OperatorType::Less),
            (">=", OperatorType::GreaterThanOrEqual),
            ("<=", OperatorType::LessThanOrEqual),
        ];

        for (token, operator) in cases {
            let text = format!("$x {token} $y");
            let expression = parse_constraint(&text).into_root().expect("valid constraint");
            assert_eq!(operator, expression.operator, "token {token}");
        }
    }

    #[test]
    fn display_round_trips() {
        for text in [
            "x = y",
            "x <> 5",
            "x >= -3",
            "$x[1] <= $y[2]",
            "$x[i + 1] > $x[(i - 1) * 2]",
            "$x[-i] < $x[size(x) - i]",
        ] {
            let expression: BinaryExpression = text.parse().expect("valid constraint");
            let rendered = expression.to_string();
            assert_eq!(text, rendered);

            let reparsed: BinaryExpression = rendered.parse().expect("rendering re-parses");
            assert_eq!(expression, reparsed);
        }
    }

    #[test]
    fn dollar_prefix_is_optional() {
        let with: BinaryExpression = "$x[1] = $y".parse().expect("valid");
        let without: BinaryExpression = "x[1] = y".parse().expect("valid");

        assert_eq!(with, without);
    }

    #[test]
    fn empty_constraint_is_empty_success() {
        let result = parse_constraint("   ");

        assert!(result.is_success());
        assert!(result.is_empty());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn literal_on_the_left_is_rejected() {
        let result = parse_constraint("5 = x");

        assert_eq!(ParseStatus::Failed, result.status());
        assert!(result.errors()[0].message.contains("left-hand side"));
    }

    #[test]
    fn malformed_constraints_fail() {
        for text in ["x", "x =", "x == y", "x = y z", "x[ = y", "x[1 = y", "= y"] {
            assert!(!parse_constraint(text).is_success(), "input {text:?}");
        }
    }

    #[test]
    fn domain_forms() {
        assert_eq!(
            Some(&DomainExpression::Inline(RangeExpression { lower: 0, upper: 3 })),
            parse_domain("0..3").root()
        );
        assert_eq!(
            Some(&DomainExpression::Shared("digits".to_owned())),
            parse_domain(" digits ").root()
        );
        assert!(parse_domain("").is_empty());
    }

    #[test]
    fn expander_structure() {
        let expander: ExpanderExpression =
            "$x[i] <> $x[j] | i,j in 1..10,i+1..10".parse().expect("valid");

        assert_eq!(2, expander.counters.len());
        assert_eq!("i", expander.counters[0].counter);
        assert_eq!(Some(1), expander.counters[0].lower.as_literal());
        assert_eq!("$x[i] <> $x[j] | i,j in 1..10,i + 1..10", expander.to_string());
    }

    #[test]
    fn expander_counter_and_range_counts_must_match() {
        let result = parse_expander("$x[i] <> $x[j] | i,j in 1..10");

        assert!(!result.is_success());
        assert!(result.errors()[0].message.contains("2 index variables"));
    }

    #[test]
    fn expander_counters_must_be_distinct() {
        let result = parse_expander("$x[i] <> $x[i] | i,i in 1..3,1..3");

        assert!(!result.is_success());
        assert!(result.errors()[0].message.contains("more than once"));
    }

    #[test]
    fn constraint_expression_selects_the_form() {
        assert_eq!(
            Some(&ConstraintExpression::Empty),
            parse_constraint_expression("").root()
        );
        assert!(matches!(
            parse_constraint_expression("x < y").root(),
            Some(ConstraintExpression::Binary(_))
        ));
        assert!(matches!(
            parse_constraint_expression("$x[i] < y | i in 1..2").root(),
            Some(ConstraintExpression::Expander(_))
        ));
    }

    #[test]
    fn errors_carry_spans() {
        let result = parse_constraint("x = ");

        let error = result.into_result().expect_err("incomplete constraint");
        assert!(error.diagnostics[0].span.start <= 4);
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn arbitrary_input_never_panics() {
        for text in ["$", "[", "x[", "|", "x = y |", "x = y | in", "1..2..3", "\u{1F600}", "--", "x[2147483648] = y"] {
            let _ = parse_constraint(text);
            let _ = parse_range(text);
            let _ = parse_domain(text);
            let _ = parse_expander(text);
            let _ = parse_constraint_expression(text);
        }
    }
}
