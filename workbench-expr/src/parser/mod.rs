//! `chumsky` parsers for the expression language.
//!
//! The grammar works directly on characters; every token parser is padded, so whitespace is
//! insignificant around tokens. Integers are 32-bit, and out-of-range literals are reported as
//! parse errors rather than wrapped.

use std::collections::BTreeSet;

use chumsky::error::Rich;
use chumsky::extra;
use chumsky::prelude::choice;
use chumsky::prelude::end;
use chumsky::prelude::just;
use chumsky::prelude::recursive;
use chumsky::text;
use chumsky::IterParser;
use chumsky::Parser;

use crate::ast::ArithmeticOperator;
use crate::ast::BinaryExpression;
use crate::ast::CounterRange;
use crate::ast::DomainExpression;
use crate::ast::ExpanderExpression;
use crate::ast::IndexExpression;
use crate::ast::Operand;
use crate::ast::OperatorType;
use crate::ast::RangeExpression;
use crate::ast::VariableReference;
use crate::result::Diagnostic;
use crate::result::ParseResult;

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Run `parser` over the complete `text`, converting the chumsky errors into diagnostics.
pub(crate) fn run<'src, T>(
    parser: impl Parser<'src, &'src str, T, Extra<'src>>,
    text: &'src str,
) -> ParseResult<T> {
    match parser.then_ignore(end()).parse(text).into_result() {
        Ok(root) => ParseResult::success(root),
        Err(reasons) => ParseResult::failed(
            reasons
                .into_iter()
                .map(|reason| Diagnostic {
                    message: reason.to_string(),
                    span: (*reason.span()).into(),
                })
                .collect(),
        ),
    }
}

pub(crate) fn binary_expression<'src>(
) -> impl Parser<'src, &'src str, BinaryExpression, Extra<'src>> + Clone {
    operand()
        .then(operator())
        .then(operand())
        .try_map(|((left, operator), right), span| match left {
            Operand::Variable(left) => Ok(BinaryExpression {
                left,
                operator,
                right,
            }),
            Operand::Literal(_) => Err(Rich::custom(
                span,
                "the left-hand side of a constraint must be a variable",
            )),
        })
}

/// `<constraint> | <counter>(, <counter>)* in <range>(, <range>)*`
pub(crate) fn expander_expression<'src>(
) -> impl Parser<'src, &'src str, ExpanderExpression, Extra<'src>> + Clone {
    let counters = identifier()
        .separated_by(just(',').padded())
        .at_least(1)
        .collect::<Vec<_>>();

    let ranges = index_range()
        .separated_by(just(',').padded())
        .at_least(1)
        .collect::<Vec<_>>();

    binary_expression()
        .then_ignore(just('|').padded())
        .then(counters)
        .then_ignore(just("in").padded())
        .then(ranges)
        .try_map(|((template, counters), ranges), span| {
            if counters.len() != ranges.len() {
                return Err(Rich::custom(
                    span,
                    format!(
                        "{} index variables are given {} ranges",
                        counters.len(),
                        ranges.len()
                    ),
                ));
            }

            let mut seen = BTreeSet::new();
            if let Some(duplicate) = counters.iter().find(|counter| !seen.insert(counter.as_str())) {
                return Err(Rich::custom(
                    span,
                    format!("index variable '{duplicate}' is bound more than once"),
                ));
            }

            let counters = counters
                .into_iter()
                .zip(ranges)
                .map(|(counter, (lower, upper))| CounterRange {
                    counter,
                    lower,
                    upper,
                })
                .collect();

            Ok(ExpanderExpression { template, counters })
        })
}

/// `<int> .. <int>`, where the lower band may not exceed the upper band.
pub(crate) fn range_expression<'src>(
) -> impl Parser<'src, &'src str, RangeExpression, Extra<'src>> + Clone {
    integer()
        .then_ignore(just("..").padded())
        .then(integer())
        .try_map(|(lower, upper), span| {
            if lower <= upper {
                Ok(RangeExpression { lower, upper })
            } else {
                Err(Rich::custom(
                    span,
                    format!("the lower band {lower} exceeds the upper band {upper}"),
                ))
            }
        })
}

pub(crate) fn domain_expression<'src>(
) -> impl Parser<'src, &'src str, DomainExpression, Extra<'src>> + Clone {
    choice((
        range_expression().map(DomainExpression::Inline),
        identifier().map(DomainExpression::Shared),
    ))
}

fn operand<'src>() -> impl Parser<'src, &'src str, Operand, Extra<'src>> + Clone {
    choice((
        integer().map(Operand::Literal),
        reference().map(Operand::Variable),
    ))
}

/// `x`, `$x`, `x[<index>]` or `$x[<index>]`.
fn reference<'src>() -> impl Parser<'src, &'src str, VariableReference, Extra<'src>> + Clone {
    just('$')
        .padded()
        .or_not()
        .ignore_then(identifier())
        .then(
            index_expression()
                .delimited_by(just('[').padded(), just(']').padded())
                .or_not(),
        )
        .map(|(name, subscript)| VariableReference { name, subscript })
}

fn operator<'src>() -> impl Parser<'src, &'src str, OperatorType, Extra<'src>> + Clone {
    // Two-character operators must be tried before their one-character prefixes.
    choice((
        just("!=").to(OperatorType::NotEqual),
        just("<>").to(OperatorType::NotEqual),
        just(">=").to(OperatorType::GreaterThanOrEqual),
        just("<=").to(OperatorType::LessThanOrEqual),
        just("=").to(OperatorType::Equals),
        just(">").to(OperatorType::Greater),
        just("<").to(OperatorType::Less),
    ))
    .padded()
}

fn index_range<'src>(
) -> impl Parser<'src, &'src str, (IndexExpression, IndexExpression), Extra<'src>> + Clone {
    index_expression()
        .then_ignore(just("..").padded())
        .then(index_expression())
}

/// Integer arithmetic over counters with the usual precedence: unary minus binds tightest, then
/// `*`, then `+` and `-`, all left-associative.
fn index_expression<'src>() -> impl Parser<'src, &'src str, IndexExpression, Extra<'src>> + Clone
{
    recursive(|expression| {
        let size = just("size")
            .padded()
            .ignore_then(identifier().delimited_by(just('(').padded(), just(')').padded()))
            .map(IndexExpression::Size);

        let atom = choice((
            unsigned_integer().map(IndexExpression::Literal),
            size,
            identifier().map(IndexExpression::Counter),
            expression.delimited_by(just('(').padded(), just(')').padded()),
        ));

        let unary = just('-')
            .padded()
            .repeated()
            .foldr(atom, |_, operand| IndexExpression::Negate(Box::new(operand)));

        let product = unary.clone().foldl(
            just('*')
                .padded()
                .to(ArithmeticOperator::Multiply)
                .then(unary)
                .repeated(),
            |lhs, (operator, rhs)| IndexExpression::binary(lhs, operator, rhs),
        );

        product.clone().foldl(
            choice((
                just('+').padded().to(ArithmeticOperator::Add),
                just('-').padded().to(ArithmeticOperator::Subtract),
            ))
            .then(product)
            .repeated(),
            |lhs, (operator, rhs)| IndexExpression::binary(lhs, operator, rhs),
        )
    })
}

fn identifier<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    text::ascii::ident()
        .map(|ident: &str| ident.to_owned())
        .padded()
}

/// A signed 32-bit integer literal; the sign must directly precede the digits.
fn integer<'src>() -> impl Parser<'src, &'src str, i32, Extra<'src>> + Clone {
    just('-')
        .or_not()
        .then(text::int(10))
        .to_slice()
        .try_map(|slice: &str, span| {
            slice
                .parse::<i32>()
                .map_err(|_| Rich::custom(span, format!("integer '{slice}' is out of range")))
        })
        .padded()
}

fn unsigned_integer<'src>() -> impl Parser<'src, &'src str, i32, Extra<'src>> + Clone {
    text::int(10)
        .try_map(|digits: &str, span| {
            digits
                .parse::<i32>()
                .map_err(|_| Rich::custom(span, format!("integer '{digits}' is out of range")))
        })
        .padded()
}
