//! The abstract syntax tree of the expression language.
//!
//! Every node implements [`Display`], rendering the canonical surface syntax. Parsing the
//! rendered text yields a node equal to the original.

use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::RangeInclusive;

/// Describes a range `[start, end)` of byte offsets in the parsed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    /// The index in the source that starts the span.
    pub start: usize,
    /// The index in the source that ends the span.
    ///
    /// Note the end is exclusive.
    pub end: usize,
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}

impl From<chumsky::span::SimpleSpan> for Span {
    fn from(value: chumsky::span::SimpleSpan) -> Self {
        Span {
            start: value.start,
            end: value.end,
        }
    }
}

/// The relation between the two operands of a [`BinaryExpression`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorType {
    /// `=`
    Equals,
    /// `!=` or `<>`
    NotEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `>=`
    GreaterThanOrEqual,
    /// `<=`
    LessThanOrEqual,
}

impl OperatorType {
    /// All operators, in declaration order.
    pub const ALL: [OperatorType; 6] = [
        OperatorType::Equals,
        OperatorType::NotEqual,
        OperatorType::Greater,
        OperatorType::Less,
        OperatorType::GreaterThanOrEqual,
        OperatorType::LessThanOrEqual,
    ];

    /// The operator that holds exactly when `self` does not.
    pub fn negated(self) -> OperatorType {
        match self {
            OperatorType::Equals => OperatorType::NotEqual,
            OperatorType::NotEqual => OperatorType::Equals,
            OperatorType::Greater => OperatorType::LessThanOrEqual,
            OperatorType::Less => OperatorType::GreaterThanOrEqual,
            OperatorType::GreaterThanOrEqual => OperatorType::Less,
            OperatorType::LessThanOrEqual => OperatorType::Greater,
        }
    }

    /// The operator obtained by swapping the operands, i.e. `a op b` iff `b op.mirrored() a`.
    pub fn mirrored(self) -> OperatorType {
        match self {
            OperatorType::Equals => OperatorType::Equals,
            OperatorType::NotEqual => OperatorType::NotEqual,
            OperatorType::Greater => OperatorType::Less,
            OperatorType::Less => OperatorType::Greater,
            OperatorType::GreaterThanOrEqual => OperatorType::LessThanOrEqual,
            OperatorType::LessThanOrEqual => OperatorType::GreaterThanOrEqual,
        }
    }

    /// Evaluate the relation on two concrete values.
    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            OperatorType::Equals => lhs == rhs,
            OperatorType::NotEqual => lhs != rhs,
            OperatorType::Greater => lhs > rhs,
            OperatorType::Less => lhs < rhs,
            OperatorType::GreaterThanOrEqual => lhs >= rhs,
            OperatorType::LessThanOrEqual => lhs <= rhs,
        }
    }

    fn token(self) -> &'static str {
        match self {
            OperatorType::Equals => "=",
            OperatorType::NotEqual => "<>",
            OperatorType::Greater => ">",
            OperatorType::Less => "<",
            OperatorType::GreaterThanOrEqual => ">=",
            OperatorType::LessThanOrEqual => "<=",
        }
    }
}

impl Display for OperatorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// The arithmetic operators allowed inside subscripts and counter ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
}

impl ArithmeticOperator {
    fn precedence(self) -> u8 {
        match self {
            ArithmeticOperator::Add | ArithmeticOperator::Subtract => 1,
            ArithmeticOperator::Multiply => 2,
        }
    }
}

impl Display for ArithmeticOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithmeticOperator::Add => write!(f, "+"),
            ArithmeticOperator::Subtract => write!(f, "-"),
            ArithmeticOperator::Multiply => write!(f, "*"),
        }
    }
}

/// An integer expression over counters, used as a subscript or as the bound of a counter range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexExpression {
    Literal(i32),
    /// A reference to a counter bound by an expander clause.
    Counter(String),
    /// `size(name)`; the number of elements of the named aggregate.
    Size(String),
    Negate(Box<IndexExpression>),
    Binary {
        lhs: Box<IndexExpression>,
        operator: ArithmeticOperator,
        rhs: Box<IndexExpression>,
    },
}

impl IndexExpression {
    pub fn binary(
        lhs: IndexExpression,
        operator: ArithmeticOperator,
        rhs: IndexExpression,
    ) -> IndexExpression {
        IndexExpression::Binary {
            lhs: Box::new(lhs),
            operator,
            rhs: Box::new(rhs),
        }
    }

    /// The literal value, if this expression is a plain literal.
    pub fn as_literal(&self) -> Option<i32> {
        match self {
            IndexExpression::Literal(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the expression evaluates without counter bindings or aggregate sizes.
    pub fn is_constant(&self) -> bool {
        match self {
            IndexExpression::Literal(_) => true,
            IndexExpression::Counter(_) | IndexExpression::Size(_) => false,
            IndexExpression::Negate(operand) => operand.is_constant(),
            IndexExpression::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
        }
    }

    fn fmt_operand(
        &self,
        f: &mut Formatter<'_>,
        parent: ArithmeticOperator,
        is_rhs: bool,
    ) -> std::fmt::Result {
        // Operators are left-associative, so a right operand of equal precedence keeps its
        // parentheses.
        let needs_parentheses = match self {
            IndexExpression::Binary { operator, .. } => {
                operator.precedence() < parent.precedence()
                    || (is_rhs && operator.precedence() == parent.precedence())
            }
            _ => false,
        };

        if needs_parentheses {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexExpression::Literal(value) => write!(f, "{value}"),
            IndexExpression::Counter(name) => write!(f, "{name}"),
            IndexExpression::Size(name) => write!(f, "size({name})"),
            IndexExpression::Negate(operand) => match operand.as_ref() {
                IndexExpression::Binary { .. } => write!(f, "-({operand})"),
                _ => write!(f, "-{operand}"),
            },
            IndexExpression::Binary { lhs, operator, rhs } => {
                lhs.fmt_operand(f, *operator, false)?;
                write!(f, " {operator} ")?;
                rhs.fmt_operand(f, *operator, true)
            }
        }
    }
}

/// A reference to a variable; either a bare name or an element of an aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableReference {
    pub name: String,
    pub subscript: Option<IndexExpression>,
}

impl VariableReference {
    pub fn bare(name: impl Into<String>) -> VariableReference {
        VariableReference {
            name: name.into(),
            subscript: None,
        }
    }

    pub fn indexed(name: impl Into<String>, subscript: IndexExpression) -> VariableReference {
        VariableReference {
            name: name.into(),
            subscript: Some(subscript),
        }
    }

    /// The literal subscript, if the reference is indexed by a concrete value.
    pub fn literal_subscript(&self) -> Option<i32> {
        self.subscript.as_ref().and_then(IndexExpression::as_literal)
    }
}

impl Display for VariableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.subscript {
            Some(subscript) => write!(f, "${}[{subscript}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The right-hand side of a [`BinaryExpression`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Variable(VariableReference),
    Literal(i32),
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Variable(reference) => write!(f, "{reference}"),
            Operand::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// A relation between a variable and either another variable or a literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BinaryExpression {
    pub left: VariableReference,
    pub operator: OperatorType,
    pub right: Operand,
}

impl BinaryExpression {
    /// Iterate over the variable references in the expression, left to right.
    pub fn references(&self) -> impl Iterator<Item = &VariableReference> + '_ {
        let right = match &self.right {
            Operand::Variable(reference) => Some(reference),
            Operand::Literal(_) => None,
        };

        std::iter::once(&self.left).chain(right)
    }
}

impl Display for BinaryExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

/// An inclusive integer range `lower..upper`, with `lower <= upper`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeExpression {
    pub lower: i32,
    pub upper: i32,
}

impl RangeExpression {
    /// The number of values in the range; zero when the bounds are inverted.
    pub fn size(&self) -> u64 {
        u64::try_from(i64::from(self.upper) - i64::from(self.lower) + 1).unwrap_or(0)
    }

    pub fn values(&self) -> RangeInclusive<i32> {
        self.lower..=self.upper
    }
}

impl Display for RangeExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.lower, self.upper)
    }
}

/// The domain of a variable as written in the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomainExpression {
    Inline(RangeExpression),
    /// A reference to a named domain declared on the model.
    Shared(String),
}

impl Display for DomainExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainExpression::Inline(range) => write!(f, "{range}"),
            DomainExpression::Shared(name) => write!(f, "{name}"),
        }
    }
}

/// One `counter in lower..upper` pair of an expander clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CounterRange {
    pub counter: String,
    pub lower: IndexExpression,
    pub upper: IndexExpression,
}

/// A constraint template that is instantiated once for every combination of counter values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpanderExpression {
    pub template: BinaryExpression,
    pub counters: Vec<CounterRange>,
}

impl Display for ExpanderExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} | ", self.template)?;

        for (idx, range) in self.counters.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", range.counter)?;
        }

        write!(f, " in ")?;

        for (idx, range) in self.counters.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}..{}", range.lower, range.upper)?;
        }

        Ok(())
    }
}

/// The textual definition of a constraint after parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConstraintExpression {
    /// The definition was empty; the constraint imposes nothing.
    #[default]
    Empty,
    Binary(BinaryExpression),
    Expander(ExpanderExpression),
}

impl ConstraintExpression {
    pub fn is_empty(&self) -> bool {
        matches!(self, ConstraintExpression::Empty)
    }
}

impl Display for ConstraintExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintExpression::Empty => Ok(()),
            ConstraintExpression::Binary(expression) => write!(f, "{expression}"),
            ConstraintExpression::Expander(expression) => write!(f, "{expression}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_operator_swaps_the_operands() {
        for operator in OperatorType::ALL {
            for (lhs, rhs) in [(1, 2), (2, 2), (3, 2)] {
                assert_eq!(operator.holds(lhs, rhs), operator.mirrored().holds(rhs, lhs));
            }
        }
    }

    #[test]
    fn negated_operator_is_the_complement() {
        for operator in OperatorType::ALL {
            for (lhs, rhs) in [(1, 2), (2, 2), (3, 2)] {
                assert_ne!(operator.holds(lhs, rhs), operator.negated().holds(lhs, rhs));
            }
        }
    }

    #[test]
    fn index_expression_parenthesises_only_where_needed() {
        let i = || IndexExpression::Counter("i".to_owned());
        let one = || IndexExpression::Literal(1);

        let sum = IndexExpression::binary(i(), ArithmeticOperator::Add, one());
        let scaled = IndexExpression::binary(sum.clone(), ArithmeticOperator::Multiply, one());
        let difference = IndexExpression::binary(one(), ArithmeticOperator::Subtract, sum.clone());
        let left_assoc = IndexExpression::binary(sum, ArithmeticOperator::Subtract, one());

        assert_eq!("(i + 1) * 1", scaled.to_string());
        assert_eq!("1 - (i + 1)", difference.to_string());
        assert_eq!("i + 1 - 1", left_assoc.to_string());
    }

    #[test]
    fn range_size_does_not_overflow() {
        let range = RangeExpression {
            lower: i32::MIN,
            upper: i32::MAX,
        };

        assert_eq!(1 << 32, range.size());
    }

    #[test]
    fn inverted_range_is_empty() {
        let range = RangeExpression { lower: 5, upper: 2 };

        assert_eq!(0, range.size());
        assert_eq!(0, range.values().count());
    }
}
