//! Instantiation of expander templates and evaluation of index expressions.

use crate::ast::ArithmeticOperator;
use crate::ast::BinaryExpression;
use crate::ast::ConstraintExpression;
use crate::ast::ExpanderExpression;
use crate::ast::IndexExpression;
use crate::ast::Operand;
use crate::ast::VariableReference;

/// Provides the information an expansion needs from the surrounding model.
pub trait ExpansionContext {
    /// The number of elements of the aggregate called `name`, or `None` if there is no such
    /// aggregate.
    fn aggregate_size(&self, name: &str) -> Option<usize>;
}

impl<T: ExpansionContext + ?Sized> ExpansionContext for &T {
    fn aggregate_size(&self, name: &str) -> Option<usize> {
        (**self).aggregate_size(name)
    }
}

/// A context without any aggregates; every `size(..)` fails to resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAggregates;

impl ExpansionContext for NoAggregates {
    fn aggregate_size(&self, _: &str) -> Option<usize> {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ExpansionError {
    #[error("'{0}' is not an aggregate")]
    UnknownAggregate(String),
    #[error("index variable '{0}' is not bound")]
    UnboundCounter(String),
    #[error("evaluating '{0}' overflows")]
    Overflow(String),
}

/// The values of the counters that are currently bound, in binding order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterBindings {
    bindings: Vec<(String, i32)>,
}

impl CounterBindings {
    pub fn new() -> CounterBindings {
        CounterBindings::default()
    }

    pub fn bind(&mut self, counter: impl Into<String>, value: i32) {
        self.bindings.push((counter.into(), value));
    }

    pub fn get(&self, counter: &str) -> Option<i32> {
        self.bindings
            .iter()
            .rev()
            .find(|(name, _)| name == counter)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn pop(&mut self) -> Option<(String, i32)> {
        self.bindings.pop()
    }
}

impl IndexExpression {
    /// Evaluate the expression under the given counter values.
    pub fn evaluate<C: ExpansionContext + ?Sized>(
        &self,
        bindings: &CounterBindings,
        context: &C,
    ) -> Result<i32, ExpansionError> {
        match self {
            IndexExpression::Literal(value) => Ok(*value),
            IndexExpression::Counter(counter) => bindings
                .get(counter)
                .ok_or_else(|| ExpansionError::UnboundCounter(counter.clone())),
            IndexExpression::Size(aggregate) => {
                let size = context
                    .aggregate_size(aggregate)
                    .ok_or_else(|| ExpansionError::UnknownAggregate(aggregate.clone()))?;
                i32::try_from(size).map_err(|_| ExpansionError::Overflow(self.to_string()))
            }
            IndexExpression::Negate(operand) => operand
                .evaluate(bindings, context)?
                .checked_neg()
                .ok_or_else(|| ExpansionError::Overflow(self.to_string())),
            IndexExpression::Binary { lhs, operator, rhs } => {
                let lhs = lhs.evaluate(bindings, context)?;
                let rhs = rhs.evaluate(bindings, context)?;

                let result = match operator {
                    ArithmeticOperator::Add => lhs.checked_add(rhs),
                    ArithmeticOperator::Subtract => lhs.checked_sub(rhs),
                    ArithmeticOperator::Multiply => lhs.checked_mul(rhs),
                };

                result.ok_or_else(|| ExpansionError::Overflow(self.to_string()))
            }
        }
    }
}

impl VariableReference {
    fn bind<C: ExpansionContext + ?Sized>(
        &self,
        bindings: &CounterBindings,
        context: &C,
    ) -> Result<VariableReference, ExpansionError> {
        let subscript = self
            .subscript
            .as_ref()
            .map(|subscript| subscript.evaluate(bindings, context))
            .transpose()?
            .map(IndexExpression::Literal);

        Ok(VariableReference {
            name: self.name.clone(),
            subscript,
        })
    }
}

impl BinaryExpression {
    /// Produce the concrete expression under the given counter values: every subscript becomes a
    /// literal, and a bare right operand naming a bound counter becomes that counter's value.
    pub fn bind<C: ExpansionContext + ?Sized>(
        &self,
        bindings: &CounterBindings,
        context: &C,
    ) -> Result<BinaryExpression, ExpansionError> {
        let right = match &self.right {
            Operand::Literal(value) => Operand::Literal(*value),
            Operand::Variable(reference) if reference.subscript.is_none() => {
                match bindings.get(&reference.name) {
                    Some(value) => Operand::Literal(value),
                    None => Operand::Variable(reference.clone()),
                }
            }
            Operand::Variable(reference) => Operand::Variable(reference.bind(bindings, context)?),
        };

        Ok(BinaryExpression {
            left: self.left.bind(bindings, context)?,
            operator: self.operator,
            right,
        })
    }
}

impl ExpanderExpression {
    /// Iterate over the instances of the template, one for each combination of counter values.
    ///
    /// Combinations are produced in lexicographic order with the leftmost counter varying
    /// slowest. The bounds of a counter are evaluated once the counters to its left are bound, so
    /// they may refer to those counters. Instances whose operands refer to the same variable are
    /// skipped.
    pub fn expand<'a, C: ExpansionContext + ?Sized>(&'a self, context: &'a C) -> Expansion<'a, C> {
        Expansion {
            expander: self,
            context,
            bindings: CounterBindings::new(),
            uppers: vec![],
            state: State::Start,
        }
    }
}

impl ConstraintExpression {
    /// All concrete binary expressions this expression stands for.
    pub fn expand<C: ExpansionContext + ?Sized>(
        &self,
        context: &C,
    ) -> Result<Vec<BinaryExpression>, ExpansionError> {
        match self {
            ConstraintExpression::Empty => Ok(vec![]),
            ConstraintExpression::Binary(expression) => {
                Ok(vec![expression.bind(&CounterBindings::new(), context)?])
            }
            ConstraintExpression::Expander(expander) => expander.expand(context).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Start,
    Running,
    Done,
}

/// The iterator returned by [`ExpanderExpression::expand`].
///
/// After the first error the iterator is exhausted.
#[derive(Debug)]
pub struct Expansion<'a, C: ?Sized> {
    expander: &'a ExpanderExpression,
    context: &'a C,
    bindings: CounterBindings,
    /// The upper bound of every bound counter, parallel to `bindings`.
    uppers: Vec<i32>,
    state: State,
}

impl<C: ExpansionContext + ?Sized> Expansion<'_, C> {
    /// Bind the counters from `depth` onwards to their lower bounds. Returns `false` when no
    /// combinations remain.
    fn complete(&mut self, mut depth: usize) -> Result<bool, ExpansionError> {
        let expander = self.expander;
        let counters = &expander.counters;

        while depth < counters.len() {
            let range = &counters[depth];
            let lower = range.lower.evaluate(&self.bindings, self.context)?;
            let upper = range.upper.evaluate(&self.bindings, self.context)?;

            if lower <= upper {
                self.bindings.bind(range.counter.clone(), lower);
                self.uppers.push(upper);
                depth += 1;
            } else {
                match self.advance() {
                    Some(next) => depth = next,
                    None => return Ok(false),
                }
            }
        }

        Ok(true)
    }

    /// Increment the rightmost counter below its upper bound, unbinding every counter after it.
    /// Returns the depth from which the remaining counters have to be bound.
    fn advance(&mut self) -> Option<usize> {
        while let Some(upper) = self.uppers.pop() {
            let (counter, value) = self.bindings.pop()?;

            if value < upper {
                self.bindings.bind(counter, value + 1);
                self.uppers.push(upper);
                return Some(self.uppers.len());
            }
        }

        None
    }
}

impl<C: ExpansionContext + ?Sized> Iterator for Expansion<'_, C> {
    type Item = Result<BinaryExpression, ExpansionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ready = match self.state {
                State::Done => return None,
                State::Start => self.complete(0),
                State::Running => match self.advance() {
                    Some(depth) => self.complete(depth),
                    None => Ok(false),
                },
            };

            let instance = match ready {
                Ok(true) => self.expander.template.bind(&self.bindings, self.context),
                Ok(false) => {
                    self.state = State::Done;
                    return None;
                }
                Err(error) => Err(error),
            };

            match instance {
                Ok(instance) => {
                    self.state = State::Running;

                    // `$x[i] <> $x[j] | i,j in 1..n,1..n` relates distinct elements only.
                    if !relates_to_itself(&instance) {
                        return Some(Ok(instance));
                    }
                }
                Err(error) => {
                    self.state = State::Done;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Whether both operands of a concrete instance are the same variable.
fn relates_to_itself(instance: &BinaryExpression) -> bool {
    matches!(&instance.right, Operand::Variable(right) if *right == instance.left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_expander;

    struct Sizes(&'static [(&'static str, usize)]);

    impl ExpansionContext for Sizes {
        fn aggregate_size(&self, name: &str) -> Option<usize> {
            self.0
                .iter()
                .find(|(aggregate, _)| *aggregate == name)
                .map(|(_, size)| *size)
        }
    }

    fn expander(text: &str) -> ExpanderExpression {
        parse_expander(text)
            .into_result()
            .expect("valid expander")
            .expect("non-empty expander")
    }

    fn rendered<C: ExpansionContext>(expander: &ExpanderExpression, context: &C) -> Vec<String> {
        expander
            .expand(context)
            .map(|instance| instance.expect("expands").to_string())
            .collect()
    }

    #[test]
    fn leftmost_counter_varies_slowest() {
        let expander = expander("x[i] != y[j] | i, j in 1..2, 1..3");

        assert_eq!(
            vec![
                "$x[1] <> $y[1]",
                "$x[1] <> $y[2]",
                "$x[1] <> $y[3]",
                "$x[2] <> $y[1]",
                "$x[2] <> $y[2]",
                "$x[2] <> $y[3]",
            ],
            rendered(&expander, &NoAggregates)
        );
    }

    #[test]
    fn later_bounds_see_earlier_counters() {
        let expander = expander("$x[i] != $x[j] | i,j in 1..3,i+1..3");

        assert_eq!(
            vec!["$x[1] <> $x[2]", "$x[1] <> $x[3]", "$x[2] <> $x[3]"],
            rendered(&expander, &NoAggregates)
        );
    }

    #[test]
    fn empty_inner_ranges_are_skipped() {
        // For i = 1 the inner range is 2..1, which is empty.
        let expander = expander("$x[i] < $y[j] | i,j in 1..2,2..i");

        assert_eq!(vec!["$x[2] < $y[2]"], rendered(&expander, &NoAggregates));
    }

    #[test]
    fn instances_relating_an_element_to_itself_are_skipped() {
        let expander = expander("x[i] <> x[j] | i,j in 1..3,1..3");

        assert_eq!(
            vec![
                "$x[1] <> $x[2]",
                "$x[1] <> $x[3]",
                "$x[2] <> $x[1]",
                "$x[2] <> $x[3]",
                "$x[3] <> $x[1]",
                "$x[3] <> $x[2]",
            ],
            rendered(&expander, &NoAggregates)
        );
    }

    #[test]
    fn only_self_relations_expand_to_nothing() {
        let expander = expander("$x[i] = $x[i] | i in 1..4");

        assert!(rendered(&expander, &NoAggregates).is_empty());
    }

    #[test]
    fn empty_outer_range_produces_nothing() {
        let expander = expander("$x[i] = 1 | i in 3..1");

        assert!(rendered(&expander, &NoAggregates).is_empty());
    }

    #[test]
    fn size_is_resolved_through_the_context() {
        let expander = expander("$q[i] != $q[i+1] | i in 1..size(q)-1");

        assert_eq!(
            vec!["$q[1] <> $q[2]", "$q[2] <> $q[3]"],
            rendered(&expander, &Sizes(&[("q", 3)]))
        );
    }

    #[test]
    fn unknown_aggregate_is_an_error() {
        let expander = expander("$q[i] = 1 | i in 1..size(r)");

        let result = expander.expand(&Sizes(&[("q", 3)])).collect::<Result<Vec<_>, _>>();

        assert_eq!(Err(ExpansionError::UnknownAggregate("r".to_owned())), result);
    }

    #[test]
    fn unbound_counter_stops_the_expansion() {
        let expander = expander("$x[k] = 1 | i in 1..3");

        let mut expansion = expander.expand(&NoAggregates);

        assert_eq!(
            Some(Err(ExpansionError::UnboundCounter("k".to_owned()))),
            expansion.next()
        );
        assert_eq!(None, expansion.next());
    }

    #[test]
    fn bare_counter_on_the_right_becomes_a_literal() {
        let expander = expander("$x[i] = i | i in 1..2");

        assert_eq!(
            vec!["$x[1] = 1", "$x[2] = 2"],
            rendered(&expander, &NoAggregates)
        );
    }

    #[test]
    fn overflow_is_reported() {
        let expression = IndexExpression::binary(
            IndexExpression::Literal(i32::MAX),
            ArithmeticOperator::Add,
            IndexExpression::Literal(1),
        );

        assert!(matches!(
            expression.evaluate(&CounterBindings::new(), &NoAggregates),
            Err(ExpansionError::Overflow(_))
        ));
    }

    #[test]
    fn binary_constraint_expands_to_itself() {
        let expression = crate::parse_constraint_expression("x <= y")
            .into_result()
            .expect("valid")
            .expect("non-empty");

        let expanded = expression.expand(&NoAggregates).expect("expands");

        assert_eq!(1, expanded.len());
        assert_eq!("x <= y", expanded[0].to_string());
    }
}
