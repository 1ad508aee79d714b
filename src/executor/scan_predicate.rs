// Copyright 2025 StrataDB Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Operator-scan predicates
//!
//! The normalized predicate form `(column, condition, value, value2?)`
//! shared by pruning and scans. The flattener turns plan predicate
//! expressions into this form, flipping `literal OP column` so the column
//! sits on the left, and rejects shapes the scan layer cannot consume
//! (placeholders, literal-only comparisons).

use smallvec::SmallVec;

use crate::core::{ColumnId, PredicateCondition, Value};
use crate::expression::{Operand, PredicateExpression};

/// An operand of a normalized scan predicate
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOperand {
    /// A concrete value
    Value(Value),

    /// Another column (column-column comparison)
    Column(ColumnId),
}

impl ScanOperand {
    /// The concrete value, if this operand is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ScanOperand::Value(value) => Some(value),
            ScanOperand::Column(_) => None,
        }
    }

    /// Returns true for concrete values
    pub fn is_value(&self) -> bool {
        matches!(self, ScanOperand::Value(_))
    }
}

/// Normalized predicate: column on the left, condition, one or two operands
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorScanPredicate {
    pub column_id: ColumnId,
    pub condition: PredicateCondition,
    pub value: ScanOperand,
    pub value2: Option<ScanOperand>,
}

/// Flattened predicates; almost always a single entry
pub type ScanPredicates = SmallVec<[OperatorScanPredicate; 2]>;

impl OperatorScanPredicate {
    /// Normalize a plan predicate expression
    ///
    /// Returns `None` for expressions no scan can consume: placeholders,
    /// comparisons without a column side, and non-flippable conditions with
    /// the literal on the left.
    pub fn from_expression(expression: &PredicateExpression) -> Option<ScanPredicates> {
        let condition = expression.condition;

        if condition.is_unary() {
            let Operand::Column(column_id) = expression.left else {
                return None;
            };
            let mut predicates = ScanPredicates::new();
            predicates.push(OperatorScanPredicate {
                column_id,
                condition,
                value: ScanOperand::Value(Value::Null),
                value2: None,
            });
            return Some(predicates);
        }

        if condition.is_ternary() {
            let Operand::Column(column_id) = expression.left else {
                return None;
            };
            let lower = operand_to_scan_operand(expression.right.as_ref()?)?;
            let upper = operand_to_scan_operand(expression.upper.as_ref()?)?;
            let mut predicates = ScanPredicates::new();
            predicates.push(OperatorScanPredicate {
                column_id,
                condition,
                value: lower,
                value2: Some(upper),
            });
            return Some(predicates);
        }

        let right = expression.right.as_ref()?;
        let (column_id, condition, other) = match (&expression.left, right) {
            (Operand::Column(column_id), other) => (*column_id, condition, other),
            (other, Operand::Column(column_id)) => {
                // Canonicalize `literal OP column` by flipping the condition.
                (*column_id, condition.flip()?, other)
            }
            _ => return None,
        };
        let value = operand_to_scan_operand(other)?;

        let mut predicates = ScanPredicates::new();
        predicates.push(OperatorScanPredicate {
            column_id,
            condition,
            value,
            value2: None,
        });
        Some(predicates)
    }
}

fn operand_to_scan_operand(operand: &Operand) -> Option<ScanOperand> {
    match operand {
        Operand::Literal(value) => Some(ScanOperand::Value(value.clone())),
        Operand::Column(column_id) => Some(ScanOperand::Column(*column_id)),
        Operand::Placeholder(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_literal_passes_through() {
        let expression = PredicateExpression::binary(
            PredicateCondition::GreaterThan,
            Operand::Column(3),
            Operand::Literal(Value::Int64(10)),
        );
        let predicates = OperatorScanPredicate::from_expression(&expression).unwrap();
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].column_id, 3);
        assert_eq!(predicates[0].condition, PredicateCondition::GreaterThan);
        assert_eq!(
            predicates[0].value,
            ScanOperand::Value(Value::Int64(10))
        );
    }

    #[test]
    fn literal_column_flips_the_condition() {
        let expression = PredicateExpression::binary(
            PredicateCondition::LessThan,
            Operand::Literal(Value::Int32(5)),
            Operand::Column(0),
        );
        let predicates = OperatorScanPredicate::from_expression(&expression).unwrap();
        // `5 < col` becomes `col > 5`.
        assert_eq!(predicates[0].condition, PredicateCondition::GreaterThan);
        assert_eq!(predicates[0].value, ScanOperand::Value(Value::Int32(5)));
    }

    #[test]
    fn placeholders_are_rejected() {
        let expression = PredicateExpression::binary(
            PredicateCondition::Equals,
            Operand::Column(0),
            Operand::Placeholder(0),
        );
        assert!(OperatorScanPredicate::from_expression(&expression).is_none());
    }

    #[test]
    fn column_column_is_kept_as_column_operand() {
        let expression = PredicateExpression::binary(
            PredicateCondition::Equals,
            Operand::Column(0),
            Operand::Column(1),
        );
        let predicates = OperatorScanPredicate::from_expression(&expression).unwrap();
        assert_eq!(predicates[0].value, ScanOperand::Column(1));
        assert!(!predicates[0].value.is_value());
    }

    #[test]
    fn between_sets_both_values() {
        let expression = PredicateExpression::between(
            Operand::Column(2),
            Operand::Literal(Value::Int32(1)),
            Operand::Literal(Value::Int32(9)),
        );
        let predicates = OperatorScanPredicate::from_expression(&expression).unwrap();
        assert_eq!(predicates[0].condition, PredicateCondition::Between);
        assert_eq!(predicates[0].value, ScanOperand::Value(Value::Int32(1)));
        assert_eq!(
            predicates[0].value2,
            Some(ScanOperand::Value(Value::Int32(9)))
        );
    }

    #[test]
    fn unary_conditions_need_a_column() {
        let ok = PredicateExpression::unary(PredicateCondition::IsNull, Operand::Column(1));
        assert!(OperatorScanPredicate::from_expression(&ok).is_some());

        let bad = PredicateExpression::unary(
            PredicateCondition::IsNull,
            Operand::Literal(Value::Int32(1)),
        );
        assert!(OperatorScanPredicate::from_expression(&bad).is_none());
    }

    #[test]
    fn literal_like_cannot_be_flipped() {
        let expression = PredicateExpression::binary(
            PredicateCondition::Like,
            Operand::Literal(Value::text("a%")),
            Operand::Column(0),
        );
        assert!(OperatorScanPredicate::from_expression(&expression).is_none());
    }
}
