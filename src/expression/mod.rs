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

//! Expression model consumed by the predicate flattener
//!
//! Deliberately small: operands are columns, literals or placeholders;
//! predicate expressions pair a condition with one to three operands. The
//! arithmetic expression exists for type derivation in plans and is not
//! evaluated by the core.

use std::fmt;

use crate::core::{ColumnId, DataType, Error, PredicateCondition, Result, Schema, Value};

/// Identifier of a bind parameter in a prepared statement
pub type ParameterId = u16;

/// A leaf operand of a predicate or arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A column, addressed by schema position
    Column(ColumnId),

    /// A literal value
    Literal(Value),

    /// A bind parameter, unresolved at optimization time
    Placeholder(ParameterId),
}

impl Operand {
    /// Returns true for literal operands
    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }

    /// The operand's data type under a schema
    pub fn data_type(&self, schema: &Schema) -> Result<DataType> {
        match self {
            Operand::Column(column_id) => Ok(schema.column(*column_id)?.data_type),
            Operand::Literal(value) => Ok(value.data_type()),
            Operand::Placeholder(_) => Ok(DataType::Null),
        }
    }

    /// Whether the operand can produce NULL under a schema
    pub fn is_nullable(&self, schema: &Schema) -> bool {
        match self {
            Operand::Column(column_id) => schema
                .column(*column_id)
                .map(|column| column.nullable)
                .unwrap_or(true),
            Operand::Literal(value) => value.is_null(),
            Operand::Placeholder(_) => true,
        }
    }
}

/// A predicate over operands, as plans carry it
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateExpression {
    pub condition: PredicateCondition,
    pub left: Operand,
    pub right: Option<Operand>,
    pub upper: Option<Operand>,
}

impl PredicateExpression {
    /// Binary predicate `left <condition> right`
    pub fn binary(condition: PredicateCondition, left: Operand, right: Operand) -> Self {
        debug_assert!(condition.is_binary());
        Self {
            condition,
            left,
            right: Some(right),
            upper: None,
        }
    }

    /// Range predicate `operand BETWEEN lower AND upper`
    pub fn between(operand: Operand, lower: Operand, upper: Operand) -> Self {
        Self {
            condition: PredicateCondition::Between,
            left: operand,
            right: Some(lower),
            upper: Some(upper),
        }
    }

    /// Unary predicate `operand IS [NOT] NULL`
    pub fn unary(condition: PredicateCondition, operand: Operand) -> Self {
        debug_assert!(condition.is_unary());
        Self {
            condition,
            left: operand,
            right: None,
            upper: None,
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

/// Arithmetic operators over two operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    Power,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOperator::Addition => write!(f, "+"),
            ArithmeticOperator::Subtraction => write!(f, "-"),
            ArithmeticOperator::Multiplication => write!(f, "*"),
            ArithmeticOperator::Division => write!(f, "/"),
            ArithmeticOperator::Modulo => write!(f, "%"),
            ArithmeticOperator::Power => write!(f, "^"),
        }
    }
}

/// Two-operand arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticExpression {
    pub operator: ArithmeticOperator,
    pub left: Operand,
    pub right: Operand,
}

impl ArithmeticExpression {
    /// Create an arithmetic expression
    pub fn new(operator: ArithmeticOperator, left: Operand, right: Operand) -> Self {
        Self {
            operator,
            left,
            right,
        }
    }

    /// The common result type of both operands
    pub fn data_type(&self, schema: &Schema) -> Result<DataType> {
        expression_common_type(
            self.left.data_type(schema)?,
            self.right.data_type(schema)?,
        )
    }

    /// Whether evaluation can produce NULL
    ///
    /// Division, modulo and power are nullable regardless of their operands
    /// (division by zero yields NULL).
    pub fn is_nullable(&self, schema: &Schema) -> bool {
        self.left.is_nullable(schema)
            || self.right.is_nullable(schema)
            || matches!(
                self.operator,
                ArithmeticOperator::Division
                    | ArithmeticOperator::Modulo
                    | ArithmeticOperator::Power
            )
    }

    /// Human-readable column name for plan output
    pub fn as_column_name(&self) -> Result<String> {
        Err(Error::NotImplemented("arithmetic expression column name"))
    }
}

/// The promotion rule for mixed-type arithmetic
pub fn expression_common_type(left: DataType, right: DataType) -> Result<DataType> {
    use DataType::*;
    match (left, right) {
        (Null, other) | (other, Null) => Ok(other),
        (left, right) if left == right => Ok(left),
        (Int32, Int64) | (Int64, Int32) => Ok(Int64),
        (Int32, Float) | (Float, Int32) => Ok(Float),
        (Int32, Double) | (Double, Int32) => Ok(Double),
        (Int64, Float) | (Float, Int64) => Ok(Float),
        (Int64, Double) | (Double, Int64) => Ok(Double),
        (Float, Double) | (Double, Float) => Ok(Double),
        (left, right) => Err(Error::IncomparableTypes { left, right }),
    }
}

#[cfg(test)]
mod tests {
    use crate::core::ColumnDefinition;

    use super::*;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDefinition::new("a", DataType::Int32),
            ColumnDefinition::nullable("b", DataType::Double),
        ])
        .unwrap()
    }

    #[test]
    fn common_type_promotion() {
        assert_eq!(
            expression_common_type(DataType::Int32, DataType::Int64).unwrap(),
            DataType::Int64
        );
        assert_eq!(
            expression_common_type(DataType::Int64, DataType::Float).unwrap(),
            DataType::Float
        );
        assert!(expression_common_type(DataType::Text, DataType::Int32).is_err());
    }

    #[test]
    fn arithmetic_type_and_nullability() {
        let schema = schema();
        let expression = ArithmeticExpression::new(
            ArithmeticOperator::Addition,
            Operand::Column(0),
            Operand::Column(1),
        );
        assert_eq!(expression.data_type(&schema).unwrap(), DataType::Double);
        assert!(expression.is_nullable(&schema));

        let division = ArithmeticExpression::new(
            ArithmeticOperator::Division,
            Operand::Column(0),
            Operand::Literal(Value::Int32(2)),
        );
        // Non-nullable operands, but division can still yield NULL.
        assert!(division.is_nullable(&schema));
    }

    #[test]
    fn column_name_is_deliberately_unimplemented() {
        let expression = ArithmeticExpression::new(
            ArithmeticOperator::Multiplication,
            Operand::Column(0),
            Operand::Literal(Value::Int32(3)),
        );
        assert_eq!(
            expression.as_column_name().unwrap_err(),
            Error::NotImplemented("arithmetic expression column name")
        );
    }
}
