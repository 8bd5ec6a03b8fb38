use crate::ast::{BinaryOp, ConstantKind, Expr, Function, UnaryOp};
use crate::error::CalcError;
use crate::value::Value;
use std::collections::HashMap;
use std::f64::consts;

/// The variable table. One per session, owned by the shell: the parser
/// borrows it to validate references and precompute compound assignments,
/// the evaluator borrows it mutably to store assigned values.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn assign(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }
}

/// Per-statement comparison accumulator. Starts holding; every comparison
/// evaluated during the walk ANDs its outcome in. When at least one
/// comparison ran, the statement's result is the truth value instead of
/// the numeric one.
#[derive(Debug)]
pub struct ComparisonTracker {
    observed: bool,
    all_held: bool,
}

impl ComparisonTracker {
    pub fn new() -> Self {
        Self {
            observed: false,
            all_held: true,
        }
    }

    fn record(&mut self, held: bool) {
        self.observed = true;
        self.all_held = self.all_held && held;
    }
}

impl Default for ComparisonTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Evaluator<'a> {
    environment: &'a mut Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(environment: &'a mut Environment) -> Self {
        Self { environment }
    }

    /// Evaluates one parsed statement to its printable value: the
    /// comparison truth value if any comparison ran, otherwise the numeric
    /// result with doubles rounded to 3 decimal places. Assigned variables
    /// store the unrounded value.
    pub fn evaluate(&mut self, statement: &Expr) -> Result<Value, CalcError> {
        let mut comparisons = ComparisonTracker::new();

        let value = match statement {
            Expr::Assign {
                name,
                value,
                precomputed,
                ..
            } => {
                // Compound assignments carry their combined value from
                // parse time; only a plain `=` walks its right-hand tree.
                let stored = match precomputed {
                    Some(combined) => combined.clone(),
                    None => evaluate_operand(value, self.environment, &mut comparisons)?,
                };
                self.environment.assign(name, stored.clone());
                stored
            }
            expr => evaluate_operand(expr, self.environment, &mut comparisons)?,
        };

        if comparisons.observed {
            return Ok(Value::Bool(comparisons.all_held));
        }

        Ok(match value {
            Value::Double(n) => Value::Double(round_to_3(n)),
            other => other,
        })
    }
}

/// Walks a subtree that cannot contain an assignment (the grammar only
/// allows assignments at the statement root). Shared with the parser for
/// compound-assignment precomputation.
pub(crate) fn evaluate_operand(
    expr: &Expr,
    environment: &Environment,
    comparisons: &mut ComparisonTracker,
) -> Result<Value, CalcError> {
    match expr {
        Expr::Literal { value, .. } => Ok(value.clone()),
        Expr::Constant { kind, .. } => Ok(Value::Double(match kind {
            ConstantKind::Pi => consts::PI,
            ConstantKind::E => consts::E,
        })),
        Expr::Variable { name, span } => environment.get(name).ok_or_else(|| {
            CalcError::undefined_variable(span.clone(), format!("Undefined variable '{}'", name))
        }),
        Expr::Unary {
            operator,
            operand,
            span,
        } => {
            let value = evaluate_operand(operand, environment, comparisons)?;
            match operator {
                UnaryOp::Plus => Ok(value),
                UnaryOp::Negate => value
                    .negate()
                    .map_err(|message| CalcError::runtime_error(span.clone(), message)),
            }
        }
        Expr::Binary {
            left,
            operator,
            right,
            span,
        } => {
            let left_value = evaluate_operand(left, environment, comparisons)?;
            let right_value = evaluate_operand(right, environment, comparisons)?;
            let result = match operator {
                BinaryOp::Add => left_value.add(&right_value),
                BinaryOp::Subtract => left_value.sub(&right_value),
                BinaryOp::Multiply => left_value.mul(&right_value),
                BinaryOp::Divide => left_value.div(&right_value),
                BinaryOp::Modulo => left_value.rem(&right_value),
                BinaryOp::ShiftLeft => left_value.shl(&right_value),
                BinaryOp::ShiftRight => left_value.shr(&right_value),
            };
            result.map_err(|message| CalcError::runtime_error(span.clone(), message))
        }
        Expr::Comparison {
            left,
            operator,
            right,
            span,
        } => {
            let left_value = evaluate_operand(left, environment, comparisons)?;
            let right_value = evaluate_operand(right, environment, comparisons)?;
            let held = left_value
                .compare(operator, &right_value)
                .map_err(|message| CalcError::runtime_error(span.clone(), message))?;
            comparisons.record(held);
            // A comparison yields its left operand's value; the outcome
            // lives in the tracker.
            Ok(left_value)
        }
        Expr::Call {
            function,
            argument,
            span,
        } => {
            let value = evaluate_operand(argument, environment, comparisons)?;
            apply_function(function, value)
                .map_err(|message| CalcError::runtime_error(span.clone(), message))
        }
        Expr::Assign { span, .. } => Err(CalcError::runtime_error(
            span.clone(),
            "Assignment cannot appear inside an expression".to_string(),
        )),
    }
}

/// Computes in f64; an integer argument truncates the result back to an
/// integer (toward zero, not rounded).
fn apply_function(function: &Function, argument: Value) -> Result<Value, String> {
    let x = match argument {
        Value::Int(n) => n as f64,
        Value::Double(n) => n,
        Value::Bool(_) => return Err("Function argument must be a number, got bool".to_string()),
    };

    let result = match function {
        Function::Log10 => x.log10(),
        Function::Sqrt => x.sqrt(),
        Function::Square => x * x,
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Cot => 1.0 / x.tan(),
        Function::ToRadians => x.to_radians(),
        Function::ToDegrees => x.to_degrees(),
    };

    match argument {
        Value::Int(_) => Ok(Value::Int(result as i64)),
        _ => Ok(Value::Double(result)),
    }
}

fn round_to_3(n: f64) -> f64 {
    (n * 1000.0).round() / 1000.0
}
