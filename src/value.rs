use crate::ast::ComparisonOp;
use std::fmt;

/// Runtime value of an expression. Arithmetic stays in `Int` while both
/// operands are integers and promotes to `Double` as soon as either side
/// is one. Booleans only ever arise as a statement's comparison outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
        }
    }

    fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            Value::Bool(_) => None,
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l + r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l + r)),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(*l as f64 + r)),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l + *r as f64)),
            (l, r) => Err(format!(
                "Cannot add {} and {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l - r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l - r)),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(*l as f64 - r)),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l - *r as f64)),
            (l, r) => Err(format!(
                "Cannot subtract {} and {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l * r)),
            (Value::Double(l), Value::Double(r)) => Ok(Value::Double(l * r)),
            (Value::Int(l), Value::Double(r)) => Ok(Value::Double(*l as f64 * r)),
            (Value::Double(l), Value::Int(r)) => Ok(Value::Double(l * *r as f64)),
            (l, r) => Err(format!(
                "Cannot multiply {} and {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    /// Division floors toward negative infinity while both operands are
    /// integers and is real division otherwise.
    pub fn div(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => {
                if *r == 0 {
                    Err("Division by zero".to_string())
                } else {
                    Ok(Value::Int(floor_div(*l, *r)))
                }
            }
            (Value::Double(l), Value::Double(r)) => {
                if *r == 0.0 {
                    Err("Division by zero".to_string())
                } else {
                    Ok(Value::Double(l / r))
                }
            }
            (Value::Int(l), Value::Double(r)) => {
                if *r == 0.0 {
                    Err("Division by zero".to_string())
                } else {
                    Ok(Value::Double(*l as f64 / r))
                }
            }
            (Value::Double(l), Value::Int(r)) => {
                if *r == 0 {
                    Err("Division by zero".to_string())
                } else {
                    Ok(Value::Double(l / *r as f64))
                }
            }
            (l, r) => Err(format!(
                "Cannot divide {} and {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn rem(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => {
                if *r == 0 {
                    Err("Modulo by zero".to_string())
                } else {
                    Ok(Value::Int(l % r))
                }
            }
            (Value::Double(l), Value::Double(r)) => {
                if *r == 0.0 {
                    Err("Modulo by zero".to_string())
                } else {
                    Ok(Value::Double(l % r))
                }
            }
            (Value::Int(l), Value::Double(r)) => {
                if *r == 0.0 {
                    Err("Modulo by zero".to_string())
                } else {
                    Ok(Value::Double(*l as f64 % r))
                }
            }
            (Value::Double(l), Value::Int(r)) => {
                if *r == 0 {
                    Err("Modulo by zero".to_string())
                } else {
                    Ok(Value::Double(l % *r as f64))
                }
            }
            (l, r) => Err(format!(
                "Cannot take {} modulo {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn shl(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => {
                let amount = shift_amount(*r)?;
                l.checked_shl(amount)
                    .map(Value::Int)
                    .ok_or_else(|| "Shift amount out of range".to_string())
            }
            (l, r) => Err(format!(
                "Cannot shift {} by {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn shr(&self, other: &Value) -> Result<Value, String> {
        match (self, other) {
            (Value::Int(l), Value::Int(r)) => {
                let amount = shift_amount(*r)?;
                l.checked_shr(amount)
                    .map(Value::Int)
                    .ok_or_else(|| "Shift amount out of range".to_string())
            }
            (l, r) => Err(format!(
                "Cannot shift {} by {}",
                l.type_name(),
                r.type_name()
            )),
        }
    }

    pub fn negate(&self) -> Result<Value, String> {
        match self {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Double(n) => Ok(Value::Double(-n)),
            Value::Bool(_) => Err("Cannot negate bool".to_string()),
        }
    }

    /// Whether `self op other` holds. Integers and doubles compare against
    /// each other after promotion; booleans never compare.
    pub fn compare(&self, operator: &ComparisonOp, other: &Value) -> Result<bool, String> {
        let (l, r) = match (self.as_double(), other.as_double()) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(format!(
                    "Cannot compare {} and {}",
                    self.type_name(),
                    other.type_name()
                ))
            }
        };
        Ok(match operator {
            ComparisonOp::Less => l < r,
            ComparisonOp::Greater => l > r,
            ComparisonOp::LessEqual => l <= r,
            ComparisonOp::GreaterEqual => l >= r,
            ComparisonOp::Equal => l == r,
        })
    }
}

fn shift_amount(r: i64) -> Result<u32, String> {
    u32::try_from(r).map_err(|_| "Shift amount out of range".to_string())
}

/// Integer division rounding toward negative infinity.
fn floor_div(l: i64, r: i64) -> i64 {
    let quotient = l / r;
    if l % r != 0 && (l < 0) != (r < 0) {
        quotient - 1
    } else {
        quotient
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(n) => {
                // Always show at least one decimal place for doubles
                if n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}
