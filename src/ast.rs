use crate::error::Span;
use crate::value::Value;

/// One parsed statement: a single expression tree, possibly rooted at an
/// assignment. Every node owns its children and carries its source span.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Numeric or bool literal.
    Literal {
        value: Value,
        span: Span,
    },
    /// Symbolic constant, resolved to a double at evaluation time.
    Constant {
        kind: ConstantKind,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Comparisons yield the left operand's value; whether they held is
    /// recorded in the evaluation context instead.
    Comparison {
        left: Box<Expr>,
        operator: ComparisonOp,
        right: Box<Expr>,
        span: Span,
    },
    /// Built-in single-argument function call.
    Call {
        function: Function,
        argument: Box<Expr>,
        span: Span,
    },
    /// Variable read; the name is validated against the environment when
    /// the node is built, not when it is evaluated.
    Variable {
        name: String,
        span: Span,
    },
    /// Assignment, only ever the root of a statement. For compound
    /// operators the combined value is fixed at parse time and carried in
    /// `precomputed`; evaluation just re-reads it.
    Assign {
        name: String,
        operator: AssignOp,
        value: Box<Expr>,
        precomputed: Option<Value>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Constant { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Comparison { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::Assign { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    ShiftLeft,
    ShiftRight,
}

#[derive(Debug, Clone)]
pub enum ComparisonOp {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone)]
pub enum UnaryOp {
    Plus,
    Negate,
}

#[derive(Debug, Clone)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Debug, Clone)]
pub enum ConstantKind {
    Pi,
    E,
}

/// The built-in function set. `Square` is the calculator's `pow(x)`,
/// which raises its argument to the power 2 and nothing else.
#[derive(Debug, Clone)]
pub enum Function {
    Log10,
    Sqrt,
    Square,
    Sin,
    Cos,
    Tan,
    Cot,
    ToRadians,
    ToDegrees,
}
