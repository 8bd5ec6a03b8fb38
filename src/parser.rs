use crate::ast::{AssignOp, BinaryOp, ComparisonOp, ConstantKind, Expr, Function, UnaryOp};
use crate::error::{CalcError, Span};
use crate::evaluator::{self, ComparisonTracker, Environment};
use crate::lexer::{Token, TokenType};
use crate::value::Value;

/// Recursive-descent parser for one statement. It holds a read-only view
/// of the session environment: variable references are validated when
/// their node is built, and compound assignments fix their combined value
/// at parse time from the variable's then-current contents.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    environment: &'a Environment,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, environment: &'a Environment) -> Self {
        Self {
            tokens,
            current: 0,
            environment,
        }
    }

    /// Parses the whole token stream as a single statement. Leftover
    /// tokens after a complete expression are a syntax error.
    pub fn parse(&mut self) -> Result<Expr, CalcError> {
        let statement = self.expression()?;

        if !self.is_at_end() {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                format!("Unexpected token '{}' after expression", self.peek().lexeme),
            ));
        }

        Ok(statement)
    }

    /// expression := term (('+'|'-') term)*
    ///               (('<'|'>'|'<='|'>='|'=='|'<<'|'>>') expression)?
    ///
    /// The tail operator, if present, binds the entire remainder of the
    /// statement, so `a < b < c` parses as `a < (b < c)`.
    fn expression(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.term()?;

        while self.match_types(&[TokenType::Plus, TokenType::Minus]) {
            let operator = match self.previous().token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.term()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        if self.match_types(&[
            TokenType::Less,
            TokenType::Greater,
            TokenType::LessEqual,
            TokenType::GreaterEqual,
            TokenType::EqualEqual,
        ]) {
            let operator = match self.previous().token_type {
                TokenType::Less => ComparisonOp::Less,
                TokenType::Greater => ComparisonOp::Greater,
                TokenType::LessEqual => ComparisonOp::LessEqual,
                TokenType::GreaterEqual => ComparisonOp::GreaterEqual,
                TokenType::EqualEqual => ComparisonOp::Equal,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.expression()?;
            let end = right.span().end;

            expr = Expr::Comparison {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        } else if self.match_types(&[TokenType::ShiftLeft, TokenType::ShiftRight]) {
            let operator = match self.previous().token_type {
                TokenType::ShiftLeft => BinaryOp::ShiftLeft,
                TokenType::ShiftRight => BinaryOp::ShiftRight,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.expression()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    /// term := unary (('*'|'/'|'%') unary)*
    fn term(&mut self) -> Result<Expr, CalcError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Star, TokenType::Slash, TokenType::Percent]) {
            let operator = match self.previous().token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Percent => BinaryOp::Modulo,
                _ => unreachable!(),
            };

            let start = expr.span().start;
            let right = self.unary()?;
            let end = right.span().end;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span: Span::new(start, end),
            };
        }

        Ok(expr)
    }

    /// unary := ('+'|'-') unary | primary
    fn unary(&mut self) -> Result<Expr, CalcError> {
        if self.match_types(&[TokenType::Plus, TokenType::Minus]) {
            let operator = match self.previous().token_type {
                TokenType::Plus => UnaryOp::Plus,
                TokenType::Minus => UnaryOp::Negate,
                _ => unreachable!(),
            };

            let start = self.previous().span.start;
            let operand = self.unary()?;
            let end = operand.span().end;

            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
                span: Span::new(start, end),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, CalcError> {
        if self.is_at_end() {
            return Err(CalcError::syntax_error_with_help(
                self.peek().span.clone(),
                "Unexpected end of input".to_string(),
                "Expected an expression here. Check for unmatched parentheses or a trailing operator.".to_string(),
            ));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::Integer => {
                let value = token.lexeme.parse::<i64>().map_err(|_| {
                    CalcError::syntax_error(token.span.clone(), "Invalid integer".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Int(value),
                    span: token.span,
                })
            }
            TokenType::Double => {
                let value = token.lexeme.parse::<f64>().map_err(|_| {
                    CalcError::syntax_error(token.span.clone(), "Invalid number".to_string())
                })?;
                Ok(Expr::Literal {
                    value: Value::Double(value),
                    span: token.span,
                })
            }
            TokenType::True => Ok(Expr::Literal {
                value: Value::Bool(true),
                span: token.span,
            }),
            TokenType::False => Ok(Expr::Literal {
                value: Value::Bool(false),
                span: token.span,
            }),
            TokenType::Pi => Ok(Expr::Constant {
                kind: ConstantKind::Pi,
                span: token.span,
            }),
            TokenType::E => Ok(Expr::Constant {
                kind: ConstantKind::E,
                span: token.span,
            }),
            TokenType::LeftParen => {
                let expr = self.expression()?;
                self.consume_with_help(
                    TokenType::RightParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching ')'.".to_string(),
                )?;
                Ok(expr)
            }
            TokenType::Log => self.function_call(Function::Log10, token),
            TokenType::Sin => self.function_call(Function::Sin, token),
            TokenType::Cos => self.function_call(Function::Cos, token),
            TokenType::Tan => self.function_call(Function::Tan, token),
            TokenType::Cot => self.function_call(Function::Cot, token),
            TokenType::Sqrt => self.function_call(Function::Sqrt, token),
            TokenType::Pow => self.function_call(Function::Square, token),
            TokenType::Deg => self.function_call(Function::ToDegrees, token),
            TokenType::Rad => self.function_call(Function::ToRadians, token),
            TokenType::Variable => {
                if !self.environment.is_defined(&token.lexeme) {
                    return Err(CalcError::undefined_variable(
                        token.span,
                        format!("Undefined variable '{}'", token.lexeme),
                    ));
                }
                Ok(Expr::Variable {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenType::VariableSet => self.assignment(token),
            _ => Err(CalcError::syntax_error_with_help(
                token.span,
                format!("Expected expression, found '{}'", token.lexeme),
                "Expected a number, constant, function call, variable or parenthesized expression here.".to_string(),
            )),
        }
    }

    fn function_call(&mut self, function: Function, token: Token) -> Result<Expr, CalcError> {
        self.consume_with_help(
            TokenType::LeftParen,
            "Expected '(' after function name",
            "Functions take one parenthesized argument, e.g. sqrt(2).".to_string(),
        )?;
        let argument = self.expression()?;
        let closing = self.consume_with_help(
            TokenType::RightParen,
            "Expected ')' after function argument",
            "Functions take one parenthesized argument, e.g. sqrt(2).".to_string(),
        )?;
        let span = Span::new(token.span.start, closing.span.end);

        Ok(Expr::Call {
            function,
            argument: Box::new(argument),
            span,
        })
    }

    fn assignment(&mut self, target: Token) -> Result<Expr, CalcError> {
        // An assignment target is legal only as the very first token of
        // the statement.
        if self.current != 1 {
            return Err(CalcError::syntax_error_with_help(
                target.span,
                "Assignment must start the statement".to_string(),
                "Write the variable being assigned first, e.g. 'x = 1 + 2'.".to_string(),
            ));
        }

        let operator = if self.match_types(&[TokenType::Equal]) {
            AssignOp::Assign
        } else if self.match_types(&[TokenType::PlusEqual]) {
            AssignOp::AddAssign
        } else if self.match_types(&[TokenType::MinusEqual]) {
            AssignOp::SubAssign
        } else if self.match_types(&[TokenType::StarEqual]) {
            AssignOp::MulAssign
        } else if self.match_types(&[TokenType::SlashEqual]) {
            AssignOp::DivAssign
        } else {
            return Err(CalcError::syntax_error(
                self.peek().span.clone(),
                format!("Expected assignment operator, found '{}'", self.peek().lexeme),
            ));
        };

        let value = self.expression()?;
        let end = self.previous().span.end;
        let span = Span::new(target.span.start, end);

        // Compound assignments combine the right-hand side with the
        // variable's current value here, at parse time; evaluation later
        // just re-reads the result.
        let precomputed = match operator {
            AssignOp::Assign => None,
            _ => {
                let current_value = self.environment.get(&target.lexeme).ok_or_else(|| {
                    CalcError::undefined_variable(
                        target.span.clone(),
                        format!("Undefined variable '{}'", target.lexeme),
                    )
                })?;

                let mut comparisons = ComparisonTracker::new();
                let rhs = evaluator::evaluate_operand(&value, self.environment, &mut comparisons)?;

                let combined = match operator {
                    AssignOp::AddAssign => rhs.add(&current_value),
                    AssignOp::SubAssign => current_value.sub(&rhs),
                    AssignOp::MulAssign => rhs.mul(&current_value),
                    AssignOp::DivAssign => current_value.div(&rhs),
                    AssignOp::Assign => unreachable!(),
                }
                .map_err(|message| CalcError::runtime_error(span.clone(), message))?;

                Some(combined)
            }
        };

        Ok(Expr::Assign {
            name: target.lexeme,
            operator,
            value: Box::new(value),
            precomputed,
            span,
        })
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, CalcError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            let error_span = if self.is_at_end() {
                if self.current > 0 {
                    let last_token = &self.tokens[self.current - 1];
                    Span::single(last_token.span.end)
                } else {
                    self.peek().span.clone()
                }
            } else {
                self.peek().span.clone()
            };

            Err(CalcError::syntax_error_with_help(
                error_span,
                message.to_string(),
                help,
            ))
        }
    }
}
