use crate::error::{CalcError, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    Less,
    Greater,

    // Two-character tokens
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    EqualEqual,
    LessEqual,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,

    // Literals
    Integer,
    Double,
    True,
    False,

    // Identifiers; `VariableSet` marks write intent decided by lookahead
    Variable,
    VariableSet,

    // Constants
    Pi,
    E,

    // Function keywords, recognized only when a '(' follows
    Log,
    Sin,
    Cos,
    Tan,
    Cot,
    Sqrt,
    Pow,
    Deg,
    Rad,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, span: Span) -> Self {
        Self {
            token_type,
            lexeme,
            span,
        }
    }
}

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, CalcError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            Span::single(self.current),
        ));

        Ok(self.tokens.clone())
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) -> Result<(), CalcError> {
        let c = self.peek();

        if c.is_whitespace() {
            self.advance();
            return Ok(());
        }

        if c.is_ascii_digit() {
            return self.number();
        }

        // Two-character operators bind before their one-character prefixes.
        if self.match_str("+=") {
            self.add_token(TokenType::PlusEqual);
            return Ok(());
        }
        if self.match_str("+") {
            self.add_token(TokenType::Plus);
            return Ok(());
        }
        if self.match_str("-=") {
            self.add_token(TokenType::MinusEqual);
            return Ok(());
        }
        if self.match_str("-") {
            self.add_token(TokenType::Minus);
            return Ok(());
        }
        if self.match_str("*=") {
            self.add_token(TokenType::StarEqual);
            return Ok(());
        }
        if self.match_str("*") {
            self.add_token(TokenType::Star);
            return Ok(());
        }
        if self.match_str("/=") {
            self.add_token(TokenType::SlashEqual);
            return Ok(());
        }
        if self.match_str("/") {
            self.add_token(TokenType::Slash);
            return Ok(());
        }
        if self.match_str("(") {
            self.add_token(TokenType::LeftParen);
            return Ok(());
        }
        if self.match_str(")") {
            self.add_token(TokenType::RightParen);
            return Ok(());
        }
        if self.match_str("%") {
            self.add_token(TokenType::Percent);
            return Ok(());
        }
        if self.match_str("==") {
            self.add_token(TokenType::EqualEqual);
            return Ok(());
        }
        if self.match_str("=") {
            self.add_token(TokenType::Equal);
            return Ok(());
        }
        if self.match_str("<<") {
            self.add_token(TokenType::ShiftLeft);
            return Ok(());
        }
        if self.match_str("<=") {
            self.add_token(TokenType::LessEqual);
            return Ok(());
        }
        if self.match_str("<") {
            self.add_token(TokenType::Less);
            return Ok(());
        }
        if self.match_str(">>") {
            self.add_token(TokenType::ShiftRight);
            return Ok(());
        }
        if self.match_str(">=") {
            self.add_token(TokenType::GreaterEqual);
            return Ok(());
        }
        if self.match_str(">") {
            self.add_token(TokenType::Greater);
            return Ok(());
        }

        // Function keywords count only when a call follows; the '(' itself
        // is left for the parser to consume.
        if self.match_keyword("sqrt", TokenType::Sqrt)
            || self.match_keyword("sin", TokenType::Sin)
            || self.match_keyword("tg", TokenType::Tan)
            || self.match_keyword("pow", TokenType::Pow)
            || self.match_keyword("cos", TokenType::Cos)
            || self.match_keyword("ctg", TokenType::Cot)
            || self.match_keyword("log", TokenType::Log)
            || self.match_keyword("deg", TokenType::Deg)
            || self.match_keyword("rad", TokenType::Rad)
        {
            return Ok(());
        }

        // Bool keywords are recognized only with nothing at all after them.
        // The shell feeds every line in with a trailing space, so in
        // practice the words fall through to identifier scanning and reach
        // the parser as variable reads.
        if self.rest() == "True" {
            self.current += 4;
            self.add_token(TokenType::True);
            return Ok(());
        }
        if self.rest() == "False" {
            self.current += 5;
            self.add_token(TokenType::False);
            return Ok(());
        }

        if c.is_alphabetic() {
            self.identifier();
            return Ok(());
        }

        Err(CalcError::lex_error(
            Span::single(self.current),
            format!("Unexpected character: '{}'", c),
        ))
    }

    fn number(&mut self) -> Result<(), CalcError> {
        // The scan is lenient: any run of digits and dots is consumed, so
        // a malformed literal like `1.2.3` is only rejected by the
        // conversion below.
        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '.') {
            self.advance();
        }

        let lexeme = self.source[self.start..self.current].to_string();

        if lexeme.contains('.') {
            if lexeme.parse::<f64>().is_err() {
                return Err(CalcError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Invalid number: {}", lexeme),
                ));
            }
            self.add_token(TokenType::Double);
        } else {
            if lexeme.parse::<i64>().is_err() {
                return Err(CalcError::lex_error(
                    Span::new(self.start, self.current),
                    format!("Invalid integer: {}", lexeme),
                ));
            }
            self.add_token(TokenType::Integer);
        }

        Ok(())
    }

    /// Scans a name and decides between a read reference and a write
    /// intent by peeking at what follows, without consuming it.
    fn identifier(&mut self) {
        while !self.is_at_end() && !Self::ends_identifier(self.peek()) {
            self.advance();
        }

        let name = self.source[self.start..self.current].to_string();
        let name_end = self.current;

        // The decision point sits after any trailing whitespace.
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }

        if name == "PI" {
            self.tokens.push(Token::new(
                TokenType::Pi,
                name,
                Span::new(self.start, name_end),
            ));
            return;
        }
        if name == "E" {
            self.tokens.push(Token::new(
                TokenType::E,
                name,
                Span::new(self.start, name_end),
            ));
            return;
        }

        let rest = self.rest();
        let token_type = if rest.starts_with("==") {
            TokenType::Variable
        } else if rest.starts_with('=')
            || rest.starts_with("+=")
            || rest.starts_with("-=")
            || rest.starts_with("*=")
            || rest.starts_with("/=")
        {
            TokenType::VariableSet
        } else {
            TokenType::Variable
        };

        self.tokens.push(Token::new(
            token_type,
            name,
            Span::new(self.start, name_end),
        ));
    }

    /// Characters that terminate an identifier. Note that `)`, `%`, digits
    /// and dots do not: `x)` or `x%2` scan as a single name.
    fn ends_identifier(c: char) -> bool {
        matches!(c, '(' | '+' | '-' | '*' | '/' | '=' | '<' | '>') || c.is_whitespace()
    }

    fn rest(&self) -> &str {
        &self.source[self.current..]
    }

    fn match_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.current += expected.len();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, word: &str, token_type: TokenType) -> bool {
        let rest = self.rest();
        if rest.starts_with(word) && rest[word.len()..].starts_with('(') {
            self.current += word.len();
            self.add_token(token_type);
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if c != '\0' {
            self.current += c.len_utf8();
        }
        c
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme = self.source[self.start..self.current].to_string();
        self.tokens.push(Token::new(
            token_type,
            lexeme,
            Span::new(self.start, self.current),
        ));
    }
}
