//! Restricted expression lexer, AST, parser, and evaluator used by `display`.
//!
//! Operands are number, string and boolean literals, bound variables and
//! `.field` access on objects.  There are no calls and no assignment; the
//! only state an expression can observe is what [`EvalContext`] hands out.
//!
//! Operator precedence (lowest → highest):
//!   or  →  and  →  equality  →  relational  →  additive  →
//!   multiplicative  →  unary  →  postfix (`.field`)  →  primary

use std::cmp::Ordering;

use super::error::EvalError;
use super::value::{Value, VarStore};

/// Parser recursion limit; keeps `((((…` from exhausting the stack.
const MAX_DEPTH: usize = 256;

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Variable lookup interface used by the evaluator.
pub trait EvalContext {
    fn get_var(&self, name: &str) -> Option<Value>;
}

impl EvalContext for VarStore {
    fn get_var(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Dot,

    Eq, // ==
    Ne, // !=
    Lt,
    Le,
    Gt,
    Ge,

    And, // &&
    Or,  // ||

    LParen,
    RParen,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(x) => format!("number {}", Value::Number(*x)),
            Token::Str(s) => format!("string \"{s}\""),
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Eof => "end of input".to_owned(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::Dot => ".",
            Token::Eq => "==",
            Token::Ne => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Number(_) | Token::Str(_) | Token::Ident(_) | Token::Eof => "",
        }
    }
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer {
    src: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn take_digits(&mut self, s: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            s.push(c);
            self.pos += 1;
        }
    }

    fn read_number(&mut self, first: char) -> Result<Token, EvalError> {
        let mut s = String::from(first);
        self.take_digits(&mut s);
        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            s.push('.');
            self.pos += 1;
            self.take_digits(&mut s);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            s.push('e');
            self.pos += 1;
            if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
                s.push(sign);
                self.pos += 1;
            }
            self.take_digits(&mut s);
        }
        s.parse()
            .map(Token::Number)
            .map_err(|_| EvalError::InvalidNumber(s))
    }

    fn read_string(&mut self, quote: char) -> Result<Token, EvalError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(EvalError::UnterminatedString),
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(EvalError::UnterminatedString),
                },
                Some(c) if c == quote => break,
                Some(c) => s.push(c),
            }
        }
        Ok(Token::Str(s))
    }

    fn read_ident(&mut self, first: char) -> Token {
        let mut s = String::from(first);
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            s.push(c);
            self.pos += 1;
        }
        Token::Ident(s)
    }

    fn next_token(&mut self) -> Result<Token, EvalError> {
        self.skip_ws();
        let Some(ch) = self.advance() else {
            return Ok(Token::Eof);
        };

        Ok(match ch {
            '0'..='9' => self.read_number(ch)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let mut s = String::from("0.");
                self.take_digits(&mut s);
                s.parse()
                    .map(Token::Number)
                    .map_err(|_| EvalError::InvalidNumber(s))?
            }
            '"' | '\'' => self.read_string(ch)?,
            'a'..='z' | 'A'..='Z' | '_' => self.read_ident(ch),
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '.' => Token::Dot,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '!' => {
                if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Bang
                }
            }
            '=' if self.eat('=') => Token::Eq,
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '&' if self.eat('&') => Token::And,
            '|' if self.eat('|') => Token::Or,
            c => return Err(EvalError::UnexpectedChar(c)),
        })
    }

    fn tokenize(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            let done = t == Token::Eof;
            tokens.push(t);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

// ── AST ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Field(Box<Expr>, String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        t
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    // ── Grammar ───────────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let e = self.parse_or();
        self.depth -= 1;
        e
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        Ok(Expr::Unary(op, Box::new(operand?)))
    }

    fn parse_postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::Dot) {
            match self.advance() {
                Token::Ident(field) => expr = Expr::Field(Box::new(expr), field),
                other => {
                    return Err(EvalError::Expected {
                        expected: "field name",
                        found: other.describe(),
                    })
                }
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Token::Number(x) => Ok(Expr::Literal(Value::Number(x))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            // bound variables shadow the boolean keywords
            Token::Ident(name) => Ok(Expr::Var(name)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Expected {
                        expected: "')'",
                        found: self.peek().describe(),
                    });
                }
                Ok(inner)
            }
            Token::Eof => Err(EvalError::Expected {
                expected: "operand",
                found: Token::Eof.describe(),
            }),
            other => Err(EvalError::UnexpectedToken(other.describe())),
        }
    }
}

/// Parse an expression string into an AST.
pub fn parse_expr(src: &str) -> Result<Expr, EvalError> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(EvalError::UnexpectedToken(other.describe())),
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] AST node against the given context.
pub fn eval_expr(expr: &Expr, ctx: &dyn EvalContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Var(name) => match ctx.get_var(name) {
            Some(v) => Ok(v),
            None => match name.as_str() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(EvalError::UnknownIdentifier(name.clone())),
            },
        },

        Expr::Field(inner, field) => match eval_expr(inner, ctx)? {
            Value::Object(obj) => obj
                .get(field)
                .cloned()
                .ok_or_else(|| EvalError::NoSuchField("object", field.clone())),
            other => Err(EvalError::NoSuchField(other.type_name(), field.clone())),
        },

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, ctx)?;
            match (op, &v) {
                (UnaryOp::Neg, Value::Number(x)) => Ok(Value::Number(-x)),
                (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
                (UnaryOp::Neg, _) => Err(EvalError::UnaryTypeMismatch {
                    op: "-",
                    operand: v.type_name(),
                }),
                (UnaryOp::Not, _) => Err(EvalError::UnaryTypeMismatch {
                    op: "!",
                    operand: v.type_name(),
                }),
            }
        }

        Expr::Binary(op @ (BinOp::And | BinOp::Or), lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            let lb = l.as_bool().ok_or(EvalError::UnaryTypeMismatch {
                op: op.symbol(),
                operand: l.type_name(),
            })?;
            // short-circuit
            if (*op == BinOp::And && !lb) || (*op == BinOp::Or && lb) {
                return Ok(Value::Boolean(lb));
            }
            let r = eval_expr(rhs, ctx)?;
            r.as_bool().map(Value::Boolean).ok_or(EvalError::TypeMismatch {
                op: op.symbol(),
                left: l.type_name(),
                right: r.type_name(),
            })
        }

        Expr::Binary(op, lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            eval_binop(*op, l, r)
        }
    }
}

fn eval_binop(op: BinOp, l: Value, r: Value) -> Result<Value, EvalError> {
    let mismatch = |l: &Value, r: &Value| EvalError::TypeMismatch {
        op: op.symbol(),
        left: l.type_name(),
        right: r.type_name(),
    };

    match op {
        BinOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{l}{r}")))
            }
            _ => Err(mismatch(&l, &r)),
        },

        BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            let (Some(a), Some(b)) = (l.as_number(), r.as_number()) else {
                return Err(mismatch(&l, &r));
            };
            Ok(Value::Number(match op {
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                _ => a % b,
            }))
        }

        BinOp::Eq => Ok(Value::Boolean(l == r)),
        BinOp::Ne => Ok(Value::Boolean(l != r)),

        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ord = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(&l, &r)),
            };
            // comparisons involving NaN are false
            Ok(Value::Boolean(match (op, ord) {
                (_, None) => false,
                (BinOp::Lt, Some(o)) => o == Ordering::Less,
                (BinOp::Le, Some(o)) => o != Ordering::Greater,
                (BinOp::Gt, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            }))
        }

        BinOp::And | BinOp::Or => unreachable!("short-circuit operators handled in eval_expr"),
    }
}

/// Convenience: parse and evaluate an expression string.
pub fn eval_str(src: &str, ctx: &dyn EvalContext) -> Result<Value, EvalError> {
    let expr = parse_expr(src)?;
    eval_expr(&expr, ctx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
