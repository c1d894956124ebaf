//! Recursive-descent parser producing the expression tree.
//!
//! Precedence, lowest first: `or`, `and`, equality, comparison, additive,
//! multiplicative, unary, postfix access.

use super::lexer::{tokenize, Spanned, Token};
use super::ExpressionError;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Literal(Value),
    Variable(String),
    Property {
        target: Box<Node>,
        name: String,
        null_safe: bool,
    },
    Index {
        target: Box<Node>,
        index: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Deepest expression tree the parser accepts. Both parsing and
/// evaluation recurse, so the bound keeps them well inside the stack.
pub(crate) const MAX_DEPTH: usize = 128;

pub(crate) fn parse(source: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        nesting: 0,
    };
    let tree = parser.or_expr()?;
    match parser.peek() {
        None => Ok(tree.node),
        Some(_) => Err(parser.error("unexpected trailing input")),
    }
}

/// A subtree together with its height.
struct Tree {
    node: Node,
    height: usize,
}

impl Tree {
    fn leaf(node: Node) -> Self {
        Self { node, height: 1 }
    }
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Parentheses, brackets, and prefix operators currently open.
    nesting: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> ExpressionError {
        let position = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |s| s.position);
        ExpressionError::Syntax {
            expression: self.source.to_string(),
            position,
            message: message.to_string(),
        }
    }

    fn too_deep(&self) -> ExpressionError {
        self.error("expression nested too deeply")
    }

    fn expect(&mut self, expected: Token, message: &str) -> Result<(), ExpressionError> {
        if self.peek() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word.eq_ignore_ascii_case(keyword))
    }

    /// Run `parse` one nesting level deeper.
    fn nested<F>(&mut self, parse: F) -> Result<Tree, ExpressionError>
    where
        F: FnOnce(&mut Self) -> Result<Tree, ExpressionError>,
    {
        if self.nesting >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let tree = parse(self);
        self.nesting -= 1;
        tree
    }

    /// Place `node` above a subtree of height `below`.
    fn grow(&self, node: Node, below: usize) -> Result<Tree, ExpressionError> {
        let height = below + 1;
        if height > MAX_DEPTH {
            return Err(self.too_deep());
        }
        Ok(Tree { node, height })
    }

    fn binary(&self, op: BinaryOp, lhs: Tree, rhs: Tree) -> Result<Tree, ExpressionError> {
        let below = lhs.height.max(rhs.height);
        self.grow(binary(op, lhs.node, rhs.node), below)
    }

    fn or_expr(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.and_expr()?;
        while matches!(self.peek(), Some(Token::OrOr)) || self.is_keyword("or") {
            self.pos += 1;
            let rhs = self.and_expr()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.equality()?;
        while matches!(self.peek(), Some(Token::AndAnd)) || self.is_keyword("and") {
            self.pos += 1;
            let rhs = self.equality()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn equality(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                _ if self.is_keyword("eq") => BinaryOp::Eq,
                _ if self.is_keyword("ne") => BinaryOp::Ne,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.comparison()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn comparison(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ if self.is_keyword("lt") => BinaryOp::Lt,
                _ if self.is_keyword("le") => BinaryOp::Le,
                _ if self.is_keyword("gt") => BinaryOp::Gt,
                _ if self.is_keyword("ge") => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.additive()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn additive(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn multiplicative(&mut self) -> Result<Tree, ExpressionError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Tree, ExpressionError> {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Negate,
            _ if self.is_keyword("not") => UnaryOp::Not,
            _ => return self.postfix(),
        };
        self.pos += 1;
        let operand = self.nested(Self::unary)?;
        let below = operand.height;
        self.grow(
            Node::Unary {
                op,
                operand: Box::new(operand.node),
            },
            below,
        )
    }

    fn postfix(&mut self) -> Result<Tree, ExpressionError> {
        let mut tree = self.primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot | Token::SafeDot) => {
                    let null_safe = matches!(self.peek(), Some(Token::SafeDot));
                    self.pos += 1;
                    let Some(Token::Ident(name)) = self.peek().cloned() else {
                        return Err(self.error("expected property name"));
                    };
                    self.pos += 1;
                    let below = tree.height;
                    let node = Node::Property {
                        target: Box::new(tree.node),
                        name,
                        null_safe,
                    };
                    tree = self.grow(node, below)?;
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.nested(Self::or_expr)?;
                    self.expect(Token::RBracket, "expected ']'")?;
                    let below = tree.height.max(index.height);
                    let node = Node::Index {
                        target: Box::new(tree.node),
                        index: Box::new(index.node),
                    };
                    tree = self.grow(node, below)?;
                }
                _ => return Ok(tree),
            }
        }
    }

    fn primary(&mut self) -> Result<Tree, ExpressionError> {
        let Some(token) = self.advance() else {
            return Err(self.error("unexpected end of expression"));
        };
        match token {
            Token::Variable(name) => Ok(Tree::leaf(Node::Variable(name))),
            Token::Int(i) => Ok(Tree::leaf(Node::Literal(Value::from(i)))),
            Token::Float(f) => Ok(Tree::leaf(Node::Literal(Value::from(f)))),
            Token::Str(s) => Ok(Tree::leaf(Node::Literal(Value::String(s)))),
            Token::Ident(word) => match word.to_ascii_lowercase().as_str() {
                "true" => Ok(Tree::leaf(Node::Literal(Value::Bool(true)))),
                "false" => Ok(Tree::leaf(Node::Literal(Value::Bool(false)))),
                "null" => Ok(Tree::leaf(Node::Literal(Value::Null))),
                _ => {
                    self.pos -= 1;
                    Err(self.error(&format!(
                        "unexpected identifier '{word}' (variables are referenced as '#{word}')"
                    )))
                }
            },
            Token::LParen => {
                let inner = self.nested(Self::or_expr)?;
                self.expect(Token::RParen, "expected ')'")?;
                Ok(inner)
            }
            _ => {
                self.pos -= 1;
                Err(self.error("expected a value"))
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Node {
    Node::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
