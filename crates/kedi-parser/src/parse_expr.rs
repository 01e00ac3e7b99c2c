//! Expression parsing with operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `or`
//! 5. `and`
//! 4. `==`, `!=`, `<`, `>`, `<=`, `>=` (no chaining)
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `not`
//! 0. call `f(...)`, literals, names, parentheses

use kedi_lexer::token::TokenKind;
use kedi_types::ast::*;
use kedi_types::ErrorCode;

use crate::parser::{Parser, MAX_EXPR_DEPTH};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        if !self.enter_expr() {
            return None;
        }
        let result = self.parse_or();
        self.expr_depth -= 1;
        result
    }

    /// Parse a left-associative operator chain.
    ///
    /// Every link nests the tree one level deeper, so each one counts
    /// against [`MAX_EXPR_DEPTH`] until the whole chain is done.
    fn chain(&mut self, parse: impl FnOnce(&mut Self) -> Option<Expr>) -> Option<Expr> {
        let depth = self.expr_depth;
        let result = parse(self);
        self.expr_depth = depth;
        result
    }

    /// Bump the nesting depth, reporting E300 when it is exceeded.
    fn enter_expr(&mut self) -> bool {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            self.expr_depth -= 1;
            return false;
        }
        true
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `OrExpr = AndExpr { "or" AndExpr }`
    fn parse_or(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_and()?;
            while p.eat(&TokenKind::Or) {
                if !p.enter_expr() {
                    return None;
                }
                let right = p.parse_and()?;
                left = binary(left, BinOp::Or, right);
            }
            Some(left)
        })
    }

    /// `AndExpr = CompExpr { "and" CompExpr }`
    fn parse_and(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_comparison()?;
            while p.eat(&TokenKind::And) {
                if !p.enter_expr() {
                    return None;
                }
                let right = p.parse_comparison()?;
                left = binary(left, BinOp::And, right);
            }
            Some(left)
        })
    }

    /// `CompExpr = AddExpr [ CompOp AddExpr ]`
    ///
    /// Comparison operators do NOT chain: `a < b < c` is a parse error.
    fn parse_comparison(&mut self) -> Option<Expr> {
        let left = self.parse_add()?;
        let Some(op) = self.match_comparison_op() else {
            return Some(left);
        };
        self.advance();
        let right = self.parse_add()?;
        if self.match_comparison_op().is_some() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "comparison operators cannot be chained; use 'and' to combine: a < b and b < c",
            );
            return None;
        }
        Some(binary(left, op, right))
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_mul()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Plus => BinOp::Add,
                    TokenKind::Minus => BinOp::Sub,
                    _ => break,
                };
                p.advance();
                if !p.enter_expr() {
                    return None;
                }
                let right = p.parse_mul()?;
                left = binary(left, op, right);
            }
            Some(left)
        })
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_unary()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Star => BinOp::Mul,
                    TokenKind::Slash => BinOp::Div,
                    TokenKind::Percent => BinOp::Mod,
                    _ => break,
                };
                p.advance();
                if !p.enter_expr() {
                    return None;
                }
                let right = p.parse_unary()?;
                left = binary(left, op, right);
            }
            Some(left)
        })
    }

    /// `UnaryExpr = ( "not" | "-" ) UnaryExpr | PrimaryExpr`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        let start = self.advance().span;
        if !self.enter_expr() {
            return None;
        }
        let operand = self.parse_unary();
        self.expr_depth -= 1;
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::NumberLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::NumberLit(n), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(false), start))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.parse_call(Ident::new(name, start))
                } else {
                    Some(Expr::new(ExprKind::Identifier(name), start))
                }
            }

            TokenKind::LParen => {
                self.advance(); // eat `(`
                let mut inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                inner.span = start.merge(self.previous_span());
                Some(inner)
            }

            kind => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{kind}'"),
                );
                None
            }
        }
    }

    /// `Call = Identifier "(" [ Expr { "," Expr } ] ")"`; the name is already consumed.
    fn parse_call(&mut self, name: Ident) -> Option<Expr> {
        self.advance(); // eat `(`
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let span = name.span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Call { name, args }, span))
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
