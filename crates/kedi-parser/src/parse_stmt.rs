//! Statement parsing.

use kedi_lexer::token::TokenKind;
use kedi_types::ast::*;
use kedi_types::{ErrorCode, Span};

use crate::parser::{Parser, MAX_BLOCK_DEPTH};

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;

        if !self.enter_block(start) {
            return None;
        }

        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.position();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.recover_from(before),
            }
            self.skip_newlines();
        }
        self.block_depth -= 1;

        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Bump the block depth, reporting E300 at `span` when it is exceeded.
    fn enter_block(&mut self, span: Span) -> bool {
        self.block_depth += 1;
        if self.block_depth > MAX_BLOCK_DEPTH {
            self.error_at(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}"),
                span,
            );
            self.block_depth -= 1;
            return false;
        }
        true
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let_stmt().map(Stmt::Let),
            TokenKind::While => self.parse_while_stmt().map(Stmt::While),
            TokenKind::If => {
                let stmt = self.parse_if_stmt()?;
                self.expect_statement_end();
                Some(Stmt::If(stmt))
            }
            TokenKind::Return => self.parse_return_stmt().map(Stmt::Return),
            TokenKind::Identifier(_) if self.look_ahead(1) == &TokenKind::Eq => {
                self.parse_assign_stmt().map(Stmt::Assign)
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                self.expect_statement_end();
                Some(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `let name = value`
    fn parse_let_stmt(&mut self) -> Option<LetStmt> {
        let start = self.current_span();
        self.advance(); // eat `let`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        self.expect_statement_end();
        Some(LetStmt { name, value, span })
    }

    /// `name = value`
    fn parse_assign_stmt(&mut self) -> Option<AssignStmt> {
        let target = self.expect_identifier()?;
        self.advance(); // eat `=`
        let value = self.parse_expression()?;
        let span = target.span.merge(value.span);
        self.expect_statement_end();
        Some(AssignStmt {
            target,
            value,
            span,
        })
    }

    /// `while condition { body }`
    fn parse_while_stmt(&mut self) -> Option<WhileStmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        self.expect_statement_end();
        Some(WhileStmt {
            condition,
            body,
            span,
        })
    }

    /// `if condition { then } [ else { ... } | else if ... ]`
    ///
    /// The trailing statement terminator is left to the caller so `else if`
    /// chains can recurse.
    fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                // `else if` nests like a block.
                if !self.enter_block(self.current_span()) {
                    return None;
                }
                let nested = self.parse_if_stmt();
                self.block_depth -= 1;
                Some(ElseBranch::ElseIf(Box::new(nested?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        let end = match &else_branch {
            Some(ElseBranch::Block(block)) => block.span,
            Some(ElseBranch::ElseIf(nested)) => nested.span,
            None => then_block.span,
        };
        Some(IfStmt {
            condition,
            then_block,
            else_branch,
            span: start.merge(end),
        })
    }

    /// `return value`
    fn parse_return_stmt(&mut self) -> Option<ReturnStmt> {
        let start = self.current_span();
        self.advance(); // eat `return`
        if matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                "'return' needs a value; every function returns an integer",
            );
            return None;
        }
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        self.expect_statement_end();
        Some(ReturnStmt { value, span })
    }
}
