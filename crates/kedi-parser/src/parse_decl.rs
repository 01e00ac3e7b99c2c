//! Top-level parsing: the program and its function declarations.

use kedi_lexer::token::TokenKind;
use kedi_types::ast::*;
use kedi_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// `Program = { FunDecl }`
    pub(crate) fn parse_program(&mut self) -> Program {
        self.skip_newlines();
        let start = self.current_span();
        let mut functions = Vec::new();

        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if !self.check(&TokenKind::Fun) {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!(
                        "expected 'fun' declaration, got '{}'",
                        self.peek_kind()
                    ),
                );
                self.skip_to_next_fun();
                continue;
            }
            match self.parse_fun_decl() {
                Some(decl) => functions.push(decl),
                None => self.skip_to_next_fun(),
            }
            self.skip_newlines();
        }

        let span = start.merge(self.previous_span());
        Program { functions, span }
    }

    /// Top-level recovery: resume at the next `fun`.
    fn skip_to_next_fun(&mut self) {
        while !self.at_end() && !self.check(&TokenKind::Fun) {
            self.advance();
        }
    }

    /// `FunDecl = "fun" Identifier "(" [ Identifier { "," Identifier } ] ")" Block`
    fn parse_fun_decl(&mut self) -> Option<FunDecl> {
        let start = self.current_span();
        self.advance(); // eat `fun`
        let name = self.expect_identifier()?;

        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        self.expect_statement_end();
        Some(FunDecl {
            name,
            params,
            body,
            span,
        })
    }
}
