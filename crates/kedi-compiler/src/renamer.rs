//! Name resolution: syntax tree → plain IR.
//!
//! Locals become numbered slots (parameters first, then every `let` in
//! source order) and call targets become function indices. All name errors
//! in the program are collected before giving up.

use std::collections::HashMap;

use kedi_types::ast::{self, ElseBranch, ExprKind};
use kedi_types::plain::{self, FuncIndex, Slot};
use kedi_types::{CompileErrors, ErrorCode, KediError, SourceFile, Span};

use crate::scope::ScopeStack;

/// Result of renaming: the plain module + any errors collected.
pub struct RenameResult {
    /// Only meaningful when `errors` is empty.
    pub module: plain::Module,
    pub errors: CompileErrors,
}

/// Resolve every name in `program`.
pub fn rename(program: &ast::Program, source_file: &SourceFile) -> RenameResult {
    Renamer::new(source_file).rename_program(program)
}

#[derive(Debug, Clone, Copy)]
struct Signature {
    index: FuncIndex,
    arity: usize,
}

struct Renamer<'src> {
    source_file: &'src SourceFile,
    functions: HashMap<String, Signature>,
    errors: CompileErrors,
}

impl<'src> Renamer<'src> {
    fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source_file,
            functions: HashMap::new(),
            errors: CompileErrors::empty(),
        }
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        self.errors.push_error(KediError::new(
            &self.source_file.name,
            code,
            message,
            span,
            source_line,
        ));
    }

    fn rename_program(mut self, program: &ast::Program) -> RenameResult {
        // Signatures first so calls may refer to later functions.
        let mut declared = Vec::new();
        for decl in &program.functions {
            if self.functions.contains_key(&decl.name.name) {
                self.error(
                    ErrorCode::DUPLICATE_FUNCTION,
                    format!("function '{}' is already declared", decl.name.name),
                    decl.name.span,
                );
                continue;
            }
            let signature = Signature {
                index: FuncIndex(declared.len() as u32),
                arity: decl.params.len(),
            };
            self.functions.insert(decl.name.name.clone(), signature);
            declared.push((decl, signature.index));
        }

        let functions = declared
            .into_iter()
            .map(|(decl, index)| FunctionRenamer::new(&mut self, index).rename(decl))
            .collect();

        RenameResult {
            module: plain::Module { functions },
            errors: self.errors,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-function state
// ══════════════════════════════════════════════════════════════════════════════

struct FunctionRenamer<'r, 'src> {
    renamer: &'r mut Renamer<'src>,
    index: FuncIndex,
    scopes: ScopeStack,
    /// Source name of every slot allocated so far.
    locals: Vec<String>,
}

impl<'r, 'src> FunctionRenamer<'r, 'src> {
    fn new(renamer: &'r mut Renamer<'src>, index: FuncIndex) -> Self {
        Self {
            renamer,
            index,
            scopes: ScopeStack::new(),
            locals: Vec::new(),
        }
    }

    fn rename(mut self, decl: &ast::FunDecl) -> plain::Function {
        for param in &decl.params {
            let slot = self.alloc(&param.name);
            if !self.scopes.define(&param.name, slot) {
                self.renamer.error(
                    ErrorCode::DUPLICATE_PARAMETER,
                    format!(
                        "parameter '{}' appears more than once in '{}'",
                        param.name, decl.name.name
                    ),
                    param.span,
                );
            }
        }

        // The body shares the parameters' scope.
        let body = self.stmts(&decl.body.stmts);

        plain::Function {
            name: decl.name.name.clone(),
            index: self.index,
            arity: decl.params.len() as u32,
            locals: self.locals,
            body,
        }
    }

    fn alloc(&mut self, name: &str) -> Slot {
        let slot = Slot(self.locals.len() as u32);
        self.locals.push(name.to_string());
        slot
    }

    fn block(&mut self, block: &ast::Block) -> Vec<plain::Stmt> {
        self.scopes.push_scope();
        let stmts = self.stmts(&block.stmts);
        self.scopes.pop_scope();
        stmts
    }

    fn stmts(&mut self, stmts: &[ast::Stmt]) -> Vec<plain::Stmt> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &ast::Stmt) -> plain::Stmt {
        match stmt {
            ast::Stmt::Let(s) => {
                // The initialiser cannot see the name it introduces.
                let value = self.expr(&s.value);
                let slot = self.declare(&s.name);
                plain::Stmt::Let(slot, value)
            }
            ast::Stmt::Assign(s) => {
                let value = self.expr(&s.value);
                let slot = self.resolve_local(&s.target.name, s.target.span);
                plain::Stmt::Assign(slot, value)
            }
            ast::Stmt::While(s) => {
                let condition = self.expr(&s.condition);
                let body = self.block(&s.body);
                plain::Stmt::While(condition, body)
            }
            ast::Stmt::If(s) => self.if_stmt(s),
            ast::Stmt::Return(s) => plain::Stmt::Return(self.expr(&s.value)),
            ast::Stmt::Expr(s) => plain::Stmt::Expr(self.expr(&s.expr)),
        }
    }

    /// Allocate and bind a slot for a `let`. Redeclaring a name in the same
    /// scope is E205 and reuses the existing slot.
    fn declare(&mut self, name: &ast::Ident) -> Slot {
        if self.scopes.defined_in_current_scope(&name.name) {
            self.renamer.error(
                ErrorCode::VARIABLE_ALREADY_DECLARED,
                format!("'{}' is already declared in this scope", name.name),
                name.span,
            );
            return self.scopes.lookup(&name.name).unwrap_or(Slot(0));
        }
        let slot = self.alloc(&name.name);
        self.scopes.define(&name.name, slot);
        slot
    }

    fn if_stmt(&mut self, s: &ast::IfStmt) -> plain::Stmt {
        let condition = self.expr(&s.condition);
        let then_body = self.block(&s.then_block);
        let else_body = match &s.else_branch {
            Some(ElseBranch::Block(block)) => self.block(block),
            Some(ElseBranch::ElseIf(nested)) => vec![self.if_stmt(nested)],
            None => Vec::new(),
        };
        plain::Stmt::If(condition, then_body, else_body)
    }

    // ── Expressions ──────────────────────────────────────────────────────

    fn expr(&mut self, expr: &ast::Expr) -> plain::Expr {
        match &expr.kind {
            ExprKind::NumberLit(value) => plain::Expr::Const(*value),
            ExprKind::BoolLit(value) => plain::Expr::Const(*value as i32),
            ExprKind::Identifier(name) => plain::Expr::Local(self.resolve_local(name, expr.span)),
            ExprKind::Call { name, args } => {
                let args: Vec<_> = args.iter().map(|arg| self.expr(arg)).collect();
                let func = self.resolve_call(name, args.len(), expr.span);
                plain::Expr::Call(func, args)
            }
            ExprKind::Binary { left, op, right } => plain::Expr::Binary(
                *op,
                Box::new(self.expr(left)),
                Box::new(self.expr(right)),
            ),
            ExprKind::Unary { op, operand } => {
                plain::Expr::Unary(*op, Box::new(self.expr(operand)))
            }
        }
    }

    /// The slot bound to `name`, or `%0` after reporting E200.
    fn resolve_local(&mut self, name: &str, span: Span) -> Slot {
        if let Some(slot) = self.scopes.lookup(name) {
            return slot;
        }
        let message = if self.renamer.functions.contains_key(name) {
            format!("'{name}' is a function; call it as {name}(...)")
        } else {
            format!("unknown variable '{name}'")
        };
        self.renamer.error(ErrorCode::UNKNOWN_VARIABLE, message, span);
        Slot(0)
    }

    fn resolve_call(&mut self, name: &ast::Ident, arg_count: usize, span: Span) -> FuncIndex {
        let Some(signature) = self.renamer.functions.get(&name.name).copied() else {
            self.renamer.error(
                ErrorCode::UNKNOWN_FUNCTION,
                format!("unknown function '{}'", name.name),
                name.span,
            );
            return FuncIndex(0);
        };
        if signature.arity != arg_count {
            let plural = if signature.arity == 1 { "" } else { "s" };
            self.renamer.error(
                ErrorCode::WRONG_ARG_COUNT,
                format!(
                    "'{}' takes {} argument{plural}, got {arg_count}",
                    name.name, signature.arity
                ),
                span,
            );
        }
        signature.index
    }
}
