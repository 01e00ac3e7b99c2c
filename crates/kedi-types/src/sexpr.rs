//! S-expression rendering for the compiler's intermediate representations.
//!
//! Every IR implements [`ToSExpr`]; the playground's Syntax, Plain, and
//! Simple views are the pretty-printed result at [`DEFAULT_WIDTH`] columns.

use pretty::RcDoc;
use std::fmt;

/// Line width used for the playground views.
pub const DEFAULT_WIDTH: usize = 80;

/// Conversion into an [`SExpr`] tree.
pub trait ToSExpr {
    fn to_sexpr(&self) -> SExpr;

    /// Pretty-print at [`DEFAULT_WIDTH`].
    fn to_pretty_string(&self) -> String {
        self.to_sexpr().pretty(DEFAULT_WIDTH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    Symbol(String),
    Number(i64),
    List(Vec<SExpr>),
}

impl SExpr {
    pub fn symbol(name: impl Into<String>) -> Self {
        SExpr::Symbol(name.into())
    }

    pub fn number(value: impl Into<i64>) -> Self {
        SExpr::Number(value.into())
    }

    pub fn list(items: impl IntoIterator<Item = SExpr>) -> Self {
        SExpr::List(items.into_iter().collect())
    }

    /// `(head items...)`
    pub fn form(head: &str, items: impl IntoIterator<Item = SExpr>) -> Self {
        SExpr::List(
            std::iter::once(SExpr::symbol(head))
                .chain(items)
                .collect(),
        )
    }

    fn to_doc(&self) -> RcDoc<'_, ()> {
        match self {
            SExpr::Symbol(name) => RcDoc::text(name.as_str()),
            SExpr::Number(value) => RcDoc::as_string(value),
            SExpr::List(items) => RcDoc::text("(")
                .append(
                    RcDoc::intersperse(items.iter().map(SExpr::to_doc), RcDoc::line())
                        .nest(1)
                        .group(),
                )
                .append(RcDoc::text(")")),
        }
    }

    /// Render with lists broken across lines once they exceed `width`.
    pub fn pretty(&self, width: usize) -> String {
        self.to_doc().pretty(width).to_string()
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty(DEFAULT_WIDTH))
    }
}

impl ToSExpr for SExpr {
    fn to_sexpr(&self) -> SExpr {
        self.clone()
    }
}

impl<T: ToSExpr> ToSExpr for Vec<T> {
    fn to_sexpr(&self) -> SExpr {
        SExpr::list(self.iter().map(ToSExpr::to_sexpr))
    }
}

impl ToSExpr for i32 {
    fn to_sexpr(&self) -> SExpr {
        SExpr::number(*self)
    }
}

impl ToSExpr for u32 {
    fn to_sexpr(&self) -> SExpr {
        SExpr::number(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_list_fits_on_one_line() {
        let e = SExpr::form("+", [SExpr::symbol("a"), SExpr::number(1)]);
        assert_eq!(e.pretty(80), "(+ a 1)");
    }

    #[test]
    fn test_nested_empty_list() {
        let e = SExpr::form("fun", [SExpr::symbol("main"), SExpr::list([])]);
        assert_eq!(e.to_string(), "(fun main ())");
    }

    #[test]
    fn test_long_list_breaks() {
        let items: Vec<SExpr> = (0..10).map(|i| SExpr::symbol(format!("item{i}"))).collect();
        let e = SExpr::form("block", items);
        let narrow = e.pretty(20);
        assert!(narrow.contains('\n'));
        assert!(narrow.starts_with("(block\n item0"));
        assert_eq!(e.pretty(200).lines().count(), 1);
    }

    #[test]
    fn test_negative_numbers() {
        assert_eq!(SExpr::number(-7).to_string(), "-7");
    }

    #[test]
    fn test_vec_to_sexpr() {
        let v = vec![1i32, 2, 3];
        assert_eq!(v.to_pretty_string(), "(1 2 3)");
    }
}
