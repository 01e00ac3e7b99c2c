use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Name,
    Structure,
    Codegen,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const INTEGER_OUT_OF_RANGE: Self = Self(101);
    pub const UNEXPECTED_CHARACTER: Self = Self(102);

    // ── Name resolution errors (E200–E299) ──
    pub const UNKNOWN_VARIABLE: Self = Self(200);
    pub const UNKNOWN_FUNCTION: Self = Self(201);
    pub const WRONG_ARG_COUNT: Self = Self(202);
    pub const DUPLICATE_FUNCTION: Self = Self(203);
    pub const DUPLICATE_PARAMETER: Self = Self(204);
    pub const VARIABLE_ALREADY_DECLARED: Self = Self(205);

    // ── Structure errors (E300–E399) ──
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(300);

    // ── Codegen errors (E400–E499) ──
    pub const CODEGEN_FAILED: Self = Self(400);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Name,
            300..=399 => ErrorCategory::Structure,
            400..=499 => ErrorCategory::Codegen,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Name => write!(f, "name"),
            Self::Structure => write!(f, "structure"),
            Self::Codegen => write!(f, "codegen"),
        }
    }
}

/// A structured Kedi compiler diagnostic.
///
/// Hosts render these however they like; the playground shows the
/// [`Display`](fmt::Display) form, one diagnostic per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KediError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl KediError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for KediError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for KediError {}

/// Diagnostics collected by one compiler stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<KediError>,
    /// Every error reported, including those past [`MAX_ERRORS`].
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// `true` once [`MAX_ERRORS`] errors have been reported.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push_error(&mut self, error: KediError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append every diagnostic from `other`.
    pub fn extend(&mut self, other: CompileErrors) {
        let unlisted = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += unlisted;
    }

    /// One diagnostic per line, suitable for the playground's error view.
    pub fn to_message(&self) -> String {
        let mut lines: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        let hidden = self.total_errors.saturating_sub(self.errors.len());
        if hidden > 0 {
            lines.push(format!("... and {hidden} more errors"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: ErrorCode, message: &str) -> KediError {
        KediError::new(
            "main.kedi",
            code,
            message,
            Span::new(3, 9, 3, 10),
            "  let x = )",
        )
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::INTEGER_OUT_OF_RANGE.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::UNKNOWN_VARIABLE.category(), ErrorCategory::Name);
        assert_eq!(ErrorCode::DUPLICATE_FUNCTION.category(), ErrorCategory::Name);
        assert_eq!(
            ErrorCode::NESTING_LIMIT_EXCEEDED.category(),
            ErrorCategory::Structure
        );
        assert_eq!(ErrorCode::CODEGEN_FAILED.category(), ErrorCategory::Codegen);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UNKNOWN_FUNCTION.to_string(), "E201");
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.to_string(), "E100");
    }

    #[test]
    fn test_error_display() {
        let err = sample(ErrorCode::UNEXPECTED_TOKEN, "unexpected token ')'");
        assert_eq!(err.to_string(), "3:9: E100 [syntax] unexpected token ')'");
        let hinted = err.with_suggestion("add an expression after '='");
        assert_eq!(
            hinted.to_string(),
            "3:9: E100 [syntax] unexpected token ')' (hint: add an expression after '=')"
        );
    }

    #[test]
    fn test_error_json_serialization() {
        let err = sample(ErrorCode::UNKNOWN_VARIABLE, "unknown variable 'y'")
            .with_suggestion("declare it with 'let y = ...'");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""code":200"#));
        assert!(json.contains(r#""category":"name""#));
        assert!(json.contains(r#""line":3"#));
        assert!(json.contains(r#""end_column":10"#));
        assert!(json.contains(r#""suggestion""#));

        let back: KediError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn test_compile_errors_max_limit() {
        let mut errs = CompileErrors::empty();
        for i in 0..25 {
            errs.push_error(sample(ErrorCode::UNEXPECTED_TOKEN, &format!("error {i}")));
        }
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.is_full());
        assert!(errs.to_message().ends_with("... and 5 more errors"));
    }

    #[test]
    fn test_compile_errors_message_one_per_line() {
        let mut errs = CompileErrors::empty();
        errs.push_error(sample(ErrorCode::UNKNOWN_VARIABLE, "unknown variable 'a'"));
        errs.push_error(sample(ErrorCode::UNKNOWN_VARIABLE, "unknown variable 'b'"));
        assert_eq!(
            errs.to_message(),
            "3:9: E200 [name] unknown variable 'a'\n3:9: E200 [name] unknown variable 'b'"
        );
    }

    #[test]
    fn test_compile_errors_extend() {
        let mut a = CompileErrors::empty();
        a.push_error(sample(ErrorCode::UNEXPECTED_TOKEN, "first"));
        let mut b = CompileErrors::empty();
        b.push_error(sample(ErrorCode::UNKNOWN_FUNCTION, "second"));
        a.extend(b);
        assert_eq!(a.total_errors, 2);
        assert_eq!(a.errors[1].message, "second");
    }

    #[test]
    fn test_compile_errors_json_shape() {
        let mut errs = CompileErrors::empty();
        errs.push_error(sample(ErrorCode::UNKNOWN_VARIABLE, "unknown variable 'a'"));
        let json = serde_json::to_value(&errs).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["errors", "total_errors"]);
        assert!(json["errors"][0].get("severity").is_none());
    }

    #[test]
    fn test_compile_errors_empty() {
        let errs = CompileErrors::empty();
        assert!(!errs.has_errors());
        assert_eq!(errs.to_message(), "");
    }
}
