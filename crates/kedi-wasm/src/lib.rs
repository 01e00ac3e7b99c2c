//! Kedi compiler as a WASM module for the browser playground.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { runner, project } from 'kedi-wasm';
//!
//! await init();
//!
//! const result = runner("fun main() { return 42 }");
//! // { Success: { syntax, plain, simple, wat, wasm: "AGFzbQ..." } }
//! // or { Error: { message: "1:14: E100 [syntax] ..." } }
//!
//! project("fun main() { return 42 }", "simple");
//! ```

use base64::Engine as _;
use kedi_types::{CompileResult, RepresentationKind};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileSuccessWeb {
    pub syntax: String,
    pub plain: String,
    pub simple: String,
    pub wat: String,
    /// Base64 artifact; `null` when there is nothing to run.
    pub wasm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileErrorWeb {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompileResultWeb {
    Success(CompileSuccessWeb),
    Error(CompileErrorWeb),
}

#[wasm_bindgen(typescript_custom_section)]
const TS_COMPILE_RESULT: &'static str = r#"
interface CompileSuccessWeb {
    syntax: string;
    plain: string;
    simple: string;
    wat: string;
    wasm: string | null;
}

interface CompileErrorWeb {
    message: string;
}

type CompileResultWeb =
    { Success: CompileSuccessWeb } |
    { Error: CompileErrorWeb };
"#;

impl From<&CompileResult> for CompileResultWeb {
    fn from(result: &CompileResult) -> Self {
        match result {
            CompileResult::Success { artifact, .. } => {
                let text = |kind| result.representation(kind).unwrap_or_default().to_string();
                CompileResultWeb::Success(CompileSuccessWeb {
                    syntax: text(RepresentationKind::Syntax),
                    plain: text(RepresentationKind::Plain),
                    simple: text(RepresentationKind::Simple),
                    wat: text(RepresentationKind::WasmText),
                    wasm: artifact
                        .as_ref()
                        .map(|a| base64::engine::general_purpose::STANDARD.encode(a.bytes())),
                })
            }
            CompileResult::Error { message } => CompileResultWeb::Error(CompileErrorWeb {
                message: message.clone(),
            }),
        }
    }
}

/// Compile `source` into its browser-facing shape.
pub fn compile_web(source: &str) -> CompileResultWeb {
    CompileResultWeb::from(&kedi_compiler::compile(source))
}

/// Compile `source` and return every view plus the artifact.
#[wasm_bindgen]
pub fn runner(source: &str) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&compile_web(source)).map_err(|e| JsError::new(&e.to_string()))
}

/// Same as [`runner`], as a JSON string.
#[wasm_bindgen]
pub fn runner_json(source: &str) -> String {
    serde_json::to_string(&compile_web(source)).unwrap_or_else(|e| {
        format!(r#"{{"Error":{{"message":"Serialization error: {e}"}}}}"#)
    })
}

/// The text the playground shows for `kind` (`syntax`, `plain`, `simple`,
/// `wasm`, or nothing for no selection).
#[wasm_bindgen]
pub fn project(source: &str, kind: Option<String>) -> Result<String, JsError> {
    project_view(source, kind.as_deref()).map_err(|message| JsError::new(&message))
}

/// [`project`] without the JavaScript error type.
pub fn project_view(source: &str, kind: Option<&str>) -> Result<String, String> {
    let kind = kind
        .filter(|k| !k.is_empty())
        .map(str::parse::<RepresentationKind>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let result = kedi_compiler::compile(source);
    kedi_playground::try_project(&result, kind).map_err(|e| e.to_string())
}

/// Return the compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
