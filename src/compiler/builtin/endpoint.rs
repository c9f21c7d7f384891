//! Verb and socket files.

use std::fs;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::markup::fill_request;
use crate::compiler::{
    CompileError, CompileOutput, CompileUnit, Endpoint, EndpointResponse, ServerModule,
    SocketEndpoint,
};
use crate::core::RequestInfo;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// A verb file is its response body, with `{params.x}` and `{query.x}`.
pub fn compile_verb(unit: &CompileUnit) -> Result<CompileOutput, CompileError> {
    let body = read(unit)?;
    let trimmed = body.trim_start();
    let content_type = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        JSON
    } else {
        TEXT
    };

    Ok(output(
        unit,
        ServerModule::Endpoint(Arc::new(TemplateEndpoint {
            body: body.clone(),
            content_type,
        })),
        body,
    ))
}

/// A socket file is its greeting. Frames are echoed back.
pub fn compile_socket(unit: &CompileUnit) -> Result<CompileOutput, CompileError> {
    let text = read(unit)?;
    let greeting = Some(text.trim().to_string()).filter(|g| !g.is_empty());

    Ok(output(
        unit,
        ServerModule::Socket(Arc::new(EchoSocket { greeting })),
        text,
    ))
}

fn read(unit: &CompileUnit) -> Result<String, CompileError> {
    fs::read_to_string(&unit.path)
        .map_err(|e| CompileError::new(&unit.path, format!("failed to read source: {e}")))
}

fn output(unit: &CompileUnit, module: ServerModule, module_code: String) -> CompileOutput {
    let mut imports = FxHashMap::default();
    imports.insert(unit.path.clone(), Vec::new());
    CompileOutput {
        module,
        module_code,
        style: String::new(),
        data_script: None,
        hydration_script: String::new(),
        imports,
    }
}

struct TemplateEndpoint {
    body: String,
    content_type: &'static str,
}

impl Endpoint for TemplateEndpoint {
    fn respond(&self, request: &RequestInfo) -> EndpointResponse {
        let body = fill_request(
            &self.body,
            |name| request.param(name).map(str::to_string),
            |name| request.query(name).map(str::to_string),
            self.content_type == JSON,
        );
        EndpointResponse {
            status: 200,
            content_type: self.content_type,
            body,
        }
    }
}

struct EchoSocket {
    greeting: Option<String>,
}

impl SocketEndpoint for EchoSocket {
    fn greeting(&self) -> Option<String> {
        self.greeting.clone()
    }

    fn on_message(&self, text: &str) -> Option<String> {
        Some(text.to_string())
    }
}
