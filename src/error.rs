use std::fmt;

use thiserror::Error;

/// Which stage of the pipeline a shader belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Everything that can go wrong while setting up or driving the tunnel.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser global `{0}` is not available")]
    MissingGlobal(&'static str),
    #[error("canvas element `#{0}` not found")]
    CanvasNotFound(String),
    #[error("WebGL2 not supported")]
    ContextUnavailable,
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("failed to create {0}")]
    ResourceCreation(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("frame loop already stopped")]
    AlreadyStopped,
    #[error("javascript error: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<RenderError> for wasm_bindgen::JsValue {
    fn from(err: RenderError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for RenderError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        RenderError::Js(format!("{value:?}"))
    }
}
