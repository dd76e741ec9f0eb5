use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Missing element: {0}")]
    MissingElement(&'static str),
    #[error("JavaScript error: {0}")]
    Js(String),
    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<web_sys::js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{:?}", value));
        SiteError::Js(message)
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
