use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing element #{0}")]
    MissingElement(String),
    #[error("element #{0} has an unexpected type")]
    WrongElementType(String),
    #[error("missing browser global: {0}")]
    MissingGlobal(&'static str),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        ClientError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<ClientError> for JsValue {
    fn from(error: ClientError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
