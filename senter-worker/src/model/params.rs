use serde::Deserialize;

/// `data` of a `senter` request. Unknown keys are ignored.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct SenterParams {
    #[serde(default)]
    pub text: Option<String>,
}

impl SenterParams {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
