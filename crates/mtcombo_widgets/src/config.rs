//! Combo box configuration
//!
//! Configuration is a plain immutable value handed to the widget at
//! construction. It can be built in code:
//!
//! ```rust
//! use mtcombo_widgets::ComboConfig;
//!
//! let config = ComboConfig::new()
//!     .placeholder("Pick a color")
//!     .adder_text("+ color")
//!     .with_evaluator(|text, _list| text.to_lowercase());
//! assert!(config.validate().is_ok());
//! ```
//!
//! or loaded from TOML / JSON, where unknown keys are rejected:
//!
//! ```rust
//! use mtcombo_widgets::ComboConfig;
//!
//! let config = ComboConfig::from_toml_str(r#"
//!     placeholder = "Pick a color"
//!
//!     [list]
//!     adder_text = "+ color"
//! "#).unwrap();
//! assert_eq!(config.list.adder_text, "+ color");
//! assert_eq!(config.text_class, "mtph");
//! ```

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ComboError, Result};
use crate::expansion_list::ExpansionList;

/// Maps the text a user entered to the value stored for the new option
///
/// Receives the list the text was entered in. The list is already
/// removed from the surface; only its data is meaningful.
pub type Evaluator = Rc<dyn Fn(&str, &ExpansionList) -> String>;

/// Expansion list configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Class of the list container and of the row list
    pub list_class: String,
    /// Instructional label above the rows
    pub instruct_text: String,
    pub instruct_class: String,
    /// Label of the "add item" affordance
    pub adder_text: String,
    pub adder_class: String,
    /// Marker class on the row of the selected option
    pub selected_class: String,
    /// `id` of the text entry field
    pub input_id: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            list_class: "mtcombo-list".to_string(),
            instruct_text: "Select One".to_string(),
            instruct_class: "mtcombo-list-instruct".to_string(),
            adder_text: "+ item".to_string(),
            adder_class: "mtcombo-list-adder".to_string(),
            selected_class: "mtcombo-selected".to_string(),
            input_id: "mtcombo-input".to_string(),
        }
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every class name and the input id
    pub fn validate(&self) -> Result<()> {
        check_token("list.list_class", &self.list_class)?;
        check_token("list.instruct_class", &self.instruct_class)?;
        check_token("list.adder_class", &self.adder_class)?;
        check_token("list.selected_class", &self.selected_class)?;
        check_token("list.input_id", &self.input_id)
    }
}

/// Combo box configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComboConfig {
    /// Collapsed text when no option is selected
    pub placeholder: String,
    /// Class of the collapsed control
    pub control_class: String,
    /// Class of the outer wrapper
    pub wrapper_class: String,
    /// Class of the node showing the selected text
    pub text_class: String,
    pub list: ListConfig,
    #[serde(skip)]
    pub evaluator: Option<Evaluator>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            placeholder: "Select One".to_string(),
            control_class: "mtcombo".to_string(),
            wrapper_class: "mtcombo-wrapper".to_string(),
            text_class: "mtph".to_string(),
            list: ListConfig::default(),
            evaluator: None,
        }
    }
}

impl fmt::Debug for ComboConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboConfig")
            .field("placeholder", &self.placeholder)
            .field("control_class", &self.control_class)
            .field("wrapper_class", &self.wrapper_class)
            .field("text_class", &self.text_class)
            .field("list", &self.list)
            .field("evaluator", &self.evaluator.is_some())
            .finish()
    }
}

impl ComboConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ComboError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| ComboError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every class name
    pub fn validate(&self) -> Result<()> {
        check_token("control_class", &self.control_class)?;
        check_token("wrapper_class", &self.wrapper_class)?;
        check_token("text_class", &self.text_class)?;
        self.list.validate()
    }

    /// Set the placeholder text
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    /// Set the collapsed control class
    pub fn control_class(mut self, class: impl Into<String>) -> Self {
        self.control_class = class.into();
        self
    }

    /// Set the wrapper class
    pub fn wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = class.into();
        self
    }

    /// Set the display text class
    pub fn text_class(mut self, class: impl Into<String>) -> Self {
        self.text_class = class.into();
        self
    }

    /// Replace the expansion list configuration
    pub fn list(mut self, list: ListConfig) -> Self {
        self.list = list;
        self
    }

    /// Set the list's instructional text
    pub fn instruct_text(mut self, text: impl Into<String>) -> Self {
        self.list.instruct_text = text.into();
        self
    }

    /// Set the "add item" label
    pub fn adder_text(mut self, text: impl Into<String>) -> Self {
        self.list.adder_text = text.into();
        self
    }

    /// Compute stored values for added options with `evaluator`
    pub fn with_evaluator<F>(mut self, evaluator: F) -> Self
    where
        F: Fn(&str, &ExpansionList) -> String + 'static,
    {
        self.evaluator = Some(Rc::new(evaluator));
        self
    }

    /// Stored value for entered text; identity without an evaluator
    pub fn evaluate(&self, text: &str, list: &ExpansionList) -> String {
        match &self.evaluator {
            Some(evaluator) => evaluator(text, list),
            None => text.to_string(),
        }
    }
}

/// Class names and ids must be a single non-empty token
fn check_token(key: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ComboError::InvalidConfig(format!(
            "`{key}` must be a single non-empty token, got {value:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComboConfig::default();
        assert_eq!(config.placeholder, "Select One");
        assert_eq!(config.control_class, "mtcombo");
        assert_eq!(config.wrapper_class, "mtcombo-wrapper");
        assert_eq!(config.text_class, "mtph");
        assert_eq!(config.list.list_class, "mtcombo-list");
        assert_eq!(config.list.adder_text, "+ item");
        assert_eq!(config.list.input_id, "mtcombo-input");
        assert!(config.evaluator.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ComboConfig::new()
            .placeholder("Pick")
            .text_class("label")
            .instruct_text("Choose")
            .adder_text("+ new");
        assert_eq!(config.placeholder, "Pick");
        assert_eq!(config.text_class, "label");
        assert_eq!(config.list.instruct_text, "Choose");
        assert_eq!(config.list.adder_text, "+ new");
    }

    #[test]
    fn test_validate_rejects_bad_class_names() {
        let config = ComboConfig::new().wrapper_class("two words");
        assert!(matches!(
            config.validate(),
            Err(ComboError::InvalidConfig(msg)) if msg.contains("wrapper_class")
        ));

        let mut list = ListConfig::new();
        list.input_id = String::new();
        assert!(matches!(
            ComboConfig::new().list(list).validate(),
            Err(ComboError::InvalidConfig(msg)) if msg.contains("list.input_id")
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ComboConfig::from_toml_str("phtext = \"old name\"").unwrap_err();
        assert!(matches!(err, ComboError::ConfigParse(_)));

        let err = ComboConfig::from_json_str(r#"{"list": {"color": "red"}}"#).unwrap_err();
        assert!(matches!(err, ComboError::ConfigParse(_)));
    }

    #[test]
    fn test_json_config() {
        let config =
            ComboConfig::from_json_str(r#"{"placeholder": "Pick", "list": {"adder_text": "add"}}"#)
                .unwrap();
        assert_eq!(config.placeholder, "Pick");
        assert_eq!(config.list.adder_text, "add");
        assert_eq!(config.list.adder_class, "mtcombo-list-adder");
    }

    #[test]
    fn test_parsed_config_is_validated() {
        let err = ComboConfig::from_toml_str("text_class = \"\"").unwrap_err();
        assert!(matches!(err, ComboError::InvalidConfig(_)));
    }
}
