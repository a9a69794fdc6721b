//! Option records and the source they are bound from

use serde::{Deserialize, Serialize};

use crate::error::{ComboError, Result};

/// One entry of a selection control
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboOption {
    /// Text shown to the user
    pub text: String,
    /// Value submitted with the form
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

impl ComboOption {
    /// Create an unselected option
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            selected: false,
        }
    }

    /// Set the selected flag
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Ordered, externally owned list of options backing a combo box
///
/// Options are identified by position. Implementations only store
/// flags; keeping a single option selected is the widget's job.
pub trait OptionSource {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&ComboOption>;

    /// Set or clear the `selected` flag of one option
    fn set_selected(&mut self, index: usize, selected: bool) -> Result<()>;

    /// Add an option at the end
    fn append(&mut self, option: ComboOption);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every option, in order
    fn snapshot(&self) -> Vec<ComboOption> {
        (0..self.len())
            .filter_map(|index| self.get(index).cloned())
            .collect()
    }

    /// Indices of all options flagged as selected
    fn selected_indices(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|index| self.get(*index).is_some_and(|o| o.selected))
            .collect()
    }
}

/// Vec-backed option source, the equivalent of a plain `<select>`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectOptions {
    options: Vec<ComboOption>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: Vec<ComboOption>) -> Self {
        Self { options }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComboOption> {
        self.options.iter()
    }

    pub fn as_slice(&self) -> &[ComboOption] {
        &self.options
    }

    /// First selected option, if any
    pub fn selected(&self) -> Option<&ComboOption> {
        self.options.iter().find(|o| o.selected)
    }
}

impl OptionSource for SelectOptions {
    fn len(&self) -> usize {
        self.options.len()
    }

    fn get(&self, index: usize) -> Option<&ComboOption> {
        self.options.get(index)
    }

    fn set_selected(&mut self, index: usize, selected: bool) -> Result<()> {
        let len = self.options.len();
        let option = self
            .options
            .get_mut(index)
            .ok_or(ComboError::IndexOutOfRange { index, len })?;
        option.selected = selected;
        Ok(())
    }

    fn append(&mut self, option: ComboOption) {
        self.options.push(option);
    }
}

impl FromIterator<ComboOption> for SelectOptions {
    fn from_iter<I: IntoIterator<Item = ComboOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SelectOptions {
    type Item = &'a ComboOption;
    type IntoIter = std::slice::Iter<'a, ComboOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruits() -> SelectOptions {
        [
            ComboOption::new("Apple", "apple"),
            ComboOption::new("Banana", "banana").with_selected(true),
            ComboOption::new("Cherry", "cherry"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_select_options_queries() {
        let source = fruits();
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
        assert_eq!(source.selected_indices(), vec![1]);
        assert_eq!(source.selected().map(|o| o.text.as_str()), Some("Banana"));
        assert_eq!(source.snapshot(), source.as_slice().to_vec());
    }

    #[test]
    fn test_set_selected_bounds() {
        let mut source = fruits();
        source.set_selected(2, true).unwrap();
        assert_eq!(source.selected_indices(), vec![1, 2]);

        assert_eq!(
            source.set_selected(3, true),
            Err(ComboError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_append_keeps_order() {
        let mut source = SelectOptions::new();
        source.append(ComboOption::new("A", "a"));
        source.append(ComboOption::new("B", "b"));
        let texts: Vec<_> = source.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["A", "B"]);
    }

    #[test]
    fn test_deserialize_without_selected_flag() {
        let source: SelectOptions =
            serde_json::from_str(r#"[{"text": "A", "value": "a"}]"#).unwrap();
        assert_eq!(source.get(0), Some(&ComboOption::new("A", "a")));
    }
}
