use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::pipeline::InferenceError;

/// Maps class indices back to crop names
///
/// Index `i` decodes to `classes[i]`; the classes are stored in the order the
/// encoder assigned them (sorted at fit time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDecoder {
    /// Known class names
    pub classes: Vec<String>,
}

impl LabelDecoder {
    /// Create a decoder from class names
    #[must_use]
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("label decoder has no classes".to_string());
        }
        let mut seen = HashSet::with_capacity(self.classes.len());
        for class in &self.classes {
            if !seen.insert(class.as_str()) {
                return Err(format!("duplicate class '{class}'"));
            }
        }
        Ok(())
    }

    /// Number of known classes
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// True if no classes are known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Decode one class index
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::UnseenLabel`] for an index the decoder was
    /// never fitted on.
    pub fn decode(&self, index: usize) -> Result<&str, InferenceError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(InferenceError::UnseenLabel { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let decoder = LabelDecoder::new(["maize", "rice"]);
        assert_eq!(decoder.decode(1).unwrap(), "rice");
        assert_eq!(decoder.len(), 2);
        assert!(!decoder.is_empty());
    }

    #[test]
    fn test_unseen_label() {
        let decoder = LabelDecoder::new(["maize"]);
        let err = decoder.decode(3).unwrap_err();
        assert_eq!(err.to_string(), "y contains previously unseen labels: [3]");
    }

    #[test]
    fn test_check() {
        assert!(LabelDecoder::new(["a", "b"]).check().is_ok());
        assert!(LabelDecoder::new(Vec::<String>::new()).check().is_err());
        assert_eq!(
            LabelDecoder::new(["rice", "rice"]).check().unwrap_err(),
            "duplicate class 'rice'"
        );
    }
}
