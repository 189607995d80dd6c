//! Ordered formula storage

use colcalc_core::ordered::Values;
use colcalc_core::OrderedMap;

/// A target column and the formula that computes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    /// Column the result is written to
    pub target: String,
    /// Formula text
    pub expression: String,
}

impl Formula {
    /// Create a new formula
    pub fn new(target: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            expression: expression.into(),
        }
    }
}

/// Insertion-ordered mapping from target column to formula text
///
/// Formulas are applied in the order they were first inserted. Replacing the
/// formula of an existing target keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaStore {
    formulas: OrderedMap<Formula>,
}

impl FormulaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a formula, returning the expression it replaced
    pub fn insert(
        &mut self,
        target: impl Into<String>,
        expression: impl Into<String>,
    ) -> Option<String> {
        let target = target.into();
        let expression = expression.into();

        if let Some(existing) = self.formulas.get_mut(&target) {
            return Some(std::mem::replace(&mut existing.expression, expression));
        }
        self.formulas
            .insert(target.clone(), Formula { target, expression });
        None
    }

    /// Get the expression for a target
    pub fn get(&self, target: &str) -> Option<&str> {
        self.formulas.get(target).map(|f| f.expression.as_str())
    }

    /// Check if a target has a formula
    pub fn contains(&self, target: &str) -> bool {
        self.formulas.contains_key(target)
    }

    /// Remove a target, returning its expression
    ///
    /// The remaining formulas keep their relative order.
    pub fn remove(&mut self, target: &str) -> Option<String> {
        self.formulas.remove(target).map(|f| f.expression)
    }

    /// Remove every formula
    pub fn clear(&mut self) {
        self.formulas.clear();
    }

    /// Number of formulas
    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Iterate over formulas in application order
    pub fn iter(&self) -> Values<'_, Formula> {
        self.formulas.values()
    }

    /// Target columns in application order
    pub fn targets(&self) -> impl Iterator<Item = &str> + '_ {
        self.formulas.keys()
    }

    /// Formula texts in application order
    pub fn expressions(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|f| f.expression.as_str())
    }
}

impl<T: Into<String>, E: Into<String>> FromIterator<(T, E)> for FormulaStore {
    fn from_iter<I: IntoIterator<Item = (T, E)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<T: Into<String>, E: Into<String>> Extend<(T, E)> for FormulaStore {
    fn extend<I: IntoIterator<Item = (T, E)>>(&mut self, iter: I) {
        for (target, expression) in iter {
            self.insert(target, expression);
        }
    }
}

impl<'a> IntoIterator for &'a FormulaStore {
    type Item = &'a Formula;
    type IntoIter = Values<'a, Formula>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serialised as a `target → formula` map in application order
#[cfg(feature = "serde")]
mod serde_impl {
    use super::FormulaStore;
    use colcalc_core::OrderedMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for FormulaStore {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter().map(|f| (&f.target, &f.expression)))
        }
    }

    impl<'de> Deserialize<'de> for FormulaStore {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Ok(OrderedMap::<String>::deserialize(deserializer)?
                .into_iter()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order() {
        let store: FormulaStore = [("c", "@f(x)"), ("a", "@g(c)"), ("b", "1")]
            .into_iter()
            .collect();
        assert_eq!(store.targets().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(store.get("a"), Some("@g(c)"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut store = FormulaStore::new();
        assert_eq!(store.insert("x", "1"), None);
        store.insert("y", "2");
        assert_eq!(store.insert("x", "3"), Some("1".to_string()));

        assert_eq!(store.targets().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(store.expressions().collect::<Vec<_>>(), vec!["3", "2"]);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut store: FormulaStore = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        assert_eq!(store.remove("a"), Some("1".to_string()));
        assert_eq!(store.remove("a"), None);
        assert_eq!(store.get("c"), Some("3"));
        store.insert("b", "20");
        assert_eq!(store.expressions().collect::<Vec<_>>(), vec!["20", "3"]);

        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains("c"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_preserves_document_order() {
        let store: FormulaStore =
            serde_json::from_str(r#"{"z": "@add(a, 1)", "a": "@mul(z, 2)"}"#).unwrap();
        assert_eq!(store.targets().collect::<Vec<_>>(), vec!["z", "a"]);

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"z":"@add(a, 1)","a":"@mul(z, 2)"}"#);
    }
}
