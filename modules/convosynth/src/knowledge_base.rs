use std::path::Path;

use convosynth_common::{ConvoSynthError, Place};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Top-level key describing the station itself rather than a category.
pub const REFERENCE_LOCATION_KEY: &str = "reference_location";

/// Category name → places, in document order. Loaded once, read-only after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    categories: Vec<(String, Vec<Place>)>,
}

impl KnowledgeBase {
    pub fn load(path: &Path) -> Result<Self, ConvoSynthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConvoSynthError::KnowledgeBase(format!("failed to read {}: {e}", path.display()))
        })?;
        let kb = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            categories = kb.categories.len(),
            places = kb.place_count(),
            "Loaded knowledge base"
        );
        Ok(kb)
    }

    /// Parse a JSON object of `category -> [place, ...]`. The reference
    /// location key and any non-array values are skipped.
    pub fn from_json_str(json: &str) -> Result<Self, ConvoSynthError> {
        let root: Map<String, Value> = serde_json::from_str(json)
            .map_err(|e| ConvoSynthError::KnowledgeBase(format!("invalid JSON: {e}")))?;

        let mut categories = Vec::with_capacity(root.len());
        for (key, value) in root {
            if key == REFERENCE_LOCATION_KEY {
                continue;
            }
            let Value::Array(items) = value else {
                debug!(key = %key, "Skipping non-array knowledge base entry");
                continue;
            };
            let places = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    serde_json::from_value::<Place>(item).map_err(|e| {
                        ConvoSynthError::KnowledgeBase(format!("{key}[{i}]: {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            categories.push((key, places));
        }

        Ok(Self { categories })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Place])> {
        self.categories
            .iter()
            .map(|(name, places)| (name.as_str(), places.as_slice()))
    }

    pub fn places(&self, category: &str) -> Option<&[Place]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, places)| places.as_slice())
    }

    /// Every place across all categories, in document order.
    pub fn all_places(&self) -> Vec<&Place> {
        self.categories
            .iter()
            .flat_map(|(_, places)| places.iter())
            .collect()
    }

    pub fn place_count(&self) -> usize {
        self.categories.iter().map(|(_, places)| places.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.place_count() == 0
    }

    /// Coordinates by place name; the first entry wins when a name repeats.
    pub fn coordinates(&self, name: &str) -> Option<(f64, f64)> {
        self.categories
            .iter()
            .flat_map(|(_, places)| places.iter())
            .filter(|p| p.name.as_deref() == Some(name))
            .find_map(Place::coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "reference_location": {"name": "Al Jafiliya Bus Station 1", "latitude": 25.23, "longitude": 55.29},
        "restaurants_cafes": [
            {"name": "Ravi Restaurant", "distance_m": 420, "cuisine": "Pakistani", "rating": 4.2},
            {"name": "Karak House", "distance_m": 610}
        ],
        "mosques": [{"name": "Al Jafiliya Mosque", "distance_m": 150, "latitude": 25.231, "longitude": 55.288}],
        "notes": "ignored",
        "hotels": []
    }"#;

    #[test]
    fn parses_categories_in_document_order() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        let names: Vec<_> = kb.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["restaurants_cafes", "mosques", "hotels"]);
        assert_eq!(kb.place_count(), 3);
        assert_eq!(kb.places("mosques").unwrap()[0].name.as_deref(), Some("Al Jafiliya Mosque"));
        assert!(kb.places("reference_location").is_none());
    }

    #[test]
    fn all_places_flattens() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        let names: Vec<_> = kb.all_places().iter().filter_map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Ravi Restaurant", "Karak House", "Al Jafiliya Mosque"]);
    }

    #[test]
    fn coordinates_lookup() {
        let kb = KnowledgeBase::from_json_str(SAMPLE).unwrap();
        assert_eq!(kb.coordinates("Al Jafiliya Mosque"), Some((25.231, 55.288)));
        assert_eq!(kb.coordinates("Karak House"), None);
    }

    #[test]
    fn off_shape_place_values_do_not_fail_the_load() {
        let kb = KnowledgeBase::from_json_str(
            r#"{
                "malls": [{"name": "BurJuman", "latitude": "25.2544", "longitude": 55.3031}],
                "restaurants": [{"name": "Ravi", "cuisine": ["pakistani", "indian"]}]
            }"#,
        )
        .unwrap();

        assert_eq!(kb.place_count(), 2);
        assert_eq!(kb.coordinates("BurJuman"), None);
        let ravi = &kb.places("restaurants").unwrap()[0];
        assert_eq!(ravi.cuisine, Some(serde_json::json!(["pakistani", "indian"])));
    }

    #[test]
    fn empty_document_is_empty() {
        let kb = KnowledgeBase::from_json_str("{}").unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn malformed_json_is_a_knowledge_base_error() {
        let err = KnowledgeBase::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, ConvoSynthError::KnowledgeBase(_)));
    }

    #[test]
    fn non_object_place_is_rejected() {
        let err = KnowledgeBase::from_json_str(r#"{"malls": ["BurJuman"]}"#).unwrap_err();
        assert!(err.to_string().contains("malls[0]"));
    }

    #[test]
    fn missing_file_is_a_knowledge_base_error() {
        let err = KnowledgeBase::load(Path::new("/nonexistent/knowledge_base.json")).unwrap_err();
        assert!(matches!(err, ConvoSynthError::KnowledgeBase(_)));
    }
}
