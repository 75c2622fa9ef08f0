use churchmap_core::session::find_feature;
use churchmap_core::{Feature, FeatureId, UniqueValues};

/// The loaded feature collection. Insertion ordered and read-only once built.
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
    unique: UniqueValues,
}

impl FeatureStore {
    /// Builds the store and its suggestion sets from prepared features.
    pub fn from_features(features: Vec<Feature>) -> Self {
        let unique = UniqueValues::build(&features);
        Self { features, unique }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        find_feature(&self.features, id)
    }

    pub fn unique(&self) -> &UniqueValues {
        &self.unique
    }
}
