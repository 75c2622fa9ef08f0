//! Batch preparation run off the async executor.

use churchmap_core::{Feature, FeatureId};

/// Assigns sequential ids in load order and derives `City` from `Address`
/// where missing. Any id carried by the data is replaced.
pub fn prepare_batch(mut features: Vec<Feature>) -> Vec<Feature> {
    for (i, f) in features.iter_mut().enumerate() {
        f.properties.id = Some(FeatureId(i as u64));
        f.properties.derive_city();
    }
    features
}

/// Runs [`prepare_batch`] on the blocking pool.
pub async fn prepare_batch_blocking(features: Vec<Feature>) -> Vec<Feature> {
    match tokio::task::spawn_blocking(move || prepare_batch(features)).await {
        Ok(out) => out,
        Err(e) => {
            tracing::error!(error = %e, "batch preparation task failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use churchmap_core::Properties;

    #[test]
    fn ids_follow_position_and_replace_existing() {
        let mut a = Feature::new(0.0, 0.0, Properties::default());
        a.properties.id = Some(FeatureId(77));
        let b = Feature::new(
            0.0,
            0.0,
            Properties {
                address: Some("123 Main St, Springfield, IL, USA".into()),
                ..Default::default()
            },
        );
        let out = prepare_batch(vec![a, b]);
        assert_eq!(out[0].id(), Some(FeatureId(0)));
        assert_eq!(out[1].id(), Some(FeatureId(1)));
        assert_eq!(out[1].properties.city.as_deref(), Some("IL"));
        assert_eq!(out[0].properties.city, None);
    }

    #[tokio::test]
    async fn blocking_variant_matches() {
        let input: Vec<Feature> = (0..3)
            .map(|_| Feature::new(1.0, 2.0, Properties::default()))
            .collect();
        let out = prepare_batch_blocking(input.clone()).await;
        assert_eq!(out, prepare_batch(input));
    }
}
