//! Required envelope attributes.

use std::collections::HashMap;

/// Attributes every cluster notification must carry, in check order.
pub const REQUIRED_ATTRIBUTES: [&str; 5] = [
    "project_id",
    "cluster_location",
    "cluster_name",
    "type_url",
    "payload",
];

/// The required attributes, lifted out of the envelope's map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAttributes {
    pub project_id: String,
    pub cluster_location: String,
    pub cluster_name: String,
    pub type_url: String,
    pub payload: String,
}

impl ClusterAttributes {
    /// Take the required attributes out of `attributes`.
    ///
    /// Fails with the first key of [`REQUIRED_ATTRIBUTES`] that is absent.
    /// Nothing is removed unless all of them are present. An empty value
    /// counts as present.
    pub fn extract(attributes: &mut HashMap<String, String>) -> Result<Self, &'static str> {
        if let Some(missing) = REQUIRED_ATTRIBUTES
            .into_iter()
            .find(|key| !attributes.contains_key(*key))
        {
            return Err(missing);
        }

        let mut take = |key: &str| attributes.remove(key).unwrap_or_default();
        Ok(Self {
            project_id: take("project_id"),
            cluster_location: take("cluster_location"),
            cluster_name: take("cluster_name"),
            type_url: take("type_url"),
            payload: take("payload"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> HashMap<String, String> {
        REQUIRED_ATTRIBUTES
            .iter()
            .map(|key| (key.to_string(), format!("{key}-value")))
            .collect()
    }

    #[test]
    fn extracts_all_required() {
        let mut attributes = complete();
        attributes.insert("extra".into(), "kept".into());

        let extracted = ClusterAttributes::extract(&mut attributes).unwrap();
        assert_eq!(extracted.project_id, "project_id-value");
        assert_eq!(extracted.cluster_location, "cluster_location-value");
        assert_eq!(extracted.cluster_name, "cluster_name-value");
        assert_eq!(extracted.type_url, "type_url-value");
        assert_eq!(extracted.payload, "payload-value");
        assert_eq!(attributes.len(), 1);
    }

    #[test]
    fn each_missing_key_is_reported() {
        for key in REQUIRED_ATTRIBUTES {
            let mut attributes = complete();
            attributes.remove(key);
            assert_eq!(ClusterAttributes::extract(&mut attributes), Err(key));
            assert_eq!(attributes.len(), REQUIRED_ATTRIBUTES.len() - 1);
        }
    }

    #[test]
    fn first_missing_in_declared_order_wins() {
        let mut attributes = complete();
        attributes.remove("payload");
        attributes.remove("cluster_name");
        attributes.remove("type_url");

        assert_eq!(
            ClusterAttributes::extract(&mut attributes),
            Err("cluster_name")
        );
    }

    #[test]
    fn empty_value_counts_as_present() {
        let mut attributes = complete();
        attributes.insert("cluster_name".into(), String::new());

        let extracted = ClusterAttributes::extract(&mut attributes).unwrap();
        assert_eq!(extracted.cluster_name, "");
    }
}
