use foundation::geo::GeoPoint;
use foundation::ids::StoryId;
use serde::Serialize;

/// A geotagged story as delivered by the data layer. Read-only to the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub id: StoryId,
    pub position: GeoPoint,
    /// Primary classification tag. Unknown values are tolerated and render
    /// with the default color.
    pub tag: String,
    pub secondary_tags: Vec<String>,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// ISO-8601 timestamp as issued by the backend.
    pub created_at: String,
}

impl Story {
    pub fn new(id: impl Into<StoryId>, position: GeoPoint, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            tag: tag.into(),
            secondary_tags: Vec::new(),
            title: String::new(),
            description: String::new(),
            image: None,
            created_at: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_secondary_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the primary tag carries a value (the backend uses `-` for none).
    pub fn has_primary_tag(&self) -> bool {
        let t = self.tag.trim();
        !t.is_empty() && t != "-"
    }

    /// Calendar date part of `created_at` (`YYYY-MM-DD`), or the raw value.
    pub fn created_date(&self) -> &str {
        self.created_at
            .split_once('T')
            .map(|(date, _)| date)
            .unwrap_or(&self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::Story;
    use foundation::geo::GeoPoint;

    #[test]
    fn dash_tag_counts_as_missing() {
        let s = Story::new("a", GeoPoint::new(0.0, 0.0), "-");
        assert!(!s.has_primary_tag());
        let s = Story::new("b", GeoPoint::new(0.0, 0.0), "Hopeful");
        assert!(s.has_primary_tag());
    }

    #[test]
    fn created_date_strips_time() {
        let mut s = Story::new("a", GeoPoint::new(0.0, 0.0), "Hopeful");
        s.created_at = "2024-05-01T12:30:00Z".to_string();
        assert_eq!(s.created_date(), "2024-05-01");
        s.created_at = "yesterday".to_string();
        assert_eq!(s.created_date(), "yesterday");
    }
}
