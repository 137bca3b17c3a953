use foundation::geo::GeoPoint;
use scene::story::Story;
use serde::Deserialize;

/// Story as served by the posts API. Both snake_case and camelCase keys are
/// seen in the wild, depending on whether the client transformed them.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: StoryContent,
    pub location: StoryLocation,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, alias = "optionalTags")]
    pub optional_tags: Vec<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryContent {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryLocation {
    /// `[lon, lat]`.
    pub coordinates: [f64; 2],
}

#[derive(Debug)]
pub enum StoryFeedError {
    Json(serde_json::Error),
    InvalidPosition { id: String },
}

impl std::fmt::Display for StoryFeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryFeedError::Json(e) => write!(f, "invalid story feed: {e}"),
            StoryFeedError::InvalidPosition { id } => {
                write!(f, "story {id} has a non-finite position")
            }
        }
    }
}

impl std::error::Error for StoryFeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoryFeedError::Json(e) => Some(e),
            StoryFeedError::InvalidPosition { .. } => None,
        }
    }
}

impl TryFrom<StoryRecord> for Story {
    type Error = StoryFeedError;

    fn try_from(rec: StoryRecord) -> Result<Self, Self::Error> {
        let position = GeoPoint::from(rec.location.coordinates);
        if !position.is_finite() {
            return Err(StoryFeedError::InvalidPosition { id: rec.id });
        }
        let mut story = Story::new(rec.id, position, rec.tag.unwrap_or_default())
            .with_title(rec.title)
            .with_secondary_tags(rec.optional_tags);
        story.description = rec.content.description;
        story.image = rec.content.image.filter(|s| !s.is_empty());
        story.created_at = rec.created_at;
        Ok(story)
    }
}

pub fn parse_story_feed(payload: &str) -> Result<Vec<Story>, StoryFeedError> {
    let records: Vec<StoryRecord> = serde_json::from_str(payload).map_err(StoryFeedError::Json)?;
    records.into_iter().map(Story::try_from).collect()
}
