use layers::labels::{TagBadge, visible_secondary_tags};
use scene::story::Story;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupSize {
    pub width: f64,
    pub height: f64,
}

impl PopupSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PopupSize {
    fn default() -> Self {
        Self::new(350.0, 400.0)
    }
}

/// Allowed popup dimensions, in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeBounds {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            min_width: 280.0,
            max_width: 820.0,
            min_height: 240.0,
            max_height: 700.0,
        }
    }
}

impl SizeBounds {
    pub fn clamp(&self, size: PopupSize) -> PopupSize {
        PopupSize::new(
            size.width.max(self.min_width).min(self.max_width),
            size.height.max(self.min_height).min(self.max_height),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.min_width > 0.0
            && self.min_height > 0.0
            && self.min_width <= self.max_width
            && self.min_height <= self.max_height
    }
}

/// The open popup: which story it shows and at what size.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSession {
    story: Story,
    size: PopupSize,
}

impl PopupSession {
    pub fn open(story: Story, size: PopupSize, bounds: &SizeBounds) -> Self {
        Self {
            story,
            size: bounds.clamp(size),
        }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn size(&self) -> PopupSize {
        self.size
    }

    pub fn set_size(&mut self, size: PopupSize, bounds: &SizeBounds) {
        self.size = bounds.clamp(size);
    }

    pub fn card(&self) -> PopupCard {
        PopupCard::new(&self.story, self.size)
    }
}

/// Read-only view model of the popup content.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupCard {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub badge: Option<TagBadge>,
    pub secondary_tags: Vec<String>,
    pub date: String,
    pub size: PopupSize,
}

impl PopupCard {
    pub fn new(story: &Story, size: PopupSize) -> Self {
        Self {
            title: story.title.clone(),
            description: story.description.clone(),
            image: story.image.clone(),
            badge: TagBadge::for_story(story),
            secondary_tags: visible_secondary_tags(story)
                .into_iter()
                .map(str::to_string)
                .collect(),
            date: story.created_date().to_string(),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PopupCard, PopupSession, PopupSize, SizeBounds};
    use foundation::geo::GeoPoint;
    use pretty_assertions::assert_eq;
    use scene::story::Story;

    #[test]
    fn clamps_to_bounds() {
        let b = SizeBounds::default();
        assert_eq!(b.clamp(PopupSize::new(50.0, 50.0)), PopupSize::new(280.0, 240.0));
        assert_eq!(b.clamp(PopupSize::new(5000.0, 5000.0)), PopupSize::new(820.0, 700.0));
        assert_eq!(b.clamp(PopupSize::new(400.0, 300.0)), PopupSize::new(400.0, 300.0));
    }

    #[test]
    fn session_clamps_on_open_and_resize() {
        let b = SizeBounds::default();
        let story = Story::new("a", GeoPoint::new(-79.38, 43.65), "Hopeful");
        let mut s = PopupSession::open(story, PopupSize::new(100.0, 900.0), &b);
        assert_eq!(s.size(), PopupSize::new(280.0, 700.0));
        s.set_size(PopupSize::new(600.0, 500.0), &b);
        assert_eq!(s.size(), PopupSize::new(600.0, 500.0));
    }

    #[test]
    fn card_reflects_story() {
        let mut story = Story::new("a", GeoPoint::new(-79.38, 43.65), "Hopeful")
            .with_title("Community garden")
            .with_secondary_tags(["Food & water", "Something that gives me hope"]);
        story.description = "We planted 40 trees.".to_string();
        story.created_at = "2024-06-02T08:00:00Z".to_string();

        let card = PopupCard::new(&story, PopupSize::default());
        assert_eq!(card.title, "Community garden");
        assert_eq!(card.secondary_tags, vec!["Food & water".to_string()]);
        assert_eq!(card.date, "2024-06-02");
        assert_eq!(card.badge.map(|b| b.label), Some("Hopeful".to_string()));
    }
}
