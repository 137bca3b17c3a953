use std::collections::{HashMap, HashSet};

use foundation::ids::StoryId;
use scene::story::Story;

use crate::symbology::{Color, tag_color};

/// Per-story marker colors, stable across filter changes.
///
/// The color is a pure function of the story's primary tag; the cache only
/// avoids recomputing it. `update` evicts every id that is not in the
/// current visible set, so the cache never outgrows that set.
#[derive(Debug, Default, Clone)]
pub struct MarkerColorCache {
    colors: HashMap<StoryId, Color>,
}

impl MarkerColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, stories: &[Story]) {
        let mut visible: HashSet<&StoryId> = HashSet::with_capacity(stories.len());
        for story in stories {
            visible.insert(&story.id);
            self.colors
                .entry(story.id.clone())
                .or_insert_with(|| tag_color(&story.tag));
        }
        self.colors.retain(|id, _| visible.contains(id));
    }

    /// Cached color, or computed on the spot for an id not seen yet.
    pub fn color_for(&self, story: &Story) -> Color {
        self.colors
            .get(&story.id)
            .copied()
            .unwrap_or_else(|| tag_color(&story.tag))
    }

    pub fn cached(&self, id: &StoryId) -> Option<Color> {
        self.colors.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerColorCache;
    use crate::symbology::tag_color;
    use foundation::geo::GeoPoint;
    use foundation::ids::StoryId;
    use scene::story::Story;

    fn story(id: &str, tag: &str) -> Story {
        Story::new(id, GeoPoint::new(-75.0, 45.0), tag)
    }

    #[test]
    fn color_depends_only_on_tag() {
        let cache = MarkerColorCache::new();
        let a = story("a", "Hopeful");
        let b = story("b", "Hopeful");
        assert_eq!(cache.color_for(&a), cache.color_for(&b));
        assert_eq!(cache.color_for(&a), cache.color_for(&a));
    }

    #[test]
    fn colors_survive_filter_churn() {
        let all = vec![story("a", "Angry"), story("b", "Curious"), story("c", "Mystery")];
        let mut cache = MarkerColorCache::new();
        cache.update(&all);
        let before: Vec<_> = all.iter().map(|s| cache.color_for(s)).collect();

        cache.update(&all[..1]);
        cache.update(&all[1..]);
        cache.update(&all);
        let after: Vec<_> = all.iter().map(|s| cache.color_for(s)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn update_evicts_stale_ids() {
        let mut cache = MarkerColorCache::new();
        cache.update(&[story("a", "Angry"), story("b", "Curious")]);
        assert_eq!(cache.len(), 2);

        let visible = [story("b", "Curious")];
        cache.update(&visible);
        assert!(cache.len() <= visible.len());
        assert_eq!(cache.cached(&StoryId::new("a")), None);
        assert_eq!(cache.cached(&StoryId::new("b")), Some(tag_color("Curious")));

        cache.update(&[]);
        assert!(cache.is_empty());
    }
}
