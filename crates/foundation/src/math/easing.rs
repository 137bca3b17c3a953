/// Camera easing curves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)^3`: fast start, gentle landing.
    #[default]
    EaseOutCubic,
}

impl Easing {
    /// Maps normalized progress `t` to eased progress. Input is clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}
