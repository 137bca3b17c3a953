use foundation::geo::GeoPoint;
use scene::boundary::{BoundaryState, CountryBoundary};
use scene::containment::contains;

/// Coordinates are rounded to this many decimals (about 1 m) before use.
pub const CLICK_DECIMALS: u32 = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClickRejection {
    OutsideCountry,
    /// The boundary is still loading.
    BoundaryUnavailable,
    /// The boundary could not be loaded; retrying will not help.
    BoundaryFailed,
}

impl ClickRejection {
    pub fn message(self, country: &str) -> String {
        match self {
            ClickRejection::OutsideCountry => format!("You can only click within {country}!"),
            ClickRejection::BoundaryUnavailable => {
                format!("The {country} boundary is still loading. Please try again.")
            }
            ClickRejection::BoundaryFailed => {
                format!("The {country} boundary could not be loaded. Please reload the page.")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClickOutcome {
    Accepted(GeoPoint),
    Rejected(ClickRejection),
}

/// User-facing notifications (toasts).
pub trait Notifier {
    fn notify(&mut self, message: &str, is_error: bool);
}

/// Decides whether a map click may start a new story.
#[derive(Debug, Clone)]
pub struct CountryClickRouter {
    country_name: String,
}

impl CountryClickRouter {
    pub fn new(country_name: impl Into<String>) -> Self {
        Self {
            country_name: country_name.into(),
        }
    }

    pub fn country_name(&self) -> &str {
        &self.country_name
    }

    pub fn handle_map_click(
        &self,
        click: GeoPoint,
        boundary: Option<&CountryBoundary>,
    ) -> ClickOutcome {
        let Some(boundary) = boundary else {
            return ClickOutcome::Rejected(ClickRejection::BoundaryUnavailable);
        };
        let point = click.rounded(CLICK_DECIMALS);
        if contains(point, Some(boundary)) {
            ClickOutcome::Accepted(point)
        } else {
            ClickOutcome::Rejected(ClickRejection::OutsideCountry)
        }
    }

    /// Like [`CountryClickRouter::handle_map_click`], but tells a failed
    /// boundary load apart from one still in flight.
    pub fn handle_click(&self, click: GeoPoint, boundary: &BoundaryState) -> ClickOutcome {
        match boundary {
            BoundaryState::Failed(_) => ClickOutcome::Rejected(ClickRejection::BoundaryFailed),
            BoundaryState::Loading | BoundaryState::Ready(_) => {
                self.handle_map_click(click, boundary.boundary())
            }
        }
    }

    pub fn rejection_message(&self, rejection: ClickRejection) -> String {
        rejection.message(&self.country_name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{ClickOutcome, ClickRejection, CountryClickRouter};
    use foundation::geo::GeoPoint;
    use scene::boundary::{BoundaryState, CountryBoundary, Polygon};

    /// Coarse outline of southern Canada, enough for city-level checks.
    pub(crate) fn canada_like() -> CountryBoundary {
        let ring = vec![
            GeoPoint::new(-141.0, 60.0),
            GeoPoint::new(-123.3, 49.0),
            GeoPoint::new(-95.15, 49.0),
            GeoPoint::new(-82.5, 41.68),
            GeoPoint::new(-67.0, 44.8),
            GeoPoint::new(-52.6, 47.5),
            GeoPoint::new(-60.0, 60.0),
            GeoPoint::new(-80.0, 83.1),
            GeoPoint::new(-141.0, 69.6),
            GeoPoint::new(-141.0, 60.0),
        ];
        let poly = Polygon::new(ring, Vec::new()).expect("polygon");
        CountryBoundary::new(vec![poly]).expect("boundary")
    }

    #[test]
    fn toronto_is_accepted_and_rounded() {
        let router = CountryClickRouter::new("Canada");
        let b = canada_like();
        let out = router.handle_map_click(GeoPoint::new(-79.383_456_7, 43.653_221_9), Some(&b));
        assert_eq!(out, ClickOutcome::Accepted(GeoPoint::new(-79.38346, 43.65322)));

        let out = router.handle_map_click(GeoPoint::new(-79.38, 43.65), Some(&b));
        assert_eq!(out, ClickOutcome::Accepted(GeoPoint::new(-79.38, 43.65)));
    }

    #[test]
    fn null_island_is_rejected_with_message() {
        let router = CountryClickRouter::new("Canada");
        let b = canada_like();
        let out = router.handle_map_click(GeoPoint::new(0.0, 0.0), Some(&b));
        assert_eq!(out, ClickOutcome::Rejected(ClickRejection::OutsideCountry));
        assert_eq!(
            router.rejection_message(ClickRejection::OutsideCountry),
            "You can only click within Canada!"
        );
    }

    #[test]
    fn missing_boundary_rejects_every_click() {
        let router = CountryClickRouter::new("Canada");
        let out = router.handle_map_click(GeoPoint::new(-79.38, 43.65), None);
        assert_eq!(out, ClickOutcome::Rejected(ClickRejection::BoundaryUnavailable));
        assert!(router
            .rejection_message(ClickRejection::BoundaryUnavailable)
            .contains("still loading"));
    }

    #[test]
    fn failed_boundary_load_is_not_reported_as_loading() {
        let router = CountryClickRouter::new("Canada");
        let toronto = GeoPoint::new(-79.38, 43.65);

        let failed = BoundaryState::Failed("404".to_string());
        assert_eq!(
            router.handle_click(toronto, &failed),
            ClickOutcome::Rejected(ClickRejection::BoundaryFailed)
        );
        let message = router.rejection_message(ClickRejection::BoundaryFailed);
        assert!(message.contains("could not be loaded"));
        assert!(!message.contains("try again"));

        assert_eq!(
            router.handle_click(toronto, &BoundaryState::Loading),
            ClickOutcome::Rejected(ClickRejection::BoundaryUnavailable)
        );
        let ready = BoundaryState::Ready(canada_like());
        assert_eq!(router.handle_click(toronto, &ready), ClickOutcome::Accepted(toronto));
    }
}
