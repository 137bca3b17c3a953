/// Why a position request failed. Codes 1–3 follow the W3C
/// `GeolocationPositionError` constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// The browser has no geolocation API.
    Unsupported,
    Unknown(String),
}

impl GeolocationError {
    /// Maps `GeolocationPositionError.code`; hosts pass 0 when the API is missing.
    pub fn from_code(code: u16, message: &str) -> Self {
        match code {
            0 => GeolocationError::Unsupported,
            1 => GeolocationError::PermissionDenied,
            2 => GeolocationError::PositionUnavailable,
            3 => GeolocationError::Timeout,
            _ => GeolocationError::Unknown(message.to_string()),
        }
    }

    /// Toast text shown when "locate me" fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::PermissionDenied => {
                "Location access denied. Please enable location permissions in your browser settings and refresh the page."
            }
            GeolocationError::PositionUnavailable => {
                "Location unavailable. Please check your GPS/location services."
            }
            GeolocationError::Timeout => "Location request timed out. Please try again.",
            GeolocationError::Unsupported => "Geolocation is not supported by this browser.",
            GeolocationError::Unknown(_) => {
                "Unable to access location. Please enable location permissions."
            }
        }
    }
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "permission denied"),
            GeolocationError::PositionUnavailable => write!(f, "position unavailable"),
            GeolocationError::Timeout => write!(f, "timeout"),
            GeolocationError::Unsupported => write!(f, "geolocation unsupported"),
            GeolocationError::Unknown(msg) => {
                // Messages come from the browser; keep log lines single-line.
                let clean: String = msg
                    .chars()
                    .map(|c| if c.is_control() { ' ' } else { c })
                    .collect();
                write!(f, "geolocation error: {clean}")
            }
        }
    }
}

impl std::error::Error for GeolocationError {}

#[cfg(test)]
mod tests {
    use super::GeolocationError;

    #[test]
    fn codes_map_to_categories() {
        assert_eq!(GeolocationError::from_code(1, ""), GeolocationError::PermissionDenied);
        assert_eq!(GeolocationError::from_code(2, ""), GeolocationError::PositionUnavailable);
        assert_eq!(GeolocationError::from_code(3, ""), GeolocationError::Timeout);
        assert_eq!(GeolocationError::from_code(0, ""), GeolocationError::Unsupported);
        assert_eq!(
            GeolocationError::from_code(9, "odd"),
            GeolocationError::Unknown("odd".to_string())
        );
    }

    #[test]
    fn every_category_has_a_distinct_message() {
        let all = [
            GeolocationError::PermissionDenied,
            GeolocationError::PositionUnavailable,
            GeolocationError::Timeout,
            GeolocationError::Unsupported,
            GeolocationError::Unknown(String::new()),
        ];
        let mut messages: Vec<_> = all.iter().map(GeolocationError::user_message).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), all.len());
    }

    #[test]
    fn display_strips_control_characters() {
        let e = GeolocationError::Unknown("bad\r\nthing".to_string());
        assert_eq!(e.to_string(), "geolocation error: bad  thing");
    }
}
