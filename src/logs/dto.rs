use serde::Deserialize;
use time::Date;

/// Request body for tracking a habit. The date falls back to the current UTC
/// date when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub date: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_date() {
        let req: TrackRequest = serde_json::from_str(r#"{"date":"2024-01-01"}"#).unwrap();
        assert_eq!(req.date, Some(date!(2024 - 01 - 01)));
    }

    #[test]
    fn date_defaults_to_none() {
        let req: TrackRequest = serde_json::from_str("{}").unwrap();
        assert!(req.date.is_none());
    }
}
