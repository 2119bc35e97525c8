use serde::Deserialize;

/// Request body for creating a habit, also used by updates, which replace
/// title and description wholesale.
#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_defaults_to_none() {
        let req: HabitRequest = serde_json::from_str(r#"{"title":"Run"}"#).unwrap();
        assert_eq!(req.title, "Run");
        assert!(req.description.is_none());
    }
}
