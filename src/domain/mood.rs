/// Numeric weight for a named mood, 1 (worst) to 5 (best). Unrecognized
/// names fall back to the neutral 3.
pub fn mood_to_value(mood: &str) -> i16 {
    match mood {
        "Happy" | "Grateful" => 5,
        "Calm" => 4,
        "Neutral" => 3,
        "Tired" | "Sad" => 2,
        "Anxious" | "Angry" => 1,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_moods() {
        assert_eq!(mood_to_value("Happy"), 5);
        assert_eq!(mood_to_value("Grateful"), 5);
        assert_eq!(mood_to_value("Calm"), 4);
        assert_eq!(mood_to_value("Neutral"), 3);
        assert_eq!(mood_to_value("Tired"), 2);
        assert_eq!(mood_to_value("Sad"), 2);
        assert_eq!(mood_to_value("Anxious"), 1);
        assert_eq!(mood_to_value("Angry"), 1);
    }

    #[test]
    fn test_unknown_mood_defaults_to_neutral() {
        assert_eq!(mood_to_value("Ecstatic"), 3);
        assert_eq!(mood_to_value(""), 3);
        // Lookup is case-sensitive on the canonical names.
        assert_eq!(mood_to_value("happy"), 3);
    }
}
