#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTopic {
    Stress,
    Sleep,
    Diet,
    Exercise,
    Mood,
    Relaxation,
    General,
}

impl ChatTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatTopic::Stress => "stress",
            ChatTopic::Sleep => "sleep",
            ChatTopic::Diet => "diet",
            ChatTopic::Exercise => "exercise",
            ChatTopic::Mood => "mood",
            ChatTopic::Relaxation => "relaxation",
            ChatTopic::General => "general",
        }
    }
}

struct ChatRule {
    topic: ChatTopic,
    keywords: &'static [&'static str],
    reply: &'static str,
}

// Checked top-down; the first rule with a keyword hit wins.
const RULES: [ChatRule; 6] = [
    ChatRule {
        topic: ChatTopic::Stress,
        keywords: &["stress", "anxious"],
        reply: "Try deep breathing exercises: Inhale for 4 counts, hold for 4, exhale for 4. Practice mindfulness meditation for 10 minutes daily.",
    },
    ChatRule {
        topic: ChatTopic::Sleep,
        keywords: &["sleep", "insomnia"],
        reply: "Establish a bedtime routine: No screens 1 hour before bed, keep room cool and dark, try chamomile tea or light stretching.",
    },
    ChatRule {
        topic: ChatTopic::Diet,
        keywords: &["diet", "food"],
        reply: "Focus on omega-3 rich foods (salmon, walnuts), leafy greens, and limit caffeine. Stay hydrated and eat regular meals.",
    },
    ChatRule {
        topic: ChatTopic::Exercise,
        keywords: &["exercise", "activity"],
        reply: "Start with 20-30 minutes of walking daily. Yoga, swimming, or dancing can boost mood through endorphin release.",
    },
    ChatRule {
        topic: ChatTopic::Mood,
        keywords: &["sad", "depressed"],
        reply: "Connect with friends/family, engage in activities you enjoy, consider journaling your thoughts, and maintain a routine.",
    },
    ChatRule {
        topic: ChatTopic::Relaxation,
        keywords: &["meditation", "relax"],
        reply: "Try guided meditation apps, progressive muscle relaxation, or simple breathing exercises. Start with 5-10 minutes daily.",
    },
];

const FALLBACK_REPLY: &str = "I'm here to help with mental wellness advice. You can ask me about stress management, sleep, diet, exercise, or relaxation techniques.";

#[derive(Debug, Clone, Copy)]
pub struct BotReply {
    pub topic: ChatTopic,
    pub text: &'static str,
}

pub fn respond(message: &str) -> BotReply {
    let lowered = message.to_lowercase();
    for rule in &RULES {
        if rule.keywords.iter().any(|kw| lowered.contains(kw)) {
            return BotReply {
                topic: rule.topic,
                text: rule.reply,
            };
        }
    }
    BotReply {
        topic: ChatTopic::General,
        text: FALLBACK_REPLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_topic_matches() {
        assert_eq!(respond("I feel so much stress lately").topic, ChatTopic::Stress);
        assert_eq!(respond("my insomnia is back").topic, ChatTopic::Sleep);
        assert_eq!(respond("what food should I eat").topic, ChatTopic::Diet);
        assert_eq!(respond("any exercise tips?").topic, ChatTopic::Exercise);
        assert_eq!(respond("I have been sad all week").topic, ChatTopic::Mood);
        assert_eq!(respond("how do I relax").topic, ChatTopic::Relaxation);
    }

    #[test]
    fn test_fallback_for_unmatched() {
        let reply = respond("tell me a joke");
        assert_eq!(reply.topic, ChatTopic::General);
        assert!(reply.text.starts_with("I'm here to help"));
    }

    #[test]
    fn test_first_match_wins() {
        // "anxious" (stress) appears alongside "sleep"; stress is listed first.
        assert_eq!(respond("anxious about sleep").topic, ChatTopic::Stress);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(respond("STRESS").topic, ChatTopic::Stress);
        assert_eq!(respond("Feeling Depressed").topic, ChatTopic::Mood);
    }
}
