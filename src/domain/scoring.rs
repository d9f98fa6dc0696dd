use serde::Serialize;

/// Assessment band for a 0..=30 questionnaire score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellnessLevel {
    Severe,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl WellnessLevel {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s <= 4 => WellnessLevel::Severe,
            s if s <= 9 => WellnessLevel::Poor,
            s if s <= 14 => WellnessLevel::Fair,
            s if s <= 19 => WellnessLevel::Good,
            _ => WellnessLevel::Excellent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WellnessLevel::Severe => "Severe - Seek Help",
            WellnessLevel::Poor => "Poor",
            WellnessLevel::Fair => "Fair",
            WellnessLevel::Good => "Good",
            WellnessLevel::Excellent => "Excellent",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            WellnessLevel::Severe => {
                "Please seek immediate professional mental health support. You deserve care and help is available."
            }
            WellnessLevel::Poor => {
                "Your mental health needs attention. Consider speaking with a counselor or therapist."
            }
            WellnessLevel::Fair => {
                "Consider adding stress management techniques, regular exercise, and mindfulness practices."
            }
            WellnessLevel::Good => {
                "Good mental health! Continue your current wellness practices and stay active."
            }
            WellnessLevel::Excellent => {
                "Excellent! Your mental health is in great shape. Keep maintaining your positive lifestyle!"
            }
        }
    }

    pub fn is_crisis(&self) -> bool {
        matches!(self, WellnessLevel::Severe)
    }
}

/// Shown alongside any result in the lowest band.
pub const CRISIS_RESOURCES: [&str; 2] = [
    "National Suicide Prevention Lifeline: 988",
    "Crisis Text Line: Text HOME to 741741",
];

/// Recommendation used when a user has no assessments yet.
pub const DEFAULT_RECOMMENDATION: &str = "Continue your wellness journey!";

/// Flat sum of the ordered answers; a short sequence scores its missing
/// answers as zero.
pub fn score_responses(responses: &[i32]) -> i32 {
    responses.iter().sum()
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub id: i32,
    pub question: &'static str,
    pub options: [&'static str; 4],
}

const FREQUENCY_OPTIONS: [&str; 4] = [
    "Not at all",
    "Several days",
    "More than half the days",
    "Nearly every day",
];

pub const QUESTIONS: [QuizQuestion; 10] = [
    QuizQuestion {
        id: 1,
        question: "How often have you felt down, depressed, or hopeless?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 2,
        question: "How often have you had little interest or pleasure in doing things?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 3,
        question: "How often have you felt nervous, anxious, or on edge?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 4,
        question: "How often have you been bothered by trouble falling or staying asleep?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 5,
        question: "How often have you felt tired or had little energy?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 6,
        question: "How often have you had poor appetite or overeating?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 7,
        question: "How often have you felt bad about yourself or that you are a failure?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 8,
        question: "How often have you had trouble concentrating on things?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 9,
        question: "How often have you been moving or speaking slowly or restlessly?",
        options: FREQUENCY_OPTIONS,
    },
    QuizQuestion {
        id: 10,
        question: "How satisfied are you with your social relationships?",
        options: [
            "Very satisfied",
            "Somewhat satisfied",
            "Somewhat dissatisfied",
            "Very dissatisfied",
        ],
    },
];
