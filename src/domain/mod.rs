pub mod achievements;
pub mod chatbot;
pub mod models;
pub mod mood;
pub mod scoring;
pub mod stats;
