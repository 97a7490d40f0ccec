// src/services/mod.rs

pub mod concealment;
pub mod credentials;
pub mod quizzes;
pub mod results;
pub mod scoring;
pub mod stats;
pub mod users;
