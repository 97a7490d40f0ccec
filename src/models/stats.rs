// src/models/stats.rs

use serde::Serialize;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub users: UserCounts,
    pub quizzes: RecentCount,
    pub results: RecentCount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub students: i64,
    pub teachers: i64,
    pub admins: i64,
    pub recent: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecentCount {
    pub total: i64,
    pub recent: i64,
}

/// Counters over the quizzes one author owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStats {
    pub total_quizzes: i64,
    pub total_attempts: i64,
    pub recent_quizzes: i64,
    pub recent_attempts: i64,
    /// Mean of per-attempt percentages, rounded.
    pub average_score: i64,
}
