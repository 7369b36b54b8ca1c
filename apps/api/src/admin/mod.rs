// Admin surface: job requisitions, the candidate overview with leaderboard
// charts, and side-by-side comparison.

pub mod handlers;
pub mod jobs;
