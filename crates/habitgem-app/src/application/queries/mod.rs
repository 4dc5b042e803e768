mod leaderboard_queries;

pub use leaderboard_queries::LeaderboardQueryService;
