mod leaderboard_dto;
mod tracker_dto;

pub use leaderboard_dto::{LeaderboardEntryDto, ANONYMOUS_DISPLAY_NAME};
pub use tracker_dto::{BadgeDto, CategoryGroupDto, DayRowDto, HabitColumnDto, TrackerGridDto};
