mod aggregate;
pub mod diamonds;
mod value_objects;


pub use aggregate::TrackerState;
pub use diamonds::{calculate_diamonds, is_diamond_day, longest_diamond_streak};
pub use value_objects::{
    default_categories, Category, Day, Habit, UnlockedBadges, CUSTOM_CATEGORY_COLOR,
};
