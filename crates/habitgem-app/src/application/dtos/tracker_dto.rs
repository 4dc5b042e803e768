use serde::{Deserialize, Serialize};

use habitgem_domain::achievement::find_badge;
use habitgem_domain::tracker::TrackerState;
use habitgem_domain::HabitId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitColumnDto {
    pub id: String,
    pub name: String,
}

/// A category band with its habits, in habit creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroupDto {
    pub id: String,
    pub name: String,
    pub color_tag: String,
    pub habits: Vec<HabitColumnDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRowDto {
    pub index: usize,
    pub id: i64,
    pub label: String,
    /// Parallel to the flattened habit columns of the grid.
    pub done: Vec<bool>,
    pub reflection: String,
    pub is_diamond: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerGridDto {
    pub groups: Vec<CategoryGroupDto>,
    pub rows: Vec<DayRowDto>,
    pub total_diamonds: u32,
    pub unlocked_badges: Vec<BadgeDto>,
}

impl TrackerGridDto {
    /// Groups habits under their categories.
    ///
    /// Categories without habits are omitted, as are habits whose category
    /// no longer exists.
    pub fn from_state(state: &TrackerState) -> Self {
        let groups: Vec<CategoryGroupDto> = state
            .categories()
            .iter()
            .filter_map(|category| {
                let habits: Vec<HabitColumnDto> = state
                    .habits()
                    .iter()
                    .filter(|h| h.category_id == category.id)
                    .map(|h| HabitColumnDto {
                        id: h.id.to_string(),
                        name: h.name.clone(),
                    })
                    .collect();

                (!habits.is_empty()).then(|| CategoryGroupDto {
                    id: category.id.to_string(),
                    name: category.name.clone(),
                    color_tag: category.color_tag.clone(),
                    habits,
                })
            })
            .collect();

        let rows = state
            .days()
            .iter()
            .enumerate()
            .map(|(index, day)| DayRowDto {
                index,
                id: day.id.as_millis(),
                label: day.label.clone(),
                done: groups
                    .iter()
                    .flat_map(|g| g.habits.iter())
                    .map(|h| day.is_completed(&HabitId::from_string(&h.id)))
                    .collect(),
                reflection: day.reflection.clone(),
                is_diamond: state.is_diamond_day(index),
            })
            .collect();

        let unlocked_badges = state
            .unlocked_badges()
            .iter()
            .filter_map(find_badge)
            .map(|b| BadgeDto {
                id: b.id.to_string(),
                title: b.title.to_string(),
                description: b.description.to_string(),
                icon: b.icon.to_string(),
                color: b.color.to_string(),
            })
            .collect();

        Self {
            groups,
            rows,
            total_diamonds: state.total_diamonds(),
            unlocked_badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitgem_domain::CategoryId;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_grid_groups_habits_and_skips_empty_categories() {
        let mut state = TrackerState::new();
        let quran = CategoryId::from_string("c_quran");
        let pray = CategoryId::from_string("c_pray");
        let h1 = state.add_habit_at("Recite", &quran, T0).unwrap();
        let h2 = state.add_habit_at("Fajr", &pray, T0).unwrap();
        state.add_day_at(T0);
        state.toggle_completion(0, &h1);
        state.toggle_completion(0, &h2);
        state.refresh_diamonds();

        let grid = TrackerGridDto::from_state(&state);

        let ids: Vec<&str> = grid.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["c_pray", "c_quran"]);
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0].done, vec![true, true]);
        assert!(grid.rows[0].is_diamond);
        assert_eq!(grid.total_diamonds, 1);
    }

    #[test]
    fn test_grid_hides_habits_with_dangling_category() {
        let mut state = TrackerState::new();
        state
            .add_habit_at("Walk", &CategoryId::from_string("c_gone"), T0)
            .unwrap();
        state.add_day_at(T0);

        let grid = TrackerGridDto::from_state(&state);

        assert!(grid.groups.is_empty());
        assert!(grid.rows[0].done.is_empty());
        assert!(!grid.rows[0].is_diamond);
    }
}
