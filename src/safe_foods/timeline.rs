use std::collections::BTreeMap;

use time::{OffsetDateTime, UtcOffset};

use super::model::{SafeFood, SafeFoodStatus};

/// Month key (`YYYY-MM`, UTC) to foods first accepted in that month.
/// Keys and bucket contents are both in ascending chronological order.
pub type Timeline = BTreeMap<String, Vec<SafeFood>>;

pub fn month_key(at: OffsetDateTime) -> String {
    let utc = at.to_offset(UtcOffset::UTC);
    format!("{:04}-{:02}", utc.year(), u8::from(utc.month()))
}

/// Buckets established foods by the month they were accepted. Candidates and
/// rows without an acceptance date are skipped.
pub fn build_timeline(foods: &[SafeFood]) -> Timeline {
    let mut accepted: Vec<(OffsetDateTime, &SafeFood)> = foods
        .iter()
        .filter(|f| f.status == SafeFoodStatus::Established)
        .filter_map(|f| f.date_first_accepted.map(|at| (at, f)))
        .collect();
    // stable: equal timestamps keep input order
    accepted.sort_by_key(|(at, _)| *at);

    let mut timeline = Timeline::new();
    for (at, food) in accepted {
        timeline
            .entry(month_key(at))
            .or_default()
            .push(food.clone());
    }
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_foods::lifecycle::{create, promote_at, EntryPath, SafeFoodDraft};
    use time::macros::datetime;
    use uuid::Uuid;

    fn established(name: &str, at: OffsetDateTime) -> SafeFood {
        let draft = SafeFoodDraft {
            food_name: name.into(),
            ..Default::default()
        };
        let food = create(Uuid::new_v4(), draft, EntryPath::Candidate, at).unwrap();
        promote_at(&food, at)
    }

    #[test]
    fn groups_by_month_in_chronological_order() {
        let foods = vec![
            established("crackers", datetime!(2024-03-02 09:00 UTC)),
            established("toast", datetime!(2024-01-20 12:00 UTC)),
            established("rice", datetime!(2024-01-15 18:30 UTC)),
        ];
        let timeline = build_timeline(&foods);

        let keys: Vec<&str> = timeline.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01", "2024-03"]);

        let january: Vec<&str> = timeline["2024-01"].iter().map(|f| f.food_name.as_str()).collect();
        assert_eq!(january, vec!["rice", "toast"]);
        assert_eq!(timeline["2024-03"].len(), 1);
        assert_eq!(timeline["2024-03"][0].food_name, "crackers");
    }

    #[test]
    fn every_established_food_lands_in_exactly_one_bucket() {
        let foods: Vec<SafeFood> = (1..=28)
            .map(|day| {
                let at = datetime!(2023-11-01 00:00 UTC) + time::Duration::days(day * 3);
                established(&format!("food {day}"), at)
            })
            .collect();
        let timeline = build_timeline(&foods);
        let total: usize = timeline.values().map(Vec::len).sum();
        assert_eq!(total, foods.len());
        for food in &foods {
            let hits = timeline
                .values()
                .flatten()
                .filter(|f| f.id == food.id)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn months_are_keyed_in_utc() {
        // 23:30 at UTC-05:00 on Jan 31 is already February in UTC
        let at = datetime!(2024-01-31 23:30 -5);
        assert_eq!(month_key(at), "2024-02");
    }

    #[test]
    fn candidates_are_left_out() {
        let draft = SafeFoodDraft {
            food_name: "peas".into(),
            ..Default::default()
        };
        let candidate = create(
            Uuid::new_v4(),
            draft,
            EntryPath::Candidate,
            datetime!(2024-05-05 00:00 UTC),
        )
        .unwrap();
        let foods = vec![candidate, established("rice", datetime!(2024-05-06 00:00 UTC))];
        let timeline = build_timeline(&foods);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline["2024-05"].len(), 1);
        assert_eq!(timeline["2024-05"][0].food_name, "rice");
    }

    #[test]
    fn recomputing_gives_the_same_timeline() {
        let foods = vec![
            established("a", datetime!(2024-01-01 00:00 UTC)),
            established("b", datetime!(2024-01-01 00:00 UTC)),
        ];
        let first = build_timeline(&foods);
        assert_eq!(first, build_timeline(&foods));
        let names: Vec<&str> = first["2024-01"].iter().map(|f| f.food_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn serializes_as_an_ordered_object() {
        let foods = vec![
            established("b", datetime!(2024-02-01 00:00 UTC)),
            established("a", datetime!(2023-12-01 00:00 UTC)),
        ];
        let json = serde_json::to_string(&build_timeline(&foods)).unwrap();
        let dec = json.find("\"2023-12\"").unwrap();
        let feb = json.find("\"2024-02\"").unwrap();
        assert!(dec < feb);
    }
}
