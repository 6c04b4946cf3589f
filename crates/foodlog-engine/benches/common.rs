// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use foodlog_engine::{NutritionFacts, StaticLookup};

#[allow(dead_code)]
pub fn generate_food_log(days: usize, entries_per_day: usize) -> String {
    let mut content = String::new();
    for day in 0..days {
        content.push_str(&format!("# Day {}\n\nSome notes about the day.\n\n## Food Log\n\n", day));
        for i in 0..entries_per_day {
            match i % 3 {
                0 => content.push_str(&format!("- [[food-{}]] {}g\n", i % 10, 50 + i)),
                1 => content.push_str(&format!("- Meal {} {}kcal {}prot {}carbs\n", i, 300 + i, 10 + i, 40)),
                _ => content.push_str(&format!("- [[foods/food-{}|Food]] {}pc\n", i % 10, 1 + i % 4)),
            }
        }
        content.push('\n');
    }
    content
}

#[allow(dead_code)]
pub fn lookup() -> StaticLookup {
    (0..10)
        .map(|i| {
            (
                format!("food-{i}"),
                NutritionFacts {
                    calories: Some(50.0 + i as f64 * 20.0),
                    protein: Some(i as f64),
                    serving_size: Some(80.0),
                    ..Default::default()
                },
            )
        })
        .collect()
}
