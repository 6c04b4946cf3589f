use anyhow::{Context, Result};
use foodlog_config::{Config, GoalsConfig};
use foodlog_engine::nutrition::{Nutrient, Nutrients};
use foodlog_engine::parsing::extract_section_str;
use foodlog_engine::parsing::rope::{Span, preview};
use foodlog_engine::projection::{render_markdown, to_html};
use foodlog_engine::{
    NutritionTotals, PassOutcome, Reconciler, StaticLookup, Trigger, TriggerHub,
    aggregate, decorate,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::{env, path::PathBuf, process};
use xi_rope::Rope;

struct Args {
    document: Option<PathBuf>,
    html: bool,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut document = None;
    let mut html = false;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--html" => html = true,
            flag if flag.starts_with("--") => return None,
            path if document.is_none() => document = Some(PathBuf::from(path)),
            _ => return None,
        }
    }
    Some(Args { document, html })
}

fn lookup_from_config(config: &Config) -> StaticLookup {
    config
        .foods
        .iter()
        .map(|(name, facts)| (name.as_str(), facts.clone()))
        .collect()
}

fn goals_from_config(goals: &GoalsConfig) -> Option<Nutrients> {
    if goals.is_empty() {
        return None;
    }
    Some(
        goals
            .entries()
            .into_iter()
            .filter_map(|(key, value)| {
                let nutrient = Nutrient::ALL.into_iter().find(|n| n.key() == key)?;
                Some((nutrient, value))
            })
            .collect(),
    )
}

fn print_totals(totals: &NutritionTotals) {
    println!("Totals:");
    for (nutrient, value) in totals.clamped.iter() {
        println!("  {nutrient:<15} {value:>8.1}");
    }
    if !totals.workout.is_empty() {
        println!("Burned:");
        for (nutrient, value) in totals.workout.iter() {
            println!("  {nutrient:<15} {value:>8.1}");
        }
    }
    if let Some(progress) = &totals.goal_progress {
        println!("Goals:");
        for (nutrient, p) in progress {
            println!(
                "  {nutrient:<15} {:>3}% eaten, {:>8.1} left ({}%)",
                p.percent_consumed, p.remaining, p.percent_remaining
            );
        }
    }
}

/// Renders the log section and decorates it the way an editor preview would:
/// a render-pass notification drives one reconciliation.
fn render_section_html(text: &str, heading: &str, lookup: &StaticLookup) -> String {
    let mut section = vec![format!("## {heading}")];
    section.extend(extract_section_str(text, heading).into_iter().map(|line| line.text));
    let tree = Rc::new(RefCell::new(render_markdown(&section.join("\n"))));

    let hub = TriggerHub::new();
    let lookup = Rc::new(lookup.clone());
    let _subscription = {
        let tree = tree.clone();
        let lookup = lookup.clone();
        let heading = heading.to_string();
        hub.subscribe(move |trigger| {
            let outcome = Reconciler::new(&*lookup)
                .with_heading(&heading)
                .reconcile(&mut tree.borrow_mut());
            match outcome {
                PassOutcome::Applied(stats) => log::info!("{trigger:?}: {stats:?}"),
                other => log::info!("{trigger:?}: {other:?}"),
            }
        })
    };
    hub.fire(Trigger::RenderPass);

    to_html(&tree.borrow())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(parsed) = parse_args(&args) else {
        eprintln!("Usage: {} [document.md] [--html]", args[0]);
        process::exit(1);
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!("No config file at {}, using defaults", config_path.display());
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let Some(document) = parsed.document.or_else(|| config.default_document.clone()) else {
        eprintln!("Error: No document provided and no default_document in config");
        eprintln!("Usage: {} [document.md] [--html]", args[0]);
        eprintln!("Or set default_document in {}", config_path.display());
        process::exit(1);
    };

    let text = std::fs::read_to_string(&document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    let lookup = lookup_from_config(&config);
    let goals = goals_from_config(&config.goals);
    let heading = config.log_heading.as_str();

    let totals = aggregate(&text, heading, &lookup, goals.as_ref(), |name, e| {
        eprintln!("Warning: skipped [[{name}]]: {e}");
    });
    match &totals {
        Some(totals) => print_totals(totals),
        None => println!("No food log entries under '## {heading}'"),
    }

    let decorations = decorate(&text, heading, &lookup);
    if !decorations.annotations.is_empty() {
        println!("Hints:");
        let rope = Rope::from(text.as_str());
        for note in &decorations.annotations {
            let line_start = text[..note.position].rfind('\n').map_or(0, |i| i + 1);
            let line = preview(&rope, Span::new(line_start, note.position), 40);
            println!("  {line:<43} {}", note.text);
        }
    }

    if parsed.html {
        println!("{}", render_section_html(&text, heading, &lookup));
    }

    Ok(())
}
