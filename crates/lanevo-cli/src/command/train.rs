use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use lanevo_engine::{Course, EpisodeStats};
use lanevo_training::{
    config::EvolutionConfig,
    episode::Episode,
    population::{GenerationSummary, PopulationManager},
    selection::SelectionConfig,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::util::{self, Output};

const DEFAULT_GENERATIONS: usize = 50;
const DEFAULT_TICK_LIMIT: usize = 5000;
const DEFAULT_TOURNAMENT_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum SelectionKind {
    Nucleus,
    Tournament,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Evolution config JSON file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long, default_value_t = DEFAULT_GENERATIONS)]
    generations: usize,
    /// Ticks after which surviving agents are retired (0 disables the limit)
    #[arg(long, default_value_t = DEFAULT_TICK_LIMIT)]
    tick_limit: usize,
    /// Overrides the configured population size
    #[arg(long)]
    population_size: Option<usize>,
    /// Overrides the configured selection strategy (nucleus or tournament)
    #[arg(long)]
    selection: Option<SelectionKind>,
    /// Overrides the tournament size when tournament selection is in effect
    #[arg(long)]
    tournament_size: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Training report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct TrainingReport {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    seed: u64,
    config: EvolutionConfig,
    generations: Vec<GenerationRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationRecord {
    ticks: usize,
    best_score: usize,
    summary: GenerationSummary,
}

fn load_config(arg: &TrainArg) -> anyhow::Result<EvolutionConfig> {
    let mut config = match &arg.config {
        Some(path) => util::read_config_file(path)?,
        None => EvolutionConfig::default(),
    };
    if let Some(population_size) = arg.population_size {
        config.population_size = population_size;
    }
    match (arg.selection, config.selection) {
        (Some(SelectionKind::Nucleus), SelectionConfig::Tournament { .. }) => {
            config.selection = SelectionConfig::default();
        }
        (Some(SelectionKind::Tournament), SelectionConfig::Nucleus { .. }) => {
            config.selection = SelectionConfig::Tournament {
                size: DEFAULT_TOURNAMENT_SIZE,
            };
        }
        _ => {}
    }
    if let (Some(size), SelectionConfig::Tournament { .. }) =
        (arg.tournament_size, config.selection)
    {
        config.selection = SelectionConfig::Tournament { size };
    }
    config.validate().context("Invalid evolution config")?;
    Ok(config)
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = load_config(arg)?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let tick_limit = (arg.tick_limit > 0).then_some(arg.tick_limit);
    let mut rng = Pcg32::seed_from_u64(seed);

    eprintln!(
        "Training {} agents for {} generations",
        config.population_size, arg.generations
    );
    eprintln!("  Seed:         {seed}");
    eprintln!("  Architecture: {}", config.architecture);
    eprintln!("  Selection:    {:?}", config.selection);

    let started_at = Utc::now();
    let mut manager = PopulationManager::new(config)?;
    let mut population = manager.initial_population(&mut rng);
    let mut records = Vec::with_capacity(arg.generations);
    let mut best: Option<(usize, EpisodeStats)> = None;

    for generation in 0..arg.generations {
        let course = Course::with_seed(rng.random());
        let mut episode = Episode::new(course, config.observation, tick_limit);
        let ticks = episode.run(&mut population)?;
        let best_score = population
            .dead()
            .iter()
            .map(|agent| agent.stats().score)
            .max()
            .unwrap_or(0);

        population = manager.advance(population, &mut rng)?;
        let summary = manager
            .last_summary()
            .context("Generation finished without a summary")?
            .clone();

        eprintln!("Generation #{generation}:");
        eprintln!("  Ticks:        {ticks}");
        eprintln!("  Best score:   {best_score}");
        if let Some(fitness) = &summary.fitness {
            eprintln!("  Fitness Stats:");
            eprintln!("    Min:  {:.3}", fitness.min);
            eprintln!("    Max:  {:.3}", fitness.max);
            eprintln!("    Mean: {:.3}", fitness.mean);
        }
        eprintln!("  Diversity:    {:.3}", summary.diversity);
        eprintln!("  Elites:       {}", summary.elite_count);

        if let Some(stats) = summary.best_stats
            && best.is_none_or(|(_, b)| stats.score > b.score)
        {
            best = Some((generation, stats));
        }
        records.push(GenerationRecord {
            ticks,
            best_score,
            summary,
        });
    }

    eprintln!();
    eprintln!("Training completed.");
    if let Some((generation, stats)) = best {
        eprintln!("  Best generation: #{generation}");
        eprintln!("  Score:           {}", stats.score);
        eprintln!("  Survival time:   {}", stats.survival_time);
        eprintln!("  Obstacles:       {}", stats.obstacles_avoided);
        eprintln!("  Moves:           {}", stats.moves_made);
    }

    if let Some(path) = &arg.report {
        let report = TrainingReport {
            started_at,
            finished_at: Utc::now(),
            seed,
            config,
            generations: records,
        };
        Output::save_json(&report, Some(path.clone()))?;
        eprintln!("  Report: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_override() {
        let arg = TrainArg {
            selection: Some(SelectionKind::Tournament),
            ..TrainArg::default()
        };
        let config = load_config(&arg).unwrap();
        assert_eq!(
            config.selection,
            SelectionConfig::Tournament {
                size: DEFAULT_TOURNAMENT_SIZE
            }
        );

        let arg = TrainArg {
            selection: Some(SelectionKind::Tournament),
            tournament_size: Some(7),
            ..TrainArg::default()
        };
        let config = load_config(&arg).unwrap();
        assert_eq!(config.selection, SelectionConfig::Tournament { size: 7 });
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let arg = TrainArg {
            population_size: Some(0),
            ..TrainArg::default()
        };
        assert!(load_config(&arg).is_err());
    }

    #[test]
    fn test_selection_kind_from_str() {
        assert_eq!("nucleus".parse::<SelectionKind>().unwrap(), SelectionKind::Nucleus);
        assert_eq!(
            "tournament".parse::<SelectionKind>().unwrap(),
            SelectionKind::Tournament
        );
    }

    #[test]
    fn test_tournament_size_applies_to_configured_tournament() {
        let path = std::env::temp_dir().join(format!(
            "lanevo-train-config-{}.json",
            std::process::id()
        ));
        let json = r#"{ "selection": { "kind": "tournament", "size": 4 } }"#;
        std::fs::write(&path, json).unwrap();

        let arg = TrainArg {
            config: Some(path.clone()),
            tournament_size: Some(9),
            ..TrainArg::default()
        };
        let config = load_config(&arg).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.selection, SelectionConfig::Tournament { size: 9 });
    }

    #[test]
    fn test_tournament_size_ignored_for_nucleus() {
        let arg = TrainArg {
            tournament_size: Some(9),
            ..TrainArg::default()
        };
        let config = load_config(&arg).unwrap();
        assert_eq!(config.selection, SelectionConfig::default());
    }
}
