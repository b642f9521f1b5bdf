//! Game agent: turns onboarding documents into Phaser.js scenes
//!
//! Modes, first match wins: `--enhance`, `--scene`, `--mini-game`,
//! `--document` with `--name`, otherwise an interactive prompt.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use voice_onboarding::config::docs_dir;
use voice_onboarding::content::list_documents;
use voice_onboarding::game::{
    Difficulty, EnhancementType, GameConfig, GamePipeline, GameSummary, MiniGameType, SceneType,
};
use voice_onboarding::llm::{LlmConfig, ModelRegistry, DEFAULT_GAME_MODEL, FALLBACK_MODELS};
use voice_onboarding::telemetry;

const DEFAULT_GAME_NAME: &str = "onboarding_game";

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Generate onboarding game scenes with an LLM
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Onboarding document to turn into a full game
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// Game name, used for scene and file names
    #[arg(short, long)]
    name: Option<String>,

    /// Model to use (defaults to GAME_AGENT_MODEL or o3)
    #[arg(short, long)]
    model: Option<String>,

    /// Generate a single scene with this name; content is read from stdin
    #[arg(short, long)]
    scene: Option<String>,

    /// Scene type for --scene
    #[arg(short = 't', long = "type", value_enum, default_value = "platformer")]
    scene_type: SceneType,

    /// Existing scene file to enhance; requirements are read from stdin
    #[arg(short, long)]
    enhance: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "visual")]
    enhancement_type: EnhancementType,

    /// Concept for a standalone mini-game
    #[arg(long)]
    mini_game: Option<String>,

    #[arg(long, value_enum, default_value = "quiz")]
    game_type: MiniGameType,

    #[arg(long, value_enum, default_value = "medium")]
    difficulty: Difficulty,

    /// Directory the frontend/ output tree is created under
    #[arg(long)]
    output_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    telemetry::init_cli();
    let cli = Cli::parse();

    let llm_config = LlmConfig::from_env();
    let registry = match ModelRegistry::new(llm_config.clone()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Set OPENAI_API_KEY before running the game agent.");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, &registry, &llm_config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, registry: &ModelRegistry, llm_config: &LlmConfig) -> CliResult {
    let interactive = cli.enhance.is_none()
        && cli.scene.is_none()
        && cli.mini_game.is_none()
        && (cli.document.is_none() || cli.name.is_none());

    let mut model = cli.model.clone();
    let mut target = cli.document.clone().zip(cli.name.clone());
    if interactive {
        match prompt_game()? {
            Some((document, name, picked)) => {
                target = Some((document, name));
                model = model.or(picked);
            }
            None => return Ok(()),
        }
    }

    let config = GameConfig::resolve(cli.output_root.clone(), model, llm_config);
    let paths = config.paths();
    paths.ensure()?;
    let pipeline = GamePipeline::new(registry.game_service(Some(&config.model))?, paths);
    println!("Using model {}", pipeline.model_id());

    if let Some(scene_path) = &cli.enhance {
        let requirements = read_line("Enhancement requirements (comma-separated): ")?
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();
        let outcome = pipeline
            .enhance_scene(scene_path, cli.enhancement_type, &requirements)
            .await?;
        println!("Enhanced scene written to {}", outcome.path.display());
        for change in &outcome.reply.changes {
            println!("  - {change}");
        }
        if !outcome.reply.performance_impact.is_empty() {
            println!("Performance impact: {}", outcome.reply.performance_impact);
        }
        return Ok(());
    }

    if let Some(scene_name) = &cli.scene {
        let content = read_block("Scene content (end with an empty line):")?;
        let (scene, path) = pipeline
            .generate_single_scene(scene_name, &content, cli.scene_type)
            .await?;
        println!("Scene written to {}", path.display());
        print_missing(&scene.reply.missing);
        return Ok(());
    }

    if let Some(concept) = &cli.mini_game {
        let outcome = pipeline
            .generate_mini_game(concept, cli.game_type, cli.difficulty)
            .await?;
        println!("Mini-game {} written to {}", outcome.name, outcome.path.display());
        print_missing(&outcome.reply.missing);
        return Ok(());
    }

    if let Some((document, name)) = target {
        println!("Generating game '{name}' from {}...", document.display());
        let summary = pipeline.generate_full_game(&document, &name).await?;
        print_summary(&summary);
    }
    Ok(())
}

/// Document, game name and optional model; `None` when there is nothing to do
fn prompt_game() -> io::Result<Option<(PathBuf, String, Option<String>)>> {
    let dir = docs_dir();
    let documents = list_documents(&dir)?;
    if documents.is_empty() {
        println!("No .txt or .md documents found in {}.", dir.display());
        return Ok(None);
    }

    println!("Available documents:");
    for (i, doc) in documents.iter().enumerate() {
        println!("  {}. {}", i + 1, label(doc));
    }
    let document = loop {
        let answer = read_line(&format!("Select a document (1-{}): ", documents.len()))?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=documents.len()).contains(&n) => break documents[n - 1].clone(),
            _ if answer.is_empty() => return Ok(None),
            _ => println!("Please enter a number between 1 and {}.", documents.len()),
        }
    };

    let name = read_line(&format!("Game name [{DEFAULT_GAME_NAME}]: "))?;
    let name = if name.is_empty() {
        DEFAULT_GAME_NAME.to_string()
    } else {
        name.replace(' ', "_")
    };

    let models: Vec<&str> = std::iter::once(DEFAULT_GAME_MODEL)
        .chain(FALLBACK_MODELS.iter().copied())
        .collect();
    println!("Models:");
    for (i, model) in models.iter().enumerate() {
        println!("  {}. {model}", i + 1);
    }
    let answer = read_line("Select a model [default from environment]: ")?;
    let model = answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| models.get(i))
        .map(|m| (*m).to_string());

    Ok(Some((document, name, model)))
}

fn print_summary(summary: &GameSummary) {
    println!(
        "Generated {} scene(s) with {}",
        summary.total_scenes, summary.model_used
    );
    for scene in &summary.scenes {
        println!("  {} ({} assets)", scene.name, scene.assets.len());
    }
    println!("Config: {}", summary.config_path);
}

fn print_missing(missing: &[&str]) {
    if !missing.is_empty() {
        println!("warning: reply did not include {}", missing.join(", "));
    }
}

fn label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// One trimmed line; empty at end of input
fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Lines up to the first empty one or end of input
fn read_block(prompt: &str) -> io::Result<String> {
    println!("{prompt}");
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
