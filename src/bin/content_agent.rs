//! Content agent: turns onboarding documents into voice agent files
//!
//! Run without arguments for the interactive flow, or pass `--batch` with a
//! JSON array of `{source_document, agent_name, personality}` entries.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use voice_onboarding::config::{content_root, docs_dir};
use voice_onboarding::content::{
    list_documents, normalize_agent_name, parse_batch, AgentContentStore, ContentOutcome,
    ContentPipeline, ContentRequest,
};
use voice_onboarding::llm::{LlmConfig, ModelRegistry};
use voice_onboarding::telemetry;

const DEFAULT_AGENT_NAME: &str = "friendly_onboarding_agent";

/// Generate instructor, script and conversation states for voice agents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with an array of generation requests
    #[arg(long)]
    batch: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    telemetry::init_cli();
    let cli = Cli::parse();

    let registry = match ModelRegistry::new(LlmConfig::from_env()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Set OPENAI_API_KEY before running the content agent.");
            std::process::exit(1);
        }
    };
    let llm = match registry.content_service() {
        Ok(llm) => llm,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let pipeline = ContentPipeline::new(llm, AgentContentStore::new(content_root()));

    let result = match cli.batch {
        Some(path) => run_batch(&pipeline, &path).await,
        None => run_interactive(&pipeline).await.map_err(Into::into),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_batch(pipeline: &ContentPipeline, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let entries = parse_batch(&raw)?;
    let total = entries.len();
    println!("Processing {total} agent(s) from {}", path.display());

    let mut failed = 0;
    for (i, entry) in entries.into_iter().enumerate() {
        let request = match entry {
            Ok(request) => request,
            Err(e) => {
                failed += 1;
                tracing::error!(entry = i + 1, error = %e, "Invalid batch entry");
                eprintln!("\n[{}/{total}] Invalid entry: {e}", i + 1);
                continue;
            }
        };

        println!(
            "\n[{}/{total}] {} <- {}",
            i + 1,
            request.agent_name,
            request.source_document.display()
        );
        match pipeline.generate(&request).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => {
                failed += 1;
                tracing::error!(agent = %request.agent_name, error = %e, "Batch item failed");
                eprintln!("Error generating {}: {e}", request.agent_name);
            }
        }
    }

    println!("\nBatch complete: {} succeeded, {failed} failed", total - failed);
    Ok(())
}

async fn run_interactive(pipeline: &ContentPipeline) -> io::Result<()> {
    println!("Voice agent content generator (model: {})", pipeline.model_id());
    let docs_dir = docs_dir();

    loop {
        let documents = list_documents(&docs_dir)?;
        if documents.is_empty() {
            println!(
                "No .txt or .md documents found in {}. Add some and try again.",
                docs_dir.display()
            );
            return Ok(());
        }

        println!("\nAvailable documents:");
        for (i, doc) in documents.iter().enumerate() {
            println!("  {}. {}", i + 1, file_label(doc));
        }
        let Some(document) = select_document(&documents)? else {
            return Ok(());
        };

        let name = ask(&format!("Agent folder name [{DEFAULT_AGENT_NAME}]: "))?;
        let agent_name = if name.is_empty() {
            DEFAULT_AGENT_NAME.to_string()
        } else {
            normalize_agent_name(&name)
        };

        let personality = loop {
            match read_answer("Personality (e.g. energetic sports coach): ")? {
                Some(p) if !p.is_empty() => break p,
                Some(_) => println!("A personality is required."),
                None => return Ok(()),
            }
        };

        println!("\nSummary");
        println!("  Document:    {}", document.display());
        println!("  Agent:       {agent_name}");
        println!("  Personality: {personality}");
        println!("  Output:      {}", pipeline.store().agent_dir(&agent_name).display());

        if confirm("Generate content? [Y/n]: ", true)? {
            let request = ContentRequest {
                source_document: document.clone(),
                agent_name,
                personality,
            };
            println!("Generating, this takes a few minutes...");
            match pipeline.generate(&request).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        if !confirm("Create another agent? [y/N]: ", false)? {
            return Ok(());
        }
    }
}

/// Re-prompts until a listed number is entered; `None` on end of input
fn select_document(documents: &[PathBuf]) -> io::Result<Option<PathBuf>> {
    loop {
        let Some(answer) = read_answer(&format!("Select a document (1-{}): ", documents.len()))?
        else {
            return Ok(None);
        };
        match answer.parse::<usize>() {
            Ok(n) if (1..=documents.len()).contains(&n) => return Ok(Some(documents[n - 1].clone())),
            _ => println!("Please enter a number between 1 and {}.", documents.len()),
        }
    }
}

fn print_outcome(outcome: &ContentOutcome) {
    println!("Created agent '{}' in {}", outcome.agent_name, outcome.agent_dir.display());
    println!("  {}", outcome.instructor_path.display());
    println!("  {}", outcome.script_path.display());
    println!(
        "  {} ({} states)",
        outcome.states_path.display(),
        outcome.state_count
    );
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn confirm(prompt: &str, default: bool) -> io::Result<bool> {
    let answer = ask(prompt)?.to_lowercase();
    Ok(match answer.as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Trimmed answer; empty at end of input
fn ask(prompt: &str) -> io::Result<String> {
    Ok(read_answer(prompt)?.unwrap_or_default())
}

fn read_answer(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
