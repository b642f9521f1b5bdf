//! Document to Phaser scenes: per-section generation, config and summary

use super::extract::{ConfigReply, EnhancementReply, MiniGameReply, SceneReply};
use super::kinds::{Difficulty, EnhancementType, MiniGameType, SceneType};
use super::prompts;
use super::sections::split_sections;
use super::GameError;
use crate::llm::{LlmRequest, LlmService};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TEMPERATURE: f32 = 0.7;
const SCENE_MAX_TOKENS: u32 = 4000;
const MINI_GAME_MAX_TOKENS: u32 = 3000;

/// Features requested for every full game configuration
pub const GAME_FEATURES: &[&str] = &[
    "progress_tracking",
    "achievements",
    "save_system",
    "responsive_design",
];

/// Where generated files go, relative to an output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub scenes: PathBuf,
    pub assets: PathBuf,
    pub configs: PathBuf,
}

impl OutputPaths {
    pub fn under(root: &Path) -> Self {
        Self {
            scenes: root.join("frontend/src/game/scenes/generated"),
            assets: root.join("frontend/public/assets/generated"),
            configs: root.join("frontend/src/game/configs"),
        }
    }

    pub fn ensure(&self) -> Result<(), GameError> {
        for dir in [&self.scenes, &self.assets, &self.configs] {
            std::fs::create_dir_all(dir).map_err(|source| GameError::Write {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// One scene as returned by the model
#[derive(Debug, Clone)]
pub struct GeneratedScene {
    pub name: String,
    pub scene_type: SceneType,
    pub reply: SceneReply,
    /// Model that answered, which may be a fallback
    pub model: String,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub name: String,
    pub assets: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub mechanics: String,
}

/// Written beside the scenes after a full game run
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_name: String,
    pub model_used: String,
    pub source_document: String,
    pub generated_at: DateTime<Local>,
    pub scenes: Vec<SceneSummary>,
    pub total_scenes: usize,
    pub config_path: String,
}

#[derive(Debug, Clone)]
pub struct EnhancementOutcome {
    pub reply: EnhancementReply,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MiniGameOutcome {
    pub name: String,
    pub reply: MiniGameReply,
    pub path: PathBuf,
}

pub struct GamePipeline {
    llm: Arc<dyn LlmService>,
    paths: OutputPaths,
}

impl GamePipeline {
    pub fn new(llm: Arc<dyn LlmService>, paths: OutputPaths) -> Self {
        Self { llm, paths }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Ask for one scene without writing anything
    pub async fn generate_scene(
        &self,
        scene_name: &str,
        content: &str,
        scene_type: SceneType,
        existing_code: Option<&str>,
    ) -> Result<GeneratedScene, GameError> {
        let prompt = prompts::scene_prompt(scene_name, scene_type, content, existing_code);
        let (text, model) = self.ask(prompt, SCENE_MAX_TOKENS).await?;
        let reply = SceneReply::parse(&text);
        if !reply.missing.is_empty() {
            tracing::warn!(scene = %scene_name, missing = ?reply.missing, "Scene reply incomplete");
        }
        Ok(GeneratedScene {
            name: scene_name.to_string(),
            scene_type,
            reply,
            model,
            generated_at: Local::now(),
        })
    }

    /// Generate one scene and write `<scenes>/<name>.ts`
    pub async fn generate_single_scene(
        &self,
        scene_name: &str,
        content: &str,
        scene_type: SceneType,
    ) -> Result<(GeneratedScene, PathBuf), GameError> {
        validate_name(scene_name)?;
        let scene = self
            .generate_scene(scene_name, content, scene_type, None)
            .await?;
        let path = self.paths.scenes.join(format!("{scene_name}.ts"));
        write_file(&path, &scene.reply.code)?;
        tracing::info!(scene = %scene_name, path = %path.display(), "Scene saved");
        Ok((scene, path))
    }

    /// A scene per document section, then the game config, then a summary
    pub async fn generate_full_game(
        &self,
        document: &Path,
        game_name: &str,
    ) -> Result<GameSummary, GameError> {
        validate_name(game_name)?;
        let content = std::fs::read_to_string(document).map_err(|source| GameError::Document {
            path: document.to_path_buf(),
            source,
        })?;
        let sections = split_sections(&content);

        tracing::info!(
            game = %game_name,
            document = %document.display(),
            sections = sections.len(),
            model = %self.llm.model_id(),
            "Generating game"
        );

        let mut scenes = Vec::with_capacity(sections.len());
        for (i, section) in sections.iter().enumerate() {
            let scene_name = format!("{game_name}Scene{}", i + 1);
            let scene_type = SceneType::for_title(&section.title);
            tracing::info!(
                scene = %scene_name,
                title = %section.title,
                %scene_type,
                "Generating scene {}/{}",
                i + 1,
                sections.len()
            );

            let scene = self
                .generate_scene(&scene_name, &section.body, scene_type, None)
                .await?;
            write_file(
                &self.paths.scenes.join(format!("{scene_name}.ts")),
                &scene.reply.code,
            )?;
            scenes.push(scene);
        }

        let scene_names: Vec<String> = scenes.iter().map(|s| s.name.clone()).collect();
        let config = self
            .generate_config(&title_case(game_name), &scene_names, GAME_FEATURES)
            .await?;
        let config_path = self.paths.configs.join(format!("{game_name}_config.ts"));
        write_file(&config_path, &config.config_code)?;

        let model_used = scenes
            .last()
            .map_or_else(|| self.llm.model_id().to_string(), |s| s.model.clone());
        let summary = GameSummary {
            game_name: game_name.to_string(),
            model_used,
            source_document: document.display().to_string(),
            generated_at: Local::now(),
            total_scenes: scenes.len(),
            scenes: scenes
                .into_iter()
                .map(|s| SceneSummary {
                    name: s.name,
                    assets: s.reply.assets,
                    learning_objectives: s.reply.learning_objectives,
                    mechanics: s.reply.mechanics,
                })
                .collect(),
            config_path: config_path.display().to_string(),
        };

        let summary_path = self.paths.scenes.join(format!("{game_name}_summary.json"));
        let json = serde_json::to_string_pretty(&summary)?;
        write_file(&summary_path, &json)?;
        tracing::info!(game = %game_name, path = %summary_path.display(), "Game summary saved");

        Ok(summary)
    }

    pub async fn generate_config(
        &self,
        game_title: &str,
        scenes: &[String],
        features: &[&str],
    ) -> Result<ConfigReply, GameError> {
        let prompt = prompts::config_prompt(game_title, scenes, features);
        let (text, _) = self.ask(prompt, SCENE_MAX_TOKENS).await?;
        let reply = ConfigReply::parse(&text);
        if !reply.missing.is_empty() {
            tracing::warn!(game = %game_title, "Config reply has no `// config.ts` block");
        }
        Ok(reply)
    }

    /// Rewrite an existing scene and save it as `<stem>_enhanced.ts` beside it
    pub async fn enhance_scene(
        &self,
        scene_path: &Path,
        enhancement_type: EnhancementType,
        requirements: &[String],
    ) -> Result<EnhancementOutcome, GameError> {
        let code = std::fs::read_to_string(scene_path).map_err(|source| GameError::Document {
            path: scene_path.to_path_buf(),
            source,
        })?;

        let prompt = prompts::enhancement_prompt(&code, enhancement_type, requirements);
        let (text, _) = self.ask(prompt, SCENE_MAX_TOKENS).await?;
        let reply = EnhancementReply::parse(&text);

        let path = enhanced_path(scene_path);
        write_file(&path, &reply.code)?;
        tracing::info!(
            path = %path.display(),
            changes = reply.changes.len(),
            "Enhanced scene saved"
        );
        Ok(EnhancementOutcome { reply, path })
    }

    pub async fn generate_mini_game(
        &self,
        concept: &str,
        game_type: MiniGameType,
        difficulty: Difficulty,
    ) -> Result<MiniGameOutcome, GameError> {
        let prompt = prompts::mini_game_prompt(concept, game_type, difficulty);
        let (text, _) = self.ask(prompt, MINI_GAME_MAX_TOKENS).await?;
        let reply = MiniGameReply::parse(&text);

        let name = mini_game_name(concept);
        let path = self.paths.scenes.join(format!("{name}.ts"));
        write_file(&path, &reply.code)?;
        tracing::info!(mini_game = %name, path = %path.display(), "Mini-game saved");
        Ok(MiniGameOutcome { name, reply, path })
    }

    async fn ask(&self, user: String, max_tokens: u32) -> Result<(String, String), GameError> {
        let request = LlmRequest::prompt(prompts::SYSTEM_PROMPT, user)
            .with_max_tokens(max_tokens)
            .with_temperature(TEMPERATURE);
        let response = self.llm.complete(&request).await?;
        let model = response
            .model
            .unwrap_or_else(|| self.llm.model_id().to_string());
        Ok((response.text, model))
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), GameError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| GameError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| GameError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_name(name: &str) -> Result<(), GameError> {
    let path = Path::new(name);
    let single_component = path.components().count() == 1 && path.file_name().is_some();
    if name.trim().is_empty() || !single_component {
        return Err(GameError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `scenes/Foo.ts` becomes `scenes/Foo_enhanced.ts`
pub fn enhanced_path(scene_path: &Path) -> PathBuf {
    let stem = scene_path
        .file_stem()
        .map_or_else(|| "scene".into(), |s| s.to_string_lossy());
    let ext = scene_path
        .extension()
        .map_or_else(|| "ts".into(), |e| e.to_string_lossy());
    scene_path.with_file_name(format!("{stem}_enhanced.{ext}"))
}

/// `benefits_adventure` becomes `Benefits Adventure`
pub fn title_case(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Class-like file name for a mini-game from the first words of its concept
pub fn mini_game_name(concept: &str) -> String {
    let words: String = concept
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(4)
        .map(|w| {
            let mut chars = w.chars();
            chars
                .next()
                .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .collect();
    format!("{words}MiniGame")
}
