//! Structured pieces pulled out of game generation replies

use crate::markdown::{bullets_under, first_code_block, prose_under, tagged_code_block};
use serde::Serialize;

const CODE_LANGS: &[&str] = &["typescript", "ts"];

/// A generated scene. Fields the reply did not contain are empty and named in `missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneReply {
    pub code: String,
    pub assets: Vec<String>,
    pub mechanics: String,
    pub learning_objectives: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

impl SceneReply {
    pub fn parse(reply: &str) -> Self {
        let mut missing = Vec::new();
        let code = required(first_code_block(reply, CODE_LANGS), "code", &mut missing);
        let assets = required_list(
            bullets_under(reply, &["required assets", "assets"]),
            "assets",
            &mut missing,
        );
        let mechanics = required_text(
            prose_under(reply, &["game mechanics", "mechanics"]),
            "mechanics",
            &mut missing,
        );
        let learning_objectives = required_list(
            bullets_under(reply, &["learning objectives", "objectives"]),
            "learning_objectives",
            &mut missing,
        );
        Self {
            code,
            assets,
            mechanics,
            learning_objectives,
            missing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnhancementReply {
    pub code: String,
    pub changes: Vec<String>,
    pub new_assets: Vec<String>,
    pub performance_impact: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

impl EnhancementReply {
    pub fn parse(reply: &str) -> Self {
        let mut missing = Vec::new();
        let code = required(first_code_block(reply, CODE_LANGS), "code", &mut missing);
        let changes = required_list(
            bullets_under(reply, &["changes made", "changes"]),
            "changes",
            &mut missing,
        );
        // Enhancements often need no new assets
        let new_assets = bullets_under(reply, &["new assets", "assets required"]);
        let performance_impact = required_text(
            prose_under(reply, &["performance impact", "performance"]),
            "performance_impact",
            &mut missing,
        );
        Self {
            code,
            changes,
            new_assets,
            performance_impact,
            missing,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MiniGameReply {
    pub code: String,
    pub visual_design: String,
    pub scoring_system: String,
    pub integration_notes: String,
    pub accessibility: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

impl MiniGameReply {
    pub fn parse(reply: &str) -> Self {
        let mut missing = Vec::new();
        let code = required(first_code_block(reply, CODE_LANGS), "code", &mut missing);
        let visual_design = required_text(
            prose_under(reply, &["visual design"]),
            "visual_design",
            &mut missing,
        );
        let scoring_system = required_text(
            prose_under(reply, &["scoring", "score system"]),
            "scoring_system",
            &mut missing,
        );
        let integration_notes = required_text(
            prose_under(reply, &["integration"]),
            "integration_notes",
            &mut missing,
        );
        let accessibility = prose_under(reply, &["accessibility"]);
        Self {
            code,
            visual_design,
            scoring_system,
            integration_notes,
            accessibility,
            missing,
        }
    }
}

/// Game configuration files, each fenced block opened by a `// <file>` comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigReply {
    pub config_code: String,
    pub app_code: String,
    pub preloader_code: String,
    pub scene_manager_code: String,
    pub save_system_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

impl ConfigReply {
    pub fn parse(reply: &str) -> Self {
        let mut missing = Vec::new();
        let config_code = required(tagged_code_block(reply, "config.ts"), "config", &mut missing);
        Self {
            config_code,
            app_code: tagged_code_block(reply, "App.tsx").unwrap_or_default(),
            preloader_code: tagged_code_block(reply, "PreloadScene").unwrap_or_default(),
            scene_manager_code: tagged_code_block(reply, "SceneManager").unwrap_or_default(),
            save_system_code: tagged_code_block(reply, "SaveSystem").unwrap_or_default(),
            missing,
        }
    }
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    required_text(value.unwrap_or_default(), name, missing)
}

fn required_text(value: String, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    if value.is_empty() {
        missing.push(name);
    }
    value
}

fn required_list(
    value: Vec<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Vec<String> {
    if value.is_empty() {
        missing.push(name);
    }
    value
}
