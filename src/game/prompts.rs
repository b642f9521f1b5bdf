//! Prompts for the game generation pipeline

use super::kinds::{Difficulty, EnhancementType, MiniGameType, SceneType};
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = "You are a game development expert specializing in creating educational games for employee onboarding using Phaser.js and TypeScript.

Your role is to:
1. Analyze onboarding content and transform it into engaging game mechanics
2. Generate complete, working Phaser.js scene code
3. Create educational gameplay that reinforces key concepts
4. Design mini-games and challenges
5. Ensure the game is fun, educational, and accessible

When generating game content:
- Use TypeScript and Phaser 3 framework
- Create complete scene classes extending Phaser.Scene
- Include preload(), create(), and update() methods
- Add interactive elements (collectibles, obstacles, NPCs like Coach Blaze)
- Include progress tracking and scoring
- Add visual feedback and animations
- Ensure mobile responsiveness

Always provide:
1. Complete TypeScript scene code
2. List of required assets
3. Game mechanics explanation
4. Learning objectives covered";

pub fn scene_prompt(
    scene_name: &str,
    scene_type: SceneType,
    content: &str,
    existing_code: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Generate a Phaser.js game scene for employee onboarding.\n\n\
         Scene Name: {scene_name}\n\
         Scene Type: {scene_type}\n\
         Onboarding Content:\n{content}\n\n"
    );
    if let Some(code) = existing_code {
        let _ = write!(prompt, "Existing Code Reference:\n{code}\n\n");
    }
    let _ = write!(
        prompt,
        "Create a complete TypeScript scene that:\n\
         - Teaches the onboarding concepts through gameplay\n\
         - Uses {scene_type} mechanics\n\
         - Includes clear objectives and scoring\n\
         - Has engaging visuals and animations\n\n\
         Format your response as:\n\
         ## Scene Code\n\
         ```typescript\n\
         // Complete scene code here\n\
         ```\n\n\
         ## Required Assets\n\
         - List all image/audio assets needed\n\n\
         ## Game Mechanics\n\
         Explain how the game works\n\n\
         ## Learning Objectives\n\
         - List what players will learn\n"
    );
    prompt
}

pub fn config_prompt(game_title: &str, scenes: &[String], features: &[&str]) -> String {
    format!(
        "Generate Phaser.js game configuration for an onboarding game.\n\n\
         Game Title: {game_title}\n\
         Scenes: {scenes}\n\
         Features: {features}\n\n\
         Ensure the configuration:\n\
         - Supports all listed scenes\n\
         - Enables requested features\n\
         - Optimizes for performance\n\
         - Handles responsive design\n\
         - Includes error handling\n\n\
         Reply with one ```typescript block per file. The first line of each block \
         is a comment naming the file:\n\
         // config.ts (game configuration)\n\
         // App.tsx (main app component updates)\n\
         // PreloadScene.ts (asset preloader)\n\
         // SceneManager.ts (scene management)\n\
         // SaveSystem.ts (save/load of progress)\n",
        scenes = scenes.join(", "),
        features = features.join(", "),
    )
}

pub fn enhancement_prompt(
    scene_code: &str,
    enhancement_type: EnhancementType,
    requirements: &[String],
) -> String {
    format!(
        "Enhance an existing Phaser.js game scene.\n\n\
         Current Scene Code:\n\
         ```typescript\n{scene_code}\n```\n\n\
         Enhancement Type: {enhancement_type} ({description})\n\
         Requirements: {requirements}\n\n\
         Format your response as:\n\
         ## Enhanced Code\n\
         ```typescript\n\
         // Complete updated scene code\n\
         ```\n\n\
         ## Changes Made\n\
         - One bullet per change\n\n\
         ## New Assets\n\
         - Any new assets required\n\n\
         ## Performance Impact\n\
         Assess the performance impact\n",
        description = enhancement_type.description(),
        requirements = requirements.join(", "),
    )
}

pub fn mini_game_prompt(concept: &str, game_type: MiniGameType, difficulty: Difficulty) -> String {
    format!(
        "Create a mini-game to teach an onboarding concept.\n\n\
         Concept: {concept}\n\
         Game Type: {game_type} ({description})\n\
         Difficulty: {difficulty}\n\n\
         Create a complete Phaser.js mini-game scene that:\n\
         - Focuses on teaching the concept\n\
         - Uses {game_type} mechanics\n\
         - Is appropriately challenging for {difficulty} level\n\
         - Can be completed in 2-3 minutes\n\n\
         Format your response as:\n\
         ## Mini-Game Code\n\
         ```typescript\n\
         // Complete mini-game scene code\n\
         ```\n\n\
         ## Visual Design\n\
         Describe the visual elements\n\n\
         ## Scoring System\n\
         Explain the scoring/feedback system\n\n\
         ## Integration Notes\n\
         How to integrate with the main game\n\n\
         ## Accessibility\n\
         Accessibility considerations\n",
        description = game_type.description(),
    )
}
