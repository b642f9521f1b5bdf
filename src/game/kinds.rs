//! Scene archetypes and generation options

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

macro_rules! named_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum!(SceneType {
    Platformer => "platformer",
    Collection => "collection",
    Puzzle => "puzzle",
    Quiz => "quiz",
    Simulation => "simulation",
});

named_enum!(EnhancementType {
    Visual => "visual",
    Gameplay => "gameplay",
    Accessibility => "accessibility",
    Educational => "educational",
    Performance => "performance",
});

named_enum!(MiniGameType {
    Quiz => "quiz",
    Puzzle => "puzzle",
    Action => "action",
    Simulation => "simulation",
});

named_enum!(Difficulty {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

const SCENE_KEYWORDS: [(SceneType, &[&str]); 4] = [
    (SceneType::Collection, &["benefit", "compensation", "perk"]),
    (SceneType::Quiz, &["quiz", "test", "assessment"]),
    (SceneType::Puzzle, &["policy", "procedure", "rule"]),
    (SceneType::Simulation, &["scenario", "situation", "case"]),
];

impl SceneType {
    /// Pick an archetype from keywords in a section title
    pub fn for_title(title: &str) -> Self {
        let title = title.to_lowercase();
        SCENE_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| title.contains(w)))
            .map_or(SceneType::Platformer, |(scene, _)| *scene)
    }
}

impl EnhancementType {
    /// What the enhancement adds, as described to the model
    pub fn description(self) -> &'static str {
        match self {
            EnhancementType::Visual => "Add animations, particles, effects",
            EnhancementType::Gameplay => "Add new mechanics or challenges",
            EnhancementType::Accessibility => "Improve controls and feedback",
            EnhancementType::Educational => "Strengthen learning elements",
            EnhancementType::Performance => "Optimize for better FPS",
        }
    }
}

impl MiniGameType {
    pub fn description(self) -> &'static str {
        match self {
            MiniGameType::Quiz => "Multiple choice questions with visual feedback",
            MiniGameType::Puzzle => "Drag-and-drop or matching games",
            MiniGameType::Action => "Quick reflex games with concept integration",
            MiniGameType::Simulation => "Role-playing scenarios",
        }
    }
}
