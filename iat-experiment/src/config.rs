use iat_core::{BlockSpec, CategoryId, CriticalPair, StimulusCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_CONFIG: &str = include_str!("../configs/ai_perception.json");

/// Rejected configuration. Block numbers are 1-based.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration defines no stimulus categories")]
    NoCategories,

    #[error("configuration defines no blocks")]
    NoBlocks,

    #[error("category `{0}` is defined more than once")]
    DuplicateCategory(CategoryId),

    #[error("block {block} references unknown category `{category}`")]
    UnknownCategory { block: usize, category: CategoryId },

    #[error("block {block} must have a positive trial count")]
    ZeroTrials { block: usize },

    #[error("expected exactly two critical blocks, found {0}")]
    CriticalBlockCount(usize),

    #[error("block {block}: stimulus category `{category}` is assigned to neither side")]
    Unassigned { block: usize, category: CategoryId },

    #[error("block {block}: category `{category}` is assigned to both sides")]
    AmbiguousSide { block: usize, category: CategoryId },

    #[error("block {block} has no stimulus items to draw from")]
    EmptyPool { block: usize },

    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawExperimentConfig {
    categories: Vec<StimulusCategory>,
    blocks: Vec<BlockSpec>,
}

/// Validated, immutable experiment definition: the category mapping and the
/// ordered block sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExperimentConfig", into = "RawExperimentConfig")]
pub struct ExperimentConfig {
    categories: Vec<StimulusCategory>,
    blocks: Vec<BlockSpec>,
    critical: CriticalPair,
}

impl ExperimentConfig {
    pub fn new(
        categories: Vec<StimulusCategory>,
        blocks: Vec<BlockSpec>,
    ) -> Result<Self, ConfigError> {
        let critical = validate(&categories, &blocks)?;
        Ok(Self {
            categories,
            blocks,
            critical,
        })
    }

    /// The AI-perception IAT: four categories, seven blocks, blocks 4 and 7 critical.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_CONFIG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn categories(&self) -> &[StimulusCategory] {
        &self.categories
    }

    pub fn category(&self, id: &CategoryId) -> Option<&StimulusCategory> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Display label, falling back to the raw id.
    pub fn label<'a>(&'a self, id: &'a CategoryId) -> &'a str {
        self.category(id).map_or(id.as_str(), |c| c.label.as_str())
    }

    pub fn labels<'a>(&'a self, ids: &'a [CategoryId]) -> Vec<&'a str> {
        ids.iter().map(|id| self.label(id)).collect()
    }

    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> &BlockSpec {
        &self.blocks[index]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn critical_pair(&self) -> CriticalPair {
        self.critical
    }

    /// Total trials across all blocks, not counting retries.
    pub fn total_trials(&self) -> usize {
        self.blocks.iter().map(|b| b.trials).sum()
    }
}

impl TryFrom<RawExperimentConfig> for ExperimentConfig {
    type Error = ConfigError;

    fn try_from(raw: RawExperimentConfig) -> Result<Self, Self::Error> {
        Self::new(raw.categories, raw.blocks)
    }
}

impl From<ExperimentConfig> for RawExperimentConfig {
    fn from(config: ExperimentConfig) -> Self {
        Self {
            categories: config.categories,
            blocks: config.blocks,
        }
    }
}

fn validate(
    categories: &[StimulusCategory],
    blocks: &[BlockSpec],
) -> Result<CriticalPair, ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::NoCategories);
    }
    if blocks.is_empty() {
        return Err(ConfigError::NoBlocks);
    }

    let mut known = HashSet::new();
    for category in categories {
        if !known.insert(&category.id) {
            return Err(ConfigError::DuplicateCategory(category.id.clone()));
        }
    }

    for (index, block) in blocks.iter().enumerate() {
        let number = index + 1;

        let referenced = block.left.iter().chain(&block.right).chain(&block.stimuli);
        for id in referenced {
            if !known.contains(id) {
                return Err(ConfigError::UnknownCategory {
                    block: number,
                    category: id.clone(),
                });
            }
        }

        if block.trials == 0 {
            return Err(ConfigError::ZeroTrials { block: number });
        }

        if let Some(id) = block.left.iter().find(|id| block.right.contains(id)) {
            return Err(ConfigError::AmbiguousSide {
                block: number,
                category: id.clone(),
            });
        }

        if let Some(id) = block.stimuli.iter().find(|id| block.side_of(id).is_none()) {
            return Err(ConfigError::Unassigned {
                block: number,
                category: id.clone(),
            });
        }

        let pool: usize = block
            .stimuli
            .iter()
            .filter_map(|id| categories.iter().find(|c| &c.id == id))
            .map(|c| c.items.len())
            .sum();
        if pool == 0 {
            return Err(ConfigError::EmptyPool { block: number });
        }
    }

    let critical: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_critical())
        .map(|(i, _)| i + 1)
        .collect();
    match critical.as_slice() {
        &[congruent, incongruent] => Ok(CriticalPair {
            congruent,
            incongruent,
        }),
        other => Err(ConfigError::CriticalBlockCount(other.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iat_core::BlockKind;
    use pretty_assertions::assert_eq;

    fn ids(names: &[&str]) -> Vec<CategoryId> {
        names.iter().map(|n| CategoryId::new(*n)).collect()
    }

    fn categories() -> Vec<StimulusCategory> {
        vec![
            StimulusCategory::new("useful", "Useful", ["hammer", "ladder"]),
            StimulusCategory::new("useless", "Useless", ["chocolate teapot"]),
        ]
    }

    fn block(kind: BlockKind) -> BlockSpec {
        BlockSpec {
            left: ids(&["useful"]),
            right: ids(&["useless"]),
            stimuli: ids(&["useful", "useless"]),
            trials: 4,
            kind,
        }
    }

    fn blocks() -> Vec<BlockSpec> {
        vec![
            block(BlockKind::Practice),
            block(BlockKind::Critical),
            block(BlockKind::Critical),
        ]
    }

    #[test]
    fn builtin_config_is_valid() {
        let config = ExperimentConfig::builtin().unwrap();
        assert_eq!(config.block_count(), 7);
        assert_eq!(config.categories().len(), 4);
        assert_eq!(
            config.critical_pair(),
            CriticalPair {
                congruent: 4,
                incongruent: 7
            }
        );
        assert_eq!(config.total_trials(), 16 * 5 + 32 * 2);
        assert_eq!(config.label(&"chance".into()), "Chance");
    }

    #[test]
    fn builtin_blocks_partition_their_stimuli() {
        let config = ExperimentConfig::builtin().unwrap();
        for block in config.blocks() {
            for id in &block.stimuli {
                let on_left = block.left.contains(id);
                let on_right = block.right.contains(id);
                assert!(on_left ^ on_right, "{id} must sit on exactly one side");
            }
        }
    }

    #[test]
    fn accepts_minimal_valid_config() {
        let config = ExperimentConfig::new(categories(), blocks()).unwrap();
        assert_eq!(
            config.critical_pair(),
            CriticalPair {
                congruent: 2,
                incongruent: 3
            }
        );
        assert_eq!(config.label(&"missing".into()), "missing");
    }

    #[test]
    fn rejects_unknown_category() {
        let mut blocks = blocks();
        blocks[1].stimuli.push("broken".into());
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownCategory { block: 2, ref category } if category.as_str() == "broken"
        ));
    }

    #[test]
    fn rejects_zero_trials() {
        let mut blocks = blocks();
        blocks[0].trials = 0;
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTrials { block: 1 }));
    }

    #[test]
    fn rejects_wrong_critical_count() {
        let mut blocks = blocks();
        blocks[2].kind = BlockKind::Practice;
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(err, ConfigError::CriticalBlockCount(1)));

        let mut blocks = self::blocks();
        blocks[0].kind = BlockKind::Critical;
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(err, ConfigError::CriticalBlockCount(3)));
    }

    #[test]
    fn rejects_broken_partition() {
        let mut blocks = blocks();
        blocks[0].right.push("useful".into());
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousSide { block: 1, .. }));

        let mut blocks = self::blocks();
        blocks[1].right.clear();
        let err = ExperimentConfig::new(categories(), blocks).unwrap_err();
        assert!(matches!(err, ConfigError::Unassigned { block: 2, .. }));
    }

    #[test]
    fn rejects_duplicates_and_empty_pools() {
        let mut cats = categories();
        cats.push(StimulusCategory::new("useful", "Again", ["x"]));
        let err = ExperimentConfig::new(cats, blocks()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCategory(_)));

        let cats = vec![
            StimulusCategory::new("useful", "Useful", Vec::<String>::new()),
            StimulusCategory::new("useless", "Useless", Vec::<String>::new()),
        ];
        let err = ExperimentConfig::new(cats, blocks()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPool { block: 1 }));
    }

    #[test]
    fn rejects_empty_config() {
        assert!(matches!(
            ExperimentConfig::new(Vec::new(), blocks()),
            Err(ConfigError::NoCategories)
        ));
        assert!(matches!(
            ExperimentConfig::new(categories(), Vec::new()),
            Err(ConfigError::NoBlocks)
        ));
    }

    #[test]
    fn deserializing_runs_validation() {
        let json = r#"{
            "categories": [{"id": "a", "label": "A", "items": ["x"]}],
            "blocks": [{"left": ["a"], "right": [], "stimuli": ["a"], "trials": 0}]
        }"#;
        let err = ExperimentConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("positive trial count"), "{err}");
    }

    #[test]
    fn serializes_back_to_the_raw_shape() {
        let config = ExperimentConfig::new(categories(), blocks()).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("critical\":{"));
        let back = ExperimentConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExperimentConfig::from_path("/nonexistent/iat.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/iat.json"));
    }
}
