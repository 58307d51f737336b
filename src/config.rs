use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compose::{DEFAULT_MAX_QUERY_CHARS, DEFAULT_MIN_SCORE, DEFAULT_TOP_K, ResponseOptions};
use crate::core::safety::CommandGuard;
use crate::corpus::{CorpusSource, DEFAULT_SEPARATOR};
use crate::error::{KtError, Result};
use crate::search::{FieldWeights, IndexOptions, SignalRule, SignalTable};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub response: ResponseConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, kt_root: &Path) -> Result<Self> {
        Self::load_with_env(explicit_path, kt_root, |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with environment lookups routed through `lookup`.
    pub fn load_with_env<F>(explicit_path: Option<&Path>, kt_root: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| lookup("KT_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?
                .ok_or_else(|| KtError::MissingConfig(path.display().to_string()))?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(kt_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&EnvSource(&lookup))?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document as a full configuration on top of defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("kt/config.toml"))
    }

    fn load_project(kt_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = kt_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| KtError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| KtError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.corpus {
            self.corpus.merge(patch);
        }
        if let Some(patch) = patch.index {
            self.index.merge(patch);
        }
        if let Some(patch) = patch.matcher {
            self.matcher.merge(patch);
        }
        if let Some(patch) = patch.response {
            self.response.merge(patch);
        }
        if let Some(patch) = patch.safety {
            self.safety.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self, env: &EnvSource<'_>) -> Result<()> {
        if let Some(values) = env.list("KT_CORPUS_PATHS") {
            self.corpus.paths = values;
        }
        if let Some(value) = env.string("KT_CORPUS_SEPARATOR") {
            self.corpus.separator = value;
        }
        if let Some(values) = env.list("KT_CORPUS_EXTENSIONS") {
            self.corpus.extensions = values;
        }

        if let Some(value) = env.parse("KT_INDEX_TITLE_WEIGHT")? {
            self.index.title_weight = value;
        }
        if let Some(value) = env.parse("KT_INDEX_SYMPTOM_WEIGHT")? {
            self.index.symptom_weight = value;
        }
        if let Some(value) = env.parse("KT_INDEX_ROOT_CAUSE_WEIGHT")? {
            self.index.root_cause_weight = value;
        }
        if let Some(value) = env.parse("KT_INDEX_VERIFY_WEIGHT")? {
            self.index.verify_weight = value;
        }
        if let Some(value) = env.parse("KT_INDEX_FIX_WEIGHT")? {
            self.index.fix_weight = value;
        }
        if let Some(value) = env.parse("KT_INDEX_BODY_WEIGHT")? {
            self.index.body_weight = value;
        }

        if let Some(value) = env.parse("KT_MATCHER_MAX_QUERY_CHARS")? {
            self.matcher.max_query_chars = value;
        }

        if let Some(value) = env.parse("KT_RESPONSE_TOP_K")? {
            self.response.top_k = value;
        }
        if let Some(value) = env.parse("KT_RESPONSE_MIN_SCORE")? {
            self.response.min_score = value;
        }

        if let Some(value) = env.bool("KT_SAFETY_ENABLED") {
            self.safety.enabled = value;
        }

        Ok(())
    }

    /// Reject values that would make indexing or matching meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.corpus.separator.is_empty() {
            return Err(KtError::Config("corpus.separator must not be empty".to_string()));
        }
        for (name, weight) in self.index.named_weights() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(KtError::Config(format!(
                    "index.{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if !self.response.min_score.is_finite() || self.response.min_score < 0.0 {
            return Err(KtError::Config(format!(
                "response.min_score must be a non-negative number, got {}",
                self.response.min_score
            )));
        }
        if self.response.top_k == 0 {
            return Err(KtError::Config("response.top_k must be at least 1".to_string()));
        }
        if self.matcher.max_query_chars == 0 {
            return Err(KtError::Config(
                "matcher.max_query_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Where documents are read from; no configured paths means the bundled corpus.
    pub fn corpus_source(&self) -> CorpusSource {
        CorpusSource::from_paths(self.corpus.paths.iter().map(|p| expand_home(p)).collect())
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            weights: self.index.field_weights(),
            signals: SignalTable::with_extra(&self.matcher.extra_signals),
        }
    }

    pub fn response_options(&self) -> Result<ResponseOptions> {
        let guard = if self.safety.enabled {
            Some(CommandGuard::with_extra_patterns(&self.safety.extra_patterns)?)
        } else {
            None
        };
        Ok(ResponseOptions {
            top_k: self.response.top_k,
            min_score: self.response.min_score,
            max_query_chars: self.matcher.max_query_chars,
            guard,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub separator: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

impl CorpusConfig {
    fn merge(&mut self, patch: CorpusPatch) {
        if let Some(values) = patch.paths {
            self.paths = merge_unique(values, &self.paths);
        }
        if let Some(value) = patch.separator {
            self.separator = value;
        }
        if let Some(values) = patch.extensions {
            self.extensions = values;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub title_weight: f64,
    pub symptom_weight: f64,
    pub root_cause_weight: f64,
    pub verify_weight: f64,
    pub fix_weight: f64,
    pub body_weight: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let weights = FieldWeights::default();
        Self {
            title_weight: weights.title,
            symptom_weight: weights.symptoms,
            root_cause_weight: weights.root_cause,
            verify_weight: weights.verify,
            fix_weight: weights.fix,
            body_weight: weights.body,
        }
    }
}

impl IndexConfig {
    fn merge(&mut self, patch: IndexPatch) {
        if let Some(value) = patch.title_weight {
            self.title_weight = value;
        }
        if let Some(value) = patch.symptom_weight {
            self.symptom_weight = value;
        }
        if let Some(value) = patch.root_cause_weight {
            self.root_cause_weight = value;
        }
        if let Some(value) = patch.verify_weight {
            self.verify_weight = value;
        }
        if let Some(value) = patch.fix_weight {
            self.fix_weight = value;
        }
        if let Some(value) = patch.body_weight {
            self.body_weight = value;
        }
    }

    pub const fn field_weights(&self) -> FieldWeights {
        FieldWeights {
            title: self.title_weight,
            symptoms: self.symptom_weight,
            root_cause: self.root_cause_weight,
            verify: self.verify_weight,
            fix: self.fix_weight,
            body: self.body_weight,
        }
    }

    fn named_weights(&self) -> [(&'static str, f64); 6] {
        [
            ("title_weight", self.title_weight),
            ("symptom_weight", self.symptom_weight),
            ("root_cause_weight", self.root_cause_weight),
            ("verify_weight", self.verify_weight),
            ("fix_weight", self.fix_weight),
            ("body_weight", self.body_weight),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub max_query_chars: usize,
    #[serde(default)]
    pub extra_signals: Vec<SignalRule>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            extra_signals: Vec::new(),
        }
    }
}

impl MatcherConfig {
    fn merge(&mut self, patch: MatcherPatch) {
        if let Some(value) = patch.max_query_chars {
            self.max_query_chars = value;
        }
        if let Some(values) = patch.extra_signals {
            self.extra_signals.extend(values);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    pub top_k: usize,
    pub min_score: f64,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl ResponseConfig {
    fn merge(&mut self, patch: ResponsePatch) {
        if let Some(value) = patch.top_k {
            self.top_k = value;
        }
        if let Some(value) = patch.min_score {
            self.min_score = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyConfig {
    pub enabled: bool,
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            extra_patterns: Vec::new(),
        }
    }
}

impl SafetyConfig {
    fn merge(&mut self, patch: SafetyPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(values) = patch.extra_patterns {
            self.extra_patterns = merge_unique(values, &self.extra_patterns);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    corpus: Option<CorpusPatch>,
    index: Option<IndexPatch>,
    matcher: Option<MatcherPatch>,
    response: Option<ResponsePatch>,
    safety: Option<SafetyPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CorpusPatch {
    paths: Option<Vec<String>>,
    separator: Option<String>,
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexPatch {
    title_weight: Option<f64>,
    symptom_weight: Option<f64>,
    root_cause_weight: Option<f64>,
    verify_weight: Option<f64>,
    fix_weight: Option<f64>,
    body_weight: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MatcherPatch {
    max_query_chars: Option<usize>,
    extra_signals: Option<Vec<SignalRule>>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePatch {
    top_k: Option<usize>,
    min_score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SafetyPatch {
    enabled: Option<bool>,
    extra_patterns: Option<Vec<String>>,
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for value in values {
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    merged
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Environment lookups with the parsing rules used for `KT_*` overrides.
struct EnvSource<'a>(&'a dyn Fn(&str) -> Option<String>);

impl EnvSource<'_> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn bool(&self, key: &str) -> Option<bool> {
        self.string(key).map(|value| {
            matches!(
                value.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
                KtError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.string(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}
