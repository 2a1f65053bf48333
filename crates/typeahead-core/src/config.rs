//! Layered configuration.
//!
//! An [`EngineConfig`] is resolved once per attached input from three layers,
//! highest precedence first:
//!
//! 1. element attributes (`data-autocomplete`, `data-autocomplete-limit`, ...)
//! 2. the [`InstanceConfig`] shared by a batch of inputs (builder or TOML)
//! 3. built-in defaults
//!
//! The result is validated while it is built and never changes afterwards.
//! Each instance owns its own copy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;
use typeahead_engine::{
    KeyCondition, MappingRule, MappingSet, NAVIGATION_KEYS, Operator, codes, parse_key_code,
};

use crate::behavior::{Behavior, CustomBehavior};
use crate::error::ConfigError;

pub const DEFAULT_DELAY_MS: u64 = 150;
pub const DEFAULT_BLUR_DELAY_MS: u64 = 150;
pub const DEFAULT_LIMIT: i64 = 0;
pub const DEFAULT_HTTP_METHOD: &str = "GET";
pub const DEFAULT_QUERY_PARAM: &str = "q";
pub const DEFAULT_EMPTY_MESSAGE: &str = "No result here";

pub const ATTR_URL: &str = "data-autocomplete";
pub const ATTR_METHOD: &str = "data-autocomplete-method";
pub const ATTR_PARAM_NAME: &str = "data-autocomplete-param-name";
pub const ATTR_LIMIT: &str = "data-autocomplete-limit";
pub const ATTR_EMPTY_MESSAGE: &str = "data-autocomplete-empty-message";
/// Prefix shared by every attribute the engine reads.
pub const ATTR_PREFIX: &str = "data-autocomplete";

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const MAX_MAPPING_RULES: usize = 256;
const MAX_CONDITIONS_PER_RULE: usize = 64;
const CUSTOM_PREFIX: &str = "custom:";

/// Per-element attribute lookup.
pub trait Attributes {
    fn attribute(&self, name: &str) -> Option<String>;
}

impl Attributes for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// An element without attributes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAttributes;

impl Attributes for NoAttributes {
    fn attribute(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Declarative form of a key condition, as written in config files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionSpec {
    pub is: Option<KeySpec>,
    pub from: Option<KeySpec>,
    pub to: Option<KeySpec>,
    #[serde(default)]
    pub not: bool,
}

/// A key given either by code or by name (`13` or `"enter"`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    Code(u32),
    Name(String),
}

impl KeySpec {
    fn resolve(&self) -> Result<u32, String> {
        match self {
            KeySpec::Code(code) => Ok(*code),
            KeySpec::Name(name) => parse_key_code(name),
        }
    }
}

impl ConditionSpec {
    pub fn is(code: u32) -> Self {
        ConditionSpec {
            is: Some(KeySpec::Code(code)),
            ..Default::default()
        }
    }

    pub fn range(from: u32, to: u32) -> Self {
        ConditionSpec {
            from: Some(KeySpec::Code(from)),
            to: Some(KeySpec::Code(to)),
            ..Default::default()
        }
    }

    pub fn not(mut self) -> Self {
        self.not = true;
        self
    }
}

/// Declarative form of a mapping rule.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingSpec {
    pub name: String,
    pub operator: Option<String>,
    pub behavior: String,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

/// Options shared by a batch of inputs. Unset fields fall through to the
/// built-in defaults.
#[derive(Clone, Debug, Default)]
pub struct InstanceConfig {
    pub delay_ms: Option<u64>,
    pub blur_delay_ms: Option<u64>,
    pub limit: Option<i64>,
    pub http_method: Option<String>,
    pub query_param: Option<String>,
    pub url: Option<String>,
    pub empty_message: Option<String>,
    /// Replaces the default header set when present.
    pub headers: Option<IndexMap<String, String>>,
    /// Replaces the default mapping set when present.
    pub mappings: Option<Vec<MappingSpec>>,
    pub(crate) custom: HashMap<String, CustomBehavior>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    delay_ms: Option<u64>,
    blur_delay_ms: Option<u64>,
    limit: Option<i64>,
    http_method: Option<String>,
    query_param: Option<String>,
    url: Option<String>,
    empty_message: Option<String>,
    headers: Option<IndexMap<String, String>>,
    mappings: Option<Vec<MappingSpec>>,
}

impl From<ConfigFile> for InstanceConfig {
    fn from(file: ConfigFile) -> Self {
        InstanceConfig {
            delay_ms: file.delay_ms,
            blur_delay_ms: file.blur_delay_ms,
            limit: file.limit,
            http_method: file.http_method,
            query_param: file.query_param,
            url: file.url,
            empty_message: file.empty_message,
            headers: file.headers,
            mappings: file.mappings,
            custom: HashMap::new(),
        }
    }
}

impl InstanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.into())
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_mappings(mut self, mappings: Vec<MappingSpec>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Register a behavior that mappings can reference as `custom:<name>`.
    pub fn with_custom_behavior(mut self, behavior: CustomBehavior) -> Self {
        self.custom.insert(behavior.name().to_string(), behavior);
        self
    }

    /// Build the mapping set this instance would use.
    pub fn build_mappings(&self) -> Result<MappingSet<Behavior>, ConfigError> {
        match &self.mappings {
            Some(specs) => build_mappings(specs, &self.custom),
            None => default_mappings(),
        }
    }
}

/// Fully resolved, immutable configuration of one attached input.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    delay: Duration,
    blur_delay: Duration,
    limit: i64,
    http_method: String,
    query_param: String,
    url: Option<String>,
    empty_message: String,
    headers: IndexMap<String, String>,
    mappings: MappingSet<Behavior>,
}

impl EngineConfig {
    /// Merge defaults, instance options and element attributes.
    pub fn resolve<A>(instance: &InstanceConfig, attributes: &A) -> Result<EngineConfig, ConfigError>
    where
        A: Attributes + ?Sized,
    {
        let mappings = instance.build_mappings()?;

        let limit = match attributes.attribute(ATTR_LIMIT) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(limit) => Some(limit),
                Err(_) => {
                    warn!(value = %raw, "ignoring non-numeric {}", ATTR_LIMIT);
                    None
                }
            },
            None => None,
        };

        Ok(EngineConfig {
            delay: Duration::from_millis(instance.delay_ms.unwrap_or(DEFAULT_DELAY_MS)),
            blur_delay: Duration::from_millis(
                instance.blur_delay_ms.unwrap_or(DEFAULT_BLUR_DELAY_MS),
            ),
            limit: limit.or(instance.limit).unwrap_or(DEFAULT_LIMIT),
            http_method: attributes
                .attribute(ATTR_METHOD)
                .or_else(|| instance.http_method.clone())
                .unwrap_or_else(|| DEFAULT_HTTP_METHOD.to_string()),
            query_param: attributes
                .attribute(ATTR_PARAM_NAME)
                .or_else(|| instance.query_param.clone())
                .unwrap_or_else(|| DEFAULT_QUERY_PARAM.to_string()),
            url: attributes.attribute(ATTR_URL).or_else(|| instance.url.clone()),
            empty_message: attributes
                .attribute(ATTR_EMPTY_MESSAGE)
                .or_else(|| instance.empty_message.clone())
                .unwrap_or_else(|| DEFAULT_EMPTY_MESSAGE.to_string()),
            headers: instance.headers.clone().unwrap_or_else(default_headers),
            mappings,
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn blur_delay(&self) -> Duration {
        self.blur_delay
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn http_method(&self) -> &str {
        &self.http_method
    }

    pub fn query_param(&self) -> &str {
        &self.query_param
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn empty_message(&self) -> &str {
        &self.empty_message
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn mappings(&self) -> &MappingSet<Behavior> {
        &self.mappings
    }
}

fn default_headers() -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    headers.insert(
        "Content-type".to_string(),
        "application/x-www-form-urlencoded".to_string(),
    );
    headers
}

/// The built-in rule set: select on Enter, navigate on Up/Down, query on
/// anything that is neither Enter nor End/Home/arrows.
pub fn default_mappings() -> Result<MappingSet<Behavior>, ConfigError> {
    let rules = [
        MappingRule::new(
            "Enter",
            Operator::And,
            vec![KeyCondition::exact(codes::ENTER)],
            Behavior::ToggleSelectOnEnter,
        ),
        MappingRule::new(
            "KeyUpAndDown",
            Operator::Or,
            vec![KeyCondition::exact(codes::UP), KeyCondition::exact(codes::DOWN)],
            Behavior::NavigateList,
        ),
        MappingRule::new(
            "AlphaNum",
            Operator::And,
            vec![
                KeyCondition::exact(codes::ENTER).negated(),
                NAVIGATION_KEYS.negated(),
            ],
            Behavior::TriggerQuery,
        ),
    ];
    Ok(MappingSet::from_rules(rules)?)
}

/// Validate mapping specs and turn them into a mapping set.
pub fn build_mappings(
    specs: &[MappingSpec],
    custom: &HashMap<String, CustomBehavior>,
) -> Result<MappingSet<Behavior>, ConfigError> {
    if specs.len() > MAX_MAPPING_RULES {
        return Err(ConfigError::TooManyRules {
            count: specs.len(),
            max: MAX_MAPPING_RULES,
        });
    }
    let mut set = MappingSet::new();
    for spec in specs {
        set.push(build_rule(spec, custom)?)?;
    }
    Ok(set)
}

fn build_rule(
    spec: &MappingSpec,
    custom: &HashMap<String, CustomBehavior>,
) -> Result<MappingRule<Behavior>, ConfigError> {
    let rule = spec.name.trim().to_string();
    if spec.conditions.len() > MAX_CONDITIONS_PER_RULE {
        return Err(ConfigError::TooManyConditions {
            rule,
            count: spec.conditions.len(),
            max: MAX_CONDITIONS_PER_RULE,
        });
    }

    let operator = match spec.operator.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => Operator::And,
        Some(op) if op == "and" => Operator::And,
        Some(op) if op == "or" => Operator::Or,
        Some(op) => {
            return Err(ConfigError::UnknownOperator { rule, operator: op });
        }
    };

    let behavior = resolve_behavior(&spec.behavior, custom).ok_or_else(|| {
        ConfigError::UnknownBehavior {
            rule: rule.clone(),
            behavior: spec.behavior.clone(),
        }
    })?;

    let mut conditions = Vec::with_capacity(spec.conditions.len());
    for (index, condition) in spec.conditions.iter().enumerate() {
        conditions.push(build_condition(&rule, index, condition)?);
    }

    Ok(MappingRule::new(rule, operator, conditions, behavior))
}

fn build_condition(rule: &str, index: usize, spec: &ConditionSpec) -> Result<KeyCondition, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidCondition {
        rule: rule.to_string(),
        index,
        reason,
    };
    let condition = match (&spec.is, &spec.from, &spec.to) {
        (Some(is), None, None) => KeyCondition::exact(is.resolve().map_err(invalid)?),
        (None, Some(from), Some(to)) => {
            let from = from.resolve().map_err(invalid)?;
            let to = to.resolve().map_err(invalid)?;
            KeyCondition::range(from, to).map_err(|source| ConfigError::Rule {
                rule: rule.to_string(),
                source,
            })?
        }
        (None, None, None) => return Err(invalid("expected `is` or `from`/`to`".to_string())),
        (Some(_), _, _) => return Err(invalid("`is` cannot be combined with `from`/`to`".to_string())),
        (None, _, _) => return Err(invalid("a range needs both `from` and `to`".to_string())),
    };
    Ok(condition.with_negate(spec.not))
}

fn resolve_behavior(name: &str, custom: &HashMap<String, CustomBehavior>) -> Option<Behavior> {
    let trimmed = name.trim();
    if let Some(custom_name) = trimmed.strip_prefix(CUSTOM_PREFIX) {
        return custom.get(custom_name.trim()).cloned().map(Behavior::Custom);
    }
    Behavior::builtin(trimmed)
}

/// Load instance options from a TOML file.
///
/// Problems reading or parsing the file are reported as warnings and the
/// built-in defaults are used instead. Semantic problems in the mappings
/// surface later as a [`ConfigError`] when the config is resolved.
pub fn load_instance_config(config_file: Option<&PathBuf>) -> (InstanceConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let explicit = config_file.is_some();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (InstanceConfig::default(), warnings);
    };

    if !path.exists() {
        if explicit {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (InstanceConfig::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(config) => (config, warnings),
        Err(warning) => {
            warnings.push(warning);
            (InstanceConfig::default(), warnings)
        }
    }
}

fn read_config_file(path: &Path) -> Result<InstanceConfig, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    InstanceConfig::from_toml_str(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

/// `<config dir>/typeahead/config.toml`, when the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "typeahead")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
