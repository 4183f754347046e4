//! User-defined variables grouped into sections
//!
//! Each section keeps its own ordered list of variable ids. Configuration is
//! typed per section, but every config carries an `extra` map so fields the
//! registry does not know about are stored verbatim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ReportError, Result};
use crate::format::{
    DisplayOptions, FormatOptions, InequalityOperator, RoundingMode, MAX_PRECISION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[serde(alias = "manuals")]
    Manual,
    #[serde(alias = "tables")]
    Table,
    #[serde(alias = "graphs")]
    Graph,
    #[serde(alias = "images")]
    Image,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Manual, Section::Table, Section::Graph, Section::Image];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "manuals" => Some(Section::Manual),
            "table" | "tables" => Some(Section::Table),
            "graph" | "graphs" => Some(Section::Graph),
            "image" | "images" => Some(Section::Image),
            _ => None,
        }
    }

    /// Prefix of the default variable name
    pub fn title(&self) -> &'static str {
        match self {
            Section::Manual => "Manual input",
            Section::Table => "Table",
            Section::Graph => "Graph",
            Section::Image => "Image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Number,
    Date,
    Email,
    Tel,
}

impl InputType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" => Some(InputType::Text),
            "number" => Some(InputType::Number),
            "date" => Some(InputType::Date),
            "email" => Some(InputType::Email),
            "tel" => Some(InputType::Tel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualConfig {
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub prompt: String,
    pub help_text: String,
    pub preview_value: String,
    pub precision: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_inequalities: bool,
    pub inequality_operator: InequalityOperator,
    #[serde(alias = "roundingType")]
    pub rounding_mode: RoundingMode,
    pub sig_figs: Option<i64>,
    #[serde(alias = "rounding")]
    pub decimal_places: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ManualConfig {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            rounding_mode: self.rounding_mode,
            sig_figs: self.sig_figs,
            decimal_places: self.decimal_places,
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            numeric: self.input_type == InputType::Number,
            format: self.format_options(),
            allow_inequalities: self.allow_inequalities,
            operator: self.inequality_operator,
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "type" => {
                let text = coerce_string(field, &value)?;
                self.input_type = InputType::parse(&text)
                    .ok_or_else(|| ReportError::invalid_field(field, format!("unknown type '{}'", text)))?;
            }
            "prompt" => self.prompt = coerce_string(field, &value)?,
            "helpText" => self.help_text = coerce_string(field, &value)?,
            "previewValue" => self.preview_value = coerce_string(field, &value)?,
            "precision" => self.precision = coerce_opt_f64(field, &value)?,
            "min" => self.min = coerce_opt_f64(field, &value)?,
            "max" => self.max = coerce_opt_f64(field, &value)?,
            "allowInequalities" => self.allow_inequalities = coerce_bool(field, &value)?,
            "inequalityOperator" => {
                let text = coerce_string(field, &value)?;
                self.inequality_operator = InequalityOperator::parse(&text).ok_or_else(|| {
                    ReportError::invalid_field(field, format!("unknown operator '{}'", text))
                })?;
            }
            "roundingMode" | "roundingType" => {
                let text = coerce_string(field, &value)?;
                self.rounding_mode = RoundingMode::parse(&text).ok_or_else(|| {
                    ReportError::invalid_field(field, format!("unknown rounding mode '{}'", text))
                })?;
            }
            "sigFigs" => self.sig_figs = coerce_precision(field, &value)?,
            "decimalPlaces" | "rounding" => self.decimal_places = coerce_precision(field, &value)?,
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub headers: Vec<String>,
    pub rows: Vec<Value>,
    pub styling: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableConfig {
    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "headers" => {
                self.headers = serde_json::from_value(value)
                    .map_err(|e| ReportError::invalid_field(field, e.to_string()))?;
            }
            "rows" => self.rows = coerce_array(field, value)?,
            "styling" => self.styling = coerce_object(field, value)?,
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConfig {
    pub chart_type: String,
    pub data: Vec<Value>,
    pub options: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphConfig {
    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "chartType" => self.chart_type = coerce_string(field, &value)?,
            "data" => self.data = coerce_array(field, value)?,
            "options" => self.options = coerce_object(field, value)?,
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageConfig {
    pub url: String,
    pub alt: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImageConfig {
    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        match field {
            "url" => self.url = coerce_string(field, &value)?,
            "alt" => self.alt = coerce_string(field, &value)?,
            "width" => self.width = coerce_opt_f64(field, &value)?,
            "height" => self.height = coerce_opt_f64(field, &value)?,
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

/// Section-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableConfig {
    Manual(ManualConfig),
    Table(TableConfig),
    Graph(GraphConfig),
    Image(ImageConfig),
}

impl VariableConfig {
    pub fn default_for(section: Section) -> Self {
        match section {
            Section::Manual => VariableConfig::Manual(ManualConfig::default()),
            Section::Table => VariableConfig::Table(TableConfig::default()),
            Section::Graph => VariableConfig::Graph(GraphConfig::default()),
            Section::Image => VariableConfig::Image(ImageConfig::default()),
        }
    }

    pub fn as_manual(&self) -> Option<&ManualConfig> {
        match self {
            VariableConfig::Manual(config) => Some(config),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        match self {
            VariableConfig::Manual(c) => c.set_field(field, value),
            VariableConfig::Table(c) => c.set_field(field, value),
            VariableConfig::Graph(c) => c.set_field(field, value),
            VariableConfig::Image(c) => c.set_field(field, value),
        }
    }
}

/// Fields whose change alters a variable's display string
pub fn affects_display(field: &str) -> bool {
    matches!(
        field,
        "type"
            | "previewValue"
            | "allowInequalities"
            | "inequalityOperator"
            | "roundingMode"
            | "roundingType"
            | "sigFigs"
            | "decimalPlaces"
            | "rounding"
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: String,
    #[serde(rename = "sectionId")]
    pub section: Section,
    pub name: String,
    /// 0-based position within the section
    pub order: usize,
    pub config: VariableConfig,
}

impl Variable {
    /// Raw input value; only manual variables carry one
    pub fn raw_value(&self) -> &str {
        match &self.config {
            VariableConfig::Manual(c) => &c.preview_value,
            _ => "",
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        match &self.config {
            VariableConfig::Manual(c) => c.display_options(),
            _ => DisplayOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    variables: HashMap<String, Variable>,
    order: HashMap<Section, Vec<String>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a variable with the section's default config
    ///
    /// The default name is the section title followed by the 1-based position.
    pub fn add_variable(&mut self, section: Section) -> String {
        let id = Uuid::new_v4().to_string();
        let ids = self.order.entry(section).or_default();
        let order = ids.len();
        ids.push(id.clone());

        let variable = Variable {
            id: id.clone(),
            section,
            name: format!("{} {}", section.title(), order + 1),
            order,
            config: VariableConfig::default_for(section),
        };
        debug!(id = %id, ?section, "variable added");
        self.variables.insert(id.clone(), variable);
        id
    }

    /// Remove a variable; bindings and propagated values are the caller's to clear
    pub fn remove_variable(&mut self, id: &str) -> Option<Variable> {
        let variable = self.variables.remove(id)?;
        if let Some(ids) = self.order.get_mut(&variable.section) {
            ids.retain(|v| v != id);
        }
        self.renumber(variable.section);
        debug!(id = %id, "variable removed");
        Some(variable)
    }

    /// Move the entry at `from` to `to`, shifting the entries between
    pub fn reorder(&mut self, section: Section, from: usize, to: usize) -> Result<()> {
        let len = self.order.get(&section).map(Vec::len).unwrap_or(0);
        for index in [from, to] {
            if index >= len {
                return Err(ReportError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        if let Some(ids) = self.order.get_mut(&section) {
            let moved = ids.remove(from);
            ids.insert(to, moved);
        }
        self.renumber(section);
        Ok(())
    }

    /// Merge one field into a variable
    ///
    /// `name` applies to every section; other known fields are coerced to
    /// their typed slot and anything else lands in the config's `extra` map.
    /// On error the variable is left unchanged.
    pub fn update_field(&mut self, id: &str, field: &str, value: Value) -> Result<()> {
        let variable = self
            .variables
            .get_mut(id)
            .ok_or_else(|| ReportError::UnknownVariable(id.to_string()))?;

        if field == "name" {
            variable.name = coerce_string(field, &value)?;
            return Ok(());
        }

        let mut config = variable.config.clone();
        config.set_field(field, value)?;
        variable.config = config;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.variables.contains_key(id)
    }

    /// Variables of one section in display order
    pub fn variables_in(&self, section: Section) -> Vec<&Variable> {
        self.order
            .get(&section)
            .map(|ids| ids.iter().filter_map(|id| self.variables.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every variable, sections in declaration order
    pub fn all(&self) -> Vec<&Variable> {
        Section::ALL
            .iter()
            .flat_map(|section| self.variables_in(*section))
            .collect()
    }

    /// Remove every variable of a section, returning their ids
    pub fn clear_section(&mut self, section: Section) -> Vec<String> {
        let ids = self.order.remove(&section).unwrap_or_default();
        for id in &ids {
            self.variables.remove(id);
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn renumber(&mut self, section: Section) {
        let Some(ids) = self.order.get(&section) else {
            return;
        };
        for (position, id) in ids.iter().enumerate() {
            if let Some(variable) = self.variables.get_mut(id) {
                variable.order = position;
            }
        }
    }
}

fn coerce_string(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ReportError::invalid_field(field, "expected a string")),
    }
}

fn coerce_bool(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(ReportError::invalid_field(field, "expected true or false")),
    }
}

fn coerce_opt_f64(field: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| ReportError::invalid_field(field, format!("'{}' is not a number", s))),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| ReportError::invalid_field(field, "number out of range")),
        _ => Err(ReportError::invalid_field(field, "expected a number")),
    }
}

fn coerce_opt_i64(field: &str, value: &Value) -> Result<Option<i64>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ReportError::invalid_field(field, format!("'{}' is not an integer", s))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Some(f as i64))
                .ok_or_else(|| ReportError::invalid_field(field, "expected an integer")),
        },
        _ => Err(ReportError::invalid_field(field, "expected an integer")),
    }
}

fn coerce_precision(field: &str, value: &Value) -> Result<Option<i64>> {
    match coerce_opt_i64(field, value)? {
        Some(n) if n > MAX_PRECISION => Err(ReportError::invalid_field(
            field,
            format!("{} exceeds the limit of {}", n, MAX_PRECISION),
        )),
        other => Ok(other),
    }
}

fn coerce_array(field: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        _ => Err(ReportError::invalid_field(field, "expected an array")),
    }
}

fn coerce_object(field: &str, value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ReportError::invalid_field(field, "expected an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manual(registry: &VariableRegistry, id: &str) -> ManualConfig {
        registry
            .get(id)
            .and_then(|v| v.config.as_manual())
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_add_variable_assigns_default_names() {
        let mut registry = VariableRegistry::new();
        let a = registry.add_variable(Section::Manual);
        let b = registry.add_variable(Section::Manual);
        let t = registry.add_variable(Section::Table);

        assert_ne!(a, b);
        assert_eq!(registry.get(&a).unwrap().name, "Manual input 1");
        assert_eq!(registry.get(&b).unwrap().name, "Manual input 2");
        assert_eq!(registry.get(&t).unwrap().name, "Table 1");
        assert_eq!(registry.get(&b).unwrap().order, 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_default_config_matches_section() {
        let mut registry = VariableRegistry::new();
        let g = registry.add_variable(Section::Graph);
        let i = registry.add_variable(Section::Image);
        assert!(matches!(registry.get(&g).unwrap().config, VariableConfig::Graph(_)));
        assert!(matches!(registry.get(&i).unwrap().config, VariableConfig::Image(_)));
    }

    #[test]
    fn test_remove_variable_renumbers_section() {
        let mut registry = VariableRegistry::new();
        let a = registry.add_variable(Section::Manual);
        let b = registry.add_variable(Section::Manual);
        let c = registry.add_variable(Section::Manual);

        let removed = registry.remove_variable(&a).unwrap();
        assert_eq!(removed.id, a);
        assert!(registry.remove_variable(&a).is_none());

        let ids: Vec<_> = registry
            .variables_in(Section::Manual)
            .iter()
            .map(|v| (v.id.clone(), v.order))
            .collect();
        assert_eq!(ids, vec![(b, 0), (c, 1)]);
    }

    #[test]
    fn test_reorder_uses_splice_semantics() {
        let mut registry = VariableRegistry::new();
        let ids: Vec<_> = (0..4).map(|_| registry.add_variable(Section::Manual)).collect();

        registry.reorder(Section::Manual, 0, 2).unwrap();
        let order: Vec<_> = registry
            .variables_in(Section::Manual)
            .iter()
            .map(|v| v.id.clone())
            .collect();
        assert_eq!(
            order,
            vec![ids[1].clone(), ids[2].clone(), ids[0].clone(), ids[3].clone()]
        );
        assert_eq!(registry.get(&ids[0]).unwrap().order, 2);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let mut registry = VariableRegistry::new();
        let a = registry.add_variable(Section::Image);
        registry.add_variable(Section::Image);
        registry.reorder(Section::Image, 0, 0).unwrap();
        assert_eq!(registry.variables_in(Section::Image)[0].id, a);
    }

    #[test]
    fn test_reorder_out_of_range_leaves_order() {
        let mut registry = VariableRegistry::new();
        let a = registry.add_variable(Section::Table);
        let err = registry.reorder(Section::Table, 0, 3).unwrap_err();
        assert_eq!(err, ReportError::IndexOutOfRange { index: 3, len: 1 });
        assert_eq!(registry.variables_in(Section::Table)[0].id, a);
        assert!(registry.reorder(Section::Graph, 0, 0).is_err());
    }

    #[test]
    fn test_update_field_coerces_known_fields() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Manual);

        registry.update_field(&id, "type", json!("number")).unwrap();
        registry.update_field(&id, "sigFigs", json!("3")).unwrap();
        registry.update_field(&id, "decimalPlaces", json!(2)).unwrap();
        registry.update_field(&id, "roundingMode", json!("sigfigs")).unwrap();
        registry.update_field(&id, "allowInequalities", json!("true")).unwrap();
        registry.update_field(&id, "inequalityOperator", json!(">")).unwrap();
        registry.update_field(&id, "previewValue", json!(12345)).unwrap();
        registry.update_field(&id, "min", json!("")).unwrap();

        let config = manual(&registry, &id);
        assert_eq!(config.input_type, InputType::Number);
        assert_eq!(config.sig_figs, Some(3));
        assert_eq!(config.decimal_places, Some(2));
        assert_eq!(config.rounding_mode, RoundingMode::Sigfigs);
        assert!(config.allow_inequalities);
        assert_eq!(config.inequality_operator, InequalityOperator::GreaterThan);
        assert_eq!(config.preview_value, "12345");
        assert_eq!(config.min, None);
    }

    #[test]
    fn test_update_field_accepts_legacy_names() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Manual);
        registry.update_field(&id, "roundingType", json!("standard")).unwrap();
        registry.update_field(&id, "rounding", json!(1)).unwrap();

        let config = manual(&registry, &id);
        assert_eq!(config.rounding_mode, RoundingMode::Standard);
        assert_eq!(config.decimal_places, Some(1));
    }

    #[test]
    fn test_update_field_stores_unknown_fields_verbatim() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Table);
        registry
            .update_field(&id, "footnote", json!({"text": "source: survey"}))
            .unwrap();

        match &registry.get(&id).unwrap().config {
            VariableConfig::Table(table) => {
                assert_eq!(table.extra.get("footnote"), Some(&json!({"text": "source: survey"})));
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_update_field_invalid_value_leaves_variable_unchanged() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Manual);
        registry.update_field(&id, "sigFigs", json!(4)).unwrap();

        let err = registry.update_field(&id, "sigFigs", json!("four")).unwrap_err();
        assert!(matches!(err, ReportError::InvalidField { .. }));
        assert_eq!(manual(&registry, &id).sig_figs, Some(4));

        assert!(registry.update_field(&id, "roundingMode", json!("banker")).is_err());
        assert_eq!(manual(&registry, &id).rounding_mode, RoundingMode::None);
    }

    #[test]
    fn test_update_field_rejects_oversized_precision() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Manual);
        registry.update_field(&id, "sigFigs", json!(4)).unwrap();
        registry.update_field(&id, "decimalPlaces", json!(2)).unwrap();

        for (field, value) in [
            ("sigFigs", json!(i64::MAX)),
            ("sigFigs", json!(MAX_PRECISION + 1)),
            ("decimalPlaces", json!(i64::MAX)),
            ("rounding", json!("101")),
        ] {
            let err = registry.update_field(&id, field, value).unwrap_err();
            assert!(matches!(err, ReportError::InvalidField { .. }));
        }
        assert_eq!(manual(&registry, &id).sig_figs, Some(4));
        assert_eq!(manual(&registry, &id).decimal_places, Some(2));

        registry.update_field(&id, "sigFigs", json!(MAX_PRECISION)).unwrap();
        assert_eq!(manual(&registry, &id).sig_figs, Some(MAX_PRECISION));
    }

    #[test]
    fn test_update_field_unknown_variable() {
        let mut registry = VariableRegistry::new();
        let err = registry.update_field("nope", "name", json!("x")).unwrap_err();
        assert_eq!(err, ReportError::UnknownVariable("nope".into()));
    }

    #[test]
    fn test_rename_any_section() {
        let mut registry = VariableRegistry::new();
        let id = registry.add_variable(Section::Image);
        registry.update_field(&id, "name", json!("Logo")).unwrap();
        registry.update_field(&id, "width", json!("120")).unwrap();
        let variable = registry.get(&id).unwrap();
        assert_eq!(variable.name, "Logo");
        match &variable.config {
            VariableConfig::Image(image) => assert_eq!(image.width, Some(120.0)),
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_all_lists_sections_in_order() {
        let mut registry = VariableRegistry::new();
        let img = registry.add_variable(Section::Image);
        let man = registry.add_variable(Section::Manual);
        let ids: Vec<_> = registry.all().iter().map(|v| v.id.clone()).collect();
        assert_eq!(ids, vec![man, img]);
    }

    #[test]
    fn test_clear_section() {
        let mut registry = VariableRegistry::new();
        let a = registry.add_variable(Section::Graph);
        registry.add_variable(Section::Manual);
        assert_eq!(registry.clear_section(Section::Graph), vec![a.clone()]);
        assert!(registry.get(&a).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_manual_config_deserializes_legacy_shape() {
        let config: ManualConfig = serde_json::from_value(json!({
            "type": "number",
            "previewValue": "3.14159",
            "roundingType": "standard",
            "rounding": 2,
            "formattedValue": "3.14"
        }))
        .unwrap();
        assert_eq!(config.rounding_mode, RoundingMode::Standard);
        assert_eq!(config.decimal_places, Some(2));
        assert_eq!(config.extra.get("formattedValue"), Some(&json!("3.14")));
    }

    #[test]
    fn test_section_aliases() {
        let section: Section = serde_json::from_value(json!("manuals")).unwrap();
        assert_eq!(section, Section::Manual);
        assert_eq!(Section::parse("Images"), Some(Section::Image));
        assert_eq!(serde_json::to_value(Section::Table).unwrap(), json!("table"));
    }

    #[test]
    fn test_affects_display() {
        assert!(affects_display("previewValue"));
        assert!(affects_display("roundingType"));
        assert!(!affects_display("prompt"));
        assert!(!affects_display("name"));
    }
}
