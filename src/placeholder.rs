//! # Placeholder Resolution
//!
//! Templates carry strings such as `"{ItemName} ({SKU})"`. At render time
//! every `{Token}` whose name is in the [`PlaceholderContext`] is replaced by
//! its value. Unknown tokens stay in the output byte for byte, which is what
//! the editor preview relies on to show unresolved fields.
//!
//! Resolution is a single left-to-right pass: a substituted value is never
//! scanned again, so data containing braces cannot trigger further lookups.
//!
//! ## Vocabularies
//!
//! | Template type | Tokens |
//! |---------------|--------|
//! | Items | ItemUUID, ItemName, SKU, Price, Quantity, Category, LocationName, RackName, Drawer |
//! | Locations | LocationUUID, LocationName, LocationInfo, ItemCount |
//! | Racks | RackUUID, RackName, Capacity, ItemCount |
//!
//! ## Example
//!
//! ```
//! use etiqueta::placeholder::{resolve, BoundEntity, CurrencyFormat, ItemRecord};
//!
//! let item = ItemRecord::new("AB12CD34EF56", "Resistor 10k");
//! let ctx = BoundEntity::Item(item).context(&CurrencyFormat::default());
//! assert_eq!(resolve(&ctx, "{ItemName} / {Unknown}"), "Resistor 10k / {Unknown}");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EtiquetaError;
use crate::template::TemplateType;

const ITEM_TOKENS: &[&str] = &[
    "ItemUUID",
    "ItemName",
    "SKU",
    "Price",
    "Quantity",
    "Category",
    "LocationName",
    "RackName",
    "Drawer",
];

const LOCATION_TOKENS: &[&str] = &["LocationUUID", "LocationName", "LocationInfo", "ItemCount"];

const RACK_TOKENS: &[&str] = &["RackUUID", "RackName", "Capacity", "ItemCount"];

/// Token names valid for a template type.
pub fn vocabulary(template_type: TemplateType) -> &'static [&'static str] {
    match template_type {
        TemplateType::Items => ITEM_TOKENS,
        TemplateType::Locations => LOCATION_TOKENS,
        TemplateType::Racks => RACK_TOKENS,
    }
}

/// Token names wrapped in braces, as shown in the template editor.
pub fn placeholders(template_type: TemplateType) -> Vec<String> {
    vocabulary(template_type)
        .iter()
        .map(|token| format!("{{{}}}", token))
        .collect()
}

/// Flat token table for one render call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceholderContext {
    values: BTreeMap<String, String>,
}

impl PlaceholderContext {
    /// An empty context: every token stays unresolved.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from a caller-supplied snapshot, keeping only the
    /// tokens of the template type's vocabulary.
    pub fn from_snapshot(
        template_type: TemplateType,
        snapshot: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let allowed = vocabulary(template_type);
        let values = snapshot
            .into_iter()
            .filter(|(key, _)| allowed.contains(&key.as_str()))
            .collect();
        Self { values }
    }

    /// Every token maps to its own `{Token}` text.
    pub fn unresolved(template_type: TemplateType) -> Self {
        let values = vocabulary(template_type)
            .iter()
            .map(|token| (token.to_string(), format!("{{{}}}", token)))
            .collect();
        Self { values }
    }

    /// Every token maps to `Sample <Token>`.
    pub fn sample(template_type: TemplateType) -> Self {
        let values = vocabulary(template_type)
            .iter()
            .map(|token| (token.to_string(), format!("Sample {}", token)))
            .collect();
        Self { values }
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Substitute every known `{Token}` in `input`.
pub fn resolve(context: &PlaceholderContext, input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let token = after_open
            .find(['{', '}'])
            .filter(|&end| after_open.as_bytes()[end] == b'}')
            .map(|end| &after_open[..end]);

        match token.and_then(|name| context.get(name).map(|value| (name, value))) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after_open[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Whether `data` is a bare, unresolved `{Token}`.
pub fn is_placeholder_token(data: &str) -> bool {
    data.len() >= 2 && data.starts_with('{') && data.ends_with('}')
}

// ============================================================================
// TYPED ENTITIES
// ============================================================================

/// How prices are printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_places: usize,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            decimal_places: 2,
        }
    }
}

impl CurrencyFormat {
    pub fn format(&self, amount: f64) -> String {
        format!("{}{:.*}", self.symbol, self.decimal_places, amount)
    }
}

/// Inventory item snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub rack_name: Option<String>,
    #[serde(default)]
    pub drawer: Option<String>,
}

impl ItemRecord {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Storage location snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub item_count: u64,
}

/// Rack snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RackRecord {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub rows: u32,
    #[serde(default)]
    pub cols: u32,
    #[serde(default)]
    pub item_count: u64,
}

/// An entity a label is printed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoundEntity {
    Item(ItemRecord),
    Location(LocationRecord),
    Rack(RackRecord),
}

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl BoundEntity {
    pub fn template_type(&self) -> TemplateType {
        match self {
            BoundEntity::Item(_) => TemplateType::Items,
            BoundEntity::Location(_) => TemplateType::Locations,
            BoundEntity::Rack(_) => TemplateType::Racks,
        }
    }

    /// Identifier used in download filenames.
    pub fn identifier(&self) -> &str {
        match self {
            BoundEntity::Item(item) => &item.uuid,
            BoundEntity::Location(location) => &location.uuid,
            BoundEntity::Rack(rack) => &rack.uuid,
        }
    }

    /// Stringify every field into the token table.
    pub fn context(&self, currency: &CurrencyFormat) -> PlaceholderContext {
        let pairs: Vec<(&str, String)> = match self {
            BoundEntity::Item(item) => vec![
                ("ItemUUID", item.uuid.clone()),
                ("ItemName", item.name.clone()),
                ("SKU", or_empty(&item.sku)),
                (
                    "Price",
                    item.price
                        .filter(|p| *p != 0.0)
                        .map(|p| currency.format(p))
                        .unwrap_or_default(),
                ),
                ("Quantity", item.quantity.to_string()),
                ("Category", or_empty(&item.category)),
                ("LocationName", or_empty(&item.location_name)),
                ("RackName", or_empty(&item.rack_name)),
                ("Drawer", or_empty(&item.drawer)),
            ],
            BoundEntity::Location(location) => vec![
                ("LocationUUID", location.uuid.clone()),
                ("LocationName", location.name.clone()),
                ("LocationInfo", or_empty(&location.info)),
                ("ItemCount", location.item_count.to_string()),
            ],
            BoundEntity::Rack(rack) => vec![
                ("RackUUID", rack.uuid.clone()),
                ("RackName", rack.name.clone()),
                (
                    "Capacity",
                    (u64::from(rack.rows) * u64::from(rack.cols)).to_string(),
                ),
                ("ItemCount", rack.item_count.to_string()),
            ],
        };

        let mut context = PlaceholderContext::empty();
        for (token, value) in pairs {
            context.insert(token, value);
        }
        context
    }
}

/// Entity data as received from callers: a typed record
/// (`{"kind": "item", ...}`) or a flat token snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityPayload {
    Typed(BoundEntity),
    Snapshot(BTreeMap<String, String>),
}

/// Token that identifies an entity of a template type.
fn identifier_token(template_type: TemplateType) -> &'static str {
    match template_type {
        TemplateType::Items => "ItemUUID",
        TemplateType::Locations => "LocationUUID",
        TemplateType::Racks => "RackUUID",
    }
}

impl EntityPayload {
    /// Token table and filename identifier for a template of
    /// `template_type`. Typed records must be of that type.
    pub fn bind(
        self,
        template_type: TemplateType,
        currency: &CurrencyFormat,
    ) -> Result<(PlaceholderContext, String), EtiquetaError> {
        match self {
            EntityPayload::Typed(entity) => {
                if entity.template_type() != template_type {
                    return Err(EtiquetaError::TemplateTypeMismatch {
                        expected: template_type,
                        actual: entity.template_type(),
                    });
                }
                Ok((entity.context(currency), entity.identifier().to_string()))
            }
            EntityPayload::Snapshot(values) => {
                let identifier = values
                    .get(identifier_token(template_type))
                    .filter(|v| !v.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "sticker".to_string());
                Ok((PlaceholderContext::from_snapshot(template_type, values), identifier))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item_context() -> PlaceholderContext {
        let item = ItemRecord {
            uuid: "AB12CD34EF56".into(),
            name: "Resistor 10k".into(),
            sku: Some("R-10K".into()),
            price: Some(0.1),
            quantity: 250,
            category: Some("Passives".into()),
            location_name: None,
            rack_name: Some("Rack A".into()),
            drawer: Some("3".into()),
        };
        BoundEntity::Item(item).context(&CurrencyFormat::default())
    }

    #[test]
    fn test_known_tokens_leave_no_braces() {
        let ctx = item_context();
        let out = resolve(&ctx, "{ItemName} [{SKU}] x{Quantity} @ {Price} {RackName}/{Drawer}");
        assert_eq!(out, "Resistor 10k [R-10K] x250 @ $0.10 Rack A/3");
        assert!(!out.contains('{') && !out.contains('}'));
    }

    #[test]
    fn test_unknown_token_is_verbatim() {
        let ctx = item_context();
        assert_eq!(resolve(&ctx, "{Nope} and {ItemName}"), "{Nope} and Resistor 10k");
        assert_eq!(resolve(&ctx, "{RackUUID}"), "{RackUUID}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut ctx = PlaceholderContext::empty();
        ctx.insert("A", "{B}");
        ctx.insert("B", "boom");
        assert_eq!(resolve(&ctx, "{A}"), "{B}");

        ctx.insert("Self", "{Self}");
        assert_eq!(resolve(&ctx, "{Self}{Self}"), "{Self}{Self}");
    }

    #[test]
    fn test_stray_braces() {
        let ctx = item_context();
        assert_eq!(resolve(&ctx, "{{ItemName}}"), "{Resistor 10k}");
        assert_eq!(resolve(&ctx, "a { b"), "a { b");
        assert_eq!(resolve(&ctx, "}{"), "}{");
        assert_eq!(resolve(&ctx, "{}"), "{}");
        assert_eq!(resolve(&ctx, "ünï{ItemName}çødé"), "ünïResistor 10kçødé");
    }

    #[test]
    fn test_missing_optionals_are_empty() {
        let ctx = item_context();
        assert_eq!(ctx.get("LocationName"), Some(""));

        let bare = BoundEntity::Item(ItemRecord::new("u", "n")).context(&CurrencyFormat::default());
        assert_eq!(bare.get("Price"), Some(""));
        assert_eq!(bare.get("Quantity"), Some("0"));
    }

    #[test]
    fn test_rack_capacity_and_location() {
        let rack = BoundEntity::Rack(RackRecord {
            uuid: "r1".into(),
            name: "Wall".into(),
            rows: 4,
            cols: 6,
            item_count: 9,
        });
        let ctx = rack.context(&CurrencyFormat::default());
        assert_eq!(resolve(&ctx, "{RackName}: {ItemCount}/{Capacity}"), "Wall: 9/24");
        assert_eq!(rack.template_type(), TemplateType::Racks);

        let location = BoundEntity::Location(LocationRecord {
            uuid: "l1".into(),
            name: "Basement".into(),
            info: None,
            item_count: 2,
        });
        let ctx = location.context(&CurrencyFormat::default());
        assert_eq!(ctx.len(), LOCATION_TOKENS.len());
    }

    #[test]
    fn test_currency_format() {
        let euro = CurrencyFormat {
            symbol: "€".into(),
            decimal_places: 3,
        };
        assert_eq!(euro.format(1.5), "€1.500");
    }

    #[test]
    fn test_snapshot_drops_foreign_keys() {
        let snapshot = vec![
            ("RackName".to_string(), "A".to_string()),
            ("ItemName".to_string(), "leak".to_string()),
        ];
        let ctx = PlaceholderContext::from_snapshot(TemplateType::Racks, snapshot);
        assert_eq!(resolve(&ctx, "{RackName}{ItemName}"), "A{ItemName}");
    }

    #[test]
    fn test_unresolved_and_sample_contexts() {
        let ctx = PlaceholderContext::unresolved(TemplateType::Items);
        assert_eq!(resolve(&ctx, "{ItemUUID}"), "{ItemUUID}");

        let ctx = PlaceholderContext::sample(TemplateType::Locations);
        assert_eq!(resolve(&ctx, "{LocationName}"), "Sample LocationName");
    }

    #[test]
    fn test_entity_json() {
        let json = r#"{"kind": "item", "uuid": "X1", "name": "Fuse", "price": 2}"#;
        let entity: BoundEntity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.identifier(), "X1");
        assert_eq!(entity.context(&CurrencyFormat::default()).get("Price"), Some("$2.00"));
    }

    #[test]
    fn test_payload_binding() {
        let typed: EntityPayload =
            serde_json::from_str(r#"{"kind": "rack", "uuid": "R1", "name": "Top", "rows": 3, "cols": 4}"#)
                .unwrap();
        let (ctx, id) = typed
            .clone()
            .bind(TemplateType::Racks, &CurrencyFormat::default())
            .unwrap();
        assert_eq!(id, "R1");
        assert_eq!(ctx.get("Capacity"), Some("12"));
        assert!(matches!(
            typed.bind(TemplateType::Items, &CurrencyFormat::default()),
            Err(EtiquetaError::TemplateTypeMismatch { .. })
        ));

        let flat: EntityPayload =
            serde_json::from_str(r#"{"LocationName": "Shed", "ItemName": "dropped"}"#).unwrap();
        let (ctx, id) = flat
            .bind(TemplateType::Locations, &CurrencyFormat::default())
            .unwrap();
        assert_eq!(id, "sticker");
        assert_eq!(ctx.get("LocationName"), Some("Shed"));
        assert_eq!(ctx.get("ItemName"), None);
    }

    #[test]
    fn test_is_placeholder_token() {
        assert!(is_placeholder_token("{ItemUUID}"));
        assert!(!is_placeholder_token("{ItemUUID"));
        assert!(!is_placeholder_token("{"));
        assert!(!is_placeholder_token("5012345678900"));
    }
}
