//! Tool palette: categories, node types and the built-in tool list.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{CatalogError, Integration};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Cosmetic grouping of a node; drives the icon colour only.
///
/// Unknown strings deserialize to [`Category::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    Trigger,
    Ai,
    Logic,
    Integration,
    #[default]
    Custom,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Trigger,
        Self::Ai,
        Self::Logic,
        Self::Integration,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Ai => "ai",
            Self::Logic => "logic",
            Self::Integration => "integration",
            Self::Custom => "custom",
        }
    }

    /// Icon background colour.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Trigger => "#8bc34a",
            Self::Ai => "#00bcd4",
            Self::Logic => "#ff9800",
            Self::Integration => "#9c27b0",
            Self::Custom => "#667eea",
        }
    }

    /// Icon used when a node is restored without one.
    pub fn default_icon(&self) -> &'static str {
        match self {
            Self::Trigger => "fas fa-bolt",
            Self::Ai => "fas fa-robot",
            Self::Logic => "fas fa-random",
            Self::Integration => "fas fa-plug",
            Self::Custom => "fas fa-puzzle-piece",
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trigger" => Self::Trigger,
            "ai" => Self::Ai,
            "logic" => Self::Logic,
            "integration" => Self::Integration,
            _ => Self::Custom,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Config fields
// ---------------------------------------------------------------------------

/// Input widget used for a config field in the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
    Email,
    /// Free text that may contain `{{nodeId.path}}` references.
    Template,
    /// One of a fixed set of options.
    Select(&'static [&'static str]),
}

/// One configuration field of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: &'static str,
}

const fn field(
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
    default: &'static str,
) -> ConfigField {
    ConfigField { key, label, kind, default }
}

const WRITE_MODES: &[&str] = &["json", "row", "column", "cell"];
const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

const SHEET_READ_FIELDS: &[ConfigField] = &[
    field("sheetId", "Spreadsheet ID", FieldKind::Text, ""),
    field("range", "Range", FieldKind::Text, "A1:Z100"),
];
const SHEET_WRITE_FIELDS: &[ConfigField] = &[
    field("sheetId", "Spreadsheet ID", FieldKind::Text, ""),
    field("range", "Range", FieldKind::Text, "A1"),
    field("data", "Data", FieldKind::Template, ""),
    field("writeMode", "Write mode", FieldKind::Select(WRITE_MODES), "json"),
];
const DOC_READ_FIELDS: &[ConfigField] = &[field("docId", "Document ID", FieldKind::Text, "")];
const WEBHOOK_FIELDS: &[ConfigField] = &[
    field("url", "Webhook URL", FieldKind::Url, ""),
    field("method", "Method", FieldKind::Select(HTTP_METHODS), "POST"),
    field("body", "Body", FieldKind::Template, "{}"),
];
const CHAT_FIELDS: &[ConfigField] = &[
    field("url", "Webhook URL", FieldKind::Url, ""),
    field("message", "Message", FieldKind::Template, ""),
];
const GMAIL_FIELDS: &[ConfigField] = &[
    field("to", "Recipient", FieldKind::Email, ""),
    field("subject", "Subject", FieldKind::Text, "Workflow Notification"),
    field("title", "Title", FieldKind::Text, ""),
    field("body", "Body", FieldKind::Template, ""),
];
const FILTER_FIELDS: &[ConfigField] = &[field("keyword", "Keyword", FieldKind::Text, "")];

// ---------------------------------------------------------------------------
// NodeType
// ---------------------------------------------------------------------------

/// Semantic kind of a node. Decides which config fields are shown and
/// what the execution backend does with the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    GoogleSheetRead,
    GoogleSheetWrite,
    GoogleDocRead,
    MakeWebhook,
    SlackNotify,
    DiscordNotify,
    GmailSend,
    Filter,
    #[default]
    Custom,
    /// A type this catalogue does not know; kept verbatim.
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::GoogleSheetRead => "google_sheet_read",
            Self::GoogleSheetWrite => "google_sheet_write",
            Self::GoogleDocRead => "google_doc_read",
            Self::MakeWebhook => "make_webhook",
            Self::SlackNotify => "slack_notify",
            Self::DiscordNotify => "discord_notify",
            Self::GmailSend => "gmail_send",
            Self::Filter => "filter",
            Self::Custom => "custom",
            Self::Other(s) => s,
        }
    }

    /// Best-effort mapping from a free-text kind ("Read spreadsheet",
    /// "send mail") to a known type.
    pub fn infer(label: &str) -> Self {
        Self::recognize(label).unwrap_or(Self::Custom)
    }

    /// Known type mentioned by a free-text kind, if any.
    pub fn recognize(label: &str) -> Option<Self> {
        let t = label.to_ascii_lowercase();
        let kind = if t.contains("sheet") {
            Self::GoogleSheetRead
        } else if t.contains("mail") {
            Self::GmailSend
        } else if t.contains("slack") {
            Self::SlackNotify
        } else if t.contains("discord") {
            Self::DiscordNotify
        } else if t.contains("webhook") {
            Self::MakeWebhook
        } else if t.contains("filter") {
            Self::Filter
        } else {
            return None;
        };
        Some(kind)
    }

    /// Resolve a type read from a stored document: known names are kept,
    /// free-text kinds are mapped with [`NodeType::recognize`] and anything
    /// else stays verbatim.
    pub fn resolve(self) -> Self {
        match self {
            Self::Other(label) => Self::recognize(&label).unwrap_or(Self::Other(label)),
            known => known,
        }
    }

    /// Integration that must be connected for this node to run.
    pub fn required_integration(&self) -> Option<Integration> {
        match self {
            Self::GoogleSheetRead | Self::GoogleSheetWrite | Self::GoogleDocRead | Self::GmailSend => {
                Some(Integration::Google)
            }
            _ => None,
        }
    }

    pub fn config_fields(&self) -> &'static [ConfigField] {
        match self {
            Self::GoogleSheetRead => SHEET_READ_FIELDS,
            Self::GoogleSheetWrite => SHEET_WRITE_FIELDS,
            Self::GoogleDocRead => DOC_READ_FIELDS,
            Self::MakeWebhook => WEBHOOK_FIELDS,
            Self::SlackNotify | Self::DiscordNotify => CHAT_FIELDS,
            Self::GmailSend => GMAIL_FIELDS,
            Self::Filter => FILTER_FIELDS,
            Self::Custom | Self::Other(_) => &[],
        }
    }

    /// Config map pre-filled with every field's default value.
    pub fn default_config(&self) -> Map<String, Value> {
        self.config_fields()
            .iter()
            .map(|f| (f.key.to_string(), Value::String(f.default.to_string())))
            .collect()
    }

    /// Check select-style fields against their allowed options.
    ///
    /// Keys the type does not declare are accepted untouched; `config` is an
    /// open map.
    pub fn validate_config(&self, config: &Map<String, Value>) -> Result<(), CatalogError> {
        for f in self.config_fields() {
            let FieldKind::Select(options) = f.kind else {
                continue;
            };
            let Some(value) = config.get(f.key) else {
                continue;
            };
            let text = value.as_str().unwrap_or_default();
            if !options.contains(&text) {
                return Err(CatalogError::InvalidFieldValue {
                    field: f.key.to_string(),
                    value: value.to_string(),
                    expected: options.join(", "),
                });
            }
        }
        Ok(())
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        match s {
            "google_sheet_read" => Self::GoogleSheetRead,
            "google_sheet_write" => Self::GoogleSheetWrite,
            "google_doc_read" => Self::GoogleDocRead,
            "make_webhook" => Self::MakeWebhook,
            "slack_notify" => Self::SlackNotify,
            "discord_notify" => Self::DiscordNotify,
            "gmail_send" => Self::GmailSend,
            "filter" => Self::Filter,
            "" | "custom" => Self::Custom,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ToolDescriptor
// ---------------------------------------------------------------------------

/// What the palette hands to the canvas when a tool is dropped.
///
/// Missing fields take the palette defaults, so a bare `{}` drag payload
/// still produces a usable custom block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

impl Default for ToolDescriptor {
    fn default() -> Self {
        Self {
            name: "Custom block".into(),
            description: "Describe this step...".into(),
            icon: Category::Custom.default_icon().into(),
            category: Category::Custom,
            node_type: NodeType::Custom,
        }
    }
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        category: Category,
        node_type: NodeType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            category,
            node_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The searchable list of tools shown in the palette.
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<ToolDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// The tools shipped with the builder.
    pub fn builtin() -> Self {
        use Category as C;
        let t = ToolDescriptor::new;
        Self::new(vec![
            t("New order", "Sync new orders from the POS every five minutes.", "fas fa-shopping-basket", C::Trigger, NodeType::Custom),
            t("Webhook", "Receive events from the POS", "fas fa-bolt", C::Trigger, NodeType::MakeWebhook),
            t("AI summary", "Summarise incoming records with an AI model.", "fas fa-robot", C::Ai, NodeType::Custom),
            t("Logic - Filter", "Filter data stream", "fas fa-filter", C::Logic, NodeType::Filter),
            t("Google Sheets - Read", "Read rows from a Google Sheet", "fas fa-table", C::Integration, NodeType::GoogleSheetRead),
            t("Google Sheets - Write", "Append data to Google Sheet", "fas fa-table", C::Integration, NodeType::GoogleSheetWrite),
            t("Google Docs - Read", "Read the text of a Google Doc", "fas fa-file-alt", C::Integration, NodeType::GoogleDocRead),
            t("Gmail - Send Email", "Send personalized email", "fas fa-envelope", C::Integration, NodeType::GmailSend),
            t("Make - Webhook", "Call a Make scenario webhook", "fas fa-plug", C::Integration, NodeType::MakeWebhook),
            t("Slack notify", "Send a message to #retail-ops when a VIP order exceeds limit.", "fas fa-comments", C::Custom, NodeType::SlackNotify),
            t("Discord notify", "Post a message to a Discord channel", "fab fa-discord", C::Custom, NodeType::DiscordNotify),
            t("Custom block", "Describe this step...", "fas fa-puzzle-piece", C::Custom, NodeType::Custom),
        ])
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Case-insensitive substring match on name and description.
    pub fn search(&self, term: &str) -> Vec<&ToolDescriptor> {
        let term = term.trim().to_lowercase();
        self.tools
            .iter()
            .filter(|t| {
                term.is_empty()
                    || t.name.to_lowercase().contains(&term)
                    || t.description.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn in_category(&self, category: Category) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|t| t.category == category).collect()
    }

    /// Look a tool up by its exact (case-insensitive) name.
    pub fn find(&self, name: &str) -> Result<&ToolDescriptor, CatalogError> {
        self.tools
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                debug!(tool = name, "unknown tool requested");
                CatalogError::UnknownTool(name.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_category_falls_back_to_custom() {
        let c: Category = serde_json::from_value(json!("marketing")).unwrap();
        assert_eq!(c, Category::Custom);
        let c: Category = serde_json::from_value(json!("AI")).unwrap();
        assert_eq!(c, Category::Ai);
        assert_eq!(serde_json::to_value(Category::Ai).unwrap(), json!("ai"));
    }

    #[test]
    fn node_type_keeps_unknown_strings() {
        let t: NodeType = serde_json::from_value(json!("crm_sync")).unwrap();
        assert_eq!(t, NodeType::Other("crm_sync".into()));
        assert_eq!(serde_json::to_value(&t).unwrap(), json!("crm_sync"));
        let t: NodeType = serde_json::from_value(json!("gmail_send")).unwrap();
        assert_eq!(t, NodeType::GmailSend);
    }

    #[test]
    fn google_types_require_google() {
        assert_eq!(NodeType::GmailSend.required_integration(), Some(Integration::Google));
        assert_eq!(NodeType::GoogleDocRead.required_integration(), Some(Integration::Google));
        assert_eq!(NodeType::SlackNotify.required_integration(), None);
    }

    #[test]
    fn infer_maps_free_text() {
        assert_eq!(NodeType::infer("Read spreadsheet sheet"), NodeType::GoogleSheetRead);
        assert_eq!(NodeType::infer("Send email"), NodeType::GmailSend);
        assert_eq!(NodeType::infer("slack ping"), NodeType::SlackNotify);
        assert_eq!(NodeType::infer("something else"), NodeType::Custom);
    }

    #[test]
    fn resolve_maps_free_text_types_only() {
        assert_eq!(NodeType::from("sheets_read").resolve(), NodeType::GoogleSheetRead);
        assert_eq!(NodeType::from("send_mail").resolve(), NodeType::GmailSend);
        assert_eq!(NodeType::from("crm_sync").resolve(), NodeType::Other("crm_sync".into()));
        assert_eq!(NodeType::Custom.resolve(), NodeType::Custom);
        assert_eq!(NodeType::Filter.resolve(), NodeType::Filter);
    }

    #[test]
    fn default_config_uses_field_defaults() {
        let cfg = NodeType::GoogleSheetWrite.default_config();
        assert_eq!(cfg["writeMode"], json!("json"));
        assert_eq!(cfg["range"], json!("A1"));
        assert!(NodeType::Custom.default_config().is_empty());
    }

    #[test]
    fn validate_config_rejects_bad_select_value() {
        let mut cfg = NodeType::GoogleSheetWrite.default_config();
        assert!(NodeType::GoogleSheetWrite.validate_config(&cfg).is_ok());
        cfg.insert("writeMode".into(), json!("diagonal"));
        assert!(matches!(
            NodeType::GoogleSheetWrite.validate_config(&cfg),
            Err(CatalogError::InvalidFieldValue { field, .. }) if field == "writeMode"
        ));
    }

    #[test]
    fn tool_payload_defaults() {
        let tool: ToolDescriptor = serde_json::from_value(json!({ "name": "Ping" })).unwrap();
        assert_eq!(tool.name, "Ping");
        assert_eq!(tool.description, "Describe this step...");
        assert_eq!(tool.category, Category::Custom);
    }

    #[test]
    fn catalog_search_and_filter() {
        let catalog = Catalog::builtin();
        let hits = catalog.search("SHEET");
        assert_eq!(hits.len(), 2);
        assert!(catalog.search("").len() == catalog.tools().len());
        assert!(catalog
            .in_category(Category::Logic)
            .iter()
            .all(|t| t.category == Category::Logic));
        assert!(catalog.find("webhook").is_ok());
        assert!(matches!(catalog.find("nope"), Err(CatalogError::UnknownTool(_))));
    }
}
