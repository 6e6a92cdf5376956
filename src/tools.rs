//! Closed tool dispatch for `POST /tools`.
//!
//! A request names a tool and carries a JSON `parameters` object. The name
//! is resolved against a fixed set of operations and the parameters are
//! decoded into that operation's shape before anything runs.
//!
//! | Tool                 | Legacy alias                  | Parameters                       |
//! |----------------------|-------------------------------|----------------------------------|
//! | `search`             | `twitter_search`              | `query`, `max_results?`          |
//! | `rank-by-engagement` | `twitter_sort_by_engagement`  | `items` (or `tweets`)            |
//! | `extract-term`       | `twitter_extract_search_term` | `content`, `instruction?`        |

use engage_search::ResultItem;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Raw body of a tool invocation.
#[derive(Debug, Default, Deserialize)]
pub struct ToolRequest {
    /// Tool name; canonical or legacy alias.
    #[serde(default)]
    pub tool: Option<String>,
    /// Tool-specific parameters.
    #[serde(default)]
    pub parameters: Value,
}

/// A decoded tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    /// Run a search job and return ranked items.
    Search {
        /// Query text.
        query: String,
        /// Requested result count.
        max_results: Option<u32>,
    },
    /// Rank caller-supplied items by engagement.
    RankByEngagement {
        /// Items to rank.
        items: Vec<ResultItem>,
    },
    /// Extract a search term from free text.
    ExtractTerm {
        /// Text to extract from.
        content: String,
        /// Optional steering instruction.
        instruction: Option<String>,
    },
}

/// Why a tool request could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// No `tool` field, or a blank one.
    #[error("Missing tool name in request")]
    MissingTool,
    /// The name matches no known tool.
    #[error("Tool '{0}' not found")]
    UnknownTool(String),
    /// Parameters do not fit the tool's shape.
    #[error("invalid parameters for '{tool}': {message}")]
    InvalidParameters {
        /// Canonical tool name.
        tool: &'static str,
        /// Decoder message.
        message: String,
    },
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(_) => ApiError::NotFound(err.to_string()),
            ToolError::MissingTool | ToolError::InvalidParameters { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolKind {
    Search,
    RankByEngagement,
    ExtractTerm,
}

impl ToolKind {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "search" | "twitter_search" => Some(Self::Search),
            "rank-by-engagement" | "twitter_sort_by_engagement" => Some(Self::RankByEngagement),
            "extract-term" | "twitter_extract_search_term" => Some(Self::ExtractTerm),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::RankByEngagement => "rank-by-engagement",
            Self::ExtractTerm => "extract-term",
        }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
    #[serde(default, alias = "maxResults")]
    max_results: Option<u32>,
}

#[derive(Deserialize)]
struct RankParams {
    #[serde(default, alias = "tweets")]
    items: Vec<ResultItem>,
}

#[derive(Deserialize)]
struct ExtractParams {
    #[serde(default, alias = "tweet_content", alias = "userInput")]
    content: String,
    #[serde(default, alias = "customInstruction", alias = "custom_instruction")]
    instruction: Option<String>,
}

impl ToolCall {
    /// Canonical names of every supported tool.
    pub const NAMES: [&'static str; 3] = ["search", "rank-by-engagement", "extract-term"];

    /// Decode a raw request.
    ///
    /// # Errors
    ///
    /// - [`ToolError::MissingTool`] if no tool is named
    /// - [`ToolError::UnknownTool`] if the name is not recognised
    /// - [`ToolError::InvalidParameters`] if the parameters do not decode
    pub fn parse(request: ToolRequest) -> Result<Self, ToolError> {
        let name = request
            .tool
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(ToolError::MissingTool)?;
        let kind = ToolKind::resolve(&name).ok_or(ToolError::UnknownTool(name))?;

        let parameters = match request.parameters {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let invalid = |e: serde_json::Error| ToolError::InvalidParameters {
            tool: kind.name(),
            message: e.to_string(),
        };

        Ok(match kind {
            ToolKind::Search => {
                let p: SearchParams = serde_json::from_value(parameters).map_err(invalid)?;
                Self::Search {
                    query: p.query,
                    max_results: p.max_results,
                }
            }
            ToolKind::RankByEngagement => {
                let p: RankParams = serde_json::from_value(parameters).map_err(invalid)?;
                Self::RankByEngagement { items: p.items }
            }
            ToolKind::ExtractTerm => {
                let p: ExtractParams = serde_json::from_value(parameters).map_err(invalid)?;
                Self::ExtractTerm {
                    content: p.content,
                    instruction: p.instruction,
                }
            }
        })
    }

    /// Canonical name of this call's tool.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => ToolKind::Search.name(),
            Self::RankByEngagement { .. } => ToolKind::RankByEngagement.name(),
            Self::ExtractTerm { .. } => ToolKind::ExtractTerm.name(),
        }
    }
}
