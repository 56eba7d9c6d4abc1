//! Remediation guidance grouped by topic.
//!
//! Layer-3 errors are bucketed by the fixed wording of the check that raised
//! them, never by file or function names quoted inside. Each populated bucket
//! contributes one tip, however many issues landed in it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Layer, VerificationIssue};

pub(crate) const MODULE_MISMATCH: &str =
    "uses ES6 export syntax but is loaded without type=\"module\"";
pub(crate) const UNUSED_CLASSES: &str = "CSS classes from ";
pub(crate) const FORM_WITHOUT_HANDLER: &str = "has a submit control but no onsubmit handler";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceTopic {
    ModuleSystem,
    CssIntegration,
    FormHandlers,
    Other,
}

impl GuidanceTopic {
    pub const ALL: [GuidanceTopic; 4] = [
        Self::ModuleSystem,
        Self::CssIntegration,
        Self::FormHandlers,
        Self::Other,
    ];

    /// Topic of a layer-3 message; anything not raised by a topic check is `Other`.
    pub fn classify(message: &str) -> Self {
        if message.starts_with("Script '") && message.contains(MODULE_MISMATCH) {
            Self::ModuleSystem
        } else if message.starts_with(UNUSED_CLASSES) {
            Self::CssIntegration
        } else if message.starts_with("Form ") && message.contains(FORM_WITHOUT_HANDLER) {
            Self::FormHandlers
        } else {
            Self::Other
        }
    }

    pub fn tip(self) -> &'static str {
        match self {
            Self::ModuleSystem => {
                "Scripts that use ES6 export must be loaded with <script type=\"module\">; \
                 otherwise remove the export statements and attach the functions to window \
                 so they are reachable as globals from inline handlers."
            }
            Self::CssIntegration => {
                "Use the class names defined in the stylesheet in the markup's class \
                 attributes (or drop the unused rules) so the styles actually apply."
            }
            Self::FormHandlers => {
                "Give every form with a submit button an onsubmit handler, e.g. \
                 onsubmit=\"return handleSubmit(event)\", and define that function in a \
                 referenced script."
            }
            Self::Other => {
                "Make every referenced file exist at the path the markup uses, and define \
                 each function called from an event handler in a referenced script."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub has_semantic_errors: bool,
    pub error_count: usize,
    /// Layer-3 error messages per topic; every topic is present.
    pub categories: BTreeMap<GuidanceTopic, Vec<String>>,
    /// One tip per populated topic.
    pub tips: Vec<String>,
}

impl Default for Guidance {
    fn default() -> Self {
        Self {
            has_semantic_errors: false,
            error_count: 0,
            categories: GuidanceTopic::ALL.into_iter().map(|t| (t, Vec::new())).collect(),
            tips: Vec::new(),
        }
    }
}

impl Guidance {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a VerificationIssue>) -> Self {
        let mut guidance = Self::default();
        for issue in issues {
            if issue.layer != Layer::Semantic || !issue.is_error() {
                continue;
            }
            guidance.error_count += 1;
            guidance
                .categories
                .entry(GuidanceTopic::classify(&issue.message))
                .or_default()
                .push(issue.message.clone());
        }
        guidance.has_semantic_errors = guidance.error_count > 0;
        guidance.tips = GuidanceTopic::ALL
            .into_iter()
            .filter(|t| guidance.categories.get(t).is_some_and(|m| !m.is_empty()))
            .map(|t| t.tip().to_string())
            .collect();
        guidance
    }

    pub fn messages(&self, topic: GuidanceTopic) -> &[String] {
        self.categories.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }
}
