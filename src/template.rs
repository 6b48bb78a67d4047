/*!
 * Prompt templates wrapped around a snapshot
 *
 * Built-in templates are fixed prose around the snapshot text; custom ones
 * come from a JSON file and substitute the first `{context}` placeholder.
 */

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::bail;
use crate::error::Result;

/// Placeholder replaced by the snapshot in custom prompts
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Id of the identity template
pub const DEFAULT_TEMPLATE_ID: &str = "default";

const REVIEW_BEFORE: &str = "You are an expert Principal Software Engineer. I have provided the project structure and source code below.
Your task is to perform a comprehensive Code Review.

# Focus Areas:
1. **Code Quality**: Clean code principles, DRY, separation of concerns.
2. **Performance**: Identify potential bottlenecks or inefficient logic.
3. **Safety**: Spot potential bugs or race conditions.
4. **Modern Practices**: Suggest modern alternatives to outdated patterns used here.

# Project Context:
";
const REVIEW_AFTER: &str = "

# Instructions:
Provide your review in a structured format with priority levels (High/Medium/Low) for each suggestion.";

const BUGFIX_BEFORE: &str = "You are an expert Debugger and QA Engineer. Analyze the following project code specifically for BUGS and LOGICAL ERRORS.

# Look for:
- Unhandled exceptions / edge cases.
- Race conditions or async/await mistakes.
- Memory leaks or resource management issues.
- Logic errors that deviate from standard patterns.

# Project Context:
";
const BUGFIX_AFTER: &str = "

# Output:
List the detected issues. For each issue, explain *why* it is a bug and provide the *corrected* code snippet.";

const EXPLAIN_BEFORE: &str = "You are a Technical Lead onboarding a new developer.
Read the following project structure and code.

# Task:
1. **High-Level Summary**: What does this project do?
2. **Architecture**: Explain the folder structure and how components interact.
3. **Key Files**: Highlight the most important files and their roles.

# Project Context:
";

const SECURITY_BEFORE: &str = "You are a Cybersecurity Expert. Perform a Security Audit on the provided code.

# Audit Checklist:
- Injection vulnerabilities (SQL, NoSQL, Command).
- Hardcoded secrets or credentials.
- Insecure data handling (PII exposure).
- XSS or CSRF vulnerabilities (if web-based).

# Project Context:
";
const SECURITY_AFTER: &str = "

# Report:
Provide a security report listing vulnerabilities by severity (Critical/High/Medium) and mitigation steps.";

const REFACTOR_BEFORE: &str = "You are a Refactoring Specialist. I want to improve the maintainability of this code.

# Task:
Identify complex functions, duplicate logic, or messy components that should be refactored.
Propose a cleaner, more modular implementation.

# Project Context:
";

/// How a template turns snapshot text into a prompt
#[derive(Debug, Clone)]
enum Body {
    /// Snapshot returned unchanged
    Identity,
    /// Fixed prose around the snapshot; the result is trimmed
    Wrap {
        before: &'static str,
        after: &'static str,
    },
    /// User prompt with a placeholder
    Custom(String),
}

/// A catalog entry
#[derive(Debug, Clone)]
pub struct Template {
    /// Unique id
    pub id: String,
    /// Display label
    pub label: String,
    /// One-line description
    pub description: String,
    body: Body,
}

impl Template {
    fn built_in(id: &str, label: &str, description: &str, body: Body) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            body,
        }
    }

    /// Whether this template ships with snapfs
    pub fn is_built_in(&self) -> bool {
        !matches!(self.body, Body::Custom(_))
    }

    /// Build the prompt for `context`
    pub fn build(&self, context: &str) -> String {
        match &self.body {
            Body::Identity => context.to_string(),
            Body::Wrap { before, after } => format!("{}{}{}", before, context, after).trim().to_string(),
            Body::Custom(prompt) => prompt.replacen(CONTEXT_PLACEHOLDER, context, 1),
        }
    }
}

/// User-defined template as stored in a templates file
#[derive(Debug, Clone, Deserialize)]
pub struct CustomTemplate {
    /// Unique id; generated from the position when missing
    #[serde(default)]
    pub id: Option<String>,
    /// Display label
    #[serde(default)]
    pub label: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Prompt text containing `{context}`
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Read a JSON array of custom templates
pub fn load_custom_templates(path: &Path) -> Result<Vec<CustomTemplate>> {
    let raw = fs::read_to_string(path)?;
    let templates: Vec<CustomTemplate> = serde_json::from_str(&raw)?;
    log::debug!("Loaded {} custom templates from {}", templates.len(), path.display());
    Ok(templates)
}

fn built_in_templates() -> Vec<Template> {
    vec![
        Template::built_in(
            DEFAULT_TEMPLATE_ID,
            "Standard Context (Raw)",
            "Copies code and structure without additional instructions.",
            Body::Identity,
        ),
        Template::built_in(
            "review",
            "Code Review & Best Practices",
            "Deep analysis of code quality, clean code, and performance.",
            Body::Wrap { before: REVIEW_BEFORE, after: REVIEW_AFTER },
        ),
        Template::built_in(
            "bugfix",
            "Find Bugs & Error Handling",
            "Scans for logical bugs, edge cases, and poor error handling.",
            Body::Wrap { before: BUGFIX_BEFORE, after: BUGFIX_AFTER },
        ),
        Template::built_in(
            "explain",
            "Explain Architecture",
            "Explains workflow, folder structure, and project goals.",
            Body::Wrap { before: EXPLAIN_BEFORE, after: "" },
        ),
        Template::built_in(
            "security",
            "Security Audit",
            "Checks for vulnerabilities (XSS, Injection, Secrets, etc.).",
            Body::Wrap { before: SECURITY_BEFORE, after: SECURITY_AFTER },
        ),
        Template::built_in(
            "refactor",
            "Refactoring Suggestions",
            "Suggestions to improve maintainability and structure.",
            Body::Wrap { before: REFACTOR_BEFORE, after: "" },
        ),
    ]
}

/// Ordered template catalog; the identity template is always first
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCatalog {
    /// Catalog of the built-in templates
    pub fn new() -> Self {
        Self {
            templates: built_in_templates(),
        }
    }

    /// Append custom templates after the built-ins
    ///
    /// Ids must be unique across the whole catalog.
    pub fn with_custom(mut self, custom: Vec<CustomTemplate>) -> Result<Self> {
        for (position, entry) in custom.into_iter().enumerate() {
            let id = entry
                .id
                .unwrap_or_else(|| format!("custom-{}", position + 1));
            if self.get(&id).is_some() {
                bail!(Config, "Duplicate template id: {}", id);
            }

            self.templates.push(Template {
                id,
                label: entry.label.unwrap_or_else(|| "Custom Template".to_string()),
                description: entry
                    .description
                    .unwrap_or_else(|| "User defined template".to_string()),
                body: Body::Custom(entry.prompt.unwrap_or_else(|| CONTEXT_PLACEHOLDER.to_string())),
            });
        }
        Ok(self)
    }

    /// Look a template up by id
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// All templates in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Wrap `snapshot` with the template `id`, or with the first template
    /// when the id is unknown
    pub fn apply(&self, snapshot: &str, id: &str) -> String {
        let template = match self.get(id) {
            Some(template) => template,
            None => {
                log::warn!("Unknown template '{}', using '{}'", id, self.templates[0].id);
                &self.templates[0]
            }
        };
        template.build(snapshot)
    }
}
