//! Prompt templates keyed by action kind

use super::ActionKind;
use crate::domain::knowledge_base::RetrievedDocument;

/// Separator placed between documents in the assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const ANALYST_SYSTEM_PROMPT: &str = "You are an analyst of municipal administration documents. \
Answer questions using ONLY the supplied context.\n\
IMPORTANT:\n\
1. If the user asks for the date of an event and the text only contains the adoption date \
of the document, use that date as the answer.\n\
2. Answer briefly and precisely.\n\
3. Turn lists and tables from the text into a readable form.\n\
4. Answer in the language of the question.";

const PROOFREADER_SYSTEM_PROMPT: &str = "You are a proofreader. Correct spelling, grammar and \
punctuation in the user's text without changing its meaning or language. \
Reply with the corrected text only.";

/// How retrieved documents are rendered into the context block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextStyle {
    /// Number, date and title before each document
    Annotated,
    /// Each document labelled as an existing act with its title
    Existing,
    /// No context block
    None,
}

/// Prompt configuration for one generative action kind
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    action: ActionKind,
    system: &'static str,
    context_style: ContextStyle,
    not_found: &'static str,
}

impl PromptTemplate {
    /// Selects the template for an action; search-only actions have none
    pub fn for_action(action: ActionKind) -> Option<Self> {
        let template = match action {
            ActionKind::Report => Self {
                action,
                system: ANALYST_SYSTEM_PROMPT,
                context_style: ContextStyle::Annotated,
                not_found: "No suitable documents were found in the database.",
            },
            ActionKind::CheckConflicts => Self {
                action,
                system: ANALYST_SYSTEM_PROMPT,
                context_style: ContextStyle::Existing,
                not_found: "No similar regulations were found in the database.",
            },
            ActionKind::CheckSpelling => Self {
                action,
                system: PROOFREADER_SYSTEM_PROMPT,
                context_style: ContextStyle::None,
                not_found: "There is no text to check.",
            },
            ActionKind::Search | ActionKind::FindExample | ActionKind::FindRelated => return None,
        };

        Some(template)
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn system_prompt(&self) -> &'static str {
        self.system
    }

    /// Fixed terminal response when retrieval comes back empty
    pub fn not_found_message(&self) -> &'static str {
        self.not_found
    }

    /// Concatenates the documents into one context block
    pub fn render_context(&self, documents: &[RetrievedDocument]) -> String {
        let rendered: Vec<String> = match self.context_style {
            ContextStyle::Annotated => documents.iter().map(render_annotated).collect(),
            ContextStyle::Existing => documents.iter().map(render_existing).collect(),
            ContextStyle::None => return String::new(),
        };

        rendered.join(CONTEXT_SEPARATOR)
    }

    /// Builds the user turn from the subject text and the rendered context
    pub fn render_user_message(&self, subject: &str, context: &str) -> String {
        match self.action {
            ActionKind::CheckConflicts => format!(
                "CONTEXT FROM THE DATABASE:\n{}\n\nUSER QUESTION:\n\
                 Analyse the text for contradictions with the existing documents.\n\
                 TEXT TO CHECK:\n{}\n\n\
                 Task: find possible legal or logical contradictions.",
                context, subject
            ),
            ActionKind::CheckSpelling => subject.to_string(),
            _ => format!(
                "CONTEXT FROM THE DATABASE:\n{}\n\nUSER QUESTION:\n{}",
                context, subject
            ),
        }
    }
}

fn render_annotated(doc: &RetrievedDocument) -> String {
    format!(
        "DOCUMENT No.{} of {}\nTitle: {}\nText:\n{}\n",
        doc.meta_or("number", "n/n"),
        doc.meta_or("date", "n/a"),
        doc.meta_or("title", "Untitled"),
        doc.text
    )
}

fn render_existing(doc: &RetrievedDocument) -> String {
    format!(
        "EXISTING DOCUMENT ({}):\n{}",
        doc.meta_or("title", "Untitled"),
        doc.text
    )
}
