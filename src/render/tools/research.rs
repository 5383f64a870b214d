use serde_json::{Map, Value};

use crate::render::format::{date_only, truncate_chars, EXCERPT_CHARS};
use crate::render::fragment::{Citation, Fragment};
use crate::render::parser::{parse_list, Parsed};
use crate::render::registry::{ParamSpec, ToolRenderer, ToolSpec};
use crate::types::{arg_str, Source, ToolName};

/// Web research citations.
pub struct ResearchRenderer;

fn non_blank(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn citation(source: &Source) -> Citation {
    let url = non_blank(&source.url);
    Citation {
        title: non_blank(&source.title)
            .or_else(|| url.clone())
            .unwrap_or_else(|| "Untitled".to_string()),
        url,
        date: non_blank(&source.published_date)
            .map(|d| date_only(&d))
            .filter(|d| !d.is_empty()),
        excerpt: non_blank(&source.text).map(|t| truncate_chars(&t, EXCERPT_CHARS)),
    }
}

impl ToolRenderer for ResearchRenderer {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ToolName::ExaResearch.to_string(),
            description: "Search the web for recent sources on a topic".into(),
            parameters: vec![
                ParamSpec::required("query", "What to research"),
                ParamSpec::optional("num_results", "Number of sources to return"),
            ],
        }
    }

    fn render_pending(&self, args: &Map<String, Value>) -> Fragment {
        let label = match arg_str(args, "query") {
            Some(q) => format!("Researching \"{q}\""),
            None => "Researching".to_string(),
        };
        Fragment::progress(ToolName::ExaResearch.as_str(), label, None)
    }

    fn render_complete(&self, args: &Map<String, Value>, result: Option<&Value>) -> Fragment {
        match parse_list::<Source>(result).non_empty() {
            Parsed::Ok(sources) => Fragment::Citations {
                query: arg_str(args, "query"),
                items: sources.iter().map(citation).collect(),
            },
            Parsed::Empty => Fragment::empty(ToolName::ExaResearch.as_str(), "No research results"),
        }
    }
}
