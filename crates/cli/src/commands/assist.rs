//! `panelforge assist`: single-message or interactive assistant mode.

use std::io::Write;
use std::path::Path;

use panelforge_core::{ChatTurn, ContentKind, SelectedNode};
use panelforge_gateway::Runtime;
use panelforge_planner::{AssistRequest, AssistResult};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_config;

/// Parse `kind:id`, e.g. `panel:pn2`.
pub fn parse_selection(raw: &str) -> Result<SelectedNode, String> {
    let (kind, id) = raw
        .split_once(':')
        .ok_or_else(|| format!("selection '{raw}' must look like kind:id"))?;
    if id.trim().is_empty() {
        return Err(format!("selection '{raw}' has no id"));
    }
    let kind: ContentKind = kind.trim().parse()?;
    Ok(SelectedNode::of(kind, id.trim()))
}

fn print_result(result: &AssistResult) {
    match result {
        AssistResult::Message { content } => {
            for line in content.lines() {
                println!("  Assistant > {line}");
            }
        }
        AssistResult::Generated { data, .. } => {
            println!("  Assistant > {}", result.summary());
            match serde_json::to_string_pretty(data) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("  [Error] {e}"),
            }
        }
        AssistResult::Error { code, message } => eprintln!("  [{code}] {message}"),
        _ => println!("  Assistant > {}", result.summary()),
    }
}

pub async fn run(
    config_path: Option<&Path>,
    project: String,
    message: Option<String>,
    select: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set PANELFORGE_API_KEY, OPENROUTER_API_KEY or OPENAI_API_KEY,");
        eprintln!("  or add api_key to {}", super::config_file(config_path).display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let selection = select.as_deref().map(parse_selection).transpose()?;
    let runtime = Runtime::from_config(&config)?;

    let request = |input: String, history: &[ChatTurn]| {
        let mut request = AssistRequest::new(project.clone(), input).with_history(history.to_vec());
        if let Some(node) = &selection {
            request = request.with_selection(node.clone());
        }
        request
    };

    if let Some(msg) = message {
        let result = runtime.assistant.assist(request(msg, &[])).await;
        print_result(&result);
        if result.is_error() {
            return Err(result.summary().into());
        }
        return Ok(());
    }

    println!();
    println!("  PanelForge assistant, project {project}");
    if let Some(node) = &selection {
        println!("  Selected:  {} {}", node.kind(), node.id());
    }
    println!("  Model:     {}", config.default_model);
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut history: Vec<ChatTurn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if !input.is_empty() {
            let result = runtime.assistant.assist(request(input.to_string(), &history)).await;
            print_result(&result);
            history.push(ChatTurn::user(input));
            history.push(ChatTurn::assistant(result.summary()));
            println!();
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_kind_and_id() {
        assert_eq!(parse_selection("scene:s1"), Ok(SelectedNode::of(ContentKind::Scene, "s1")));
        assert_eq!(parse_selection("Panel: pn2").map(|n| n.kind()), Ok(ContentKind::Panel));
    }

    #[test]
    fn malformed_selection_is_rejected() {
        assert!(parse_selection("s1").is_err());
        assert!(parse_selection("scene:").is_err());
        assert!(parse_selection("book:b1").is_err());
    }
}
