//! `panelforge render`: render a template file against JSON data.

use std::path::Path;

use panelforge_template::Template;
use serde_json::Value;

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))
}

/// `data` is inline JSON, or `@file` to read it from a file.
pub fn render_file(file: &Path, data: &str, strict: bool) -> Result<String, Box<dyn std::error::Error>> {
    let source = read(file)?;
    let data = match data.strip_prefix('@') {
        Some(data_file) => read(Path::new(data_file))?,
        None => data.to_string(),
    };
    let data: Value = serde_json::from_str(&data).map_err(|e| format!("--data is not valid JSON: {e}"))?;

    let template = if strict {
        Template::parse(&source)?
    } else {
        Template::parse_lenient(&source)
    };
    Ok(template.render(&data))
}

pub fn run(file: &Path, data: &str, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render_file(file, data, strict)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn renders_with_inline_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = template_file(&dir, "ok.tpl", "Scene: {{scene.title}}");
        let out = render_file(&path, r#"{"scene": {"title": "Storm Watch"}}"#, true).unwrap();
        assert_eq!(out, "Scene: Storm Watch");
    }

    #[test]
    fn strict_mode_surfaces_structure_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = template_file(&dir, "bad.tpl", "{{#each panels}}{{description}}");
        assert!(render_file(&path, "{}", true).is_err());
        assert_eq!(render_file(&path, "{}", false).unwrap(), "{{#each panels}}");
    }

    #[test]
    fn data_can_come_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = template_file(&dir, "file.tpl", "{{#each panels}}{{@index}}:{{shot}} {{/each}}");
        let data = template_file(&dir, "data.json", r#"{"panels": [{"shot": "wide"}, {"shot": "medium"}]}"#);
        let out = render_file(&path, &format!("@{}", data.display()), false).unwrap();
        assert_eq!(out, "0:wide 1:medium ");
    }

    #[test]
    fn bad_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = template_file(&dir, "json.tpl", "{{x}}");
        let err = render_file(&path, "{not json", false).unwrap_err();
        assert!(err.to_string().contains("--data"));
    }
}
