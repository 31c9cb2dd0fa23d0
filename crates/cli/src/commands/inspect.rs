//! `panelforge inspect`: print a context projection as JSON.

use std::path::Path;

use panelforge_context::{ContextMode, context_view};
use panelforge_core::ContentStore;
use panelforge_store::FileContentStore;

use super::load_config;

pub async fn inspect(
    store: &dyn ContentStore,
    project_id: &str,
    mode: ContextMode,
    scene: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    let project = store
        .get_project(project_id)
        .await?
        .ok_or_else(|| format!("Project '{project_id}' not found"))?;
    let view = context_view(&project, mode, scene)
        .ok_or_else(|| format!("Scene '{}' not found", scene.unwrap_or_default()))?;
    Ok(serde_json::to_string_pretty(&view)?)
}

pub async fn run(
    config_path: Option<&Path>,
    project_id: &str,
    mode: &str,
    scene: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mode: ContextMode = mode.parse()?;
    let store = FileContentStore::open(config.store.resolved_path())?;
    println!("{}", inspect(&store, project_id, mode, scene).await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_store::InMemoryContentStore;
    use panelforge_store::fixtures::sample_project;

    #[tokio::test]
    async fn prints_minimal_scene() {
        let store = InMemoryContentStore::with_projects(vec![sample_project()]);
        let out = inspect(&store, "p1", ContextMode::Minimal, Some("s1")).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["panelCount"], 2);
    }

    #[tokio::test]
    async fn missing_project_and_scene_are_errors() {
        let store = InMemoryContentStore::with_projects(vec![sample_project()]);
        let err = inspect(&store, "p9", ContextMode::Full, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Project 'p9' not found");
        let err = inspect(&store, "p1", ContextMode::Full, Some("s9")).await.unwrap_err();
        assert_eq!(err.to_string(), "Scene 's9' not found");
    }
}
