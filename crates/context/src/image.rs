//! What an image prompt needs to know about its subject.

use panelforge_core::{ContentKind, Project};
use serde::Serialize;

use crate::full::{FullContext, PanelView, SceneSummary};

/// A character as it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCharacter {
    pub id: String,
    pub name: String,
    pub appearance: String,
    pub description: String,
    /// Source of the reference image, fetched and inlined by the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ImageSubject {
    Panel {
        panel: PanelView,
        scene: SceneSummary,
        art_style: String,
        characters: Vec<ImageCharacter>,
    },
    Character {
        character: ImageCharacter,
        art_style: String,
    },
}

impl ImageSubject {
    /// Characters whose reference images should accompany the request.
    pub fn characters(&self) -> Vec<&ImageCharacter> {
        match self {
            ImageSubject::Panel { characters, .. } => characters.iter().collect(),
            ImageSubject::Character { character, .. } => vec![character],
        }
    }
}

/// Panels and characters can be drawn; anything else, or an unknown ID,
/// yields `None`.
pub fn image_subject(project: &Project, kind: ContentKind, id: &str) -> Option<ImageSubject> {
    match kind {
        ContentKind::Panel => {
            let (_, scene, panel) = project.panel(id)?;
            let characters = panel
                .appearing_character_ids()
                .into_iter()
                .filter_map(|cid| project.character(cid))
                .map(image_character)
                .collect();
            let view = FullContext::new(project).panel_by_id(id)?.panel;
            Some(ImageSubject::Panel {
                panel: view,
                scene: SceneSummary {
                    id: scene.id.clone(),
                    title: scene.title.clone(),
                    order: scene.order,
                    setting: scene.setting.clone(),
                    description: scene.description.clone(),
                },
                art_style: project.art_style.clone(),
                characters,
            })
        }
        ContentKind::Character => Some(ImageSubject::Character {
            character: image_character(project.character(id)?),
            art_style: project.art_style.clone(),
        }),
        _ => None,
    }
}

fn image_character(c: &panelforge_core::content::Character) -> ImageCharacter {
    ImageCharacter {
        id: c.id.clone(),
        name: c.name.clone(),
        appearance: c.appearance.clone(),
        description: c.description.clone(),
        reference_image_url: c.reference_image_url.clone().or_else(|| c.image_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_store::fixtures::sample_project;

    #[test]
    fn panel_subject_lists_only_appearing_characters() {
        let project = sample_project();
        let subject = image_subject(&project, ContentKind::Panel, "pn2").unwrap();
        let names: Vec<_> = subject.characters().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Old Hal"]);

        let ImageSubject::Panel { scene, art_style, .. } = subject else {
            panic!("expected panel subject");
        };
        assert_eq!(scene.id, "s1");
        assert_eq!(art_style, "ink wash");
    }

    #[test]
    fn character_subject_prefers_reference_image() {
        let project = sample_project();
        let subject = image_subject(&project, ContentKind::Character, "c1").unwrap();
        assert_eq!(
            subject.characters()[0].reference_image_url.as_deref(),
            Some("https://img.example/mira.png")
        );
    }

    #[test]
    fn subject_serializes_with_type_tag() {
        let project = sample_project();
        let value = serde_json::to_value(image_subject(&project, ContentKind::Panel, "pn1").unwrap()).unwrap();
        assert_eq!(value["type"], "panel");
        assert_eq!(value["artStyle"], "ink wash");
        assert_eq!(value["characters"][0]["referenceImageUrl"], "https://img.example/mira.png");
    }

    #[test]
    fn unsupported_kinds_and_unknown_ids() {
        let project = sample_project();
        assert!(image_subject(&project, ContentKind::Scene, "s1").is_none());
        assert!(image_subject(&project, ContentKind::Panel, "nope").is_none());
    }
}
