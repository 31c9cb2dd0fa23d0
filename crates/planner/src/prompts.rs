//! Prompt templates.
//!
//! Every template is parsed strictly when the assistant is built, so a
//! typo in a tag fails startup instead of producing a garbled prompt.

use panelforge_core::ContentKind;

pub const CLASSIFY: &str = r#"You are the assistant inside a manga authoring tool. Work out what the user wants and answer with one JSON object, nothing else.

Project outline:
{{projectContext}}

{{#if selectedNode}}The user has this {{selectedNode.type}} selected: {{selectedNode}}
{{else}}Nothing is selected in the editor.
{{/if}}{{#if prevChats.0}}
Recent conversation:
{{#each prevChats}}{{role}}: {{content}}
{{/each}}{{/if}}
User: {{userInput}}

Choose exactly one action and fill in only its payload:
- directResponse: questions, small talk, advice, and anything you need to clarify first.
- generateContent: new characters, chapters, scenes or panels. A scene needs the id of its chapter as parentId and a panel needs the id of its scene. Take it from the request or the selected node. If you cannot tell where new content belongs, use directResponse and ask.
- updateContent: changes to an existing character, chapter, scene, panel or dialogue. contentId must be the exact id of that entity, taken from the request or the selected node. Never guess an id; if you are not sure which entity is meant, use directResponse and ask. Requests to delete or remove something are updateContent too.
- generateImage: drawing a panel or a character sheet. targetId is the panel or character id.
{{#if context.language}}
Write any text for the user in {{context.language}}.
{{/if}}
The JSON must match this schema:
{{context.outputSchema}}
"#;

const GENERATE_HEADER: &str = r#"You are co-writing the manga "{{projectContext.project.title}}".
Genre: {{projectContext.project.genre}}
Art style: {{projectContext.project.artStyle}}
{{#if projectContext.project.description}}Premise: {{projectContext.project.description}}
{{/if}}
Cast:
{{#each projectContext.characters}}- [{{id}}] {{name}} ({{role}}): {{description}} Looks: {{appearance}}
{{/each}}{{#if projectContext.characters.0}}{{else}}(no characters yet)
{{/if}}
"#;

const GENERATE_CHARACTER: &str = r#"Create {{count}} new character(s) that fit this story and do not duplicate the cast above.
Give each a name, a role in the story, a short description, a visual appearance an artist can draw from, and a personality.
"#;

const GENERATE_CHAPTER: &str = r#"Chapters so far:
{{#each projectContext.chapters}}{{order}}. {{title}}: {{summary}}
{{/each}}
Write {{count}} chapter outline(s) that continue the story. Each needs a title and a summary of what happens.
"#;

const GENERATE_SCENE: &str = r#"Chapter {{projectContext.chapter.order}}: {{projectContext.chapter.title}}
{{projectContext.chapter.summary}}

Scenes already in this chapter:
{{#each projectContext.chapter.scenes}}{{order}}. {{title}} ({{setting}}): {{description}}
{{/each}}
Write {{count}} new scene(s) for this chapter. Each needs a title, a setting and a description of the action.
"#;

const GENERATE_PANEL: &str = r#"Scene: {{projectContext.scene.title}} (chapter: {{projectContext.scene.chapter.title}})
Setting: {{projectContext.scene.setting}}
{{projectContext.scene.description}}

Panels so far:
{{#each projectContext.scene.panels}}{{order}}. [{{shot}}] {{description}}
{{#each dialogues}}   {{#if speakerName}}{{speakerName}}{{else}}{{kind}}{{/if}}: {{text}}
{{/each}}{{/each}}
Draw up {{count}} new panel(s) continuing the scene. For each give a description of what is drawn, the camera shot, the ids of the characters in frame, and its dialogue. Speakers are referenced by character id; narration and sound effects have no speaker.
"#;

const GENERATE_FOOTER: &str = r#"
Direction from the author: {{instructions}}
{{#if context.language}}Write all text in {{context.language}}.
{{/if}}
Respond with JSON only, matching this schema:
{{context.outputSchema}}
"#;

/// Template of the `generate_<kind>` prompt.
pub fn generation(kind: ContentKind) -> Option<String> {
    let body = match kind {
        ContentKind::Character => GENERATE_CHARACTER,
        ContentKind::Chapter => GENERATE_CHAPTER,
        ContentKind::Scene => GENERATE_SCENE,
        ContentKind::Panel => GENERATE_PANEL,
        ContentKind::Project | ContentKind::Dialogue => return None,
    };
    Some([GENERATE_HEADER, body, GENERATE_FOOTER].concat())
}

pub const EDIT: &str = r#"You are editing a {{target.contentType}} in the manga "{{target.project.title}}".

Current {{target.contentType}}:
{{target.target}}

Characters:
{{#each target.characters}}- [{{id}}] {{name}} ({{role}})
{{/each}}
Requested change: {{instructions}}

Call {{toolName}} with id "{{contentId}}" and only the fields that change. Refer to characters by the ids listed above. If the author asks to remove something, clear the field that holds it.
Then reply with one short sentence telling the author what you changed.
{{#if context.language}}Write that sentence in {{context.language}}.
{{/if}}"#;

/// Text prompt sent to the image backend.
pub const IMAGE: &str = r#"{{#if (eq subject.type "panel")}}A single manga panel, {{subject.panel.shot}} shot.
{{subject.panel.description}}
Location: {{subject.scene.setting}}. {{subject.scene.description}}
{{#each subject.characters}}{{name}}: {{appearance}}
{{/each}}{{#if subject.panel.dialogues.0}}Leave room for {{#each subject.panel.dialogues}}{{#if @first}}{{else}}, {{/if}}a {{kind}} balloon{{/each}}.
{{/if}}{{else}}Character reference sheet for {{subject.character.name}}.
{{subject.character.appearance}}
{{subject.character.description}}
Front and three-quarter views on a plain background.
{{/if}}Art style: {{subject.artStyle}}.
{{#if referenceCount}}Keep every character consistent with the attached reference images.
{{/if}}{{#if instructions}}{{instructions}}
{{/if}}"#;
