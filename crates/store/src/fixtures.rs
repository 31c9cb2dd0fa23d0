//! A small sample project for demos and tests.

use panelforge_core::Project;
use panelforge_core::content::{Chapter, Character, Dialogue, DialogueKind, Panel, Scene};

/// "Tidebound": three characters, two chapters, four dialogues.
///
/// IDs are short and stable (`p1`, `c1`, `ch1`, `s1`, `pn1`, `d1`, ...).
pub fn sample_project() -> Project {
    Project {
        id: "p1".into(),
        title: "Tidebound".into(),
        description: "A lighthouse keeper's apprentice follows a ghost ship into open water.".into(),
        genre: "adventure".into(),
        art_style: "ink wash".into(),
        characters: vec![
            Character {
                id: "c1".into(),
                name: "Mira".into(),
                role: "protagonist".into(),
                description: "Apprentice lighthouse keeper, sixteen, restless.".into(),
                appearance: "Short black hair, oversized oilskin coat, brass spyglass.".into(),
                personality: "Curious, stubborn, quick to laugh.".into(),
                reference_image_url: Some("https://img.example/mira.png".into()),
                image_url: None,
            },
            Character {
                id: "c2".into(),
                name: "Old Hal".into(),
                role: "mentor".into(),
                description: "The lighthouse keeper. Has seen the ghost ship before.".into(),
                appearance: "Grey beard, eyepatch, knitted cap.".into(),
                personality: "Gruff, protective, secretly sentimental.".into(),
                reference_image_url: None,
                image_url: None,
            },
            Character {
                id: "c3".into(),
                name: "Kestrel".into(),
                role: "rival".into(),
                description: "Salvager who wants the ship's cargo.".into(),
                appearance: "Tall, red scarf, scar across the chin.".into(),
                personality: "Charming and ruthless.".into(),
                reference_image_url: None,
                image_url: None,
            },
        ],
        chapters: vec![
            Chapter {
                id: "ch1".into(),
                title: "The Lighthouse".into(),
                order: 1,
                summary: "A storm brings a ship that should not exist.".into(),
                scenes: vec![
                    Scene {
                        id: "s1".into(),
                        title: "Storm Watch".into(),
                        order: 1,
                        setting: "Lighthouse lamp room".into(),
                        description: "Mira keeps watch as the storm peaks.".into(),
                        panels: vec![
                            Panel {
                                id: "pn1".into(),
                                order: 1,
                                description: "Mira presses against the glass, peering into the storm.".into(),
                                shot: "wide".into(),
                                character_ids: vec!["c1".into()],
                                image_url: None,
                                dialogues: vec![Dialogue {
                                    id: "d1".into(),
                                    speaker_id: Some("c1".into()),
                                    text: "Something's out there.".into(),
                                    kind: DialogueKind::Speech,
                                }],
                            },
                            Panel {
                                id: "pn2".into(),
                                order: 2,
                                description: "Hal bursts up the stairs, lantern swinging.".into(),
                                shot: "medium".into(),
                                character_ids: vec!["c2".into()],
                                image_url: None,
                                dialogues: vec![
                                    Dialogue {
                                        id: "d2".into(),
                                        speaker_id: Some("c2".into()),
                                        text: "Get away from the glass!".into(),
                                        kind: DialogueKind::Speech,
                                    },
                                    Dialogue {
                                        id: "d3".into(),
                                        speaker_id: None,
                                        text: "CRACK".into(),
                                        kind: DialogueKind::Sfx,
                                    },
                                ],
                            },
                        ],
                    },
                    Scene {
                        id: "s2".into(),
                        title: "Wreckage".into(),
                        order: 2,
                        setting: "Rocky shore at dawn".into(),
                        description: "The morning after. Debris everywhere, no survivors.".into(),
                        panels: vec![Panel {
                            id: "pn3".into(),
                            order: 1,
                            description: "Splintered timber scattered across the rocks.".into(),
                            shot: "establishing".into(),
                            character_ids: vec![],
                            image_url: None,
                            dialogues: vec![Dialogue {
                                id: "d4".into(),
                                speaker_id: None,
                                text: "By dawn, the sea had gone quiet.".into(),
                                kind: DialogueKind::Narration,
                            }],
                        }],
                    },
                ],
            },
            Chapter {
                id: "ch2".into(),
                title: "Open Water".into(),
                order: 2,
                summary: "Mira steals a boat.".into(),
                scenes: vec![Scene {
                    id: "s3".into(),
                    title: "Departure".into(),
                    order: 1,
                    setting: "Harbor before sunrise".into(),
                    description: String::new(),
                    panels: vec![],
                }],
            },
        ],
    }
}
