use super::*;
use crate::foundation::core::UiSlot;
use crate::story::dsl::{
    SceneBuilder, SlideBuilder, StoryBuilder, character_asset, hide, say, say_as, set_background,
    show,
};
use crate::story::model::{CharacterPlacement, Textbox};

fn school() -> Story {
    StoryBuilder::new("school", "School")
        .background("room", "/bg/room.avif")
        .unwrap()
        .background("hall", "/bg/hall.avif")
        .unwrap()
        .character(
            "yuki",
            character_asset("Yuki", [("neutral", "/c/yuki.avif")]),
        )
        .unwrap()
        .scene(
            SceneBuilder::new("intro")
                .slide(
                    SlideBuilder::new("s1")
                        .background("room")
                        .character(UiSlot::Left, CharacterPlacement::new("yuki", "neutral"))
                        .step([say_as("yuki", "Good morning")])
                        .step([show(UiSlot::Right, "sensei", "stern")])
                        .build()
                        .unwrap(),
                )
                .slide(
                    SlideBuilder::new("s2")
                        .step([say("The bell rings.")])
                        .step([hide("sensei")])
                        .build()
                        .unwrap(),
                )
                .slide(
                    SlideBuilder::new("s3")
                        .inherit(false)
                        .background("hall")
                        .build()
                        .unwrap(),
                )
                .slide(
                    SlideBuilder::new("s4")
                        .textbox(None, "Silence.")
                        .step([set_background("room", Some(2.0))])
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .scene(
            SceneBuilder::new("after")
                .slide(SlideBuilder::new("a1").step([say("Later")]).build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn step_minus_one_is_initial_overrides_only() {
    let story = school();
    let s = resolve(&story, 0, 0, -1).unwrap();
    assert_eq!(s.background.as_deref(), Some("/bg/room.avif"));
    assert_eq!(s.character(UiSlot::Left).unwrap().id, "yuki");
    assert_eq!(s.textbox, None);
}

#[test]
fn steps_fold_in_order() {
    let story = school();
    let s = resolve(&story, 0, 0, 1).unwrap();
    assert_eq!(s.speaker(), Some("yuki"));
    assert_eq!(s.text(), Some("Good morning"));
    assert_eq!(s.character(UiSlot::Left).unwrap().id, "yuki");
    assert_eq!(s.character(UiSlot::Right).unwrap().id, "sensei");
}

#[test]
fn step_past_end_is_clamped() {
    let story = school();
    let last = resolve(&story, 0, 0, 1).unwrap();
    assert_eq!(resolve(&story, 0, 0, 2).unwrap(), last);
    assert_eq!(resolve(&story, 0, 0, 500).unwrap(), last);
    assert_eq!(resolve(&story, 0, 0, i64::MAX).unwrap(), last);
}

#[test]
fn steps_below_initial_behave_like_initial() {
    let story = school();
    assert_eq!(
        resolve(&story, 0, 0, -9).unwrap(),
        resolve(&story, 0, 0, -1).unwrap()
    );
}

#[test]
fn inheriting_slide_starts_from_previous_final_state() {
    let story = school();
    let s = resolve(&story, 0, 1, -1).unwrap();
    assert_eq!(s, resolve(&story, 0, 0, 1).unwrap());

    let s = resolve(&story, 0, 1, 0).unwrap();
    // Speaker carries over from the previous slide.
    assert_eq!(s.speaker(), Some("yuki"));
    assert_eq!(s.text(), Some("The bell rings."));
    assert_eq!(s.background.as_deref(), Some("/bg/room.avif"));

    let s = resolve(&story, 0, 1, 1).unwrap();
    assert!(s.character(UiSlot::Right).is_none());
    assert_eq!(s.character(UiSlot::Left).unwrap().id, "yuki");
}

#[test]
fn inherit_false_starts_from_empty() {
    let story = school();
    let s = resolve(&story, 0, 2, -1).unwrap();
    assert_eq!(
        s,
        SlideState {
            background: Some("/bg/hall.avif".to_string()),
            ..SlideState::empty()
        }
    );
}

#[test]
fn initial_textbox_replaces_speaker_too() {
    let story = school();
    let s = resolve(&story, 0, 3, -1).unwrap();
    assert_eq!(s.textbox, Some(Textbox::new(None, "Silence.")));
    assert_eq!(s.background.as_deref(), Some("/bg/hall.avif"));

    let s = resolve(&story, 0, 3, 0).unwrap();
    assert_eq!(s.background.as_deref(), Some("/bg/room.avif"));
    assert_eq!(s.background_blur, Some(2.0));
}

#[test]
fn scenes_never_inherit_from_each_other() {
    let story = school();
    let s = resolve(&story, 1, 0, 0).unwrap();
    assert_eq!(s.background, None);
    assert!(s.characters.is_empty());
    assert_eq!(s.speaker(), None);
    assert_eq!(s.text(), Some("Later"));
}

#[test]
fn unknown_initial_background_resolves_to_none() {
    let story = StoryBuilder::new("x", "X")
        .background("room", "/bg/room.avif")
        .unwrap()
        .scene(
            SceneBuilder::new("one")
                .slide(SlideBuilder::new("a").background("room").build().unwrap())
                .slide(SlideBuilder::new("b").background("void").build().unwrap())
                .slide(SlideBuilder::new("c").background("").build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    assert_eq!(resolve(&story, 0, 1, -1).unwrap().background, None);
    // An empty name is not an override.
    assert_eq!(
        resolve(&story, 0, 2, -1).unwrap().background,
        resolve(&story, 0, 1, -1).unwrap().background
    );
}

#[test]
fn initial_character_displaces_same_id_in_other_slot() {
    let story = StoryBuilder::new("x", "X")
        .scene(
            SceneBuilder::new("one")
                .slide(
                    SlideBuilder::new("a")
                        .character(UiSlot::Left, CharacterPlacement::new("yuki", "neutral"))
                        .build()
                        .unwrap(),
                )
                .slide(
                    SlideBuilder::new("b")
                        .character(UiSlot::Right, CharacterPlacement::new("yuki", "smile"))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let s = resolve(&story, 0, 1, -1).unwrap();
    assert_eq!(s.characters.len(), 1);
    assert_eq!(s.slot_of("yuki"), Some(UiSlot::Right));
}

#[test]
fn out_of_range_indices_are_not_found() {
    let story = school();
    let err = resolve(&story, 9, 0, 0).unwrap_err();
    assert!(matches!(err, NovellaError::NotFound(_)));
    assert_eq!(err.to_string(), "not found: scene at index 9 not found");

    let err = resolve(&story, 0, 42, 0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "not found: slide at index 42 not found in scene intro"
    );
}

#[test]
fn resolution_is_deterministic_and_story_is_untouched() {
    let story = school();
    let before = story.clone();
    let a = Resolver::resolve(&story, Cursor::new(0, 1, 1)).unwrap();
    let b = Resolver::resolve(&story, Cursor::new(0, 1, 1)).unwrap();
    assert_eq!(a, b);
    assert_eq!(story, before);
}

#[test]
fn chain_root_stops_at_non_inheriting_slide() {
    let story = school();
    let scene = &story.scenes[0];
    assert_eq!(chain_root(scene, 0), 0);
    assert_eq!(chain_root(scene, 1), 0);
    assert_eq!(chain_root(scene, 2), 2);
    assert_eq!(chain_root(scene, 3), 2);
}
