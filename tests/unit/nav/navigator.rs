use super::*;
use crate::story::dsl::{SceneBuilder, SlideBuilder, StoryBuilder, say};

fn story() -> Story {
    StoryBuilder::new("nav", "Nav")
        .scene(
            SceneBuilder::new("one")
                .slide(
                    SlideBuilder::new("a")
                        .step([say("a0")])
                        .step([say("a1")])
                        .build()
                        .unwrap(),
                )
                .slide(SlideBuilder::new("b").build().unwrap())
                .slide(SlideBuilder::new("c").step([say("c0")]).build().unwrap())
                .build()
                .unwrap(),
        )
        .scene(
            SceneBuilder::new("two")
                .slide(SlideBuilder::new("d").step([say("d0")]).build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn walk(story: &Story, nav: Navigator) -> Vec<(Cursor, Advance)> {
    let mut state = nav.start(story).unwrap();
    let mut out = Vec::new();
    loop {
        let before = state.cursor;
        let adv = nav.advance(story, &mut state).unwrap();
        out.push((before, adv));
        if adv == Advance::Complete {
            break;
        }
    }
    out
}

#[test]
fn walks_whole_story_with_initial_entry() {
    let story = story();
    let trail: Vec<_> = walk(&story, Navigator::default())
        .into_iter()
        .map(|(c, a)| (c.to_string(), a))
        .collect();
    assert_eq!(
        trail,
        vec![
            ("0/0/-1".to_string(), Advance::Step),
            ("0/0/0".to_string(), Advance::Step),
            ("0/0/1".to_string(), Advance::Slide),
            ("0/1/-1".to_string(), Advance::Slide),
            ("0/2/-1".to_string(), Advance::Step),
            ("0/2/0".to_string(), Advance::Scene),
            ("1/0/-1".to_string(), Advance::Step),
            ("1/0/0".to_string(), Advance::Complete),
        ]
    );
}

#[test]
fn first_step_entry_skips_initial_state() {
    let story = story();
    let nav = Navigator::new(EntryStep::FirstStep);
    let cursors: Vec<_> = walk(&story, nav)
        .into_iter()
        .map(|(c, _)| c.to_string())
        .collect();
    assert_eq!(cursors, vec!["0/0/0", "0/0/1", "0/1/-1", "0/2/0", "1/0/0"]);
}

#[test]
fn complete_is_sticky_and_keeps_cursor() {
    let story = story();
    let nav = Navigator::default();
    let mut state = nav.jump_to(&story, 1, 0, 0).unwrap();
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Complete);
    assert!(state.is_complete);
    assert_eq!(state.cursor, Cursor::new(1, 0, 0));
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Complete);
    assert_eq!(state.cursor, Cursor::new(1, 0, 0));
}

#[test]
fn next_slide_pointer_overrides_order() {
    let story = StoryBuilder::new("x", "X")
        .scene(
            SceneBuilder::new("one")
                .slide(SlideBuilder::new("a").next_slide("c").build().unwrap())
                .slide(SlideBuilder::new("b").build().unwrap())
                .slide(SlideBuilder::new("c").build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let nav = Navigator::default();
    let mut state = nav.start(&story).unwrap();
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Slide);
    assert_eq!(state.cursor, Cursor::initial(0, 2));
}

#[test]
fn next_scene_pointer_applies_at_scene_end_and_targets_slide() {
    let story = StoryBuilder::new("x", "X")
        .scene(
            SceneBuilder::new("one")
                .slide(
                    SlideBuilder::new("a")
                        .next_scene("three", Some("z"))
                        .build()
                        .unwrap(),
                )
                .slide(
                    SlideBuilder::new("b")
                        .next_scene("three", Some("z"))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .scene(
            SceneBuilder::new("two")
                .slide(SlideBuilder::new("y").build().unwrap())
                .build()
                .unwrap(),
        )
        .scene(
            SceneBuilder::new("three")
                .slide(SlideBuilder::new("w").build().unwrap())
                .slide(SlideBuilder::new("z").build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let nav = Navigator::default();
    let mut state = nav.start(&story).unwrap();

    // A following slide comes first.
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Slide);
    assert_eq!(state.cursor, Cursor::initial(0, 1));

    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Scene);
    assert_eq!(state.cursor, Cursor::initial(2, 1));
}

#[test]
fn unknown_next_scene_falls_back_to_following_scene() {
    let mut story = story();
    story.scenes[0].slides[2].next = Some(crate::story::model::NextPointer {
        scene: Some("nowhere".to_string()),
        slide: None,
    });
    let nav = Navigator::default();
    let mut state = nav.jump_to(&story, 0, 2, 0).unwrap();
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Scene);
    assert_eq!(state.cursor, Cursor::initial(1, 0));
}

#[test]
fn dangling_pointer_falls_back_to_order() {
    // Built by hand: the builder would reject the dangling pointer.
    let mut story = story();
    story.scenes[0].slides[1].next = Some(crate::story::model::NextPointer {
        scene: None,
        slide: Some("missing".to_string()),
    });
    let nav = Navigator::default();
    let mut state = nav.jump_to(&story, 0, 1, -1).unwrap();
    assert_eq!(nav.advance(&story, &mut state).unwrap(), Advance::Slide);
    assert_eq!(state.cursor, Cursor::initial(0, 2));
}

#[test]
fn jump_clamps_step_and_clears_complete() {
    let story = story();
    let nav = Navigator::default();
    let state = nav.jump_to(&story, 0, 0, 99).unwrap();
    assert_eq!(state.cursor, Cursor::new(0, 0, 1));
    assert!(!state.is_complete);
    assert_eq!(nav.jump_to(&story, 0, 1, 5).unwrap().cursor.step, -1);
    assert_eq!(nav.jump_to(&story, 0, 0, -20).unwrap().cursor.step, -1);
}

#[test]
fn jump_to_missing_slide_is_navigation_error() {
    let story = story();
    let err = Navigator::default().jump_to(&story, 0, 9, 0).unwrap_err();
    assert!(matches!(err, NovellaError::Navigation(_)));
    assert!(err.to_string().contains("slide at index 9 not found in scene one"));
}

#[test]
fn entry_step_for_stepless_slide_is_initial() {
    let story = story();
    let b = &story.scenes[0].slides[1];
    assert_eq!(EntryStep::FirstStep.step_for(b), INITIAL_STEP);
    assert_eq!(EntryStep::FirstStep.step_for(&story.scenes[0].slides[0]), 0);
    assert_eq!(EntryStep::Initial.step_for(&story.scenes[0].slides[0]), -1);
}
