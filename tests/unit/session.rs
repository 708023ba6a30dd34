use super::*;
use crate::foundation::core::UiSlot;
use crate::story::dsl::{SceneBuilder, SlideBuilder, StoryBuilder, say, say_as, show};

fn story() -> Arc<Story> {
    Arc::new(
        StoryBuilder::new("sess", "Session")
            .scene(
                SceneBuilder::new("one")
                    .slide(
                        SlideBuilder::new("a")
                            .step([show(UiSlot::Left, "yuki", "neutral")])
                            .step([say_as("yuki", "Hi")])
                            .build()
                            .unwrap(),
                    )
                    .slide(SlideBuilder::new("b").step([say("...")]).build().unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    )
}

#[test]
fn plays_to_completion() {
    let mut s = Session::new(story(), SessionOpts::default()).unwrap();
    assert_eq!(s.cursor(), Cursor::initial(0, 0));

    let mut texts = Vec::new();
    while !s.is_complete() {
        texts.push(s.state().unwrap().text().map(str::to_owned));
        s.advance().unwrap();
    }
    assert_eq!(
        texts,
        vec![
            None,
            None,
            Some("Hi".to_string()),
            Some("Hi".to_string()),
            Some("...".to_string()),
        ]
    );
    // Still resolvable after completion.
    assert_eq!(s.state().unwrap().speaker(), Some("yuki"));
}

#[test]
fn memoized_and_plain_sessions_agree() {
    let story = story();
    let mut cached = Session::new(Arc::clone(&story), SessionOpts::default()).unwrap();
    let mut plain = Session::new(
        Arc::clone(&story),
        SessionOpts {
            memoize: false,
            ..SessionOpts::default()
        },
    )
    .unwrap();
    assert!(plain.cache_stats().is_none());

    while !cached.is_complete() {
        assert_eq!(cached.cursor(), plain.cursor());
        assert_eq!(cached.state().unwrap(), plain.state().unwrap());
        cached.advance().unwrap();
        plain.advance().unwrap();
    }
    assert!(cached.cache_stats().unwrap().entries > 0);
}

#[test]
fn url_round_trip() {
    let mut s = Session::new(story(), SessionOpts::default()).unwrap();
    let mut url = Url::parse("https://example.org/read").unwrap();

    s.to_url(&mut url).unwrap();
    assert_eq!(url.query(), None);

    s.jump_to(0, 1, 0).unwrap();
    s.to_url(&mut url).unwrap();

    let mut other = Session::new(story(), SessionOpts::default()).unwrap();
    assert!(other.restore_from_url(&url).unwrap());
    assert_eq!(other.cursor(), Cursor::new(0, 1, 0));
    assert_eq!(other.state().unwrap(), s.state().unwrap());

    let plain = Url::parse("https://example.org/read").unwrap();
    assert!(!other.restore_from_url(&plain).unwrap());
    assert_eq!(other.cursor(), Cursor::new(0, 1, 0));
}

#[test]
fn restart_and_replace_story() {
    let mut s = Session::new(story(), SessionOpts::default()).unwrap();
    s.jump_to(0, 1, 0).unwrap();
    s.state().unwrap();

    let smaller = Arc::new(
        StoryBuilder::new("small", "Small")
            .scene(
                SceneBuilder::new("one")
                    .slide(SlideBuilder::new("a").step([say("only")]).build().unwrap())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    s.replace_story(Arc::clone(&smaller)).unwrap();
    assert_eq!(s.cursor(), Cursor::new(0, 0, 0));
    assert_eq!(s.cache_stats().unwrap().entries, 0);
    assert_eq!(s.state().unwrap().text(), Some("only"));

    s.restart().unwrap();
    assert_eq!(s.cursor(), Cursor::initial(0, 0));
}

#[test]
fn view_projects_current_state() {
    let mut s = Session::new(story(), SessionOpts::default()).unwrap();
    s.jump_to(0, 0, 1).unwrap();
    let view = s.view(&AssetCatalog::new()).unwrap();
    assert_eq!(view.sprites.len(), 1);
    assert_eq!(view.dialogue.unwrap().text, "Hi");
}
