use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use wrapped_core::{expand_slides, extract_summary, SlideRecord, VirtualSlide, PAGE_SIZE};

fn record(tag: &str, data: Value) -> SlideRecord {
    let Value::Object(map) = data else {
        panic!("slide data must be an object");
    };
    SlideRecord::new(tag, tag.replace('_', " "), map)
}

fn roasts(count: usize) -> SlideRecord {
    let individual: Map<String, Value> = (0..count)
        .map(|i| (format!("person {i:02}"), json!(format!("roast {i}"))))
        .collect();
    record(
        "ai_roasts",
        json!({
            "brainrot_score": 73,
            "group_roast": "collectively unwell",
            "individual_roasts": individual,
        }),
    )
}

fn signature_words(people: usize) -> SlideRecord {
    let per_person: Map<String, Value> = (0..people)
        .map(|i| (format!("person {i}"), json!(["fr", "ngl"])))
        .collect();
    record("signature_words", json!({ "per_person": per_person }))
}

fn sample_slides() -> Vec<SlideRecord> {
    vec![
        record(
            "overview",
            json!({"total_messages": 1200, "streak": {"longest_streak": 12, "total_active_days": 200}}),
        ),
        record("ranking", json!({"rankings": [{"name": "amy", "count": 700}]})),
        record("chat_graph", json!({"members": [{"name": "amy", "messages": 700}]})),
        signature_words(7),
        roasts(12),
        record("vibe_check", json!({"vibe": "chaotic"})),
    ]
}

fn roast_pages(deck: &[VirtualSlide]) -> Vec<Vec<String>> {
    deck.iter()
        .filter_map(|slide| match slide {
            VirtualSlide::IndividualRoasts { entries, .. } => {
                Some(entries.iter().map(|e| e.name.clone()).collect())
            }
            _ => None,
        })
        .collect()
}

#[test]
fn deck_is_framed_by_intro_summary_outro() {
    for slides in [Vec::new(), sample_slides(), vec![record("chat_graph", json!({}))]] {
        let deck = expand_slides(&slides, None);
        assert_eq!(deck.first(), Some(&VirtualSlide::Intro));
        assert_eq!(deck.last(), Some(&VirtualSlide::Outro));
        let summaries: Vec<_> = deck
            .iter()
            .enumerate()
            .filter(|(_, slide)| matches!(slide, VirtualSlide::Summary(_)))
            .map(|(index, _)| index)
            .collect();
        assert_eq!(summaries, vec![deck.len() - 2]);
    }
}

#[test]
fn chat_graph_never_appears() {
    let deck = expand_slides(&sample_slides(), None);
    assert!(!deck.iter().any(|slide| match slide {
        VirtualSlide::Regular(record) | VirtualSlide::BrainRot(record) => record.tag == "chat_graph",
        _ => false,
    }));
}

#[test]
fn twelve_roasts_make_three_pages_in_order() {
    let deck = expand_slides(&[roasts(12)], None);
    let pages = roast_pages(&deck);

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].len(), PAGE_SIZE);
    assert_eq!(pages[1].len(), PAGE_SIZE);
    assert_eq!(pages[2], vec!["person 10".to_string(), "person 11".to_string()]);
    assert_eq!(pages[0][0], "person 00");

    let brain_rot = deck
        .iter()
        .position(|slide| matches!(slide, VirtualSlide::BrainRot(_)))
        .expect("brain rot slide");
    assert!(matches!(
        deck[brain_rot + 1],
        VirtualSlide::IndividualRoasts { page: 0, .. }
    ));
}

#[test]
fn divisible_roasts_fill_last_page() {
    let deck = expand_slides(&[roasts(10)], None);
    let pages = roast_pages(&deck);
    assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 5]);
}

#[test]
fn roasts_without_people_still_get_brain_rot() {
    let deck = expand_slides(&[roasts(0)], None);
    assert!(deck.iter().any(|s| matches!(s, VirtualSlide::BrainRot(_))));
    assert!(roast_pages(&deck).is_empty());
}

#[test]
fn seven_signature_people_make_two_pages() {
    let deck = expand_slides(&[signature_words(7)], None);
    let pages: Vec<_> = deck
        .iter()
        .filter_map(|slide| match slide {
            VirtualSlide::SignatureWords {
                entries,
                page,
                total_pages,
            } => Some((entries.len(), *page, *total_pages)),
            _ => None,
        })
        .collect();

    assert_eq!(pages, vec![(5, 0, 2), (2, 1, 2)]);
    assert!(!deck.iter().any(|slide| matches!(
        slide,
        VirtualSlide::Regular(record) if record.tag == "signature_words"
    )));
}

#[test]
fn other_tags_map_one_to_one_in_order() {
    let deck = expand_slides(&sample_slides(), None);
    let regular: Vec<_> = deck
        .iter()
        .filter_map(|slide| match slide {
            VirtualSlide::Regular(record) => Some(record.tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(regular, vec!["overview", "ranking", "vibe_check"]);
}

#[test]
fn expansion_is_deterministic() {
    let slides = sample_slides();
    let mut metadata = Map::new();
    metadata.insert("group_name".to_string(), json!("the lads"));

    let first = expand_slides(&slides, Some(&metadata));
    let second = expand_slides(&slides, Some(&metadata));
    assert_eq!(first, second);
}

#[test]
fn summary_slide_matches_extractor_over_full_input() {
    let slides = sample_slides();
    let deck = expand_slides(&slides, None);
    let expected = extract_summary(&slides, None);
    assert_eq!(deck[deck.len() - 2], VirtualSlide::Summary(expected));
}
