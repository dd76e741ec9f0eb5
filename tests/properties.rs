use chrrybmb_site::components::marquee::{build, MarqueeError, TrackSurface, MAX_FILL_PASSES};
use chrrybmb_site::components::search::{NavKey, NavOutcome, SearchEntry, SearchIndex, SearchState};
use proptest::prelude::*;

fn entry(title: String, url: String, path: String) -> SearchEntry {
    SearchEntry {
        title: title.into(),
        url: url.into(),
        path: path.into(),
    }
}

fn entries() -> impl Strategy<Value = Vec<SearchEntry>> {
    prop::collection::vec(
        ("[a-zA-Z ]{0,12}", "/[a-z]{0,8}\\.html", "[a-z-]{0,10}")
            .prop_map(|(t, u, p)| entry(t, u, p)),
        0..12,
    )
}

struct WidthTrack {
    template: Vec<f64>,
    items: Vec<f64>,
}

impl TrackSurface for WidthTrack {
    fn template_len(&self) -> usize {
        self.template.len()
    }
    fn clear(&mut self) {
        self.items.clear();
    }
    fn append_template(&mut self) {
        self.items.extend_from_slice(&self.template);
    }
    fn duplicate_contents(&mut self) {
        let copy = self.items.clone();
        self.items.extend(copy);
    }
    fn width(&self) -> f64 {
        self.items.iter().sum()
    }
}

proptest! {
    #[test]
    fn filter_matches_brute_force(list in entries(), query in "[a-zA-Z. ]{0,3}") {
        let index = SearchIndex::new(list.clone());
        let needle = query.to_lowercase();
        let expected: Vec<usize> = list
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                needle.is_empty()
                    || e.title.to_lowercase().contains(&needle)
                    || e.path.to_lowercase().contains(&needle)
                    || e.url.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(index.filter(&query), expected);
    }

    #[test]
    fn selection_never_leaves_the_list(
        list in entries(),
        downs in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut state = SearchState::new(SearchIndex::new(list));
        state.open();
        let count = state.result_count();
        for down in downs {
            let key = if down { NavKey::Down } else { NavKey::Up };
            match state.handle_key(key) {
                NavOutcome::SelectionMoved(row) => prop_assert!(row < count),
                NavOutcome::Ignored => prop_assert_eq!(count, 0),
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }

    #[test]
    fn marquee_holds_two_cycles(
        template in prop::collection::vec(50.0f64..300.0, 1..5),
        container in 1.0f64..3000.0,
        pps in 10.0f64..200.0,
    ) {
        let mut track = WidthTrack { items: template.clone(), template };
        let cycle = build(&mut track, container, pps).unwrap();
        prop_assert!(cycle.width >= container);
        prop_assert_eq!(track.items.len(), 2 * cycle.template_copies * track.template.len());
        let half = track.items.len() / 2;
        prop_assert_eq!(&track.items[..half], &track.items[half..]);
        let first_cycle: f64 = track.items[..half].iter().sum();
        prop_assert_eq!(cycle.width, first_cycle);
        prop_assert_eq!(cycle.distance_css(), format!("{}px", first_cycle));
        prop_assert!((cycle.duration_secs * pps - cycle.width).abs() < 1e-6);
    }
}

#[test]
fn last_row_stays_selected() {
    let mut state = SearchState::new(SearchIndex::default());
    state.open();
    let last = state.result_count() - 1;
    for _ in 0..(last + 5) {
        state.handle_key(NavKey::Down);
    }
    assert_eq!(state.selected(), Some(last));
}

#[test]
fn about_found_and_nonsense_empty() {
    let index = SearchIndex::default();
    let hits = index.filter("ab");
    assert!(hits
        .iter()
        .any(|&i| index.get(i) == Some(&SearchEntry::new("about", "/about.html", "about"))));
    assert!(index.filter("zzz").is_empty());
}

#[test]
fn empty_template_never_spins() {
    let mut track = WidthTrack {
        template: vec![],
        items: vec![],
    };
    assert_eq!(build(&mut track, 800.0, 60.0), Err(MarqueeError::EmptyTemplate));

    let mut flat = WidthTrack {
        template: vec![0.0],
        items: vec![0.0],
    };
    assert_eq!(
        build(&mut flat, 800.0, 60.0),
        Err(MarqueeError::PassLimit(MAX_FILL_PASSES))
    );
}
