use pretty_assertions::assert_eq;
use salesdesk_core::{
    compute_view, CategoryField, FilterSpec, QueueMarker, Record, Segment, SortDirection, SortKey,
    SortSpec, Status,
};

fn ids(records: &[&Record]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

fn pipeline_fixture() -> Vec<Record> {
    vec![
        Record::new("1", "Acme Corp")
            .with_status("new")
            .with_territory("North")
            .with_queue(QueueMarker::Scheduled),
        Record::new("2", "Beta LLC")
            .with_status("new")
            .with_territory("South")
            .with_queue(QueueMarker::Overdue),
        Record::new("3", "Acme International")
            .with_status("won")
            .with_territory("North"),
        Record::new("4", "Delta")
            .with_status("lost")
            .with_territory("North")
            .with_queue(QueueMarker::DueToday),
        Record::new("5", "Other Co")
            .with_status("won")
            .with_territory("South")
            .with_queue(QueueMarker::Overdue),
    ]
}

#[test]
fn status_sort_is_stable_and_paged_is_its_prefix() {
    let raw = pipeline_fixture();
    let sort = SortSpec::new(SortKey::Status, SortDirection::Ascending);

    let view = compute_view(&raw, &FilterSpec::default(), &sort, 3);
    // lost < new < won; ties keep input order.
    assert_eq!(ids(view.filtered()), vec!["4", "1", "2", "3", "5"]);
    assert_eq!(ids(view.paged()), vec!["4", "1", "2"]);
}

#[test]
fn equal_keys_keep_input_order_in_both_directions() {
    let raw = pipeline_fixture();
    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        let sort = SortSpec::new(SortKey::Status, direction);
        let view = compute_view(&raw, &FilterSpec::default(), &sort, usize::MAX);
        let order = ids(view.filtered());
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert!(pos("1") < pos("2"), "{direction:?}");
        assert!(pos("3") < pos("5"), "{direction:?}");
    }
}

#[test]
fn search_matches_case_insensitively_regardless_of_query_case() {
    let raw = pipeline_fixture();
    for query in ["acme", "ACME", "AcMe"] {
        let filter = FilterSpec {
            query: query.to_string(),
            ..FilterSpec::default()
        };
        let view = compute_view(&raw, &filter, &SortSpec::default(), 10);
        let mut found = ids(view.filtered());
        found.sort();
        assert_eq!(found, vec!["1", "3"]);
    }
}

#[test]
fn filtered_is_subset_and_constraints_never_grow_it() {
    let raw = pipeline_fixture();
    let sort = SortSpec::default();

    let mut filter = FilterSpec::default();
    let mut previous = compute_view(&raw, &filter, &sort, usize::MAX).filtered().len();
    assert_eq!(previous, raw.len());

    let steps: Vec<Box<dyn Fn(&mut FilterSpec)>> = vec![
        Box::new(|f: &mut FilterSpec| f.set_category(CategoryField::Territory, Some("North".into()))),
        Box::new(|f: &mut FilterSpec| f.segment = Segment::ActionDue),
        Box::new(|f: &mut FilterSpec| f.query = "del".into()),
        Box::new(|f: &mut FilterSpec| f.set_category(CategoryField::Owner, Some("nobody".into()))),
    ];
    for step in steps {
        step(&mut filter);
        let view = compute_view(&raw, &filter, &sort, usize::MAX);
        assert!(view.filtered().len() <= previous);
        assert!(view
            .filtered()
            .iter()
            .all(|r| raw.iter().any(|candidate| candidate.id == r.id)));
        previous = view.filtered().len();
    }
    assert_eq!(previous, 0);
}

#[test]
fn growing_page_size_extends_the_prefix() {
    let raw = pipeline_fixture();
    let filter = FilterSpec::default();
    let sort = SortSpec::default();
    for small in 0..raw.len() {
        for large in small..=raw.len() + 1 {
            let a = ids(compute_view(&raw, &filter, &sort, small).paged());
            let b = ids(compute_view(&raw, &filter, &sort, large).paged());
            assert!(b.starts_with(&a), "{small} vs {large}");
        }
    }
}

#[test]
fn priority_sort_ranks_queue_markers() {
    let raw = pipeline_fixture();
    let view = compute_view(&raw, &FilterSpec::default(), &SortSpec::default(), 10);
    assert_eq!(ids(view.filtered()), vec!["2", "5", "4", "1", "3"]);
}

#[test]
fn status_segment_folds_legacy_spellings() {
    let mut raw = pipeline_fixture();
    raw.push(Record::new("6", "Legacy").with_status("Closed Won"));
    raw.push(Record::new("7", "Legacy lost").with_status("closed_lost"));
    let filter = FilterSpec {
        segment: Segment::Status(Status::Won),
        ..FilterSpec::default()
    };
    let view = compute_view(&raw, &filter, &SortSpec::default(), 10);
    let mut found = ids(view.filtered());
    found.sort();
    assert_eq!(found, vec!["3", "5", "6"]);
}
