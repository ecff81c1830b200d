use std::sync::Arc;

use memodex_index::{FieldSpec, FieldValue, IndexedField, IndexedState, Indexer};
use memodex_testkit::books::{
    AUTHOR_ID, Book, FREE_FALL, LITTLE_WOMEN, LORD_OF_THE_FLIES, OF_MICE_AND_MEN, PUBLISHER_ID,
    SUBJECT_ID, THE_GREAT_GATSBY, THE_INVISIBLE_MAN, THE_SCARLET_LETTER, THE_TIME_MACHINE,
    TOM_SAWYER, WAR_OF_THE_WORLDS, catalog, find,
};
use memodex_testkit::data_gen::{appended, without};

fn simple_specs() -> Vec<FieldSpec> {
    [AUTHOR_ID, PUBLISHER_ID, SUBJECT_ID]
        .into_iter()
        .map(|field| FieldSpec::simple(field).unwrap())
        .collect()
}

fn publisher_subject() -> FieldSpec {
    FieldSpec::composite([PUBLISHER_ID, SUBJECT_ID]).unwrap()
}

fn same_bucket(
    before: &IndexedState<Book>,
    after: &IndexedState<Book>,
    field: &str,
    value: i64,
) -> bool {
    let value = FieldValue::from(value);
    let before = before.field(field).unwrap().bucket(&value).unwrap();
    let after = after.field(field).unwrap().bucket(&value).unwrap();
    before.ptr_eq(after)
}

fn titles(state: &IndexedState<Book>, field: &str, path: &[i64]) -> Vec<&'static str> {
    let path = path.iter().copied().map(FieldValue::from).collect::<Vec<_>>();
    state
        .field(field)
        .unwrap()
        .lookup(&path)
        .unwrap()
        .iter()
        .map(|book| book.title)
        .collect()
}

#[test]
fn test_catalog_grouping() {
    let books = catalog();
    let mut specs = simple_specs();
    specs.push(publisher_subject());
    let mut indexer = Indexer::new(specs).unwrap();
    let state = indexer.index(&books);

    assert_eq!(state.len(), 4);
    assert_eq!(
        titles(&state, AUTHOR_ID, &[1]),
        vec![
            WAR_OF_THE_WORLDS.title,
            THE_TIME_MACHINE.title,
            THE_INVISIBLE_MAN.title
        ]
    );
    assert_eq!(state.field(AUTHOR_ID).unwrap().len(), 7);
    assert_eq!(state.field(PUBLISHER_ID).unwrap().len(), 4);
    assert_eq!(state.field(SUBJECT_ID).unwrap().len(), 3);

    assert_eq!(
        titles(&state, "publisherIdsubjectId", &[2, 1]),
        vec![THE_TIME_MACHINE.title, THE_INVISIBLE_MAN.title]
    );
    let composite = state.get(&publisher_subject()).unwrap();
    assert_eq!(composite.record_count(), 10);
    assert_eq!(
        composite
            .nested(&FieldValue::from(2))
            .unwrap()
            .sorted_values()
            .into_iter()
            .cloned()
            .collect::<Vec<_>>(),
        vec![FieldValue::from(1), FieldValue::from(2), FieldValue::from(3)]
    );
}

#[test]
fn test_append_keeps_untouched_buckets() {
    let books = catalog();
    let mut indexer = Indexer::new(simple_specs()).unwrap();
    let before = indexer.index(&books);
    let after = indexer.index(&appended(&books, Arc::new(FREE_FALL)));

    assert!(same_bucket(&before, &after, AUTHOR_ID, 1));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 4));
    assert!(!same_bucket(&before, &after, AUTHOR_ID, 7));
    assert!(same_bucket(&before, &after, PUBLISHER_ID, 1));
    assert!(!same_bucket(&before, &after, PUBLISHER_ID, 2));
    assert!(same_bucket(&before, &after, SUBJECT_ID, 1));
    assert!(!same_bucket(&before, &after, SUBJECT_ID, 3));

    assert_eq!(titles(&after, AUTHOR_ID, &[7]), vec![LORD_OF_THE_FLIES.title, FREE_FALL.title]);
}

#[test]
fn test_replaced_record_invalidates_its_buckets() {
    let books = catalog();
    let titles_before = [
        WAR_OF_THE_WORLDS.title,
        THE_TIME_MACHINE.title,
        THE_SCARLET_LETTER.title,
        LORD_OF_THE_FLIES.title,
    ];
    let list = titles_before
        .iter()
        .map(|title| find(&books, title))
        .collect::<Vec<_>>();
    let mut changed = list.clone();
    changed[1] = find(&books, THE_INVISIBLE_MAN.title);

    let mut indexer = Indexer::new(simple_specs()).unwrap();
    let before = indexer.index(&list);
    let after = indexer.index(&changed);

    assert!(!same_bucket(&before, &after, AUTHOR_ID, 1));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 4));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 7));
    assert!(same_bucket(&before, &after, PUBLISHER_ID, 1));
    assert!(!same_bucket(&before, &after, PUBLISHER_ID, 2));
    assert!(!same_bucket(&before, &after, SUBJECT_ID, 1));
    assert!(same_bucket(&before, &after, SUBJECT_ID, 3));
}

#[test]
fn test_removal_drops_and_rebuilds() {
    let books = catalog();
    let removed = [TOM_SAWYER.title, LITTLE_WOMEN.title, LORD_OF_THE_FLIES.title];
    let remaining = without(&books, |book| removed.contains(&book.title));
    assert_eq!(remaining.len(), 7);

    let mut indexer = Indexer::new(simple_specs()).unwrap();
    let before = indexer.index(&books);
    let after = indexer.index(&remaining);

    assert!(same_bucket(&before, &after, AUTHOR_ID, 1));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 4));
    assert!(after.field(AUTHOR_ID).unwrap().bucket(&FieldValue::from(3)).is_none());
    assert!(after.field(AUTHOR_ID).unwrap().bucket(&FieldValue::from(7)).is_none());
    assert!(same_bucket(&before, &after, PUBLISHER_ID, 1));
    assert!(!same_bucket(&before, &after, PUBLISHER_ID, 3));
    assert!(after.field(PUBLISHER_ID).unwrap().bucket(&FieldValue::from(4)).is_none());
    assert!(same_bucket(&before, &after, SUBJECT_ID, 1));
    // The survivors keep their positions, but the bucket is shorter.
    assert!(!same_bucket(&before, &after, SUBJECT_ID, 3));
    assert_eq!(
        titles(&after, SUBJECT_ID, &[3]),
        vec![THE_SCARLET_LETTER.title, THE_GREAT_GATSBY.title]
    );

    let stats = indexer.last_stats().unwrap();
    let authors = stats.field(&FieldSpec::simple(AUTHOR_ID).unwrap()).unwrap();
    assert_eq!(authors.dropped, 2);
    assert!(!authors.field_reused);
}

#[test]
fn test_composite_reuses_whole_top_level_nodes() {
    let books = catalog();
    let list = [
        WAR_OF_THE_WORLDS.title,
        OF_MICE_AND_MEN.title,
        LITTLE_WOMEN.title,
        LORD_OF_THE_FLIES.title,
    ]
    .iter()
    .map(|title| find(&books, title))
    .collect::<Vec<_>>();
    let extended = appended(&list, find(&books, THE_GREAT_GATSBY.title));

    let spec = publisher_subject();
    let mut indexer = Indexer::new([spec.clone()]).unwrap();
    let before = indexer.index(&list);
    let after = indexer.index(&extended);
    let before: &IndexedField<Book> = before.get(&spec).unwrap();
    let after: &IndexedField<Book> = after.get(&spec).unwrap();

    let node = |field: &IndexedField<Book>, publisher: i64| {
        Arc::clone(field.nested(&FieldValue::from(publisher)).unwrap())
    };
    let leaf = |field: &IndexedField<Book>, publisher: i64, subject: i64| {
        field
            .lookup(&[FieldValue::from(publisher), FieldValue::from(subject)])
            .unwrap()
            .clone()
    };

    assert!(Arc::ptr_eq(&node(before, 1), &node(after, 1)));
    assert!(leaf(before, 1, 1).ptr_eq(&leaf(after, 1, 1)));
    assert!(!Arc::ptr_eq(&node(before, 3), &node(after, 3)));
    assert!(!leaf(before, 3, 2).ptr_eq(&leaf(after, 3, 2)));
    assert!(leaf(before, 3, 2).same_records(&leaf(after, 3, 2)));
    assert!(Arc::ptr_eq(&node(before, 4), &node(after, 4)));
    assert!(leaf(before, 4, 3).ptr_eq(&leaf(after, 4, 3)));
}

#[test]
fn test_reordering_invalidates_buckets() {
    let books = catalog();
    let mut reversed = books.clone();
    reversed.reverse();

    let mut indexer = Indexer::new(simple_specs()).unwrap();
    let before = indexer.index(&books);
    let after = indexer.index(&reversed);

    assert!(!same_bucket(&before, &after, AUTHOR_ID, 1));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 4));
    assert_eq!(
        titles(&after, AUTHOR_ID, &[1]),
        vec![
            THE_INVISIBLE_MAN.title,
            THE_TIME_MACHINE.title,
            WAR_OF_THE_WORLDS.title
        ]
    );
}

#[test]
fn test_equal_but_distinct_records_are_changes() {
    let books = catalog();
    let mut copied = books.clone();
    copied[0] = Arc::new(WAR_OF_THE_WORLDS);

    let mut indexer = Indexer::new(simple_specs()).unwrap();
    let before = indexer.index(&books);
    let after = indexer.index(&copied);
    assert!(!same_bucket(&before, &after, AUTHOR_ID, 1));
    assert!(same_bucket(&before, &after, AUTHOR_ID, 2));
}
