//! Cross-module dirty-tracking scenarios.

use formstate_core::{DirtyAggregate, DirtyCollection, DirtyValue};
use proptest::prelude::{Just, Strategy, prop_assert, proptest};

#[test]
fn edit_session_over_a_record_list() {
    // Two records, each an aggregate over two fields, shown in one list.
    let first_name = DirtyValue::new("Ada".to_string());
    let first_mail = DirtyValue::new("ada@example.org".to_string());
    let first = DirtyAggregate::new();
    first.add_member(first_name.clone());
    first.add_member(first_mail.clone());

    let second_name = DirtyValue::new("Grace".to_string());
    let second = DirtyAggregate::new();
    second.add_member(second_name.clone());

    let list = DirtyCollection::new();
    list.add(first.clone());
    list.add(second.clone());
    assert!(!list.is_dirty());

    // Edit both records.
    first_mail.set("ada@example.com".to_string());
    second_name.set("Grace H.".to_string());
    assert!(list.is_dirty());

    // Saving the first record alone is not enough to clean the list.
    first.rebaseline();
    assert!(!first.is_dirty());
    assert!(list.is_dirty(), "second record is still dirty");

    // Discarding the second record cleans everything.
    second.reset();
    assert_eq!(second_name.get(), "Grace");
    assert!(!list.is_dirty());

    // The accepted edit survives.
    assert_eq!(first_mail.get(), "ada@example.com");
}

#[test]
fn removing_a_record_detaches_its_tracking() {
    let field = DirtyValue::new(0);
    let record = DirtyAggregate::new();
    record.add_member(field.clone());

    let list = DirtyCollection::new();
    list.add(record.clone());
    list.remove(&record);

    field.set(1);
    assert!(record.is_dirty());
    assert!(!list.is_dirty(), "removed record no longer reported");
}

#[test]
fn collection_rebaseline_only_touches_dirty_records() {
    let edited_field = DirtyValue::new(1);
    let edited = DirtyAggregate::new();
    edited.add_member(edited_field.clone());

    let untouched_field = DirtyValue::new(2);
    let untouched = DirtyAggregate::new();
    untouched.add_member(untouched_field.clone());

    let list = DirtyCollection::new();
    list.add(edited.clone());
    list.add(untouched.clone());
    edited_field.set(10);

    list.rebaseline();
    assert!(!list.is_dirty());
    // The untouched record kept its original baseline.
    untouched_field.set(2);
    assert!(!list.is_dirty());
}

fn shuffled_positions(len: usize) -> impl Strategy<Value = Vec<usize>> {
    Just((0..len).collect::<Vec<usize>>()).prop_shuffle()
}

fn values_with_clear_order() -> impl Strategy<Value = (Vec<i32>, Vec<usize>)> {
    proptest::collection::vec(1i32..1000, 2..6).prop_flat_map(|values| {
        let len = values.len();
        (Just(values), shuffled_positions(len))
    })
}

proptest! {
    /// Clearing dirty members in any order leaves the aggregate dirty until
    /// the last contributor clears, and clean afterwards.
    #[test]
    fn aggregate_final_state_is_clear_order_independent(
        (values, order) in values_with_clear_order(),
    ) {
        let fields: Vec<DirtyValue<i32>> = values.iter().map(|v| DirtyValue::new(*v)).collect();
        let aggregate = DirtyAggregate::new();
        for field in &fields {
            aggregate.add_member(field.clone());
        }
        for field in &fields {
            field.set(field.get() + 1);
        }
        prop_assert!(aggregate.is_dirty());

        for (cleared, &position) in order.iter().enumerate() {
            prop_assert!(
                aggregate.is_dirty(),
                "aggregate went clean with {} dirty members left",
                fields.len() - cleared
            );
            fields[position].reset();
        }
        prop_assert!(!aggregate.is_dirty());
    }
}
