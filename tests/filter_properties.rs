use proptest::prelude::*;

use table_pipeline::filter::{FilterNode, PredicateCompiler, RecordPredicate};
use table_pipeline::registry::InMemoryServiceRegistry;
use table_pipeline::types::{Record, Value};

const FIELDS: [&str; 3] = ["a", "b", "c"];

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-50i64..50).prop_map(Value::from),
        (-50.0f64..50.0).prop_map(Value::from),
        "[a-zA-Z]{0,4}".prop_map(Value::from),
    ]
}

fn field() -> impl Strategy<Value = String> {
    prop::sample::select(FIELDS.to_vec()).prop_map(str::to_string)
}

fn record() -> impl Strategy<Value = Record> {
    prop::collection::vec((field(), value()), 0..4)
        .prop_map(|pairs| pairs.into_iter().collect::<Record>())
}

fn leaf() -> impl Strategy<Value = FilterNode> {
    prop_oneof![
        (field(), value()).prop_map(|(f, v)| FilterNode::equals(f, v)),
        (field(), value()).prop_map(|(f, v)| FilterNode::equals(f, v).ignore_case()),
        (field(), value()).prop_map(|(f, v)| FilterNode::not_equals(f, v)),
        (field(), prop::option::of(value()), prop::option::of(value()))
            .prop_map(|(f, lo, hi)| FilterNode::range(f, lo, hi)),
        (field(), prop::collection::vec(value(), 0..3)).prop_map(|(f, vs)| FilterNode::one_of(f, vs)),
        (field(), prop::collection::vec(value(), 0..3))
            .prop_map(|(f, vs)| FilterNode::not_one_of(f, vs)),
        (field(), value()).prop_map(|(f, v)| FilterNode::contains(f, v)),
        (field(), value()).prop_map(|(f, v)| FilterNode::starts_with(f, v).ignore_case()),
        (field(), value()).prop_map(|(f, v)| FilterNode::ends_with(f, v)),
        field().prop_map(FilterNode::is_null),
        field().prop_map(FilterNode::is_not_null),
        (field(), value()).prop_map(|(f, v)| FilterNode::greater_than(f, v)),
        (field(), value()).prop_map(|(f, v)| FilterNode::less_than(f, v)),
    ]
}

fn tree() -> impl Strategy<Value = FilterNode> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(FilterNode::and),
            prop::collection::vec(inner.clone(), 0..4).prop_map(FilterNode::or),
            inner.prop_map(FilterNode::not),
        ]
    })
}

fn compile(node: &FilterNode) -> RecordPredicate {
    let registry = InMemoryServiceRegistry::new();
    PredicateCompiler::new(&registry).compile(Some(node)).unwrap()
}

proptest! {
    #[test]
    fn built_in_trees_always_compile_and_evaluate(node in tree(), records in prop::collection::vec(record(), 0..6)) {
        let predicate = compile(&node);
        for r in &records {
            let _ = predicate(r);
        }
    }

    #[test]
    fn not_equals_is_the_complement_of_equals(f in field(), v in value(), r in record()) {
        let eq = compile(&FilterNode::equals(f.as_str(), v.clone()));
        let ne = compile(&FilterNode::not_equals(f, v));
        prop_assert_ne!(eq(&r), ne(&r));
    }

    #[test]
    fn null_operands_compare_false(f in field(), v in value(), r in record()) {
        let absent = Record::new();
        prop_assert!(!compile(&FilterNode::greater_than(f.as_str(), v.clone()))(&absent));
        prop_assert!(!compile(&FilterNode::less_than(f.as_str(), v.clone()))(&absent));
        prop_assert!(!compile(&FilterNode::contains(f.as_str(), v.clone()))(&absent));
        prop_assert!(!compile(&FilterNode::range(f.as_str(), Some(v.clone()), None::<Value>))(&absent));
        prop_assert!(!compile(&FilterNode::greater_than(f.as_str(), Value::Null))(&r));
        prop_assert!(!compile(&FilterNode::starts_with(f, Value::Null))(&r));
    }

    #[test]
    fn equals_null_matches_exactly_the_null_fields(f in field(), r in record()) {
        let is_null = compile(&FilterNode::is_null(f.as_str()))(&r);
        prop_assert_eq!(compile(&FilterNode::equals(f.as_str(), Value::Null))(&r), is_null);
        prop_assert_eq!(compile(&FilterNode::is_not_null(f))(&r), !is_null);
    }

    #[test]
    fn empty_combinators_are_identities(r in record(), node in tree()) {
        prop_assert!(compile(&FilterNode::and([]))(&r));
        prop_assert!(!compile(&FilterNode::or([]))(&r));

        let single = compile(&node)(&r);
        prop_assert_eq!(compile(&FilterNode::and([node.clone()]))(&r), single);
        prop_assert_eq!(compile(&FilterNode::or([node.clone()]))(&r), single);
        prop_assert_eq!(compile(&FilterNode::not(node))(&r), !single);
    }

    #[test]
    fn range_bounds_are_inclusive(x in -100i64..100, lo in -100i64..100, hi in -100i64..100) {
        let r = Record::new().with("n", x);
        let inside = compile(&FilterNode::range("n", Some(lo), Some(hi)))(&r);
        prop_assert_eq!(inside, lo <= x && x <= hi);
        prop_assert!(compile(&FilterNode::range("n", Some(x), Some(x)))(&r));
        prop_assert!(compile(&FilterNode::range("n", Some(x as f64), None::<Value>))(&r));
    }

    #[test]
    fn ignore_case_equality_folds_strings(s in "[a-zA-Z]{1,8}") {
        let r = Record::new().with("name", s.as_str());
        prop_assert!(compile(&FilterNode::equals("name", s.to_uppercase()).ignore_case())(&r));
        prop_assert!(compile(&FilterNode::equals("name", s.to_lowercase()).ignore_case())(&r));
        prop_assert!(compile(&FilterNode::one_of("name", [s.to_uppercase()]).ignore_case())(&r));
        prop_assert!(compile(&FilterNode::contains("name", s.to_uppercase()).ignore_case())(&r));
    }
}
