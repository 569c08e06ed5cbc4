//! Integration tests for function dispatch and aggregation policies.

use rstest::rstest;
use std::sync::Arc;
use tidings::{
    Aggregation, DispatcherFactory, Flow, FuncDispatcher, FuncResult, PublishFlags, filter_fn,
    testing::ConstFunc,
};

fn prices() -> FuncDispatcher<&'static str, u32> {
    let prices = DispatcherFactory::default().create_func::<&'static str, u32>();
    prices.subscribe(|symbol: &&'static str| match *symbol {
        "ACME" => FuncResult::Success(10),
        _ => FuncResult::none(),
    });
    prices.subscribe(|symbol: &&'static str| match *symbol {
        "ACME" | "INIT" => FuncResult::Success(20),
        _ => FuncResult::Failure(Some(0)),
    });
    prices
}

#[rstest]
#[case("ACME", Aggregation::ReturnFirst, FuncResult::Success(10))]
#[case("ACME", Aggregation::ReturnLast, FuncResult::Success(20))]
#[case("INIT", Aggregation::ReturnFirst, FuncResult::none())]
#[case("INIT", Aggregation::ReturnFirstSuccess, FuncResult::Success(20))]
#[case("NONE", Aggregation::ReturnLast, FuncResult::Failure(Some(0)))]
#[case("NONE", Aggregation::ReturnLastSuccess, FuncResult::none())]
fn test_price_lookup(
    #[case] symbol: &'static str,
    #[case] policy: Aggregation,
    #[case] expected: FuncResult<u32>,
) {
    assert_eq!(prices().publish(&symbol, policy), expected);
}

#[test]
fn test_first_success_and_stop_skips_rest() {
    let dispatcher = FuncDispatcher::<(), i32>::new();
    let first = ConstFunc::success(5);
    let second = ConstFunc::failure(10);
    let second_calls = second.calls();
    dispatcher.subscribe(first);
    dispatcher.subscribe(second);

    assert_eq!(
        dispatcher.publish(&(), Aggregation::ReturnFirstSuccessAndStop),
        FuncResult::Success(5)
    );
    assert_eq!(second_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(
        dispatcher.publish(&(), Aggregation::ReturnLast),
        FuncResult::Failure(Some(10))
    );
}

#[test]
fn test_filtered_func_reports_none_when_blocked() {
    let dispatcher = FuncDispatcher::<u32, u32>::new();
    dispatcher.subscribe_filtered(
        Arc::new(|v: &u32| FuncResult::Success(v * 10)),
        vec![Arc::new(filter_fn(0, |v: &u32| Flow::from(*v > 1)))],
    );

    let results: Vec<_> = dispatcher.publish_iter(&1, PublishFlags::empty()).collect();
    assert_eq!(results, vec![FuncResult::none()]);
    assert_eq!(
        dispatcher.publish(&2, Aggregation::ReturnFirst),
        FuncResult::Success(20)
    );
}

#[test]
fn test_publish_iter_can_be_abandoned() {
    let dispatcher = FuncDispatcher::<(), i32>::new();
    let calls: Vec<_> = (0..4)
        .map(|n| {
            let handler = ConstFunc::success(n);
            let calls = handler.calls();
            dispatcher.subscribe(handler);
            calls
        })
        .collect();

    let found = dispatcher
        .publish_iter(&(), PublishFlags::SKIP_FAILURES)
        .find(|r| r.value() == Some(&1));
    assert_eq!(found, Some(FuncResult::Success(1)));

    let invoked: Vec<usize> = calls
        .iter()
        .map(|c| c.load(std::sync::atomic::Ordering::SeqCst))
        .collect();
    assert_eq!(invoked, vec![1, 1, 0, 0]);
}
