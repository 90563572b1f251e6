#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test_case("delivered", MetricEvent::Delivered)]
#[test_case("OPENED", MetricEvent::Opened)]
#[test_case("Converted", MetricEvent::Converted)]
#[test_case(" clicked ", MetricEvent::Clicked)]
fn MetricEvent___parse_known_name___matches(name: &str, expected: MetricEvent) {
    assert_eq!(MetricEvent::parse(name), Some(expected));
}

#[test_case("")]
#[test_case("bounced")]
#[test_case("open")]
fn MetricEvent___parse_unknown_name___none(name: &str) {
    assert_eq!(MetricEvent::parse(name), None);
}

#[test_case(MetricEvent::Delivered)]
#[test_case(MetricEvent::Opened)]
#[test_case(MetricEvent::Converted)]
#[test_case(MetricEvent::Clicked)]
fn MetricEvent___display___parses_back(event: MetricEvent) {
    assert_eq!(MetricEvent::parse(&event.to_string()), Some(event));
}
