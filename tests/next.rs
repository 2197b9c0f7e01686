use chrono::{DateTime, TimeDelta, Timelike, Utc};
use cronex::Expression;
use rstest::rstest;
use std::time::Duration;

fn check(pattern: &str, from: &str, expected: &str) {
    let expression = cronex::parse(pattern).unwrap();
    let from = DateTime::parse_from_rfc3339(from).unwrap();
    let next = expression.next(&from);

    if expected == "None" {
        assert!(
            next.is_none(),
            "pattern = {pattern}, from = {from}, next = {next:?}"
        );
    } else {
        assert_eq!(
            next.map(|next| next.to_rfc3339()).as_deref(),
            Some(expected),
            "pattern = {pattern}, from = {from}"
        );
    }
}

#[rstest]
// every second
#[case("* * * * * * *", "2013-01-01T00:00:00Z", "2013-01-01T00:00:01+00:00")]
#[case("* * * * * * *", "2013-01-01T00:00:59Z", "2013-01-01T00:01:00+00:00")]
#[case("* * * * * * *", "2013-01-01T00:59:59Z", "2013-01-01T01:00:00+00:00")]
#[case("* * * * * * *", "2013-01-01T23:59:59Z", "2013-01-02T00:00:00+00:00")]
#[case("* * * * * * *", "2013-02-28T23:59:59Z", "2013-03-01T00:00:00+00:00")]
#[case("* * * * * * *", "2016-02-28T23:59:59Z", "2016-02-29T00:00:00+00:00")]
#[case("* * * * * * *", "2012-12-31T23:59:59Z", "2013-01-01T00:00:00+00:00")]
// every five seconds
#[case("*/5 * * * * * *", "2013-01-01T00:00:00Z", "2013-01-01T00:00:05+00:00")]
#[case("*/5 * * * * * *", "2013-01-01T00:00:59Z", "2013-01-01T00:01:00+00:00")]
#[case("*/5 * * * * * *", "2013-02-28T23:59:59Z", "2013-03-01T00:00:00+00:00")]
#[case("*/5 * * * * * *", "2016-02-28T23:59:59Z", "2016-02-29T00:00:00+00:00")]
// every minute
#[case("* * * * *", "2013-01-01T00:00:00Z", "2013-01-01T00:01:00+00:00")]
#[case("* * * * *", "2013-01-01T00:00:59Z", "2013-01-01T00:01:00+00:00")]
#[case("* * * * *", "2013-01-01T00:59:00Z", "2013-01-01T01:00:00+00:00")]
#[case("* * * * *", "2013-01-01T23:59:00Z", "2013-01-02T00:00:00+00:00")]
#[case("* * * * *", "2013-02-28T23:59:00Z", "2013-03-01T00:00:00+00:00")]
#[case("* * * * *", "2016-02-28T23:59:00Z", "2016-02-29T00:00:00+00:00")]
#[case("* * * * *", "2012-12-31T23:59:00Z", "2013-01-01T00:00:00+00:00")]
// minutes with interval
#[case("17-43/5 * * * *", "2013-01-01T00:00:00Z", "2013-01-01T00:17:00+00:00")]
#[case("17-43/5 * * * *", "2013-01-01T00:16:59Z", "2013-01-01T00:17:00+00:00")]
#[case("17-43/5 * * * *", "2013-01-01T00:30:00Z", "2013-01-01T00:32:00+00:00")]
#[case("17-43/5 * * * *", "2013-01-01T00:50:00Z", "2013-01-01T01:17:00+00:00")]
#[case("17-43/5 * * * *", "2013-01-01T23:50:00Z", "2013-01-02T00:17:00+00:00")]
#[case("17-43/5 * * * *", "2013-02-28T23:50:00Z", "2013-03-01T00:17:00+00:00")]
#[case("17-43/5 * * * *", "2012-12-31T23:50:00Z", "2013-01-01T00:17:00+00:00")]
// minutes interval inside a list
#[case("15-30/4,55 * * * *", "2013-01-01T00:00:00Z", "2013-01-01T00:15:00+00:00")]
#[case("15-30/4,55 * * * *", "2013-01-01T00:16:00Z", "2013-01-01T00:19:00+00:00")]
#[case("15-30/4,55 * * * *", "2013-01-01T00:30:00Z", "2013-01-01T00:55:00+00:00")]
#[case("15-30/4,55 * * * *", "2013-01-01T00:55:00Z", "2013-01-01T01:15:00+00:00")]
#[case("15-30/4,55 * * * *", "2013-01-01T23:55:00Z", "2013-01-02T00:15:00+00:00")]
#[case("15-30/4,55 * * * *", "2012-12-31T23:54:00Z", "2012-12-31T23:55:00+00:00")]
#[case("15-30/4,55 * * * *", "2012-12-31T23:55:00Z", "2013-01-01T00:15:00+00:00")]
// days of week
#[case("0 0 * * MON", "2013-01-01T00:00:00Z", "2013-01-07T00:00:00+00:00")]
#[case("0 0 * * MON", "2013-01-28T00:00:00Z", "2013-02-04T00:00:00+00:00")]
#[case("0 0 * * MON", "2013-12-30T00:30:00Z", "2014-01-06T00:00:00+00:00")]
#[case("0 0 * * friday", "2013-01-01T00:00:00Z", "2013-01-04T00:00:00+00:00")]
#[case("0 0 * * friday", "2013-01-28T00:00:00Z", "2013-02-01T00:00:00+00:00")]
#[case("0 0 * * friday", "2013-12-30T00:30:00Z", "2014-01-03T00:00:00+00:00")]
#[case("0 0 * * 6,7", "2013-01-01T00:00:00Z", "2013-01-05T00:00:00+00:00")]
#[case("0 0 * * 6,7", "2013-01-05T00:00:00Z", "2013-01-06T00:00:00+00:00")]
#[case("0 0 * * 6,7", "2013-01-28T00:00:00Z", "2013-02-02T00:00:00+00:00")]
#[case("0 0 * * 5-7", "2013-01-01T00:00:00Z", "2013-01-04T00:00:00+00:00")]
#[case("0 0 * * 5-7", "2013-01-04T00:00:00Z", "2013-01-05T00:00:00+00:00")]
#[case("0 0 * * 5-7", "2013-01-05T00:00:00Z", "2013-01-06T00:00:00+00:00")]
// fifth Saturday of the month
#[case("0 0 * * 6#5", "2013-09-02T00:00:00Z", "2013-11-30T00:00:00+00:00")]
// nearest weekday
#[case("0 0 14W * *", "2013-03-31T00:00:00Z", "2013-04-15T00:00:00+00:00")]
#[case("0 0 14W * *", "2013-08-31T00:00:00Z", "2013-09-13T00:00:00+00:00")]
#[case("0 0 30W * *", "2013-03-02T00:00:00Z", "2013-03-29T00:00:00+00:00")]
#[case("0 0 30W * *", "2013-06-02T00:00:00Z", "2013-06-28T00:00:00+00:00")]
#[case("0 0 30W * *", "2013-09-02T00:00:00Z", "2013-09-30T00:00:00+00:00")]
#[case("0 0 30W * *", "2013-11-02T00:00:00Z", "2013-11-29T00:00:00+00:00")]
// last day of the month
#[case("0 0 L * *", "2013-09-02T00:00:00Z", "2013-09-30T00:00:00+00:00")]
#[case("0 0 L * *", "2014-01-01T00:00:00Z", "2014-01-31T00:00:00+00:00")]
#[case("0 0 L * *", "2014-02-01T00:00:00Z", "2014-02-28T00:00:00+00:00")]
#[case("0 0 L * *", "2016-02-15T00:00:00Z", "2016-02-29T00:00:00+00:00")]
// last workday of the month
#[case("0 0 LW * *", "2013-09-02T00:00:00Z", "2013-09-30T00:00:00+00:00")]
#[case("0 0 LW * *", "2013-11-02T00:00:00Z", "2013-11-29T00:00:00+00:00")]
#[case("0 0 LW * *", "2014-08-15T00:00:00Z", "2014-08-29T00:00:00+00:00")]
// zero padded months
#[case("0 0 0 * 04 * *", "2013-09-02T00:00:00Z", "2014-04-01T00:00:00+00:00")]
#[case("0 0 0 * 04 * *", "2014-04-03T03:00:00Z", "2014-04-04T00:00:00+00:00")]
#[case("0 0 0 * 04 * *", "2014-08-15T00:00:00Z", "2015-04-01T00:00:00+00:00")]
// leap years
#[case("0 0 0 29 2 *", "2013-01-01T00:00:00Z", "2016-02-29T00:00:00+00:00")]
#[case("0 0 0 29 2 *", "2016-03-01T00:00:00Z", "2020-02-29T00:00:00+00:00")]
#[case("0 0 0 29 2 * 1999", "1999-01-01T00:00:00Z", "None")]
#[case("0 0 0 29 2 * 1999/3", "1999-01-01T00:00:00Z", "2008-02-29T00:00:00+00:00")]
// year bounds
#[case("* * * * * 1980", "2013-08-31T00:00:00Z", "None")]
#[case("* * * * * 2050", "2013-08-31T00:00:00Z", "2050-01-01T00:00:00+00:00")]
#[case("* * * * * 2099", "2099-12-31T23:59:59Z", "None")]
// expression aliases
#[case("@hourly", "2013-01-01T10:30:00Z", "2013-01-01T11:00:00+00:00")]
#[case("@daily", "2013-01-01T10:30:00Z", "2013-01-02T00:00:00+00:00")]
#[case("@weekly", "2013-01-01T10:30:00Z", "2013-01-06T00:00:00+00:00")]
#[case("@monthly", "2013-01-01T10:30:00Z", "2013-02-01T00:00:00+00:00")]
#[case("@yearly", "2013-01-01T10:30:00Z", "2014-01-01T00:00:00+00:00")]
#[timeout(Duration::from_secs(5))]
fn next_occurrence(#[case] pattern: &str, #[case] from: &str, #[case] expected: &str) {
    check(pattern, from, expected);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
fn next_n_fifth_saturdays() {
    let expression = cronex::parse("0 0 * * 6#5").unwrap();
    let from = DateTime::parse_from_rfc3339("2013-09-02T08:44:30Z").unwrap();
    let result: Vec<String> = expression
        .next_n(&from, 5)
        .into_iter()
        .map(|next| next.to_rfc3339())
        .collect();
    assert_eq!(
        result,
        vec![
            "2013-11-30T00:00:00+00:00",
            "2014-03-29T00:00:00+00:00",
            "2014-05-31T00:00:00+00:00",
            "2014-08-30T00:00:00+00:00",
            "2014-11-29T00:00:00+00:00",
        ]
    );
}

#[rstest]
#[timeout(Duration::from_secs(5))]
fn next_n_every_five_minutes() {
    let expression = cronex::parse("*/5 * * * *").unwrap();
    let from = DateTime::parse_from_rfc3339("2013-09-02T08:44:32Z").unwrap();
    let result: Vec<String> = expression
        .next_n(&from, 5)
        .into_iter()
        .map(|next| next.to_rfc3339())
        .collect();
    assert_eq!(
        result,
        vec![
            "2013-09-02T08:45:00+00:00",
            "2013-09-02T08:50:00+00:00",
            "2013-09-02T08:55:00+00:00",
            "2013-09-02T09:00:00+00:00",
            "2013-09-02T09:05:00+00:00",
        ]
    );
}

#[rstest]
#[timeout(Duration::from_secs(5))]
fn next_n_truncates_at_horizon() {
    let expression = cronex::parse("* * * * * 2013").unwrap();
    let from = DateTime::parse_from_rfc3339("2013-12-31T23:57:30Z").unwrap();
    let result = expression.next_n(&from, 10);
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].to_rfc3339(), "2013-12-31T23:58:00+00:00");
    assert_eq!(result[1].to_rfc3339(), "2013-12-31T23:59:00+00:00");
}

#[rstest]
#[timeout(Duration::from_secs(5))]
fn iterator_yields_successive_events() {
    let expression = cronex::parse("0 0 12 * 1 MON 2024").unwrap();
    let from = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
    let result: Vec<String> = expression.iter(&from).map(|next| next.to_rfc3339()).collect();
    assert_eq!(
        result,
        vec![
            "2024-01-01T12:00:00+00:00",
            "2024-01-08T12:00:00+00:00",
            "2024-01-15T12:00:00+00:00",
            "2024-01-22T12:00:00+00:00",
            "2024-01-29T12:00:00+00:00",
        ]
    );
}

#[rstest]
#[timeout(Duration::from_secs(10))]
fn wildcard_minute_fires_every_minute() {
    let expression = cronex::parse("* * * * *").unwrap();
    let mut current = "2013-02-28T23:00:00Z".parse::<DateTime<Utc>>().unwrap();

    for _ in 0..180 {
        let next = expression.next(&current).unwrap();
        assert!(next > current);
        assert!(next - current <= TimeDelta::seconds(60), "current = {current}");
        assert_eq!(next.second(), 0);
        current += TimeDelta::seconds(37);
    }
}

#[rstest]
#[timeout(Duration::from_secs(10))]
fn next_is_monotone() {
    for pattern in ["*/5 * * * *", "0 0 L * *", "30 3 * * 6#5", "15 2-20/3 * * *"] {
        let expression = cronex::parse(pattern).unwrap();
        let mut t = "2013-11-02T21:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = t + TimeDelta::hours(8);
        let mut previous = None;

        while t < end {
            let next = expression.next(&t).unwrap();
            assert!(next > t, "pattern = {pattern}, t = {t}");
            if let Some(previous) = previous {
                assert!(next >= previous, "pattern = {pattern}, t = {t}");
            }
            previous = Some(next);
            t += TimeDelta::seconds(97);
        }
    }
}

#[rstest]
#[timeout(Duration::from_secs(10))]
fn identical_sources_compile_identically() {
    let first = cronex::parse("0 30 2-20/3 1,15,L * ? *").unwrap();
    let second: Expression = "0 30 2-20/3 1,15,L * ? *".parse().unwrap();
    assert_eq!(first, second);

    let from = DateTime::parse_from_rfc3339("2013-01-01T00:00:00Z").unwrap();
    assert_eq!(first.next_n(&from, 10), second.next_n(&from, 10));
}

#[rstest]
#[case("*/60 * * * * *")]
#[case("*/61 * * * * *")]
#[case("2/60 * * * * *")]
#[case("2-20/61 * * * * *")]
#[case("* * * *")]
#[case("* * ? * ?,1")]
#[case("0 0 0 ? * 6-1")]
#[case("@every_minute")]
fn rejected_expressions(#[case] pattern: &str) {
    assert!(cronex::parse(pattern).is_err(), "pattern = {pattern}");
}

#[test]
fn nanoseconds_are_ignored() {
    let expression = cronex::parse("30 0 0 1 * *").unwrap();
    let from = DateTime::parse_from_rfc3339("2024-01-01T00:00:30.001Z").unwrap();
    assert_eq!(
        expression.next(&from).unwrap().to_rfc3339(),
        "2024-02-01T00:00:30+00:00"
    );

    let from = DateTime::parse_from_rfc3339("2024-01-01T00:00:29.999Z").unwrap();
    assert_eq!(
        expression.next(&from).unwrap().to_rfc3339(),
        "2024-01-01T00:00:30+00:00"
    );
}
