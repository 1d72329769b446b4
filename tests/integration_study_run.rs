use assert_matches::assert_matches;
use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use tango::runtime::ManualClock;
use tango::session::{start_session, start_session_with_rng, DayRange, Session};
use tango::store::{load_finished_session, save_session, MemoryStore};
use tango::study::{Collaborators, Phase, StudyMachine, Timing, Transition};
use tango::summary::{summarize, SummaryReport};
use tango::util::format_duration;
use tango::vocab;
use tango::TrainerError;

const TEN_ROWS: &str = "\
day,idx,en,ko
1,0001,resume,이력서
1,0002,applicant,지원자
2,0003,itinerary,여행 일정표
2,0004,fare,요금
3,0005,invoice,송장
3,0006,budget,예산
4,0007,warranty,품질 보증서
4,0008,refund,환불
5,0009,contract,계약
5,0010,renewal,갱신
";

fn range_two_to_four(clock: &ManualClock) -> Session {
    let words = vocab::parse(TEN_ROWS);
    assert_eq!(words.len(), 10);
    start_session(&words, DayRange::new(2, 4), false, clock).unwrap()
}

fn run_to_end(session: Session, clock: &ManualClock, know_every_word: bool) -> SummaryReport {
    let mut m = StudyMachine::new(session, Timing::default(), clock, Collaborators::default());
    let mut outcome = m.start().unwrap();
    loop {
        match outcome {
            Transition::Finished(report) => return report,
            _ if m.phase() == Phase::ShowingSource && know_every_word => outcome = m.pass(),
            _ if m.phase() == Phase::ShowingSource => outcome = m.next(),
            _ if know_every_word => outcome = m.pass(),
            _ => outcome = m.next(),
        }
    }
}

#[test]
fn range_filters_and_keeps_source_order() {
    let clock = ManualClock::starting_at(100.0);
    let session = range_two_to_four(&clock);
    assert!(session.words.iter().all(|w| (2..=4).contains(&w.day)));
    assert_eq!(session.words.len(), 6);
    assert_eq!(session.state.order, (0..6).collect_vec());
    assert_eq!(session.state.cursor, 0);
    assert_eq!(session.state.start_cursor, 0);
}

#[test]
fn shuffled_order_is_a_permutation() {
    let clock = ManualClock::starting_at(0.0);
    let words = vocab::parse(TEN_ROWS);
    let mut rng = StdRng::seed_from_u64(7);
    let session =
        start_session_with_rng(&words, DayRange::new(1, 5), true, &clock, &mut rng).unwrap();
    assert_eq!(
        session.state.order.iter().copied().sorted().collect_vec(),
        (0..10).collect_vec()
    );
}

#[test]
fn knowing_every_word_leaves_nothing_missed() {
    let clock = ManualClock::starting_at(100.0);
    let report = run_to_end(range_two_to_four(&clock), &clock, true);
    assert_eq!(report.studied_count, 6);
    assert_eq!(report.known_count, report.studied_count);
    assert!(report.missed.is_empty());
    assert_eq!(report.day_range, Some(DayRange::new(2, 4)));
    assert_matches!(
        report.restart_with_missed(false, &clock),
        Err(TrainerError::EmptyRange { start: 2, end: 4 })
    );
}

#[test]
fn knowing_nothing_misses_every_word_in_order() {
    let clock = ManualClock::starting_at(100.0);
    let report = run_to_end(range_two_to_four(&clock), &clock, false);
    assert_eq!(report.known_count, 0);
    assert_eq!(report.missed.len(), report.studied_count);
    assert_eq!(
        report.missed.iter().map(|w| w.idx.as_str()).collect_vec(),
        vec!["0003", "0004", "0005", "0006", "0007", "0008"]
    );
}

#[test]
fn review_round_covers_missed_words_only() {
    let clock = ManualClock::starting_at(100.0);
    let mut m = StudyMachine::new(
        range_two_to_four(&clock),
        Timing::default(),
        &clock,
        Collaborators::default(),
    );
    m.start().unwrap();
    // know, miss, know, miss, know, miss
    for i in 0..6 {
        if i % 2 == 0 {
            m.pass();
            m.pass();
        } else {
            m.next();
            m.next();
        }
    }
    let report = m.report().cloned().unwrap();
    assert_eq!(report.missed.len(), 3);

    let review = report.restart_with_missed(false, &clock).unwrap();
    assert_eq!(review.state.order.len(), 3);
    assert_eq!(review.state.cursor, 0);
    assert_eq!(review.state.start_cursor, 0);
    assert_eq!(review.state.day_range, Some(DayRange::new(2, 4)));
    assert_eq!(
        review.words.iter().map(|w| w.en.as_str()).collect_vec(),
        vec!["fare", "budget", "refund"]
    );
}

#[test]
fn finished_run_survives_the_store() {
    let clock = ManualClock::starting_at(100.0);
    let mut m = StudyMachine::new(
        range_two_to_four(&clock),
        Timing::default(),
        &clock,
        Collaborators::default(),
    );
    m.start().unwrap();
    m.pass();
    m.pass();
    clock.advance(std::time::Duration::from_secs(3661));
    let report = match m.end() {
        Transition::Finished(report) => report,
        other => panic!("expected a finished run, got {other:?}"),
    };

    let mut store = MemoryStore::new();
    save_session(&mut store, m.session()).unwrap();
    let restored = load_finished_session(&store).unwrap();
    assert_eq!(summarize(&restored), Some(report.clone()));
    assert_eq!(report.studied_count, 2);
    assert_eq!(report.known_count, 1);
    // the run started paused and was never resumed, so no pause is counted
    assert_eq!(report.study_time(), format_duration(3661.0));
    assert_eq!(report.study_time(), "01:01:01");
}

#[test]
fn empty_range_is_rejected() {
    let clock = ManualClock::starting_at(0.0);
    let words = vocab::parse(TEN_ROWS);
    assert_matches!(
        start_session(&words, DayRange::new(6, 9), false, &clock),
        Err(TrainerError::EmptyRange { start: 6, end: 9 })
    );
}
