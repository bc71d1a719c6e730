//! End-to-end scenarios through the linked SAT engine.

use std::io::Cursor;

use rcpsp_sat::encoding::{solve_project, EncodingConfig, ScheduleEncoding, SolveOutcome};
use rcpsp_sat::models::{ActivitySequence, Project, Schedule, SequenceKind};
use rcpsp_sat::sat::{parse_dimacs, to_dimacs_string, EngineOutcome, SatEngine, SplrEngine};
use rcpsp_sat::validation::ValidationErrorKind;
use rcpsp_sat::SchedulingError;

fn solve(project: &mut Project) -> SolveOutcome {
    solve_project(project, EncodingConfig::default(), &SplrEngine, &mut ()).unwrap()
}

fn scheduled(project: &mut Project) -> Schedule {
    match solve(project) {
        SolveOutcome::Scheduled(s) => s,
        SolveOutcome::Unsatisfiable => panic!("expected a schedule"),
    }
}

fn span(schedule: &Schedule, activity: usize) -> (usize, usize) {
    let a = schedule.assignments[activity];
    (a.start, a.finish)
}

fn pair(d0: usize, d1: usize, horizon: usize) -> Project {
    let mut p = Project::new(2, horizon, 0);
    p.define_activity(0, d0, None);
    p.define_activity(1, d1, None);
    p
}

#[test]
fn test_single_activity_fills_horizon() {
    let mut p = Project::new(1, 3, 0);
    p.define_activity(0, 3, None);
    let mut enc = ScheduleEncoding::build(&p).unwrap();
    let outcome = enc.solve(&SplrEngine, &mut ()).unwrap();
    let schedule = outcome.schedule().unwrap();
    assert_eq!(span(schedule, 0), (0, 2));
    assert_eq!(enc.matrices().active.set_columns(0), vec![0, 1, 2]);
    assert_eq!(enc.matrices().starts.set_columns(0), vec![0]);
    assert_eq!(enc.matrices().finishes.set_columns(0), vec![2]);
}

#[test]
fn test_finish_start_chain_is_forced() {
    let mut p = pair(2, 2, 4);
    p.define_sequence(0, 1, SequenceKind::FinishStart);
    let schedule = scheduled(&mut p);
    assert_eq!(span(&schedule, 0), (0, 1));
    assert_eq!(span(&schedule, 1), (2, 3));
    let resolved = p.activities[1].resolved.unwrap();
    assert_eq!((resolved.start, resolved.finish), (2, 3));
}

#[test]
fn test_finish_start_chain_too_long_for_horizon() {
    let mut p = pair(2, 2, 3);
    p.define_sequence(0, 1, SequenceKind::FinishStart);
    assert_eq!(solve(&mut p), SolveOutcome::Unsatisfiable);
}

#[test]
fn test_cycle_reported_before_encoding() {
    let mut p = pair(1, 1, 4);
    p.define_sequence(0, 1, SequenceKind::FinishStart);
    p.define_sequence(1, 0, SequenceKind::FinishStart);
    match ScheduleEncoding::build(&p) {
        Err(SchedulingError::PrecedenceCycle(cycle)) => {
            assert_eq!(
                cycle.relations,
                vec![
                    ActivitySequence::new(0, 1, SequenceKind::FinishStart),
                    ActivitySequence::new(1, 0, SequenceKind::FinishStart),
                ]
            );
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_unit_resource_serialises_activities() {
    let mut p = Project::new(2, 4, 1);
    p.define_activity(0, 2, None);
    p.define_activity(1, 2, None);
    p.alloc_resource(0, 0, 1);
    p.alloc_resource(1, 0, 1);
    let schedule = scheduled(&mut p);
    for t in 0..4 {
        assert!(schedule.active_at(t).len() <= 1, "slot {t}");
    }
    assert_eq!(schedule.peak_usage(&p, 0), Some(1));

    p.horizon = 3;
    assert_eq!(solve(&mut p), SolveOutcome::Unsatisfiable);
}

#[test]
fn test_resource_capacity_allows_overlap() {
    let mut p = Project::new(3, 2, 1);
    for a in 0..3 {
        p.define_activity(a, 2, None);
        p.alloc_resource(a, 0, 1);
    }
    p.set_resource_availability(0, 3);
    let schedule = scheduled(&mut p);
    assert_eq!(schedule.peak_usage(&p, 0), Some(3));
}

#[test]
fn test_start_start_relation() {
    let mut p = pair(2, 2, 3);
    p.define_sequence(0, 1, SequenceKind::StartStart);
    let schedule = scheduled(&mut p);
    assert_eq!(span(&schedule, 0), (0, 1));
    assert_eq!(span(&schedule, 1), (1, 2));
}

#[test]
fn test_finish_finish_relation() {
    let mut p = pair(1, 3, 3);
    p.define_sequence(0, 1, SequenceKind::FinishFinish);
    let schedule = scheduled(&mut p);
    let (a, b) = (span(&schedule, 0), span(&schedule, 1));
    assert!(a.1 < b.1);
    assert_eq!(b, (0, 2));
}

#[test]
fn test_start_finish_relation() {
    let mut p = pair(2, 1, 2);
    p.define_sequence(1, 0, SequenceKind::StartFinish);
    let schedule = scheduled(&mut p);
    assert!(span(&schedule, 1).0 < span(&schedule, 0).1);
}

#[test]
fn test_pre_scheduled_start() {
    let mut p = pair(1, 1, 4);
    p.activities[1].fixed_start = Some(3);
    let config = EncodingConfig::default().with_no_time_gaps(false);
    let outcome = solve_project(&mut p, config, &SplrEngine, &mut ()).unwrap();
    assert_eq!(span(outcome.schedule().unwrap(), 1), (3, 3));

    // slots 1 and 2 would stay idle before the fixed start
    assert_eq!(solve(&mut p), SolveOutcome::Unsatisfiable);
}

#[test]
fn test_incomplete_project_lists_every_problem() {
    let mut p = Project::new(3, 0, 0);
    p.define_activity(1, 2, None);
    match ScheduleEncoding::build(&p) {
        Err(SchedulingError::InvalidProject(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("expected InvalidProject, got {other:?}"),
    }
}

#[test]
fn test_oversized_instance_rejected_before_encoding() {
    let mut p = Project::new(3, 1 << 30, 0);
    for a in 0..3 {
        p.define_activity(a, 1, None);
    }
    match ScheduleEncoding::build(&p) {
        Err(SchedulingError::InvalidProject(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, ValidationErrorKind::TooManyVariables);
        }
        other => panic!("expected InvalidProject, got {other:?}"),
    }
}

#[test]
fn test_stale_link_lists_do_not_prune() {
    // links claim 0 -> 1 but no relation exists; both fit side by side
    let json = r#"{"horizon": 2, "activities": [
        {"duration": 2, "successors": [1]},
        {"duration": 1, "predecessors": [0]}
    ]}"#;
    let mut p: Project = serde_json::from_str(json).unwrap();
    let schedule = scheduled(&mut p);
    assert_eq!(span(&schedule, 0), (0, 1));
    assert!(p.activities.iter().all(|a| a.bounds.unwrap().is_consistent()));

    let mut q = pair(2, 1, 2);
    q.define_sequence(0, 1, SequenceKind::FinishStart);
    q.sequences.clear();
    assert!(solve(&mut q).is_scheduled());
}

#[test]
fn test_json_definition() {
    let json = r#"{
        "horizon": 5,
        "activities": [
            {"duration": 2},
            {"duration": 3, "name": "Pour"}
        ],
        "sequences": [{"first": 0, "second": 1, "kind": "FS"}],
        "resources": [{"availability": 1, "demands": [1, 1]}]
    }"#;
    let mut p: Project = serde_json::from_str(json).unwrap();
    p.rebuild_links();
    let schedule = scheduled(&mut p);
    assert_eq!(span(&schedule, 0), (0, 1));
    assert_eq!(span(&schedule, 1), (2, 4));
    assert_eq!(p.label(1), "Pour");
}

#[test]
fn test_dimacs_round_trip_solves_the_same() {
    let mut p = Project::new(3, 5, 1);
    p.define_activity(0, 1, None);
    p.define_activity(1, 2, None);
    p.define_activity(2, 2, None);
    p.define_sequence(0, 2, SequenceKind::FinishStart);
    p.alloc_resource(1, 0, 1);
    p.alloc_resource(2, 0, 1);

    let mut enc = ScheduleEncoding::build(&p).unwrap();
    let text = to_dimacs_string(enc.formula());
    let parsed = parse_dimacs(Cursor::new(text)).unwrap();
    assert_eq!(&parsed, enc.formula());

    let model = match SplrEngine.solve(&parsed).unwrap() {
        EngineOutcome::Satisfiable(m) => m,
        EngineOutcome::Unsatisfiable => panic!("re-parsed formula lost its model"),
    };
    let schedule = enc.decode(&model).unwrap();
    assert!(span(&schedule, 0).1 < span(&schedule, 2).0);
    assert!(schedule.peak_usage(&p, 0).unwrap() <= 1);
}

#[test]
fn test_gaps_allowed_when_disabled() {
    let mut p = pair(1, 1, 4);
    p.activities[0].fixed_start = Some(0);
    p.activities[1].fixed_start = Some(2);
    let config = EncodingConfig::default().with_no_time_gaps(false);
    let outcome = solve_project(&mut p, config, &SplrEngine, &mut ()).unwrap();
    assert!(outcome.is_scheduled());
}

#[cfg(unix)]
mod external {
    use super::*;
    use rcpsp_sat::sat::ExternalEngine;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    // exchange files are named by process id, so every test gets its own directory
    fn fake_engine(name: &str, body: &str) -> ExternalEngine {
        let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solver.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        ExternalEngine::new(path).with_work_dir(dir)
    }

    fn one_slot() -> Project {
        let mut p = Project::new(1, 1, 0);
        p.define_activity(0, 1, None);
        p
    }

    #[test]
    fn test_external_engine_result_file() {
        // one activity of one slot: active = 1, starts = 2, finishes = 3
        let engine = fake_engine("fake-sat", r#"printf 'SAT\n1 2 3 0\n' > "$2""#);
        let mut p = one_slot();
        let outcome = solve_project(&mut p, EncodingConfig::default(), &engine, &mut ()).unwrap();
        assert_eq!(span(outcome.schedule().unwrap(), 0), (0, 0));
    }

    #[test]
    fn test_external_engine_unsat() {
        let engine = fake_engine("fake-unsat", r#"printf 'UNSAT\n' > "$2""#);
        let mut p = one_slot();
        let outcome = solve_project(&mut p, EncodingConfig::default(), &engine, &mut ()).unwrap();
        assert_eq!(outcome, SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn test_external_engine_without_result() {
        let engine = fake_engine("fake-silent", "exit 0");
        let mut p = one_slot();
        assert!(matches!(
            solve_project(&mut p, EncodingConfig::default(), &engine, &mut ()),
            Err(SchedulingError::Engine(_))
        ));
    }

    #[test]
    fn test_external_engine_wrong_model_fails_verification() {
        // claims the activity never starts
        let engine = fake_engine("fake-wrong", r#"printf 'SAT\n1 -2 3 0\n' > "$2""#);
        let mut p = one_slot();
        assert!(matches!(
            solve_project(&mut p, EncodingConfig::default(), &engine, &mut ()),
            Err(SchedulingError::Verification(_))
        ));
    }
}
