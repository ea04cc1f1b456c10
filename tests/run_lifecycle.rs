use std::cell::Cell;
use std::rc::Rc;

use playground::harness::diagnostic::UNKNOWN_ERROR;
use playground::harness::sink::{LogChannel, MemoryChannel, NullChannel};
use playground::harness::{
    HarnessConfig, HarnessError, InterpretError, Loggable, Playground, RunOutcome, Status, Tab,
    from_fn,
};
use serde_json::json;

const BANNER_FAILURE: &str = "Runtime failure\n******\nUndefined variable 'x'\n******\nat line 1";

fn quiet<F>(interpreter: F, code: &str) -> Playground<F>
where
    F: FnMut(&str, &mut dyn LogChannel) -> Result<(), InterpretError>,
{
    Playground::with_channel(interpreter, code, Box::new(NullChannel))
}

#[test]
fn successful_run_captures_output_in_order() {
    let interpreter = from_fn(|_code, console| {
        console.log(&[Loggable::from(1)]);
        console.log(&[Loggable::from(2)]);
        console.log(&[Loggable::from(3)]);
        Ok(())
    });
    let mut playground = quiet(interpreter, "print 1; print 2; print 3;");

    assert_eq!(playground.status(), Status::Idle);
    assert_eq!(playground.run().unwrap(), RunOutcome::Success);

    assert_eq!(playground.output(), ["1", "2", "3"]);
    assert_eq!(playground.status(), Status::Completed(RunOutcome::Success));
    assert!(playground.diagnostics().is_empty());
    assert_eq!(playground.active_tab(), Tab::Console);
}

#[test]
fn variadic_print_yields_one_entry_per_value() {
    let interpreter = from_fn(|_code, console| {
        console.log(&[Loggable::from("a"), Loggable::Null, Loggable::from(json!({"k": true}))]);
        Ok(())
    });
    let mut playground = quiet(interpreter, "");
    playground.run().unwrap();
    assert_eq!(playground.output(), ["a", "null", r#"{"k":true}"#]);
}

#[test]
fn failure_with_banner_blocks_further_runs() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let interpreter = from_fn(move |_code, console| {
        counter.set(counter.get() + 1);
        console.log(&[Loggable::from("started")]);
        Err(InterpretError::raised(BANNER_FAILURE))
    });
    let mut playground = quiet(interpreter, "print x;");

    assert_eq!(playground.run().unwrap(), RunOutcome::Failure);
    assert_eq!(
        playground.diagnostics(),
        ["******", "Undefined variable 'x'", "******"]
    );
    assert_eq!(playground.status(), Status::Completed(RunOutcome::Failure));
    assert_eq!(playground.active_tab(), Tab::Problems);
    assert!(!playground.can_run());

    let output = playground.output().to_vec();
    let last_run = playground.session().last_run().cloned();
    assert_eq!(output, ["started"]);
    assert!(last_run.is_some());

    let err = playground.run().unwrap_err();
    assert!(matches!(err, HarnessError::RunRejected { outstanding: 3 }));
    assert_eq!(calls.get(), 1);
    assert_eq!(playground.status(), Status::Completed(RunOutcome::Failure));
    assert_eq!(playground.output(), output);
    assert_eq!(playground.session().last_run().cloned(), last_run);
    assert_eq!(
        playground.diagnostics(),
        ["******", "Undefined variable 'x'", "******"]
    );

    playground.clear();
    assert!(playground.run().is_err(), "clear does not dismiss diagnostics");

    playground.reset();
    assert!(playground.can_run());
    assert_eq!(playground.run().unwrap(), RunOutcome::Failure);
    assert_eq!(calls.get(), 2);
}

#[test]
fn failure_without_banner_is_unknown_error() {
    let interpreter = from_fn(|_code, _console| Err(InterpretError::raised("segfault-ish")));
    let mut playground = quiet(interpreter, "");
    playground.run().unwrap();
    assert_eq!(playground.diagnostics(), [UNKNOWN_ERROR]);
    assert_eq!(playground.tab_label(Tab::Problems), "Problems(1)");
}

#[test]
fn panicking_interpreter_is_contained() {
    let downstream = MemoryChannel::new();
    let observer = downstream.clone();
    let interpreter = from_fn(|_code, console| {
        console.log(&[Loggable::from("before")]);
        panic!("\n\n******\nOops! scan tokens errors:\nUnexpected character in line 1 column 1 \n******\n\n");
    });
    let mut playground = Playground::with_channel(interpreter, "@", Box::new(downstream));

    assert_eq!(playground.run().unwrap(), RunOutcome::Failure);
    assert_eq!(playground.output(), ["before"]);
    assert_eq!(
        playground.diagnostics(),
        [
            "******",
            "Oops! scan tokens errors:",
            "Unexpected character in line 1 column 1 ",
            "******",
        ]
    );
    assert_eq!(playground.problem_count(), 1);
    assert_eq!(observer.lines(), vec!["before"]);
}

#[test]
fn non_text_panic_is_unknown_error() {
    let interpreter = from_fn(|_code, _console| std::panic::panic_any(42_i32));
    let mut playground = quiet(interpreter, "");
    assert_eq!(playground.run().unwrap(), RunOutcome::Failure);
    assert_eq!(playground.diagnostics(), [UNKNOWN_ERROR]);
}

#[test]
fn clear_only_touches_output() {
    let mut fail = false;
    let interpreter = from_fn(move |_code, console| {
        console.log(&[Loggable::from("line")]);
        if fail {
            return Err(InterpretError::Opaque);
        }
        fail = true;
        Ok(())
    });
    let mut playground = quiet(interpreter, "");

    playground.run().unwrap();
    playground.run().unwrap();
    assert_eq!(playground.output(), ["line", "line"]);
    assert_eq!(playground.diagnostics(), [UNKNOWN_ERROR]);

    playground.clear();

    assert!(playground.output().is_empty());
    assert_eq!(playground.diagnostics(), [UNKNOWN_ERROR]);
    assert_eq!(playground.status(), Status::Completed(RunOutcome::Failure));
}

#[test]
fn output_accumulates_across_runs() {
    let interpreter = from_fn(|code, console| {
        console.log(&[Loggable::from(code)]);
        Ok(())
    });
    let mut playground = quiet(interpreter, "first");
    playground.run().unwrap();
    playground.set_code("second");
    playground.run().unwrap();
    assert_eq!(playground.output(), ["first", "second"]);
}

#[test]
fn config_controls_banner_convention() {
    let config = HarnessConfig {
        banner_marker: '=',
        banner_min_run: 4,
        echo_output: false,
        ..HarnessConfig::default()
    };
    let interpreter = from_fn(|_code, _console| {
        Err(InterpretError::raised("error:\n====\nType mismatch\n===="))
    });
    let mut playground = Playground::with_config(interpreter, "", &config).unwrap();
    playground.run().unwrap();
    assert_eq!(playground.diagnostics(), ["====", "Type mismatch", "===="]);
}

#[test]
fn snapshot_serializes_for_presentation() {
    let interpreter = from_fn(|_code, _console| Err(InterpretError::raised(BANNER_FAILURE)));
    let mut playground = quiet(interpreter, "print x;");
    playground.run().unwrap();

    let json = serde_json::to_value(playground.snapshot()).unwrap();
    assert_eq!(json["status"], json!({"Completed": "Failure"}));
    assert_eq!(json["active_tab"], "Problems");
    assert_eq!(json["can_run"], false);
    assert_eq!(json["problem_count"], 1);
    assert_eq!(json["last_run"]["outcome"], "Failure");
}
