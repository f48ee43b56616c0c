//! Integration tests for help flags and the command-line debug trace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::rstest;

use rsargs::util::testing::{init_test_setup, CapturedLines};
use rsargs::{exitcode, Command, CommandLine, InvocationError, Parameter, DEBUG_FLAG};

#[derive(Debug, Default)]
struct Params {
    foo: String,
}

fn foo_command(name: &str, calls: Arc<AtomicUsize>) -> Command<Params> {
    Command::<Params>::new(name, &format!("Runs {name}"))
        .unwrap()
        .handler(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            7
        })
        .parameter(
            Parameter::<String>::new("foo", "The foo value").unwrap().alias("f").unwrap(),
            |p: &mut Params, v| p.foo = v,
        )
        .unwrap()
}

struct Fixture {
    cli: CommandLine,
    output: CapturedLines,
    trace: CapturedLines,
    calls: Arc<AtomicUsize>,
}

fn named() -> Fixture {
    init_test_setup();
    let output = CapturedLines::new();
    let trace = CapturedLines::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let cli = CommandLine::new("Two commands")
        .with_program_name("demo")
        .with_output_fn(output.sink())
        .with_trace_fn(trace.sink())
        .add_command(foo_command("cmd1", calls.clone()))
        .unwrap()
        .add_command(foo_command("cmd2", calls.clone()))
        .unwrap();
    Fixture {
        cli,
        output,
        trace,
        calls,
    }
}

fn implicit() -> Fixture {
    init_test_setup();
    let output = CapturedLines::new();
    let trace = CapturedLines::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = calls.clone();
    let cli = CommandLine::new("Implicit")
        .with_program_name("demo")
        .with_output_fn(output.sink())
        .with_trace_fn(trace.sink())
        .implicit_command(
            Command::<Params>::implicit("")
                .handler(move |_| {
                    handler_calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .parameter(
                    Parameter::<String>::new("foo", "The foo value")
                        .unwrap()
                        .optional("oof".to_string()),
                    |p: &mut Params, v| p.foo = v,
                )
                .unwrap(),
        )
        .unwrap();
    Fixture {
        cli,
        output,
        trace,
        calls,
    }
}

// ============================================================
// Help
// ============================================================

#[rstest]
#[case("-h")]
#[case("--help")]
#[case("--HELP")]
#[case("-H")]
fn given_help_as_first_token_when_invoking_then_full_usage_and_ok(#[case] flag: &str) {
    // Arrange
    let f = named();

    // Act
    let code = f.cli.invoke([flag]).unwrap();

    // Assert
    assert_eq!(code, exitcode::OK);
    let text = f.output.text();
    assert!(text.starts_with("Usage: demo <command> -h|--help"));
    assert!(text.contains("cmd1 parameters:"));
    assert!(text.contains("cmd2 parameters:"));
    assert_eq!(f.calls.load(Ordering::SeqCst), 0, "handler must not run");
}

#[test]
fn given_help_after_command_when_invoking_then_command_usage_only() {
    let f = named();

    let code = f.cli.invoke(["cmd2", "--help"]).unwrap();

    assert_eq!(code, exitcode::OK);
    let text = f.output.text();
    assert!(text.starts_with("Usage: demo cmd2 -h|--help"));
    assert!(text.contains("-f|--foo"));
    assert!(!text.contains("cmd1"));
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn given_help_with_extra_tokens_when_invoking_then_usage_still_printed() {
    let f = named();

    let code = f.cli.invoke(["cmd1", "-h", "--foo", "x"]).unwrap();

    assert_eq!(code, exitcode::OK);
    assert!(f.output.text().contains("Usage: demo cmd1"));
}

#[test]
fn given_help_not_first_when_invoking_then_treated_as_key() {
    let f = named();

    let err = f.cli.invoke(["cmd1", "--foo", "x", "--help", "y"]).unwrap_err();

    assert!(matches!(err, InvocationError::UnknownParameter(key) if key == "--help"));
    assert!(f.output.lines().is_empty());
}

#[test]
fn given_help_as_value_when_invoking_then_bound_verbatim() {
    let f = named();

    let code = f.cli.invoke(["cmd1", "--foo", "--help"]).unwrap();

    assert_eq!(code, 7);
    assert!(f.output.lines().is_empty());
}

#[test]
fn given_implicit_command_when_help_then_parameter_usage() {
    let f = implicit();

    let code = f.cli.invoke(["--help"]).unwrap();

    assert_eq!(code, exitcode::OK);
    let text = f.output.text();
    assert!(text.starts_with("Usage: demo -h|--help\nUsage: demo <parameters>"));
    assert!(text.contains("?:oof"));
    assert_eq!(f.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn given_implicit_command_when_no_tokens_then_handler_runs_with_defaults() {
    let f = implicit();

    assert_eq!(f.cli.invoke(Vec::<String>::new()).unwrap(), 7);
    assert_eq!(f.calls.load(Ordering::SeqCst), 1);
}

// ============================================================
// Debug trace
// ============================================================

#[test]
fn given_debug_flag_when_invoking_then_tokens_traced_without_flag() {
    let f = named();

    let code = f.cli.invoke(["cmd1", DEBUG_FLAG, "--foo", "bar"]).unwrap();

    assert_eq!(code, 7);
    assert_eq!(
        f.trace.lines(),
        [
            ">> Trace",
            "  Invoke(args):",
            "  [0]: 'cmd1'",
            "  [1]: '--foo'",
            "  [2]: 'bar'",
            "<< Trace",
        ]
    );
}

#[test]
fn given_debug_flag_any_case_when_invoking_then_stripped() {
    let f = implicit();

    let code = f
        .cli
        .invoke(["--COMMAND-LINE-DEBUG", "--foo", "x"])
        .unwrap();

    assert_eq!(code, 7);
    assert!(f.trace.text().contains("[0]: '--foo'"));
}

#[test]
fn given_debug_flag_and_failure_when_invoking_then_trace_precedes_error() {
    let f = named();

    let err = f.cli.invoke([DEBUG_FLAG, "nope"]).unwrap_err();

    assert!(matches!(err, InvocationError::UnknownCommand(_)));
    assert_eq!(f.trace.lines().first().map(String::as_str), Some(">> Trace"));
}

#[test]
fn given_only_debug_flag_on_implicit_when_invoking_then_empty_trace_and_defaults() {
    let f = implicit();

    let code = f.cli.invoke([DEBUG_FLAG]).unwrap();

    assert_eq!(code, 7);
    assert_eq!(f.trace.lines(), [">> Trace", "  Invoke(args):", "<< Trace"]);
}

#[test]
fn given_debug_setting_when_invoking_then_traced_without_flag() {
    init_test_setup();
    let trace = CapturedLines::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let cli = CommandLine::new("")
        .with_debug(true)
        .with_trace_fn(trace.sink())
        .add_command(foo_command("cmd1", calls))
        .unwrap();

    cli.invoke(["cmd1", "-f", "x"]).unwrap();

    assert!(trace.text().contains("[2]: 'x'"));
}
