//! Integration tests for partial command-line parsing.

use pretty_assertions::assert_eq;
use proxy_commands::{CommandManager, CommandType, ParseResult, TypeRegistry, Value, command};

fn manager() -> CommandManager {
    let mut m = CommandManager::new(TypeRegistry::with_builtins());
    m.add(
        "sum",
        command("sum")
            .variadic("values", CommandType::Int)
            .returns(CommandType::Int)
            .handler(|args| Ok(Value::Int(args.iter().filter_map(Value::as_int).sum())))
            .unwrap(),
    )
    .unwrap();
    m.add(
        "view.focus",
        command("view.focus")
            .param("index", CommandType::Int)
            .param("follow", CommandType::Bool)
            .handler(|_| Ok(Value::None))
            .unwrap(),
    )
    .unwrap();
    m.add(
        "console.key.bind",
        command("console.key.bind")
            .param("contexts", CommandType::seq(CommandType::Str))
            .param("key", CommandType::Str)
            .param("cmd", CommandType::Cmd)
            .variadic("args", CommandType::Arg)
            .handler(|_| Ok(Value::None))
            .unwrap(),
    )
    .unwrap();
    m
}

fn types(parts: &[ParseResult]) -> Vec<CommandType> {
    parts.iter().map(|p| p.ty.clone()).collect()
}

#[test]
fn test_empty_line() {
    let m = manager();
    assert_eq!(m.parse_partial(""), vec![ParseResult::new("", CommandType::Cmd)]);
    assert_eq!(m.parse_partial("   "), vec![ParseResult::new("", CommandType::Cmd)]);
}

#[test]
fn test_trailing_space_expects_next_parameter() {
    let m = manager();
    assert_eq!(
        m.parse_partial("view.focus "),
        vec![
            ParseResult::new("view.focus", CommandType::Cmd),
            ParseResult::new("", CommandType::Int),
        ]
    );
    assert_eq!(
        m.parse_partial("view.focus 3 "),
        vec![
            ParseResult::new("view.focus", CommandType::Cmd),
            ParseResult::new("3", CommandType::Int),
            ParseResult::new("", CommandType::Bool),
        ]
    );
    assert_eq!(
        m.parse_partial("unknown "),
        vec![
            ParseResult::new("unknown", CommandType::Cmd),
            ParseResult::new("", CommandType::Str),
        ]
    );
}

#[test]
fn test_extra_tokens_fall_back_to_str() {
    let m = manager();
    assert_eq!(
        types(&m.parse_partial("view.focus 1 true extra")),
        vec![
            CommandType::Cmd,
            CommandType::Int,
            CommandType::Bool,
            CommandType::Str,
        ]
    );
}

#[test]
fn test_variadic_element_type_repeats() {
    let m = manager();
    assert_eq!(
        m.parse_partial("sum 1 2"),
        vec![
            ParseResult::new("sum", CommandType::Cmd),
            ParseResult::new("1", CommandType::Int),
            ParseResult::new("2", CommandType::Int),
        ]
    );
}

#[test]
fn test_nested_command_switches_parameters() {
    let m = manager();
    assert_eq!(
        types(&m.parse_partial("console.key.bind flowlist x view.focus 1 ")),
        vec![
            CommandType::Cmd,
            CommandType::seq(CommandType::Str),
            CommandType::Str,
            CommandType::Cmd,
            CommandType::Int,
            CommandType::Bool,
        ]
    );
}

#[test]
fn test_unknown_nested_command_keeps_arg_types() {
    let m = manager();
    assert_eq!(
        types(&m.parse_partial("console.key.bind flowlist x bogus a b")),
        vec![
            CommandType::Cmd,
            CommandType::seq(CommandType::Str),
            CommandType::Str,
            CommandType::Cmd,
            CommandType::Arg,
            CommandType::Arg,
        ]
    );
}

#[test]
fn test_malformed_tail_is_literal() {
    let m = manager();
    let parts = m.parse_partial("view.focus 'unfinished");
    assert_eq!(
        parts,
        vec![
            ParseResult::new("view.focus", CommandType::Cmd),
            ParseResult::new("'unfinished", CommandType::Int),
        ]
    );
}

#[test]
fn test_quoted_tokens_are_unquoted() {
    let m = manager();
    let parts = m.parse_partial("console.key.bind \"a,b\" 'ctrl x'");
    assert_eq!(parts[1].value, "a,b");
    assert_eq!(parts[2].value, "ctrl x");
}
