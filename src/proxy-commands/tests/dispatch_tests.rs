//! Integration tests for command registration, dispatch and the catalog.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proxy_commands::{
    Addon, CallContext, CommandDef, CommandError, CommandManager, CommandType, TypeConverter,
    TypeError, TypeRegistry, Value, command,
};

// ============================================================================
// FIXTURES
// ============================================================================

#[derive(Debug, PartialEq)]
struct Flow {
    id: u32,
}

/// Domain converter resolving `@<id>` to a flow.
struct FlowType {
    flows: Vec<Value>,
}

impl FlowType {
    fn new(count: u32) -> Self {
        Self {
            flows: (0..count)
                .map(|id| Value::opaque("flow", Flow { id }))
                .collect(),
        }
    }
}

impl TypeConverter for FlowType {
    fn display(&self, _: &CommandType, _: &TypeRegistry) -> String {
        "flow".to_string()
    }

    fn parse(&self, _: &CommandManager, _: &CommandType, raw: &str) -> Result<Value, TypeError> {
        raw.strip_prefix('@')
            .and_then(|id| id.parse::<usize>().ok())
            .and_then(|id| self.flows.get(id).cloned())
            .ok_or_else(|| TypeError::new(format!("No such flow: {raw}")))
    }

    fn matches(&self, _: &CommandType, value: &Value, _: &TypeRegistry) -> bool {
        matches!(value, Value::Opaque(o) if o.kind() == "flow")
    }
}

struct Core;

impl Addon for Core {
    fn name(&self) -> &str {
        "core"
    }

    fn commands(&self) -> Vec<CommandDef> {
        vec![
            command("echo")
                .param("text", CommandType::Str)
                .returns(CommandType::Str)
                .help("Return the argument unchanged.")
                .handler(|args| Ok(args[0].clone()))
                .unwrap(),
            command("sum")
                .variadic("values", CommandType::Int)
                .returns(CommandType::Int)
                .help("Add up integers.")
                .handler(|args| Ok(Value::Int(args.iter().filter_map(Value::as_int).sum())))
                .unwrap(),
            command("flow.id")
                .param("flow", CommandType::custom("flow"))
                .returns(CommandType::Int)
                .handler(|args| {
                    let flow = args[0]
                        .downcast_ref::<Flow>()
                        .ok_or_else(|| CommandError::failed("not a flow"))?;
                    Ok(Value::Int(i64::from(flow.id)))
                })
                .unwrap(),
            command("console.layout.options")
                .returns(CommandType::seq(CommandType::Str))
                .handler(|_| Ok(Value::from(vec!["horizontal", "vertical"])))
                .unwrap(),
            command("console.layout")
                .param("layout", CommandType::Str)
                .argument("layout", CommandType::choice("console.layout.options"))
                .returns(CommandType::Str)
                .handler(|args| Ok(args[0].clone()))
                .unwrap(),
        ]
    }
}

fn manager() -> CommandManager {
    let mut types = TypeRegistry::with_builtins();
    types.register("flow", FlowType::new(3));
    let mut m = CommandManager::new(types);
    m.collect(&Core).unwrap();
    m
}

// ============================================================================
// CALLS
// ============================================================================

#[test]
fn test_echo() {
    let m = manager();
    assert_eq!(m.call("echo hello").unwrap(), Value::from("hello"));
    assert_eq!(m.call("echo 'hello world'").unwrap(), Value::from("hello world"));
    assert_eq!(
        m.call("echo").unwrap_err(),
        CommandError::Usage("echo str -> str".into())
    );
    assert!(matches!(m.call("echo a b"), Err(CommandError::Usage(_))));
}

#[test]
fn test_sum_variadic() {
    let m = manager();
    assert_eq!(m.call("sum 1 2 3").unwrap(), Value::Int(6));
    assert_eq!(m.call("sum").unwrap(), Value::Int(0));
    let err = m.call("sum 1 x 3").unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidValueType {
            value: "[1, x, 3]".into(),
            expected: "int".into()
        }
    );
    assert_eq!(err.to_string(), "Invalid value type: [1, x, 3] - expected int");
}

#[test]
fn test_call_args_with_typed_values() {
    let m = manager();
    assert_eq!(
        m.call_args("sum", vec![Value::Int(4), Value::from("5")]).unwrap(),
        Value::Int(9)
    );
}

#[test]
fn test_unknown_command_leaves_state_unchanged() {
    let m = manager();
    let before = m.paths().into_iter().map(String::from).collect::<Vec<_>>();
    assert_eq!(
        m.call("nope arg").unwrap_err(),
        CommandError::UnknownCommand("nope".into())
    );
    assert_eq!(m.paths(), before);
}

#[test]
fn test_domain_type() {
    let m = manager();
    assert_eq!(m.call("flow.id @2").unwrap(), Value::Int(2));
    let err = m.call("flow.id @9").unwrap_err();
    assert_eq!(err, CommandError::InvalidArgument("No such flow: @9".into()));

    let flow = Value::opaque("flow", Flow { id: 1 });
    assert_eq!(m.call_args("flow.id", vec![flow]).unwrap(), Value::Int(1));
}

#[test]
fn test_choice_argument() {
    let m = manager();
    assert_eq!(m.call("console.layout vertical").unwrap(), Value::from("vertical"));
    let err = m.call("console.layout diagonal").unwrap_err();
    assert_eq!(err.to_string(), "Invalid argument: Invalid choice: diagonal");
}

#[test]
fn test_result_serializes_for_scripts() {
    let m = manager();
    let result = m.call("console.layout.options").unwrap();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!(["horizontal", "vertical"])
    );
}

// ============================================================================
// CALL CONTEXT
// ============================================================================

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl CallContext for Recorder {
    fn enter(&self, path: &str) {
        self.0.lock().unwrap().push(format!("enter {path}"));
    }

    fn exit(&self, path: &str) {
        self.0.lock().unwrap().push(format!("exit {path}"));
    }
}

#[test]
fn test_context_brackets_each_call() {
    let recorder = Arc::new(Recorder::default());
    let mut m = CommandManager::new(TypeRegistry::with_builtins())
        .with_context(Arc::clone(&recorder) as Arc<dyn CallContext>);
    m.collect(&Core).unwrap();
    m.add(
        "fail",
        command("fail")
            .handler(|_| Err(CommandError::failed("boom")))
            .unwrap(),
    )
    .unwrap();

    m.call("echo hi").unwrap();
    assert!(m.call("fail").is_err());
    // Conversion failures never reach the operation.
    assert!(m.call("sum x").is_err());

    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec!["enter echo", "exit echo", "enter fail", "exit fail"]
    );
}

// ============================================================================
// CATALOG
// ============================================================================

#[test]
fn test_dump_sorted_and_resolvable() {
    let m = manager();
    let mut out = Vec::new();
    m.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let signatures: Vec<&str> = text
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    let mut sorted = signatures.clone();
    sorted.sort_unstable();
    assert_eq!(signatures, sorted);
    assert_eq!(signatures.len(), m.len());

    for sig in &signatures {
        let path = sig.split_whitespace().next().unwrap();
        let cmd = m.get(path).unwrap();
        assert_eq!(cmd.signature_help(m.types()), *sig);
    }

    assert!(text.contains("# Add up integers.\nsum *int -> int\n\n"));
    assert!(text.contains("console.layout choice -> str\n"));

    let mut again = Vec::new();
    m.dump(&mut again).unwrap();
    assert_eq!(String::from_utf8(again).unwrap(), text);
}
