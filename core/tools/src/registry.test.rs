use super::*;
use crate::build_registry;

#[test]
fn registry_exposes_exactly_the_expected_fourteen_tools() {
    let registry = build_registry();
    let mut names = registry.names();
    names.sort();

    let mut expected: Vec<String> = EXPECTED_TOOL_NAMES.iter().map(|s| s.to_string()).collect();
    expected.sort();

    assert_eq!(names, expected);
    assert_eq!(registry.len(), 14);
}

#[test]
fn no_registered_tool_name_matches_the_forbidden_pattern() {
    let registry = build_registry();
    let pattern = forbidden_name_pattern();
    for name in registry.names() {
        assert!(
            !pattern.is_match(&name),
            "tool name '{name}' should have been rejected at registration"
        );
    }
}

#[test]
#[should_panic(expected = "forbidden read-only-invariant pattern")]
fn registering_a_mutating_name_panics() {
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::context::ToolContext;
    use crate::tool::Tool;

    struct WriteFile;

    #[async_trait]
    impl Tool for WriteFile {
        fn name(&self) -> &str {
            "paige_write_file"
        }

        fn description(&self) -> &str {
            "should never be registered"
        }

        fn input_schema(&self) -> Value {
            serde_json::json!({})
        }

        async fn execute(&self, _input: Value, _ctx: &ToolContext) -> Result<Value, PaigeError> {
            unreachable!()
        }
    }

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WriteFile));
}
