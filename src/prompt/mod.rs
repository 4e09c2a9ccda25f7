//! Unit-test prompt rendering from extracted source facts

use crate::extractor::FactSet;

const PROMPT_TEMPLATE: &str = r#"
Generate Flutter unit test code from the following information:
1. File name: {file_name}
2. Class name: {class_name}
3. Dependencies: {dependencies}
4. Other info: {other_info}

Requirements:
1. Use the flutter_test library for unit tests and mockito for mock data
2. Reach 100% assertion coverage of properties and methods
3. Include suitable setUp and tearDown methods
4. Test every public method and property
5. Organise related logic in group blocks and reset mocks between tests
6. Make the intent of each test explicit
7. Name the test script `{test_file}` and mirror the lib/ directory layout under test/

Scenarios to cover:
1. Synchronous methods:
    - Test return values
    - Test state changes
    - Test with different argument combinations

2. Asynchronous methods:
    - Test the successful completion path
    - Test the error/exception path
    - Verify correct use of async/await
    - Use expectLater and completion matchers

3. Exceptions:
    - Test expected exceptions with expect(() => ..., throwsA(isA()))
    - Test error recovery
    - Test error propagation
    - Test timeout scenarios

4. Boundary conditions:
    - Test with null values where applicable
    - Test with empty collections
    - Test maximum/minimum value scenarios
    - Test edge cases specific to the business logic

5. State management (flutter_bloc):
    - Test the initial state
    - Test state after method calls
    - Test state transitions and the states emitted by emit
    - Verify state consistency
    - Test concurrency by triggering several emit events

6. Dependency injection and mocking:
    - Mock external dependencies with Mockito
    - Verify every interaction with dependencies
    - Test different dependency behaviour (success, failure, specific responses)
    - Test dependency edge cases

The test file should follow standard Dart formatting: imports at the top, then mock setup classes, then the test cases.
"#;

/// Fill the test-generation template for one file.
///
/// Empty facts are valid input and produce a less specific prompt.
pub fn render(file_name: &str, facts: &FactSet) -> String {
    let dependencies = facts.dependencies.join(", ");

    PROMPT_TEMPLATE
        .replace("{test_file}", &test_file_name(file_name))
        .replace("{file_name}", file_name)
        .replace("{class_name}", &facts.class_name)
        .replace("{dependencies}", &dependencies)
        .replace("{other_info}", &other_info(facts))
}

/// `counter.dart` -> `counter_test.dart`
pub fn test_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".dart").unwrap_or(file_name);
    format!("{}_test.dart", stem)
}

/// `Methods: ...` and `Imports: ...` lines handed to the template
pub fn other_info(facts: &FactSet) -> String {
    let methods: Vec<&str> = facts.methods.iter().map(String::as_str).collect();
    format!(
        "Methods: {}\nImports: {}",
        methods.join(", "),
        facts.imports.join(", ")
    )
}
