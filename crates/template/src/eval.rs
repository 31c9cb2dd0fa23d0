//! Evaluator: walks the AST against a JSON data object.

use serde_json::{Map, Number, Value};

use crate::parser::{Condition, Node};

/// One level of the lookup chain.
enum Frame<'s> {
    Root(&'s Value),
    Iteration(Map<String, Value>),
}

struct Scope<'s> {
    frame: Frame<'s>,
    parent: Option<&'s Scope<'s>>,
}

impl<'s> Scope<'s> {
    fn root(data: &'s Value) -> Self {
        Self {
            frame: Frame::Root(data),
            parent: None,
        }
    }

    /// Resolve a dotted path, innermost frame first.
    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let mut scope = Some(self);
        let mut start = None;
        while let Some(s) = scope {
            let hit = match &s.frame {
                Frame::Root(value) => member(value, head),
                Frame::Iteration(map) => map.get(head),
            };
            if hit.is_some() {
                start = hit;
                break;
            }
            scope = s.parent;
        }

        segments.try_fold(start?, |current, segment| member(current, segment))
    }
}

fn member<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

pub fn render_nodes(nodes: &[Node], data: &Value) -> String {
    let mut out = String::new();
    render_into(nodes, &Scope::root(data), &mut out);
    out
}

fn render_into(nodes: &[Node], scope: &Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = scope.lookup(path) {
                    out.push_str(&stringify(value));
                }
            }
            Node::Each { path, body } => {
                let Some(Value::Array(items)) = scope.lookup(path) else {
                    continue;
                };
                let last = items.len().saturating_sub(1);
                for (index, item) in items.iter().enumerate() {
                    let mut frame = match item {
                        Value::Object(fields) => fields.clone(),
                        other => {
                            let mut m = Map::new();
                            m.insert("this".into(), other.clone());
                            m
                        }
                    };
                    frame.insert("@index".into(), Value::from(index));
                    frame.insert("@first".into(), Value::Bool(index == 0));
                    frame.insert("@last".into(), Value::Bool(index == last));

                    let child = Scope {
                        frame: Frame::Iteration(frame),
                        parent: Some(scope),
                    };
                    render_into(body, &child, out);
                }
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if holds(condition, scope) { then_branch } else { else_branch };
                render_into(branch, scope, out);
            }
        }
    }
}

fn holds(condition: &Condition, scope: &Scope<'_>) -> bool {
    match condition {
        Condition::Truthy(path) => scope.lookup(path).is_some_and(truthy),
        Condition::Eq { path, literal } => match scope.lookup(path) {
            None | Some(Value::Null) => false,
            Some(value) => stringify(value) == *literal,
        },
    }
}

/// Empty strings, zero, false, null and missing values are falsy.
/// Empty arrays and objects are truthy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a value as it appears in rendered output.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match whole(n) {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => with_whole_numbers(value).to_string(),
    }
}

/// `3.0` as `3`; other numbers have no whole form.
fn whole(n: &Number) -> Option<i64> {
    let f = n.as_f64()?;
    (n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15).then_some(f as i64)
}

fn with_whole_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) => whole(n).map_or_else(|| value.clone(), Value::from),
        Value::Array(items) => Value::Array(items.iter().map(with_whole_numbers).collect()),
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), with_whole_numbers(v))).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use serde_json::json;

    fn run(src: &str, data: Value) -> String {
        let nodes = Parser::new(src, true).parse_document().unwrap();
        render_nodes(&nodes, &data)
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let data = json!({"name": "outer", "items": [{"name": "a"}, {"other": 1}]});
        assert_eq!(run("{{#each items}}{{name}};{{/each}}", data), "a;outer;");
    }

    #[test]
    fn iteration_metadata() {
        let data = json!({"xs": ["a", "b", "c"]});
        assert_eq!(
            run("{{#each xs}}{{@index}}={{this}}{{#if @last}}.{{else}},{{/if}}{{/each}}", data),
            "0=a,1=b,2=c."
        );
    }

    #[test]
    fn array_index_segments() {
        let data = json!({"panels": [{"id": "p1"}, {"id": "p2"}]});
        assert_eq!(run("{{panels.1.id}}", data), "p2");
    }

    #[test]
    fn null_intermediate_is_empty() {
        assert_eq!(run("[{{a.b.c}}]", json!({"a": null})), "[]");
    }

    #[test]
    fn numbers_and_truthiness() {
        assert_eq!(stringify(&json!(3.0)), "3");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(-7)), "-7");
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn nested_numbers_print_like_scalars() {
        let data = json!({"n": 3.0, "obj": {"x": 3.0, "y": 0.5}, "list": [1.0, 2]});
        assert_eq!(run("{{n}} {{obj}} {{list}}", data), r#"3 {"x":3,"y":0.5} [1,2]"#);
    }

    #[test]
    fn eq_compares_stringified_value() {
        let tpl = r#"{{#if (eq order "2")}}two{{else}}other{{/if}}"#;
        assert_eq!(run(tpl, json!({"order": 2})), "two");
        assert_eq!(run(tpl, json!({"order": 3})), "other");
        assert_eq!(run(r#"{{#if (eq missing "")}}y{{else}}n{{/if}}"#, json!({})), "n");
    }
}
