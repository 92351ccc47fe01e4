// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Template execution where a lookup that finds nothing is an error, matching
//! Go's `missingkey=error` option.
//!
//! Control flow, variable scoping and helper calls behave exactly like the
//! engine's own evaluator. Only field, identifier and variable resolution
//! differ: a map without the requested key, an array index past the end, or an
//! undefined variable fails instead of yielding `null`.

use std::collections::HashMap;

use lithos_gotmpl_core::{
    is_truthy, value_to_string, Error as TemplateError, EvalContext, FunctionRegistry, Template,
};
use lithos_gotmpl_engine::{
    BindingKind, Block, Command, Expression, IfNode, Node, Pipeline, RangeNode, WithNode,
};
use serde_json::{Number, Value};

type EvalResult<T> = std::result::Result<T, TemplateError>;

/// Executes `template` against `data`, failing on the first missing key.
pub(crate) fn render(template: &Template, data: &Value) -> EvalResult<String> {
    let mut exec = Exec::new(data.clone(), template.functions());
    let mut output = String::new();
    exec.block(&template.ast().root, &mut output)?;
    Ok(output)
}

struct Exec {
    root: Value,
    dots: Vec<Value>,
    scopes: Vec<HashMap<String, Value>>,
    functions: FunctionRegistry,
    // Handed to helper functions; they only use it to look up other helpers.
    helpers: EvalContext,
}

impl Exec {
    fn new(root: Value, functions: FunctionRegistry) -> Self {
        Self {
            helpers: EvalContext::new(root.clone(), functions.clone()),
            dots: vec![root.clone()],
            scopes: vec![HashMap::new()],
            root,
            functions,
        }
    }

    fn dot(&self) -> &Value {
        self.dots.last().unwrap_or(&self.root)
    }

    fn block(&mut self, block: &Block, output: &mut String) -> EvalResult<()> {
        for node in &block.nodes {
            match node {
                Node::Text(text) => output.push_str(&text.text),
                Node::Comment(_) => {}
                Node::Action(action) => {
                    let value = self.pipeline(&action.pipeline)?;
                    self.bind(&action.pipeline, &value)?;
                    if action.pipeline.declarations.is_none() {
                        output.push_str(&value_to_string(&value));
                    }
                }
                Node::If(node) => self.if_node(node, output)?,
                Node::Range(node) => self.range(node, output)?,
                Node::With(node) => self.with(node, output)?,
                _ => return Err(render_error("unsupported template node")),
            }
        }
        Ok(())
    }

    /// Runs `block` with `dot` as the current value in a fresh variable scope.
    fn scoped(&mut self, dot: Value, block: &Block, output: &mut String) -> EvalResult<()> {
        self.dots.push(dot);
        self.scopes.push(HashMap::new());
        let result = self.block(block, output);
        self.scopes.pop();
        self.dots.pop();
        result
    }

    fn if_node(&mut self, node: &IfNode, output: &mut String) -> EvalResult<()> {
        let value = self.pipeline(&node.pipeline)?;
        self.bind(&node.pipeline, &value)?;
        if is_truthy(&value) {
            self.block(&node.then_block, output)
        } else if let Some(else_block) = &node.else_block {
            self.block(else_block, output)
        } else {
            Ok(())
        }
    }

    fn with(&mut self, node: &WithNode, output: &mut String) -> EvalResult<()> {
        let value = self.pipeline(&node.pipeline)?;
        self.bind(&node.pipeline, &value)?;
        if is_truthy(&value) {
            self.scoped(value, &node.then_block, output)
        } else if let Some(else_block) = &node.else_block {
            self.block(else_block, output)
        } else {
            Ok(())
        }
    }

    fn range(&mut self, node: &RangeNode, output: &mut String) -> EvalResult<()> {
        if let Some(decls) = &node.pipeline.declarations {
            if decls.kind == BindingKind::Declare {
                if let Some(scope) = self.scopes.last_mut() {
                    for name in &decls.variables {
                        scope.entry(name.clone()).or_insert(Value::Null);
                    }
                }
            }
        }

        let items: Vec<(Value, Value)> = match self.pipeline(&node.pipeline)? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (Value::from(index), item))
                .collect(),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, item)| (Value::String(key), item))
                .collect(),
            _ => Vec::new(),
        };

        if items.is_empty() {
            self.bind_range(&node.pipeline, None, Value::Null)?;
            if let Some(else_block) = &node.else_block {
                self.block(else_block, output)?;
            }
            return Ok(());
        }

        for (key, item) in items {
            self.bind_range(&node.pipeline, Some(key), item.clone())?;
            self.scoped(item, &node.then_block, output)?;
        }
        Ok(())
    }

    fn pipeline(&mut self, pipeline: &Pipeline) -> EvalResult<Value> {
        let mut commands = pipeline.commands.iter();
        let first = commands
            .next()
            .ok_or_else(|| render_error("empty pipeline"))?;
        let mut value = self.command(first, None)?;
        for command in commands {
            value = self.command(command, Some(value))?;
        }
        Ok(value)
    }

    fn command(&mut self, command: &Command, input: Option<Value>) -> EvalResult<Value> {
        if let Expression::Identifier(name) = &command.target {
            if let Some(func) = self.functions.get(name) {
                let mut args = command
                    .args
                    .iter()
                    .map(|expr| self.expression(expr))
                    .collect::<EvalResult<Vec<_>>>()?;
                args.extend(input);
                return func(&mut self.helpers, &args);
            }
            if !command.args.is_empty() || input.is_some() {
                return Err(render_error(format!("unknown function \"{name}\"")));
            }
        }

        if !command.args.is_empty() {
            return Err(render_error(
                "arguments supplied to non-function expression",
            ));
        }
        if input.is_some() {
            return Err(render_error(
                "cannot pipe value into non-function expression",
            ));
        }
        self.expression(&command.target)
    }

    fn expression(&mut self, expr: &Expression) -> EvalResult<Value> {
        match expr {
            Expression::Identifier(name) => self.identifier(name),
            Expression::Field(parts) => self.field(parts),
            Expression::Variable(name) => self.variable(name).cloned(),
            Expression::PipelineExpr(pipeline) => {
                if pipeline.declarations.is_some() {
                    return Err(render_error(
                        "pipeline declarations not allowed in expression",
                    ));
                }
                self.pipeline(pipeline)
            }
            Expression::StringLiteral(text) => Ok(Value::String(text.clone())),
            Expression::NumberLiteral(text) => parse_number(text)
                .map(Value::Number)
                .ok_or_else(|| render_error(format!("invalid number literal {text}"))),
            Expression::BoolLiteral(flag) => Ok(Value::Bool(*flag)),
            Expression::Nil => Ok(Value::Null),
            _ => Err(render_error("unsupported expression")),
        }
    }

    /// A bare name that is not a helper: the nearest enclosing map holding it.
    fn identifier(&self, name: &str) -> EvalResult<Value> {
        self.dots
            .iter()
            .rev()
            .find_map(|dot| dot.as_object().and_then(|map| map.get(name)))
            .cloned()
            .ok_or_else(|| missing_key(name))
    }

    fn field(&self, parts: &[String]) -> EvalResult<Value> {
        let (start, rest) = match parts.split_first() {
            Some((first, rest)) if first.starts_with('$') => (self.variable(first)?, rest),
            _ => (self.dot(), parts),
        };
        rest.iter()
            .try_fold(start, |value, part| project(value, part))
            .cloned()
    }

    fn variable(&self, name: &str) -> EvalResult<&Value> {
        if name == "$" {
            return Ok(&self.root);
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| render_error(format!("undefined variable: {name}")))
    }

    fn bind(&mut self, pipeline: &Pipeline, value: &Value) -> EvalResult<()> {
        let Some(decls) = &pipeline.declarations else {
            return Ok(());
        };
        match (decls.variables.as_slice(), value) {
            ([], _) => Ok(()),
            ([name], _) => self.set_variable(name, decls.kind, value.clone()),
            (names, Value::Array(items)) => {
                for (index, name) in names.iter().enumerate() {
                    let item = items.get(index).cloned().unwrap_or(Value::Null);
                    self.set_variable(name, decls.kind, item)?;
                }
                Ok(())
            }
            (names, _) => {
                for name in names {
                    self.set_variable(name, decls.kind, value.clone())?;
                }
                Ok(())
            }
        }
    }

    fn bind_range(&mut self, pipeline: &Pipeline, key: Option<Value>, item: Value) -> EvalResult<()> {
        let Some(decls) = &pipeline.declarations else {
            return Ok(());
        };
        match decls.variables.as_slice() {
            [] => Ok(()),
            [name] => self.set_variable(name, decls.kind, item),
            [key_name, item_name, ..] => {
                self.set_variable(key_name, decls.kind, key.unwrap_or(Value::Null))?;
                self.set_variable(item_name, decls.kind, item)
            }
        }
    }

    fn set_variable(&mut self, name: &str, kind: BindingKind, value: Value) -> EvalResult<()> {
        if name == "$" {
            return Err(render_error("cannot assign to root variable"));
        }
        match kind {
            BindingKind::Declare => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.to_owned(), value);
                }
                Ok(())
            }
            BindingKind::Assign => {
                let scope = self
                    .scopes
                    .iter_mut()
                    .rev()
                    .find(|scope| scope.contains_key(name))
                    .ok_or_else(|| render_error(format!("variable {name} not defined")))?;
                scope.insert(name.to_owned(), value);
                Ok(())
            }
            _ => Err(render_error("unsupported variable binding")),
        }
    }
}

fn project<'v>(value: &'v Value, part: &str) -> EvalResult<&'v Value> {
    match value {
        Value::Object(map) => map.get(part).ok_or_else(|| missing_key(part)),
        Value::Array(items) => {
            let index = part.parse::<usize>().map_err(|_| {
                render_error(format!("array index must be integer, got {part}"))
            })?;
            items
                .get(index)
                .ok_or_else(|| render_error(format!("index out of range: {index}")))
        }
        _ => Err(render_error(format!(
            "cannot access field {part} on non-container value"
        ))),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(value) = text.parse::<i64>() {
            return Some(Number::from(value));
        }
        if let Ok(value) = text.parse::<u64>() {
            return Some(Number::from(value));
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn missing_key(key: &str) -> TemplateError {
    render_error(format!("map has no entry for key \"{key}\""))
}

fn render_error(message: impl Into<String>) -> TemplateError {
    TemplateError::render(message, None)
}
