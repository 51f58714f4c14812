//! Python bindings via PyO3

use crate::rule::{self, DataRecord, Node, NodeKind};
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};
use serde_json::{Map, Number, Value};

// ============================================================================
// Rule Class
// ============================================================================

/// Compiled rule tree exposed to Python
#[pyclass(name = "Rule", module = "rule_engine_core", frozen)]
pub struct PyRule {
    node: Node,
}

impl From<Node> for PyRule {
    fn from(node: Node) -> Self {
        PyRule { node }
    }
}

#[pymethods]
impl PyRule {
    /// "operand" or "operator"
    #[getter]
    fn node_type(&self) -> &'static str {
        match self.node.kind() {
            NodeKind::Operand => "operand",
            NodeKind::Operator => "operator",
        }
    }

    /// Condition text for operands, connective for operators
    #[getter]
    fn value(&self) -> &str {
        self.node.value()
    }

    #[getter]
    fn left(&self) -> Option<PyRule> {
        self.node.left().cloned().map(PyRule::from)
    }

    #[getter]
    fn right(&self) -> Option<PyRule> {
        self.node.right().cloned().map(PyRule::from)
    }

    /// Serialize to the `{"nodeType", "value", "left", "right"}` JSON form
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.node).map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __eq__(&self, other: PyRef<'_, PyRule>) -> bool {
        self.node == other.node
    }

    fn __str__(&self) -> String {
        self.node.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Rule({})", self.node)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a Python value (dict/list/str/number/bool/None) into JSON
fn py_to_json(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subclass of int, check it first
    if let Ok(flag) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        if let Ok(int) = obj.extract::<i64>() {
            return Ok(Value::from(int));
        }
        return float_to_json(obj.extract::<f64>()?);
    }
    if let Ok(float) = obj.downcast::<PyFloat>() {
        return float_to_json(float.value());
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Value::String(obj.extract()?));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = Map::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let key: String = key.extract()?;
            map.insert(key, py_to_json(&value)?);
        }
        return Ok(Value::Object(map));
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| py_to_json(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple
            .iter()
            .map(|item| py_to_json(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }

    Err(PyTypeError::new_err(format!(
        "Unsupported value type: {}",
        obj.get_type().name()?
    )))
}

fn float_to_json(value: f64) -> PyResult<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| PyValueError::new_err(format!("Non-finite number: {}", value)))
}

fn extract_record(data: &Bound<'_, PyDict>) -> PyResult<DataRecord> {
    Ok(DataRecord::from_json(&py_to_json(data.as_any())?)?)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Compile a rule string like "age > 30 AND department = 'Sales'"
#[pyfunction]
fn create_rule(rule: &str) -> PyResult<PyRule> {
    Ok(crate::create_rule(rule)?.into())
}

/// Build a rule from `{"rules": {...}}` given as a dict or as JSON text
#[pyfunction]
fn create_rule_from_json(description: &Bound<'_, PyAny>) -> PyResult<PyRule> {
    let node = if let Ok(text) = description.extract::<String>() {
        rule::from_json_str(&text)?
    } else {
        crate::create_rule_from_json(&py_to_json(description)?)?
    };
    Ok(node.into())
}

/// Join two rules under a connective
#[pyfunction]
fn combine_rules(left: PyRef<'_, PyRule>, right: PyRef<'_, PyRule>, operator: &str) -> PyRule {
    crate::combine_rules(left.node.clone(), right.node.clone(), operator).into()
}

/// Fold a non-empty list of rules left to right under one connective
#[pyfunction]
fn combine_all(rules: Vec<PyRef<'_, PyRule>>, operator: &str) -> PyResult<PyRule> {
    let nodes = rules.iter().map(|rule| rule.node.clone());
    Ok(crate::combine_all(nodes, operator)?.into())
}

/// Evaluate a rule against a dict of field values
#[pyfunction]
fn evaluate_rule(rule: PyRef<'_, PyRule>, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let record = extract_record(data)?;
    Ok(crate::evaluate_rule(&rule.node, &record)?)
}

/// Evaluate a rule asynchronously
///
/// The dict is converted up front; evaluation itself runs on Tokio's blocking
/// pool so the asyncio event loop stays responsive for very large trees.
///
/// # Example (Python)
/// ```python
/// rule = create_rule("age > 30")
/// ok = await evaluate_rule_async(rule, {"age": 35})
/// ```
#[pyfunction]
fn evaluate_rule_async<'py>(
    py: Python<'py>,
    rule: PyRef<'_, PyRule>,
    data: &Bound<'_, PyDict>,
) -> PyResult<Bound<'py, PyAny>> {
    let node = rule.node.clone();
    let record = extract_record(data)?;

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let result = tokio::task::spawn_blocking(move || crate::evaluate_rule(&node, &record))
            .await
            .map_err(|e| PyRuntimeError::new_err(format!("Evaluation task panicked: {}", e)))??;

        Ok(result)
    })
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn rule_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(create_rule_from_json, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(combine_all, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule_async, m)?)?;
    m.add_class::<PyRule>()?;
    Ok(())
}
