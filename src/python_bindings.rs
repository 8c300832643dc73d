use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::path::Path;

use crate::analysis::{load_inputs, resolve_q_values, AnalysisInputs};
use crate::averaging::average_by_residue;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::probability::compute_probabilities;
use crate::qvalue::write_q_values;

fn to_py_err(e: AnalysisError) -> PyErr {
    match e {
        AnalysisError::ResourceUnavailable { .. } => {
            PyErr::new::<pyo3::exceptions::PyIOError, _>(e.to_string())
        }
        AnalysisError::InvalidConfig(_)
        | AnalysisError::InvalidContact { .. }
        | AnalysisError::UnsupportedFormat(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string())
        }
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()),
    }
}

fn load(
    trajectory_file: &str,
    contacts_file: &str,
    config: &AnalysisConfig,
    max_frames: Option<usize>,
) -> PyResult<AnalysisInputs> {
    load_inputs(Path::new(trajectory_file), Path::new(contacts_file), config, max_frames)
        .map_err(to_py_err)
}

/// Python binding for Q value calculation
#[pyfunction]
#[pyo3(signature = (trajectory_file, contacts_file, residues, cutoff=1.2, max_frames=None, output_file=None))]
fn calc_q_values(
    trajectory_file: &str,
    contacts_file: &str,
    residues: usize,
    cutoff: f64,
    max_frames: Option<usize>,
    output_file: Option<&str>,
) -> PyResult<Vec<usize>> {
    let config = AnalysisConfig::new(residues).with_cutoff(cutoff);
    let inputs = load(trajectory_file, contacts_file, &config, max_frames)?;
    let q_values = resolve_q_values(&inputs, &config, None).map_err(to_py_err)?;

    if let Some(path) = output_file {
        write_q_values(path, &q_values).map_err(to_py_err)?;
    }

    Ok(q_values)
}

fn filtered_config(
    residues: usize,
    cutoff: f64,
    q_range: (i64, i64),
    time_range: (i64, i64),
) -> AnalysisConfig {
    AnalysisConfig::new(residues)
        .with_cutoff(cutoff)
        .with_q_range(q_range.0, q_range.1)
        .with_time_range(time_range.0, time_range.1)
}

/// Python binding for per-contact probabilities in a Q and time range.
///
/// Returns a dict with `frames_in_range` and a `contacts` list of dicts.
#[pyfunction]
#[pyo3(signature = (trajectory_file, contacts_file, residues, q_range, time_range, cutoff=1.2, q_file=None))]
fn contact_probability(
    py: Python<'_>,
    trajectory_file: &str,
    contacts_file: &str,
    residues: usize,
    q_range: (i64, i64),
    time_range: (i64, i64),
    cutoff: f64,
    q_file: Option<&str>,
) -> PyResult<PyObject> {
    let config = filtered_config(residues, cutoff, q_range, time_range);
    let inputs = load(trajectory_file, contacts_file, &config, None)?;
    let q_values = resolve_q_values(&inputs, &config, q_file.map(Path::new)).map_err(to_py_err)?;

    let result = compute_probabilities(
        &inputs.trajectory,
        &inputs.contacts,
        &q_values,
        config.time_range,
        config.q_range,
        config.cutoff,
    );

    let py_records = PyList::empty_bound(py);
    for record in &result.records {
        let py_dict = PyDict::new_bound(py);
        py_dict.set_item("focus_residue", record.focus_residue)?;
        py_dict.set_item("contact_residue", record.contact_residue)?;
        py_dict.set_item("probability", record.probability)?;
        py_dict.set_item("total_occurrences", record.total_occurrences)?;
        py_records.append(py_dict)?;
    }

    let py_result = PyDict::new_bound(py);
    py_result.set_item("frames_in_range", result.frames_in_range)?;
    py_result.set_item("contacts", py_records)?;

    Ok(py_result.into())
}

/// Python binding for per-residue average contact probability.
///
/// Returns a list of `(residue, probability)` tuples; probability is None for
/// residues that take part in no contact.
#[pyfunction]
#[pyo3(signature = (trajectory_file, contacts_file, residues, q_range, time_range, cutoff=1.2, q_file=None))]
fn average_contact_probability(
    trajectory_file: &str,
    contacts_file: &str,
    residues: usize,
    q_range: (i64, i64),
    time_range: (i64, i64),
    cutoff: f64,
    q_file: Option<&str>,
) -> PyResult<Vec<(usize, Option<f64>)>> {
    let config = filtered_config(residues, cutoff, q_range, time_range);
    let inputs = load(trajectory_file, contacts_file, &config, None)?;
    let q_values = resolve_q_values(&inputs, &config, q_file.map(Path::new)).map_err(to_py_err)?;

    let result = compute_probabilities(
        &inputs.trajectory,
        &inputs.contacts,
        &q_values,
        config.time_range,
        config.q_range,
        config.cutoff,
    );

    Ok(average_by_residue(config.residue_count, &result.records)
        .into_iter()
        .map(|avg| (avg.residue_id, avg.average_probability))
        .collect())
}

/// Python module definition
#[pymodule]
fn contact_probability_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(calc_q_values, m)?)?;
    m.add_function(wrap_pyfunction!(contact_probability, m)?)?;
    m.add_function(wrap_pyfunction!(average_contact_probability, m)?)?;
    m.add("__doc__", "Native contact probabilities conditioned on Q value and time")?;
    Ok(())
}
