#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use control_catalog::{Catalog, Control, Group, Parameter, Part, Property, save_catalog_to_path};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn catalog_query_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-query"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn labelled_part(name: &str, id: &str, label: &str, prose: &str) -> Part {
    let mut part = Part::new(name, Some(id), Some(prose));
    part.props = vec![Property::new("label", label)];
    part
}

pub fn param(id: &str, values: &[&str]) -> Parameter {
    Parameter {
        id: id.to_string(),
        values: values.iter().map(|value| value.to_string()).collect(),
        ..Default::default()
    }
}

fn statement_control(id: &str, title: &str, items: &[(&str, &str)]) -> Control {
    let mut control = Control::new(id, title);
    let mut statement = Part::new("statement", Some(&format!("{id}_smt")), None);
    statement.parts = items
        .iter()
        .map(|(suffix, prose)| {
            labelled_part(
                "item",
                &format!("{id}_smt.{suffix}"),
                &format!("{suffix}."),
                prose,
            )
        })
        .collect();
    control.parts = vec![
        statement,
        Part::new("guidance", Some(&format!("{id}_gdn")), Some("Guidance text.")),
    ];
    control
}

/// Two families, one nested sub-group, sub-controls two deep and one
/// ungrouped control.
pub fn sample_catalog() -> Catalog {
    let mut ac_1 = statement_control(
        "ac-1",
        "Policy and Procedures",
        &[("a", "Develop a policy."), ("b", "Review the policy.")],
    );
    ac_1.params = vec![param("ac-1_prm_1", &["organization-defined personnel"])];

    let mut ac_2 = statement_control("ac-2", "Account Management", &[("a", "Define accounts.")]);
    let mut ac_2_1 = Control::new("ac-2.1", "Automated System Account Management");
    ac_2_1.params = vec![param("ac-2.1_prm_1", &[])];
    ac_2_1.controls = vec![Control::new("ac-2.1.a", "Nested Enhancement")];
    ac_2.controls = vec![ac_2_1];

    let mut ac = Group::new("ac", "Access Control");
    ac.class = Some("family".to_string());
    ac.controls = vec![ac_1, ac_2];

    let mut sc_7 = Control::new("sc-7", "Boundary Protection");
    sc_7.parts = vec![Part::new(
        "statement",
        Some("sc-7_smt"),
        Some("Monitor communications at the boundary."),
    )];
    let mut sc_boundary = Group::new("sc-boundary", "Boundary");
    sc_boundary.controls = vec![sc_7];
    let mut sc = Group::new("sc", "System and Communications Protection");
    sc.controls = vec![Control::new("sc-1", "Policy")];
    sc.groups = vec![sc_boundary];

    let mut catalog = Catalog {
        uuid: "7ba8a1f7-6d52-4b6e-8f8a-1a2b3c4d5e6f".to_string(),
        groups: vec![ac, sc],
        controls: vec![Control::new("pm-1", "Program Plan")],
        ..Default::default()
    };
    catalog.metadata.title = "Sample Catalog".to_string();
    catalog.metadata.version = Some("1.0".to_string());
    catalog
}

/// Single-level variant for directory round trips, which read groups one
/// directory deep.
pub fn flat_catalog() -> Catalog {
    let mut catalog = sample_catalog();
    catalog.groups[1].groups.clear();
    catalog
}

pub fn write_catalog(dir: &Path, catalog: &Catalog) -> Result<PathBuf> {
    let path = dir.join("catalog.json");
    save_catalog_to_path(catalog, &path)?;
    Ok(path)
}
