//! Profile documents and the parameter values they set.
//!
//! Only the pieces the catalog core consumes are modelled: set-parameters
//! (resolved as a plain dictionary, last setting wins) and alters that add
//! parts to controls.

use crate::catalog::model::{Control, Parameter, Part, Property};
use crate::control_io::param_values_as_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header key under which per-control parameter values are written.
pub const SET_PARAMS_TAG: &str = "x-trestle-set-params";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify: Option<Modify>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Modify {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_parameters: Vec<SetParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alters: Vec<Alter>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SetParameter {
    pub param_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Additions a profile makes to one control.
pub struct Alter {
    pub control_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adds: Vec<Add>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Add {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl Profile {
    pub fn set_parameters(&self) -> &[SetParameter] {
        self.modify
            .as_ref()
            .map(|modify| modify.set_parameters.as_slice())
            .unwrap_or_default()
    }

    /// Alters that target `control_id`, in document order.
    pub fn alters_for<'a>(&'a self, control_id: &'a str) -> impl Iterator<Item = &'a Alter> + 'a {
        self.modify
            .iter()
            .flat_map(|modify| modify.alters.iter())
            .filter(move |alter| alter.control_id == control_id)
    }
}

/// Map of every parameter id the profile sets to its value string.
pub fn get_full_profile_param_dict(profile: &Profile) -> BTreeMap<String, String> {
    profile
        .set_parameters()
        .iter()
        .map(|set_param| (set_param.param_id.clone(), param_values_as_string(set_param)))
        .collect()
}

/// The control's own parameter values, overridden where the profile sets them.
pub fn get_profile_param_dict(
    control: &Control,
    profile_param_dict: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut param_dict = control_param_dict(control);
    for (param_id, value) in param_dict.iter_mut() {
        if let Some(profile_value) = profile_param_dict.get(param_id) {
            value.clone_from(profile_value);
        }
    }
    param_dict
}

/// Parameter id → current value string for every parameter of the control.
pub fn control_param_dict(control: &Control) -> BTreeMap<String, String> {
    control
        .params
        .iter()
        .map(|param| (param.id.clone(), parameter_value_string(param)))
        .collect()
}

fn parameter_value_string(param: &Parameter) -> String {
    param_values_as_string(&SetParameter {
        param_id: param.id.clone(),
        label: param.label.clone(),
        values: param.values.clone(),
    })
}
