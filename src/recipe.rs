//! Recipe descriptors and their wire encoding.
//!
//! Agents describe a recipe as a list of `{op, args?}` steps. The bake
//! endpoints accept either a list of bare operation names or a list of
//! operation objects; this module picks one shape per recipe.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a recipe: an operation name plus optional positional args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeOperation {
    /// Operation name as listed by the engine (e.g. "From Hex").
    pub op: String,

    /// Positional arguments; absent, `null` and `[]` all mean "no args".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
}

#[cfg(test)]
impl RecipeOperation {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            args: None,
        }
    }

    pub fn with_args(op: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            op: op.into(),
            args: Some(args),
        }
    }
}

impl RecipeOperation {
    /// Arguments if there is at least one.
    pub fn present_args(&self) -> Option<&[Value]> {
        self.args.as_deref().filter(|args| !args.is_empty())
    }
}

/// An operation in object form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireOperation {
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
}

/// Recipe in one of the shapes accepted by the bake endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireRecipe {
    /// `["To Hex", "MD5"]`
    Bare(Vec<String>),
    /// `[{"op": "To Morse Code", "args": ["Dash/Dot"]}, {"op": "MD5"}]`
    Objects(Vec<WireOperation>),
}

/// Encode descriptors into the wire recipe.
///
/// The bare shape is used only when no step carries arguments; a single
/// argument-bearing step switches the whole recipe to objects. Arguments are
/// always forwarded as the positional array given, whether that is one scalar
/// or several structured values.
pub fn encode(recipe: &[RecipeOperation]) -> WireRecipe {
    if recipe.iter().all(|step| step.present_args().is_none()) {
        return WireRecipe::Bare(recipe.iter().map(|step| step.op.clone()).collect());
    }
    WireRecipe::Objects(
        recipe
            .iter()
            .map(|step| WireOperation {
                op: step.op.clone(),
                args: step.present_args().map(<[Value]>::to_vec),
            })
            .collect(),
    )
}
