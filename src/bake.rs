//! Bake, batch bake and magic requests.
//!
//! Each call is one exchange: encode the recipe, POST it, normalize the
//! typed result. Failures arrive as [`ErrorResult`](crate::transport::ErrorResult)
//! data and skip decoding.
use crate::decode::{decode_batch, decode_result};
use crate::recipe::{encode, RecipeOperation};
use crate::transport::{Exchange, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const BAKE_ENDPOINT: &str = "bake";
pub const BATCH_BAKE_ENDPOINT: &str = "batch/bake";
pub const MAGIC_ENDPOINT: &str = "magic";

/// Run a recipe against a single input.
pub fn bake(transport: &dyn Transport, input: &str, recipe: &[RecipeOperation]) -> Exchange {
    let recipe = encode(recipe);
    tracing::info!(recipe = %json!(recipe), "Sending bake request");
    let body = json!({ "input": input, "recipe": recipe });
    let mut result = transport.send(BAKE_ENDPOINT, &body)?;
    decode_result(&mut result);
    Ok(result)
}

/// Run one recipe against every input; results stay index-aligned.
pub fn batch_bake(
    transport: &dyn Transport,
    inputs: &[String],
    recipe: &[RecipeOperation],
) -> Exchange {
    let recipe = encode(recipe);
    tracing::info!(
        recipe = %json!(recipe),
        inputs = inputs.len(),
        "Sending batch bake request"
    );
    let body = json!({ "input": inputs, "recipe": recipe });
    let mut results = transport.send(BATCH_BAKE_ENDPOINT, &body)?;
    decode_batch(&mut results);
    Ok(results)
}

/// Arguments for the engine's magic operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicArgs {
    /// Levels of recursion for speculative execution.
    pub depth: u32,
    /// Try additional operations; much slower.
    pub intensive_mode: bool,
    /// Consider all supported languages instead of the most common ones.
    pub extensive_language_support: bool,
    /// Known plaintext string or regex.
    pub crib: String,
}

impl Default for MagicArgs {
    fn default() -> Self {
        Self {
            depth: 3,
            intensive_mode: false,
            extensive_language_support: false,
            crib: String::new(),
        }
    }
}

/// Ask the engine to guess which operations decode `input`.
///
/// The magic endpoint answers with a plain JSON result, so no decoding step.
pub fn magic(transport: &dyn Transport, input: &str, args: &MagicArgs) -> Exchange {
    tracing::info!(depth = args.depth, "Sending magic request");
    let body = json!({ "input": input, "args": args });
    transport.send(MAGIC_ENDPOINT, &body)
}
