// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Type mapping from engine type names to AWS Glue (Hive) column types.

use crate::catalog_provider::SourceColumn;
use crate::target_catalog::TargetColumn;

/// Glue type used for every engine type without an explicit mapping.
pub const FALLBACK_GLUE_TYPE: &str = "string";

/// Map an engine type name (e.g., `LongType`) to a Glue column type.
///
/// Total over all inputs: matching is exact and anything unrecognized,
/// including the empty string and differently cased names, maps to
/// [`FALLBACK_GLUE_TYPE`].
pub fn engine_type_to_glue(engine_type: &str) -> &'static str {
    match engine_type {
        "IntegerType" => "int",
        "LongType" => "bigint",
        "DoubleType" => "double",
        "FloatType" => "float",
        "StringType" => "string",
        "BooleanType" => "boolean",
        "BinaryType" => "binary",
        _ => FALLBACK_GLUE_TYPE,
    }
}

/// Translate source columns to Glue columns, preserving order.
pub fn columns_to_glue(columns: &[SourceColumn]) -> Vec<TargetColumn> {
    columns
        .iter()
        .map(|col| TargetColumn::new(&col.name, engine_type_to_glue(&col.engine_type)))
        .collect()
}
