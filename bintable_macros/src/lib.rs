mod record;

mod utils;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Implements `bintable::Record`, `bintable::ReadColumn` and `bintable::WriteColumn` for a struct
/// with named fields, so that it can be read from and written to a table one column per field.
///
/// Nested records are flattened into `PARENT.CHILD` column names.
///
/// # Example
///
/// ```no_rust
/// use bintable::Record;
///
/// #[derive(Record, Default)]
/// pub struct Source {
///     pub id: Vec<i64>,
///     #[record(rename = "RA_DEG")]
///     pub ra: Vec<f64>,
///     #[record(skip)]
///     pub cache: Option<String>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn bintable_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let result = record::handle(ast);
    match result {
        Ok(codegen) => codegen.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
