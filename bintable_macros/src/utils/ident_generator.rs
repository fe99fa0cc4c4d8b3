pub(crate) trait IdentGenerator {
    /// Name of the column a field maps to, before any prefix is applied.
    fn to_column_name(&self) -> String;
}

impl IdentGenerator for proc_macro2::Ident {
    fn to_column_name(&self) -> String {
        let name = self.to_string();
        match name.strip_prefix("r#") {
            Some(stripped) => stripped.to_string(),
            None => name,
        }
    }
}
