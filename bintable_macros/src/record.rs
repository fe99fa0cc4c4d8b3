use darling::{ast::Data, util::Ignored, FromDeriveInput, FromField};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Error};

use crate::utils::ident_generator::IdentGenerator;

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordOpts {
    ident: Ident,
    data: Data<Ignored, RecordStructFieldOpt>,
}

#[derive(Debug, FromField)]
#[darling(attributes(record))]
struct RecordStructFieldOpt {
    ident: Option<Ident>,
    #[darling(default)]
    rename: Option<String>,
    #[darling(default)]
    skip: bool,
}

impl RecordStructFieldOpt {
    fn column_name(&self) -> Option<String> {
        let ident = self.ident.as_ref()?;
        Some(
            self.rename
                .clone()
                .unwrap_or_else(|| ident.to_column_name()),
        )
    }
}

pub(crate) fn handle(ast: DeriveInput) -> Result<TokenStream, Error> {
    if !ast.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &ast.generics,
            "generic records are not supported",
        ));
    }
    let record_opts = RecordOpts::from_derive_input(&ast)?;

    let struct_name = &record_opts.ident;
    let Data::Struct(data_struct) = record_opts.data else {
        return Err(Error::new_spanned(struct_name, "enum is not supported"));
    };

    let mut fields = Vec::new();
    for field in data_struct.fields.iter().filter(|field| !field.skip) {
        let Some(column_name) = field.column_name() else {
            return Err(Error::new_spanned(
                struct_name,
                "only structs with named fields are supported",
            ));
        };
        if column_name.is_empty() || column_name.contains('.') {
            return Err(Error::new_spanned(
                struct_name,
                format!("invalid column name '{column_name}'"),
            ));
        }
        fields.push((field, column_name));
    }

    let record_codegen = trait_record_codegen(struct_name, &fields);
    let column_codegen = trait_column_codegen(struct_name);

    Ok(quote! {
        #record_codegen

        #column_codegen
    })
}

fn trait_record_codegen(
    struct_name: &Ident,
    fields: &[(&RecordStructFieldOpt, String)],
) -> TokenStream {
    let mut visit_fields: Vec<TokenStream> = Vec::new();
    let mut visit_fields_mut: Vec<TokenStream> = Vec::new();

    for (field, column_name) in fields {
        let field_name = field.ident.as_ref().expect("named field");

        visit_fields.push(quote! {
            visitor.visit(#column_name, &self.#field_name)?;
        });
        visit_fields_mut.push(quote! {
            visitor.visit(#column_name, &mut self.#field_name)?;
        });
    }

    quote! {
        impl ::bintable::record::Record for #struct_name {
            #[allow(unused_variables)]
            fn visit_fields<V>(&self, visitor: &mut V) -> ::core::result::Result<(), ::bintable::TableError>
            where
                V: ::bintable::record::FieldVisitor,
            {
                #(#visit_fields)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn visit_fields_mut<V>(&mut self, visitor: &mut V) -> ::core::result::Result<(), ::bintable::TableError>
            where
                V: ::bintable::record::FieldVisitorMut,
            {
                #(#visit_fields_mut)*
                ::core::result::Result::Ok(())
            }
        }
    }
}

fn trait_column_codegen(struct_name: &Ident) -> TokenStream {
    quote! {
        impl ::bintable::ReadColumn for #struct_name {
            fn read_column<F>(
                &mut self,
                ctx: &mut ::bintable::ReadContext<'_, F>,
                opts: &::bintable::ReadOptions,
                name: &str,
            ) -> ::bintable::ReadResult
            where
                F: ::bintable::io::TableIo,
            {
                ::bintable::record::read_record(self, ctx, opts, name)
            }
        }

        impl ::bintable::WriteColumn for #struct_name {
            fn write_column<F>(
                &self,
                ctx: &mut ::bintable::WriteContext<'_, F>,
                name: &str,
            ) -> ::core::result::Result<(), ::bintable::TableError>
            where
                F: ::bintable::io::TableIo,
            {
                ::bintable::record::write_record(self, ctx, name)
            }

            fn update_column<F>(
                &self,
                ctx: &mut ::bintable::WriteContext<'_, F>,
                name: &str,
            ) -> ::core::result::Result<(), ::bintable::TableError>
            where
                F: ::bintable::io::TableIo,
            {
                ::bintable::record::update_record(self, ctx, name)
            }
        }
    }
}
