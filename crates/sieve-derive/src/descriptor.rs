use crate::util::where_clause_with_bounds;
use darling::FromField;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, GenericParam, Ident, Type, ext::IdentExt};

const MERGE_JSON: &str = "merge_json";

///
/// DescriptorField
///

#[derive(Debug, FromField)]
#[darling(attributes(sieve))]
struct DescriptorField {
    ident: Option<Ident>,
    ty: Type,

    column: Option<String>,
    query: Option<String>,
    update: Option<String>,
    #[darling(default)]
    flatten: bool,
}

impl DescriptorField {
    // fields without any sieve annotation pass through untouched
    const fn is_annotated(&self) -> bool {
        self.column.is_some() || self.query.is_some() || self.update.is_some() || self.flatten
    }

    fn is_merge_json(&self) -> bool {
        self.update.as_deref() == Some(MERGE_JSON)
    }

    fn decl_expr(&self, name: &str) -> TokenStream {
        let ty = &self.ty;

        let mut expr = quote! {
            ::sieve::shape::FieldDecl::new(
                #name,
                <#ty as ::sieve::traits::FieldValue>::shape(),
            )
        };

        if let Some(column) = &self.column {
            expr = quote!(#expr.column(#column));
        }
        if let Some(query) = &self.query {
            expr = quote!(#expr.query(#query));
        }
        if let Some(update) = &self.update {
            expr = quote!(#expr.update(#update));
        }
        if self.flatten {
            expr = quote!(#expr.embedded());
        }

        expr
    }

    fn value_expr(&self, ident: &Ident) -> TokenStream {
        if self.is_merge_json() {
            quote!(::sieve::value::Value::document(&self.#ident))
        } else {
            quote!(::sieve::traits::FieldValue::to_value(&self.#ident))
        }
    }

    fn bounds(&self) -> TokenStream {
        let ty = &self.ty;

        if self.is_merge_json() {
            quote! {
                #ty: ::sieve::traits::FieldValue + ::sieve::__reexports::serde::Serialize + 'static
            }
        } else {
            quote!(#ty: ::sieve::traits::FieldValue + 'static)
        }
    }
}

// derive_descriptor
pub fn derive_descriptor(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "Descriptor can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "Descriptor can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    let mut errors = darling::Error::accumulator();
    let parsed: Vec<DescriptorField> = fields
        .iter()
        .filter_map(|field| errors.handle(DescriptorField::from_field(field)))
        .filter(DescriptorField::is_annotated)
        .collect();
    if let Err(err) = errors.finish() {
        return err.write_errors();
    }

    let mut decls = Vec::with_capacity(parsed.len());
    let mut values = Vec::with_capacity(parsed.len());
    for field in &parsed {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let name = field_ident.unraw().to_string();
        let value = field.value_expr(field_ident);

        decls.push(field.decl_expr(&name));
        values.push(quote!((#name, #value)));
    }

    let mut bounds: Vec<TokenStream> = Vec::new();
    if !input.generics.params.is_empty() {
        // descriptors are keyed by TypeId, so every type parameter must be 'static
        for param in &input.generics.params {
            if let GenericParam::Type(param) = param {
                let param = &param.ident;
                bounds.push(quote!(#param: 'static));
            }
        }
        bounds.extend(parsed.iter().map(DescriptorField::bounds));
    }
    let where_clause = where_clause_with_bounds(where_clause, &bounds);

    quote! {
        impl #impl_generics ::sieve::traits::FieldValue for #ident #ty_generics #where_clause {
            fn shape() -> ::sieve::shape::Shape {
                ::sieve::shape::Shape::Struct(::sieve::shape::StructRef::of::<Self>())
            }

            fn to_value(&self) -> ::sieve::value::Value {
                ::sieve::value::Value::Record(::sieve::value::Record::new(
                    ::sieve::shape::StructRef::of::<Self>(),
                    vec![#(#values),*],
                ))
            }
        }

        impl #impl_generics ::sieve::traits::Descriptor for #ident #ty_generics #where_clause {
            fn fields() -> Vec<::sieve::shape::FieldDecl> {
                vec![#(#decls),*]
            }
        }
    }
}
