//! Procedural macros for omapper reflection
//!
//! Generates the two capabilities the mapper consumes from user types:
//! the ordered constructor parameter list (`Constructible`) and by-name
//! attribute reads (`Attributes`). The traits themselves live in `omapper`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Type};

/// Derive macro implementing `omapper::Constructible`.
///
/// Every named field becomes a required construction parameter, in
/// declaration order. Fields marked `#[omapper(skip)]` are not parameters
/// and are initialised with `Default::default()`.
#[proc_macro_derive(Constructible, attributes(omapper))]
pub fn derive_constructible(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_constructible(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro implementing `omapper::Attributes`.
///
/// Each named field is readable under its own name. Reading clones the
/// field, so `Rc`/`Arc` fields hand out an alias of the same allocation.
#[proc_macro_derive(Attributes, attributes(omapper))]
pub fn derive_attributes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_attributes(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Debug)]
struct FieldSpec {
    ident: Ident,
    name: String,
    ty: Type,
    skip: bool,
}

#[derive(Debug)]
enum Shape {
    Named(Vec<FieldSpec>),
    Unit,
}

fn parse_shape(input: &DeriveInput, derive: &str) -> syn::Result<Shape> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .map(parse_field)
                .collect::<syn::Result<Vec<_>>>()
                .map(Shape::Named),
            Fields::Unit => Ok(Shape::Unit),
            Fields::Unnamed(_) => Err(syn::Error::new_spanned(
                &input.ident,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

fn parse_field(field: &Field) -> syn::Result<FieldSpec> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let mut skip = false;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("omapper")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported omapper attribute, expected `skip`"))
            }
        })?;
    }

    // r#type reads as `type` on the mapping side
    let name = ident.to_string().trim_start_matches("r#").to_string();

    Ok(FieldSpec {
        ident,
        name,
        ty: field.ty.clone(),
        skip,
    })
}

fn expand_constructible(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (parameters, checks, body) = match parse_shape(input, "Constructible")? {
        Shape::Unit => (Vec::new(), Vec::new(), quote! { Self }),
        Shape::Named(fields) => {
            let parameters = fields
                .iter()
                .filter(|f| !f.skip)
                .map(|f| f.name.clone())
                .collect::<Vec<_>>();
            // Every argument is checked before any is taken, so a failed
            // construction leaves `args` whole for the diagnostic.
            let checks = fields
                .iter()
                .filter(|f| !f.skip)
                .map(|f| {
                    let ty = &f.ty;
                    let name = &f.name;
                    quote! { args.check::<#ty>(#name)?; }
                })
                .collect::<Vec<_>>();
            let inits = fields.iter().map(|f| {
                let ident = &f.ident;
                let ty = &f.ty;
                let name = &f.name;
                if f.skip {
                    quote! { #ident: ::std::default::Default::default() }
                } else {
                    quote! { #ident: args.take::<#ty>(#name)? }
                }
            });
            (parameters, checks, quote! { Self { #(#inits),* } })
        }
    };

    Ok(quote! {
        impl #impl_generics ::omapper::Constructible for #struct_name #ty_generics #where_clause {
            fn parameters() -> &'static [&'static str] {
                &[#(#parameters),*]
            }

            fn type_name() -> &'static str {
                #type_name
            }

            #[allow(unused_variables)]
            fn construct(
                args: &mut ::omapper::Arguments,
            ) -> ::std::result::Result<Self, ::omapper::BoxError> {
                #(#checks)*
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

fn expand_attributes(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match parse_shape(input, "Attributes")? {
        Shape::Unit => Vec::new(),
        Shape::Named(fields) => fields.into_iter().filter(|f| !f.skip).collect(),
    };

    let names = fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
    let arms = fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        quote! {
            #name => ::std::option::Option::Some(::omapper::Value::new(
                ::std::clone::Clone::clone(&self.#ident),
            )),
        }
    });

    Ok(quote! {
        impl #impl_generics ::omapper::Attributes for #struct_name #ty_generics #where_clause {
            fn attribute(&self, name: &str) -> ::std::option::Option<::omapper::Value> {
                match name {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn attribute_names() -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn type_name() -> &'static str {
                #type_name
            }
        }
    })
}
