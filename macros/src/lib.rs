use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Token};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(String),
    Expr(Expr),
}

/// Check if the struct has #[allow(missing_docs)] attribute
fn is_allow_missing_docs(attr: &Attribute) -> bool {
    attr.path().is_ident("allow")
        && attr
            .parse_args::<syn::Ident>()
            .map(|ident| ident == "missing_docs")
            .unwrap_or(false)
}

/// Define a struct of `Param` handles and implement `Params` for it.
///
/// ```ignore
/// define_params! {
///     pub struct ServerParams {
///         /// Listen port
///         #[param(env = "PORT", flag = "port", default = 8080)]
///         pub port: i64,
///     }
/// }
/// ```
#[proc_macro]
pub fn define_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_params(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_params(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "define_params! does not support generic structs",
        ));
    }

    let allow_missing_docs = input.attrs.iter().any(is_allow_missing_docs);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "define_params! only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "define_params! only supports structs",
            ));
        }
    };

    let mut field_defs = Vec::new();
    let mut define_stmts = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_vis = &field.vis;
        let field_type = &field.ty;

        let config = parse_param_config(field_name, &field.attrs, allow_missing_docs)?;

        // Keep doc comments and other attributes, drop our own
        let kept_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("param"))
            .collect();
        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        field_defs.push(quote! {
            #(#kept_attrs)*
            #field_vis #field_name: ::param_flags::Param<#field_type>
        });

        let env_name = &config.env_name;
        let flag_name = &config.flag_name;
        let description = &config.description;
        let default = match &config.default {
            // String literals stand in for String defaults
            Some(Expr::Lit(syn::ExprLit {
                lit: Lit::Str(s), ..
            })) => quote! { ::core::convert::From::from(#s) },
            Some(expr) => quote! {{
                let default: #field_type = #expr;
                default
            }},
            None => quote! { <#field_type as ::core::default::Default>::default() },
        };

        define_stmts.push(quote! {
            #(#cfg_attrs)*
            let #field_name = flag_set.define::<#field_type>(
                #env_name,
                #flag_name,
                #default,
                #description,
            )?;
        });

        field_inits.push(quote! {
            #(#cfg_attrs)*
            #field_name
        });
    }

    // Filter out allow(missing_docs) from the struct definition
    let filtered_attrs: Vec<&Attribute> = input
        .attrs
        .iter()
        .filter(|attr| !is_allow_missing_docs(attr))
        .collect();

    let struct_def = quote! {
        #(#filtered_attrs)*
        #vis struct #struct_name {
            #(#field_defs),*
        }
    };

    let params_impl = quote! {
        impl ::param_flags::Params for #struct_name {
            fn define(
                flag_set: &mut ::param_flags::FlagSet,
            ) -> ::core::result::Result<Self, ::param_flags::ParamError> {
                #(#define_stmts)*

                ::core::result::Result::Ok(Self {
                    #(#field_inits),*
                })
            }
        }
    };

    Ok(quote! {
        #struct_def
        #params_impl
    })
}

#[derive(Debug)]
struct ParamConfig {
    env_name: String,
    flag_name: String,
    description: String,
    default: Option<Expr>,
}

/// Parse #[param(env = "X", flag = "x", doc = "Y", default = val)] syntax
fn parse_param_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if !meta.input.peek(Token![=]) {
            return Err(meta.error(format!("expected `{} = ...`", key)));
        }
        meta.input.parse::<Token![=]>()?;

        match key.as_str() {
            "env" | "flag" | "doc" => {
                let value: syn::LitStr = meta.input.parse()?;
                values.insert(key, MetaValue::Str(value.value()));
            }
            "default" => {
                let expr: Expr = meta.input.parse()?;
                values.insert(key, MetaValue::Expr(expr));
            }
            _ => {
                return Err(meta.error(format!(
                    "unknown param option `{}`, expected env, flag, doc or default",
                    key
                )));
            }
        }

        Ok(())
    })?;

    Ok(values)
}

/// Join the field's `///` comment lines into one description
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

fn parse_param_config(
    field_name: &syn::Ident,
    attrs: &[Attribute],
    allow_missing_docs: bool,
) -> syn::Result<ParamConfig> {
    let mut parsed = HashMap::new();
    if let Some(param_attr) = attrs.iter().find(|attr| attr.path().is_ident("param")) {
        parsed = match &param_attr.meta {
            Meta::List(list) => parse_param_list(list)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    param_attr,
                    "param attribute must be a list: #[param(env = \"...\", ...)]",
                ));
            }
        };
    }

    let field_str = field_name.unraw().to_string();

    let env_name = match parsed.remove("env") {
        Some(MetaValue::Str(s)) => s,
        _ => field_str.to_uppercase(),
    };

    let flag_name = match parsed.remove("flag") {
        Some(MetaValue::Str(s)) => s,
        _ => field_str.replace('_', "-"),
    };
    if flag_name.is_empty() {
        return Err(syn::Error::new_spanned(
            field_name,
            "flag name must not be empty",
        ));
    }

    let description = match parsed.remove("doc") {
        Some(MetaValue::Str(s)) => s.trim().to_string(),
        _ => match doc_comment(attrs) {
            Some(doc) => doc,
            None if allow_missing_docs => String::new(),
            None => {
                return Err(syn::Error::new_spanned(
                    field_name,
                    "parameter needs doc = \"description\" or a doc comment (or use #[allow(missing_docs)] on struct)",
                ));
            }
        },
    };

    let default = match parsed.remove("default") {
        Some(MetaValue::Expr(e)) => Some(e),
        _ => None,
    };

    Ok(ParamConfig {
        env_name,
        flag_name,
        description,
        default,
    })
}
