// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DataEnum, DeriveInput, Fields, Ident, LitInt, LitStr,
    Path, Token, Type,
};

/// Integer types accepted as an enum representation.
const ENUM_REPRS: &[&str] = &["u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64"];

/// `#[derive(AmqpContract)]` macro: generates the `AmqpType` capability impl
///
/// On a struct with named fields it emits a contract (encoding, descriptor,
/// members, base, provided subtypes, hooks). On a fieldless enum it emits an
/// `AmqpEnum` impl carried as the `#[repr]` integer (default `i32`).
///
/// Container attributes (`#[amqp(...)]` on the struct):
/// - `encoding = "list" | "map" | "simple_list" | "simple_map"` (default `list`)
/// - `name = "..."`, `code = 0x...` descriptor
/// - `provides(TypeA, TypeB)` subtypes accepted in place of this type
/// - `before_encode = "method"` (also `after_encode`, `before_decode`, `after_decode`)
///
/// Field attributes:
/// - `name = "..."` wire name, `order = N` list position
/// - `skip` not serialized
/// - `base` embedded base type whose members come first
///
/// The struct must also implement `Default`. Generic types are rejected.
///
/// Example:
/// ```ignore
/// use amqp_contract::AmqpContract;
///
/// #[derive(AmqpContract, Default)]
/// #[amqp(encoding = "list", name = "example:flow", code = 0x13)]
/// struct Flow {
///     #[amqp(order = 1)]
///     handle: u32,
///     #[amqp(order = 2, name = "link-credit")]
///     credit: Option<u32>,
///     #[amqp(skip)]
///     local_only: bool,
/// }
/// ```
#[proc_macro_derive(AmqpContract, attributes(amqp))]
pub fn derive_amqp_contract(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "Generic contract types are not supported")
            .to_compile_error()
            .into();
    }

    let expanded = match &input.data {
        Data::Struct(data) => expand_struct(&input, &data.fields),
        Data::Enum(data) => expand_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "Only structs and fieldless enums are supported",
        )),
    };

    expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}

// ============================================================================
// Attributes
// ============================================================================

#[derive(Default)]
struct ContainerAttrs {
    encoding: Option<TokenStream2>,
    name: Option<LitStr>,
    code: Option<LitInt>,
    provides: Vec<Path>,
    hooks: Vec<(&'static str, Ident)>,
}

const HOOK_ROLES: &[&str] = &["before_encode", "after_encode", "before_decode", "after_decode"];

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut out = ContainerAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("amqp")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("encoding") {
                let lit: LitStr = meta.value()?.parse()?;
                out.encoding = Some(encoding_tokens(&lit)?);
                return Ok(());
            }
            if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse()?);
                return Ok(());
            }
            if meta.path.is_ident("code") {
                let lit: LitInt = meta.value()?.parse()?;
                lit.base10_parse::<u64>()?;
                out.code = Some(lit);
                return Ok(());
            }
            if meta.path.is_ident("provides") {
                return meta.parse_nested_meta(|inner| {
                    out.provides.push(inner.path);
                    Ok(())
                });
            }
            if let Some(role) = HOOK_ROLES.iter().copied().find(|r| meta.path.is_ident(r)) {
                let lit: LitStr = meta.value()?.parse()?;
                out.hooks.push((role, Ident::new(&lit.value(), lit.span())));
                return Ok(());
            }
            Err(meta.error("unknown amqp container attribute"))
        })?;
    }
    Ok(out)
}

fn encoding_tokens(lit: &LitStr) -> syn::Result<TokenStream2> {
    let variant = match lit.value().as_str() {
        "list" | "described_list" => quote! { DescribedList },
        "map" | "described_map" => quote! { DescribedMap },
        "simple_map" => quote! { SimpleMap },
        "simple_list" => quote! { SimpleList },
        other => {
            return Err(syn::Error::new(
                lit.span(),
                format!("unknown encoding `{other}` (expected list, map, simple_list or simple_map)"),
            ))
        }
    };
    Ok(quote! { ::amqp_contract::types::EncodingType::#variant })
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<LitStr>,
    order: Option<i32>,
    skip: bool,
    base: bool,
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("amqp")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("order") {
                let input = meta.value()?;
                let negative = input.parse::<Option<Token![-]>>()?.is_some();
                let value: i32 = input.parse::<LitInt>()?.base10_parse()?;
                out.order = Some(if negative { -value } else { value });
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("base") {
                out.base = true;
            } else {
                return Err(meta.error("unknown amqp field attribute"));
            }
            Ok(())
        })?;
    }
    if out.base && (out.skip || out.name.is_some() || out.order.is_some()) {
        return Err(syn::Error::new(
            Span::call_site(),
            "`base` cannot be combined with other amqp field attributes",
        ));
    }
    Ok(out)
}

// ============================================================================
// Structs
// ============================================================================

fn expand_struct(input: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let container = parse_container_attrs(&input.attrs)?;

    let named = match fields {
        Fields::Named(f) => f.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Only named fields are supported",
            ))
        }
    };

    let mut accessor_fns = Vec::new();
    let mut members = Vec::new();
    let mut base: Option<TokenStream2> = None;

    for field in named {
        let attrs = parse_field_attrs(&field.attrs)?;
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let ty = &field.ty;

        if attrs.skip {
            continue;
        }

        if attrs.base {
            if base.is_some() {
                return Err(syn::Error::new_spanned(field, "Only one `base` field is allowed"));
            }
            let project = format_ident!("__amqp_project_{}", field_name);
            let project_mut = format_ident!("__amqp_project_mut_{}", field_name);
            accessor_fns.push(quote! {
                fn #project(
                    target: &dyn ::std::any::Any,
                ) -> ::std::option::Option<&dyn ::std::any::Any> {
                    target
                        .downcast_ref::<#name>()
                        .map(|t| &t.#field_name as &dyn ::std::any::Any)
                }

                fn #project_mut(
                    target: &mut dyn ::std::any::Any,
                ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                    target
                        .downcast_mut::<#name>()
                        .map(|t| &mut t.#field_name as &mut dyn ::std::any::Any)
                }
            });
            base = Some(quote! {
                .with_base(::amqp_contract::types::BaseInfo::new::<#ty>(#project, #project_mut))
            });
            continue;
        }

        let getter = format_ident!("__amqp_get_{}", field_name);
        let setter = format_ident!("__amqp_set_{}", field_name);
        accessor_fns.push(quote! {
            fn #getter(
                target: &dyn ::std::any::Any,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                target
                    .downcast_ref::<#name>()
                    .map(|t| &t.#field_name as &dyn ::std::any::Any)
            }

            fn #setter(
                target: &mut dyn ::std::any::Any,
                value: ::amqp_contract::types::Instance,
            ) -> ::amqp_contract::Result<()> {
                let t = target
                    .downcast_mut::<#name>()
                    .ok_or_else(::amqp_contract::Error::cast::<#name>)?;
                ::amqp_contract::types::assign(&mut t.#field_name, value)
            }
        });

        let wire_name = attrs
            .name
            .map_or_else(|| wire_name(&field_name.to_string()), |lit| lit.value());
        let order = attrs.order.map(|o| quote! { .with_order(#o) });
        members.push(quote! {
            .member(
                ::amqp_contract::types::MemberInfo::new::<#ty>(
                    #wire_name,
                    ::amqp_contract::types::MemberAccessor::field(#getter, #setter),
                )
                #order
            )
        });
    }

    let mut hook_fns = Vec::new();
    let mut hooks = Vec::new();
    for (index, (role, method)) in container.hooks.iter().enumerate() {
        let wrapper = format_ident!("__amqp_hook_{}_{}", role, index);
        let role_ident = Ident::new(role, Span::call_site());
        let method_name = method.to_string();
        if role.ends_with("_encode") {
            hook_fns.push(quote! {
                fn #wrapper(target: &dyn ::std::any::Any) -> ::amqp_contract::Result<()> {
                    let t = target
                        .downcast_ref::<#name>()
                        .ok_or_else(::amqp_contract::Error::cast::<#name>)?;
                    ::amqp_contract::types::HookOutcome::into_result(t.#method())
                }
            });
        } else {
            hook_fns.push(quote! {
                fn #wrapper(target: &mut dyn ::std::any::Any) -> ::amqp_contract::Result<()> {
                    let t = target
                        .downcast_mut::<#name>()
                        .ok_or_else(::amqp_contract::Error::cast::<#name>)?;
                    ::amqp_contract::types::HookOutcome::into_result(t.#method())
                }
            });
        }
        hooks.push(quote! {
            .hook(::amqp_contract::types::HookInfo::#role_ident(#method_name, #wrapper))
        });
    }

    let encoding = container
        .encoding
        .unwrap_or_else(|| quote! { ::amqp_contract::types::EncodingType::DescribedList });
    let named_descriptor = container.name.map(|n| quote! { .named(#n) });
    let code = container.code.map(|c| quote! { .with_code(#c) });
    let provides = container.provides.iter().map(|p| quote! { .provides::<#p>() });

    Ok(quote! {
        impl ::amqp_contract::AmqpType for #name {
            fn shape() -> ::amqp_contract::types::TypeShape {
                #(#accessor_fns)*
                #(#hook_fns)*

                ::amqp_contract::types::ContractInfo::new::<#name>(#encoding)
                    #named_descriptor
                    #code
                    #base
                    #(#members)*
                    #(#provides)*
                    #(#hooks)*
                    .into_shape()
            }
        }
    })
}

/// Wire name of a field when no `name` is given: the field name itself.
fn wire_name(field: &str) -> String {
    field.trim_start_matches("r#").to_string()
}

// ============================================================================
// Enums
// ============================================================================

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let repr = enum_repr(&input.attrs)?;

    let mut to_arms = Vec::new();
    let mut from_checks = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Only fieldless enum variants are supported",
            ));
        }
        let ident = &variant.ident;
        to_arms.push(quote! { #name::#ident => #name::#ident as #repr });
        from_checks.push(quote! {
            if repr == #name::#ident as #repr {
                return ::std::option::Option::Some(#name::#ident);
            }
        });
    }

    Ok(quote! {
        impl ::amqp_contract::AmqpType for #name {
            fn shape() -> ::amqp_contract::types::TypeShape {
                ::amqp_contract::types::TypeShape::opaque()
                    .with_enum(::amqp_contract::types::EnumShape::of::<#name>())
            }
        }

        impl ::amqp_contract::AmqpEnum for #name {
            type Repr = #repr;

            fn to_repr(&self) -> #repr {
                match self {
                    #(#to_arms),*
                }
            }

            fn from_repr(repr: #repr) -> ::std::option::Option<Self> {
                #(#from_checks)*
                ::std::option::Option::None
            }
        }
    })
}

/// Integer named by `#[repr(..)]`, `i32` otherwise.
fn enum_repr(attrs: &[Attribute]) -> syn::Result<Type> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
        let mut found = None;
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if ENUM_REPRS.contains(&ident.to_string().as_str()) {
                    found = Some(ident.clone());
                }
            }
            Ok(())
        })?;
        if let Some(ident) = found {
            return Ok(syn::parse_quote! { #ident });
        }
    }
    Ok(syn::parse_quote! { i32 })
}
