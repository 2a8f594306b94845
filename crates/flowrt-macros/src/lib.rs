#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

extern crate proc_macro;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parenthesized,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Error, Ident, ItemFn, Result, Token,
};

/// One `name: type` pair inside an `inputs(...)`/`outputs(...)` list.
#[derive(Debug, Clone)]
struct PinArg {
    ident: Ident,
    type_name: Ident,
}

impl Parse for PinArg {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let type_name: Ident = input.parse()?;
        Ok(Self { ident, type_name })
    }
}

fn parse_pin_list(input: ParseStream, keyword: &str) -> Result<Vec<PinArg>> {
    let content;
    let kw: Ident = input.parse()?;
    if kw != keyword {
        return Err(Error::new_spanned(kw, format!("expected `{keyword}(...)`")));
    }
    parenthesized!(content in input);
    Ok(Punctuated::<PinArg, Token![,]>::parse_terminated(&content)?.into_iter().collect())
}

/// Parsed arguments of `#[component(Name, inputs(...), outputs(...))]`. Both
/// pin lists are optional, in either order, mirroring how a source leaf
/// (zero inputs) or a sink leaf (zero outputs) reads in `spec.md` §3.
struct ComponentArgs {
    name: Ident,
    inputs: Vec<PinArg>,
    outputs: Vec<PinArg>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: Ident = input.parse()?;
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        while input.parse::<Token![,]>().is_ok() {
            if input.is_empty() {
                break;
            }
            let fork = input.fork();
            let kw: Ident = fork.parse()?;
            if kw == "inputs" {
                inputs = parse_pin_list(input, "inputs")?;
            } else if kw == "outputs" {
                outputs = parse_pin_list(input, "outputs")?;
            } else {
                return Err(Error::new_spanned(kw, "expected `inputs(...)` or `outputs(...)`"));
            }
        }
        Ok(Self { name, inputs, outputs })
    }
}

fn type_tag_tokens(type_name: &Ident) -> Result<proc_macro2::TokenStream> {
    let tag = match type_name.to_string().as_str() {
        "any" => quote!(::flowrt_core::TypeTag::Any),
        "null" => quote!(::flowrt_core::TypeTag::Null),
        "bool" => quote!(::flowrt_core::TypeTag::Bool),
        "int" => quote!(::flowrt_core::TypeTag::Int),
        "float" => quote!(::flowrt_core::TypeTag::Float),
        "str" => quote!(::flowrt_core::TypeTag::Str),
        "bytes" => quote!(::flowrt_core::TypeTag::Bytes),
        "list" => quote!(::flowrt_core::TypeTag::List),
        "map" => quote!(::flowrt_core::TypeTag::Map),
        other => {
            return Err(Error::new_spanned(
                type_name,
                format!("unknown pin type {other:?}; expected one of any/null/bool/int/float/str/bytes/list/map"),
            ));
        }
    };
    Ok(tag)
}

/// Declares a leaf component's input/output schema and generates the
/// `Component` impl plus a constructor assembling a ready-to-run
/// `flowrt_runtime::LeafNode`, attached above the struct's `process` method.
///
/// ```ignore
/// #[component(Adder, inputs(a: int, b: int), outputs(sum: int))]
/// fn process(&mut self, inputs: &Inputs, ctx: &ProcessCtx) -> Result<ProcessOutcome, UserError> {
///     // ...
/// }
/// ```
///
/// `Adder` must already exist as a plain struct (or unit struct) holding
/// whatever state `process` needs; the attribute attaches the function to
/// it as an inherent method, it does not declare the struct itself.
///
/// Every declared input is wired as a required queue-mode pin of the given
/// type; components needing sticky/static/optional pins still build their
/// `LeafNode` by hand, as the built-in macros in `flowrt-registry` do.
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    component_impl(args, input)
}

fn component_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let ComponentArgs { name, inputs, outputs } = parse_macro_input!(args as ComponentArgs);
    let function = parse_macro_input!(input as ItemFn);

    if function.sig.ident != "process" {
        return Error::new_spanned(function.sig.ident, "component function must be named `process`")
            .to_compile_error()
            .into();
    }

    let mut input_defs = Vec::with_capacity(inputs.len());
    for pin in &inputs {
        let tag = match type_tag_tokens(&pin.type_name) {
            Ok(t) => t,
            Err(e) => return e.to_compile_error().into(),
        };
        let pin_name = pin.ident.to_string();
        input_defs.push(quote! {
            (
                #pin_name.to_string(),
                ::flowrt_core::Input::new(#pin_name, "", #tag, ::flowrt_core::InputMode::Queue, ::flowrt_core::Requiredness::Required, None),
            )
        });
    }

    let mut output_defs = Vec::with_capacity(outputs.len());
    for pin in &outputs {
        let tag = match type_tag_tokens(&pin.type_name) {
            Ok(t) => t,
            Err(e) => return e.to_compile_error().into(),
        };
        let pin_name = pin.ident.to_string();
        output_defs.push(quote! {
            (
                #pin_name.to_string(),
                ::flowrt_core::Output::new(#pin_name, "", #tag, ::flowrt_core::OutputMode::Ref),
            )
        });
    }

    let name_str = name.to_string();
    let into_leaf_node_fn = format_ident!("into_leaf_node");

    quote! {
        impl #name {
            #function
        }

        impl ::flowrt_runtime::Component for #name {
            fn process(
                &mut self,
                inputs: &::flowrt_runtime::Inputs,
                ctx: &::flowrt_runtime::ProcessCtx,
            ) -> ::std::result::Result<::flowrt_runtime::ProcessOutcome, ::flowrt_runtime::UserError> {
                Self::process(self, inputs, ctx)
            }
        }

        impl #name {
            /// Assembles a ready-to-run leaf node from this component and
            /// the schema declared in `#[component(...)]`.
            #[must_use]
            pub fn #into_leaf_node_fn(
                self,
                id: impl Into<::std::string::String>,
                display_name: impl Into<::std::string::String>,
            ) -> ::flowrt_runtime::LeafNode {
                let inputs: ::std::vec::Vec<(::std::string::String, ::flowrt_core::Input)> = ::std::vec![
                    #(#input_defs,)*
                ];
                let outputs: ::std::vec::Vec<(::std::string::String, ::flowrt_core::Output)> = ::std::vec![
                    #(#output_defs,)*
                ];
                ::flowrt_runtime::LeafNode::new(id, #name_str, display_name, inputs, outputs, ::std::boxed::Box::new(self))
            }
        }
    }
    .into()
}
