//! Implementation of the `native!` procedural macro.
//!
//! # Supported Input Forms
//!
//! 1. Closure form: `native!(|this, a, b| body)`
//! 2. Name + closure form: `native!("name", |this, a, b| body)`
//!
//! # Design
//!
//! The user's closure is not called; its parameters are re-bound as `let`
//! statements inside a closure with the `Function::native` signature, and
//! its body is spliced in after them. This keeps `?` in the body returning
//! from the generated closure and lets parameter patterns such as `_` or
//! `a: Value` pass through untouched.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ExprClosure, ExprLit, Lit, LitStr, ReturnType, Token};

struct NativeInput {
    name: LitStr,
    closure: ExprClosure,
}

pub fn native_impl(input: TokenStream) -> TokenStream {
    match parse_native_input(input).and_then(|input| generate_native(&input)) {
        Ok(expanded) => expanded,
        Err(error) => error.to_compile_error(),
    }
}

fn parse_native_input(input: TokenStream) -> syn::Result<NativeInput> {
    let parser = Punctuated::<Expr, Token![,]>::parse_terminated;
    let expressions = syn::parse::Parser::parse2(parser, input)?;
    let mut iterator = expressions.into_iter();

    match (iterator.next(), iterator.next(), iterator.next()) {
        (Some(Expr::Closure(closure)), None, None) => Ok(NativeInput {
            name: LitStr::new("", Span::call_site()),
            closure,
        }),
        (Some(name), Some(closure), None) => Ok(NativeInput {
            name: expect_name(name)?,
            closure: expect_closure(closure)?,
        }),
        (Some(other), None, None) => Err(syn::Error::new(
            other.span(),
            "native! requires a closure: native!(|this, a, b| body)",
        )),
        _ => Err(syn::Error::new(
            Span::call_site(),
            "native! requires a closure or a name and a closure",
        )),
    }
}

fn expect_name(expression: Expr) -> syn::Result<LitStr> {
    match expression {
        Expr::Lit(ExprLit {
            lit: Lit::Str(name),
            ..
        }) => Ok(name),
        other => Err(syn::Error::new(
            other.span(),
            "native! expected a string literal for the function name",
        )),
    }
}

fn expect_closure(expression: Expr) -> syn::Result<ExprClosure> {
    match expression {
        Expr::Closure(closure) => Ok(closure),
        other => Err(syn::Error::new(
            other.span(),
            "native! expected a closure after the function name",
        )),
    }
}

fn generate_native(input: &NativeInput) -> syn::Result<TokenStream> {
    let closure = &input.closure;

    if let Some(asyncness) = closure.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "native! does not support async closures",
        ));
    }

    let mut parameters = closure.inputs.iter();
    let Some(receiver) = parameters.next() else {
        return Err(syn::Error::new(
            closure.span(),
            "native! closure must declare a receiver parameter first: |this, ...|",
        ));
    };

    let argument_bindings: Vec<_> = parameters
        .enumerate()
        .map(|(index, pattern)| {
            quote! {
                let #pattern = __fnadapt_arguments
                    .get(#index)
                    .cloned()
                    .unwrap_or_default();
            }
        })
        .collect();
    let arity = argument_bindings.len();

    let body = &closure.body;
    let body = match &closure.output {
        ReturnType::Default => quote! { #body },
        ReturnType::Type(_, output) => {
            let result = format_ident!("__fnadapt_result");
            quote! {
                let #result: #output = #body;
                #result
            }
        }
    };
    let name = &input.name;

    Ok(quote! {
        ::fnadapt::value::Function::native(
            #name,
            #arity,
            move |__fnadapt_this: &::fnadapt::value::Value,
                  __fnadapt_arguments: &[::fnadapt::value::Value]|
                  -> ::std::result::Result<::fnadapt::value::Value, ::fnadapt::Error> {
                let #receiver = __fnadapt_this;
                #(#argument_bindings)*
                #body
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn expand(input: TokenStream) -> String {
        native_impl(input).to_string()
    }

    #[rstest]
    fn test_arity_excludes_receiver() {
        let expanded = expand(quote! { "add", |this, a, b| Ok(a) });
        assert!(expanded.contains("\"add\" , 2usize"));
        assert!(expanded.contains("let this = __fnadapt_this"));
        assert!(expanded.contains("let b = __fnadapt_arguments . get (1usize)"));
    }

    #[rstest]
    fn test_anonymous_form_uses_empty_name() {
        let expanded = expand(quote! { |_| Ok(Value::Undefined) });
        assert!(expanded.contains("\"\" , 0usize"));
    }

    #[rstest]
    fn test_return_type_is_enforced_on_body() {
        let expanded = expand(quote! { |_, a| -> Result<Value, Error> { Ok(a) } });
        assert!(expanded.contains("let __fnadapt_result : Result < Value , Error >"));
    }

    #[rstest]
    #[case(quote! { || Ok(Value::Undefined) }, "receiver parameter")]
    #[case(quote! { 42 }, "requires a closure")]
    #[case(quote! { name, |this| Ok(this.clone()) }, "string literal")]
    #[case(quote! { "name", 42 }, "closure after the function name")]
    #[case(quote! { "a", |this| Ok(this.clone()), 3 }, "a name and a closure")]
    fn test_invalid_input_reports_error(#[case] input: TokenStream, #[case] message: &str) {
        let expanded = expand(input);
        assert!(expanded.contains("compile_error"), "{expanded}");
        assert!(expanded.contains(message), "{expanded}");
    }

    proptest! {
        /// Declared arity is the parameter count after the receiver, and
        /// every parameter reads its own argument slot.
        #[test]
        fn prop_arity_matches_parameters_after_receiver(count in 0usize..12) {
            let parameters: Vec<_> = (0..count).map(|index| format_ident!("p{}", index)).collect();
            let expanded = expand(quote! { "f", |this, #(#parameters),*| Ok(this.clone()) });

            let declared = format!("\"f\" , {count}usize");
            prop_assert!(expanded.contains(&declared), "{}", expanded);
            for index in 0..count {
                let binding = format!("let p{index} = __fnadapt_arguments . get ({index}usize)");
                prop_assert!(expanded.contains(&binding), "{}", expanded);
            }
            let past_end = format!("get ({count}usize)");
            prop_assert!(!expanded.contains(&past_end));
        }
    }
}
