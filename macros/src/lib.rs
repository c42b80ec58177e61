use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

/// Test attribute for rxcore.
///
/// Sync functions become plain `#[test]`s, async functions run on a
/// multi-threaded tokio runtime. Both install a `tracing` subscriber that
/// writes through the test harness and honours `RUST_LOG`.
///
/// `#[rxcore_macro::test(current)]` selects the current-thread runtime for
/// an async test.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let mut input = parse_macro_input!(item as ItemFn);

  let is_async = input.sig.asyncness.is_some();

  let raw_args = proc_macro2::TokenStream::from(attr);
  let flavor = if raw_args.is_empty() {
    quote!(flavor = "multi_thread")
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxcore_macro::test flavor args are only supported for async tests",
        )
        .to_compile_error(),
      );
    }

    let name = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      (ident.to_string(), ident.span())
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      (lit.value(), lit.span())
    } else {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxcore_macro::test only accepts: #[rxcore_macro::test], \
           #[rxcore_macro::test(current)] or #[rxcore_macro::test(multi)]",
        )
        .to_compile_error(),
      );
    };

    match name.0.as_str() {
      "current" => quote!(flavor = "current_thread"),
      "multi" => quote!(flavor = "multi_thread"),
      _ => {
        return TokenStream::from(
          syn::Error::new(name.1, "rxcore_macro::test only accepts `current` or `multi`")
            .to_compile_error(),
        );
      }
    }
  };

  input.block.stmts.insert(
    0,
    syn::parse_quote! {
      let _ = ::tracing_subscriber::fmt()
        .with_env_filter(::tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    },
  );

  let native_attr = if is_async { quote!(tokio::test(#flavor)) } else { quote!(test) };

  let expanded = quote! {
      #[#native_attr]
      #input
  };

  TokenStream::from(expanded)
}
