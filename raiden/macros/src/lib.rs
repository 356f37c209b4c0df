//! Derives that wire state changes and events into their wrapping enums.
use proc_macro::TokenStream;
use quote::quote;
use syn::{
	parse_macro_input,
	DeriveInput,
};

/// Implements `From<T> for Event` where the `Event` variant carries the type's name.
#[proc_macro_derive(IntoEvent)]
pub fn into_event(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = input.ident;

	let expanded = quote! {
		impl From<#name> for Event {
			fn from(inner: #name) -> Event {
				Event::#name(inner)
			}
		}
	};

	TokenStream::from(expanded)
}

/// Implements `From<T> for StateChange` and exposes the variant name as
/// `T::TYPE_NAME`, which is also the serialized `type` tag.
#[proc_macro_derive(IntoStateChange)]
pub fn into_state_change(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = input.ident;
	let type_name = name.to_string();

	let expanded = quote! {
		impl From<#name> for StateChange {
			fn from(inner: #name) -> StateChange {
				StateChange::#name(inner)
			}
		}

		impl #name {
			/// Name of the state change variant.
			pub const TYPE_NAME: &'static str = #type_name;
		}
	};

	TokenStream::from(expanded)
}
