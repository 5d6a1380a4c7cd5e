use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive a `<Name>Values` companion holding one `MotionValue` per field.
///
/// Each field becomes independently observable, so a renderer can subscribe
/// to just `opacity` or just `y`. Setting the whole struct decomposes it and
/// only fields that actually changed notify their listeners.
///
/// Every field type must be `Clone + PartialEq + 'static`.
///
/// # Example
/// ```ignore
/// #[derive(Clone, PartialEq, MotionFields)]
/// pub struct Style {
///     pub opacity: f32,
///     pub y: f32,
/// }
///
/// let values = StyleValues::new(Style { opacity: 0.0, y: 20.0 });
/// values.y.subscribe(|y| println!("y = {y}"));
/// values.set(Style { opacity: 1.0, y: 0.0 });
/// ```
#[proc_macro_derive(MotionFields)]
pub fn derive_motion_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let vis = &input.vis;
    let values_name = format_ident!("{}Values", name);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "MotionFields can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "MotionFields can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let field_names: Vec<_> = fields.iter().filter_map(|f| f.ident.clone()).collect();
    let field_vis: Vec<_> = fields.iter().map(|f| f.vis.clone()).collect();
    let field_types: Vec<_> = fields.iter().map(|f| f.ty.clone()).collect();

    let doc = format!("Per-field motion values for [`{name}`].");

    let expanded = quote! {
        #[doc = #doc]
        #[derive(Clone)]
        #vis struct #values_name {
            #(#field_vis #field_names: ::atelier_motion::value::MotionValue<#field_types>,)*
        }

        impl #values_name {
            #vis fn new(initial: #name) -> Self {
                Self {
                    #(#field_names: ::atelier_motion::value::MotionValue::new(initial.#field_names),)*
                }
            }

            /// Reassemble the current field values.
            #vis fn get(&self) -> #name {
                #name {
                    #(#field_names: self.#field_names.get(),)*
                }
            }

            /// Write every field; unchanged fields stay silent.
            #vis fn set(&self, value: #name) {
                #(self.#field_names.set(value.#field_names);)*
            }

            /// Drop the listeners of every field.
            #vis fn clear_subscribers(&self) {
                #(self.#field_names.clear_subscribers();)*
            }
        }

        impl #name {
            #vis fn into_values(self) -> #values_name {
                #values_name::new(self)
            }
        }
    };

    TokenStream::from(expanded)
}
