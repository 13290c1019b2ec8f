mod decode_field;
mod entity_name;

use decode_field::decode_field;
use entity_name::entity_name;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `Entity` and `EntityFields` for a struct with named fields.
///
/// Attributes, all inside `#[sluice(..)]`:
/// - `name = "Product"` on the struct, defaults to the struct name.
/// - `name = "ProductName"` on a field, the column it is read from. Defaults to the field name.
/// - `child` the field is a nested entity, filled from the columns prefixed by `{field}_`.
///   It can be held directly, in a `Box`, an `Option` or an `Option<Box<_>>`.
/// - `ignore` the field is never mapped.
#[proc_macro_derive(Entity, attributes(sluice))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    if !item.generics.params.is_empty() {
        panic!("Entity cannot be derived for generic structs");
    }
    let name = &item.ident;
    let entity_name = entity_name(&item);
    let fields = item.fields.iter().filter_map(decode_field).collect::<Vec<_>>();
    let len = fields.len();
    let field_defs = fields.iter().map(|f| f.field_def());
    let set_field = fields.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        if f.child.is_some() {
            quote!(#i => {})
        } else {
            quote!(#i => self.#ident = <#ty as ::sluice::AsValue>::try_from_value(value)?)
        }
    });
    let get_field = fields.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        if f.child.is_some() {
            quote!(#i => ::sluice::Value::Null)
        } else {
            quote!(#i => ::sluice::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let child_mut = fields.iter().enumerate().map(|(i, f)| {
        let access = f.child_mut();
        quote!(#i => #access)
    });
    let child = fields.iter().enumerate().map(|(i, f)| {
        let access = f.child();
        quote!(#i => #access)
    });
    quote! {
        impl ::sluice::Entity for #name {
            fn entity_name() -> &'static str {
                #entity_name
            }

            fn field_defs() -> &'static [::sluice::FieldDef] {
                static FIELDS: [::sluice::FieldDef; #len] = [#(#field_defs),*];
                &FIELDS
            }
        }

        impl ::sluice::EntityFields for #name {
            fn fields(&self) -> &'static [::sluice::FieldDef] {
                <Self as ::sluice::Entity>::field_defs()
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, index: usize, value: ::sluice::Value) -> ::sluice::Result<()> {
                match index {
                    #(#set_field,)*
                    _ => {}
                }
                Ok(())
            }

            fn get_field(&self, index: usize) -> ::sluice::Value {
                match index {
                    #(#get_field,)*
                    _ => ::sluice::Value::Null,
                }
            }

            fn child_mut(&mut self, index: usize) -> Option<&mut dyn ::sluice::EntityFields> {
                match index {
                    #(#child_mut,)*
                    _ => None,
                }
            }

            fn child(&self, index: usize) -> Option<&dyn ::sluice::EntityFields> {
                match index {
                    #(#child,)*
                    _ => None,
                }
            }
        }
    }
    .into()
}
